use image::{Rgb, RgbImage};

const MM_PER_INCH: f64 = 25.4;

/// Convert a length in millimeters to pixels at `dpi`, rounded to the nearest pixel.
pub fn mm_to_px(mm: u32, dpi: u32) -> u32 {
    (f64::from(mm) * f64::from(dpi) / MM_PER_INCH).round() as u32
}

/// Axis aligned pixel rectangle, `max` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Rect {
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    pub fn union(self, other: Rect) -> Rect {
        Rect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn translate(self, dx: i32, dy: i32) -> Rect {
        Rect {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }
}

/// Bounding box of every pixel that is not pure white, or `None` for a blank image.
pub fn ink_bounds(image: &RgbImage) -> Option<Rect> {
    let white = Rgb([255, 255, 255]);
    let mut bounds: Option<Rect> = None;

    for (x, y, pixel) in image.enumerate_pixels() {
        if *pixel == white {
            continue;
        }
        let (x, y) = (x as i32, y as i32);
        let dot = Rect {
            min_x: x,
            min_y: y,
            max_x: x + 1,
            max_y: y + 1,
        };
        bounds = Some(match bounds {
            Some(b) => b.union(dot),
            None => dot,
        });
    }

    bounds
}

/// Darken the pixel at (`x`, `y`) towards black by `coverage` (0.0 ..= 1.0).
///
/// Pixels outside the canvas are ignored so long text simply runs off the edge.
pub(crate) fn darken(image: &mut RgbImage, x: i32, y: i32, coverage: f32) {
    if x < 0 || y < 0 || x >= image.width() as i32 || y >= image.height() as i32 {
        return;
    }
    let coverage = coverage.max(0.0).min(1.0);
    if coverage == 0.0 {
        return;
    }
    let pixel = image.get_pixel_mut(x as u32, y as u32);
    for channel in pixel.0.iter_mut() {
        *channel = (f32::from(*channel) * (1.0 - coverage)).round() as u8;
    }
}
