//! Label image rendering.
//!
//! Text is measured first, then the ink bounding box is placed on a white
//! canvas sized from the label's physical dimensions.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ImageFormat, Rgb, RgbImage};
use log::{debug, warn};
use rusttype::{point, Font, PositionedGlyph, Scale};
use std::io::Cursor;
use std::path::Path;

use crate::{
    config::Config,
    error::Error,
    glyphs,
    media::LabelSize,
    model::{Alignment, LabelRequest},
    utils::{darken, Rect},
    MAX_FONT_SIZE,
};

/// Distance in pixels between the text and the label edge for left and right alignment.
pub const EDGE_INSET: i32 = 20;

/// Extra pixels between stacked lines.
const LINE_SPACING: i32 = 4;

enum Face {
    TrueType(Font<'static>),
    Builtin,
}

/// Renders label images with one font at one resolution.
pub struct Renderer {
    face: Face,
    dpi: u32,
}

impl Renderer {
    /// Load the TrueType font at `font_path`.
    ///
    /// If the font can not be read or parsed the built-in bitmap font is used
    /// instead, so this never fails.
    pub fn new(font_path: impl AsRef<Path>, dpi: u32) -> Self {
        let face = match load_font(font_path.as_ref()) {
            Some(font) => Face::TrueType(font),
            None => Face::Builtin,
        };
        Renderer { face, dpi }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.get_font_path(), config.get_dpi())
    }

    /// Renderer that always uses the built-in bitmap font.
    pub fn builtin(dpi: u32) -> Self {
        Renderer {
            face: Face::Builtin,
            dpi,
        }
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    pub fn uses_builtin_font(&self) -> bool {
        matches!(self.face, Face::Builtin)
    }

    /// Render `text` on the label identified by `size_code`.
    ///
    /// `font_size` must be in `1..=MAX_FONT_SIZE`.
    pub fn render(
        &self,
        text: &str,
        size_code: &str,
        font_size: u32,
        align: Alignment,
    ) -> Result<RgbImage, Error> {
        let size = LabelSize::from_code(size_code)?;
        check_font_size(font_size)?;
        Ok(self.render_size(text, size, font_size, align))
    }

    pub fn render_request(&self, request: &LabelRequest) -> Result<RgbImage, Error> {
        self.render(
            &request.text,
            &request.label_size,
            request.font_size,
            request.align,
        )
    }

    /// Render on a known size. `font_size` is clamped to `1..=MAX_FONT_SIZE`.
    pub fn render_size(
        &self,
        text: &str,
        size: LabelSize,
        font_size: u32,
        align: Alignment,
    ) -> RgbImage {
        let (width, height) = size.pixel_dimensions(self.dpi);
        let mut image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));

        let font_size = font_size.clamp(1, MAX_FONT_SIZE);
        let ink = self.layout(text, font_size);
        let bounds = match ink.bounds() {
            Some(bounds) => bounds,
            None => {
                debug!("no visible glyphs in {:?}, leaving label blank", text);
                return image;
            }
        };

        let (x, y) = place(bounds, width, height, align);
        debug!(
            "label {} {}x{} text {}x{} at ({}, {})",
            size,
            width,
            height,
            bounds.width(),
            bounds.height(),
            x,
            y
        );
        ink.draw(&mut image, x - bounds.min_x, y - bounds.min_y);

        image
    }

    fn layout(&self, text: &str, font_size: u32) -> Ink {
        match &self.face {
            Face::TrueType(font) => Ink::Glyphs(layout_truetype(font, text, font_size)),
            Face::Builtin => Ink::Dots(layout_builtin(text, font_size)),
        }
    }
}

/// Reject font sizes the renderer will not draw.
pub(crate) fn check_font_size(font_size: u32) -> Result<(), Error> {
    if font_size == 0 || font_size > MAX_FONT_SIZE {
        return Err(Error::InvalidFontSize {
            size: font_size,
            max: MAX_FONT_SIZE,
        });
    }
    Ok(())
}

/// Render with the default font path, falling back to the built-in font.
pub fn render(
    text: &str,
    size_code: &str,
    font_size: u32,
    align: Alignment,
    dpi: u32,
) -> Result<RgbImage, Error> {
    Renderer::new(crate::DEFAULT_FONT_PATH, dpi).render(text, size_code, font_size, align)
}

/// Encode a rendered label as PNG.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, Error> {
    let mut bytes: Vec<u8> = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// PNG data URL suitable for an `<img src>` attribute.
pub fn preview_data_url(image: &RgbImage) -> Result<String, Error> {
    let png = encode_png(image)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

/// Top-left corner of the text's ink box on a `width` x `height` canvas.
fn place(text: Rect, width: u32, height: u32, align: Alignment) -> (i32, i32) {
    let (width, height) = (width as i32, height as i32);
    let x = match align {
        Alignment::Left => EDGE_INSET,
        Alignment::Center => (width - text.width()).div_euclid(2),
        Alignment::Right => width - text.width() - EDGE_INSET,
    };
    let y = (height - text.height()).div_euclid(2);
    (x, y)
}

fn load_font(path: &Path) -> Option<Font<'static>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(
                "could not read font {}: {}, using built-in font",
                path.display(),
                err
            );
            return None;
        }
    };
    let font = Font::try_from_vec(bytes);
    if font.is_none() {
        warn!(
            "{} is not a usable TrueType font, using built-in font",
            path.display()
        );
    }
    font
}

enum Ink {
    Glyphs(Vec<PositionedGlyph<'static>>),
    Dots(Vec<Rect>),
}

impl Ink {
    fn bounds(&self) -> Option<Rect> {
        match self {
            Ink::Glyphs(glyphs) => glyphs
                .iter()
                .filter_map(|glyph| glyph.pixel_bounding_box())
                .map(pixel_rect)
                .reduce(Rect::union),
            Ink::Dots(dots) => dots.iter().copied().reduce(Rect::union),
        }
    }

    fn draw(&self, image: &mut RgbImage, dx: i32, dy: i32) {
        let (width, height) = (image.width() as i32, image.height() as i32);
        match self {
            Ink::Glyphs(glyphs) => {
                for glyph in glyphs {
                    if let Some(bb) = glyph.pixel_bounding_box() {
                        let placed = pixel_rect(bb).translate(dx, dy);
                        if placed.min_x >= width
                            || placed.min_y >= height
                            || placed.max_x <= 0
                            || placed.max_y <= 0
                        {
                            continue;
                        }
                        glyph.draw(|gx, gy, coverage| {
                            darken(
                                image,
                                bb.min.x + gx as i32 + dx,
                                bb.min.y + gy as i32 + dy,
                                coverage,
                            )
                        });
                    }
                }
            }
            Ink::Dots(dots) => {
                for dot in dots {
                    let dot = dot.translate(dx, dy);
                    // Only the part of the dot that lands on the canvas.
                    for y in dot.min_y.max(0)..dot.max_y.min(height) {
                        for x in dot.min_x.max(0)..dot.max_x.min(width) {
                            darken(image, x, y, 1.0);
                        }
                    }
                }
            }
        }
    }
}

fn pixel_rect(bb: rusttype::Rect<i32>) -> Rect {
    Rect {
        min_x: bb.min.x,
        min_y: bb.min.y,
        max_x: bb.max.x,
        max_y: bb.max.y,
    }
}

/// Scale that makes the font's em square `font_size` pixels tall.
fn em_scale(font: &Font<'_>, font_size: u32) -> Scale {
    let units_per_em = f32::from(font.units_per_em());
    let unscaled = font.v_metrics_unscaled();
    let line_units = unscaled.ascent - unscaled.descent;
    if units_per_em <= 0.0 || line_units <= 0.0 {
        return Scale::uniform(font_size as f32);
    }
    Scale::uniform(font_size as f32 * line_units / units_per_em)
}

fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.trim_end_matches('\r'))
}

fn layout_truetype(
    font: &Font<'static>,
    text: &str,
    font_size: u32,
) -> Vec<PositionedGlyph<'static>> {
    let scale = em_scale(font, font_size);
    let metrics = font.v_metrics(scale);
    let line_height = metrics.ascent - metrics.descent + metrics.line_gap + LINE_SPACING as f32;

    lines(text)
        .enumerate()
        .flat_map(|(i, line)| {
            let baseline = metrics.ascent + i as f32 * line_height;
            font.layout(line, scale, point(0.0, baseline))
        })
        .collect()
}

/// Integer magnification of the 5x7 font, roughly matching `font_size` pixels per line.
fn builtin_scale(font_size: u32) -> i32 {
    let cells = font_size.saturating_add(glyphs::CELL_HEIGHT / 2) / glyphs::CELL_HEIGHT;
    i32::try_from(cells).unwrap_or(i32::MAX).max(1)
}

fn layout_builtin(text: &str, font_size: u32) -> Vec<Rect> {
    let scale = builtin_scale(font_size);
    let advance = glyphs::CELL_WIDTH as i32 * scale;
    let line_height = glyphs::CELL_HEIGHT as i32 * scale + LINE_SPACING;

    let mut dots = Vec::new();
    for (i, line) in lines(text).enumerate() {
        let origin_y = i as i32 * line_height;
        for (j, ch) in line.chars().enumerate() {
            let origin_x = j as i32 * advance;
            for (col, row) in glyphs::dots(ch) {
                let x = origin_x + col as i32 * scale;
                let y = origin_y + row as i32 * scale;
                dots.push(Rect {
                    min_x: x,
                    min_y: y,
                    max_x: x + scale,
                    max_y: y + scale,
                });
            }
        }
    }
    dots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ink_bounds;

    fn builtin() -> Renderer {
        Renderer::builtin(300)
    }

    #[test]
    fn hello_on_multipurpose_label() {
        let image = builtin()
            .render("Hello", "11354", 40, Alignment::Center)
            .unwrap();
        assert_eq!(image.dimensions(), (673, 378));
        assert_eq!(*image.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert!(ink_bounds(&image).is_some());
    }

    #[test]
    fn dimensions_follow_catalog_for_every_size() {
        for size in LabelSize::all() {
            let spec = size.spec();
            let image = builtin()
                .render("Test", spec.code, 40, Alignment::Center)
                .unwrap();
            let expected_w = (spec.width_mm as f64 * 300.0 / 25.4).round() as u32;
            let expected_h = (spec.height_mm as f64 * 300.0 / 25.4).round() as u32;
            assert_eq!(image.dimensions(), (expected_w, expected_h), "{}", spec.code);
        }
    }

    #[test]
    fn unknown_size_never_renders() {
        match builtin().render("Test", "BAD", 40, Alignment::Center) {
            Err(Error::UnknownSize(code)) => assert_eq!(code, "BAD"),
            other => panic!("expected UnknownSize, got {:?}", other.map(|i| i.dimensions())),
        }
    }

    #[test]
    fn empty_and_blank_text_leave_label_white() {
        for text in &["", "   ", "\n"] {
            let image = builtin()
                .render(text, "30252", 40, Alignment::Left)
                .unwrap();
            assert_eq!(image.dimensions(), (331, 1051));
            assert_eq!(ink_bounds(&image), None);
        }
    }

    #[test]
    fn ink_stays_inside_label_for_all_alignments() {
        for size in LabelSize::all() {
            for align in &[Alignment::Left, Alignment::Center, Alignment::Right] {
                let image = builtin().render_size("Hello", *size, 40, *align);
                let ink = ink_bounds(&image).unwrap();
                assert!(ink.min_x > 0 && ink.min_y > 0, "{} {}", size, align);
                assert!(ink.max_x < image.width() as i32, "{} {}", size, align);
                assert!(ink.max_y < image.height() as i32, "{} {}", size, align);
            }
        }
    }

    #[test]
    fn left_and_right_keep_fixed_inset() {
        let size = LabelSize::Multipurpose11354;

        let left = builtin().render_size("Hello", size, 40, Alignment::Left);
        assert_eq!(ink_bounds(&left).unwrap().min_x, EDGE_INSET);

        let right = builtin().render_size("Hello", size, 40, Alignment::Right);
        assert_eq!(
            ink_bounds(&right).unwrap().max_x,
            right.width() as i32 - EDGE_INSET
        );
    }

    #[test]
    fn center_is_centered_on_both_axes() {
        let image = builtin().render_size("Hello", LabelSize::Multipurpose11354, 40, Alignment::Center);
        let ink = ink_bounds(&image).unwrap();
        let (w, h) = (image.width() as i32, image.height() as i32);
        assert!((ink.min_x - (w - ink.max_x)).abs() <= 1);
        assert!((ink.min_y - (h - ink.max_y)).abs() <= 1);
    }

    #[test]
    fn vertical_position_ignores_alignment() {
        let size = LabelSize::LargeAddress99012;
        let tops: Vec<i32> = [Alignment::Left, Alignment::Center, Alignment::Right]
            .iter()
            .map(|align| {
                let image = builtin().render_size("Hello", size, 40, *align);
                ink_bounds(&image).unwrap().min_y
            })
            .collect();
        assert!(tops.iter().all(|top| *top == tops[0]));
    }

    #[test]
    fn newlines_stack_lines() {
        let size = LabelSize::Shipping30323;
        let one = ink_bounds(&builtin().render_size("Hello", size, 40, Alignment::Center)).unwrap();
        let two = ink_bounds(&builtin().render_size("Hello\nHello", size, 40, Alignment::Center))
            .unwrap();
        assert!(two.height() > one.height() * 2);
        assert_eq!(two.width(), one.width());
    }

    #[test]
    fn long_text_overflows_without_error() {
        let text = "This label text is far too long to fit on any Dymo label";
        let image = builtin().render_size(text, LabelSize::Address30252, 60, Alignment::Center);
        assert_eq!(image.dimensions(), (331, 1051));
        assert!(ink_bounds(&image).is_some());
    }

    #[test]
    fn missing_font_falls_back_to_builtin() {
        let renderer = Renderer::new("/nonexistent/font.ttf", 300);
        assert!(renderer.uses_builtin_font());
        let image = renderer.render("Hi", "11354", 40, Alignment::Center).unwrap();
        assert!(ink_bounds(&image).is_some());
    }

    #[test]
    fn default_font_path_renders_either_way() {
        let image = render("Hello", "11354", 40, Alignment::Center, 300).unwrap();
        assert_eq!(image.dimensions(), (673, 378));
        let ink = ink_bounds(&image).unwrap();
        assert!(ink.min_x > 0 && ink.max_x < 673);
        assert!(ink.min_y > 0 && ink.max_y < 378);
    }

    /// The bundled system font, or `None` when it is not installed here.
    fn truetype() -> Option<Renderer> {
        let renderer = Renderer::new(crate::DEFAULT_FONT_PATH, 300);
        if renderer.uses_builtin_font() {
            eprintln!("{} not installed, skipping", crate::DEFAULT_FONT_PATH);
            return None;
        }
        Some(renderer)
    }

    #[test]
    fn truetype_ink_keeps_insets_on_every_size() {
        let renderer = match truetype() {
            Some(renderer) => renderer,
            None => return,
        };
        for size in LabelSize::all() {
            for align in &[Alignment::Left, Alignment::Center, Alignment::Right] {
                let image = renderer.render_size("Hello", *size, 40, *align);
                let ink = ink_bounds(&image).unwrap();
                let (w, h) = (image.width() as i32, image.height() as i32);
                assert!(ink.min_x > 0 && ink.min_y > 0, "{} {}", size, align);
                assert!(ink.max_x < w && ink.max_y < h, "{} {}", size, align);
                match align {
                    // Faint antialiased edges may round to white.
                    Alignment::Left => assert!(
                        (EDGE_INSET..=EDGE_INSET + 2).contains(&ink.min_x),
                        "{} left edge at {}",
                        size,
                        ink.min_x
                    ),
                    Alignment::Right => assert!(
                        (w - EDGE_INSET - 2..=w - EDGE_INSET).contains(&ink.max_x),
                        "{} right edge at {}",
                        size,
                        ink.max_x
                    ),
                    Alignment::Center => {
                        assert!((ink.min_x - (w - ink.max_x)).abs() <= 3, "{}", size)
                    }
                }
            }
        }
    }

    #[test]
    fn truetype_em_square_matches_font_size() {
        let renderer = match truetype() {
            Some(renderer) => renderer,
            None => return,
        };
        let size = LabelSize::Multipurpose11354;
        let cap_height = |font_size| {
            let image = renderer.render_size("H", size, font_size, Alignment::Center);
            ink_bounds(&image).unwrap().height()
        };

        // DejaVu Sans Bold capitals are 0.729 em tall.
        let at_40 = cap_height(40);
        assert!((27..=32).contains(&at_40), "cap height {}", at_40);
        let at_80 = cap_height(80);
        assert!((at_80 - 2 * at_40).abs() <= 2, "{} vs {}", at_80, at_40);
    }

    #[test]
    fn builtin_scale_tracks_font_size() {
        assert_eq!(builtin_scale(1), 1);
        assert_eq!(builtin_scale(40), 5);
        assert_eq!(builtin_scale(60), 8);
        assert_eq!(builtin_scale(0), 1);
        assert_eq!(builtin_scale(u32::MAX), 536_870_912);
    }

    #[test]
    fn font_size_outside_range_is_rejected() {
        let renderers = vec![builtin(), Renderer::new(crate::DEFAULT_FONT_PATH, 300)];
        for renderer in &renderers {
            for font_size in &[0, MAX_FONT_SIZE + 1, 100_000, u32::MAX] {
                match renderer.render("Hi", "11354", *font_size, Alignment::Center) {
                    Err(Error::InvalidFontSize { size, max }) => {
                        assert_eq!(size, *font_size);
                        assert_eq!(max, MAX_FONT_SIZE);
                    }
                    other => panic!(
                        "expected InvalidFontSize for {}, got {:?}",
                        font_size,
                        other.map(|i| i.dimensions())
                    ),
                }
            }
            assert!(renderer
                .render("Hi", "11354", MAX_FONT_SIZE, Alignment::Center)
                .is_ok());
        }
    }

    #[test]
    fn render_size_clamps_huge_font_sizes() {
        let size = LabelSize::Multipurpose11354;
        let clamped = builtin().render_size("Hi", size, u32::MAX, Alignment::Center);
        let at_max = builtin().render_size("Hi", size, MAX_FONT_SIZE, Alignment::Center);
        assert_eq!(clamped.dimensions(), (673, 378));
        assert_eq!(clamped, at_max);
        assert!(ink_bounds(&clamped).is_some());
    }

    #[test]
    fn dots_off_the_canvas_are_skipped() {
        let mut label = RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]));
        let ink = Ink::Dots(vec![Rect {
            min_x: -1_000_000,
            min_y: -1_000_000,
            max_x: 2,
            max_y: 3,
        }]);
        ink.draw(&mut label, 0, 0);
        assert_eq!(
            ink_bounds(&label),
            Some(Rect {
                min_x: 0,
                min_y: 0,
                max_x: 2,
                max_y: 3
            })
        );
    }

    #[test]
    fn preview_is_png_data_url() {
        let label = builtin().render("Hi", "11354", 40, Alignment::Center).unwrap();
        let url = preview_data_url(&label).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let png = encode_png(&label).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded, label);
    }
}
