//! Dymo Label Printing
//!
//! This crate renders short text onto Dymo label images and prints them
//! through CUPS, keeping a list of recently printed labels on disk.
//!
//! # Example
//!
//! ```rust,no_run
//! use dymo_label::{Alignment, Config, LabelRequest, LabelService};
//!
//! let config = Config::from_env();
//! let mut service = LabelService::from_config(&config);
//!
//! let request = LabelRequest::new("Hello")
//!     .label_size("11354")
//!     .align(Alignment::Center);
//! let receipt = service.print(&request).unwrap();
//! println!("{}", receipt.message);
//! ```

mod config;
mod error;
mod glyphs;
mod job;
mod media;
mod memory;
mod model;
mod render;
mod spooler;
mod utils;

pub use crate::{
    config::Config,
    error::{Error, SpoolerError},
    job::{LabelService, PrintReceipt, JOB_TITLE},
    media::{LabelSize, LabelSizeSpec},
    memory::{RecencyStore, SavedLabel},
    model::{Alignment, LabelRequest, SAMPLE_TEXT},
    render::{encode_png, preview_data_url, render, Renderer, EDGE_INSET},
    spooler::{CupsSpooler, JobId, PrinterState, PrinterStatus, Spooler},
    utils::{ink_bounds, mm_to_px, Rect},
};

/// Label size used when a request does not name one.
pub const DEFAULT_LABEL_SIZE: &str = "11354";

/// CUPS queue name of the label printer.
pub const DEFAULT_PRINTER_NAME: &str = "dymo";

/// Rendering resolution in dots per inch, the native resolution of the LabelWriter heads.
pub const DEFAULT_DPI: u32 = 300;

/// Font size in pixels used when a request does not name one.
pub const DEFAULT_FONT_SIZE: u32 = 40;

/// Largest accepted font size in pixels, a few times the height of the tallest label.
pub const MAX_FONT_SIZE: u32 = 1000;

/// Bold TrueType font tried first. The built-in bitmap font is used when it is missing.
pub const DEFAULT_FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";

/// Recency list file used when `LABEL_MEMORY_FILE` is not set.
pub const DEFAULT_MEMORY_FILE: &str = "saved_labels.json";
