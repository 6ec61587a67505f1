//! Error types for label rendering and printing.
//!
//! This module defines the errors a caller can see when rendering a label,
//! submitting it to the spooler, or validating a print request. Failures of
//! the recency file are kept inside the store and never reach the caller.

use thiserror::Error;

/// Main error type for label operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The label size code is not part of the catalog.
    ///
    /// This is a user input error and should be reported back as a client
    /// error.
    #[error("Unknown label size: {0}")]
    UnknownSize(String),

    #[error("Unknown alignment: {0}")]
    InvalidAlignment(String),

    #[error("No text provided")]
    EmptyText,

    #[error("Copies must be at least 1")]
    InvalidCopies,

    #[error("Font size must be between 1 and {max}, got {size}")]
    InvalidFontSize { size: u32, max: u32 },

    /// Submission to the print spooler failed.
    ///
    /// The spooler message is embedded so it can be shown to the user as is.
    #[error("Failed to print: {0}")]
    Spooler(#[from] SpoolerError),

    /// The spooler could not report the printer status.
    #[error("Failed to read printer status: {0}")]
    Status(SpoolerError),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Returns `true` when the error was caused by the request itself rather
    /// than by the printer or the host.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownSize(_)
                | Self::InvalidAlignment(_)
                | Self::EmptyText
                | Self::InvalidCopies
                | Self::InvalidFontSize { .. }
        )
    }
}

/// Errors reported by the print spooler.
#[derive(Error, Debug)]
pub enum SpoolerError {
    /// The spooler command could not be started at all.
    #[error("could not run {program}: {source}")]
    Launch {
        program: &'static str,
        source: std::io::Error,
    },

    /// The spooler ran but refused the request.
    #[error("{0}")]
    Rejected(String),

    #[error("unexpected spooler output: {0}")]
    UnexpectedOutput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Failures while reading or writing the recency file.
///
/// The store logs these and carries on with its in-memory list.
#[derive(Error, Debug)]
pub(crate) enum PersistenceError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array of saved labels")]
    NotAList,
}
