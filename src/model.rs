use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Horizontal placement of the text block on the label.
///
/// Text is always centered vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Self::Center
    }
}

impl FromStr for Alignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            _ => Err(Error::InvalidAlignment(s.to_string())),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text shown by a preview whose form has no text field at all.
pub const SAMPLE_TEXT: &str = "Sample Text";

/// One label to preview or print.
///
/// Field names follow the JSON payload of the label web form, and missing
/// fields take the same defaults as the form. A missing `text` is empty,
/// which is what printing wants; previews use [`LabelRequest::preview_from_json`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelRequest {
    pub text: String,
    pub label_size: String,
    pub font_size: u32,
    pub align: Alignment,
    pub copies: u32,
}

impl LabelRequest {
    pub fn new(text: impl Into<String>) -> Self {
        LabelRequest {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Parse a preview payload. Missing `text` becomes [`SAMPLE_TEXT`], an
    /// explicitly empty one stays empty.
    pub fn preview_from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(fields) = value.as_object_mut() {
            fields
                .entry("text")
                .or_insert_with(|| serde_json::Value::from(SAMPLE_TEXT));
        }
        serde_json::from_value(value)
    }

    pub fn label_size(self, code: impl Into<String>) -> Self {
        LabelRequest {
            label_size: code.into(),
            ..self
        }
    }

    pub fn font_size(self, font_size: u32) -> Self {
        LabelRequest { font_size, ..self }
    }

    pub fn align(self, align: Alignment) -> Self {
        LabelRequest { align, ..self }
    }

    pub fn copies(self, copies: u32) -> Self {
        LabelRequest { copies, ..self }
    }
}

impl Default for LabelRequest {
    fn default() -> Self {
        LabelRequest {
            text: String::new(),
            label_size: crate::DEFAULT_LABEL_SIZE.to_string(),
            font_size: crate::DEFAULT_FONT_SIZE,
            align: Alignment::Center,
            copies: 1,
        }
    }
}
