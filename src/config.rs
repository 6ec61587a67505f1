use log::warn;
use std::env;
use std::path::{Path, PathBuf};

pub const ENV_PRINTER: &str = "LABEL_PRINTER";
pub const ENV_MEMORY_FILE: &str = "LABEL_MEMORY_FILE";
pub const ENV_FONT_PATH: &str = "LABEL_FONT_PATH";
pub const ENV_DPI: &str = "LABEL_DPI";

/// Runtime settings shared by the renderer, the spooler and the recency store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    printer_name: String,
    memory_file: PathBuf,
    font_path: PathBuf,
    dpi: u32,
}

impl Config {
    /// Initialize configuration data with default values.
    ///
    /// # Example
    ///
    /// ```
    /// use dymo_label::Config;
    ///
    /// let config = Config::new().printer_name("dymo450").dpi(300);
    /// assert_eq!(config.get_printer_name(), "dymo450");
    /// ```
    pub fn new() -> Config {
        Config {
            printer_name: crate::DEFAULT_PRINTER_NAME.to_string(),
            memory_file: PathBuf::from(crate::DEFAULT_MEMORY_FILE),
            font_path: PathBuf::from(crate::DEFAULT_FONT_PATH),
            dpi: crate::DEFAULT_DPI,
        }
    }

    /// Defaults overridden by `LABEL_PRINTER`, `LABEL_MEMORY_FILE`,
    /// `LABEL_FONT_PATH` and `LABEL_DPI` when they are set.
    pub fn from_env() -> Config {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Config {
        let mut config = Config::new();

        if let Some(name) = lookup(ENV_PRINTER) {
            config = config.printer_name(name);
        }
        if let Some(path) = lookup(ENV_MEMORY_FILE) {
            config = config.memory_file(path);
        }
        if let Some(path) = lookup(ENV_FONT_PATH) {
            config = config.font_path(path);
        }
        if let Some(raw) = lookup(ENV_DPI) {
            match raw.trim().parse::<u32>() {
                Ok(dpi) if dpi > 0 => config = config.dpi(dpi),
                _ => warn!("ignoring invalid {}={:?}", ENV_DPI, raw),
            }
        }

        config
    }

    pub fn printer_name(self, name: impl Into<String>) -> Self {
        Config {
            printer_name: name.into(),
            ..self
        }
    }

    pub fn memory_file(self, path: impl Into<PathBuf>) -> Self {
        Config {
            memory_file: path.into(),
            ..self
        }
    }

    pub fn font_path(self, path: impl Into<PathBuf>) -> Self {
        Config {
            font_path: path.into(),
            ..self
        }
    }

    pub fn dpi(self, dpi: u32) -> Self {
        Config { dpi, ..self }
    }

    pub fn get_printer_name(&self) -> &str {
        &self.printer_name
    }

    pub fn get_memory_file(&self) -> &Path {
        &self.memory_file
    }

    pub fn get_font_path(&self) -> &Path {
        &self.font_path
    }

    pub fn get_dpi(&self) -> u32 {
        self.dpi
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = Config::new();
        assert_eq!(config.get_printer_name(), "dymo");
        assert_eq!(config.get_memory_file(), Path::new("saved_labels.json"));
        assert_eq!(config.get_dpi(), 300);
    }

    #[test]
    fn environment_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            (ENV_PRINTER, "office"),
            (ENV_MEMORY_FILE, "/tmp/labels.json"),
            (ENV_DPI, "600"),
        ]
        .iter()
        .cloned()
        .collect();

        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.get_printer_name(), "office");
        assert_eq!(config.get_memory_file(), Path::new("/tmp/labels.json"));
        assert_eq!(config.get_font_path(), Path::new(crate::DEFAULT_FONT_PATH));
        assert_eq!(config.get_dpi(), 600);
    }

    #[test]
    fn invalid_dpi_keeps_default() {
        let config = Config::from_lookup(|key| {
            if key == ENV_DPI {
                Some("zero".to_string())
            } else {
                None
            }
        });
        assert_eq!(config.get_dpi(), crate::DEFAULT_DPI);
    }
}
