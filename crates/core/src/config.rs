//! JSON settings for hosts embedding the drawing engine.
//!
//! Everything is optional in the file; missing fields take defaults.
//!
//! ```json
//! {
//!   "logging": { "level": "warn", "categories": { "blit": "trace" } },
//!   "palette": ["#1a1c2c", "#5d275d", "..."],
//!   "blit_segment": 2
//! }
//! ```

use crate::logging::{log, LogCategory, LogConfig, LogLevel, ParseLogError};
use crate::ppu::palette::{DEFAULT_PALETTE, PALETTE_BYTES, PALETTE_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Logging(#[from] ParseLogError),
    #[error("invalid colour {0:?}, expected #rrggbb")]
    BadColor(String),
    #[error("palette must have 16 colours, found {0}")]
    PaletteSize(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Global level name ("off", "warn", "trace", ...)
    pub level: String,
    /// Per-category overrides, category name -> level name
    pub categories: BTreeMap<String, String>,
    /// Messages per second per category
    pub rate_limit: usize,
    /// Write to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "off".to_string(),
            categories: BTreeMap::new(),
            rate_limit: 60,
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: LogSettings,
    /// 16 display colours as `#rrggbb`
    pub palette: Vec<String>,
    /// Initial tilesheet segment selector
    pub blit_segment: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            logging: LogSettings::default(),
            palette: DEFAULT_PALETTE
                .chunks_exact(3)
                .map(|rgb| format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2]))
                .collect(),
            blit_segment: 2,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load settings, falling back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log(LogCategory::Memory, LogLevel::Warn, || {
                    format!("settings {}: {}. Using defaults.", path.display(), e)
                });
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Push levels, rate limit and log file into the global `LogConfig`.
    pub fn apply_logging(&self) -> Result<(), ConfigError> {
        let config = LogConfig::global();
        config.set_global_level(self.logging.level.parse()?);
        for (name, level) in &self.logging.categories {
            config.set_level(name.parse::<LogCategory>()?, level.parse()?);
        }
        config.set_rate_limit(self.logging.rate_limit);
        match &self.logging.file {
            Some(path) => config.set_log_file(path.clone())?,
            None => config.clear_log_file(),
        }
        Ok(())
    }

    /// Decode `palette` into palette memory layout.
    pub fn palette_rgb(&self) -> Result<[u8; PALETTE_BYTES], ConfigError> {
        if self.palette.len() != PALETTE_SIZE {
            return Err(ConfigError::PaletteSize(self.palette.len()));
        }

        let mut out = [0u8; PALETTE_BYTES];
        for (rgb, text) in out.chunks_exact_mut(3).zip(&self.palette) {
            let value = parse_hex_color(text).ok_or_else(|| ConfigError::BadColor(text.clone()))?;
            rgb.copy_from_slice(&value);
        }
        Ok(out)
    }
}

fn parse_hex_color(text: &str) -> Option<[u8; 3]> {
    let hex = text.strip_prefix('#').unwrap_or(text);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_roundtrip_palette() {
        let settings = Settings::default();
        assert_eq!(settings.palette.len(), 16);
        assert_eq!(settings.palette[0], "#1a1c2c");
        assert_eq!(settings.palette_rgb().unwrap(), DEFAULT_PALETTE);
        assert_eq!(settings.blit_segment, 2);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "blit_segment": 4 }"#).unwrap();
        assert_eq!(settings.blit_segment, 4);
        assert_eq!(settings.logging, LogSettings::default());
        assert_eq!(settings.palette.len(), 16);
    }

    #[test]
    fn test_nested_logging_fields() {
        let settings = Settings::from_json(
            r#"{ "logging": { "level": "warn", "categories": { "blit": "trace" }, "rate_limit": 5 } }"#,
        )
        .unwrap();
        assert_eq!(settings.logging.level, "warn");
        assert_eq!(settings.logging.categories["blit"], "trace");
        assert_eq!(settings.logging.rate_limit, 5);
        assert!(settings.logging.file.is_none());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_bad_palette_entries() {
        let mut settings = Settings::default();
        settings.palette[3] = "#12345".to_string();
        assert!(matches!(settings.palette_rgb(), Err(ConfigError::BadColor(c)) if c == "#12345"));

        settings.palette.truncate(4);
        assert!(matches!(settings.palette_rgb(), Err(ConfigError::PaletteSize(4))));
    }

    #[test]
    fn test_hex_parsing_accepts_missing_hash() {
        assert_eq!(parse_hex_color("ff8000"), Some([0xFF, 0x80, 0x00]));
        assert_eq!(parse_hex_color("#FF8000"), Some([0xFF, 0x80, 0x00]));
        assert_eq!(parse_hex_color("#gg0000"), None);
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let mut settings = Settings::default();
        settings
            .logging
            .categories
            .insert("audio".to_string(), "info".to_string());
        assert!(matches!(settings.apply_logging(), Err(ConfigError::Logging(_))));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load_or_default(Path::new("/nonexistent/fc-settings.json"));
        assert_eq!(settings, Settings::default());
    }
}
