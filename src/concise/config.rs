use serde::Deserialize;
use std::fs;

use super::error::ConfigError;

pub const DEFAULT_COLUMN_WIDTH: usize = 15;

/// Rendering and parsing options, usually read from a JSON file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NotationConfig {
    /// Cells are padded to this many characters
    pub column_width: usize,
    /// Move sourced leech responses next to their trigger when rendering
    pub anchor_leeches: bool,
    /// Stop at the first cell that fails to decode
    pub strict: bool,
}

impl Default for NotationConfig {
    fn default() -> Self {
        NotationConfig {
            column_width: DEFAULT_COLUMN_WIDTH,
            anchor_leeches: true,
            strict: false,
        }
    }
}

impl NotationConfig {
    pub fn from_json(path: &str, json: &str) -> Result<Self, ConfigError> {
        let config: NotationConfig = serde_json::from_str(json).map_err(|source| ConfigError::Json {
            path: path.to_string(),
            source,
        })?;
        if config.column_width == 0 {
            return Err(ConfigError::ZeroColumnWidth);
        }
        Ok(config)
    }

    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        NotationConfig::from_json(path, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = NotationConfig::from_json("inline", r#"{"strict": true}"#).unwrap();
        assert_eq!(
            config,
            NotationConfig {
                column_width: DEFAULT_COLUMN_WIDTH,
                anchor_leeches: true,
                strict: true
            }
        );
    }

    #[test]
    fn test_rejects_zero_width() {
        assert!(matches!(
            NotationConfig::from_json("inline", r#"{"column_width": 0}"#),
            Err(ConfigError::ZeroColumnWidth)
        ));
        assert!(matches!(
            NotationConfig::from_json("inline", "not json"),
            Err(ConfigError::Json { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            NotationConfig::load("/nonexistent/concise.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
