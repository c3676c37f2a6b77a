//! Store configuration.

use serde::{Deserialize, Serialize};

/// Tunables for element creation and editing.
///
/// Every field has a default, so a partial JSON object (or `{}`) is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// Offset applied to both axes by `duplicate`. Default: **10**.
    pub duplicate_offset: f64,

    /// Smallest width/height a resize gesture may produce. Default: **5**.
    pub min_transform_size: f64,

    /// Position of freshly created elements. Default: **(50, 50)**.
    pub default_position: (f64, f64),

    /// Flattening tolerance for curved clip paths. Default: **0.1**.
    pub clip_tolerance: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            duplicate_offset: 10.0,
            min_transform_size: 5.0,
            default_position: (50.0, 50.0),
            clip_tolerance: 0.1,
        }
    }
}

impl StoreConfig {
    /// Parse a JSON configuration object.
    ///
    /// # Errors
    /// Returns the `serde_json` error if the input is not a valid object.
    /// Arrays are rejected even though serde would map them positionally.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom("store config must be a JSON object"));
        }
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = StoreConfig::from_json(r#"{ "duplicateOffset": 20 }"#).unwrap();
        assert_eq!(config.duplicate_offset, 20.0);
        assert_eq!(config.min_transform_size, 5.0);
        assert_eq!(config.default_position, (50.0, 50.0));
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(StoreConfig::from_json("{}").unwrap(), StoreConfig::default());
    }

    #[test]
    fn non_object_config_is_rejected() {
        assert!(StoreConfig::from_json("[1, 2]").is_err());
        assert!(StoreConfig::from_json("5").is_err());
        assert!(StoreConfig::from_json("null").is_err());
    }
}
