use img_viewer_protocol::ThemeToken;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("min_zoom ({min}) must be below max_zoom ({max})")]
    ZoomRange { min: f64, max: f64 },
    #[error("zoom_increment must be greater than 1, got {0}")]
    Increment(f64),
    #[error("pinch_threshold must not be negative, got {0}")]
    Threshold(f64),
}

/// Tunables for the viewport controller.
///
/// Every field has a default, so a partial JSON object such as
/// `{"max_zoom": 4.0}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Zoom-out steps that would land at or below this are rejected.
    pub min_zoom: f64,
    /// Zoom-in steps that would land at or above this are rejected.
    pub max_zoom: f64,
    /// Multiplier applied per zoom step.
    pub zoom_increment: f64,
    /// Pinch distance changes at or below this magnitude are noise.
    pub pinch_threshold: f64,
    pub background: ThemeToken,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.2,
            max_zoom: 1.4,
            zoom_increment: 1.1,
            pinch_threshold: 0.002,
            background: ThemeToken::Background,
        }
    }
}

impl ViewerConfig {
    /// Parse a JSON configuration and validate it.
    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("min_zoom", self.min_zoom),
            ("max_zoom", self.max_zoom),
            ("zoom_increment", self.zoom_increment),
            ("pinch_threshold", self.pinch_threshold),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }
        if self.min_zoom >= self.max_zoom {
            return Err(ConfigError::ZoomRange {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        if self.zoom_increment <= 1.0 {
            return Err(ConfigError::Increment(self.zoom_increment));
        }
        if self.pinch_threshold < 0.0 {
            return Err(ConfigError::Threshold(self.pinch_threshold));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_viewer_constants() {
        let c = ViewerConfig::default();
        assert_eq!(c.min_zoom, 0.2);
        assert_eq!(c.max_zoom, 1.4);
        assert_eq!(c.zoom_increment, 1.1);
        assert_eq!(c.pinch_threshold, 0.002);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let c = ViewerConfig::from_json(br#"{"max_zoom": 8.0}"#).unwrap();
        assert_eq!(c.max_zoom, 8.0);
        assert_eq!(c.min_zoom, 0.2);
    }

    #[test]
    fn rejects_inverted_range() {
        let err = ViewerConfig::from_json(br#"{"min_zoom": 2.0, "max_zoom": 1.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZoomRange { .. }));
    }

    #[test]
    fn rejects_shrinking_increment() {
        let err = ViewerConfig::from_json(br#"{"zoom_increment": 0.9}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Increment(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            ViewerConfig::from_json(b"{not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
