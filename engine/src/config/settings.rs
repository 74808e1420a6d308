// Dashboard settings, embedded from assets/config/default.json and optionally
// overridden by a user JSON file. Missing keys fall back to the defaults.
use std::path::Path;

use serde::Deserialize;
use shared::Field;

use crate::error::EngineError;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardSettings {
    pub version: String,
    pub sentiment: SentimentSettings,
    pub rankings: RankingLimits,
    pub metrics: MetricsSettings,
    pub data: DataSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SentimentSettings {
    /// Field the canonical positive/negative rule reads (`Teor` or `Avaliação`).
    pub field: Field,
}

/// "Top N" limits applied after the chart data is sorted.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RankingLimits {
    pub vehicles: usize,
    pub vehicles_by_vmn: usize,
    pub themes: usize,
    pub sources: usize,
    pub states: usize,
    pub states_by_vmn: usize,
    pub distribution_vehicles: usize,
    pub distribution_states: usize,
    pub cross: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MetricsSettings {
    pub audience_multiplier: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DataSettings {
    pub csv_delimiter: String, // Should be a single byte, but JSON string is easier
}

impl Default for DashboardSettings {
    fn default() -> Self {
        DashboardSettings {
            version: "1.0.0".to_string(),
            sentiment: SentimentSettings::default(),
            rankings: RankingLimits::default(),
            metrics: MetricsSettings::default(),
            data: DataSettings::default(),
        }
    }
}

impl Default for SentimentSettings {
    fn default() -> Self {
        SentimentSettings { field: Field::Teor }
    }
}

impl Default for RankingLimits {
    fn default() -> Self {
        RankingLimits {
            vehicles: 15,
            vehicles_by_vmn: 15,
            themes: 15,
            sources: 15,
            states: 15,
            states_by_vmn: 10,
            distribution_vehicles: 15,
            distribution_states: 10,
            cross: 10,
        }
    }
}

impl Default for MetricsSettings {
    fn default() -> Self {
        MetricsSettings { audience_multiplier: 10.5 }
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        DataSettings { csv_delimiter: ";".to_string() }
    }
}

impl DashboardSettings {
    pub fn load_default() -> Result<Self, EngineError> {
        let config_str = include_str!("../../assets/config/default.json");
        Self::from_json(config_str)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, EngineError> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| {
                EngineError::ConfigError(format!("Failed to read '{}': {}", path.display(), e))
            })?;
        let settings = Self::from_json(&config_str)?;
        tracing::info!(
            path = %path.display(),
            version = %settings.version,
            "Loaded dashboard settings"
        );
        Ok(settings)
    }

    fn from_json(config_str: &str) -> Result<Self, EngineError> {
        let settings: DashboardSettings = serde_json::from_str(config_str)
            .map_err(|e| EngineError::ConfigError(format!("Invalid settings JSON: {}", e)))?;
        settings.csv_delimiter()?;
        Ok(settings)
    }

    pub fn csv_delimiter(&self) -> Result<u8, EngineError> {
        match self.data.csv_delimiter.as_bytes() {
            [byte] => Ok(*byte),
            _ => Err(EngineError::ConfigError(format!(
                "csv_delimiter must be a single ASCII character, got '{}'",
                self.data.csv_delimiter
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_embedded_defaults_match_default_impl() {
        let embedded = DashboardSettings::load_default().unwrap();
        assert_eq!(embedded, DashboardSettings::default());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        let content = r#"{ "sentiment": { "field": "Avaliação" }, "rankings": { "themes": 5 } }"#;
        writeln!(file, "{}", content).unwrap();
        let settings = DashboardSettings::load_from_file(file.path()).unwrap();
        assert_eq!(settings.sentiment.field, Field::Avaliacao);
        assert_eq!(settings.rankings.themes, 5);
        assert_eq!(settings.rankings.vehicles, 15);
        assert_eq!(settings.metrics.audience_multiplier, 10.5);
    }

    #[test]
    fn test_unknown_sentiment_field_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "sentiment": {{ "field": "Humor" }} }}"#).unwrap();
        let err = DashboardSettings::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
        assert!(err.to_string().contains("Humor"));
    }

    #[test]
    fn test_bad_delimiter_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "data": {{ "csv_delimiter": ";;" }} }}"#).unwrap();
        assert!(DashboardSettings::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = DashboardSettings::load_from_file(Path::new("does/not/exist.json")).unwrap_err();
        assert!(err.to_string().contains("Configuration error"));
    }
}
