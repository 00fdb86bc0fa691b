//! Analysis configuration
//!
//! Loaded with a two-layer resolution:
//! 1. An explicit path (`--config` / `SPENDCAST_CONFIG`), or the override at
//!    ~/.local/share/spendcast/config.toml if it exists
//! 2. The embedded default (compiled into binary)
//!
//! Every section is `#[serde(default)]`, so a partial file only overrides
//! the keys it sets.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ai::NarrativeAnalysis;
use crate::error::{Error, Result};
use crate::forecast::ForecastPolicy;

const DEFAULT_CONFIG: &str = include_str!("../../../config/spendcast.toml");

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "SPENDCAST_CONFIG";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub forecast: ForecastPolicy,
    pub narrative: NarrativeConfig,
    pub report: ReportConfig,
}

/// Narrative request settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    /// Seconds to wait for the backend
    pub timeout_secs: u64,
    pub language: String,
    /// Used when the backend is absent or fails
    pub fallback: NarrativeAnalysis,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            language: "English".to_string(),
            fallback: NarrativeAnalysis {
                patterns: vec![
                    "Analysis unavailable".into(),
                    "Review the data".into(),
                    "Try again later".into(),
                ],
                anomalies: vec![
                    "The data could not be analyzed".into(),
                    "Running in fallback mode".into(),
                ],
                recommendations: vec!["Verify the data".into(), "Retry later".into()],
            },
        }
    }
}

impl NarrativeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub currency_symbol: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "€".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Resolve and load the configuration
    ///
    /// An explicit path must exist; the data-dir override is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let explicit = explicit.map(Path::to_path_buf).or(env_path);

        let content = match explicit {
            Some(path) => read_config(&path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => read_config(&path)?,
                None => DEFAULT_CONFIG.to_string(),
            },
        };

        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        self.forecast.validate()?;
        if self.narrative.timeout_secs == 0 {
            return Err(Error::Config(
                "narrative.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendcast").join("config.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    tracing::debug!(path = %path.display(), "Loading config");
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_matches_defaults() {
        let config = AnalysisConfig::from_toml_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = AnalysisConfig::from_toml_str(
            r#"
[forecast]
window = 6

[report]
currency_symbol = "$"
"#,
        )
        .unwrap();

        assert_eq!(config.forecast.window, 6);
        assert_eq!(config.forecast.z_score, 1.96);
        assert_eq!(config.report.currency_symbol, "$");
        assert_eq!(config.narrative, NarrativeConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            AnalysisConfig::from_toml_str("[forecast]\nwindow = 0\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_toml_str(
                "[forecast]\nmin_confidence = 0.9\nmax_confidence = 0.6\n"
            ),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_toml_str("[narrative]\ntimeout_secs = 0\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_toml_str("[forecast\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[narrative]\ntimeout_secs = 5\nlanguage = \"Spanish\"\n").unwrap();

        let config = AnalysisConfig::load(Some(&path)).unwrap();
        assert_eq!(config.narrative.timeout(), Duration::from_secs(5));
        assert_eq!(config.narrative.language, "Spanish");
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = AnalysisConfig::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AnalysisConfig::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("[forecast]"));
        assert_eq!(AnalysisConfig::from_toml_str(&text).unwrap(), config);
    }
}
