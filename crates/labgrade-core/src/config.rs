//! Grading configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::fit::DEFAULT_MAX_EVALUATIONS;
use crate::formulas::{GAS_CONSTANT, TEMPERATURE_K};
use crate::validate::DEFAULT_TOLERANCE;

/// Top-level labgrade configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingConfig {
    /// Half-width of the accepted `student / reference` ratio band.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Gas constant used for osmotic potentials, MPa·L/(mol·K).
    #[serde(default = "default_gas_constant")]
    pub gas_constant: f64,
    /// Laboratory temperature in kelvin.
    #[serde(default = "default_temperature")]
    pub temperature_k: f64,
    /// Plasmolysis percentage at which the tissue potential is read.
    #[serde(default = "default_plasmolysis_threshold")]
    pub plasmolysis_threshold: f64,
    /// Germination percentage above which a seed lot is suitable.
    #[serde(default = "default_germination_threshold")]
    pub germination_threshold: f64,
    /// Evaluation budget for the logistic fit.
    #[serde(default = "default_max_evaluations")]
    pub sigmoid_max_evaluations: usize,
    /// Sheet whose presence identifies a lab-report workbook.
    #[serde(default = "default_marker_sheet")]
    pub marker_sheet: String,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}
fn default_gas_constant() -> f64 {
    GAS_CONSTANT
}
fn default_temperature() -> f64 {
    TEMPERATURE_K
}
fn default_plasmolysis_threshold() -> f64 {
    50.0
}
fn default_germination_threshold() -> f64 {
    80.0
}
fn default_max_evaluations() -> usize {
    DEFAULT_MAX_EVALUATIONS
}
fn default_marker_sheet() -> String {
    "INFO PAREJA".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./labgrade-results")
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            gas_constant: default_gas_constant(),
            temperature_k: default_temperature(),
            plasmolysis_threshold: default_plasmolysis_threshold(),
            germination_threshold: default_germination_threshold(),
            sigmoid_max_evaluations: default_max_evaluations(),
            marker_sheet: default_marker_sheet(),
            output_dir: default_output_dir(),
        }
    }
}

impl GradingConfig {
    /// Reject values that would make grading meaningless.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.tolerance > 0.0 && self.tolerance < 1.0,
            "tolerance must be between 0 and 1, got {}",
            self.tolerance
        );
        anyhow::ensure!(
            self.temperature_k > 0.0,
            "temperature_k must be positive, got {}",
            self.temperature_k
        );
        anyhow::ensure!(
            self.plasmolysis_threshold > 0.0 && self.plasmolysis_threshold < 100.0,
            "plasmolysis_threshold must be between 0 and 100, got {}",
            self.plasmolysis_threshold
        );
        anyhow::ensure!(
            self.sigmoid_max_evaluations > 0,
            "sigmoid_max_evaluations must be at least 1"
        );
        anyhow::ensure!(!self.marker_sheet.trim().is_empty(), "marker_sheet must not be empty");
        Ok(())
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `labgrade.toml` in the current directory
/// 2. `~/.config/labgrade/config.toml`
///
/// Environment variable overrides: `LABGRADE_TOLERANCE`, `LABGRADE_OUTPUT_DIR`.
pub fn load_config() -> Result<GradingConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GradingConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("labgrade.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<GradingConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GradingConfig::default(),
    };

    if let Ok(value) = std::env::var("LABGRADE_TOLERANCE") {
        config.tolerance = value
            .trim()
            .parse()
            .with_context(|| format!("LABGRADE_TOLERANCE is not a number: '{value}'"))?;
    }
    if let Ok(dir) = std::env::var("LABGRADE_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }

    config.validate()?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("labgrade"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = GradingConfig::default();
        assert_eq!(config.tolerance, 0.1);
        assert_eq!(config.marker_sheet, "INFO PAREJA");
        assert_eq!(config.sigmoid_max_evaluations, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: GradingConfig = toml::from_str("tolerance = 0.05\ntemperature_k = 298.0\n").unwrap();
        assert_eq!(config.tolerance, 0.05);
        assert_eq!(config.temperature_k, 298.0);
        assert_eq!(config.gas_constant, GAS_CONSTANT);
        assert_eq!(config.output_dir, PathBuf::from("./labgrade-results"));
    }

    #[test]
    fn default_config_roundtrips_through_toml() {
        let text = toml::to_string_pretty(&GradingConfig::default()).unwrap();
        let back: GradingConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, GradingConfig::default());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/labgrade.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_loaded_and_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labgrade.toml");
        std::fs::write(&path, "tolerance = 2.0\n").unwrap();
        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("tolerance"));

        std::fs::write(&path, "germination_threshold = 75.0\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.germination_threshold, 75.0);
    }
}
