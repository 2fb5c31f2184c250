//! Validator configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::backend::BackendKind;
use crate::error::ConfigError;

/// Where the model artifacts live, which backend reads them, and how a model
/// score is turned into a yes/no answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Backend identifier (`mlp` or `knn`)
    pub backend: String,
    /// Model file
    pub model_path: PathBuf,
    /// Scaler file fitted alongside the model
    pub scaler_path: PathBuf,
    /// A score strictly above this counts as "forms a triangle"
    pub threshold: f64,
}

/// Named thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdProfile {
    #[default]
    Standard,
    Strict,
}

impl ThresholdProfile {
    pub fn threshold(self) -> f64 {
        match self {
            ThresholdProfile::Standard => 0.5,
            ThresholdProfile::Strict => 0.9,
        }
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default().to_string(),
            model_path: PathBuf::from(BackendKind::default().default_model_path()),
            scaler_path: PathBuf::from("models/scaler.json"),
            threshold: ThresholdProfile::Standard.threshold(),
        }
    }
}

impl ValidatorConfig {
    /// Checks every field and returns the parsed backend.
    pub fn validate(&self) -> Result<BackendKind, ConfigError> {
        let kind = self.backend.parse::<BackendKind>()?;
        if !self.threshold.is_finite() || !(0.0..1.0).contains(&self.threshold) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        Ok(kind)
    }

    pub fn with_profile(mut self, profile: ThresholdProfile) -> Self {
        self.threshold = profile.threshold();
        self
    }

    /// Anchors relative artifact paths at `root`. Absolute paths are kept.
    pub fn resolve_paths(mut self, root: &Path) -> Self {
        if self.model_path.is_relative() {
            self.model_path = root.join(&self.model_path);
        }
        if self.scaler_path.is_relative() {
            self.scaler_path = root.join(&self.scaler_path);
        }
        self
    }

    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<(), crate::Error> {
        let content = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
