use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ErrorContext, GridflowError, GridflowResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridflowConfig {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Which extracted row, if any, becomes the header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderPolicy {
    #[default]
    FirstRow,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Ancestors visited above the hovered element
    pub max_ancestor_depth: usize,

    /// Selected region must be wider and taller than this (px)
    pub min_size_px: f32,

    /// Similarity heuristic only runs above this many children
    pub similarity_min_children: usize,

    /// Children sampled by the similarity heuristic
    pub similarity_sample: usize,

    /// Share of the sample that must repeat a tag or class
    pub similarity_ratio: f32,

    /// Rows (or children) a candidate needs more than
    pub min_rows: usize,

    pub header_policy: HeaderPolicy,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_ancestor_depth: 4,
            min_size_px: 20.0,
            similarity_min_children: 3,
            similarity_sample: 10,
            similarity_ratio: 0.7,
            min_rows: 2,
            header_policy: HeaderPolicy::FirstRow,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Re-run the classifier on the pending target before extracting
    pub revalidate_on_click: bool,

    /// Mask PII in extracted tables before they reach the panel
    pub anonymize: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub log_dir: PathBuf,
    pub enable_file_logging: bool,
    pub enable_json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            enable_file_logging: false,
            enable_json_format: false,
        }
    }
}

impl GridflowConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> GridflowResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).with_path(&path.to_string_lossy())?;

        let config: GridflowConfig = toml::from_str(&content)
            .map_err(|e| GridflowError::configuration(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Override fields from `GRIDFLOW_*` environment variables. Unparseable
    /// values are ignored.
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var("GRIDFLOW_MAX_DEPTH") {
            if let Ok(depth) = value.parse::<usize>() {
                self.detection.max_ancestor_depth = depth;
            }
        }

        if let Ok(value) = std::env::var("GRIDFLOW_MIN_SIZE_PX") {
            if let Ok(px) = value.parse::<f32>() {
                self.detection.min_size_px = px;
            }
        }

        if let Ok(value) = std::env::var("GRIDFLOW_SIMILARITY_RATIO") {
            if let Ok(ratio) = value.parse::<f32>() {
                self.detection.similarity_ratio = ratio;
            }
        }

        if let Ok(value) = std::env::var("GRIDFLOW_REVALIDATE_ON_CLICK") {
            self.session.revalidate_on_click = value.to_lowercase() == "true";
        }

        if let Ok(level) = std::env::var("GRIDFLOW_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> GridflowResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| GridflowError::configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).with_path(&path.to_string_lossy())?;
        Ok(())
    }

    pub fn validate(&self) -> GridflowResult<()> {
        let ratio = self.detection.similarity_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(GridflowError::configuration(format!(
                "similarity_ratio must be in (0, 1], got {}",
                ratio
            )));
        }
        if self.detection.similarity_sample == 0 {
            return Err(GridflowError::configuration("similarity_sample must be at least 1"));
        }
        if self.detection.min_size_px < 0.0 {
            return Err(GridflowError::configuration("min_size_px cannot be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = GridflowConfig::default();
        assert_eq!(config.detection.max_ancestor_depth, 4);
        assert_eq!(config.detection.similarity_ratio, 0.7);
        assert_eq!(config.detection.header_policy, HeaderPolicy::FirstRow);
        assert!(!config.session.revalidate_on_click);
        assert!(!config.session.anonymize);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = GridflowConfig::default();
        config.detection.min_size_px = 32.0;
        config.detection.header_policy = HeaderPolicy::None;
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("gridflow.toml");

        config.save_to_file(&config_path).unwrap();

        let loaded_config = GridflowConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded_config.detection.min_size_px, 32.0);
        assert_eq!(loaded_config.detection.header_policy, HeaderPolicy::None);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("partial.toml");
        fs::write(&config_path, "[session]\nrevalidate_on_click = true\n").unwrap();

        let config = GridflowConfig::load_from_file(&config_path).unwrap();
        assert!(config.session.revalidate_on_click);
        assert_eq!(config.detection.similarity_sample, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_ratio_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        fs::write(&config_path, "[detection]\nsimilarity_ratio = 1.5\n").unwrap();

        let err = GridflowConfig::load_from_file(&config_path).unwrap_err();
        assert!(matches!(err, GridflowError::Configuration { .. }));
    }
}
