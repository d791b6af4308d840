//! Configuration file for the uniqhash tools
//!
//! Stored as JSON. Missing fields fall back to their defaults, so a file
//! containing only `{"algorithm": "blake3"}` is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::algorithm::{
    DigestAlgorithm, GeneratorConfig, OsEntropy, SystemClock, UniqueHashGenerator,
};

/// Default interval between background purges of expired tokens
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 1_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File I/O error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] uniqhash_core::Error),

    #[error("Config already exists at {}. Use --force to overwrite it.", .0.display())]
    AlreadyExists(PathBuf),
}

/// Values given on the command line; `None` keeps the file value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub algorithm: Option<DigestAlgorithm>,
    pub window_ms: Option<u64>,
    pub random_bound: Option<u32>,
    /// `Some(0)` removes the retry cap
    pub max_attempts: Option<u32>,
}

/// Generator built from an [`AppConfig`]
pub type ConfiguredGenerator = UniqueHashGenerator<DigestAlgorithm, SystemClock, OsEntropy>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Window, suffix range and retry cap
    pub generator: GeneratorConfig,
    /// Digest applied to accepted tokens
    pub algorithm: DigestAlgorithm,
    /// How often the background sweeper purges expired tokens
    pub sweep_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            algorithm: DigestAlgorithm::default(),
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
        }
    }
}

impl AppConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator.validate()?;
        if self.sweep_interval_ms == 0 {
            return Err(uniqhash_core::Error::InvalidConfig(
                "sweep_interval_ms must be positive".into(),
            )
            .into());
        }
        Ok(())
    }

    /// Replace file values with the ones set in `overrides`, then validate
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(algorithm) = overrides.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(window_ms) = overrides.window_ms {
            self.generator.window_ms = window_ms;
        }
        if let Some(bound) = overrides.random_bound {
            self.generator.random_bound = bound;
        }
        if let Some(max) = overrides.max_attempts {
            self.generator.max_attempts = if max == 0 { None } else { Some(max) };
        }
        self.validate()
    }

    /// Build a generator using the configured algorithm, the system clock
    /// and OS entropy
    pub fn build_generator(&self) -> Result<ConfiguredGenerator, ConfigError> {
        self.validate()?;
        let generator = UniqueHashGenerator::from_parts(
            self.generator.clone(),
            self.algorithm,
            SystemClock::new(),
            OsEntropy,
        )?;
        Ok(generator)
    }

    /// Save config as pretty JSON
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Write the default config to `path`.
    ///
    /// An existing file is only replaced when `force` is set.
    pub fn write_default(path: &Path, force: bool) -> Result<Self, ConfigError> {
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        let config = AppConfig::default();
        config.save_to_file(path)?;
        Ok(config)
    }

    /// Load and validate config from a file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

/// Get the default config file path
#[cfg(feature = "cli")]
pub fn default_config_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".uniqhash").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("uniqhash-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("roundtrip.json");
        let config = AppConfig {
            algorithm: DigestAlgorithm::Blake3,
            sweep_interval_ms: 250,
            ..AppConfig::default()
        };

        config.save_to_file(&path).unwrap();
        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"generator": {"window_ms": 5000}}"#).unwrap();

        assert_eq!(config.generator.window_ms, 5000);
        assert_eq!(
            config.generator.random_bound,
            uniqhash_core::DEFAULT_RANDOM_BOUND
        );
        assert_eq!(config.algorithm, DigestAlgorithm::Sha256);
        assert_eq!(config.sweep_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_values_rejected_on_load() {
        let path = temp_path("invalid.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"generator": {"random_bound": 0}}"#).unwrap();

        let result = AppConfig::load_from_file(&path);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_malformed_json_rejected() {
        let path = temp_path("malformed.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            AppConfig::load_from_file(&path),
            Err(ConfigError::Parse(_))
        ));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = AppConfig::load_from_file(&temp_path("does-not-exist.json"));
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }

    #[test]
    fn test_build_generator_uses_algorithm() {
        let config = AppConfig {
            algorithm: DigestAlgorithm::Blake3,
            ..AppConfig::default()
        };
        let generator = config.build_generator().unwrap();

        assert_eq!(*generator.hasher(), DigestAlgorithm::Blake3);
        assert_eq!(
            generator.generate().unwrap().len(),
            uniqhash_core::DIGEST_HEX_LEN
        );
    }

    #[test]
    fn test_zero_sweep_interval_rejected() {
        let config = AppConfig {
            sweep_interval_ms: 0,
            ..AppConfig::default()
        };
        assert!(config.build_generator().is_err());
    }

    #[test]
    fn test_max_attempts_override() {
        let mut config = AppConfig::default();

        let disable = ConfigOverrides {
            max_attempts: Some(0),
            ..ConfigOverrides::default()
        };
        config.apply_overrides(&disable).unwrap();
        assert_eq!(config.generator.max_attempts, None);

        let cap = ConfigOverrides {
            max_attempts: Some(5),
            ..ConfigOverrides::default()
        };
        config.apply_overrides(&cap).unwrap();
        assert_eq!(config.generator.max_attempts, Some(5));
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let path = temp_path("overrides.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"{"algorithm": "blake3", "generator": {"window_ms": 5000, "random_bound": 50}}"#,
        )
        .unwrap();

        let mut config = AppConfig::load_from_file(&path).unwrap();
        let overrides = ConfigOverrides {
            algorithm: Some(DigestAlgorithm::Sha256),
            window_ms: Some(1_000),
            ..ConfigOverrides::default()
        };
        config.apply_overrides(&overrides).unwrap();

        assert_eq!(config.algorithm, DigestAlgorithm::Sha256);
        assert_eq!(config.generator.window_ms, 1_000);
        // Not overridden: kept from the file
        assert_eq!(config.generator.random_bound, 50);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let mut config = AppConfig {
            algorithm: DigestAlgorithm::Blake3,
            ..AppConfig::default()
        };
        let before = config.clone();
        config.apply_overrides(&ConfigOverrides::default()).unwrap();
        assert_eq!(config, before);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let mut config = AppConfig::default();
        let overrides = ConfigOverrides {
            random_bound: Some(0),
            ..ConfigOverrides::default()
        };
        assert!(matches!(
            config.apply_overrides(&overrides),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_write_default_refuses_existing_file() {
        let path = temp_path("existing.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"algorithm": "blake3"}"#).unwrap();

        let result = AppConfig::write_default(&path, false);
        assert!(matches!(result, Err(ConfigError::AlreadyExists(_))));
        // Untouched
        assert_eq!(
            AppConfig::load_from_file(&path).unwrap().algorithm,
            DigestAlgorithm::Blake3
        );

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_write_default_force_overwrites() {
        let path = temp_path("forced.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"algorithm": "blake3"}"#).unwrap();

        let written = AppConfig::write_default(&path, true).unwrap();
        assert_eq!(written, AppConfig::default());
        assert_eq!(AppConfig::load_from_file(&path).unwrap(), AppConfig::default());

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_write_default_creates_new_file() {
        let path = temp_path("fresh/config.json");
        fs::remove_file(&path).ok();

        AppConfig::write_default(&path, false).unwrap();
        assert!(path.exists());

        fs::remove_file(&path).ok();
    }
}
