use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::batch::{self, TestBatch, DEFAULT_SEED};

/// Benchmark configuration.
///
/// # Configuration Locations
///
/// Loaded from the following files, later ones overriding earlier ones:
/// 1. Global `$HOME/.config/kmpbench/config.yaml`
/// 2. Local `.kmpbench.yaml` in the current directory
/// 3. Custom config file specified via `--config`
///
/// Command-line flags are applied last with [`BenchConfig::merge_with_cli`].
///
/// # Configuration Format
///
/// ```yaml
/// # Number of (pattern, text) pairs in the batch
/// test_count: 5000
///
/// # Characters per pattern and per text
/// pattern_length: 5
/// text_length: 10000
///
/// # Seed shared by every process so they all build the same batch
/// seed: 42
///
/// # Shared-memory pool size (default: CPU cores)
/// thread_count: 8
///
/// # Report file (default: stdout)
/// output: "res.out"
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "warn"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    #[serde(default = "default_test_count")]
    pub test_count: usize,

    #[serde(default = "default_pattern_length")]
    pub pattern_length: usize,

    #[serde(default = "default_text_length")]
    pub text_length: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Threads in the shared-memory pool
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Where run records are written; stdout when unset
    #[serde(default)]
    pub output: Option<PathBuf>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_test_count() -> usize {
    5000
}

fn default_pattern_length() -> usize {
    5
}

fn default_text_length() -> usize {
    10_000
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            test_count: default_test_count(),
            pattern_length: default_pattern_length(),
            text_length: default_text_length(),
            seed: default_seed(),
            thread_count: default_thread_count(),
            output: None,
            log_level: default_log_level(),
        }
    }
}

/// Values given on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub test_count: Option<usize>,
    pub pattern_length: Option<usize>,
    pub text_length: Option<usize>,
    pub seed: Option<u64>,
    pub thread_count: Option<NonZeroUsize>,
    pub output: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl BenchConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration, layering `config_path` over the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let defaults = [
            dirs::config_dir().map(|p| p.join("kmpbench/config.yaml")),
            Some(PathBuf::from(".kmpbench.yaml")),
        ];
        for path in defaults.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicit file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        builder.build()?.try_deserialize()
    }

    /// Applies command-line values on top of the loaded configuration
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        if let Some(count) = cli.test_count {
            self.test_count = count;
        }
        if let Some(len) = cli.pattern_length {
            self.pattern_length = len;
        }
        if let Some(len) = cli.text_length {
            self.text_length = len;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(threads) = cli.thread_count {
            self.thread_count = threads;
        }
        if cli.output.is_some() {
            self.output = cli.output;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self
    }

    /// Builds the batch this configuration describes
    pub fn generate_batch(&self) -> TestBatch {
        batch::generate_seeded(
            self.test_count,
            self.pattern_length,
            self.text_length,
            self.seed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let config_content = r#"
            test_count: 100
            pattern_length: 3
            text_length: 400
            seed: 7
            thread_count: 4
            output: "res.out"
            log_level: "debug"
        "#;

        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = BenchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.test_count, 100);
        assert_eq!(config.pattern_length, 3);
        assert_eq!(config.text_length, 400);
        assert_eq!(config.seed, 7);
        assert_eq!(config.thread_count, NonZeroUsize::new(4).unwrap());
        assert_eq!(config.output, Some(PathBuf::from("res.out")));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_default_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(b"test_count: 10\n").unwrap();

        let config = BenchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.test_count, 10);
        assert_eq!(config.pattern_length, 5);
        assert_eq!(config.text_length, 10_000);
        assert_eq!(config.seed, DEFAULT_SEED);
        assert_eq!(
            config.thread_count,
            NonZeroUsize::new(num_cpus::get()).unwrap()
        );
        assert_eq!(config.output, None);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_merge_with_cli() {
        let base = BenchConfig {
            test_count: 100,
            output: Some(PathBuf::from("file.out")),
            ..BenchConfig::default()
        };

        let merged = base.clone().merge_with_cli(CliOverrides {
            test_count: Some(12),
            seed: Some(99),
            thread_count: NonZeroUsize::new(2),
            ..CliOverrides::default()
        });
        assert_eq!(merged.test_count, 12); // CLI value
        assert_eq!(merged.seed, 99); // CLI value
        assert_eq!(merged.thread_count, NonZeroUsize::new(2).unwrap()); // CLI value
        assert_eq!(merged.output, Some(PathBuf::from("file.out"))); // File value
        assert_eq!(merged.pattern_length, base.pattern_length); // File value

        assert_eq!(base.clone().merge_with_cli(CliOverrides::default()), base);
    }

    #[test]
    fn test_generate_batch_uses_config() {
        let config = BenchConfig {
            test_count: 4,
            pattern_length: 2,
            text_length: 30,
            ..BenchConfig::default()
        };
        let batch = config.generate_batch();
        assert_eq!(batch.len(), 4);
        assert_eq!(batch, config.generate_batch());
        for case in batch.iter() {
            assert_eq!(case.pattern.len(), 2);
            assert_eq!(case.text.len(), 30);
        }
    }

    #[test]
    fn test_invalid_config() {
        let config_content = r#"
            test_count: "many"
            thread_count: 0
        "#;

        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        assert!(BenchConfig::load_from(Some(&config_path)).is_err());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = BenchConfig::load_from(Some(Path::new("nonexistent.yaml")));
        assert!(result.is_err());
    }
}
