use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::schedule::{ExampleCounts, ScheduleManager, ScheduleParams};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Training length, eval cadence and accelerator settings
    #[serde(default)]
    pub schedule: ScheduleParams,
    /// Example counts per dataset split
    #[serde(default)]
    pub dataset: ExampleCounts,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> std::result::Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let defaults = ScheduleParams::default();
        let counts = ExampleCounts::default();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("schedule.steps_between_evals", defaults.steps_between_evals)?
            .set_default("schedule.epochs_between_evals", defaults.epochs_between_evals)?
            .set_default("schedule.default_train_epochs", defaults.default_train_epochs)?
            .set_default("schedule.shard_count", defaults.shard_count)?
            .set_default("dataset.train", counts.train)?
            .set_default("dataset.eval", counts.eval)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("TRAIN_SCHEDULE_ENV")
                        .unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (TRAIN_SCHEDULE__SCHEDULE__TRAIN_STEPS, etc.)
            .add_source(
                Environment::with_prefix("TRAIN_SCHEDULE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate the schedule section and resolve it
    pub fn build_manager(&self) -> Result<ScheduleManager> {
        ScheduleManager::new(&self.schedule, self.dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::AcceleratorMode;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "train-schedule-config-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_defaults_without_files() {
        let dir = scratch_dir("empty");
        let config = AppConfig::load_from(&dir).unwrap();

        assert_eq!(config.schedule, ScheduleParams::default());
        assert_eq!(config.dataset, ExampleCounts::WMT_ENDE);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);

        let manager = config.build_manager().unwrap();
        assert_eq!(manager.train_eval_iterations(), 10);
        assert_eq!(manager.train_increment_label(), "1 epochs.");
    }

    #[test]
    fn test_default_toml_is_layered() {
        let dir = scratch_dir("layered");
        fs::write(
            dir.join("default.toml"),
            r#"
[schedule]
train_epochs = 4
epochs_between_evals = 2
batch_size = 2048
max_sequence_length = 64
accelerator = "fixed_step"

[dataset]
train = 100000
eval = 3000
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&dir).unwrap();
        assert_eq!(config.schedule.accelerator, AcceleratorMode::FixedStep);
        assert_eq!(config.schedule.shard_count, 8);
        assert_eq!(config.schedule.cooldown_secs, 60);

        let manager = config.build_manager().unwrap();
        assert_eq!(manager.train_increment_label(), "~2 epochs. (6250 steps)");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_schedule_surfaces_on_build() {
        let config = AppConfig {
            schedule: ScheduleParams {
                train_steps: Some(100),
                train_epochs: Some(1),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.build_manager().is_err());
    }
}
