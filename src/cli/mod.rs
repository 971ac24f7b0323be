//! train-schedule CLI
//!
//! Commands:
//! - `train-schedule plan` - Resolve and print the train/eval schedule
//! - `train-schedule dry-run` - Walk the loop with a logging-only runner

pub mod plan;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::schedule::{AcceleratorMode, ScheduleParams};

pub use plan::{dry_run, show_plan, DryRunRunner};

/// Training schedule planner
#[derive(Parser, Debug)]
#[command(name = "train-schedule")]
#[command(author, version, about = "Step/epoch schedule planner for train/eval loops")]
pub struct Cli {
    /// Directory holding default.toml and environment overlays
    #[arg(long, global = true, env = "TRAIN_SCHEDULE_CONFIG_DIR", default_value = "config")]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the schedule and print its derived values
    Plan {
        #[command(flatten)]
        overrides: ScheduleOverrides,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the train/eval loop without a model
    DryRun {
        #[command(flatten)]
        overrides: ScheduleOverrides,
        /// Stop once the simulated metric reaches this value
        #[arg(long)]
        stop_threshold: Option<f64>,
        /// Simulated metric gained per iteration
        #[arg(long, default_value = "1.0")]
        metric_step: f64,
    },
}

/// Flag overrides applied on top of the loaded configuration
#[derive(Args, Debug, Clone, Default)]
pub struct ScheduleOverrides {
    #[arg(long)]
    pub train_steps: Option<u64>,
    #[arg(long)]
    pub steps_between_evals: Option<u64>,
    #[arg(long)]
    pub train_epochs: Option<u64>,
    #[arg(long)]
    pub epochs_between_evals: Option<u64>,
    #[arg(long)]
    pub batch_size: Option<u64>,
    #[arg(long = "max-length")]
    pub max_sequence_length: Option<u64>,
    /// Accelerator mode: standard | fixed_step (precomputed step counts, queue cooldown)
    #[arg(long)]
    pub accelerator: Option<AcceleratorMode>,
    #[arg(long = "shards")]
    pub shard_count: Option<u64>,
    #[arg(long)]
    pub cooldown_secs: Option<u64>,
}

impl ScheduleOverrides {
    pub fn apply(&self, params: &mut ScheduleParams) {
        if self.train_steps.is_some() {
            params.train_steps = self.train_steps;
        }
        if self.train_epochs.is_some() {
            params.train_epochs = self.train_epochs;
        }
        if let Some(n) = self.steps_between_evals {
            params.steps_between_evals = n;
        }
        if let Some(n) = self.epochs_between_evals {
            params.epochs_between_evals = n;
        }
        if let Some(n) = self.batch_size {
            params.batch_size = n;
        }
        if let Some(n) = self.max_sequence_length {
            params.max_sequence_length = n;
        }
        if let Some(mode) = self.accelerator {
            params.accelerator = mode;
        }
        if let Some(n) = self.shard_count {
            params.shard_count = n;
        }
        if let Some(n) = self.cooldown_secs {
            params.cooldown_secs = n;
        }
    }
}

/// Load configuration from `config_dir` and apply flag overrides
pub fn load_config(config_dir: &Path, overrides: &ScheduleOverrides) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load_from(config_dir)?;
    overrides.apply(&mut config.schedule);
    Ok(config)
}
