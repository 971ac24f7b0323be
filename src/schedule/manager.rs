//! Schedule Manager
//!
//! Groups the step/epoch checks and conversions the train/eval loop needs so
//! they are not scattered through the loop itself. Users may give training
//! length in epochs even when the fixed-step device requires a step count;
//! the conversion happens here.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::accelerator::AcceleratorMode;
use super::basis::TrainingBasis;
use super::cooldown::{Sleeper, ThreadSleeper};
use super::dataset::{ExampleCounts, Split};
use crate::error::{ConfigurationError, Result, ScheduleError};

/// Construction inputs, as parsed by the configuration layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleParams {
    /// Total training steps (steps basis)
    #[serde(default)]
    pub train_steps: Option<u64>,
    /// Steps per train/eval iteration
    #[serde(default = "default_steps_between_evals")]
    pub steps_between_evals: u64,
    /// Total training epochs (epochs basis)
    #[serde(default)]
    pub train_epochs: Option<u64>,
    /// Epochs per train/eval iteration
    #[serde(default = "default_epochs_between_evals")]
    pub epochs_between_evals: u64,
    /// Epoch total used when neither total is given
    #[serde(default = "default_train_epochs")]
    pub default_train_epochs: u64,
    /// Tokens per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
    /// Tokens per example
    #[serde(default = "default_max_sequence_length")]
    pub max_sequence_length: u64,
    #[serde(default)]
    pub accelerator: AcceleratorMode,
    /// Replicas the per-step examples are split across
    #[serde(default = "default_shard_count")]
    pub shard_count: u64,
    /// Wait after each phase in fixed-step mode
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

fn default_steps_between_evals() -> u64 {
    1000
}

fn default_epochs_between_evals() -> u64 {
    1
}

fn default_train_epochs() -> u64 {
    10
}

fn default_batch_size() -> u64 {
    2048
}

fn default_max_sequence_length() -> u64 {
    256
}

fn default_shard_count() -> u64 {
    8
}

fn default_cooldown_secs() -> u64 {
    super::cooldown::QUEUE_DRAIN_COOLDOWN.as_secs()
}

impl Default for ScheduleParams {
    fn default() -> Self {
        Self {
            train_steps: None,
            steps_between_evals: default_steps_between_evals(),
            train_epochs: None,
            epochs_between_evals: default_epochs_between_evals(),
            default_train_epochs: default_train_epochs(),
            batch_size: default_batch_size(),
            max_sequence_length: default_max_sequence_length(),
            accelerator: AcceleratorMode::Standard,
            shard_count: default_shard_count(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

/// How many times the data pipeline cycles the training split per iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetRepeat {
    /// A single partial pass covers the step budget
    NoRepeat,
    /// Full passes over the split
    Passes(u64),
}

impl DatasetRepeat {
    pub fn passes(&self) -> Option<u64> {
        match *self {
            Self::NoRepeat => None,
            Self::Passes(n) => Some(n),
        }
    }
}

impl std::fmt::Display for DatasetRepeat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRepeat => write!(f, "no repeat"),
            Self::Passes(n) => write!(f, "{} passes", n),
        }
    }
}

/// Snapshot of every derived value, for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleSummary {
    pub basis: TrainingBasis,
    pub accelerator: AcceleratorMode,
    pub train_eval_iterations: u64,
    pub single_iteration_train_steps: Option<u64>,
    pub single_iteration_train_epochs: Option<u64>,
    pub single_iteration_eval_steps: Option<u64>,
    pub repeat_dataset: DatasetRepeat,
    pub train_increment: String,
}

/// Resolved training schedule plus the between-phase hooks
#[derive(Debug, Clone)]
pub struct ScheduleManager<S = ThreadSleeper> {
    basis: TrainingBasis,
    counts: ExampleCounts,
    batch_size: u64,
    max_sequence_length: u64,
    accelerator: AcceleratorMode,
    shard_count: u64,
    cooldown: Duration,
    sleeper: S,
}

impl ScheduleManager<ThreadSleeper> {
    /// Validate the parameters and resolve the schedule
    pub fn new(params: &ScheduleParams, counts: ExampleCounts) -> Result<Self> {
        Self::with_sleeper(params, counts, ThreadSleeper)
    }
}

impl<S> ScheduleManager<S> {
    /// Like [`ScheduleManager::new`], with an explicit delay collaborator
    pub fn with_sleeper(params: &ScheduleParams, counts: ExampleCounts, sleeper: S) -> Result<Self> {
        let basis = TrainingBasis::resolve(
            params.train_steps,
            params.steps_between_evals,
            params.train_epochs,
            params.epochs_between_evals,
            params.default_train_epochs,
        )?;

        // The train count divides the step budget when sizing dataset repeats.
        if let TrainingBasis::Steps { .. } = basis {
            counts.require_examples(Split::Train)?;
        }

        if params.accelerator.is_fixed_step() {
            check_fixed_step_batching(params)?;
        }

        let manager = Self {
            basis,
            counts,
            batch_size: params.batch_size,
            max_sequence_length: params.max_sequence_length,
            accelerator: params.accelerator,
            shard_count: params.shard_count,
            cooldown: Duration::from_secs(params.cooldown_secs),
            sleeper,
        };

        debug!(
            basis = manager.basis.unit(),
            accelerator = %manager.accelerator,
            iterations = manager.train_eval_iterations(),
            increment = %manager.train_increment_label(),
            "Resolved training schedule"
        );

        Ok(manager)
    }

    pub fn basis(&self) -> TrainingBasis {
        self.basis
    }

    pub fn accelerator(&self) -> AcceleratorMode {
        self.accelerator
    }

    pub fn example_counts(&self) -> ExampleCounts {
        self.counts
    }

    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    pub fn max_sequence_length(&self) -> u64 {
        self.max_sequence_length
    }

    pub fn shard_count(&self) -> u64 {
        self.shard_count
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Number of train/eval cycles the outer loop runs
    pub fn train_eval_iterations(&self) -> u64 {
        self.basis.iterations()
    }

    /// Steps to train per iteration.
    ///
    /// `None` means train by epoch count / dataset repetition instead.
    pub fn single_iteration_train_steps(&self) -> Option<u64> {
        match self.basis {
            TrainingBasis::Steps { between_evals, .. } => Some(between_evals),
            TrainingBasis::Epochs { between_evals, .. } => self
                .accelerator
                .is_fixed_step()
                .then(|| self.steps_for(between_evals, Split::Train)),
        }
    }

    /// Epochs to train per iteration; only set on an epochs basis
    pub fn single_iteration_train_epochs(&self) -> Option<u64> {
        self.basis.epochs_per_iteration()
    }

    /// Steps for one full evaluation pass.
    ///
    /// `None` in standard mode, where the runtime detects end-of-data itself.
    pub fn single_iteration_eval_steps(&self) -> Option<u64> {
        self.accelerator
            .is_fixed_step()
            .then(|| self.steps_for(1, Split::Eval))
    }

    /// Length of one training increment, for progress logs
    pub fn train_increment_label(&self) -> String {
        match self.basis {
            TrainingBasis::Steps { between_evals, .. } => format!("{} steps.", between_evals),
            TrainingBasis::Epochs { between_evals, .. } if !self.accelerator.is_fixed_step() => {
                format!("{} epochs.", between_evals)
            }
            TrainingBasis::Epochs { between_evals, .. } => format!(
                "~{} epochs. ({} steps)",
                between_evals,
                self.steps_for(between_evals, Split::Train)
            ),
        }
    }

    /// Times the training split is cycled per iteration
    pub fn repeat_dataset(&self) -> DatasetRepeat {
        match self.basis {
            TrainingBasis::Epochs { between_evals, .. } => DatasetRepeat::Passes(between_evals),
            TrainingBasis::Steps { between_evals, .. } => {
                let train_examples = self.counts.get(Split::Train);
                if between_evals <= train_examples {
                    DatasetRepeat::NoRepeat
                } else {
                    DatasetRepeat::Passes(between_evals.div_ceil(train_examples))
                }
            }
        }
    }

    /// Convert an epoch count to the equivalent step count, rounded down.
    ///
    /// Only meaningful in fixed-step mode, where partial batches cannot run
    /// and the data-exhaustion signal is unavailable.
    pub fn epochs_to_steps(&self, num_epochs: u64, split: Split) -> Result<u64> {
        if !self.accelerator.is_fixed_step() {
            return Err(ScheduleError::PreconditionViolation(format!(
                "epochs_to_steps requires fixed-step mode (accelerator is {})",
                self.accelerator
            )));
        }
        Ok(self.steps_for(num_epochs, split))
    }

    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            basis: self.basis,
            accelerator: self.accelerator,
            train_eval_iterations: self.train_eval_iterations(),
            single_iteration_train_steps: self.single_iteration_train_steps(),
            single_iteration_train_epochs: self.single_iteration_train_epochs(),
            single_iteration_eval_steps: self.single_iteration_eval_steps(),
            repeat_dataset: self.repeat_dataset(),
            train_increment: self.train_increment_label(),
        }
    }

    // batch_size > 0 is guaranteed in fixed-step mode by construction.
    // Saturates at u64::MAX when the token count overflows.
    fn steps_for(&self, num_epochs: u64, split: Split) -> u64 {
        u128::from(self.counts.get(split))
            .checked_mul(u128::from(self.max_sequence_length))
            .and_then(|tokens| tokens.checked_mul(u128::from(num_epochs)))
            .map(|tokens| tokens / u128::from(self.batch_size))
            .and_then(|steps| u64::try_from(steps).ok())
            .unwrap_or(u64::MAX)
    }
}

impl<S: Sleeper> ScheduleManager<S> {
    /// Hook run after every training phase
    pub fn post_train(&self) {
        self.drain_queues("train");
    }

    /// Hook run after every evaluation phase
    pub fn post_eval(&self) {
        self.drain_queues("eval");
    }

    fn drain_queues(&self, phase: &'static str) {
        if self.accelerator.is_fixed_step() {
            info!(
                phase,
                cooldown_secs = self.cooldown.as_secs(),
                "Sleeping to allow accelerator queues to clear"
            );
            self.sleeper.sleep(self.cooldown);
        }
    }
}

fn check_fixed_step_batching(params: &ScheduleParams) -> std::result::Result<(), ConfigurationError> {
    if params.max_sequence_length == 0 {
        return Err(ConfigurationError::ZeroSequenceLength);
    }
    if params.batch_size == 0 {
        return Err(ConfigurationError::ZeroBatchSize);
    }
    if params.shard_count == 0 {
        return Err(ConfigurationError::ZeroShardCount);
    }

    let examples_per_step = params.batch_size / params.max_sequence_length;
    if examples_per_step % params.shard_count != 0 {
        return Err(ConfigurationError::ShardMisaligned {
            batch_size: params.batch_size,
            max_sequence_length: params.max_sequence_length,
            shard_count: params.shard_count,
        });
    }
    Ok(())
}
