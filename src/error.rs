use thiserror::Error;

use crate::schedule::Split;

/// Main error type for the schedule manager
#[derive(Error, Debug)]
pub enum ScheduleError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),

    // Caller contract errors
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    // External train/eval collaborator errors
    #[error("Runner error: {0}")]
    Runner(String),
}

/// Result type alias for ScheduleError
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Specific reasons a schedule cannot be constructed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("both train_steps ({train_steps}) and train_epochs ({train_epochs}) were defined")]
    BothBasesSpecified { train_steps: u64, train_epochs: u64 },

    #[error("{basis}_between_evals must be positive")]
    ZeroEvalCadence { basis: &'static str },

    #[error("max_sequence_length must be positive in fixed-step mode")]
    ZeroSequenceLength,

    #[error("batch_size must be positive in fixed-step mode")]
    ZeroBatchSize,

    #[error("shard_count must be positive in fixed-step mode")]
    ZeroShardCount,

    #[error(
        "batch_size / max_sequence_length ({batch_size} / {max_sequence_length}) \
         is not divisible by shard_count {shard_count}"
    )]
    ShardMisaligned {
        batch_size: u64,
        max_sequence_length: u64,
        shard_count: u64,
    },

    #[error("{split} split has no examples")]
    EmptySplit { split: Split },
}
