//! Training Basis
//!
//! Training length is given either as a total step count or a total epoch
//! count, each with an evaluation cadence in the same unit. Exactly one of
//! the two is in effect for a run.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Resolved training length and evaluation cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum TrainingBasis {
    /// Mini-batch updates
    Steps { total: u64, between_evals: u64 },
    /// Full dataset passes
    Epochs { total: u64, between_evals: u64 },
}

impl TrainingBasis {
    /// Resolve the basis from user flags.
    ///
    /// A zero total counts as unset. When no step total is given the epoch
    /// total falls back to `default_train_epochs`.
    pub fn resolve(
        train_steps: Option<u64>,
        steps_between_evals: u64,
        train_epochs: Option<u64>,
        epochs_between_evals: u64,
        default_train_epochs: u64,
    ) -> Result<Self, ConfigurationError> {
        let train_steps = train_steps.filter(|&n| n > 0);
        let train_epochs = train_epochs.filter(|&n| n > 0);

        match (train_steps, train_epochs) {
            (Some(train_steps), Some(train_epochs)) => {
                Err(ConfigurationError::BothBasesSpecified {
                    train_steps,
                    train_epochs,
                })
            }
            (Some(total), None) => {
                if steps_between_evals == 0 {
                    return Err(ConfigurationError::ZeroEvalCadence { basis: "steps" });
                }
                Ok(Self::Steps {
                    total,
                    between_evals: steps_between_evals,
                })
            }
            (None, train_epochs) => {
                if epochs_between_evals == 0 {
                    return Err(ConfigurationError::ZeroEvalCadence { basis: "epochs" });
                }
                Ok(Self::Epochs {
                    total: train_epochs.unwrap_or(default_train_epochs),
                    between_evals: epochs_between_evals,
                })
            }
        }
    }

    /// Number of train/eval cycles; any remainder is dropped.
    pub fn iterations(&self) -> u64 {
        match *self {
            Self::Steps {
                total,
                between_evals,
            }
            | Self::Epochs {
                total,
                between_evals,
            } => total / between_evals,
        }
    }

    pub fn steps_per_iteration(&self) -> Option<u64> {
        match *self {
            Self::Steps { between_evals, .. } => Some(between_evals),
            Self::Epochs { .. } => None,
        }
    }

    pub fn epochs_per_iteration(&self) -> Option<u64> {
        match *self {
            Self::Epochs { between_evals, .. } => Some(between_evals),
            Self::Steps { .. } => None,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::Steps { .. } => "steps",
            Self::Epochs { .. } => "epochs",
        }
    }
}
