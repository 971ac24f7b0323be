//! Dataset split sizes
//!
//! The schedule never counts examples itself; it receives a table of
//! per-split example counts from the data side and does arithmetic on it.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Dataset split a computation runs over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    Train,
    Eval,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Eval => "eval",
        }
    }
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Number of examples in each dataset split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleCounts {
    /// Examples in the training split
    pub train: u64,
    /// Examples in the evaluation split
    pub eval: u64,
}

impl ExampleCounts {
    /// WMT English-German split sizes
    pub const WMT_ENDE: Self = Self {
        train: 4_572_160,
        eval: 3_000,
    };

    pub fn new(train: u64, eval: u64) -> Self {
        Self { train, eval }
    }

    /// Example count for a split
    pub fn get(&self, split: Split) -> u64 {
        match split {
            Split::Train => self.train,
            Split::Eval => self.eval,
        }
    }

    /// Example count for a split that is used as a divisor
    pub fn require_examples(&self, split: Split) -> Result<u64, ConfigurationError> {
        match self.get(split) {
            0 => Err(ConfigurationError::EmptySplit { split }),
            n => Ok(n),
        }
    }
}

impl Default for ExampleCounts {
    fn default() -> Self {
        Self::WMT_ENDE
    }
}
