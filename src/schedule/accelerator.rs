use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Execution mode of the device running the train/eval loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceleratorMode {
    /// Runtime detects end-of-data itself and can consume an epoch-repeated
    /// dataset directly.
    #[default]
    #[serde(alias = "none")]
    Standard,
    /// Device cannot observe data exhaustion and rejects partial batches.
    /// Every phase needs a precomputed step count, and device queues must
    /// drain between phases.
    #[serde(alias = "tpu")]
    FixedStep,
}

impl AcceleratorMode {
    pub fn is_fixed_step(&self) -> bool {
        matches!(self, Self::FixedStep)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::FixedStep => "fixed_step",
        }
    }
}

impl std::fmt::Display for AcceleratorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AcceleratorMode {
    type Err = &'static str;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "standard" | "none" => Ok(Self::Standard),
            "fixed_step" | "fixed-step" | "tpu" => Ok(Self::FixedStep),
            _ => Err("invalid accelerator mode; expected standard|fixed_step"),
        }
    }
}
