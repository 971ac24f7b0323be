//! Training Schedule
//!
//! Step/epoch bookkeeping for a repeating train/eval loop:
//! - Basis resolution (steps or epochs, never both)
//! - Epoch to step conversion for fixed-step accelerators
//! - Per-iteration train/eval lengths and dataset repeat counts
//! - Queue-drain cooldown between phases

pub mod accelerator;
pub mod basis;
pub mod cooldown;
pub mod dataset;
pub mod manager;

pub use accelerator::AcceleratorMode;
pub use basis::TrainingBasis;
pub use cooldown::{Sleeper, ThreadSleeper, QUEUE_DRAIN_COOLDOWN};
pub use dataset::{ExampleCounts, Split};
pub use manager::{DatasetRepeat, ScheduleManager, ScheduleParams, ScheduleSummary};
