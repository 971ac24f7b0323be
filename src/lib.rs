pub mod cli;
pub mod config;
pub mod error;
pub mod schedule;
pub mod training;

pub use config::AppConfig;
pub use error::{ConfigurationError, Result, ScheduleError};
pub use schedule::{
    AcceleratorMode, DatasetRepeat, ExampleCounts, ScheduleManager, ScheduleParams,
    ScheduleSummary, Sleeper, Split, ThreadSleeper, TrainingBasis,
};
pub use training::{run_train_eval, EvalOutcome, EvalRequest, LoopReport, TrainEvalRunner, TrainRequest};
