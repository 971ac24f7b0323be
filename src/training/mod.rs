//! Training Infrastructure
//!
//! Outer train/eval loop driven by the schedule manager.

pub mod run_loop;

pub use run_loop::{
    past_stop_threshold, run_train_eval, summarize, EvalOutcome, EvalRequest, IterationResult,
    LoopReport, LoopSummary, TrainEvalRunner, TrainRequest,
};
