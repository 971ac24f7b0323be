//! Train/Eval Loop
//!
//! Drives repeated train-then-evaluate iterations from a [`ScheduleManager`].
//! The model computation itself lives behind [`TrainEvalRunner`].

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::schedule::{DatasetRepeat, ScheduleManager, Sleeper};

/// What to train in one iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainRequest {
    /// Zero-based iteration index
    pub iteration: u64,
    /// Step budget; `None` means train by `epochs`
    pub steps: Option<u64>,
    /// Epoch budget on an epochs basis
    pub epochs: Option<u64>,
    /// Dataset repetition for the input pipeline
    pub repeat: DatasetRepeat,
}

/// What to evaluate in one iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalRequest {
    pub iteration: u64,
    /// Step budget; `None` means run until the eval split is exhausted
    pub steps: Option<u64>,
}

/// Result of an evaluation phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalOutcome {
    /// Quality score compared against the stop threshold (higher is better)
    pub metric: Option<f64>,
}

/// Model-side collaborator executing the phases
pub trait TrainEvalRunner {
    fn train(&mut self, request: &TrainRequest) -> Result<()>;

    fn evaluate(&mut self, request: &EvalRequest) -> Result<EvalOutcome>;
}

/// Per-iteration record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationResult {
    pub iteration: u64,
    pub train: TrainRequest,
    pub eval: EvalRequest,
    pub outcome: EvalOutcome,
}

/// Outcome of a whole run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopReport {
    pub iterations_planned: u64,
    pub iterations_completed: u64,
    /// Stop threshold reached before the planned iterations ran out
    pub stopped_early: bool,
    pub results: Vec<IterationResult>,
}

/// Summary statistics over iteration results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoopSummary {
    pub iterations: usize,
    pub scored_iterations: usize,
    pub best_metric: Option<f64>,
    pub best_iteration: Option<u64>,
    pub last_metric: Option<f64>,
}

/// Run the train/eval loop.
///
/// Each iteration trains, calls `post_train`, evaluates, then calls
/// `post_eval`. With a `stop_threshold`, the loop ends after the first
/// evaluation whose metric reaches it.
pub fn run_train_eval<S, R>(
    manager: &ScheduleManager<S>,
    runner: &mut R,
    stop_threshold: Option<f64>,
) -> Result<LoopReport>
where
    S: Sleeper,
    R: TrainEvalRunner + ?Sized,
{
    let iterations = manager.train_eval_iterations();
    let increment = manager.train_increment_label();
    let mut results = Vec::new();
    let mut stopped_early = false;

    if iterations == 0 {
        warn!("Schedule resolves to zero train/eval iterations");
    }

    for iteration in 0..iterations {
        info!(
            "Starting iteration {}/{}: training {}",
            iteration + 1,
            iterations,
            increment
        );

        let train = TrainRequest {
            iteration,
            steps: manager.single_iteration_train_steps(),
            epochs: manager.single_iteration_train_epochs(),
            repeat: manager.repeat_dataset(),
        };
        runner.train(&train)?;
        manager.post_train();

        let eval = EvalRequest {
            iteration,
            steps: manager.single_iteration_eval_steps(),
        };
        let outcome = runner.evaluate(&eval)?;
        manager.post_eval();

        info!(
            iteration = iteration + 1,
            metric = ?outcome.metric,
            "Evaluation complete"
        );

        results.push(IterationResult {
            iteration,
            train,
            eval,
            outcome,
        });

        if past_stop_threshold(stop_threshold, outcome.metric) {
            info!(
                "Stop threshold {:?} reached after iteration {}/{}",
                stop_threshold,
                iteration + 1,
                iterations
            );
            stopped_early = iteration + 1 < iterations;
            break;
        }
    }

    Ok(LoopReport {
        iterations_planned: iterations,
        iterations_completed: results.len() as u64,
        stopped_early,
        results,
    })
}

/// True when a threshold is set and the metric meets or exceeds it
pub fn past_stop_threshold(threshold: Option<f64>, metric: Option<f64>) -> bool {
    match (threshold, metric) {
        (Some(threshold), Some(metric)) => metric >= threshold,
        _ => false,
    }
}

/// Calculate summary statistics over iteration results
pub fn summarize(results: &[IterationResult]) -> LoopSummary {
    let scored: Vec<(u64, f64)> = results
        .iter()
        .filter_map(|r| r.outcome.metric.map(|m| (r.iteration, m)))
        .collect();

    let best = scored
        .iter()
        .copied()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    LoopSummary {
        iterations: results.len(),
        scored_iterations: scored.len(),
        best_metric: best.map(|(_, m)| m),
        best_iteration: best.map(|(i, _)| i),
        last_metric: results.last().and_then(|r| r.outcome.metric),
    }
}
