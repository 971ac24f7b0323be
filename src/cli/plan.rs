//! Plan and dry-run commands

use anyhow::Result;
use tracing::info;

use crate::config::AppConfig;
use crate::error::Result as ScheduleResult;
use crate::schedule::ScheduleSummary;
use crate::training::{
    run_train_eval, summarize, EvalOutcome, EvalRequest, TrainEvalRunner, TrainRequest,
};

/// Print the resolved schedule
pub fn show_plan(config: &AppConfig, json: bool) -> Result<()> {
    let manager = config.build_manager()?;
    let summary = manager.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render_plan(&summary));
    }
    Ok(())
}

fn render_plan(summary: &ScheduleSummary) -> String {
    let opt = |v: Option<u64>| v.map_or_else(|| "-".to_string(), |n| n.to_string());

    let mut out = String::new();
    out.push_str(&format!("Basis                  : {}\n", summary.basis.unit()));
    out.push_str(&format!("Accelerator            : {}\n", summary.accelerator));
    out.push_str(&format!("Train/Eval Iterations  : {}\n", summary.train_eval_iterations));
    out.push_str(&format!("Train Steps / Iter     : {}\n", opt(summary.single_iteration_train_steps)));
    out.push_str(&format!("Train Epochs / Iter    : {}\n", opt(summary.single_iteration_train_epochs)));
    out.push_str(&format!("Eval Steps / Iter      : {}\n", opt(summary.single_iteration_eval_steps)));
    out.push_str(&format!("Dataset Repeat         : {}\n", summary.repeat_dataset));
    out.push_str(&format!("Increment              : {}\n", summary.train_increment));
    out
}

/// Runner that only logs requests and reports a rising metric
#[derive(Debug, Clone, Default)]
pub struct DryRunRunner {
    metric_step: f64,
    metric: f64,
}

impl DryRunRunner {
    pub fn new(metric_step: f64) -> Self {
        Self {
            metric_step,
            metric: 0.0,
        }
    }
}

impl TrainEvalRunner for DryRunRunner {
    fn train(&mut self, request: &TrainRequest) -> ScheduleResult<()> {
        info!(
            iteration = request.iteration + 1,
            steps = ?request.steps,
            epochs = ?request.epochs,
            repeat = %request.repeat,
            "Train phase (dry run)"
        );
        Ok(())
    }

    fn evaluate(&mut self, request: &EvalRequest) -> ScheduleResult<EvalOutcome> {
        self.metric += self.metric_step;
        info!(
            iteration = request.iteration + 1,
            steps = ?request.steps,
            metric = self.metric,
            "Eval phase (dry run)"
        );
        Ok(EvalOutcome {
            metric: Some(self.metric),
        })
    }
}

/// Walk the full loop with [`DryRunRunner`]
pub fn dry_run(config: &AppConfig, stop_threshold: Option<f64>, metric_step: f64) -> Result<()> {
    let manager = config.build_manager()?;
    let mut runner = DryRunRunner::new(metric_step);

    let report = run_train_eval(&manager, &mut runner, stop_threshold)?;
    let summary = summarize(&report.results);

    info!(
        planned = report.iterations_planned,
        completed = report.iterations_completed,
        stopped_early = report.stopped_early,
        best_metric = ?summary.best_metric,
        "Dry run finished"
    );
    Ok(())
}
