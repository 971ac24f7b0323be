use clap::Parser;
use tracing_subscriber::EnvFilter;
use train_schedule::cli::{self, Cli, Commands};
use train_schedule::config::LoggingConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Plan { overrides, json } => {
            let config = cli::load_config(&cli.config_dir, overrides)?;
            init_logging_simple();
            cli::show_plan(&config, *json)?;
        }
        Commands::DryRun {
            overrides,
            stop_threshold,
            metric_step,
        } => {
            let config = cli::load_config(&cli.config_dir, overrides)?;
            init_logging(&config.logging);
            cli::dry_run(&config, *stop_threshold, *metric_step)?;
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},train_schedule=debug", logging.level)));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }
}

fn init_logging_simple() {
    // Minimal logging for one-shot commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}
