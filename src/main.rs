use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use philo::{ConfigError, ConsoleSink, Outcome, Simulation, SimulationConfig};

const USAGE: &str = "Usage: philo <num_philos> <time_to_die> <time_to_eat> <time_to_sleep> [times_must_eat]";

/// Dining philosophers simulation. Times are in milliseconds.
#[derive(Parser, Debug)]
#[command(name = "philo", version)]
struct Cli {
    /// Seat everyone at once instead of delaying odd seats' first meal
    #[arg(long)]
    no_stagger: bool,

    /// Print Prometheus metrics to stderr when the run ends
    #[arg(long)]
    metrics: bool,

    /// Print a JSON summary of the run to stderr
    #[arg(long)]
    summary: bool,

    /// number_of_philosophers time_to_die time_to_eat time_to_sleep
    /// [number_of_times_each_philosopher_must_eat]
    #[arg(value_name = "ARGS", allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Stdout carries the event log, so diagnostics go to stderr.
    // Override the level with RUST_LOG, e.g. RUST_LOG=philo=debug
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,philo=info")),
        )
        .init();

    let config = match SimulationConfig::from_args(&cli.args) {
        Ok(config) => config.with_stagger(!cli.no_stagger),
        Err(e) => {
            eprintln!("{}", e);
            if matches!(e, ConfigError::InvalidArgs { .. }) {
                eprintln!("{}", USAGE);
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    let simulation = Simulation::new(config, Arc::new(ConsoleSink))?;

    let external = CancellationToken::new();
    let on_interrupt = external.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping the table");
            on_interrupt.cancel();
        }
    });

    let report = simulation.run(external).await?;

    if cli.metrics {
        eprint!("{}", simulation.metrics().render()?);
    }
    if cli.summary {
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }

    if let Outcome::Starved(starved) = &report.outcome {
        eprintln!(
            "philosopher {} starved at {} ms",
            starved.philosopher, starved.elapsed_ms
        );
    }

    if report.outcome.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
