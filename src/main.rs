use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use vivarium_lib::model::brain::{Brain, BrainSnapshot};
use vivarium_lib::model::config::AppConfig;
use vivarium_lib::model::genome::{load_genome, random_genome};
use vivarium_lib::model::{init_logging, Metrics};
use vivarium_lib::runner::{self, RunOptions, RunReport};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Genome file (JSON or hex). A seeded random genome is used when absent.
    #[arg(short, long)]
    genome: Option<String>,

    /// Seed for the random genome
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Output group to evaluate
    #[arg(long, default_value = "movement")]
    group: String,

    /// Sensor reading as key=value (repeatable)
    #[arg(long = "sensor", value_parser = runner::parse_reading)]
    sensors: Vec<(String, f64)>,

    /// Number of evaluate/feedback ticks
    #[arg(short, long, default_value_t = 1)]
    ticks: usize,

    /// Reward signal fed back after every tick
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    reward: f64,

    /// Record an evaluation trace (overrides config)
    #[arg(long)]
    trace: bool,
}

#[derive(Serialize)]
struct Output {
    report: RunReport,
    snapshot: BrainSnapshot,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(&args.config)?;
    init_logging(&config.logging.level);

    let genome = match &args.genome {
        Some(path) => load_genome(path)?,
        None => random_genome(args.seed),
    };
    let metrics = Metrics::new();
    let Some(mut brain) = Brain::from_genome_with(&genome, &config.brain.brain_options()) else {
        anyhow::bail!("genome has no genes");
    };
    metrics.record_brain_built(brain.neuron_count(), brain.connection_count());

    let options = RunOptions {
        group: args.group,
        readings: args.sensors,
        ticks: args.ticks,
        reward: args.reward,
        trace: args.trace || config.brain.trace,
        ..RunOptions::default()
    };
    let report = runner::run(&mut brain, &metrics, &options);
    tracing::info!(
        ticks = report.ticks,
        silent = report.silent_ticks,
        feedback = report.feedback_applied,
        "Run finished"
    );

    let output = Output {
        report,
        snapshot: brain.snapshot(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
