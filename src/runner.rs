//! Tick loop used by the CLI: evaluate one output group, then feed the
//! outcome back into plasticity.

use crate::model::brain::{Brain, EvaluateOptions, Evaluation};
use crate::model::Metrics;
use serde::Serialize;

/// Energy charged per activated neuron when the driver computes feedback.
pub const ENERGY_PER_ACTIVATION: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub group: String,
    pub readings: Vec<(String, f64)>,
    pub ticks: usize,
    pub reward: f64,
    pub fatigue_delta: f64,
    pub max_capacity: f64,
    pub trace: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            group: "movement".to_string(),
            readings: Vec::new(),
            ticks: 1,
            reward: 0.0,
            fatigue_delta: 0.0,
            max_capacity: 1.0,
            trace: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub ticks: usize,
    pub silent_ticks: usize,
    pub feedback_applied: usize,
    pub last: Option<Evaluation>,
}

/// Parses a `key=value` sensor reading.
pub fn parse_reading(text: &str) -> anyhow::Result<(String, f64)> {
    let (key, value) = text
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected key=value, got {text:?}"))?;
    let key = key.trim();
    anyhow::ensure!(!key.is_empty(), "sensor key must not be empty");
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid value for {key}: {e}"))?;
    Ok((key.to_string(), value))
}

/// Runs `options.ticks` evaluate/feedback rounds against one brain.
pub fn run(brain: &mut Brain, metrics: &Metrics, options: &RunOptions) -> RunReport {
    let mut report = RunReport {
        ticks: 0,
        silent_ticks: 0,
        feedback_applied: 0,
        last: None,
    };
    let evaluate_options = EvaluateOptions {
        trace: options.trace,
    };

    for _ in 0..options.ticks {
        let readings = options.readings.iter().map(|(k, v)| (k.as_str(), *v));
        let evaluation = brain.evaluate(&options.group, readings, evaluate_options);
        metrics.record_evaluation(evaluation.activation_count);
        if evaluation.values.is_none() {
            report.silent_ticks += 1;
        }

        let energy_cost = evaluation.activation_count as f64 * ENERGY_PER_ACTIVATION;
        let outcome = brain.apply_last_feedback(
            energy_cost,
            options.fatigue_delta,
            options.reward,
            options.max_capacity,
        );
        metrics.record_feedback(outcome.is_some());
        if outcome.is_some() {
            report.feedback_applied += 1;
        }

        report.ticks += 1;
        report.last = Some(evaluation);
    }
    report
}
