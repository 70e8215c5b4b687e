use super::activation::ActivationKind;
use super::connectome::Connection;
use super::evaluate::EvaluationTrace;
use super::modulation::SensorModulation;
use super::plasticity::SensorPlasticity;
use super::sensors::{bias_only, SensorVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bookkeeping from the most recent evaluation. Never read by evaluation itself.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LastEvaluation {
    pub group: Option<String>,
    pub sensors: SensorVector,
    pub outputs: Option<BTreeMap<String, f64>>,
    pub activation_count: usize,
    pub trace: Option<EvaluationTrace>,
}

impl Default for LastEvaluation {
    fn default() -> Self {
        Self {
            group: None,
            sensors: bias_only(),
            outputs: None,
            activation_count: 0,
            trace: None,
        }
    }
}

/// Introspection export for UI, leaderboards and tests.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BrainSnapshot {
    pub neuron_count: usize,
    pub connection_count: usize,
    pub connections: Vec<Connection>,
    pub activations: BTreeMap<usize, ActivationKind>,
    pub last: LastEvaluation,
    pub modulation: SensorModulation,
    pub plasticity: SensorPlasticity,
}

impl BrainSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
