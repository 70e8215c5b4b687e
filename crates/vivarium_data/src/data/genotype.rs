use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::cell::Cell;

/// A heritable connection descriptor.
///
/// Genes come straight out of mutation and crossover, so every field is
/// allowed to be malformed. Decoding never rejects a gene for a wrongly
/// typed field: ids become NaN, the weight becomes 0, the activation code
/// becomes unset and the enabled flag stays on. Consumers decide what a
/// usable gene looks like.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Gene {
    /// Source node ID (sensor index or neuron id).
    #[serde(default = "missing_id", deserialize_with = "lenient_id")]
    pub source_id: f64,
    /// Target node ID.
    #[serde(default = "missing_id", deserialize_with = "lenient_id")]
    pub target_id: f64,
    /// Connection weight.
    #[serde(default, deserialize_with = "lenient_weight")]
    pub weight: f64,
    /// Activation code of the target neuron.
    #[serde(default, deserialize_with = "lenient_activation")]
    pub activation: Option<i64>,
    /// Whether the gene is expressed.
    #[serde(default = "default_enabled", deserialize_with = "lenient_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

fn missing_id() -> f64 {
    f64::NAN
}

// Non-finite floats serialize as JSON null, so null must read back as NaN.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_f64().unwrap_or(f64::NAN))
}

fn lenient_weight<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_f64().unwrap_or(0.0))
}

fn lenient_activation<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|code| code.is_finite() && code.fract() == 0.0)
            .map(|code| code as i64)
    }))
}

fn lenient_enabled<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_bool().unwrap_or(true))
}

/// Decodes each gene on its own; entries that are not objects are dropped.
fn lenient_genes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Gene>, D::Error> {
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        _ => return Ok(Vec::new()),
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect())
}

impl Gene {
    /// Creates an enabled gene.
    #[must_use]
    pub fn new(source_id: usize, target_id: usize, weight: f64, activation: i64) -> Self {
        Self {
            source_id: source_id as f64,
            target_id: target_id as f64,
            weight,
            activation: Some(activation),
            enabled: true,
        }
    }

    /// Returns a copy with the enabled flag cleared.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Bounds on adaptive sensor gain.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct GainLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for GainLimits {
    fn default() -> Self {
        Self { min: 0.5, max: 2.0 }
    }
}

/// Heritable description of per-sensor gain modulation.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SensorModulationProfile {
    /// Resting gain per sensor index. Missing entries rest at 1.0.
    pub baseline_gains: Vec<f64>,
    /// Preferred value per sensor index. `None` leaves the sensor untargeted.
    pub targets: Vec<Option<f64>>,
    /// How strongly deviations from the target move the gain (0.0-0.6).
    pub adaptation_rate: f64,
    /// How quickly gains relax back to baseline (0.0-1.0).
    pub reversion_rate: f64,
    /// Gain clamp. Falls back to the brain default when absent.
    pub gain_limits: Option<GainLimits>,
}

/// Heritable description of lifetime sensor learning.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlasticityProfile {
    /// Learning rate (0.0-0.5). Zero disables plasticity.
    pub learning_rate: f64,
    /// Scale applied to positive feedback (0.0-2.0).
    pub reward_sensitivity: f64,
    /// Scale applied to negative feedback (0.0-2.0).
    pub punishment_sensitivity: f64,
    /// How much of a learned target survives each feedback (0.0-1.0).
    pub retention: f64,
    /// Strength of punishment repulsion and gain nudging (0.0-2.0).
    pub volatility: f64,
    /// Weight of fatigue in the combined signal (0.0-2.0).
    pub fatigue_weight: f64,
    /// Weight of energy cost in the combined signal (0.0-2.0).
    pub cost_weight: f64,
}

impl Default for PlasticityProfile {
    fn default() -> Self {
        Self {
            learning_rate: 0.0,
            reward_sensitivity: 1.0,
            punishment_sensitivity: 1.0,
            retention: 1.0,
            volatility: 0.5,
            fatigue_weight: 1.0,
            cost_weight: 1.0,
        }
    }
}

/// Size of a constructed brain, reported back to the genome for telemetry.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrainMetrics {
    pub neuron_count: usize,
    pub connection_count: usize,
}

/// Genetic blueprint of an organism's controller.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Genome {
    /// Connection genes in inheritance order.
    #[serde(default, deserialize_with = "lenient_genes")]
    pub genes: Vec<Gene>,
    /// Optional sensor modulation descriptor.
    #[serde(default)]
    pub sensor_modulation: Option<SensorModulationProfile>,
    /// Optional plasticity descriptor.
    #[serde(default)]
    pub plasticity: Option<PlasticityProfile>,
    /// Metrics of the last brain built from this genome (not serialized).
    #[serde(skip)]
    pub brain_metrics: Cell<Option<BrainMetrics>>,
}

impl Genome {
    /// Creates a genome with only connection genes.
    #[must_use]
    pub fn from_genes(genes: Vec<Gene>) -> Self {
        Self {
            genes,
            ..Self::default()
        }
    }

    /// Serialize genome to hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(bytes)
    }

    /// Deserialize genome from hex string.
    pub fn from_hex(hex_str: &str) -> anyhow::Result<Self> {
        let bytes = hex::decode(hex_str)?;
        let genome = serde_json::from_slice(&bytes)?;
        Ok(genome)
    }
}
