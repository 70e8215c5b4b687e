//! Fixed sensor registry.
//!
//! Sensor identity is its position in [`SENSOR_KEYS`]. Index 0 is the
//! constant bias and always reads 1.0.

pub const SENSOR_KEYS: [&str; 18] = [
    "bias",
    "energy",
    "density",
    "ally_fraction",
    "enemy_fraction",
    "mate_fraction",
    "ally_similarity",
    "enemy_similarity",
    "mate_similarity",
    "age",
    "event_pressure",
    "resource_trend",
    "ally_energy",
    "enemy_energy",
    "momentum",
    "target_weakness",
    "target_threat",
    "target_proximity",
];

pub const SENSOR_COUNT: usize = SENSOR_KEYS.len();
pub const BIAS_INDEX: usize = 0;

pub type SensorVector = [f64; SENSOR_COUNT];

/// Resolves a sensor key to its index.
#[must_use]
pub fn sensor_index(key: &str) -> Option<usize> {
    SENSOR_KEYS.iter().position(|&k| k == key)
}

#[must_use]
pub fn sensor_key(index: usize) -> Option<&'static str> {
    SENSOR_KEYS.get(index).copied()
}

#[must_use]
pub fn is_sensor(id: usize) -> bool {
    id < SENSOR_COUNT
}

/// A vector with only the bias set.
#[must_use]
pub fn bias_only() -> SensorVector {
    let mut v = [0.0; SENSOR_COUNT];
    v[BIAS_INDEX] = 1.0;
    v
}

/// Normalizes a raw reading into `[-1, 1]`. Non-finite readings become 0.
#[must_use]
pub fn normalize(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Builds the raw sensor vector from `(key, value)` pairs.
///
/// Unknown keys are ignored and the bias cannot be overridden.
pub fn fill_raw<I, K, V>(readings: I, out: &mut SensorVector)
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: std::borrow::Borrow<f64>,
{
    *out = bias_only();
    for (key, value) in readings {
        match sensor_index(key.as_ref()) {
            Some(BIAS_INDEX) | None => {}
            Some(idx) => out[idx] = normalize(*value.borrow()),
        }
    }
}
