//! Short-horizon sensor gain modulation (habituation and sensitization).

use super::sensors::{normalize, SensorVector, BIAS_INDEX, SENSOR_COUNT};
use serde::{Deserialize, Serialize};
use vivarium_data::{GainLimits, SensorModulationProfile};

pub const MIN_GAIN_FLOOR: f64 = 0.05;
pub const MIN_GAIN_SPAN: f64 = 0.05;
pub const MAX_ADAPTATION_RATE: f64 = 0.6;

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub(crate) fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Clamps gain limits to `min >= 0.05` and `max >= min + 0.05`.
#[must_use]
pub fn sanitize_limits(limits: GainLimits, fallback: GainLimits) -> GainLimits {
    let min = finite_or(limits.min, fallback.min).max(MIN_GAIN_FLOOR);
    let max = finite_or(limits.max, fallback.max).max(min + MIN_GAIN_SPAN);
    GainLimits { min, max }
}

/// Per-sensor adaptive gain state.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SensorModulation {
    pub baseline: Vec<f64>,
    pub gain: Vec<f64>,
    pub target: Vec<Option<f64>>,
    pub limits: GainLimits,
    pub adaptation_rate: f64,
    pub reversion_rate: f64,
}

impl SensorModulation {
    /// Builds modulation state from an optional heritable profile.
    ///
    /// Out-of-range values are clamped, never rejected.
    #[must_use]
    pub fn from_profile(profile: Option<&SensorModulationProfile>, default_limits: GainLimits) -> Self {
        let default_limits = sanitize_limits(default_limits, GainLimits::default());
        let Some(profile) = profile else {
            return Self::neutral(default_limits);
        };

        let limits = sanitize_limits(profile.gain_limits.unwrap_or(default_limits), default_limits);
        let mut baseline = vec![1.0; SENSOR_COUNT];
        let mut target = vec![None; SENSOR_COUNT];
        for i in 0..SENSOR_COUNT {
            if i == BIAS_INDEX {
                continue;
            }
            let raw = profile.baseline_gains.get(i).copied().unwrap_or(1.0);
            baseline[i] = finite_or(raw, 1.0).clamp(limits.min, limits.max);
            target[i] = profile
                .targets
                .get(i)
                .copied()
                .flatten()
                .filter(|t| t.is_finite())
                .map(|t| t.clamp(-1.0, 1.0));
        }

        Self {
            gain: baseline.clone(),
            baseline,
            target,
            limits,
            adaptation_rate: finite_or(profile.adaptation_rate, 0.0).clamp(0.0, MAX_ADAPTATION_RATE),
            reversion_rate: finite_or(profile.reversion_rate, 0.0).clamp(0.0, 1.0),
        }
    }

    /// Unit gains, no targets, no adaptation.
    #[must_use]
    pub fn neutral(limits: GainLimits) -> Self {
        let limits = sanitize_limits(limits, GainLimits::default());
        let resting = 1.0_f64.clamp(limits.min, limits.max);
        let mut baseline = vec![resting; SENSOR_COUNT];
        baseline[BIAS_INDEX] = 1.0;
        Self {
            gain: baseline.clone(),
            baseline,
            target: vec![None; SENSOR_COUNT],
            limits,
            adaptation_rate: 0.0,
            reversion_rate: 0.0,
        }
    }

    /// Adapts gains to the raw readings and writes the modulated vector.
    ///
    /// A learned experience target takes precedence over the heritable one.
    pub fn modulate(
        &mut self,
        raw: &SensorVector,
        experience_target: &[Option<f64>],
        out: &mut SensorVector,
    ) {
        out[BIAS_INDEX] = 1.0;
        self.gain[BIAS_INDEX] = 1.0;
        self.baseline[BIAS_INDEX] = 1.0;

        for i in 1..SENSOR_COUNT {
            let value = raw[i];
            let target = experience_target
                .get(i)
                .copied()
                .flatten()
                .or(self.target[i]);
            let mut gain = self.gain[i];

            if self.adaptation_rate > 0.0 {
                if let Some(target) = target {
                    gain += (value - target).clamp(-1.0, 1.0) * self.adaptation_rate;
                }
            }
            if self.reversion_rate > 0.0 {
                gain = lerp(gain, self.baseline[i], self.reversion_rate);
            }
            gain = self.clamp_gain(gain);

            self.gain[i] = gain;
            out[i] = normalize(value * gain);
        }
    }

    #[must_use]
    pub fn clamp_gain(&self, gain: f64) -> f64 {
        finite_or(gain, self.limits.min).clamp(self.limits.min, self.limits.max)
    }

    /// Adds `delta` to a sensor gain, respecting the limits. The bias is pinned.
    pub fn nudge_gain(&mut self, index: usize, delta: f64) {
        if index == BIAS_INDEX || index >= SENSOR_COUNT {
            return;
        }
        self.gain[index] = self.clamp_gain(self.gain[index] + delta);
    }

    /// Moves a sensor gain toward `desired` by `factor`.
    pub fn blend_gain(&mut self, index: usize, desired: f64, factor: f64) {
        if index == BIAS_INDEX || index >= SENSOR_COUNT {
            return;
        }
        let desired = self.clamp_gain(desired);
        self.gain[index] = self.clamp_gain(lerp(self.gain[index], desired, factor.clamp(0.0, 1.0)));
    }

    #[must_use]
    pub fn gain_range(&self) -> f64 {
        self.limits.max - self.limits.min
    }

    /// Heritable target of a sensor, if any.
    #[must_use]
    pub fn base_target(&self, index: usize) -> Option<f64> {
        self.target.get(index).copied().flatten()
    }
}
