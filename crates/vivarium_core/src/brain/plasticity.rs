//! Feedback-driven sensor plasticity.
//!
//! Plasticity sits beneath [`SensorModulation`]: it slowly moves per-sensor
//! experience targets (and nudges gains) according to reward and punishment,
//! and modulation reads those targets on the next evaluation.

use super::modulation::{finite_or, lerp, SensorModulation};
use super::sensors::{sensor_index, SensorVector, BIAS_INDEX, SENSOR_COUNT};
use serde::{Deserialize, Serialize};
use vivarium_data::PlasticityProfile;

pub const MAX_LEARNING_RATE: f64 = 0.5;
pub const MAX_SENSITIVITY: f64 = 2.0;
pub const MIN_SIGNAL: f64 = 1e-6;
pub const MIN_CAPACITY: f64 = 1e-4;
/// Share of the gain range an imprinted target may shift the desired gain.
pub const IMPRINT_GAIN_SPAN: f64 = 0.35;

/// Outcome of one tick, reported by the metabolism layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Feedback {
    /// Sensor vector the organism acted on. Nothing is learned without it.
    pub sensors: Option<SensorVector>,
    pub activation_count: usize,
    pub energy_cost: f64,
    pub fatigue_delta: f64,
    pub reward: f64,
    pub max_capacity: f64,
}

/// What a feedback application did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeedbackOutcome {
    pub signal: f64,
    pub direction: f64,
    pub magnitude: f64,
}

/// An externally supplied target/gain adjustment.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExperienceAdjustment {
    /// Sensor index. Takes precedence over `sensor`.
    pub index: Option<usize>,
    /// Sensor key.
    pub sensor: Option<String>,
    pub target: f64,
    /// Per-entry assimilation factor overriding the batch factor.
    pub assimilation: Option<f64>,
    /// Explicit desired gain.
    pub gain: Option<f64>,
    /// Scale on how far the gain follows (defaults to 1).
    pub gain_blend: Option<f64>,
}

impl ExperienceAdjustment {
    fn resolve_index(&self) -> Option<usize> {
        self.index
            .or_else(|| self.sensor.as_deref().and_then(sensor_index))
            .filter(|&i| i != BIAS_INDEX && i < SENSOR_COUNT)
    }
}

/// Lifetime learning state layered under sensor modulation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SensorPlasticity {
    pub enabled: bool,
    pub learning_rate: f64,
    pub reward_sensitivity: f64,
    pub punishment_sensitivity: f64,
    pub retention: f64,
    pub volatility: f64,
    pub fatigue_weight: f64,
    pub cost_weight: f64,
    pub experience_target: Vec<Option<f64>>,
}

impl Default for SensorPlasticity {
    fn default() -> Self {
        Self::from_profile(None)
    }
}

impl SensorPlasticity {
    #[must_use]
    pub fn from_profile(profile: Option<&PlasticityProfile>) -> Self {
        let defaults = PlasticityProfile::default();
        let p = profile.unwrap_or(&defaults);
        let unit = |v: f64, d: f64, hi: f64| finite_or(v, d).clamp(0.0, hi);

        let learning_rate = if profile.is_some() {
            unit(p.learning_rate, 0.0, MAX_LEARNING_RATE)
        } else {
            0.0
        };
        let reward_sensitivity = unit(p.reward_sensitivity, defaults.reward_sensitivity, MAX_SENSITIVITY);
        let punishment_sensitivity =
            unit(p.punishment_sensitivity, defaults.punishment_sensitivity, MAX_SENSITIVITY);

        Self {
            enabled: learning_rate > 0.0 && (reward_sensitivity > 0.0 || punishment_sensitivity > 0.0),
            learning_rate,
            reward_sensitivity,
            punishment_sensitivity,
            retention: unit(p.retention, defaults.retention, 1.0),
            volatility: unit(p.volatility, defaults.volatility, 2.0),
            fatigue_weight: unit(p.fatigue_weight, defaults.fatigue_weight, 2.0),
            cost_weight: unit(p.cost_weight, defaults.cost_weight, 2.0),
            experience_target: vec![None; SENSOR_COUNT],
        }
    }

    fn decay_targets(&mut self, modulation: &SensorModulation) {
        if !(self.retention > 0.0 && self.retention < 1.0) {
            return;
        }
        for (i, slot) in self.experience_target.iter_mut().enumerate() {
            if let Some(current) = *slot {
                let base = modulation.base_target(i).unwrap_or(0.0);
                *slot = Some(lerp(base, current, self.retention));
            }
        }
    }

    /// Learns from one tick of feedback.
    ///
    /// Returns `None` when plasticity is disabled, no sensor vector was
    /// supplied, or the combined signal is too weak to learn from. Retention
    /// decay still applies in the last case.
    pub fn apply_feedback(
        &mut self,
        modulation: &mut SensorModulation,
        feedback: &Feedback,
    ) -> Option<FeedbackOutcome> {
        if !self.enabled {
            return None;
        }
        let sensors = feedback.sensors.as_ref()?;

        self.decay_targets(modulation);

        let capacity = finite_or(feedback.max_capacity, 0.0).max(MIN_CAPACITY);
        let cost = (finite_or(feedback.energy_cost, 0.0) / capacity).clamp(-2.0, 2.0);
        let fatigue = finite_or(feedback.fatigue_delta, 0.0).clamp(-1.0, 1.0);
        let signal = (self.fatigue_weight * fatigue - self.cost_weight * cost
            + finite_or(feedback.reward, 0.0))
        .clamp(-2.0, 2.0);
        if signal.abs() < MIN_SIGNAL {
            return None;
        }

        let direction = signal.signum();
        let sensitivity = if direction > 0.0 {
            self.reward_sensitivity
        } else {
            self.punishment_sensitivity
        };
        if sensitivity <= 0.0 {
            return None;
        }

        let activation_scale = if feedback.activation_count > 0 {
            (feedback.activation_count as f64 / 6.0).min(2.0)
        } else {
            0.25
        };
        let magnitude = (signal.abs()
            * self.learning_rate
            * sensitivity
            * (0.6 + 0.4 * activation_scale))
            .min(1.0);

        for i in 1..SENSOR_COUNT {
            let observed = sensors[i];
            let base = modulation.base_target(i);
            let current = self.experience_target[i].or(base).unwrap_or(0.0);
            let goal = if direction > 0.0 {
                observed
            } else {
                lerp(base.unwrap_or(0.0), 0.0, self.volatility)
            };
            self.experience_target[i] = Some(lerp(current, goal, magnitude).clamp(-1.0, 1.0));
            modulation.nudge_gain(i, observed.abs() * magnitude * self.volatility * direction);
        }

        tracing::trace!(signal, direction, magnitude, "Applied sensor feedback");
        Some(FeedbackOutcome {
            signal,
            direction,
            magnitude,
        })
    }

    /// Blends externally supplied targets and gains into the state.
    ///
    /// Returns how many adjustments were applied.
    pub fn apply_experience_imprint(
        &mut self,
        modulation: &mut SensorModulation,
        adjustments: &[ExperienceAdjustment],
        assimilation: f64,
        gain_influence: f64,
    ) -> usize {
        let assimilation = finite_or(assimilation, 0.0);
        let gain_influence = finite_or(gain_influence, 0.0);
        let mut applied = 0;

        for adjustment in adjustments {
            let Some(i) = adjustment.resolve_index() else {
                continue;
            };
            let factor = finite_or(adjustment.assimilation.unwrap_or(assimilation), 0.0).min(1.0);
            if factor <= 0.0 || !adjustment.target.is_finite() {
                continue;
            }

            let target = adjustment.target.clamp(-1.0, 1.0);
            let current = self.experience_target[i]
                .or(modulation.base_target(i))
                .unwrap_or(0.0);
            self.experience_target[i] = Some(lerp(current, target, factor).clamp(-1.0, 1.0));

            let desired = adjustment
                .gain
                .filter(|g| g.is_finite())
                .unwrap_or_else(|| {
                    modulation.baseline[i]
                        + target * gain_influence * modulation.gain_range() * IMPRINT_GAIN_SPAN
                });
            let blend = finite_or(adjustment.gain_blend.unwrap_or(1.0), 0.0);
            modulation.blend_gain(i, desired, factor * blend);
            applied += 1;
        }

        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::sensors::bias_only;
    use vivarium_data::GainLimits;

    fn learner() -> SensorPlasticity {
        SensorPlasticity::from_profile(Some(&PlasticityProfile {
            learning_rate: 0.3,
            reward_sensitivity: 1.0,
            punishment_sensitivity: 1.0,
            retention: 1.0,
            volatility: 0.5,
            fatigue_weight: 0.0,
            cost_weight: 0.0,
        }))
    }

    fn feedback_with(sensors: SensorVector, reward: f64) -> Feedback {
        Feedback {
            sensors: Some(sensors),
            activation_count: 3,
            reward,
            max_capacity: 100.0,
            ..Feedback::default()
        }
    }

    #[test]
    fn test_absent_profile_disables_plasticity() {
        let plasticity = SensorPlasticity::from_profile(None);
        assert!(!plasticity.enabled);

        let muted = SensorPlasticity::from_profile(Some(&PlasticityProfile {
            learning_rate: 0.2,
            reward_sensitivity: 0.0,
            punishment_sensitivity: 0.0,
            ..PlasticityProfile::default()
        }));
        assert!(!muted.enabled);
    }

    #[test]
    fn test_profile_values_are_clamped() {
        let plasticity = SensorPlasticity::from_profile(Some(&PlasticityProfile {
            learning_rate: 3.0,
            reward_sensitivity: f64::NAN,
            volatility: -1.0,
            retention: 7.0,
            ..PlasticityProfile::default()
        }));
        assert_eq!(plasticity.learning_rate, MAX_LEARNING_RATE);
        assert_eq!(plasticity.reward_sensitivity, 1.0);
        assert_eq!(plasticity.volatility, 0.0);
        assert_eq!(plasticity.retention, 1.0);
        assert!(plasticity.enabled);
    }

    #[test]
    fn test_reward_moves_target_toward_observation() {
        let mut plasticity = learner();
        let mut modulation = SensorModulation::neutral(GainLimits::default());
        let mut sensors = bias_only();
        sensors[4] = 0.8;

        let outcome = plasticity
            .apply_feedback(&mut modulation, &feedback_with(sensors, 1.0))
            .expect("reward should be learned");
        assert_eq!(outcome.direction, 1.0);

        let learned = plasticity.experience_target[4].expect("target set");
        assert!((0.8 - learned).abs() < 0.8);
        assert!(learned > 0.0);
        assert!(modulation.gain[4] > 1.0);
    }

    #[test]
    fn test_punishment_repels_toward_repulse_baseline() {
        let mut plasticity = learner();
        let mut modulation = SensorModulation::neutral(GainLimits::default());
        plasticity.experience_target[2] = Some(0.9);
        let mut sensors = bias_only();
        sensors[2] = 0.9;

        let outcome = plasticity
            .apply_feedback(&mut modulation, &feedback_with(sensors, -1.0))
            .expect("punishment should be learned");
        assert_eq!(outcome.direction, -1.0);
        assert!(plasticity.experience_target[2].unwrap() < 0.9);
        assert!(modulation.gain[2] < 1.0);
    }

    #[test]
    fn test_weak_signal_is_ignored() {
        let mut plasticity = learner();
        let mut modulation = SensorModulation::neutral(GainLimits::default());
        let before = plasticity.clone();
        assert!(plasticity
            .apply_feedback(&mut modulation, &feedback_with(bias_only(), 0.0))
            .is_none());
        assert_eq!(plasticity, before);

        assert!(plasticity
            .apply_feedback(&mut modulation, &Feedback::default())
            .is_none());
    }

    #[test]
    fn test_cost_and_fatigue_combine_into_signal() {
        let mut plasticity = SensorPlasticity::from_profile(Some(&PlasticityProfile {
            learning_rate: 0.2,
            cost_weight: 1.0,
            fatigue_weight: 1.0,
            ..PlasticityProfile::default()
        }));
        let mut modulation = SensorModulation::neutral(GainLimits::default());
        let feedback = Feedback {
            sensors: Some(bias_only()),
            activation_count: 0,
            energy_cost: 50.0,
            fatigue_delta: 0.1,
            reward: 0.0,
            max_capacity: 100.0,
        };
        let outcome = plasticity
            .apply_feedback(&mut modulation, &feedback)
            .expect("cost should register");
        assert!((outcome.signal - (0.1 - 0.5)).abs() < 1e-12);
        assert_eq!(outcome.direction, -1.0);
        let expected = 0.4 * 0.2 * 1.0 * (0.6 + 0.4 * 0.25);
        assert!((outcome.magnitude - expected).abs() < 1e-12);
    }

    #[test]
    fn test_retention_relaxes_targets() {
        let mut plasticity = SensorPlasticity::from_profile(Some(&PlasticityProfile {
            learning_rate: 0.2,
            retention: 0.5,
            ..PlasticityProfile::default()
        }));
        let mut modulation = SensorModulation::neutral(GainLimits::default());
        plasticity.experience_target[5] = Some(0.6);

        plasticity.apply_feedback(&mut modulation, &feedback_with(bias_only(), 0.0));
        assert!((plasticity.experience_target[5].unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_gains_stay_within_limits_under_repeated_feedback() {
        let mut plasticity = SensorPlasticity::from_profile(Some(&PlasticityProfile {
            learning_rate: 0.5,
            reward_sensitivity: 2.0,
            punishment_sensitivity: 2.0,
            volatility: 2.0,
            ..PlasticityProfile::default()
        }));
        let limits = GainLimits { min: 0.4, max: 1.6 };
        let mut modulation = SensorModulation::neutral(limits);
        let sensors = [1.0; SENSOR_COUNT];

        for tick in 0..50 {
            let reward = if tick % 3 == 0 { -2.0 } else { 2.0 };
            plasticity.apply_feedback(&mut modulation, &feedback_with(sensors, reward));
            for &g in &modulation.gain[1..] {
                assert!((limits.min..=limits.max).contains(&g));
            }
        }
    }

    #[test]
    fn test_imprint_resolves_by_index_or_name() {
        let mut plasticity = SensorPlasticity::default();
        let mut modulation = SensorModulation::neutral(GainLimits::default());
        let adjustments = vec![
            ExperienceAdjustment {
                index: Some(3),
                target: 1.0,
                ..ExperienceAdjustment::default()
            },
            ExperienceAdjustment {
                sensor: Some("momentum".to_string()),
                target: -0.5,
                gain: Some(1.8),
                ..ExperienceAdjustment::default()
            },
            ExperienceAdjustment {
                sensor: Some("unknown".to_string()),
                target: 1.0,
                ..ExperienceAdjustment::default()
            },
            ExperienceAdjustment {
                index: Some(6),
                target: 1.0,
                assimilation: Some(0.0),
                ..ExperienceAdjustment::default()
            },
        ];

        let applied = plasticity.apply_experience_imprint(&mut modulation, &adjustments, 0.5, 1.0);
        assert_eq!(applied, 2);
        assert_eq!(plasticity.experience_target[3], Some(0.5));
        let momentum = sensor_index("momentum").unwrap();
        assert_eq!(plasticity.experience_target[momentum], Some(-0.25));
        assert!((modulation.gain[momentum] - 1.4).abs() < 1e-12);
        let expected = 1.0 + (1.0 + 1.0 * 1.0 * 1.5 * IMPRINT_GAIN_SPAN - 1.0) * 0.5;
        assert!((modulation.gain[3] - expected).abs() < 1e-12);
        assert_eq!(plasticity.experience_target[6], None);
    }
}
