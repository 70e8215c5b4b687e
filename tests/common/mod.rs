use vivarium_lib::model::brain::{Brain, EvaluateOptions, Evaluation};
use vivarium_lib::model::genome::{Gene, Genome, PlasticityProfile};

/// Plasticity profile that learns from explicit reward only.
#[allow(dead_code)]
pub fn reward_learner() -> PlasticityProfile {
    PlasticityProfile {
        learning_rate: 0.3,
        reward_sensitivity: 1.0,
        punishment_sensitivity: 1.0,
        retention: 1.0,
        volatility: 0.5,
        fatigue_weight: 0.0,
        cost_weight: 0.0,
    }
}

/// Single bias -> rest edge.
#[allow(dead_code)]
pub fn bias_brain(plasticity: Option<PlasticityProfile>) -> Brain {
    let genome = Genome {
        genes: vec![Gene::new(0, 300, 1.0, 2)],
        plasticity,
        ..Genome::default()
    };
    Brain::from_genome(&genome).expect("genome has genes")
}

#[allow(dead_code)]
pub fn evaluate(brain: &mut Brain, group: &str, readings: &[(&str, f64)]) -> Evaluation {
    brain.evaluate(group, readings.iter().copied(), EvaluateOptions::default())
}
