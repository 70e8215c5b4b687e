//! Genome loading and seeded genome generation.
//!
//! Genome evolution lives elsewhere; this module only gets genomes into the
//! crate (from JSON or hex) and produces reproducible seed genomes for
//! demos, benchmarks and property tests.

use crate::brain::outputs::OutputRegistry;
use crate::brain::sensors::SENSOR_COUNT;
use crate::error::{BrainError, Result};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use vivarium_data::{GainLimits, Gene, Genome, PlasticityProfile, SensorModulationProfile};

/// First id handed to hidden neurons of seeded genomes.
pub const HIDDEN_ID_START: usize = 1000;
const ACTIVATION_CODES: i64 = 9;

/// Decodes a genome from JSON text or a hex-encoded JSON blob.
pub fn decode_genome(text: &str) -> Result<Genome> {
    let text = text.trim();
    if text.starts_with('{') {
        return Ok(serde_json::from_str(text)?);
    }
    let bytes = hex::decode(text)?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn load_genome<P: AsRef<Path>>(path: P) -> Result<Genome> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| BrainError::from(e).with_context(format!("reading {}", path.display())))?;
    decode_genome(&text).map_err(|e| e.with_context(format!("decoding {}", path.display())))
}

fn random_gene<R: Rng>(rng: &mut R, source: usize, target: usize) -> Gene {
    let mut gene = Gene::new(
        source,
        target,
        rng.gen_range(-1.5..1.5),
        rng.gen_range(0..ACTIVATION_CODES),
    );
    gene.enabled = rng.gen_bool(0.9);
    gene
}

/// Generates a random, possibly recurrent genome wired to the registry's outputs.
pub fn random_genome_with_rng<R: Rng>(
    rng: &mut R,
    registry: OutputRegistry,
    hidden: usize,
) -> Genome {
    let hidden_ids: Vec<usize> = (HIDDEN_ID_START..HIDDEN_ID_START + hidden).collect();
    let mut genes = Vec::new();

    for &h in &hidden_ids {
        for _ in 0..rng.gen_range(2..=4) {
            let sensor = rng.gen_range(0..SENSOR_COUNT);
            genes.push(random_gene(rng, sensor, h));
        }
        if rng.gen_bool(0.2) {
            let other = hidden_ids[rng.gen_range(0..hidden_ids.len())];
            genes.push(random_gene(rng, other, h));
        }
    }

    for output in registry.output_ids() {
        for _ in 0..rng.gen_range(1..=2) {
            let source = if hidden_ids.is_empty() || rng.gen_bool(0.3) {
                rng.gen_range(0..SENSOR_COUNT)
            } else {
                hidden_ids[rng.gen_range(0..hidden_ids.len())]
            };
            genes.push(random_gene(rng, source, output));
        }
    }

    let sensor_modulation = SensorModulationProfile {
        baseline_gains: (0..SENSOR_COUNT).map(|_| rng.gen_range(0.8..1.2)).collect(),
        targets: (0..SENSOR_COUNT)
            .map(|_| rng.gen_bool(0.5).then(|| rng.gen_range(-0.5..0.5)))
            .collect(),
        adaptation_rate: rng.gen_range(0.0..0.3),
        reversion_rate: rng.gen_range(0.0..0.2),
        gain_limits: Some(GainLimits { min: 0.5, max: 1.8 }),
    };
    let plasticity = PlasticityProfile {
        learning_rate: rng.gen_range(0.0..0.3),
        reward_sensitivity: rng.gen_range(0.5..1.5),
        punishment_sensitivity: rng.gen_range(0.5..1.5),
        retention: rng.gen_range(0.9..1.0),
        volatility: rng.gen_range(0.0..1.0),
        fatigue_weight: rng.gen_range(0.0..1.0),
        cost_weight: rng.gen_range(0.0..1.0),
    };

    Genome {
        genes,
        sensor_modulation: Some(sensor_modulation),
        plasticity: Some(plasticity),
        ..Genome::default()
    }
}

/// Deterministic seed genome with eight hidden neurons.
#[must_use]
pub fn random_genome(seed: u64) -> Genome {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    random_genome_with_rng(&mut rng, OutputRegistry::standard(), 8)
}
