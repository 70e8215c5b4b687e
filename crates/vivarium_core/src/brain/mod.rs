pub mod activation;
pub mod connectome;
pub mod evaluate;
pub mod modulation;
pub mod outputs;
pub mod plasticity;
pub mod prune;
pub mod sensors;
pub mod snapshot;

pub use activation::ActivationKind;
pub use connectome::{Connection, Connectome, ConnectomeDraft};
pub use evaluate::{EvaluateOptions, Evaluation, EvaluationTrace, NeuronTrace, SensorTrace, TraceInput};
pub use modulation::SensorModulation;
pub use outputs::{OutputGroup, OutputRegistry, OutputSpec};
pub use plasticity::{ExperienceAdjustment, Feedback, FeedbackOutcome, SensorPlasticity};
pub use sensors::{sensor_index, SensorVector, SENSOR_COUNT, SENSOR_KEYS};
pub use snapshot::{BrainSnapshot, LastEvaluation};
pub use vivarium_data::{
    BrainMetrics, GainLimits, Gene, Genome, PlasticityProfile, SensorModulationProfile,
};

use evaluate::Scratch;
use std::borrow::Borrow;

/// What a brain needs from a genome.
pub trait GenomeSource {
    fn genes(&self) -> &[Gene];

    fn sensor_modulation(&self) -> Option<&SensorModulationProfile> {
        None
    }

    fn plasticity(&self) -> Option<&PlasticityProfile> {
        None
    }

    /// Called once with the size of the brain built from this genome.
    fn on_brain_built(&self, _metrics: BrainMetrics) {}
}

impl GenomeSource for Genome {
    fn genes(&self) -> &[Gene] {
        &self.genes
    }

    fn sensor_modulation(&self) -> Option<&SensorModulationProfile> {
        self.sensor_modulation.as_ref()
    }

    fn plasticity(&self) -> Option<&PlasticityProfile> {
        self.plasticity.as_ref()
    }

    fn on_brain_built(&self, metrics: BrainMetrics) {
        self.brain_metrics.set(Some(metrics));
    }
}

impl GenomeSource for [Gene] {
    fn genes(&self) -> &[Gene] {
        self
    }
}

impl GenomeSource for Vec<Gene> {
    fn genes(&self) -> &[Gene] {
        self
    }
}

/// Construction settings shared by every brain in a simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrainOptions {
    pub registry: OutputRegistry,
    /// Gain limits used when a genome's modulation profile carries none.
    pub default_gain_limits: GainLimits,
    /// Initial capacity of the evaluation frame stack.
    pub scratch_capacity: usize,
}

impl Default for BrainOptions {
    fn default() -> Self {
        Self {
            registry: OutputRegistry::standard(),
            default_gain_limits: GainLimits::default(),
            scratch_capacity: 32,
        }
    }
}

/// Heritable neural controller of one organism.
///
/// Built once at birth and never restructured. Only the modulation and
/// plasticity state change afterwards.
#[derive(Debug)]
pub struct Brain {
    registry: OutputRegistry,
    connectome: Connectome,
    modulation: SensorModulation,
    plasticity: SensorPlasticity,
    scratch: Scratch,
    raw_sensors: SensorVector,
    last: LastCall,
}

/// Bookkeeping of the most recent evaluation, kept in reusable buffers.
#[derive(Debug)]
struct LastCall {
    group: Option<&'static OutputGroup>,
    sensors: SensorVector,
    values: Vec<f64>,
    activation_count: usize,
    trace: Option<EvaluationTrace>,
}

impl LastCall {
    fn new() -> Self {
        Self {
            group: None,
            sensors: sensors::bias_only(),
            values: Vec::new(),
            activation_count: 0,
            trace: None,
        }
    }

    fn to_evaluation(&self) -> LastEvaluation {
        let outputs = self.group.filter(|_| self.activation_count > 0).map(|group| {
            evaluate::keyed_values(group.outputs, &self.values)
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect()
        });
        LastEvaluation {
            group: self.group.map(|g| g.name.to_string()),
            sensors: self.sensors,
            outputs,
            activation_count: self.activation_count,
            trace: self.trace.clone(),
        }
    }
}

impl Brain {
    /// Builds a brain from a genome with the standard output registry.
    ///
    /// Returns `None` when the genome carries no genes at all.
    #[must_use]
    pub fn from_genome<G: GenomeSource + ?Sized>(genome: &G) -> Option<Self> {
        Self::from_genome_with(genome, &BrainOptions::default())
    }

    #[must_use]
    pub fn from_genome_with<G: GenomeSource + ?Sized>(
        genome: &G,
        options: &BrainOptions,
    ) -> Option<Self> {
        let genes = genome.genes();
        if genes.is_empty() {
            return None;
        }
        let brain = Self::from_genes(
            genes,
            genome.sensor_modulation(),
            genome.plasticity(),
            options,
        );
        genome.on_brain_built(brain.metrics());
        Some(brain)
    }

    /// Builds, prunes and compiles the connectome. Never fails.
    #[must_use]
    pub fn from_genes(
        genes: &[Gene],
        modulation: Option<&SensorModulationProfile>,
        plasticity: Option<&PlasticityProfile>,
        options: &BrainOptions,
    ) -> Self {
        let mut draft = ConnectomeDraft::from_genes(genes);
        let dropped = draft.dropped_genes;
        prune::prune_unreachable(&mut draft, options.registry.output_ids());
        let connectome = Connectome::compile(draft);

        tracing::debug!(
            genes = genes.len(),
            dropped,
            neurons = connectome.neuron_count(),
            connections = connectome.connection_count(),
            "Built brain"
        );

        Self {
            registry: options.registry,
            scratch: Scratch::with_capacity(connectome.dense_len(), options.scratch_capacity),
            connectome,
            modulation: SensorModulation::from_profile(modulation, options.default_gain_limits),
            plasticity: SensorPlasticity::from_profile(plasticity),
            raw_sensors: sensors::bias_only(),
            last: LastCall::new(),
        }
    }

    /// Evaluates an output group against named sensor readings.
    ///
    /// Unknown or empty groups yield `values: None` without touching any
    /// state. `values` is also `None` when no neuron fired.
    pub fn evaluate<I, K, V>(&mut self, group: &str, readings: I, options: EvaluateOptions) -> Evaluation
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Borrow<f64>,
    {
        let Some(group) = self
            .registry
            .group(group)
            .filter(|g| !g.outputs.is_empty())
        else {
            return Evaluation {
                values: None,
                activation_count: 0,
                sensors: sensors::bias_only(),
                trace: None,
            };
        };

        sensors::fill_raw(readings, &mut self.raw_sensors);
        let mut modulated = sensors::bias_only();
        self.modulation.modulate(
            &self.raw_sensors,
            &self.plasticity.experience_target,
            &mut modulated,
        );

        let mut trace = options.trace.then(|| EvaluationTrace {
            group: group.name.to_string(),
            ..EvaluationTrace::default()
        });
        let activation_count = evaluate::evaluate_outputs(
            &self.connectome,
            &mut self.scratch,
            &modulated,
            group.outputs,
            &mut self.last.values,
            trace.as_mut(),
        );
        let values = (activation_count > 0)
            .then(|| evaluate::keyed_values(group.outputs, &self.last.values));

        self.last.group = Some(group);
        self.last.sensors = modulated;
        self.last.activation_count = activation_count;
        // Traces are diagnostic; only traced calls pay for the copy.
        self.last.trace.clone_from(&trace);

        Evaluation {
            values,
            activation_count,
            sensors: modulated,
            trace,
        }
    }

    /// Applies one tick of outcome feedback to sensor plasticity.
    pub fn apply_feedback(&mut self, feedback: &Feedback) -> Option<FeedbackOutcome> {
        self.plasticity.apply_feedback(&mut self.modulation, feedback)
    }

    /// Applies feedback against the last evaluated sensor vector.
    pub fn apply_last_feedback(
        &mut self,
        energy_cost: f64,
        fatigue_delta: f64,
        reward: f64,
        max_capacity: f64,
    ) -> Option<FeedbackOutcome> {
        let feedback = Feedback {
            sensors: self.last.group.is_some().then_some(self.last.sensors),
            activation_count: self.last.activation_count,
            energy_cost,
            fatigue_delta,
            reward,
            max_capacity,
        };
        self.apply_feedback(&feedback)
    }

    /// Blends externally supplied experience (e.g. social learning) into the
    /// sensor targets and gains. Returns how many adjustments applied.
    pub fn apply_experience_imprint(
        &mut self,
        adjustments: &[ExperienceAdjustment],
        assimilation: f64,
        gain_influence: f64,
    ) -> usize {
        self.plasticity.apply_experience_imprint(
            &mut self.modulation,
            adjustments,
            assimilation,
            gain_influence,
        )
    }

    #[must_use]
    pub fn snapshot(&self) -> BrainSnapshot {
        BrainSnapshot {
            neuron_count: self.neuron_count(),
            connection_count: self.connection_count(),
            connections: self.connectome.connections().to_vec(),
            activations: self.connectome.activation_map(),
            last: self.last.to_evaluation(),
            modulation: self.modulation.clone(),
            plasticity: self.plasticity.clone(),
        }
    }

    #[must_use]
    pub fn metrics(&self) -> BrainMetrics {
        BrainMetrics {
            neuron_count: self.neuron_count(),
            connection_count: self.connection_count(),
        }
    }

    #[must_use]
    pub fn neuron_count(&self) -> usize {
        self.connectome.neuron_count()
    }

    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connectome.connection_count()
    }

    /// True when pruning left nothing to evaluate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connectome.is_empty()
    }

    #[must_use]
    pub fn registry(&self) -> OutputRegistry {
        self.registry
    }

    #[must_use]
    pub fn connectome(&self) -> &Connectome {
        &self.connectome
    }

    #[must_use]
    pub fn modulation(&self) -> &SensorModulation {
        &self.modulation
    }

    #[must_use]
    pub fn plasticity(&self) -> &SensorPlasticity {
        &self.plasticity
    }

    #[must_use]
    pub fn last_evaluation(&self) -> LastEvaluation {
        self.last.to_evaluation()
    }
}
