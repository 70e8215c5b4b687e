use super::activation::ActivationKind;
use super::connectome::Connectome;
use super::outputs::OutputSpec;
use super::sensors::{sensor_key, SensorVector, SENSOR_COUNT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-call evaluation switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvaluateOptions {
    /// Collect an [`EvaluationTrace`] alongside the values.
    pub trace: bool,
}

impl EvaluateOptions {
    #[must_use]
    pub fn traced() -> Self {
        Self { trace: true }
    }
}

/// Result of evaluating one output group.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Evaluation {
    /// Output values keyed by output key. `None` when no neuron fired.
    pub values: Option<BTreeMap<&'static str, f64>>,
    pub activation_count: usize,
    /// Post-modulation sensor vector the network saw.
    pub sensors: SensorVector,
    pub trace: Option<EvaluationTrace>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EvaluationTrace {
    pub group: String,
    pub sensors: Vec<SensorTrace>,
    pub neurons: Vec<NeuronTrace>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SensorTrace {
    pub id: usize,
    pub key: String,
    pub value: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NeuronTrace {
    pub id: usize,
    pub activation: ActivationKind,
    pub sum: f64,
    pub output: f64,
    pub inputs: Vec<TraceInput>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TraceInput {
    pub source: usize,
    pub weight: f64,
    pub value: f64,
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    node: usize,
    cursor: usize,
    end: usize,
    sum: f64,
    inputs_start: usize,
}

/// Reusable evaluation buffers.
///
/// Cache and in-progress marks are generation stamps, so starting a new
/// call is a counter bump rather than a clear.
#[derive(Clone, Debug)]
pub struct Scratch {
    generation: u32,
    cache_stamp: Vec<u32>,
    cache_value: Vec<f64>,
    active_stamp: Vec<u32>,
    sensor_stamp: [u32; SENSOR_COUNT],
    frames: Vec<Frame>,
    inputs: Vec<TraceInput>,
}

impl Default for Scratch {
    fn default() -> Self {
        Self::with_capacity(SENSOR_COUNT, 0)
    }
}

impl Scratch {
    #[must_use]
    pub fn with_capacity(dense_len: usize, frame_capacity: usize) -> Self {
        Self {
            generation: 0,
            cache_stamp: vec![0; dense_len],
            cache_value: vec![0.0; dense_len],
            active_stamp: vec![0; dense_len],
            sensor_stamp: [0; SENSOR_COUNT],
            frames: Vec::with_capacity(frame_capacity),
            inputs: Vec::new(),
        }
    }

    fn begin(&mut self, dense_len: usize) {
        if self.cache_stamp.len() < dense_len {
            self.cache_stamp.resize(dense_len, 0);
            self.cache_value.resize(dense_len, 0.0);
            self.active_stamp.resize(dense_len, 0);
        }
        if self.generation == u32::MAX {
            self.cache_stamp.fill(0);
            self.active_stamp.fill(0);
            self.sensor_stamp = [0; SENSOR_COUNT];
            self.generation = 0;
        }
        self.generation += 1;
        self.frames.clear();
        self.inputs.clear();
    }
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Memoized, cycle-safe evaluation over one call.
///
/// A node reached again while it is still being computed contributes 0 to
/// that path only; the 0 is never cached, so later paths see the finished
/// value.
pub struct GroupEvaluator<'a> {
    connectome: &'a Connectome,
    scratch: &'a mut Scratch,
    sensors: &'a SensorVector,
    trace: Option<&'a mut EvaluationTrace>,
    activation_count: usize,
}

impl<'a> GroupEvaluator<'a> {
    pub fn new(
        connectome: &'a Connectome,
        scratch: &'a mut Scratch,
        sensors: &'a SensorVector,
        trace: Option<&'a mut EvaluationTrace>,
    ) -> Self {
        scratch.begin(connectome.dense_len());
        Self {
            connectome,
            scratch,
            sensors,
            trace,
            activation_count: 0,
        }
    }

    /// Neurons computed so far in this call.
    #[must_use]
    pub fn activation_count(&self) -> usize {
        self.activation_count
    }

    /// Value of a node id. Ids missing from the connectome read 0.
    pub fn value_of(&mut self, id: usize) -> f64 {
        if id < SENSOR_COUNT {
            return self.touch_sensor(id);
        }
        match self.connectome.index_of(id) {
            Some(dense) => self.resolve(dense),
            None => 0.0,
        }
    }

    fn touch_sensor(&mut self, id: usize) -> f64 {
        let value = self.sensors[id];
        if let Some(trace) = self.trace.as_deref_mut() {
            if self.scratch.sensor_stamp[id] != self.scratch.generation {
                self.scratch.sensor_stamp[id] = self.scratch.generation;
                trace.sensors.push(SensorTrace {
                    id,
                    key: sensor_key(id).unwrap_or_default().to_string(),
                    value,
                });
            }
        }
        value
    }

    fn cached(&self, node: usize) -> Option<f64> {
        (self.scratch.cache_stamp[node] == self.scratch.generation)
            .then(|| self.scratch.cache_value[node])
    }

    fn is_active(&self, node: usize) -> bool {
        self.scratch.active_stamp[node] == self.scratch.generation
    }

    fn push_frame(&mut self, node: usize) {
        let (start, end) = self.connectome.incoming_range(node);
        self.scratch.active_stamp[node] = self.scratch.generation;
        self.scratch.frames.push(Frame {
            node,
            cursor: start,
            end,
            sum: 0.0,
            inputs_start: self.scratch.inputs.len(),
        });
    }

    fn accumulate(&mut self, source: usize, weight: f64, value: f64) {
        if let Some(frame) = self.scratch.frames.last_mut() {
            frame.sum += weight * value;
            frame.cursor += 1;
        }
        if self.trace.is_some() {
            self.scratch.inputs.push(TraceInput {
                source: self.connectome.id_of(source),
                weight,
                value,
            });
        }
    }

    fn finish_frame(&mut self) -> f64 {
        let Some(frame) = self.scratch.frames.pop() else {
            return 0.0;
        };
        let node = frame.node;
        self.scratch.active_stamp[node] = 0;

        let activation = self.connectome.activation(node);
        let sum = finite_or_zero(frame.sum);
        let output = finite_or_zero(activation.apply(sum));
        self.scratch.cache_stamp[node] = self.scratch.generation;
        self.scratch.cache_value[node] = output;
        self.activation_count += 1;

        if let Some(trace) = self.trace.as_deref_mut() {
            let inputs = self.scratch.inputs.drain(frame.inputs_start..).collect();
            trace.neurons.push(NeuronTrace {
                id: self.connectome.id_of(node),
                activation,
                sum,
                output,
                inputs,
            });
        }
        output
    }

    fn resolve(&mut self, root: usize) -> f64 {
        if let Some(value) = self.cached(root) {
            return value;
        }
        if self.is_active(root) {
            return 0.0;
        }
        let depth = self.scratch.frames.len();
        self.push_frame(root);

        loop {
            let (cursor, end) = match self.scratch.frames.last() {
                Some(frame) => (frame.cursor, frame.end),
                None => return 0.0,
            };

            if cursor < end {
                let (source, weight) = self.connectome.incoming_edge(cursor);
                let value = if source < SENSOR_COUNT {
                    self.touch_sensor(source)
                } else if let Some(value) = self.cached(source) {
                    value
                } else if self.is_active(source) {
                    0.0
                } else {
                    self.push_frame(source);
                    continue;
                };
                self.accumulate(source, weight, value);
                continue;
            }

            let output = self.finish_frame();
            if self.scratch.frames.len() == depth {
                return output;
            }
            let parent_cursor = self.scratch.frames.last().map_or(0, |f| f.cursor);
            let (source, weight) = self.connectome.incoming_edge(parent_cursor);
            self.accumulate(source, weight, output);
        }
    }
}

/// Evaluates every output of a group against one sensor vector.
///
/// `values` is overwritten with one value per output, in group order.
/// Returns the number of neurons computed.
pub fn evaluate_outputs(
    connectome: &Connectome,
    scratch: &mut Scratch,
    sensors: &SensorVector,
    outputs: &[OutputSpec],
    values: &mut Vec<f64>,
    trace: Option<&mut EvaluationTrace>,
) -> usize {
    let mut evaluator = GroupEvaluator::new(connectome, scratch, sensors, trace);
    values.clear();
    values.extend(outputs.iter().map(|output| evaluator.value_of(output.id)));
    evaluator.activation_count()
}

/// Pairs output keys with values produced by [`evaluate_outputs`].
#[must_use]
pub fn keyed_values(outputs: &[OutputSpec], values: &[f64]) -> BTreeMap<&'static str, f64> {
    outputs
        .iter()
        .zip(values)
        .map(|(output, &value)| (output.key, value))
        .collect()
}
