use super::activation::ActivationKind;
use super::sensors::{is_sensor, SENSOR_COUNT};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use vivarium_data::Gene;

/// Ids beyond this are treated as malformed rather than allocated.
pub const MAX_NODE_ID: f64 = u32::MAX as f64;

/// An expressed gene, carrying the activation code it declared.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Connection {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
    pub activation: ActivationKind,
}

/// Adjacency built straight from genes, before pruning.
#[derive(Clone, Debug, Default)]
pub struct ConnectomeDraft {
    pub connections: Vec<Connection>,
    /// Incoming `(source, weight)` per target, in gene order.
    pub incoming: BTreeMap<usize, Vec<(usize, f64)>>,
    pub activations: BTreeMap<usize, ActivationKind>,
    /// Non-sensor ids referenced by any expressed gene.
    pub neuron_ids: BTreeSet<usize>,
    pub dropped_genes: usize,
}

fn resolve_id(raw: f64) -> Option<usize> {
    if raw.is_finite() && (0.0..=MAX_NODE_ID).contains(&raw) {
        Some(raw.trunc() as usize)
    } else {
        None
    }
}

fn resolve_weight(raw: f64) -> f64 {
    if raw.is_finite() {
        raw
    } else {
        0.0
    }
}

impl ConnectomeDraft {
    /// Expresses every enabled gene with usable ids.
    ///
    /// The first gene into a node decides its activation kind.
    #[must_use]
    pub fn from_genes(genes: &[Gene]) -> Self {
        let mut draft = Self::default();

        for gene in genes {
            let (Some(source), Some(target)) = (resolve_id(gene.source_id), resolve_id(gene.target_id))
            else {
                draft.dropped_genes += 1;
                continue;
            };
            if !gene.enabled {
                draft.dropped_genes += 1;
                continue;
            }

            let weight = resolve_weight(gene.weight);
            let activation = ActivationKind::from_code(gene.activation);
            draft.activations.entry(target).or_insert(activation);

            draft.connections.push(Connection {
                source,
                target,
                weight,
                activation,
            });
            draft
                .incoming
                .entry(target)
                .or_default()
                .push((source, weight));

            for id in [source, target] {
                if !is_sensor(id) {
                    draft.neuron_ids.insert(id);
                }
            }
        }

        draft
    }
}

/// Compiled, pruned adjacency used by the evaluator.
///
/// Dense indices `[0, SENSOR_COUNT)` are sensors. Neurons follow in
/// ascending id order. Incoming edges are stored flat with per-neuron offsets.
#[derive(Clone, Debug, Default)]
pub struct Connectome {
    connections: Vec<Connection>,
    neuron_ids: Vec<usize>,
    activations: Vec<ActivationKind>,
    node_idx_map: HashMap<usize, usize>,
    incoming_flat: Vec<(usize, f64)>,
    incoming_offsets: Vec<usize>,
}

impl Connectome {
    #[must_use]
    pub fn compile(draft: ConnectomeDraft) -> Self {
        let neuron_ids: Vec<usize> = draft.neuron_ids.into_iter().collect();
        let node_idx_map: HashMap<usize, usize> = neuron_ids
            .iter()
            .enumerate()
            .map(|(pos, &id)| (id, SENSOR_COUNT + pos))
            .collect();

        let activations = neuron_ids
            .iter()
            .map(|id| draft.activations.get(id).copied().unwrap_or_default())
            .collect();

        let mut incoming_flat = Vec::with_capacity(draft.connections.len());
        let mut incoming_offsets = Vec::with_capacity(neuron_ids.len() + 1);
        incoming_offsets.push(0);

        for id in &neuron_ids {
            if let Some(edges) = draft.incoming.get(id) {
                for &(source, weight) in edges {
                    let dense = if is_sensor(source) {
                        Some(source)
                    } else {
                        node_idx_map.get(&source).copied()
                    };
                    if let Some(dense) = dense {
                        incoming_flat.push((dense, weight));
                    }
                }
            }
            incoming_offsets.push(incoming_flat.len());
        }

        Self {
            connections: draft.connections,
            neuron_ids,
            activations,
            node_idx_map,
            incoming_flat,
            incoming_offsets,
        }
    }

    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    #[must_use]
    pub fn neuron_ids(&self) -> &[usize] {
        &self.neuron_ids
    }

    #[must_use]
    pub fn neuron_count(&self) -> usize {
        self.neuron_ids.len()
    }

    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Size of the dense index space (sensors plus neurons).
    #[must_use]
    pub fn dense_len(&self) -> usize {
        SENSOR_COUNT + self.neuron_ids.len()
    }

    /// Dense index of a node id, if the node exists.
    #[must_use]
    pub fn index_of(&self, id: usize) -> Option<usize> {
        if is_sensor(id) {
            Some(id)
        } else {
            self.node_idx_map.get(&id).copied()
        }
    }

    /// Node id of a dense index.
    #[must_use]
    pub fn id_of(&self, dense: usize) -> usize {
        if dense < SENSOR_COUNT {
            dense
        } else {
            self.neuron_ids[dense - SENSOR_COUNT]
        }
    }

    /// Activation kind of a neuron by dense index.
    #[must_use]
    pub fn activation(&self, dense: usize) -> ActivationKind {
        dense
            .checked_sub(SENSOR_COUNT)
            .and_then(|pos| self.activations.get(pos).copied())
            .unwrap_or_default()
    }

    /// Range into the flat incoming array for a neuron by dense index.
    #[must_use]
    pub fn incoming_range(&self, dense: usize) -> (usize, usize) {
        let pos = dense - SENSOR_COUNT;
        (self.incoming_offsets[pos], self.incoming_offsets[pos + 1])
    }

    #[must_use]
    pub fn incoming_edge(&self, cursor: usize) -> (usize, f64) {
        self.incoming_flat[cursor]
    }

    /// Activation kind per neuron id.
    #[must_use]
    pub fn activation_map(&self) -> BTreeMap<usize, ActivationKind> {
        self.neuron_ids
            .iter()
            .copied()
            .zip(self.activations.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_drops_disabled_and_malformed_genes() {
        let genes = vec![
            Gene::new(0, 300, 1.0, 2),
            Gene::new(1, 300, 0.5, 1).disabled(),
            Gene {
                source_id: f64::NAN,
                ..Gene::new(0, 301, 1.0, 2)
            },
            Gene {
                target_id: f64::INFINITY,
                ..Gene::new(0, 301, 1.0, 2)
            },
            Gene {
                target_id: -4.0,
                ..Gene::new(0, 301, 1.0, 2)
            },
        ];
        let draft = ConnectomeDraft::from_genes(&genes);

        assert_eq!(draft.connections.len(), 1);
        assert_eq!(draft.dropped_genes, 4);
        assert_eq!(draft.neuron_ids.iter().copied().collect::<Vec<_>>(), vec![300]);
        assert_eq!(draft.incoming[&300], vec![(0, 1.0)]);
    }

    #[test]
    fn test_first_gene_decides_activation() {
        let genes = vec![Gene::new(0, 400, 1.0, 1), Gene::new(1, 400, 1.0, 3)];
        let draft = ConnectomeDraft::from_genes(&genes);
        assert_eq!(draft.activations[&400], ActivationKind::Sigmoid);
        let declared: Vec<_> = draft.connections.iter().map(|c| c.activation).collect();
        assert_eq!(declared, vec![ActivationKind::Sigmoid, ActivationKind::Relu]);
    }

    #[test]
    fn test_defaults_for_missing_weight_and_activation() {
        let genes = vec![Gene {
            weight: f64::NAN,
            activation: None,
            ..Gene::new(0, 300, 0.0, 0)
        }];
        let draft = ConnectomeDraft::from_genes(&genes);
        assert_eq!(draft.connections[0].weight, 0.0);
        assert_eq!(draft.connections[0].activation, ActivationKind::Tanh);
    }

    #[test]
    fn test_compile_assigns_dense_indices() {
        let genes = vec![
            Gene::new(2, 500, 0.5, 2),
            Gene::new(500, 300, -1.0, 0),
            Gene::new(1, 300, 0.25, 0),
        ];
        let connectome = Connectome::compile(ConnectomeDraft::from_genes(&genes));

        assert_eq!(connectome.neuron_ids(), &[300, 500]);
        assert_eq!(connectome.dense_len(), SENSOR_COUNT + 2);
        let out = connectome.index_of(300).expect("output compiled");
        let hidden = connectome.index_of(500).expect("hidden compiled");
        assert_eq!(out, SENSOR_COUNT);
        assert_eq!(connectome.id_of(hidden), 500);
        assert_eq!(connectome.activation(out), ActivationKind::Identity);

        let (start, end) = connectome.incoming_range(out);
        let edges: Vec<_> = (start..end).map(|c| connectome.incoming_edge(c)).collect();
        assert_eq!(edges, vec![(hidden, -1.0), (1, 0.25)]);
        assert_eq!(connectome.index_of(3), Some(3));
        assert_eq!(connectome.index_of(999), None);
    }
}
