use super::connectome::ConnectomeDraft;
use super::sensors::is_sensor;
use std::collections::BTreeSet;

/// Trims a draft to the subgraph that can influence the given outputs.
///
/// Outputs without incoming edges are dead and do not seed the walk.
/// Sensors are leaves and never enter the reachable set. When nothing is
/// reachable the draft is cleared entirely.
pub fn prune_unreachable<I>(draft: &mut ConnectomeDraft, output_ids: I)
where
    I: IntoIterator<Item = usize>,
{
    let mut stack: Vec<usize> = output_ids
        .into_iter()
        .filter(|id| draft.incoming.get(id).is_some_and(|edges| !edges.is_empty()))
        .collect();
    let mut reachable = BTreeSet::new();

    while let Some(id) = stack.pop() {
        if is_sensor(id) || !reachable.insert(id) {
            continue;
        }
        if let Some(edges) = draft.incoming.get(&id) {
            stack.extend(
                edges
                    .iter()
                    .map(|&(source, _)| source)
                    .filter(|&source| !is_sensor(source) && !reachable.contains(&source)),
            );
        }
    }

    if reachable.is_empty() {
        tracing::debug!(
            connections = draft.connections.len(),
            "No output is wired; clearing connectome"
        );
        draft.connections.clear();
        draft.incoming.clear();
        draft.activations.clear();
        draft.neuron_ids.clear();
        return;
    }

    draft.connections.retain(|c| {
        reachable.contains(&c.target) && (is_sensor(c.source) || reachable.contains(&c.source))
    });
    draft.incoming.retain(|target, _| reachable.contains(target));
    draft.activations.retain(|id, _| reachable.contains(id));
    draft.neuron_ids = reachable;
}
