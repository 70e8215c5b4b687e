//! Output group registry.
//!
//! Output groups are static configuration: a brain never derives them from
//! its genes, it only decides whether it can drive them.

/// A single decision output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSpec {
    pub id: usize,
    pub key: &'static str,
    pub label: &'static str,
}

/// A named set of outputs evaluated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputGroup {
    pub name: &'static str,
    pub outputs: &'static [OutputSpec],
}

pub const MOVEMENT_OUTPUTS: [OutputSpec; 5] = [
    OutputSpec { id: 300, key: "rest", label: "Rest" },
    OutputSpec { id: 301, key: "pursue", label: "Pursue" },
    OutputSpec { id: 302, key: "avoid", label: "Avoid" },
    OutputSpec { id: 303, key: "cohere", label: "Cohere" },
    OutputSpec { id: 304, key: "explore", label: "Explore" },
];

pub const INTERACTION_OUTPUTS: [OutputSpec; 3] = [
    OutputSpec { id: 310, key: "avoid", label: "Avoid" },
    OutputSpec { id: 311, key: "fight", label: "Fight" },
    OutputSpec { id: 312, key: "cooperate", label: "Cooperate" },
];

pub const REPRODUCTION_OUTPUTS: [OutputSpec; 2] = [
    OutputSpec { id: 320, key: "decline", label: "Decline" },
    OutputSpec { id: 321, key: "accept", label: "Accept" },
];

pub const TARGETING_OUTPUTS: [OutputSpec; 4] = [
    OutputSpec { id: 330, key: "focus_weak", label: "Focus Weak" },
    OutputSpec { id: 331, key: "focus_strong", label: "Focus Strong" },
    OutputSpec { id: 332, key: "prefer_proximity", label: "Prefer Proximity" },
    OutputSpec { id: 333, key: "prefer_attrition", label: "Prefer Attrition" },
];

pub const STANDARD_GROUPS: [OutputGroup; 4] = [
    OutputGroup { name: "movement", outputs: &MOVEMENT_OUTPUTS },
    OutputGroup { name: "interaction", outputs: &INTERACTION_OUTPUTS },
    OutputGroup { name: "reproduction", outputs: &REPRODUCTION_OUTPUTS },
    OutputGroup { name: "targeting", outputs: &TARGETING_OUTPUTS },
];

/// Read-only handle on a set of output groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputRegistry {
    groups: &'static [OutputGroup],
}

impl Default for OutputRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl OutputRegistry {
    #[must_use]
    pub const fn new(groups: &'static [OutputGroup]) -> Self {
        Self { groups }
    }

    /// The movement/interaction/reproduction/targeting registry used by the simulation.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(&STANDARD_GROUPS)
    }

    #[must_use]
    pub fn group(&self, name: &str) -> Option<&'static OutputGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    #[must_use]
    pub fn groups(&self) -> &'static [OutputGroup] {
        self.groups
    }

    /// Every output id across all groups, in registry order.
    pub fn output_ids(&self) -> impl Iterator<Item = usize> + 'static {
        self.groups
            .iter()
            .flat_map(|g| g.outputs.iter().map(|o| o.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::sensors::SENSOR_COUNT;

    #[test]
    fn test_standard_ids_are_neurons() {
        for id in OutputRegistry::standard().output_ids() {
            assert!(id >= SENSOR_COUNT);
        }
    }

    #[test]
    fn test_group_lookup() {
        let registry = OutputRegistry::standard();
        let movement = registry.group("movement").expect("movement group exists");
        assert_eq!(movement.outputs.len(), 5);
        assert_eq!(movement.outputs[0].id, 300);
        assert!(registry.group("teleport").is_none());
        assert_eq!(registry.output_ids().count(), 14);
    }

    #[test]
    fn test_custom_registry() {
        static EMPTY: [OutputGroup; 1] = [OutputGroup {
            name: "idle",
            outputs: &[],
        }];
        let registry = OutputRegistry::new(&EMPTY);
        assert!(registry.group("idle").is_some_and(|g| g.outputs.is_empty()));
        assert!(registry.group("movement").is_none());
    }
}
