use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::PlannerStep;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// Tree node identity. Copied by clone, never reused after removal.
define_id!(NodeId);

/// Namespace for decision identities; must never change between releases or
/// exported builds lose their replay matching.
const DECISION_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a0e_4b7d_4c3e_9a51_0d2e_8c7b_5f43);

/// Identity of a logical decision.
///
/// Derived from what the decision *is* rather than where it sits in a tree,
/// so the same question asked on a forked or rebuilt tree gets the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionId(Uuid);

impl DecisionId {
    /// Derive the id for a `step` choice introduced by an owning decision.
    ///
    /// `owner` is the name and step of the node the choice hangs under
    /// (`None` when the choice is not yet anchored in the tree). `ordinal`
    /// separates repeated choices of the same step under one owner.
    pub fn derive(step: PlannerStep, owner: Option<(&str, Option<PlannerStep>)>, ordinal: usize) -> Self {
        let owner_key = match owner {
            Some((name, owner_step)) => format!(
                "{}@{}",
                name,
                owner_step.map_or("ROOT", |step| step.as_str())
            ),
            None => "*".to_string(),
        };
        let key = format!("{}|{}|{}", step.as_str(), owner_key, ordinal);
        Self(Uuid::new_v5(&DECISION_NAMESPACE, key.as_bytes()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_ids_are_deterministic() {
        let a = DecisionId::derive(PlannerStep::Feat, Some(("Feat", Some(PlannerStep::ClassFeature))), 0);
        let b = DecisionId::derive(PlannerStep::Feat, Some(("Feat", Some(PlannerStep::ClassFeature))), 0);
        assert_eq!(a, b);
    }

    #[test]
    fn decision_ids_differ_by_context() {
        let base = DecisionId::derive(PlannerStep::LearnSpells, Some(("Wizard", Some(PlannerStep::LevelUp))), 0);
        let other_class =
            DecisionId::derive(PlannerStep::LearnSpells, Some(("Sorcerer", Some(PlannerStep::LevelUp))), 0);
        let other_step =
            DecisionId::derive(PlannerStep::LearnCantrips, Some(("Wizard", Some(PlannerStep::LevelUp))), 0);
        let other_ordinal =
            DecisionId::derive(PlannerStep::LearnSpells, Some(("Wizard", Some(PlannerStep::LevelUp))), 1);
        let unanchored = DecisionId::derive(PlannerStep::LearnSpells, None, 0);

        assert_ne!(base, other_class);
        assert_ne!(base, other_step);
        assert_ne!(base, other_ordinal);
        assert_ne!(base, unanchored);
    }

    #[test]
    fn node_ids_are_unique() {
        assert_ne!(NodeId::new(), NodeId::new());
    }
}
