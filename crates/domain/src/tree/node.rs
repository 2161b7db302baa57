use std::sync::Arc;

use crate::entities::{CharacterOption, EquipmentItem, EquipmentSlot, GrantableEffect, OptionPayload, Spell};
use crate::error::DomainError;
use crate::ids::{DecisionId, NodeId};
use crate::types::PlannerStep;

use super::PreOrder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Decision,
    Effect,
}

/// Entity a decision node wraps, if any.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionPayload {
    Plain,
    Spell(Arc<Spell>),
    EquippedItem {
        slot: EquipmentSlot,
        item: Arc<EquipmentItem>,
    },
}

/// A resolved choice.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionNode {
    pub step: PlannerStep,
    /// Id of the pending decision this node satisfied
    pub choice_id: Option<DecisionId>,
    /// Class levels taken before this one, for class level nodes and the
    /// features granted with them
    pub level: Option<u8>,
    /// Class that granted this feature
    pub owner_class: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Effects not yet expanded into children; empty once granted
    pub grants: Vec<GrantableEffect>,
    pub payload: DecisionPayload,
}

impl DecisionNode {
    pub fn new(step: PlannerStep) -> Self {
        Self {
            step,
            choice_id: None,
            level: None,
            owner_class: None,
            description: None,
            image: None,
            grants: Vec::new(),
            payload: DecisionPayload::Plain,
        }
    }

    pub fn spell(&self) -> Option<&Arc<Spell>> {
        match &self.payload {
            DecisionPayload::Spell(spell) => Some(spell),
            _ => None,
        }
    }

    pub fn equipped(&self) -> Option<(EquipmentSlot, &Arc<EquipmentItem>)> {
        match &self.payload {
            DecisionPayload::EquippedItem { slot, item } => Some((*slot, item)),
            _ => None,
        }
    }
}

/// A granted effect. Nested grants live in `effect.grants` until expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectNode {
    pub effect: GrantableEffect,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    Decision(DecisionNode),
    Effect(EffectNode),
}

/// A node of the build tree.
///
/// `id` is stable for the node's lifetime and survives `clone()`, so a cloned
/// tree can be addressed with ids taken from the original.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn root() -> Self {
        Self::with_kind("root", NodeKind::Root)
    }

    pub fn decision(name: impl Into<String>, decision: DecisionNode) -> Self {
        Self::with_kind(name, NodeKind::Decision(decision))
    }

    pub fn effect(effect: GrantableEffect) -> Self {
        Self::with_kind(effect.name.clone(), NodeKind::Effect(EffectNode { effect }))
    }

    pub fn with_kind(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            kind,
            children: Vec::new(),
        }
    }

    /// Decision node for a chosen option. The option's own step wins over
    /// the step of the decision it answered.
    pub fn from_option(option: &CharacterOption, step: PlannerStep, choice_id: Option<DecisionId>) -> Self {
        let payload = match &option.payload {
            OptionPayload::None => DecisionPayload::Plain,
            OptionPayload::Spell(spell) => DecisionPayload::Spell(spell.clone()),
            OptionPayload::Item { slot, item } => DecisionPayload::EquippedItem {
                slot: *slot,
                item: item.clone(),
            },
        };

        Self::decision(
            option.name.clone(),
            DecisionNode {
                step: option.step.unwrap_or(step),
                choice_id,
                level: option.level,
                owner_class: option.owner_class.clone(),
                description: option.description.clone(),
                image: option.image.clone(),
                grants: option.grants.clone(),
                payload,
            },
        )
    }

    pub fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Root => NodeType::Root,
            NodeKind::Decision(_) => NodeType::Decision,
            NodeKind::Effect(_) => NodeType::Effect,
        }
    }

    pub fn as_decision(&self) -> Option<&DecisionNode> {
        match &self.kind {
            NodeKind::Decision(decision) => Some(decision),
            _ => None,
        }
    }

    pub fn as_decision_mut(&mut self) -> Option<&mut DecisionNode> {
        match &mut self.kind {
            NodeKind::Decision(decision) => Some(decision),
            _ => None,
        }
    }

    pub fn as_effect(&self) -> Option<&GrantableEffect> {
        match &self.kind {
            NodeKind::Effect(node) => Some(&node.effect),
            _ => None,
        }
    }

    /// Step of a decision node; `None` for root and effects.
    pub fn step(&self) -> Option<PlannerStep> {
        self.as_decision().map(|d| d.step)
    }

    pub fn is_decision_of(&self, steps: &[PlannerStep]) -> bool {
        self.step().is_some_and(|step| steps.contains(&step))
    }

    pub fn add_child(&mut self, node: TreeNode) -> NodeId {
        let id = node.id;
        self.children.push(node);
        id
    }

    /// Detach a direct child and hand back its subtree.
    pub fn remove_child(&mut self, id: NodeId) -> Result<TreeNode, DomainError> {
        let index = self
            .children
            .iter()
            .position(|child| child.id == id)
            .ok_or_else(|| {
                DomainError::constraint(format!("node {} is not a direct child of '{}'", id, self.name))
            })?;
        Ok(self.children.remove(index))
    }

    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder::new(self)
    }

    pub fn find_node<P>(&self, predicate: P) -> Option<&TreeNode>
    where
        P: Fn(&TreeNode) -> bool,
    {
        self.iter().find(|node| predicate(node))
    }

    pub fn find_all_nodes<P>(&self, predicate: P) -> Vec<&TreeNode>
    where
        P: Fn(&TreeNode) -> bool,
    {
        self.iter().filter(|node| predicate(node)).collect()
    }

    /// Mutable pre-order search; visits nodes in the same order as `find_node`.
    pub fn find_node_mut<P>(&mut self, predicate: &P) -> Option<&mut TreeNode>
    where
        P: Fn(&TreeNode) -> bool,
    {
        if predicate(self) {
            return Some(self);
        }
        for child in self.children.iter_mut() {
            if let Some(found) = child.find_node_mut(predicate) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_by_id(&self, id: NodeId) -> Option<&TreeNode> {
        self.find_node(|node| node.id == id)
    }

    pub fn find_by_id_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.find_node_mut(&|node: &TreeNode| node.id == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.find_by_id(id).is_some()
    }

    pub fn find_parent(&self, id: NodeId) -> Option<&TreeNode> {
        self.find_node(|node| node.children.iter().any(|child| child.id == id))
    }

    pub fn find_parent_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.find_node_mut(&|node: &TreeNode| node.children.iter().any(|child| child.id == id))
    }

    /// Expand pending grants into effect children, recursively, and clear
    /// the grant lists they came from.
    pub fn grant_effects(&mut self) {
        let grants = match &mut self.kind {
            NodeKind::Decision(decision) => std::mem::take(&mut decision.grants),
            NodeKind::Effect(node) => std::mem::take(&mut node.effect.grants),
            NodeKind::Root => return,
        };

        for effect in grants {
            let mut child = TreeNode::effect(effect);
            child.grant_effects();
            self.children.push(child);
        }
    }

    /// Deep equality ignoring node ids.
    pub fn structurally_eq(&self, other: &TreeNode) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(other.children.iter())
                .all(|(a, b)| a.structurally_eq(b))
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(name: &str, step: PlannerStep) -> TreeNode {
        TreeNode::decision(name, DecisionNode::new(step))
    }

    /// root
    /// ├── Human
    /// │   └── Fighter
    /// │       └── Fighter
    /// └── Soldier
    fn sample_tree() -> TreeNode {
        let mut root = TreeNode::root();
        let mut race = decision("Human", PlannerStep::SetRace);
        let mut fighter = decision("Fighter", PlannerStep::PrimaryClass);
        fighter.add_child(decision("Fighter", PlannerStep::LevelUp));
        race.add_child(fighter);
        root.add_child(race);
        root.add_child(decision("Soldier", PlannerStep::SetBackground));
        root
    }

    #[test]
    fn test_pre_order_traversal() {
        let root = sample_tree();
        let names: Vec<&str> = root.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["root", "Human", "Fighter", "Fighter", "Soldier"]);
    }

    #[test]
    fn test_find_node_returns_first_in_pre_order() {
        let root = sample_tree();
        let found = root.find_node(|n| n.name == "Fighter").unwrap();
        assert_eq!(found.step(), Some(PlannerStep::PrimaryClass));
        assert_eq!(root.find_all_nodes(|n| n.name == "Fighter").len(), 2);
    }

    #[test]
    fn test_find_node_mut_matches_find_node_order() {
        let mut root = sample_tree();
        let expected = root.find_node(|n| n.name == "Fighter").unwrap().id;
        let found = root
            .find_node_mut(&|n: &TreeNode| n.name == "Fighter")
            .unwrap();
        assert_eq!(found.id, expected);
    }

    #[test]
    fn test_remove_child_requires_direct_child() {
        let mut root = sample_tree();
        let nested = root.find_node(|n| n.step() == Some(PlannerStep::LevelUp)).unwrap().id;
        assert!(matches!(
            root.remove_child(nested),
            Err(DomainError::Constraint(_))
        ));

        let parent = root.find_parent_mut(nested).unwrap();
        let removed = parent.remove_child(nested).unwrap();
        assert_eq!(removed.id, nested);
        assert!(!root.contains(nested));
    }

    #[test]
    fn test_grant_effects_flattens_nested_grants() {
        let mut node = decision("Elf", PlannerStep::SetRace);
        if let Some(d) = node.as_decision_mut() {
            d.grants = vec![GrantableEffect::passive("Keen Senses")
                .with_grants(vec![GrantableEffect::proficiency("Perception")])];
        }

        node.grant_effects();

        assert!(node.as_decision().unwrap().grants.is_empty());
        assert_eq!(node.children.len(), 1);
        let passive = &node.children[0];
        assert_eq!(passive.name, "Keen Senses");
        assert!(passive.as_effect().unwrap().grants.is_empty());
        assert_eq!(passive.children[0].name, "Perception");
    }

    #[test]
    fn test_clone_is_independent_and_keeps_ids() {
        let original = sample_tree();
        let mut copy = original.clone();
        let background = copy.find_node(|n| n.name == "Soldier").unwrap().id;
        copy.remove_child(background).unwrap();

        assert!(original.contains(background));
        assert!(!copy.contains(background));
        assert_eq!(original.id, copy.id);
    }

    #[test]
    fn test_structural_equality_ignores_ids() {
        let a = sample_tree();
        let b = sample_tree();
        assert_ne!(a.id, b.id);
        assert!(a.structurally_eq(&b));

        let mut c = sample_tree();
        c.add_child(decision("Dagger", PlannerStep::EquipItem));
        assert!(!a.structurally_eq(&c));
    }
}
