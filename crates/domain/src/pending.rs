//! Pending decisions: questions waiting for an answer.

use std::collections::HashMap;

use crate::entities::{CharacterChoice, CharacterOption};
use crate::ids::{DecisionId, NodeId};
use crate::tree::TreeNode;
use crate::types::PlannerStep;

/// An unresolved decision.
///
/// `id` is derived from the step and the decision that introduced it, never
/// from tree position, so the same question gets the same id on a rebuilt
/// branch. Replay relies on this to match past answers to new questions.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDecision {
    pub id: DecisionId,
    /// Attach point for the answer; `None` means look it up when answering
    pub parent: Option<NodeId>,
    pub step: PlannerStep,
    pub options: Vec<CharacterOption>,
    pub count: usize,
    pub forced_options: Option<Vec<CharacterOption>>,
}

impl PendingDecision {
    /// Wrap `choice` as a decision to be attached under `parent`.
    ///
    /// `ordinal` separates several choices of the same step declared by one
    /// owner; pass 0 when there is only one. Owners recorded at a class level
    /// are keyed by that level and by the class that granted them, so a
    /// feature repeated on later levels or shared between classes asks a
    /// distinct question each time.
    pub fn new(parent: Option<&TreeNode>, choice: CharacterChoice, ordinal: usize) -> Self {
        let owner_name = parent.map(|node| {
            let Some(decision) = node.as_decision() else {
                return node.name.clone();
            };
            let mut name = match &decision.owner_class {
                Some(class) => format!("{}/{}", class, node.name),
                None => node.name.clone(),
            };
            if let Some(level) = decision.level {
                name = format!("{}#{}", name, level);
            }
            name
        });
        let owner = parent.zip(owner_name.as_deref()).map(|(node, name)| (name, node.step()));
        Self {
            id: DecisionId::derive(choice.step, owner, ordinal),
            parent: parent.map(|node| node.id),
            step: choice.step,
            options: choice.options,
            count: choice.count,
            forced_options: choice.forced_options,
        }
    }

    /// Wrap every choice one owner declares, numbering repeats of a step.
    pub fn from_choices(parent: Option<&TreeNode>, choices: Vec<CharacterChoice>) -> Vec<Self> {
        let mut seen: HashMap<PlannerStep, usize> = HashMap::new();
        choices
            .into_iter()
            .map(|choice| {
                let ordinal = seen.entry(choice.step).or_insert(0);
                let pending = Self::new(parent, choice, *ordinal);
                *ordinal += 1;
                pending
            })
            .collect()
    }

    /// An open question with no predefined options.
    pub fn open(step: PlannerStep, parent: Option<&TreeNode>) -> Self {
        Self::new(parent, CharacterChoice::new(step, Vec::new()), 0)
    }

    pub fn is_forced(&self) -> bool {
        self.forced_options.is_some()
    }

    /// A forced decision must force exactly as many options as it asks for.
    pub fn forced_count_matches(&self) -> bool {
        self.forced_options
            .as_ref()
            .is_none_or(|forced| forced.len() == self.count)
    }

    pub fn option_named(&self, name: &str) -> Option<&CharacterOption> {
        self.options.iter().find(|option| option.name == name)
    }

    pub fn forced_option_named(&self, name: &str) -> Option<&CharacterOption> {
        self.forced_options
            .as_ref()
            .and_then(|forced| forced.iter().find(|option| option.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::DecisionNode;

    fn feat_choice() -> CharacterChoice {
        CharacterChoice::new(
            PlannerStep::Feat,
            vec![CharacterOption::new("Alert"), CharacterOption::new("Tough")],
        )
    }

    #[test]
    fn test_same_question_on_forked_trees_has_same_id() {
        let a = TreeNode::decision("Feat", DecisionNode::new(PlannerStep::ClassFeature));
        let b = TreeNode::decision("Feat", DecisionNode::new(PlannerStep::ClassFeature));
        assert_ne!(a.id, b.id);

        let pa = PendingDecision::new(Some(&a), feat_choice(), 0);
        let pb = PendingDecision::new(Some(&b), feat_choice(), 0);
        assert_eq!(pa.id, pb.id);
        assert_eq!(pa.parent, Some(a.id));
        assert_eq!(pb.parent, Some(b.id));
    }

    #[test]
    fn test_from_choices_numbers_repeated_steps() {
        let owner = TreeNode::decision("Wizard", DecisionNode::new(PlannerStep::LevelUp));
        let pending = PendingDecision::from_choices(
            Some(&owner),
            vec![
                feat_choice(),
                CharacterChoice::new(PlannerStep::LearnSpells, vec![]),
                feat_choice(),
            ],
        );

        assert_eq!(pending.len(), 3);
        assert_ne!(pending[0].id, pending[2].id);
        assert_eq!(pending[0].id, PendingDecision::new(Some(&owner), feat_choice(), 0).id);
        assert_eq!(pending[2].id, PendingDecision::new(Some(&owner), feat_choice(), 1).id);
    }

    #[test]
    fn test_class_level_keys_the_owner() {
        let mut fourth = DecisionNode::new(PlannerStep::ClassFeature);
        fourth.level = Some(3);
        let mut sixth = DecisionNode::new(PlannerStep::ClassFeature);
        sixth.level = Some(5);

        let a = PendingDecision::new(Some(&TreeNode::decision("Feat", fourth.clone())), feat_choice(), 0);
        let b = PendingDecision::new(Some(&TreeNode::decision("Feat", sixth)), feat_choice(), 0);
        let c = PendingDecision::new(Some(&TreeNode::decision("Feat", fourth)), feat_choice(), 0);
        assert_ne!(a.id, b.id);
        assert_eq!(a.id, c.id);
    }

    #[test]
    fn test_forced_choice() {
        let forced = CharacterChoice::forced(PlannerStep::ClassFeature, CharacterOption::new("Second Wind"));
        let pending = PendingDecision::new(None, forced, 0);
        assert!(pending.is_forced());
        assert_eq!(pending.count, 1);
        assert!(pending.forced_option_named("Second Wind").is_some());
        assert!(pending.option_named("Action Surge").is_none());
        assert!(pending.forced_count_matches());

        let mut short = pending.clone();
        short.count = 2;
        assert!(!short.forced_count_matches());
        assert!(PendingDecision::new(None, feat_choice(), 0).forced_count_matches());
    }

    #[test]
    fn test_granting_class_keys_the_owner() {
        let feature = CharacterOption::new("Feat").with_step(PlannerStep::ClassFeature);
        let owner = |class: &str| {
            let option = feature.clone().granted_by(class, 3);
            TreeNode::from_option(&option, PlannerStep::ClassFeature, None)
        };
        let fighter = owner("Fighter");
        let wizard = owner("Wizard");

        let a = PendingDecision::new(Some(&fighter), feat_choice(), 0);
        let b = PendingDecision::new(Some(&wizard), feat_choice(), 0);
        assert_ne!(a.id, b.id);
    }
}
