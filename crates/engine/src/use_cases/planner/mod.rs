//! Character build planner.
//!
//! `Character` is the build engine. It owns the build tree, the script of
//! steps still to run and the queue of pending decisions. Every public
//! operation leaves `self` untouched and returns a new `Character`, so holding
//! on to an old instance is all undo needs (see `BuildHistory`).
//!
//! Module map:
//! - `levels` - level-up, multiclassing, class data shaping, remove/revise
//! - `replay` - fast-forwarding past answers onto a revised branch
//! - `equipment` - equipping items and slot eligibility
//! - `views` - read-only queries over the tree
//! - `history` - bounded undo stack

mod equipment;
mod error;
mod history;
mod levels;
mod replay;
mod session;
mod views;

use std::collections::VecDeque;
use std::sync::Arc;

use charplan_domain::{
    CharacterChoice, CharacterOption, DecisionId, DomainError, NodeId, PendingDecision,
    PlannerStep, TreeNode,
};

pub use equipment::EquippedItem;
pub use error::PlannerError;
pub use history::BuildHistory;
pub use session::PlannerSession;
pub use views::{ClassInfo, ClassLevelInfo};

use crate::infrastructure::config::InvariantPolicy;

/// Steps every new build runs through, in order.
const INITIAL_STEPS: [PlannerStep; 4] = [
    PlannerStep::SetRace,
    PlannerStep::PrimaryClass,
    PlannerStep::SetBackground,
    PlannerStep::SetAbilityScores,
];

#[derive(Debug, Clone)]
pub struct Character {
    session: Arc<PlannerSession>,
    pub name: String,
    root: TreeNode,
    pending_steps: VecDeque<PlannerStep>,
    pending_decisions: Vec<PendingDecision>,
    /// Detached class level waiting to be replayed onto a revised branch
    replay_target: Option<TreeNode>,
}

impl Character {
    pub fn new(session: Arc<PlannerSession>) -> Self {
        Self {
            session,
            name: "Tav".to_string(),
            root: TreeNode::root(),
            pending_steps: INITIAL_STEPS.into_iter().collect(),
            pending_decisions: Vec::new(),
            replay_target: None,
        }
    }

    pub fn session(&self) -> &Arc<PlannerSession> {
        &self.session
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn pending_steps(&self) -> &VecDeque<PlannerStep> {
        &self.pending_steps
    }

    pub fn pending_decisions(&self) -> &[PendingDecision] {
        &self.pending_decisions
    }

    pub fn next_decision(&self) -> Option<&PendingDecision> {
        self.pending_decisions.first()
    }

    pub fn replay_target(&self) -> Option<&TreeNode> {
        self.replay_target.as_ref()
    }

    pub fn is_replaying(&self) -> bool {
        self.replay_target.is_some()
    }

    fn policy(&self) -> InvariantPolicy {
        self.session.config().invariants
    }

    // =========================================================================
    // Step script
    // =========================================================================

    /// Pop the next scripted step and queue its decision(s) at the back.
    ///
    /// Returns `Ok(None)` once the script is exhausted. This is the only
    /// operation that waits on the catalog while building.
    pub async fn queue_next_step(&self) -> Result<Option<Character>, PlannerError> {
        let mut next = self.clone();
        let Some(step) = next.pending_steps.pop_front() else {
            return Ok(None);
        };

        let choices = next.step_choices(step).await?;
        let decisions = PendingDecision::from_choices(Some(&next.root), choices);

        tracing::debug!(step = %step, decisions = decisions.len(), "Queued scripted step");
        next.enqueue_back(decisions);
        Ok(Some(next))
    }

    async fn step_choices(&self, step: PlannerStep) -> Result<Vec<CharacterChoice>, PlannerError> {
        let catalog = self.session.catalog();
        let choice = match step {
            PlannerStep::SetRace => CharacterChoice::new(step, catalog.race_options().await?),
            PlannerStep::SetBackground => {
                CharacterChoice::new(step, catalog.background_options().await?)
            }
            PlannerStep::PrimaryClass => {
                let taken = self.class_names();
                let options = self
                    .current_class_options()
                    .into_iter()
                    .filter(|option| !taken.contains(&option.name))
                    .collect();
                CharacterChoice::new(step, options)
            }
            // Answered with a caller-built option carrying the score passives
            PlannerStep::SetAbilityScores => CharacterChoice::new(step, Vec::new()),
            other => {
                return Err(DomainError::validation(format!("{} is not a scripted step", other)).into())
            }
        };
        Ok(vec![choice])
    }

    /// Queue an open MANAGE_LEVELS decision answered with control options.
    pub fn manage_levels(&self) -> Character {
        let mut next = self.clone();
        if next
            .pending_decisions
            .iter()
            .any(|pending| pending.step == PlannerStep::ManageLevels)
        {
            return next;
        }
        next.enqueue_back(vec![PendingDecision::open(PlannerStep::ManageLevels, None)]);
        next
    }

    // =========================================================================
    // Decisions
    // =========================================================================

    /// Answer a pending decision with one or more of its options.
    pub fn make_decision(
        &self,
        pending: &PendingDecision,
        options: Vec<CharacterOption>,
    ) -> Result<Character, PlannerError> {
        let mut next = self.clone();
        next.resolve_decision(pending.id, options)?;
        next.session.references().intern_tree(&next.root);
        Ok(next)
    }

    fn unqueue(&mut self, id: DecisionId) -> Result<PendingDecision, PlannerError> {
        let index = self
            .pending_decisions
            .iter()
            .position(|pending| pending.id == id)
            .ok_or(PlannerError::InvalidDecision(id))?;
        Ok(self.pending_decisions.remove(index))
    }

    fn resolve_decision(
        &mut self,
        id: DecisionId,
        options: Vec<CharacterOption>,
    ) -> Result<(), PlannerError> {
        let pending = self.unqueue(id)?;
        self.apply_decision(pending, options)
    }

    fn apply_decision(
        &mut self,
        pending: PendingDecision,
        options: Vec<CharacterOption>,
    ) -> Result<(), PlannerError> {
        let mut parent = pending.parent;

        for option in options {
            match option.step {
                Some(PlannerStep::RemoveLevel) => {
                    self.remove_level(&option)?;
                    continue;
                }
                Some(PlannerStep::ReviseLevel) => {
                    self.revise_level(&option)?;
                    continue;
                }
                Some(PlannerStep::ChangePrimaryClass) => {
                    self.change_primary_class(&option.name)?;
                    continue;
                }
                _ => {}
            }

            if parent.is_none() && pending.step.is_level_step() {
                parent = Some(self.find_class_parent(&option.name));
            }
            let parent_id = parent.ok_or_else(|| PlannerError::MissingParent(option.name.clone()))?;
            if !self.root.contains(parent_id) {
                return Err(PlannerError::node_not_found(format!(
                    "parent {} of '{}'",
                    parent_id, option.name
                )));
            }

            if option.step == Some(PlannerStep::MulticlassProxy) {
                let decisions = PendingDecision::from_choices(Some(&self.root), option.choices);
                self.enqueue_front(decisions);
                continue;
            }

            tracing::debug!(step = %pending.step, option = %option.name, "Decision made");
            self.attach_option(parent_id, &option, pending.step, pending.id)?;
        }

        Ok(())
    }

    /// Attach `option` under `parent_id`, grant its effects and queue its
    /// sub-choices.
    fn attach_option(
        &mut self,
        parent_id: NodeId,
        option: &CharacterOption,
        step: PlannerStep,
        choice_id: DecisionId,
    ) -> Result<NodeId, PlannerError> {
        let mut node = TreeNode::from_option(option, step, Some(choice_id));
        node.grant_effects();
        let node_id = node.id;

        self.root
            .find_by_id_mut(parent_id)
            .ok_or_else(|| PlannerError::node_not_found(parent_id))?
            .add_child(node);

        self.queue_subchoices(node_id, option.choices.clone())?;
        Ok(node_id)
    }

    /// Forced sub-choices are resolved on the spot; the rest go to the front
    /// of the queue so a decision's own follow-ups come before older entries.
    fn queue_subchoices(
        &mut self,
        parent_id: NodeId,
        choices: Vec<CharacterChoice>,
    ) -> Result<(), PlannerError> {
        if choices.is_empty() {
            return Ok(());
        }

        let parent = self
            .root
            .find_by_id(parent_id)
            .ok_or_else(|| PlannerError::node_not_found(parent_id))?;
        let decisions = PendingDecision::from_choices(Some(parent), choices);

        let mut offered = Vec::new();
        for pending in decisions {
            let Some(forced) = pending.forced_options.clone() else {
                offered.push(pending);
                continue;
            };

            self.check_forced_count(&pending);
            for option in &forced {
                self.attach_option(parent_id, option, pending.step, pending.id)?;
            }
        }

        self.enqueue_front(offered);
        Ok(())
    }

    fn check_forced_count(&self, pending: &PendingDecision) -> bool {
        self.policy().check(pending.forced_count_matches(), || {
            format!(
                "{} forced options for a {} choice of count {}",
                pending.forced_options.as_ref().map_or(0, Vec::len),
                pending.step,
                pending.count
            )
        })
    }

    fn without_duplicates(&self, decisions: Vec<PendingDecision>) -> Vec<PendingDecision> {
        let policy = self.policy();
        let mut accepted: Vec<PendingDecision> = Vec::with_capacity(decisions.len());
        for decision in decisions {
            self.check_forced_count(&decision);
            let duplicate = self
                .pending_decisions
                .iter()
                .chain(accepted.iter())
                .any(|pending| pending.id == decision.id);
            if policy.check(!duplicate, || {
                format!("decision {} ({}) is already pending", decision.id, decision.step)
            }) {
                accepted.push(decision);
            }
        }
        accepted
    }

    fn enqueue_front(&mut self, decisions: Vec<PendingDecision>) {
        let mut decisions = self.without_duplicates(decisions);
        decisions.append(&mut self.pending_decisions);
        self.pending_decisions = decisions;
    }

    fn enqueue_back(&mut self, decisions: Vec<PendingDecision>) {
        let decisions = self.without_duplicates(decisions);
        self.pending_decisions.extend(decisions);
    }

    // =========================================================================
    // Import / Export
    // =========================================================================

    /// No scripted steps left and nothing pending but, at most, an open
    /// MANAGE_LEVELS decision.
    pub fn can_export(&self) -> bool {
        self.pending_steps.is_empty()
            && match self.pending_decisions.as_slice() {
                [] => true,
                [only] => only.step == PlannerStep::ManageLevels,
                _ => false,
            }
    }

    pub async fn export(&self) -> Result<String, PlannerError> {
        self.export_with(self.session.config().validate_export).await
    }

    pub async fn export_with(&self, validate: bool) -> Result<String, PlannerError> {
        if !self.can_export() {
            return Err(PlannerError::IncompleteBuild {
                pending_steps: self.pending_steps.len(),
                pending_decisions: self.pending_decisions.len(),
            });
        }

        let encoded = self.session.serializer().deflate(&self.root, validate).await?;
        tracing::info!(bytes = encoded.len(), validated = validate, "Build exported");
        Ok(encoded)
    }

    /// Rebuild an engine from an export string. Both queues start empty.
    pub async fn import(session: Arc<PlannerSession>, encoded: &str) -> Result<Character, PlannerError> {
        let root = session.serializer().inflate(encoded).await?;
        tracing::info!(nodes = root.count(), "Build imported");

        Ok(Character {
            root,
            pending_steps: VecDeque::new(),
            ..Character::new(session)
        })
    }
}
