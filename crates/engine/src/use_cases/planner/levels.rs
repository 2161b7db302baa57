//! Class levels: level-up, multiclassing and the level management controls.

use std::collections::HashSet;

use charplan_domain::{
    CharacterChoice, CharacterClass, CharacterOption, DomainError, NodeId, PendingDecision,
    PlannerStep, TreeNode,
};

use super::{Character, PlannerError};

/// Feats that may be taken more than once.
const REPEATABLE_FEATS: [&str; 1] = ["Ability Improvement"];

/// Choice steps whose options depend on an earlier pick of another step.
const DEPENDENT_STEPS: [(PlannerStep, PlannerStep); 2] = [
    (PlannerStep::SubclassFeature, PlannerStep::ChooseSubclass),
    (PlannerStep::WarlockDeepenedPact, PlannerStep::WarlockPactBoon),
];

fn is_class_level(node: &TreeNode) -> bool {
    node.is_decision_of(&PlannerStep::LEVEL_STEPS)
}

impl Character {
    // =========================================================================
    // Class queries
    // =========================================================================

    /// Class level nodes in pre-order.
    pub fn class_level_nodes(&self) -> Vec<&TreeNode> {
        self.root.find_all_nodes(is_class_level)
    }

    /// Levels taken in `class_name`.
    pub fn class_levels(&self, class_name: &str) -> usize {
        self.root
            .iter()
            .filter(|node| is_class_level(node) && node.name == class_name)
            .count()
    }

    /// Distinct classes in the order they were first taken.
    pub fn class_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for node in self.class_level_nodes() {
            if !names.contains(&node.name) {
                names.push(node.name.clone());
            }
        }
        names
    }

    pub fn primary_class(&self) -> Option<&TreeNode> {
        self.root
            .find_node(|node| node.step() == Some(PlannerStep::PrimaryClass))
    }

    pub fn total_level(&self) -> usize {
        self.class_level_nodes().len()
    }

    pub fn can_level(&self) -> bool {
        self.total_level() < self.session.config().max_level
    }

    /// Where the next level of `class_name` attaches: the deepest level of
    /// that class, or the root for a class not yet taken.
    pub(super) fn find_class_parent(&self, class_name: &str) -> NodeId {
        self.root
            .find_node(|node| {
                is_class_level(node)
                    && node.name == class_name
                    && !node
                        .children
                        .iter()
                        .any(|child| is_class_level(child) && child.name == class_name)
            })
            .map_or(self.root.id, |node| node.id)
    }

    // =========================================================================
    // Class options
    // =========================================================================

    /// One option per class that still has a next level.
    pub fn current_class_options(&self) -> Vec<CharacterOption> {
        self.session
            .classes()
            .iter()
            .filter_map(|class| self.class_data_option(class))
            .collect()
    }

    /// The option for taking the next level of `class`, carrying that level's
    /// features as forced choices and any spells it teaches.
    fn class_data_option(&self, class: &CharacterClass) -> Option<CharacterOption> {
        let level = self.class_levels(&class.name);
        let next = class.progression_at(level + 1)?;
        let current = class.progression_at(level);
        let class_level = u8::try_from(level).ok()?;

        let taken_feats: HashSet<&str> = self
            .root
            .iter()
            .filter(|node| node.step() == Some(PlannerStep::Feat))
            .map(|node| node.name.as_str())
            .collect();

        let mut choices: Vec<CharacterChoice> = next
            .features
            .iter()
            .map(|feature| {
                let mut feature = feature.clone().granted_by(&class.name, class_level);
                for choice in feature.choices.iter_mut() {
                    if choice.step == PlannerStep::Feat {
                        choice.options.retain(|option| {
                            REPEATABLE_FEATS.contains(&option.name.as_str())
                                || !taken_feats.contains(option.name.as_str())
                        });
                    }
                }
                self.restrict_dependent_features(&mut feature.choices);
                CharacterChoice::forced(PlannerStep::ClassFeature, feature)
            })
            .collect();

        let cantrips = next.cantrips_known.unwrap_or(0).saturating_sub(
            current.and_then(|row| row.cantrips_known).unwrap_or(0),
        );
        let spells = next
            .spells_known
            .unwrap_or(0)
            .saturating_sub(current.and_then(|row| row.spells_known).unwrap_or(0));

        for (step, net) in [
            (PlannerStep::LearnCantrips, cantrips),
            (PlannerStep::LearnSpells, spells),
        ] {
            if net == 0 {
                continue;
            }
            if let Some(choice) = self.spell_choice(class, next.spell_slots.as_ref(), step, net) {
                choices.push(choice);
            }
        }

        let mut option = CharacterOption::new(class.name.clone())
            .with_choices(choices)
            .with_level(class_level);
        option.description = class.description.clone();
        option.image = class.image.clone();
        Some(option)
    }

    fn spell_choice(
        &self,
        class: &CharacterClass,
        slots: Option<&charplan_domain::SpellSlots>,
        step: PlannerStep,
        net: u8,
    ) -> Option<CharacterChoice> {
        let Some(slots) = slots else {
            tracing::error!(class = %class.name, step = %step, "Class learns spells without spell slots");
            return None;
        };

        let known: HashSet<u32> = self
            .root
            .iter()
            .filter_map(|node| node.as_decision()?.spell().map(|spell| spell.id))
            .collect();
        let levels = match step {
            PlannerStep::LearnCantrips => 0..=0,
            _ => 1..=slots.highest_slot_level(),
        };

        let pool: Vec<CharacterOption> = self
            .session
            .spells()
            .iter()
            .filter(|spell| {
                spell.available_to(&class.name)
                    && levels.contains(&spell.level)
                    && !known.contains(&spell.id)
            })
            .map(|spell| CharacterOption::spell(spell.clone(), step))
            .collect();

        let count = usize::from(net);
        if pool.is_empty() {
            tracing::error!(class = %class.name, step = %step, "No spells available to learn");
            return None;
        }
        if pool.len() < count {
            tracing::warn!(
                class = %class.name,
                step = %step,
                available = pool.len(),
                required = count,
                "Not enough spells to fill the choice"
            );
            return None;
        }

        Some(CharacterChoice::new(step, pool).with_count(count))
    }

    /// Force the options of dependent choices to whatever the build already
    /// picked for the step they depend on.
    fn restrict_dependent_features(&self, choices: &mut [CharacterChoice]) {
        for choice in choices.iter_mut() {
            let Some((_, source)) = DEPENDENT_STEPS.iter().find(|(step, _)| *step == choice.step) else {
                continue;
            };
            let picked: HashSet<&str> = self
                .root
                .iter()
                .filter(|node| node.step() == Some(*source))
                .map(|node| node.name.as_str())
                .collect();
            let forced: Vec<CharacterOption> = choice
                .options
                .iter()
                .filter(|option| picked.contains(option.name.as_str()))
                .cloned()
                .collect();
            if !forced.is_empty() {
                choice.forced_options = Some(forced);
            }
        }
    }

    // =========================================================================
    // Level-up
    // =========================================================================

    /// Queue a level-up decision at the front. The first class becomes the
    /// primary class; later ones offer the taken classes and, when any class
    /// is left, the multiclass proxy.
    pub(super) fn queue_level_up(&mut self) -> Option<PendingDecision> {
        if !self.can_level() {
            tracing::info!(level = self.total_level(), "Level cap reached");
            return None;
        }

        let taken = self.class_names();
        let (fresh, existing): (Vec<CharacterOption>, Vec<CharacterOption>) = self
            .current_class_options()
            .into_iter()
            .partition(|option| !taken.contains(&option.name));

        let choice = if self.primary_class().is_none() {
            CharacterChoice::new(PlannerStep::PrimaryClass, fresh)
        } else {
            let mut options = existing;
            if !fresh.is_empty() {
                options.push(CharacterOption::multiclass_proxy(fresh));
            }
            CharacterChoice::new(PlannerStep::LevelUp, options)
        };

        // a stale level-up question is replaced rather than duplicated
        let pending = PendingDecision::new(None, choice, 0);
        self.pending_decisions.retain(|queued| queued.id != pending.id);
        self.enqueue_front(vec![pending.clone()]);
        Some(pending)
    }

    /// Queue the next class level. Does nothing at the level cap or while a
    /// class level decision is still open.
    pub fn level_up(&self) -> Character {
        let mut next = self.clone();
        let waiting = next
            .pending_decisions
            .iter()
            .any(|pending| pending.step.is_level_step());
        if waiting {
            tracing::debug!("Level-up already pending");
            return next;
        }
        next.queue_level_up();
        next
    }

    /// Take one more level of `class_name`, answering the level-up decision
    /// directly.
    pub(super) fn level_up_class(&mut self, class_name: &str, step: PlannerStep) -> Result<(), PlannerError> {
        let mut pending = self.queue_level_up().ok_or_else(|| {
            DomainError::constraint(format!("cannot add a level of {} at the level cap", class_name))
        })?;

        if step == PlannerStep::SecondaryClass && pending.step == PlannerStep::LevelUp {
            let proxy = pending
                .options
                .iter()
                .find(|option| option.step == Some(PlannerStep::MulticlassProxy))
                .cloned()
                .ok_or_else(|| PlannerError::node_not_found(format!("new class option '{}'", class_name)))?;
            self.resolve_decision(pending.id, vec![proxy])?;
            pending = self
                .pending_decisions
                .first()
                .filter(|front| front.step == PlannerStep::SecondaryClass)
                .cloned()
                .ok_or_else(|| PlannerError::node_not_found(format!("new class option '{}'", class_name)))?;
        }

        let option = pending
            .option_named(class_name)
            .cloned()
            .ok_or_else(|| PlannerError::node_not_found(format!("class option '{}'", class_name)))?;
        self.resolve_decision(pending.id, vec![option])
    }

    // =========================================================================
    // Level management
    // =========================================================================

    /// Drop pending decisions whose attach point left the tree.
    fn prune_orphaned_decisions(&mut self) {
        let root = &self.root;
        self.pending_decisions
            .retain(|pending| pending.parent.is_none_or(|parent| root.contains(parent)));
    }

    fn detach(&mut self, target: NodeId) -> Result<TreeNode, PlannerError> {
        let parent = self
            .root
            .find_parent_mut(target)
            .ok_or_else(|| PlannerError::node_not_found(target))?;
        let detached = parent.remove_child(target)?;
        self.prune_orphaned_decisions();
        Ok(detached)
    }

    fn control_target(option: &CharacterOption) -> Result<NodeId, PlannerError> {
        option
            .target
            .ok_or_else(|| PlannerError::MissingParent(option.name.clone()))
    }

    /// Remove a class level along with everything chosen at or after it.
    pub(super) fn remove_level(&mut self, option: &CharacterOption) -> Result<(), PlannerError> {
        let target = Self::control_target(option)?;
        let removed = self.detach(target)?;
        tracing::info!(class = %removed.name, levels = removed.find_all_nodes(is_class_level).len(), "Removed class level");
        Ok(())
    }

    /// Rebuild a class level from scratch. Later levels of the same class
    /// are stashed and replayed by `progress_replay` once the revised level
    /// is settled.
    pub(super) fn revise_level(&mut self, option: &CharacterOption) -> Result<(), PlannerError> {
        let target = Self::control_target(option)?;
        let node = self
            .root
            .find_by_id(target)
            .ok_or_else(|| PlannerError::node_not_found(target))?;
        let step = node
            .step()
            .filter(|step| step.is_level_step())
            .ok_or_else(|| DomainError::validation(format!("'{}' is not a class level", node.name)))?;

        let follows = node
            .children
            .iter()
            .any(|child| child.step() == Some(PlannerStep::LevelUp));
        if follows && self.replay_target.is_some() {
            return Err(PlannerError::ReplayConflict);
        }

        let mut detached = self.detach(target)?;
        self.level_up_class(&detached.name, step)?;

        let stash = detached
            .children
            .iter()
            .position(|child| child.step() == Some(PlannerStep::LevelUp))
            .map(|index| detached.children.remove(index));
        if stash.is_some() {
            self.replay_target = stash;
        }

        tracing::info!(class = %detached.name, step = %step, replaying = self.replay_target.is_some(), "Revising class level");
        Ok(())
    }

    /// Swap the primary class with a secondary class.
    pub(super) fn change_primary_class(&mut self, class_name: &str) -> Result<(), PlannerError> {
        let secondary = self
            .root
            .find_node(|node| node.step() == Some(PlannerStep::SecondaryClass) && node.name == class_name)
            .map(|node| node.id)
            .ok_or_else(|| PlannerError::node_not_found(format!("secondary class '{}'", class_name)))?;
        let primary = self
            .primary_class()
            .map(|node| node.id)
            .ok_or_else(|| PlannerError::node_not_found("primary class"))?;

        for (id, step) in [
            (secondary, PlannerStep::PrimaryClass),
            (primary, PlannerStep::SecondaryClass),
        ] {
            if let Some(decision) = self.root.find_by_id_mut(id).and_then(TreeNode::as_decision_mut) {
                decision.step = step;
            }
        }
        tracing::info!(class = %class_name, "Primary class changed");
        Ok(())
    }
}
