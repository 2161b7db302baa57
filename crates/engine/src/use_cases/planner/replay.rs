//! Replaying stashed class levels after a revision.
//!
//! `revise_level` detaches a class level and keeps the levels that followed
//! it as the replay target. Each replayed level is retaken, then every new
//! question whose id matches an answer recorded on the stashed level is
//! answered the same way. Questions the old build never saw (or whose old
//! answer is no longer offered) stay pending and replay pauses until they are
//! answered and `progress_replay` is called again.

use std::collections::{HashSet, VecDeque};

use charplan_domain::{CharacterOption, DecisionId, PendingDecision, PlannerStep, TreeNode};

use super::{Character, PlannerError};

/// A recorded answer on a stashed level.
#[derive(Debug, Clone)]
struct PastAnswer {
    name: String,
    choice_id: DecisionId,
}

/// Non-level decisions under `level`, generation by generation.
fn past_answers(level: &TreeNode) -> Vec<PastAnswer> {
    let mut answers = Vec::new();
    let mut queue: VecDeque<&TreeNode> = level.children.iter().collect();

    while let Some(node) = queue.pop_front() {
        let Some(decision) = node.as_decision() else {
            continue;
        };
        if decision.step.is_level_step() {
            continue;
        }
        if let Some(choice_id) = decision.choice_id {
            answers.push(PastAnswer {
                name: node.name.clone(),
                choice_id,
            });
        }
        queue.extend(node.children.iter());
    }

    answers
}

/// The old answers to `pending`, if they can be given again unchanged.
fn replayable(pending: &PendingDecision, past: &[PastAnswer]) -> Option<Vec<CharacterOption>> {
    let names: Vec<&str> = past
        .iter()
        .filter(|answer| answer.choice_id == pending.id)
        .map(|answer| answer.name.as_str())
        .collect();
    if names.is_empty() || names.len() != pending.count {
        return None;
    }

    if pending.is_forced() && names.iter().any(|name| pending.forced_option_named(name).is_none()) {
        return None;
    }

    names
        .iter()
        .map(|name| pending.option_named(name).cloned())
        .collect()
}

impl Character {
    /// Continue replaying stashed levels as far as recorded answers allow.
    pub fn progress_replay(&self) -> Result<Character, PlannerError> {
        let mut next = self.clone();
        next.advance_replay()?;
        next.session.references().intern_tree(&next.root);
        Ok(next)
    }

    fn has_open_questions(&self) -> bool {
        self.pending_decisions
            .iter()
            .any(|pending| pending.step != PlannerStep::ManageLevels)
    }

    fn advance_replay(&mut self) -> Result<(), PlannerError> {
        while let Some(target) = self.replay_target.clone() {
            let Some(step) = target.step() else {
                self.replay_target = None;
                break;
            };
            if !self.policy().check(step.is_level_step(), || {
                format!("replay target '{}' is a {} decision", target.name, step)
            }) {
                self.replay_target = None;
                break;
            }

            if self.has_open_questions() {
                tracing::debug!(class = %target.name, "Replay waiting on open decisions");
                break;
            }

            let taken_before = target
                .as_decision()
                .and_then(|decision| decision.level)
                .map_or(0, usize::from);
            if self.class_levels(&target.name) <= taken_before {
                self.level_up_class(&target.name, step)?;
            }

            if target.children.is_empty() {
                self.replay_target = None;
                break;
            }

            self.fast_forward(&past_answers(&target))?;

            if self.has_open_questions() {
                tracing::debug!(class = %target.name, "Replay paused for new decisions");
                break;
            }

            self.replay_target = target
                .children
                .iter()
                .find(|child| child.name == target.name && child.step().is_some_and(|s| s.is_level_step()))
                .cloned();
            tracing::debug!(
                class = %target.name,
                level = taken_before + 1,
                done = self.replay_target.is_none(),
                "Replayed class level"
            );
        }

        Ok(())
    }

    /// Answer every pending decision that has a matching recorded answer,
    /// including ones opened by earlier replayed answers.
    fn fast_forward(&mut self, past: &[PastAnswer]) -> Result<(), PlannerError> {
        let mut used: HashSet<DecisionId> = HashSet::new();

        loop {
            let found = self
                .pending_decisions
                .iter()
                .filter(|pending| !used.contains(&pending.id))
                .find_map(|pending| replayable(pending, past).map(|options| (pending.id, options)));
            let Some((id, options)) = found else {
                return Ok(());
            };

            used.insert(id);
            self.resolve_decision(id, options)?;
        }
    }
}
