//! Read-only views over the build tree.

use std::collections::BTreeMap;
use std::sync::Arc;

use charplan_domain::{Ability, EffectKind, GrantableEffect, PlannerStep, Spell, TreeNode};

use super::Character;

/// One class with its levels in the order they were taken.
#[derive(Debug, Clone)]
pub struct ClassInfo<'a> {
    pub name: String,
    pub levels: Vec<ClassLevelInfo<'a>>,
    pub subclass: Option<&'a TreeNode>,
}

#[derive(Debug, Clone)]
pub struct ClassLevelInfo<'a> {
    pub node: &'a TreeNode,
    /// Effects granted anywhere below this level, later levels excluded
    pub total_effects: Vec<&'a GrantableEffect>,
}

/// Walk `node`'s subtree without descending into further class levels.
fn within_level<'a>(node: &'a TreeNode, out: &mut Vec<&'a TreeNode>) {
    for child in &node.children {
        if child.is_decision_of(&PlannerStep::LEVEL_STEPS) {
            continue;
        }
        out.push(child);
        within_level(child, out);
    }
}

impl Character {
    /// Classes with the primary class first, then by levels taken.
    pub fn class_info(&self) -> Vec<ClassInfo<'_>> {
        let mut classes: Vec<ClassInfo<'_>> = Vec::new();

        for node in self.class_level_nodes() {
            let mut below = Vec::new();
            within_level(node, &mut below);
            let level = ClassLevelInfo {
                node,
                total_effects: below.iter().filter_map(|n| n.as_effect()).collect(),
            };
            let subclass = below
                .into_iter()
                .find(|n| n.step() == Some(PlannerStep::ChooseSubclass));

            match classes.iter_mut().find(|class| class.name == node.name) {
                Some(class) => {
                    class.levels.push(level);
                    class.subclass = class.subclass.or(subclass);
                }
                None => classes.push(ClassInfo {
                    name: node.name.clone(),
                    levels: vec![level],
                    subclass,
                }),
            }
        }

        for class in classes.iter_mut() {
            class
                .levels
                .sort_by_key(|level| level.node.as_decision().and_then(|d| d.level));
        }

        let primary = self.primary_class().map(|node| node.name.clone());
        classes.sort_by_key(|class| {
            (
                Some(&class.name) != primary.as_ref(),
                std::cmp::Reverse(class.levels.len()),
            )
        });
        classes
    }

    pub fn granted_effects(&self) -> Vec<&GrantableEffect> {
        self.root.iter().filter_map(TreeNode::as_effect).collect()
    }

    fn effects_of(&self, kind: EffectKind) -> Vec<&GrantableEffect> {
        self.granted_effects()
            .into_iter()
            .filter(|effect| effect.kind == kind)
            .collect()
    }

    pub fn passives(&self) -> Vec<&GrantableEffect> {
        self.effects_of(EffectKind::Passive)
    }

    pub fn actions(&self) -> Vec<&GrantableEffect> {
        self.effects_of(EffectKind::Action)
    }

    pub fn proficiencies(&self) -> Vec<&GrantableEffect> {
        self.effects_of(EffectKind::Proficiency)
    }

    /// Sum of every ability score passive in the build.
    pub fn total_ability_scores(&self) -> BTreeMap<Ability, i32> {
        let mut totals: BTreeMap<Ability, i32> =
            Ability::all().iter().map(|ability| (*ability, 0)).collect();
        for effect in self.passives() {
            if !effect.is_ability_score() {
                continue;
            }
            for (ability, value) in &effect.values {
                *totals.entry(*ability).or_insert(0) += value;
            }
        }
        totals
    }

    fn decisions_of(&self, step: PlannerStep) -> Vec<&TreeNode> {
        self.root.find_all_nodes(|node| node.step() == Some(step))
    }

    pub fn feats(&self) -> Vec<&TreeNode> {
        self.decisions_of(PlannerStep::Feat)
    }

    pub fn feat_by_name(&self, name: &str) -> Option<&TreeNode> {
        self.feats().into_iter().find(|node| node.name == name)
    }

    pub fn race(&self) -> Option<&TreeNode> {
        self.decisions_of(PlannerStep::SetRace).into_iter().next()
    }

    pub fn subrace(&self) -> Option<&TreeNode> {
        self.decisions_of(PlannerStep::ChooseSubrace).into_iter().next()
    }

    pub fn background(&self) -> Option<&TreeNode> {
        self.decisions_of(PlannerStep::SetBackground).into_iter().next()
    }

    /// Spells learned through `step` (LEARN_SPELLS or LEARN_CANTRIPS).
    pub fn known_spells(&self, step: PlannerStep) -> Vec<Arc<Spell>> {
        self.decisions_of(step)
            .into_iter()
            .filter_map(|node| node.as_decision()?.spell().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{self, answer, answer_all_first, build_fighter};

    #[test]
    fn class_info_groups_levels_by_class() {
        let character = build_fighter(3).level_up();
        let pending = character.next_decision().unwrap().clone();
        let proxy = pending.option_named("Add a class").cloned().unwrap();
        let character = character.make_decision(&pending, vec![proxy]).unwrap();
        let character = answer_all_first(&answer(&character, &["Wizard"]));

        let info = character.class_info();
        assert_eq!(info.len(), 2);
        assert_eq!(info[0].name, "Fighter");
        assert_eq!(info[0].levels.len(), 3);
        assert_eq!(info[0].subclass.unwrap().name, "Champion");
        assert_eq!(info[1].name, "Wizard");
        assert!(info[1].subclass.is_none());

        let first = &info[0].levels[0];
        let names: Vec<&str> = first.total_effects.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"Second Wind"));
        assert!(!names.contains(&"Action Surge"));
    }

    #[test]
    fn primary_class_sorts_first_even_with_fewer_levels() {
        let character = build_fighter(1).level_up();
        let pending = character.next_decision().unwrap().clone();
        let proxy = pending.option_named("Add a class").cloned().unwrap();
        let mut character = character.make_decision(&pending, vec![proxy]).unwrap();
        character = answer_all_first(&answer(&character, &["Wizard"]));
        character = answer_all_first(&answer(&character.level_up(), &["Wizard"]));

        let info = character.class_info();
        assert_eq!(info[0].name, "Fighter");
        assert_eq!(info[1].levels.len(), 2);
    }

    #[tokio::test]
    async fn completed_build_views() {
        let character = test_fixtures::complete_build(test_fixtures::session()).await;

        assert_eq!(character.race().unwrap().name, "Elf");
        assert_eq!(character.subrace().unwrap().name, "High Elf");
        assert_eq!(character.background().unwrap().name, "Soldier");
        assert_eq!(character.total_level(), 4);
        assert!(character.feat_by_name("Alert").is_some());

        let scores = character.total_ability_scores();
        assert_eq!(scores[&Ability::Strength], 15);
        assert_eq!(scores[&Ability::Dexterity], 14 + 2);
        assert_eq!(scores[&Ability::Intelligence], 8 + 1);

        assert!(character.actions().iter().any(|a| a.name == "Second Wind"));
        assert!(character.proficiencies().iter().any(|p| p.name == "Athletics"));
    }

    #[test]
    fn known_spells_by_step() {
        let character = Character::new(test_fixtures::session()).level_up();
        let character = answer_all_first(&answer(&character, &["Wizard"]));

        let cantrips = character.known_spells(PlannerStep::LearnCantrips);
        let spells = character.known_spells(PlannerStep::LearnSpells);
        assert_eq!(cantrips.len(), 3);
        assert!(cantrips.iter().all(|spell| spell.is_cantrip()));
        assert_eq!(spells.len(), 2);
        assert!(spells.iter().all(|spell| spell.level == 1));
    }
}
