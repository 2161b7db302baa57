//! Options and choices: what the user is offered and may pick.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;
use crate::types::PlannerStep;

use super::{EquipmentItem, EquipmentSlot, GrantableEffect, Spell};

/// Entity carried by an option beyond its name and grants.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OptionPayload {
    #[default]
    None,
    Spell(Arc<Spell>),
    Item {
        slot: EquipmentSlot,
        item: Arc<EquipmentItem>,
    },
}

/// A prospective decision outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterOption {
    pub name: String,
    /// Overrides the step of the pending decision when this option is chosen
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub step: Option<PlannerStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grants: Vec<GrantableEffect>,
    /// Sub-decisions introduced by picking this option
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<CharacterChoice>,
    /// Class levels already taken, for class options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    /// Class a feature option was granted by
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_class: Option<String>,
    #[serde(skip)]
    pub payload: OptionPayload,
    /// Tree node a control option acts on
    #[serde(skip)]
    pub target: Option<NodeId>,
}

impl CharacterOption {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            step: None,
            description: None,
            image: None,
            grants: Vec::new(),
            choices: Vec::new(),
            level: None,
            owner_class: None,
            payload: OptionPayload::None,
            target: None,
        }
    }

    pub fn with_step(mut self, step: PlannerStep) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_grants(mut self, grants: Vec<GrantableEffect>) -> Self {
        self.grants = grants;
        self
    }

    pub fn with_choices(mut self, choices: Vec<CharacterChoice>) -> Self {
        self.choices = choices;
        self
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = Some(level);
        self
    }

    /// Mark this option as a feature of `class` granted at `level`.
    pub fn granted_by(mut self, class: impl Into<String>, level: u8) -> Self {
        self.owner_class = Some(class.into());
        self.with_level(level)
    }

    /// Option that learns `spell` under a LEARN_SPELLS or LEARN_CANTRIPS choice.
    pub fn spell(spell: Arc<Spell>, step: PlannerStep) -> Self {
        Self {
            description: spell.description.clone(),
            image: spell.image.clone(),
            payload: OptionPayload::Spell(spell.clone()),
            ..Self::new(spell.name.clone()).with_step(step)
        }
    }

    pub fn equip(slot: EquipmentSlot, item: Arc<EquipmentItem>) -> Self {
        Self {
            image: item.image.clone(),
            payload: OptionPayload::Item {
                slot,
                item: item.clone(),
            },
            ..Self::new(item.name.clone()).with_step(PlannerStep::EquipItem)
        }
    }

    /// The synthetic "add a class" option offered alongside level-ups.
    pub fn multiclass_proxy(new_classes: Vec<CharacterOption>) -> Self {
        Self::new("Add a class")
            .with_step(PlannerStep::MulticlassProxy)
            .with_choices(vec![CharacterChoice::new(
                PlannerStep::SecondaryClass,
                new_classes,
            )])
    }

    pub fn remove_level(target: NodeId, class_name: impl Into<String>) -> Self {
        Self::control(PlannerStep::RemoveLevel, target, class_name)
    }

    pub fn revise_level(target: NodeId, class_name: impl Into<String>) -> Self {
        Self::control(PlannerStep::ReviseLevel, target, class_name)
    }

    pub fn change_primary_class(class_name: impl Into<String>) -> Self {
        Self::new(class_name).with_step(PlannerStep::ChangePrimaryClass)
    }

    fn control(step: PlannerStep, target: NodeId, name: impl Into<String>) -> Self {
        Self {
            target: Some(target),
            ..Self::new(name).with_step(step)
        }
    }

    pub fn is_control(&self) -> bool {
        self.step.is_some_and(|s| s.is_control())
    }
}

fn default_count() -> usize {
    1
}

/// Declaration of a sub-decision: pick `count` of `options`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterChoice {
    #[serde(rename = "type")]
    pub step: PlannerStep,
    #[serde(default)]
    pub options: Vec<CharacterOption>,
    #[serde(default = "default_count")]
    pub count: usize,
    /// When present the choice is pre-determined and resolved without input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forced_options: Option<Vec<CharacterOption>>,
}

impl CharacterChoice {
    pub fn new(step: PlannerStep, options: Vec<CharacterOption>) -> Self {
        Self {
            step,
            options,
            count: 1,
            forced_options: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// A single-option choice that is always taken.
    pub fn forced(step: PlannerStep, option: CharacterOption) -> Self {
        Self {
            step,
            options: vec![option.clone()],
            count: 1,
            forced_options: Some(vec![option]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_defaults_to_single_pick() {
        let json = r#"{
            "type": "FEAT",
            "options": [{ "name": "Alert" }, { "name": "Tough" }]
        }"#;
        let choice: CharacterChoice = serde_json::from_str(json).unwrap();
        assert_eq!(choice.count, 1);
        assert!(choice.forced_options.is_none());
        assert_eq!(choice.options[1].name, "Tough");
    }

    #[test]
    fn test_control_options_carry_target() {
        let target = NodeId::new();
        let revise = CharacterOption::revise_level(target, "Fighter");
        assert!(revise.is_control());
        assert_eq!(revise.target, Some(target));
        assert!(!CharacterOption::new("Fighter").is_control());
    }

    #[test]
    fn test_multiclass_proxy_wraps_secondary_class_choice() {
        let proxy = CharacterOption::multiclass_proxy(vec![CharacterOption::new("Wizard")]);
        assert_eq!(proxy.step, Some(PlannerStep::MulticlassProxy));
        assert_eq!(proxy.choices.len(), 1);
        assert_eq!(proxy.choices[0].step, PlannerStep::SecondaryClass);
    }
}
