//! Planner step kinds
//!
//! A `PlannerStep` tags both the entries of the engine's step script and every
//! decision recorded in the build tree. The SCREAMING_SNAKE_CASE names are the
//! ones used by catalog documents and export strings.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of question a decision answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlannerStep {
    SetRace,
    ChooseSubrace,
    PrimaryClass,
    SecondaryClass,
    LevelUp,
    /// Synthetic "add a class" option; expands into a SECONDARY_CLASS choice
    MulticlassProxy,
    SetBackground,
    SetAbilityScores,
    ClassFeature,
    ChooseSubclass,
    SubclassFeature,
    Feat,
    FeatSubchoice,
    ClassFeatureSubchoice,
    LearnSpells,
    LearnCantrips,
    WarlockPactBoon,
    WarlockDeepenedPact,
    EquipItem,
    /// Open decision whose answers are the control steps below
    ManageLevels,
    RemoveLevel,
    ReviseLevel,
    ChangePrimaryClass,
}

impl PlannerStep {
    /// Steps that create a class level node.
    pub const LEVEL_STEPS: [PlannerStep; 3] = [
        PlannerStep::LevelUp,
        PlannerStep::SecondaryClass,
        PlannerStep::PrimaryClass,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SetRace => "SET_RACE",
            Self::ChooseSubrace => "CHOOSE_SUBRACE",
            Self::PrimaryClass => "PRIMARY_CLASS",
            Self::SecondaryClass => "SECONDARY_CLASS",
            Self::LevelUp => "LEVEL_UP",
            Self::MulticlassProxy => "MULTICLASS_PROXY",
            Self::SetBackground => "SET_BACKGROUND",
            Self::SetAbilityScores => "SET_ABILITY_SCORES",
            Self::ClassFeature => "CLASS_FEATURE",
            Self::ChooseSubclass => "CHOOSE_SUBCLASS",
            Self::SubclassFeature => "SUBCLASS_FEATURE",
            Self::Feat => "FEAT",
            Self::FeatSubchoice => "FEAT_SUBCHOICE",
            Self::ClassFeatureSubchoice => "CLASS_FEATURE_SUBCHOICE",
            Self::LearnSpells => "LEARN_SPELLS",
            Self::LearnCantrips => "LEARN_CANTRIPS",
            Self::WarlockPactBoon => "WARLOCK_PACT_BOON",
            Self::WarlockDeepenedPact => "WARLOCK_DEEPENED_PACT",
            Self::EquipItem => "EQUIP_ITEM",
            Self::ManageLevels => "MANAGE_LEVELS",
            Self::RemoveLevel => "REMOVE_LEVEL",
            Self::ReviseLevel => "REVISE_LEVEL",
            Self::ChangePrimaryClass => "CHANGE_PRIMARY_CLASS",
        }
    }

    /// Whether a decision of this kind is a class level (primary, secondary or level-up).
    pub fn is_level_step(&self) -> bool {
        Self::LEVEL_STEPS.contains(self)
    }

    /// Control steps act on the tree and are never attached to it.
    pub fn is_control(&self) -> bool {
        matches!(
            self,
            Self::RemoveLevel | Self::ReviseLevel | Self::ChangePrimaryClass
        )
    }
}

impl fmt::Display for PlannerStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlannerStep {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SET_RACE" => Ok(Self::SetRace),
            "CHOOSE_SUBRACE" => Ok(Self::ChooseSubrace),
            "PRIMARY_CLASS" => Ok(Self::PrimaryClass),
            "SECONDARY_CLASS" => Ok(Self::SecondaryClass),
            "LEVEL_UP" => Ok(Self::LevelUp),
            "MULTICLASS_PROXY" => Ok(Self::MulticlassProxy),
            "SET_BACKGROUND" => Ok(Self::SetBackground),
            "SET_ABILITY_SCORES" => Ok(Self::SetAbilityScores),
            "CLASS_FEATURE" => Ok(Self::ClassFeature),
            "CHOOSE_SUBCLASS" => Ok(Self::ChooseSubclass),
            "SUBCLASS_FEATURE" => Ok(Self::SubclassFeature),
            "FEAT" => Ok(Self::Feat),
            "FEAT_SUBCHOICE" => Ok(Self::FeatSubchoice),
            "CLASS_FEATURE_SUBCHOICE" => Ok(Self::ClassFeatureSubchoice),
            "LEARN_SPELLS" => Ok(Self::LearnSpells),
            "LEARN_CANTRIPS" => Ok(Self::LearnCantrips),
            "WARLOCK_PACT_BOON" => Ok(Self::WarlockPactBoon),
            "WARLOCK_DEEPENED_PACT" => Ok(Self::WarlockDeepenedPact),
            "EQUIP_ITEM" => Ok(Self::EquipItem),
            "MANAGE_LEVELS" => Ok(Self::ManageLevels),
            "REMOVE_LEVEL" => Ok(Self::RemoveLevel),
            "REVISE_LEVEL" => Ok(Self::ReviseLevel),
            "CHANGE_PRIMARY_CLASS" => Ok(Self::ChangePrimaryClass),
            _ => Err(DomainError::parse(format!("Unknown planner step: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serde() {
        for step in [
            PlannerStep::SetRace,
            PlannerStep::LevelUp,
            PlannerStep::WarlockDeepenedPact,
            PlannerStep::ChangePrimaryClass,
        ] {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(json, format!("\"{}\"", step));
        }
    }

    #[test]
    fn test_from_str_round_trip() {
        assert_eq!(
            "CLASS_FEATURE_SUBCHOICE".parse::<PlannerStep>().unwrap(),
            PlannerStep::ClassFeatureSubchoice
        );
        assert!("LEVEL-UP".parse::<PlannerStep>().is_err());
    }

    #[test]
    fn test_level_and_control_steps() {
        assert!(PlannerStep::PrimaryClass.is_level_step());
        assert!(PlannerStep::SecondaryClass.is_level_step());
        assert!(!PlannerStep::MulticlassProxy.is_level_step());
        assert!(PlannerStep::ReviseLevel.is_control());
        assert!(!PlannerStep::ManageLevels.is_control());
    }
}
