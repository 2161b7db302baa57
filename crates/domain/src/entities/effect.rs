//! Grantable effects: passives, actions and proficiencies produced by decisions.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::types::{ReferenceHandle, ReferenceTag, Referenceable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectKind {
    Passive,
    Action,
    Proficiency,
}

impl EffectKind {
    /// Reference pool used for catalog-backed effects of this kind.
    pub fn reference_tag(&self) -> Option<ReferenceTag> {
        match self {
            Self::Passive => Some(ReferenceTag::Passive),
            Self::Action => Some(ReferenceTag::Action),
            Self::Proficiency => None,
        }
    }
}

/// Passive subtypes the engine reads back out of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassiveSubtype {
    AbilityBase,
    AbilityRacial,
    AbilityFeat,
    Resistance,
    Other,
}

impl PassiveSubtype {
    pub fn is_ability_score(&self) -> bool {
        matches!(
            self,
            Self::AbilityBase | Self::AbilityRacial | Self::AbilityFeat
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn all() -> &'static [Ability] {
        &[
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Ability::Strength => "Strength",
            Ability::Dexterity => "Dexterity",
            Ability::Constitution => "Constitution",
            Ability::Intelligence => "Intelligence",
            Ability::Wisdom => "Wisdom",
            Ability::Charisma => "Charisma",
        };
        f.write_str(name)
    }
}

impl FromStr for Ability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strength" | "str" => Ok(Ability::Strength),
            "dexterity" | "dex" => Ok(Ability::Dexterity),
            "constitution" | "con" => Ok(Ability::Constitution),
            "intelligence" | "int" => Ok(Ability::Intelligence),
            "wisdom" | "wis" => Ok(Ability::Wisdom),
            "charisma" | "cha" => Ok(Ability::Charisma),
            _ => Err(DomainError::parse(format!("Unknown ability: {}", s))),
        }
    }
}

/// A passive trait, action or proficiency.
///
/// `grants` lists further effects this one brings along. They are expanded
/// into tree children when the effect is granted and the list is then cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantableEffect {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EffectKind,
    /// Catalog id; present for effects that can be looked up again
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<PassiveSubtype>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<Ability, i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grants: Vec<GrantableEffect>,
}

impl GrantableEffect {
    pub fn new(name: impl Into<String>, kind: EffectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            id: None,
            description: None,
            image: None,
            subtype: None,
            values: BTreeMap::new(),
            grants: Vec::new(),
        }
    }

    pub fn passive(name: impl Into<String>) -> Self {
        Self::new(name, EffectKind::Passive)
    }

    pub fn action(name: impl Into<String>) -> Self {
        Self::new(name, EffectKind::Action)
    }

    pub fn proficiency(name: impl Into<String>) -> Self {
        Self::new(name, EffectKind::Proficiency)
    }

    /// Ability score passive, e.g. point-buy base scores or racial bonuses.
    pub fn ability_scores(
        name: impl Into<String>,
        subtype: PassiveSubtype,
        values: BTreeMap<Ability, i32>,
    ) -> Self {
        Self {
            subtype: Some(subtype),
            values,
            ..Self::passive(name)
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
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

    pub fn is_ability_score(&self) -> bool {
        self.subtype.is_some_and(|s| s.is_ability_score())
    }
}

impl Referenceable for GrantableEffect {
    fn reference(&self) -> Option<ReferenceHandle> {
        let tag = self.kind.reference_tag()?;
        self.id.map(|id| ReferenceHandle::new(tag, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_catalog_passives_and_actions_are_referenceable() {
        let passive = GrantableEffect::passive("Darkvision").with_id(7);
        assert_eq!(
            passive.reference(),
            Some(ReferenceHandle::new(ReferenceTag::Passive, 7))
        );

        let action = GrantableEffect::action("Second Wind").with_id(3);
        assert_eq!(
            action.reference(),
            Some(ReferenceHandle::new(ReferenceTag::Action, 3))
        );

        assert_eq!(GrantableEffect::passive("Custom").reference(), None);
        assert_eq!(
            GrantableEffect::proficiency("Longswords").with_id(9).reference(),
            None
        );
    }

    #[test]
    fn test_deserialize_catalog_shape() {
        let json = r#"{
            "name": "Racial Bonus",
            "type": "PASSIVE",
            "subtype": "ABILITY_RACIAL",
            "values": { "Strength": 2, "Charisma": 1 }
        }"#;
        let effect: GrantableEffect = serde_json::from_str(json).unwrap();
        assert!(effect.is_ability_score());
        assert_eq!(effect.values.get(&Ability::Strength), Some(&2));
        assert!(effect.grants.is_empty());
    }

    #[test]
    fn test_ability_from_str() {
        assert_eq!("dex".parse::<Ability>().unwrap(), Ability::Dexterity);
        assert_eq!("Wisdom".parse::<Ability>().unwrap(), Ability::Wisdom);
        assert!("luck".parse::<Ability>().is_err());
    }
}
