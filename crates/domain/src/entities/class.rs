//! Class definitions with per-level progression tables.

use serde::{Deserialize, Serialize};

use super::CharacterOption;

/// Spell slots available at a class level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpellSlots {
    /// Slot counts by spell level; index 0 holds level 1 slots
    ByLevel(Vec<u8>),
    /// Warlock-style pact slots, all of one level
    #[serde(rename_all = "camelCase")]
    Pact { slots: u8, slot_level: u8 },
}

impl SpellSlots {
    /// Highest spell level with at least one slot, or 0 without any.
    pub fn highest_slot_level(&self) -> u8 {
        match self {
            SpellSlots::ByLevel(counts) => counts
                .iter()
                .rposition(|count| *count > 0)
                .map_or(0, |idx| (idx + 1) as u8),
            SpellSlots::Pact { slots, slot_level } => {
                if *slots > 0 {
                    *slot_level
                } else {
                    0
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassProgressionLevel {
    pub level: u8,
    /// Features gained on reaching this level
    #[serde(default)]
    pub features: Vec<CharacterOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spells_known: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cantrips_known: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spell_slots: Option<SpellSlots>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterClass {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub progression: Vec<ClassProgressionLevel>,
}

impl CharacterClass {
    /// Progression row for a 1-based class level.
    pub fn progression_at(&self, level: usize) -> Option<&ClassProgressionLevel> {
        level.checked_sub(1).and_then(|idx| self.progression.get(idx))
    }

    pub fn max_level(&self) -> usize {
        self.progression.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highest_slot_level() {
        assert_eq!(SpellSlots::ByLevel(vec![4, 3, 2]).highest_slot_level(), 3);
        assert_eq!(SpellSlots::ByLevel(vec![2, 0]).highest_slot_level(), 1);
        assert_eq!(SpellSlots::ByLevel(vec![]).highest_slot_level(), 0);
        assert_eq!(
            SpellSlots::Pact {
                slots: 2,
                slot_level: 3
            }
            .highest_slot_level(),
            3
        );
    }

    #[test]
    fn test_progression_at_is_one_based() {
        let json = r#"{
            "name": "Wizard",
            "progression": [
                { "level": 1, "cantripsKnown": 3, "spellsKnown": 6, "spellSlots": { "byLevel": [2] } },
                { "level": 2, "features": [{ "name": "Arcane Tradition" }] }
            ]
        }"#;
        let class: CharacterClass = serde_json::from_str(json).unwrap();
        assert_eq!(class.max_level(), 2);
        assert_eq!(class.progression_at(1).unwrap().cantrips_known, Some(3));
        assert_eq!(class.progression_at(2).unwrap().features[0].name, "Arcane Tradition");
        assert!(class.progression_at(0).is_none());
        assert!(class.progression_at(3).is_none());
    }
}
