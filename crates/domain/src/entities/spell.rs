//! Spell catalog entries.

use serde::{Deserialize, Serialize};

use crate::types::{ReferenceHandle, ReferenceTag, Referenceable};

/// A learnable spell. Level 0 is a cantrip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    pub id: u32,
    pub name: String,
    pub level: u8,
    /// Classes whose spell list includes this spell
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Spell {
    pub fn new(id: u32, name: impl Into<String>, level: u8) -> Self {
        Self {
            id,
            name: name.into(),
            level,
            classes: Vec::new(),
            school: None,
            description: None,
            image: None,
        }
    }

    pub fn with_classes(mut self, classes: &[&str]) -> Self {
        self.classes = classes.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn is_cantrip(&self) -> bool {
        self.level == 0
    }

    pub fn available_to(&self, class_name: &str) -> bool {
        self.classes.iter().any(|c| c == class_name)
    }
}

impl Referenceable for Spell {
    fn reference(&self) -> Option<ReferenceHandle> {
        Some(ReferenceHandle::new(ReferenceTag::Spell, self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spell_availability() {
        let spell = Spell::new(10, "Fire Bolt", 0).with_classes(&["Wizard", "Sorcerer"]);
        assert!(spell.is_cantrip());
        assert!(spell.available_to("Wizard"));
        assert!(!spell.available_to("Fighter"));
        assert_eq!(
            spell.reference(),
            Some(ReferenceHandle::new(ReferenceTag::Spell, 10))
        );
    }
}
