//! Reference handles for interned catalog entities

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entity class of an interned reference. Serialized as a one-letter tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReferenceTag {
    #[serde(rename = "e")]
    Item,
    #[serde(rename = "s")]
    Spell,
    #[serde(rename = "p")]
    Passive,
    #[serde(rename = "a")]
    Action,
}

impl ReferenceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Item => "e",
            Self::Spell => "s",
            Self::Passive => "p",
            Self::Action => "a",
        }
    }

    pub fn entity_name(&self) -> &'static str {
        match self {
            Self::Item => "EquipmentItem",
            Self::Spell => "Spell",
            Self::Passive => "Passive",
            Self::Action => "Action",
        }
    }
}

impl fmt::Display for ReferenceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferenceTag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "e" => Ok(Self::Item),
            "s" => Ok(Self::Spell),
            "p" => Ok(Self::Passive),
            "a" => Ok(Self::Action),
            _ => Err(DomainError::parse(format!("Unknown reference tag: {}", s))),
        }
    }
}

/// A `{class-tag, id}` stand-in for a catalog entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceHandle {
    #[serde(rename = "t")]
    pub tag: ReferenceTag,
    #[serde(rename = "i")]
    pub id: u32,
}

impl ReferenceHandle {
    pub fn new(tag: ReferenceTag, id: u32) -> Self {
        Self { tag, id }
    }
}

impl fmt::Display for ReferenceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tag, self.id)
    }
}

/// Implemented by catalog entities that can be replaced by a handle when a
/// tree is serialized. Returns `None` when the value has no catalog id and
/// must be written inline.
pub trait Referenceable {
    fn reference(&self) -> Option<ReferenceHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_serializes_compactly() {
        let handle = ReferenceHandle::new(ReferenceTag::Spell, 42);
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(json, r#"{"t":"s","i":42}"#);
        assert_eq!(handle.to_string(), "s:42");
    }

    #[test]
    fn test_tag_from_str() {
        assert_eq!("p".parse::<ReferenceTag>().unwrap(), ReferenceTag::Passive);
        assert!("x".parse::<ReferenceTag>().is_err());
    }
}
