//! Equipment items and the slots they go in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::types::{ReferenceHandle, ReferenceTag, Referenceable};

use super::GrantableEffect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Head,
    Cloak,
    Chest,
    Hands,
    Feet,
    Amulet,
    Ring1,
    Ring2,
    MeleeMainhand,
    MeleeOffhand,
    RangedMainhand,
    RangedOffhand,
}

impl EquipmentSlot {
    pub fn all() -> &'static [EquipmentSlot] {
        &[
            EquipmentSlot::Head,
            EquipmentSlot::Cloak,
            EquipmentSlot::Chest,
            EquipmentSlot::Hands,
            EquipmentSlot::Feet,
            EquipmentSlot::Amulet,
            EquipmentSlot::Ring1,
            EquipmentSlot::Ring2,
            EquipmentSlot::MeleeMainhand,
            EquipmentSlot::MeleeOffhand,
            EquipmentSlot::RangedMainhand,
            EquipmentSlot::RangedOffhand,
        ]
    }

    /// The off-hand slot paired with a main-hand slot.
    pub fn offhand(&self) -> Option<EquipmentSlot> {
        match self {
            Self::MeleeMainhand => Some(Self::MeleeOffhand),
            Self::RangedMainhand => Some(Self::RangedOffhand),
            _ => None,
        }
    }

    /// The main-hand slot an off-hand slot depends on.
    pub fn mainhand(&self) -> Option<EquipmentSlot> {
        match self {
            Self::MeleeOffhand => Some(Self::MeleeMainhand),
            Self::RangedOffhand => Some(Self::RangedMainhand),
            _ => None,
        }
    }

    /// Static slot/type compatibility. Dual-wield and handedness rules depend
    /// on the rest of the build and are applied by the engine.
    pub fn accepts_type(&self, item: &EquipmentItem) -> bool {
        match self {
            Self::Head => item.item_type == ItemType::Helmet,
            Self::Cloak => item.item_type == ItemType::Cloak,
            Self::Chest => item.item_type == ItemType::Armour,
            Self::Hands => item.item_type == ItemType::Gloves,
            Self::Feet => item.item_type == ItemType::Boots,
            Self::Amulet => item.item_type == ItemType::Amulet,
            Self::Ring1 | Self::Ring2 => item.item_type == ItemType::Ring,
            Self::MeleeMainhand => item.weapon.is_some_and(|w| !w.ranged),
            Self::MeleeOffhand => {
                item.item_type == ItemType::Shields || item.weapon.is_some_and(|w| !w.ranged)
            }
            Self::RangedMainhand | Self::RangedOffhand => item.weapon.is_some_and(|w| w.ranged),
        }
    }
}

impl fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for EquipmentSlot {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EquipmentSlot::all()
            .iter()
            .find(|slot| slot.to_string().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| DomainError::parse(format!("Unknown equipment slot: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Weapon,
    Shields,
    Armour,
    Helmet,
    Cloak,
    Gloves,
    Boots,
    Amulet,
    Ring,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeaponHandedness {
    OneHanded,
    TwoHanded,
    Versatile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponProperties {
    pub handedness: WeaponHandedness,
    #[serde(default)]
    pub light: bool,
    #[serde(default)]
    pub cant_dual_wield: bool,
    #[serde(default)]
    pub ranged: bool,
}

impl WeaponProperties {
    pub fn is_two_handed(&self) -> bool {
        self.handedness == WeaponHandedness::TwoHanded
    }
}

/// An equippable catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentItem {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    /// Present for weapons
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon: Option<WeaponProperties>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<GrantableEffect>,
}

impl EquipmentItem {
    pub fn new(id: u32, name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            id,
            name: name.into(),
            item_type,
            description: None,
            image: None,
            rarity: None,
            weapon: None,
            effects: Vec::new(),
        }
    }

    pub fn weapon(id: u32, name: impl Into<String>, properties: WeaponProperties) -> Self {
        Self {
            weapon: Some(properties),
            ..Self::new(id, name, ItemType::Weapon)
        }
    }

    pub fn is_shield(&self) -> bool {
        self.item_type == ItemType::Shields
    }

    pub fn is_two_handed(&self) -> bool {
        self.weapon.is_some_and(|w| w.is_two_handed())
    }
}

impl Referenceable for EquipmentItem {
    fn reference(&self) -> Option<ReferenceHandle> {
        Some(ReferenceHandle::new(ReferenceTag::Item, self.id))
    }
}
