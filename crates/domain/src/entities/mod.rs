//! Catalog entities and the options built from them

mod class;
mod effect;
mod item;
mod option;
mod spell;

pub use class::{CharacterClass, ClassProgressionLevel, SpellSlots};
pub use effect::{Ability, EffectKind, GrantableEffect, PassiveSubtype};
pub use item::{EquipmentItem, EquipmentSlot, ItemType, WeaponHandedness, WeaponProperties};
pub use option::{CharacterChoice, CharacterOption, OptionPayload};
pub use spell::Spell;
