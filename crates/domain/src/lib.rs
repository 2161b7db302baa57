//! Charplan domain: the vocabulary of a character build.
//!
//! Everything in this crate is pure and synchronous. The engine crate owns the
//! decision queue, catalog access and serialization; this crate owns the types
//! those operate on:
//!
//! - `types/` - planner step kinds and interned reference handles
//! - `entities/` - catalog records (classes, spells, items, grantable effects)
//!   and the options/choices offered to the user
//! - `tree/` - the ownership tree of resolved decisions and granted effects
//! - `pending` - unresolved decisions awaiting an answer

extern crate self as charplan_domain;

pub mod entities;
pub mod error;
pub mod ids;
pub mod pending;
pub mod tree;
pub mod types;

pub use entities::{
    Ability, CharacterChoice, CharacterClass, CharacterOption, ClassProgressionLevel, EffectKind,
    EquipmentItem, EquipmentSlot, GrantableEffect, ItemType, OptionPayload, PassiveSubtype, Spell,
    SpellSlots, WeaponHandedness, WeaponProperties,
};
pub use error::DomainError;
pub use ids::{DecisionId, NodeId};
pub use pending::PendingDecision;
pub use tree::{DecisionNode, DecisionPayload, EffectNode, NodeKind, NodeType, PreOrder, TreeNode};
pub use types::{PlannerStep, ReferenceHandle, ReferenceTag, Referenceable};
