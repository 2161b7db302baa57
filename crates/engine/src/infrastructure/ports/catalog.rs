//! Catalog lookup port.

use async_trait::async_trait;
use charplan_domain::{
    CharacterClass, CharacterOption, EquipmentItem, GrantableEffect, ReferenceTag, Spell,
};

use super::error::CatalogError;

/// A full entity returned for a reference handle.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEntity {
    Item(EquipmentItem),
    Spell(Spell),
    /// Passive or action, depending on the tag it was looked up with
    Effect(GrantableEffect),
}

impl CatalogEntity {
    pub fn kind_name(&self) -> &'static str {
        match self {
            CatalogEntity::Item(_) => "item",
            CatalogEntity::Spell(_) => "spell",
            CatalogEntity::Effect(_) => "effect",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// Class definitions with their per-level progression tables.
    async fn class_options(&self) -> Result<Vec<CharacterClass>, CatalogError>;

    /// Spells, optionally restricted to one class's list.
    async fn spell_options(&self, class_name: Option<String>) -> Result<Vec<Spell>, CatalogError>;

    async fn race_options(&self) -> Result<Vec<CharacterOption>, CatalogError>;

    async fn background_options(&self) -> Result<Vec<CharacterOption>, CatalogError>;

    async fn entity_by_id(&self, tag: ReferenceTag, id: u32) -> Result<CatalogEntity, CatalogError>;
}
