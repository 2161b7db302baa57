//! In-memory catalog adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use charplan_domain::{
    CharacterClass, CharacterOption, EquipmentItem, GrantableEffect, ReferenceTag, Spell,
};

use super::CatalogDocument;
use crate::infrastructure::ports::{CatalogEntity, CatalogError, CatalogPort};

/// Catalog serving fixed tables, indexed by id for handle lookups.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    classes: Vec<CharacterClass>,
    spells: Vec<Spell>,
    races: Vec<CharacterOption>,
    backgrounds: Vec<CharacterOption>,
    items: HashMap<u32, EquipmentItem>,
    spells_by_id: HashMap<u32, Spell>,
    passives: HashMap<u32, GrantableEffect>,
    actions: HashMap<u32, GrantableEffect>,
}

impl InMemoryCatalog {
    pub fn new(document: CatalogDocument) -> Self {
        let CatalogDocument {
            classes,
            spells,
            races,
            backgrounds,
            items,
            passives,
            actions,
        } = document;

        let spells_by_id = spells.iter().map(|s| (s.id, s.clone())).collect();

        Self {
            classes,
            spells,
            races,
            backgrounds,
            items: items.into_iter().map(|i| (i.id, i)).collect(),
            spells_by_id,
            passives: index_effects(passives),
            actions: index_effects(actions),
        }
    }

    pub fn item(&self, id: u32) -> Option<&EquipmentItem> {
        self.items.get(&id)
    }
}

fn index_effects(effects: Vec<GrantableEffect>) -> HashMap<u32, GrantableEffect> {
    effects
        .into_iter()
        .filter_map(|effect| effect.id.map(|id| (id, effect)))
        .collect()
}

#[async_trait]
impl CatalogPort for InMemoryCatalog {
    async fn class_options(&self) -> Result<Vec<CharacterClass>, CatalogError> {
        Ok(self.classes.clone())
    }

    async fn spell_options(&self, class_name: Option<String>) -> Result<Vec<Spell>, CatalogError> {
        Ok(match class_name {
            Some(name) => self
                .spells
                .iter()
                .filter(|spell| spell.available_to(&name))
                .cloned()
                .collect(),
            None => self.spells.clone(),
        })
    }

    async fn race_options(&self) -> Result<Vec<CharacterOption>, CatalogError> {
        Ok(self.races.clone())
    }

    async fn background_options(&self) -> Result<Vec<CharacterOption>, CatalogError> {
        Ok(self.backgrounds.clone())
    }

    async fn entity_by_id(&self, tag: ReferenceTag, id: u32) -> Result<CatalogEntity, CatalogError> {
        let found = match tag {
            ReferenceTag::Item => self.items.get(&id).cloned().map(CatalogEntity::Item),
            ReferenceTag::Spell => self.spells_by_id.get(&id).cloned().map(CatalogEntity::Spell),
            ReferenceTag::Passive => self.passives.get(&id).cloned().map(CatalogEntity::Effect),
            ReferenceTag::Action => self.actions.get(&id).cloned().map(CatalogEntity::Effect),
        };
        found.ok_or_else(|| CatalogError::not_found(tag, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures;

    #[tokio::test]
    async fn spell_options_filter_by_class() {
        let catalog = test_fixtures::catalog();

        let all = catalog.spell_options(None).await.unwrap();
        let wizard = catalog.spell_options(Some("Wizard".into())).await.unwrap();
        let fighter = catalog.spell_options(Some("Fighter".into())).await.unwrap();

        assert!(!all.is_empty());
        assert!(wizard.iter().all(|s| s.available_to("Wizard")));
        assert!(fighter.is_empty());
    }

    #[tokio::test]
    async fn entity_lookup_by_tag() {
        let catalog = test_fixtures::catalog();

        let item = catalog.entity_by_id(ReferenceTag::Item, 1).await.unwrap();
        assert!(matches!(item, CatalogEntity::Item(ref i) if i.name == "Greatsword"));

        let err = catalog
            .entity_by_id(ReferenceTag::Action, 9999)
            .await
            .unwrap_err();
        assert_eq!(err, CatalogError::not_found(ReferenceTag::Action, 9999));
    }
}
