//! Reference interning.
//!
//! One pool per entity class, keyed by catalog id. Pools are append-only for
//! the life of a `PlannerSession`: the first instance seen for an id wins and
//! every later lookup hands out that same `Arc`. Population happens as a side
//! effect of decisions and imports, possibly from several tasks at once, so
//! each pool is its own `DashMap`.

use std::sync::Arc;

use charplan_domain::{
    EquipmentItem, GrantableEffect, NodeKind, ReferenceHandle, ReferenceTag, Referenceable, Spell,
    TreeNode,
};
use dashmap::DashMap;

use super::ports::{CatalogEntity, CatalogError, CatalogPort};

/// A live entity behind a handle.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedEntity {
    Item(Arc<EquipmentItem>),
    Spell(Arc<Spell>),
    Effect(Arc<GrantableEffect>),
}

#[derive(Debug, Default)]
pub struct ReferenceRegistry {
    items: DashMap<u32, Arc<EquipmentItem>>,
    spells: DashMap<u32, Arc<Spell>>,
    passives: DashMap<u32, Arc<GrantableEffect>>,
    actions: DashMap<u32, Arc<GrantableEffect>>,
}

impl ReferenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool `item`, returning the pooled instance for its id.
    pub fn intern_item(&self, item: Arc<EquipmentItem>) -> Arc<EquipmentItem> {
        self.items.entry(item.id).or_insert(item).value().clone()
    }

    pub fn intern_spell(&self, spell: Arc<Spell>) -> Arc<Spell> {
        self.spells.entry(spell.id).or_insert(spell).value().clone()
    }

    /// Pool a catalog-backed passive or action. Nested grants are dropped:
    /// once granted they live in the tree as children.
    pub fn intern_effect(&self, effect: &GrantableEffect) -> Option<ReferenceHandle> {
        let handle = effect.reference()?;
        let pool = self.effect_pool(handle.tag)?;
        pool.entry(handle.id).or_insert_with(|| {
            Arc::new(GrantableEffect {
                grants: Vec::new(),
                ..effect.clone()
            })
        });
        Some(handle)
    }

    /// Pool every referenceable entity in a tree. Returns how many nodes
    /// carried a reference.
    pub fn intern_tree(&self, root: &TreeNode) -> usize {
        let mut count = 0;
        for node in root.iter() {
            match &node.kind {
                NodeKind::Decision(decision) => {
                    if let Some(spell) = decision.spell() {
                        self.intern_spell(spell.clone());
                        count += 1;
                    }
                    if let Some((_, item)) = decision.equipped() {
                        self.intern_item(item.clone());
                        count += 1;
                    }
                }
                NodeKind::Effect(effect) => {
                    if self.intern_effect(&effect.effect).is_some() {
                        count += 1;
                    }
                }
                NodeKind::Root => {}
            }
        }
        count
    }

    pub fn item(&self, id: u32) -> Option<Arc<EquipmentItem>> {
        self.items.get(&id).map(|entry| entry.value().clone())
    }

    pub fn spell(&self, id: u32) -> Option<Arc<Spell>> {
        self.spells.get(&id).map(|entry| entry.value().clone())
    }

    pub fn passive(&self, id: u32) -> Option<Arc<GrantableEffect>> {
        self.passives.get(&id).map(|entry| entry.value().clone())
    }

    pub fn action(&self, id: u32) -> Option<Arc<GrantableEffect>> {
        self.actions.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self, tag: ReferenceTag) -> usize {
        match tag {
            ReferenceTag::Item => self.items.len(),
            ReferenceTag::Spell => self.spells.len(),
            ReferenceTag::Passive => self.passives.len(),
            ReferenceTag::Action => self.actions.len(),
        }
    }

    fn effect_pool(&self, tag: ReferenceTag) -> Option<&DashMap<u32, Arc<GrantableEffect>>> {
        match tag {
            ReferenceTag::Passive => Some(&self.passives),
            ReferenceTag::Action => Some(&self.actions),
            ReferenceTag::Item | ReferenceTag::Spell => None,
        }
    }

    fn pooled(&self, handle: ReferenceHandle) -> Option<ResolvedEntity> {
        match handle.tag {
            ReferenceTag::Item => self.item(handle.id).map(ResolvedEntity::Item),
            ReferenceTag::Spell => self.spell(handle.id).map(ResolvedEntity::Spell),
            ReferenceTag::Passive => self.passive(handle.id).map(ResolvedEntity::Effect),
            ReferenceTag::Action => self.action(handle.id).map(ResolvedEntity::Effect),
        }
    }

    /// Resolve a handle to a live entity, asking the catalog on first use.
    pub async fn resolve(
        &self,
        handle: ReferenceHandle,
        catalog: &dyn CatalogPort,
    ) -> Result<ResolvedEntity, CatalogError> {
        if let Some(found) = self.pooled(handle) {
            return Ok(found);
        }

        let entity = catalog.entity_by_id(handle.tag, handle.id).await?;
        tracing::debug!(handle = %handle, kind = entity.kind_name(), "Resolved reference from catalog");

        let resolved = match (handle.tag, entity) {
            (ReferenceTag::Item, CatalogEntity::Item(item)) => {
                ResolvedEntity::Item(self.intern_item(Arc::new(item)))
            }
            (ReferenceTag::Spell, CatalogEntity::Spell(spell)) => {
                ResolvedEntity::Spell(self.intern_spell(Arc::new(spell)))
            }
            (ReferenceTag::Passive | ReferenceTag::Action, CatalogEntity::Effect(effect)) => {
                let effect = GrantableEffect {
                    id: Some(handle.id),
                    grants: Vec::new(),
                    ..effect
                };
                let pool = self
                    .effect_pool(handle.tag)
                    .ok_or_else(|| CatalogError::malformed(format!("no pool for {}", handle)))?;
                let pooled = pool.entry(handle.id).or_insert_with(|| Arc::new(effect)).value().clone();
                ResolvedEntity::Effect(pooled)
            }
            (_, other) => {
                return Err(CatalogError::malformed(format!(
                    "catalog returned {} for handle {}",
                    other.kind_name(),
                    handle
                )))
            }
        };

        Ok(resolved)
    }
}
