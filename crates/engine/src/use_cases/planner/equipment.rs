//! Equipment slots.

use std::collections::BTreeMap;
use std::sync::Arc;

use charplan_domain::{
    CharacterOption, DomainError, EquipmentItem, EquipmentSlot, NodeId, PlannerStep, TreeNode,
};

use super::{Character, PlannerError};

const DUAL_WIELDER_FEAT: &str = "Dual Wielder";

/// An item held in a slot, with the tree node that records it.
#[derive(Debug, Clone, PartialEq)]
pub struct EquippedItem {
    pub node: NodeId,
    pub slot: EquipmentSlot,
    pub item: Arc<EquipmentItem>,
}

impl Character {
    /// Current equipment by slot. When a slot was recorded twice the later
    /// node wins.
    pub fn equipment(&self) -> BTreeMap<EquipmentSlot, EquippedItem> {
        let mut equipped = BTreeMap::new();
        for node in self.root.iter() {
            let Some((slot, item)) = node.as_decision().and_then(|decision| decision.equipped()) else {
                continue;
            };
            equipped.insert(
                slot,
                EquippedItem {
                    node: node.id,
                    slot,
                    item: item.clone(),
                },
            );
        }
        equipped
    }

    pub fn equipped_in(&self, slot: EquipmentSlot) -> Option<Arc<EquipmentItem>> {
        self.equipment().remove(&slot).map(|equipped| equipped.item)
    }

    fn has_feat(&self, name: &str) -> bool {
        self.root
            .find_node(|node| node.step() == Some(PlannerStep::Feat) && node.name == name)
            .is_some()
    }

    /// Whether `item` can be held in an off hand next to another weapon.
    pub fn dual_wield_filter(&self, item: &EquipmentItem) -> bool {
        let Some(weapon) = item.weapon else {
            return false;
        };
        if self.has_feat(DUAL_WIELDER_FEAT) {
            !weapon.cant_dual_wield
        } else {
            weapon.light && !weapon.cant_dual_wield
        }
    }

    /// Whether the weapon in `mainhand` allows an off-hand weapon.
    pub fn can_dual_wield(&self, mainhand: EquipmentSlot) -> bool {
        self.equipped_in(mainhand)
            .is_none_or(|item| self.dual_wield_filter(&item))
    }

    /// Whether anything may go in the off hand paired with `mainhand`.
    pub fn can_use_offhand(&self, mainhand: EquipmentSlot) -> bool {
        self.equipped_in(mainhand)
            .is_none_or(|item| !item.is_two_handed())
    }

    /// An off-hand slot is disabled while its main hand holds a two-handed
    /// weapon.
    pub fn slot_disabled(&self, slot: EquipmentSlot) -> bool {
        slot.mainhand()
            .is_some_and(|mainhand| !self.can_use_offhand(mainhand))
    }

    pub fn slot_accepts(&self, slot: EquipmentSlot, item: &EquipmentItem) -> bool {
        if !slot.accepts_type(item) {
            return false;
        }
        match slot.mainhand() {
            Some(mainhand) => {
                self.can_use_offhand(mainhand)
                    && (item.is_shield()
                        || (!item.is_two_handed()
                            && self.can_dual_wield(mainhand)
                            && self.dual_wield_filter(item)))
            }
            None => true,
        }
    }

    /// Items from `candidates` that `slot` accepts right now.
    pub fn slot_options(
        &self,
        slot: EquipmentSlot,
        candidates: &[Arc<EquipmentItem>],
    ) -> Vec<CharacterOption> {
        candidates
            .iter()
            .filter(|item| self.slot_accepts(slot, item))
            .map(|item| CharacterOption::equip(slot, item.clone()))
            .collect()
    }

    fn unequip_slot(&mut self, slot: EquipmentSlot) -> Option<TreeNode> {
        let index = self.root.children.iter().position(|child| {
            child
                .as_decision()
                .and_then(|decision| decision.equipped())
                .is_some_and(|(held, _)| held == slot)
        })?;
        Some(self.root.children.remove(index))
    }

    /// Put `item` in `slot`, replacing what was there. An off-hand item the
    /// new main-hand weapon no longer allows is taken off.
    pub fn equip_item(
        &self,
        slot: EquipmentSlot,
        item: Arc<EquipmentItem>,
    ) -> Result<Character, PlannerError> {
        let mut next = self.clone();
        next.unequip_slot(slot);

        if !next.slot_accepts(slot, &item) {
            return Err(DomainError::validation(format!("{} cannot go in {}", item.name, slot)).into());
        }

        let item = next.session.references().intern_item(item);
        let option = CharacterOption::equip(slot, item.clone()).with_grants(item.effects.clone());
        let mut node = TreeNode::from_option(&option, PlannerStep::EquipItem, None);
        node.grant_effects();
        next.root.add_child(node);

        if let Some(offhand) = slot.offhand() {
            let mainhand_held = next.can_dual_wield(slot);
            let usable = next.can_use_offhand(slot);
            if let Some(held) = next.equipped_in(offhand) {
                let keep = usable
                    && (held.is_shield() || (mainhand_held && next.dual_wield_filter(&held)));
                if !keep {
                    next.unequip_slot(offhand);
                    tracing::debug!(item = %held.name, slot = %offhand, "Off-hand item removed");
                }
            }
        }

        tracing::debug!(item = %item.name, slot = %slot, "Item equipped");
        Ok(next)
    }

    pub fn unequip_item(&self, slot: EquipmentSlot) -> Character {
        let mut next = self.clone();
        if let Some(removed) = next.unequip_slot(slot) {
            tracing::debug!(item = %removed.name, slot = %slot, "Item unequipped");
        }
        next
    }
}
