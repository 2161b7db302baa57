//! Tree serializer.
//!
//! Export strings are `cp1.` followed by URL-safe base64 (no padding) of a
//! compact JSON encoding of the tree. Every node carries a one-letter kind tag
//! and every catalog entity is written as a `{t, i}` handle instead of its
//! data. A string is only guaranteed to inflate on the version that wrote it;
//! the prefix is there so a later format can be told apart.

use std::collections::HashMap;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use charplan_domain::{
    DecisionId, DecisionNode, DecisionPayload, EffectNode, EquipmentSlot, GrantableEffect,
    NodeKind, PlannerStep, ReferenceHandle, ReferenceTag, Referenceable, TreeNode,
};
use serde::{Deserialize, Serialize};

use super::ports::{CatalogError, CatalogPort};
use super::references::{ReferenceRegistry, ResolvedEntity};

pub const EXPORT_PREFIX: &str = "cp1.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializerError {
    /// Input is not a string this version can read.
    #[error("Corrupt import: {0}")]
    CorruptImport(String),

    /// Round-trip self-check produced a different tree.
    #[error("Serializer self-check failed: {0}")]
    Corruption(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl SerializerError {
    fn corrupt(message: impl ToString) -> Self {
        Self::CorruptImport(message.to_string())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "k")]
enum WireNode {
    #[serde(rename = "r")]
    Root {
        #[serde(rename = "c", default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<WireNode>,
    },
    #[serde(rename = "d")]
    Decision {
        #[serde(rename = "n")]
        name: String,
        #[serde(rename = "s")]
        step: PlannerStep,
        #[serde(rename = "i", default, skip_serializing_if = "Option::is_none")]
        choice_id: Option<DecisionId>,
        #[serde(rename = "l", default, skip_serializing_if = "Option::is_none")]
        level: Option<u8>,
        #[serde(rename = "o", default, skip_serializing_if = "Option::is_none")]
        owner_class: Option<String>,
        #[serde(rename = "d", default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(rename = "m", default, skip_serializing_if = "Option::is_none")]
        image: Option<String>,
        #[serde(rename = "p", default, skip_serializing_if = "Option::is_none")]
        payload: Option<WirePayload>,
        #[serde(rename = "c", default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<WireNode>,
    },
    #[serde(rename = "e")]
    Effect {
        /// Catalog-backed effect
        #[serde(rename = "h", default, skip_serializing_if = "Option::is_none")]
        handle: Option<ReferenceHandle>,
        /// Effect with no catalog id, written out in full
        #[serde(rename = "v", default, skip_serializing_if = "Option::is_none")]
        inline: Option<GrantableEffect>,
        #[serde(rename = "c", default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<WireNode>,
    },
}

#[derive(Debug, Serialize, Deserialize)]
enum WirePayload {
    #[serde(rename = "sp")]
    Spell(ReferenceHandle),
    #[serde(rename = "eq")]
    Equipped {
        #[serde(rename = "s")]
        slot: EquipmentSlot,
        #[serde(rename = "h")]
        item: ReferenceHandle,
    },
}

impl WireNode {
    fn children(&self) -> &[WireNode] {
        match self {
            WireNode::Root { children }
            | WireNode::Decision { children, .. }
            | WireNode::Effect { children, .. } => children,
        }
    }

    fn collect_handles(&self, out: &mut Vec<ReferenceHandle>) {
        match self {
            WireNode::Decision {
                payload: Some(WirePayload::Spell(handle)),
                ..
            }
            | WireNode::Decision {
                payload: Some(WirePayload::Equipped { item: handle, .. }),
                ..
            }
            | WireNode::Effect {
                handle: Some(handle),
                ..
            } => {
                if !out.contains(handle) {
                    out.push(*handle);
                }
            }
            _ => {}
        }
        for child in self.children() {
            child.collect_handles(out);
        }
    }
}

/// Converts build trees to and from export strings.
#[derive(Clone)]
pub struct TreeSerializer {
    catalog: Arc<dyn CatalogPort>,
    references: Arc<ReferenceRegistry>,
}

impl TreeSerializer {
    pub fn new(catalog: Arc<dyn CatalogPort>, references: Arc<ReferenceRegistry>) -> Self {
        Self {
            catalog,
            references,
        }
    }

    /// Encode a tree. With `validate` the result is inflated again and must
    /// reproduce the tree exactly.
    pub async fn deflate(&self, root: &TreeNode, validate: bool) -> Result<String, SerializerError> {
        let wire = self.to_wire(root);
        let json = serde_json::to_vec(&wire)
            .map_err(|e| SerializerError::Corruption(format!("encode failed: {}", e)))?;
        let encoded = format!("{}{}", EXPORT_PREFIX, URL_SAFE_NO_PAD.encode(json));

        tracing::debug!(nodes = root.count(), bytes = encoded.len(), "Deflated build tree");

        if validate {
            let inflated = self.inflate(&encoded).await.map_err(|e| match e {
                SerializerError::Catalog(err) => SerializerError::Catalog(err),
                other => SerializerError::Corruption(other.to_string()),
            })?;
            if !inflated.structurally_eq(root) {
                return Err(SerializerError::Corruption(format!(
                    "round trip produced a different tree ({} nodes, expected {})",
                    inflated.count(),
                    root.count()
                )));
            }
        }

        Ok(encoded)
    }

    /// Decode an export string, resolving handles through the registry and
    /// the catalog.
    pub async fn inflate(&self, encoded: &str) -> Result<TreeNode, SerializerError> {
        let body = encoded
            .trim()
            .strip_prefix(EXPORT_PREFIX)
            .ok_or_else(|| SerializerError::corrupt("missing format prefix"))?;
        let json = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|e| SerializerError::corrupt(format!("invalid base64: {}", e)))?;
        let wire: WireNode = serde_json::from_slice(&json)
            .map_err(|e| SerializerError::corrupt(format!("invalid tree encoding: {}", e)))?;

        if !matches!(wire, WireNode::Root { .. }) {
            return Err(SerializerError::corrupt("top-level node is not a root"));
        }

        let mut handles = Vec::new();
        wire.collect_handles(&mut handles);

        let mut resolved = HashMap::with_capacity(handles.len());
        for handle in handles {
            let entity = self
                .references
                .resolve(handle, self.catalog.as_ref())
                .await
                .map_err(|e| match e {
                    CatalogError::NotFound { .. } => {
                        SerializerError::corrupt(format!("unknown reference {}", handle))
                    }
                    other => SerializerError::Catalog(other),
                })?;
            resolved.insert(handle, entity);
        }

        let root = Self::from_wire(wire, &resolved, true)?;
        tracing::debug!(nodes = root.count(), references = resolved.len(), "Inflated build tree");
        Ok(root)
    }

    fn to_wire(&self, node: &TreeNode) -> WireNode {
        let children = node.children.iter().map(|child| self.to_wire(child)).collect();

        match &node.kind {
            NodeKind::Root => WireNode::Root { children },
            NodeKind::Decision(decision) => {
                let payload = match &decision.payload {
                    DecisionPayload::Plain => None,
                    DecisionPayload::Spell(spell) => {
                        let spell = self.references.intern_spell(spell.clone());
                        spell.reference().map(WirePayload::Spell)
                    }
                    DecisionPayload::EquippedItem { slot, item } => {
                        let item = self.references.intern_item(item.clone());
                        item.reference().map(|handle| WirePayload::Equipped {
                            slot: *slot,
                            item: handle,
                        })
                    }
                };
                WireNode::Decision {
                    name: node.name.clone(),
                    step: decision.step,
                    choice_id: decision.choice_id,
                    level: decision.level,
                    owner_class: decision.owner_class.clone(),
                    description: decision.description.clone(),
                    image: decision.image.clone(),
                    payload,
                    children,
                }
            }
            NodeKind::Effect(effect) => match self.references.intern_effect(&effect.effect) {
                Some(handle) => WireNode::Effect {
                    handle: Some(handle),
                    inline: None,
                    children,
                },
                None => WireNode::Effect {
                    handle: None,
                    inline: Some(effect.effect.clone()),
                    children,
                },
            },
        }
    }

    fn from_wire(
        wire: WireNode,
        resolved: &HashMap<ReferenceHandle, ResolvedEntity>,
        top: bool,
    ) -> Result<TreeNode, SerializerError> {
        let lookup = |handle: &ReferenceHandle| {
            resolved
                .get(handle)
                .ok_or_else(|| SerializerError::corrupt(format!("unresolved reference {}", handle)))
        };

        let (mut node, children) = match wire {
            WireNode::Root { children } => {
                if !top {
                    return Err(SerializerError::corrupt("nested root node"));
                }
                (TreeNode::root(), children)
            }
            WireNode::Decision {
                name,
                step,
                choice_id,
                level,
                owner_class,
                description,
                image,
                payload,
                children,
            } => {
                let payload = match payload {
                    None => DecisionPayload::Plain,
                    Some(WirePayload::Spell(handle)) => match lookup(&handle)? {
                        ResolvedEntity::Spell(spell) if handle.tag == ReferenceTag::Spell => {
                            DecisionPayload::Spell(spell.clone())
                        }
                        _ => return Err(SerializerError::corrupt(format!("{} is not a spell", handle))),
                    },
                    Some(WirePayload::Equipped { slot, item: handle }) => match lookup(&handle)? {
                        ResolvedEntity::Item(item) if handle.tag == ReferenceTag::Item => {
                            DecisionPayload::EquippedItem {
                                slot,
                                item: item.clone(),
                            }
                        }
                        _ => return Err(SerializerError::corrupt(format!("{} is not an item", handle))),
                    },
                };
                let decision = DecisionNode {
                    step,
                    choice_id,
                    level,
                    owner_class,
                    description,
                    image,
                    grants: Vec::new(),
                    payload,
                };
                (TreeNode::decision(name, decision), children)
            }
            WireNode::Effect {
                handle,
                inline,
                children,
            } => {
                let effect = match (handle, inline) {
                    (Some(handle), None) => match lookup(&handle)? {
                        ResolvedEntity::Effect(effect) => effect.as_ref().clone(),
                        _ => return Err(SerializerError::corrupt(format!("{} is not an effect", handle))),
                    },
                    (None, Some(effect)) => effect,
                    _ => return Err(SerializerError::corrupt("effect must be either a handle or inline")),
                };
                (
                    TreeNode::with_kind(effect.name.clone(), NodeKind::Effect(EffectNode { effect })),
                    children,
                )
            }
        };

        for child in children {
            node.add_child(Self::from_wire(child, resolved, false)?);
        }
        Ok(node)
    }
}
