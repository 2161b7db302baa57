//! The build tree
//!
//! A strict ownership tree: every node owns its children and no node stores
//! a pointer to its parent. Parents are found by searching from the root,
//! which keeps `Clone` a plain deep copy.
//!
//! Traversal is depth-first pre-order with children in insertion order. The
//! engine relies on that order to pick "the nearest eligible parent" and "the
//! first unresolved class slot", so every search here goes through `PreOrder`.

mod iter;
mod node;

pub use iter::PreOrder;
pub use node::{DecisionNode, DecisionPayload, EffectNode, NodeKind, NodeType, TreeNode};
