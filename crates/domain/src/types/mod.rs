//! # Charplan Domain Types
//!
//! Shared vocabulary for the build tree and the engine:
//!
//! 1. **Planner steps** - the kind of question a decision answers
//! 2. **Reference handles** - compact `{tag, id}` stand-ins for catalog entities
//!
//! All types here are plain data and derive Serialize/Deserialize.

mod planner_step;
pub use planner_step::PlannerStep;

mod reference;
pub use reference::{ReferenceHandle, ReferenceTag, Referenceable};
