//! Long-term concept memory.
//!
//! Understanding fragments are stored as named concepts and linked by
//! relation labels into a graph that can be walked while dreaming or
//! narrating.
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 ConceptGraph                     │
//! │                                                  │
//! │  ┌──────────────┐        ┌────────────────────┐  │
//! │  │ index        │ ─────▶ │ nodes              │  │
//! │  │ (name → id)  │        │ (id → ConceptNode) │  │
//! │  └──────────────┘        └────────────────────┘  │
//! │                                 │ links          │
//! │                                 ▼ (relation → [id])
//! └──────────────────────────────────────────────────┘
//! ```

mod graph;
mod node;

pub use graph::ConceptGraph;
pub use node::{ConceptNode, RelationLinks, DEFAULT_RELATION};
