//! pv-resolver: Active-node resolution engine for execution snapshots.
//!
//! Pipeline: traversal -> stage/step resolvers -> reconciler -> selection state.
//! Everything here is synchronous and total over its input; there is no error
//! type because nothing can fail.

pub mod active;
pub mod expansion;
pub mod reconcile;
pub mod state;
pub mod traversal;

#[cfg(test)]
mod fixtures;

pub use active::{resolve_active_stage, resolve_active_step, ActiveStage};
pub use expansion::{expand_siblings, expand_step_siblings};
pub use reconcile::reconcile;
pub use state::{SelectionFields, SelectionState};
pub use traversal::{post_order, pre_order, GraphView, Visit};
