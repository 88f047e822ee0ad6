//! pv-core: Shared types for Pipeline View
//!
//! This crate has zero internal crate dependencies and defines the
//! canonical execution-snapshot model consumed by the resolver and the
//! render crates.

pub mod config;
pub mod graph;
pub mod selection;
pub mod status;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::config::ResolverConfig;
    pub use crate::graph::{
        AdjacencyEntry, ExecutionSnapshot, StageGraph, StageNode, StepGraph, StepNode,
    };
    pub use crate::selection::{FieldState, NodeRef, ResolvedSelection, SelectionOverrides};
    pub use crate::status::{ExecutionStatus, StatusClass, StatusRules};
    pub use crate::CoreError;
}
