//! Selection types: caller overrides in, resolved tuple out.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// NodeRef — composite key
// ---------------------------------------------------------------------------

/// Logical id plus the optional id of one concrete run. `id` selects the
/// template node, `execution_id` selects the run whose logs and status show.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub id: String,
    #[serde(default)]
    pub execution_id: Option<String>,
}

impl NodeRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            execution_id: None,
        }
    }

    pub fn with_execution_id(mut self, execution_id: impl Into<String>) -> Self {
        self.execution_id = Some(execution_id.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Overrides (query params from the UI)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionOverrides {
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub step: Option<String>,
    #[serde(default)]
    pub stage_exec_id: Option<String>,
    #[serde(default)]
    pub child_stage: Option<String>,
    #[serde(default)]
    pub collapsed_node: Option<String>,
}

impl SelectionOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// ---------------------------------------------------------------------------
// Resolved tuple
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedSelection {
    pub stage_id: Option<String>,
    pub step_id: Option<String>,
    pub stage_execution_id: Option<String>,
    pub child_stage_id: Option<String>,
    pub collapsed_node_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Per-field state machine
// ---------------------------------------------------------------------------

/// Lifecycle of one selection field. `UserPinned` holds as long as the
/// override is present; clearing it falls back to the auto value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum FieldState {
    #[default]
    Unset,
    AutoResolved(String),
    UserPinned(String),
}

impl FieldState {
    /// State for one pass: an override pins, otherwise the auto-resolved
    /// value fills in. Depends only on the pass's inputs, never on history.
    pub fn resolve(pinned: Option<&str>, auto: Option<&str>) -> FieldState {
        match (pinned, auto) {
            (Some(value), _) => FieldState::UserPinned(value.to_string()),
            (None, Some(value)) => FieldState::AutoResolved(value.to_string()),
            (None, None) => FieldState::Unset,
        }
    }

    /// Whether moving to `next` releases a user pin.
    pub fn releases_pin(&self, next: &FieldState) -> bool {
        self.is_pinned() && !next.is_pinned()
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            FieldState::Unset => None,
            FieldState::AutoResolved(value) | FieldState::UserPinned(value) => Some(value),
        }
    }

    pub fn is_pinned(&self) -> bool {
        matches!(self, FieldState::UserPinned(_))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
