//! Application state: the loaded configuration and the selection state that
//! outlives individual snapshots.

use anyhow::{Context, Result};
use pv_core::config::ResolverConfig;
use pv_core::graph::ExecutionSnapshot;
use pv_core::selection::{ResolvedSelection, SelectionOverrides};
use pv_render::RenderDocument;
use pv_resolver::SelectionState;
use std::path::Path;

pub struct AppState {
    selection: SelectionState,
}

impl AppState {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            selection: SelectionState::new(config),
        }
    }

    /// Build state from an optional config file; without one the built-in
    /// tables apply.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                ResolverConfig::from_json_str(&text)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => ResolverConfig::default(),
        };
        Ok(Self::new(config))
    }

    pub fn resolve(
        &mut self,
        snapshot: &ExecutionSnapshot,
        overrides: &SelectionOverrides,
    ) -> ResolvedSelection {
        self.selection.recompute(snapshot, overrides).clone()
    }

    pub fn render(
        &mut self,
        snapshot: &ExecutionSnapshot,
        overrides: &SelectionOverrides,
    ) -> RenderDocument {
        let selection = self.resolve(snapshot, overrides);
        pv_render::render(snapshot, &selection, self.selection.config())
    }
}

pub fn load_snapshot(path: &Path) -> Result<ExecutionSnapshot> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    ExecutionSnapshot::from_json_str(&text)
        .with_context(|| format!("invalid snapshot {}", path.display()))
}
