//! pv-render: Turn an execution snapshot plus a resolved selection into
//! display trees.

pub mod export;
pub mod stages;
pub mod steps;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use export::{export_json, render, RenderDocument};
pub use stages::{materialize_stages, StageCard, StageItem, StageTree};
pub use steps::{materialize_steps, StepCard, StepItem, StepTree};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("export error: {0}")]
    Export(String),
}

/// Wall-clock duration of a finished node. Clock skew never yields a
/// negative value.
pub(crate) fn duration_ms(
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
) -> Option<i64> {
    match (started_at, ended_at) {
        (Some(start), Some(end)) => Some((end - start).num_milliseconds().max(0)),
        _ => None,
    }
}
