//! pipeline-view: print the resolved selection (or the full render document)
//! for one execution snapshot.

mod state;

use anyhow::{Context, Result};
use clap::Parser;
use pv_core::selection::SelectionOverrides;
use state::{load_snapshot, AppState};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pipeline-view")]
#[command(about = "Resolve which stage and step of a pipeline execution to show")]
struct Cli {
    /// Execution snapshot (JSON).
    snapshot: PathBuf,

    /// Resolver configuration (JSON).
    #[arg(long, env = "PIPELINE_VIEW_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long)]
    stage: Option<String>,
    #[arg(long)]
    step: Option<String>,
    #[arg(long = "stage-exec-id")]
    stage_exec_id: Option<String>,
    #[arg(long = "child-stage")]
    child_stage: Option<String>,
    #[arg(long = "collapsed-node")]
    collapsed_node: Option<String>,

    /// Print the materialized stage and step trees, not just the selection.
    #[arg(long)]
    render: bool,
}

impl Cli {
    fn overrides(&self) -> SelectionOverrides {
        SelectionOverrides {
            stage: self.stage.clone(),
            step: self.step.clone(),
            stage_exec_id: self.stage_exec_id.clone(),
            child_stage: self.child_stage.clone(),
            collapsed_node: self.collapsed_node.clone(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut app = AppState::load(cli.config.as_deref())?;
    let snapshot = load_snapshot(&cli.snapshot)?;
    let overrides = cli.overrides();

    let output = if cli.render {
        let document = app.render(&snapshot, &overrides);
        pv_render::export_json(&document).context("failed to export render document")?
    } else {
        let selection = app.resolve(&snapshot, &overrides);
        serde_json::to_string_pretty(&selection).context("failed to serialize selection")?
    };

    tracing::debug!(snapshot = %cli.snapshot.display(), render = cli.render, "done");
    println!("{output}");
    Ok(())
}
