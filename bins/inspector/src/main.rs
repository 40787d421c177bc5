//! SiteLedger inspector
//!
//! Loads a project snapshot from a JSON file, normalises it and prints the
//! project's financial report as JSON.
//!
//! Usage: `siteledger <snapshot.json>`

use anyhow::Context;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use siteledger_core::billing::ClaimScheduler;
use siteledger_core::costs::{CommitmentExposure, Reconciliation};
use siteledger_core::lifecycle::Module;
use siteledger_core::project::{ActivityEntry, ClaimStage};
use siteledger_core::{Aggregates, CalcCache, Project, Stage, allowed_modules};
use siteledger_shared::{AppConfig, AppError, AppResult};
use siteledger_shared::types::ProjectId;

#[derive(Serialize)]
struct ClaimLine {
    #[serde(flatten)]
    stage: ClaimStage,
    resolved_amount: Decimal,
}

#[derive(Serialize)]
struct Report<'a> {
    project_id: ProjectId,
    name: &'a str,
    stage: Stage,
    revision: u64,
    allowed_modules: &'static [Module],
    aggregates: &'a Aggregates,
    commitments: Vec<CommitmentExposure>,
    payment_schedule: Vec<ClaimLine>,
    activity: &'a [ActivityEntry],
}

/// Reads and normalises a project snapshot.
fn load_snapshot(path: &str) -> AppResult<Project> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| AppError::Snapshot(format!("failed to read {path}: {err}")))?;
    let project: Project = serde_json::from_str(&raw)?;
    Ok(project.normalise())
}

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()
        .map_err(AppError::from)
        .context("failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: siteledger <snapshot.json>")?;
    let project = load_snapshot(&path)?;
    info!(project_id = %project.id, stage = %project.stage, revision = project.revision, "snapshot loaded");

    let cache = CalcCache::from_config(&config.cache);
    let aggregates = cache.calc(&project);

    let report = Report {
        project_id: project.id,
        name: &project.name,
        stage: project.stage,
        revision: project.revision,
        allowed_modules: allowed_modules(project.stage),
        aggregates: &aggregates,
        commitments: Reconciliation::exposure(&project),
        payment_schedule: ClaimScheduler::schedule(&project)
            .into_iter()
            .map(|(stage, resolved_amount)| ClaimLine {
                stage,
                resolved_amount,
            })
            .collect(),
        activity: &project.activity,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
