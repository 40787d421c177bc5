//! Stage transitions and quote-to-job conversion.

use chrono::Utc;
use tracing::{debug, info};

use super::stage::Stage;
use crate::budget::{BudgetImporter, ImportGranularity};
use crate::error::EngineError;
use crate::project::{JobRecords, Project};

/// Options for `LifecycleService::convert_to_job`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Stage to land on; `Approved` when unset.
    pub target_stage: Option<Stage>,
    /// Import quote scope into the budget at this granularity.
    pub budget_import: Option<ImportGranularity>,
}

/// Stateless service for the project lifecycle.
pub struct LifecycleService;

impl LifecycleService {
    /// Moves the project to `to` if it is the single legal successor.
    ///
    /// Any other target leaves the snapshot unchanged. Entering the first job stage
    /// creates the job records if they do not exist yet.
    #[must_use]
    pub fn transition_stage(project: &Project, to: Stage) -> Project {
        if !project.stage.can_transition_to(to) {
            debug!(
                project_id = %project.id,
                from = %project.stage,
                %to,
                "ignoring illegal stage transition"
            );
            return project.clone();
        }

        let mut next = project.clone();
        let from = next.stage;
        next.stage = to;
        if to.is_job() {
            ensure_job_records(&mut next);
        }
        next.record_activity(format!("Stage changed from {from} to {to}"));
        next.touch();

        info!(project_id = %next.id, %from, %to, "stage transitioned");
        next
    }

    /// Converts a quote into a job.
    ///
    /// Sets the stage to the target (default `Approved`), ensures the job records exist
    /// without touching existing data, and imports the quote into the budget when
    /// requested, not done before and the scope yields at least one line. A project that is already a job keeps its stage.
    ///
    /// # Errors
    ///
    /// Propagates errors from the budget import.
    pub fn convert_to_job(
        project: &Project,
        options: ConversionOptions,
    ) -> Result<Project, EngineError> {
        let target = options.target_stage.unwrap_or(Stage::Approved);
        if !target.is_job() {
            debug!(project_id = %project.id, %target, "conversion target is not a job stage");
            return Ok(project.clone());
        }

        let needs_records = project.job.is_none();
        let needs_stage = project.stage.is_quote();
        let needs_import = options.budget_import.is_some_and(|granularity| {
            !BudgetImporter::already_imported(project)
                && !BudgetImporter::lines_for(project, granularity).is_empty()
        });

        if !needs_records && !needs_stage && !needs_import {
            debug!(project_id = %project.id, "project already converted");
            return Ok(project.clone());
        }

        let mut next = project.clone();
        if needs_stage {
            next.stage = target;
        }
        ensure_job_records(&mut next);
        let mut imported = 0;
        if let Some(granularity) = options.budget_import.filter(|_| needs_import) {
            imported = BudgetImporter::import_into(&mut next, granularity)?;
        }
        next.record_activity(format!("Converted to job ({})", next.stage));
        next.touch();

        info!(
            project_id = %next.id,
            stage = %next.stage,
            imported,
            "project converted to job"
        );
        Ok(next)
    }
}

/// Creates job records with the quote snapshot if they are missing.
fn ensure_job_records(project: &mut Project) {
    if project.job.is_some() {
        return;
    }

    project.job = Some(JobRecords {
        converted_at: Some(Utc::now()),
        quote_snapshot: BudgetImporter::snapshot_from_quote(project),
        ..JobRecords::default()
    });
}
