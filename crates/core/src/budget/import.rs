//! Quote-to-budget import.
//!
//! The `import_*` functions are pure and not idempotent: calling one twice yields two
//! sets of lines. `BudgetImporter::apply` is the only write and refuses to run twice.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use siteledger_shared::types::BudgetLineId;
use tracing::{debug, info};

use crate::calc::CalcEngine;
use crate::error::EngineError;
use crate::project::{BudgetLine, BudgetSource, Project, QuoteSection};

/// How finely quote scope is broken into budget lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportGranularity {
    /// One line per scope category.
    #[default]
    Section,
    /// One line per enabled scope item.
    Item,
}

/// Stateless quote-to-budget importer.
pub struct BudgetImporter;

impl BudgetImporter {
    /// Captures every category with at least one enabled item.
    #[must_use]
    pub fn snapshot_from_quote(project: &Project) -> Vec<QuoteSection> {
        CalcEngine::category_subtotals(&project.scope)
            .into_iter()
            .map(|(section_name, total)| QuoteSection {
                items: project
                    .scope
                    .iter()
                    .filter(|item| item.enabled && item.category == section_name)
                    .cloned()
                    .collect(),
                section_name,
                total,
            })
            .collect()
    }

    /// Builds one budget line per category from enabled items.
    ///
    /// Categories whose subtotal is zero or negative are dropped.
    #[must_use]
    pub fn import_section_level(project: &Project) -> Vec<BudgetLine> {
        CalcEngine::category_subtotals(&project.scope)
            .into_iter()
            .filter(|(_, total)| *total > Decimal::ZERO)
            .map(|(category, total)| imported_line(category.clone(), Some(category), total))
            .collect()
    }

    /// Builds one budget line per enabled item.
    ///
    /// Items whose line total is zero or negative are dropped.
    #[must_use]
    pub fn import_item_level(project: &Project) -> Vec<BudgetLine> {
        project
            .scope
            .iter()
            .filter(|item| item.enabled && item.line_total() > Decimal::ZERO)
            .map(|item| {
                imported_line(
                    format!("{}: {}", item.category, item.description),
                    Some(item.category.clone()),
                    item.line_total(),
                )
            })
            .collect()
    }

    /// Builds lines at the requested granularity.
    #[must_use]
    pub fn lines_for(project: &Project, granularity: ImportGranularity) -> Vec<BudgetLine> {
        match granularity {
            ImportGranularity::Section => Self::import_section_level(project),
            ImportGranularity::Item => Self::import_item_level(project),
        }
    }

    /// Returns true if quote scope has already been imported into this job.
    #[must_use]
    pub fn already_imported(project: &Project) -> bool {
        project.job.as_ref().is_some_and(|job| {
            job.budget_imported_at.is_some()
                || job
                    .budget
                    .iter()
                    .any(|line| line.source == BudgetSource::QuoteImport)
        })
    }

    /// Appends imported lines to the job budget and stamps the import.
    ///
    /// A project that was already imported, or whose scope yields no lines, comes back
    /// unchanged and unstamped.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::JobNotStarted` if the project is still a quote.
    pub fn apply(project: &Project, granularity: ImportGranularity) -> Result<Project, EngineError> {
        project.job()?;
        if Self::already_imported(project) {
            debug!(project_id = %project.id, "budget already imported");
            return Ok(project.clone());
        }

        let mut next = project.clone();
        if Self::import_into(&mut next, granularity)? == 0 {
            debug!(project_id = %project.id, "quote scope yields no budget lines");
            return Ok(project.clone());
        }
        next.touch();
        Ok(next)
    }

    /// Imports into a snapshot that is already being written.
    ///
    /// Returns the number of lines added. The import is only stamped when at least one
    /// line was added.
    pub(crate) fn import_into(
        project: &mut Project,
        granularity: ImportGranularity,
    ) -> Result<usize, EngineError> {
        let lines = Self::lines_for(project, granularity);
        let project_id = project.id;
        let job = project.job_mut()?;
        if lines.is_empty() {
            return Ok(0);
        }

        info!(
            %project_id,
            ?granularity,
            lines = lines.len(),
            "importing quote scope into budget"
        );
        let added = lines.len();
        job.budget.extend(lines);
        job.budget_imported_at = Some(Utc::now());
        Ok(added)
    }
}

fn imported_line(label: String, category: Option<String>, amount: Decimal) -> BudgetLine {
    BudgetLine {
        id: BudgetLineId::new(),
        label,
        category,
        budget_amount: amount,
        source: BudgetSource::QuoteImport,
        linked_variation_id: None,
        created_at: Utc::now(),
    }
}
