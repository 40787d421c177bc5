//! Scope and commercial-terms edits.

use rust_decimal::Decimal;
use siteledger_shared::types::ScopeItemId;
use tracing::debug;

use super::entities::ScopeItem;
use super::types::Project;
use crate::error::EngineError;

/// Input for adding a scope item.
#[derive(Debug, Clone)]
pub struct NewScopeItem {
    /// Section the item is grouped under.
    pub category: String,
    /// Item description.
    pub description: String,
    /// Unit of measure.
    pub unit: String,
    /// Rate per unit.
    pub rate: Decimal,
    /// Quantity.
    pub qty: Decimal,
}

/// Stateless service for quote scope and markup edits.
pub struct ProjectService;

impl ProjectService {
    /// Adds an enabled scope item.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` if the category or description is blank, or
    /// the rate or quantity is negative.
    pub fn add_scope_item(project: &Project, input: NewScopeItem) -> Result<Project, EngineError> {
        if input.category.trim().is_empty() {
            return Err(EngineError::Validation("category is required".into()));
        }
        if input.description.trim().is_empty() {
            return Err(EngineError::Validation("description is required".into()));
        }
        if input.rate.is_sign_negative() || input.qty.is_sign_negative() {
            return Err(EngineError::Validation(
                "rate and quantity cannot be negative".into(),
            ));
        }

        let mut next = project.clone();
        next.scope.push(ScopeItem {
            id: ScopeItemId::new(),
            category: input.category.trim().to_string(),
            description: input.description.trim().to_string(),
            unit: input.unit,
            rate: input.rate,
            qty: input.qty,
            enabled: true,
            actual_cost: None,
        });
        next.touch();
        Ok(next)
    }

    /// Includes or excludes a scope item from the subtotal.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if the item does not exist.
    pub fn set_scope_item_enabled(
        project: &Project,
        item_id: ScopeItemId,
        enabled: bool,
    ) -> Result<Project, EngineError> {
        let index = project
            .scope
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| EngineError::not_found("Scope item", item_id))?;

        if project.scope[index].enabled == enabled {
            debug!(%item_id, enabled, "scope item already in requested state");
            return Ok(project.clone());
        }

        let mut next = project.clone();
        next.scope[index].enabled = enabled;
        next.touch();
        Ok(next)
    }

    /// Sets the margin and contingency percentages.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` if either percentage is negative.
    pub fn set_markup(
        project: &Project,
        margin_pct: Decimal,
        contingency_pct: Decimal,
    ) -> Result<Project, EngineError> {
        if margin_pct.is_sign_negative() || contingency_pct.is_sign_negative() {
            return Err(EngineError::Validation(
                "margin and contingency cannot be negative".into(),
            ));
        }

        let mut next = project.clone();
        next.margin_pct = margin_pct;
        next.contingency_pct = contingency_pct;
        next.touch();
        Ok(next)
    }

    /// Sets the informational retention percentage.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` unless the percentage is within 0..=100.
    pub fn set_retention_percent(
        project: &Project,
        retention_percent: Decimal,
    ) -> Result<Project, EngineError> {
        if retention_percent.is_sign_negative() || retention_percent > Decimal::ONE_HUNDRED {
            return Err(EngineError::Validation(
                "retention must be between 0 and 100 percent".into(),
            ));
        }

        let mut next = project.clone();
        next.retention_percent = retention_percent;
        next.touch();
        Ok(next)
    }
}
