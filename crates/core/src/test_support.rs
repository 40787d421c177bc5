//! Fixtures shared by unit and property tests.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use siteledger_shared::ProjectDefaults;

use crate::lifecycle::{ConversionOptions, LifecycleService};
use crate::project::{NewScopeItem, Project, ProjectService};

pub(crate) fn scope_item(category: &str, description: &str, rate: Decimal, qty: Decimal) -> NewScopeItem {
    NewScopeItem {
        category: category.to_string(),
        description: description.to_string(),
        unit: "ea".to_string(),
        rate,
        qty,
    }
}

/// A quote whose subtotal is exactly `subtotal` (18% margin, 5% contingency).
pub(crate) fn quote_with_subtotal(subtotal: Decimal) -> Project {
    let project = Project::new("Fixture", &ProjectDefaults::default());
    ProjectService::add_scope_item(&project, scope_item("Build", "Lump sum", subtotal, dec!(1)))
        .unwrap()
}

/// An approved job built from `quote_with_subtotal`, with no budget import.
pub(crate) fn job_with_subtotal(subtotal: Decimal) -> Project {
    LifecycleService::convert_to_job(&quote_with_subtotal(subtotal), ConversionOptions::default())
        .unwrap()
}

/// An approved job whose original contract value is $135,300.
pub(crate) fn job() -> Project {
    job_with_subtotal(dec!(100000))
}
