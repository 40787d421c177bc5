//! Client billing: the payment schedule and invoices.

pub mod claims;
pub mod invoice;

#[cfg(test)]
mod billing_props;

pub use claims::{ClaimScheduler, NewClaimStage};
pub use invoice::{INVOICE_NUMBER_PREFIX, InvoiceService, NewInvoice, next_invoice_number};
