//! Job costs: commitments, supplier bills, actuals and their reconciliation.

pub mod actual;
pub mod bill;
pub mod commitment;
pub mod reconciliation;

#[cfg(test)]
mod reconciliation_props;

pub use actual::{ActualService, NewActual};
pub use bill::{BillService, NewBill, NewBillLine};
pub use commitment::{CommitmentService, NewCommitment};
pub use reconciliation::{CommitmentExposure, Reconciliation, commitment_remaining};
