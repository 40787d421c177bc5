//! Project lifecycle: the stage machine, quote-to-job conversion and the module whitelist.

pub mod service;
pub mod stage;

#[cfg(test)]
mod service_props;

pub use service::{ConversionOptions, LifecycleService};
pub use stage::{JOB_MODULES, Module, QUOTE_MODULES, Stage, allowed_modules};
