//! Shared types, errors, and configuration for SiteLedger.
//!
//! This crate provides common types used across all other crates:
//! - Money helpers with decimal precision and the fixed GST rate
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, CacheConfig, GuardPolicy, LoggingConfig, ProjectDefaults};
pub use error::{AppError, AppResult};
