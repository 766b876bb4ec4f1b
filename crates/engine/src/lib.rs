//! Engine crate – unit catalog, rate cache and conversion dispatcher.
//!
//! Everything a front end needs to convert values lives here, behind an
//! explicitly constructed [`ConversionEngine`]. Network access and time are
//! injected through the traits in [`traits`], so the CLI, the socket daemon
//! and tests all drive the same code.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod platform;
pub mod rates;
pub mod scenario;
pub mod traits;
pub mod types;
mod units;

// Re-exports for convenience
pub use catalog::{Catalog, Category, CategorySummary, Strategy, UnitDefinition};
pub use commands::CommandRegistry;
pub use config::EngineConfig;
pub use convert::{format_result, RawValue};
pub use engine::ConversionEngine;
pub use error::{CatalogError, ConversionError, EngineError};
pub use rates::{RateCache, RateKind, RateSource, RateTable};
pub use types::{CommandResult, ConversionRequest, ErrorCode, ErrorInfo, Status};
