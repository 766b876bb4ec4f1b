//! Conversion and catalog errors.

use serde::{Deserialize, Serialize};

/// Failure surfaced by the dispatcher. Rate fetch failures never show up here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown unit '{unit}' in category '{category}'")]
    UnknownUnit { category: String, unit: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionErrorKind {
    InvalidValue,
    UnknownCategory,
    UnknownUnit,
}

impl ConversionError {
    pub fn kind(&self) -> ConversionErrorKind {
        match self {
            ConversionError::InvalidValue(_) => ConversionErrorKind::InvalidValue,
            ConversionError::UnknownCategory(_) => ConversionErrorKind::UnknownCategory,
            ConversionError::UnknownUnit { .. } => ConversionErrorKind::UnknownUnit,
        }
    }

    pub(crate) fn unknown_unit(category: &str, unit: &str) -> Self {
        ConversionError::UnknownUnit {
            category: category.to_string(),
            unit: unit.to_string(),
        }
    }
}

/// Violations of the catalog invariants, reported when a catalog is built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("category '{0}' has no units")]
    EmptyCategory(String),

    #[error("duplicate category key '{0}'")]
    DuplicateCategory(String),

    #[error("duplicate unit key '{unit}' in category '{category}'")]
    DuplicateUnit { category: String, unit: String },

    #[error("unit '{unit}' in category '{category}' has invalid factor {factor}")]
    InvalidFactor {
        category: String,
        unit: String,
        factor: f64,
    },

    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

/// Failure to assemble a [`crate::ConversionEngine`] from configuration.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("rate transport: {0}")]
    Transport(#[from] crate::traits::FetchError),
}
