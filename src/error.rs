//! Error taxonomy for catalog loading and format lookups.
//!
//! Catalog problems are fatal and surface once, at load time. Lookup outcomes
//! are recoverable: `UnknownFormat` means nothing in the registry recognized
//! the input, `UnsupportedOperation` means something did but cannot perform
//! the requested operation. Ambiguity is not an error; see
//! `Resolution::is_ambiguous`.

use crate::catalog::{Capability, FormatCategory};
use thiserror::Error;

/// A malformed catalog entry, identified by category, index and field.
///
/// `category` and `index` are `None` when the problem sits at document level
/// (for example a missing `voxels` array).
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{}: {reason}", self.location())]
pub struct CatalogValidationError {
    pub category: Option<FormatCategory>,
    pub index: Option<usize>,
    pub field: String,
    pub reason: String,
}

impl CatalogValidationError {
    pub(crate) fn entry(
        category: FormatCategory,
        index: usize,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            category: Some(category),
            index: Some(index),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn document(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            category: None,
            index: None,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Dotted location such as `voxels[3].extensions[0]`.
    pub fn location(&self) -> String {
        let mut out = match (self.category, self.index) {
            (Some(category), Some(index)) => format!("{}[{index}]", category.section()),
            (Some(category), None) => category.section().to_string(),
            _ => String::new(),
        };
        if !self.field.is_empty() {
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(&self.field);
        }
        if out.is_empty() {
            out.push_str("catalog");
        }
        out
    }
}

/// Failure to turn catalog text into a registry.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid catalog entry at {0}")]
    Invalid(#[from] CatalogValidationError),
    #[error("catalog schema does not compile: {0}")]
    Schema(String),
}

/// Outcome of a lookup that did not yield a usable format.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum FormatError {
    #[error("unknown format: {filename}")]
    UnknownFormat { filename: String },
    #[error(
        "unsupported operation '{capability}' for {filename} (recognized as {})",
        .candidates.join(", ")
    )]
    UnsupportedOperation {
        filename: String,
        capability: Capability,
        candidates: Vec<String>,
    },
}

impl FormatError {
    pub fn is_unknown(&self) -> bool {
        matches!(self, FormatError::UnknownFormat { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, FormatError::UnsupportedOperation { .. })
    }
}
