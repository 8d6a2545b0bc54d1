//! JSON Schema gate for catalog documents.
//!
//! The schema is embedded at compile time and checked before any typed
//! deserialization, so structural problems (wrong types, unknown fields,
//! missing arrays) are reported against the exact catalog location instead of
//! as a serde message. Violations are mapped back to a
//! `CatalogValidationError` by decoding the instance path.

use crate::catalog::FormatCategory;
use crate::error::{CatalogError, CatalogValidationError};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::sync::OnceLock;

/// Bundled copy of `schema/format_catalog.schema.json`.
pub const CATALOG_SCHEMA: &str = include_str!("../schema/format_catalog.schema.json");

/// Compiled catalog schema.
pub(crate) struct CatalogSchema {
    compiled: JSONSchema,
}

impl CatalogSchema {
    /// The embedded schema, compiled on first use and shared afterwards.
    pub(crate) fn bundled() -> Result<&'static Self, CatalogError> {
        static BUNDLED: OnceLock<Result<CatalogSchema, String>> = OnceLock::new();
        BUNDLED
            .get_or_init(|| {
                let raw: Value =
                    serde_json::from_str(CATALOG_SCHEMA).map_err(|err| err.to_string())?;
                Self::compile(&raw)
            })
            .as_ref()
            .map_err(|reason| CatalogError::Schema(reason.clone()))
    }

    pub(crate) fn compile(raw: &Value) -> Result<Self, String> {
        let compiled = JSONSchema::compile(raw).map_err(|err| err.to_string())?;
        Ok(Self { compiled })
    }

    /// Validate a parsed catalog.
    ///
    /// Every violation is logged; the first (in validator order) is returned.
    pub(crate) fn validate(&self, catalog: &Value) -> Result<(), CatalogValidationError> {
        let violations: Vec<(String, String)> = match self.compiled.validate(catalog) {
            Ok(()) => return Ok(()),
            Err(errors) => errors
                .map(|err| (err.instance_path.to_string(), err.to_string()))
                .collect(),
        };
        for (pointer, message) in &violations {
            tracing::warn!(pointer = %pointer, %message, "catalog schema violation");
        }
        let (pointer, message) = violations
            .into_iter()
            .next()
            .unwrap_or_else(|| (String::new(), "schema validation failed".to_string()));
        Err(violation_location(&pointer, message))
    }
}

/// Map a JSON pointer such as `/voxels/3/magics/0/value` to a located error.
fn violation_location(pointer: &str, reason: String) -> CatalogValidationError {
    let mut segments = pointer.split('/').skip(1);
    let Some(section) = segments.next() else {
        return CatalogValidationError::document("", reason);
    };
    let Some(category) = FormatCategory::parse(section).filter(|c| c.section() == section) else {
        return CatalogValidationError::document(section, reason);
    };
    let Some(index) = segments.next().and_then(|raw| raw.parse::<usize>().ok()) else {
        return CatalogValidationError {
            category: Some(category),
            index: None,
            field: String::new(),
            reason,
        };
    };
    let mut field = String::new();
    for segment in segments {
        if segment.parse::<usize>().is_ok() {
            field.push_str(&format!("[{segment}]"));
        } else {
            if !field.is_empty() {
                field.push('.');
            }
            field.push_str(segment);
        }
    }
    CatalogValidationError::entry(category, index, field, reason)
}
