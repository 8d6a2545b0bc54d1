//! Format catalog wiring.
//!
//! This module wraps the JSON catalog under `schema/formats.json` so callers
//! can load a validated snapshot and look formats up by extension. Types in
//! `model` mirror the schema fields; callers use `Registry` for validated
//! lookups and `ExtensionIndex` when they only need suffix resolution.

pub mod descriptor;
pub mod extensions;
pub mod identity;
pub mod index;
pub mod model;

pub use descriptor::{DescriptorFlags, FormatDescriptor};
pub use extensions::{ExtensionIndex, normalize_extension};
pub use identity::{Capability, FormatCategory, FormatId};
pub use index::{BUNDLED_CATALOG, Registry, load_registry_from_path};
pub use model::{CatalogDocument, CatalogEntry, MagicEntry};

pub use model::load_catalog_from_path;
