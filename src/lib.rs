//! Format catalog resolution for palette, image and voxel files.
//!
//! The crate loads a validated catalog of format descriptors once and answers,
//! for a filename and/or the first bytes of a file, which registered formats
//! match and what each of them can do. Public functions here form the contract
//! callers depend on: catalog loading (`Registry`), ranked resolution
//! (`Registry::resolve`), and the capability guard (`capability::require`).
//! The crate never opens the files being identified; callers pass header bytes.

pub mod capability;
pub mod catalog;
pub mod config;
pub mod error;
pub mod resolver;
pub mod schema_loader;
pub mod signature;

pub use capability::{filter, require};
pub use catalog::{
    BUNDLED_CATALOG, CatalogDocument, CatalogEntry, Capability, DescriptorFlags, ExtensionIndex,
    FormatCategory, FormatDescriptor, FormatId, MagicEntry, Registry, load_catalog_from_path,
    load_registry_from_path, normalize_extension,
};
pub use config::{CATALOG_ENV, CatalogSource};
pub use error::{CatalogError, CatalogValidationError, FormatError};
pub use resolver::{MatchResult, MatchedBy, Resolution};
pub use schema_loader::CATALOG_SCHEMA;
pub use signature::{
    Confidence, HIGH_CONFIDENCE_MIN_LEN, Signature, SignatureKind, SignatureMatch,
    match_descriptor,
};
