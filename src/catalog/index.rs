//! Validated, indexed view of a format catalog.
//!
//! `Registry` is built once: schema check, typed parse, per-entry validation,
//! then the extension index. It is strict: the first malformed entry aborts
//! loading with its location, so a process never starts on a half-valid
//! catalog. After construction nothing is mutated, and the registry can be
//! shared across threads by reference.

use crate::catalog::descriptor::{DescriptorFlags, FormatDescriptor};
use crate::catalog::extensions::ExtensionIndex;
use crate::catalog::identity::{Capability, FormatCategory, FormatId};
use crate::catalog::model::{CatalogDocument, CatalogEntry, load_catalog_from_path};
use crate::config::CatalogSource;
use crate::error::{CatalogError, CatalogValidationError};
use crate::schema_loader::CatalogSchema;
use crate::signature::Signature;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Bundled canonical catalog (`schema/formats.json`).
pub const BUNDLED_CATALOG: &str = include_str!("../../schema/formats.json");

#[derive(Debug)]
/// Immutable descriptor set plus derived lookup tables.
pub struct Registry {
    descriptors: Vec<FormatDescriptor>,
    by_category: BTreeMap<FormatCategory, Vec<FormatId>>,
    extensions: ExtensionIndex,
    header_len: usize,
}

impl Registry {
    /// Parse, schema-check and validate catalog JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Schema-check and validate an already parsed catalog.
    pub fn from_value(value: Value) -> Result<Self, CatalogError> {
        let schema = CatalogSchema::bundled()?;
        schema.validate(&value)?;
        let document: CatalogDocument = serde_json::from_value(value)?;
        Ok(Self::from_document(&document)?)
    }

    /// Validate a typed catalog and build the registry.
    ///
    /// Entries are checked in declaration order and the first violation is
    /// returned.
    pub fn from_document(document: &CatalogDocument) -> Result<Self, CatalogValidationError> {
        let mut descriptors = Vec::with_capacity(document.len());
        let mut by_category: BTreeMap<FormatCategory, Vec<FormatId>> = BTreeMap::new();
        for (category, index, entry) in document.entries() {
            let id = FormatId(descriptors.len());
            let descriptor = validate_entry(id, category, index, entry).inspect_err(|err| {
                tracing::warn!(location = %err.location(), reason = %err.reason, "rejecting catalog");
            })?;
            by_category.entry(category).or_default().push(id);
            descriptors.push(descriptor);
        }

        let extensions = ExtensionIndex::build(&descriptors);
        let header_len = descriptors
            .iter()
            .flat_map(|d| d.magics())
            .map(Signature::len)
            .max()
            .unwrap_or(0);

        tracing::info!(
            descriptors = descriptors.len(),
            palettes = document.palettes.len(),
            images = document.images.len(),
            voxels = document.voxels.len(),
            extension_keys = extensions.len(),
            header_len,
            "format catalog loaded"
        );

        Ok(Self {
            descriptors,
            by_category,
            extensions,
            header_len,
        })
    }

    /// Load a catalog file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("loading catalog {}", path.display()))
    }

    /// The catalog compiled into the crate.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json_str(BUNDLED_CATALOG)
    }

    /// Build from an explicit source.
    pub fn from_source(source: &CatalogSource) -> Result<Self> {
        match source {
            CatalogSource::Bundled => Self::bundled().context("loading bundled catalog"),
            CatalogSource::Path(path) => Self::load(path),
        }
    }

    /// Build from the source selected by the environment (see
    /// `CatalogSource::from_env`).
    pub fn from_env() -> Result<Self> {
        Self::from_source(&CatalogSource::from_env())
    }

    /// Every descriptor in declaration order.
    pub fn descriptors(&self) -> &[FormatDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, id: FormatId) -> Option<&FormatDescriptor> {
        self.descriptors.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptors of one category in declaration order.
    pub fn list_by_category(
        &self,
        category: FormatCategory,
    ) -> impl Iterator<Item = &FormatDescriptor> {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(|id| &self.descriptors[id.index()])
    }

    /// Descriptors of one category that can be loaded.
    pub fn loadable(&self, category: FormatCategory) -> impl Iterator<Item = &FormatDescriptor> {
        self.with_capability(category, Capability::Load)
    }

    /// Descriptors of one category that can be saved.
    pub fn saveable(&self, category: FormatCategory) -> impl Iterator<Item = &FormatDescriptor> {
        self.with_capability(category, Capability::Save)
    }

    pub fn with_capability(
        &self,
        category: FormatCategory,
        capability: Capability,
    ) -> impl Iterator<Item = &FormatDescriptor> {
        self.list_by_category(category)
            .filter(move |d| d.supports(capability))
    }

    /// Descriptors declaring `mimetype` (ASCII case-insensitive).
    pub fn by_mimetype<'r>(
        &'r self,
        mimetype: &'r str,
    ) -> impl Iterator<Item = &'r FormatDescriptor> + 'r {
        self.descriptors.iter().filter(move |d| {
            d.mimetype()
                .is_some_and(|declared| declared.eq_ignore_ascii_case(mimetype.trim()))
        })
    }

    pub fn extensions(&self) -> &ExtensionIndex {
        &self.extensions
    }

    /// Length of the longest registered magic. Callers should hand `resolve`
    /// at least this many header bytes.
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Persisted form, reloadable into an identical registry.
    pub fn to_document(&self) -> CatalogDocument {
        let mut document = CatalogDocument::default();
        for descriptor in &self.descriptors {
            document
                .section_mut(descriptor.category())
                .push(descriptor.to_entry());
        }
        document
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_document())
    }
}

/// Read a catalog file and build a registry, keeping the path in errors.
pub fn load_registry_from_path(path: &Path) -> Result<Registry> {
    let document = load_catalog_from_path(path)?;
    Registry::from_document(&document)
        .with_context(|| format!("validating catalog {}", path.display()))
}

fn validate_entry(
    id: FormatId,
    category: FormatCategory,
    index: usize,
    entry: &CatalogEntry,
) -> Result<FormatDescriptor, CatalogValidationError> {
    let fail = |field: String, reason: String| {
        CatalogValidationError::entry(category, index, field, reason)
    };

    let name = entry.name.trim();
    if name.is_empty() {
        return Err(fail("name".into(), "name must not be empty".into()));
    }

    if entry.extensions.is_empty() {
        return Err(fail(
            "extensions".into(),
            format!("'{name}' declares no extensions"),
        ));
    }
    for (pos, ext) in entry.extensions.iter().enumerate() {
        validate_extension(ext).map_err(|reason| fail(format!("extensions[{pos}]"), reason))?;
    }

    let mut magics = Vec::with_capacity(entry.magics.len());
    for (pos, magic) in entry.magics.iter().enumerate() {
        let signature = Signature::decode(magic.kind, &magic.value)
            .map_err(|reason| fail(format!("magics[{pos}].value"), reason))?;
        magics.push(signature);
    }

    if let Some(mimetype) = &entry.mimetype {
        if mimetype.trim().is_empty() {
            return Err(fail("mimetype".into(), "mimetype must not be empty".into()));
        }
    }

    let load = match (entry.load, category.load_defaults_to_true()) {
        (Some(load), _) => load,
        (None, true) => true,
        (None, false) => {
            return Err(fail(
                "load".into(),
                format!("{} entries must state load explicitly", category.as_str()),
            ));
        }
    };

    let flags = DescriptorFlags {
        load,
        save: entry.save.unwrap_or(false),
        animation: entry.animation.unwrap_or(false),
        mesh: entry.mesh.unwrap_or(false),
        palette_embedded: entry.palette_embedded.unwrap_or(false),
        thumbnail_embedded: entry.thumbnail_embedded.unwrap_or(false),
    };

    Ok(FormatDescriptor::new(
        id,
        name,
        category,
        entry.extensions.clone(),
        magics,
        entry.mimetype.clone(),
        flags,
    ))
}

fn validate_extension(ext: &str) -> Result<(), String> {
    if ext.is_empty() {
        return Err("extension must not be empty".to_string());
    }
    if ext != ext.to_lowercase() {
        return Err(format!("extension '{ext}' must be lowercase"));
    }
    if ext.starts_with('.') || ext.ends_with('.') {
        return Err(format!("extension '{ext}' must not start or end with a dot"));
    }
    if ext.split('.').any(str::is_empty) {
        return Err(format!("extension '{ext}' contains an empty segment"));
    }
    if ext
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '\\'))
    {
        return Err(format!(
            "extension '{ext}' must not contain whitespace or path separators"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn catalog(voxels: Value) -> Value {
        json!({
            "palettes": [
                {"name": "JASC Palette", "extensions": ["pal"], "magics": [{"type": "string", "value": "JASC"}], "save": true},
                {"name": "RGB Palette", "extensions": ["pal"]}
            ],
            "images": [
                {"name": "Portable Network Graphics", "extensions": ["png"], "magics": [{"type": "bytes", "value": "0x89504E47"}]}
            ],
            "voxels": voxels
        })
    }

    #[test]
    fn applies_category_defaults() {
        let registry = Registry::from_value(catalog(json!([
            {"name": "Qubicle Binary", "extensions": ["qb"], "load": true, "save": true}
        ])))
        .unwrap();
        let rgb = &registry.descriptors()[1];
        assert_eq!(rgb.name(), "RGB Palette");
        assert!(rgb.can_load());
        assert!(!rgb.can_save());
        let png = &registry.descriptors()[2];
        assert!(png.can_load());
        assert!(!png.can_save());
        assert_eq!(registry.header_len(), 4);
    }

    #[test]
    fn ids_follow_declaration_order() {
        let registry = Registry::from_value(catalog(json!([
            {"name": "Tiberian Sun", "extensions": ["vxl"], "load": true},
            {"name": "AceOfSpades", "extensions": ["vxl"], "load": true}
        ])))
        .unwrap();
        let ids: Vec<_> = registry.descriptors().iter().map(|d| d.id().index()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        let voxels: Vec<_> = registry
            .list_by_category(FormatCategory::Voxel)
            .map(|d| d.name())
            .collect();
        assert_eq!(voxels, vec!["Tiberian Sun", "AceOfSpades"]);
    }

    #[test]
    fn voxel_entries_must_state_load() {
        let err = Registry::from_value(catalog(json!([
            {"name": "ok", "extensions": ["ok"], "load": true},
            {"name": "Goxel", "extensions": ["gox"]}
        ])))
        .unwrap_err();
        let CatalogError::Invalid(err) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(err.category, Some(FormatCategory::Voxel));
        assert_eq!(err.index, Some(1));
        assert_eq!(err.field, "load");
    }

    #[test]
    fn rejects_uppercase_extension_with_location() {
        let err = Registry::from_value(catalog(json!([
            {"name": "MagicaVoxel", "extensions": ["vox", "VOX"], "load": true}
        ])))
        .unwrap_err();
        let CatalogError::Invalid(err) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(err.location(), "voxels[0].extensions[1]");
        assert!(err.reason.contains("lowercase"));
    }

    #[test]
    fn rejects_blank_name_and_bad_magic() {
        let err = Registry::from_value(catalog(json!([
            {"name": "  ", "extensions": ["x"], "load": true}
        ])))
        .unwrap_err();
        assert!(matches!(err, CatalogError::Invalid(ref e) if e.field == "name"));

        let err = Registry::from_value(catalog(json!([
            {"name": "Broken", "extensions": ["x"], "load": true, "magics": [{"type": "bytes", "value": "0xABC"}]}
        ])))
        .unwrap_err();
        assert!(matches!(err, CatalogError::Invalid(ref e) if e.field == "magics[0].value"));
    }

    #[test]
    fn rejects_malformed_compound_extensions() {
        for bad in [".vox", "ben..json", "vmax.zip.", "my ext", "a/b"] {
            assert!(validate_extension(bad).is_err(), "{bad:?} should be rejected");
        }
        for good in ["vox", "ben.json", "3zh", "vmax.zip"] {
            assert!(validate_extension(good).is_ok(), "{good:?} should be accepted");
        }
    }

    #[test]
    fn schema_rejects_unknown_fields_before_typed_parse() {
        let err = Registry::from_value(catalog(json!([
            {"name": "Vengi", "extensions": ["vengi"], "load": true, "colour": "blue"}
        ])))
        .unwrap_err();
        let CatalogError::Invalid(err) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(err.category, Some(FormatCategory::Voxel));
        assert_eq!(err.index, Some(0));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = Registry::from_json_str("{\"palettes\": [").unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }

    #[test]
    fn mimetype_lookup_is_case_insensitive() {
        let registry = Registry::from_value(catalog(json!([
            {"name": "Vengi", "extensions": ["vengi"], "load": true, "mimetype": "application/x-vengi"}
        ])))
        .unwrap();
        let hits: Vec<_> = registry
            .by_mimetype("Application/X-Vengi")
            .map(|d| d.name())
            .collect();
        assert_eq!(hits, vec!["Vengi"]);
        assert_eq!(registry.by_mimetype("image/png").count(), 0);
    }

    #[test]
    fn load_and_load_registry_from_path_agree() {
        let mut file = NamedTempFile::new().unwrap();
        let text = serde_json::to_string(&catalog(json!([
            {"name": "Goxel", "extensions": ["gox"], "load": true, "save": true}
        ])))
        .unwrap();
        file.write_all(text.as_bytes()).unwrap();

        let a = Registry::load(file.path()).unwrap();
        let b = load_registry_from_path(file.path()).unwrap();
        assert_eq!(a.descriptors(), b.descriptors());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Registry::load(Path::new("/nonexistent/formats.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/formats.json"));
    }
}
