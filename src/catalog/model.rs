//! Deserializable representation of the format catalog.
//!
//! The types mirror `schema/format_catalog.schema.json` field for field, with
//! optional flags left as `Option` so the loader can apply per-category
//! defaults exactly once. Use `Registry` for validated lookups; use these
//! structs when reading or writing the persisted form.

use crate::catalog::identity::FormatCategory;
use crate::signature::SignatureKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// Full catalog as stored on disk: one array per category.
pub struct CatalogDocument {
    pub palettes: Vec<CatalogEntry>,
    pub images: Vec<CatalogEntry>,
    pub voxels: Vec<CatalogEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// One format as authored in the catalog.
pub struct CatalogEntry {
    pub name: String,
    pub extensions: Vec<String>,
    #[serde(default)]
    pub magics: Vec<MagicEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette_embedded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_embedded: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// Magic value in its authored spelling.
pub struct MagicEntry {
    #[serde(rename = "type")]
    pub kind: SignatureKind,
    pub value: String,
}

impl CatalogDocument {
    /// Entries of one category in declaration order.
    pub fn section(&self, category: FormatCategory) -> &[CatalogEntry] {
        match category {
            FormatCategory::Palette => &self.palettes,
            FormatCategory::Image => &self.images,
            FormatCategory::Voxel => &self.voxels,
        }
    }

    pub(crate) fn section_mut(&mut self, category: FormatCategory) -> &mut Vec<CatalogEntry> {
        match category {
            FormatCategory::Palette => &mut self.palettes,
            FormatCategory::Image => &mut self.images,
            FormatCategory::Voxel => &mut self.voxels,
        }
    }

    /// Every entry with its category and index inside that category, in
    /// global declaration order (palettes, images, voxels).
    pub fn entries(&self) -> impl Iterator<Item = (FormatCategory, usize, &CatalogEntry)> {
        FormatCategory::ALL.into_iter().flat_map(move |category| {
            self.section(category)
                .iter()
                .enumerate()
                .map(move |(index, entry)| (category, index, entry))
        })
    }

    pub fn len(&self) -> usize {
        self.palettes.len() + self.images.len() + self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read and parse a catalog from disk without additional validation.
pub fn load_catalog_from_path(path: &Path) -> Result<CatalogDocument> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading catalog {}", path.display()))?;
    let catalog: CatalogDocument = serde_json::from_str(&data)
        .with_context(|| format!("parsing catalog {}", path.display()))?;
    Ok(catalog)
}
