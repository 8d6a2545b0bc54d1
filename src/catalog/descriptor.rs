//! Validated, immutable format descriptors.

use crate::catalog::identity::{Capability, FormatCategory, FormatId};
use crate::catalog::model::{CatalogEntry, MagicEntry};
use crate::signature::Signature;
use serde::Serialize;

/// Capability flags with every default already applied.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize)]
pub struct DescriptorFlags {
    pub load: bool,
    pub save: bool,
    pub animation: bool,
    pub mesh: bool,
    pub palette_embedded: bool,
    pub thumbnail_embedded: bool,
}

impl DescriptorFlags {
    /// Load-only, the most common shape in the catalog.
    pub fn loadable() -> Self {
        Self {
            load: true,
            ..Self::default()
        }
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Load => self.load,
            Capability::Save => self.save,
            Capability::Animation => self.animation,
            Capability::Mesh => self.mesh,
            Capability::PaletteEmbedded => self.palette_embedded,
            Capability::ThumbnailEmbedded => self.thumbnail_embedded,
        }
    }
}

/// One catalog entry after validation.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FormatDescriptor {
    id: FormatId,
    name: String,
    category: FormatCategory,
    extensions: Vec<String>,
    magics: Vec<Signature>,
    mimetype: Option<String>,
    flags: DescriptorFlags,
}

impl FormatDescriptor {
    /// `id` must equal the descriptor's position in its registry.
    pub(crate) fn new(
        id: FormatId,
        name: impl Into<String>,
        category: FormatCategory,
        extensions: Vec<String>,
        magics: Vec<Signature>,
        mimetype: Option<String>,
        flags: DescriptorFlags,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            extensions,
            magics,
            mimetype,
            flags,
        }
    }

    pub fn id(&self) -> FormatId {
        self.id
    }

    /// Display name; not unique across the catalog.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> FormatCategory {
        self.category
    }

    /// Lowercase extensions in declared order, compound ones included.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn magics(&self) -> &[Signature] {
        &self.magics
    }

    pub fn mimetype(&self) -> Option<&str> {
        self.mimetype.as_deref()
    }

    pub fn flags(&self) -> DescriptorFlags {
        self.flags
    }

    pub fn can_load(&self) -> bool {
        self.flags.load
    }

    pub fn can_save(&self) -> bool {
        self.flags.save
    }

    pub fn supports_animation(&self) -> bool {
        self.flags.animation
    }

    pub fn supports_mesh(&self) -> bool {
        self.flags.mesh
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.flags.supports(capability)
    }

    /// Content alone cannot identify a descriptor without magics.
    pub fn is_extension_only(&self) -> bool {
        self.magics.is_empty()
    }

    /// Whether `ext` (any case, with or without a leading dot) is declared.
    pub fn matches_extension(&self, ext: &str) -> bool {
        let ext = ext.trim().trim_start_matches('.');
        self.extensions
            .iter()
            .any(|declared| declared.eq_ignore_ascii_case(ext))
    }

    /// Persisted form. `load` and `save` are always written so the entry
    /// reloads identically regardless of category defaults.
    pub fn to_entry(&self) -> CatalogEntry {
        CatalogEntry {
            name: self.name.clone(),
            extensions: self.extensions.clone(),
            magics: self
                .magics
                .iter()
                .map(|sig| MagicEntry {
                    kind: sig.kind(),
                    value: sig.encode(),
                })
                .collect(),
            mimetype: self.mimetype.clone(),
            mesh: self.flags.mesh.then_some(true),
            animation: self.flags.animation.then_some(true),
            load: Some(self.flags.load),
            save: Some(self.flags.save),
            palette_embedded: self.flags.palette_embedded.then_some(true),
            thumbnail_embedded: self.flags.thumbnail_embedded.then_some(true),
        }
    }
}
