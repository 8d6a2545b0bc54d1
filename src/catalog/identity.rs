use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Position of a descriptor in catalog declaration order.
///
/// Names are not unique across the catalog (three "Portable Network Graphics"
/// entries, two "AceOfSpades"), so descriptor identity is positional. Ids are
/// assigned palettes first, then images, then voxels.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatId(pub usize);

impl FormatId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Top-level grouping of a descriptor.
///
/// The set is closed: a catalog array other than `palettes`, `images` or
/// `voxels` is a schema violation, not a new category.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FormatCategory {
    Palette,
    Image,
    Voxel,
}

impl FormatCategory {
    /// Categories in catalog declaration order.
    pub const ALL: [FormatCategory; 3] = [
        FormatCategory::Palette,
        FormatCategory::Image,
        FormatCategory::Voxel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatCategory::Palette => "palette",
            FormatCategory::Image => "image",
            FormatCategory::Voxel => "voxel",
        }
    }

    /// Name of the catalog array holding this category.
    pub fn section(&self) -> &'static str {
        match self {
            FormatCategory::Palette => "palettes",
            FormatCategory::Image => "images",
            FormatCategory::Voxel => "voxels",
        }
    }

    /// Accepts both the singular name and the catalog array name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "palette" | "palettes" => Some(FormatCategory::Palette),
            "image" | "images" => Some(FormatCategory::Image),
            "voxel" | "voxels" => Some(FormatCategory::Voxel),
            _ => None,
        }
    }

    /// Whether `load` may be omitted from an entry of this category.
    ///
    /// Palette and image entries default to loadable; voxel entries must say.
    pub fn load_defaults_to_true(&self) -> bool {
        !matches!(self, FormatCategory::Voxel)
    }
}

impl fmt::Display for FormatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FormatCategory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FormatCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value)
            .ok_or_else(|| D::Error::custom(format!("unknown format category '{value}'")))
    }
}

/// Operation or property a caller can require of a recognized format.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Capability {
    Load,
    Save,
    Animation,
    Mesh,
    PaletteEmbedded,
    ThumbnailEmbedded,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::Load,
        Capability::Save,
        Capability::Animation,
        Capability::Mesh,
        Capability::PaletteEmbedded,
        Capability::ThumbnailEmbedded,
    ];

    /// Catalog field name carrying the flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Load => "load",
            Capability::Save => "save",
            Capability::Animation => "animation",
            Capability::Mesh => "mesh",
            Capability::PaletteEmbedded => "palette_embedded",
            Capability::ThumbnailEmbedded => "thumbnail_embedded",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cap| cap.as_str() == value)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value)
            .ok_or_else(|| D::Error::custom(format!("unknown capability '{value}'")))
    }
}
