//! Extension lookup with compound-suffix handling.
//!
//! Keys are normalized extensions (`vox`, `ben.json`). A filename is probed
//! with its dot-suffixes from longest to shortest and the first key with
//! registered descriptors wins, so `thing.ben.json` lands on BenVoxel and never
//! on the generic `json` entry. Shorter suffixes are not merged into a longer
//! hit.

use crate::catalog::descriptor::FormatDescriptor;
use crate::catalog::identity::FormatId;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Lowercase, trimmed, without leading dots.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Final path component; both `/` and `\` separate directories.
pub fn basename(filename: &str) -> &str {
    filename.rsplit(['/', '\\']).next().unwrap_or(filename)
}

/// Every dot-suffix of `basename`, longest first.
///
/// A dot at position 0 marks a hidden file rather than an extension, and an
/// empty suffix (trailing dot) is skipped.
pub fn suffixes(basename: &str) -> impl Iterator<Item = &str> {
    basename
        .char_indices()
        .filter(|&(pos, c)| c == '.' && pos > 0)
        .map(move |(pos, _)| &basename[pos + 1..])
        .filter(|suffix| !suffix.is_empty())
}

#[derive(Clone, Debug, Default)]
/// Normalized extension key to descriptor ids in declaration order.
pub struct ExtensionIndex {
    by_key: BTreeMap<String, Vec<FormatId>>,
}

impl ExtensionIndex {
    /// Index every declared extension. Descriptors are expected in declaration
    /// order; an id appears at most once per key.
    pub fn build(descriptors: &[FormatDescriptor]) -> Self {
        let mut by_key: BTreeMap<String, Vec<FormatId>> = BTreeMap::new();
        for descriptor in descriptors {
            for ext in descriptor.extensions() {
                let ids = by_key.entry(normalize_extension(ext)).or_default();
                if !ids.contains(&descriptor.id()) {
                    ids.push(descriptor.id());
                }
            }
        }
        Self { by_key }
    }

    /// Descriptors registered under a single extension (normalized first).
    pub fn lookup(&self, ext: &str) -> &[FormatId] {
        self.by_key
            .get(normalize_extension(ext).as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Longest-suffix-first lookup for a filename.
    ///
    /// Returns the winning key and its descriptors, or `None` when no suffix
    /// is registered. Directory components are ignored.
    pub fn lookup_filename(&self, filename: &str) -> Option<(&str, &[FormatId])> {
        let base = basename(filename);
        let lowered: Cow<'_, str> = if base.chars().any(char::is_uppercase) {
            Cow::Owned(base.to_lowercase())
        } else {
            Cow::Borrowed(base)
        };
        suffixes(&lowered).find_map(|suffix| {
            self.by_key
                .get_key_value(suffix)
                .filter(|(_, ids)| !ids.is_empty())
                .map(|(key, ids)| (key.as_str(), ids.as_slice()))
        })
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.by_key.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DescriptorFlags, FormatCategory};

    fn descriptor(id: usize, name: &str, exts: &[&str]) -> FormatDescriptor {
        FormatDescriptor::new(
            FormatId(id),
            name,
            FormatCategory::Voxel,
            exts.iter().map(|e| e.to_string()).collect(),
            Vec::new(),
            None,
            DescriptorFlags::loadable(),
        )
    }

    fn index() -> ExtensionIndex {
        ExtensionIndex::build(&[
            descriptor(0, "Pixelorama", &["json"]),
            descriptor(1, "BenVoxel", &["ben.json", "ben"]),
            descriptor(2, "VoxelMax", &["vmax.zip", "vmaxb"]),
            descriptor(3, "SpriteStack", &["zip"]),
            descriptor(4, "Tiberian Sun", &["vxl"]),
            descriptor(5, "AceOfSpades", &["vxl", "vxl"]),
        ])
    }

    #[test]
    fn normalizes_case_and_leading_dot() {
        assert_eq!(normalize_extension(".VXL"), "vxl");
        assert_eq!(normalize_extension(" Ben.JSON "), "ben.json");
        assert_eq!(index().lookup(".VxL"), &[FormatId(4), FormatId(5)]);
    }

    #[test]
    fn suffixes_run_longest_first() {
        let all: Vec<_> = suffixes("thing.ben.json").collect();
        assert_eq!(all, vec!["ben.json", "json"]);
        assert_eq!(suffixes(".vox").count(), 0);
        assert_eq!(suffixes(".hidden.vox").collect::<Vec<_>>(), vec!["vox"]);
        assert_eq!(suffixes("trailing.").count(), 0);
        assert_eq!(suffixes("noext").count(), 0);
    }

    #[test]
    fn compound_key_wins_over_final_segment() {
        let idx = index();
        let (key, ids) = idx.lookup_filename("models/thing.ben.json").unwrap();
        assert_eq!(key, "ben.json");
        assert_eq!(ids, &[FormatId(1)]);

        let (key, ids) = idx.lookup_filename("palette.json").unwrap();
        assert_eq!(key, "json");
        assert_eq!(ids, &[FormatId(0)]);

        let (key, ids) = idx.lookup_filename("C:\\scenes\\ship.VMAX.ZIP").unwrap();
        assert_eq!(key, "vmax.zip");
        assert_eq!(ids, &[FormatId(2)]);
    }

    #[test]
    fn falls_back_to_shorter_suffix_without_merging() {
        let idx = index();
        let (key, ids) = idx.lookup_filename("backup.old.zip").unwrap();
        assert_eq!(key, "zip");
        assert_eq!(ids, &[FormatId(3)]);
    }

    #[test]
    fn shared_extension_keeps_declaration_order_without_duplicates() {
        let idx = index();
        let (_, ids) = idx.lookup_filename("x.vxl").unwrap();
        assert_eq!(ids, &[FormatId(4), FormatId(5)]);
    }

    #[test]
    fn unknown_or_missing_extension_is_none() {
        let idx = index();
        assert!(idx.lookup_filename("README").is_none());
        assert!(idx.lookup_filename("notes.txt").is_none());
        assert!(idx.lookup_filename("dir.vxl/file").is_none());
        assert!(idx.lookup("").is_empty());
    }
}
