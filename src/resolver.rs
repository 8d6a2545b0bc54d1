//! Ranked format resolution from a filename and header bytes.
//!
//! Extension evidence and magic evidence are gathered independently and merged
//! per descriptor. Magic is checked against every descriptor, not just the
//! extension candidates, so a misnamed file still surfaces its real format.
//! Results are ordered by confidence and then by catalog declaration order;
//! ties are reported, never collapsed.

use crate::catalog::{FormatCategory, FormatDescriptor, FormatId, Registry};
use crate::signature::{Confidence, Signature, match_descriptor};
use serde::Serialize;
use std::fmt;

/// Which evidence produced a result.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedBy {
    Magic,
    Extension,
}

impl fmt::Display for MatchedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchedBy::Magic => "magic",
            MatchedBy::Extension => "extension",
        })
    }
}

/// One candidate format for a lookup.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MatchResult<'r> {
    pub descriptor: &'r FormatDescriptor,
    pub confidence: Confidence,
    pub matched_by: MatchedBy,
    /// The magic that matched; `None` for extension results.
    pub signature: Option<&'r Signature>,
}

impl MatchResult<'_> {
    pub fn id(&self) -> FormatId {
        self.descriptor.id()
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }
}

/// Ordered outcome of `Registry::resolve`.
///
/// Empty means the format is unknown; two or more results sharing the top
/// confidence means the input is ambiguous.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Resolution<'r> {
    matches: Vec<MatchResult<'r>>,
    extension_key: Option<&'r str>,
}

impl<'r> Resolution<'r> {
    pub(crate) fn new(matches: Vec<MatchResult<'r>>, extension_key: Option<&'r str>) -> Self {
        Self {
            matches,
            extension_key,
        }
    }

    pub fn matches(&self) -> &[MatchResult<'r>] {
        &self.matches
    }

    pub fn into_matches(self) -> Vec<MatchResult<'r>> {
        self.matches
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatchResult<'r>> {
        self.matches.iter()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Highest-ranked result. Check `is_ambiguous` before trusting it alone.
    pub fn best(&self) -> Option<&MatchResult<'r>> {
        self.matches.first()
    }

    /// Results tied at the top confidence tier, in declaration order.
    pub fn top_tier(&self) -> &[MatchResult<'r>] {
        let Some(first) = self.matches.first() else {
            return &[];
        };
        let tied = self
            .matches
            .iter()
            .take_while(|m| m.confidence == first.confidence)
            .count();
        &self.matches[..tied]
    }

    pub fn is_ambiguous(&self) -> bool {
        self.top_tier().len() > 1
    }

    /// Extension index key that produced the extension candidates, if any.
    pub fn extension_key(&self) -> Option<&'r str> {
        self.extension_key
    }
}

impl<'r> IntoIterator for Resolution<'r> {
    type Item = MatchResult<'r>;
    type IntoIter = std::vec::IntoIter<MatchResult<'r>>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}

impl<'a, 'r> IntoIterator for &'a Resolution<'r> {
    type Item = &'a MatchResult<'r>;
    type IntoIter = std::slice::Iter<'a, MatchResult<'r>>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

impl Registry {
    /// Rank every descriptor the filename and header point at.
    ///
    /// `filename` may carry directories and may be empty; `header` holds the
    /// first bytes of the file (at least `header_len()` for full coverage) and
    /// may be empty. `category` restricts results to one category. Pure: no
    /// I/O, and the only allocation is the result list.
    pub fn resolve<'r>(
        &'r self,
        filename: &str,
        header: &[u8],
        category: Option<FormatCategory>,
    ) -> Resolution<'r> {
        let (extension_key, ext_candidates) = match self.extensions().lookup_filename(filename) {
            Some((key, ids)) => (Some(key), ids),
            None => (None, &[][..]),
        };

        let mut matches = Vec::new();
        for descriptor in self.descriptors() {
            if category.is_some_and(|wanted| descriptor.category() != wanted) {
                continue;
            }
            let by_extension = ext_candidates.contains(&descriptor.id());
            if let Some(hit) = match_descriptor(descriptor, header) {
                if !by_extension && !ext_candidates.is_empty() {
                    tracing::debug!(
                        filename,
                        format = descriptor.name(),
                        extension = extension_key.unwrap_or_default(),
                        "magic matched a format the extension does not claim"
                    );
                }
                matches.push(MatchResult {
                    descriptor,
                    confidence: hit.confidence,
                    matched_by: MatchedBy::Magic,
                    signature: Some(hit.signature),
                });
            } else if by_extension {
                matches.push(MatchResult {
                    descriptor,
                    confidence: Confidence::Low,
                    matched_by: MatchedBy::Extension,
                    signature: None,
                });
            }
        }

        // Stable: equal tiers keep declaration order.
        matches.sort_by(|a, b| b.confidence.cmp(&a.confidence));

        if tracing::enabled!(tracing::Level::TRACE) {
            let ranked: Vec<String> = matches
                .iter()
                .map(|m| format!("{}:{}:{}", m.name(), m.confidence, m.matched_by))
                .collect();
            tracing::trace!(filename, header_len = header.len(), ?ranked, "resolved");
        }

        Resolution::new(matches, extension_key)
    }

    /// Whether a loadable voxel format claims the filename's extension.
    pub fn is_model_format(&self, filename: &str) -> bool {
        self.resolve(filename, &[], Some(FormatCategory::Voxel))
            .iter()
            .any(|m| m.descriptor.can_load())
    }

    /// Whether a mesh voxel format claims the filename's extension among the
    /// saveable (`save`) or loadable formats.
    pub fn is_mesh_format(&self, filename: &str, save: bool) -> bool {
        self.resolve(filename, &[], Some(FormatCategory::Voxel))
            .iter()
            .any(|m| {
                let usable = if save {
                    m.descriptor.can_save()
                } else {
                    m.descriptor.can_load()
                };
                usable && m.descriptor.supports_mesh()
            })
    }
}
