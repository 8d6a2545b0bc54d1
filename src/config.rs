//! Catalog source selection.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable naming a catalog file to use instead of the bundled one.
pub const CATALOG_ENV: &str = "FORMAT_CATALOG";

/// Where the registry's catalog comes from.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum CatalogSource {
    /// The canonical catalog compiled into the crate.
    #[default]
    Bundled,
    /// A catalog file on disk.
    Path(PathBuf),
}

impl CatalogSource {
    /// Honor `FORMAT_CATALOG` when it is set to a non-empty value.
    ///
    /// A set variable always wins: a broken path surfaces as a load error
    /// rather than quietly falling back to the bundled catalog.
    pub fn from_env() -> Self {
        Self::from_env_value(env::var_os(CATALOG_ENV))
    }

    pub fn from_env_value(value: Option<OsString>) -> Self {
        match value {
            Some(raw) if !raw.to_string_lossy().trim().is_empty() => {
                let path = PathBuf::from(raw);
                tracing::debug!(path = %path.display(), "catalog override from {CATALOG_ENV}");
                CatalogSource::Path(path)
            }
            _ => CatalogSource::Bundled,
        }
    }
}
