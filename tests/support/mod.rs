use anyhow::{Context, Result};
use format_catalog::{MatchResult, Registry};
use serde_json::Value;
use std::io::Write;
use std::sync::OnceLock;
use tempfile::NamedTempFile;

/// Bundled registry shared by every test in the binary.
pub fn bundled() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| Registry::bundled().expect("bundled catalog must load"))
}

/// Persist a catalog value to a temporary file.
pub fn write_catalog(value: &Value) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new().context("failed to allocate catalog file")?;
    serde_json::to_writer_pretty(&mut file, value)?;
    file.flush()?;
    Ok(file)
}

/// Names of the descriptors in a result list, in order.
pub fn names(matches: &[MatchResult<'_>]) -> Vec<String> {
    matches
        .iter()
        .map(|m| m.descriptor.name().to_string())
        .collect()
}
