//! Post-resolution guard for the operation a caller wants to perform.
//!
//! Keeps "we do not know this file" (`UnknownFormat`) apart from "we know it
//! but cannot do that" (`UnsupportedOperation`).

use crate::catalog::{Capability, FormatCategory, Registry};
use crate::error::FormatError;
use crate::resolver::{MatchResult, Resolution};

/// Keep the results whose descriptor supports `capability`, preserving order.
pub fn filter<'r>(matches: &[MatchResult<'r>], capability: Capability) -> Vec<MatchResult<'r>> {
    matches
        .iter()
        .filter(|m| m.descriptor.supports(capability))
        .copied()
        .collect()
}

/// Filter `matches` and classify an empty outcome.
///
/// `filename` only labels the error.
pub fn require<'r>(
    filename: &str,
    matches: &[MatchResult<'r>],
    capability: Capability,
) -> Result<Vec<MatchResult<'r>>, FormatError> {
    if matches.is_empty() {
        return Err(FormatError::UnknownFormat {
            filename: filename.to_string(),
        });
    }
    let supported = filter(matches, capability);
    if supported.is_empty() {
        let candidates = matches.iter().map(|m| m.name().to_string()).collect();
        tracing::debug!(filename, %capability, "format recognized but operation unsupported");
        return Err(FormatError::UnsupportedOperation {
            filename: filename.to_string(),
            capability,
            candidates,
        });
    }
    Ok(supported)
}

impl Registry {
    /// `resolve` followed by `require`.
    pub fn resolve_for<'r>(
        &'r self,
        filename: &str,
        header: &[u8],
        category: Option<FormatCategory>,
        capability: Capability,
    ) -> Result<Vec<MatchResult<'r>>, FormatError> {
        let resolution: Resolution<'r> = self.resolve(filename, header, category);
        require(filename, resolution.matches(), capability)
    }

    /// Formats that can write `filename`, chosen by extension alone.
    ///
    /// Saving happens before any bytes exist, so there is no header to match.
    pub fn save_target<'r>(
        &'r self,
        filename: &str,
        category: Option<FormatCategory>,
    ) -> Result<Vec<MatchResult<'r>>, FormatError> {
        self.resolve_for(filename, &[], category, Capability::Save)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> Registry {
        Registry::from_value(json!({
            "palettes": [
                {"name": "Qubicle Palette", "extensions": ["qsm"], "save": false}
            ],
            "images": [],
            "voxels": [
                {"name": "Quake 1", "extensions": ["bsp"], "magics": [{"type": "bytes", "value": "0x1D"}], "load": true, "mesh": true},
                {"name": "Tiberian Sun", "extensions": ["vxl"], "load": true, "save": true, "animation": true},
                {"name": "AceOfSpades", "extensions": ["vxl"], "load": true, "save": true},
                {"name": "Godot Scene", "extensions": ["escn"], "load": false, "save": true, "mesh": true}
            ]
        }))
        .expect("fixture catalog is valid")
    }

    #[test]
    fn filter_preserves_order() {
        let registry = registry();
        let res = registry.resolve("tank.vxl", &[], None);
        let saveable = filter(res.matches(), Capability::Save);
        let names: Vec<_> = saveable.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["Tiberian Sun", "AceOfSpades"]);

        let animated = filter(res.matches(), Capability::Animation);
        assert_eq!(animated.len(), 1);
        assert_eq!(animated[0].name(), "Tiberian Sun");
    }

    #[test]
    fn recognized_but_unsupported_is_not_unknown() {
        let registry = registry();
        let err = registry
            .resolve_for("colors.qsm", &[], None, Capability::Save)
            .unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(
            err,
            FormatError::UnsupportedOperation {
                filename: "colors.qsm".into(),
                capability: Capability::Save,
                candidates: vec!["Qubicle Palette".into()],
            }
        );
    }

    #[test]
    fn nothing_recognized_is_unknown() {
        let registry = registry();
        let err = registry
            .resolve_for("mystery.bin", b"\x00\x01", None, Capability::Load)
            .unwrap_err();
        assert!(err.is_unknown());
        assert!(require("x", &[], Capability::Load).unwrap_err().is_unknown());
    }

    #[test]
    fn save_target_uses_extension_only() {
        let registry = registry();
        let targets = registry
            .save_target("out/scene.escn", Some(FormatCategory::Voxel))
            .unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name(), "Godot Scene");

        let err = registry.save_target("level.bsp", None).unwrap_err();
        assert!(err.is_unsupported());
        let err = registry.save_target("level.unknown", None).unwrap_err();
        assert!(err.is_unknown());
    }

    #[test]
    fn load_guard_rejects_save_only_format() {
        let registry = registry();
        let err = registry
            .resolve_for("scene.escn", &[], None, Capability::Load)
            .unwrap_err();
        assert!(err.is_unsupported());
    }
}
