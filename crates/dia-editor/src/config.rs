//! Editor tunables, loadable from JSON with every field optional.

use dia_core::diagram::CASCADE_THRESHOLD;
use dia_core::{DiaResult, Diagram};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo steps kept before the oldest is dropped.
    pub undo_depth: usize,
    /// How close a dragged handle must come to a connection point to
    /// snap and connect on release.
    pub snap_distance: f64,
    /// Pointer slop when picking objects and handles.
    pub pick_distance: f64,
    /// Connected handles closer than this to their point are not moved.
    pub cascade_threshold: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_depth: 100,
            snap_distance: 0.5,
            pick_distance: 0.2,
            cascade_threshold: CASCADE_THRESHOLD,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> DiaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> DiaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Push the diagram-level settings into `dia`.
    pub fn apply_to(&self, dia: &mut Diagram) {
        dia.cascade_threshold = self.cascade_threshold;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EditorConfig::from_json(r#"{ "undo_depth": 5 }"#).unwrap();
        assert_eq!(cfg.undo_depth, 5);
        assert_eq!(cfg.snap_distance, EditorConfig::default().snap_distance);
    }

    #[test]
    fn json_roundtrip() {
        let cfg = EditorConfig {
            snap_distance: 1.25,
            ..EditorConfig::default()
        };
        assert_eq!(EditorConfig::from_json(&cfg.to_json().unwrap()).unwrap(), cfg);
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(EditorConfig::from_json("{ undo_depth: }").is_err());
    }
}
