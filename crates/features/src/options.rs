use serde::{Deserialize, Serialize};

/// Per-feature construction options.
///
/// Serialized with the worker request so the decoder sees the same options
/// the caller passed (camelCase on the wire).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Meters above ground.
    #[serde(default)]
    pub elevation: f64,
    /// Uniform scale factor.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Degrees, clockwise positive (source data convention).
    #[serde(default, rename = "rotation")]
    pub rotation_deg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f64>,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for FeatureOptions {
    fn default() -> Self {
        Self {
            id: None,
            color: None,
            elevation: 0.0,
            scale: 1.0,
            rotation_deg: 0.0,
            min_zoom: None,
            max_zoom: None,
        }
    }
}
