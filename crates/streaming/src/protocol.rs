//! Wire types for main-thread ↔ decode-worker communication.
//!
//! The reply side is a tagged three-way protocol: `Error` and `Decoded` are
//! terminal and free the worker; `Progress` is not and must leave the worker
//! checked out. Collapsing progress into the terminal case would free a
//! worker that is still producing output, so the distinction is encoded in
//! the type (`is_terminal`) rather than left to callers.

use serde::{Deserialize, Serialize};

/// Geographic anchor of a decoded feature, in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub longitude: f64,
    pub latitude: f64,
}

/// One selectable sub-object of a decoded feature (a building, a roof, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureItem {
    pub id: String,
    #[serde(default)]
    pub properties: serde_json::Value,
    pub vertex_count: usize,
}

/// Decode request, main thread → worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeRequest {
    /// Decoder/kind selector (e.g. "GeoJSON", "OBJ").
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    #[serde(default)]
    pub options: serde_json::Value,
}

/// Fully decoded feature payload: flat attribute arrays plus item metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedFeature {
    pub position: GeoPosition,
    pub items: Vec<FeatureItem>,
    pub vertices: Vec<f32>,
    pub normals: Vec<f32>,
    pub colors: Vec<f32>,
    pub tex_coords: Vec<f32>,
    pub heights: Vec<f32>,
    pub picking_colors: Vec<f32>,
}

/// Reply, worker → main thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerReply {
    /// Decode/fetch failed. Terminal.
    Error { message: String },
    /// Partial progress; the worker stays checked out.
    Progress,
    /// Decoded payload. Terminal.
    Decoded(DecodedFeature),
}

impl WorkerReply {
    /// Terminal replies end the load and return the worker to the pool.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkerReply::Progress)
    }
}
