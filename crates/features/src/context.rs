use foundation::math::GeoPoint;

use crate::visibility::ZoomBounds;

/// Per-frame world state, passed explicitly instead of read from globals.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WorldContext {
    /// Camera/world origin in degrees.
    pub camera_position: GeoPoint,
    /// Process-wide zoom limits features are clamped against.
    pub zoom_bounds: ZoomBounds,
}

impl WorldContext {
    pub fn new(camera_position: GeoPoint, zoom_bounds: ZoomBounds) -> Self {
        Self {
            camera_position,
            zoom_bounds,
        }
    }
}
