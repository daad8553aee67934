use foundation::math::{
    GeoPoint, METERS_PER_DEGREE_LATITUDE, Mat4, Vec2, meters_per_degree_longitude,
};
use gpu::BufferHandle;
use streaming::{FeatureItem, LoadId};

use crate::cascade::{BufferCascade, GeometryBuffers};
use crate::context::WorldContext;
use crate::options::FeatureOptions;
use crate::transform::FeatureTransform;
use crate::visibility::ZoomRange;

/// Lifecycle states of a feature. Nothing leaves `Destroyed`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    BuildingBuffers,
    Ready,
    Destroyed,
}

/// Fade-in tunables: one full fade takes `duration_s` at `frame_rate`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FadeConfig {
    pub duration_s: f64,
    pub frame_rate: f64,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            duration_s: 1.0,
            frame_rate: 60.0,
        }
    }
}

impl FadeConfig {
    pub fn increment(&self) -> f64 {
        1.0 / (self.duration_s * self.frame_rate)
    }
}

/// A fade sample for the renderer. While `animating` is set the renderer
/// should request an extra frame to keep the animation moving.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FadeWeight {
    pub value: f64,
    pub animating: bool,
}

/// Owner notifications during loading. `Failed` is terminal and fires at
/// most once; `Progress` may fire any number of times before it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    Progress,
    Failed,
}

pub type LoadCallback = Box<dyn FnMut(LoadEvent)>;

/// All GPU buffers of a ready feature. Present only as a complete set:
/// installed atomically on the Ready transition, released together on
/// destroy.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FeatureBuffers {
    pub vertex: BufferHandle,
    pub normal: BufferHandle,
    pub color: BufferHandle,
    pub tex_coord: BufferHandle,
    pub height: BufferHandle,
    pub picking: BufferHandle,
    pub tint: BufferHandle,
    pub z_scale: BufferHandle,
}

impl FeatureBuffers {
    pub fn from_parts(geometry: GeometryBuffers, tint: BufferHandle, z_scale: BufferHandle) -> Self {
        Self {
            vertex: geometry.vertex,
            normal: geometry.normal,
            color: geometry.color,
            tex_coord: geometry.tex_coord,
            height: geometry.height,
            picking: geometry.picking,
            tint,
            z_scale,
        }
    }

    pub fn all(&self) -> [BufferHandle; 8] {
        [
            self.vertex,
            self.normal,
            self.color,
            self.tex_coord,
            self.height,
            self.picking,
            self.tint,
            self.z_scale,
        ]
    }
}

/// One renderable map feature: transform, zoom range, decode state, GPU
/// buffers, and fade progress. Driven by [`crate::FeatureSet`].
pub struct Feature {
    pub(crate) kind: String,
    pub(crate) url: String,
    pub(crate) options: FeatureOptions,
    pub(crate) transform: FeatureTransform,
    pub(crate) zoom_range: ZoomRange,
    /// Set once on decode success, immutable afterwards.
    pub(crate) position: Option<GeoPoint>,
    /// Last frame's camera-relative offset in degrees.
    pub(crate) previous_offset: Vec2,
    pub(crate) items: Vec<FeatureItem>,
    pub(crate) state: ReadyState,
    /// Starts saturated; the Ready transition resets it to 0 so the fade
    /// runs exactly once, on arrival.
    pub(crate) fade: f64,
    pub(crate) cascade: Option<BufferCascade>,
    pub(crate) buffers: Option<FeatureBuffers>,
    pub(crate) callback: Option<LoadCallback>,
    pub(crate) load: Option<LoadId>,
}

impl Feature {
    pub(crate) fn new(
        kind: String,
        url: String,
        options: FeatureOptions,
        ctx: &WorldContext,
        callback: Option<LoadCallback>,
    ) -> Self {
        let transform =
            FeatureTransform::new(options.elevation, options.scale, options.rotation_deg);
        let zoom_range = ZoomRange::resolve(options.min_zoom, options.max_zoom, ctx.zoom_bounds);
        Self {
            kind,
            url,
            options,
            transform,
            zoom_range,
            position: None,
            previous_offset: Vec2::zero(),
            items: Vec::new(),
            state: ReadyState::Loading,
            fade: 1.0,
            cascade: None,
            buffers: None,
            callback,
            load: None,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ReadyState {
        self.state
    }

    pub fn zoom_range(&self) -> ZoomRange {
        self.zoom_range
    }

    pub fn position(&self) -> Option<GeoPoint> {
        self.position
    }

    pub fn items(&self) -> &[FeatureItem] {
        &self.items
    }

    /// The complete buffer set, present only from Ready until destroy.
    pub fn buffers(&self) -> Option<&FeatureBuffers> {
        self.buffers.as_ref()
    }

    /// The camera-relative model matrix for this frame.
    ///
    /// Meaningful only once the decoded position is known; returns `None`
    /// while still loading. The camera and feature positions are compared in
    /// degrees, the delta against last frame's offset is converted to meters
    /// (with the meridian-convergence correction on the longitude axis) and
    /// appended to the transform.
    pub fn current_matrix(&mut self, ctx: &WorldContext) -> Option<&Mat4> {
        let position = self.position?;

        let curr_x = position.lon_deg - ctx.camera_position.lon_deg;
        let curr_y = position.lat_deg - ctx.camera_position.lat_deg;
        let dx = curr_x - self.previous_offset.x;
        let dy = curr_y - self.previous_offset.y;
        self.previous_offset = Vec2::new(curr_x, curr_y);

        let per_degree_lon = meters_per_degree_longitude(ctx.camera_position.lat_rad());
        Some(
            self.transform
                .advance(dx * per_degree_lon, -dy * METERS_PER_DEGREE_LATITUDE),
        )
    }

    /// Samples and advances the fade-in.
    ///
    /// Returns the pre-increment value; monotonically non-decreasing and
    /// saturating at exactly 1, after which calls have no further effect.
    pub fn fade_weight(&mut self, config: &FadeConfig) -> FadeWeight {
        if self.fade >= 1.0 {
            return FadeWeight {
                value: 1.0,
                animating: false,
            };
        }

        let value = self.fade;
        self.fade = (self.fade + config.increment()).min(1.0);
        FadeWeight {
            value,
            animating: true,
        }
    }
}
