use foundation::math::{Mat4, Vec3};

/// Model matrix owned by a single feature.
///
/// Composed exactly once at construction: translate by elevation, uniform
/// scale, then rotate about Z by the negated angle (positive user rotation
/// is clockwise in the source data). Never recomposed afterwards; per-frame
/// camera-relative repositioning only appends incremental translations.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FeatureTransform {
    matrix: Mat4,
}

impl FeatureTransform {
    pub fn new(elevation: f64, scale: f64, rotation_deg: f64) -> Self {
        let mut matrix = Mat4::identity();
        matrix
            .translate(Vec3::new(0.0, 0.0, elevation))
            .scale_uniform(scale)
            .rotate_z(-rotation_deg.to_radians());
        Self { matrix }
    }

    /// Appends a world-space translation for this frame's camera delta.
    ///
    /// The returned reference is valid until the next `advance` call.
    pub fn advance(&mut self, dx: f64, dy: f64) -> &Mat4 {
        self.matrix.translate(Vec3::new(dx, dy, 0.0));
        &self.matrix
    }

    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }
}
