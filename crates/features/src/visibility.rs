/// Default zoom range for features that do not specify one.
pub const DEFAULT_MIN_ZOOM: f64 = 15.0;
pub const DEFAULT_MAX_ZOOM: f64 = 22.0;

/// Process-wide zoom limits, carried by [`crate::WorldContext`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ZoomBounds {
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for ZoomBounds {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

/// Resolved per-feature visibility range. Always `min <= max`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl ZoomRange {
    /// Clamps the requested range against the process-wide bounds.
    ///
    /// An inverted range after clamping is a configuration mistake, not a
    /// fault: it falls back to the unclamped defaults so the feature stays
    /// visible under normal circumstances instead of silently disappearing.
    pub fn resolve(opt_min: Option<f64>, opt_max: Option<f64>, bounds: ZoomBounds) -> Self {
        let min = opt_min.unwrap_or(DEFAULT_MIN_ZOOM).max(bounds.min_zoom);
        let max = opt_max.unwrap_or(DEFAULT_MAX_ZOOM).min(bounds.max_zoom);

        if min > max {
            return Self {
                min: DEFAULT_MIN_ZOOM,
                max: DEFAULT_MAX_ZOOM,
            };
        }

        Self { min, max }
    }

    pub fn contains(&self, zoom: f64) -> bool {
        zoom >= self.min && zoom <= self.max
    }
}
