/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;

/// Linear meters spanned by one degree of latitude on the WGS84 sphere.
pub const METERS_PER_DEGREE_LATITUDE: f64 = WGS84_A * std::f64::consts::PI / 180.0;

/// Linear meters spanned by one degree of longitude at the given latitude.
///
/// Meridians converge toward the poles, so a degree of longitude shrinks by
/// `cos(latitude)`.
pub fn meters_per_degree_longitude(lat_rad: f64) -> f64 {
    METERS_PER_DEGREE_LATITUDE * lat_rad.cos()
}

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeoPoint {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    pub fn lat_rad(&self) -> f64 {
        self.lat_deg.to_radians()
    }
}
