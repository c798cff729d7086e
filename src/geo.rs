//! Planar distance approximation in latitude/longitude space.
//!
//! Squared distance from the pythagorean theorem over kilometers of
//! latitude change (near constant) and kilometers of longitude change at
//! a reference latitude. Far cheaper than spherical math and accurate to
//! well under 1% for points within a few hundred kilometers, away from
//! the poles. Not valid for point pairs crossing 180 degrees longitude;
//! callers must not pass antimeridian-spanning pairs.

/// Kilometers per degree of latitude.
pub const KM_PER_LAT_DEGREE: f64 = 110.567;

/// Kilometers per degree of longitude at a latitude. Maximal at the
/// equator, shrinking toward the poles.
pub fn km_per_lng_degree(lat: f64) -> f64 {
    KM_PER_LAT_DEGREE * lat.to_radians().cos()
}

/// Approximates squared distances from a fixed test point. Used when many
/// candidate positions are checked against one location: the kilometers
/// per degree of longitude are computed once.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceApproximator {
    center_lat: f64,
    center_lng: f64,
    km_per_lng_degree: f64,
}

impl DistanceApproximator {
    pub fn new(lat: f64, lng: f64) -> Self {
        let mut approx = Self::default();
        approx.set_test_point(lat, lng);
        approx
    }

    /// Set the test point and precompute km per degree of longitude at
    /// its latitude.
    pub fn set_test_point(&mut self, lat: f64, lng: f64) {
        self.center_lat = lat;
        self.center_lng = lng;
        self.km_per_lng_degree = km_per_lng_degree(lat);
    }

    /// Squared distance in km² between the test point and the supplied
    /// position. Squared so comparison-only callers skip the sqrt.
    pub fn distance_squared(&self, lat: f64, lng: f64) -> f64 {
        let dlat = (lat - self.center_lat) * KM_PER_LAT_DEGREE;
        let dlng = (lng - self.center_lng) * self.km_per_lng_degree;
        dlat * dlat + dlng * dlng
    }

    /// Squared distance in km² between two positions, using the mid
    /// latitude of the pair for the longitude scale.
    pub fn distance_squared_between(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
        let dlat = (lat2 - lat1) * KM_PER_LAT_DEGREE;
        let dlng = (lng2 - lng1) * km_per_lng_degree((lat1 + lat2) * 0.5);
        dlat * dlat + dlng * dlng
    }
}
