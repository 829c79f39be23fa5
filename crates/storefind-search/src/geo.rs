//! Great-circle distance and the distance-range (annulus) filter.

use storefind_core::LatLng;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers.
#[must_use]
pub fn distance_km(a: LatLng, b: LatLng) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Ring `[(range-1) * width, range * width)` around the search center.
/// Range 1 is the full disc `[0, width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annulus {
    pub range: u32,
    pub width_m: u32,
}

impl Annulus {
    #[must_use]
    pub const fn new(range: u32, width_m: u32) -> Self {
        Self { range, width_m }
    }

    /// Outer edge in meters; also the radius sent to the provider.
    #[must_use]
    pub fn outer_radius_m(&self) -> u32 {
        self.range.saturating_mul(self.width_m)
    }

    #[must_use]
    pub fn contains(&self, distance_km: f64) -> bool {
        let width_km = f64::from(self.width_m) / 1000.0;
        let outer = f64::from(self.range) * width_km;
        if self.range <= 1 {
            distance_km < outer
        } else {
            let inner = f64::from(self.range - 1) * width_km;
            distance_km >= inner && distance_km < outer
        }
    }
}
