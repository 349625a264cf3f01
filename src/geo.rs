//! Web Mercator math shared by the viewport, the tile layer and the
//! primitive rendering. Pure functions only, so the whole module is
//! testable off the wasm target.

/// Pixel size of one slippy tile.
pub const TILE_SIZE: f64 = 256.0;

/// Earth equatorial circumference in meters (WGS-84).
pub const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;

/// Web Mercator latitude cutoff.
pub const MAX_LAT_DEG: f64 = 85.051_128_779_806_6;

pub const ZOOM_MIN: f64 = 3.0;
pub const ZOOM_MAX: f64 = 19.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Project a geographic position onto the unit Mercator square
/// (x, y in [0, 1], y grows southward).
pub fn project(pos: LatLng) -> (f64, f64) {
    let lat = pos.lat.clamp(-MAX_LAT_DEG, MAX_LAT_DEG).to_radians();
    let x = (pos.lng + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0;
    (x, y)
}

/// Inverse of [`project`].
pub fn unproject(x: f64, y: f64) -> LatLng {
    let lng = x * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * y);
    let lat = n.sinh().atan().to_degrees();
    LatLng { lat, lng }
}

/// Ground resolution at the given latitude and (fractional) zoom level.
pub fn meters_per_pixel(lat_deg: f64, zoom: f64) -> f64 {
    EARTH_CIRCUMFERENCE_M * lat_deg.to_radians().cos() / (TILE_SIZE * 2f64.powf(zoom))
}

/// Convert a ground distance in meters to an on-screen pixel length.
pub fn meters_to_pixels(meters: f64, lat_deg: f64, zoom: f64) -> f64 {
    meters / meters_per_pixel(lat_deg, zoom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_unproject_round_trip() {
        let pos = LatLng::new(36.6424, 127.489);
        let (x, y) = project(pos);
        let back = unproject(x, y);
        assert!((back.lat - pos.lat).abs() < 1e-9);
        assert!((back.lng - pos.lng).abs() < 1e-9);
    }

    #[test]
    fn project_is_origin_at_null_island() {
        let (x, y) = project(LatLng::new(0.0, 0.0));
        assert!((x - 0.5).abs() < 1e-12);
        assert!((y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn projected_y_grows_southward() {
        let (_, y_north) = project(LatLng::new(40.0, 0.0));
        let (_, y_south) = project(LatLng::new(-40.0, 0.0));
        assert!(y_north < 0.5 && y_south > 0.5);
    }

    #[test]
    fn resolution_halves_per_zoom_level() {
        let coarse = meters_per_pixel(36.0, 12.0);
        let fine = meters_per_pixel(36.0, 13.0);
        assert!((coarse / fine - 2.0).abs() < 1e-9);
    }

    #[test]
    fn equator_resolution_matches_reference() {
        // ~156543 m/px at zoom 0 on the equator.
        let r = meters_per_pixel(0.0, 0.0);
        assert!((r - 156_543.033).abs() < 0.1);
    }
}
