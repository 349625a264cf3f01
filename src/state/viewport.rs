//! The pan/zoom camera over the Web Mercator plane. Owned by the sketch
//! canvas for its whole lifetime; all screen↔geographic transforms go
//! through here.

use crate::geo::{self, LatLng, TILE_SIZE, ZOOM_MAX, ZOOM_MIN};

/// Default locality the console opens on (Cheongju city center); also the
/// qualifier appended to geocoder queries.
pub const HOME_CENTER: LatLng = LatLng { lat: 36.6424, lng: 127.489 };
pub const DEFAULT_ZOOM: f64 = 15.0;
/// Close-in zoom applied after a successful address search.
pub const SEARCH_ZOOM: f64 = 17.0;

#[derive(Debug, Clone)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
    pub panning: bool,
    pub last_x: f64,
    pub last_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: HOME_CENTER,
            zoom: DEFAULT_ZOOM,
            panning: false,
            last_x: 0.0,
            last_y: 0.0,
        }
    }
}

impl Viewport {
    /// Width of the whole Mercator square in screen pixels at the current zoom.
    pub fn scale(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    pub fn latlng_to_screen(&self, pos: LatLng, w: f64, h: f64) -> (f64, f64) {
        let s = self.scale();
        let (cx, cy) = geo::project(self.center);
        let (x, y) = geo::project(pos);
        ((x - cx) * s + w * 0.5, (y - cy) * s + h * 0.5)
    }

    pub fn screen_to_latlng(&self, x: f64, y: f64, w: f64, h: f64) -> LatLng {
        let s = self.scale();
        let (cx, cy) = geo::project(self.center);
        let wx = cx + (x - w * 0.5) / s;
        let wy = (cy + (y - h * 0.5) / s).clamp(0.0, 1.0);
        geo::unproject(wx, wy)
    }

    /// Shift the view by a pointer movement: content follows the pointer,
    /// so the center moves the opposite way.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let s = self.scale();
        let (cx, cy) = geo::project(self.center);
        self.center = geo::unproject(cx - dx / s, (cy - dy / s).clamp(0.0, 1.0));
    }

    /// Multiply the zoom by `factor`, keeping the geographic point under
    /// the screen anchor fixed.
    pub fn zoom_around(&mut self, factor: f64, anchor_x: f64, anchor_y: f64, w: f64, h: f64) {
        let anchor = self.screen_to_latlng(anchor_x, anchor_y, w, h);
        let new_zoom = (self.zoom + factor.log2()).clamp(ZOOM_MIN, ZOOM_MAX);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        self.zoom = new_zoom;
        // Re-center so the anchor point lands back under the cursor.
        let (ax, ay) = self.latlng_to_screen(anchor, w, h);
        self.pan(anchor_x - ax, anchor_y - ay);
    }

    pub fn recenter(&mut self, pos: LatLng, zoom: f64) {
        self.center = pos;
        self.zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: f64 = 800.0;
    const H: f64 = 600.0;

    #[test]
    fn center_maps_to_screen_midpoint() {
        let vp = Viewport::default();
        let (x, y) = vp.latlng_to_screen(vp.center, W, H);
        assert!((x - W * 0.5).abs() < 1e-9);
        assert!((y - H * 0.5).abs() < 1e-9);
    }

    #[test]
    fn screen_transform_round_trips() {
        let vp = Viewport::default();
        let pos = vp.screen_to_latlng(123.0, 456.0, W, H);
        let (x, y) = vp.latlng_to_screen(pos, W, H);
        assert!((x - 123.0).abs() < 1e-6);
        assert!((y - 456.0).abs() < 1e-6);
    }

    #[test]
    fn pan_moves_content_with_the_pointer() {
        let mut vp = Viewport::default();
        let before = vp.latlng_to_screen(HOME_CENTER, W, H);
        vp.pan(40.0, -25.0);
        let after = vp.latlng_to_screen(HOME_CENTER, W, H);
        assert!((after.0 - before.0 - 40.0).abs() < 1e-6);
        assert!((after.1 - before.1 + 25.0).abs() < 1e-6);
    }

    #[test]
    fn zoom_around_keeps_the_anchor_fixed() {
        let mut vp = Viewport::default();
        let anchor = (200.0, 150.0);
        let pinned = vp.screen_to_latlng(anchor.0, anchor.1, W, H);
        vp.zoom_around(2.0, anchor.0, anchor.1, W, H);
        let (x, y) = vp.latlng_to_screen(pinned, W, H);
        assert!((x - anchor.0).abs() < 1e-6);
        assert!((y - anchor.1).abs() < 1e-6);
    }

    #[test]
    fn zoom_is_clamped_to_bounds() {
        let mut vp = Viewport::default();
        vp.zoom_around(1e9, 0.0, 0.0, W, H);
        assert_eq!(vp.zoom, ZOOM_MAX);
        vp.zoom_around(1e-9, 0.0, 0.0, W, H);
        assert_eq!(vp.zoom, ZOOM_MIN);
    }
}
