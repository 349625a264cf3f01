//! Raster tile layer: fetches OSM-style z/x/y tiles into image elements,
//! caches them, and blits the visible range onto the canvas. The canvas is
//! a pure consumer of the tile provider; failed tiles are logged and left
//! blank rather than retried in a loop.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::geo::{ZOOM_MAX, ZOOM_MIN};
use crate::state::Viewport;
use crate::util::clog;

pub const TILE_URL_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const ATTRIBUTION: &str = "© OpenStreetMap contributors";

/// Cache eviction kicks in past this many resident tiles.
const CACHE_SOFT_CAP: usize = 512;

type TileKey = (u8, u32, u32);

enum TileSlot {
    Loading(HtmlImageElement),
    Ready(HtmlImageElement),
    Failed,
}

pub struct TileLayer {
    slots: Rc<RefCell<HashMap<TileKey, TileSlot>>>,
    /// Invoked whenever a tile finishes loading, so the view can redraw.
    on_ready: Rc<dyn Fn()>,
}

impl TileLayer {
    pub fn new(on_ready: Rc<dyn Fn()>) -> Self {
        Self {
            slots: Rc::new(RefCell::new(HashMap::new())),
            on_ready,
        }
    }

    /// Draw every tile intersecting the viewport; missing tiles start
    /// loading and are skipped this frame.
    pub fn draw(&self, ctx: &CanvasRenderingContext2d, vp: &Viewport, w: f64, h: f64) {
        let z = vp.zoom.round().clamp(ZOOM_MIN, ZOOM_MAX) as u8;
        let n = 1u32 << z;
        let nf = n as f64;
        // On-screen size of one tile at the (possibly fractional) zoom.
        let tile_px = vp.scale() / nf;

        let (cx, cy) = crate::geo::project(vp.center);
        let scale = vp.scale();
        let wx0 = cx - w * 0.5 / scale;
        let wy0 = cy - h * 0.5 / scale;
        let wx1 = cx + w * 0.5 / scale;
        let wy1 = cy + h * 0.5 / scale;

        let tx0 = (wx0 * nf).floor() as i64;
        let tx1 = (wx1 * nf).floor() as i64;
        let ty0 = (wy0 * nf).floor() as i64;
        let ty1 = (wy1 * nf).floor() as i64;

        for ty in ty0..=ty1 {
            if ty < 0 || ty >= n as i64 {
                continue;
            }
            for tx in tx0..=tx1 {
                // Wrap horizontally across the antimeridian.
                let wrapped = tx.rem_euclid(n as i64) as u32;
                let key = (z, wrapped, ty as u32);
                let sx = (tx as f64 / nf - cx) * scale + w * 0.5;
                let sy = (ty as f64 / nf - cy) * scale + h * 0.5;
                let mut slots = self.slots.borrow_mut();
                match slots.get(&key) {
                    Some(TileSlot::Ready(img)) => {
                        let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                            img, sx, sy, tile_px, tile_px,
                        );
                    }
                    Some(TileSlot::Loading(_)) | Some(TileSlot::Failed) => {}
                    None => {
                        if let Some(slot) = self.request(key) {
                            slots.insert(key, slot);
                        }
                    }
                }
            }
        }
        self.evict(z);
    }

    fn request(&self, key: TileKey) -> Option<TileSlot> {
        let (z, x, y) = key;
        let img = HtmlImageElement::new().ok()?;
        // Keep the canvas untainted so to_data_url stays usable.
        img.set_cross_origin(Some("anonymous"));
        let url = TILE_URL_TEMPLATE
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string());

        let onload = {
            let slots = self.slots.clone();
            let on_ready = self.on_ready.clone();
            let img = img.clone();
            Closure::wrap(Box::new(move || {
                slots.borrow_mut().insert(key, TileSlot::Ready(img.clone()));
                on_ready();
            }) as Box<dyn FnMut()>)
        };
        img.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();

        let onerror = {
            let slots = self.slots.clone();
            Closure::wrap(Box::new(move || {
                clog(&format!("tile load failed: {}/{}/{}", key.0, key.1, key.2));
                slots.borrow_mut().insert(key, TileSlot::Failed);
            }) as Box<dyn FnMut()>)
        };
        img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();

        img.set_src(&url);
        Some(TileSlot::Loading(img))
    }

    /// Drop tiles far from the current zoom once the cache grows large.
    fn evict(&self, current_z: u8) {
        let mut slots = self.slots.borrow_mut();
        if slots.len() <= CACHE_SOFT_CAP {
            return;
        }
        slots.retain(|(z, _, _), slot| {
            matches!(slot, TileSlot::Loading(_)) || (current_z as i16 - *z as i16).abs() <= 2
        });
    }
}
