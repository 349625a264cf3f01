use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, TouchEvent};
use yew::prelude::*;

use crate::geo;
use crate::map::TileLayer;
use crate::map::geocode::{self, GeocodeOutcome};
use crate::map::tiles::ATTRIBUTION;
use crate::model::{ElementId, ElementKind, SketchAction, SketchState};
use crate::snapshot::{self, CAPTURE_DEBOUNCE_MS, CAPTURE_HEIGHT, CAPTURE_WIDTH, CaptureSeq, Debounce, MAP_SETTLE_MS};
use crate::state::drag::DRAG_THRESHOLD_PX;
use crate::state::viewport::SEARCH_ZOOM;
use crate::state::{DragState, TouchState, Viewport};
use crate::util::clog;

use super::{
    camera_controls::CameraControls, legend_panel::LegendPanel, radius_editor::RadiusEditor,
    search_bar::SearchBar, tool_panel::ToolPanel,
};

#[derive(Properties, PartialEq, Clone)]
pub struct SketchViewProps {
    pub sketch: UseReducerHandle<SketchState>,
    /// Push-based snapshot hand-off to the container (report exporter side).
    pub on_snapshot: Callback<String>,
    /// Bumped by the container to request an on-demand centered capture.
    pub export_req: u64,
}

const POINT_HIT_PX: f64 = 10.0;
const UNIT_HIT_PX: f64 = 14.0;

/// The global undo shortcut yields to elements with their own edit history.
fn undo_shortcut_allowed(active_tag: &str) -> bool {
    !matches!(active_tag, "INPUT" | "TEXTAREA")
}

/// Topmost element under the cursor, scanning markers before zones so a
/// marker sitting on a zone wins the press.
fn hit_test(
    state: &SketchState,
    vp: &Viewport,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
) -> Option<(ElementKind, ElementId)> {
    let dist = |px: f64, py: f64| ((px - x).powi(2) + (py - y).powi(2)).sqrt();
    for u in state.units.iter().rev() {
        let (sx, sy) = vp.latlng_to_screen(u.pos, w, h);
        if dist(sx, sy) <= UNIT_HIT_PX {
            return Some((ElementKind::Unit, u.id));
        }
    }
    for p in state.points.iter().rev() {
        let (sx, sy) = vp.latlng_to_screen(p.pos, w, h);
        if dist(sx, sy) <= POINT_HIT_PX {
            return Some((ElementKind::Point, p.id));
        }
    }
    for t in state.texts.iter().rev() {
        let (sx, sy) = vp.latlng_to_screen(t.pos, w, h);
        // Rough glyph box; fine for grabbing a label.
        let half_len = 4.0 * t.text.len() as f64 + 6.0;
        let (hx, hy) = if t.vertical { (10.0, half_len) } else { (half_len, 10.0) };
        if (sx - x).abs() <= hx && (sy - y).abs() <= hy {
            return Some((ElementKind::Text, t.id));
        }
    }
    for z in state.zones.iter().rev() {
        let (sx, sy) = vp.latlng_to_screen(z.center, w, h);
        let r = geo::meters_to_pixels(z.radius_m, z.center.lat, vp.zoom);
        if dist(sx, sy) <= r {
            return Some((ElementKind::Zone, z.id));
        }
    }
    None
}

/// Draw the whole scene. `chrome` adds the live-view-only bits (selection
/// ring, attribution) that are excluded from captures.
fn render_scene(
    ctx: &CanvasRenderingContext2d,
    vp: &Viewport,
    state: &SketchState,
    tiles: &TileLayer,
    w: f64,
    h: f64,
    chrome: bool,
) {
    ctx.set_fill_style_str("#0e1116");
    ctx.fill_rect(0.0, 0.0, w, h);
    tiles.draw(ctx, vp, w, h);

    // Zones under everything else.
    for z in &state.zones {
        let (sx, sy) = vp.latlng_to_screen(z.center, w, h);
        let r = geo::meters_to_pixels(z.radius_m, z.center.lat, vp.zoom);
        ctx.begin_path();
        ctx.arc(sx, sy, r, 0.0, std::f64::consts::PI * 2.0).ok();
        ctx.set_global_alpha(0.18);
        ctx.set_fill_style_str(z.category.color());
        ctx.fill();
        ctx.set_global_alpha(1.0);
        ctx.set_stroke_style_str(z.category.color());
        ctx.set_line_width(2.0);
        ctx.stroke();
        if chrome && state.selected_zone == Some(z.id) {
            ctx.begin_path();
            ctx.arc(sx, sy, r + 4.0, 0.0, std::f64::consts::PI * 2.0).ok();
            ctx.set_stroke_style_str("#ffffff");
            ctx.set_line_width(1.5);
            ctx.stroke();
        }
    }

    for p in &state.points {
        let (sx, sy) = vp.latlng_to_screen(p.pos, w, h);
        ctx.set_stroke_style_str("#0e1116");
        ctx.set_line_width(4.0);
        crosshair(ctx, sx, sy);
        ctx.set_stroke_style_str("#ffffff");
        ctx.set_line_width(2.0);
        crosshair(ctx, sx, sy);
    }

    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    for u in &state.units {
        let (sx, sy) = vp.latlng_to_screen(u.pos, w, h);
        ctx.begin_path();
        ctx.arc(sx, sy, 12.0, 0.0, std::f64::consts::PI * 2.0).ok();
        ctx.set_fill_style_str(u.category.color());
        ctx.fill();
        ctx.set_stroke_style_str("#ffffff");
        ctx.set_line_width(2.0);
        ctx.stroke();
        ctx.set_fill_style_str("#ffffff");
        ctx.set_font("bold 12px sans-serif");
        ctx.fill_text(u.category.glyph(), sx, sy).ok();
        // Label badge under the glyph.
        ctx.set_font("11px sans-serif");
        let bw = ctx
            .measure_text(&u.label)
            .map(|m| m.width())
            .unwrap_or(40.0)
            + 10.0;
        ctx.set_fill_style_str("rgba(14,17,22,0.85)");
        ctx.fill_rect(sx - bw * 0.5, sy + 15.0, bw, 16.0);
        ctx.set_fill_style_str("#ffffff");
        ctx.fill_text(&u.label, sx, sy + 23.0).ok();
    }

    ctx.set_font("bold 14px sans-serif");
    for t in &state.texts {
        let (sx, sy) = vp.latlng_to_screen(t.pos, w, h);
        ctx.save();
        ctx.translate(sx, sy).ok();
        if t.vertical {
            ctx.rotate(-std::f64::consts::FRAC_PI_2).ok();
        }
        // Street-name styling: dark text over a light halo.
        ctx.set_stroke_style_str("rgba(255,255,255,0.85)");
        ctx.set_line_width(3.0);
        ctx.stroke_text(&t.text, 0.0, 0.0).ok();
        ctx.set_fill_style_str("#1f2328");
        ctx.fill_text(&t.text, 0.0, 0.0).ok();
        ctx.restore();
    }

    if chrome {
        ctx.set_font("10px sans-serif");
        ctx.set_text_align("right");
        ctx.set_text_baseline("bottom");
        ctx.set_fill_style_str("rgba(255,255,255,0.75)");
        let bw = ctx
            .measure_text(ATTRIBUTION)
            .map(|m| m.width())
            .unwrap_or(160.0)
            + 8.0;
        ctx.fill_rect(w - bw, h - 16.0, bw, 16.0);
        ctx.set_fill_style_str("#1f2328");
        ctx.fill_text(ATTRIBUTION, w - 4.0, h - 3.0).ok();
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
    }
}

fn crosshair(ctx: &CanvasRenderingContext2d, sx: f64, sy: f64) {
    ctx.begin_path();
    ctx.move_to(sx - 8.0, sy);
    ctx.line_to(sx + 8.0, sy);
    ctx.move_to(sx, sy - 8.0);
    ctx.line_to(sx, sy + 8.0);
    ctx.stroke();
    ctx.begin_path();
    ctx.arc(sx, sy, 3.0, 0.0, std::f64::consts::PI * 2.0).ok();
    ctx.stroke();
}

#[function_component(SketchView)]
pub fn sketch_view(props: &SketchViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let viewport = use_mut_ref(Viewport::default);
    let drag = use_mut_ref(DragState::default);
    let touch_state = use_mut_ref(TouchState::default);
    let tiles_ref = use_mut_ref(|| None::<TileLayer>);
    let draw_ref = use_mut_ref(|| None::<Rc<dyn Fn()>>);
    let capture_ref = use_mut_ref(|| None::<Rc<dyn Fn(bool)>>);
    let debounce = use_mut_ref(|| Debounce::new(CAPTURE_DEBOUNCE_MS));
    let sketch_ref = use_mut_ref(|| props.sketch.clone());
    let notice = use_state(|| None::<String>);

    // Effect: on each version bump, refresh the stored handle and redraw.
    {
        let sketch_ref = sketch_ref.clone();
        let current_handle = props.sketch.clone();
        let draw_ref_local = draw_ref.clone();
        let version = props.sketch.version;
        use_effect_with(version, move |_| {
            *sketch_ref.borrow_mut() = current_handle.clone();
            if let Some(f) = &*draw_ref_local.borrow() {
                f();
            }
            || ()
        });
    }

    // Effect: mutating operations (create/undo/clear/radius) re-rasterize,
    // debounced.
    {
        let capture_ref = capture_ref.clone();
        let debounce = debounce.clone();
        let r#gen = props.sketch.capture_gen;
        use_effect_with(r#gen, move |_| {
            if r#gen > 0 {
                if let Some(cap) = &*capture_ref.borrow() {
                    let cap = cap.clone();
                    debounce.borrow().schedule(move || cap(false));
                }
            }
            || ()
        });
    }

    // Effect: on-demand centered capture for export.
    {
        let capture_ref = capture_ref.clone();
        let req = props.export_req;
        use_effect_with(req, move |_| {
            if req > 0 {
                if let Some(cap) = &*capture_ref.borrow() {
                    cap(true);
                }
            }
            || ()
        });
    }

    // Effect: search notices fade after a few seconds.
    {
        let notice_handle = notice.clone();
        let current = (*notice).clone();
        use_effect_with(current, move |n| {
            let timer = n.as_ref().map(|_| {
                Timeout::new(4000, move || notice_handle.set(None))
            });
            move || drop(timer)
        });
    }

    // Main mount effect: sizing, tile layer, draw/capture closures, events.
    {
        let canvas_ref = canvas_ref.clone();
        let viewport = viewport.clone();
        let drag = drag.clone();
        let touch_state = touch_state.clone();
        let tiles_ref = tiles_ref.clone();
        let draw_ref_setup = draw_ref.clone();
        let capture_ref_setup = capture_ref.clone();
        let debounce_setup = debounce.clone();
        let sketch_ref_setup = sketch_ref.clone();
        let sketch = props.sketch.clone();
        let on_snapshot = props.on_snapshot.clone();
        use_effect_with((), move |_| {
            let window = web_sys::window().expect("window");
            let document = window.document().expect("document");
            let canvas: HtmlCanvasElement = canvas_ref.cast::<HtmlCanvasElement>().expect("canvas");

            let compute_and_apply_canvas_size = {
                let canvas = canvas.clone();
                let document = document.clone();
                let window = window.clone();
                move || {
                    let bar_height: f64 = document
                        .get_element_by_id("top-bar")
                        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
                        .map(|el| el.client_height() as f64)
                        .unwrap_or(0.0);
                    let width = window
                        .inner_width()
                        .ok()
                        .and_then(|v| v.as_f64())
                        .unwrap_or(800.0);
                    let height = window
                        .inner_height()
                        .ok()
                        .and_then(|v| v.as_f64())
                        .unwrap_or(600.0)
                        - bar_height;
                    canvas.set_width(width.max(0.0) as u32);
                    canvas.set_height(height.max(0.0) as u32);
                }
            };
            compute_and_apply_canvas_size();

            // Tile layer redraws through draw_ref whenever a tile lands.
            {
                let draw_ref = draw_ref_setup.clone();
                let on_ready: Rc<dyn Fn()> = Rc::new(move || {
                    if let Some(f) = &*draw_ref.borrow() {
                        f();
                    }
                });
                *tiles_ref.borrow_mut() = Some(TileLayer::new(on_ready));
            }

            // Draw closure.
            let draw_closure: Rc<dyn Fn()> = {
                let canvas = canvas.clone();
                let viewport = viewport.clone();
                let sketch_ref = sketch_ref_setup.clone();
                let tiles_ref = tiles_ref.clone();
                Rc::new(move || {
                    if !canvas.is_connected() {
                        return;
                    }
                    let ctx = match canvas.get_context("2d").ok().flatten() {
                        Some(c) => c.dyn_into::<CanvasRenderingContext2d>().unwrap(),
                        None => return,
                    };
                    let w = canvas.width() as f64;
                    let h = canvas.height() as f64;
                    let vp = viewport.borrow().clone();
                    let handle = sketch_ref.borrow();
                    let state = (**handle).clone();
                    drop(handle);
                    if let Some(tiles) = &*tiles_ref.borrow() {
                        render_scene(&ctx, &vp, &state, tiles, w, h, true);
                    }
                })
            };
            *draw_ref_setup.borrow_mut() = Some(draw_closure.clone());
            (draw_closure)();

            // Capture closure: renders into an offscreen canvas so panels
            // and the radius editor never appear in the exported raster.
            let seq = Rc::new(CaptureSeq::default());
            let capture_closure: Rc<dyn Fn(bool)> = {
                let canvas = canvas.clone();
                let document = document.clone();
                let viewport = viewport.clone();
                let sketch_ref = sketch_ref_setup.clone();
                let tiles_ref = tiles_ref.clone();
                let on_snapshot = on_snapshot.clone();
                Rc::new(move |centered: bool| {
                    if !canvas.is_connected() {
                        return;
                    }
                    let seq_no = seq.issue();
                    let off: HtmlCanvasElement = match document
                        .create_element("canvas")
                        .ok()
                        .and_then(|el| el.dyn_into().ok())
                    {
                        Some(c) => c,
                        None => return,
                    };
                    off.set_width(CAPTURE_WIDTH);
                    off.set_height(CAPTURE_HEIGHT);
                    let ctx = match off.get_context("2d").ok().flatten() {
                        Some(c) => c.dyn_into::<CanvasRenderingContext2d>().unwrap(),
                        None => return,
                    };
                    let handle = sketch_ref.borrow();
                    let state = (**handle).clone();
                    drop(handle);
                    let mut vp = viewport.borrow().clone();
                    if centered {
                        if let Some(center) = state.bounding_center() {
                            vp.center = center;
                        }
                    }
                    if let Some(tiles) = &*tiles_ref.borrow() {
                        render_scene(
                            &ctx,
                            &vp,
                            &state,
                            tiles,
                            CAPTURE_WIDTH as f64,
                            CAPTURE_HEIGHT as f64,
                            false,
                        );
                    }
                    if let Some(url) = snapshot::encode_png(&off) {
                        if seq.try_publish(seq_no) {
                            on_snapshot.emit(url);
                        }
                    }
                })
            };
            *capture_ref_setup.borrow_mut() = Some(capture_closure.clone());

            // First capture after tiles have had a moment to settle.
            {
                let cap = capture_closure.clone();
                Timeout::new(MAP_SETTLE_MS, move || cap(false)).forget();
            }

            // Distinguishes a background click (deselect) from a pan.
            let pan_start = Rc::new(Cell::new((0.0f64, 0.0f64)));
            let pan_moved = Rc::new(Cell::new(false));

            let schedule_viewport_capture = {
                let debounce = debounce_setup.clone();
                let cap = capture_closure.clone();
                Rc::new(move || {
                    let cap = cap.clone();
                    debounce.borrow().schedule(move || cap(false));
                })
            };

            // Wheel: zoom anchored at the cursor.
            let wheel_cb = {
                let canvas = canvas.clone();
                let viewport = viewport.clone();
                let draw_ref = draw_ref_setup.clone();
                let schedule = schedule_viewport_capture.clone();
                Closure::wrap(Box::new(move |e: web_sys::WheelEvent| {
                    e.prevent_default();
                    let w = canvas.width() as f64;
                    let h = canvas.height() as f64;
                    let factor = (-e.delta_y() * 0.001).exp();
                    viewport
                        .borrow_mut()
                        .zoom_around(factor, e.offset_x() as f64, e.offset_y() as f64, w, h);
                    if let Some(f) = &*draw_ref.borrow() {
                        f();
                    }
                    schedule();
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("wheel", wheel_cb.as_ref().unchecked_ref())
                .unwrap();

            // Mouse down: place, start an element drag, or start a pan.
            let mousedown_cb = {
                let canvas = canvas.clone();
                let viewport = viewport.clone();
                let drag = drag.clone();
                let sketch = sketch.clone();
                let sketch_ref = sketch_ref_setup.clone();
                let pan_start = pan_start.clone();
                let pan_moved = pan_moved.clone();
                Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
                    if e.button() != 0 {
                        return;
                    }
                    let x = e.offset_x() as f64;
                    let y = e.offset_y() as f64;
                    let w = canvas.width() as f64;
                    let h = canvas.height() as f64;
                    let handle = sketch_ref.borrow();
                    let state = (**handle).clone();
                    drop(handle);
                    if state.tool.is_placing() {
                        // Placement click; never a pan or a drag start.
                        let pos = viewport.borrow().screen_to_latlng(x, y, w, h);
                        sketch.dispatch(SketchAction::MapClick { pos });
                        return;
                    }
                    if let Some(target) = hit_test(&state, &viewport.borrow(), x, y, w, h) {
                        // Dragging an element suppresses map panning.
                        drag.borrow_mut().begin(target, x, y);
                        return;
                    }
                    let mut vp = viewport.borrow_mut();
                    vp.panning = true;
                    vp.last_x = e.client_x() as f64;
                    vp.last_y = e.client_y() as f64;
                    pan_start.set((vp.last_x, vp.last_y));
                    pan_moved.set(false);
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("mousedown", mousedown_cb.as_ref().unchecked_ref())
                .unwrap();

            // Mouse move: element drag or pan.
            let mousemove_cb = {
                let canvas = canvas.clone();
                let viewport = viewport.clone();
                let drag = drag.clone();
                let sketch = sketch.clone();
                let draw_ref = draw_ref_setup.clone();
                let schedule = schedule_viewport_capture.clone();
                let pan_start = pan_start.clone();
                let pan_moved = pan_moved.clone();
                Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
                    let x = e.offset_x() as f64;
                    let y = e.offset_y() as f64;
                    let w = canvas.width() as f64;
                    let h = canvas.height() as f64;
                    let dragged = drag.borrow_mut().update(x, y);
                    if let Some((kind, id)) = dragged {
                        let pos = viewport.borrow().screen_to_latlng(x, y, w, h);
                        sketch.dispatch(SketchAction::MoveElement { kind, id, pos });
                        return;
                    }
                    if drag.borrow().is_active() {
                        return;
                    }
                    let mut vp = viewport.borrow_mut();
                    if vp.panning {
                        let cx = e.client_x() as f64;
                        let cy = e.client_y() as f64;
                        let dx = cx - vp.last_x;
                        let dy = cy - vp.last_y;
                        vp.last_x = cx;
                        vp.last_y = cy;
                        vp.pan(dx, dy);
                        let (sx, sy) = pan_start.get();
                        if ((cx - sx).powi(2) + (cy - sy).powi(2)).sqrt() >= DRAG_THRESHOLD_PX {
                            pan_moved.set(true);
                        }
                        drop(vp);
                        if let Some(f) = &*draw_ref.borrow() {
                            f();
                        }
                        schedule();
                    }
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("mousemove", mousemove_cb.as_ref().unchecked_ref())
                .unwrap();

            // Mouse up: finish drags (capture only on real movement), turn
            // a movement-free background press into a deselect click.
            let mouseup_cb = {
                let viewport = viewport.clone();
                let drag = drag.clone();
                let sketch = sketch.clone();
                let debounce = debounce_setup.clone();
                let cap = capture_closure.clone();
                let pan_moved = pan_moved.clone();
                Closure::wrap(Box::new(move |_e: web_sys::MouseEvent| {
                    if let Some((target, moved)) = drag.borrow_mut().finish() {
                        if moved {
                            let cap = cap.clone();
                            debounce.borrow().schedule(move || cap(false));
                        } else if let (ElementKind::Zone, id) = target {
                            sketch.dispatch(SketchAction::SelectZone(id));
                        }
                        return;
                    }
                    let mut vp = viewport.borrow_mut();
                    if vp.panning {
                        vp.panning = false;
                        drop(vp);
                        if !pan_moved.get() {
                            sketch.dispatch(SketchAction::Deselect);
                        }
                        pan_moved.set(false);
                    }
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("mouseup", mouseup_cb.as_ref().unchecked_ref())
                .unwrap();

            let contextmenu_cb = {
                Closure::wrap(Box::new(move |e: web_sys::Event| {
                    e.prevent_default();
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback(
                    "contextmenu",
                    contextmenu_cb.as_ref().unchecked_ref(),
                )
                .unwrap();

            let resize_cb = {
                let compute_and_apply_canvas_size = compute_and_apply_canvas_size.clone();
                let draw_ref = draw_ref_setup.clone();
                Closure::wrap(Box::new(move |_e: web_sys::Event| {
                    compute_and_apply_canvas_size();
                    if let Some(f) = &*draw_ref.borrow() {
                        f();
                    }
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
                .unwrap();

            // Ctrl+Z undoes the latest placement, unless a form field has
            // focus (those keep the native text undo).
            let key_cb = {
                let sketch = sketch.clone();
                let document = document.clone();
                Closure::wrap(Box::new(move |e: web_sys::KeyboardEvent| {
                    if e.code() == "KeyZ" && (e.ctrl_key() || e.meta_key()) {
                        if let Some(el) = document.active_element() {
                            if !undo_shortcut_allowed(&el.tag_name()) {
                                return;
                            }
                        }
                        e.prevent_default();
                        sketch.dispatch(SketchAction::Undo);
                    }
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("keydown", key_cb.as_ref().unchecked_ref())
                .unwrap();

            // Touch: single finger places/drags/pans, two fingers pinch.
            let touch_start_cb = {
                let canvas_tc = canvas.clone();
                let viewport_tc = viewport.clone();
                let drag_tc = drag.clone();
                let sketch_tc = sketch.clone();
                let sketch_ref_tc = sketch_ref_setup.clone();
                let touch_state_tc = touch_state.clone();
                let pan_start = pan_start.clone();
                let pan_moved = pan_moved.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    let rect = canvas_tc.get_bounding_client_rect();
                    if e.touches().length() >= 2 {
                        if let (Some(t0), Some(t1)) = (e.touches().item(0), e.touches().item(1)) {
                            let x0 = t0.client_x() as f64 - rect.left();
                            let y0 = t0.client_y() as f64 - rect.top();
                            let x1 = t1.client_x() as f64 - rect.left();
                            let y1 = t1.client_y() as f64 - rect.top();
                            let mut ts = touch_state_tc.borrow_mut();
                            ts.pinch = true;
                            ts.single_active = false;
                            ts.start_pinch_dist =
                                ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt().max(1.0);
                            ts.start_zoom = viewport_tc.borrow().zoom;
                        }
                        e.prevent_default();
                        return;
                    }
                    if let Some(t0) = e.touches().item(0) {
                        let x = t0.client_x() as f64 - rect.left();
                        let y = t0.client_y() as f64 - rect.top();
                        let w = canvas_tc.width() as f64;
                        let h = canvas_tc.height() as f64;
                        let handle = sketch_ref_tc.borrow();
                        let state = (**handle).clone();
                        drop(handle);
                        let mut ts = touch_state_tc.borrow_mut();
                        ts.single_active = true;
                        ts.pinch = false;
                        ts.last_touch_x = x;
                        ts.last_touch_y = y;
                        drop(ts);
                        if state.tool.is_placing() {
                            let pos = viewport_tc.borrow().screen_to_latlng(x, y, w, h);
                            sketch_tc.dispatch(SketchAction::MapClick { pos });
                        } else if let Some(target) =
                            hit_test(&state, &viewport_tc.borrow(), x, y, w, h)
                        {
                            drag_tc.borrow_mut().begin(target, x, y);
                        } else {
                            let mut vp = viewport_tc.borrow_mut();
                            vp.panning = true;
                            pan_start.set((x, y));
                            pan_moved.set(false);
                        }
                    }
                    e.prevent_default();
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback(
                    "touchstart",
                    touch_start_cb.as_ref().unchecked_ref(),
                )
                .ok();

            let touch_move_cb = {
                let canvas_tc = canvas.clone();
                let viewport_tc = viewport.clone();
                let drag_tc = drag.clone();
                let sketch_tc = sketch.clone();
                let touch_state_tc = touch_state.clone();
                let draw_ref = draw_ref_setup.clone();
                let schedule = schedule_viewport_capture.clone();
                let pan_start = pan_start.clone();
                let pan_moved = pan_moved.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    let touches = e.touches();
                    let rect = canvas_tc.get_bounding_client_rect();
                    let w = canvas_tc.width() as f64;
                    let h = canvas_tc.height() as f64;
                    if touches.length() == 1 {
                        if let Some(t0) = touches.item(0) {
                            let x = t0.client_x() as f64 - rect.left();
                            let y = t0.client_y() as f64 - rect.top();
                            let dragged = drag_tc.borrow_mut().update(x, y);
                            if let Some((kind, id)) = dragged {
                                let pos = viewport_tc.borrow().screen_to_latlng(x, y, w, h);
                                sketch_tc.dispatch(SketchAction::MoveElement { kind, id, pos });
                            } else if !drag_tc.borrow().is_active() {
                                let mut ts = touch_state_tc.borrow_mut();
                                if ts.single_active {
                                    let dx = x - ts.last_touch_x;
                                    let dy = y - ts.last_touch_y;
                                    ts.last_touch_x = x;
                                    ts.last_touch_y = y;
                                    drop(ts);
                                    let mut vp = viewport_tc.borrow_mut();
                                    if vp.panning {
                                        vp.pan(dx, dy);
                                        let (sx, sy) = pan_start.get();
                                        if ((x - sx).powi(2) + (y - sy).powi(2)).sqrt()
                                            >= DRAG_THRESHOLD_PX
                                        {
                                            pan_moved.set(true);
                                        }
                                        drop(vp);
                                        if let Some(f) = &*draw_ref.borrow() {
                                            f();
                                        }
                                        schedule();
                                    }
                                }
                            }
                        }
                    } else if touches.length() >= 2 {
                        if let (Some(t0), Some(t1)) = (touches.item(0), touches.item(1)) {
                            let x0 = t0.client_x() as f64 - rect.left();
                            let y0 = t0.client_y() as f64 - rect.top();
                            let x1 = t1.client_x() as f64 - rect.left();
                            let y1 = t1.client_y() as f64 - rect.top();
                            let dist = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt().max(1.0);
                            let ts = touch_state_tc.borrow();
                            if ts.pinch {
                                let target_zoom =
                                    ts.start_zoom + (dist / ts.start_pinch_dist).log2();
                                drop(ts);
                                let mut vp = viewport_tc.borrow_mut();
                                let factor = 2f64.powf(target_zoom - vp.zoom);
                                vp.zoom_around(
                                    factor,
                                    (x0 + x1) * 0.5,
                                    (y0 + y1) * 0.5,
                                    w,
                                    h,
                                );
                                drop(vp);
                                if let Some(f) = &*draw_ref.borrow() {
                                    f();
                                }
                                schedule();
                            }
                        }
                    }
                    e.prevent_default();
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback(
                    "touchmove",
                    touch_move_cb.as_ref().unchecked_ref(),
                )
                .ok();

            let touch_end_cb = {
                let viewport_tc = viewport.clone();
                let drag_tc = drag.clone();
                let sketch_tc = sketch.clone();
                let touch_state_tc = touch_state.clone();
                let debounce = debounce_setup.clone();
                let cap = capture_closure.clone();
                let pan_moved = pan_moved.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    let left = e.touches().length();
                    if left == 0 {
                        if let Some((target, moved)) = drag_tc.borrow_mut().finish() {
                            if moved {
                                let cap = cap.clone();
                                debounce.borrow().schedule(move || cap(false));
                            } else if let (ElementKind::Zone, id) = target {
                                sketch_tc.dispatch(SketchAction::SelectZone(id));
                            }
                        } else {
                            let mut vp = viewport_tc.borrow_mut();
                            if vp.panning {
                                vp.panning = false;
                                drop(vp);
                                if !pan_moved.get() {
                                    sketch_tc.dispatch(SketchAction::Deselect);
                                }
                                pan_moved.set(false);
                            }
                        }
                        let mut ts = touch_state_tc.borrow_mut();
                        ts.single_active = false;
                        ts.pinch = false;
                    } else if left == 1 {
                        let mut ts = touch_state_tc.borrow_mut();
                        ts.pinch = false;
                        ts.single_active = true;
                    }
                    e.prevent_default();
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("touchend", touch_end_cb.as_ref().unchecked_ref())
                .ok();
            canvas
                .add_event_listener_with_callback(
                    "touchcancel",
                    touch_end_cb.as_ref().unchecked_ref(),
                )
                .ok();

            let window_clone = window.clone();
            move || {
                let _ = canvas.remove_event_listener_with_callback(
                    "wheel",
                    wheel_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "mousedown",
                    mousedown_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "mousemove",
                    mousemove_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "contextmenu",
                    contextmenu_cb.as_ref().unchecked_ref(),
                );
                let _ = window_clone.remove_event_listener_with_callback(
                    "mouseup",
                    mouseup_cb.as_ref().unchecked_ref(),
                );
                let _ = window_clone.remove_event_listener_with_callback(
                    "resize",
                    resize_cb.as_ref().unchecked_ref(),
                );
                let _ = window_clone.remove_event_listener_with_callback(
                    "keydown",
                    key_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "touchstart",
                    touch_start_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "touchmove",
                    touch_move_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "touchend",
                    touch_end_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "touchcancel",
                    touch_end_cb.as_ref().unchecked_ref(),
                );
                let _keep_alive = (
                    &wheel_cb,
                    &mousedown_cb,
                    &mousemove_cb,
                    &mouseup_cb,
                    &contextmenu_cb,
                    &resize_cb,
                    &key_cb,
                    &touch_start_cb,
                    &touch_move_cb,
                    &touch_end_cb,
                );
            }
        });
    }

    // Address search: recenter on a hit, notice on miss/failure.
    let on_search = {
        let viewport = viewport.clone();
        let draw_ref = draw_ref.clone();
        let capture_ref = capture_ref.clone();
        let debounce = debounce.clone();
        let notice = notice.clone();
        Callback::from(move |query: String| {
            let viewport = viewport.clone();
            let draw_ref = draw_ref.clone();
            let capture_ref = capture_ref.clone();
            let debounce = debounce.clone();
            let notice = notice.clone();
            spawn_local(async move {
                match geocode::search(&query).await {
                    Ok(GeocodeOutcome::Found(pos)) => {
                        viewport.borrow_mut().recenter(pos, SEARCH_ZOOM);
                        if let Some(f) = &*draw_ref.borrow() {
                            f();
                        }
                        if let Some(cap) = &*capture_ref.borrow() {
                            let cap = cap.clone();
                            debounce.borrow().schedule(move || cap(false));
                        }
                    }
                    Ok(GeocodeOutcome::NotFound) => {
                        notice.set(Some(format!("No match for \"{}\".", query.trim())));
                    }
                    Err(err) => {
                        clog(&format!("address lookup failed: {err}"));
                        notice.set(Some("Address lookup failed.".to_string()));
                    }
                }
            });
        })
    };

    // Camera control callbacks operate on the viewport directly.
    let redraw_and_capture = {
        let draw_ref = draw_ref.clone();
        let capture_ref = capture_ref.clone();
        let debounce = debounce.clone();
        Rc::new(move || {
            if let Some(f) = &*draw_ref.borrow() {
                f();
            }
            if let Some(cap) = &*capture_ref.borrow() {
                let cap = cap.clone();
                debounce.borrow().schedule(move || cap(false));
            }
        })
    };
    let zoom_by = |factor: f64| {
        let viewport = viewport.clone();
        let canvas_ref = canvas_ref.clone();
        let after = redraw_and_capture.clone();
        Callback::from(move |_| {
            if let Some(canvas) = canvas_ref.cast::<HtmlCanvasElement>() {
                let w = canvas.width() as f64;
                let h = canvas.height() as f64;
                viewport.borrow_mut().zoom_around(factor, w * 0.5, h * 0.5, w, h);
            }
            after();
        })
    };
    let pan_by = |dx: f64, dy: f64| {
        let viewport = viewport.clone();
        let after = redraw_and_capture.clone();
        Callback::from(move |_| {
            viewport.borrow_mut().pan(dx, dy);
            after();
        })
    };
    let center_on_sketch = {
        let viewport = viewport.clone();
        let sketch = props.sketch.clone();
        let after = redraw_and_capture.clone();
        Callback::from(move |_| {
            let mut vp = viewport.borrow_mut();
            let zoom = vp.zoom;
            match sketch.bounding_center() {
                Some(center) => vp.recenter(center, zoom),
                None => *vp = Viewport::default(),
            }
            drop(vp);
            after();
        })
    };

    let selected = props
        .sketch
        .selected_zone
        .and_then(|id| props.sketch.zone(id).cloned());
    let on_radius = {
        let sketch = props.sketch.clone();
        Callback::from(move |radius_m: f64| {
            if let Some(id) = sketch.selected_zone {
                sketch.dispatch(SketchAction::SetZoneRadius { id, radius_m });
            }
        })
    };
    let on_close_editor = {
        let sketch = props.sketch.clone();
        Callback::from(move |_| sketch.dispatch(SketchAction::Deselect))
    };

    let cursor = if props.sketch.tool.is_placing() { "crosshair" } else { "grab" };

    html! {
        <div style="position:relative; width:100vw; flex:1; overflow:hidden;">
            <canvas ref={canvas_ref.clone()} id="sketch-canvas"
                style={format!("display:block; width:100%; height:100%; cursor:{};", cursor)}></canvas>
            <ToolPanel sketch={props.sketch.clone()} />
            <SearchBar on_search={on_search} notice={(*notice).clone()} />
            { if let Some(zone) = selected {
                html! { <RadiusEditor zone={zone} on_radius={on_radius} on_close={on_close_editor} /> }
            } else { html! {} } }
            <CameraControls
                on_zoom_in={zoom_by(1.25)}
                on_zoom_out={zoom_by(0.8)}
                on_pan_left={pan_by(64.0, 0.0)}
                on_pan_right={pan_by(-64.0, 0.0)}
                on_pan_up={pan_by(0.0, 64.0)}
                on_pan_down={pan_by(0.0, -64.0)}
                on_center={center_on_sketch}
            />
            <LegendPanel />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::undo_shortcut_allowed;

    // Tag names come back uppercased from the DOM.
    #[test]
    fn undo_shortcut_yields_to_text_fields() {
        assert!(!undo_shortcut_allowed("INPUT"));
        assert!(!undo_shortcut_allowed("TEXTAREA"));
    }

    #[test]
    fn undo_shortcut_fires_elsewhere() {
        assert!(undo_shortcut_allowed("BODY"));
        assert!(undo_shortcut_allowed("CANVAS"));
        assert!(undo_shortcut_allowed("BUTTON"));
    }
}
