//! Core data model for the tactical sketch canvas: placed primitives,
//! the tool/mode state machine and the linear creation-only undo history,
//! all driven through a single Yew reducer.

use serde::{Deserialize, Serialize};
use std::rc::Rc;
use yew::Reducible;

use crate::geo::LatLng;

pub type ElementId = u64;

/// Circular overlay category. Fixed at creation; determines the stroke/fill
/// color and which configured default radius seeds a new zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneCategory {
    Impact,
    Adjacency,
    Influence,
}

impl ZoneCategory {
    pub const ALL: [ZoneCategory; 3] = [
        ZoneCategory::Impact,
        ZoneCategory::Adjacency,
        ZoneCategory::Influence,
    ];

    pub fn index(self) -> usize {
        match self {
            ZoneCategory::Impact => 0,
            ZoneCategory::Adjacency => 1,
            ZoneCategory::Influence => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ZoneCategory::Impact => "Impact",
            ZoneCategory::Adjacency => "Adjacency",
            ZoneCategory::Influence => "Influence",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ZoneCategory::Impact => "#f85149",
            ZoneCategory::Adjacency => "#f0883e",
            ZoneCategory::Influence => "#58a6ff",
        }
    }

    /// Seed value for the per-category radius control, in meters.
    pub fn default_radius_m(self) -> f64 {
        match self {
            ZoneCategory::Impact => 50.0,
            ZoneCategory::Adjacency => 100.0,
            ZoneCategory::Influence => 200.0,
        }
    }
}

/// Apparatus/personnel category for unit markers. Fixed enumerated set,
/// each with a distinct color and glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitCategory {
    Engine,
    Ladder,
    Ambulance,
    Command,
    Person,
}

impl UnitCategory {
    pub const ALL: [UnitCategory; 5] = [
        UnitCategory::Engine,
        UnitCategory::Ladder,
        UnitCategory::Ambulance,
        UnitCategory::Command,
        UnitCategory::Person,
    ];

    pub fn label(self) -> &'static str {
        match self {
            UnitCategory::Engine => "Engine",
            UnitCategory::Ladder => "Ladder",
            UnitCategory::Ambulance => "Ambulance",
            UnitCategory::Command => "Command",
            UnitCategory::Person => "Person",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            UnitCategory::Engine => "#f85149",
            UnitCategory::Ladder => "#d4af37",
            UnitCategory::Ambulance => "#2ea043",
            UnitCategory::Command => "#a371f7",
            UnitCategory::Person => "#58a6ff",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            UnitCategory::Engine => "E",
            UnitCategory::Ladder => "L",
            UnitCategory::Ambulance => "A",
            UnitCategory::Command => "C",
            UnitCategory::Person => "P",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointMarker {
    pub id: ElementId,
    pub pos: LatLng,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Zone {
    pub id: ElementId,
    pub center: LatLng,
    /// Radius in meters; always > 0. Mutable post-creation via the editor.
    pub radius_m: f64,
    pub category: ZoneCategory,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnitMarker {
    pub id: ElementId,
    pub pos: LatLng,
    pub category: UnitCategory,
    /// Captured from the unit-label control at click time.
    pub label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextLabel {
    pub id: ElementId,
    pub pos: LatLng,
    /// Stored uppercased.
    pub text: String,
    /// Rotated 90° when set; fixed at creation.
    pub vertical: bool,
}

/// What the next map click creates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolMode {
    Idle,
    PlacingPoint,
    PlacingZone(ZoneCategory),
    PlacingUnit,
    PlacingText,
}

impl ToolMode {
    pub fn is_placing(self) -> bool {
        !matches!(self, ToolMode::Idle)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Point,
    Zone,
    Unit,
    Text,
}

/// One undoable creation. Only creations are recorded; drags and radius
/// edits are not undoable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub kind: ElementKind,
    pub id: ElementId,
}

/// Tool preferences persisted to localStorage. Drawings themselves are
/// session-only and never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolPrefs {
    pub zone_radius_m: [f64; 3],
    pub unit_category: UnitCategory,
    pub unit_label: String,
    pub text_vertical: bool,
}

impl Default for ToolPrefs {
    fn default() -> Self {
        Self {
            zone_radius_m: [
                ZoneCategory::Impact.default_radius_m(),
                ZoneCategory::Adjacency.default_radius_m(),
                ZoneCategory::Influence.default_radius_m(),
            ],
            unit_category: UnitCategory::Engine,
            unit_label: String::new(),
            text_vertical: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SketchState {
    pub tool: ToolMode,
    pub points: Vec<PointMarker>,
    pub zones: Vec<Zone>,
    pub units: Vec<UnitMarker>,
    pub texts: Vec<TextLabel>,
    pub history: Vec<HistoryEntry>,
    /// At most one zone is selected (bound to the radius editor) at a time.
    pub selected_zone: Option<ElementId>,
    /// Per-category zone radius controls, read at placement time.
    pub zone_radius_m: [f64; 3],
    pub unit_category: UnitCategory,
    pub unit_label: String,
    pub text_input: String,
    pub text_vertical: bool,
    /// Bumped by every state change; drives canvas redraw.
    pub version: u64,
    /// Bumped only by mutations that must re-rasterize the sketch.
    pub capture_gen: u64,
    next_id: ElementId,
}

impl Default for SketchState {
    fn default() -> Self {
        let prefs = ToolPrefs::default();
        Self {
            tool: ToolMode::Idle,
            points: Vec::new(),
            zones: Vec::new(),
            units: Vec::new(),
            texts: Vec::new(),
            history: Vec::new(),
            selected_zone: None,
            zone_radius_m: prefs.zone_radius_m,
            unit_category: prefs.unit_category,
            unit_label: prefs.unit_label,
            text_input: String::new(),
            text_vertical: prefs.text_vertical,
            version: 0,
            capture_gen: 0,
            next_id: 1,
        }
    }
}

impl SketchState {
    pub fn element_count(&self) -> usize {
        self.points.len() + self.zones.len() + self.units.len() + self.texts.len()
    }

    pub fn zone(&self, id: ElementId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn prefs(&self) -> ToolPrefs {
        ToolPrefs {
            zone_radius_m: self.zone_radius_m,
            unit_category: self.unit_category,
            unit_label: self.unit_label.clone(),
            text_vertical: self.text_vertical,
        }
    }

    /// Midpoint of the bounding box of everything placed; `None` when the
    /// sketch is empty. Used to center the exported raster on the drawing.
    pub fn bounding_center(&self) -> Option<LatLng> {
        let positions = self
            .points
            .iter()
            .map(|p| p.pos)
            .chain(self.zones.iter().map(|z| z.center))
            .chain(self.units.iter().map(|u| u.pos))
            .chain(self.texts.iter().map(|t| t.pos));
        let mut min_lat = f64::INFINITY;
        let mut max_lat = f64::NEG_INFINITY;
        let mut min_lng = f64::INFINITY;
        let mut max_lng = f64::NEG_INFINITY;
        let mut any = false;
        for p in positions {
            any = true;
            min_lat = min_lat.min(p.lat);
            max_lat = max_lat.max(p.lat);
            min_lng = min_lng.min(p.lng);
            max_lng = max_lng.max(p.lng);
        }
        any.then(|| LatLng::new((min_lat + max_lat) * 0.5, (min_lng + max_lng) * 0.5))
    }

    /// Ids are opaque. In the browser they derive from the wall clock, with
    /// the counter's low digits disambiguating same-millisecond creations;
    /// on native targets the bare counter keeps ids deterministic.
    fn take_id(&mut self) -> ElementId {
        self.next_id += 1;
        #[cfg(target_arch = "wasm32")]
        return (js_sys::Date::now() as ElementId) * 1000 + self.next_id % 1000;
        #[cfg(not(target_arch = "wasm32"))]
        self.next_id
    }

    fn remove_element(&mut self, entry: HistoryEntry) {
        match entry.kind {
            ElementKind::Point => self.points.retain(|p| p.id != entry.id),
            ElementKind::Zone => {
                self.zones.retain(|z| z.id != entry.id);
                if self.selected_zone == Some(entry.id) {
                    self.selected_zone = None;
                }
            }
            ElementKind::Unit => self.units.retain(|u| u.id != entry.id),
            ElementKind::Text => self.texts.retain(|t| t.id != entry.id),
        }
    }
}

#[derive(Clone, Debug)]
pub enum SketchAction {
    SelectTool(ToolMode),
    /// A click on open map (not on an existing element). Places when a tool
    /// is active, deselects otherwise.
    MapClick { pos: LatLng },
    SelectZone(ElementId),
    Deselect,
    SetZoneRadius { id: ElementId, radius_m: f64 },
    MoveElement { kind: ElementKind, id: ElementId, pos: LatLng },
    SetToolRadius { category: ZoneCategory, radius_m: f64 },
    SetUnitCategory(UnitCategory),
    SetUnitLabel(String),
    SetTextInput(String),
    SetTextVertical(bool),
    Undo,
    Clear,
    LoadPrefs(ToolPrefs),
}

impl Reducible for SketchState {
    type Action = SketchAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        use SketchAction::*;
        let mut new = (*self).clone();
        new.version = new.version.wrapping_add(1);
        match action {
            SelectTool(mode) => {
                // Switching tools mid-placement jumps straight to the new
                // placing state; no element is created.
                new.tool = mode;
            }
            MapClick { pos } => match new.tool {
                ToolMode::Idle => {
                    // Background click: drop any zone selection.
                    new.selected_zone = None;
                }
                ToolMode::PlacingPoint => {
                    let id = new.take_id();
                    new.points.push(PointMarker { id, pos });
                    new.history.push(HistoryEntry { kind: ElementKind::Point, id });
                    new.tool = ToolMode::Idle;
                    new.capture_gen += 1;
                }
                ToolMode::PlacingZone(category) => {
                    let id = new.take_id();
                    let radius_m = new.zone_radius_m[category.index()];
                    new.zones.push(Zone { id, center: pos, radius_m, category });
                    new.history.push(HistoryEntry { kind: ElementKind::Zone, id });
                    new.tool = ToolMode::Idle;
                    new.capture_gen += 1;
                }
                ToolMode::PlacingUnit => {
                    let label = new.unit_label.trim().to_string();
                    new.tool = ToolMode::Idle;
                    if !label.is_empty() {
                        let id = new.take_id();
                        new.units.push(UnitMarker {
                            id,
                            pos,
                            category: new.unit_category,
                            label,
                        });
                        new.history.push(HistoryEntry { kind: ElementKind::Unit, id });
                        new.capture_gen += 1;
                    }
                    // Empty label: click swallowed, nothing created.
                }
                ToolMode::PlacingText => {
                    let text = new.text_input.trim().to_uppercase();
                    new.tool = ToolMode::Idle;
                    if !text.is_empty() {
                        let id = new.take_id();
                        new.texts.push(TextLabel {
                            id,
                            pos,
                            text,
                            vertical: new.text_vertical,
                        });
                        new.history.push(HistoryEntry { kind: ElementKind::Text, id });
                        new.capture_gen += 1;
                    }
                }
            },
            SelectZone(id) => {
                if new.zones.iter().any(|z| z.id == id) {
                    new.selected_zone = Some(id);
                }
            }
            Deselect => {
                new.selected_zone = None;
            }
            SetZoneRadius { id, radius_m } => {
                if radius_m > 0.0 {
                    if let Some(z) = new.zones.iter_mut().find(|z| z.id == id) {
                        z.radius_m = radius_m;
                        new.capture_gen += 1;
                    }
                }
            }
            MoveElement { kind, id, pos } => {
                // Drags redraw but are not undoable and do not themselves
                // bump the capture generation; the view captures once on
                // drag end, and only when the pointer actually moved.
                match kind {
                    ElementKind::Point => {
                        if let Some(p) = new.points.iter_mut().find(|p| p.id == id) {
                            p.pos = pos;
                        }
                    }
                    ElementKind::Zone => {
                        if let Some(z) = new.zones.iter_mut().find(|z| z.id == id) {
                            z.center = pos;
                        }
                    }
                    ElementKind::Unit => {
                        if let Some(u) = new.units.iter_mut().find(|u| u.id == id) {
                            u.pos = pos;
                        }
                    }
                    ElementKind::Text => {
                        if let Some(t) = new.texts.iter_mut().find(|t| t.id == id) {
                            t.pos = pos;
                        }
                    }
                }
            }
            SetToolRadius { category, radius_m } => {
                if radius_m > 0.0 {
                    new.zone_radius_m[category.index()] = radius_m;
                }
            }
            SetUnitCategory(c) => new.unit_category = c,
            SetUnitLabel(s) => new.unit_label = s,
            SetTextInput(s) => new.text_input = s,
            SetTextVertical(v) => new.text_vertical = v,
            Undo => {
                // No-op on empty history; otherwise pop exactly the most
                // recent creation and drop its element.
                if let Some(entry) = new.history.pop() {
                    new.remove_element(entry);
                    new.capture_gen += 1;
                }
            }
            Clear => {
                new.points.clear();
                new.zones.clear();
                new.units.clear();
                new.texts.clear();
                new.history.clear();
                new.selected_zone = None;
                new.tool = ToolMode::Idle;
                new.capture_gen += 1;
            }
            LoadPrefs(p) => {
                new.zone_radius_m = p.zone_radius_m;
                new.unit_category = p.unit_category;
                new.unit_label = p.unit_label;
                new.text_vertical = p.text_vertical;
            }
        }
        Rc::new(new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(state: SketchState, action: SketchAction) -> SketchState {
        let next = Rc::new(state).reduce(action);
        (*next).clone()
    }

    fn at(lat: f64, lng: f64) -> LatLng {
        LatLng::new(lat, lng)
    }

    #[test]
    fn every_creation_gets_a_distinct_id() {
        let mut s = SketchState::default();
        for i in 0..4 {
            s = apply(s, SketchAction::SelectTool(ToolMode::PlacingPoint));
            s = apply(s, SketchAction::MapClick { pos: at(36.0 + i as f64 * 0.01, 127.0) });
        }
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingZone(ZoneCategory::Impact)));
        s = apply(s, SketchAction::MapClick { pos: at(36.2, 127.0) });
        let mut ids: Vec<ElementId> = s.history.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 5);
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn place_point_returns_to_idle_and_records_history() {
        let mut s = SketchState::default();
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingPoint));
        s = apply(s, SketchAction::MapClick { pos: at(36.64, 127.49) });
        assert_eq!(s.points.len(), 1);
        assert_eq!(s.history.len(), 1);
        assert_eq!(s.tool, ToolMode::Idle);
        assert_eq!(s.history[0].kind, ElementKind::Point);
    }

    #[test]
    fn zone_radius_is_captured_from_control_at_click_time() {
        let mut s = SketchState::default();
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingZone(ZoneCategory::Impact)));
        s = apply(s, SketchAction::MapClick { pos: at(36.0, 127.0) });
        s = apply(
            s,
            SketchAction::SetToolRadius { category: ZoneCategory::Impact, radius_m: 75.0 },
        );
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingZone(ZoneCategory::Impact)));
        s = apply(s, SketchAction::MapClick { pos: at(36.1, 127.1) });
        assert_eq!(s.zones.len(), 2);
        assert_eq!(s.zones[0].radius_m, ZoneCategory::Impact.default_radius_m());
        assert_eq!(s.zones[1].radius_m, 75.0);
        // The earlier zone keeps its own radius.
        assert_ne!(s.zones[0].radius_m, s.zones[1].radius_m);
    }

    #[test]
    fn unit_placement_with_empty_label_is_swallowed() {
        let mut s = SketchState::default();
        s = apply(s, SketchAction::SetUnitLabel("   ".into()));
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingUnit));
        let r#gen = s.capture_gen;
        s = apply(s, SketchAction::MapClick { pos: at(36.0, 127.0) });
        assert!(s.units.is_empty());
        assert!(s.history.is_empty());
        assert_eq!(s.tool, ToolMode::Idle);
        assert_eq!(s.capture_gen, r#gen);
    }

    #[test]
    fn text_placement_with_empty_input_is_swallowed() {
        let mut s = SketchState::default();
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingText));
        s = apply(s, SketchAction::MapClick { pos: at(36.0, 127.0) });
        assert!(s.texts.is_empty());
        assert!(s.history.is_empty());
        assert_eq!(s.tool, ToolMode::Idle);
    }

    #[test]
    fn text_is_stored_uppercased() {
        let mut s = SketchState::default();
        s = apply(s, SketchAction::SetTextInput("main street".into()));
        s = apply(s, SketchAction::SetTextVertical(true));
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingText));
        s = apply(s, SketchAction::MapClick { pos: at(36.0, 127.0) });
        assert_eq!(s.texts[0].text, "MAIN STREET");
        assert!(s.texts[0].vertical);
    }

    #[test]
    fn unit_label_is_captured_at_click_and_not_retroactive() {
        let mut s = SketchState::default();
        s = apply(s, SketchAction::SetUnitLabel("E-1".into()));
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingUnit));
        s = apply(s, SketchAction::MapClick { pos: at(36.0, 127.0) });
        s = apply(s, SketchAction::SetUnitLabel("E-2".into()));
        s = apply(s, SketchAction::SetUnitCategory(UnitCategory::Ladder));
        assert_eq!(s.units[0].label, "E-1");
        assert_eq!(s.units[0].category, UnitCategory::Engine);
    }

    #[test]
    fn switching_tools_mid_placement_places_nothing() {
        let mut s = SketchState::default();
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingPoint));
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingZone(ZoneCategory::Influence)));
        assert_eq!(s.tool, ToolMode::PlacingZone(ZoneCategory::Influence));
        assert_eq!(s.element_count(), 0);
        assert!(s.history.is_empty());
    }

    #[test]
    fn n_creations_then_n_undos_round_trip_to_empty() {
        let mut s = SketchState::default();
        s = apply(s, SketchAction::SetUnitLabel("E-1".into()));
        s = apply(s, SketchAction::SetTextInput("alley".into()));
        let tools = [
            ToolMode::PlacingPoint,
            ToolMode::PlacingZone(ZoneCategory::Impact),
            ToolMode::PlacingUnit,
            ToolMode::PlacingText,
            ToolMode::PlacingZone(ZoneCategory::Adjacency),
        ];
        for (i, t) in tools.iter().enumerate() {
            s = apply(s, SketchAction::SelectTool(*t));
            s = apply(s, SketchAction::MapClick { pos: at(36.0 + i as f64 * 0.01, 127.0) });
        }
        assert_eq!(s.element_count(), tools.len());
        assert_eq!(s.history.len(), tools.len());
        for _ in 0..tools.len() {
            s = apply(s, SketchAction::Undo);
        }
        assert_eq!(s.element_count(), 0);
        assert!(s.history.is_empty());
    }

    #[test]
    fn undo_removes_only_the_most_recent_element() {
        let mut s = SketchState::default();
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingPoint));
        s = apply(s, SketchAction::MapClick { pos: at(36.0, 127.0) });
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingZone(ZoneCategory::Impact)));
        s = apply(s, SketchAction::MapClick { pos: at(36.1, 127.1) });
        let zone_id = s.zones[0].id;
        s = apply(s, SketchAction::SelectZone(zone_id));
        s = apply(s, SketchAction::Undo);
        assert!(s.zones.is_empty());
        assert_eq!(s.points.len(), 1);
        assert_eq!(s.history.len(), 1);
        assert_eq!(s.selected_zone, None);
    }

    #[test]
    fn undo_on_empty_history_is_a_no_op() {
        let s = SketchState::default();
        let r#gen = s.capture_gen;
        let s = apply(s, SketchAction::Undo);
        assert_eq!(s.element_count(), 0);
        assert_eq!(s.capture_gen, r#gen);
    }

    #[test]
    fn clear_empties_everything_regardless_of_prior_state() {
        let mut s = SketchState::default();
        s = apply(s, SketchAction::SetUnitLabel("L-3".into()));
        s = apply(s, SketchAction::SetTextInput("yard".into()));
        for t in [
            ToolMode::PlacingPoint,
            ToolMode::PlacingZone(ZoneCategory::Influence),
            ToolMode::PlacingUnit,
            ToolMode::PlacingText,
        ] {
            s = apply(s, SketchAction::SelectTool(t));
            s = apply(s, SketchAction::MapClick { pos: at(36.0, 127.0) });
        }
        let zid = s.zones[0].id;
        s = apply(s, SketchAction::SelectZone(zid));
        s = apply(s, SketchAction::Clear);
        assert!(s.points.is_empty());
        assert!(s.zones.is_empty());
        assert!(s.units.is_empty());
        assert!(s.texts.is_empty());
        assert!(s.history.is_empty());
        assert_eq!(s.selected_zone, None);
    }

    #[test]
    fn selecting_a_second_zone_replaces_the_first_selection() {
        let mut s = SketchState::default();
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingZone(ZoneCategory::Impact)));
        s = apply(s, SketchAction::MapClick { pos: at(36.0, 127.0) });
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingZone(ZoneCategory::Impact)));
        s = apply(s, SketchAction::MapClick { pos: at(36.1, 127.1) });
        let (a, b) = (s.zones[0].id, s.zones[1].id);
        s = apply(s, SketchAction::SelectZone(a));
        s = apply(s, SketchAction::SelectZone(b));
        assert_eq!(s.selected_zone, Some(b));
        // Click on open map deselects.
        s = apply(s, SketchAction::MapClick { pos: at(36.2, 127.2) });
        assert_eq!(s.selected_zone, None);
    }

    #[test]
    fn radius_edit_updates_the_zone_but_is_not_undoable() {
        let mut s = SketchState::default();
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingZone(ZoneCategory::Impact)));
        s = apply(s, SketchAction::MapClick { pos: at(36.0, 127.0) });
        let id = s.zones[0].id;
        let history_len = s.history.len();
        s = apply(s, SketchAction::SetZoneRadius { id, radius_m: 120.0 });
        assert_eq!(s.zone(id).unwrap().radius_m, 120.0);
        assert_eq!(s.history.len(), history_len);
        // Non-positive radius is rejected.
        let s = apply(s, SketchAction::SetZoneRadius { id, radius_m: 0.0 });
        assert_eq!(s.zone(id).unwrap().radius_m, 120.0);
    }

    #[test]
    fn move_element_updates_position_without_history_or_capture() {
        let mut s = SketchState::default();
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingPoint));
        s = apply(s, SketchAction::MapClick { pos: at(36.0, 127.0) });
        let id = s.points[0].id;
        let r#gen = s.capture_gen;
        s = apply(
            s,
            SketchAction::MoveElement { kind: ElementKind::Point, id, pos: at(36.5, 127.5) },
        );
        assert_eq!(s.points[0].pos, at(36.5, 127.5));
        assert_eq!(s.history.len(), 1);
        assert_eq!(s.capture_gen, r#gen);
    }

    #[test]
    fn placement_clicks_do_not_fall_through_to_deselect() {
        let mut s = SketchState::default();
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingZone(ZoneCategory::Impact)));
        s = apply(s, SketchAction::MapClick { pos: at(36.0, 127.0) });
        let id = s.zones[0].id;
        s = apply(s, SketchAction::SelectZone(id));
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingPoint));
        s = apply(s, SketchAction::MapClick { pos: at(36.1, 127.1) });
        assert_eq!(s.selected_zone, Some(id));
    }

    #[test]
    fn bounding_center_is_the_bbox_midpoint() {
        let mut s = SketchState::default();
        assert_eq!(s.bounding_center(), None);
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingPoint));
        s = apply(s, SketchAction::MapClick { pos: at(36.0, 127.0) });
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingZone(ZoneCategory::Impact)));
        s = apply(s, SketchAction::MapClick { pos: at(36.2, 127.4) });
        assert_eq!(s.bounding_center(), Some(at(36.1, 127.2)));
    }

    #[test]
    fn load_prefs_applies_controls_without_touching_elements() {
        let mut s = SketchState::default();
        s = apply(s, SketchAction::SelectTool(ToolMode::PlacingPoint));
        s = apply(s, SketchAction::MapClick { pos: at(36.0, 127.0) });
        let prefs = ToolPrefs {
            zone_radius_m: [30.0, 60.0, 90.0],
            unit_category: UnitCategory::Command,
            unit_label: "C-1".into(),
            text_vertical: true,
        };
        s = apply(s, SketchAction::LoadPrefs(prefs.clone()));
        assert_eq!(s.prefs(), prefs);
        assert_eq!(s.points.len(), 1);
    }
}
