// Small shared helpers.

use wasm_bindgen::JsValue;

pub fn clog(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

/// Meters formatted for the radius controls ("75 m").
pub fn format_meters(m: f64) -> String {
    format!("{} m", m.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::format_meters;

    #[test]
    fn meters_are_rounded_for_display() {
        assert_eq!(format_meters(74.6), "75 m");
        assert_eq!(format_meters(50.0), "50 m");
    }
}
