use mapblock_shared::camera::{LATITUDE_RANGE, LONGITUDE_RANGE};
use mapblock_shared::models::LngLat;

/// Format a coordinate for display as `lat, lng` with five decimals (about a metre).
pub fn format_lng_lat(at: LngLat) -> String {
    format!("{:.5}, {:.5}", at.lat, at.lng)
}

/// Parse typed longitude/latitude fields. Out-of-range or non-numeric input
/// is rejected rather than clamped, so a typo never moves a marker.
pub fn parse_lng_lat(lng: &str, lat: &str) -> Option<LngLat> {
    let lng: f64 = lng.trim().parse().ok()?;
    let lat: f64 = lat.trim().parse().ok()?;
    let in_range = |v: f64, (min, max): (f64, f64)| v.is_finite() && v >= min && v <= max;
    if in_range(lng, LONGITUDE_RANGE) && in_range(lat, LATITUDE_RANGE) {
        Some(LngLat::new(lng, lat))
    } else {
        None
    }
}

/// Look up an element of the current document by id.
pub fn element_by_id(id: &str) -> Option<web_sys::HtmlElement> {
    use wasm_bindgen::JsCast;
    let document = web_sys::window()?.document()?;
    document.get_element_by_id(id)?.dyn_into().ok()
}
