//! Bindings to the Mapbox GL JS globals loaded by the page (`mapboxgl` and
//! `MapboxGeocoder`). Thin wrappers only; state lives in [`crate::surface`].

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = mapboxgl)]
    #[derive(Debug, Clone)]
    pub type Map;

    #[wasm_bindgen(constructor, js_namespace = mapboxgl)]
    pub fn new(options: &JsValue) -> Map;

    #[wasm_bindgen(method, js_name = getCenter)]
    pub fn get_center(this: &Map) -> LngLatLike;
    #[wasm_bindgen(method, js_name = getZoom)]
    pub fn get_zoom(this: &Map) -> f64;
    #[wasm_bindgen(method, js_name = getPitch)]
    pub fn get_pitch(this: &Map) -> f64;
    #[wasm_bindgen(method, js_name = getBearing)]
    pub fn get_bearing(this: &Map) -> f64;

    #[wasm_bindgen(method, js_name = jumpTo)]
    pub fn jump_to(this: &Map, options: &JsValue);
    #[wasm_bindgen(method, js_name = flyTo)]
    pub fn fly_to(this: &Map, options: &JsValue);
    #[wasm_bindgen(method, js_name = fitBounds)]
    pub fn fit_bounds(this: &Map, bounds: &JsValue, options: &JsValue);

    #[wasm_bindgen(method, js_name = setStyle)]
    pub fn set_style(this: &Map, style: &str);
    #[wasm_bindgen(method, js_name = setProjection)]
    pub fn set_projection(this: &Map, projection: &str);
    #[wasm_bindgen(method, js_name = setTerrain)]
    pub fn set_terrain(this: &Map, terrain: &JsValue);
    #[wasm_bindgen(method, js_name = isStyleLoaded)]
    pub fn is_style_loaded(this: &Map) -> bool;

    #[wasm_bindgen(method, js_name = addSource)]
    pub fn add_source(this: &Map, id: &str, source: &JsValue);
    #[wasm_bindgen(method, js_name = getSource)]
    pub fn get_source(this: &Map, id: &str) -> JsValue;
    #[wasm_bindgen(method, js_name = removeSource)]
    pub fn remove_source(this: &Map, id: &str);
    #[wasm_bindgen(method, js_name = getLayer)]
    pub fn get_layer(this: &Map, id: &str) -> JsValue;
    #[wasm_bindgen(method, js_name = setLayoutProperty)]
    pub fn set_layout_property(this: &Map, layer: &str, name: &str, value: &JsValue);

    #[wasm_bindgen(method, js_name = addControl)]
    pub fn add_control(this: &Map, control: &JsValue, position: &str);

    #[wasm_bindgen(method)]
    pub fn on(this: &Map, event: &str, listener: &js_sys::Function);
    #[wasm_bindgen(method)]
    pub fn once(this: &Map, event: &str, listener: &js_sys::Function);

    #[wasm_bindgen(method)]
    pub fn resize(this: &Map);
    #[wasm_bindgen(method)]
    pub fn remove(this: &Map);
    #[wasm_bindgen(method, js_name = getContainer)]
    pub fn get_container(this: &Map) -> web_sys::HtmlElement;

    #[wasm_bindgen(method, getter, js_name = dragRotate)]
    pub fn drag_rotate(this: &Map) -> Handler;
    #[wasm_bindgen(method, getter, js_name = scrollZoom)]
    pub fn scroll_zoom(this: &Map) -> Handler;
    #[wasm_bindgen(method, getter, js_name = touchZoomRotate)]
    pub fn touch_zoom_rotate(this: &Map) -> TouchZoomRotate;

    /// `{ lng, lat }` as returned by `getCenter` and carried by mouse events.
    pub type LngLatLike;
    #[wasm_bindgen(method, getter)]
    pub fn lng(this: &LngLatLike) -> f64;
    #[wasm_bindgen(method, getter)]
    pub fn lat(this: &LngLatLike) -> f64;

    pub type Handler;
    #[wasm_bindgen(method)]
    pub fn enable(this: &Handler);
    #[wasm_bindgen(method)]
    pub fn disable(this: &Handler);

    pub type TouchZoomRotate;
    #[wasm_bindgen(method)]
    pub fn enable(this: &TouchZoomRotate);
    #[wasm_bindgen(method)]
    pub fn disable(this: &TouchZoomRotate);
    #[wasm_bindgen(method, js_name = enableRotation)]
    pub fn enable_rotation(this: &TouchZoomRotate);
    #[wasm_bindgen(method, js_name = disableRotation)]
    pub fn disable_rotation(this: &TouchZoomRotate);

    #[wasm_bindgen(js_namespace = mapboxgl)]
    pub type NavigationControl;
    #[wasm_bindgen(constructor, js_namespace = mapboxgl)]
    pub fn new() -> NavigationControl;

    #[wasm_bindgen(js_namespace = mapboxgl)]
    #[derive(Debug, Clone)]
    pub type Marker;
    #[wasm_bindgen(constructor, js_namespace = mapboxgl)]
    pub fn new(options: &JsValue) -> Marker;
    #[wasm_bindgen(method, js_name = setLngLat)]
    pub fn set_lng_lat(this: &Marker, at: &JsValue) -> Marker;
    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &Marker, map: &Map) -> Marker;
    #[wasm_bindgen(method)]
    pub fn remove(this: &Marker) -> Marker;
    #[wasm_bindgen(method, js_name = getElement)]
    pub fn get_element(this: &Marker) -> web_sys::HtmlElement;

    #[wasm_bindgen(js_namespace = mapboxgl)]
    #[derive(Debug, Clone)]
    pub type Popup;
    #[wasm_bindgen(constructor, js_namespace = mapboxgl)]
    pub fn new(options: &JsValue) -> Popup;
    #[wasm_bindgen(method, js_name = setLngLat)]
    pub fn set_lng_lat(this: &Popup, at: &JsValue) -> Popup;
    #[wasm_bindgen(method, js_name = setHTML)]
    pub fn set_html(this: &Popup, html: &str) -> Popup;
    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &Popup, map: &Map) -> Popup;
    #[wasm_bindgen(method)]
    pub fn remove(this: &Popup) -> Popup;
    #[wasm_bindgen(method, js_name = getElement)]
    pub fn get_element(this: &Popup) -> Option<web_sys::HtmlElement>;

    #[derive(Debug, Clone)]
    pub type MapboxGeocoder;
    #[wasm_bindgen(constructor)]
    pub fn new(options: &JsValue) -> MapboxGeocoder;
    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &MapboxGeocoder, container: &web_sys::Element);
    #[wasm_bindgen(method)]
    pub fn on(this: &MapboxGeocoder, event: &str, listener: &js_sys::Function);
    #[wasm_bindgen(method, js_name = onRemove)]
    pub fn on_remove(this: &MapboxGeocoder);
}

/// Whether the Mapbox GL script is present on the page.
pub fn is_loaded() -> bool {
    global("mapboxgl").is_some()
}

/// Whether the geocoder plugin script is present on the page.
pub fn has_geocoder() -> bool {
    global("MapboxGeocoder").is_some()
}

pub fn global(name: &str) -> Option<JsValue> {
    let value = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str(name)).ok()?;
    if value.is_undefined() || value.is_null() {
        None
    } else {
        Some(value)
    }
}

/// Build a plain JS object from `(key, value)` pairs.
pub fn object(entries: &[(&str, JsValue)]) -> JsValue {
    let obj = js_sys::Object::new();
    for (key, value) in entries {
        let _ = js_sys::Reflect::set(&obj, &JsValue::from_str(key), value);
    }
    obj.into()
}

/// Convert JSON built on the Rust side into a JS value.
pub fn from_json(value: &serde_json::Value) -> JsValue {
    js_sys::JSON::parse(&value.to_string()).unwrap_or(JsValue::UNDEFINED)
}

/// Read `target[key]` as a number.
pub fn number_at(target: &JsValue, key: &str) -> Option<f64> {
    js_sys::Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_f64())
}
