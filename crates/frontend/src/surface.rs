use std::collections::HashMap;
use std::rc::Rc;

use dioxus::logger::tracing::{debug, warn};
use mapblock_shared::camera::Camera;
use mapblock_shared::config::BlockAttributes;
use mapblock_shared::markup::{marker_html, popup_html};
use mapblock_shared::models::{LngLat, MapboxDefaults, MarkerIcon};
use mapblock_shared::popup::PopupContent;
use mapblock_shared::surface::{MapSurface, MarkerHandle, MarkerSpec, PopupHandle};
use mapblock_shared::sync::ClickTarget;
use mapblock_shared::view::BoundingBox;
use serde_json::json;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::mapbox;

const DEM_SOURCE: &str = "mapbox-dem";
const DEM_URL: &str = "mapbox://mapbox.mapbox-terrain-dem-v1";
const TERRAIN_EXAGGERATION: f64 = 1.5;
const LABEL_LAYER: &str = "country-label";

/// What the map tells the page that owns it.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The style finished loading; the surface can now be attached.
    Loaded,
    Click(ClickTarget, LngLat),
    /// The user dragged, zoomed or rotated the map.
    CameraMoved,
    ConfirmTemporary,
    CancelTemporary,
    /// A place was picked in the geocoder.
    Located(LngLat),
}

pub type EventSink = Rc<dyn Fn(MapEvent)>;

type ClickListener = Closure<dyn FnMut(web_sys::MouseEvent)>;

struct PlacedMarker {
    marker: mapbox::Marker,
    _on_click: Option<ClickListener>,
}

struct OpenPopup {
    popup: mapbox::Popup,
    _buttons: Vec<ClickListener>,
}

/// [`MapSurface`] backed by a Mapbox GL JS map.
pub struct MapboxSurface {
    map: mapbox::Map,
    icons: Vec<MarkerIcon>,
    language: String,
    events: EventSink,
    markers: HashMap<MarkerHandle, PlacedMarker>,
    popups: HashMap<PopupHandle, OpenPopup>,
    next: u64,
    _listeners: Vec<Closure<dyn FnMut(JsValue)>>,
}

impl MapboxSurface {
    /// Create the map inside `container`. Fails without a credential or when
    /// the Mapbox script is missing from the page.
    pub fn create(
        container: &web_sys::HtmlElement,
        attrs: &BlockAttributes,
        defaults: &MapboxDefaults,
        icons: Vec<MarkerIcon>,
        events: EventSink,
    ) -> Result<Self, String> {
        let token = defaults
            .credential()
            .ok_or_else(|| "no Mapbox access token configured".to_string())?;
        if !mapbox::is_loaded() {
            return Err("Mapbox GL JS is not loaded on this page".to_string());
        }

        let options = mapbox::from_json(&map_options(attrs, token));
        js_sys::Reflect::set(&options, &JsValue::from_str("container"), container)
            .map_err(|_| "cannot build the map options".to_string())?;
        let map = mapbox::Map::new(&options);
        map.add_control(&JsValue::from(mapbox::NavigationControl::new()), "top-right");

        let mut surface = MapboxSurface {
            map,
            icons,
            language: defaults.label_language().to_string(),
            events,
            markers: HashMap::new(),
            popups: HashMap::new(),
            next: 0,
            _listeners: Vec::new(),
        };
        surface.listen("load", |sink, _| sink(MapEvent::Loaded));
        surface.listen("click", |sink, e| {
            if let Some(at) = event_lng_lat(&e) {
                sink(MapEvent::Click(ClickTarget::Map, at));
            }
        });
        surface.listen("moveend", |sink, e| {
            // programmatic moves carry no originalEvent
            if js_sys::Reflect::get(&e, &JsValue::from_str("originalEvent"))
                .map(|v| v.is_truthy())
                .unwrap_or(false)
            {
                sink(MapEvent::CameraMoved);
            }
        });
        debug!(style = %attrs.map_style, "map created");
        Ok(surface)
    }

    fn listen<F>(&mut self, event: &str, handler: F)
    where
        F: Fn(&EventSink, JsValue) + 'static,
    {
        let sink = self.events.clone();
        let listener = Closure::<dyn FnMut(JsValue)>::new(move |e: JsValue| handler(&sink, e));
        self.map.on(event, listener.as_ref().unchecked_ref());
        self._listeners.push(listener);
    }

    /// Called once the style is ready: localise the country labels.
    pub fn on_loaded(&mut self) {
        if !self.map.get_layer(LABEL_LAYER).is_undefined() {
            self.map.set_layout_property(
                LABEL_LAYER,
                "text-field",
                &mapbox::from_json(&label_field(&self.language)),
            );
        }
    }

    /// Replace the icon library used to draw markers from now on.
    pub fn set_icons(&mut self, icons: Vec<MarkerIcon>) {
        self.icons = icons;
    }

    fn bump(&mut self) -> u64 {
        self.next += 1;
        self.next
    }

    fn icon_for(&self, spec: &MarkerSpec) -> Option<&MarkerIcon> {
        self.icons.iter().find(|i| i.name == spec.icon)
    }

    fn marker_element(&self, spec: &MarkerSpec) -> Option<web_sys::HtmlElement> {
        let document = web_sys::window()?.document()?;
        let wrapper = document.create_element("div").ok()?;
        wrapper.set_inner_html(&marker_html(spec, self.icon_for(spec)));
        wrapper.first_element_child()?.dyn_into().ok()
    }
}

impl MapSurface for MapboxSurface {
    fn camera(&self) -> Camera {
        let center = self.map.get_center();
        Camera {
            latitude: center.lat(),
            longitude: center.lng(),
            pitch: self.map.get_pitch(),
            bearing: self.map.get_bearing(),
            zoom: self.map.get_zoom(),
        }
        .sanitized()
    }

    fn jump_to(&mut self, camera: &Camera) {
        self.map.jump_to(&mapbox::from_json(&camera_options(camera)));
    }

    fn fit_bounds(&mut self, bounds: &BoundingBox, padding: f64, max_zoom: f64) {
        self.map.fit_bounds(
            &mapbox::from_json(&json!(bounds.corners())),
            &mapbox::from_json(&json!({ "padding": padding, "maxZoom": max_zoom })),
        );
    }

    fn fly_to(&mut self, center: LngLat, zoom: f64) {
        self.map.fly_to(&mapbox::from_json(&json!({
            "center": [center.lng, center.lat],
            "zoom": zoom,
            "essential": true,
        })));
    }

    fn add_marker(&mut self, spec: &MarkerSpec) -> MarkerHandle {
        let handle = MarkerHandle(self.bump());
        let (marker, on_click) = match self.marker_element(spec) {
            Some(element) => {
                let target = match spec.listing_id {
                    Some(id) => ClickTarget::Marker(id),
                    None => ClickTarget::Temporary,
                };
                let at = spec.at;
                let sink = self.events.clone();
                let on_click = ClickListener::new(move |e: web_sys::MouseEvent| {
                    // keep the map from seeing the click as an empty-map click
                    e.stop_propagation();
                    sink(MapEvent::Click(target, at));
                });
                let _ = element
                    .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
                let options = mapbox::object(&[
                    ("element", element.into()),
                    ("anchor", JsValue::from_str("bottom")),
                ]);
                (mapbox::Marker::new(&options), Some(on_click))
            }
            None => {
                warn!(marker = %spec.element_id(), "cannot build marker element, using the stock pin");
                (mapbox::Marker::new(&mapbox::object(&[])), None)
            }
        };
        marker.set_lng_lat(&lng_lat(spec.at));
        marker.add_to(&self.map);
        self.markers.insert(
            handle,
            PlacedMarker {
                marker,
                _on_click: on_click,
            },
        );
        handle
    }

    fn update_marker(&mut self, handle: MarkerHandle, spec: &MarkerSpec) {
        let Some(placed) = self.markers.get(&handle) else {
            return;
        };
        placed.marker.set_lng_lat(&lng_lat(spec.at));
        let element = placed.marker.get_element();
        if let Some(fresh) = self.marker_element(spec) {
            element.set_inner_html(&fresh.inner_html());
            for attr in ["title", "style"] {
                if let Some(value) = fresh.get_attribute(attr) {
                    let _ = element.set_attribute(attr, &value);
                }
            }
        }
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        if let Some(placed) = self.markers.remove(&handle) {
            placed.marker.remove();
        }
    }

    fn open_popup(&mut self, at: LngLat, content: &PopupContent, offset: f64) -> PopupHandle {
        let handle = PopupHandle(self.bump());
        let popup = mapbox::Popup::new(&mapbox::from_json(&popup_options(offset)));
        popup.set_lng_lat(&lng_lat(at));
        popup.set_html(&popup_html(content));
        popup.add_to(&self.map);

        let mut buttons = Vec::new();
        if let (PopupContent::Prompt(_), Some(element)) = (content, popup.get_element()) {
            for (selector, event) in [
                (".popup-confirm", MapEvent::ConfirmTemporary),
                (".popup-cancel", MapEvent::CancelTemporary),
            ] {
                if let Ok(Some(button)) = element.query_selector(selector) {
                    let sink = self.events.clone();
                    let listener = ClickListener::new(move |e: web_sys::MouseEvent| {
                        e.stop_propagation();
                        sink(event.clone());
                    });
                    let _ = button
                        .add_event_listener_with_callback("click", listener.as_ref().unchecked_ref());
                    buttons.push(listener);
                }
            }
        }

        self.popups.insert(
            handle,
            OpenPopup {
                popup,
                _buttons: buttons,
            },
        );
        handle
    }

    fn close_popup(&mut self, handle: PopupHandle) {
        if let Some(open) = self.popups.remove(&handle) {
            open.popup.remove();
        }
    }

    fn set_style(&mut self, style_url: &str) {
        self.map.set_style(style_url);
    }

    fn set_projection(&mut self, projection: &str) {
        self.map.set_projection(projection);
    }

    fn set_terrain(&mut self, enabled: bool) {
        if self.map.is_style_loaded() {
            apply_terrain(&self.map, enabled);
        } else {
            let map = self.map.clone();
            let deferred = Closure::once_into_js(move |_: JsValue| apply_terrain(&map, enabled));
            self.map.once("style.load", deferred.unchecked_ref());
        }
    }

    fn set_free_view(&mut self, enabled: bool) {
        let touch = self.map.touch_zoom_rotate();
        if enabled {
            self.map.drag_rotate().enable();
            touch.enable_rotation();
        } else {
            self.map.drag_rotate().disable();
            touch.disable_rotation();
        }
    }

    fn set_wheel_zoom(&mut self, enabled: bool) {
        if enabled {
            self.map.scroll_zoom().enable();
            self.map.touch_zoom_rotate().enable();
        } else {
            self.map.scroll_zoom().disable();
            self.map.touch_zoom_rotate().disable();
        }
    }

    fn resize(&mut self) {
        self.map.resize();
    }

    fn is_mounted(&self) -> bool {
        self.map.get_container().is_connected()
    }
}

impl Drop for MapboxSurface {
    fn drop(&mut self) {
        for (_, open) in self.popups.drain() {
            open.popup.remove();
        }
        for (_, placed) in self.markers.drain() {
            placed.marker.remove();
        }
        self.map.remove();
    }
}

fn apply_terrain(map: &mapbox::Map, enabled: bool) {
    if enabled {
        if map.get_source(DEM_SOURCE).is_undefined() {
            map.add_source(DEM_SOURCE, &mapbox::from_json(&dem_source()));
        }
        map.set_terrain(&mapbox::from_json(&terrain()));
    } else {
        map.set_terrain(&JsValue::NULL);
        if !map.get_source(DEM_SOURCE).is_undefined() {
            map.remove_source(DEM_SOURCE);
        }
    }
}

/// The search box mounted into a block's sidebar.
pub struct Geocoder {
    _widget: mapbox::MapboxGeocoder,
    _on_result: Closure<dyn FnMut(JsValue)>,
}

impl Geocoder {
    /// `None` when there is no credential or the geocoder script is missing.
    pub fn mount(container: &web_sys::Element, defaults: &MapboxDefaults, events: EventSink) -> Option<Self> {
        let token = defaults.credential()?;
        if !mapbox::has_geocoder() {
            warn!("MapboxGeocoder is not loaded, search is unavailable");
            return None;
        }
        let options = mapbox::object(&[
            ("accessToken", JsValue::from_str(token)),
            ("mapboxgl", mapbox::global("mapboxgl")?),
            ("marker", JsValue::FALSE),
            ("language", JsValue::from_str(defaults.label_language())),
        ]);
        let widget = mapbox::MapboxGeocoder::new(&options);
        widget.add_to(container);

        let on_result = Closure::<dyn FnMut(JsValue)>::new(move |e: JsValue| {
            if let Some(at) = geocoder_result(&e) {
                events(MapEvent::Located(at));
            }
        });
        widget.on("result", on_result.as_ref().unchecked_ref());
        Some(Geocoder {
            _widget: widget,
            _on_result: on_result,
        })
    }
}

fn lng_lat(at: LngLat) -> JsValue {
    js_sys::Array::of2(&JsValue::from_f64(at.lng), &JsValue::from_f64(at.lat)).into()
}

/// `e.lngLat` of a map mouse event.
fn event_lng_lat(e: &JsValue) -> Option<LngLat> {
    let at = js_sys::Reflect::get(e, &JsValue::from_str("lngLat")).ok()?;
    let point = LngLat::new(mapbox::number_at(&at, "lng")?, mapbox::number_at(&at, "lat")?);
    point.is_finite().then_some(point)
}

/// `e.result.center` of a geocoder result event.
fn geocoder_result(e: &JsValue) -> Option<LngLat> {
    let result = js_sys::Reflect::get(e, &JsValue::from_str("result")).ok()?;
    let center = js_sys::Reflect::get(&result, &JsValue::from_str("center")).ok()?;
    let center = js_sys::Array::from(&center);
    let point = LngLat::new(center.get(0).as_f64()?, center.get(1).as_f64()?);
    point.is_finite().then_some(point)
}

// Option documents, kept as JSON so they can be checked without a browser.

fn map_options(attrs: &BlockAttributes, token: &str) -> serde_json::Value {
    let camera = attrs.camera();
    json!({
        "accessToken": token,
        "style": attrs.style_url(),
        "projection": attrs.map_projection,
        "center": [camera.longitude, camera.latitude],
        "zoom": camera.zoom,
        "pitch": camera.pitch,
        "bearing": camera.bearing,
        "antialias": true,
        "scrollZoom": attrs.mouse_wheel_zoom,
        "dragRotate": attrs.free_view_camera,
    })
}

fn camera_options(camera: &Camera) -> serde_json::Value {
    json!({
        "center": [camera.longitude, camera.latitude],
        "zoom": camera.zoom,
        "pitch": camera.pitch,
        "bearing": camera.bearing,
    })
}

fn popup_options(offset: f64) -> serde_json::Value {
    json!({ "closeButton": false, "closeOnClick": false, "offset": offset })
}

fn dem_source() -> serde_json::Value {
    json!({ "type": "raster-dem", "url": DEM_URL, "tileSize": 512, "maxzoom": 14 })
}

fn terrain() -> serde_json::Value {
    json!({ "source": DEM_SOURCE, "exaggeration": TERRAIN_EXAGGERATION })
}

fn label_field(language: &str) -> serde_json::Value {
    json!(["get", format!("name_{}", language)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_options_use_lng_lat_order() {
        let mut attrs = BlockAttributes::default();
        attrs.latitude = 45.0;
        attrs.longitude = 9.0;
        attrs.map_style = "dark-v11".into();
        let options = map_options(&attrs, "pk.test");
        assert_eq!(options["center"], json!([9.0, 45.0]));
        assert_eq!(options["style"], "mapbox://styles/mapbox/dark-v11");
        assert_eq!(options["accessToken"], "pk.test");
        assert_eq!(options["scrollZoom"], json!(attrs.mouse_wheel_zoom));
    }

    #[test]
    fn test_camera_options() {
        let camera = Camera {
            latitude: 1.0,
            longitude: 2.0,
            pitch: 30.0,
            bearing: -10.0,
            zoom: 7.0,
        };
        let options = camera_options(&camera);
        assert_eq!(options["center"], json!([2.0, 1.0]));
        assert_eq!(options["pitch"], json!(30.0));
        assert_eq!(options["bearing"], json!(-10.0));
    }

    #[test]
    fn test_popup_is_managed_by_the_page() {
        let options = popup_options(24.0);
        assert_eq!(options["closeOnClick"], json!(false));
        assert_eq!(options["offset"], json!(24.0));
    }

    #[test]
    fn test_terrain_uses_dem_source() {
        assert_eq!(terrain()["source"], DEM_SOURCE);
        assert_eq!(terrain()["exaggeration"], json!(1.5));
        assert_eq!(dem_source()["type"], "raster-dem");
    }

    #[test]
    fn test_label_field() {
        assert_eq!(label_field("fr"), json!(["get", "name_fr"]));
    }
}
