//! The persisted block document and its lenient parser.
//!
//! Every field has a default. Parsing goes field by field, so one malformed
//! field falls back to its default without affecting the others, and each
//! listing is parsed on its own.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::camera::{Camera, LATITUDE_RANGE, LONGITUDE_RANGE};
use crate::models::{HasId, Listing, MapFilter, MapboxOptions, MarkerIcon};

pub const SCHEMA_VERSION: u32 = 1;

pub const DEFAULT_MAP_STYLE: &str = "streets-v12";
pub const DEFAULT_MAP_PROJECTION: &str = "mercator";
pub const DEFAULT_MAP_HEIGHT: &str = "500px";

/// Base styles offered by the editor, as `(value, label)`.
pub const MAP_STYLES: [(&str, &str); 6] = [
    ("streets-v12", "Streets"),
    ("outdoors-v12", "Outdoors"),
    ("light-v11", "Light"),
    ("dark-v11", "Dark"),
    ("satellite-v9", "Satellite"),
    ("satellite-streets-v12", "Satellite Streets"),
];

/// Projections offered by the editor, as `(value, label)`.
pub const MAP_PROJECTIONS: [(&str, &str); 6] = [
    ("mercator", "Mercator"),
    ("globe", "Globe"),
    ("albers", "Albers"),
    ("equalEarth", "Equal Earth"),
    ("equirectangular", "Equirectangular"),
    ("naturalEarth", "Natural Earth"),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// All attributes of a map block.
///
/// Deserializing goes through [`BlockAttributes::from_value`], so stored
/// documents with missing or broken fields still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct BlockAttributes {
    pub schema_version: u32,
    pub align: String,
    pub latitude: f64,
    pub longitude: f64,
    pub pitch: f64,
    pub bearing: f64,
    pub map_zoom: f64,
    pub map_style: String,
    pub map_projection: String,
    pub map_height: String,
    pub sidebar_enabled: bool,
    pub geocoder_enabled: bool,
    pub filters_enabled: bool,
    pub tags_enabled: bool,
    pub fit_view: bool,
    pub elevation: bool,
    pub free_view_camera: bool,
    pub mouse_wheel_zoom: bool,
    pub mapbox_options: MapboxOptions,
}

impl Default for BlockAttributes {
    fn default() -> Self {
        BlockAttributes {
            schema_version: SCHEMA_VERSION,
            align: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            pitch: 0.0,
            bearing: 0.0,
            map_zoom: 1.0,
            map_style: DEFAULT_MAP_STYLE.to_string(),
            map_projection: DEFAULT_MAP_PROJECTION.to_string(),
            map_height: DEFAULT_MAP_HEIGHT.to_string(),
            sidebar_enabled: false,
            geocoder_enabled: false,
            filters_enabled: false,
            tags_enabled: false,
            fit_view: false,
            elevation: false,
            free_view_camera: false,
            mouse_wheel_zoom: true,
            mapbox_options: MapboxOptions::default(),
        }
    }
}

impl BlockAttributes {
    pub fn camera(&self) -> Camera {
        Camera {
            latitude: self.latitude,
            longitude: self.longitude,
            pitch: self.pitch,
            bearing: self.bearing,
            zoom: self.map_zoom,
        }
    }

    pub fn set_camera(&mut self, camera: Camera) {
        let camera = camera.sanitized();
        self.latitude = camera.latitude;
        self.longitude = camera.longitude;
        self.pitch = camera.pitch;
        self.bearing = camera.bearing;
        self.map_zoom = camera.zoom;
    }

    /// Full style URL understood by the mapping library.
    pub fn style_url(&self) -> String {
        style_url(&self.map_style)
    }

    pub fn to_json(&self) -> String {
        // A struct of plain fields and string-keyed maps always serializes.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Build from a JSON value, defaulting each field that is missing or invalid.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            warn!(found = kind_of(value), "block attributes are not an object, using defaults");
            return BlockAttributes::default();
        };
        let d = BlockAttributes::default();
        let attrs = BlockAttributes {
            schema_version: field(obj, "schemaVersion", d.schema_version),
            align: field(obj, "align", d.align),
            latitude: field(obj, "latitude", d.latitude),
            longitude: field(obj, "longitude", d.longitude),
            pitch: field(obj, "pitch", d.pitch),
            bearing: field(obj, "bearing", d.bearing),
            map_zoom: field(obj, "mapZoom", d.map_zoom),
            map_style: field(obj, "mapStyle", d.map_style),
            map_projection: field(obj, "mapProjection", d.map_projection),
            map_height: field(obj, "mapHeight", d.map_height),
            sidebar_enabled: field(obj, "sidebarEnabled", d.sidebar_enabled),
            geocoder_enabled: field(obj, "geocoderEnabled", d.geocoder_enabled),
            filters_enabled: field(obj, "filtersEnabled", d.filters_enabled),
            tags_enabled: field(obj, "tagsEnabled", d.tags_enabled),
            fit_view: field(obj, "fitView", d.fit_view),
            elevation: field(obj, "elevation", d.elevation),
            free_view_camera: field(obj, "freeViewCamera", d.free_view_camera),
            mouse_wheel_zoom: field(obj, "mouseWheelZoom", d.mouse_wheel_zoom),
            mapbox_options: obj
                .get("mapboxOptions")
                .map(options_from_value)
                .unwrap_or_default(),
        };
        if attrs.schema_version > SCHEMA_VERSION {
            warn!(
                version = attrs.schema_version,
                supported = SCHEMA_VERSION,
                "block attributes come from a newer schema"
            );
        }
        let mut attrs = attrs;
        attrs.set_camera(attrs.camera());
        attrs
    }
}

impl From<Value> for BlockAttributes {
    fn from(value: Value) -> Self {
        BlockAttributes::from_value(&value)
    }
}

pub fn style_url(style: &str) -> String {
    format!("mapbox://styles/mapbox/{}", style)
}

/// Parse block attributes. Never fails: invalid JSON gives the defaults.
pub fn parse_attributes(raw: &str) -> BlockAttributes {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => BlockAttributes::from_value(&value),
        Err(e) => {
            warn!(error = %e, "block attributes are not valid JSON, using defaults");
            BlockAttributes::default()
        }
    }
}

/// Parse a `mapboxOptions` document typed in by the editor. Unlike
/// [`parse_attributes`] this rejects anything that is not a JSON object, so a
/// stray edit does not wipe the markers.
pub fn parse_options_strict(raw: &str) -> Result<MapboxOptions, ConfigError> {
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(ConfigError::NotAnObject(kind_of(&value)));
    }
    Ok(options_from_value(&value))
}

/// Build [`MapboxOptions`] from JSON, keeping every entry that parses.
///
/// Entries repeating an earlier id are dropped, so are listings placed off the
/// globe.
pub fn options_from_value(value: &Value) -> MapboxOptions {
    let Some(obj) = value.as_object() else {
        warn!(found = kind_of(value), "mapboxOptions is not an object, using defaults");
        return MapboxOptions::default();
    };
    let listings = entries::<Listing>(obj, "listings")
        .into_iter()
        .filter(|listing| {
            let on_globe = on_globe(listing);
            if !on_globe {
                warn!(id = listing.id, at = %listing.coordinates(), "dropping listing outside the map");
            }
            on_globe
        })
        .map(|mut listing| {
            let props = &mut listing.properties;
            props.item_tags = unique_ids(std::mem::take(&mut props.item_tags), "itemTags");
            props.item_filters = unique_ids(std::mem::take(&mut props.item_filters), "itemFilters");
            listing
        })
        .collect();
    MapboxOptions {
        icons: unique_ids(entries::<MarkerIcon>(obj, "icons"), "icons"),
        tags: unique_ids(entries::<MapFilter>(obj, "tags"), "tags"),
        filters: unique_ids(entries::<MapFilter>(obj, "filters"), "filters"),
        listings: unique_ids(listings, "listings"),
    }
}

fn on_globe(listing: &Listing) -> bool {
    let at = listing.coordinates();
    at.is_finite()
        && (LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&at.lng)
        && (LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&at.lat)
}

/// Keep the first entry of every id.
fn unique_ids<T: HasId>(items: Vec<T>, key: &str) -> Vec<T> {
    let mut seen = BTreeSet::new();
    items
        .into_iter()
        .filter(|item| {
            let fresh = seen.insert(item.id());
            if !fresh {
                warn!(collection = key, id = item.id(), "dropping entry with a repeated id");
            }
            fresh
        })
        .collect()
}

fn field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str, default: T) -> T {
    match obj.get(key) {
        None | Some(Value::Null) => default,
        Some(v) => match T::deserialize(v) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(field = key, error = %e, "invalid block attribute, using default");
                default
            }
        },
    }
}

fn entries<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Vec<T> {
    match obj.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match T::deserialize(item) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!(collection = key, index, error = %e, "dropping invalid entry");
                    None
                }
            })
            .collect(),
        Some(other) => {
            warn!(collection = key, found = kind_of(other), "expected an array, using empty");
            Vec::new()
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        assert_eq!(parse_attributes("{}"), BlockAttributes::default());
    }

    #[test]
    fn test_invalid_json_gives_defaults() {
        assert_eq!(parse_attributes("{not json"), BlockAttributes::default());
        assert_eq!(parse_attributes("[1,2]"), BlockAttributes::default());
    }

    #[test]
    fn test_bad_field_does_not_block_others() {
        let attrs = parse_attributes(
            r#"{"latitude":"north","longitude":12.5,"sidebarEnabled":true,"mapZoom":null}"#,
        );
        assert_eq!(attrs.latitude, 0.0);
        assert_eq!(attrs.longitude, 12.5);
        assert!(attrs.sidebar_enabled);
        assert_eq!(attrs.map_zoom, 1.0);
    }

    #[test]
    fn test_camera_values_are_clamped_on_parse() {
        let attrs = parse_attributes(r#"{"latitude":300,"pitch":-5,"mapZoom":40}"#);
        assert_eq!(attrs.latitude, 90.0);
        assert_eq!(attrs.pitch, 0.0);
        assert_eq!(attrs.map_zoom, 15.0);
    }

    #[test]
    fn test_invalid_listing_is_dropped_others_kept() {
        let attrs = parse_attributes(
            r#"{"mapboxOptions":{
                "tags":[{"id":0,"value":"cafe"}],
                "filters":"nope",
                "listings":[
                    {"id":1,"geometry":{"type":"Point","coordinates":[10,20]},"properties":{"name":"A"}},
                    {"id":"two"},
                    {"id":3,"geometry":{"coordinates":[11,21]}}
                ]}}"#,
        );
        let opts = &attrs.mapbox_options;
        assert_eq!(opts.tags.len(), 1);
        assert!(opts.filters.is_empty());
        let ids: Vec<u32> = opts.listings.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(opts.listings[0].properties.name, "A");
    }

    #[test]
    fn test_repeated_ids_keep_first_entry() {
        let opts = parse_options_strict(
            r#"{
                "tags":[{"id":0,"value":"cafe"},{"id":0,"value":"bar"}],
                "filters":[{"id":2,"value":"gold"},{"id":2,"value":"gold"}],
                "icons":[{"id":5,"name":"a","content":"<svg/>"},{"id":5,"name":"b","content":"<svg/>"}],
                "listings":[
                    {"id":1,"geometry":{"coordinates":[10,20]},"properties":{"name":"first",
                        "itemTags":[{"id":0,"value":"cafe"},{"id":0,"value":"cafe"}]}},
                    {"id":1,"geometry":{"coordinates":[11,21]},"properties":{"name":"second"}},
                    {"id":2,"geometry":{"coordinates":[12,22]}}
                ]}"#,
        )
        .unwrap();
        assert_eq!(opts.tags.len(), 1);
        assert_eq!(opts.tags[0].value, "cafe");
        assert_eq!(opts.filters.len(), 1);
        assert_eq!(opts.icons.len(), 1);
        assert_eq!(opts.icons[0].name, "a");
        let ids: Vec<u32> = opts.listings.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(opts.listings[0].properties.name, "first");
        assert_eq!(opts.listings[0].properties.item_tags.len(), 1);
    }

    #[test]
    fn test_listing_outside_the_map_is_dropped() {
        let opts = parse_options_strict(
            r#"{"listings":[
                {"id":1,"geometry":{"coordinates":[500,100]}},
                {"id":2,"geometry":{"coordinates":[-180,90]}},
                {"id":3,"geometry":{"coordinates":[10,-91]}}
            ]}"#,
        )
        .unwrap();
        let ids: Vec<u32> = opts.listings.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_round_trip_keeps_listings() {
        let mut attrs = BlockAttributes::default();
        attrs.mapbox_options.listings.push(Listing::new_at(
            4,
            crate::models::LngLat::new(9.19, 45.46),
        ));
        attrs.fit_view = true;
        let back = parse_attributes(&attrs.to_json());
        assert_eq!(back, attrs);
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let json: Value = serde_json::from_str(&BlockAttributes::default().to_json()).unwrap();
        assert!(json.get("mapZoom").is_some());
        assert!(json.get("mouseWheelZoom").is_some());
        assert!(json.get("mapboxOptions").is_some());
        assert_eq!(json["schemaVersion"], SCHEMA_VERSION);
    }

    #[test]
    fn test_strict_options_rejects_non_object() {
        assert!(matches!(
            parse_options_strict("[]"),
            Err(ConfigError::NotAnObject("an array"))
        ));
        assert!(matches!(parse_options_strict("{"), Err(ConfigError::Json(_))));
        let opts = parse_options_strict(r#"{"tags":[{"id":2,"value":"x"}]}"#).unwrap();
        assert_eq!(opts.tags[0].id, 2);
    }

    #[test]
    fn test_style_url() {
        assert_eq!(
            BlockAttributes::default().style_url(),
            "mapbox://styles/mapbox/streets-v12"
        );
    }
}
