use serde::{Deserialize, Serialize};

/// Identifier of a listing, tag, filter or icon inside its own collection.
pub type ItemId = u32;

pub const DEFAULT_MARKER_NAME: &str = "New";
pub const DEFAULT_MARKER_ICON: &str = "default";
pub const DEFAULT_MARKER_SIZE: u32 = 48;
pub const DEFAULT_MARKER_COLOR: &str = "red";

/// Anything stored in an id-keyed collection.
pub trait HasId {
    fn id(&self) -> ItemId;
}

/// A geographic point. Serialized as `[lng, lat]` like GeoJSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        LngLat { lng, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(pair: [f64; 2]) -> Self {
        LngLat {
            lng: pair[0],
            lat: pair[1],
        }
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(p: LngLat) -> Self {
        [p.lng, p.lat]
    }
}

impl std::fmt::Display for LngLat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lng, self.lat)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type", default = "point_type")]
    pub kind: String,
    pub coordinates: LngLat,
}

fn point_type() -> String {
    "Point".to_string()
}

impl Geometry {
    pub fn point(at: LngLat) -> Self {
        Geometry {
            kind: point_type(),
            coordinates: at,
        }
    }
}

/// A named category a listing can be tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapFilter {
    pub id: ItemId,
    pub value: String,
}

impl MapFilter {
    /// Whether a top-bar selection refers to this entry. The selects use the
    /// slug of the value as option value, hand-written selections use the value.
    pub fn matches(&self, selection: &str) -> bool {
        self.value == selection || safe_slug(&self.value) == selection
    }
}

impl HasId for MapFilter {
    fn id(&self) -> ItemId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerIcon {
    pub id: ItemId,
    pub name: String,
    /// SVG markup of the icon.
    #[serde(default)]
    pub content: String,
}

impl HasId for MarkerIcon {
    fn id(&self) -> ItemId {
        self.id
    }
}

/// Display properties of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkerProps {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "phone")]
    pub telephone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_color: Option<String>,
    pub item_tags: Vec<MapFilter>,
    pub item_filters: Vec<MapFilter>,
}

impl Default for MarkerProps {
    fn default() -> Self {
        MarkerProps {
            name: DEFAULT_MARKER_NAME.to_string(),
            description: None,
            telephone: None,
            address: None,
            city: None,
            postal_code: None,
            country: None,
            state: None,
            email_address: None,
            website: None,
            icon: Some(DEFAULT_MARKER_ICON.to_string()),
            icon_size: Some(DEFAULT_MARKER_SIZE),
            icon_color: Some(DEFAULT_MARKER_COLOR.to_string()),
            item_tags: Vec::new(),
            item_filters: Vec::new(),
        }
    }
}

impl MarkerProps {
    pub fn icon_name(&self) -> &str {
        self.icon.as_deref().unwrap_or(DEFAULT_MARKER_ICON)
    }

    pub fn icon_size(&self) -> u32 {
        self.icon_size.unwrap_or(DEFAULT_MARKER_SIZE)
    }

    pub fn icon_color(&self) -> &str {
        self.icon_color.as_deref().unwrap_or(DEFAULT_MARKER_COLOR)
    }

    /// The tag or filter set selected by `kind`.
    pub fn entries(&self, kind: FilterKind) -> &[MapFilter] {
        match kind {
            FilterKind::Tags => &self.item_tags,
            FilterKind::Filters => &self.item_filters,
        }
    }

    pub fn entries_mut(&mut self, kind: FilterKind) -> &mut Vec<MapFilter> {
        match kind {
            FilterKind::Tags => &mut self.item_tags,
            FilterKind::Filters => &mut self.item_filters,
        }
    }
}

/// The two independent category collections of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    /// `tags` / `itemTags`, shown as the "tag" select.
    Tags,
    /// `filters` / `itemFilters`, shown as the "partnership" select.
    Filters,
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterKind::Tags => write!(f, "tags"),
            FilterKind::Filters => write!(f, "filters"),
        }
    }
}

/// A point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ItemId,
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    #[serde(default)]
    pub properties: MarkerProps,
    pub geometry: Geometry,
}

fn feature_type() -> String {
    "Feature".to_string()
}

impl Listing {
    /// A fresh listing with default properties at `at`.
    pub fn new_at(id: ItemId, at: LngLat) -> Self {
        Listing {
            id,
            kind: feature_type(),
            properties: MarkerProps::default(),
            geometry: Geometry::point(at),
        }
    }

    pub fn coordinates(&self) -> LngLat {
        self.geometry.coordinates
    }
}

impl HasId for Listing {
    fn id(&self) -> ItemId {
        self.id
    }
}

/// Everything the block keeps about its markers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapboxOptions {
    pub icons: Vec<MarkerIcon>,
    pub tags: Vec<MapFilter>,
    pub filters: Vec<MapFilter>,
    pub listings: Vec<Listing>,
}

impl MapboxOptions {
    pub fn collection(&self, kind: FilterKind) -> &[MapFilter] {
        match kind {
            FilterKind::Tags => &self.tags,
            FilterKind::Filters => &self.filters,
        }
    }

    pub fn collection_mut(&mut self, kind: FilterKind) -> &mut Vec<MapFilter> {
        match kind {
            FilterKind::Tags => &mut self.tags,
            FilterKind::Filters => &mut self.filters,
        }
    }

    pub fn find_listing(&self, id: ItemId) -> Option<&Listing> {
        self.listings.iter().find(|l| l.id == id)
    }

    pub fn find_icon(&self, name: &str) -> Option<&MarkerIcon> {
        self.icons.iter().find(|i| i.name == name)
    }
}

/// Host-provided environment of a block: credential and locale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapboxDefaults {
    pub access_token: Option<String>,
    pub site_url: String,
    pub language: String,
}

impl MapboxDefaults {
    /// The access token, when one is configured and non-blank.
    pub fn credential(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Two-letter language code used for map labels.
    pub fn label_language(&self) -> &str {
        let lang = self.language.get(..2).unwrap_or("");
        if lang.chars().all(|c| c.is_ascii_alphabetic()) && lang.len() == 2 {
            lang
        } else {
            "en"
        }
    }
}

/// A stored block document as the host keeps it.
#[cfg(feature = "uuid-support")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockRecord {
    pub id: uuid::Uuid,
    pub name: String,
    pub attributes: crate::config::BlockAttributes,
    pub created_at: String,
    pub updated_at: String,
}

/// Generate a URL-safe slug from a display value.
pub fn safe_slug(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
