//! The editing session of one map block.
//!
//! The session owns the block attributes and the marker synchronizer. The
//! page that mounts the editor creates it, hands it the surface once the map
//! has loaded ([`EditorSession::attach`]) and drops the surface again on
//! unmount ([`EditorSession::detach`]). Field changes go through
//! [`AttributeChange`]; each variant lists the surface effects it triggers.

use tracing::{debug, info, warn};

use crate::camera::{Camera, CameraField};
use crate::config::{parse_options_strict, BlockAttributes, ConfigError};
use crate::ids::next_id;
use crate::models::{FilterKind, ItemId, Listing, LngLat, MapFilter, MapboxOptions, MarkerIcon, MarkerProps};
use crate::surface::MapSurface;
use crate::sync::{ClickOutcome, ClickTarget, MarkerSync, Mode, SyncDefect};
use crate::view::{fit_listings, FitRequest, SINGLE_POINT_ZOOM};

/// A change to one named block attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeChange {
    Align(String),
    Camera(CameraField, f64),
    /// Raw text typed into a camera control.
    CameraInput(CameraField, String),
    MapStyle(String),
    MapProjection(String),
    MapHeight(String),
    SidebarEnabled(bool),
    GeocoderEnabled(bool),
    FiltersEnabled(bool),
    TagsEnabled(bool),
    FitView(bool),
    Elevation(bool),
    FreeViewCamera(bool),
    MouseWheelZoom(bool),
}

/// Work a change asks of the map surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEffect {
    JumpTo(Camera),
    SetStyle(String),
    SetProjection(String),
    SetTerrain(bool),
    SetFreeView(bool),
    SetWheelZoom(bool),
    FitListings,
    /// Re-layout the surface after a short delay. Left to the caller, which
    /// owns the timer.
    Refresh,
}

#[derive(Debug, Default)]
pub struct EditorSession {
    attributes: BlockAttributes,
    sync: MarkerSync,
    last_click: Option<LngLat>,
    attached: bool,
}

impl EditorSession {
    pub fn new(attributes: BlockAttributes) -> Self {
        EditorSession {
            attributes,
            ..Default::default()
        }
    }

    pub fn attributes(&self) -> &BlockAttributes {
        &self.attributes
    }

    pub fn options(&self) -> &MapboxOptions {
        &self.attributes.mapbox_options
    }

    pub fn listings(&self) -> &[Listing] {
        &self.attributes.mapbox_options.listings
    }

    pub fn last_click(&self) -> Option<LngLat> {
        self.last_click
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn marker_sync(&self) -> &MarkerSync {
        &self.sync
    }

    /// Bring a freshly loaded surface in line with the attributes.
    pub fn attach<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        let a = &self.attributes;
        surface.jump_to(&a.camera());
        surface.set_projection(&a.map_projection);
        surface.set_terrain(a.elevation);
        surface.set_free_view(a.free_view_camera);
        surface.set_wheel_zoom(a.mouse_wheel_zoom);
        self.sync.reconcile(surface, &self.attributes.mapbox_options.listings);
        if self.attributes.fit_view {
            fit_listings(surface, &self.attributes.mapbox_options.listings);
        }
        self.attached = true;
        info!(listings = self.listings().len(), "editor session attached");
    }

    /// Forget the surface. Its markers and popups go with it.
    pub fn detach(&mut self) {
        self.sync.forget();
        self.attached = false;
        debug!("editor session detached");
    }

    /// Record a field change and return the surface effects it triggers.
    pub fn apply(&mut self, change: AttributeChange) -> Vec<SurfaceEffect> {
        let a = &mut self.attributes;
        match change {
            AttributeChange::Align(align) => {
                a.align = align;
                vec![SurfaceEffect::Refresh]
            }
            AttributeChange::Camera(field, value) => {
                let mut camera = a.camera();
                if !camera.set(field, value) {
                    warn!(?field, value, "ignoring non-finite camera value");
                    return Vec::new();
                }
                a.set_camera(camera);
                vec![SurfaceEffect::JumpTo(a.camera())]
            }
            AttributeChange::CameraInput(field, raw) => {
                let mut camera = a.camera();
                if !camera.set_from_input(field, &raw) {
                    debug!(?field, raw = %raw, "ignoring camera input");
                    return Vec::new();
                }
                a.set_camera(camera);
                vec![SurfaceEffect::JumpTo(a.camera())]
            }
            AttributeChange::MapStyle(style) => {
                a.map_style = style;
                let mut effects = vec![SurfaceEffect::SetStyle(a.style_url())];
                // A new style drops the terrain source.
                if a.elevation {
                    effects.push(SurfaceEffect::SetTerrain(true));
                }
                effects.push(SurfaceEffect::Refresh);
                effects
            }
            AttributeChange::MapProjection(projection) => {
                a.map_projection = projection.clone();
                vec![SurfaceEffect::SetProjection(projection)]
            }
            AttributeChange::MapHeight(height) => {
                a.map_height = height;
                vec![SurfaceEffect::Refresh]
            }
            AttributeChange::SidebarEnabled(enabled) => {
                a.sidebar_enabled = enabled;
                if !enabled {
                    a.geocoder_enabled = false;
                }
                vec![SurfaceEffect::Refresh]
            }
            AttributeChange::GeocoderEnabled(enabled) => {
                a.geocoder_enabled = enabled && a.sidebar_enabled;
                Vec::new()
            }
            AttributeChange::FiltersEnabled(enabled) => {
                a.filters_enabled = enabled;
                Vec::new()
            }
            AttributeChange::TagsEnabled(enabled) => {
                a.tags_enabled = enabled;
                Vec::new()
            }
            AttributeChange::FitView(enabled) => {
                a.fit_view = enabled;
                if enabled {
                    vec![SurfaceEffect::FitListings, SurfaceEffect::Refresh]
                } else {
                    vec![SurfaceEffect::Refresh]
                }
            }
            AttributeChange::Elevation(enabled) => {
                a.elevation = enabled;
                vec![SurfaceEffect::SetTerrain(enabled), SurfaceEffect::Refresh]
            }
            AttributeChange::FreeViewCamera(enabled) => {
                a.free_view_camera = enabled;
                let mut effects = vec![SurfaceEffect::SetFreeView(enabled)];
                if !enabled {
                    a.set_camera(a.camera().flattened());
                    effects.push(SurfaceEffect::JumpTo(a.camera()));
                }
                effects.push(SurfaceEffect::Refresh);
                effects
            }
            AttributeChange::MouseWheelZoom(enabled) => {
                a.mouse_wheel_zoom = enabled;
                vec![SurfaceEffect::SetWheelZoom(enabled), SurfaceEffect::Refresh]
            }
        }
    }

    /// Run effects against the surface. Returns whether a deferred refresh
    /// was requested.
    pub fn run_effects<S: MapSurface + ?Sized>(&mut self, surface: &mut S, effects: Vec<SurfaceEffect>) -> bool {
        let mut refresh = false;
        for effect in effects {
            match effect {
                SurfaceEffect::JumpTo(camera) => surface.jump_to(&camera),
                SurfaceEffect::SetStyle(url) => surface.set_style(&url),
                SurfaceEffect::SetProjection(p) => surface.set_projection(&p),
                SurfaceEffect::SetTerrain(on) => surface.set_terrain(on),
                SurfaceEffect::SetFreeView(on) => surface.set_free_view(on),
                SurfaceEffect::SetWheelZoom(on) => surface.set_wheel_zoom(on),
                SurfaceEffect::FitListings => {
                    fit_listings(surface, &self.attributes.mapbox_options.listings);
                }
                SurfaceEffect::Refresh => refresh = true,
            }
        }
        refresh
    }

    /// `apply` followed by `run_effects`, or only `apply` while detached.
    pub fn update<S: MapSurface + ?Sized>(&mut self, surface: Option<&mut S>, change: AttributeChange) -> bool {
        let effects = self.apply(change);
        match surface {
            Some(surface) if self.attached => self.run_effects(surface, effects),
            _ => false,
        }
    }

    /// Copy the live camera into the attributes. Used both by the "pull
    /// current view" action and after the user drags the map.
    pub fn pull_camera<S: MapSurface + ?Sized>(&mut self, surface: &S) -> Camera {
        self.attributes.set_camera(surface.camera());
        self.attributes.camera()
    }

    fn resync<S: MapSurface + ?Sized>(&mut self, surface: Option<&mut S>) {
        if let Some(surface) = surface {
            if self.attached {
                self.sync
                    .reconcile(surface, &self.attributes.mapbox_options.listings);
            }
        }
    }

    /// Replace the listing with the same id. Returns `false` for an unknown id.
    pub fn save_listing<S: MapSurface + ?Sized>(&mut self, surface: Option<&mut S>, listing: Listing) -> bool {
        let listings = &mut self.attributes.mapbox_options.listings;
        let Some(slot) = listings.iter_mut().find(|l| l.id == listing.id) else {
            warn!(id = listing.id, "cannot save unknown listing");
            return false;
        };
        *slot = listing;
        self.resync(surface);
        true
    }

    pub fn delete_listing<S: MapSurface + ?Sized>(&mut self, surface: Option<&mut S>, id: ItemId) -> bool {
        let listings = &mut self.attributes.mapbox_options.listings;
        let before = listings.len();
        listings.retain(|l| l.id != id);
        let removed = listings.len() != before;
        if removed {
            self.resync(surface);
        }
        removed
    }

    /// Move the listing at `from` to position `to`. Markers are unaffected.
    pub fn move_listing(&mut self, from: usize, to: usize) -> bool {
        move_item(&mut self.attributes.mapbox_options.listings, from, to)
    }

    pub fn set_listings<S: MapSurface + ?Sized>(&mut self, surface: Option<&mut S>, listings: Vec<Listing>) {
        self.attributes.mapbox_options.listings = listings;
        self.resync(surface);
    }

    /// Add a tag or filter value to the block. An existing value keeps its id.
    pub fn add_entry(&mut self, kind: FilterKind, value: &str) -> Option<ItemId> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let entries = self.attributes.mapbox_options.collection_mut(kind);
        if let Some(existing) = entries.iter().find(|e| e.value == value) {
            return Some(existing.id);
        }
        let id = next_id(entries);
        entries.push(MapFilter {
            id,
            value: value.to_string(),
        });
        Some(id)
    }

    /// Rename a tag or filter, carrying the new value into every listing.
    /// A value another entry already has is refused.
    pub fn rename_entry(&mut self, kind: FilterKind, id: ItemId, value: &str) -> bool {
        let value = value.trim();
        let opts = &mut self.attributes.mapbox_options;
        if opts.collection(kind).iter().any(|e| e.id != id && e.value == value) {
            debug!(%kind, id, value, "rename refused, value already taken");
            return false;
        }
        let Some(entry) = opts.collection_mut(kind).iter_mut().find(|e| e.id == id) else {
            return false;
        };
        if value.is_empty() || entry.value == value {
            return false;
        }
        let old = std::mem::replace(&mut entry.value, value.to_string());
        for listing in &mut opts.listings {
            for e in listing.properties.entries_mut(kind).iter_mut() {
                if e.value == old {
                    e.value = value.to_string();
                }
            }
        }
        true
    }

    /// Remove a tag or filter and take it off every listing.
    pub fn remove_entry(&mut self, kind: FilterKind, id: ItemId) -> bool {
        let opts = &mut self.attributes.mapbox_options;
        let entries = opts.collection_mut(kind);
        let Some(pos) = entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let removed = entries.remove(pos);
        for listing in &mut opts.listings {
            listing
                .properties
                .entries_mut(kind)
                .retain(|e| e.value != removed.value);
        }
        true
    }

    pub fn move_entry(&mut self, kind: FilterKind, from: usize, to: usize) -> bool {
        move_item(self.attributes.mapbox_options.collection_mut(kind), from, to)
    }

    /// Add an icon to the block library. An icon with the same name is replaced.
    pub fn add_icon(&mut self, name: &str, content: &str) -> ItemId {
        let icons = &mut self.attributes.mapbox_options.icons;
        if let Some(icon) = icons.iter_mut().find(|i| i.name == name) {
            icon.content = content.to_string();
            return icon.id;
        }
        let id = next_id(icons);
        icons.push(MarkerIcon {
            id,
            name: name.to_string(),
            content: content.to_string(),
        });
        id
    }

    pub fn rename_icon(&mut self, id: ItemId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match self.attributes.mapbox_options.icons.iter_mut().find(|i| i.id == id) {
            Some(icon) => {
                icon.name = name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove_icon(&mut self, id: ItemId) -> bool {
        let icons = &mut self.attributes.mapbox_options.icons;
        let before = icons.len();
        icons.retain(|i| i.id != id);
        icons.len() != before
    }

    pub fn move_icon(&mut self, from: usize, to: usize) -> bool {
        move_item(&mut self.attributes.mapbox_options.icons, from, to)
    }

    /// Replace `mapboxOptions` with an imported document. Only a JSON object is
    /// accepted; on error nothing changes.
    pub fn import_options<S: MapSurface + ?Sized>(&mut self, surface: Option<&mut S>, raw: &str) -> Result<(), ConfigError> {
        let options = parse_options_strict(raw)?;
        info!(listings = options.listings.len(), "mapbox options imported");
        self.attributes.mapbox_options = options;
        self.resync(surface);
        Ok(())
    }

    pub fn export_options(&self) -> String {
        serde_json::to_string_pretty(&self.attributes.mapbox_options).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn on_map_click<S: MapSurface + ?Sized>(&mut self, surface: &mut S, target: ClickTarget, at: LngLat) -> ClickOutcome {
        if target == ClickTarget::Map {
            self.last_click = Some(at);
        }
        self.sync
            .handle_click(surface, target, at, &self.attributes.mapbox_options.listings, Mode::Editor)
    }

    pub fn confirm_temporary<S: MapSurface + ?Sized>(&mut self, surface: &mut S) -> Option<ItemId> {
        self.sync
            .confirm_temporary(surface, &mut self.attributes.mapbox_options.listings)
    }

    pub fn cancel_temporary<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        self.sync.cancel_temporary(surface);
    }

    /// A place picked in the geocoder: fly there and remember it as the last click.
    pub fn locate<S: MapSurface + ?Sized>(&mut self, surface: &mut S, at: LngLat) {
        if !at.is_finite() {
            return;
        }
        self.last_click = Some(at);
        surface.fly_to(at, SINGLE_POINT_ZOOM);
    }

    pub fn fit_view<S: MapSurface + ?Sized>(&self, surface: &mut S) -> Option<FitRequest> {
        fit_listings(surface, &self.attributes.mapbox_options.listings)
    }

    pub fn verify(&self) -> Result<(), SyncDefect> {
        self.sync.verify(&self.attributes.mapbox_options.listings)
    }
}

/// Re-measure the map after a layout change. Does nothing once the map is
/// unmounted; returns whether a resize was issued.
pub fn refresh_layout<S: MapSurface + ?Sized>(surface: &mut S) -> bool {
    if !surface.is_mounted() {
        debug!("map unmounted, skipping refresh");
        return false;
    }
    surface.resize();
    true
}

/// Check or uncheck `value` in a listing's tag or filter set. A new entry gets
/// the next id of that set.
pub fn toggle_entry(props: &mut MarkerProps, kind: FilterKind, value: &str, checked: bool) {
    let entries = props.entries_mut(kind);
    if checked {
        if !entries.iter().any(|e| e.value == value) {
            let id = next_id(entries);
            entries.push(MapFilter {
                id,
                value: value.to_string(),
            });
        }
    } else {
        entries.retain(|e| e.value != value);
    }
}

fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::testing::{FakeSurface, SurfaceCall};

    fn session_with(ids: &[ItemId]) -> EditorSession {
        let mut attrs = BlockAttributes::default();
        attrs.mapbox_options.listings = ids
            .iter()
            .map(|&id| Listing::new_at(id, LngLat::new(id as f64, id as f64)))
            .collect();
        EditorSession::new(attrs)
    }

    #[test]
    fn test_attach_renders_markers() {
        let mut surface = FakeSurface::new();
        let mut session = session_with(&[1, 2]);
        session.attach(&mut surface);
        assert!(session.is_attached());
        assert_eq!(surface.listing_marker_ids(), vec![1, 2]);
        assert!(session.verify().is_ok());
    }

    #[test]
    fn test_attach_fits_view_when_enabled() {
        let mut surface = FakeSurface::new();
        let mut session = session_with(&[1, 5]);
        session.apply(AttributeChange::FitView(true));
        session.attach(&mut surface);
        assert!(surface.calls.iter().any(|c| matches!(c, SurfaceCall::FitBounds { .. })));
    }

    #[test]
    fn test_camera_change_clamps_and_jumps() {
        let mut session = EditorSession::default();
        let effects = session.apply(AttributeChange::Camera(CameraField::Pitch, 120.0));
        assert_eq!(session.attributes().pitch, 90.0);
        assert_eq!(effects, vec![SurfaceEffect::JumpTo(session.attributes().camera())]);
        assert!(session
            .apply(AttributeChange::CameraInput(CameraField::Zoom, "abc".into()))
            .is_empty());
        assert!(session.apply(AttributeChange::Camera(CameraField::Zoom, f64::NAN)).is_empty());
        assert_eq!(session.attributes().map_zoom, 1.0);
    }

    #[test]
    fn test_sidebar_off_disables_geocoder() {
        let mut session = EditorSession::default();
        session.apply(AttributeChange::GeocoderEnabled(true));
        assert!(!session.attributes().geocoder_enabled);
        session.apply(AttributeChange::SidebarEnabled(true));
        session.apply(AttributeChange::GeocoderEnabled(true));
        assert!(session.attributes().geocoder_enabled);
        let effects = session.apply(AttributeChange::SidebarEnabled(false));
        assert!(!session.attributes().geocoder_enabled);
        assert_eq!(effects, vec![SurfaceEffect::Refresh]);
    }

    #[test]
    fn test_free_view_off_flattens_camera() {
        let mut session = EditorSession::default();
        session.apply(AttributeChange::FreeViewCamera(true));
        session.apply(AttributeChange::Camera(CameraField::Bearing, 40.0));
        session.apply(AttributeChange::Camera(CameraField::Pitch, 30.0));
        let effects = session.apply(AttributeChange::FreeViewCamera(false));
        assert_eq!(session.attributes().bearing, 0.0);
        assert_eq!(session.attributes().pitch, 0.0);
        assert!(effects.contains(&SurfaceEffect::SetFreeView(false)));
    }

    #[test]
    fn test_style_change_restores_terrain() {
        let mut session = EditorSession::default();
        session.apply(AttributeChange::Elevation(true));
        let effects = session.apply(AttributeChange::MapStyle("dark-v11".into()));
        assert_eq!(
            effects,
            vec![
                SurfaceEffect::SetStyle("mapbox://styles/mapbox/dark-v11".into()),
                SurfaceEffect::SetTerrain(true),
                SurfaceEffect::Refresh,
            ]
        );
    }

    #[test]
    fn test_run_effects_reports_refresh() {
        let mut surface = FakeSurface::new();
        let mut session = EditorSession::default();
        session.attach(&mut surface);
        assert!(session.update(Some(&mut surface), AttributeChange::MouseWheelZoom(false)));
        assert!(surface.calls.contains(&SurfaceCall::SetWheelZoom(false)));
        assert!(!session.update(Some(&mut surface), AttributeChange::MapProjection("globe".into())));
        assert!(surface.calls.contains(&SurfaceCall::SetProjection("globe".into())));
    }

    #[test]
    fn test_update_while_detached_only_records() {
        let mut surface = FakeSurface::new();
        let mut session = EditorSession::default();
        assert!(!session.update(Some(&mut surface), AttributeChange::Elevation(true)));
        assert!(session.attributes().elevation);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn test_save_and_delete_listing() {
        let mut surface = FakeSurface::new();
        let mut session = session_with(&[1, 3]);
        session.attach(&mut surface);

        let mut edited = session.listings()[1].clone();
        edited.properties.name = "Museum".into();
        edited.geometry.coordinates = LngLat::new(8.0, 9.0);
        assert!(session.save_listing(Some(&mut surface), edited));
        assert_eq!(session.listings()[1].properties.name, "Museum");
        assert!(surface.markers.values().any(|m| m.at == LngLat::new(8.0, 9.0)));

        assert!(!session.save_listing(Some(&mut surface), Listing::new_at(42, LngLat::new(0.0, 0.0))));
        assert!(session.delete_listing(Some(&mut surface), 1));
        assert!(!session.delete_listing(Some(&mut surface), 1));
        assert_eq!(surface.listing_marker_ids(), vec![3]);
        assert!(session.verify().is_ok());
    }

    #[test]
    fn test_move_listing() {
        let mut session = session_with(&[1, 2, 3]);
        assert!(session.move_listing(0, 2));
        let ids: Vec<ItemId> = session.listings().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert!(!session.move_listing(5, 0));
    }

    #[test]
    fn test_map_click_then_confirm() {
        let mut surface = FakeSurface::new();
        let mut session = session_with(&[1, 3]);
        session.attach(&mut surface);
        let c = LngLat::new(12.0, 41.0);
        session.on_map_click(&mut surface, ClickTarget::Map, c);
        assert_eq!(session.last_click(), Some(c));
        assert_eq!(session.confirm_temporary(&mut surface), Some(4));
        assert_eq!(session.listings().last().map(|l| l.coordinates()), Some(c));
        assert!(session.verify().is_ok());
    }

    #[test]
    fn test_entries_add_rename_remove() {
        let mut session = session_with(&[1]);
        let cafe = session.add_entry(FilterKind::Tags, " cafe ").unwrap();
        assert_eq!(cafe, 0);
        assert_eq!(session.add_entry(FilterKind::Tags, "cafe"), Some(0));
        assert_eq!(session.add_entry(FilterKind::Tags, "bar"), Some(1));
        assert_eq!(session.add_entry(FilterKind::Filters, "partner"), Some(0));
        assert!(session.add_entry(FilterKind::Tags, "  ").is_none());

        let mut listing = session.listings()[0].clone();
        toggle_entry(&mut listing.properties, FilterKind::Tags, "cafe", true);
        session.save_listing(None::<&mut FakeSurface>, listing);

        assert!(session.rename_entry(FilterKind::Tags, cafe, "coffee"));
        assert_eq!(session.listings()[0].properties.item_tags[0].value, "coffee");

        assert!(session.remove_entry(FilterKind::Tags, cafe));
        assert!(session.listings()[0].properties.item_tags.is_empty());
        assert_eq!(session.options().tags.len(), 1);
    }

    #[test]
    fn test_rename_entry_refuses_taken_value() {
        let mut session = session_with(&[]);
        let cafe = session.add_entry(FilterKind::Tags, "cafe").unwrap();
        session.add_entry(FilterKind::Tags, "bar");
        assert!(!session.rename_entry(FilterKind::Tags, cafe, " bar "));
        let values: Vec<&str> = session.options().tags.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["cafe", "bar"]);
        // Same value in the other collection is fine.
        session.add_entry(FilterKind::Filters, "bar");
        assert!(session.rename_entry(FilterKind::Tags, cafe, "pub"));
    }

    #[test]
    fn test_refresh_layout_skips_unmounted_map() {
        let mut surface = FakeSurface::new();
        surface.mounted = false;
        assert!(!refresh_layout(&mut surface));
        assert!(!surface.calls.contains(&SurfaceCall::Resize));

        surface.mounted = true;
        assert!(refresh_layout(&mut surface));
        assert_eq!(surface.calls.iter().filter(|c| **c == SurfaceCall::Resize).count(), 1);
    }

    #[test]
    fn test_toggle_entry_allocates_inside_listing() {
        let mut props = MarkerProps::default();
        toggle_entry(&mut props, FilterKind::Filters, "a", true);
        toggle_entry(&mut props, FilterKind::Filters, "b", true);
        toggle_entry(&mut props, FilterKind::Filters, "b", true);
        assert_eq!(props.item_filters.len(), 2);
        assert_eq!(props.item_filters[1].id, 1);
        toggle_entry(&mut props, FilterKind::Filters, "a", false);
        assert_eq!(props.item_filters.len(), 1);
        assert!(props.item_tags.is_empty());
    }

    #[test]
    fn test_icons() {
        let mut session = EditorSession::default();
        let pin = session.add_icon("pin", "<svg/>");
        let star = session.add_icon("star", "<svg/>");
        assert_eq!((pin, star), (0, 1));
        assert_eq!(session.add_icon("pin", "<svg id=\"x\"/>"), pin);
        assert!(session.rename_icon(star, "flag"));
        assert!(session.options().find_icon("flag").is_some());
        assert!(session.move_icon(1, 0));
        assert!(session.remove_icon(pin));
        assert_eq!(session.options().icons.len(), 1);
    }

    #[test]
    fn test_import_rejects_non_object_and_keeps_state() {
        let mut surface = FakeSurface::new();
        let mut session = session_with(&[1]);
        session.attach(&mut surface);
        assert!(session.import_options(Some(&mut surface), "[]").is_err());
        assert_eq!(session.listings().len(), 1);

        let exported = session.export_options();
        session
            .import_options(Some(&mut surface), r#"{"listings":[]}"#)
            .unwrap();
        assert!(surface.markers.is_empty());
        session.import_options(Some(&mut surface), &exported).unwrap();
        assert_eq!(surface.listing_marker_ids(), vec![1]);
    }

    #[test]
    fn test_pull_camera() {
        let mut surface = FakeSurface::new();
        surface.camera = Camera {
            latitude: 45.0,
            longitude: 9.0,
            pitch: 10.0,
            bearing: 5.0,
            zoom: 7.0,
        };
        let mut session = EditorSession::default();
        session.pull_camera(&surface);
        assert_eq!(session.attributes().camera(), surface.camera);
    }

    #[test]
    fn test_locate_records_last_click() {
        let mut surface = FakeSurface::new();
        let mut session = EditorSession::default();
        session.locate(&mut surface, LngLat::new(2.35, 48.85));
        assert_eq!(session.last_click(), Some(LngLat::new(2.35, 48.85)));
        assert_eq!(surface.camera.zoom, SINGLE_POINT_ZOOM);
        session.locate(&mut surface, LngLat::new(f64::NAN, 0.0));
        assert_eq!(session.last_click(), Some(LngLat::new(2.35, 48.85)));
    }

    #[test]
    fn test_detach_forgets_markers() {
        let mut surface = FakeSurface::new();
        let mut session = session_with(&[1]);
        session.attach(&mut surface);
        session.detach();
        assert!(!session.is_attached());
        assert!(session.marker_sync().rendered_ids().is_empty());
    }
}
