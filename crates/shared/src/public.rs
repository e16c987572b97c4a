use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::config::BlockAttributes;
use crate::filter::FilterSelection;
use crate::models::{FilterKind, ItemId, Listing, LngLat, MapboxDefaults};
use crate::popup::{PopupContent, Prompt};
use crate::surface::MapSurface;
use crate::sync::{ClickOutcome, ClickTarget, MarkerSync, Mode, SyncDefect};
use crate::view::{fit_listings, FitRequest, SINGLE_POINT_ZOOM};

/// A block rendered on the public page: no editing, markers follow the
/// top-bar filter selection.
#[derive(Debug)]
pub struct PublicView {
    attributes: BlockAttributes,
    defaults: MapboxDefaults,
    selection: FilterSelection,
    sync: MarkerSync,
}

impl PublicView {
    pub fn new(attributes: BlockAttributes, defaults: MapboxDefaults) -> Self {
        PublicView {
            attributes,
            defaults,
            selection: FilterSelection::default(),
            sync: MarkerSync::new(),
        }
    }

    pub fn attributes(&self) -> &BlockAttributes {
        &self.attributes
    }

    pub fn defaults(&self) -> &MapboxDefaults {
        &self.defaults
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn visible(&self) -> Vec<&Listing> {
        self.selection.apply(&self.attributes.mapbox_options.listings)
    }

    pub fn visible_ids(&self) -> BTreeSet<ItemId> {
        self.visible().into_iter().map(|l| l.id).collect()
    }

    pub fn attach<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        let a = &self.attributes;
        surface.jump_to(&a.camera());
        surface.set_projection(&a.map_projection);
        surface.set_terrain(a.elevation);
        surface.set_free_view(a.free_view_camera);
        surface.set_wheel_zoom(a.mouse_wheel_zoom);
        let visible = self.selection.apply(&self.attributes.mapbox_options.listings);
        self.sync.reconcile(surface, visible.iter().copied());
        fit_listings(surface, visible);
        info!(
            listings = self.attributes.mapbox_options.listings.len(),
            "public map ready"
        );
    }

    /// Change one top-bar select and redraw the markers that pass both filters.
    pub fn set_filter<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        kind: FilterKind,
        value: &str,
    ) -> BTreeSet<ItemId> {
        self.selection.set(kind, value);
        let visible = self.selection.apply(&self.attributes.mapbox_options.listings);
        self.sync.reconcile(surface, visible.iter().copied());
        debug!(%kind, value, shown = visible.len(), "filter changed");
        visible.into_iter().map(|l| l.id).collect()
    }

    /// Fit the camera to the listings currently shown.
    pub fn fit_view<S: MapSurface + ?Sized>(&self, surface: &mut S) -> Option<FitRequest> {
        fit_listings(surface, self.visible())
    }

    pub fn on_click<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        target: ClickTarget,
        at: LngLat,
    ) -> ClickOutcome {
        let listings = &self.attributes.mapbox_options.listings;
        self.sync.handle_click(surface, target, at, listings, Mode::Public)
    }

    /// A sidebar entry was clicked: fly to its listing and show its details.
    pub fn focus<S: MapSurface + ?Sized>(&mut self, surface: &mut S, id: ItemId) -> bool {
        let Some(listing) = self.attributes.mapbox_options.find_listing(id) else {
            return false;
        };
        surface.fly_to(listing.coordinates(), SINGLE_POINT_ZOOM);
        let outcome = self.on_click(surface, ClickTarget::Marker(id), LngLat::new(0.0, 0.0));
        outcome == ClickOutcome::Selected(id)
    }

    /// A place picked in the sidebar search. Clicks cannot add markers here,
    /// so the place only gets an informational popup.
    pub fn locate<S: MapSurface + ?Sized>(&mut self, surface: &mut S, at: LngLat) {
        if !at.is_finite() {
            return;
        }
        surface.fly_to(at, SINGLE_POINT_ZOOM);
        self.sync
            .show_popup(surface, at, &PopupContent::Prompt(Prompt::find_location()));
    }

    pub fn verify(&self) -> Result<(), SyncDefect> {
        self.sync.verify(self.visible())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MapFilter;
    use crate::surface::testing::{FakeSurface, SurfaceCall};

    fn view() -> PublicView {
        let mut attrs = BlockAttributes::default();
        let mut cafe = Listing::new_at(1, LngLat::new(10.0, 10.0));
        cafe.properties.item_tags.push(MapFilter { id: 0, value: "Cafe".into() });
        cafe.properties.item_filters.push(MapFilter { id: 0, value: "partner".into() });
        let mut bar = Listing::new_at(2, LngLat::new(20.0, 20.0));
        bar.properties.item_tags.push(MapFilter { id: 0, value: "Bar".into() });
        attrs.mapbox_options.listings = vec![cafe, bar, Listing::new_at(3, LngLat::new(15.0, 12.0))];
        PublicView::new(attrs, MapboxDefaults::default())
    }

    #[test]
    fn test_attach_shows_all_and_fits() {
        let mut surface = FakeSurface::new();
        let mut public = view();
        public.attach(&mut surface);
        assert_eq!(surface.listing_marker_ids(), vec![1, 2, 3]);
        assert!(surface.calls.iter().any(|c| matches!(c, SurfaceCall::FitBounds { .. })));
        assert!(public.verify().is_ok());
    }

    #[test]
    fn test_filters_intersect() {
        let mut surface = FakeSurface::new();
        let mut public = view();
        public.attach(&mut surface);

        let shown = public.set_filter(&mut surface, FilterKind::Tags, "cafe");
        assert_eq!(shown, BTreeSet::from([1]));
        assert_eq!(surface.listing_marker_ids(), vec![1]);

        public.set_filter(&mut surface, FilterKind::Tags, "");
        let shown = public.set_filter(&mut surface, FilterKind::Filters, "partner");
        assert_eq!(shown, BTreeSet::from([1]));

        let shown = public.set_filter(&mut surface, FilterKind::Tags, "bar");
        assert!(shown.is_empty());
        assert!(surface.markers.is_empty());
        assert!(public.verify().is_ok());
    }

    #[test]
    fn test_map_click_adds_no_marker() {
        let mut surface = FakeSurface::new();
        let mut public = view();
        public.attach(&mut surface);
        public.on_click(&mut surface, ClickTarget::Map, LngLat::new(0.0, 0.0));
        assert!(surface.temporary_markers().is_empty());
    }

    #[test]
    fn test_focus_opens_details() {
        let mut surface = FakeSurface::new();
        let mut public = view();
        public.attach(&mut surface);
        assert!(public.focus(&mut surface, 2));
        assert_eq!(surface.popups.len(), 1);
        assert!(!public.focus(&mut surface, 99));
    }

    #[test]
    fn test_locate_flies_and_shows_prompt() {
        let mut surface = FakeSurface::new();
        let mut public = view();
        public.attach(&mut surface);
        public.locate(&mut surface, LngLat::new(3.0, 4.0));
        assert_eq!(
            surface.calls.iter().rev().find(|c| matches!(c, SurfaceCall::FlyTo(..))),
            Some(&SurfaceCall::FlyTo(LngLat::new(3.0, 4.0), SINGLE_POINT_ZOOM))
        );
        let (at, content) = surface.popups.values().next().unwrap();
        assert_eq!(*at, LngLat::new(3.0, 4.0));
        assert_eq!(*content, PopupContent::Prompt(Prompt::find_location()));
        assert!(surface.temporary_markers().is_empty());

        public.locate(&mut surface, LngLat::new(f64::NAN, 4.0));
        assert_eq!(surface.popups.len(), 1);
    }
}
