//! The seam between the core and the mapping library.

use crate::camera::Camera;
use crate::models::{ItemId, LngLat, Listing};
use crate::popup::PopupContent;
use crate::view::BoundingBox;

/// Opaque handle of a marker object living on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

/// Opaque handle of an open popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PopupHandle(pub u64);

/// Everything a surface needs to draw one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    /// `None` for the temporary marker.
    pub listing_id: Option<ItemId>,
    pub at: LngLat,
    pub name: String,
    pub icon: String,
    pub icon_size: u32,
    pub icon_color: String,
}

impl MarkerSpec {
    pub fn for_listing(listing: &Listing) -> Self {
        let props = &listing.properties;
        MarkerSpec {
            listing_id: Some(listing.id),
            at: listing.coordinates(),
            name: props.name.clone(),
            icon: props.icon_name().to_string(),
            icon_size: props.icon_size(),
            icon_color: props.icon_color().to_string(),
        }
    }

    pub fn temporary(at: LngLat) -> Self {
        let props = crate::models::MarkerProps::default();
        MarkerSpec {
            listing_id: None,
            at,
            name: "temp".to_string(),
            icon: props.icon_name().to_string(),
            icon_size: props.icon_size(),
            icon_color: props.icon_color().to_string(),
        }
    }

    pub fn is_temporary(&self) -> bool {
        self.listing_id.is_none()
    }

    /// DOM id of the marker element.
    pub fn element_id(&self) -> String {
        match self.listing_id {
            Some(id) => format!("marker-{}", id),
            None => "marker-temp".to_string(),
        }
    }
}

/// A live map the core can drive.
///
/// Implementations hand out handles for markers and popups and keep the
/// underlying objects; the core never touches those objects directly.
pub trait MapSurface {
    fn camera(&self) -> Camera;
    fn jump_to(&mut self, camera: &Camera);
    fn fit_bounds(&mut self, bounds: &BoundingBox, padding: f64, max_zoom: f64);
    fn fly_to(&mut self, center: LngLat, zoom: f64);

    fn add_marker(&mut self, spec: &MarkerSpec) -> MarkerHandle;
    /// Restyle/move an existing marker without recreating it.
    fn update_marker(&mut self, handle: MarkerHandle, spec: &MarkerSpec);
    fn remove_marker(&mut self, handle: MarkerHandle);

    fn open_popup(&mut self, at: LngLat, content: &PopupContent, offset: f64) -> PopupHandle;
    fn close_popup(&mut self, handle: PopupHandle);

    fn set_style(&mut self, style_url: &str);
    fn set_projection(&mut self, projection: &str);
    fn set_terrain(&mut self, enabled: bool);
    fn set_free_view(&mut self, enabled: bool);
    fn set_wheel_zoom(&mut self, enabled: bool);

    fn resize(&mut self);
    /// Whether the container is still in the document.
    fn is_mounted(&self) -> bool;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum SurfaceCall {
        JumpTo(Camera),
        FitBounds {
            bounds: BoundingBox,
            padding: f64,
            max_zoom: f64,
        },
        FlyTo(LngLat, f64),
        AddMarker(MarkerHandle),
        UpdateMarker(MarkerHandle),
        RemoveMarker(MarkerHandle),
        OpenPopup(PopupHandle),
        ClosePopup(PopupHandle),
        SetStyle(String),
        SetProjection(String),
        SetTerrain(bool),
        SetFreeView(bool),
        SetWheelZoom(bool),
        Resize,
    }

    /// In-memory surface recording every call.
    #[derive(Debug, Default)]
    pub struct FakeSurface {
        pub camera: Camera,
        pub markers: BTreeMap<MarkerHandle, MarkerSpec>,
        pub popups: BTreeMap<PopupHandle, (LngLat, PopupContent)>,
        pub calls: Vec<SurfaceCall>,
        pub mounted: bool,
        next: u64,
    }

    impl FakeSurface {
        pub fn new() -> Self {
            FakeSurface {
                mounted: true,
                ..Default::default()
            }
        }

        pub fn temporary_markers(&self) -> Vec<&MarkerSpec> {
            self.markers.values().filter(|m| m.is_temporary()).collect()
        }

        pub fn listing_marker_ids(&self) -> Vec<ItemId> {
            let mut ids: Vec<ItemId> = self.markers.values().filter_map(|m| m.listing_id).collect();
            ids.sort_unstable();
            ids
        }

        fn bump(&mut self) -> u64 {
            self.next += 1;
            self.next
        }
    }

    impl MapSurface for FakeSurface {
        fn camera(&self) -> Camera {
            self.camera
        }

        fn jump_to(&mut self, camera: &Camera) {
            self.camera = *camera;
            self.calls.push(SurfaceCall::JumpTo(*camera));
        }

        fn fit_bounds(&mut self, bounds: &BoundingBox, padding: f64, max_zoom: f64) {
            self.calls.push(SurfaceCall::FitBounds {
                bounds: *bounds,
                padding,
                max_zoom,
            });
        }

        fn fly_to(&mut self, center: LngLat, zoom: f64) {
            self.camera.longitude = center.lng;
            self.camera.latitude = center.lat;
            self.camera.zoom = zoom;
            self.calls.push(SurfaceCall::FlyTo(center, zoom));
        }

        fn add_marker(&mut self, spec: &MarkerSpec) -> MarkerHandle {
            let handle = MarkerHandle(self.bump());
            self.markers.insert(handle, spec.clone());
            self.calls.push(SurfaceCall::AddMarker(handle));
            handle
        }

        fn update_marker(&mut self, handle: MarkerHandle, spec: &MarkerSpec) {
            self.markers.insert(handle, spec.clone());
            self.calls.push(SurfaceCall::UpdateMarker(handle));
        }

        fn remove_marker(&mut self, handle: MarkerHandle) {
            self.markers.remove(&handle);
            self.calls.push(SurfaceCall::RemoveMarker(handle));
        }

        fn open_popup(&mut self, at: LngLat, content: &PopupContent, _offset: f64) -> PopupHandle {
            let handle = PopupHandle(self.bump());
            self.popups.insert(handle, (at, content.clone()));
            self.calls.push(SurfaceCall::OpenPopup(handle));
            handle
        }

        fn close_popup(&mut self, handle: PopupHandle) {
            self.popups.remove(&handle);
            self.calls.push(SurfaceCall::ClosePopup(handle));
        }

        fn set_style(&mut self, style_url: &str) {
            self.calls.push(SurfaceCall::SetStyle(style_url.to_string()));
        }

        fn set_projection(&mut self, projection: &str) {
            self.calls.push(SurfaceCall::SetProjection(projection.to_string()));
        }

        fn set_terrain(&mut self, enabled: bool) {
            self.calls.push(SurfaceCall::SetTerrain(enabled));
        }

        fn set_free_view(&mut self, enabled: bool) {
            self.calls.push(SurfaceCall::SetFreeView(enabled));
        }

        fn set_wheel_zoom(&mut self, enabled: bool) {
            self.calls.push(SurfaceCall::SetWheelZoom(enabled));
        }

        fn resize(&mut self) {
            self.calls.push(SurfaceCall::Resize);
        }

        fn is_mounted(&self) -> bool {
            self.mounted
        }
    }
}
