use tracing::debug;

use crate::models::{ItemId, LngLat, MarkerProps, DEFAULT_MARKER_SIZE};
use crate::surface::{MapSurface, PopupHandle};

/// A confirm/cancel question shown in a popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub message: String,
    /// Whether the prompt carries a confirm button.
    pub confirm: bool,
}

impl Prompt {
    /// Shown over the temporary marker in the editor.
    pub fn add_marker() -> Self {
        Prompt {
            message: "Add a new Marker?".to_string(),
            confirm: true,
        }
    }

    /// Shown on the public map, where clicks cannot add markers.
    pub fn find_location() -> Self {
        Prompt {
            message: "Find a location?".to_string(),
            confirm: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopupContent {
    Listing(MarkerProps),
    Prompt(Prompt),
}

impl PopupContent {
    /// Pixel offset above the anchor, half the icon height.
    pub fn offset(&self) -> f64 {
        let size = match self {
            PopupContent::Listing(props) => props.icon_size(),
            PopupContent::Prompt(_) => DEFAULT_MARKER_SIZE,
        };
        f64::from(size) * 0.5
    }
}

/// What the open popup is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupAnchor {
    Listing(ItemId),
    Temporary,
    Free,
}

/// Keeps at most one popup open on a surface.
#[derive(Debug, Default)]
pub struct PopupPresenter {
    open: Option<(PopupHandle, PopupAnchor)>,
}

impl PopupPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close any open popup, then open `content` at `at`.
    pub fn show<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        at: LngLat,
        content: &PopupContent,
        anchor: PopupAnchor,
    ) -> PopupHandle {
        self.close(surface);
        let handle = surface.open_popup(at, content, content.offset());
        debug!(?anchor, %at, "popup opened");
        self.open = Some((handle, anchor));
        handle
    }

    pub fn close<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        if let Some((handle, _)) = self.open.take() {
            surface.close_popup(handle);
        }
    }

    /// Close the popup only when it is attached to `anchor`.
    pub fn close_if<S: MapSurface + ?Sized>(&mut self, surface: &mut S, anchor: PopupAnchor) {
        if self.anchor() == Some(anchor) {
            self.close(surface);
        }
    }

    pub fn anchor(&self) -> Option<PopupAnchor> {
        self.open.map(|(_, anchor)| anchor)
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Forget the popup without touching the surface, used once the surface is gone.
    pub fn forget(&mut self) {
        self.open = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::testing::FakeSurface;

    #[test]
    fn test_show_closes_previous() {
        let mut surface = FakeSurface::new();
        let mut popups = PopupPresenter::new();
        let first = popups.show(
            &mut surface,
            LngLat::new(1.0, 1.0),
            &PopupContent::Prompt(Prompt::add_marker()),
            PopupAnchor::Temporary,
        );
        popups.show(
            &mut surface,
            LngLat::new(2.0, 2.0),
            &PopupContent::Listing(MarkerProps::default()),
            PopupAnchor::Listing(3),
        );
        assert_eq!(surface.popups.len(), 1);
        assert!(!surface.popups.contains_key(&first));
        assert_eq!(popups.anchor(), Some(PopupAnchor::Listing(3)));
    }

    #[test]
    fn test_close_if_only_matching_anchor() {
        let mut surface = FakeSurface::new();
        let mut popups = PopupPresenter::new();
        popups.show(
            &mut surface,
            LngLat::new(0.0, 0.0),
            &PopupContent::Listing(MarkerProps::default()),
            PopupAnchor::Listing(1),
        );
        popups.close_if(&mut surface, PopupAnchor::Temporary);
        assert!(popups.is_open());
        popups.close_if(&mut surface, PopupAnchor::Listing(1));
        assert!(!popups.is_open());
        assert!(surface.popups.is_empty());
    }

    #[test]
    fn test_offset_is_half_icon_size() {
        let props = MarkerProps {
            icon_size: Some(80),
            ..MarkerProps::default()
        };
        assert_eq!(PopupContent::Listing(props).offset(), 40.0);
        assert_eq!(PopupContent::Prompt(Prompt::find_location()).offset(), 24.0);
    }
}
