//! Keeps the markers on a surface in step with the listing collection.
//!
//! The listings are the source of truth. Each listing id is `Absent` (no
//! marker), `Rendered` (marker drawn from the current data) or `Stale`
//! (marker drawn from older data). Beside those sits at most one temporary
//! marker that is not backed by any listing until the editor confirms it.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::debug;

use crate::ids::next_id;
use crate::models::{ItemId, Listing, LngLat};
use crate::popup::{PopupAnchor, PopupContent, PopupPresenter, Prompt};
use crate::surface::{MapSurface, MarkerHandle, MarkerSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    Absent,
    Rendered,
    Stale,
}

/// A break of the "one marker per listing" rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncDefect {
    #[error("marker for listing {0} has no backing listing")]
    Orphaned(ItemId),
    #[error("listing {0} has no marker")]
    Missing(ItemId),
    #[error("listing id {0} is used more than once")]
    Duplicate(ItemId),
}

/// Which page drives the synchronizer. Only the editor places temporary markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Editor,
    Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Marker(ItemId),
    Temporary,
    Map,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    /// A listing's details are shown.
    Selected(ItemId),
    /// A temporary marker now sits at this point.
    TemporaryPlaced(LngLat),
    /// The open popup (and any temporary marker) went away.
    Dismissed,
    /// Marker id that no longer exists.
    Ignored,
}

/// What one [`MarkerSync::reconcile`] pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub added: Vec<ItemId>,
    pub updated: Vec<ItemId>,
    pub removed: Vec<ItemId>,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Rendered {
    handle: MarkerHandle,
    spec: MarkerSpec,
}

#[derive(Debug, Default)]
pub struct MarkerSync {
    markers: BTreeMap<ItemId, Rendered>,
    temporary: Option<(MarkerHandle, LngLat)>,
    popups: PopupPresenter,
}

impl MarkerSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the surface in line with `listings`: remove markers whose
    /// listing is gone, update changed ones in place, add missing ones.
    pub fn reconcile<'a, S, I>(&mut self, surface: &mut S, listings: I) -> SyncReport
    where
        S: MapSurface + ?Sized,
        I: IntoIterator<Item = &'a Listing>,
    {
        let wanted: BTreeMap<ItemId, MarkerSpec> = listings
            .into_iter()
            .map(|l| (l.id, MarkerSpec::for_listing(l)))
            .collect();
        let mut report = SyncReport::default();

        let gone: Vec<ItemId> = self
            .markers
            .keys()
            .filter(|id| !wanted.contains_key(id))
            .copied()
            .collect();
        for id in gone {
            if let Some(marker) = self.markers.remove(&id) {
                surface.remove_marker(marker.handle);
                self.popups.close_if(surface, PopupAnchor::Listing(id));
                report.removed.push(id);
            }
        }

        for (id, spec) in wanted {
            match self.markers.get_mut(&id) {
                Some(marker) if marker.spec == spec => {}
                Some(marker) => {
                    surface.update_marker(marker.handle, &spec);
                    marker.spec = spec;
                    report.updated.push(id);
                }
                None => {
                    let handle = surface.add_marker(&spec);
                    self.markers.insert(id, Rendered { handle, spec });
                    report.added.push(id);
                }
            }
        }

        if !report.is_empty() {
            debug!(
                added = report.added.len(),
                updated = report.updated.len(),
                removed = report.removed.len(),
                "markers reconciled"
            );
        }
        report
    }

    pub fn state(&self, listing: &Listing) -> MarkerState {
        match self.markers.get(&listing.id) {
            None => MarkerState::Absent,
            Some(marker) if marker.spec == MarkerSpec::for_listing(listing) => MarkerState::Rendered,
            Some(_) => MarkerState::Stale,
        }
    }

    pub fn handle_click<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        target: ClickTarget,
        at: LngLat,
        listings: &[Listing],
        mode: Mode,
    ) -> ClickOutcome {
        match target {
            ClickTarget::Marker(id) => {
                self.remove_temporary(surface);
                let Some(listing) = listings.iter().find(|l| l.id == id) else {
                    return ClickOutcome::Ignored;
                };
                self.popups.show(
                    surface,
                    listing.coordinates(),
                    &PopupContent::Listing(listing.properties.clone()),
                    PopupAnchor::Listing(id),
                );
                ClickOutcome::Selected(id)
            }
            ClickTarget::Temporary => match self.temporary {
                Some((_, point)) => {
                    self.popups.show(
                        surface,
                        point,
                        &PopupContent::Prompt(Prompt::add_marker()),
                        PopupAnchor::Temporary,
                    );
                    ClickOutcome::TemporaryPlaced(point)
                }
                None => ClickOutcome::Ignored,
            },
            ClickTarget::Map => match mode {
                Mode::Editor => {
                    self.place_temporary(surface, at);
                    ClickOutcome::TemporaryPlaced(at)
                }
                Mode::Public => {
                    self.popups.close(surface);
                    ClickOutcome::Dismissed
                }
            },
        }
    }

    /// Drop any previous temporary marker, then place one at `at` with the
    /// add-marker prompt.
    pub fn place_temporary<S: MapSurface + ?Sized>(&mut self, surface: &mut S, at: LngLat) {
        self.remove_temporary(surface);
        let handle = surface.add_marker(&MarkerSpec::temporary(at));
        self.temporary = Some((handle, at));
        self.popups.show(
            surface,
            at,
            &PopupContent::Prompt(Prompt::add_marker()),
            PopupAnchor::Temporary,
        );
        debug!(%at, "temporary marker placed");
    }

    /// Promote the temporary marker to a listing appended to `listings`.
    /// Returns the new listing id, or `None` when there is no temporary marker.
    pub fn confirm_temporary<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        listings: &mut Vec<Listing>,
    ) -> Option<ItemId> {
        let (_, at) = self.temporary?;
        self.remove_temporary(surface);
        let id = next_id(listings);
        listings.push(Listing::new_at(id, at));
        self.reconcile(surface, listings.iter());
        debug!(id, %at, "temporary marker confirmed");
        Some(id)
    }

    pub fn cancel_temporary<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        self.remove_temporary(surface);
    }

    fn remove_temporary<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        if let Some((handle, _)) = self.temporary.take() {
            surface.remove_marker(handle);
            self.popups.close_if(surface, PopupAnchor::Temporary);
        }
    }

    pub fn close_popup<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        self.popups.close(surface);
    }

    pub fn show_popup<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        at: LngLat,
        content: &PopupContent,
    ) {
        self.popups.show(surface, at, content, PopupAnchor::Free);
    }

    pub fn temporary(&self) -> Option<LngLat> {
        self.temporary.map(|(_, at)| at)
    }

    pub fn popup_anchor(&self) -> Option<PopupAnchor> {
        self.popups.anchor()
    }

    pub fn rendered_ids(&self) -> BTreeSet<ItemId> {
        self.markers.keys().copied().collect()
    }

    /// Listing id behind a marker handle, for surfaces that report clicks by handle.
    pub fn listing_for(&self, handle: MarkerHandle) -> Option<ItemId> {
        self.markers
            .iter()
            .find(|(_, m)| m.handle == handle)
            .map(|(id, _)| *id)
    }

    /// Check that exactly the given listings have markers.
    pub fn verify<'a, I>(&self, listings: I) -> Result<(), SyncDefect>
    where
        I: IntoIterator<Item = &'a Listing>,
    {
        let mut expected = BTreeSet::new();
        for listing in listings {
            if !expected.insert(listing.id) {
                return Err(SyncDefect::Duplicate(listing.id));
            }
        }
        if let Some(id) = self.markers.keys().find(|id| !expected.contains(id)) {
            return Err(SyncDefect::Orphaned(*id));
        }
        if let Some(id) = expected.iter().find(|id| !self.markers.contains_key(id)) {
            return Err(SyncDefect::Missing(*id));
        }
        Ok(())
    }

    /// Remove every marker and popup from the surface.
    pub fn clear<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        self.remove_temporary(surface);
        self.popups.close(surface);
        for (_, marker) in std::mem::take(&mut self.markers) {
            surface.remove_marker(marker.handle);
        }
    }

    /// Drop all bookkeeping after the surface itself was destroyed.
    pub fn forget(&mut self) {
        self.markers.clear();
        self.temporary = None;
        self.popups.forget();
    }
}
