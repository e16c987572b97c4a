use std::collections::BTreeSet;

use dioxus::prelude::*;
use mapblock_shared::filter::FilterSelection;
use mapblock_shared::models::{ItemId, MapboxDefaults, MarkerIcon};

use crate::components::icon_panel::icon_library;
use crate::components::listing_card::ListingCard;
use crate::coords::element_by_id;
use crate::pages::editor::EditorHandle;
use crate::surface::Geocoder;

const GEOCODER_ID: &str = "mapblock-editor-geocoder";

/// Where a dragged entry lands: dropping on itself or outside the list is a no-op.
pub fn drop_move(dragged: Option<usize>, target: usize, len: usize) -> Option<(usize, usize)> {
    let from = dragged?;
    (from != target && from < len && target < len).then_some((from, target))
}

/// The sidebar of the preview: search box and the listing cards, which can be
/// dragged to reorder them.
#[component]
pub fn ListingPanel(
    editor: EditorHandle,
    defaults: MapboxDefaults,
    library: Vec<MarkerIcon>,
    preview: Signal<FilterSelection>,
) -> Element {
    let mut dragging = use_signal(|| None::<usize>);

    let session = editor.session.read();
    let attrs = session.attributes();
    let options = attrs.mapbox_options.clone();
    let shown: BTreeSet<ItemId> = preview
        .read()
        .apply(&options.listings)
        .iter()
        .map(|l| l.id)
        .collect();
    let geocoder = attrs.geocoder_enabled && defaults.credential().is_some();
    let last_click = session.last_click();
    drop(session);

    let icons = icon_library(&options.icons, &library);
    let len = options.listings.len();

    rsx! {
        div { class: "map-sidebar",
            if geocoder {
                GeocoderBox { editor, defaults: defaults.clone() }
            }
            div { class: "feature-listing",
                if options.listings.is_empty() {
                    p { class: "hint", "Click the map to add a listing." }
                }
                for (index, listing) in options.listings.iter().cloned().enumerate() {
                    div {
                        key: "{listing.id}",
                        class: if *dragging.read() == Some(index) { "listing-slot dragging" } else { "listing-slot" },
                        hidden: !shown.contains(&listing.id),
                        draggable: "true",
                        ondragstart: move |_| dragging.set(Some(index)),
                        ondragover: move |evt: DragEvent| evt.prevent_default(),
                        ondrop: move |evt: DragEvent| {
                            evt.prevent_default();
                            let dragged = *dragging.read();
                            dragging.set(None);
                            if let Some((from, to)) = drop_move(dragged, index, len) {
                                editor.move_listing(from, to);
                            }
                        },
                        ondragend: move |_| dragging.set(None),
                        ListingCard {
                            editor,
                            listing: listing.clone(),
                            options: options.clone(),
                            icons: icons.clone(),
                            last_click,
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn GeocoderBox(editor: EditorHandle, defaults: MapboxDefaults) -> Element {
    let mut widget = use_signal(|| None::<Geocoder>);

    rsx! {
        div {
            id: GEOCODER_ID,
            class: "geocoder",
            onmounted: move |_| {
                if widget.peek().is_some() {
                    return;
                }
                if let Some(container) = element_by_id(GEOCODER_ID) {
                    widget.set(Geocoder::mount(&container, &defaults, editor.sink()));
                }
            },
        }
    }
}
