use dioxus::prelude::*;
use mapblock_shared::filter::FilterSelection;
use mapblock_shared::models::{safe_slug, FilterKind, MapFilter};

use crate::pages::editor::EditorHandle;

/// Classes and placeholder of the select for one collection, as in the
/// rendered block.
pub fn select_look(kind: FilterKind) -> (&'static str, &'static str) {
    match kind {
        FilterKind::Filters => ("mapbox-map-filter filter-by-partnership", "Select a filter"),
        FilterKind::Tags => ("mapbox-map-filter filter-by-tag", "Select a tag"),
    }
}

/// The bar above the map. The selects only narrow the sidebar preview; they
/// are not stored with the block.
#[component]
pub fn TopBar(editor: EditorHandle, preview: Signal<FilterSelection>) -> Element {
    let (fit_view, filters, tags) = {
        let session = editor.session.read();
        let attrs = session.attributes();
        (
            attrs.fit_view,
            attrs.filters_enabled.then(|| attrs.mapbox_options.filters.clone()),
            attrs.tags_enabled.then(|| attrs.mapbox_options.tags.clone()),
        )
    };
    if !fit_view && filters.is_none() && tags.is_none() {
        return rsx! {};
    }

    rsx! {
        div { class: "map-topbar",
            if fit_view {
                button { class: "button fit-view", onclick: move |_| editor.fit_view(), "Fit view" }
            }
            if let Some(entries) = filters {
                FilterSelect { kind: FilterKind::Filters, entries, preview }
            }
            if let Some(entries) = tags {
                FilterSelect { kind: FilterKind::Tags, entries, preview }
            }
        }
    }
}

#[component]
fn FilterSelect(kind: FilterKind, entries: Vec<MapFilter>, preview: Signal<FilterSelection>) -> Element {
    let (class, placeholder) = select_look(kind);
    let current = preview.read().get(kind).to_string();

    rsx! {
        select {
            class,
            onchange: move |evt: Event<FormData>| preview.write().set(kind, &evt.value()),
            option { value: "", "{placeholder}" }
            for entry in entries {
                option {
                    value: safe_slug(&entry.value),
                    selected: current == safe_slug(&entry.value),
                    "{entry.value}"
                }
            }
        }
    }
}
