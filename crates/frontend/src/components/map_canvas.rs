use dioxus::logger::tracing::warn;
use dioxus::prelude::*;
use mapblock_shared::markup::credential_notice;
use mapblock_shared::models::{MapboxDefaults, MarkerIcon};

use crate::components::icon_panel::icon_library;
use crate::coords::element_by_id;
use crate::pages::editor::EditorHandle;
use crate::surface::MapboxSurface;

const MAP_CONTAINER_ID: &str = "mapblock-editor-map";

#[component]
pub fn MapCanvas(editor: EditorHandle, defaults: MapboxDefaults, library: Vec<MarkerIcon>) -> Element {
    let mut error = use_signal(|| None::<String>);
    let own_icons = use_memo(move || editor.session.read().options().icons.clone());

    // markers follow the block's icon set
    let effect_library = library.clone();
    use_effect(move || {
        let icons = icon_library(&own_icons.read(), &effect_library);
        editor.set_icons(icons);
    });
    use_drop(move || editor.teardown());

    let height = editor.session.read().attributes().map_height.clone();
    if defaults.credential().is_none() {
        return rsx! {
            div { class: "map", style: "height: {height}", dangerous_inner_html: credential_notice() }
        };
    }

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "map",
            style: "height: {height}",
            onmounted: move |_| {
                if editor.surface.peek().is_some() {
                    return;
                }
                let Some(container) = element_by_id(MAP_CONTAINER_ID) else {
                    return;
                };
                let attrs = editor.session.peek().attributes().clone();
                let icons = icon_library(&attrs.mapbox_options.icons, &library);
                match MapboxSurface::create(&container, &attrs, &defaults, icons, editor.sink()) {
                    Ok(map) => editor.install(map),
                    Err(e) => {
                        warn!(error = %e, "map unavailable");
                        error.set(Some(e));
                    }
                }
            },
        }
        if let Some(e) = &*error.read() {
            p { class: "map-error", "The map could not be started: {e}" }
        }
    }
}
