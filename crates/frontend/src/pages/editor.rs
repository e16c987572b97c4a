use std::rc::Rc;

use dioxus::logger::tracing::{debug, info, warn};
use dioxus::prelude::*;
use futures_util::StreamExt;
use gloo_timers::future::TimeoutFuture;
use mapblock_shared::config::ConfigError;
use mapblock_shared::filter::FilterSelection;
use mapblock_shared::models::{FilterKind, ItemId, Listing, MapboxDefaults, MarkerIcon};
use mapblock_shared::session::{refresh_layout, AttributeChange, EditorSession};
use mapblock_shared::surface::MapSurface;
use mapblock_shared::sync::ClickTarget;
use mapblock_shared::view::SINGLE_POINT_ZOOM;

use crate::api::{self, BlockData};
use crate::components::camera_panel::CameraPanel;
use crate::components::icon_panel::IconPanel;
use crate::components::listing_panel::ListingPanel;
use crate::components::map_canvas::MapCanvas;
use crate::components::options_panel::OptionsPanel;
use crate::components::taxonomy_panel::TaxonomyPanel;
use crate::components::top_bar::TopBar;
use crate::components::transfer_panel::TransferPanel;
use crate::surface::{EventSink, MapEvent, MapboxSurface};

/// Delay before re-measuring the map after a layout change.
pub const REFRESH_DELAY_MS: u32 = 100;

/// The editor's state, shared by every panel: the session, the live map (once
/// created) and the queue map events arrive on.
#[derive(Clone, Copy)]
pub struct EditorHandle {
    pub session: Signal<EditorSession>,
    pub surface: Signal<Option<MapboxSurface>>,
    events: Coroutine<MapEvent>,
}

impl PartialEq for EditorHandle {
    fn eq(&self, other: &Self) -> bool {
        self.session == other.session && self.surface == other.surface
    }
}

impl EditorHandle {
    /// A sink that queues map events for [`apply_map_event`].
    pub fn sink(self) -> EventSink {
        let events = self.events;
        Rc::new(move |event| events.send(event))
    }

    /// Run `f` against the session and the live map, if there is one yet.
    pub fn edit<R>(self, f: impl FnOnce(&mut EditorSession, Option<&mut MapboxSurface>) -> R) -> R {
        let mut session = self.session;
        let mut surface = self.surface;
        let mut map = surface.write();
        let result = f(&mut session.write(), Option::as_mut(&mut *map));
        result
    }

    pub fn change(self, change: AttributeChange) {
        if self.edit(|session, map| session.update(map, change)) {
            self.schedule_refresh();
        }
    }

    /// Re-measure the map once the layout settled, unless it went away meanwhile.
    pub fn schedule_refresh(self) {
        let mut surface = self.surface;
        spawn(async move {
            TimeoutFuture::new(REFRESH_DELAY_MS).await;
            let Ok(mut guard) = surface.try_write() else {
                return;
            };
            match Option::as_mut(&mut *guard) {
                Some(map) => {
                    refresh_layout(map);
                }
                None => debug!("map gone before the deferred refresh"),
            }
        });
    }

    pub fn install(self, map: MapboxSurface) {
        let mut surface = self.surface;
        surface.set(Some(map));
    }

    /// Drop the map (markers and popups go with it) and detach the session.
    pub fn teardown(self) {
        let mut surface = self.surface;
        let mut session = self.session;
        if let Ok(mut guard) = surface.try_write() {
            *guard = None;
        }
        if let Ok(mut guard) = session.try_write() {
            guard.detach();
        };
    }

    pub fn set_icons(self, icons: Vec<MarkerIcon>) {
        let mut surface = self.surface;
        if let Some(map) = Option::as_mut(&mut *surface.write()) {
            map.set_icons(icons);
        };
    }

    pub fn pull_camera(self) {
        self.edit(|session, map| {
            if let Some(map) = map {
                session.pull_camera(map);
            }
        });
    }

    pub fn fit_view(self) {
        self.edit(|session, map| {
            if let Some(map) = map {
                session.fit_view(map);
            }
        });
    }

    /// Fly to a listing and open its details.
    pub fn focus(self, id: ItemId) {
        self.edit(|session, map| {
            let Some(map) = map else {
                return;
            };
            let Some(at) = session.options().find_listing(id).map(Listing::coordinates) else {
                return;
            };
            map.fly_to(at, SINGLE_POINT_ZOOM);
            session.on_map_click(map, ClickTarget::Marker(id), at);
        });
    }

    pub fn save_listing(self, listing: Listing) -> bool {
        self.edit(|session, map| session.save_listing(map, listing))
    }

    pub fn delete_listing(self, id: ItemId) -> bool {
        self.edit(|session, map| session.delete_listing(map, id))
    }

    pub fn move_listing(self, from: usize, to: usize) {
        let mut session = self.session;
        session.write().move_listing(from, to);
    }

    pub fn import(self, raw: &str) -> Result<(), ConfigError> {
        self.edit(|session, map| session.import_options(map, raw))
    }
}

/// Feed one map event into the session.
fn apply_map_event(mut session: Signal<EditorSession>, mut surface: Signal<Option<MapboxSurface>>, event: MapEvent) {
    let mut guard = surface.write();
    let Some(map) = Option::as_mut(&mut *guard) else {
        return;
    };
    let mut session = session.write();
    match event {
        MapEvent::Loaded => {
            map.on_loaded();
            session.attach(map);
        }
        MapEvent::Click(target, at) => {
            session.on_map_click(map, target, at);
        }
        MapEvent::CameraMoved => {
            session.pull_camera(map);
        }
        MapEvent::ConfirmTemporary => {
            if let Some(id) = session.confirm_temporary(map) {
                info!(id, "listing added from the map");
            }
        }
        MapEvent::CancelTemporary => session.cancel_temporary(map),
        MapEvent::Located(at) => session.locate(map, at),
    }
    if session.is_attached() {
        if let Err(defect) = session.verify() {
            warn!(%defect, "markers out of sync with listings");
        }
    }
}

#[component]
pub fn BlockEditor(block_id: String) -> Element {
    let loader = use_resource(use_reactive((&block_id,), |(id,)| async move {
        let block = api::fetch_block(&id).await?;
        let defaults = api::fetch_defaults().await?;
        let library = match api::fetch_icons().await {
            Ok(icons) => icons,
            Err(e) => {
                warn!(error = %e, "icon library unavailable");
                Vec::new()
            }
        };
        Ok::<_, String>((block, defaults, library))
    }));

    let view = match &*loader.read() {
        None => rsx! { div { class: "app loading", "Loading block…" } },
        Some(Err(e)) => rsx! { div { class: "app error", "Failed to load block: {e}" } },
        Some(Ok((None, _, _))) => rsx! {
            div { class: "app error",
                p { "Block not found." }
                a { href: "/", "All blocks" }
            }
        },
        Some(Ok((Some(block), defaults, library))) => rsx! {
            Workspace {
                key: "{block.id}",
                block: block.clone(),
                defaults: defaults.clone(),
                library: library.clone(),
            }
        },
    };
    view
}

#[component]
fn Workspace(block: BlockData, defaults: MapboxDefaults, library: Vec<MarkerIcon>) -> Element {
    let session = use_signal(|| EditorSession::new(block.block_attributes()));
    let surface = use_signal(|| None::<MapboxSurface>);
    let mut name = use_signal(|| block.name.clone());
    let mut status = use_signal(|| None::<String>);
    let preview = use_signal(FilterSelection::default);

    let events = use_coroutine(move |mut rx: UnboundedReceiver<MapEvent>| async move {
        while let Some(event) = rx.next().await {
            apply_map_event(session, surface, event);
        }
    });
    let editor = EditorHandle {
        session,
        surface,
        events,
    };

    let attrs = session.read().attributes().clone();
    let align_class = if attrs.align.is_empty() {
        String::new()
    } else {
        format!(" align{}", attrs.align)
    };
    let block_id = block.id.clone();

    rsx! {
        div { class: "app",
            div { class: "header",
                h1 { "Map Block" }
                input {
                    r#type: "text",
                    "aria-label": "Block name",
                    value: "{name}",
                    oninput: move |evt: Event<FormData>| name.set(evt.value()),
                }
                button {
                    onclick: move |_| {
                        let id = block_id.clone();
                        let title = name.read().clone();
                        let attributes = session.read().attributes().clone();
                        spawn(async move {
                            match api::update_block(&id, Some(&title), Some(&attributes)).await {
                                Ok(saved) => {
                                    info!(id = %saved.id, listings = saved.listing_count, "block saved");
                                    status.set(Some("Saved".to_string()));
                                }
                                Err(e) => status.set(Some(format!("Failed to save: {}", e))),
                            }
                        });
                    },
                    "Save"
                }
                a { class: "button secondary", href: "/block/{block.id}", target: "_blank", "View page" }
                a { class: "button secondary", href: "/", "All blocks" }
                if let Some(message) = &*status.read() {
                    span { class: "status", "{message}" }
                }
            }

            div { class: "sidebar inspector",
                OptionsPanel { editor }
                CameraPanel { editor }
                TaxonomyPanel { editor, kind: FilterKind::Tags }
                TaxonomyPanel { editor, kind: FilterKind::Filters }
                IconPanel { editor, library: library.clone() }
                TransferPanel { editor }
            }

            div {
                class: "block-preview{align_class}",
                style: "min-height: {attrs.map_height}",
                if attrs.sidebar_enabled {
                    ListingPanel { editor, defaults: defaults.clone(), library: library.clone(), preview }
                }
                div { class: "map-container",
                    TopBar { editor, preview }
                    MapCanvas { editor, defaults: defaults.clone(), library: library.clone() }
                }
            }
        }
    }
}
