//! Viewer for blocks rendered into a page. Each `.wp-block-mapblock` element
//! carries its options and defaults in data attributes; the viewer starts one
//! map per block and wires the sidebar and top bar around it.

use std::cell::{OnceCell, RefCell};
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

use dioxus::logger::tracing::{debug, info, warn};
use mapblock_shared::markup::{
    credential_notice, parse_block_data, DEFAULTS_ATTR, LISTING_ID_ATTR, OPTIONS_ATTR, ROOT_CLASS,
};
use mapblock_shared::models::{FilterKind, ItemId};
use mapblock_shared::public::PublicView;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::surface::{EventSink, Geocoder, MapEvent, MapboxSurface};

struct PublicBlock {
    view: PublicView,
    surface: MapboxSurface,
    root: web_sys::Element,
    _geocoder: Option<Geocoder>,
}

type SharedBlock = Rc<RefCell<PublicBlock>>;

thread_local! {
    static BLOCKS: RefCell<Vec<SharedBlock>> = const { RefCell::new(Vec::new()) };
}

fn root_selector() -> String {
    format!(".{}", ROOT_CLASS)
}

/// Selector of the top-bar select for one collection.
fn select_selector(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::Filters => ".filter-by-partnership",
        FilterKind::Tags => ".filter-by-tag",
    }
}

/// Listing id carried by a sidebar entry.
fn entry_id(raw: Option<&str>) -> Option<ItemId> {
    raw?.trim().parse().ok()
}

/// Entries without a readable id are never hidden.
fn entry_visible(raw: Option<&str>, shown: &BTreeSet<ItemId>) -> bool {
    entry_id(raw).map_or(true, |id| shown.contains(&id))
}

fn document() -> Option<web_sys::Document> {
    web_sys::window()?.document()
}

fn select_all(root: &web_sys::Element, selector: &str) -> Vec<web_sys::Element> {
    let Ok(nodes) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .collect()
}

fn select_one(root: &web_sys::Element, selector: &str) -> Option<web_sys::Element> {
    root.query_selector(selector).ok().flatten()
}

/// Whether the page carries rendered blocks.
pub fn has_blocks() -> bool {
    document()
        .and_then(|d| d.query_selector(&root_selector()).ok().flatten())
        .is_some()
}

/// Start a map for every block on the page.
pub fn start() {
    dioxus::logger::initialize_default();
    let Some(body) = document().and_then(|d| d.document_element()) else {
        return;
    };
    let mut started = 0;
    for root in select_all(&body, &root_selector()) {
        match mount(root) {
            Ok(Some(block)) => {
                BLOCKS.with(|blocks| blocks.borrow_mut().push(block));
                started += 1;
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "map block not started"),
        }
    }
    info!(blocks = started, "map blocks started");
}

/// `None` when the block can only show the credential notice.
fn mount(root: web_sys::Element) -> Result<Option<SharedBlock>, String> {
    let (attrs, defaults) = parse_block_data(
        root.get_attribute(OPTIONS_ATTR).as_deref(),
        root.get_attribute(DEFAULTS_ATTR).as_deref(),
    );
    let container = select_one(&root, ".map")
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
        .ok_or_else(|| "block has no map container".to_string())?;
    if defaults.credential().is_none() {
        warn!("no Mapbox access token, showing the sign-up notice");
        container.set_inner_html(&credential_notice());
        return Ok(None);
    }

    let slot: Rc<OnceCell<Weak<RefCell<PublicBlock>>>> = Rc::new(OnceCell::new());
    let sink: EventSink = {
        let slot = slot.clone();
        Rc::new(move |event| {
            if let Some(block) = slot.get().and_then(Weak::upgrade) {
                dispatch(&block, event);
            }
        })
    };

    let icons = attrs.mapbox_options.icons.clone();
    let surface = MapboxSurface::create(&container, &attrs, &defaults, icons, sink.clone())?;
    let geocoder = if attrs.sidebar_enabled && attrs.geocoder_enabled {
        select_one(&root, ".geocoder").and_then(|el| Geocoder::mount(&el, &defaults, sink))
    } else {
        None
    };

    let block = Rc::new(RefCell::new(PublicBlock {
        view: PublicView::new(attrs, defaults),
        surface,
        root: root.clone(),
        _geocoder: geocoder,
    }));
    let _ = slot.set(Rc::downgrade(&block));
    wire_controls(&root, &block);
    Ok(Some(block))
}

fn dispatch(block: &SharedBlock, event: MapEvent) {
    let Ok(mut guard) = block.try_borrow_mut() else {
        debug!("map event during an update, skipped");
        return;
    };
    let PublicBlock { view, surface, .. } = &mut *guard;
    match event {
        MapEvent::Loaded => {
            surface.on_loaded();
            view.attach(surface);
        }
        MapEvent::Click(target, at) => {
            view.on_click(surface, target, at);
        }
        MapEvent::Located(at) => view.locate(surface, at),
        // the viewer places no temporary marker and stores no camera
        MapEvent::CameraMoved | MapEvent::ConfirmTemporary | MapEvent::CancelTemporary => {}
    }
}

fn wire_controls(root: &web_sys::Element, block: &SharedBlock) {
    if let Some(button) = select_one(root, ".fit-view") {
        listen(&button, "click", with_block(block, |b, _| {
            b.view.fit_view(&mut b.surface);
        }));
    }

    for kind in [FilterKind::Filters, FilterKind::Tags] {
        let Some(select) = select_one(root, select_selector(kind))
            .and_then(|el| el.dyn_into::<web_sys::HtmlSelectElement>().ok())
        else {
            continue;
        };
        let source = select.clone();
        listen(&select, "change", with_block(block, move |b, _| {
            let shown = b.view.set_filter(&mut b.surface, kind, &source.value());
            show_entries(&b.root, &shown);
        }));
    }

    for entry in select_all(root, &format!("[{}]", LISTING_ID_ATTR)) {
        let Some(id) = entry_id(entry.get_attribute(LISTING_ID_ATTR).as_deref()) else {
            continue;
        };
        let Some(title) = select_one(&entry, ".title") else {
            continue;
        };
        listen(&title, "click", with_block(block, move |b, event| {
            event.prevent_default();
            if !b.view.focus(&mut b.surface, id) {
                debug!(id, "sidebar entry without listing");
            }
        }));
    }
}

fn show_entries(root: &web_sys::Element, shown: &BTreeSet<ItemId>) {
    for entry in select_all(root, &format!("[{}]", LISTING_ID_ATTR)) {
        let _ = if entry_visible(entry.get_attribute(LISTING_ID_ATTR).as_deref(), shown) {
            entry.remove_attribute("hidden")
        } else {
            entry.set_attribute("hidden", "")
        };
    }
}

/// Adapt a handler to run against the block, skipping events that arrive
/// after it is gone or while it is busy.
fn with_block<F>(block: &SharedBlock, mut handler: F) -> impl FnMut(web_sys::Event) + 'static
where
    F: FnMut(&mut PublicBlock, &web_sys::Event) + 'static,
{
    let block = Rc::downgrade(block);
    move |event| {
        let Some(block) = block.upgrade() else {
            return;
        };
        let Ok(mut guard) = block.try_borrow_mut() else {
            return;
        };
        handler(&mut guard, &event);
    }
}

fn listen(target: &web_sys::EventTarget, event: &str, handler: impl FnMut(web_sys::Event) + 'static) {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    if target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .is_ok()
    {
        // page lifetime
        closure.forget();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_selector() {
        assert_eq!(root_selector(), ".wp-block-mapblock");
    }

    #[test]
    fn test_entry_id() {
        assert_eq!(entry_id(Some("7")), Some(7));
        assert_eq!(entry_id(Some(" 7 ")), Some(7));
        assert_eq!(entry_id(Some("seven")), None);
        assert_eq!(entry_id(None), None);
    }

    #[test]
    fn test_entry_visibility() {
        let shown: BTreeSet<ItemId> = [1, 3].into_iter().collect();
        assert!(entry_visible(Some("1"), &shown));
        assert!(!entry_visible(Some("2"), &shown));
        assert!(entry_visible(Some("broken"), &shown));
        assert!(entry_visible(None, &shown));
    }

    #[test]
    fn test_select_selectors_match_rendered_classes() {
        use mapblock_shared::config::BlockAttributes;
        use mapblock_shared::markup::render_block;
        use mapblock_shared::models::MapboxDefaults;

        let mut attrs = BlockAttributes::default();
        attrs.filters_enabled = true;
        attrs.tags_enabled = true;
        let html = render_block(&attrs, &MapboxDefaults::default());
        for kind in [FilterKind::Filters, FilterKind::Tags] {
            let class = select_selector(kind).trim_start_matches('.');
            assert!(html.contains(class));
        }
    }
}
