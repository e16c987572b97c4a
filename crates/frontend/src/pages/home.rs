use dioxus::logger::tracing::info;
use dioxus::prelude::*;
use mapblock_shared::config::BlockAttributes;

use crate::api::{self, BlockData};
use crate::Route;

/// Name given to a block created without one.
const DEFAULT_BLOCK_NAME: &str = "Untitled map";

pub fn block_name_or_default(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        DEFAULT_BLOCK_NAME.to_string()
    } else {
        name.to_string()
    }
}

#[component]
pub fn BlockList() -> Element {
    let mut blocks = use_resource(|| api::fetch_blocks());
    let mut new_name = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);
    let navigator = use_navigator();

    let create = move |_: Event<MouseData>| {
        let name = block_name_or_default(&new_name.read());
        spawn(async move {
            match api::create_block(&name, &BlockAttributes::default()).await {
                Ok(block) => {
                    info!(id = %block.id, "block created");
                    navigator.push(Route::Editor { id: block.id });
                }
                Err(e) => error.set(Some(format!("Failed to create block: {}", e))),
            }
        });
    };

    rsx! {
        div { class: "app home",
            div { class: "header",
                h1 { "Map Blocks" }
            }
            div { class: "panel",
                h3 { "New block" }
                input {
                    r#type: "text",
                    placeholder: "Block name...",
                    value: "{new_name}",
                    oninput: move |evt: Event<FormData>| new_name.set(evt.value()),
                }
                button { onclick: create, "Create" }
                if let Some(e) = &*error.read() {
                    p { class: "message", "{e}" }
                }
            }
            div { class: "panel",
                h3 { "Blocks" }
                {
                    match &*blocks.read() {
                        None => rsx! { p { "Loading..." } },
                        Some(Err(e)) => rsx! { p { class: "message", "Failed to load blocks: {e}" } },
                        Some(Ok(list)) if list.is_empty() => rsx! { p { class: "hint", "No blocks yet." } },
                        Some(Ok(list)) => rsx! {
                            table { class: "block-list",
                                thead {
                                    tr {
                                        th { "Name" }
                                        th { "Listings" }
                                        th { "Updated" }
                                        th {}
                                    }
                                }
                                tbody {
                                    for block in list.iter().cloned() {
                                        BlockRow {
                                            key: "{block.id}",
                                            block: block.clone(),
                                            on_deleted: move |_| blocks.restart(),
                                        }
                                    }
                                }
                            }
                        },
                    }
                }
            }
        }
    }
}

#[component]
fn BlockRow(block: BlockData, on_deleted: EventHandler<()>) -> Element {
    let id = block.id.clone();
    let mut failed = use_signal(|| false);

    rsx! {
        tr {
            td {
                Link { to: Route::Editor { id: block.id.clone() }, "{block.name}" }
            }
            td { "{block.listing_count}" }
            td { "{block.updated_at}" }
            td {
                a { class: "button secondary", href: "/block/{block.id}", target: "_blank", "View" }
                button {
                    class: "danger",
                    title: if failed() { "Delete failed, try again" } else { "Delete this block" },
                    onclick: move |_| {
                        let id = id.clone();
                        spawn(async move {
                            match api::delete_block(&id).await {
                                Ok(true) => on_deleted.call(()),
                                _ => failed.set(true),
                            }
                        });
                    },
                    "Delete"
                }
            }
        }
    }
}
