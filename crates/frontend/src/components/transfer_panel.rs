use dioxus::logger::tracing::info;
use dioxus::prelude::*;

use crate::pages::editor::EditorHandle;

#[component]
pub fn TransferPanel(editor: EditorHandle) -> Element {
    let exported = editor.session.read().export_options();
    let mut raw = use_signal(String::new);
    let mut message = use_signal(|| None::<String>);

    rsx! {
        div { class: "panel transfer",
            h3 { "Export / Import" }
            textarea { readonly: true, rows: "5", value: "{exported}" }
            button {
                class: "secondary",
                onclick: {
                    let exported = exported.clone();
                    move |_| {
                        let text = exported.clone();
                        wasm_bindgen_futures::spawn_local(async move {
                            if let Some(window) = web_sys::window() {
                                let clipboard = window.navigator().clipboard();
                                let _ = wasm_bindgen_futures::JsFuture::from(
                                    clipboard.write_text(&text)
                                ).await;
                            }
                        });
                    }
                },
                "Copy"
            }
            textarea {
                rows: "5",
                placeholder: "Paste exported markers...",
                value: "{raw}",
                oninput: move |evt: Event<FormData>| raw.set(evt.value()),
            }
            button {
                disabled: raw.read().trim().is_empty(),
                onclick: move |_| {
                    let text = raw.read().clone();
                    match editor.import(&text) {
                        Ok(()) => {
                            info!("markers imported");
                            message.set(Some("Imported.".to_string()));
                            raw.set(String::new());
                        }
                        Err(e) => message.set(Some(format!("Import failed: {}", e))),
                    }
                },
                "Import"
            }
            if let Some(text) = &*message.read() {
                p { class: "message", "{text}" }
            }
        }
    }
}
