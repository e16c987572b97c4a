use dioxus::prelude::*;
use mapblock_shared::models::FilterKind;

use crate::pages::editor::EditorHandle;

/// Heading of the panel editing one category collection.
pub fn collection_title(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::Tags => "Tags",
        FilterKind::Filters => "Filters",
    }
}

#[component]
pub fn TaxonomyPanel(editor: EditorHandle, kind: FilterKind) -> Element {
    let mut session = editor.session;
    let entries = session.read().options().collection(kind).to_vec();
    let last = entries.len().saturating_sub(1);
    let mut draft = use_signal(String::new);

    let mut add = move || {
        let value = draft.read().clone();
        if session.write().add_entry(kind, &value).is_some() {
            draft.set(String::new());
        }
    };

    rsx! {
        div { class: "panel taxonomy",
            h3 { {collection_title(kind)} }
            for (index, entry) in entries.into_iter().enumerate() {
                div { key: "{entry.id}", class: "entry-row",
                    input {
                        r#type: "text",
                        value: "{entry.value}",
                        onchange: move |evt: Event<FormData>| {
                            session.write().rename_entry(kind, entry.id, &evt.value());
                        },
                    }
                    button {
                        class: "secondary",
                        disabled: index == 0,
                        onclick: move |_| {
                            session.write().move_entry(kind, index, index.saturating_sub(1));
                        },
                        "↑"
                    }
                    button {
                        class: "secondary",
                        disabled: index == last,
                        onclick: move |_| {
                            session.write().move_entry(kind, index, index + 1);
                        },
                        "↓"
                    }
                    button {
                        class: "danger",
                        onclick: move |_| {
                            session.write().remove_entry(kind, entry.id);
                        },
                        "Remove"
                    }
                }
            }
            div { class: "entry-row",
                input {
                    r#type: "text",
                    placeholder: "New entry...",
                    value: "{draft}",
                    oninput: move |evt: Event<FormData>| draft.set(evt.value()),
                    onkeydown: move |evt: Event<KeyboardData>| {
                        if evt.key() == Key::Enter {
                            add();
                        }
                    },
                }
                button { onclick: move |_| add(), "Add" }
            }
        }
    }
}
