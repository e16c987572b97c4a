use dioxus::prelude::*;
use mapblock_shared::models::MarkerIcon;

use crate::pages::editor::EditorHandle;

/// Library icons whose names the block does not use yet.
pub fn addable<'a>(own: &[MarkerIcon], library: &'a [MarkerIcon]) -> Vec<&'a MarkerIcon> {
    library
        .iter()
        .filter(|icon| !own.iter().any(|o| o.name == icon.name))
        .collect()
}

/// Icons a marker can be drawn with: the block's own first, then the library.
/// A block icon shadows a library icon of the same name.
pub fn icon_library(own: &[MarkerIcon], library: &[MarkerIcon]) -> Vec<MarkerIcon> {
    own.iter()
        .cloned()
        .chain(addable(own, library).into_iter().cloned())
        .collect()
}

#[component]
pub fn IconPanel(editor: EditorHandle, library: Vec<MarkerIcon>) -> Element {
    let mut session = editor.session;
    let icons = session.read().options().icons.clone();
    let last = icons.len().saturating_sub(1);
    let choices: Vec<MarkerIcon> = addable(&icons, &library).into_iter().cloned().collect();

    let mut picked = use_signal(String::new);
    let mut custom_name = use_signal(String::new);
    let mut custom_svg = use_signal(String::new);

    rsx! {
        div { class: "panel icons",
            h3 { "Icons" }
            for (index, icon) in icons.into_iter().enumerate() {
                div { key: "{icon.id}", class: "entry-row",
                    span { class: "icon-preview", dangerous_inner_html: "{icon.content}" }
                    input {
                        r#type: "text",
                        value: "{icon.name}",
                        onchange: move |evt: Event<FormData>| {
                            session.write().rename_icon(icon.id, &evt.value());
                        },
                    }
                    button {
                        class: "secondary",
                        disabled: index == 0,
                        onclick: move |_| {
                            session.write().move_icon(index, index.saturating_sub(1));
                        },
                        "↑"
                    }
                    button {
                        class: "secondary",
                        disabled: index == last,
                        onclick: move |_| {
                            session.write().move_icon(index, index + 1);
                        },
                        "↓"
                    }
                    button {
                        class: "danger",
                        onclick: move |_| {
                            session.write().remove_icon(icon.id);
                        },
                        "Remove"
                    }
                }
            }

            if !choices.is_empty() {
                div { class: "entry-row",
                    select {
                        onchange: move |evt: Event<FormData>| picked.set(evt.value()),
                        option { value: "", "Add from library..." }
                        for icon in choices.iter() {
                            option { value: "{icon.name}", "{icon.name}" }
                        }
                    }
                    button {
                        disabled: picked.read().is_empty(),
                        onclick: {
                            let choices = choices.clone();
                            move |_| {
                                let name = picked.read().clone();
                                if let Some(icon) = choices.iter().find(|i| i.name == name) {
                                    session.write().add_icon(&icon.name, &icon.content);
                                    picked.set(String::new());
                                }
                            }
                        },
                        "Add"
                    }
                }
            }

            div { class: "custom-icon",
                input {
                    r#type: "text",
                    placeholder: "Icon name...",
                    value: "{custom_name}",
                    oninput: move |evt: Event<FormData>| custom_name.set(evt.value()),
                }
                textarea {
                    rows: "3",
                    placeholder: "<svg ...>",
                    value: "{custom_svg}",
                    oninput: move |evt: Event<FormData>| custom_svg.set(evt.value()),
                }
                button {
                    disabled: custom_name.read().trim().is_empty() || custom_svg.read().trim().is_empty(),
                    onclick: move |_| {
                        let name = custom_name.read().trim().to_string();
                        let content = custom_svg.read().trim().to_string();
                        session.write().add_icon(&name, &content);
                        custom_name.set(String::new());
                        custom_svg.set(String::new());
                    },
                    "Add custom icon"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapblock_shared::models::ItemId;

    fn icon(id: ItemId, name: &str, content: &str) -> MarkerIcon {
        MarkerIcon {
            id,
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_addable_skips_names_in_use() {
        let own = vec![icon(0, "cafe", "<svg>own</svg>")];
        let library = vec![icon(0, "cafe", "<svg>lib</svg>"), icon(1, "shop", "<svg/>")];
        let names: Vec<&str> = addable(&own, &library).iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["shop"]);
    }

    #[test]
    fn test_block_icon_shadows_library() {
        let own = vec![icon(3, "cafe", "<svg>own</svg>")];
        let library = vec![icon(0, "cafe", "<svg>lib</svg>"), icon(1, "shop", "<svg/>")];
        let merged = icon_library(&own, &library);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].content, "<svg>own</svg>");
        assert_eq!(merged[1].name, "shop");
    }

    #[test]
    fn test_empty_block_uses_library() {
        let library = vec![icon(0, "default", "<svg/>")];
        assert_eq!(icon_library(&[], &library), library);
    }
}
