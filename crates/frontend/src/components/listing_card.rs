use dioxus::prelude::*;
use mapblock_shared::models::{FilterKind, Listing, LngLat, MapboxOptions, MarkerIcon, MarkerProps};
use mapblock_shared::session::toggle_entry;

use crate::coords::{format_lng_lat, parse_lng_lat};
use crate::pages::editor::EditorHandle;

/// Text properties of a listing editable in its form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Name,
    Description,
    Telephone,
    Email,
    Website,
    Address,
    City,
    PostalCode,
    State,
    Country,
}

impl TextField {
    pub const ALL: [TextField; 10] = [
        TextField::Name,
        TextField::Description,
        TextField::Telephone,
        TextField::Email,
        TextField::Website,
        TextField::Address,
        TextField::City,
        TextField::PostalCode,
        TextField::State,
        TextField::Country,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TextField::Name => "Name",
            TextField::Description => "Description",
            TextField::Telephone => "Phone",
            TextField::Email => "Email",
            TextField::Website => "Website",
            TextField::Address => "Address",
            TextField::City => "City",
            TextField::PostalCode => "Postal code",
            TextField::State => "State",
            TextField::Country => "Country",
        }
    }

    fn slot(self, props: &mut MarkerProps) -> Option<&mut Option<String>> {
        let slot = match self {
            TextField::Name => return None,
            TextField::Description => &mut props.description,
            TextField::Telephone => &mut props.telephone,
            TextField::Email => &mut props.email_address,
            TextField::Website => &mut props.website,
            TextField::Address => &mut props.address,
            TextField::City => &mut props.city,
            TextField::PostalCode => &mut props.postal_code,
            TextField::State => &mut props.state,
            TextField::Country => &mut props.country,
        };
        Some(slot)
    }

    pub fn get(self, props: &MarkerProps) -> String {
        let value = match self {
            TextField::Name => return props.name.clone(),
            TextField::Description => &props.description,
            TextField::Telephone => &props.telephone,
            TextField::Email => &props.email_address,
            TextField::Website => &props.website,
            TextField::Address => &props.address,
            TextField::City => &props.city,
            TextField::PostalCode => &props.postal_code,
            TextField::State => &props.state,
            TextField::Country => &props.country,
        };
        value.clone().unwrap_or_default()
    }

    /// Store typed text. Blank optional fields are dropped from the listing.
    pub fn set(self, props: &mut MarkerProps, value: String) {
        match self.slot(props) {
            Some(slot) => *slot = if value.trim().is_empty() { None } else { Some(value) },
            None => props.name = value,
        }
    }
}

/// Parse the marker size field, which must be a whole number from 0 to 100.
pub fn parse_icon_size(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|size| *size <= 100)
}

#[component]
pub fn ListingCard(
    editor: EditorHandle,
    listing: Listing,
    options: MapboxOptions,
    icons: Vec<MarkerIcon>,
    last_click: Option<LngLat>,
) -> Element {
    let mut draft = use_signal(|| listing.clone());
    let mut open = use_signal(|| false);
    let mut notice = use_signal(|| None::<String>);

    // a saved or imported listing replaces the draft
    use_effect(use_reactive((&listing,), move |(listing,)| draft.set(listing)));

    let current = draft.read().clone();
    let dirty = current != listing;
    let at = current.coordinates();
    let position = format_lng_lat(at);
    let id = listing.id;
    let category_rows: Vec<(FilterKind, String, bool)> = [FilterKind::Tags, FilterKind::Filters]
        .into_iter()
        .flat_map(|kind| {
            let chosen = current.properties.entries(kind).to_vec();
            options.collection(kind).iter().map(move |entry| {
                (kind, entry.value.clone(), chosen.iter().any(|c| c.value == entry.value))
            }).collect::<Vec<_>>()
        })
        .collect();

    rsx! {
        div {
            class: if dirty { "listing dirty" } else { "listing" },
            id: "listing-{id}",
            div { class: "listing-header",
                span { class: "drag-handle", "⠿" }
                a {
                    class: "title",
                    href: "#",
                    onclick: move |evt: Event<MouseData>| {
                        evt.prevent_default();
                        editor.focus(id);
                    },
                    "{listing.properties.name}"
                }
                button {
                    class: "secondary",
                    onclick: move |_| {
                        let now = *open.read();
                        open.set(!now);
                    },
                    if open() { "Close" } else { "Edit" }
                }
            }
            if open() {
                div { class: "listing-form",
                    for field in TextField::ALL {
                        label { key: "{field:?}", class: "field",
                            {field.label()}
                            if field == TextField::Description {
                                textarea {
                                    rows: "3",
                                    value: field.get(&current.properties),
                                    oninput: move |evt: Event<FormData>| field.set(&mut draft.write().properties, evt.value()),
                                }
                            } else {
                                input {
                                    r#type: "text",
                                    value: field.get(&current.properties),
                                    oninput: move |evt: Event<FormData>| field.set(&mut draft.write().properties, evt.value()),
                                }
                            }
                        }
                    }

                    for (kind, value, checked) in category_rows {
                        label { key: "{kind}-{value}", class: "toggle",
                            input {
                                r#type: "checkbox",
                                checked,
                                onchange: {
                                    let value = value.clone();
                                    move |evt: Event<FormData>| {
                                        toggle_entry(&mut draft.write().properties, kind, &value, evt.checked());
                                    }
                                },
                            }
                            " {kind}: {value}"
                        }
                    }

                    label { class: "field",
                        "Icon"
                        select {
                            onchange: move |evt: Event<FormData>| draft.write().properties.icon = Some(evt.value()),
                            for icon in icons.iter() {
                                option {
                                    value: "{icon.name}",
                                    selected: icon.name == current.properties.icon_name(),
                                    "{icon.name}"
                                }
                            }
                        }
                    }
                    label { class: "field",
                        "Size"
                        input {
                            r#type: "number",
                            min: "0",
                            max: "100",
                            value: current.properties.icon_size().to_string(),
                            oninput: move |evt: Event<FormData>| {
                                if let Some(size) = parse_icon_size(&evt.value()) {
                                    draft.write().properties.icon_size = Some(size);
                                }
                            },
                        }
                    }
                    label { class: "field",
                        "Colour"
                        input {
                            r#type: "text",
                            value: current.properties.icon_color().to_string(),
                            oninput: move |evt: Event<FormData>| draft.write().properties.icon_color = Some(evt.value()),
                        }
                    }

                    div { class: "coordinates",
                        span { "Position: {position}" }
                        label { class: "field",
                            "Longitude"
                            input {
                                r#type: "number",
                                step: "0.00001",
                                value: "{at.lng}",
                                onchange: move |evt: Event<FormData>| {
                                    match parse_lng_lat(&evt.value(), &at.lat.to_string()) {
                                        Some(point) => draft.write().geometry.coordinates = point,
                                        None => notice.set(Some("Longitude must be between -180 and 180".to_string())),
                                    }
                                },
                            }
                        }
                        label { class: "field",
                            "Latitude"
                            input {
                                r#type: "number",
                                step: "0.00001",
                                value: "{at.lat}",
                                onchange: move |evt: Event<FormData>| {
                                    match parse_lng_lat(&at.lng.to_string(), &evt.value()) {
                                        Some(point) => draft.write().geometry.coordinates = point,
                                        None => notice.set(Some("Latitude must be between -90 and 90".to_string())),
                                    }
                                },
                            }
                        }
                        button {
                            class: "secondary",
                            disabled: last_click.is_none(),
                            title: "Move the listing to the last clicked map position",
                            onclick: move |_| {
                                if let Some(point) = last_click {
                                    draft.write().geometry.coordinates = point;
                                }
                            },
                            "Use last click"
                        }
                    }

                    if let Some(text) = &*notice.read() {
                        p { class: "message", "{text}" }
                    }

                    div { class: "listing-actions",
                        button {
                            disabled: !dirty,
                            onclick: move |_| {
                                notice.set(None);
                                if !editor.save_listing(draft.read().clone()) {
                                    notice.set(Some("The listing no longer exists.".to_string()));
                                }
                            },
                            "Save"
                        }
                        button {
                            class: "secondary",
                            disabled: !dirty,
                            onclick: {
                                let stored = listing.clone();
                                move |_| {
                                    notice.set(None);
                                    draft.set(stored.clone());
                                }
                            },
                            "Reset"
                        }
                        button {
                            class: "danger",
                            onclick: move |_| {
                                editor.delete_listing(id);
                            },
                            "Delete"
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_field_round_trip() {
        let mut props = MarkerProps::default();
        TextField::Telephone.set(&mut props, "+39 02 1234".to_string());
        assert_eq!(props.telephone.as_deref(), Some("+39 02 1234"));
        assert_eq!(TextField::Telephone.get(&props), "+39 02 1234");
    }

    #[test]
    fn test_blank_optional_field_is_dropped() {
        let mut props = MarkerProps::default();
        props.website = Some("https://example.org".to_string());
        TextField::Website.set(&mut props, "   ".to_string());
        assert!(props.website.is_none());
        assert_eq!(TextField::Website.get(&props), "");
    }

    #[test]
    fn test_name_is_kept_even_when_blank() {
        let mut props = MarkerProps::default();
        TextField::Name.set(&mut props, String::new());
        assert_eq!(props.name, "");
    }

    #[test]
    fn test_labels_are_unique() {
        let mut labels: Vec<&str> = TextField::ALL.iter().map(|f| f.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), TextField::ALL.len());
    }

    #[test]
    fn test_parse_icon_size() {
        assert_eq!(parse_icon_size(" 40 "), Some(40));
        assert_eq!(parse_icon_size("0"), Some(0));
        assert_eq!(parse_icon_size("100"), Some(100));
        assert_eq!(parse_icon_size("101"), None);
        assert_eq!(parse_icon_size("-1"), None);
        assert_eq!(parse_icon_size("4.5"), None);
    }
}
