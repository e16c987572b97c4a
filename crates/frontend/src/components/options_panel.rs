use dioxus::prelude::*;
use mapblock_shared::config::{MAP_PROJECTIONS, MAP_STYLES};
use mapblock_shared::session::AttributeChange;

use crate::pages::editor::EditorHandle;

const ALIGNMENTS: [(&str, &str); 3] = [("", "Default"), ("wide", "Wide width"), ("full", "Full width")];

#[component]
pub fn OptionsPanel(editor: EditorHandle) -> Element {
    let attrs = editor.session.read().attributes().clone();

    rsx! {
        div { class: "panel",
            h3 { "Map" }
            label { class: "field",
                "Style"
                select {
                    onchange: move |evt: Event<FormData>| editor.change(AttributeChange::MapStyle(evt.value())),
                    for (value, label) in MAP_STYLES {
                        option { value: "{value}", selected: attrs.map_style == value, "{label}" }
                    }
                }
            }
            label { class: "field",
                "Projection"
                select {
                    onchange: move |evt: Event<FormData>| editor.change(AttributeChange::MapProjection(evt.value())),
                    for (value, label) in MAP_PROJECTIONS {
                        option { value: "{value}", selected: attrs.map_projection == value, "{label}" }
                    }
                }
            }
            label { class: "field",
                "Height"
                input {
                    r#type: "text",
                    placeholder: "500px",
                    value: "{attrs.map_height}",
                    onchange: move |evt: Event<FormData>| editor.change(AttributeChange::MapHeight(evt.value())),
                }
            }
            label { class: "field",
                "Alignment"
                select {
                    onchange: move |evt: Event<FormData>| editor.change(AttributeChange::Align(evt.value())),
                    for (value, label) in ALIGNMENTS {
                        option { value: "{value}", selected: attrs.align == value, "{label}" }
                    }
                }
            }

            Toggle {
                label: "Sidebar",
                checked: attrs.sidebar_enabled,
                onchange: move |on| editor.change(AttributeChange::SidebarEnabled(on)),
            }
            Toggle {
                label: "Search box",
                checked: attrs.geocoder_enabled,
                disabled: !attrs.sidebar_enabled,
                onchange: move |on| editor.change(AttributeChange::GeocoderEnabled(on)),
            }
            Toggle {
                label: "Filter select",
                checked: attrs.filters_enabled,
                onchange: move |on| editor.change(AttributeChange::FiltersEnabled(on)),
            }
            Toggle {
                label: "Tag select",
                checked: attrs.tags_enabled,
                onchange: move |on| editor.change(AttributeChange::TagsEnabled(on)),
            }
            Toggle {
                label: "Fit view button",
                checked: attrs.fit_view,
                onchange: move |on| editor.change(AttributeChange::FitView(on)),
            }
            Toggle {
                label: "3D terrain",
                checked: attrs.elevation,
                onchange: move |on| editor.change(AttributeChange::Elevation(on)),
            }
            Toggle {
                label: "Free camera",
                checked: attrs.free_view_camera,
                onchange: move |on| editor.change(AttributeChange::FreeViewCamera(on)),
            }
            Toggle {
                label: "Mouse wheel zoom",
                checked: attrs.mouse_wheel_zoom,
                onchange: move |on| editor.change(AttributeChange::MouseWheelZoom(on)),
            }
        }
    }
}

#[component]
fn Toggle(
    label: &'static str,
    checked: bool,
    #[props(default)] disabled: bool,
    onchange: EventHandler<bool>,
) -> Element {
    rsx! {
        label { class: if disabled { "toggle disabled" } else { "toggle" },
            input {
                r#type: "checkbox",
                checked,
                disabled,
                onchange: move |evt: Event<FormData>| onchange.call(evt.checked()),
            }
            " {label}"
        }
    }
}
