use dioxus::prelude::*;
use mapblock_shared::camera::CameraField;
use mapblock_shared::session::AttributeChange;

use crate::pages::editor::EditorHandle;

#[component]
pub fn CameraPanel(editor: EditorHandle) -> Element {
    let camera = editor.session.read().attributes().camera();
    let attached = editor.session.read().is_attached();

    rsx! {
        div { class: "panel",
            h3 { "Camera" }
            for field in CameraField::ALL {
                CameraInput { key: "{field:?}", editor, field, value: camera.get(field) }
            }
            button {
                class: "secondary",
                disabled: !attached,
                title: "Store the position the map currently shows",
                onclick: move |_| editor.pull_camera(),
                "Use current view"
            }
        }
    }
}

#[component]
fn CameraInput(editor: EditorHandle, field: CameraField, value: f64) -> Element {
    let (min, max) = field.range();
    let step = field.step();

    rsx! {
        div { class: "camera-field",
            label { {field.label()} }
            input {
                r#type: "range",
                min: "{min}",
                max: "{max}",
                step: "{step}",
                value: "{value}",
                oninput: move |evt: Event<FormData>| {
                    editor.change(AttributeChange::CameraInput(field, evt.value()));
                },
            }
            input {
                r#type: "number",
                min: "{min}",
                max: "{max}",
                step: "{step}",
                value: "{value}",
                onchange: move |evt: Event<FormData>| {
                    editor.change(AttributeChange::CameraInput(field, evt.value()));
                },
            }
        }
    }
}
