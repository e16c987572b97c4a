mod api;
mod components;
mod coords;
mod mapbox;
mod pages;
mod public;
mod surface;

use dioxus::prelude::*;

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[route("/")]
    Home {},
    #[route("/edit/:id")]
    Editor { id: String },
}

#[component]
fn Home() -> Element {
    rsx! {
        pages::home::BlockList {}
    }
}

#[component]
fn Editor(id: String) -> Element {
    rsx! {
        pages::editor::BlockEditor { block_id: id }
    }
}

const CSS: Asset = asset!("/assets/main.css");
const FAVICON: Asset = asset!("/assets/favicon.svg");

#[allow(non_snake_case)]
fn App() -> Element {
    rsx! {
        document::Link { rel: "icon", r#type: "image/svg+xml", href: FAVICON }
        document::Stylesheet { href: CSS }
        Router::<Route> {}
    }
}

fn main() {
    // a page carrying rendered blocks gets the viewer, anything else the editor
    if public::has_blocks() {
        public::start();
    } else {
        launch(App);
    }
}
