//! HTML written into the public page and into map overlays.
//!
//! The block root carries the whole configuration in `data-mapbox-options`
//! and the host defaults in `data-mapbox-defaults`; the public bootstrap
//! reads both back with [`parse_block_data`].

use std::fmt::Write;

use tracing::warn;

use crate::config::{parse_attributes, BlockAttributes};
use crate::models::{safe_slug, Listing, MapFilter, MapboxDefaults, MarkerIcon, MarkerProps};
use crate::popup::{PopupContent, Prompt};
use crate::surface::MarkerSpec;

pub const ROOT_CLASS: &str = "wp-block-mapblock";
pub const OPTIONS_ATTR: &str = "data-mapbox-options";
pub const DEFAULTS_ATTR: &str = "data-mapbox-defaults";
pub const LISTING_ID_ATTR: &str = "data-listing-id";
pub const SIGNUP_URL: &str = "https://account.mapbox.com/auth/signup/";

/// Path of the built-in pin, drawn in a 365x560 viewbox.
const DEFAULT_PIN_PATH: &str = "M182.9 551.7c0 .1.2.3.2.3s175.2-269 175.2-357.4c0-130.1-88.8-186.7-175.4-186.9C96.3 7.9 7.5 64.5 7.5 194.6 7.5 283 182.8 552 182.8 552l.1-.3zm-60.7-364.5c0-33.6 27.2-60.8 60.8-60.8 33.6 0 60.8 27.2 60.8 60.8S216.5 248 182.9 248c-33.5 0-60.7-27.2-60.7-60.8z";

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The public markup of a block.
pub fn render_block(attrs: &BlockAttributes, defaults: &MapboxDefaults) -> String {
    let defaults_json = serde_json::to_string(defaults).unwrap_or_else(|_| "{}".to_string());
    let mut html = String::new();
    let align = if attrs.align.is_empty() {
        String::new()
    } else {
        format!(" align{}", escape_html(&attrs.align))
    };

    let _ = write!(
        html,
        r#"<div class="{ROOT_CLASS}{align}" {OPTIONS_ATTR}="{}" {DEFAULTS_ATTR}="{}">"#,
        escape_html(&attrs.to_json()),
        escape_html(&defaults_json),
    );

    if attrs.sidebar_enabled {
        html.push_str(r#"<div class="map-sidebar">"#);
        if attrs.geocoder_enabled && defaults.credential().is_some() {
            html.push_str(r#"<div class="geocoder"></div>"#);
        }
        html.push_str(r#"<div class="feature-listing">"#);
        for listing in &attrs.mapbox_options.listings {
            html.push_str(&sidebar_entry(listing));
        }
        html.push_str("</div></div>");
    }

    html.push_str(r#"<div class="map-container">"#);
    if attrs.fit_view || attrs.filters_enabled || attrs.tags_enabled {
        html.push_str(r#"<div class="map-topbar">"#);
        if attrs.fit_view {
            html.push_str(r#"<button type="button" class="button fit-view">fit-view</button>"#);
        }
        if attrs.filters_enabled {
            html.push_str(&filter_select(
                "filter-by-partnership",
                "Select a filter",
                &attrs.mapbox_options.filters,
            ));
        }
        if attrs.tags_enabled {
            html.push_str(&filter_select(
                "filter-by-tag",
                "Select a tag",
                &attrs.mapbox_options.tags,
            ));
        }
        html.push_str("</div>");
    }
    let _ = write!(
        html,
        r#"<div class="map" style="height:{}"></div></div></div>"#,
        escape_html(&attrs.map_height)
    );
    html
}

fn filter_select(class: &str, placeholder: &str, entries: &[MapFilter]) -> String {
    let mut html = format!(
        r#"<select class="mapbox-map-filter {class}"><option value="" selected>{}</option>"#,
        escape_html(placeholder)
    );
    for entry in entries {
        let _ = write!(
            html,
            r#"<option value="{}">{}</option>"#,
            escape_html(&safe_slug(&entry.value)),
            escape_html(&entry.value)
        );
    }
    html.push_str("</select>");
    html
}

/// One sidebar entry, keyed by listing id so the bootstrap can hide it.
pub fn sidebar_entry(listing: &Listing) -> String {
    let p = &listing.properties;
    let mut html = format!(
        r##"<div class="listing" id="listing-{id}" {LISTING_ID_ATTR}="{id}"><a href="#" class="title">{}</a>"##,
        escape_html(&p.name),
        id = listing.id,
    );
    let details: Vec<&str> = [p.address.as_deref(), p.city.as_deref(), p.telephone.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect();
    if !details.is_empty() {
        let _ = write!(html, "<div>{}</div>", escape_html(&details.join(" · ")));
    }
    html.push_str("</div>");
    html
}

/// Read the configuration back from a block root's data attributes. Missing
/// or broken attributes give defaults.
pub fn parse_block_data(options: Option<&str>, defaults: Option<&str>) -> (BlockAttributes, MapboxDefaults) {
    let attrs = options.map(parse_attributes).unwrap_or_default();
    let defaults = match defaults {
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
            warn!(error = %e, "block defaults are not valid, using empty defaults");
            MapboxDefaults::default()
        }),
        None => MapboxDefaults::default(),
    };
    (attrs, defaults)
}

/// Shown in place of the map when no access token is configured.
pub fn credential_notice() -> String {
    format!(
        r#"<div class="credential-notice"><p><a href="{SIGNUP_URL}" target="_blank" rel="noreferrer">Get a Mapbox Access Token</a></p></div>"#
    )
}

/// Inner HTML of a popup.
pub fn popup_html(content: &PopupContent) -> String {
    match content {
        PopupContent::Listing(props) => listing_details(props),
        PopupContent::Prompt(prompt) => prompt_html(prompt),
    }
}

fn listing_details(p: &MarkerProps) -> String {
    let mut html = format!(r#"<div class="popup-content"><h3>{}</h3>"#, escape_html(&p.name));
    if let Some(d) = non_blank(&p.description) {
        let _ = write!(html, "<p>{}</p>", escape_html(d));
    }
    let address: Vec<&str> = [&p.address, &p.postal_code, &p.city, &p.state, &p.country]
        .into_iter()
        .filter_map(non_blank)
        .collect();
    if !address.is_empty() {
        let _ = write!(html, "<p class=\"address\">{}</p>", escape_html(&address.join(", ")));
    }
    if let Some(t) = non_blank(&p.telephone) {
        let _ = write!(html, r#"<a class="phone" href="tel:{0}">{0}</a>"#, escape_html(t));
    }
    if let Some(e) = non_blank(&p.email_address) {
        let _ = write!(html, r#"<a class="email" href="mailto:{0}">{0}</a>"#, escape_html(e));
    }
    if let Some(w) = non_blank(&p.website) {
        if is_linkable(w) {
            let _ = write!(
                html,
                r#"<a class="website" href="{0}" target="_blank" rel="noopener">{0}</a>"#,
                escape_html(w.trim())
            );
        } else {
            let _ = write!(html, r#"<p class="website">{}</p>"#, escape_html(w));
        }
    }
    html.push_str("</div>");
    html
}

fn prompt_html(prompt: &Prompt) -> String {
    let mut html = format!(
        r#"<div class="popup-prompt"><p>{}</p>"#,
        escape_html(&prompt.message)
    );
    if prompt.confirm {
        html.push_str(
            r#"<button type="button" class="popup-confirm">Add</button><button type="button" class="popup-cancel">Cancel</button>"#,
        );
    }
    html.push_str("</div>");
    html
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

/// Only web and mail addresses become links.
fn is_linkable(url: &str) -> bool {
    let Some((scheme, _)) = url.trim().split_once(':') else {
        return false;
    };
    ["http", "https", "mailto"]
        .iter()
        .any(|allowed| scheme.eq_ignore_ascii_case(allowed))
}

/// The built-in pin filled with `color`.
pub fn default_pin_svg(color: &str, size: u32) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 365 560" width="{size}" height="{size}"><path fill="{}" d="{DEFAULT_PIN_PATH}"/></svg>"#,
        escape_html(color)
    )
}

/// Marker element markup: the named library icon, or the built-in pin.
pub fn marker_html(spec: &MarkerSpec, icon: Option<&MarkerIcon>) -> String {
    let size = spec.icon_size;
    let body = match icon {
        Some(icon) if !icon.content.trim().is_empty() => icon.content.clone(),
        _ => default_pin_svg(&spec.icon_color, size),
    };
    format!(
        r#"<div class="marker" id="{}" title="{}" style="width:{size}px;height:{size}px;color:{}">{body}</div>"#,
        spec.element_id(),
        escape_html(&spec.name),
        escape_html(&spec.icon_color),
    )
}
