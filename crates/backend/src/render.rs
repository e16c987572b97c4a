use mapblock_shared::markup::{escape_html, render_block};
use mapblock_shared::models::{BlockRecord, MapboxDefaults};

const MAPBOX_GL_CSS: &str = "https://api.mapbox.com/mapbox-gl-js/v3.9.0/mapbox-gl.css";
const MAPBOX_GL_JS: &str = "https://api.mapbox.com/mapbox-gl-js/v3.9.0/mapbox-gl.js";

/// The public page of a block. The block markup goes into the frontend's
/// `index.html` so the bundled bootstrap can pick it up; without a built
/// frontend the bare markup is served.
pub fn render_block_page(index_html: Option<&str>, block: &BlockRecord, defaults: &MapboxDefaults) -> String {
    let markup = format!(
        r#"<main class="mapblock-page">{}</main>"#,
        render_block(&block.attributes, defaults)
    );
    let title = escape_html(&block.name);

    if let Some(index) = index_html {
        if let Some(pos) = index.find("</body>") {
            let mut page = String::with_capacity(index.len() + markup.len());
            page.push_str(&index[..pos]);
            page.push_str(&markup);
            page.push_str(&index[pos..]);
            return replace_title(page, &title);
        }
        tracing::warn!("index.html has no </body>, serving the bare block");
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="stylesheet" href="{MAPBOX_GL_CSS}">
<script src="{MAPBOX_GL_JS}"></script>
</head>
<body>
{markup}
</body>
</html>"#
    )
}

fn replace_title(page: String, title: &str) -> String {
    match (page.find("<title>"), page.find("</title>")) {
        (Some(start), Some(end)) if start < end => {
            format!("{}<title>{}{}", &page[..start], title, &page[end..])
        }
        _ => page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapblock_shared::config::BlockAttributes;

    fn block(name: &str) -> BlockRecord {
        BlockRecord {
            id: uuid::Uuid::new_v4(),
            name: name.to_string(),
            attributes: BlockAttributes::default(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_markup_is_injected_before_body_end() {
        let index = "<html><head><title>App</title></head><body><div id=\"main\"></div><script src=\"/app.js\"></script></body></html>";
        let page = render_block_page(Some(index), &block("Shops"), &MapboxDefaults::default());
        let markup_at = page.find("wp-block-mapblock").unwrap();
        assert!(markup_at > page.find("/app.js").unwrap());
        assert!(markup_at < page.find("</body>").unwrap());
        assert!(page.contains("<title>Shops</title>"));
    }

    #[test]
    fn test_bare_page_without_frontend() {
        let page = render_block_page(None, &block("<b>"), &MapboxDefaults::default());
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>&lt;b&gt;</title>"));
        assert!(page.contains("data-mapbox-options"));
    }
}
