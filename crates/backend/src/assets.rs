use mapblock_shared::markup::default_pin_svg;
use mapblock_shared::models::{MarkerIcon, DEFAULT_MARKER_ICON, DEFAULT_MARKER_SIZE};
use std::path::Path;

/// Marker icons offered to every block.
pub struct Assets {
    pub icons: Vec<MarkerIcon>,
}

impl Assets {
    /// Load `icons.json` from `assets_dir`. A missing file gives the built-in
    /// library; a broken one is an error.
    pub fn load(assets_dir: &Path) -> Result<Self, String> {
        let icons_path = assets_dir.join("icons.json");
        if !icons_path.exists() {
            tracing::info!(path = %icons_path.display(), "No icon library found, using the built-in pin");
            return Ok(Self::builtin());
        }

        let icons_data = std::fs::read_to_string(&icons_path)
            .map_err(|e| format!("Failed to read {}: {}", icons_path.display(), e))?;
        let mut icons: Vec<MarkerIcon> = serde_json::from_str(&icons_data)
            .map_err(|e| format!("Failed to parse icons.json: {}", e))?;

        if !icons.iter().any(|i| i.name == DEFAULT_MARKER_ICON) {
            icons.insert(0, Self::default_icon(0));
            // keep ids unique after the insert
            for (id, icon) in icons.iter_mut().enumerate() {
                icon.id = id as u32;
            }
        }

        tracing::info!(icons = icons.len(), "Loaded marker icons");
        Ok(Assets { icons })
    }

    pub fn builtin() -> Self {
        Assets {
            icons: vec![Self::default_icon(0)],
        }
    }

    fn default_icon(id: u32) -> MarkerIcon {
        MarkerIcon {
            id,
            name: DEFAULT_MARKER_ICON.to_string(),
            content: default_pin_svg("currentColor", DEFAULT_MARKER_SIZE),
        }
    }
}
