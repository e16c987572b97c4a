use std::path::PathBuf;

use mapblock_shared::models::MapboxDefaults;

/// Server configuration read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub db_path: PathBuf,
    pub assets_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub defaults: MapboxDefaults,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup, so tests need not touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = match lookup("PORT").map(|p| p.parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "invalid PORT, using 3000");
                3000
            }
            None => 3000,
        };

        let access_token = lookup("MAPBOX_ACCESS_TOKEN").filter(|t| !t.trim().is_empty());
        if access_token.is_none() {
            tracing::warn!("MAPBOX_ACCESS_TOKEN is not set, maps will show the setup notice");
        }

        Settings {
            port,
            db_path: PathBuf::from(get("DB_PATH", "data/blocks.redb")),
            assets_dir: PathBuf::from(get("ASSETS_DIR", "assets")),
            dist_dir: PathBuf::from(get("DIST_DIR", "dist")),
            defaults: MapboxDefaults {
                access_token,
                site_url: get("SITE_URL", "http://localhost:3000"),
                language: get("MAP_LANGUAGE", "en"),
            },
        }
    }
}
