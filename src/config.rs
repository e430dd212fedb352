use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tokio::{fs, sync::RwLock};

use crate::error::ContentError;
use crate::models::Project;

pub const DEFAULT_CONTENT_DIR: &str = "content";
pub const DEFAULT_PORT: u16 = 8080;
pub const SITE_FILE: &str = "site.toml";

/// Process-level settings read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub is_development: bool,
    pub port: u16,
    pub content_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let is_development = std::env::var("RUST_ENV")
            .map(|v| v == "development")
            .unwrap_or(false);
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let content_dir = std::env::var("CONTENT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONTENT_DIR));

        Self {
            is_development,
            port,
            content_dir,
        }
    }
}

/// Site settings shared with the post source, swapped in place on reload.
pub type SharedSite = Arc<RwLock<SiteConfig>>;

/// Contents of `site.toml`.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub images: ImageSettings,
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SiteSettings {
    pub title: String,
    pub default_author: String,
    pub posts_per_page: usize,
    /// How many projects the home page features.
    pub featured_projects: usize,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            default_author: "Anonymous".to_string(),
            posts_per_page: 10,
            featured_projects: 2,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ImageSettings {
    pub cdn_base: String,
    pub project_id: Option<String>,
    pub dataset: String,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            cdn_base: "https://cdn.sanity.io".to_string(),
            project_id: None,
            dataset: "production".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn parse(source: &str) -> Result<Self, ContentError> {
        Ok(toml::from_str(source)?)
    }

    pub async fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let path = content_dir.join(SITE_FILE);
        let source = fs::read_to_string(&path)
            .await
            .map_err(|e| ContentError::Io(path.clone(), e))?;
        Self::parse(&source)
    }
}
