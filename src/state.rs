use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::config::SharedSite;
use crate::content_loader::SiteContent;
use crate::source::ContentSource;

pub type RefreshBroadcaster = broadcast::Sender<()>;

pub struct AppState {
    pub banner_html: RwLock<String>,
    pub layout_html: RwLock<String>,
    pub home_html: RwLock<String>,
    pub not_found_html: RwLock<String>, // supports {{slug}} placeholder
    pub site: SharedSite,
    pub source: Arc<dyn ContentSource>,
    pub content_dir: PathBuf,
    pub is_development: bool,
}

impl AppState {
    pub fn new(
        content: SiteContent,
        source: impl FnOnce(SharedSite) -> Arc<dyn ContentSource>,
        content_dir: PathBuf,
        is_development: bool,
    ) -> Self {
        let site = Arc::new(RwLock::new(content.site));
        let source = source(site.clone());
        Self {
            banner_html: RwLock::new(content.banner_html),
            layout_html: RwLock::new(content.layout_html),
            home_html: RwLock::new(content.home_html),
            not_found_html: RwLock::new(content.not_found_html),
            site,
            source,
            content_dir,
            is_development,
        }
    }
}

#[derive(Clone)]
pub struct RouterState {
    pub app_state: Arc<AppState>,
    pub broadcaster: RefreshBroadcaster,
}

impl axum::extract::FromRef<RouterState> for Arc<AppState> {
    fn from_ref(state: &RouterState) -> Self {
        state.app_state.clone()
    }
}

impl axum::extract::FromRef<RouterState> for RefreshBroadcaster {
    fn from_ref(state: &RouterState) -> Self {
        state.broadcaster.clone()
    }
}
