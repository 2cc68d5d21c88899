use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::config::SiteConfig;
use crate::content_loader::Templates;
use crate::store::ContentStore;

pub type RefreshBroadcaster = broadcast::Sender<()>;

pub struct AppState {
    pub site: SiteConfig,
    pub content_dir: PathBuf,
    pub templates: RwLock<Templates>,
    pub store: RwLock<ContentStore>,
    pub is_development: bool,
}

impl AppState {
    pub fn new(
        site: SiteConfig,
        content_dir: PathBuf,
        templates: Templates,
        store: ContentStore,
        is_development: bool,
    ) -> Self {
        Self {
            site,
            content_dir,
            templates: RwLock::new(templates),
            store: RwLock::new(store),
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
