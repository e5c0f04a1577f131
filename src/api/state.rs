use std::sync::Arc;
use std::time::Duration;

use crate::api::nonce::NonceManager;
use crate::services::{ClickService, DemoDataService, LinkService, StatsService};
use crate::storage::SeaOrmStorage;

/// 所有 handler 共享的状态，以 `web::Data<AppState>` 注入
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<SeaOrmStorage>,
    pub links: Arc<LinkService>,
    pub clicks: Arc<ClickService>,
    pub stats: Arc<StatsService>,
    pub demo: Arc<DemoDataService>,
    pub nonces: Arc<NonceManager>,
}

impl AppState {
    pub fn new(storage: Arc<SeaOrmStorage>, nonce_ttl: Duration) -> Self {
        let links = Arc::new(LinkService::new(storage.clone()));
        Self {
            clicks: Arc::new(ClickService::new(storage.clone())),
            stats: Arc::new(StatsService::new(storage.clone())),
            demo: Arc::new(DemoDataService::new(storage.clone(), links.clone())),
            nonces: Arc::new(NonceManager::new(nonce_ttl)),
            links,
            storage,
        }
    }

    pub fn from_config(storage: Arc<SeaOrmStorage>) -> Self {
        let ttl = crate::config::get_config().auth.nonce_ttl_secs;
        Self::new(storage, Duration::from_secs(ttl.max(1)))
    }
}
