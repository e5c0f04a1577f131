use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::AppState;
use crate::config::get_config;
use crate::storage::{SeaOrmStorage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub state: AppState,
    pub route_config: RouteConfig,
}

#[derive(Clone, Debug)]
pub struct RouteConfig {
    pub admin_prefix: String,
    pub health_prefix: String,
    pub link_prefix: String,
}

impl RouteConfig {
    pub fn from_config() -> Self {
        let routes = &get_config().routes;
        Self {
            admin_prefix: normalize_prefix(&routes.admin_prefix),
            health_prefix: normalize_prefix(&routes.health_prefix),
            link_prefix: normalize_prefix(&routes.link_prefix),
        }
    }
}

/// 统一成 `/xxx` 形式，空字符串保持为空
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// 准备服务器启动的上下文
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let config = get_config();
    if config.auth.admin_token.is_empty() {
        warn!("Admin API is disabled (auth.admin_token not set)");
    }
    if config.tracker.trust_proxy_headers {
        warn!("Trusting X-Forwarded-For for client IPs");
    }

    let state = AppState::from_config(storage.clone());
    let route_config = RouteConfig::from_config();

    info!(
        "Pre-startup completed in {} ms",
        start_time.elapsed().as_millis()
    );
    Ok(StartupContext {
        storage,
        state,
        route_config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("go"), "/go");
        assert_eq!(normalize_prefix("/admin/"), "/admin");
        assert_eq!(normalize_prefix("/"), "");
    }
}
