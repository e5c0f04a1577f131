//! Server mode
//!
//! Builds the actix-web app: admin AJAX scope, health probes and the
//! short link redirect scope.

use actix_web::{App, HttpServer, middleware::DefaultHeaders, web};
use anyhow::{Context, Result};
use tracing::warn;

use crate::api::AppState;
use crate::api::middleware::AdminAuth;
use crate::api::services::admin::admin_routes;
use crate::api::services::{AppStartTime, health_routes, redirect_routes};
use crate::runtime::lifetime;
use crate::runtime::lifetime::startup::RouteConfig;

/// 挂载所有路由，测试里也用这一份
pub fn configure_app(
    cfg: &mut web::ServiceConfig,
    routes: &RouteConfig,
    admin_auth: AdminAuth,
) {
    cfg.service(
        web::scope(&routes.admin_prefix)
            .wrap(admin_auth)
            .configure(admin_routes),
    )
    .service(web::scope(&routes.health_prefix).configure(health_routes))
    .service(web::scope(&routes.link_prefix).configure(redirect_routes));
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime::now();

    let startup = lifetime::startup::prepare_server_startup()
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    let state: AppState = startup.state.clone();
    let routes = startup.route_config.clone();
    let db_for_shutdown = startup.storage.get_db().clone();

    let config = crate::config::get_config();
    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::PayloadConfig::new(1024 * 1024))
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .configure(|cfg| configure_app(cfg, &routes, AdminAuth::from_config()))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count);

    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Server binding failed: {}", bind_address))?
        .run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(db_for_shutdown) => {
            warn!("Graceful shutdown completed");
        }
    }

    Ok(())
}
