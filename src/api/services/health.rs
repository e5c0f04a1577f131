use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{error, trace};

use crate::api::AppState;

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StorageCheck {
    pub status: &'static str,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime: u64,
    pub storage: StorageCheck,
    pub response_time_ms: u64,
}

/// Health Service
///
/// 直接 ping 存储，不经过业务层
pub struct HealthService;

impl HealthService {
    async fn check_storage(state: &AppState) -> StorageCheck {
        let backend = state.storage.backend_name().to_string();
        match tokio::time::timeout(Duration::from_secs(5), state.storage.ping()).await {
            Ok(Ok(())) => {
                trace!("Storage health check passed");
                StorageCheck {
                    status: "healthy",
                    backend,
                    error: None,
                }
            }
            Ok(Err(e)) => {
                error!("Storage health check failed: {}", e);
                StorageCheck {
                    status: "unhealthy",
                    backend,
                    error: Some(format!("database error: {}", e)),
                }
            }
            Err(_) => {
                error!("Storage health check timeout");
                StorageCheck {
                    status: "unhealthy",
                    backend,
                    error: Some("timeout".to_string()),
                }
            }
        }
    }

    pub async fn health_check(
        state: web::Data<AppState>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        let storage = Self::check_storage(&state).await;
        let now = chrono::Utc::now();
        let healthy = storage.status == "healthy";

        let body = HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" },
            timestamp: now.to_rfc3339(),
            uptime: (now - app_start_time.start_datetime).num_seconds().max(0) as u64,
            storage,
            response_time_ms: start_time.elapsed().as_millis() as u64,
        };

        if healthy {
            HttpResponse::Ok().json(body)
        } else {
            HttpResponse::ServiceUnavailable().json(body)
        }
    }

    /// 就绪检查：存储可用才算就绪
    pub async fn readiness_check(state: web::Data<AppState>) -> impl Responder {
        let storage = Self::check_storage(&state).await;
        if storage.status == "healthy" {
            HttpResponse::Ok().body("OK")
        } else {
            HttpResponse::ServiceUnavailable().body("Storage unavailable")
        }
    }

    pub async fn liveness_check() -> impl Responder {
        HttpResponse::NoContent().finish()
    }
}

pub fn health_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check));
}
