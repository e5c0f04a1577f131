//! Admin 路由

use actix_web::error::{InternalError, JsonPayloadError, UrlencodedError};
use actix_web::http::StatusCode;
use actix_web::{Either, Error, HttpMessage, HttpRequest, HttpResponse, web};
use std::str::FromStr;
use tracing::{debug, trace};

use crate::api::AppState;
use crate::api::middleware::Grants;
use crate::api::nonce::NonceAction;

use super::actions::{self, AdminAction};
use super::error_code::ErrorCode;
use super::helpers::{api_result, error_from_tracker, error_response, success_response};
use super::types::{AjaxRequest, NonceBundle};

/// 已认证请求的权限；没有经过中间件时按未认证处理
fn request_grants(req: &HttpRequest) -> Option<Grants> {
    req.extensions().get::<Grants>().copied()
}

pub async fn issue_nonces(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if request_grants(&req).is_none() {
        return error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthorized,
            "Unauthorized",
        );
    }
    let mut bundle = NonceBundle::default();
    for (action, nonce) in state.nonces.issue_all() {
        match action {
            NonceAction::Dashboard => bundle.dashboard = nonce,
            NonceAction::Stats => bundle.stats = nonce,
            NonceAction::CreateLink => bundle.create_link = nonce,
            NonceAction::ResetData => bundle.reset_data = nonce,
        }
    }
    success_response(bundle)
}

pub async fn ajax(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: Either<web::Json<AjaxRequest>, web::Form<AjaxRequest>>,
) -> HttpResponse {
    let payload = match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };

    let Some(grants) = request_grants(&req) else {
        return error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthorized,
            "Unauthorized",
        );
    };

    let Ok(action) = AdminAction::from_str(payload.action.trim()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::UnknownAction,
            &format!("Unknown action: {}", payload.action),
        );
    };
    trace!("AJAX {} by {:?}", action.as_ref(), grants);

    if let Err(e) = actions::authorize(&state, action, grants, &payload.nonce) {
        return error_from_tracker(&e);
    }

    api_result(actions::run(&state, action, payload).await)
}

/// 请求体无法解析时也返回 JSON 信封
fn malformed_body(message: String) -> Error {
    debug!("Rejected admin request body: {}", message);
    let response = error_response(
        StatusCode::BAD_REQUEST,
        ErrorCode::BadRequest,
        &format!("Invalid request body: {}", message),
    );
    InternalError::from_response(message, response).into()
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    malformed_body(err.to_string())
}

fn form_error_handler(err: UrlencodedError, _req: &HttpRequest) -> Error {
    malformed_body(err.to_string())
}

/// 挂载在 admin scope 下
pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::FormConfig::default().error_handler(form_error_handler))
        .route("/nonces", web::get().to(issue_nonces))
        .route("/ajax", web::post().to(ajax));
}

