use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::CONTENT_TYPE,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use subtle::ConstantTimeEq;
use tracing::{debug, info, trace};

use crate::api::services::admin::{ApiEnvelope, ErrorCode};
use crate::config::get_config;

/// 管理端动作需要的权限
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    /// 任意已认证用户
    Read,
    PublishPosts,
    ManageOptions,
}

/// 当前请求持有的权限，由认证中间件写入 request extensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grants {
    Admin,
    Editor,
}

impl Grants {
    pub fn allows(self, capability: Capability) -> bool {
        match self {
            Grants::Admin => true,
            Grants::Editor => capability != Capability::ManageOptions,
        }
    }
}

/// Admin authentication middleware
#[derive(Clone)]
pub struct AdminAuth {
    admin_token: Rc<str>,
    editor_token: Option<Rc<str>>,
}

impl AdminAuth {
    pub fn new(admin_token: impl Into<String>, editor_token: Option<String>) -> Self {
        Self {
            admin_token: Rc::from(admin_token.into()),
            editor_token: editor_token.filter(|t| !t.is_empty()).map(Rc::from),
        }
    }

    pub fn from_config() -> Self {
        let config = get_config();
        Self::new(
            config.auth.admin_token.clone(),
            Some(config.auth.editor_token.clone()),
        )
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminAuthMiddleware {
            service: Rc::new(service),
            admin_token: self.admin_token.clone(),
            editor_token: self.editor_token.clone(),
        }))
    }
}

pub struct AdminAuthMiddleware<S> {
    service: Rc<S>,
    admin_token: Rc<str>,
    editor_token: Option<Rc<str>>,
}

impl<S, B> AdminAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    /// Handle requests when admin token is not configured
    fn handle_missing_token(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
        debug!("Admin token not configured - returning 404");
        req.into_response(
            HttpResponse::NotFound()
                .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
                .body("Not Found")
                .map_into_right_body(),
        )
    }

    /// Handle unauthorized requests
    fn handle_unauthorized(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
        info!("Admin authentication failed - invalid or missing token");
        req.into_response(
            HttpResponse::Unauthorized()
                .json(ApiEnvelope::<()>::failure(
                    "Unauthorized: Invalid or missing token",
                    ErrorCode::Unauthorized,
                ))
                .map_into_right_body(),
        )
    }

    /// 从 Authorization header 提取 Bearer token
    fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
        req.headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|s| s.trim().to_string())
    }

    fn token_matches(expected: &str, given: &str) -> bool {
        expected.as_bytes().ct_eq(given.as_bytes()).into()
    }

    fn grants_for(&self, token: &str) -> Option<Grants> {
        if Self::token_matches(&self.admin_token, token) {
            return Some(Grants::Admin);
        }
        match self.editor_token {
            Some(ref editor) if Self::token_matches(editor, token) => Some(Grants::Editor),
            _ => None,
        }
    }
}

impl<S, B> Service<ServiceRequest> for AdminAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        if self.admin_token.is_empty() {
            return Box::pin(async move { Ok(Self::handle_missing_token(req)) });
        }

        let grants = Self::extract_bearer_token(&req).and_then(|t| self.grants_for(&t));

        Box::pin(async move {
            match grants {
                Some(grants) => {
                    trace!("Admin authentication successful: {:?}", grants);
                    req.extensions_mut().insert(grants);
                    let response = srv.call(req).await?.map_into_left_body();
                    Ok(response)
                }
                None => Ok(Self::handle_unauthorized(req)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_cannot_manage_options() {
        assert!(Grants::Editor.allows(Capability::Read));
        assert!(Grants::Editor.allows(Capability::PublishPosts));
        assert!(!Grants::Editor.allows(Capability::ManageOptions));
        assert!(Grants::Admin.allows(Capability::ManageOptions));
    }
}
