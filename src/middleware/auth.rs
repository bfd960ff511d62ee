use std::rc::Rc;

use actix_service::{forward_ready, Service};
use actix_web::body::EitherBody;
use actix_web::dev::{ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{Error, HttpMessage, HttpRequest, ResponseError};
use futures::future::{ok, LocalBoxFuture, Ready};

use crate::credentials::TokenSigner;
use crate::error::ApiError;

/// Name of the cookie carrying the signed token.
pub const AUTH_COOKIE: &str = "auth_token";

/// Rejects requests without a valid token and makes the decoded
/// [`Claims`](crate::credentials::Claims) available to handlers through
/// request extensions.
///
/// The token is read from the `auth_token` cookie, falling back to an
/// `Authorization: Bearer` header.
pub struct AuthMiddleware {
    signer: TokenSigner,
}

impl AuthMiddleware {
    pub fn new(signer: TokenSigner) -> Self {
        AuthMiddleware { signer }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
            signer: self.signer.clone(),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    signer: TokenSigner,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let signer = self.signer.clone();
        let service = self.service.clone();

        Box::pin(async move {
            let claims = match request_token(req.request()) {
                Some(token) => signer.verify(&token).map_err(|e| {
                    log::debug!("rejected token: {}", e);
                    ApiError::unauthorized("invalid or expired token")
                }),
                None => Err(ApiError::unauthorized("authentication required")),
            };

            match claims {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(e) => Ok(req.into_response(e.error_response()).map_into_right_body()),
            }
        })
    }
}

/// Cookie first, then bearer header.
pub(crate) fn request_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(AUTH_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
