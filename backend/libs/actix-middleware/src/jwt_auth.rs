use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{
        header::{HeaderMap, AUTHORIZATION},
        StatusCode,
    },
    Error, HttpMessage, HttpResponse, ResponseError,
};
use crypto_core::{TokenCodec, TokenError};
use error_types::{error_codes, error_keys, error_types as categories, ErrorResponse};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::sync::Arc;
use uuid::Uuid;

/// Caller identity resolved from a verified session token.
///
/// Lives in the request extensions for the duration of one request only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Why a request was rejected. Every variant renders the same 401 body.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("Authorization header is not a Bearer credential")]
    WrongScheme,
    #[error("token rejected: {0}")]
    InvalidToken(#[from] TokenError),
    #[error("token subject is not a valid user id")]
    MalformedSubject,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Unauthorized().json(ErrorResponse::new(
            error_keys::UNAUTHORIZED,
            "Unauthorized",
            StatusCode::UNAUTHORIZED.as_u16(),
            categories::AUTHENTICATION_ERROR,
            error_codes::TOKEN_INVALID,
        ))
    }
}

/// Resolve the caller from the `Authorization: Bearer <token>` header
pub fn authenticate(
    headers: &HeaderMap,
    codec: &TokenCodec,
) -> Result<AuthenticatedUser, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingHeader)?;

    let (scheme, token) = auth_header
        .split_once(' ')
        .ok_or(AuthError::WrongScheme)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::WrongScheme);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::WrongScheme);
    }

    let claims = codec.verify(token)?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::MalformedSubject)?;

    Ok(AuthenticatedUser {
        user_id,
        email: claims.email,
    })
}

/// JWT Authentication Middleware
pub struct JwtAuthMiddleware {
    codec: Arc<TokenCodec>,
}

impl JwtAuthMiddleware {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service,
            codec: self.codec.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: S,
    codec: Arc<TokenCodec>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(req.headers(), &self.codec) {
            Ok(user) => {
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(err) => {
                tracing::debug!(path = %req.path(), reason = %err, "request rejected by auth gate");
                let response = req
                    .into_response(err.error_response())
                    .map_into_right_body();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}

/// FromRequest implementation for AuthenticatedUser
impl actix_web::FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(AuthError::MissingHeader.into())),
        }
    }
}
