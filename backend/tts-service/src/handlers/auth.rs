/// Auth handlers - registration and login
use crate::error::Result;
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, UserSummary};
use crate::AppState;
use actix_web::{web, HttpResponse};

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let user = state.credentials.register(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserSummary::from(&user)))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let (user, issued) = state.credentials.login(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        token: issued.token,
        user: UserSummary::from(&user),
        expires_at: issued.claims.expires_at().to_rfc3339(),
    }))
}
