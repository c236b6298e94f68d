/// Conversion handlers - HTTP endpoints for conversion records
use crate::error::Result;
use crate::models::{ConversionListResponse, CreateConversionRequest};
use crate::AppState;
use actix_middleware::AuthenticatedUser;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// POST /api/conversions
pub async fn create_conversion(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<CreateConversionRequest>,
) -> Result<HttpResponse> {
    let conversion = state
        .conversions
        .create(user.user_id, req.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(conversion))
}

/// GET /api/conversions
pub async fn list_conversions(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let items = state.conversions.list(user.user_id).await?;
    Ok(HttpResponse::Ok().json(ConversionListResponse {
        items,
        next_cursor: None,
    }))
}

/// DELETE /api/conversions/{id}
pub async fn delete_conversion(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .conversions
        .delete(user.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
