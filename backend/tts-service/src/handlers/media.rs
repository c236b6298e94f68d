/// Media handlers - mp3 upload and download
use crate::error::{AppError, Result};
use crate::models::{UploadResponse, AUDIO_MPEG};
use crate::AppState;
use actix_middleware::AuthenticatedUser;
use actix_multipart::{Field, Multipart};
use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use futures::StreamExt;
use std::io;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

/// Multipart field carrying the audio
const FILE_FIELD: &str = "file";

/// Size the part declares for itself. Browsers rarely send one; the ceiling
/// is still enforced while streaming.
fn declared_part_size(field: &Field) -> Option<u64> {
    field
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// POST /api/media
pub async fn upload_media(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::Validation(format!("malformed multipart body: {}", e)))?;

        let disposition = field
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| ContentDisposition::from_raw(v).ok());
        let name = disposition
            .as_ref()
            .and_then(|cd| cd.get_name())
            .map(str::to_string);
        let filename = disposition
            .as_ref()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        if name.as_deref() != Some(FILE_FIELD) {
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| AppError::Validation(e.to_string()))?;
            }
            continue;
        }

        let declared = declared_part_size(&field);
        let media = state
            .media
            .ingest(user.user_id, filename.as_deref(), declared, field)
            .await?;
        return Ok(HttpResponse::Created().json(UploadResponse::from(&media)));
    }

    Err(AppError::FileRequired)
}

/// GET /api/media/{id}
pub async fn download_media(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let (media, blob_path) = state.media.fetch(user.user_id, path.into_inner()).await?;

    let file = match tokio::fs::File::open(&blob_path).await {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::error!(media_id = %media.id, "catalog row has no blob on disk");
            return Err(AppError::NotFound);
        }
        Err(e) => return Err(e.into()),
    };
    let len = file.metadata().await?.len();

    Ok(HttpResponse::Ok()
        .content_type(AUDIO_MPEG)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(media.filename.clone())],
        })
        .no_chunking(len)
        .streaming(ReaderStream::new(file)))
}
