use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

use crate::{
    adapters::inbound::http::{
        dto::{ErrorResponseDto, HealthDto, SuccessResponseDto},
        router::AppState,
    },
    domain::{
        errors::UploadError,
        models::{UploadFile, UploadResult},
        value_objects::AttachmentCategory,
    },
};

type ApiError = (StatusCode, Json<ErrorResponseDto>);

/// Multipart field carrying the file
pub const FILE_FIELD: &str = "file";

fn upload_failure(error: UploadError) -> ApiError {
    (
        StatusCode::from(&error),
        Json(ErrorResponseDto::from_upload_error(&error)),
    )
}

fn parse_category(category: &str) -> Result<AttachmentCategory, ApiError> {
    category.parse().map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponseDto::bad_request(&format!("{}", e))),
        )
    })
}

/// Handle a multipart attachment upload
pub async fn upload_attachment(
    State(app_state): State<AppState>,
    Path(category): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResult>), ApiError> {
    let category = parse_category(&category)?;

    let mut file = UploadFile::default();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponseDto::bad_request(&format!(
                "Invalid multipart body: {}",
                e
            ))),
        )
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        file.original_name = field.file_name().map(str::to_string);
        file.declared_content_type = field.content_type().map(str::to_string);
        file.content = Some(field.bytes().await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponseDto::bad_request(&format!(
                    "Failed to read file field: {}",
                    e
                ))),
            )
        })?);
        break;
    }

    let result = app_state
        .handlers
        .upload(category, file)
        .await
        .map_err(upload_failure)?;

    // The object is stored; a catalog hiccup only weakens future collision checks
    if let Err(e) = app_state.catalog.record(&result.key, result.category).await {
        tracing::warn!(key = %result.key, error = %e, "failed to record attachment in catalog");
    }

    Ok((StatusCode::CREATED, Json(result)))
}

/// Handle attachment deletion
pub async fn delete_attachment(
    State(app_state): State<AppState>,
    Path((category, key)): Path<(String, String)>,
) -> Result<Json<SuccessResponseDto>, ApiError> {
    let category = parse_category(&category)?;

    app_state
        .handlers
        .delete(category, &key)
        .await
        .map_err(upload_failure)?;

    if let Err(e) = app_state.catalog.remove(key.trim(), category).await {
        tracing::warn!(%key, error = %e, "failed to remove attachment from catalog");
    }

    Ok(Json(SuccessResponseDto::new("Attachment deleted")))
}

/// Report liveness and the configured backends
pub async fn health(State(app_state): State<AppState>) -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
        categories: app_state.handlers.categories(),
    })
}
