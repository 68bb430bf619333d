//! Upload and playback link handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use vod_models::{generate_upload_key, JobId};
use vod_registry::{LinkRecord, RegistryError};
use vod_storage::{DOWNLOAD_HANDLE_TTL, UPLOAD_HANDLE_TTL};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Presigned upload URL response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUploadResponse {
    pub presigned_url: String,
    pub key: String,
    pub video_id: String,
}

/// Issue a presigned upload handle for a new source video.
pub async fn get_presigned_url(
    State(state): State<AppState>,
) -> ApiResult<Json<PresignedUploadResponse>> {
    let key = generate_upload_key();
    let video_id = JobId::from_object_key(&key)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let presigned_url = state
        .storage
        .presign_put(&key, &state.config.upload_bucket, "video/mp4", UPLOAD_HANDLE_TTL)
        .await?;

    Ok(Json(PresignedUploadResponse {
        presigned_url,
        key,
        video_id: video_id.to_string(),
    }))
}

/// Download URL request.
#[derive(Deserialize, Validate)]
pub struct DownloadUrlRequest {
    #[validate(length(min = 1, message = "key is required"))]
    pub key: String,
}

/// Download URL response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadUrlResponse {
    pub access_url: String,
}

/// Issue a presigned download handle for an uploaded source video.
pub async fn get_download_url(
    State(state): State<AppState>,
    Json(request): Json<DownloadUrlRequest>,
) -> ApiResult<Json<DownloadUrlResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let access_url = state
        .storage
        .presign_get(&request.key, &state.config.upload_bucket, DOWNLOAD_HANDLE_TTL)
        .await?;

    Ok(Json(DownloadUrlResponse { access_url }))
}

/// Link creation request.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, message = "videoId is required"))]
    pub video_id: String,
    #[validate(length(min = 1, message = "videoLink is required"))]
    pub video_link: String,
}

/// Link response envelope.
#[derive(Serialize)]
pub struct LinkResponse {
    pub link: LinkRecord,
}

/// Record the playback link for a completed job.
pub async fn create_video_link(
    State(state): State<AppState>,
    Json(request): Json<CreateLinkRequest>,
) -> ApiResult<(StatusCode, Json<LinkResponse>)> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let link = state
        .links
        .create(&request.video_id, &request.video_link)
        .await
        .map_err(|e| match e {
            RegistryError::Conflict(id) => {
                ApiError::conflict(format!("Link already exists for {id}"))
            }
            RegistryError::Validation(msg) => ApiError::bad_request(msg),
            other => ApiError::internal(other.to_string()),
        })?;

    Ok((StatusCode::CREATED, Json(LinkResponse { link })))
}

/// Look up the playback link for a job.
///
/// Returns 404 with `"Video not generated yet"` until the worker has
/// reported the link — polling clients treat that as "keep waiting".
pub async fn get_video_link(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<LinkResponse>> {
    if video_id.is_empty() {
        return Err(ApiError::bad_request("No videoId found"));
    }

    let link = state.links.get(&video_id).await.map_err(|e| match e {
        RegistryError::NotFound(_) => ApiError::not_found("Video not generated yet"),
        other => ApiError::internal(other.to_string()),
    })?;

    Ok(Json(LinkResponse { link }))
}
