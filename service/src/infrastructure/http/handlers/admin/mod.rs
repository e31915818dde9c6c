use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tutotime_common::{Difficulty, TutorialId};

use crate::domain::session::Principal;
use crate::domain::submit::{TutorialDraft, UploadTarget};
use crate::domain::{AppState, MediaFile, RecordStore};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::admin::dto::{
    CreateTutorialRequest, CreatedResponse, PublishedResponse, UploadResponse,
};

mod dto;

pub async fn create_tutorial<S: AppState>(
    State(state): State<S>,
    axum::Extension(principal): axum::Extension<Principal>,
    Json(request): Json<CreateTutorialRequest>,
) -> Result<ApiSuccess<CreatedResponse>, ApiError> {
    let mut draft = TutorialDraft::new();
    draft.set_title(request.title);
    draft.set_description(request.description);

    if let Some(raw) = request.difficulty.as_deref() {
        let difficulty = Difficulty::parse(raw)
            .ok_or_else(|| ApiError::UnprocessableEntity(format!("unknown difficulty \"{raw}\"")))?;
        draft.set_difficulty(difficulty);
    }
    if let Some(tags) = request.tags.as_deref() {
        draft.set_tags_input(tags);
    }
    if let Some(thumbnail) = request.thumbnail_url {
        draft.set_thumbnail(thumbnail);
    }

    for (index, step) in request.steps.into_iter().enumerate() {
        draft.add_step();
        draft.set_step_title(index, step.title);
        draft.set_step_description(index, step.description);
        if let Some(media_url) = step.media_url {
            draft.set_step_media(index, media_url);
        }
    }

    let id = state.submit_pipeline().submit(&mut draft, &principal).await?;
    Ok(ApiSuccess::new(StatusCode::CREATED, CreatedResponse::new(id)))
}

/// Administrative side-channel: flips a record into the public catalog.
pub async fn publish_tutorial<S: AppState>(
    Path(id): Path<String>,
    State(state): State<S>,
) -> Result<ApiSuccess<PublishedResponse>, ApiError> {
    let id = TutorialId::try_from(id.as_str()).map_err(|_| ApiError::NotFound)?;
    state.records().set_published(id, true).await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        PublishedResponse {
            id: id.to_string(),
            published: true,
        },
    ))
}

#[derive(Deserialize, Debug)]
pub struct UploadParams {
    /// Absent for the thumbnail; a zero-based index for a step upload.
    pub step: Option<usize>,
}

pub async fn upload_media<S: AppState>(
    Query(params): Query<UploadParams>,
    State(state): State<S>,
    mut multipart: Multipart,
) -> Result<ApiSuccess<UploadResponse>, ApiError> {
    let target = match params.step {
        Some(index) => UploadTarget::Step(index),
        None => UploadTarget::Thumbnail,
    };

    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::UnprocessableEntity(format!("malformed upload: {e}")))?
        .ok_or_else(|| ApiError::UnprocessableEntity("no file in upload".to_string()))?;

    let file = MediaFile {
        name: field.file_name().unwrap_or("upload").to_string(),
        content_type: field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string(),
        bytes: field
            .bytes()
            .await
            .map_err(|e| ApiError::UnprocessableEntity(format!("malformed upload: {e}")))?
            .to_vec(),
    };

    let media = state.submit_pipeline().upload_for(target, file).await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        UploadResponse {
            url: media.secure_url,
            public_id: media.public_id,
        },
    ))
}
