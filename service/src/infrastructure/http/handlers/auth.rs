use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::domain::session::Principal;
use crate::domain::{AppState, Identity};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login<S: AppState>(
    State(state): State<S>,
    Json(request): Json<LoginRequest>,
) -> Result<ApiSuccess<Principal>, ApiError> {
    let principal = state
        .identity()
        .sign_in(&request.email, &request.password)
        .await?;
    Ok(ApiSuccess::new(StatusCode::OK, principal))
}

pub async fn logout<S: AppState>(State(state): State<S>) -> Result<StatusCode, ApiError> {
    state.identity().sign_out().await?;
    Ok(StatusCode::NO_CONTENT)
}
