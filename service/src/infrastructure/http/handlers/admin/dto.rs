use serde::{Deserialize, Serialize};
use tutotime_common::TutorialId;

#[derive(Debug, Deserialize)]
pub struct CreateStepRequest {
    pub title: String,
    pub description: String,
    pub media_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTutorialRequest {
    pub title: String,
    pub description: String,
    pub difficulty: Option<String>,
    /// Raw comma-separated tag input, trimmed and de-blanked server-side.
    pub tags: Option<String>,
    pub thumbnail_url: Option<String>,
    pub steps: Vec<CreateStepRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    pub id: String,
    pub message: String,
}

impl CreatedResponse {
    pub fn new(id: TutorialId) -> Self {
        Self {
            id: id.to_string(),
            message: "tutorial created".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishedResponse {
    pub id: String,
    pub published: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub public_id: String,
}
