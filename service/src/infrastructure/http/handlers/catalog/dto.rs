use serde::Serialize;
use tutotime_common::{MediaType, TutorialRecord, TutorialStep};

use crate::domain::catalog::Cursor;

/// Card-sized projection for the catalog grid.
#[derive(Debug, Clone, Serialize)]
pub struct TutorialSummaryResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub difficulty_label: String,
    pub thumbnail_url: String,
    pub tags: Vec<String>,
    pub step_count: usize,
    pub created_at: String,
}

impl From<&TutorialRecord> for TutorialSummaryResponse {
    fn from(record: &TutorialRecord) -> Self {
        Self {
            id: record.id.to_string(),
            title: record.title.clone(),
            description: record.description.clone(),
            difficulty: record.difficulty.as_str().to_string(),
            difficulty_label: record.difficulty.label().to_string(),
            thumbnail_url: record.thumbnail_url.clone(),
            tags: record.tags.clone(),
            step_count: record.steps.len(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogResponse {
    pub tutorials: Vec<TutorialSummaryResponse>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl CatalogResponse {
    pub fn new(records: &[TutorialRecord], next_cursor: Option<Cursor>, has_more: bool) -> Self {
        Self {
            tutorials: records.iter().map(TutorialSummaryResponse::from).collect(),
            next_cursor: next_cursor.map(|cursor| cursor.encode()),
            has_more,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepResponse {
    pub title: String,
    pub description: String,
    pub media_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    pub order: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl From<&TutorialStep> for StepResponse {
    fn from(step: &TutorialStep) -> Self {
        Self {
            title: step.title.clone(),
            description: step.description.clone(),
            media_url: step.media_url.clone(),
            media_type: step.media_type,
            order: step.order,
            duration: step.duration,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TutorialDetailResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub difficulty_label: String,
    pub thumbnail_url: String,
    pub tags: Vec<String>,
    pub steps: Vec<StepResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&TutorialRecord> for TutorialDetailResponse {
    fn from(record: &TutorialRecord) -> Self {
        Self {
            id: record.id.to_string(),
            title: record.title.clone(),
            description: record.description.clone(),
            difficulty: record.difficulty.as_str().to_string(),
            difficulty_label: record.difficulty.label().to_string(),
            thumbnail_url: record.thumbnail_url.clone(),
            tags: record.tags.clone(),
            steps: record.steps.iter().map(StepResponse::from).collect(),
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}
