//! Total conversion from raw stored documents into [`TutorialRecord`]s.
//!
//! The record store hands back loosely-shaped documents; every optional or
//! malformed field is replaced with its documented default here, so nothing
//! downstream ever sees a missing field. Catalog and detail reads share this
//! exact code path.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::domain::record::{Difficulty, MediaType, TutorialId, TutorialRecord, TutorialStep};
use crate::{
    AUTHOR_FIELD_NAME, CREATED_FIELD_NAME, DESCRIPTION_FIELD_NAME, DIFFICULTY_FIELD_NAME,
    DURATION_FIELD_NAME, MEDIA_TYPE_FIELD_NAME, MEDIA_URL_FIELD_NAME, ORDER_FIELD_NAME,
    PUBLISHED_FIELD_NAME, STEP_PLACEHOLDER, STEPS_FIELD_NAME, TAGS_FIELD_NAME, TITLE_FIELD_NAME,
    THUMBNAIL_FIELD_NAME, TUTORIAL_PLACEHOLDER, UPDATED_FIELD_NAME,
};

/// Normalize one stored document into a fully-populated record.
pub fn normalize_record(id: TutorialId, doc: &Map<String, Value>) -> TutorialRecord {
    let steps = doc
        .get(STEPS_FIELD_NAME)
        .and_then(Value::as_array)
        .map(|raw_steps| {
            raw_steps
                .iter()
                .enumerate()
                .map(|(position, raw)| normalize_step(raw, position))
                .collect()
        })
        .unwrap_or_default();

    TutorialRecord {
        id,
        title: text_or_empty(doc, TITLE_FIELD_NAME),
        description: text_or_empty(doc, DESCRIPTION_FIELD_NAME),
        difficulty: doc
            .get(DIFFICULTY_FIELD_NAME)
            .and_then(Value::as_str)
            .and_then(Difficulty::parse)
            .unwrap_or_default(),
        thumbnail_url: doc
            .get(THUMBNAIL_FIELD_NAME)
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .unwrap_or(TUTORIAL_PLACEHOLDER)
            .to_string(),
        tags: doc
            .get(TAGS_FIELD_NAME)
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        steps,
        created_at: timestamp_or_now(doc, CREATED_FIELD_NAME),
        updated_at: timestamp_or_now(doc, UPDATED_FIELD_NAME),
        author_id: text_or_empty(doc, AUTHOR_FIELD_NAME),
        published: doc
            .get(PUBLISHED_FIELD_NAME)
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

/// Normalize one raw step. `position` supplies the `order` default when the
/// stored step carries none.
pub fn normalize_step(raw: &Value, position: usize) -> TutorialStep {
    let doc = raw.as_object();
    let get = |field: &str| doc.and_then(|d| d.get(field));

    TutorialStep {
        title: get(TITLE_FIELD_NAME)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        description: get(DESCRIPTION_FIELD_NAME)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        media_url: get(MEDIA_URL_FIELD_NAME)
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .unwrap_or(STEP_PLACEHOLDER)
            .to_string(),
        media_type: get(MEDIA_TYPE_FIELD_NAME)
            .and_then(Value::as_str)
            .and_then(|kind| match kind {
                "image" => Some(MediaType::Image),
                "video" => Some(MediaType::Video),
                _ => None,
            }),
        order: get(ORDER_FIELD_NAME)
            .and_then(Value::as_u64)
            .unwrap_or(position as u64) as u32,
        duration: get(DURATION_FIELD_NAME)
            .and_then(Value::as_u64)
            .map(|d| d as u32),
    }
}

/// Parse a comma-separated tag input into trimmed tags. Blank segments are
/// dropped, so an empty input yields an empty sequence rather than `[""]`.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn text_or_empty(doc: &Map<String, Value>, field: &str) -> String {
    doc.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn timestamp_or_now(doc: &Map<String, Value>, field: &str) -> DateTime<Utc> {
    doc.get(field)
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}
