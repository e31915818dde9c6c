use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tutotime_common::{Difficulty, TutorialId};

use crate::domain::catalog::{CatalogPage, CatalogQuery, Cursor, filter_by_term};
use crate::domain::{AppState, RecordStore};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::catalog::dto::{CatalogResponse, TutorialDetailResponse};

mod dto;

#[derive(Deserialize, Debug)]
pub struct CatalogParams {
    pub difficulty: Option<String>,
    pub cursor: Option<String>,
    /// Free-text search term, applied to the fetched page only.
    pub q: Option<String>,
}

pub async fn list_tutorials<S: AppState>(
    Query(params): Query<CatalogParams>,
    State(state): State<S>,
) -> Result<ApiSuccess<CatalogResponse>, ApiError> {
    let difficulty = params
        .difficulty
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            Difficulty::parse(raw)
                .ok_or_else(|| ApiError::UnprocessableEntity(format!("unknown difficulty \"{raw}\"")))
        })
        .transpose()?;

    let cursor = params
        .cursor
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            Cursor::decode(raw)
                .ok_or_else(|| ApiError::UnprocessableEntity("malformed cursor".to_string()))
        })
        .transpose()?;

    let query = CatalogQuery::after(difficulty, cursor);
    let records = state.records().find_page(&query).await?;
    let page = CatalogPage::from_records(records, query.page_size);

    // The search term narrows what is shown, never what was fetched: the
    // cursor and has-more verdict stay those of the unfiltered page.
    let shown = match params.q.as_deref().filter(|term| !term.is_empty()) {
        Some(term) => filter_by_term(&page.records, term),
        None => page.records,
    };

    Ok(ApiSuccess::new(
        StatusCode::OK,
        CatalogResponse::new(&shown, page.next_cursor, page.has_more),
    ))
}

pub async fn get_tutorial<S: AppState>(
    Path(id): Path<String>,
    State(state): State<S>,
) -> Result<ApiSuccess<TutorialDetailResponse>, ApiError> {
    let id = TutorialId::try_from(id.as_str()).map_err(|_| ApiError::NotFound)?;
    let record = state.records().find_by_id(id).await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        TutorialDetailResponse::from(&record),
    ))
}
