//! In-memory collaborator fakes shared by the domain tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use sqlx::types::uuid::Uuid;
use tokio::sync::Notify;
use tutotime_common::{Difficulty, TutorialId, TutorialRecord};

use crate::domain::catalog::CatalogQuery;
use crate::domain::error::PlatformError;
use crate::domain::submit::TutorialDraft;
use crate::domain::{MediaFile, MediaStore, RecordStore, UploadedMedia};

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

fn fresh_id() -> TutorialId {
    TutorialId(Uuid::from_u128(NEXT_ID.fetch_add(1, Ordering::Relaxed) as u128))
}

fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// A published-or-not record created `offset_seconds` after a fixed epoch,
/// with a unique identifier.
pub fn record_at(offset_seconds: u32, difficulty: Difficulty, published: bool) -> TutorialRecord {
    let id = fresh_id();
    let created_at = base_time() + Duration::seconds(offset_seconds as i64);
    TutorialRecord {
        id,
        title: format!("Tutorial {id}"),
        description: format!("Steps recorded at offset {offset_seconds}"),
        difficulty,
        thumbnail_url: tutotime_common::TUTORIAL_PLACEHOLDER.to_string(),
        tags: Vec::new(),
        steps: Vec::new(),
        created_at,
        updated_at: created_at,
        author_id: "seed".to_string(),
        published,
    }
}

#[derive(Default)]
struct StoreInner {
    records: Vec<TutorialRecord>,
    fail_with: Option<PlatformError>,
    gate: Option<Arc<Notify>>,
    inserts: u32,
}

/// Record store fake with the same ordering and cursor semantics the
/// Postgres adapter implements.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, record: TutorialRecord) {
        self.inner.lock().unwrap().records.push(record);
    }

    /// The next store call fails with `err`.
    pub fn fail_next(&self, err: PlatformError) {
        self.inner.lock().unwrap().fail_with = Some(err);
    }

    /// The next page fetch blocks until `gate` is notified.
    pub fn hold_next(&self, gate: Arc<Notify>) {
        self.inner.lock().unwrap().gate = Some(gate);
    }

    pub fn insert_count(&self) -> u32 {
        self.inner.lock().unwrap().inserts
    }

    fn take_failure(&self) -> Option<PlatformError> {
        self.inner.lock().unwrap().fail_with.take()
    }
}

impl RecordStore for InMemoryStore {
    async fn find_page(&self, query: &CatalogQuery) -> Result<Vec<TutorialRecord>, PlatformError> {
        let gate = self.inner.lock().unwrap().gate.take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(err) = self.take_failure() {
            return Err(err);
        }

        let inner = self.inner.lock().unwrap();
        let mut matching: Vec<_> = inner
            .records
            .iter()
            .filter(|record| {
                record.published
                    && query
                        .difficulty
                        .map(|wanted| record.difficulty == wanted)
                        .unwrap_or(true)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        if let Some(cursor) = query.cursor {
            matching.retain(|record| (record.created_at, record.id) < (cursor.created_at, cursor.id));
        }
        matching.truncate(query.page_size);
        Ok(matching)
    }

    async fn find_by_id(&self, id: TutorialId) -> Result<TutorialRecord, PlatformError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.inner
            .lock()
            .unwrap()
            .records
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or(PlatformError::NotFound)
    }

    async fn insert(&self, draft: &TutorialDraft) -> Result<TutorialId, PlatformError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let id = fresh_id();
        let record = TutorialRecord {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            difficulty: draft.difficulty,
            thumbnail_url: draft.thumbnail_url.clone(),
            tags: draft.tags.clone(),
            steps: draft.persisted_steps(),
            created_at: draft.created_at,
            updated_at: draft.updated_at,
            author_id: draft.author_id.clone(),
            published: draft.published,
        };
        let mut inner = self.inner.lock().unwrap();
        inner.records.push(record);
        inner.inserts += 1;
        Ok(id)
    }

    async fn set_published(&self, id: TutorialId, published: bool) -> Result<(), PlatformError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(PlatformError::NotFound)?;
        record.published = published;
        record.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Default)]
struct MediaInner {
    uploads: u32,
    fail_with: Option<PlatformError>,
    gate: Option<Arc<Notify>>,
}

/// Media collaborator fake; returns a synthetic durable URL per upload.
#[derive(Clone, Default)]
pub struct FakeMedia {
    inner: Arc<Mutex<MediaInner>>,
}

impl FakeMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, err: PlatformError) {
        self.inner.lock().unwrap().fail_with = Some(err);
    }

    /// The next upload blocks until `gate` is notified.
    pub fn hold_next(&self, gate: Arc<Notify>) {
        self.inner.lock().unwrap().gate = Some(gate);
    }

    pub fn upload_count(&self) -> u32 {
        self.inner.lock().unwrap().uploads
    }
}

impl MediaStore for FakeMedia {
    async fn upload(&self, file: MediaFile, folder: &str) -> Result<UploadedMedia, PlatformError> {
        let gate = self.inner.lock().unwrap().gate.take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut inner = self.inner.lock().unwrap();
        if let Some(err) = inner.fail_with.take() {
            return Err(err);
        }
        inner.uploads += 1;
        let public_id = format!("{folder}/{}-{}", inner.uploads, file.name);
        Ok(UploadedMedia {
            secure_url: format!("https://media.test/{public_id}"),
            public_id,
        })
    }
}
