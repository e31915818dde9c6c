//! Catalog query engine: filtered, ordered, cursor-paginated pages of
//! published tutorials, accumulated into a growing list, plus the secondary
//! in-memory search filter applied on top of what is already loaded.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tutotime_common::{Difficulty, TutorialId, TutorialRecord};

use crate::domain::RecordStore;
use crate::domain::error::PlatformError;

pub const TUTORIALS_PER_PAGE: usize = 9;

/// Opaque pagination marker: the sort key of the last record of the
/// previous page. Records strictly after it (in descending order) form the
/// next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub created_at: DateTime<Utc>,
    pub id: TutorialId,
}

impl Cursor {
    pub fn from_record(record: &TutorialRecord) -> Self {
        Self {
            created_at: record.created_at,
            id: record.id,
        }
    }

    /// Wire form handed to clients; `{unix_micros}.{uuid}`.
    pub fn encode(&self) -> String {
        format!("{}.{}", self.created_at.timestamp_micros(), self.id)
    }

    pub fn decode(token: &str) -> Option<Self> {
        let (micros, id) = token.split_once('.')?;
        let micros: i64 = micros.parse().ok()?;
        Some(Self {
            created_at: DateTime::from_timestamp_micros(micros)?,
            id: TutorialId::try_from(id).ok()?,
        })
    }
}

/// One page request against the record store. Ordering is always
/// `createdAt` descending with the identifier descending as tie-break, so
/// cursors stay well-defined when timestamps collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub difficulty: Option<Difficulty>,
    pub cursor: Option<Cursor>,
    pub page_size: usize,
}

impl CatalogQuery {
    pub fn first_page(difficulty: Option<Difficulty>) -> Self {
        Self {
            difficulty,
            cursor: None,
            page_size: TUTORIALS_PER_PAGE,
        }
    }

    pub fn after(difficulty: Option<Difficulty>, cursor: Option<Cursor>) -> Self {
        Self {
            difficulty,
            cursor,
            page_size: TUTORIALS_PER_PAGE,
        }
    }
}

/// One fetched page plus the pagination verdict. `has_more` is the
/// full-page heuristic: a page of exactly `page_size` records implies more
/// may exist; anything shorter implies exhaustion.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub records: Vec<TutorialRecord>,
    pub next_cursor: Option<Cursor>,
    pub has_more: bool,
}

impl CatalogPage {
    pub fn from_records(records: Vec<TutorialRecord>, page_size: usize) -> Self {
        let has_more = records.len() == page_size;
        let next_cursor = records.last().map(Cursor::from_record);
        Self {
            records,
            next_cursor,
            has_more,
        }
    }
}

/// Case-insensitive substring filter over title OR description. Applied
/// only to records already in memory; never triggers a fetch and never
/// touches the pagination cursor. An empty term matches everything.
pub fn filter_by_term(records: &[TutorialRecord], term: &str) -> Vec<TutorialRecord> {
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|record| {
            record.title.to_lowercase().contains(&needle)
                || record.description.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

struct CatalogState {
    difficulty: Option<Difficulty>,
    records: Vec<TutorialRecord>,
    cursor: Option<Cursor>,
    has_more: bool,
    /// Bumped on every filter change; a fetch result is applied only when
    /// its generation still matches, so a slow superseded fetch can never
    /// leak into the new filter's list.
    generation: u64,
}

/// The catalog view state machine: accumulates successive pages for the
/// current filter, resets on filter change, and ignores stale in-flight
/// results.
#[derive(Clone)]
pub struct Catalog<R: RecordStore> {
    store: R,
    state: Arc<Mutex<CatalogState>>,
}

impl<R: RecordStore> Catalog<R> {
    pub fn new(store: R) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(CatalogState {
                difficulty: None,
                records: Vec::new(),
                cursor: None,
                has_more: true,
                generation: 0,
            })),
        }
    }

    /// Change the difficulty filter: clears the accumulated list and cursor
    /// and invalidates any in-flight fetch. Pagination restarts with the
    /// next [`Catalog::load_first`].
    pub fn set_difficulty(&self, difficulty: Option<Difficulty>) {
        let mut state = self.lock();
        state.difficulty = difficulty;
        state.records.clear();
        state.cursor = None;
        state.has_more = true;
        state.generation += 1;
    }

    /// Reset mode: replaces the accumulated list with the first page.
    pub async fn load_first(&self) -> Result<(), PlatformError> {
        self.fetch(true).await
    }

    /// Load-more mode: appends the next page, preserving order.
    pub async fn load_more(&self) -> Result<(), PlatformError> {
        self.fetch(false).await
    }

    async fn fetch(&self, reset: bool) -> Result<(), PlatformError> {
        let (generation, query) = {
            let state = self.lock();
            let query = if reset {
                CatalogQuery::first_page(state.difficulty)
            } else {
                CatalogQuery::after(state.difficulty, state.cursor)
            };
            (state.generation, query)
        };

        let result = self.store.find_page(&query).await;

        let mut state = self.lock();
        if state.generation != generation {
            // Superseded by a filter change while in flight.
            tracing::debug!("dropping stale catalog page for generation {generation}");
            return Ok(());
        }

        // A failed load leaves the accumulated state untouched so the same
        // call can simply be re-issued.
        let records = result?;

        let page = CatalogPage::from_records(records, query.page_size);
        state.cursor = page.next_cursor;
        state.has_more = page.has_more;
        if reset {
            state.records = page.records;
        } else {
            state.records.extend(page.records);
        }
        Ok(())
    }

    /// The loaded records narrowed by the client-side search term.
    pub fn search(&self, term: &str) -> Vec<TutorialRecord> {
        filter_by_term(&self.lock().records, term)
    }

    pub fn records(&self) -> Vec<TutorialRecord> {
        self.lock().records.clone()
    }

    pub fn has_more(&self) -> bool {
        self.lock().has_more
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.lock().cursor
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CatalogState> {
        self.state.lock().expect("catalog state poisoned")
    }
}
