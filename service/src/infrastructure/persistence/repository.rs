use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::Row;
use sqlx::postgres::PgRow;
use sqlx::types::uuid::Uuid;
use tutotime_common::{
    AUTHOR_FIELD_NAME, CREATED_FIELD_NAME, DESCRIPTION_FIELD_NAME, DIFFICULTY_FIELD_NAME,
    Database, PUBLISHED_FIELD_NAME, STEPS_FIELD_NAME, TAGS_FIELD_NAME, THUMBNAIL_FIELD_NAME,
    TITLE_FIELD_NAME, TutorialId, TutorialRecord, UPDATED_FIELD_NAME, normalize_record,
};

use crate::domain::RecordStore;
use crate::domain::catalog::CatalogQuery;
use crate::domain::error::PlatformError;
use crate::domain::submit::TutorialDraft;
use crate::infrastructure::persistence::query::{Condition, Order, SelectBuilder, SqlParameter};

const TUTORIALS_TABLE: &str = "tutorials";

const ALL_COLUMNS: [&str; 11] = [
    "id",
    "title",
    "description",
    "difficulty",
    "thumbnail_url",
    "tags",
    "steps",
    "published",
    "author_id",
    "created_at",
    "updated_at",
];

/// Record store adapter over the Postgres-hosted tutorials collection.
/// Every row read here goes through the shared normalization, so catalog
/// and detail reads can never diverge in defaulting behavior.
#[derive(Clone)]
pub struct PostgresRecordStore {
    database: Database,
}

impl PostgresRecordStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn row_to_record(row: &PgRow) -> Result<TutorialRecord, PlatformError> {
        let id: Uuid = get(row, "id")?;

        // Reassemble the raw document shape the normalization layer expects;
        // store-native timestamps become calendar timestamps there.
        let mut doc = Map::new();
        doc.insert(
            TITLE_FIELD_NAME.into(),
            Value::String(get::<String>(row, "title")?),
        );
        doc.insert(
            DESCRIPTION_FIELD_NAME.into(),
            Value::String(get::<String>(row, "description")?),
        );
        doc.insert(
            DIFFICULTY_FIELD_NAME.into(),
            Value::String(get::<String>(row, "difficulty")?),
        );
        doc.insert(
            THUMBNAIL_FIELD_NAME.into(),
            Value::String(get::<String>(row, "thumbnail_url")?),
        );
        doc.insert(TAGS_FIELD_NAME.into(), get::<Value>(row, "tags")?);
        doc.insert(STEPS_FIELD_NAME.into(), get::<Value>(row, "steps")?);
        doc.insert(
            PUBLISHED_FIELD_NAME.into(),
            Value::Bool(get::<bool>(row, "published")?),
        );
        doc.insert(
            AUTHOR_FIELD_NAME.into(),
            Value::String(get::<String>(row, "author_id")?),
        );
        doc.insert(
            CREATED_FIELD_NAME.into(),
            Value::String(get::<DateTime<Utc>>(row, "created_at")?.to_rfc3339()),
        );
        doc.insert(
            UPDATED_FIELD_NAME.into(),
            Value::String(get::<DateTime<Utc>>(row, "updated_at")?.to_rfc3339()),
        );

        Ok(normalize_record(TutorialId(id), &doc))
    }
}

fn get<'r, T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>>(
    row: &'r PgRow,
    column: &str,
) -> Result<T, PlatformError> {
    row.try_get(column)
        .map_err(|e| PlatformError::Unexpected(format!("malformed {column} column: {e}")))
}

impl RecordStore for PostgresRecordStore {
    async fn find_page(&self, query: &CatalogQuery) -> Result<Vec<TutorialRecord>, PlatformError> {
        let mut builder = SelectBuilder::from_table(TUTORIALS_TABLE)
            .select(ALL_COLUMNS.to_vec())
            .where_condition(Condition::Equals {
                column: "published",
                value: SqlParameter::Boolean(true),
            });

        if let Some(difficulty) = query.difficulty {
            builder = builder.where_condition(Condition::Equals {
                column: "difficulty",
                value: SqlParameter::Text(difficulty.as_str().to_string()),
            });
        }

        if let Some(cursor) = query.cursor {
            builder = builder.where_condition(Condition::KeysetBefore {
                columns: ("created_at", "id"),
                values: (
                    SqlParameter::Timestamp(cursor.created_at),
                    SqlParameter::Uuid(cursor.id.0),
                ),
            });
        }

        let (sql, params) = builder
            .order_by("created_at", Order::Descending)
            .order_by("id", Order::Descending)
            .limit(query.page_size as i64)
            .build();
        tracing::debug!(%sql, "catalog page query");

        let mut query_object = sqlx::query(&sql);
        for param in params {
            query_object = param.bind_to_query(query_object);
        }

        let rows = query_object
            .fetch_all(self.database.database_pool())
            .await
            .map_err(|e| PlatformError::from_store_diagnostic(e.to_string()))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn find_by_id(&self, id: TutorialId) -> Result<TutorialRecord, PlatformError> {
        let (sql, params) = SelectBuilder::from_table(TUTORIALS_TABLE)
            .select(ALL_COLUMNS.to_vec())
            .where_condition(Condition::Equals {
                column: "id",
                value: SqlParameter::Uuid(id.0),
            })
            .build();

        let mut query_object = sqlx::query(&sql);
        for param in params {
            query_object = param.bind_to_query(query_object);
        }

        let row = query_object
            .fetch_optional(self.database.database_pool())
            .await
            .map_err(|e| PlatformError::from_store_diagnostic(e.to_string()))?;

        match row {
            Some(row) => Self::row_to_record(&row),
            None => Err(PlatformError::NotFound),
        }
    }

    async fn insert(&self, draft: &TutorialDraft) -> Result<TutorialId, PlatformError> {
        let tags = serde_json::to_value(&draft.tags)
            .map_err(|e| PlatformError::Unexpected(e.to_string()))?;
        let steps = serde_json::to_value(draft.persisted_steps())
            .map_err(|e| PlatformError::Unexpected(e.to_string()))?;

        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO tutorials \
             (title, description, difficulty, thumbnail_url, tags, steps, published, author_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING id",
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.difficulty.as_str())
        .bind(&draft.thumbnail_url)
        .bind(tags)
        .bind(steps)
        .bind(draft.published)
        .bind(&draft.author_id)
        .bind(draft.created_at)
        .bind(draft.updated_at)
        .fetch_one(self.database.database_pool())
        .await
        .map_err(|e| PlatformError::from_store_diagnostic(e.to_string()))?;

        Ok(TutorialId(id))
    }

    async fn set_published(&self, id: TutorialId, published: bool) -> Result<(), PlatformError> {
        let result = sqlx::query(
            "UPDATE tutorials SET published = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id.0)
        .bind(published)
        .execute(self.database.database_pool())
        .await
        .map_err(|e| PlatformError::from_store_diagnostic(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PlatformError::NotFound);
        }
        Ok(())
    }
}
