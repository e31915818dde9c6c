mod database;
mod domain;

// Stored tutorial document field names

pub const TITLE_FIELD_NAME: &'static str = "title";
pub const DESCRIPTION_FIELD_NAME: &'static str = "description";
pub const DIFFICULTY_FIELD_NAME: &'static str = "difficulty";
pub const THUMBNAIL_FIELD_NAME: &'static str = "thumbnailUrl";
pub const TAGS_FIELD_NAME: &'static str = "tags";
pub const STEPS_FIELD_NAME: &'static str = "steps";
pub const PUBLISHED_FIELD_NAME: &'static str = "published";
pub const AUTHOR_FIELD_NAME: &'static str = "authorId";

pub const CREATED_FIELD_NAME: &'static str = "createdAt";
pub const UPDATED_FIELD_NAME: &'static str = "updatedAt";

pub const MEDIA_URL_FIELD_NAME: &'static str = "mediaUrl";
pub const MEDIA_TYPE_FIELD_NAME: &'static str = "mediaType";
pub const ORDER_FIELD_NAME: &'static str = "order";
pub const DURATION_FIELD_NAME: &'static str = "duration";

// Fallback media shown when a record carries no uploaded asset

pub const TUTORIAL_PLACEHOLDER: &'static str = "/placeholder-tutorial.jpg";
pub const STEP_PLACEHOLDER: &'static str = "/placeholder-step.jpg";

// expose domain module

pub use domain::*;

// expose database module

pub use database::{Database, DatabaseConnection, DatabaseCredentials, DatabaseSettings, connect};
