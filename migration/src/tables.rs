//! DDL for the tutorial record store.
//!
//! The catalog reads keyset pages ordered by `(created_at DESC, id DESC)`
//! over the published set, optionally narrowed by difficulty, so both
//! composite indexes lead with `published`.

pub fn migration_steps() -> Vec<String> {
    vec![
        r#"CREATE TABLE IF NOT EXISTS "tutorials" (
            "id" UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            "title" TEXT NOT NULL,
            "description" TEXT NOT NULL,
            "difficulty" TEXT NOT NULL DEFAULT 'beginner',
            "thumbnail_url" TEXT NOT NULL,
            "author_id" TEXT NOT NULL,
            "tags" JSONB NOT NULL DEFAULT '[]'::jsonb,
            "steps" JSONB NOT NULL DEFAULT '[]'::jsonb,
            "published" BOOLEAN NOT NULL DEFAULT FALSE,
            "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
            "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#
        .to_string(),
        r#"CREATE INDEX IF NOT EXISTS "idx_tutorials_catalog"
            ON "tutorials" ("published", "created_at" DESC, "id" DESC)"#
            .to_string(),
        r#"CREATE INDEX IF NOT EXISTS "idx_tutorials_catalog_difficulty"
            ON "tutorials" ("published", "difficulty", "created_at" DESC, "id" DESC)"#
            .to_string(),
    ]
}
