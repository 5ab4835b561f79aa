use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;

/// DDL for the portal tables, applied idempotently at startup.
///
/// Requires Postgres 13+ for the built-in gen_random_uuid(); rows inserted
/// through the services always carry explicit UUIDs anyway.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS accounts (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'client',
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS profiles (
        account_id UUID PRIMARY KEY REFERENCES accounts(id) ON DELETE CASCADE,
        full_name TEXT NOT NULL DEFAULT '',
        company TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS requests (
        id UUID PRIMARY KEY,
        client_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        kind TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        details JSONB NOT NULL DEFAULT '{}'::jsonb,
        status TEXT NOT NULL DEFAULT 'new',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS requests_client_idx ON requests (client_id, created_at DESC)",
    "CREATE INDEX IF NOT EXISTS requests_status_idx ON requests (status)",
    "CREATE TABLE IF NOT EXISTS assets (
        id UUID PRIMARY KEY,
        client_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        label TEXT NOT NULL,
        description TEXT,
        category TEXT,
        object_key TEXT NOT NULL,
        content_type TEXT NOT NULL,
        size_bytes BIGINT NOT NULL,
        checksum TEXT NOT NULL,
        uploaded_by UUID NOT NULL REFERENCES accounts(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS assets_client_idx ON assets (client_id, created_at DESC)",
    "CREATE TABLE IF NOT EXISTS client_notes (
        id UUID PRIMARY KEY,
        client_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        author_id UUID NOT NULL REFERENCES accounts(id),
        body TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS client_notes_client_idx ON client_notes (client_id, created_at DESC)",
];

/// Apply the portal schema. Safe to run on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Portal schema is up to date");
    Ok(())
}
