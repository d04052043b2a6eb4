// src/common/migrations.rs
//! Database migration and schema management

use sqlx::SqlitePool;
use tracing::{info, warn};

/// Run all database migrations
///
/// Tables are created if missing. With `reset` set every table is dropped
/// first, which loses all data.
pub async fn run_migrations(pool: &SqlitePool, reset: bool) -> Result<(), sqlx::Error> {
    if reset {
        warn!("RESET_DB=true - dropping all tables and recreating schema");
        drop_all_tables(pool).await?;
    }

    create_user_tables(pool).await?;
    create_brandbook_tables(pool).await?;
    create_indexes(pool).await?;

    info!("Database migration completed");
    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // children first so the foreign keys never dangle
    for table in ["uploaded_files", "brand_items", "brandbooks", "users"] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }
    Ok(())
}

async fn create_user_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // a user has a password hash, a provider identity, or both
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT,
            provider TEXT,
            provider_id TEXT,
            avatar_url TEXT,
            created_at TEXT NOT NULL,
            CONSTRAINT uq_provider_providerid UNIQUE (provider, provider_id),
            CHECK (password_hash IS NOT NULL OR provider_id IS NOT NULL)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_brandbook_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS brandbooks (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            description TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS brand_items (
            id TEXT PRIMARY KEY,
            brandbook_id TEXT NOT NULL REFERENCES brandbooks(id) ON DELETE CASCADE,
            item_type TEXT NOT NULL CHECK (item_type IN ('logo', 'font', 'colour', 'merch')),
            name TEXT,
            link TEXT NOT NULL,
            colour TEXT,
            position INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS uploaded_files (
            id TEXT PRIMARY KEY,
            brandbook_id TEXT NOT NULL REFERENCES brandbooks(id) ON DELETE CASCADE,
            file_url TEXT NOT NULL,
            file_type TEXT,
            label TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_brandbooks_user_id ON brandbooks(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_brand_items_brandbook_id ON brand_items(brandbook_id, position)",
        "CREATE INDEX IF NOT EXISTS idx_uploaded_files_brandbook_id ON uploaded_files(brandbook_id)",
    ];

    for statement in indexes {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}
