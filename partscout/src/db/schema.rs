use chrono::{DateTime, SecondsFormat, Utc};
use libsql::Connection;

use crate::error::Result;

pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Identification results for uploaded hardware images
        CREATE TABLE IF NOT EXISTS hardware_identifications (
            id TEXT PRIMARY KEY,
            image TEXT NOT NULL,
            result TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_hardware_identifications_created_at
            ON hardware_identifications(created_at);

        -- Chat sessions; history is a JSON array of {role, content}
        CREATE TABLE IF NOT EXISTS hardware_chats (
            id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL UNIQUE,
            history TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_hardware_chats_updated_at ON hardware_chats(updated_at);

        -- One row per chat turn
        CREATE TABLE IF NOT EXISTS hardware_queries (
            id TEXT PRIMARY KEY,
            chat_id TEXT NOT NULL,
            question TEXT NOT NULL,
            answer TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (chat_id) REFERENCES hardware_chats(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_hardware_queries_chat_id ON hardware_queries(chat_id);

        -- Image-driven product matching; similar_product_ids is an ordered JSON array
        CREATE TABLE IF NOT EXISTS product_similarity_searches (
            id TEXT PRIMARY KEY,
            image TEXT NOT NULL,
            identified_component TEXT,
            similar_product_ids TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_product_similarity_searches_created_at
            ON product_similarity_searches(created_at);

        -- Storefront catalog (read-only for the API)
        CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category_id TEXT,
            description TEXT NOT NULL DEFAULT '',
            FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_products_category_id ON products(category_id);
        "#,
    )
    .await?;

    Ok(())
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
pub(crate) fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
