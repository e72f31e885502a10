use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use crate::db::schema::{format_timestamp, parse_timestamp};
use crate::error::Result;
use crate::models::{timestamp_now, ChatTurn, HardwareChat, HardwareQuery};

pub struct ChatRepository;

impl ChatRepository {
    pub async fn create(conn: &Connection, chat: &HardwareChat) -> Result<()> {
        let history = serde_json::to_string(&chat.history)?;

        conn.execute(
            r#"
            INSERT INTO hardware_chats (id, session_id, history, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                chat.id.clone(),
                chat.session_id.clone(),
                history,
                format_timestamp(&chat.created_at),
                format_timestamp(&chat.updated_at),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_session_id(
        conn: &Connection,
        session_id: &str,
    ) -> Result<Option<HardwareChat>> {
        let mut rows = conn
            .query(
                r#"
                SELECT id, session_id, history, created_at, updated_at
                FROM hardware_chats
                WHERE session_id = ?1
                "#,
                params![session_id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_chat(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn list(conn: &Connection) -> Result<Vec<HardwareChat>> {
        let mut rows = conn
            .query(
                r#"
                SELECT id, session_id, history, created_at, updated_at
                FROM hardware_chats
                ORDER BY updated_at DESC, rowid DESC
                "#,
                (),
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_chat(&row)?);
        }

        Ok(results)
    }

    pub async fn update_history(
        conn: &Connection,
        chat_id: &str,
        history: &[ChatTurn],
    ) -> Result<Option<DateTime<Utc>>> {
        let updated_at = timestamp_now();
        let history = serde_json::to_string(history)?;

        let affected = conn
            .execute(
                "UPDATE hardware_chats SET history = ?1, updated_at = ?2 WHERE id = ?3",
                params![history, format_timestamp(&updated_at), chat_id],
            )
            .await?;

        Ok((affected > 0).then_some(updated_at))
    }

    pub async fn delete(conn: &Connection, chat_id: &str) -> Result<bool> {
        // Foreign keys are off by default in SQLite, so the cascade is done by hand.
        conn.execute(
            "DELETE FROM hardware_queries WHERE chat_id = ?1",
            params![chat_id],
        )
        .await?;

        let affected = conn
            .execute("DELETE FROM hardware_chats WHERE id = ?1", params![chat_id])
            .await?;

        Ok(affected > 0)
    }

    pub async fn create_query(conn: &Connection, query: &HardwareQuery) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO hardware_queries (id, chat_id, question, answer, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                query.id.clone(),
                query.chat_id.clone(),
                query.question.clone(),
                query.answer.clone(),
                format_timestamp(&query.created_at),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn list_queries(conn: &Connection, chat_id: &str) -> Result<Vec<HardwareQuery>> {
        let mut rows = conn
            .query(
                r#"
                SELECT id, chat_id, question, answer, created_at
                FROM hardware_queries
                WHERE chat_id = ?1
                ORDER BY created_at ASC, rowid ASC
                "#,
                params![chat_id],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(HardwareQuery {
                id: row.get(0)?,
                chat_id: row.get(1)?,
                question: row.get(2)?,
                answer: row.get(3)?,
                created_at: parse_timestamp(&row.get::<String>(4)?),
            });
        }

        Ok(results)
    }

    fn row_to_chat(row: &libsql::Row) -> Result<HardwareChat> {
        let history: String = row.get(2)?;
        let history = serde_json::from_str(&history)?;

        Ok(HardwareChat {
            id: row.get(0)?,
            session_id: row.get(1)?,
            history,
            created_at: parse_timestamp(&row.get::<String>(3)?),
            updated_at: parse_timestamp(&row.get::<String>(4)?),
        })
    }
}
