use libsql::{params, Connection};

use crate::db::schema::{format_timestamp, parse_timestamp};
use crate::error::Result;
use crate::models::HardwareIdentification;

pub struct IdentificationRepository;

impl IdentificationRepository {
    pub async fn create(conn: &Connection, record: &HardwareIdentification) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO hardware_identifications (id, image, result, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                record.id.clone(),
                record.image.clone(),
                record.result.clone(),
                format_timestamp(&record.created_at),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<HardwareIdentification>> {
        let mut rows = conn
            .query(
                "SELECT id, image, result, created_at FROM hardware_identifications WHERE id = ?1",
                params![id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_identification(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn list(conn: &Connection) -> Result<Vec<HardwareIdentification>> {
        let mut rows = conn
            .query(
                r#"
                SELECT id, image, result, created_at
                FROM hardware_identifications
                ORDER BY created_at DESC, rowid DESC
                "#,
                (),
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_identification(&row)?);
        }

        Ok(results)
    }

    fn row_to_identification(row: &libsql::Row) -> Result<HardwareIdentification> {
        Ok(HardwareIdentification {
            id: row.get(0)?,
            image: row.get(1)?,
            result: row.get(2)?,
            created_at: parse_timestamp(&row.get::<String>(3)?),
        })
    }
}
