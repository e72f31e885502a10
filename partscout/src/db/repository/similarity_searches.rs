use libsql::{params, Connection};

use crate::db::schema::{format_timestamp, parse_timestamp};
use crate::error::Result;
use crate::models::ProductSimilaritySearch;

pub struct SimilaritySearchRepository;

impl SimilaritySearchRepository {
    pub async fn create(conn: &Connection, search: &ProductSimilaritySearch) -> Result<()> {
        let product_ids = serde_json::to_string(&search.similar_product_ids)?;

        conn.execute(
            r#"
            INSERT INTO product_similarity_searches (
                id, image, identified_component, similar_product_ids, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5
            )
            "#,
            params![
                search.id.clone(),
                search.image.clone(),
                search.identified_component.clone(),
                product_ids,
                format_timestamp(&search.created_at),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<ProductSimilaritySearch>> {
        let mut rows = conn
            .query(
                r#"
                SELECT id, image, identified_component, similar_product_ids, created_at
                FROM product_similarity_searches
                WHERE id = ?1
                "#,
                params![id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_search(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn list(conn: &Connection) -> Result<Vec<ProductSimilaritySearch>> {
        let mut rows = conn
            .query(
                r#"
                SELECT id, image, identified_component, similar_product_ids, created_at
                FROM product_similarity_searches
                ORDER BY created_at DESC, rowid DESC
                "#,
                (),
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_search(&row)?);
        }

        Ok(results)
    }

    fn row_to_search(row: &libsql::Row) -> Result<ProductSimilaritySearch> {
        let product_ids: String = row.get(3)?;

        Ok(ProductSimilaritySearch {
            id: row.get(0)?,
            image: row.get(1)?,
            identified_component: row.get(2)?,
            similar_product_ids: serde_json::from_str(&product_ids).unwrap_or_default(),
            created_at: parse_timestamp(&row.get::<String>(4)?),
        })
    }
}
