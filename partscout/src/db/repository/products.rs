use libsql::{params, Connection};

use crate::error::Result;
use crate::models::{Category, Product};

const PRODUCT_COLUMNS: &str = r#"
    p.id, p.name, p.category_id, c.name, p.description
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
"#;

pub struct ProductRepository;

impl ProductRepository {
    pub async fn list(conn: &Connection, category_id: Option<&str>) -> Result<Vec<Product>> {
        let mut rows = match category_id {
            Some(category_id) => {
                conn.query(
                    &format!(
                        "SELECT {PRODUCT_COLUMNS} WHERE p.category_id = ?1 ORDER BY p.name, p.id"
                    ),
                    params![category_id],
                )
                .await?
            }
            None => {
                conn.query(
                    &format!("SELECT {PRODUCT_COLUMNS} ORDER BY p.name, p.id"),
                    (),
                )
                .await?
            }
        };

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_product(&row)?);
        }

        Ok(results)
    }

    pub async fn get_by_ids(conn: &Connection, ids: &[String]) -> Result<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!("SELECT {PRODUCT_COLUMNS} WHERE p.id IN ({placeholders})");
        let params: Vec<libsql::Value> =
            ids.iter().map(|id| libsql::Value::from(id.clone())).collect();

        let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_product(&row)?);
        }

        Ok(results)
    }

    pub async fn upsert_category(conn: &Connection, category: &Category) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO categories (id, name) VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name
            "#,
            params![category.id.clone(), category.name.clone()],
        )
        .await?;

        Ok(())
    }

    pub async fn upsert_product(conn: &Connection, product: &Product) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO products (id, name, category_id, description) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                category_id = excluded.category_id,
                description = excluded.description
            "#,
            params![
                product.id.clone(),
                product.name.clone(),
                product.category_id.clone(),
                product.description.clone(),
            ],
        )
        .await?;

        Ok(())
    }

    fn row_to_product(row: &libsql::Row) -> Result<Product> {
        Ok(Product {
            id: row.get(0)?,
            name: row.get(1)?,
            category_id: row.get(2)?,
            category_name: row.get(3)?,
            description: row.get(4)?,
        })
    }
}
