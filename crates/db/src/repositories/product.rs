use sqlx::Row;

use salespulse_core::domain::product::{Product, ProductId};

use super::{decode_err, parse_decimal, ProductRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, sku, name, category, CAST(unit_price AS TEXT) AS unit_price
             FROM product WHERE id = ?1",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let unit_price: String = row.try_get("unit_price").map_err(decode_err)?;
        Ok(Some(Product {
            id: ProductId(row.try_get("id").map_err(decode_err)?),
            sku: row.try_get("sku").map_err(decode_err)?,
            name: row.try_get("name").map_err(decode_err)?,
            category: row.try_get("category").map_err(decode_err)?,
            unit_price: parse_decimal(&unit_price)?,
        }))
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO product (id, sku, name, category, unit_price)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                 sku = excluded.sku,
                 name = excluded.name,
                 category = excluded.category,
                 unit_price = excluded.unit_price",
        )
        .bind(&product.id.0)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.unit_price.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
