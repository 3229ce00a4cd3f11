use sqlx::{Row, SqliteConnection};

use salespulse_core::domain::customer::CustomerId;
use salespulse_core::domain::order::{Order, OrderId, OrderLine, OrderStatus};
use salespulse_core::domain::product::ProductId;

use super::{
    decode_err, format_timestamp, parse_decimal, parse_timestamp, OrderRepository,
    RepositoryError,
};
use crate::DbPool;

pub struct SqlOrderRepository {
    pool: DbPool,
}

impl SqlOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Upserts the order header and replaces its lines on an open connection.
///
/// The stored `total` is always recomputed from the lines.
pub(crate) async fn write_order(
    conn: &mut SqliteConnection,
    order: &Order,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO sales_order (id, customer_id, status, total, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
             customer_id = excluded.customer_id,
             status = excluded.status,
             total = excluded.total,
             created_at = excluded.created_at",
    )
    .bind(&order.id.0)
    .bind(&order.customer_id.0)
    .bind(order.status.as_str())
    .bind(order.total().to_string())
    .bind(format_timestamp(&order.created_at))
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM order_line WHERE order_id = ?1")
        .bind(&order.id.0)
        .execute(&mut *conn)
        .await?;

    for (index, line) in order.lines.iter().enumerate() {
        sqlx::query(
            "INSERT INTO order_line (order_id, line_number, product_id, quantity, unit_price)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&order.id.0)
        .bind(index as i64 + 1)
        .bind(&line.product_id.0)
        .bind(i64::from(line.quantity))
        .bind(line.unit_price.to_string())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

#[async_trait::async_trait]
impl OrderRepository for SqlOrderRepository {
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let header = sqlx::query(
            "SELECT id, customer_id, status, created_at FROM sales_order WHERE id = ?1",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let status: String = header.try_get("status").map_err(decode_err)?;
        let status: OrderStatus = status.parse().map_err(decode_err)?;
        let created_at: String = header.try_get("created_at").map_err(decode_err)?;

        let lines = sqlx::query(
            "SELECT product_id, quantity, CAST(unit_price AS TEXT) AS unit_price
             FROM order_line WHERE order_id = ?1 ORDER BY line_number",
        )
        .bind(&id.0)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| -> Result<OrderLine, RepositoryError> {
            let quantity: i64 = row.try_get("quantity").map_err(decode_err)?;
            let unit_price: String = row.try_get("unit_price").map_err(decode_err)?;
            Ok(OrderLine {
                product_id: ProductId(row.try_get("product_id").map_err(decode_err)?),
                quantity: u32::try_from(quantity).map_err(decode_err)?,
                unit_price: parse_decimal(&unit_price)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Order {
            id: OrderId(header.try_get("id").map_err(decode_err)?),
            customer_id: CustomerId(header.try_get("customer_id").map_err(decode_err)?),
            status,
            lines,
            created_at: parse_timestamp(&created_at)?,
        }))
    }

    async fn save(&self, order: Order) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        write_order(&mut tx, &order).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use salespulse_core::domain::customer::{Customer, CustomerId};
    use salespulse_core::domain::order::{Order, OrderId, OrderLine, OrderStatus};
    use salespulse_core::domain::product::{Product, ProductId};

    use super::SqlOrderRepository;
    use crate::repositories::{
        CustomerRepository, OrderRepository, ProductRepository, SqlCustomerRepository,
        SqlProductRepository,
    };
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        SqlCustomerRepository::new(pool.clone())
            .save(Customer {
                id: CustomerId("cust-1".to_string()),
                name: "Globex".to_string(),
                segment: "smb".to_string(),
                created_at: Utc::now(),
            })
            .await
            .expect("seed customer");
        SqlProductRepository::new(pool.clone())
            .save(Product {
                id: ProductId("prod-1".to_string()),
                sku: "SKU-1".to_string(),
                name: "Kettle".to_string(),
                category: "kitchen".to_string(),
                unit_price: Decimal::new(3999, 2),
            })
            .await
            .expect("seed product");
        pool
    }

    fn sample_order(quantity: u32) -> Order {
        Order {
            id: OrderId("ord-1".to_string()),
            customer_id: CustomerId("cust-1".to_string()),
            status: OrderStatus::Pending,
            lines: vec![OrderLine {
                product_id: ProductId("prod-1".to_string()),
                quantity,
                unit_price: Decimal::new(3999, 2),
            }],
            created_at: Utc.with_ymd_and_hms(2026, 2, 3, 14, 0, 0).single().expect("ts"),
        }
    }

    #[tokio::test]
    async fn save_persists_header_total_and_lines() {
        let pool = setup().await;
        let repo = SqlOrderRepository::new(pool.clone());

        repo.save(sample_order(2)).await.expect("save");

        let found =
            repo.find_by_id(&OrderId("ord-1".to_string())).await.expect("find").expect("exists");
        assert_eq!(found, sample_order(2));

        let stored_total: f64 =
            sqlx::query_scalar("SELECT CAST(total AS REAL) FROM sales_order WHERE id = 'ord-1'")
                .fetch_one(&pool)
                .await
                .expect("total");
        assert!((stored_total - 79.98).abs() < 1e-9);
    }

    #[tokio::test]
    async fn resaving_replaces_lines_instead_of_appending() {
        let pool = setup().await;
        let repo = SqlOrderRepository::new(pool.clone());

        repo.save(sample_order(1)).await.expect("save");
        let mut updated = sample_order(3);
        updated.status = OrderStatus::Canceled;
        repo.save(updated).await.expect("resave");

        let line_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM order_line WHERE order_id = 'ord-1'")
                .fetch_one(&pool)
                .await
                .expect("count");
        assert_eq!(line_count, 1);

        let found =
            repo.find_by_id(&OrderId("ord-1".to_string())).await.expect("find").expect("exists");
        assert_eq!(found.status, OrderStatus::Canceled);
        assert_eq!(found.lines[0].quantity, 3);
    }

    #[tokio::test]
    async fn unknown_customer_violates_foreign_key() {
        let pool = setup().await;
        let repo = SqlOrderRepository::new(pool);

        let mut orphan = sample_order(1);
        orphan.customer_id = CustomerId("nobody".to_string());

        assert!(repo.save(orphan).await.is_err());
    }
}
