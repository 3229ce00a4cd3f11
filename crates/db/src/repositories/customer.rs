use sqlx::Row;

use salespulse_core::domain::customer::{Customer, CustomerId};

use super::{decode_err, format_timestamp, parse_timestamp, CustomerRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCustomerRepository {
    pool: DbPool,
}

impl SqlCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CustomerRepository for SqlCustomerRepository {
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, segment, created_at FROM customer WHERE id = ?1")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let created_at: String = row.try_get("created_at").map_err(decode_err)?;
        Ok(Some(Customer {
            id: CustomerId(row.try_get("id").map_err(decode_err)?),
            name: row.try_get("name").map_err(decode_err)?,
            segment: row.try_get("segment").map_err(decode_err)?,
            created_at: parse_timestamp(&created_at)?,
        }))
    }

    async fn save(&self, customer: Customer) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO customer (id, name, segment, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 segment = excluded.segment",
        )
        .bind(&customer.id.0)
        .bind(&customer.name)
        .bind(&customer.segment)
        .bind(format_timestamp(&customer.created_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use salespulse_core::domain::customer::{Customer, CustomerId};

    use super::SqlCustomerRepository;
    use crate::repositories::CustomerRepository;
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn save_then_find_round_trips_and_upserts() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let repo = SqlCustomerRepository::new(pool);

        let created_at = Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).single().expect("ts");
        let mut customer = Customer {
            id: CustomerId("cust-001".to_string()),
            name: "Acme Corp".to_string(),
            segment: "enterprise".to_string(),
            created_at,
        };
        repo.save(customer.clone()).await.expect("save");

        customer.segment = "mid_market".to_string();
        repo.save(customer.clone()).await.expect("upsert");

        let found = repo.find_by_id(&customer.id).await.expect("find").expect("exists");
        assert_eq!(found, customer);
        assert!(repo
            .find_by_id(&CustomerId("missing".to_string()))
            .await
            .expect("find missing")
            .is_none());
    }
}
