use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use sqlx::Row;
use tracing::debug;

use salespulse_core::domain::forecast::HistoricalPoint;
use salespulse_core::domain::order::OrderStatus;
use salespulse_core::errors::ForecastError;
use salespulse_core::forecast::{Clock, DailyTotalsSource, SystemClock};

use super::{decode_err, RepositoryError};
use crate::DbPool;

/// Aggregates qualifying orders into one row per UTC calendar day.
///
/// The lookback window ends at today's UTC date as read from `clock`.
pub struct SqlDailyTotalsRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl SqlDailyTotalsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool, clock: Arc::new(SystemClock) }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Daily totals for every day on or after `cutoff` that has at least one
    /// order outside the excluded statuses, ascending by date.
    pub async fn load_daily_totals_since(
        &self,
        cutoff: NaiveDate,
    ) -> Result<Vec<HistoricalPoint>, RepositoryError> {
        let sql = format!(
            "SELECT date(created_at) AS day,
                    CAST(COALESCE(SUM(total), 0) AS REAL) AS revenue,
                    COUNT(*) AS orders
             FROM sales_order
             WHERE date(created_at) >= ?1
               AND status NOT IN {}
             GROUP BY date(created_at)
             ORDER BY day ASC",
            excluded_status_list()
        );

        let rows = sqlx::query(&sql)
            .bind(cutoff.format("%Y-%m-%d").to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<HistoricalPoint, RepositoryError> {
                let day: String = row.try_get("day").map_err(decode_err)?;
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                    .map_err(|error| decode_err(format!("invalid order date `{day}`: {error}")))?;
                let revenue: f64 = row.try_get("revenue").map_err(decode_err)?;
                let orders: i64 = row.try_get("orders").map_err(decode_err)?;
                Ok(HistoricalPoint::new(date, revenue, u64::try_from(orders).map_err(decode_err)?))
            })
            .collect()
    }
}

#[async_trait]
impl DailyTotalsSource for SqlDailyTotalsRepository {
    async fn load_daily_totals(
        &self,
        lookback_days: u32,
    ) -> Result<Vec<HistoricalPoint>, ForecastError> {
        let today = self.clock.now().date_naive();
        let cutoff = today.checked_sub_days(Days::new(u64::from(lookback_days))).unwrap_or(today);
        let points = self.load_daily_totals_since(cutoff).await?;
        debug!(
            event_name = "forecast.source.loaded",
            cutoff = %cutoff,
            days = points.len(),
            "loaded daily order totals"
        );
        Ok(points)
    }
}

fn excluded_status_list() -> String {
    let quoted =
        OrderStatus::excluded_from_revenue().map(|s| format!("'{s}'")).collect::<Vec<_>>();
    format!("({})", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Days, NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    use salespulse_core::domain::customer::{Customer, CustomerId};
    use salespulse_core::domain::forecast::HistoricalPoint;
    use salespulse_core::domain::order::{Order, OrderId, OrderLine, OrderStatus};
    use salespulse_core::domain::product::{Product, ProductId};
    use salespulse_core::forecast::{DailyTotalsSource, ManualClock};

    use super::{excluded_status_list, SqlDailyTotalsRepository};
    use crate::repositories::{
        CustomerRepository, OrderRepository, ProductRepository, SqlCustomerRepository,
        SqlOrderRepository, SqlProductRepository,
    };
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlCustomerRepository::new(pool.clone())
            .save(Customer {
                id: CustomerId("cust-1".to_string()),
                name: "Initech".to_string(),
                segment: "enterprise".to_string(),
                created_at: Utc::now(),
            })
            .await
            .expect("customer");
        SqlProductRepository::new(pool.clone())
            .save(Product {
                id: ProductId("prod-1".to_string()),
                sku: "SKU-1".to_string(),
                name: "Stapler".to_string(),
                category: "office".to_string(),
                unit_price: Decimal::new(2500, 2),
            })
            .await
            .expect("product");
        pool
    }

    async fn place(
        pool: &DbPool,
        id: &str,
        created_at: chrono::DateTime<Utc>,
        status: OrderStatus,
        quantity: u32,
    ) {
        SqlOrderRepository::new(pool.clone())
            .save(Order {
                id: OrderId(id.to_string()),
                customer_id: CustomerId("cust-1".to_string()),
                status,
                lines: vec![OrderLine {
                    product_id: ProductId("prod-1".to_string()),
                    quantity,
                    unit_price: Decimal::new(2500, 2),
                }],
                created_at,
            })
            .await
            .expect("order");
    }

    fn at(day: u32, hour: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, hour, 0, 0).single().expect("ts")
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).expect("date")
    }

    #[test]
    fn excluded_statuses_render_as_sql_list() {
        assert_eq!(excluded_status_list(), "('canceled', 'closed')");
    }

    #[tokio::test]
    async fn groups_by_calendar_day_and_skips_excluded_statuses() {
        let pool = setup().await;
        place(&pool, "o-1", at(5, 9), OrderStatus::Delivered, 2).await;
        place(&pool, "o-2", at(5, 23), OrderStatus::Pending, 1).await;
        place(&pool, "o-3", at(5, 12), OrderStatus::Canceled, 10).await;
        place(&pool, "o-4", at(7, 8), OrderStatus::Shipped, 4).await;
        place(&pool, "o-5", at(8, 8), OrderStatus::Closed, 4).await;

        let repo = SqlDailyTotalsRepository::new(pool);
        let points = repo.load_daily_totals_since(date(1)).await.expect("load");

        assert_eq!(points.len(), 2, "canceled/closed-only days must not appear");
        assert_eq!(points[0].date, date(5));
        assert!((points[0].revenue - 75.0).abs() < 1e-9);
        assert_eq!(points[0].orders, 2);
        assert_eq!(points[1].date, date(7));
        assert!((points[1].revenue - 100.0).abs() < 1e-9);
        assert_eq!(points[1].orders, 1);
    }

    #[tokio::test]
    async fn cutoff_is_inclusive_and_results_ascend() {
        let pool = setup().await;
        place(&pool, "o-late", at(20, 10), OrderStatus::Processing, 1).await;
        place(&pool, "o-early", at(2, 10), OrderStatus::Processing, 1).await;
        place(&pool, "o-edge", at(10, 0), OrderStatus::Processing, 1).await;

        let repo = SqlDailyTotalsRepository::new(pool);
        let points = repo.load_daily_totals_since(date(10)).await.expect("load");

        let dates: Vec<NaiveDate> = points.iter().map(|point| point.date).collect();
        assert_eq!(dates, vec![date(10), date(20)]);
    }

    #[tokio::test]
    async fn empty_store_yields_empty_series() {
        let pool = setup().await;
        let repo = SqlDailyTotalsRepository::new(pool);

        let points = repo.load_daily_totals(730).await.expect("load");
        assert!(points.is_empty());
    }

    #[tokio::test]
    async fn lookback_window_ends_at_the_clock_date() {
        let pool = setup().await;
        place(&pool, "o-before", at(1, 10), OrderStatus::Delivered, 1).await;
        place(&pool, "o-edge", at(10, 0), OrderStatus::Delivered, 1).await;
        place(&pool, "o-recent", at(17, 18), OrderStatus::Delivered, 1).await;

        let clock = Arc::new(ManualClock::new(at(20, 6)));
        let repo = SqlDailyTotalsRepository::new(pool).with_clock(clock.clone());

        let dates = |points: Vec<HistoricalPoint>| -> Vec<NaiveDate> {
            points.into_iter().map(|point| point.date).collect()
        };
        let ten_days = repo.load_daily_totals(10).await.expect("10 days");
        assert_eq!(dates(ten_days), vec![date(10), date(17)]);
        let nine_days = repo.load_daily_totals(9).await.expect("9 days");
        assert_eq!(dates(nine_days), vec![date(17)]);

        clock.advance(chrono::Duration::days(8));
        assert!(repo.load_daily_totals(10).await.expect("after advance").is_empty());
    }

    #[tokio::test]
    async fn default_clock_tracks_system_date() {
        let pool = setup().await;
        let recent = Utc::now().checked_sub_days(Days::new(3)).expect("recent");
        place(&pool, "o-recent", recent, OrderStatus::Delivered, 1).await;

        let repo = SqlDailyTotalsRepository::new(pool);

        assert_eq!(repo.load_daily_totals(30).await.expect("30 days").len(), 1);
    }

    #[tokio::test]
    async fn closed_pool_surfaces_as_source_error() {
        let pool = setup().await;
        pool.close().await;
        let repo = SqlDailyTotalsRepository::new(pool);

        let error = repo.load_daily_totals(30).await.expect_err("closed pool must fail");
        assert!(matches!(error, salespulse_core::errors::ForecastError::Source(_)));
    }
}
