use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use salespulse_core::domain::customer::CustomerId;
use salespulse_core::domain::order::{Order, OrderId, OrderLine, OrderStatus};
use salespulse_core::domain::product::ProductId;

use crate::connection::DbPool;
use crate::repositories::order::write_order;
use crate::repositories::{format_timestamp, RepositoryError};

const DEMO_ORDER_PREFIX: &str = "demo-ord-";

struct DemoCustomer {
    id: &'static str,
    name: &'static str,
    segment: &'static str,
}

struct DemoProduct {
    id: &'static str,
    sku: &'static str,
    name: &'static str,
    category: &'static str,
    unit_price_cents: i64,
}

const DEMO_CUSTOMERS: &[DemoCustomer] = &[
    DemoCustomer { id: "demo-cust-acme", name: "Acme Corp", segment: "enterprise" },
    DemoCustomer { id: "demo-cust-globex", name: "Globex Industries", segment: "enterprise" },
    DemoCustomer { id: "demo-cust-initech", name: "Initech LLC", segment: "mid_market" },
    DemoCustomer { id: "demo-cust-umbrella", name: "Umbrella Retail", segment: "mid_market" },
    DemoCustomer { id: "demo-cust-hooli", name: "Hooli Cafe", segment: "smb" },
];

const DEMO_PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        id: "demo-prod-beans",
        sku: "COF-BEAN-1KG",
        name: "House Blend Beans 1kg",
        category: "coffee",
        unit_price_cents: 2450,
    },
    DemoProduct {
        id: "demo-prod-grinder",
        sku: "EQP-GRND-01",
        name: "Burr Grinder",
        category: "equipment",
        unit_price_cents: 12900,
    },
    DemoProduct {
        id: "demo-prod-filters",
        sku: "SUP-FILT-100",
        name: "Paper Filters x100",
        category: "supplies",
        unit_price_cents: 599,
    },
    DemoProduct {
        id: "demo-prod-kettle",
        sku: "EQP-KETL-02",
        name: "Gooseneck Kettle",
        category: "equipment",
        unit_price_cents: 6800,
    },
];

/// Order-count adjustment per weekday, Monday first.
const WEEKDAY_LIFT: [i64; 7] = [0, 0, 1, 1, 3, 4, -2];
/// Order-count adjustment per month, January first.
const MONTH_LIFT: [i64; 12] = [-1, -1, 0, 0, 0, 0, 0, 0, 0, 1, 3, 5];

/// Deterministic demo sales history for local runs and contract tests.
///
/// Produces `days` consecutive days of orders ending on `today`, with an
/// upward trend, weekday and holiday-season lift, and a sprinkling of
/// canceled and closed orders that must stay out of revenue. Loading the
/// same window twice is idempotent.
pub struct DemoSalesDataset;

impl DemoSalesDataset {
    pub const DEFAULT_DAYS: u32 = 730;

    /// Builds the demo orders without touching the database.
    pub fn orders(today: NaiveDate, days: u32) -> Vec<Order> {
        let Some(first_day) = today.checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
        else {
            return Vec::new();
        };

        first_day
            .iter_days()
            .take(days as usize)
            .enumerate()
            .flat_map(|(index, date)| orders_for_day(index as u32, days, date))
            .collect()
    }

    pub async fn load(
        pool: &DbPool,
        today: NaiveDate,
        days: u32,
    ) -> Result<SeedResult, RepositoryError> {
        let orders = Self::orders(today, days);
        let reference_time = customer_since(today, days);

        let mut tx = pool.begin().await?;

        for customer in DEMO_CUSTOMERS {
            sqlx::query(
                "INSERT INTO customer (id, name, segment, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO NOTHING",
            )
            .bind(customer.id)
            .bind(customer.name)
            .bind(customer.segment)
            .bind(format_timestamp(&reference_time))
            .execute(&mut *tx)
            .await?;
        }

        for product in DEMO_PRODUCTS {
            sqlx::query(
                "INSERT INTO product (id, sku, name, category, unit_price)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO NOTHING",
            )
            .bind(product.id)
            .bind(product.sku)
            .bind(product.name)
            .bind(product.category)
            .bind(Decimal::new(product.unit_price_cents, 2).to_string())
            .execute(&mut *tx)
            .await?;
        }

        for order in &orders {
            write_order(&mut tx, order).await?;
        }

        tx.commit().await?;

        let excluded_orders =
            orders.iter().filter(|order| !order.status.counts_toward_revenue()).count();
        let qualifying_revenue = orders
            .iter()
            .filter(|order| order.status.counts_toward_revenue())
            .map(Order::total)
            .sum();

        Ok(SeedResult {
            customers: DEMO_CUSTOMERS.len(),
            products: DEMO_PRODUCTS.len(),
            orders: orders.len(),
            excluded_orders,
            qualifying_revenue,
            first_day: orders.first().map(|order| order.created_at.date_naive()),
            last_day: orders.last().map(|order| order.created_at.date_naive()),
        })
    }

    /// Checks that the demo catalog and orders are present and consistent.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();
        let order_pattern = format!("{DEMO_ORDER_PREFIX}%");

        let customer_ids = sql_array_from_ids(DEMO_CUSTOMERS.iter().map(|c| c.id));
        let customers: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM customer WHERE id IN {customer_ids}"
        ))
        .fetch_one(pool)
        .await?;
        checks.push(("demo-customers", customers == DEMO_CUSTOMERS.len() as i64));

        let product_ids = sql_array_from_ids(DEMO_PRODUCTS.iter().map(|p| p.id));
        let products: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM product WHERE id IN {product_ids}"
        ))
        .fetch_one(pool)
        .await?;
        checks.push(("demo-products", products == DEMO_PRODUCTS.len() as i64));

        let orders: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM sales_order WHERE id LIKE ?1")
            .bind(&order_pattern)
            .fetch_one(pool)
            .await?;
        checks.push(("demo-orders", orders > 0));

        let orders_without_lines: i64 = sqlx::query_scalar(
            "SELECT COUNT(1) FROM sales_order o
             WHERE o.id LIKE ?1
               AND NOT EXISTS (SELECT 1 FROM order_line l WHERE l.order_id = o.id)",
        )
        .bind(&order_pattern)
        .fetch_one(pool)
        .await?;
        checks.push(("demo-order-lines", orders_without_lines == 0));

        let mismatched_totals: i64 = sqlx::query_scalar(
            "SELECT COUNT(1) FROM sales_order o
             WHERE o.id LIKE ?1
               AND ABS(o.total - (
                   SELECT COALESCE(SUM(l.quantity * l.unit_price), 0)
                   FROM order_line l WHERE l.order_id = o.id
               )) > 0.005",
        )
        .bind(&order_pattern)
        .fetch_one(pool)
        .await?;
        checks.push(("demo-order-totals", mismatched_totals == 0));

        let excluded = sql_array_from_ids(OrderStatus::excluded_from_revenue());
        let excluded_orders: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM sales_order WHERE id LIKE ?1 AND status IN {excluded}"
        ))
        .bind(&order_pattern)
        .fetch_one(pool)
        .await?;
        checks.push(("demo-excluded-statuses", excluded_orders > 0));

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }

    /// Removes every demo row, leaving other data untouched.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM sales_order WHERE id LIKE ?1")
            .bind(format!("{DEMO_ORDER_PREFIX}%"))
            .execute(&mut *tx)
            .await?;

        let customer_ids = sql_array_from_ids(DEMO_CUSTOMERS.iter().map(|c| c.id));
        sqlx::query(&format!("DELETE FROM customer WHERE id IN {customer_ids}"))
            .execute(&mut *tx)
            .await?;

        let product_ids = sql_array_from_ids(DEMO_PRODUCTS.iter().map(|p| p.id));
        sqlx::query(&format!("DELETE FROM product WHERE id IN {product_ids}"))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn orders_for_day(index: u32, days: u32, date: NaiveDate) -> Vec<Order> {
    let index = i64::from(index);
    let age = i64::from(days) - 1 - index;
    let trend = index * 6 / i64::from(days.max(1));
    let weekday = WEEKDAY_LIFT[date.weekday().num_days_from_monday() as usize];
    let month = MONTH_LIFT[date.month0() as usize];
    let jitter = (index * 7 + 3) % 5 - 2;
    let count = (4 + trend + weekday + month + jitter).max(1);

    (0..count)
        .map(|k| {
            let customer = &DEMO_CUSTOMERS[((index + k) as usize) % DEMO_CUSTOMERS.len()];
            let line_count = 1 + (index + k) % 2;
            let lines = (0..line_count)
                .map(|l| {
                    let product =
                        &DEMO_PRODUCTS[((index * 3 + k + l) as usize) % DEMO_PRODUCTS.len()];
                    OrderLine {
                        product_id: ProductId(product.id.to_string()),
                        quantity: (1 + (index + 2 * k + l) % 3) as u32,
                        unit_price: Decimal::new(product.unit_price_cents, 2),
                    }
                })
                .collect();

            let time = NaiveTime::from_hms_opt(
                (8 + (k * 5) % 12) as u32,
                ((k * 7 + index) % 60) as u32,
                0,
            )
            .unwrap_or(NaiveTime::MIN);

            Order {
                id: OrderId(format!("{DEMO_ORDER_PREFIX}{}-{k:02}", date.format("%Y%m%d"))),
                customer_id: CustomerId(customer.id.to_string()),
                status: demo_status(index * 31 + k * 17, age),
                lines,
                created_at: Utc.from_utc_datetime(&date.and_time(time)),
            }
        })
        .collect()
}

fn demo_status(seed: i64, age_days: i64) -> OrderStatus {
    if seed % 23 == 0 {
        OrderStatus::Canceled
    } else if seed % 29 == 0 {
        OrderStatus::Closed
    } else if age_days < 2 {
        OrderStatus::Pending
    } else if age_days < 5 {
        OrderStatus::Processing
    } else if age_days < 10 {
        OrderStatus::Shipped
    } else {
        OrderStatus::Delivered
    }
}

fn customer_since(today: NaiveDate, days: u32) -> DateTime<Utc> {
    let date = today.checked_sub_days(Days::new(u64::from(days) + 30)).unwrap_or(today);
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn sql_array_from_ids<'a>(ids: impl Iterator<Item = &'a str>) -> String {
    let quoted = ids.map(|id| format!("'{id}'")).collect::<Vec<_>>().join(",");
    format!("({quoted})")
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedResult {
    pub customers: usize,
    pub products: usize,
    pub orders: usize,
    pub excluded_orders: usize,
    pub qualifying_revenue: Decimal,
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
