use async_trait::async_trait;
use thiserror::Error;

use salespulse_core::domain::customer::{Customer, CustomerId};
use salespulse_core::domain::order::{Order, OrderId};
use salespulse_core::domain::product::{Product, ProductId};
use salespulse_core::errors::ForecastError;

pub mod customer;
pub mod daily_totals;
pub mod memory;
pub mod order;
pub mod product;

pub use customer::SqlCustomerRepository;
pub use daily_totals::SqlDailyTotalsRepository;
pub use memory::InMemoryDailyTotalsSource;
pub use order::SqlOrderRepository;
pub use product::SqlProductRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for ForecastError {
    fn from(error: RepositoryError) -> Self {
        ForecastError::Source(error.to_string())
    }
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError>;
    async fn save(&self, customer: Customer) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn save(&self, product: Product) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError>;
    async fn save(&self, order: Order) -> Result<(), RepositoryError>;
}

pub(crate) fn decode_err(error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

pub(crate) fn parse_timestamp(
    value: &str,
) -> Result<chrono::DateTime<chrono::Utc>, RepositoryError> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&chrono::Utc))
        .map_err(|error| decode_err(format!("invalid timestamp `{value}`: {error}")))
}

pub(crate) fn format_timestamp(value: &chrono::DateTime<chrono::Utc>) -> String {
    value.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

pub(crate) fn parse_decimal(value: &str) -> Result<rust_decimal::Decimal, RepositoryError> {
    value.parse().map_err(|error| decode_err(format!("invalid decimal `{value}`: {error}")))
}
