pub mod config;
pub mod domain;
pub mod errors;
pub mod forecast;

pub use domain::customer::{Customer, CustomerId};
pub use domain::forecast::{ForecastPayload, ForecastPoint, ForecastSummary, HistoricalPoint};
pub use domain::order::{Order, OrderId, OrderLine, OrderStatus};
pub use domain::product::{Product, ProductId};
pub use errors::{ApplicationError, DomainError, ForecastError, InterfaceError};
pub use forecast::{
    DailyTotalsSource, ForecastCache, ForecastService, ForecastSettings, RegressionResult,
    SeasonalityProfile,
};
