use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerId;
use crate::domain::product::ProductId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Canceled,
    Closed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
        OrderStatus::Closed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Canceled => "canceled",
            Self::Closed => "closed",
        }
    }

    /// Canceled and closed orders never count toward revenue or order volume.
    pub fn counts_toward_revenue(self) -> bool {
        !matches!(self, Self::Canceled | Self::Closed)
    }

    /// Statuses excluded from the daily revenue aggregation, as stored in the database.
    pub fn excluded_from_revenue() -> impl Iterator<Item = &'static str> {
        Self::ALL.into_iter().filter(|status| !status.counts_toward_revenue()).map(Self::as_str)
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            "closed" => Ok(Self::Closed),
            other => {
                Err(DomainError::InvariantViolation(format!("unknown order status `{other}`")))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(|line| line.unit_price * Decimal::from(line.quantity)).sum()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::domain::customer::CustomerId;
    use crate::domain::product::ProductId;
    use crate::errors::DomainError;

    use super::{Order, OrderId, OrderLine, OrderStatus};

    fn order(status: OrderStatus) -> Order {
        Order {
            id: OrderId("O-1".to_string()),
            customer_id: CustomerId("C-1".to_string()),
            status,
            lines: vec![
                OrderLine {
                    product_id: ProductId("widget".to_string()),
                    quantity: 3,
                    unit_price: Decimal::new(1250, 2),
                },
                OrderLine {
                    product_id: ProductId("gadget".to_string()),
                    quantity: 1,
                    unit_price: Decimal::new(4999, 2),
                },
            ],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn total_sums_line_extensions() {
        assert_eq!(order(OrderStatus::Pending).total(), Decimal::new(8749, 2));
    }

    #[test]
    fn canceled_and_closed_orders_do_not_count_toward_revenue() {
        assert!(!OrderStatus::Canceled.counts_toward_revenue());
        assert!(!OrderStatus::Closed.counts_toward_revenue());
        assert!(OrderStatus::Delivered.counts_toward_revenue());

        let excluded: Vec<&str> = OrderStatus::excluded_from_revenue().collect();
        assert_eq!(excluded, vec!["canceled", "closed"]);
    }

    #[test]
    fn parses_british_spelling_of_canceled() {
        let status: OrderStatus = "Cancelled".parse().expect("status should parse");
        assert_eq!(status, OrderStatus::Canceled);
        assert!(matches!(
            "refunded".parse::<OrderStatus>(),
            Err(DomainError::InvariantViolation(ref message)) if message.contains("refunded")
        ));
    }
}
