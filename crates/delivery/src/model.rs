//! The delivery record and its state machine.

use channel::OrderMessage;
use chrono::{DateTime, Utc};
use common::{Cpf, Money, OrderId, Sku};
use directory::Enrich;
use serde::{Deserialize, Serialize};

/// The state of a delivery in its lifecycle.
///
/// State transitions:
/// ```text
/// Processing ──┬──► Shipped
///              └──► Canceled
/// ```
/// Both targets are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    /// Fulfillment is underway; the only state that accepts transitions.
    #[default]
    Processing,

    /// The delivery left the warehouse (terminal state).
    Shipped,

    /// The delivery was canceled and its stock restored (terminal state).
    Canceled,
}

impl DeliveryStatus {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Shipped | DeliveryStatus::Canceled)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Processing => "PROCESSING",
            DeliveryStatus::Shipped => "SHIPPED",
            DeliveryStatus::Canceled => "CANCELED",
        }
    }

    /// Parses a status name produced by [`Self::as_str`].
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PROCESSING" => Some(DeliveryStatus::Processing),
            "SHIPPED" => Some(DeliveryStatus::Shipped),
            "CANCELED" => Some(DeliveryStatus::Canceled),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fulfillment record opened when an accepted order arrives on the channel.
///
/// The id is copied from the originating order; nothing else is shared with
/// the order store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: OrderId,
    pub cpf: Cpf,
    pub sku: Sku,
    pub customer_name: Option<String>,
    pub product_title: Option<String>,
    pub unit_price: Money,
    pub quantity: u32,
    pub total: Money,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
}

impl Delivery {
    /// Opens a `Processing` delivery from an order message.
    pub fn from_message(message: OrderMessage) -> Self {
        Self {
            id: message.id,
            cpf: message.cpf,
            sku: message.sku,
            customer_name: Some(message.name),
            product_title: Some(message.title),
            unit_price: message.price,
            quantity: message.quantity,
            total: message.total,
            status: DeliveryStatus::Processing,
            created_at: Utc::now(),
        }
    }
}

impl Enrich for Delivery {
    fn cpf(&self) -> &Cpf {
        &self.cpf
    }

    fn sku(&self) -> &Sku {
        &self.sku
    }

    fn apply_customer_name(&mut self, name: &str) {
        self.customer_name = Some(name.to_string());
    }

    fn apply_product_title(&mut self, title: &str) {
        self.product_title = Some(title.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> OrderMessage {
        OrderMessage {
            id: OrderId::new(),
            name: "John Doe".to_string(),
            cpf: Cpf::new("07021050070"),
            title: "Wireless Mouse".to_string(),
            sku: Sku::new("MOUSE-2024-WL-0010"),
            price: Money::from_cents(2999),
            quantity: 10,
            total: Money::from_cents(29990),
            date: Utc::now(),
        }
    }

    #[test]
    fn test_default_status_is_processing() {
        assert_eq!(DeliveryStatus::default(), DeliveryStatus::Processing);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!DeliveryStatus::Processing.is_terminal());
        assert!(DeliveryStatus::Shipped.is_terminal());
        assert!(DeliveryStatus::Canceled.is_terminal());
    }

    #[test]
    fn test_status_parse_roundtrip() {
        for status in [
            DeliveryStatus::Processing,
            DeliveryStatus::Shipped,
            DeliveryStatus::Canceled,
        ] {
            assert_eq!(DeliveryStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(DeliveryStatus::parse("UNKNOWN"), None);
    }

    #[test]
    fn test_status_serialization_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&DeliveryStatus::Processing).unwrap(),
            "\"PROCESSING\""
        );
        let status: DeliveryStatus = serde_json::from_str("\"CANCELED\"").unwrap();
        assert_eq!(status, DeliveryStatus::Canceled);
    }

    #[test]
    fn test_delivery_opens_in_processing() {
        let message = message();
        let order_id = message.id;

        let delivery = Delivery::from_message(message);

        assert_eq!(delivery.id, order_id);
        assert_eq!(delivery.status, DeliveryStatus::Processing);
        assert_eq!(delivery.customer_name.as_deref(), Some("John Doe"));
        assert_eq!(delivery.product_title.as_deref(), Some("Wireless Mouse"));
        assert_eq!(delivery.total, Money::from_cents(29990));
    }
}
