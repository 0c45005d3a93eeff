//! Shared types used across the order and delivery services.

mod types;

pub use types::{Cpf, DateRange, Money, OrderId, Sku};
