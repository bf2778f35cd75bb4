//! Order domain module.
//!
//! This crate contains the business rules for orders, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage): the order status
//! state machine, the order/line-item model with immutable price snapshots,
//! and the append-only status history record.

pub mod checkout;
pub mod order;
pub mod status;

pub use checkout::{CartLine, CheckoutForm, ClientType, DeliveryMethod, PaymentMethod, PaymentStatus};
pub use order::{ItemChange, Order, OrderItem, StatusHistoryRecord};
pub use status::{ChangeSource, OrderStatus};
