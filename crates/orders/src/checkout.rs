//! Inputs consumed from the cart and checkout collaborators.
//!
//! These shapes arrive pre-validated (catalog correctness, form shape); the
//! engine consumes them as-is and snapshots what it needs.

use serde::{Deserialize, Serialize};

use orderline_core::ProductId;

/// Client class an order was placed under. Wholesale orders are additionally
/// validated against the configured wholesale rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    Retail,
    Wholesale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Pickup,
    Courier,
    Post,
}

/// One validated cart line: product reference plus the code/name/price the
/// order item will snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub code: String,
    pub name: String,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: i64,
    pub quantity: i64,
    pub is_promo: bool,
}

/// Checkout form fields, consumed as-is (pre-validated shape).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    pub delivery_method: DeliveryMethod,
    pub delivery_city: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_cost: i64,
    pub discount_amount: i64,
    pub payment_method: PaymentMethod,
    pub comment: Option<String>,
}
