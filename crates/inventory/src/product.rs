use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderline_core::{DomainError, DomainResult, ProductId};

/// Stock ledger row: a catalog product with its available quantity.
///
/// `reserve` is a single conditional check-and-decrement and `release` is an
/// unconditional increment. Both are only ever called from inside the store's
/// enclosing transaction, never committed independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub code: String,
    pub name: String,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: i64,
    /// Available quantity. Never negative.
    pub quantity: i64,
    pub is_promo: bool,
    pub updated_at: DateTime<Utc>,
}

impl ProductRecord {
    pub fn new(
        id: ProductId,
        code: impl Into<String>,
        name: impl Into<String>,
        unit_price: i64,
        quantity: i64,
    ) -> DomainResult<Self> {
        let code = code.into();
        let name = name.into();
        if code.trim().is_empty() {
            return Err(DomainError::validation("product code cannot be empty"));
        }
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if unit_price < 0 {
            return Err(DomainError::validation("unit_price cannot be negative"));
        }
        if quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        Ok(Self {
            id,
            code,
            name,
            unit_price,
            quantity,
            is_promo: false,
            updated_at: Utc::now(),
        })
    }

    /// Reserve `qty` units: decrement the available quantity only if at least
    /// `qty` units remain. On shortfall nothing is decremented and the error
    /// carries the product id and the remaining quantity.
    pub fn reserve(&mut self, qty: i64) -> DomainResult<()> {
        if qty <= 0 {
            return Err(DomainError::validation("reserve quantity must be positive"));
        }
        if self.quantity < qty {
            return Err(DomainError::insufficient_stock(self.id, qty, self.quantity));
        }
        self.quantity -= qty;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Release (restock) `qty` units unconditionally.
    pub fn release(&mut self, qty: i64) -> DomainResult<()> {
        if qty <= 0 {
            return Err(DomainError::validation("release quantity must be positive"));
        }
        self.quantity += qty;
        self.updated_at = Utc::now();
        Ok(())
    }
}
