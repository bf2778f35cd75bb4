//! Loyalty ledger collaborator.
//!
//! Tracks point balances and, crucially, the earn amount recorded per order:
//! reversing an order debits exactly what that order credited, never a value
//! re-derived from its (possibly edited) current total.

use std::collections::HashMap;
use std::sync::RwLock;

use orderline_core::{OrderId, UserId};

/// Minor units of order total per loyalty point.
pub const EARN_DIVISOR: i64 = 100;

/// Points a completed order earns, proportional to its total.
pub fn points_for_total(total_amount: i64) -> i64 {
    total_amount / EARN_DIVISOR
}

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<UserId, i64>,
    /// Earn recorded per order: (owner, points credited).
    order_earns: HashMap<OrderId, (UserId, i64)>,
}

/// In-memory loyalty ledger.
#[derive(Debug, Default)]
pub struct LoyaltyLedger {
    inner: RwLock<LedgerState>,
}

impl LoyaltyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit the points earned by an order. Idempotent: a second credit for
    /// the same order is a no-op.
    pub fn credit_for_order(&self, order_id: OrderId, owner: UserId, points: i64) {
        if let Ok(mut state) = self.inner.write() {
            if state.order_earns.contains_key(&order_id) {
                return;
            }
            state.order_earns.insert(order_id, (owner, points));
            *state.balances.entry(owner).or_insert(0) += points;
        }
    }

    /// Debit the points previously credited for this order. Idempotent: the
    /// earn record is consumed, so a second reversal is a no-op.
    pub fn reverse_for_order(&self, order_id: OrderId) {
        if let Ok(mut state) = self.inner.write() {
            if let Some((owner, points)) = state.order_earns.remove(&order_id) {
                *state.balances.entry(owner).or_insert(0) -= points;
            }
        }
    }

    /// Credit points not tied to an order (e.g. a referral bonus).
    pub fn grant_bonus(&self, user: UserId, points: i64) {
        if let Ok(mut state) = self.inner.write() {
            *state.balances.entry(user).or_insert(0) += points;
        }
    }

    pub fn balance(&self, user: UserId) -> i64 {
        self.inner
            .read()
            .ok()
            .and_then(|state| state.balances.get(&user).copied())
            .unwrap_or(0)
    }

    /// The earn currently recorded against an order, if not yet reversed.
    pub fn earned_for_order(&self, order_id: OrderId) -> Option<i64> {
        self.inner
            .read()
            .ok()
            .and_then(|state| state.order_earns.get(&order_id).map(|(_, p)| *p))
    }
}
