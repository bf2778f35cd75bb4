use serde::{Deserialize, Serialize};

use orderline_core::{OrderId, UserId};
use orderline_orders::OrderStatus;

/// A post-commit side effect. Each variant is dispatched independently and
/// best-effort; none participates in the core transaction's atomicity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SideEffect {
    /// A new order was committed; notify the operations channel.
    OrderPlaced {
        order_id: OrderId,
        number: String,
        total_amount: i64,
        client_id: Option<UserId>,
    },
    /// An order changed status; notify the owner (if any).
    StatusChanged {
        order_id: OrderId,
        number: String,
        owner: Option<UserId>,
        old_status: OrderStatus,
        new_status: OrderStatus,
    },
    /// Credit loyalty points earned by a completed order. The amount is
    /// recorded against the order so a later reversal debits exactly this
    /// figure.
    LoyaltyCredit {
        order_id: OrderId,
        owner: UserId,
        points: i64,
    },
    /// Debit the points previously credited for this specific order (never
    /// re-derived from the current total).
    LoyaltyReversal { order_id: OrderId },
    /// The owner's first completed order converts their referral and grants
    /// the referrer a bonus.
    ReferralConversion { owner: UserId },
}
