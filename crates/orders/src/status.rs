//! Order status lifecycle: the transition table as data, with the actor
//! capability predicate layered separately.

use serde::{Deserialize, Serialize};

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    NewOrder,
    Processing,
    Confirmed,
    Paid,
    Shipped,
    Completed,
    Cancelled,
    Returned,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::NewOrder,
        OrderStatus::Processing,
        OrderStatus::Confirmed,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Returned,
    ];

    /// Outgoing edges of the status graph. Terminal states have none.
    pub fn allowed_targets(self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            NewOrder => &[Processing, Cancelled],
            Processing => &[Confirmed, Cancelled],
            Confirmed => &[Paid, Shipped, Cancelled],
            Paid => &[Shipped, Cancelled],
            Shipped => &[Completed, Returned],
            Completed => &[Returned],
            Cancelled => &[],
            Returned => &[],
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.allowed_targets().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }

    /// Entering one of these states reverses the order's stock reservations.
    pub fn restocks_on_entry(self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Returned)
    }

    /// Line items may only be edited while the order sits in these states.
    pub fn items_editable(self) -> bool {
        matches!(
            self,
            OrderStatus::NewOrder | OrderStatus::Processing | OrderStatus::Confirmed
        )
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            OrderStatus::NewOrder => "new_order",
            OrderStatus::Processing => "processing",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Returned => "returned",
        };
        f.write_str(s)
    }
}

/// Actor class responsible for a status change. Gates which transitions are
/// permitted and is recorded on every history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSource {
    Manager,
    ClientAction,
    System,
    Cron,
}

impl ChangeSource {
    /// Capability predicate for client-sourced transitions: clients may only
    /// cancel their own order, and only before it is confirmed.
    pub fn permits(self, current: OrderStatus, next: OrderStatus) -> bool {
        match self {
            ChangeSource::ClientAction => {
                next == OrderStatus::Cancelled
                    && matches!(current, OrderStatus::NewOrder | OrderStatus::Processing)
            }
            ChangeSource::Manager | ChangeSource::System | ChangeSource::Cron => true,
        }
    }
}

impl core::fmt::Display for ChangeSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            ChangeSource::Manager => "manager",
            ChangeSource::ClientAction => "client_action",
            ChangeSource::System => "system",
            ChangeSource::Cron => "cron",
        };
        f.write_str(s)
    }
}
