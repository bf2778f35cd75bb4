//! Effect fan-out: one handler turning a `SideEffect` message into calls on
//! the outbound collaborators, with per-action failure isolation.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use orderline_core::UserId;

use crate::effect::SideEffect;
use crate::loyalty::LoyaltyLedger;
use crate::referral::{REFERRAL_BONUS_POINTS, ReferralBook};

/// Notification delivery failed. Carries a human-readable reason; the
/// dispatcher logs it and moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyError(pub String);

/// Outbound notification collaborator (operations channel + order owners).
pub trait Notifier: Send + Sync {
    fn notify_ops(&self, message: &str) -> Result<(), NotifyError>;

    fn notify_owner(&self, user: UserId, message: &str) -> Result<(), NotifyError>;
}

/// Recording notifier for tests/dev. Can be switched into a failing mode to
/// exercise failure isolation.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    ops: Mutex<Vec<String>>,
    owners: Mutex<Vec<(UserId, String)>>,
    failing: AtomicBool,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn ops_messages(&self) -> Vec<String> {
        self.ops.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn owner_messages(&self) -> Vec<(UserId, String)> {
        self.owners.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Notifier for InMemoryNotifier {
    fn notify_ops(&self, message: &str) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError("notifier unavailable".to_string()));
        }
        if let Ok(mut ops) = self.ops.lock() {
            ops.push(message.to_string());
        }
        Ok(())
    }

    fn notify_owner(&self, user: UserId, message: &str) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError("notifier unavailable".to_string()));
        }
        if let Ok(mut owners) = self.owners.lock() {
            owners.push((user, message.to_string()));
        }
        Ok(())
    }
}

/// Fans a committed effect out to the collaborators. Every action is
/// best-effort: a failure is logged at `warn` and never propagated, so one
/// failing collaborator cannot block another or the core operation.
pub struct EffectHandler {
    notifier: Arc<dyn Notifier>,
    loyalty: Arc<LoyaltyLedger>,
    referrals: Arc<ReferralBook>,
}

impl EffectHandler {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        loyalty: Arc<LoyaltyLedger>,
        referrals: Arc<ReferralBook>,
    ) -> Self {
        Self {
            notifier,
            loyalty,
            referrals,
        }
    }

    pub fn handle(&self, effect: SideEffect) {
        match effect {
            SideEffect::OrderPlaced {
                order_id,
                number,
                total_amount,
                ..
            } => {
                let message = format!("new order {number} placed, total {total_amount}");
                if let Err(err) = self.notifier.notify_ops(&message) {
                    warn!(%order_id, error = ?err, "ops notification failed");
                }
            }
            SideEffect::StatusChanged {
                order_id,
                number,
                owner,
                old_status,
                new_status,
            } => {
                debug!(%order_id, %old_status, %new_status, "order status changed");
                if let Some(owner) = owner {
                    let message = format!("order {number} is now {new_status}");
                    if let Err(err) = self.notifier.notify_owner(owner, &message) {
                        warn!(%order_id, error = ?err, "owner notification failed");
                    }
                }
            }
            SideEffect::LoyaltyCredit {
                order_id,
                owner,
                points,
            } => {
                self.loyalty.credit_for_order(order_id, owner, points);
            }
            SideEffect::LoyaltyReversal { order_id } => {
                self.loyalty.reverse_for_order(order_id);
            }
            SideEffect::ReferralConversion { owner } => {
                if let Some(referrer) = self.referrals.convert(owner) {
                    debug!(%owner, %referrer, "referral converted");
                    self.loyalty.grant_bonus(referrer, REFERRAL_BONUS_POINTS);
                }
            }
        }
    }
}
