//! Referral collaborator.
//!
//! Tracks pending referral links invitee -> referrer. A link converts at most
//! once: the first completed order of the referred user consumes it.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use orderline_core::UserId;

/// Points granted to the referrer when their referral converts.
pub const REFERRAL_BONUS_POINTS: i64 = 500;

#[derive(Debug, Default)]
struct BookState {
    pending: HashMap<UserId, UserId>,
    converted: HashSet<UserId>,
}

/// In-memory referral book.
#[derive(Debug, Default)]
pub struct ReferralBook {
    inner: RwLock<BookState>,
}

impl ReferralBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `referred` signed up through `referrer`. A self-referral
    /// or an already-linked/converted user is ignored.
    pub fn link(&self, referred: UserId, referrer: UserId) {
        if referred == referrer {
            return;
        }
        if let Ok(mut state) = self.inner.write() {
            if state.converted.contains(&referred) {
                return;
            }
            state.pending.entry(referred).or_insert(referrer);
        }
    }

    /// Convert the pending link for `referred`, returning the referrer. The
    /// link is consumed: a second call returns `None`.
    pub fn convert(&self, referred: UserId) -> Option<UserId> {
        let mut state = self.inner.write().ok()?;
        let referrer = state.pending.remove(&referred)?;
        state.converted.insert(referred);
        Some(referrer)
    }

    pub fn is_converted(&self, referred: UserId) -> bool {
        self.inner
            .read()
            .map(|state| state.converted.contains(&referred))
            .unwrap_or(false)
    }
}
