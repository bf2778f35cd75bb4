//! Side-effect dispatcher.
//!
//! Post-commit, best-effort actions triggered by order mutations: operator
//! and owner notifications, loyalty credits/debits, referral conversion.
//! Effects are published to a bus **after** the owning transaction commits;
//! a failure here is logged and isolated, it never rolls back or fails the
//! core operation.

pub mod bus;
pub mod effect;
pub mod handler;
pub mod in_memory_bus;
pub mod loyalty;
pub mod referral;
pub mod worker;

pub use bus::{EffectBus, Subscription};
pub use effect::SideEffect;
pub use handler::{EffectHandler, InMemoryNotifier, Notifier, NotifyError};
pub use in_memory_bus::InMemoryEffectBus;
pub use loyalty::{LoyaltyLedger, points_for_total};
pub use referral::ReferralBook;
pub use worker::{EffectWorker, WorkerHandle};
