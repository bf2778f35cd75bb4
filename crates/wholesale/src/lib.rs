//! Wholesale rule evaluator.
//!
//! Validates a proposed wholesale order against the admin-maintained rule
//! set. Pure domain logic: the rule configuration is read-only input here.

pub mod rule;

pub use rule::{RuleType, WholesaleRule, evaluate};
