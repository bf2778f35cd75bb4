//! Infrastructure layer: the single data store and the order engine built on
//! top of it.

pub mod engine;
pub mod store;


pub use engine::OrderEngine;
pub use store::{InMemoryStore, OrderDetail, StoreState};
