//! The engine's single data store.
//!
//! Every core operation (creation, transition, item edit) runs as one atomic
//! unit of work against this store: all contained mutations commit together
//! or none do. Per-product stock mutation happens under the store's write
//! lock, which is the mandatory serialization point for concurrent
//! reservations.

mod in_memory;

pub use in_memory::{InMemoryStore, OrderDetail, StoreState};
