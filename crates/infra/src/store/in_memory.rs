use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use orderline_core::{DomainError, DomainResult, OrderId, ProductId, UserId};
use orderline_inventory::ProductRecord;
use orderline_orders::{CartLine, Order, StatusHistoryRecord};
use orderline_wholesale::WholesaleRule;

/// Read model for a single order: the row (with its items) plus the full
/// append-only status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: Order,
    pub history: Vec<StatusHistoryRecord>,
}

/// The complete store contents. Mutated only through
/// [`InMemoryStore::transact`], which stages a copy and swaps it in on
/// success, so a failed operation leaves no partial writes behind.
#[derive(Debug, Default, Clone)]
pub struct StoreState {
    products: HashMap<ProductId, ProductRecord>,
    orders: HashMap<OrderId, Order>,
    history: HashMap<OrderId, Vec<StatusHistoryRecord>>,
    order_numbers: HashSet<String>,
    rules: Vec<WholesaleRule>,
    carts: HashMap<UserId, Vec<CartLine>>,
}

impl StoreState {
    pub fn product(&self, id: ProductId) -> Option<&ProductRecord> {
        self.products.get(&id)
    }

    pub fn product_mut(&mut self, id: ProductId) -> DomainResult<&mut ProductRecord> {
        self.products.get_mut(&id).ok_or(DomainError::NotFound)
    }

    pub fn upsert_product(&mut self, product: ProductRecord) {
        self.products.insert(product.id, product);
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub fn order_mut(&mut self, id: OrderId) -> DomainResult<&mut Order> {
        self.orders.get_mut(&id).ok_or(DomainError::NotFound)
    }

    pub fn insert_order(&mut self, order: Order) {
        self.orders.insert(order.id, order);
    }

    /// Claim a human-readable order number. Returns false when the number is
    /// already taken (the caller retries with a fresh suffix).
    pub fn claim_order_number(&mut self, number: &str) -> bool {
        self.order_numbers.insert(number.to_string())
    }

    pub fn push_history(&mut self, record: StatusHistoryRecord) {
        self.history.entry(record.order_id).or_default().push(record);
    }

    pub fn history(&self, order_id: OrderId) -> &[StatusHistoryRecord] {
        self.history.get(&order_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rules(&self) -> &[WholesaleRule] {
        &self.rules
    }
}

/// In-memory transactional store.
///
/// Intended for tests/dev. Not optimized for performance: `transact` clones
/// the whole state to stage the unit of work, trading copies for bulletproof
/// rollback semantics.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` as one atomic unit of work. The closure mutates a staged copy
    /// of the state; on `Ok` the copy replaces the live state, on `Err`
    /// nothing is kept. Holding the write lock across the whole unit is what
    /// serializes concurrent stock mutations per product.
    pub fn transact<T>(
        &self,
        f: impl FnOnce(&mut StoreState) -> DomainResult<T>,
    ) -> DomainResult<T> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| DomainError::conflict("store lock poisoned"))?;

        let mut staged = guard.clone();
        let out = f(&mut staged)?;
        *guard = staged;
        Ok(out)
    }

    /// Read-only access to the current committed state.
    pub fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> DomainResult<T> {
        let guard = self
            .state
            .read()
            .map_err(|_| DomainError::conflict("store lock poisoned"))?;
        Ok(f(&guard))
    }

    // ---- convenience accessors (collaborator/admin surface) ----

    pub fn upsert_product(&self, product: ProductRecord) -> DomainResult<()> {
        self.transact(|state| {
            state.upsert_product(product);
            Ok(())
        })
    }

    pub fn product(&self, id: ProductId) -> DomainResult<ProductRecord> {
        self.read(|state| state.product(id).cloned())?
            .ok_or(DomainError::NotFound)
    }

    /// Replace the wholesale rule configuration (admin-maintained; read-only
    /// from the engine's perspective).
    pub fn set_rules(&self, rules: Vec<WholesaleRule>) -> DomainResult<()> {
        self.transact(|state| {
            state.rules = rules;
            Ok(())
        })
    }

    pub fn set_cart(&self, user: UserId, lines: Vec<CartLine>) -> DomainResult<()> {
        self.transact(|state| {
            state.carts.insert(user, lines);
            Ok(())
        })
    }

    pub fn cart(&self, user: UserId) -> DomainResult<Vec<CartLine>> {
        self.read(|state| state.carts.get(&user).cloned().unwrap_or_default())
    }

    pub fn clear_cart(&self, user: UserId) -> DomainResult<()> {
        self.transact(|state| {
            state.carts.remove(&user);
            Ok(())
        })
    }

    pub fn order(&self, id: OrderId) -> DomainResult<Order> {
        self.read(|state| state.order(id).cloned())?
            .ok_or(DomainError::NotFound)
    }

    pub fn order_detail(&self, id: OrderId) -> DomainResult<OrderDetail> {
        self.read(|state| {
            state.order(id).cloned().map(|order| OrderDetail {
                history: state.history(id).to_vec(),
                order,
            })
        })?
        .ok_or(DomainError::NotFound)
    }
}
