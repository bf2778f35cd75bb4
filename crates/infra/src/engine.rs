//! Order engine: the application-level orchestration layer.
//!
//! Implements the three entry points exposed to collaborators — order
//! creation, status transition, and line-item editing — each as one atomic
//! unit of work against the store, followed by fire-and-forget side-effect
//! publication. Publication failures are logged and never surfaced as an
//! operation failure.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::{info, warn};

use orderline_core::{DomainError, DomainResult, OrderId, UserId};
use orderline_effects::{EffectBus, SideEffect, points_for_total};
use orderline_orders::{
    CartLine, ChangeSource, CheckoutForm, ClientType, ItemChange, Order, OrderItem, OrderStatus,
    PaymentStatus, StatusHistoryRecord,
};

use crate::store::{InMemoryStore, OrderDetail, StoreState};

/// How many fresh random suffixes to try before giving up on a unique
/// order number.
const ORDER_NUMBER_ATTEMPTS: usize = 5;

/// Length of the random order-number suffix.
const ORDER_NUMBER_SUFFIX_LEN: usize = 6;

/// The order lifecycle engine.
///
/// Generic over the effect bus so tests can subscribe to the same bus the
/// engine publishes on.
pub struct OrderEngine<B>
where
    B: EffectBus<SideEffect>,
{
    store: Arc<InMemoryStore>,
    effects: B,
}

impl<B> OrderEngine<B>
where
    B: EffectBus<SideEffect>,
{
    pub fn new(store: Arc<InMemoryStore>, effects: B) -> Self {
        Self { store, effects }
    }

    /// Build a durable order from validated cart lines.
    ///
    /// The whole of: wholesale rule evaluation, order-number allocation,
    /// stock reservation for every line, and the order/items/history writes
    /// happens in one transaction. Any failure (for example one line short on
    /// stock) rolls back all of it.
    pub fn create_order(
        &self,
        actor: Option<UserId>,
        checkout: CheckoutForm,
        lines: Vec<CartLine>,
        client_type: ClientType,
    ) -> DomainResult<Order> {
        if lines.is_empty() {
            return Err(DomainError::validation(
                "cannot create an order from an empty cart",
            ));
        }

        let order = self.store.transact(move |state| {
            if client_type == ClientType::Wholesale {
                orderline_wholesale::evaluate(state.rules(), &lines)?;
            }

            let number = allocate_order_number(state, generate_order_number)?;

            let mut items = Vec::with_capacity(lines.len());
            for line in &lines {
                state.product_mut(line.product_id)?.reserve(line.quantity)?;
                items.push(OrderItem::from_cart_line(line)?);
            }

            let order = Order::new(OrderId::new(), number, actor, client_type, checkout, items);
            state.push_history(StatusHistoryRecord::creation(order.id));
            state.insert_order(order.clone());
            Ok(order)
        })?;

        info!(order_id = %order.id, number = %order.number, total = order.total_amount, "order created");

        // Post-commit: neither cart clearing nor effect publication may undo
        // the committed order.
        if let Some(user) = actor {
            if let Err(err) = self.store.clear_cart(user) {
                warn!(%user, error = %err, "failed to clear cart after checkout");
            }
        }
        self.publish(SideEffect::OrderPlaced {
            order_id: order.id,
            number: order.number.clone(),
            total_amount: order.total_amount,
            client_id: order.client_id,
        });

        Ok(order)
    }

    /// Apply a status transition.
    ///
    /// The transition must be an edge of the status graph; client-sourced
    /// requests are additionally gated to early cancellation. Entering
    /// `cancelled`/`returned` restocks every line item in the same
    /// transaction as the status and history writes.
    pub fn transition(
        &self,
        order_id: OrderId,
        new_status: OrderStatus,
        actor: Option<UserId>,
        source: ChangeSource,
        comment: Option<String>,
        tracking_number: Option<String>,
    ) -> DomainResult<Order> {
        let (updated, previous) = self.store.transact(move |state| {
            let snapshot = state.order(order_id).cloned().ok_or(DomainError::NotFound)?;
            let current = snapshot.status;

            if !current.can_transition_to(new_status) {
                return Err(DomainError::validation(format!(
                    "illegal status transition: {current} -> {new_status}"
                )));
            }
            if !source.permits(current, new_status) {
                return Err(DomainError::Forbidden);
            }

            if new_status.restocks_on_entry() {
                for item in &snapshot.items {
                    // Weak product reference: a product deleted from the
                    // catalog after the order snapshot cannot be restocked.
                    if let Ok(product) = state.product_mut(item.product_id) {
                        product.release(item.quantity)?;
                    }
                }
            }

            let order = state.order_mut(order_id)?;
            order.status = new_status;
            match new_status {
                OrderStatus::Cancelled => {
                    order.cancellation_reason = comment.clone();
                    order.cancellation_source = Some(source);
                }
                OrderStatus::Paid => {
                    order.payment_status = PaymentStatus::Paid;
                }
                OrderStatus::Shipped => {
                    if tracking_number.is_some() {
                        order.tracking_number = tracking_number;
                    }
                }
                _ => {}
            }
            let updated = order.clone();

            state.push_history(StatusHistoryRecord::transition(
                order_id, current, new_status, actor, source, comment,
            ));
            Ok((updated, current))
        })?;

        info!(%order_id, from = %previous, to = %updated.status, %source, "order status changed");
        self.publish_transition_effects(&updated, previous);

        Ok(updated)
    }

    /// Apply a batch of line-item changes to an order that has not moved past
    /// `confirmed`. Stock deltas, item rows, the recomputed totals and the
    /// audit history record all commit together.
    pub fn edit_items(
        &self,
        order_id: OrderId,
        changes: Vec<ItemChange>,
        actor: UserId,
    ) -> DomainResult<Order> {
        if changes.is_empty() {
            return Err(DomainError::validation("no item changes requested"));
        }

        let updated = self.store.transact(move |state| {
            let current_status = state
                .order(order_id)
                .ok_or(DomainError::NotFound)?
                .status;
            if !current_status.items_editable() {
                return Err(DomainError::validation(
                    "editing not allowed in this status",
                ));
            }

            for change in &changes {
                apply_item_change(state, order_id, change)?;
            }

            let order = state.order_mut(order_id)?;
            order.recompute_totals();
            let updated = order.clone();

            state.push_history(StatusHistoryRecord::items_edited(
                order_id,
                current_status,
                actor,
            ));
            Ok(updated)
        })?;

        info!(%order_id, items = updated.items.len(), total = updated.total_amount, "order items edited");

        Ok(updated)
    }

    /// Read model: one order with its items and full status history.
    pub fn order_detail(&self, order_id: OrderId) -> DomainResult<OrderDetail> {
        self.store.order_detail(order_id)
    }

    fn publish_transition_effects(&self, order: &Order, old_status: OrderStatus) {
        // The status/history write is already committed; everything below is
        // best-effort.
        self.publish(SideEffect::StatusChanged {
            order_id: order.id,
            number: order.number.clone(),
            owner: order.client_id,
            old_status,
            new_status: order.status,
        });

        match order.status {
            OrderStatus::Completed => {
                if let Some(owner) = order.client_id {
                    self.publish(SideEffect::LoyaltyCredit {
                        order_id: order.id,
                        owner,
                        points: points_for_total(order.total_amount),
                    });
                    self.publish(SideEffect::ReferralConversion { owner });
                }
            }
            OrderStatus::Cancelled | OrderStatus::Returned => {
                self.publish(SideEffect::LoyaltyReversal { order_id: order.id });
            }
            _ => {}
        }
    }

    fn publish(&self, effect: SideEffect) {
        if let Err(err) = self.effects.publish(effect) {
            warn!(error = ?err, "side-effect publish failed");
        }
    }
}

fn apply_item_change(
    state: &mut StoreState,
    order_id: OrderId,
    change: &ItemChange,
) -> DomainResult<()> {
    match change {
        ItemChange::Remove { item_id } => {
            let (product_id, qty) = {
                let order = state.order(order_id).ok_or(DomainError::NotFound)?;
                let item = order.item(*item_id).ok_or(DomainError::NotFound)?;
                (item.product_id, item.quantity)
            };
            if let Ok(product) = state.product_mut(product_id) {
                product.release(qty)?;
            }
            let order = state.order_mut(order_id)?;
            order.items.retain(|i| i.id != *item_id);
        }
        ItemChange::UpdateQuantity { item_id, quantity } => {
            if *quantity <= 0 {
                return Err(DomainError::validation("quantity must be positive"));
            }
            let (product_id, old_qty) = {
                let order = state.order(order_id).ok_or(DomainError::NotFound)?;
                let item = order.item(*item_id).ok_or(DomainError::NotFound)?;
                (item.product_id, item.quantity)
            };
            let delta = quantity - old_qty;
            if delta > 0 {
                state.product_mut(product_id)?.reserve(delta)?;
            } else if delta < 0 {
                if let Ok(product) = state.product_mut(product_id) {
                    product.release(-delta)?;
                }
            }
            state
                .order_mut(order_id)?
                .item_mut(*item_id)
                .ok_or(DomainError::NotFound)?
                .set_quantity(*quantity)?;
        }
        ItemChange::Add {
            product_id,
            quantity,
        } => {
            let item = {
                let product = state.product(*product_id).ok_or(DomainError::NotFound)?;
                OrderItem::snapshot(
                    product.id,
                    product.code.clone(),
                    product.name.clone(),
                    product.unit_price,
                    *quantity,
                    product.is_promo,
                )?
            };
            state.product_mut(*product_id)?.reserve(*quantity)?;
            state.order_mut(order_id)?.items.push(item);
        }
    }
    Ok(())
}

/// Allocate a unique human-readable order number: the generator produces a
/// candidate, which is retried with a fresh one on collision against the
/// uniqueness set. `Conflict` after the attempt budget is spent.
fn allocate_order_number(
    state: &mut StoreState,
    mut generate: impl FnMut() -> String,
) -> DomainResult<String> {
    for _ in 0..ORDER_NUMBER_ATTEMPTS {
        let number = generate();
        if state.claim_order_number(&number) {
            return Ok(number);
        }
    }
    Err(DomainError::conflict(
        "could not allocate a unique order number",
    ))
}

fn generate_order_number() -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ORDER_NUMBER_SUFFIX_LEN)
        .map(char::from)
        .collect::<String>()
        .to_uppercase();
    format!("ORD-{date}-{suffix}")
}
