use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderline_core::{DomainError, DomainResult, OrderId, OrderItemId, ProductId, UserId};

use crate::checkout::{CartLine, CheckoutForm, ClientType, DeliveryMethod, PaymentMethod, PaymentStatus};
use crate::status::{ChangeSource, OrderStatus};

/// One product/quantity/price entry belonging to an order.
///
/// `product_code`, `product_name` and `unit_price` are snapshots taken at
/// order-creation or edit time; they never track the live product record, so
/// historical orders stay accurate across later price/name changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub product_code: String,
    pub product_name: String,
    /// Snapshot price in smallest currency unit (e.g., cents).
    pub unit_price: i64,
    pub quantity: i64,
    /// Always `unit_price * quantity`.
    pub subtotal: i64,
    pub is_promo: bool,
}

impl OrderItem {
    /// Snapshot an item from a validated cart line.
    pub fn from_cart_line(line: &CartLine) -> DomainResult<Self> {
        Self::snapshot(
            line.product_id,
            line.code.clone(),
            line.name.clone(),
            line.unit_price,
            line.quantity,
            line.is_promo,
        )
    }

    pub fn snapshot(
        product_id: ProductId,
        product_code: String,
        product_name: String,
        unit_price: i64,
        quantity: i64,
        is_promo: bool,
    ) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if unit_price < 0 {
            return Err(DomainError::validation("unit_price cannot be negative"));
        }
        Ok(Self {
            id: OrderItemId::new(),
            product_id,
            product_code,
            product_name,
            unit_price,
            quantity,
            subtotal: unit_price * quantity,
            is_promo,
        })
    }

    /// Change the quantity, recomputing the subtotal from the **snapshotted**
    /// unit price (never the live product price).
    pub fn set_quantity(&mut self, quantity: i64) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        self.quantity = quantity;
        self.subtotal = self.unit_price * quantity;
        Ok(())
    }
}

/// A single change requested by the order item editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ItemChange {
    UpdateQuantity { item_id: OrderItemId, quantity: i64 },
    Remove { item_id: OrderItemId },
    Add { product_id: ProductId, quantity: i64 },
}

/// A durable order. Owned exclusively by the engine and never deleted:
/// cancelled/returned are terminal states, not row deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Human-readable, unique order number (date prefix + random suffix).
    pub number: String,
    pub status: OrderStatus,
    /// None for guest checkouts.
    pub client_id: Option<UserId>,
    pub client_type: ClientType,
    /// Always `Σ items.subtotal`, in smallest currency unit.
    pub total_amount: i64,
    /// Always `Σ items.quantity`.
    pub items_count: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub delivery_method: DeliveryMethod,
    pub delivery_city: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_cost: i64,
    pub discount_amount: i64,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    pub tracking_number: Option<String>,
    pub comment: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancellation_source: Option<ChangeSource>,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Assemble a new order from checkout fields and snapshotted items.
    /// Totals are derived from the item set.
    pub fn new(
        id: OrderId,
        number: String,
        client_id: Option<UserId>,
        client_type: ClientType,
        checkout: CheckoutForm,
        items: Vec<OrderItem>,
    ) -> Self {
        let mut order = Self {
            id,
            number,
            status: OrderStatus::NewOrder,
            client_id,
            client_type,
            total_amount: 0,
            items_count: 0,
            payment_method: checkout.payment_method,
            payment_status: PaymentStatus::Pending,
            delivery_method: checkout.delivery_method,
            delivery_city: checkout.delivery_city,
            delivery_address: checkout.delivery_address,
            delivery_cost: checkout.delivery_cost,
            discount_amount: checkout.discount_amount,
            contact_name: checkout.contact_name,
            contact_phone: checkout.contact_phone,
            contact_email: checkout.contact_email,
            tracking_number: None,
            comment: checkout.comment,
            cancellation_reason: None,
            cancellation_source: None,
            items,
            created_at: Utc::now(),
        };
        order.recompute_totals();
        order
    }

    /// Re-derive `items_count` and `total_amount` from the current item set.
    /// Invoked after creation and after every item edit batch.
    pub fn recompute_totals(&mut self) {
        self.items_count = self.items.iter().map(|i| i.quantity).sum();
        self.total_amount = self.items.iter().map(|i| i.subtotal).sum();
    }

    pub fn item(&self, item_id: OrderItemId) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: OrderItemId) -> Option<&mut OrderItem> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }
}

/// Append-only audit record: one per status transition (including the
/// creation record, `None -> new_order`) and one per item edit batch
/// (`old_status == new_status`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryRecord {
    pub order_id: OrderId,
    pub old_status: Option<OrderStatus>,
    pub new_status: OrderStatus,
    /// None for system-initiated changes.
    pub changed_by: Option<UserId>,
    pub source: ChangeSource,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StatusHistoryRecord {
    /// The initial record written together with the order row.
    pub fn creation(order_id: OrderId) -> Self {
        Self {
            order_id,
            old_status: None,
            new_status: OrderStatus::NewOrder,
            changed_by: None,
            source: ChangeSource::System,
            comment: Some("order created".to_string()),
            created_at: Utc::now(),
        }
    }

    pub fn transition(
        order_id: OrderId,
        old_status: OrderStatus,
        new_status: OrderStatus,
        changed_by: Option<UserId>,
        source: ChangeSource,
        comment: Option<String>,
    ) -> Self {
        Self {
            order_id,
            old_status: Some(old_status),
            new_status,
            changed_by,
            source,
            comment,
            created_at: Utc::now(),
        }
    }

    /// Audit record for an item edit: the status does not change, but the
    /// edit is recorded.
    pub fn items_edited(order_id: OrderId, status: OrderStatus, changed_by: UserId) -> Self {
        Self {
            order_id,
            old_status: Some(status),
            new_status: status,
            changed_by: Some(changed_by),
            source: ChangeSource::Manager,
            comment: Some("order items edited".to_string()),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: i64, qty: i64) -> CartLine {
        CartLine {
            product_id: ProductId::new(),
            code: "SKU-1".to_string(),
            name: "Widget".to_string(),
            unit_price: price,
            quantity: qty,
            is_promo: false,
        }
    }

    fn checkout() -> CheckoutForm {
        CheckoutForm {
            contact_name: "Ada".to_string(),
            contact_phone: "+100000000".to_string(),
            contact_email: None,
            delivery_method: DeliveryMethod::Courier,
            delivery_city: Some("Springfield".to_string()),
            delivery_address: Some("1 Main St".to_string()),
            delivery_cost: 0,
            discount_amount: 0,
            payment_method: PaymentMethod::Card,
            comment: None,
        }
    }

    #[test]
    fn new_order_derives_totals_from_items() {
        let items = vec![
            OrderItem::from_cart_line(&line(100, 3)).unwrap(),
            OrderItem::from_cart_line(&line(50, 2)).unwrap(),
        ];
        let order = Order::new(
            OrderId::new(),
            "ORD-20260831-AAAAAA".to_string(),
            None,
            ClientType::Retail,
            checkout(),
            items,
        );

        assert_eq!(order.status, OrderStatus::NewOrder);
        assert_eq!(order.total_amount, 400);
        assert_eq!(order.items_count, 5);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn item_subtotal_follows_snapshot_price_not_a_new_one() {
        let mut item = OrderItem::from_cart_line(&line(120, 2)).unwrap();
        assert_eq!(item.subtotal, 240);

        // The live product may have been repriced meanwhile; the snapshot wins.
        item.set_quantity(5).unwrap();
        assert_eq!(item.unit_price, 120);
        assert_eq!(item.subtotal, 600);
    }

    #[test]
    fn item_rejects_non_positive_quantity() {
        let mut item = OrderItem::from_cart_line(&line(10, 1)).unwrap();
        assert!(matches!(item.set_quantity(0), Err(DomainError::Validation(_))));
        assert!(OrderItem::from_cart_line(&line(10, 0)).is_err());
    }

    #[test]
    fn recompute_totals_tracks_the_item_set() {
        let mut order = Order::new(
            OrderId::new(),
            "ORD-20260831-BBBBBB".to_string(),
            None,
            ClientType::Retail,
            checkout(),
            vec![OrderItem::from_cart_line(&line(100, 1)).unwrap()],
        );

        order.items.push(OrderItem::from_cart_line(&line(30, 4)).unwrap());
        order.recompute_totals();

        assert_eq!(order.items_count, 5);
        assert_eq!(order.total_amount, 220);
    }

    #[test]
    fn creation_history_record_has_no_old_status() {
        let record = StatusHistoryRecord::creation(OrderId::new());
        assert_eq!(record.old_status, None);
        assert_eq!(record.new_status, OrderStatus::NewOrder);
        assert_eq!(record.source, ChangeSource::System);
        assert_eq!(record.changed_by, None);
    }

    #[test]
    fn items_edited_record_keeps_the_status_unchanged() {
        let record =
            StatusHistoryRecord::items_edited(OrderId::new(), OrderStatus::Processing, UserId::new());
        assert_eq!(record.old_status, Some(OrderStatus::Processing));
        assert_eq!(record.new_status, OrderStatus::Processing);
    }

    #[test]
    fn item_change_wire_format_is_kind_tagged() {
        let change = ItemChange::Add {
            product_id: ProductId::new(),
            quantity: 3,
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["kind"], "add");
        assert_eq!(json["quantity"], 3);

        let back: ItemChange = serde_json::from_value(json).unwrap();
        assert_eq!(back, change);
    }

    #[test]
    fn order_serializes_statuses_in_snake_case_and_round_trips() {
        let mut order = Order::new(
            OrderId::new(),
            "ORD-20260831-CCCCCC".to_string(),
            Some(UserId::new()),
            ClientType::Wholesale,
            checkout(),
            vec![OrderItem::from_cart_line(&line(100, 2)).unwrap()],
        );
        order.status = OrderStatus::NewOrder;
        order.cancellation_source = Some(ChangeSource::ClientAction);

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "new_order");
        assert_eq!(json["client_type"], "wholesale");
        assert_eq!(json["cancellation_source"], "client_action");

        let back: Order = serde_json::from_value(json).unwrap();
        assert_eq!(back, order);
    }
}
