//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::events::{CouponEvent, DomainEvent, OrderEvent};
use crate::domain::pricing::{self, PricingError, PrintConfiguration};
use crate::domain::totals::{self, FeeSchedule, OrderTotals};
use crate::domain::value_objects::{CouponCode, Money};

#[derive(Clone, Debug)]
pub struct Order {
    id: Uuid,
    order_number: String,
    customer_email: String,
    status: OrderStatus,
    currency: String,
    items: Vec<LineItem>,
    coupon: Option<AppliedCoupon>,
    totals: OrderTotals,
    shipping_address: Option<Address>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug)] pub struct AppliedCoupon { pub id: Uuid, pub code: CouponCode, pub discount: Decimal }

#[derive(Clone, Debug)]
pub struct LineItem {
    pub id: Uuid,
    pub product_id: Option<Uuid>,
    pub name: String,
    pub configuration: PrintConfiguration,
    pub unit_price: Money,
    pub total: Money,
}

impl LineItem {
    /// Prices `configuration` against the static tables.
    pub fn priced(product_id: Option<Uuid>, name: impl Into<String>, configuration: PrintConfiguration, currency: &str) -> Result<Self, PricingError> {
        let quote = pricing::quote(&configuration)?;
        Ok(Self {
            id: Uuid::now_v7(), product_id, name: name.into(), configuration,
            unit_price: Money::new(quote.unit_price, currency), total: Money::new(quote.line_total, currency),
        })
    }
    pub fn quantity(&self) -> u32 { self.configuration.quantity }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Address {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub line1: String,
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub state: String,
    #[validate(length(min = 3, max = 12))]
    pub postal_code: String,
    #[validate(length(min = 2, max = 56))]
    pub country: String,
    pub phone: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus { #[default] PendingReview, Accepted, Rejected, Processing, Shipped, Delivered, Cancelled }

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        Self::PendingReview, Self::Accepted, Self::Rejected, Self::Processing, Self::Shipped, Self::Delivered, Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingReview => "pending_review",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> { Self::ALL.into_iter().find(|s| s.as_str() == value) }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (PendingReview, Accepted | Rejected | Cancelled)
                | (Accepted, Processing | Cancelled)
                | (Processing, Shipped | Cancelled)
                | (Shipped, Delivered)
        )
    }

    pub fn transition_to(self, next: OrderStatus) -> Result<OrderStatus, OrderError> {
        if self.can_transition_to(next) { Ok(next) } else { Err(OrderError::InvalidTransition { from: self, to: next }) }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

impl Order {
    pub fn create(order_number: impl Into<String>, customer_email: impl Into<String>, currency: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(), order_number: order_number.into(), customer_email: customer_email.into(),
            status: OrderStatus::PendingReview, currency: currency.to_string(), items: vec![], coupon: None,
            totals: OrderTotals::default(), shipping_address: None, notes: None,
            created_at: now, events: vec![],
        }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn order_number(&self) -> &str { &self.order_number }
    pub fn customer_email(&self) -> &str { &self.customer_email }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn coupon(&self) -> Option<&AppliedCoupon> { self.coupon.as_ref() }
    pub fn totals(&self) -> &OrderTotals { &self.totals }
    pub fn shipping_address(&self) -> Option<&Address> { self.shipping_address.as_ref() }
    pub fn notes(&self) -> Option<&str> { self.notes.as_deref() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    pub fn with_shipping_address(mut self, address: Option<Address>) -> Self { self.shipping_address = address; self }
    pub fn with_notes(mut self, notes: Option<String>) -> Self { self.notes = notes; self }

    pub fn add_item(&mut self, item: LineItem) -> Result<(), OrderError> {
        if item.total.currency() != self.currency { return Err(OrderError::CurrencyMismatch); }
        self.items.push(item);
        self.recalculate(&FeeSchedule::default());
        Ok(())
    }

    pub fn subtotal(&self) -> Decimal { self.items.iter().map(|i| i.total.amount()).sum() }

    /// Fixes the totals with the given coupon and fees and raises `Created`.
    pub fn place(&mut self, coupon: Option<AppliedCoupon>, fees: &FeeSchedule) -> Result<&OrderTotals, OrderError> {
        if self.items.is_empty() { return Err(OrderError::NoItems); }
        self.coupon = coupon;
        self.recalculate(fees);
        self.raise_event(DomainEvent::Order(OrderEvent::Created {
            order_id: self.id, order_number: self.order_number.clone(),
            customer_email: self.customer_email.clone(), total: self.totals.total,
        }));
        if let Some(c) = &self.coupon {
            let event = CouponEvent::Redeemed { coupon_id: c.id, code: c.code.to_string(), order_id: self.id, discount: self.totals.discount };
            self.raise_event(DomainEvent::Coupon(event));
        }
        Ok(&self.totals)
    }

    fn recalculate(&mut self, fees: &FeeSchedule) {
        let discount = self.coupon.as_ref().map_or(Decimal::ZERO, |c| c.discount);
        self.totals = totals::assemble(self.subtotal(), discount, fees);
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OrderError { NoItems, CurrencyMismatch, InvalidTransition { from: OrderStatus, to: OrderStatus } }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoItems => write!(f, "order has no items"),
            Self::CurrencyMismatch => write!(f, "line item currency differs from order currency"),
            Self::InvalidTransition { from, to } => write!(f, "cannot move order from {from} to {to}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing::{Binding, PriceCategory};
    use rust_decimal_macros::dec;

    fn booklet(pages: u32, copies: u32) -> PrintConfiguration {
        let mut c = PrintConfiguration::defaults_for(PriceCategory::BookPrintouts);
        c.page_count = pages;
        c.quantity = copies;
        c.binding = Binding::Staple;
        c
    }

    #[test]
    fn test_order_workflow() {
        let mut order = Order::create("PRN-1001", "test@example.com", "INR");
        // 1.50 * 20 + 5 = 35 per copy
        order.add_item(LineItem::priced(None, "Booklet", booklet(20, 2), "INR").unwrap()).unwrap();
        assert_eq!(order.subtotal(), dec!(70));
        order.place(None, &FeeSchedule::default()).unwrap();
        assert_eq!(order.status(), OrderStatus::PendingReview);
        let events = order.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], DomainEvent::Order(OrderEvent::Created { .. })));
    }

    #[test]
    fn happy_path_reaches_delivered() {
        use OrderStatus::*;
        let mut status = PendingReview;
        for next in [Accepted, Processing, Shipped, Delivered] {
            status = status.transition_to(next).unwrap();
        }
        assert_eq!(status, Delivered);
    }

    #[test]
    fn coupon_discount_flows_into_totals() {
        let mut order = Order::create("PRN-1002", "a@b.in", "INR");
        order.add_item(LineItem::priced(None, "Booklet", booklet(100, 10), "INR").unwrap()).unwrap();
        let applied = AppliedCoupon { id: Uuid::nil(), code: CouponCode::new("BULK").unwrap(), discount: dec!(150) };
        let totals = order.place(Some(applied), &FeeSchedule::default()).unwrap().clone();
        assert_eq!(totals.subtotal, dec!(1550));
        assert_eq!(totals.total, dec!(1400));
        assert!(order.take_events().iter().any(|e| matches!(e, DomainEvent::Coupon(_))));
    }

    #[test]
    fn empty_order_cannot_be_placed() {
        let mut order = Order::create("PRN-1003", "a@b.in", "INR");
        assert_eq!(order.place(None, &FeeSchedule::default()).unwrap_err(), OrderError::NoItems);
    }

    #[test]
    fn lifecycle_rejects_skips_and_terminal_moves() {
        use OrderStatus::*;
        assert!(PendingReview.can_transition_to(Rejected));
        assert!(!PendingReview.can_transition_to(Shipped));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Shipped.can_transition_to(Cancelled));
        assert_eq!(Rejected.transition_to(Accepted), Err(OrderError::InvalidTransition { from: Rejected, to: Accepted }));
        for s in [Rejected, Delivered, Cancelled] {
            assert!(OrderStatus::ALL.iter().all(|n| !s.can_transition_to(*n)));
        }
    }

    #[test]
    fn status_strings_round_trip() {
        for s in OrderStatus::ALL { assert_eq!(OrderStatus::parse(s.as_str()), Some(s)); }
        assert_eq!(OrderStatus::parse("pending"), None);
    }
}
