//! Cart Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::order::{LineItem, Order, OrderError};
use crate::domain::pricing::{self, PriceQuote, PricingError, PrintConfiguration};
use crate::domain::value_objects::Money;

#[derive(Clone, Debug)]
pub struct Cart {
    session_id: String,
    items: Vec<CartItem>,
    subtotal: Money,
    currency: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub configuration: PrintConfiguration,
    pub added_at: DateTime<Utc>,
}

/// A cart item with its current price.
#[derive(Clone, Debug, Serialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CartItem,
    pub quote: PriceQuote,
}

/// What `add_item` did to the cart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartChange {
    Added(Uuid),
    /// Same product and configuration already present; its quantity grew.
    Merged { item_id: Uuid, quantity: u32 },
}

impl Cart {
    pub fn new(session_id: impl Into<String>, currency: &str) -> Self {
        Self { session_id: session_id.into(), items: vec![], subtotal: Money::zero(currency), currency: currency.to_string() }
    }

    /// Rebuilds a cart from stored items, re-pricing each one.
    pub fn restore(session_id: impl Into<String>, currency: &str, items: Vec<CartItem>) -> Result<Self, PricingError> {
        let mut cart = Self::new(session_id, currency);
        cart.items = items;
        cart.recalculate()?;
        Ok(cart)
    }

    pub fn session_id(&self) -> &str { &self.session_id }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn subtotal(&self) -> &Money { &self.subtotal }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn lines(&self) -> Result<Vec<CartLine>, PricingError> {
        self.items.iter().map(|i| Ok(CartLine { item: i.clone(), quote: pricing::quote(&i.configuration)? })).collect()
    }

    pub fn add_item(&mut self, item: CartItem) -> Result<CartChange, PricingError> {
        pricing::quote(&item.configuration)?;
        let same = |i: &&mut CartItem| {
            i.product_id == item.product_id
                && PrintConfiguration { quantity: item.configuration.quantity, ..i.configuration.clone() } == item.configuration
        };
        let change = if let Some(existing) = self.items.iter_mut().find(same) {
            let quantity = existing.configuration.quantity.saturating_add(item.configuration.quantity);
            if quantity > pricing::MAX_QUANTITY {
                return Err(PricingError::Validation(format!("quantity must be between 1 and {}", pricing::MAX_QUANTITY)));
            }
            existing.configuration.quantity = quantity;
            CartChange::Merged { item_id: existing.id, quantity }
        } else {
            let id = item.id;
            self.items.push(item);
            CartChange::Added(id)
        };
        self.recalculate()?;
        Ok(change)
    }

    pub fn remove_item(&mut self, item_id: Uuid) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.id != item_id);
        if self.items.len() == before { return Err(CartError::ItemNotFound); }
        self.recalculate().map_err(CartError::Pricing)
    }

    pub fn clear(&mut self) { self.items.clear(); self.subtotal = Money::zero(&self.currency); }

    /// Builds the order for this cart and returns it with the items it was
    /// built from. Only those items, as they were priced, may be removed from
    /// storage once the order is saved.
    pub fn checkout(&self, order_number: impl Into<String>, customer_email: impl Into<String>) -> Result<(Order, Vec<CartItem>), CartError> {
        let order = self.to_order(order_number, customer_email)?;
        Ok((order, self.items.clone()))
    }

    /// Copies every item into a fresh order.
    pub fn to_order(&self, order_number: impl Into<String>, customer_email: impl Into<String>) -> Result<Order, CartError> {
        if self.is_empty() { return Err(CartError::Empty); }
        let mut order = Order::create(order_number, customer_email, &self.currency);
        for i in &self.items {
            let line = LineItem::priced(Some(i.product_id), i.name.clone(), i.configuration.clone(), &self.currency).map_err(CartError::Pricing)?;
            order.add_item(line).map_err(CartError::Order)?;
        }
        Ok(order)
    }

    fn recalculate(&mut self) -> Result<(), PricingError> {
        let total: Decimal = self.items.iter().map(|i| pricing::quote(&i.configuration).map(|q| q.line_total)).sum::<Result<Decimal, _>>()?;
        self.subtotal = Money::new(total, &self.currency);
        Ok(())
    }
}

#[derive(Debug, Clone)] pub enum CartError { ItemNotFound, Empty, Pricing(PricingError), Order(OrderError) }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotFound => write!(f, "Item not found"),
            Self::Empty => write!(f, "Cart is empty"),
            Self::Pricing(e) => write!(f, "{e}"),
            Self::Order(e) => write!(f, "{e}"),
        }
    }
}
