//! Session cart and checkout

use axum::{extract::{Path, State}, http::StatusCode, Json};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::orders::{new_order_number, place_order, product_for};
use super::AppState;
use crate::db::{self, orders::OrderDetail};
use crate::domain::aggregates::{Address, Cart, CartChange, CartItem, CartLine};
use crate::domain::pricing::{self, PrintConfiguration};
use crate::{EcommerceError, Result};

#[derive(Debug, Serialize)]
pub struct CartResponse { pub session_id: String, pub currency: String, pub items: Vec<CartLine>, pub subtotal: Decimal }

impl TryFrom<&Cart> for CartResponse {
    type Error = EcommerceError;
    fn try_from(cart: &Cart) -> Result<Self> {
        Ok(Self {
            session_id: cart.session_id().to_string(),
            currency: cart.subtotal().currency().to_string(),
            items: cart.lines()?,
            subtotal: cart.subtotal().amount(),
        })
    }
}

fn check_session(session: &str) -> Result<()> {
    if session.is_empty() || session.len() > 128 || !session.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(EcommerceError::Validation("session id must be 1-128 letters, digits, '-' or '_'".into()));
    }
    Ok(())
}

async fn load_cart(s: &AppState, session: &str) -> Result<Cart> {
    let items = s.read("get_cart", || db::carts::items(&s.db, session)).await?;
    Ok(Cart::restore(session, &s.checkout.currency, items)?)
}

pub async fn get_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<CartResponse>> {
    check_session(&session)?;
    let cart = load_cart(&s, &session).await?;
    Ok(Json(CartResponse::try_from(&cart)?))
}

#[derive(Debug, Deserialize)] pub struct AddToCartRequest { pub product_id: Uuid, pub configuration: PrintConfiguration }

pub async fn add_to_cart(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<AddToCartRequest>) -> Result<(StatusCode, Json<CartResponse>)> {
    check_session(&session)?;
    pricing::quote(&r.configuration)?;
    let product = product_for(&s, r.product_id, &r.configuration).await?;
    let mut cart = load_cart(&s, &session).await?;
    let item = CartItem { id: Uuid::now_v7(), product_id: product.id, name: product.name, configuration: r.configuration, added_at: Utc::now() };
    match cart.add_item(item)? {
        CartChange::Added(id) => {
            if let Some(added) = cart.items().iter().find(|i| i.id == id) {
                db::carts::insert(&s.db, &session, added).await?;
            }
        }
        CartChange::Merged { item_id, .. } => {
            if let Some(merged) = cart.items().iter().find(|i| i.id == item_id) {
                db::carts::update_configuration(&s.db, &session, item_id, &merged.configuration).await?;
            }
        }
    }
    Ok((StatusCode::CREATED, Json(CartResponse::try_from(&cart)?)))
}

pub async fn remove_cart_item(State(s): State<AppState>, Path((session, item_id)): Path<(String, Uuid)>) -> Result<StatusCode> {
    check_session(&session)?;
    if !db::carts::remove(&s.db, &session, item_id).await? { return Err(EcommerceError::NotFound("cart item")); }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<StatusCode> {
    check_session(&session)?;
    db::carts::clear(&s.db, &session).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    pub session_id: String,
    #[validate(email)]
    pub customer_email: String,
    pub coupon_code: Option<String>,
    #[validate]
    pub shipping_address: Option<Address>,
    /// Saved address to ship to when `shipping_address` is absent.
    pub address_id: Option<Uuid>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Turns the session cart into an order and removes the ordered items.
pub async fn checkout(State(s): State<AppState>, Json(r): Json<CheckoutRequest>) -> Result<(StatusCode, Json<OrderDetail>)> {
    r.validate()?;
    check_session(&r.session_id)?;
    let email = r.customer_email.trim().to_lowercase();
    let address = match (r.shipping_address, r.address_id) {
        (Some(a), _) => Some(a),
        (None, Some(id)) => Some(
            s.read("get_address", || db::addresses::find(&s.db, &email, id)).await?.map(Address::from).ok_or(EcommerceError::NotFound("address"))?,
        ),
        (None, None) => None,
    };
    let cart = load_cart(&s, &r.session_id).await?;
    let (order, consumed) = cart.checkout(new_order_number(), email)?;
    let order = order.with_shipping_address(address).with_notes(r.notes);
    let detail = place_order(&s, order, r.coupon_code.as_deref(), Some((r.session_id.as_str(), consumed.as_slice()))).await?;
    info!(session = %r.session_id, order_number = %detail.order.order_number, "cart checked out");
    Ok((StatusCode::CREATED, Json(detail)))
}
