//! Order placement, listing and admin status changes

use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::{page_window, AppState, PaginatedResponse};
use crate::db::{self, orders::{OrderDetail, OrderRow}};
use crate::domain::aggregates::coupon as rules;
use crate::domain::aggregates::{Address, AppliedCoupon, CartItem, Coupon, CouponRejection, LineItem, Order, OrderStatus};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::pricing::{PriceCategory, PrintConfiguration};
use crate::domain::value_objects::CouponCode;
use crate::{EcommerceError, Result};

pub fn new_order_number() -> String { format!("PRN-{:08}", rand::random::<u32>() % 100_000_000) }

#[derive(Debug, Serialize, Deserialize)] pub struct OrderItemRequest { pub product_id: Uuid, pub configuration: PrintConfiguration }

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(email)]
    pub customer_email: String,
    #[validate(length(min = 1, max = 50))]
    pub items: Vec<OrderItemRequest>,
    pub coupon_code: Option<String>,
    #[validate]
    pub shipping_address: Option<Address>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Loads the product behind a configured item and checks the item is one it sells.
pub(crate) async fn product_for(s: &AppState, product_id: Uuid, configuration: &PrintConfiguration) -> Result<db::products::Product> {
    let product = s.read("get_product", || db::products::find_active(&s.db, product_id)).await?.ok_or(EcommerceError::NotFound("product"))?;
    if PriceCategory::parse(&product.price_category) != Some(configuration.category) {
        return Err(EcommerceError::Validation(format!("product {} is not sold as {}", product.sku, configuration.category.as_str())));
    }
    Ok(product)
}

/// Looks the coupon up and evaluates it against `subtotal`.
async fn resolve_coupon(s: &AppState, code: &str, subtotal: Decimal, now: DateTime<Utc>) -> Result<AppliedCoupon> {
    let normalized = CouponCode::new(code).map_err(|_| CouponRejection::NotFound)?;
    let coupon = s.read("find_coupon", || db::coupons::find_by_code(&s.db, &normalized)).await?.map(Coupon::try_from).transpose()?;
    let discount = rules::evaluate(code, subtotal, coupon.as_ref(), now).into_result()?;
    let coupon = coupon.ok_or(CouponRejection::NotFound)?;
    Ok(AppliedCoupon { id: coupon.id, code: coupon.code, discount })
}

/// Prices, discounts and persists `order`. The coupon use is claimed with a
/// guarded increment in the same transaction as the order insert, so a
/// coupon can never be used more than `max_usage` times. When `from_cart`
/// is given, the ordered cart items are removed in the same transaction.
pub(crate) async fn place_order(s: &AppState, mut order: Order, coupon_code: Option<&str>, from_cart: Option<(&str, &[CartItem])>) -> Result<OrderDetail> {
    let now = Utc::now();
    let applied = match coupon_code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => Some(resolve_coupon(s, code, order.subtotal(), now).await?),
        None => None,
    };
    order.place(applied, &s.checkout.fees)?;

    let mut tx = s.db.begin().await?;
    if let Some(c) = order.coupon() {
        if db::coupons::redeem(&mut tx, c.id, now).await?.is_none() {
            let current = db::coupons::find_in(&mut tx, c.id).await?.map(Coupon::try_from).transpose()?;
            let reason = rules::redemption_failure(current.as_ref(), now);
            warn!(code = %c.code, ?reason, "coupon lost redemption race");
            return Err(reason.into());
        }
    }
    let detail = db::orders::insert(&mut tx, &order).await?;
    if let Some((session, items)) = from_cart {
        db::carts::remove_ordered_in(&mut tx, session, items).await?;
    }
    tx.commit().await?;

    let t = order.totals();
    info!(order_number = order.order_number(), subtotal = %t.subtotal, discount = %t.discount, total = %t.total, "order placed");
    s.publish(order.take_events()).await;
    Ok(detail)
}

pub async fn create_order(State(s): State<AppState>, Json(r): Json<CreateOrderRequest>) -> Result<(StatusCode, Json<OrderDetail>)> {
    r.validate()?;
    let currency = s.checkout.currency.clone();
    let mut order = Order::create(new_order_number(), r.customer_email.trim().to_lowercase(), &currency)
        .with_shipping_address(r.shipping_address)
        .with_notes(r.notes);
    for item in r.items {
        crate::domain::pricing::validate(&item.configuration)?;
        let product = product_for(&s, item.product_id, &item.configuration).await?;
        order.add_item(LineItem::priced(Some(product.id), product.name, item.configuration, &currency)?)?;
    }
    let detail = place_order(&s, order, r.coupon_code.as_deref(), None).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[derive(Debug, Deserialize)] pub struct OrderListParams { pub page: Option<u32>, pub per_page: Option<u32>, pub status: Option<String>, pub customer_email: Option<String> }

pub async fn list_orders(State(s): State<AppState>, Query(p): Query<OrderListParams>) -> Result<Json<PaginatedResponse<OrderRow>>> {
    let (page, per_page, offset) = page_window(p.page, p.per_page);
    let status = match p.status.as_deref() {
        None | Some("") => None,
        Some(v) => Some(OrderStatus::parse(v).ok_or_else(|| EcommerceError::Validation(format!("unknown order status {v:?}")))?),
    };
    let email = p.customer_email.as_deref().map(|e| e.trim().to_lowercase());
    let (data, total) = s.read("list_orders", || db::orders::list(&s.db, i64::from(per_page), offset, status, email.as_deref())).await?;
    Ok(Json(PaginatedResponse { data, total, page, per_page }))
}

pub async fn get_order(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<OrderDetail>> {
    s.read("get_order", || db::orders::find(&s.db, id)).await?.map(Json).ok_or(EcommerceError::NotFound("order"))
}

#[derive(Debug, Deserialize)] pub struct UpdateStatusRequest { pub status: OrderStatus }

pub async fn update_status(State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<UpdateStatusRequest>) -> Result<Json<OrderRow>> {
    let current = s.read("get_order_status", || db::orders::current_status(&s.db, id)).await?.ok_or(EcommerceError::NotFound("order"))?;
    let from = OrderStatus::parse(&current).ok_or_else(|| EcommerceError::Corrupt(format!("order {id} has status {current:?}")))?;
    let to = from.transition_to(r.status)?;
    let row = db::orders::update_status(&s.db, id, from, to).await?
        .ok_or_else(|| EcommerceError::Conflict("order status changed concurrently; reload and retry".into()))?;
    info!(order_number = %row.order_number, %from, %to, "order status changed");
    s.publish(vec![DomainEvent::Order(OrderEvent::StatusChanged { order_id: id, from, to })]).await;
    Ok(Json(row))
}
