//! Order queries

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;
use uuid::Uuid;

use crate::domain::aggregates::{Address, Order, OrderStatus};
use crate::domain::pricing::PrintConfiguration;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderRow {
    pub id: Uuid, pub order_number: String, pub customer_email: String, pub status: String, pub currency: String,
    pub subtotal: Decimal, pub discount: Decimal, pub shipping: Decimal, pub tax: Decimal, pub total: Decimal,
    pub coupon_id: Option<Uuid>, pub coupon_code: Option<String>,
    pub shipping_address: Option<Json<Address>>, pub notes: Option<String>,
    pub created_at: DateTime<Utc>, pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItemRow {
    pub id: Uuid, pub order_id: Uuid, pub product_id: Option<Uuid>, pub name: String,
    pub configuration: Json<PrintConfiguration>, pub quantity: i32, pub unit_price: Decimal, pub total: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderRow,
    pub items: Vec<OrderItemRow>,
}

#[instrument(skip(db))]
pub async fn list(db: &PgPool, limit: i64, offset: i64, status: Option<OrderStatus>, customer_email: Option<&str>) -> Result<(Vec<OrderRow>, i64), sqlx::Error> {
    let status = status.map(|s| s.as_str());
    let orders = sqlx::query_as::<_, OrderRow>(
        "SELECT * FROM orders WHERE ($3::text IS NULL OR status = $3) AND ($4::text IS NULL OR customer_email = $4) ORDER BY created_at DESC LIMIT $1 OFFSET $2")
        .bind(limit).bind(offset).bind(status).bind(customer_email).fetch_all(db).await?;
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE ($1::text IS NULL OR status = $1) AND ($2::text IS NULL OR customer_email = $2)")
        .bind(status).bind(customer_email).fetch_one(db).await?;
    Ok((orders, total.0))
}

#[instrument(skip(db))]
pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<OrderDetail>, sqlx::Error> {
    let Some(order) = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(db).await? else {
        return Ok(None);
    };
    let items = sqlx::query_as::<_, OrderItemRow>("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id").bind(id).fetch_all(db).await?;
    Ok(Some(OrderDetail { order, items }))
}

/// Writes a placed order and its items inside `tx`.
#[instrument(skip(tx, order), fields(order_number = order.order_number()))]
pub async fn insert(tx: &mut Transaction<'_, Postgres>, order: &Order) -> Result<OrderDetail, sqlx::Error> {
    let t = order.totals();
    let coupon = order.coupon();
    let row = sqlx::query_as::<_, OrderRow>("INSERT INTO orders (id, order_number, customer_email, status, currency, subtotal, discount, shipping, tax, total, coupon_id, coupon_code, shipping_address, notes, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $15) RETURNING *")
        .bind(order.id()).bind(order.order_number()).bind(order.customer_email()).bind(order.status().as_str()).bind(order.currency())
        .bind(t.subtotal).bind(t.discount).bind(t.shipping).bind(t.tax).bind(t.total)
        .bind(coupon.map(|c| c.id)).bind(coupon.map(|c| c.code.as_str()))
        .bind(order.shipping_address().map(Json)).bind(order.notes()).bind(order.created_at())
        .fetch_one(&mut **tx).await?;
    let mut items = Vec::with_capacity(order.items().len());
    for i in order.items() {
        let item = sqlx::query_as::<_, OrderItemRow>("INSERT INTO order_items (id, order_id, product_id, name, configuration, quantity, unit_price, total) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *")
            .bind(i.id).bind(order.id()).bind(i.product_id).bind(&i.name).bind(Json(&i.configuration))
            .bind(i32::try_from(i.quantity()).unwrap_or(i32::MAX)).bind(i.unit_price.amount()).bind(i.total.amount())
            .fetch_one(&mut **tx).await?;
        items.push(item);
    }
    Ok(OrderDetail { order: row, items })
}

/// Moves an order from `from` to `to`. Returns `None` when the order is gone
/// or its status is no longer `from`.
#[instrument(skip(db))]
pub async fn update_status(db: &PgPool, id: Uuid, from: OrderStatus, to: OrderStatus) -> Result<Option<OrderRow>, sqlx::Error> {
    sqlx::query_as::<_, OrderRow>("UPDATE orders SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2 RETURNING *")
        .bind(id).bind(from.as_str()).bind(to.as_str()).fetch_optional(db).await
}

#[instrument(skip(db))]
pub async fn current_status(db: &PgPool, id: Uuid) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as("SELECT status FROM orders WHERE id = $1").bind(id).fetch_optional(db).await?;
    Ok(row.map(|r| r.0))
}
