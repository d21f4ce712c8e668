//! Product catalog queries

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid, pub sku: String, pub name: String, pub description: Option<String>,
    pub price_category: String, pub base_price: Decimal, pub currency: String,
    pub category_id: Option<Uuid>, pub status: String,
    pub images: Vec<String>, pub tags: Vec<String>,
    pub created_at: DateTime<Utc>, pub updated_at: DateTime<Utc>,
}

/// Column values shared by create and update.
#[derive(Debug, Clone)]
pub struct ProductFields<'a> {
    pub sku: &'a str, pub name: &'a str, pub description: Option<&'a str>,
    pub price_category: &'a str, pub base_price: Decimal, pub category_id: Option<Uuid>,
    pub images: &'a [String], pub tags: &'a [String],
}

#[instrument(skip(db))]
pub async fn list_active(db: &PgPool, limit: i64, offset: i64, category: Option<Uuid>, search: Option<&str>) -> Result<(Vec<Product>, i64), sqlx::Error> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE status = 'active' AND ($3::uuid IS NULL OR category_id = $3) AND ($4::text IS NULL OR name ILIKE '%' || $4 || '%') ORDER BY created_at DESC LIMIT $1 OFFSET $2")
        .bind(limit).bind(offset).bind(category).bind(search).fetch_all(db).await?;
    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM products WHERE status = 'active' AND ($1::uuid IS NULL OR category_id = $1) AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')")
        .bind(category).bind(search).fetch_one(db).await?;
    Ok((products, total.0))
}

#[instrument(skip(db))]
pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND status <> 'deleted'").bind(id).fetch_optional(db).await
}

#[instrument(skip(db))]
pub async fn find_active(db: &PgPool, id: Uuid) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND status = 'active'").bind(id).fetch_optional(db).await
}

#[instrument(skip(db, f), fields(sku = f.sku))]
pub async fn insert(db: &PgPool, f: &ProductFields<'_>, currency: &str) -> Result<Product, sqlx::Error> {
    sqlx::query_as::<_, Product>("INSERT INTO products (id, sku, name, description, price_category, base_price, currency, category_id, status, images, tags, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'active', $9, $10, NOW(), NOW()) RETURNING *")
        .bind(Uuid::now_v7()).bind(f.sku).bind(f.name).bind(f.description).bind(f.price_category).bind(f.base_price).bind(currency).bind(f.category_id).bind(f.images).bind(f.tags)
        .fetch_one(db).await
}

#[instrument(skip(db, f), fields(sku = f.sku))]
pub async fn update(db: &PgPool, id: Uuid, f: &ProductFields<'_>) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>("UPDATE products SET sku = $2, name = $3, description = $4, price_category = $5, base_price = $6, category_id = $7, images = $8, tags = $9, updated_at = NOW() WHERE id = $1 AND status <> 'deleted' RETURNING *")
        .bind(id).bind(f.sku).bind(f.name).bind(f.description).bind(f.price_category).bind(f.base_price).bind(f.category_id).bind(f.images).bind(f.tags)
        .fetch_optional(db).await
}

/// Soft delete; returns false when no live product matched.
#[instrument(skip(db))]
pub async fn mark_deleted(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let r = sqlx::query("UPDATE products SET status = 'deleted', updated_at = NOW() WHERE id = $1 AND status <> 'deleted'").bind(id).execute(db).await?;
    Ok(r.rows_affected() > 0)
}
