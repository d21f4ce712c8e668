//! Coupon queries, including the guarded usage increment.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;
use uuid::Uuid;

use crate::domain::aggregates::{Coupon, DiscountType};
use crate::domain::value_objects::CouponCode;
use crate::EcommerceError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CouponRow {
    pub id: Uuid, pub code: String, pub discount_type: String, pub discount_value: Decimal,
    pub max_usage: Option<i32>, pub usage_count: i32, pub max_discount: Option<Decimal>,
    pub expires_at: Option<DateTime<Utc>>, pub is_active: bool,
    pub created_at: DateTime<Utc>, pub updated_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = EcommerceError;
    fn try_from(r: CouponRow) -> Result<Self, Self::Error> {
        let corrupt = |what: &str| EcommerceError::Corrupt(format!("coupon {}: {what}", r.id));
        Ok(Coupon {
            id: r.id,
            code: CouponCode::new(&r.code).map_err(|e| corrupt(&e.to_string()))?,
            discount_type: DiscountType::parse(&r.discount_type).ok_or_else(|| corrupt("unknown discount type"))?,
            discount_value: r.discount_value,
            max_usage: r.max_usage.map(|m| u32::try_from(m).unwrap_or(0)),
            usage_count: u32::try_from(r.usage_count).unwrap_or(0),
            max_discount: r.max_discount,
            expires_at: r.expires_at,
            is_active: r.is_active,
        })
    }
}

/// Column values shared by create and update.
#[derive(Debug, Clone)]
pub struct CouponFields<'a> {
    pub code: &'a str, pub discount_type: DiscountType, pub discount_value: Decimal,
    pub max_usage: Option<i32>, pub max_discount: Option<Decimal>,
    pub expires_at: Option<DateTime<Utc>>, pub is_active: bool,
}

#[instrument(skip(db))]
pub async fn list(db: &PgPool, limit: i64, offset: i64) -> Result<(Vec<CouponRow>, i64), sqlx::Error> {
    let coupons = sqlx::query_as::<_, CouponRow>("SELECT * FROM coupons ORDER BY created_at DESC LIMIT $1 OFFSET $2")
        .bind(limit).bind(offset).fetch_all(db).await?;
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM coupons").fetch_one(db).await?;
    Ok((coupons, total.0))
}

#[instrument(skip(db))]
pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<CouponRow>, sqlx::Error> {
    sqlx::query_as::<_, CouponRow>("SELECT * FROM coupons WHERE id = $1").bind(id).fetch_optional(db).await
}

#[instrument(skip(db, code), fields(code = code.as_str()))]
pub async fn find_by_code(db: &PgPool, code: &CouponCode) -> Result<Option<CouponRow>, sqlx::Error> {
    sqlx::query_as::<_, CouponRow>("SELECT * FROM coupons WHERE code = $1").bind(code.as_str()).fetch_optional(db).await
}

#[instrument(skip(db, f), fields(code = f.code))]
pub async fn insert(db: &PgPool, f: &CouponFields<'_>) -> Result<CouponRow, sqlx::Error> {
    sqlx::query_as::<_, CouponRow>("INSERT INTO coupons (id, code, discount_type, discount_value, max_usage, usage_count, max_discount, expires_at, is_active, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, 0, $6, $7, $8, NOW(), NOW()) RETURNING *")
        .bind(Uuid::now_v7()).bind(f.code).bind(f.discount_type.as_str()).bind(f.discount_value).bind(f.max_usage).bind(f.max_discount).bind(f.expires_at).bind(f.is_active)
        .fetch_one(db).await
}

#[instrument(skip(db, f), fields(code = f.code))]
pub async fn update(db: &PgPool, id: Uuid, f: &CouponFields<'_>) -> Result<Option<CouponRow>, sqlx::Error> {
    sqlx::query_as::<_, CouponRow>("UPDATE coupons SET code = $2, discount_type = $3, discount_value = $4, max_usage = $5, max_discount = $6, expires_at = $7, is_active = $8, updated_at = NOW() WHERE id = $1 RETURNING *")
        .bind(id).bind(f.code).bind(f.discount_type.as_str()).bind(f.discount_value).bind(f.max_usage).bind(f.max_discount).bind(f.expires_at).bind(f.is_active)
        .fetch_optional(db).await
}

#[instrument(skip(db))]
pub async fn deactivate(db: &PgPool, id: Uuid) -> Result<Option<CouponRow>, sqlx::Error> {
    sqlx::query_as::<_, CouponRow>("UPDATE coupons SET is_active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING *").bind(id).fetch_optional(db).await
}

/// Increments `usage_count` only if the coupon is still redeemable at `now`.
/// `None` means the guard failed: another request took the last use, or the
/// coupon was deactivated or expired since it was read.
#[instrument(skip(tx))]
pub async fn redeem(tx: &mut Transaction<'_, Postgres>, id: Uuid, now: DateTime<Utc>) -> Result<Option<CouponRow>, sqlx::Error> {
    sqlx::query_as::<_, CouponRow>(
        "UPDATE coupons SET usage_count = usage_count + 1, updated_at = NOW() \
         WHERE id = $1 AND is_active AND (max_usage IS NULL OR usage_count < max_usage) AND (expires_at IS NULL OR expires_at > $2) \
         RETURNING *")
        .bind(id).bind(now).fetch_optional(&mut **tx).await
}

#[instrument(skip(tx))]
pub async fn find_in(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Option<CouponRow>, sqlx::Error> {
    sqlx::query_as::<_, CouponRow>("SELECT * FROM coupons WHERE id = $1").bind(id).fetch_optional(&mut **tx).await
}
