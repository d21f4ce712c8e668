//! Coupon administration and validation

use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{conflict_on_duplicate, page_window, AppState, PageParams, PaginatedResponse};
use crate::db::coupons::{self, CouponFields, CouponRow};
use crate::domain::aggregates::coupon::{self as rules, Coupon, CouponEvaluation, DiscountType};
use crate::domain::value_objects::CouponCode;
use crate::{EcommerceError, Result};

fn active_by_default() -> bool { true }

#[derive(Debug, Deserialize, Validate)]
pub struct CouponRequest {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub max_usage: Option<u32>,
    pub max_discount: Option<Decimal>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

impl CouponRequest {
    fn checked(&self) -> Result<CouponCode> {
        self.validate()?;
        rules::validate_terms(self.discount_type, self.discount_value, self.max_discount, self.max_usage)?;
        if self.max_usage.is_some_and(|m| m > i32::MAX as u32) {
            return Err(EcommerceError::Validation("max_usage too large".into()));
        }
        CouponCode::new(&self.code).map_err(|e| EcommerceError::Validation(e.to_string()))
    }

    fn fields<'a>(&'a self, code: &'a CouponCode) -> CouponFields<'a> {
        CouponFields {
            code: code.as_str(), discount_type: self.discount_type, discount_value: self.discount_value,
            max_usage: self.max_usage.map(|m| m as i32), max_discount: self.max_discount,
            expires_at: self.expires_at, is_active: self.is_active,
        }
    }
}

pub async fn list_coupons(State(s): State<AppState>, Query(p): Query<PageParams>) -> Result<Json<PaginatedResponse<CouponRow>>> {
    let (page, per_page, offset) = page_window(p.page, p.per_page);
    let (data, total) = s.read("list_coupons", || coupons::list(&s.db, i64::from(per_page), offset)).await?;
    Ok(Json(PaginatedResponse { data, total, page, per_page }))
}

pub async fn get_coupon(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CouponRow>> {
    s.read("get_coupon", || coupons::find(&s.db, id)).await?.map(Json).ok_or(EcommerceError::NotFound("coupon"))
}

pub async fn create_coupon(State(s): State<AppState>, Json(r): Json<CouponRequest>) -> Result<(StatusCode, Json<CouponRow>)> {
    let code = r.checked()?;
    let c = coupons::insert(&s.db, &r.fields(&code)).await.map_err(|e| conflict_on_duplicate(e, "coupon code"))?;
    info!(coupon_id = %c.id, code = %c.code, "coupon created");
    Ok((StatusCode::CREATED, Json(c)))
}

pub async fn update_coupon(State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<CouponRequest>) -> Result<Json<CouponRow>> {
    let code = r.checked()?;
    let existing = s.read("get_coupon", || coupons::find(&s.db, id)).await?.ok_or(EcommerceError::NotFound("coupon"))?;
    if r.max_usage.is_some_and(|m| i64::from(m) < i64::from(existing.usage_count)) {
        return Err(EcommerceError::Validation(format!("max_usage is below the {} uses already made", existing.usage_count)));
    }
    let c = coupons::update(&s.db, id, &r.fields(&code)).await
        .map_err(|e| conflict_on_duplicate(e, "coupon code"))?
        .ok_or(EcommerceError::NotFound("coupon"))?;
    info!(coupon_id = %c.id, code = %c.code, "coupon updated");
    Ok(Json(c))
}

pub async fn deactivate_coupon(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CouponRow>> {
    let c = coupons::deactivate(&s.db, id).await?.ok_or(EcommerceError::NotFound("coupon"))?;
    info!(coupon_id = %c.id, code = %c.code, "coupon deactivated");
    Ok(Json(c))
}

#[derive(Debug, Deserialize)] pub struct ValidateCouponRequest { pub code: String, pub subtotal: Decimal }

/// Reports whether `code` would apply to `subtotal` right now. Does not redeem.
pub async fn validate_coupon(State(s): State<AppState>, Json(r): Json<ValidateCouponRequest>) -> Result<Json<CouponEvaluation>> {
    if r.subtotal < Decimal::ZERO { return Err(EcommerceError::Validation("subtotal cannot be negative".into())); }
    let coupon = match CouponCode::new(&r.code) {
        Ok(code) => s.read("find_coupon", || coupons::find_by_code(&s.db, &code)).await?.map(Coupon::try_from).transpose()?,
        Err(_) => None,
    };
    Ok(Json(rules::evaluate(&r.code, r.subtotal, coupon.as_ref(), Utc::now())))
}
