//! Print-on-demand commerce service
//!
//! Backend for a print shop selling configurable printouts and maps.
//!
//! ## Features
//! - Product catalog and categories
//! - Table-driven print pricing (size, paper, color, sides, binding, lamination)
//! - Session carts and checkout
//! - Coupons with usage limits, expiry and discount caps
//! - Order review lifecycle
//! - Saved customer addresses

pub mod api;
pub mod config;
pub mod db;
pub mod domain;

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use thiserror::Error;

use domain::aggregates::{CartError, CouponRejection, CouponTermsError, OrderError};
use domain::pricing::PricingError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum EcommerceError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Coupon(#[from] CouponRejection),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("{0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, EcommerceError>;

impl EcommerceError {
    /// Machine-readable code sent as `error` in response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation_error",
            Self::Pricing(PricingError::NotFound { .. }) => "unpriced_configuration",
            Self::Pricing(PricingError::Validation(_)) => "validation_error",
            Self::Coupon(CouponRejection::NotFound) => "coupon_not_found",
            Self::Coupon(CouponRejection::Inactive) => "inactive_coupon",
            Self::Coupon(CouponRejection::Expired) => "expired_coupon",
            Self::Coupon(CouponRejection::UsageExhausted) => "usage_exhausted",
            Self::Order(OrderError::InvalidTransition { .. }) => "invalid_transition",
            Self::Order(_) => "validation_error",
            Self::Conflict(_) => "conflict",
            Self::Storage(_) | Self::Corrupt(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::Pricing(_) | Self::Coupon(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Order(OrderError::InvalidTransition { .. }) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Order(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage(_) | Self::Corrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for EcommerceError {
    fn from(e: validator::ValidationErrors) -> Self { Self::Validation(e.to_string()) }
}

impl From<CouponTermsError> for EcommerceError {
    fn from(e: CouponTermsError) -> Self { Self::Validation(e.to_string()) }
}

impl From<CartError> for EcommerceError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::ItemNotFound => Self::NotFound("cart item"),
            CartError::Empty => Self::Validation("cart is empty".into()),
            CartError::Pricing(e) => Self::Pricing(e),
            CartError::Order(e) => Self::Order(e),
        }
    }
}

impl IntoResponse for EcommerceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Storage details stay in the logs.
        let message = match &self {
            Self::Storage(e) => { tracing::error!(error = %e, "database error"); "internal error".to_string() }
            Self::Corrupt(m) => { tracing::error!(detail = %m, "corrupt record"); "internal error".to_string() }
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "error": self.code(), "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::aggregates::OrderStatus;

    #[test]
    fn coupon_rejections_map_to_unprocessable() {
        for (r, code) in [
            (CouponRejection::Expired, "expired_coupon"),
            (CouponRejection::UsageExhausted, "usage_exhausted"),
            (CouponRejection::Inactive, "inactive_coupon"),
            (CouponRejection::NotFound, "coupon_not_found"),
        ] {
            let e = EcommerceError::from(r);
            assert_eq!(e.status(), StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(e.code(), code);
        }
    }

    #[test]
    fn invalid_transition_is_conflict() {
        let e = EcommerceError::from(OrderError::InvalidTransition { from: OrderStatus::Delivered, to: OrderStatus::Cancelled });
        assert_eq!(e.status(), StatusCode::CONFLICT);
        assert_eq!(e.to_string(), "cannot move order from delivered to cancelled");
    }

    #[test]
    fn storage_error_is_internal() {
        let e = EcommerceError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.code(), "internal_error");
    }
}
