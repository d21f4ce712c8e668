//! HTTP API

pub mod addresses;
pub mod cart;
pub mod catalog;
pub mod coupons;
pub mod orders;
pub mod pricing;

use std::future::Future;
use std::sync::Arc;

use axum::{routing::{delete, get, post, put}, Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, warn};

use crate::config::CheckoutSettings;
use crate::db::{self, RetryPolicy};
use crate::domain::events::DomainEvent;
use crate::EcommerceError;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub nats: Option<async_nats::Client>,
    pub checkout: Arc<CheckoutSettings>,
    pub retry: RetryPolicy,
}

impl AppState {
    pub fn new(db: PgPool, nats: Option<async_nats::Client>, checkout: CheckoutSettings, retry: RetryPolicy) -> Self {
        Self { db, nats, checkout: Arc::new(checkout), retry }
    }

    /// Runs a read query with the configured retry policy.
    pub async fn read<T, F, Fut>(&self, op: &str, f: F) -> Result<T, sqlx::Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        db::with_retry(&self.retry, op, f).await
    }

    /// Publishes events to NATS when connected. Failures are logged only.
    pub async fn publish(&self, events: Vec<DomainEvent>) {
        let Some(nats) = &self.nats else { return };
        for event in events {
            let subject = event.subject();
            match serde_json::to_vec(&event) {
                Ok(payload) => match nats.publish(subject.to_string(), payload.into()).await {
                    Ok(()) => debug!(subject, "event published"),
                    Err(e) => warn!(subject, error = %e, "event publish failed"),
                },
                Err(e) => warn!(subject, error = %e, "event serialization failed"),
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "printshop-commerce"})) }))
        .route("/api/v1/products", get(catalog::list_products).post(catalog::create_product))
        .route("/api/v1/products/:id", get(catalog::get_product).put(catalog::update_product).delete(catalog::delete_product))
        .route("/api/v1/categories", get(catalog::list_categories).post(catalog::create_category))
        .route("/api/v1/categories/:id", get(catalog::get_category))
        .route("/api/v1/pricing/quote", post(pricing::quote))
        .route("/api/v1/coupons", get(coupons::list_coupons).post(coupons::create_coupon))
        .route("/api/v1/coupons/validate", post(coupons::validate_coupon))
        .route("/api/v1/coupons/:id", get(coupons::get_coupon).put(coupons::update_coupon).delete(coupons::deactivate_coupon))
        .route("/api/v1/orders", get(orders::list_orders).post(orders::create_order))
        .route("/api/v1/orders/:id", get(orders::get_order))
        .route("/api/v1/orders/:id/status", put(orders::update_status))
        .route("/api/v1/cart/:session", get(cart::get_cart).post(cart::add_to_cart).delete(cart::clear_cart))
        .route("/api/v1/cart/:session/items/:item_id", delete(cart::remove_cart_item))
        .route("/api/v1/checkout", post(cart::checkout))
        .route("/api/v1/customers/:email/addresses", get(addresses::list_addresses).post(addresses::create_address))
        .route("/api/v1/customers/:email/addresses/:id", delete(addresses::delete_address))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

#[derive(Debug, Serialize)] pub struct PaginatedResponse<T> { pub data: Vec<T>, pub total: i64, pub page: u32, pub per_page: u32 }

/// Normalizes `page`/`per_page` query values into (page, per_page, offset).
pub fn page_window(page: Option<u32>, per_page: Option<u32>) -> (u32, u32, i64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(20).clamp(1, 100);
    (page, per_page, i64::from(page - 1) * i64::from(per_page))
}

#[derive(Debug, Deserialize)] pub struct PageParams { pub page: Option<u32>, pub per_page: Option<u32> }

/// Maps a unique-constraint violation to `Conflict`, anything else to `Storage`.
pub(crate) fn conflict_on_duplicate(e: sqlx::Error, what: &str) -> EcommerceError {
    if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
        EcommerceError::Conflict(format!("{what} already exists"))
    } else {
        EcommerceError::Storage(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window_clamps() {
        assert_eq!(page_window(None, None), (1, 20, 0));
        assert_eq!(page_window(Some(0), Some(500)), (1, 100, 0));
        assert_eq!(page_window(Some(3), Some(10)), (3, 10, 20));
        assert_eq!(page_window(Some(2), Some(0)), (2, 1, 1));
    }
}
