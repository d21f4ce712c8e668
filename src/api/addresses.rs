//! Customer address book

use axum::{extract::{Path, State}, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::AppState;
use crate::db::addresses::{self, AddressRow};
use crate::domain::aggregates::Address;
use crate::{EcommerceError, Result};

#[derive(Debug, Deserialize, Validate)]
pub struct AddressRequest {
    #[serde(flatten)]
    #[validate]
    pub address: Address,
    #[serde(default)]
    pub is_default: bool,
}

fn customer(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if !validator::validate_email(&email) { return Err(EcommerceError::Validation(format!("invalid customer email {email:?}"))); }
    Ok(email)
}

pub async fn list_addresses(State(s): State<AppState>, Path(email): Path<String>) -> Result<Json<Vec<AddressRow>>> {
    let email = customer(&email)?;
    Ok(Json(s.read("list_addresses", || addresses::list(&s.db, &email)).await?))
}

pub async fn create_address(State(s): State<AppState>, Path(email): Path<String>, Json(r): Json<AddressRequest>) -> Result<(StatusCode, Json<AddressRow>)> {
    let email = customer(&email)?;
    r.validate()?;
    let row = addresses::insert(&s.db, &email, &r.address, r.is_default).await?;
    info!(address_id = %row.id, is_default = row.is_default, "address saved");
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn delete_address(State(s): State<AppState>, Path((email, id)): Path<(String, Uuid)>) -> Result<StatusCode> {
    let email = customer(&email)?;
    if !addresses::remove(&s.db, &email, id).await? { return Err(EcommerceError::NotFound("address")); }
    Ok(StatusCode::NO_CONTENT)
}
