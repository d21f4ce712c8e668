//! Saved customer addresses

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::aggregates::Address;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AddressRow {
    pub id: Uuid, pub customer_email: String, pub name: String, pub line1: String, pub line2: Option<String>,
    pub city: String, pub state: String, pub postal_code: String, pub country: String, pub phone: Option<String>,
    pub is_default: bool, pub created_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(r: AddressRow) -> Self {
        Address { name: r.name, line1: r.line1, line2: r.line2, city: r.city, state: r.state, postal_code: r.postal_code, country: r.country, phone: r.phone }
    }
}

#[instrument(skip(db))]
pub async fn list(db: &PgPool, customer_email: &str) -> Result<Vec<AddressRow>, sqlx::Error> {
    sqlx::query_as::<_, AddressRow>("SELECT * FROM addresses WHERE customer_email = $1 ORDER BY is_default DESC, created_at DESC")
        .bind(customer_email).fetch_all(db).await
}

#[instrument(skip(db))]
pub async fn find(db: &PgPool, customer_email: &str, id: Uuid) -> Result<Option<AddressRow>, sqlx::Error> {
    sqlx::query_as::<_, AddressRow>("SELECT * FROM addresses WHERE customer_email = $1 AND id = $2").bind(customer_email).bind(id).fetch_optional(db).await
}

/// Saves an address. A new default clears the previous one in the same transaction.
#[instrument(skip(db, a))]
pub async fn insert(db: &PgPool, customer_email: &str, a: &Address, is_default: bool) -> Result<AddressRow, sqlx::Error> {
    let mut tx = db.begin().await?;
    if is_default {
        sqlx::query("UPDATE addresses SET is_default = FALSE WHERE customer_email = $1 AND is_default").bind(customer_email).execute(&mut *tx).await?;
    }
    let row = sqlx::query_as::<_, AddressRow>("INSERT INTO addresses (id, customer_email, name, line1, line2, city, state, postal_code, country, phone, is_default, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW()) RETURNING *")
        .bind(Uuid::now_v7()).bind(customer_email).bind(&a.name).bind(&a.line1).bind(&a.line2).bind(&a.city).bind(&a.state).bind(&a.postal_code).bind(&a.country).bind(&a.phone).bind(is_default)
        .fetch_one(&mut *tx).await?;
    tx.commit().await?;
    Ok(row)
}

#[instrument(skip(db))]
pub async fn remove(db: &PgPool, customer_email: &str, id: Uuid) -> Result<bool, sqlx::Error> {
    let r = sqlx::query("DELETE FROM addresses WHERE customer_email = $1 AND id = $2").bind(customer_email).bind(id).execute(db).await?;
    Ok(r.rows_affected() > 0)
}
