//! Session cart queries

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::aggregates::CartItem;
use crate::domain::pricing::PrintConfiguration;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartItemRow {
    pub id: Uuid, pub session_id: String, pub product_id: Uuid, pub name: String,
    pub configuration: Json<PrintConfiguration>, pub created_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(r: CartItemRow) -> Self {
        CartItem { id: r.id, product_id: r.product_id, name: r.name, configuration: r.configuration.0, added_at: r.created_at }
    }
}

#[instrument(skip(db))]
pub async fn items(db: &PgPool, session: &str) -> Result<Vec<CartItem>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CartItemRow>("SELECT * FROM cart_items WHERE session_id = $1 ORDER BY created_at, id").bind(session).fetch_all(db).await?;
    Ok(rows.into_iter().map(CartItem::from).collect())
}

#[instrument(skip(db, item), fields(item_id = %item.id))]
pub async fn insert(db: &PgPool, session: &str, item: &CartItem) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO cart_items (id, session_id, product_id, name, configuration, created_at) VALUES ($1, $2, $3, $4, $5, $6)")
        .bind(item.id).bind(session).bind(item.product_id).bind(&item.name).bind(Json(&item.configuration)).bind(item.added_at)
        .execute(db).await?;
    Ok(())
}

#[instrument(skip(db, configuration))]
pub async fn update_configuration(db: &PgPool, session: &str, item_id: Uuid, configuration: &PrintConfiguration) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE cart_items SET configuration = $3 WHERE session_id = $1 AND id = $2")
        .bind(session).bind(item_id).bind(Json(configuration)).execute(db).await?;
    Ok(())
}

#[instrument(skip(db))]
pub async fn remove(db: &PgPool, session: &str, item_id: Uuid) -> Result<bool, sqlx::Error> {
    let r = sqlx::query("DELETE FROM cart_items WHERE session_id = $1 AND id = $2").bind(session).bind(item_id).execute(db).await?;
    Ok(r.rows_affected() > 0)
}

#[instrument(skip(db))]
pub async fn clear(db: &PgPool, session: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM cart_items WHERE session_id = $1").bind(session).execute(db).await?;
    Ok(())
}

/// Removes the items an order was built from. An item whose configuration
/// changed since it was loaded (a merge from another request) stays in the cart.
#[instrument(skip(tx, items), fields(items = items.len()))]
pub async fn remove_ordered_in(tx: &mut sqlx::Transaction<'_, sqlx::Postgres>, session: &str, items: &[CartItem]) -> Result<(), sqlx::Error> {
    for item in items {
        sqlx::query("DELETE FROM cart_items WHERE session_id = $1 AND id = $2 AND configuration = $3")
            .bind(session).bind(item.id).bind(Json(&item.configuration)).execute(&mut **tx).await?;
    }
    Ok(())
}
