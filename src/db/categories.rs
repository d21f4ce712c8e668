//! Category queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category { pub id: Uuid, pub name: String, pub slug: String, pub description: Option<String>, pub parent_id: Option<Uuid>, pub image_url: Option<String>, pub created_at: DateTime<Utc> }

/// "Wedding Cards & Invites" -> "wedding-cards-invites"
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[instrument(skip(db))]
pub async fn list(db: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name").fetch_all(db).await
}

#[instrument(skip(db))]
pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1").bind(id).fetch_optional(db).await
}

#[instrument(skip(db))]
pub async fn insert(db: &PgPool, name: &str, description: Option<&str>, parent_id: Option<Uuid>, image_url: Option<&str>) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>("INSERT INTO categories (id, name, slug, description, parent_id, image_url, created_at) VALUES ($1, $2, $3, $4, $5, $6, NOW()) RETURNING *")
        .bind(Uuid::now_v7()).bind(name).bind(slugify(name)).bind(description).bind(parent_id).bind(image_url)
        .fetch_one(db).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(slugify("Wedding Cards & Invites"), "wedding-cards-invites");
        assert_eq!(slugify("  Maps  "), "maps");
    }
}
