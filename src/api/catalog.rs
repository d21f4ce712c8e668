//! Product and category endpoints

use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{conflict_on_duplicate, page_window, AppState, PaginatedResponse};
use crate::db::categories::{self, Category};
use crate::db::products::{self, Product, ProductFields};
use crate::domain::pricing::PriceCategory;
use crate::domain::value_objects::Sku;
use crate::{EcommerceError, Result};

#[derive(Debug, Deserialize)] pub struct ProductListParams { pub page: Option<u32>, pub per_page: Option<u32>, pub category: Option<Uuid>, pub search: Option<String> }

#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 50))]
    pub sku: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub price_category: PriceCategory,
    /// "Starting from" price shown in listings; orders are priced from the tables.
    pub base_price: Decimal,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ProductRequest {
    fn checked(&self) -> Result<Sku> {
        self.validate()?;
        if self.base_price < Decimal::ZERO { return Err(EcommerceError::Validation("base_price cannot be negative".into())); }
        Sku::new(self.sku.as_str()).map_err(|e| EcommerceError::Validation(e.to_string()))
    }

    fn fields<'a>(&'a self, sku: &'a Sku) -> ProductFields<'a> {
        ProductFields {
            sku: sku.as_str(), name: self.name.trim(), description: self.description.as_deref(),
            price_category: self.price_category.as_str(), base_price: self.base_price, category_id: self.category_id,
            images: &self.images, tags: &self.tags,
        }
    }
}

pub async fn list_products(State(s): State<AppState>, Query(p): Query<ProductListParams>) -> Result<Json<PaginatedResponse<Product>>> {
    let (page, per_page, offset) = page_window(p.page, p.per_page);
    let search = p.search.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let (data, total) = s.read("list_products", || products::list_active(&s.db, i64::from(per_page), offset, p.category, search)).await?;
    Ok(Json(PaginatedResponse { data, total, page, per_page }))
}

pub async fn get_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Product>> {
    s.read("get_product", || products::find(&s.db, id)).await?.map(Json).ok_or(EcommerceError::NotFound("product"))
}

pub async fn create_product(State(s): State<AppState>, Json(r): Json<ProductRequest>) -> Result<(StatusCode, Json<Product>)> {
    let sku = r.checked()?;
    let p = products::insert(&s.db, &r.fields(&sku), &s.checkout.currency).await.map_err(|e| conflict_on_duplicate(e, "product sku"))?;
    info!(product_id = %p.id, sku = %p.sku, "product created");
    Ok((StatusCode::CREATED, Json(p)))
}

pub async fn update_product(State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<ProductRequest>) -> Result<Json<Product>> {
    let sku = r.checked()?;
    products::update(&s.db, id, &r.fields(&sku)).await
        .map_err(|e| conflict_on_duplicate(e, "product sku"))?
        .map(Json).ok_or(EcommerceError::NotFound("product"))
}

pub async fn delete_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    if !products::mark_deleted(&s.db, id).await? { return Err(EcommerceError::NotFound("product")); }
    info!(product_id = %id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_categories(State(s): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(s.read("list_categories", || categories::list(&s.db)).await?))
}

pub async fn get_category(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Category>> {
    s.read("get_category", || categories::find(&s.db, id)).await?.map(Json).ok_or(EcommerceError::NotFound("category"))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    #[validate(url)]
    pub image_url: Option<String>,
}

pub async fn create_category(State(s): State<AppState>, Json(r): Json<CreateCategoryRequest>) -> Result<(StatusCode, Json<Category>)> {
    r.validate()?;
    if categories::slugify(&r.name).is_empty() { return Err(EcommerceError::Validation("category name needs letters or digits".into())); }
    let c = categories::insert(&s.db, r.name.trim(), r.description.as_deref(), r.parent_id, r.image_url.as_deref()).await
        .map_err(|e| conflict_on_duplicate(e, "category"))?;
    Ok((StatusCode::CREATED, Json(c)))
}
