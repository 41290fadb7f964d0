//! Handlers for products and the product-usage ledger.

use axum::{
    Json,
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::models::patch::{ProductPatch, ProductUsagePatch};
use crate::models::{NewProduct, NewProductUsage, Product, ProductUsage};
use crate::storage::UsageWithProduct;

use super::{ApiResult, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    /// When true, only products at or below their low-stock threshold
    #[serde(default)]
    pub low_stock: bool,
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let storage = state.storage.lock().await;
    let products = if query.low_stock {
        storage.low_stock_products()
    } else {
        storage.list_products()
    };
    Ok(Json(products))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(new): Json<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let mut storage = state.storage.lock().await;
    let product = storage.create_product(new);
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get_product(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> ApiResult<Json<Product>> {
    let storage = state.storage.lock().await;
    let product = storage
        .get_product(id)
        .ok_or(Error::not_found("product", id))?;
    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
    Json(patch): Json<ProductPatch>,
) -> ApiResult<Json<Product>> {
    let mut storage = state.storage.lock().await;
    let product = storage
        .update_product(id, patch)
        .ok_or(Error::not_found("product", id))?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> ApiResult<StatusCode> {
    let mut storage = state.storage.lock().await;
    if !storage.delete_product(id) {
        return Err(Error::not_found("product", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---- Usage ledger ----

pub async fn task_usage(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> ApiResult<Json<Vec<UsageWithProduct>>> {
    let storage = state.storage.lock().await;
    Ok(Json(storage.task_usage_with_products(id)))
}

/// Response to a recorded usage: the new record plus the product with its
/// decremented stock, so clients can refresh inventory without a refetch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecorded {
    pub usage: ProductUsage,
    pub product: Product,
}

pub async fn record_usage(
    State(state): State<AppState>,
    Json(new): Json<NewProductUsage>,
) -> ApiResult<(StatusCode, Json<UsageRecorded>)> {
    let mut storage = state.storage.lock().await;
    let usage = storage.record_usage(new)?;
    let product = storage
        .get_product(usage.product_id)
        .ok_or(Error::not_found("product", usage.product_id))?;
    Ok((StatusCode::CREATED, Json(UsageRecorded { usage, product })))
}

pub async fn adjust_usage(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
    Json(patch): Json<ProductUsagePatch>,
) -> ApiResult<Json<ProductUsage>> {
    let mut storage = state.storage.lock().await;
    let usage = storage.adjust_usage(id, patch)?;
    Ok(Json(usage))
}

pub async fn release_usage(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> ApiResult<StatusCode> {
    let mut storage = state.storage.lock().await;
    if !storage.release_usage(id) {
        return Err(Error::not_found("product usage", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
