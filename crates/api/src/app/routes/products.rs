use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use stockledger_core::ProductId;
use stockledger_inventory::Product;

use crate::app::routes::common::require_admin;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", get(get_product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&actor) {
        return resp;
    }

    let Some(name) = body.name else {
        return errors::json_message(StatusCode::BAD_REQUEST, "name is required");
    };
    if name.trim().is_empty() {
        return errors::json_message(StatusCode::BAD_REQUEST, "name is required");
    }

    let Some(price_cents) = body.price else {
        return errors::json_message(StatusCode::BAD_REQUEST, "price is required");
    };
    if price_cents < 0 {
        return errors::json_message(StatusCode::BAD_REQUEST, "price cannot be negative");
    }

    let stock_count = body.stock_count.unwrap_or(0);
    if stock_count < 0 {
        return errors::json_message(StatusCode::BAD_REQUEST, "stockCount cannot be negative");
    }

    let product = Product {
        id: ProductId::new(),
        name: name.trim().to_string(),
        price_cents,
        stock_count,
    };

    match services.create_product(product).await {
        Ok(product) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "product": dto::product_to_json(&product),
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<crate::context::ActorContext>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&actor) {
        return resp;
    }

    match services.list_products().await {
        Ok(products) => (
            StatusCode::OK,
            Json(
                products
                    .iter()
                    .map(dto::product_to_json)
                    .collect::<Vec<_>>(),
            ),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&actor) {
        return resp;
    }

    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_message(StatusCode::BAD_REQUEST, "productId must be a valid id");
        }
    };

    match services.get_product(product_id).await {
        Ok(Some(product)) => (StatusCode::OK, Json(dto::product_to_json(&product))).into_response(),
        Ok(None) => errors::json_message(StatusCode::NOT_FOUND, "product not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
