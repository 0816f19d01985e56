use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use stockledger_core::ProductId;
use stockledger_inventory::Adjustment;
use stockledger_store::LogFilter;

use crate::app::routes::common::require_admin;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/update", post(update_inventory))
        .route("/product/:id", get(product_history))
        .route("/logs", get(all_logs))
        .route("/summary", get(summary))
}

pub async fn update_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Json(body): Json<dto::UpdateInventoryRequest>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&actor) {
        return resp;
    }

    let Some(product_id) = body.product_id else {
        return errors::json_message(StatusCode::BAD_REQUEST, "productId is required");
    };
    let product_id: ProductId = match product_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_message(StatusCode::BAD_REQUEST, "productId must be a valid id");
        }
    };

    let Some(action) = body.action else {
        return errors::json_message(StatusCode::BAD_REQUEST, "action is required");
    };
    let action = match errors::parse_action(&action) {
        Ok(a) => a,
        Err(resp) => return resp,
    };

    let Some(quantity) = body.quantity else {
        return errors::json_message(StatusCode::BAD_REQUEST, "quantity is required");
    };

    let Some(reason) = body.reason else {
        return errors::json_message(StatusCode::BAD_REQUEST, "reason is required");
    };

    let adjustment = Adjustment {
        product_id,
        action,
        quantity,
        reason,
        notes: body.notes.unwrap_or_default(),
        actor_id: actor.actor_id(),
    };

    match services
        .apply_adjustment(adjustment, actor.to_record())
        .await
    {
        Ok((product, entry)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "data": {
                    "product": dto::product_to_json(&product),
                    "log": dto::log_to_json(&entry),
                },
            })),
        )
            .into_response(),
        Err(e) => errors::write_error_to_response(e),
    }
}

pub async fn product_history(
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

    match services.product_history(product_id).await {
        Ok(entries) => (
            StatusCode::OK,
            Json(
                entries
                    .iter()
                    .map(|e| dto::entry_to_json(e, false))
                    .collect::<Vec<_>>(),
            ),
        )
            .into_response(),
        Err(e) => errors::write_error_to_response(e),
    }
}

pub async fn all_logs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<crate::context::ActorContext>,
    Query(query): Query<dto::LogsQuery>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&actor) {
        return resp;
    }

    let page_number = match query.page_number.as_deref() {
        None => 1,
        Some(raw) => match raw.parse::<u32>() {
            Ok(n) if n >= 1 => n,
            _ => {
                return errors::json_message(
                    StatusCode::BAD_REQUEST,
                    "pageNumber must be a positive integer",
                );
            }
        },
    };

    let product_id = match query.product_id.as_deref() {
        None => None,
        Some(raw) => match raw.parse::<ProductId>() {
            Ok(v) => Some(v),
            Err(_) => {
                return errors::json_message(
                    StatusCode::BAD_REQUEST,
                    "productId must be a valid id",
                );
            }
        },
    };

    let action = match query.action.as_deref() {
        None => None,
        Some(raw) => match errors::parse_action(raw) {
            Ok(a) => Some(a),
            Err(resp) => return resp,
        },
    };

    // Date bounds are a pair: one without the other is an invalid filter.
    let (created_from, created_to) = match (query.start_date.as_deref(), query.end_date.as_deref())
    {
        (None, None) => (None, None),
        (Some(start), Some(end)) => {
            let from = match errors::parse_date(start, "startDate") {
                Ok(v) => v,
                Err(resp) => return resp,
            };
            let to = match errors::parse_date(end, "endDate") {
                Ok(v) => v,
                Err(resp) => return resp,
            };
            (Some(from), Some(to))
        }
        _ => {
            return errors::json_message(
                StatusCode::BAD_REQUEST,
                "startDate and endDate must be provided together",
            );
        }
    };

    let filter = LogFilter {
        product_id,
        action,
        created_from,
        created_to,
    };

    match services.logs_page(filter, page_number).await {
        Ok(page) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "logs": page.entries.iter().map(|e| dto::entry_to_json(e, true)).collect::<Vec<_>>(),
                "page": page.pagination.page_number(),
                "pages": page.total_pages(),
                "total": page.total,
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<crate::context::ActorContext>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&actor) {
        return resp;
    }

    match services.summary().await {
        Ok((summary, recent)) => (
            StatusCode::OK,
            Json(dto::summary_to_json(&summary, &recent)),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
