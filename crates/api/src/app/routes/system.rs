use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(actor): Extension<crate::context::ActorContext>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "id": actor.actor_id().to_string(),
        "name": actor.name(),
        "email": actor.email(),
        "roles": actor.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
    }))
}
