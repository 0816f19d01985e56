use axum::http::StatusCode;

use crate::app::errors;
use crate::context::ActorContext;

/// Every ledger endpoint is admin-scoped; authentication alone is not enough.
pub fn require_admin(actor: &ActorContext) -> Result<(), axum::response::Response> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(errors::json_message(
            StatusCode::FORBIDDEN,
            "admin access required",
        ))
    }
}
