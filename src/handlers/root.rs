use axum::{extract::State, response::Json};
use serde_json::Value;

use super::AppState;

/// GET / - the specification document the dispatcher routes against
pub async fn spec_document(State(state): State<AppState>) -> Json<Value> {
    Json(state.dispatcher.store().document())
}
