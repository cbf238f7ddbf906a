use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};

use super::AppState;
use crate::dispatch::{DispatchRequest, Dispatched};
use crate::error::ApiError;

/// Any verb on any non-empty path: resolve, validate, then hand off to the executor
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = match DispatchRequest::from_http(&method, &uri, &headers, &body, &state.auth) {
        Ok(request) => request,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let Dispatched { query, no_store } = match state.dispatcher.dispatch(request) {
        Ok(dispatched) => dispatched,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let mut response = match state.executor.execute(&query).await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    };

    // Responses for protected resources must never be cached
    if no_store {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }
    response
}
