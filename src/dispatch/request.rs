use axum::http::{header, HeaderMap, Method, Uri};
use serde_json::Value;

use crate::config::AuthConfig;
use crate::dispatch::auth::Credentials;
use crate::dispatch::error::DispatchError;

/// Transport-independent view of an incoming request.
#[derive(Debug, Clone, Default)]
pub struct DispatchRequest {
    pub method: Method,
    pub path: String,
    /// Query parameters in the order they appeared
    pub query: Vec<(String, String)>,
    pub credentials: Credentials,
    pub payload: Option<Value>,
}

impl DispatchRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    /// Parse a raw `a=1&b=2` query string, keeping parameter order.
    pub fn with_query(mut self, raw: &str) -> Self {
        self.query = parse_query(raw);
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.credentials.token = Some(token.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.credentials.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Build from HTTP parts.
    ///
    /// The token comes from the configured header, falling back to the query
    /// parameter. The body becomes the payload only for JSON content types.
    pub fn from_http(
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap,
        body: &[u8],
        auth: &AuthConfig,
    ) -> Result<Self, DispatchError> {
        let query = parse_query(uri.query().unwrap_or(""));

        let token = header_str(headers, auth.token_header.as_str())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| {
                query
                    .iter()
                    .find(|(k, v)| *k == auth.token_query_param && !v.is_empty())
                    .map(|(_, v)| v.clone())
            });
        let user_agent = header_str(headers, header::USER_AGENT.as_str()).map(str::to_string);

        let is_json = header_str(headers, header::CONTENT_TYPE.as_str())
            .map_or(false, |ct| ct.contains("application/json"));
        let payload = if is_json && !body.is_empty() {
            let value = serde_json::from_slice::<Value>(body)
                .map_err(|e| DispatchError::InvalidPayload(e.to_string()))?;
            Some(value)
        } else {
            None
        };

        Ok(Self {
            method: method.clone(),
            path: uri.path().to_string(),
            query,
            credentials: Credentials::new(token, user_agent),
            payload,
        })
    }
}

fn parse_query(raw: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw.as_bytes())
        .into_owned()
        .collect()
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
