use std::sync::Arc;

use anyhow::Context;
use axum::http::Method;
use serde_json::{json, Value};

use crate::cli::utils::{output_error, output_json};
use crate::cli::{Cli, OutputFormat};
use crate::device::UserAgentFingerprint;
use crate::dispatch::{DispatchRequest, Dispatcher};
use crate::error::ApiError;

pub struct ResolveArgs<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub token: Option<&'a str>,
    pub user_agent: Option<&'a str>,
    pub data: Option<&'a str>,
}

pub fn handle(cli: &Cli, args: ResolveArgs<'_>, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = cli.load_store()?;
    let dispatcher = Dispatcher::new(Arc::new(store), Arc::new(UserAgentFingerprint::new()));
    let request = build_request(&args)?;

    let dispatched = match dispatcher.dispatch(request) {
        Ok(dispatched) => dispatched,
        Err(e) => {
            let status = ApiError::from(e.clone()).status_code();
            output_error(&output_format, &e.to_string(), Some(&status.to_string()))?;
            anyhow::bail!("request rejected with HTTP {}", status);
        }
    };

    let query = &dispatched.query;
    match output_format {
        OutputFormat::Json => output_json(&json!({
            "success": true,
            "query": query,
            "no_store": dispatched.no_store,
        })),
        OutputFormat::Text => {
            println!("{} {}", query.operation, query.resource);
            for filter in &query.filters {
                println!("  where {} {} {}", filter.field, filter.op, filter.val);
            }
            if let Some(payload) = &query.payload {
                println!("  payload {}", payload);
            }
            if let Some(auth) = &query.auth {
                println!("  auth device={}", auth.device);
            }
            if dispatched.no_store {
                println!("  cache-control: no-store");
            }
            Ok(())
        }
    }
}

fn build_request(args: &ResolveArgs<'_>) -> anyhow::Result<DispatchRequest> {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid method '{}'", args.method))?;

    let (path, raw_query) = args.path.split_once('?').unwrap_or((args.path, ""));
    let mut request = DispatchRequest::new(method, path).with_query(raw_query);

    if let Some(token) = args.token {
        request = request.with_token(token);
    }
    if let Some(user_agent) = args.user_agent {
        request = request.with_user_agent(user_agent);
    }
    if let Some(data) = args.data {
        let payload: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
        request = request.with_payload(payload);
    }
    Ok(request)
}
