use tracing::warn;

use crate::device::DeviceResolver;
use crate::dispatch::error::DispatchError;
use crate::dispatch::query::AuthContext;

/// Caller-supplied material the auth gate inspects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub token: Option<String>,
    pub user_agent: Option<String>,
}

impl Credentials {
    pub fn new(token: Option<String>, user_agent: Option<String>) -> Self {
        Self { token, user_agent }
    }
}

/// Require both a token and a derivable device fingerprint.
///
/// Only presence is checked; verifying the token is left to the data executor.
pub fn authorize(
    credentials: &Credentials,
    devices: &dyn DeviceResolver,
) -> Result<AuthContext, DispatchError> {
    let token = credentials
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            warn!("Rejecting protected request: missing auth token");
            DispatchError::Unauthorized
        })?;

    let device = credentials
        .user_agent
        .as_deref()
        .and_then(|ua| devices.fingerprint(ua))
        .filter(|d| !d.is_empty())
        .ok_or_else(|| {
            warn!("Rejecting protected request: no device fingerprint from user-agent");
            DispatchError::Unauthorized
        })?;

    Ok(AuthContext {
        token: token.to_string(),
        device,
    })
}
