//! Specification-driven request dispatch.
//!
//! request → resolver → auth gate → operation validator → operation filter → query

pub mod auth;
pub mod error;
pub mod filters;
pub mod operation;
pub mod query;
pub mod request;
pub mod resolver;

use std::sync::Arc;

use tracing::debug;

use crate::device::DeviceResolver;
use crate::spec::SpecStore;

pub use auth::Credentials;
pub use error::DispatchError;
pub use query::{AuthContext, Query, QueryFilter};
pub use request::DispatchRequest;
pub use resolver::{Resolution, ResolveError};

/// A validated query ready for the data executor.
#[derive(Debug, Clone)]
pub struct Dispatched<'s> {
    pub query: Query<'s>,
    /// The response must not be cached (protected resource)
    pub no_store: bool,
}

/// Stateless dispatcher over an immutable specification store.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<SpecStore>,
    devices: Arc<dyn DeviceResolver>,
}

impl Dispatcher {
    pub fn new(store: Arc<SpecStore>, devices: Arc<dyn DeviceResolver>) -> Self {
        Self { store, devices }
    }

    pub fn store(&self) -> &SpecStore {
        &self.store
    }

    pub fn dispatch(&self, request: DispatchRequest) -> Result<Dispatched<'_>, DispatchError> {
        let resolution = match resolver::resolve(&self.store, &request.path) {
            Ok(resolution) => resolution,
            Err(ResolveError::NotFound { behind_protected: true }) => {
                // Credentials are checked before anything below a protected node is revealed
                auth::authorize(&request.credentials, self.devices.as_ref())?;
                return Err(DispatchError::NotFound);
            }
            Err(_) => return Err(DispatchError::NotFound),
        };

        let auth = if resolution.protected {
            Some(auth::authorize(&request.credentials, self.devices.as_ref())?)
        } else {
            None
        };

        let operation = operation::validate(&request.method, resolution.api)?;

        let mut query = Query::assemble(resolution, operation, request.payload, auth);
        filters::apply(&mut query, &request.query)?;

        debug!(
            "Dispatching {} on '{}' with filters {:?}",
            query.operation, query.resource, query.filters
        );

        Ok(Dispatched {
            no_store: query.auth.is_some(),
            query,
        })
    }
}
