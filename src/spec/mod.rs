pub mod definition;
pub mod error;
pub mod store;

pub use definition::{FieldDescriptor, OperationSet, ResourceDefinition, ID_FIELD};
pub use error::SpecError;
pub use store::{RouteEntry, SpecStore};
