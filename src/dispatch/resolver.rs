//! Path resolution against the specification store.
//!
//! The first segment selects a mount group when one matches and is consumed;
//! otherwise traversal starts at the default root without consuming it. Each
//! subsequent segment is a child lookup, and whenever further segments remain
//! after a lookup the next one is taken as an identifier.

use tracing::debug;

use crate::dispatch::query::QueryFilter;
use crate::spec::{ResourceDefinition, SpecStore, ID_FIELD};

/// Outcome of a successful walk down a specification tree.
#[derive(Debug, Clone)]
pub struct Resolution<'s> {
    pub resource: String,
    pub api: &'s ResourceDefinition,
    pub filters: Vec<QueryFilter>,
    /// Any definition crossed on the way was protected
    pub protected: bool,
    pub mount: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// No segments at all; the caller serves the specification document instead
    Empty,
    /// A segment had no matching child, or nothing beyond a mount point was named
    NotFound {
        /// A protected definition was crossed before the miss
        behind_protected: bool,
    },
}

/// Split a request path into its non-empty segments.
pub fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

pub fn resolve<'s>(store: &'s SpecStore, path: &str) -> Result<Resolution<'s>, ResolveError> {
    let segments = split_segments(path);
    let first = *segments.first().ok_or(ResolveError::Empty)?;

    let (mut current, mut index, mount) = match store.mount(first) {
        Some(tree) => (tree, 1, Some(first.to_string())),
        None => (store.root(), 0, None),
    };

    let mut filters = Vec::new();
    let mut protected = false;
    let mut resolved: Option<(&str, &'s ResourceDefinition)> = None;

    while index < segments.len() {
        let segment = segments[index];
        let child = current.child(segment).ok_or(ResolveError::NotFound {
            behind_protected: protected,
        })?;
        protected |= child.protected;

        if index + 1 < segments.len() {
            index += 1;
            let id = segments[index];
            if child.has_identifier() {
                filters.push(QueryFilter::eq(ID_FIELD, id));
            } else {
                // Consumed for path shape only; the resource has no identifier field.
                debug!("Dropping identifier segment '{}' under '{}'", id, segment);
            }
        }

        index += 1;
        current = child;
        resolved = Some((segment, child));
    }

    let (resource, api) = resolved.ok_or(ResolveError::NotFound {
        behind_protected: protected,
    })?;

    debug!(
        "Resolved path '{}' to resource '{}' (mount={:?}, filters={}, protected={})",
        path,
        resource,
        mount,
        filters.len(),
        protected
    );

    Ok(Resolution {
        resource: resource.to_string(),
        api,
        filters,
        protected,
        mount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::FieldDescriptor;
    use crate::types::Operation;

    fn with_id() -> ResourceDefinition {
        ResourceDefinition::new()
            .with_field("id", FieldDescriptor::new("id"))
            .with_operations([Operation::Read])
    }

    fn store() -> SpecStore {
        let users = with_id().with_child("orders", with_id());
        let tags = ResourceDefinition::new()
            .with_operations([Operation::Read])
            .with_child("items", with_id());
        let vault = with_id().protected().with_child("secrets", with_id());

        SpecStore::new(
            ResourceDefinition::new()
                .with_child("users", users)
                .with_child("tags", tags)
                .with_child("items", with_id())
                .with_child("vault", vault),
        )
        .with_mount("sde", ResourceDefinition::new().with_child("items", with_id()))
        .unwrap()
    }

    #[test]
    fn splits_on_slashes_ignoring_empties() {
        assert_eq!(split_segments("/a/b/"), vec!["a", "b"]);
        assert_eq!(split_segments("a//b"), vec!["a", "b"]);
        assert!(split_segments("/").is_empty());
        assert!(split_segments("").is_empty());
    }

    #[test]
    fn empty_paths_do_not_resolve() {
        let store = store();
        assert_eq!(resolve(&store, "/").unwrap_err(), ResolveError::Empty);
        assert_eq!(resolve(&store, "").unwrap_err(), ResolveError::Empty);
    }

    #[test]
    fn root_resource_with_identifier() {
        let store = store();
        let r = resolve(&store, "/users/42").unwrap();
        assert_eq!(r.resource, "users");
        assert_eq!(r.filters, vec![QueryFilter::eq("id", "42")]);
        assert_eq!(r.mount, None);
        assert!(!r.protected);
    }

    #[test]
    fn mount_group_consumes_first_segment() {
        let store = store();
        let mounted = resolve(&store, "/sde/items/7").unwrap();
        let direct = resolve(&store, "/items/7").unwrap();

        assert_eq!(mounted.mount.as_deref(), Some("sde"));
        assert!(std::ptr::eq(mounted.api, store.mount("sde").unwrap().child("items").unwrap()));
        assert!(std::ptr::eq(direct.api, store.root().child("items").unwrap()));
        assert_eq!(mounted.filters, direct.filters);
    }

    #[test]
    fn mount_point_alone_is_not_found() {
        let store = store();
        assert_eq!(
            resolve(&store, "/sde").unwrap_err(),
            ResolveError::NotFound { behind_protected: false }
        );
    }

    #[test]
    fn mount_trees_are_isolated() {
        let store = store();
        // `users` only exists in the default tree
        assert!(resolve(&store, "/sde/users").is_err());
        assert!(resolve(&store, "/users").is_ok());
    }

    #[test]
    fn nested_resources_collect_identifiers_per_level() {
        let store = store();
        let r = resolve(&store, "/users/42/orders/7").unwrap();
        assert_eq!(r.resource, "orders");
        assert_eq!(
            r.filters,
            vec![QueryFilter::eq("id", "42"), QueryFilter::eq("id", "7")]
        );
    }

    #[test]
    fn identifier_segment_without_id_field_is_consumed_silently() {
        let store = store();
        let r = resolve(&store, "/tags/anything/items").unwrap();
        assert_eq!(r.resource, "items");
        assert!(r.filters.is_empty());

        let r = resolve(&store, "/tags/anything").unwrap();
        assert_eq!(r.resource, "tags");
        assert!(r.filters.is_empty());
    }

    #[test]
    fn matching_is_exact_and_case_sensitive() {
        let store = store();
        assert!(resolve(&store, "/Users").is_err());
        assert!(resolve(&store, "/user").is_err());
        assert!(resolve(&store, "/SDE/items").is_err());
    }

    #[test]
    fn misses_beneath_protected_nodes_are_flagged() {
        let store = store();
        assert_eq!(
            resolve(&store, "/vault/1/missing").unwrap_err(),
            ResolveError::NotFound { behind_protected: true }
        );
        assert_eq!(
            resolve(&store, "/missing").unwrap_err(),
            ResolveError::NotFound { behind_protected: false }
        );
        let r = resolve(&store, "/vault/1/secrets").unwrap();
        assert!(r.protected, "protection carries down to nested resources");
    }
}
