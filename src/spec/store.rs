use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::config::SpecConfig;
use crate::spec::definition::{OperationSet, ResourceDefinition};
use crate::spec::error::SpecError;

/// Immutable forest of resource definitions: named mount groups plus one default root.
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug, Clone, Default)]
pub struct SpecStore {
    mounts: BTreeMap<String, ResourceDefinition>,
    root: ResourceDefinition,
}

/// One resolvable route pattern, as listed by [`SpecStore::routes`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEntry {
    pub pattern: String,
    pub operations: OperationSet,
    /// True when any definition along the route is protected
    pub protected: bool,
}

impl SpecStore {
    pub fn new(root: ResourceDefinition) -> Self {
        Self {
            mounts: BTreeMap::new(),
            root,
        }
    }

    pub fn with_mount(
        mut self,
        name: impl Into<String>,
        tree: ResourceDefinition,
    ) -> Result<Self, SpecError> {
        let name = name.into();
        if name.is_empty() || name.contains('/') {
            return Err(SpecError::InvalidMount(name));
        }
        if self.mounts.contains_key(&name) {
            return Err(SpecError::DuplicateMount(name));
        }
        self.mounts.insert(name, tree);
        Ok(self)
    }

    /// Load the default root and every configured mount group from disk.
    pub fn load(config: &SpecConfig) -> Result<Self, SpecError> {
        let root = Self::load_document(&config.root_path)?;
        info!(
            "Loaded root specification from {} ({} resources)",
            config.root_path.display(),
            root.children.len()
        );

        let mut store = Self::new(root);
        for mount in &config.mounts {
            let tree = Self::load_document(&mount.path)?;
            info!(
                "Loaded mount group '{}' from {} ({} resources)",
                mount.name,
                mount.path.display(),
                tree.children.len()
            );
            store = store.with_mount(mount.name.clone(), tree)?;
        }

        for name in store.shadowed() {
            warn!(
                "Root resource '{}' is unreachable: the mount group of the same name takes precedence",
                name
            );
        }

        Ok(store)
    }

    /// Parse a single specification document; the extension selects JSON or YAML.
    pub fn load_document(path: &Path) -> Result<ResourceDefinition, SpecError> {
        let contents = fs::read_to_string(path).map_err(|source| SpecError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&contents).map_err(|source| SpecError::Json {
                path: path.to_path_buf(),
                source,
            }),
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&contents).map_err(|source| SpecError::Yaml {
                    path: path.to_path_buf(),
                    source,
                })
            }
            _ => Err(SpecError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn mount(&self, name: &str) -> Option<&ResourceDefinition> {
        self.mounts.get(name)
    }

    pub fn root(&self) -> &ResourceDefinition {
        &self.root
    }

    pub fn mounts(&self) -> impl Iterator<Item = (&str, &ResourceDefinition)> {
        self.mounts.iter().map(|(name, tree)| (name.as_str(), tree))
    }

    /// Root resources whose segment collides with a mount group name.
    pub fn shadowed(&self) -> Vec<&str> {
        self.root
            .children
            .keys()
            .filter(|key| self.mounts.contains_key(key.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// The full specification document served for the empty path.
    pub fn document(&self) -> Value {
        let mut paths = Map::new();
        for (name, tree) in &self.mounts {
            paths.insert(name.clone(), serde_json::to_value(tree).unwrap_or(Value::Null));
        }

        json!({
            "paths": paths,
            "root": serde_json::to_value(&self.root).unwrap_or(Value::Null),
        })
    }

    /// Every route pattern the resolver can reach, mount groups first.
    pub fn routes(&self) -> Vec<RouteEntry> {
        let mut routes = Vec::new();
        for (name, tree) in &self.mounts {
            for (segment, child) in &tree.children {
                collect_child_routes(&format!("/{}", name), segment, child, false, &mut routes);
            }
        }

        for (segment, child) in &self.root.children {
            if self.mounts.contains_key(segment) {
                continue;
            }
            collect_child_routes("", segment, child, false, &mut routes);
        }
        routes
    }
}

fn collect_child_routes(
    prefix: &str,
    segment: &str,
    child: &ResourceDefinition,
    inherited_protection: bool,
    routes: &mut Vec<RouteEntry>,
) {
    let protected = inherited_protection || child.protected;
    let collection = format!("{}/{}", prefix, segment);

    routes.push(RouteEntry {
        pattern: collection.clone(),
        operations: child.operations.clone(),
        protected,
    });

    // An identifier-shaped segment is consumed whether or not it becomes a filter.
    let placeholder = if child.has_identifier() { "{id}" } else { "{_}" };
    let member = format!("{}/{}", collection, placeholder);
    if child.has_identifier() {
        routes.push(RouteEntry {
            pattern: member.clone(),
            operations: child.operations.clone(),
            protected,
        });
    }

    for (grand_segment, grandchild) in &child.children {
        collect_child_routes(&member, grand_segment, grandchild, protected, routes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::definition::FieldDescriptor;
    use crate::types::Operation;

    fn items() -> ResourceDefinition {
        ResourceDefinition::new()
            .with_field("id", FieldDescriptor::new("id"))
            .with_operations([Operation::Read])
    }

    #[test]
    fn rejects_bad_mount_names() {
        let store = SpecStore::new(ResourceDefinition::new());
        assert!(matches!(
            store.clone().with_mount("", ResourceDefinition::new()),
            Err(SpecError::InvalidMount(_))
        ));
        assert!(matches!(
            store.clone().with_mount("a/b", ResourceDefinition::new()),
            Err(SpecError::InvalidMount(_))
        ));
        let store = store.with_mount("sde", ResourceDefinition::new()).unwrap();
        assert!(matches!(
            store.with_mount("sde", ResourceDefinition::new()),
            Err(SpecError::DuplicateMount(_))
        ));
    }

    #[test]
    fn document_lists_mounts_and_root() {
        let store = SpecStore::new(ResourceDefinition::new().with_child("items", items()))
            .with_mount("sde", ResourceDefinition::new().with_child("types", items()))
            .unwrap();

        let doc = store.document();
        assert_eq!(doc["paths"]["sde"]["paths"]["types"]["operations"], json!(["R"]));
        assert_eq!(doc["root"]["paths"]["items"]["operations"], json!(["R"]));
    }

    #[test]
    fn routes_follow_resolver_shape() {
        let users = ResourceDefinition::new()
            .with_field("id", FieldDescriptor::new("id"))
            .with_operations([Operation::Read, Operation::Update])
            .protected()
            .with_child("orders", items());
        let tags = ResourceDefinition::new()
            .with_operations([Operation::Read])
            .with_child("items", items());
        let store = SpecStore::new(
            ResourceDefinition::new()
                .with_child("users", users)
                .with_child("tags", tags)
                .with_child("sde", items()),
        )
        .with_mount("sde", ResourceDefinition::new().with_child("types", items()))
        .unwrap();

        let routes = store.routes();
        let patterns: Vec<&str> = routes.iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(
            patterns,
            vec![
                "/sde/types",
                "/sde/types/{id}",
                "/tags",
                "/tags/{_}/items",
                "/tags/{_}/items/{id}",
                "/users",
                "/users/{id}",
                "/users/{id}/orders",
                "/users/{id}/orders/{id}",
            ]
        );

        let orders = routes.iter().find(|r| r.pattern == "/users/{id}/orders").unwrap();
        assert!(orders.protected, "protection is inherited by nested routes");
        assert_eq!(store.shadowed(), vec!["sde"]);
    }

    #[test]
    fn load_reports_missing_files() {
        let config = SpecConfig {
            root_path: "/nonexistent/api.json".into(),
            mounts: vec![],
        };
        assert!(matches!(SpecStore::load(&config), Err(SpecError::Io { .. })));
    }

    #[test]
    fn load_reads_json_and_yaml_documents() {
        let dir = std::env::temp_dir().join(format!("spec-store-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let root_path = dir.join("api.json");
        let mount_path = dir.join("esi.yaml");
        fs::write(
            &root_path,
            r#"{"paths": {"items": {"fields": {"id": {"name": "id"}}, "operations": ["R"]}}}"#,
        )
        .unwrap();
        fs::write(
            &mount_path,
            "paths:\n  characters:\n    fields:\n      id:\n        name: character_id\n    operations: CRUD\n    protected: true\n",
        )
        .unwrap();

        let config = SpecConfig {
            root_path,
            mounts: vec![crate::config::MountConfig {
                name: "esi".to_string(),
                path: mount_path,
            }],
        };
        let store = SpecStore::load(&config).unwrap();
        let characters = store.mount("esi").unwrap().child("characters").unwrap();
        assert!(characters.protected);
        assert_eq!(characters.operations.codes(), "CRUD");
        assert_eq!(characters.column_for("id"), "character_id");
        assert!(store.root().child("items").is_some());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_rejects_unknown_extensions() {
        let dir = std::env::temp_dir().join(format!("spec-store-ext-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("api.toml");
        fs::write(&path, "").unwrap();
        assert!(matches!(
            SpecStore::load_document(&path),
            Err(SpecError::UnsupportedFormat(_))
        ));
        let _ = fs::remove_dir_all(&dir);
    }
}
