use serde_json::json;

use crate::cli::utils::{output_error, output_json};
use crate::cli::{Cli, OutputFormat};

pub fn handle(cli: &Cli, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = match cli.load_store() {
        Ok(store) => store,
        Err(e) => {
            if let OutputFormat::Json = output_format {
                output_error(&output_format, &e.to_string(), Some("SPEC_LOAD_FAILED"))?;
            }
            return Err(e);
        }
    };

    let mounts: Vec<_> = store
        .mounts()
        .map(|(name, tree)| json!({ "name": name, "resources": tree.children.len() }))
        .collect();
    let shadowed = store.shadowed();
    let routes = store.routes().len();

    match output_format {
        OutputFormat::Json => output_json(&json!({
            "success": true,
            "root": { "resources": store.root().children.len() },
            "mounts": mounts,
            "shadowed": shadowed,
            "routes": routes,
        })),
        OutputFormat::Text => {
            println!("✓ root: {} resources", store.root().children.len());
            for (name, tree) in store.mounts() {
                println!("✓ /{}: {} resources", name, tree.children.len());
            }
            for name in &shadowed {
                println!("! root resource '{}' is shadowed by a mount group", name);
            }
            println!("{} routes", routes);
            Ok(())
        }
    }
}
