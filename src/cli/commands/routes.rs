use serde_json::json;

use crate::cli::utils::output_json;
use crate::cli::{Cli, OutputFormat};

pub fn handle(cli: &Cli, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = cli.load_store()?;
    let routes = store.routes();

    match output_format {
        OutputFormat::Json => output_json(&json!({ "routes": routes })),
        OutputFormat::Text => {
            if routes.is_empty() {
                println!("No routes");
                return Ok(());
            }
            let width = routes.iter().map(|r| r.pattern.len()).max().unwrap_or(0);
            for route in &routes {
                println!(
                    "{:<width$}  {:<4}  {}",
                    route.pattern,
                    route.operations.codes(),
                    if route.protected { "protected" } else { "" },
                    width = width
                );
            }
            Ok(())
        }
    }
}
