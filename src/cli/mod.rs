pub mod commands;
pub mod utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::{config, MountConfig, SpecConfig};
use crate::spec::SpecStore;

#[derive(Parser)]
#[command(name = "dispatch")]
#[command(about = "Inspect specification documents and dry-run the request dispatcher")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Default root specification document (overrides SPEC_ROOT)")]
    pub root: Option<PathBuf>,

    #[arg(
        long = "mount",
        global = true,
        value_name = "NAME=PATH",
        help = "Mount group document; repeatable (overrides SPEC_MOUNTS)"
    )]
    pub mounts: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List every route pattern the loaded documents expose")]
    Routes,

    #[command(about = "Load every configured document and report what was found")]
    Check,

    #[command(about = "Run a request through the dispatcher without executing it")]
    Resolve {
        #[arg(help = "HTTP method (GET, POST, PATCH, DELETE)")]
        method: String,

        #[arg(help = "Request path, optionally with a query string")]
        path: String,

        #[arg(long, help = "Auth token to present")]
        token: Option<String>,

        #[arg(long, help = "User-Agent to fingerprint")]
        user_agent: Option<String>,

        #[arg(long, short = 'd', help = "JSON request body")]
        data: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

impl Cli {
    /// Configured document locations with command-line overrides applied.
    pub fn spec_config(&self) -> SpecConfig {
        let mut spec = config().spec.clone();
        if let Some(root) = &self.root {
            spec.root_path = root.clone();
        }
        if !self.mounts.is_empty() {
            spec.mounts = MountConfig::parse_list(&self.mounts.join(","));
        }
        spec
    }

    pub fn load_store(&self) -> anyhow::Result<SpecStore> {
        Ok(SpecStore::load(&self.spec_config())?)
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match &cli.command {
        Commands::Routes => commands::routes::handle(&cli, output_format),
        Commands::Check => commands::check::handle(&cli, output_format),
        Commands::Resolve {
            method,
            path,
            token,
            user_agent,
            data,
        } => commands::resolve::handle(
            &cli,
            commands::resolve::ResolveArgs {
                method,
                path,
                token: token.as_deref(),
                user_agent: user_agent.as_deref(),
                data: data.as_deref(),
            },
            output_format,
        ),
    }
}
