use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use http::Method;

use crate::dispatcher::{Dispatcher, Request};
use crate::echo::echo_endpoint;
use crate::manifest::load_manifest;
use crate::router::{parse_method, RouteTable, RouterConfig};

#[derive(Parser, Debug)]
#[command(name = "radixmux")]
#[command(about = "Inspect and resolve radix-tree route manifests", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered routes
    Routes {
        /// Route manifest (.yaml, .yml, .toml or .json)
        #[arg(short, long, env = "RADIXMUX_MANIFEST")]
        file: PathBuf,
    },
    /// Print the per-method radix trees
    Tree {
        #[arg(short, long, env = "RADIXMUX_MANIFEST")]
        file: PathBuf,
        /// Only print the tree of this method
        #[arg(short, long)]
        method: Option<String>,
    },
    /// Resolve a request path and print the echoed response
    Resolve {
        #[arg(short, long, env = "RADIXMUX_MANIFEST")]
        file: PathBuf,
        #[arg(short, long, default_value = "GET")]
        method: String,
        /// Request path, e.g. /user/42
        path: String,
    },
}

/// Execute a parsed command line, writing results to stdout
///
/// # Errors
///
/// Returns an error if the manifest cannot be read or parsed, if its routes
/// fail to register, or if `--method` names an unsupported method.
pub fn run_cli(cli: &Cli) -> Result<()> {
    let output = match &cli.command {
        Commands::Routes { file } => render_routes(&load_table(file)?),
        Commands::Tree { file, method } => {
            let method = method.as_deref().map(parse_method).transpose()?;
            render_tree(&load_table(file)?, method.as_ref())
        }
        Commands::Resolve { file, method, path } => {
            let method = parse_method(method)?;
            let dispatcher = Dispatcher::new(load_table(file)?.into());
            render_resolve(&dispatcher, method, path)?
        }
    };
    print!("{output}");
    Ok(())
}

fn load_table(file: &Path) -> Result<RouteTable> {
    let manifest = load_manifest(file)?;
    let router = manifest.build_router(RouterConfig::from_env(), |entry| {
        echo_endpoint(&entry.handler)
    });
    router
        .freeze()
        .with_context(|| format!("routes in {} failed to register", file.display()))
}

/// One line per route: display form and tree key
pub fn render_routes(table: &RouteTable) -> String {
    table
        .routes()
        .iter()
        .map(|route| format!("{route}\t{}\n", route.path.tree_key()))
        .collect()
}

/// Dump of each method tree, optionally restricted to one method
pub fn render_tree(table: &RouteTable, method: Option<&Method>) -> String {
    let mut out = String::new();
    for tree in table.registry().trees() {
        if method.is_some_and(|m| m != tree.method()) {
            continue;
        }
        out.push_str(&format!("{} ({} routes)\n", tree.method(), tree.len()));
        out.push_str(&tree.dump());
    }
    out
}

/// Status line followed by the pretty-printed response body
pub fn render_resolve(dispatcher: &Dispatcher, method: Method, path: &str) -> Result<String> {
    let response = dispatcher.dispatch(Request::new(method, path));
    let body = serde_json::to_string_pretty(&response.body)
        .context("failed to render response body")?;
    Ok(format!("{}\n{body}\n", response.status))
}
