//! Route manifests
//!
//! A manifest describes routes declaratively so they can be inspected and
//! resolved from the command line without writing Rust:
//!
//! ```yaml
//! routes:
//!   - path: /user/:id
//!     methods: [GET, DELETE]
//!     handler: user
//! groups:
//!   - prefix: /api
//!     routes:
//!       - { path: status, methods: [GET], handler: status }
//! ```
//!
//! YAML (`.yaml`/`.yml`), TOML (`.toml`) and JSON (`.json`) files are
//! accepted; the format is picked from the file extension.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dispatcher::Endpoint;
use crate::router::{RouteBuilder, Router, RouterConfig};

fn default_methods() -> Vec<String> {
    vec!["GET".to_string()]
}

/// One route in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub path: String,
    /// Defaults to `[GET]`
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,
    /// Name reported by the endpoint built for this route
    pub handler: String,
    #[serde(default)]
    pub ignore_case: bool,
}

/// Routes registered under a shared prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub prefix: String,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteManifest {
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Toml,
    Json,
}

impl ManifestFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| anyhow!("manifest {} has no file extension", path.display()))?;
        match ext.as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            other => bail!("unsupported manifest extension \".{other}\" (expected yaml, yml, toml or json)"),
        }
    }
}

/// Parse manifest text in the given format
pub fn parse_manifest(text: &str, format: ManifestFormat) -> Result<RouteManifest> {
    let manifest = match format {
        ManifestFormat::Yaml => serde_yaml::from_str(text).context("invalid YAML manifest")?,
        ManifestFormat::Toml => toml::from_str(text).context("invalid TOML manifest")?,
        ManifestFormat::Json => serde_json::from_str(text).context("invalid JSON manifest")?,
    };
    Ok(manifest)
}

/// Read and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<RouteManifest> {
    let format = ManifestFormat::from_path(path)?;
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    let manifest = parse_manifest(&text, format)
        .with_context(|| format!("failed to parse manifest {}", path.display()))?;
    info!(
        path = %path.display(),
        routes = manifest.routes.len(),
        groups = manifest.groups.len(),
        "Route manifest loaded"
    );
    Ok(manifest)
}

impl RouteManifest {
    /// Total number of routes, grouped ones included
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len() + self.groups.iter().map(|g| g.routes.len()).sum::<usize>()
    }

    /// Register every route on a new router
    ///
    /// `endpoint_for` supplies the endpoint of each entry. Registration
    /// errors are left on the router and surface from
    /// [`Router::freeze`].
    pub fn build_router<F>(&self, config: RouterConfig, mut endpoint_for: F) -> Router
    where
        F: FnMut(&RouteEntry) -> Endpoint,
    {
        let mut router = Router::with_config(config);
        for entry in &self.routes {
            let endpoint = endpoint_for(entry);
            let builder = router.handle_endpoint(&entry.path, endpoint, &methods(entry));
            apply_options(builder, entry);
        }
        for group in &self.groups {
            let mut scope = router.group(&group.prefix);
            for entry in &group.routes {
                let endpoint = endpoint_for(entry);
                let builder = scope.handle_endpoint(&entry.path, endpoint, &methods(entry));
                apply_options(builder, entry);
            }
        }
        debug!(routes = router.routes().len(), "Manifest routes registered");
        router
    }
}

fn methods(entry: &RouteEntry) -> Vec<&str> {
    entry.methods.iter().map(String::as_str).collect()
}

fn apply_options(builder: RouteBuilder<'_>, entry: &RouteEntry) {
    if entry.ignore_case {
        builder.ignore_case();
    }
}
