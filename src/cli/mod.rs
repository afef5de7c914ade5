//! # CLI Module
//!
//! Command-line inspection of route manifests.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! List the routes a manifest registers, in registration order:
//!
//! ```bash
//! radixmux routes --file routes.yaml
//! ```
//!
//! ### `tree`
//!
//! Print the radix tree of every method (or one with `--method`):
//!
//! ```bash
//! radixmux tree --file routes.yaml --method GET
//! ```
//!
//! ### `resolve`
//!
//! Dispatch a request through the manifest's routes and print the echoed
//! response, showing the matched route and extracted parameters:
//!
//! ```bash
//! radixmux resolve --file routes.yaml --method DELETE /user/42
//! ```
//!
//! Registration errors in the manifest (overlaps, invalid methods, ...)
//! fail every command with the full list.

mod commands;

pub use commands::{render_resolve, render_routes, render_tree, run_cli, Cli, Commands};
