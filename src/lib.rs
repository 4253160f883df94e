// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! snipd - backend for in-browser Python editors.
//!
//! Three operations over a snippet of Python source:
//!
//! - **autocomplete**: completion candidates at a cursor position
//! - **hover**: Markdown documentation for the symbol under the cursor
//! - **run**: execute the snippet in a sandboxed interpreter
//!
//! # Architecture
//!
//! - [`types`] - Value types shared by every layer (positions, completions, hover, results)
//! - [`error`] - Error types per component boundary
//! - [`config`] - Configuration loading and merging
//! - [`telemetry`] - Tracing, metrics, and correlation ids
//! - [`analysis`] - Analysis engines (tree-sitter, jedi) behind [`analysis::AnalysisEngine`]
//! - [`docs`] - Docstring structuring and Markdown rendering
//! - [`sandbox`] - Subprocess execution with kernel resource limits
//! - [`api`] - axum HTTP/JSON surface
//!
//! # Example
//!
//! ```rust,ignore
//! use snipd::api::{self, AppState};
//! use snipd::config::{load_config, CliOptions};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = load_config(".".as_ref(), None, CliOptions::default())?;
//! let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
//! let state = AppState::from_config(config, CancellationToken::new());
//! api::serve(listener, state).await?;
//! ```

pub mod analysis;
pub mod api;
pub mod config;
pub mod docs;
pub mod error;
pub mod sandbox;
pub mod telemetry;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{AnalysisError, ConfigError, Result, SandboxError, ValidationError};
pub use types::{
    Completion, CompletionKind, Definition, ExecutionResult, FormattedDoc, HoverContent, LookupMode,
    Position,
};

/// snipd version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_public_exports() {
        let _position = Position::new(1, 0);
        let _hover = HoverContent::markdown("**x**");
    }
}
