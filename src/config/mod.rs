// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration module for snipd.
//!
//! Handles loading, merging, and validation of configuration from multiple sources:
//! - Global config: ~/.snipd/config.json
//! - Working-directory config: snipd.json, .snipd.json or .snipd.yaml
//!   (or an explicit `--config` path, which replaces the search)
//! - CLI options and `SNIPD_*` environment variables
//!
//! Configuration is merged with precedence (CLI > file > global > defaults)
//! and validated once; the result is immutable for the life of the server.

mod loader;
mod merger;
mod types;

// Re-export public types
pub use loader::{
    get_example_config, get_global_config_dir, get_global_config_path, init_config,
    load_config_file, load_global_config, load_workspace_config, save_config, CONFIG_FILES,
    GLOBAL_CONFIG_DIR, GLOBAL_CONFIG_FILE,
};

pub use merger::{default_config, merge_config, validate_config, CliOptions};

pub use types::{
    AnalysisSection, EngineKind, LimitsSection, ResolvedConfig, SandboxSection, SandboxSettings,
    ServerConfigFile, ServerSection, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PYTHON,
};

use crate::error::ConfigError;
use std::path::Path;

/// Load, merge and validate all configuration sources.
///
/// This is the main entry point for configuration loading. When
/// `explicit` is given, that file must exist and is used instead of the
/// working-directory search.
pub fn load_config(
    workspace_root: &Path,
    explicit: Option<&Path>,
    cli_options: CliOptions,
) -> Result<ResolvedConfig, ConfigError> {
    let global = load_global_config()?;
    let workspace = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.display().to_string()));
            }
            Some(load_config_file(path)?)
        }
        None => load_workspace_config(workspace_root)?,
    };

    let config = merge_config(global, workspace, cli_options);
    validate_config(&config)?;
    Ok(config)
}
