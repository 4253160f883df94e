// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration merging.
//!
//! Handles merging configurations from different sources with proper precedence.

use std::path::PathBuf;

use crate::error::ConfigError;

use super::types::{EngineKind, ResolvedConfig, ServerConfigFile};

/// CLI options that can override configuration.
///
/// Environment variables are folded in by `clap` before they get here.
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub engine: Option<EngineKind>,
    pub python: Option<PathBuf>,
    pub max_concurrent_runs: Option<usize>,
    pub run_timeout_ms: Option<u64>,
    pub analysis_timeout_ms: Option<u64>,
}

/// Default configuration values.
pub fn default_config() -> ResolvedConfig {
    ResolvedConfig::default()
}

/// Merge multiple configurations with precedence.
///
/// Precedence (highest to lowest):
/// 1. CLI options / environment
/// 2. Workspace config (snipd.json, or the explicit `--config` file)
/// 3. Global config (~/.snipd/config.json)
/// 4. Default values
pub fn merge_config(
    global: Option<ServerConfigFile>,
    workspace: Option<ServerConfigFile>,
    cli: CliOptions,
) -> ResolvedConfig {
    let mut result = default_config();

    if let Some(config) = global {
        apply_config_file(&mut result, &config);
    }

    if let Some(config) = workspace {
        apply_config_file(&mut result, &config);
    }

    // Apply CLI options (highest precedence)
    apply_cli_options(&mut result, &cli);

    result
}

fn apply_config_file(result: &mut ResolvedConfig, config: &ServerConfigFile) {
    if let Some(ref server) = config.server {
        if let Some(ref host) = server.host {
            result.host = host.clone();
        }
        if let Some(port) = server.port {
            result.port = port;
        }
        if let Some(ref origins) = server.cors_origins {
            // A later file replaces the list rather than extending it
            result.cors_origins = origins.clone();
        }
    }

    if let Some(ref analysis) = config.analysis {
        if let Some(engine) = analysis.engine {
            result.engine = engine;
        }
        if let Some(timeout) = analysis.timeout_ms {
            result.analysis_timeout_ms = timeout;
        }
    }

    if let Some(ref sandbox) = config.sandbox {
        let target = &mut result.sandbox;
        if let Some(ref python) = sandbox.python {
            target.python = python.clone();
        }
        if let Some(v) = sandbox.timeout_ms {
            target.timeout_ms = v;
        }
        if let Some(v) = sandbox.max_timeout_ms {
            target.max_timeout_ms = v;
        }
        if let Some(v) = sandbox.max_concurrent_runs {
            target.max_concurrent_runs = v;
        }
        if let Some(v) = sandbox.queue_timeout_ms {
            target.queue_timeout_ms = v;
        }
        if let Some(v) = sandbox.output_limit_bytes {
            target.output_limit_bytes = v;
        }
        if let Some(v) = sandbox.memory_limit_mb {
            target.memory_limit_mb = v;
        }
        if let Some(v) = sandbox.file_size_limit_mb {
            target.file_size_limit_mb = v;
        }
        if sandbox.max_processes.is_some() {
            target.max_processes = sandbox.max_processes;
        }
        if sandbox.run_as_uid.is_some() {
            target.run_as_uid = sandbox.run_as_uid;
        }
        if sandbox.run_as_gid.is_some() {
            target.run_as_gid = sandbox.run_as_gid;
        }
    }

    if let Some(ref limits) = config.limits {
        if let Some(v) = limits.max_code_bytes {
            result.max_code_bytes = v;
        }
        if let Some(v) = limits.max_request_bytes {
            result.max_request_bytes = v;
        }
    }
}

fn apply_cli_options(result: &mut ResolvedConfig, cli: &CliOptions) {
    if let Some(ref host) = cli.host {
        result.host = host.clone();
    }

    if let Some(port) = cli.port {
        result.port = port;
    }

    if let Some(engine) = cli.engine {
        result.engine = engine;
    }

    if let Some(ref python) = cli.python {
        result.sandbox.python = python.clone();
    }

    if let Some(runs) = cli.max_concurrent_runs {
        result.sandbox.max_concurrent_runs = runs;
    }

    if let Some(timeout) = cli.run_timeout_ms {
        result.sandbox.timeout_ms = timeout;
    }

    if let Some(timeout) = cli.analysis_timeout_ms {
        result.analysis_timeout_ms = timeout;
    }
}

/// Reject configurations the server cannot run with.
pub fn validate_config(config: &ResolvedConfig) -> Result<(), ConfigError> {
    if config.host.trim().is_empty() {
        return Err(ConfigError::invalid("server.host", "must not be empty"));
    }
    if config.port == 0 {
        return Err(ConfigError::invalid("server.port", "must be non-zero"));
    }
    if config.analysis_timeout_ms == 0 {
        return Err(ConfigError::invalid("analysis.timeoutMs", "must be positive"));
    }

    let sandbox = &config.sandbox;
    if sandbox.python.as_os_str().is_empty() {
        return Err(ConfigError::invalid("sandbox.python", "must not be empty"));
    }
    if sandbox.timeout_ms == 0 {
        return Err(ConfigError::invalid("sandbox.timeoutMs", "must be positive"));
    }
    if sandbox.timeout_ms > sandbox.max_timeout_ms {
        return Err(ConfigError::invalid(
            "sandbox.timeoutMs",
            format!("{} exceeds maxTimeoutMs {}", sandbox.timeout_ms, sandbox.max_timeout_ms),
        ));
    }
    if sandbox.max_concurrent_runs == 0 {
        return Err(ConfigError::invalid("sandbox.maxConcurrentRuns", "must be at least 1"));
    }
    if sandbox.output_limit_bytes == 0 {
        return Err(ConfigError::invalid("sandbox.outputLimitBytes", "must be positive"));
    }
    if sandbox.memory_limit_mb == 0 {
        return Err(ConfigError::invalid("sandbox.memoryLimitMb", "must be positive"));
    }
    if sandbox.run_as_gid.is_some() && sandbox.run_as_uid.is_none() {
        return Err(ConfigError::invalid(
            "sandbox.runAsGid",
            "requires runAsUid to be set as well",
        ));
    }

    if config.max_code_bytes == 0 {
        return Err(ConfigError::invalid("limits.maxCodeBytes", "must be positive"));
    }
    if config.max_request_bytes < config.max_code_bytes {
        return Err(ConfigError::invalid(
            "limits.maxRequestBytes",
            "must be at least maxCodeBytes",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::types::{
        AnalysisSection, LimitsSection, SandboxSection, ServerSection,
    };

    #[test]
    fn test_default_config() {
        let config = default_config();
        assert_eq!(config.port, 5000);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_merge_config_precedence() {
        let global = ServerConfigFile {
            server: Some(ServerSection {
                port: Some(7000),
                host: Some("127.0.0.1".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let workspace = ServerConfigFile {
            server: Some(ServerSection {
                port: Some(8000),
                ..Default::default()
            }),
            ..Default::default()
        };

        let cli = CliOptions {
            port: Some(9000),
            ..Default::default()
        };

        let result = merge_config(Some(global.clone()), Some(workspace.clone()), cli);
        // CLI port takes precedence
        assert_eq!(result.port, 9000);
        // Global host survives when nothing overrides it
        assert_eq!(result.host, "127.0.0.1");

        let result = merge_config(Some(global), Some(workspace), CliOptions::default());
        assert_eq!(result.port, 8000);
    }

    #[test]
    fn test_merge_sandbox_section() {
        let workspace = ServerConfigFile {
            sandbox: Some(SandboxSection {
                max_concurrent_runs: Some(2),
                output_limit_bytes: Some(1024),
                run_as_uid: Some(65534),
                ..Default::default()
            }),
            analysis: Some(AnalysisSection {
                engine: Some(EngineKind::Jedi),
                timeout_ms: Some(500),
            }),
            ..Default::default()
        };

        let result = merge_config(None, Some(workspace), CliOptions::default());
        assert_eq!(result.sandbox.max_concurrent_runs, 2);
        assert_eq!(result.sandbox.output_limit_bytes, 1024);
        assert_eq!(result.sandbox.run_as_uid, Some(65534));
        // Untouched values keep their defaults
        assert_eq!(result.sandbox.timeout_ms, 5_000);
        assert_eq!(result.engine, EngineKind::Jedi);
        assert_eq!(result.analysis_timeout_ms, 500);
    }

    #[test]
    fn test_cors_origins_replaced() {
        let workspace = ServerConfigFile {
            server: Some(ServerSection {
                cors_origins: Some(vec!["http://localhost:3000".to_string()]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let result = merge_config(None, Some(workspace), CliOptions::default());
        assert_eq!(result.cors_origins, vec!["http://localhost:3000"]);
        assert!(!result.allows_any_origin());
    }

    #[test]
    fn test_cli_options_override() {
        let cli = CliOptions {
            engine: Some(EngineKind::Jedi),
            max_concurrent_runs: Some(16),
            run_timeout_ms: Some(1_000),
            analysis_timeout_ms: Some(250),
            ..Default::default()
        };

        let result = merge_config(None, None, cli);
        assert_eq!(result.engine, EngineKind::Jedi);
        assert_eq!(result.sandbox.max_concurrent_runs, 16);
        assert_eq!(result.sandbox.timeout_ms, 1_000);
        assert_eq!(result.analysis_timeout_ms, 250);
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let config = ResolvedConfig {
            port: 0,
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_validate_rejects_timeout_above_max() {
        let cli = CliOptions {
            run_timeout_ms: Some(60_000),
            ..Default::default()
        };
        let config = merge_config(None, None, cli);
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("sandbox.timeoutMs"));
    }

    #[test]
    fn test_validate_rejects_zero_runs() {
        let mut config = default_config();
        config.sandbox.max_concurrent_runs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_request_limit_covers_code_limit() {
        let workspace = ServerConfigFile {
            limits: Some(LimitsSection {
                max_code_bytes: Some(1024 * 1024),
                max_request_bytes: Some(1024),
            }),
            ..Default::default()
        };
        let config = merge_config(None, Some(workspace), CliOptions::default());
        assert!(validate_config(&config).is_err());
    }
}
