// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration type definitions.
//!
//! Defines the structure of config files (every field optional, JSON or
//! YAML) and the resolved configuration the server runs with.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Config file contents.
/// Can be defined in snipd.json, .snipd.json or .snipd.yaml.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfigFile {
    /// Network settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerSection>,

    /// Analysis engine settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisSection>,

    /// Execution sandbox settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<SandboxSection>,

    /// Request size limits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<LimitsSection>,
}

/// Network settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Allowed CORS origins; `*` allows any origin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cors_origins: Option<Vec<String>>,
}

/// Which analysis engine backs autocomplete and hover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// In-process tree-sitter scope resolution
    #[default]
    TreeSitter,
    /// Python `jedi` through a bridge subprocess
    Jedi,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TreeSitter => "tree-sitter",
            Self::Jedi => "jedi",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tree-sitter" | "treesitter" | "tree_sitter" => Some(Self::TreeSitter),
            "jedi" => Some(Self::Jedi),
            _ => None,
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Analysis engine settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineKind>,

    /// Wall-clock budget per analysis call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// Execution sandbox settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxSection {
    /// Interpreter used for runs (and the jedi bridge)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python: Option<PathBuf>,

    /// Default run time limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Upper bound for a client-requested time limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_timeout_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_runs: Option<usize>,

    /// How long a run may wait for a free slot before "server busy"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_timeout_ms: Option<u64>,

    /// Cap per captured stream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_limit_bytes: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_limit_mb: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_limit_mb: Option<u64>,

    /// RLIMIT_NPROC for the sandboxed process (per-user on Linux)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_as_uid: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_as_gid: Option<u32>,
}

/// Request size limits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_code_bytes: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_request_bytes: Option<usize>,
}

/// Fully resolved configuration with all defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub engine: EngineKind,
    pub analysis_timeout_ms: u64,
    pub sandbox: SandboxSettings,
    pub max_code_bytes: usize,
    pub max_request_bytes: usize,
}

/// Resolved sandbox settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxSettings {
    pub python: PathBuf,
    pub timeout_ms: u64,
    pub max_timeout_ms: u64,
    pub max_concurrent_runs: usize,
    pub queue_timeout_ms: u64,
    pub output_limit_bytes: usize,
    pub memory_limit_mb: u64,
    pub file_size_limit_mb: u64,
    pub max_processes: Option<u64>,
    pub run_as_uid: Option<u32>,
    pub run_as_gid: Option<u32>,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            python: PathBuf::from(DEFAULT_PYTHON),
            timeout_ms: 5_000,
            max_timeout_ms: 30_000,
            max_concurrent_runs: 4,
            queue_timeout_ms: 2_000,
            output_limit_bytes: 64 * 1024,
            memory_limit_mb: 512,
            file_size_limit_mb: 16,
            max_processes: None,
            run_as_uid: None,
            run_as_gid: None,
        }
    }
}

impl SandboxSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn queue_timeout(&self) -> Duration {
        Duration::from_millis(self.queue_timeout_ms)
    }

    /// Clamp a requested time limit into `[1ms, max_timeout_ms]`, falling
    /// back to the default when none was requested.
    pub fn effective_timeout(&self, requested_ms: Option<u64>) -> Duration {
        let ms = requested_ms
            .unwrap_or(self.timeout_ms)
            .clamp(1, self.max_timeout_ms);
        Duration::from_millis(ms)
    }
}

/// Default interpreter name, resolved through PATH.
pub const DEFAULT_PYTHON: &str = "python3";

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port.
pub const DEFAULT_PORT: u16 = 5000;

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
            engine: EngineKind::default(),
            analysis_timeout_ms: 3_000,
            sandbox: SandboxSettings::default(),
            max_code_bytes: 256 * 1024,
            max_request_bytes: 512 * 1024,
        }
    }
}

impl ResolvedConfig {
    /// Address the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parsed socket address, if the host is an IP literal.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.bind_address().parse().ok()
    }

    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_millis(self.analysis_timeout_ms)
    }

    /// Whether CORS should accept any origin.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_defaults() {
        let config = ResolvedConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.engine, EngineKind::TreeSitter);
        assert_eq!(config.sandbox.max_concurrent_runs, 4);
        assert!(config.allows_any_origin());
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert!(config.socket_addr().is_some());
    }

    #[test]
    fn test_effective_timeout_clamps() {
        let sandbox = SandboxSettings::default();
        assert_eq!(sandbox.effective_timeout(None), Duration::from_millis(5_000));
        assert_eq!(sandbox.effective_timeout(Some(1_000)), Duration::from_millis(1_000));
        assert_eq!(sandbox.effective_timeout(Some(999_999)), Duration::from_millis(30_000));
        assert_eq!(sandbox.effective_timeout(Some(0)), Duration::from_millis(1));
    }

    #[test]
    fn test_engine_kind_serde() {
        let json = serde_json::to_string(&EngineKind::TreeSitter).unwrap();
        assert_eq!(json, "\"tree-sitter\"");
        let parsed: EngineKind = serde_json::from_str("\"jedi\"").unwrap();
        assert_eq!(parsed, EngineKind::Jedi);
        assert_eq!(EngineKind::from_str("TreeSitter"), Some(EngineKind::TreeSitter));
        assert_eq!(EngineKind::from_str("pyright"), None);
    }

    #[test]
    fn test_config_file_deserialize_camel_case() {
        let json = r#"{
            "server": {"port": 8080, "corsOrigins": ["http://localhost:3000"]},
            "sandbox": {"maxConcurrentRuns": 8, "outputLimitBytes": 1024}
        }"#;
        let config: ServerConfigFile = serde_json::from_str(json).unwrap();
        let server = config.server.unwrap();
        assert_eq!(server.port, Some(8080));
        assert_eq!(server.cors_origins.unwrap(), vec!["http://localhost:3000"]);
        let sandbox = config.sandbox.unwrap();
        assert_eq!(sandbox.max_concurrent_runs, Some(8));
        assert_eq!(sandbox.output_limit_bytes, Some(1024));
    }

    #[test]
    fn test_config_file_serialize_skips_none() {
        let config = ServerConfigFile::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, "{}");
    }
}
