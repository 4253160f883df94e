// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration loading from files.
//!
//! Handles loading configuration from JSON and YAML files in various locations.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::{
    AnalysisSection, EngineKind, LimitsSection, SandboxSection, ServerConfigFile, ServerSection,
};

/// Config file names to search for in the working directory (in order).
pub const CONFIG_FILES: &[&str] = &["snipd.json", ".snipd.json", ".snipd.yaml", ".snipd.yml"];

/// Global config directory name.
pub const GLOBAL_CONFIG_DIR: &str = ".snipd";

/// Global config file name.
pub const GLOBAL_CONFIG_FILE: &str = "config.json";

/// Get the global config directory path.
pub fn get_global_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(GLOBAL_CONFIG_DIR))
}

/// Get the global config file path.
pub fn get_global_config_path() -> Option<PathBuf> {
    get_global_config_dir().map(|dir| dir.join(GLOBAL_CONFIG_FILE))
}

/// Load global configuration from ~/.snipd/config.json.
pub fn load_global_config() -> Result<Option<ServerConfigFile>, ConfigError> {
    let path = match get_global_config_path() {
        Some(p) => p,
        None => return Ok(None),
    };

    if !path.exists() {
        return Ok(None);
    }

    load_config_file(&path).map(Some)
}

/// Load configuration from the working directory.
///
/// Searches for config files in the following order:
/// 1. snipd.json
/// 2. .snipd.json
/// 3. .snipd.yaml
/// 4. .snipd.yml
pub fn load_workspace_config(dir: &Path) -> Result<Option<ServerConfigFile>, ConfigError> {
    for filename in CONFIG_FILES {
        let path = dir.join(filename);
        if path.exists() {
            return load_config_file(&path).map(Some);
        }
    }
    Ok(None)
}

/// Load a configuration file (JSON or YAML).
pub fn load_config_file(path: &Path) -> Result<ServerConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(ConfigError::from),
        _ => serde_json::from_str(&content).map_err(ConfigError::from),
    }
}

/// Save configuration to a file in `dir`.
pub fn save_config(
    dir: &Path,
    config: &ServerConfigFile,
    filename: Option<&str>,
) -> Result<PathBuf, ConfigError> {
    let filename = filename.unwrap_or("snipd.json");
    let path = dir.join(filename);

    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, content)?;

    Ok(path)
}

/// Initialize a new config file with the example configuration.
///
/// Refuses to overwrite an existing file.
pub fn init_config(dir: &Path) -> Result<PathBuf, ConfigError> {
    let path = dir.join("snipd.json");
    if path.exists() {
        return Err(ConfigError::InvalidFormat(format!(
            "{} already exists",
            path.display()
        )));
    }
    save_config(dir, &get_example_config(), None)
}

/// Get an example configuration.
pub fn get_example_config() -> ServerConfigFile {
    ServerConfigFile {
        server: Some(ServerSection {
            host: Some("127.0.0.1".to_string()),
            port: Some(5000),
            cors_origins: Some(vec!["*".to_string()]),
        }),
        analysis: Some(AnalysisSection {
            engine: Some(EngineKind::TreeSitter),
            timeout_ms: Some(3_000),
        }),
        sandbox: Some(SandboxSection {
            python: Some(PathBuf::from("python3")),
            timeout_ms: Some(5_000),
            max_timeout_ms: Some(30_000),
            max_concurrent_runs: Some(4),
            queue_timeout_ms: Some(2_000),
            output_limit_bytes: Some(64 * 1024),
            memory_limit_mb: Some(512),
            ..Default::default()
        }),
        limits: Some(LimitsSection {
            max_code_bytes: Some(256 * 1024),
            max_request_bytes: Some(512 * 1024),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_files_order() {
        assert_eq!(CONFIG_FILES.len(), 4);
        assert_eq!(CONFIG_FILES[0], "snipd.json");
    }

    #[test]
    fn test_global_config_dir() {
        let dir = get_global_config_dir();
        assert!(dir.is_some());
        let dir = dir.unwrap();
        assert!(dir.ends_with(".snipd"));
    }

    #[test]
    fn test_load_workspace_config_not_found() {
        let temp = TempDir::new().unwrap();
        let result = load_workspace_config(temp.path());
        assert!(result.is_ok());
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_load_workspace_config_json() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("snipd.json"),
            r#"{"server": {"port": 9000}, "analysis": {"engine": "jedi"}}"#,
        )
        .unwrap();

        let config = load_workspace_config(temp.path()).unwrap().unwrap();
        assert_eq!(config.server.unwrap().port, Some(9000));
        assert_eq!(config.analysis.unwrap().engine, Some(EngineKind::Jedi));
    }

    #[test]
    fn test_load_workspace_config_yaml() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".snipd.yaml"),
            "sandbox:\n  maxConcurrentRuns: 2\n  timeoutMs: 1500\n",
        )
        .unwrap();

        let config = load_workspace_config(temp.path()).unwrap().unwrap();
        let sandbox = config.sandbox.unwrap();
        assert_eq!(sandbox.max_concurrent_runs, Some(2));
        assert_eq!(sandbox.timeout_ms, Some(1500));
    }

    #[test]
    fn test_load_config_file_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("snipd.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = load_config_file(&path);
        assert!(matches!(result, Err(ConfigError::JsonError(_))));
    }

    #[test]
    fn test_init_config_writes_example() {
        let temp = TempDir::new().unwrap();
        let path = init_config(temp.path()).unwrap();
        assert!(path.exists());

        let loaded = load_config_file(&path).unwrap();
        assert_eq!(loaded, get_example_config());
    }

    #[test]
    fn test_init_config_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        init_config(temp.path()).unwrap();
        assert!(init_config(temp.path()).is_err());
    }
}
