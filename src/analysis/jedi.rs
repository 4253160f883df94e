// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Analysis through jedi, run in a short-lived Python process.
//!
//! Each call spawns `python -I -c <bridge>`, writes one JSON request to its
//! stdin and reads one JSON response from its stdout. The child is killed if
//! the caller stops waiting.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::AnalysisError;
use crate::types::{Definition, LookupMode, Position, RawCompletion};

use super::AnalysisEngine;

const BRIDGE: &str = r#"
import json
import sys


def main():
    request = json.load(sys.stdin)
    try:
        import jedi
    except ImportError:
        return {"error": "jedi is not installed", "unavailable": True}

    script = jedi.Script(request["code"])
    line, column = request["line"], request["column"]
    op = request["op"]
    if op == "complete":
        return {
            "completions": [
                {"name": c.name, "type": c.type, "docstring": c.docstring()}
                for c in script.complete(line, column)
            ]
        }

    names = script.infer(line, column) if op == "infer" else script.goto(line, column)
    definitions = []
    for name in names:
        local = name.module_path is None and not name.in_builtin_module()
        definitions.append({
            "name": name.name,
            "kind": name.type,
            "docstring": name.docstring(raw=True) or None,
            "line": name.line if local else None,
            "column": name.column if local else None,
        })
    return {"definitions": definitions}


try:
    response = main()
except Exception as exc:
    response = {"error": "%s: %s" % (type(exc).__name__, exc)}
json.dump(response, sys.stdout)
"#;

#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    op: &'a str,
    code: &'a str,
    line: usize,
    column: usize,
}

#[derive(Debug, Default, Deserialize)]
struct BridgeResponse {
    #[serde(default)]
    completions: Option<Vec<RawCompletion>>,
    #[serde(default)]
    definitions: Option<Vec<Definition>>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    unavailable: bool,
}

/// Engine delegating to jedi in a Python subprocess.
#[derive(Debug, Clone)]
pub struct JediEngine {
    python: PathBuf,
}

impl JediEngine {
    pub fn new(python: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
        }
    }

    pub fn python(&self) -> &Path {
        &self.python
    }

    async fn call(&self, op: &str, code: &str, position: Position) -> Result<BridgeResponse, AnalysisError> {
        let request = serde_json::to_vec(&BridgeRequest {
            op,
            code,
            line: position.line,
            column: position.column,
        })
        .map_err(|e| AnalysisError::Protocol(e.to_string()))?;

        let mut child = Command::new(&self.python)
            .args(["-I", "-c", BRIDGE])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    AnalysisError::EngineUnavailable(format!("{} not found", self.python.display()))
                }
                _ => AnalysisError::Internal(format!("Failed to start {}: {e}", self.python.display())),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&request)
                .await
                .map_err(|e| AnalysisError::Protocol(format!("Failed to write request: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| AnalysisError::Internal(format!("Bridge process failed: {e}")))?;

        debug!(
            op,
            status = ?output.status,
            stdout_bytes = output.stdout.len(),
            "jedi bridge finished"
        );

        let response = parse_response(&output.stdout).map_err(|e| {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr.lines().last().unwrap_or_default().to_string();
            AnalysisError::Protocol(format!("{e} (stderr: {tail})"))
        })?;

        match response.error {
            Some(message) if response.unavailable => Err(AnalysisError::EngineUnavailable(message)),
            Some(message) => Err(AnalysisError::Internal(message)),
            None => Ok(response),
        }
    }
}

fn parse_response(stdout: &[u8]) -> Result<BridgeResponse, String> {
    if stdout.iter().all(|b| b.is_ascii_whitespace()) {
        return Err("empty bridge response".to_string());
    }
    serde_json::from_slice(stdout).map_err(|e| format!("invalid bridge response: {e}"))
}

#[async_trait]
impl AnalysisEngine for JediEngine {
    fn name(&self) -> &'static str {
        "jedi"
    }

    async fn complete(&self, code: &str, position: Position) -> Result<Vec<RawCompletion>, AnalysisError> {
        let response = self.call("complete", code, position).await?;
        Ok(response.completions.unwrap_or_default())
    }

    async fn lookup(
        &self,
        code: &str,
        position: Position,
        mode: LookupMode,
    ) -> Result<Vec<Definition>, AnalysisError> {
        let response = self.call(mode.as_str(), code, position).await?;
        Ok(response.definitions.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completions() {
        let body = br#"{"completions": [{"name": "print", "type": "function", "docstring": "print(...)"}]}"#;
        let response = parse_response(body).unwrap();
        let completions = response.completions.unwrap();
        assert_eq!(completions[0].name, "print");
        assert_eq!(completions[0].type_tag, "function");
    }

    #[test]
    fn test_parse_definitions() {
        let body = br#"{"definitions": [{"name": "f", "kind": "function", "docstring": null, "line": 1, "column": 4}]}"#;
        let response = parse_response(body).unwrap();
        let definitions = response.definitions.unwrap();
        assert_eq!(definitions[0].line, Some(1));
        assert_eq!(definitions[0].docstring, None);
    }

    #[test]
    fn test_parse_error_flags() {
        let body = br#"{"error": "jedi is not installed", "unavailable": true}"#;
        let response = parse_response(body).unwrap();
        assert!(response.unavailable);
        assert_eq!(response.error.as_deref(), Some("jedi is not installed"));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_response(b"").is_err());
        assert!(parse_response(b"Traceback (most recent call last)").is_err());
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_unavailable() {
        let engine = JediEngine::new("/nonexistent/python-for-snipd-tests");
        let result = engine.complete("pri", Position::new(1, 3)).await;
        assert!(matches!(result, Err(AnalysisError::EngineUnavailable(_))));
    }
}
