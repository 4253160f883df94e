// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Code intelligence for Python snippets.
//!
//! [`AnalysisEngine`] is the seam between the API and whatever does the
//! actual analysis. Two engines ship:
//!
//! - [`TreeSitterEngine`]: in-process static analysis over a tree-sitter
//!   parse (scopes, simple value hints, builtin and stdlib tables).
//! - [`JediEngine`]: jedi in a Python subprocess, when it is installed.
//!
//! [`AnalysisAdapter`] wraps an engine with the request-level contract:
//! positions outside the document yield nothing without consulting the
//! engine, every call runs under a wall-clock budget, engine panics become
//! [`AnalysisError::Internal`], and raw completions are normalized.

pub mod builtins;
pub mod context;
pub mod docstring;
pub mod jedi;
pub mod resolve;
pub mod scope;
pub mod treesitter;

pub use jedi::JediEngine;
pub use treesitter::TreeSitterEngine;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::{EngineKind, ResolvedConfig};
use crate::error::AnalysisError;
use crate::timed;
use crate::types::{Completion, Definition, LookupMode, Position, RawCompletion};

/// A code-intelligence backend.
///
/// Positions are 1-based lines and 0-based character columns. Engines must
/// tolerate syntactically invalid code and report "nothing found" as an
/// empty list, reserving errors for genuine faults.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    /// Short engine name, reported on `/health`.
    fn name(&self) -> &'static str;

    /// Completion candidates at the position, in relevance order.
    async fn complete(&self, code: &str, position: Position) -> Result<Vec<RawCompletion>, AnalysisError>;

    /// Definitions of the symbol at the position.
    async fn lookup(
        &self,
        code: &str,
        position: Position,
        mode: LookupMode,
    ) -> Result<Vec<Definition>, AnalysisError>;
}

/// Construct the engine selected in the configuration.
pub fn build_engine(config: &ResolvedConfig) -> Arc<dyn AnalysisEngine> {
    match config.engine {
        EngineKind::TreeSitter => Arc::new(TreeSitterEngine::new().with_parse_budget(config.analysis_timeout())),
        EngineKind::Jedi => Arc::new(JediEngine::new(config.sandbox.python.clone())),
    }
}

/// Request-level wrapper around an engine.
#[derive(Clone)]
pub struct AnalysisAdapter {
    engine: Arc<dyn AnalysisEngine>,
    budget: Duration,
}

impl AnalysisAdapter {
    pub fn new(engine: Arc<dyn AnalysisEngine>, budget: Duration) -> Self {
        Self { engine, budget }
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Completions at `line`/`column`, normalized for the editor.
    pub async fn complete(&self, code: &str, line: usize, column: usize) -> Result<Vec<Completion>, AnalysisError> {
        let position = Position::new(line, column);
        if position.to_byte_offset(code).is_none() {
            debug!(line, column, "Completion position outside document");
            return Ok(Vec::new());
        }

        let timer = timed!("analysis.complete");
        let engine = Arc::clone(&self.engine);
        let code = code.to_string();
        let raw = self
            .bounded(async move { engine.complete(&code, position).await })
            .await?;
        timer.finish();

        Ok(raw.into_iter().map(Completion::from).collect())
    }

    /// Definitions of the symbol at `line`/`column`.
    pub async fn lookup(
        &self,
        code: &str,
        line: usize,
        column: usize,
        mode: LookupMode,
    ) -> Result<Vec<Definition>, AnalysisError> {
        let position = Position::new(line, column);
        if position.to_byte_offset(code).is_none() {
            debug!(line, column, "Lookup position outside document");
            return Ok(Vec::new());
        }

        let timer = timed!("analysis.lookup");
        let engine = Arc::clone(&self.engine);
        let code = code.to_string();
        let definitions = self
            .bounded(async move { engine.lookup(&code, position, mode).await })
            .await?;
        timer.finish();

        Ok(definitions)
    }

    /// Run engine work on its own task under the budget.
    ///
    /// A panic surfaces as a join error; on timeout the task is aborted,
    /// which drops any bridge process with it. Aborting cannot interrupt
    /// `spawn_blocking` work, so the tree-sitter engine carries the same
    /// budget into its parser.
    async fn bounded<T, F>(&self, work: F) -> Result<T, AnalysisError>
    where
        T: Send + 'static,
        F: std::future::Future<Output = Result<T, AnalysisError>> + Send + 'static,
    {
        let mut handle = tokio::spawn(work);
        match tokio::time::timeout(self.budget, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => {
                warn!(error = %join, engine = self.engine.name(), "Analysis task panicked");
                Err(AnalysisError::Internal("analysis task panicked".to_string()))
            }
            Err(_) => {
                handle.abort();
                let budget_ms = self.budget.as_millis() as u64;
                warn!(budget_ms, engine = self.engine.name(), "Analysis timed out");
                Err(AnalysisError::Timeout(budget_ms))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CompletionKind;

    fn adapter(engine: MockAnalysisEngine) -> AnalysisAdapter {
        AnalysisAdapter::new(Arc::new(engine), Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_out_of_range_skips_engine() {
        let mut engine = MockAnalysisEngine::new();
        engine.expect_complete().never();
        engine.expect_lookup().never();
        let adapter = adapter(engine);

        assert!(adapter.complete("x = 1", 5, 0).await.unwrap().is_empty());
        assert!(adapter.complete("x = 1", 1, 99).await.unwrap().is_empty());
        assert!(adapter.complete("x = 1", 0, 0).await.unwrap().is_empty());
        assert!(adapter
            .lookup("x = 1", 3, 0, LookupMode::Goto)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_completions_are_normalized_in_order() {
        let mut engine = MockAnalysisEngine::new();
        engine.expect_complete().returning(|_, _| {
            Ok(vec![
                RawCompletion::new("print", "function").with_docstring("Prints."),
                RawCompletion::new("os", "module"),
                RawCompletion::new("x", "statement"),
            ])
        });
        let completions = adapter(engine).complete("pr", 1, 2).await.unwrap();

        let kinds: Vec<_> = completions.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![CompletionKind::Function, CompletionKind::Other, CompletionKind::Variable]
        );
        assert_eq!(completions[0].insert_text, "print");
        assert_eq!(completions[0].documentation, "Prints.");
    }

    #[tokio::test]
    async fn test_engine_errors_propagate() {
        let mut engine = MockAnalysisEngine::new();
        engine
            .expect_lookup()
            .returning(|_, _, _| Err(AnalysisError::EngineUnavailable("no jedi".into())));
        engine.expect_name().return_const("mock");
        let result = adapter(engine).lookup("x", 1, 0, LookupMode::Infer).await;
        assert!(matches!(result, Err(AnalysisError::EngineUnavailable(_))));
    }

    struct SlowEngine;

    #[async_trait]
    impl AnalysisEngine for SlowEngine {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn complete(&self, _code: &str, _position: Position) -> Result<Vec<RawCompletion>, AnalysisError> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(Vec::new())
        }

        async fn lookup(
            &self,
            _code: &str,
            _position: Position,
            _mode: LookupMode,
        ) -> Result<Vec<Definition>, AnalysisError> {
            panic!("engine bug");
        }
    }

    #[tokio::test]
    async fn test_budget_exceeded_is_timeout() {
        let adapter = AnalysisAdapter::new(Arc::new(SlowEngine), Duration::from_millis(20));
        let result = adapter.complete("x", 1, 1).await;
        assert!(matches!(result, Err(AnalysisError::Timeout(20))));
    }

    #[tokio::test]
    async fn test_panic_is_internal_error() {
        let adapter = AnalysisAdapter::new(Arc::new(SlowEngine), Duration::from_secs(1));
        let result = adapter.lookup("x", 1, 0, LookupMode::Goto).await;
        assert!(matches!(result, Err(AnalysisError::Internal(_))));
    }

    #[test]
    fn test_build_engine_from_config() {
        let mut config = ResolvedConfig::default();
        assert_eq!(build_engine(&config).name(), "tree-sitter");
        config.engine = EngineKind::Jedi;
        assert_eq!(build_engine(&config).name(), "jedi");
    }
}
