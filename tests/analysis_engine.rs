// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! End-to-end analysis through the adapter with the tree-sitter engine.

use std::sync::Arc;
use std::time::Duration;

use snipd::analysis::{AnalysisAdapter, TreeSitterEngine};
use snipd::docs::DocFormatter;
use snipd::types::{CompletionKind, LookupMode};

fn adapter() -> AnalysisAdapter {
    AnalysisAdapter::new(Arc::new(TreeSitterEngine::new()), Duration::from_secs(3))
}

/// 1-based line and 0-based column of the end of `needle` in `code`.
fn cursor_after(code: &str, needle: &str) -> (usize, usize) {
    let end = code.find(needle).unwrap() + needle.len();
    let before = &code[..end];
    let line = before.matches('\n').count() + 1;
    let column = before.rsplit('\n').next().unwrap().chars().count();
    (line, column)
}

#[tokio::test]
async fn test_builtin_completion_is_normalized() {
    let completions = adapter().complete("pri", 1, 3).await.unwrap();

    let print = &completions[0];
    assert_eq!(print.label, "print");
    assert_eq!(print.insert_text, "print");
    assert_eq!(print.kind, CompletionKind::Function);
    assert!(!print.documentation.is_empty());
}

#[tokio::test]
async fn test_local_variable_completion() {
    let code = "counter = 0\ncou";
    let (line, column) = cursor_after(code, "\ncou");
    let completions = adapter().complete(code, line, column).await.unwrap();

    let counter = completions.iter().find(|c| c.label == "counter").unwrap();
    assert_eq!(counter.kind, CompletionKind::Variable);
}

#[tokio::test]
async fn test_attribute_completion_on_module() {
    let code = "import math\nmath.fl";
    let (line, column) = cursor_after(code, "math.fl");
    let labels: Vec<_> = adapter()
        .complete(code, line, column)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.label)
        .collect();
    assert_eq!(labels, vec!["floor"]);
}

#[tokio::test]
async fn test_unicode_columns_count_characters() {
    let code = "naïve = 1\nna";
    let (line, column) = cursor_after(code, "\nna");
    let completions = adapter().complete(code, line, column).await.unwrap();
    assert!(completions.iter().any(|c| c.label == "naïve"));
}

#[tokio::test]
async fn test_position_past_end_of_line_is_empty() {
    assert!(adapter().complete("x = 1", 1, 40).await.unwrap().is_empty());
    assert!(adapter().lookup("x = 1", 3, 0, LookupMode::Goto).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_broken_code_still_completes() {
    let code = "def broken(:\n    return [1, 2\npri";
    let (line, column) = cursor_after(code, "\npri");
    let completions = adapter().complete(code, line, column).await.unwrap();
    assert!(completions.iter().any(|c| c.label == "print"));
}

#[tokio::test]
async fn test_hover_on_documented_function() {
    let code = "def scale(value, factor=2):\n    \"\"\"Multiply a value.\n\n    Args:\n        value (float): Input.\n        factor (int): Multiplier.\n\n    Returns:\n        float: The product.\n    \"\"\"\n    return value * factor\n\nscale(3)\n";
    let (line, column) = cursor_after(code, "\nsca");
    let definitions = adapter().lookup(code, line, column, LookupMode::Goto).await.unwrap();
    assert_eq!(definitions.len(), 1);
    assert_eq!(definitions[0].line, Some(1));

    let hover = DocFormatter::new().hover(&definitions[0]);
    assert!(hover.value.starts_with("**scale** *(function)*"));
    assert!(hover.value.contains("**Parameters**"));
    assert!(hover.value.contains("- `value` (*float*): Input."));
    assert!(hover.value.contains("*float*: The product."));
}

#[tokio::test]
async fn test_hover_on_undocumented_name_has_header_only() {
    let code = "total = 10\ntotal\n";
    let definitions = adapter().lookup(code, 2, 2, LookupMode::Goto).await.unwrap();
    assert_eq!(definitions[0].name, "total");

    let hover = DocFormatter::new().hover(&definitions[0]);
    assert!(hover.value.starts_with("**total**"));
    assert!(!hover.value.contains("```"));
}

#[tokio::test]
async fn test_hover_on_builtin() {
    let definitions = adapter().lookup("len([])", 1, 1, LookupMode::Goto).await.unwrap();
    assert_eq!(definitions[0].name, "len");
    assert_eq!(definitions[0].line, None);
    assert!(definitions[0].docstring.is_some());
}
