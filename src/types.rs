// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Core value types shared by the analysis, docs, sandbox and API layers.
//!
//! Every type here is constructed fresh per request and discarded once the
//! response is serialized. Wire names are camelCase to match what editor
//! clients (Monaco in particular) expect.

use serde::{Deserialize, Serialize};

// ============================================================================
// Positions
// ============================================================================

/// Cursor position inside a snippet.
///
/// `line` is 1-based, `column` is 0-based and counts Unicode scalar values,
/// which is what browser editors report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Resolve this position to a byte offset into `code`.
    ///
    /// Returns `None` when the line is past the last line or the column is
    /// past the end of the line. The end of a line (and of the document) is
    /// a valid cursor position.
    pub fn to_byte_offset(&self, code: &str) -> Option<usize> {
        if self.line == 0 {
            return None;
        }

        let mut line_start = 0usize;
        for (index, raw_line) in code.split('\n').enumerate() {
            if index + 1 == self.line {
                let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
                if self.column == 0 {
                    return Some(line_start);
                }
                return line
                    .char_indices()
                    .map(|(offset, ch)| offset + ch.len_utf8())
                    .nth(self.column - 1)
                    .map(|offset| line_start + offset);
            }
            line_start += raw_line.len() + 1;
        }

        None
    }
}

/// A validated analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub code: String,
    pub line: usize,
    pub column: usize,
}

impl AnalysisRequest {
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

/// A validated run request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

// ============================================================================
// Completions
// ============================================================================

/// Editor-facing classification of a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompletionKind {
    Function,
    Variable,
    Other,
}

impl CompletionKind {
    /// Map an engine's raw type tag onto the editor-facing kind.
    ///
    /// Explicit allow-list: anything not listed is `Other`.
    pub fn from_engine_type(type_tag: &str) -> Self {
        match type_tag {
            "function" => Self::Function,
            "instance" | "statement" | "param" | "property" => Self::Variable,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Function => "Function",
            Self::Variable => "Variable",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for CompletionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Completion as produced by an engine, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCompletion {
    pub name: String,
    /// Engine type tag (`function`, `class`, `module`, `instance`, ...).
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub docstring: String,
}

impl RawCompletion {
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
            docstring: String::new(),
        }
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = docstring.into();
        self
    }
}

/// A normalized completion suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub label: String,
    pub kind: CompletionKind,
    pub documentation: String,
    pub insert_text: String,
}

impl From<RawCompletion> for Completion {
    fn from(raw: RawCompletion) -> Self {
        Self {
            kind: CompletionKind::from_engine_type(&raw.type_tag),
            insert_text: raw.name.clone(),
            label: raw.name,
            documentation: raw.docstring,
        }
    }
}

// ============================================================================
// Definitions
// ============================================================================

/// Which lookup semantic to apply at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupMode {
    /// Resolve the expression's type or value.
    Infer,
    /// Resolve the symbol's declaration site.
    Goto,
}

impl LookupMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Infer => "infer",
            Self::Goto => "goto",
        }
    }
}

/// Metadata about a symbol resolved at a cursor position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub kind: String,
    pub docstring: Option<String>,
    /// 1-based line of the declaration, `None` outside the snippet.
    pub line: Option<usize>,
    /// 0-based column of the declaration, `None` outside the snippet.
    pub column: Option<usize>,
}

impl Definition {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            docstring: None,
            line: None,
            column: None,
        }
    }

    pub fn with_docstring(mut self, docstring: Option<String>) -> Self {
        self.docstring = docstring.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

// ============================================================================
// Formatted documentation
// ============================================================================

/// A documented parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocParam {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub description: String,
}

/// Documented return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocReturns {
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub description: String,
}

/// A documented exception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocRaises {
    #[serde(rename = "type")]
    pub type_name: String,
    pub description: String,
}

/// One usage example: prose plus an optional doctest snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocExample {
    pub narrative: Option<String>,
    pub snippet: Option<String>,
}

/// Structured view of a docstring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedDoc {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub params: Vec<DocParam>,
    pub returns: Option<DocReturns>,
    pub raises: Vec<DocRaises>,
    pub examples: Vec<DocExample>,
}

impl FormattedDoc {
    /// True when no section carries any content.
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.description.is_none()
            && self.params.is_empty()
            && self.returns.is_none()
            && self.raises.is_empty()
            && self.examples.is_empty()
    }
}

/// A read-only rich-text hover item.
///
/// Shaped after Monaco's `IMarkdownString` (and LSP `MarkupContent`). Trust
/// and HTML are always off, so clients never execute anything in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverContent {
    pub kind: String,
    pub value: String,
    pub is_trusted: bool,
    pub support_html: bool,
}

impl HoverContent {
    pub fn markdown(value: impl Into<String>) -> Self {
        Self {
            kind: "markdown".to_string(),
            value: value.into(),
            is_trusted: false,
            support_html: false,
        }
    }
}

// ============================================================================
// Execution
// ============================================================================

/// Exit code reported when the process was killed by the sandbox (timeout
/// or cancellation). Real exit codes are never negative.
pub const SENTINEL_EXIT_CODE: i32 = -1;

/// Outcome of running a snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub timed_out: bool,
    /// Either stream hit the output cap.
    pub truncated: bool,
    pub duration_ms: u64,
}

impl ExecutionResult {
    /// Whether the snippet ran to completion with a zero exit status.
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_first_line() {
        let code = "print('hi')\nx = 1";
        assert_eq!(Position::new(1, 0).to_byte_offset(code), Some(0));
        assert_eq!(Position::new(1, 5).to_byte_offset(code), Some(5));
        assert_eq!(Position::new(2, 0).to_byte_offset(code), Some(12));
    }

    #[test]
    fn test_position_end_of_line_is_valid() {
        let code = "abc\nde";
        assert_eq!(Position::new(1, 3).to_byte_offset(code), Some(3));
        assert_eq!(Position::new(2, 2).to_byte_offset(code), Some(6));
    }

    #[test]
    fn test_position_out_of_bounds() {
        let code = "abc\nde";
        assert_eq!(Position::new(1, 4).to_byte_offset(code), None);
        assert_eq!(Position::new(3, 0).to_byte_offset(code), None);
        assert_eq!(Position::new(0, 0).to_byte_offset(code), None);
        assert_eq!(Position::new(500, 500).to_byte_offset(code), None);
    }

    #[test]
    fn test_position_trailing_newline_adds_line() {
        let code = "x = 1\n";
        assert_eq!(Position::new(2, 0).to_byte_offset(code), Some(6));
    }

    #[test]
    fn test_position_counts_chars_not_bytes() {
        let code = "s = 'é'\nt";
        // 'é' is two bytes; column 6 is just past it.
        assert_eq!(Position::new(1, 6).to_byte_offset(code), Some(7));
        assert_eq!(Position::new(1, 7).to_byte_offset(code), Some(8));
        assert_eq!(Position::new(2, 1).to_byte_offset(code), Some(10));
    }

    #[test]
    fn test_position_crlf() {
        let code = "ab\r\ncd";
        assert_eq!(Position::new(1, 2).to_byte_offset(code), Some(2));
        assert_eq!(Position::new(1, 3).to_byte_offset(code), None);
        assert_eq!(Position::new(2, 1).to_byte_offset(code), Some(5));
    }

    #[test]
    fn test_completion_kind_mapping() {
        assert_eq!(CompletionKind::from_engine_type("function"), CompletionKind::Function);
        assert_eq!(CompletionKind::from_engine_type("instance"), CompletionKind::Variable);
        assert_eq!(CompletionKind::from_engine_type("statement"), CompletionKind::Variable);
        assert_eq!(CompletionKind::from_engine_type("param"), CompletionKind::Variable);
        assert_eq!(CompletionKind::from_engine_type("class"), CompletionKind::Other);
        assert_eq!(CompletionKind::from_engine_type("module"), CompletionKind::Other);
        assert_eq!(CompletionKind::from_engine_type("keyword"), CompletionKind::Other);
        assert_eq!(CompletionKind::from_engine_type("something-new"), CompletionKind::Other);
    }

    #[test]
    fn test_completion_from_raw() {
        let raw = RawCompletion::new("print", "function").with_docstring("print(*values)");
        let completion = Completion::from(raw);
        assert_eq!(completion.label, "print");
        assert_eq!(completion.insert_text, "print");
        assert_eq!(completion.kind, CompletionKind::Function);
        assert_eq!(completion.documentation, "print(*values)");
    }

    #[test]
    fn test_completion_serializes_camel_case() {
        let completion = Completion::from(RawCompletion::new("x", "statement"));
        let json = serde_json::to_value(&completion).unwrap();
        assert_eq!(json["insertText"], "x");
        assert_eq!(json["kind"], "Variable");
    }

    #[test]
    fn test_definition_drops_blank_docstring() {
        let def = Definition::new("f", "function").with_docstring(Some("   ".to_string()));
        assert!(def.docstring.is_none());
    }

    #[test]
    fn test_hover_content_never_trusted() {
        let content = HoverContent::markdown("**x**");
        assert!(!content.is_trusted);
        assert!(!content.support_html);
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["isTrusted"], false);
        assert_eq!(json["kind"], "markdown");
    }

    #[test]
    fn test_execution_result_wire_shape() {
        let result = ExecutionResult {
            stdout: "hi\n".to_string(),
            stderr: String::new(),
            exit_code: 0,
            timed_out: false,
            truncated: false,
            duration_ms: 12,
        };
        assert!(result.succeeded());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["exitCode"], 0);
        assert_eq!(json["timedOut"], false);
        assert_eq!(json["stdout"], "hi\n");
    }
}
