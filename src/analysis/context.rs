// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! What the user is typing at the cursor, read from the current line.

use once_cell::sync::Lazy;
use regex::Regex;

use super::scope::is_identifier;

static FROM_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*from\s+([\w.]+)\s+import\s+(?:\(\s*)?(?:[\w\s,]*,\s*)?$")
        .expect("valid regex")
});
static IMPORT_MODULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:import\s+(?:[\w.]+\s*,\s*)*|from\s+)([\w.]*)$").expect("valid regex")
});
static DEFINITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:async\s+)?(?:def|class)\s+$").expect("valid regex"));

/// Completion context at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorContext {
    /// A bare name: locals, enclosing scopes, builtins, keywords.
    Name { prefix: String },
    /// `object.prefix`
    Attribute { object: ObjectExpr, prefix: String },
    /// `import pkg.prefix` / `from pkg.prefix`; `parent` is the dotted part typed so far.
    ImportModule { parent: Option<String>, prefix: String },
    /// `from module import prefix`
    FromImport { module: String, prefix: String },
    /// Nothing sensible to offer (new name being defined, number literal, ...).
    Nothing,
}

/// The receiver of an attribute access, as far as it can be read from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectExpr {
    /// A literal of a builtin type.
    Literal(&'static str),
    /// `a.b.c`, optionally called: `a.b()`.
    Chain { names: Vec<String>, called: bool },
}

/// Identifier characters, unicode-aware.
pub fn is_ident_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Text of the cursor's line up to the cursor.
pub fn line_prefix(code: &str, offset: usize) -> &str {
    let offset = offset.min(code.len());
    let start = code[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    &code[start..offset]
}

/// Identifier characters directly before the cursor.
pub fn identifier_prefix(line: &str) -> &str {
    let start = line
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_ident_char(*c))
        .last()
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    &line[start..]
}

/// Whether the cursor follows a `#` or an unclosed quote on its line.
pub fn in_comment_or_open_string(line: &str) -> bool {
    let mut quote: Option<char> = None;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if c == '\\' {
                    chars.next();
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '#' => return true,
                '\'' | '"' => quote = Some(c),
                _ => {}
            },
        }
    }
    quote.is_some()
}

/// Classify the cursor position from the text before it on its line.
pub fn cursor_context(line: &str) -> CursorContext {
    let prefix = identifier_prefix(line);
    let before = &line[..line.len() - prefix.len()];

    if prefix.starts_with(|c: char| c.is_ascii_digit()) {
        return CursorContext::Nothing;
    }
    if DEFINITION.is_match(before) {
        return CursorContext::Nothing;
    }

    if let Some(caps) = FROM_IMPORT.captures(before) {
        return CursorContext::FromImport {
            module: caps[1].to_string(),
            prefix: prefix.to_string(),
        };
    }
    if let Some(caps) = IMPORT_MODULE.captures(before) {
        let dotted = caps[1].trim_end_matches('.');
        let parent = (!dotted.is_empty()).then(|| dotted.to_string());
        if caps[1].is_empty() || caps[1].ends_with('.') {
            return CursorContext::ImportModule {
                parent,
                prefix: prefix.to_string(),
            };
        }
    }

    if let Some(object) = before.strip_suffix('.') {
        return match parse_object(object) {
            Some(object) => CursorContext::Attribute {
                object,
                prefix: prefix.to_string(),
            },
            None => CursorContext::Nothing,
        };
    }

    CursorContext::Name {
        prefix: prefix.to_string(),
    }
}

/// Read the expression ending at the end of `text`.
pub fn parse_object(text: &str) -> Option<ObjectExpr> {
    let chars: Vec<char> = text.chars().collect();
    let last = *chars.last()?;

    match last {
        '"' | '\'' => {
            let open = find_string_start(&chars, last)?;
            let prefix: String = chars[..open]
                .iter()
                .rev()
                .take_while(|c| c.is_ascii_alphabetic())
                .collect();
            if prefix.contains(['b', 'B']) {
                Some(ObjectExpr::Literal("bytes"))
            } else {
                Some(ObjectExpr::Literal("str"))
            }
        }
        ']' => {
            let open = find_open(&chars, chars.len() - 1, '[', ']')?;
            if is_subscript(&chars[..open]) {
                None
            } else {
                Some(ObjectExpr::Literal("list"))
            }
        }
        '}' => {
            let open = find_open(&chars, chars.len() - 1, '{', '}')?;
            let inner = &chars[open + 1..chars.len() - 1];
            if inner.iter().all(|c| c.is_whitespace()) || has_top_level(inner, ':') {
                Some(ObjectExpr::Literal("dict"))
            } else {
                Some(ObjectExpr::Literal("set"))
            }
        }
        ')' => {
            let open = find_open(&chars, chars.len() - 1, '(', ')')?;
            let head: String = chars[..open].iter().collect();
            let callee = trailing_chain(&head);
            if callee.is_empty() {
                let inner = &chars[open + 1..chars.len() - 1];
                return has_top_level(inner, ',').then_some(ObjectExpr::Literal("tuple"));
            }
            chain(callee, true)
        }
        c if is_ident_char(c) => chain(trailing_chain(text), false),
        _ => None,
    }
}

fn chain(text: &str, called: bool) -> Option<ObjectExpr> {
    let names: Vec<String> = text.split('.').map(str::to_string).collect();
    if names.iter().all(|n| is_identifier(n)) {
        Some(ObjectExpr::Chain { names, called })
    } else {
        None
    }
}

/// The dotted identifier chain at the end of `text` (`a.b` in `x = a.b`).
fn trailing_chain(text: &str) -> &str {
    let start = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_ident_char(*c) || *c == '.')
        .last()
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    text[start..].trim_start_matches('.')
}

fn find_string_start(chars: &[char], quote: char) -> Option<usize> {
    let end = chars.len() - 1;
    (0..end)
        .rev()
        .find(|&i| chars[i] == quote && (i == 0 || chars[i - 1] != '\\'))
}

fn find_open(chars: &[char], close_index: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for i in (0..=close_index).rev() {
        if chars[i] == close {
            depth += 1;
        } else if chars[i] == open {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

fn is_subscript(before: &[char]) -> bool {
    before
        .iter()
        .rev()
        .find(|c| !c.is_whitespace())
        .is_some_and(|&c| is_ident_char(c) || matches!(c, ')' | ']' | '"' | '\''))
}

fn has_top_level(inner: &[char], target: char) -> bool {
    let mut depth = 0i32;
    for &c in inner {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            c if c == target && depth == 0 => return true,
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribute(line: &str) -> Option<ObjectExpr> {
        match cursor_context(line) {
            CursorContext::Attribute { object, .. } => Some(object),
            _ => None,
        }
    }

    #[test]
    fn test_identifier_prefix() {
        assert_eq!(identifier_prefix("x = pri"), "pri");
        assert_eq!(identifier_prefix("foo("), "");
        assert_eq!(identifier_prefix("naïve_"), "naïve_");
    }

    #[test]
    fn test_line_prefix() {
        let code = "a = 1\nprint(a)";
        assert_eq!(line_prefix(code, code.len()), "print(a)");
        assert_eq!(line_prefix(code, 3), "a =");
    }

    #[test]
    fn test_comment_or_open_string() {
        assert!(in_comment_or_open_string("x = 1  # note"));
        assert!(in_comment_or_open_string("s = 'abc"));
        assert!(in_comment_or_open_string("s = \"it's"));
        assert!(!in_comment_or_open_string("s = 'a#b' + x"));
        assert!(!in_comment_or_open_string("s = '''done'''"));
        assert!(!in_comment_or_open_string(r"s = 'a\'b' + x"));
    }

    #[test]
    fn test_name_context() {
        assert_eq!(
            cursor_context("    return res"),
            CursorContext::Name { prefix: "res".into() }
        );
        assert_eq!(cursor_context(""), CursorContext::Name { prefix: String::new() });
    }

    #[test]
    fn test_nothing_contexts() {
        assert_eq!(cursor_context("def fo"), CursorContext::Nothing);
        assert_eq!(cursor_context("class "), CursorContext::Nothing);
        assert_eq!(cursor_context("x = 12"), CursorContext::Nothing);
        assert_eq!(cursor_context("x = 1."), CursorContext::Nothing);
    }

    #[test]
    fn test_attribute_chains() {
        assert_eq!(
            attribute("os.path.jo"),
            Some(ObjectExpr::Chain {
                names: vec!["os".into(), "path".into()],
                called: false
            })
        );
        assert_eq!(
            attribute("w = Widget(1, (2, 3))."),
            Some(ObjectExpr::Chain {
                names: vec!["Widget".into()],
                called: true
            })
        );
    }

    #[test]
    fn test_attribute_literals() {
        assert_eq!(attribute("'abc'.up"), Some(ObjectExpr::Literal("str")));
        assert_eq!(attribute("b\"x\"."), Some(ObjectExpr::Literal("bytes")));
        assert_eq!(attribute("[1, 2]."), Some(ObjectExpr::Literal("list")));
        assert_eq!(attribute("{}."), Some(ObjectExpr::Literal("dict")));
        assert_eq!(attribute("{'a': 1}."), Some(ObjectExpr::Literal("dict")));
        assert_eq!(attribute("{1, 2}."), Some(ObjectExpr::Literal("set")));
        assert_eq!(attribute("(1, 2)."), Some(ObjectExpr::Literal("tuple")));
        assert_eq!(attribute("items[0]."), None);
    }

    #[test]
    fn test_import_contexts() {
        assert_eq!(
            cursor_context("import ma"),
            CursorContext::ImportModule { parent: None, prefix: "ma".into() }
        );
        assert_eq!(
            cursor_context("import os.pa"),
            CursorContext::ImportModule { parent: Some("os".into()), prefix: "pa".into() }
        );
        assert_eq!(
            cursor_context("from col"),
            CursorContext::ImportModule { parent: None, prefix: "col".into() }
        );
        assert_eq!(
            cursor_context("from math import sq"),
            CursorContext::FromImport { module: "math".into(), prefix: "sq".into() }
        );
        assert_eq!(
            cursor_context("from math import pi, sq"),
            CursorContext::FromImport { module: "math".into(), prefix: "sq".into() }
        );
    }
}
