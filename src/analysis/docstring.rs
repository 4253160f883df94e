// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Docstring extraction helpers.

/// Decode the text of a Python string literal as written in source.
///
/// Handles string prefixes and single or triple quotes. Escapes are
/// processed unless the literal is raw. Returns `None` for f-strings and
/// anything that does not look like a complete literal.
pub fn literal_value(literal: &str) -> Option<String> {
    let prefix_len = literal
        .chars()
        .take_while(|c| matches!(c, 'r' | 'R' | 'b' | 'B' | 'u' | 'U' | 'f' | 'F'))
        .count();
    let prefix = &literal[..prefix_len];
    if prefix.contains(['f', 'F']) {
        return None;
    }
    let raw = prefix.contains(['r', 'R']);
    let rest = &literal[prefix_len..];

    let body = ["\"\"\"", "'''", "\"", "'"].iter().find_map(|quote| {
        rest.strip_prefix(quote)
            .and_then(|inner| inner.strip_suffix(quote))
    })?;

    Some(if raw { body.to_string() } else { unescape(body) })
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\n') => {} // line continuation
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Clean up indentation the way `inspect.cleandoc` does.
///
/// Tabs expand to 8-column stops, the first line loses its leading
/// whitespace, the common indentation of the remaining lines is removed,
/// and leading/trailing blank lines are dropped.
pub fn cleandoc(doc: &str) -> String {
    let mut lines: Vec<String> = doc.split('\n').map(expand_tabs).collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min();

    if let Some(first) = lines.first_mut() {
        *first = first.trim_start().to_string();
    }
    if let Some(margin) = margin {
        for line in lines.iter_mut().skip(1) {
            *line = line.chars().skip(margin).collect();
        }
    }

    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|l| l.trim().is_empty()).count();
    lines.drain(..leading);

    lines.join("\n")
}

fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.trim_end_matches('\r').to_string();
    }
    let mut out = String::with_capacity(line.len() + 8);
    let mut col = 0;
    for c in line.trim_end_matches('\r').chars() {
        if c == '\t' {
            let pad = 8 - (col % 8);
            out.extend(std::iter::repeat(' ').take(pad));
            col += pad;
        } else {
            out.push(c);
            col += 1;
        }
    }
    out
}
