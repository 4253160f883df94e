// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Markdown rendering for formatted docs and hover content.

use crate::types::{Definition, FormattedDoc, HoverContent};

/// Markdown hard line break.
const HARD_BREAK: &str = "  \n";

/// Render a formatted doc as Markdown.
///
/// Line breaks inside a paragraph become hard breaks so the editor keeps
/// them; paragraphs and sections are separated by blank lines and doctest
/// snippets are fenced as Python.
pub fn to_markdown(doc: &FormattedDoc) -> String {
    let mut blocks: Vec<String> = Vec::new();

    if let Some(summary) = &doc.summary {
        blocks.push(hard_breaks(summary));
    }
    if let Some(description) = &doc.description {
        blocks.push(hard_breaks(description));
    }

    if !doc.params.is_empty() {
        let mut block = String::from("**Parameters**\n");
        for param in &doc.params {
            block.push_str(&format!("\n- `{}`", param.name));
            if let Some(type_name) = &param.type_name {
                block.push_str(&format!(" (*{type_name}*)"));
            }
            if !param.description.is_empty() {
                block.push_str(": ");
                block.push_str(&list_item_text(&param.description));
            }
        }
        blocks.push(block);
    }

    if let Some(returns) = &doc.returns {
        let body = match (&returns.type_name, returns.description.is_empty()) {
            (Some(type_name), true) => format!("*{type_name}*"),
            (Some(type_name), false) => format!("*{type_name}*: {}", hard_breaks(&returns.description)),
            (None, _) => hard_breaks(&returns.description),
        };
        if !body.is_empty() {
            blocks.push(format!("**Returns**\n\n{body}"));
        }
    }

    if !doc.raises.is_empty() {
        let mut block = String::from("**Raises**\n");
        for raises in &doc.raises {
            block.push_str(&format!("\n- `{}`", raises.type_name));
            if !raises.description.is_empty() {
                block.push_str(": ");
                block.push_str(&list_item_text(&raises.description));
            }
        }
        blocks.push(block);
    }

    if !doc.examples.is_empty() {
        blocks.push("**Examples**".to_string());
        for example in &doc.examples {
            if let Some(narrative) = &example.narrative {
                blocks.push(hard_breaks(narrative));
            }
            if let Some(snippet) = &example.snippet {
                blocks.push(fenced("python", snippet));
            }
        }
    }

    blocks.join("\n\n")
}

/// Hover content for a definition: a bold header with the kind, then the
/// formatted docstring, or the raw docstring in a text block when nothing
/// could be structured.
pub fn hover_content(definition: &Definition, formatted: Option<&FormattedDoc>) -> HoverContent {
    let header = format!("**{}** *({})*", definition.name, definition.kind);
    let body = match formatted {
        Some(doc) => Some(to_markdown(doc)).filter(|m| !m.is_empty()),
        None => None,
    }
    .or_else(|| {
        definition
            .docstring
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| fenced("text", raw))
    });

    match body {
        Some(body) => HoverContent::markdown(format!("{header}\n\n{body}")),
        None => HoverContent::markdown(header),
    }
}

/// Join lines with hard breaks, keeping blank-line paragraph separation.
pub fn hard_breaks(text: &str) -> String {
    text.trim()
        .split("\n\n")
        .map(|paragraph| {
            paragraph
                .lines()
                .map(str::trim_end)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(HARD_BREAK)
        })
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Text continuing a list item; later lines are indented under the bullet.
fn list_item_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("  \n  ")
}

/// A fenced code block whose fence is longer than any backtick run inside.
fn fenced(language: &str, body: &str) -> String {
    let longest = body
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest.max(2) + 1);
    format!("{fence}{language}\n{body}\n{fence}")
}
