// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Docstring structure for the three common Python conventions.
//!
//! - Google: `Args:` / `Returns:` / `Raises:` / `Examples:` headers with
//!   indented bodies.
//! - reStructuredText: `:param x:`, `:type x:`, `:returns:`, `:rtype:`,
//!   `:raises E:` fields.
//! - NumPy: section titles underlined with dashes.
//!
//! Input is expected to be cleaned already (see
//! [`cleandoc`](crate::analysis::docstring::cleandoc)). Sections that carry
//! no structure of their own (Note, Warning, See Also, ...) are appended to
//! the description under their title.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{DocExample, DocParam, DocRaises, DocReturns, FormattedDoc};

/// Docstring convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocStyle {
    Google,
    Rest,
    Numpy,
    Plain,
}

static REST_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*:(?:param|parameter|arg|argument|key|keyword|type|returns?|rtype|raises?|except|exception|yields?|ytype)\b",
    )
    .expect("valid regex")
});

static NUMPY_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*[A-Z][A-Za-z ]*[ \t]*\n[ \t]*-{3,}[ \t]*$").expect("valid regex"));

static GOOGLE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:Args|Arguments|Parameters|Params|Keyword Args|Keyword Arguments|Other Parameters|Returns?|Yields?|Raises|Exceptions|Examples?):[ \t]*$",
    )
    .expect("valid regex")
});

static GOOGLE_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\*{0,2}[A-Za-z_][\w.]*)\s*(?:\(([^)]*)\))?\s*:\s*(.*)$").expect("valid regex")
});

static GOOGLE_RETURNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^\s:]+(?:\[[^\]]*\])?)\s*:\s+(.*)$").expect("valid regex"));

static GOOGLE_RAISES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][\w.]*)\s*:\s*(.*)$").expect("valid regex"));

static REST_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:(\w+)([^:]*):\s*(.*)$").expect("valid regex"));

/// Which part of a docstring a section header introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Params,
    Returns,
    Yields,
    Raises,
    Examples,
    /// Kept verbatim in the description.
    Other,
}

fn section_kind(title: &str) -> Option<SectionKind> {
    let kind = match title.trim().to_ascii_lowercase().as_str() {
        "args" | "arguments" | "parameters" | "params" | "keyword args" | "keyword arguments"
        | "other parameters" => SectionKind::Params,
        "returns" | "return" => SectionKind::Returns,
        "yields" | "yield" => SectionKind::Yields,
        "raises" | "exceptions" => SectionKind::Raises,
        "examples" | "example" => SectionKind::Examples,
        "note" | "notes" | "warning" | "warnings" | "see also" | "todo" | "references"
        | "attributes" | "methods" | "warns" => SectionKind::Other,
        _ => return None,
    };
    Some(kind)
}

/// Guess the convention a docstring follows.
pub fn detect_style(doc: &str) -> DocStyle {
    if REST_MARKER.is_match(doc) {
        DocStyle::Rest
    } else if NUMPY_MARKER.is_match(doc) {
        DocStyle::Numpy
    } else if GOOGLE_MARKER.is_match(doc) {
        DocStyle::Google
    } else {
        DocStyle::Plain
    }
}

/// Parse a cleaned docstring, detecting its convention.
pub fn parse(doc: &str) -> FormattedDoc {
    parse_as(doc, detect_style(doc))
}

/// Parse a cleaned docstring as the given convention.
pub fn parse_as(doc: &str, style: DocStyle) -> FormattedDoc {
    let lines: Vec<&str> = doc.lines().collect();
    let mut builder = DocBuilder::default();
    match style {
        DocStyle::Google => parse_google(&lines, &mut builder),
        DocStyle::Rest => parse_rest(&lines, &mut builder),
        DocStyle::Numpy => parse_numpy(&lines, &mut builder),
        DocStyle::Plain => builder.preamble.extend(lines.iter().map(|l| l.to_string())),
    }
    builder.finish()
}

#[derive(Default)]
struct DocBuilder {
    preamble: Vec<String>,
    /// Description paragraphs found after the first section, in order.
    extra: Vec<String>,
    params: Vec<DocParam>,
    returns: Option<DocReturns>,
    raises: Vec<DocRaises>,
    examples: Vec<DocExample>,
}

impl DocBuilder {
    fn param_mut(&mut self, name: &str) -> &mut DocParam {
        let index = match self.params.iter().position(|p| p.name == name) {
            Some(index) => index,
            None => {
                self.params.push(DocParam {
                    name: name.to_string(),
                    type_name: None,
                    description: String::new(),
                });
                self.params.len() - 1
            }
        };
        &mut self.params[index]
    }

    fn returns_mut(&mut self) -> &mut DocReturns {
        self.returns.get_or_insert_with(|| DocReturns {
            type_name: None,
            description: String::new(),
        })
    }

    fn push_extra(&mut self, text: String) {
        let text = text.trim().to_string();
        if !text.is_empty() {
            self.extra.push(text);
        }
    }

    fn push_section(&mut self, title: &str, kind: SectionKind, body: &[String]) {
        match kind {
            SectionKind::Params => {
                for (head, rest) in items(body) {
                    match GOOGLE_PARAM.captures(&head) {
                        Some(caps) => {
                            let description = join_description(caps.get(3).map_or("", |m| m.as_str()), &rest);
                            let type_name = caps.get(2).map(|m| m.as_str().trim().to_string());
                            let param = self.param_mut(&caps[1]);
                            param.type_name = type_name.filter(|t| !t.is_empty());
                            param.description = description;
                        }
                        None => {
                            if let Some(last) = self.params.last_mut() {
                                last.description = join_description(&last.description, &[head]);
                            }
                        }
                    }
                }
            }
            SectionKind::Returns | SectionKind::Yields => {
                if kind == SectionKind::Yields && self.returns.is_some() {
                    return;
                }
                let Some((first, rest)) = body.split_first() else { return };
                let (type_name, description) = match GOOGLE_RETURNS.captures(first) {
                    Some(caps) => (Some(caps[1].to_string()), join_description(&caps[2], rest)),
                    None => (None, join_description(first, rest)),
                };
                *self.returns_mut() = DocReturns {
                    type_name,
                    description,
                };
            }
            SectionKind::Raises => {
                for (head, rest) in items(body) {
                    let (type_name, description) = match GOOGLE_RAISES.captures(&head) {
                        Some(caps) => (caps[1].to_string(), join_description(&caps[2], &rest)),
                        None => (head.trim().to_string(), join_description("", &rest)),
                    };
                    self.raises.push(DocRaises {
                        type_name,
                        description,
                    });
                }
            }
            SectionKind::Examples => self.examples.extend(parse_examples(body)),
            SectionKind::Other => {
                self.push_extra(format!("{}:\n{}", title.trim(), body.join("\n")));
            }
        }
    }

    fn finish(self) -> FormattedDoc {
        let mut paragraphs = paragraphs(&self.preamble).into_iter();
        let summary = paragraphs.next().map(|p| {
            p.lines().map(str::trim).collect::<Vec<_>>().join(" ")
        });
        let description: Vec<String> = paragraphs.chain(self.extra).collect();
        let description = (!description.is_empty()).then(|| description.join("\n\n"));

        FormattedDoc {
            summary,
            description,
            params: self.params,
            returns: self.returns,
            raises: self.raises,
            examples: self.examples,
        }
    }
}

/// Group lines into blank-line separated paragraphs.
fn paragraphs(lines: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        out.push(current.join("\n"));
    }
    out
}

/// Remove the common indentation and surrounding blank lines.
fn dedent(lines: &[&str]) -> Vec<String> {
    let margin = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    let mut out: Vec<String> = lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else {
                l[margin..].trim_end().to_string()
            }
        })
        .collect();
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    let leading = out.iter().take_while(|l| l.is_empty()).count();
    out.drain(..leading);
    out
}

/// Split a dedented body into items: unindented head lines, each with the
/// indented lines that follow it.
fn items(body: &[String]) -> Vec<(String, Vec<String>)> {
    let mut out: Vec<(String, Vec<String>)> = Vec::new();
    for line in body {
        let indented = line.starts_with([' ', '\t']);
        match out.last_mut() {
            Some((_, rest)) if indented || line.is_empty() => rest.push(line.trim().to_string()),
            _ if line.is_empty() => {}
            _ => out.push((line.trim().to_string(), Vec::new())),
        }
    }
    out
}

/// First-line text plus continuation lines, surrounding blanks removed.
fn join_description(first: &str, rest: &[String]) -> String {
    let mut lines: Vec<&str> = Vec::with_capacity(rest.len() + 1);
    if !first.trim().is_empty() {
        lines.push(first.trim());
    }
    lines.extend(rest.iter().map(|l| l.trim()));
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|l| l.is_empty()).count();
    lines[leading..].join("\n")
}

fn is_indented(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}

fn google_header(line: &str) -> Option<(&str, SectionKind)> {
    if is_indented(line) {
        return None;
    }
    let title = line.trim_end().strip_suffix(':')?;
    section_kind(title).map(|kind| (title, kind))
}

fn parse_google(lines: &[&str], builder: &mut DocBuilder) {
    let mut section: Option<(&str, SectionKind)> = None;
    let mut seen_section = false;
    let mut body: Vec<&str> = Vec::new();
    let mut trailing: Vec<String> = Vec::new();

    for &line in lines {
        if let Some(header) = google_header(line) {
            if let Some((title, kind)) = section.take() {
                builder.push_section(title, kind, &dedent(&body));
            }
            builder.push_extra(trailing.join("\n"));
            trailing.clear();
            body.clear();
            section = Some(header);
            seen_section = true;
            continue;
        }
        match section {
            None if !seen_section => builder.preamble.push(line.to_string()),
            None => trailing.push(line.to_string()),
            Some((title, kind)) => {
                if !line.trim().is_empty() && !is_indented(line) {
                    // An unindented line closes the section
                    builder.push_section(title, kind, &dedent(&body));
                    body.clear();
                    section = None;
                    trailing.push(line.to_string());
                } else {
                    body.push(line);
                }
            }
        }
    }
    if let Some((title, kind)) = section {
        builder.push_section(title, kind, &dedent(&body));
    }
    builder.push_extra(trailing.join("\n"));
}

fn parse_rest(lines: &[&str], builder: &mut DocBuilder) {
    let mut fields: Vec<(String, Vec<String>)> = Vec::new();
    let mut in_fields = false;
    let mut trailing: Vec<String> = Vec::new();

    for &line in lines {
        let trimmed = line.trim();
        if REST_FIELD.is_match(trimmed) {
            in_fields = true;
            if !trailing.is_empty() {
                builder.push_extra(trailing.join("\n"));
                trailing.clear();
            }
            fields.push((trimmed.to_string(), Vec::new()));
            continue;
        }
        if !in_fields {
            builder.preamble.push(line.to_string());
            continue;
        }
        if !trailing.is_empty() {
            trailing.push(line.to_string());
        } else if trimmed.is_empty() {
            continue;
        } else if let Some((_, rest)) = fields.last_mut().filter(|_| is_indented(line)) {
            rest.push(trimmed.to_string());
        } else {
            trailing.push(line.to_string());
        }
    }
    builder.push_extra(trailing.join("\n"));

    for (head, rest) in fields {
        let Some(caps) = REST_FIELD.captures(&head) else { continue };
        let kind = caps[1].to_ascii_lowercase();
        let args = caps[2].trim().to_string();
        let description = join_description(&caps[3], &rest);

        match kind.as_str() {
            "param" | "parameter" | "arg" | "argument" | "key" | "keyword" => {
                let mut tokens: Vec<&str> = args.split_whitespace().collect();
                let Some(name) = tokens.pop() else { continue };
                let type_name = (!tokens.is_empty()).then(|| tokens.join(" "));
                let param = builder.param_mut(name);
                if type_name.is_some() {
                    param.type_name = type_name;
                }
                param.description = description;
            }
            "type" if !args.is_empty() => {
                builder.param_mut(&args).type_name = Some(description).filter(|t| !t.is_empty());
            }
            "returns" | "return" => builder.returns_mut().description = description,
            "rtype" => builder.returns_mut().type_name = Some(description).filter(|t| !t.is_empty()),
            "yields" | "yield" => {
                let returns = builder.returns_mut();
                if returns.description.is_empty() {
                    returns.description = description;
                }
            }
            "ytype" => {
                let returns = builder.returns_mut();
                if returns.type_name.is_none() {
                    returns.type_name = Some(description).filter(|t| !t.is_empty());
                }
            }
            "raises" | "raise" | "except" | "exception" => builder.raises.push(DocRaises {
                type_name: args,
                description,
            }),
            _ => {
                let label = if args.is_empty() { kind } else { format!("{kind} {args}") };
                builder.push_extra(format!("{label}: {description}"));
            }
        }
    }
}

fn is_underline(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-')
}

fn parse_numpy(lines: &[&str], builder: &mut DocBuilder) {
    let mut sections: Vec<(&str, Vec<&str>)> = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let is_header = !line.trim().is_empty()
            && lines.get(i + 1).is_some_and(|next| is_underline(next));
        if is_header {
            sections.push((line.trim(), Vec::new()));
            i += 2;
            continue;
        }
        match sections.last_mut() {
            Some((_, body)) => body.push(line),
            None => builder.preamble.push(line.to_string()),
        }
        i += 1;
    }

    for (title, body) in sections {
        let body = dedent(&body);
        match section_kind(title).unwrap_or(SectionKind::Other) {
            SectionKind::Params => {
                for (head, rest) in items(&body) {
                    let (name, type_name) = split_numpy_head(&head);
                    let description = join_description("", &rest);
                    let param = builder.param_mut(name);
                    param.type_name = type_name;
                    param.description = description;
                }
            }
            kind @ (SectionKind::Returns | SectionKind::Yields) => {
                if kind == SectionKind::Yields && builder.returns.is_some() {
                    continue;
                }
                let Some((head, rest)) = items(&body).into_iter().next() else { continue };
                let type_name = match split_numpy_head(&head) {
                    (_, Some(type_name)) => Some(type_name),
                    (name, None) => Some(name.to_string()),
                };
                *builder.returns_mut() = DocReturns {
                    type_name,
                    description: join_description("", &rest),
                };
            }
            SectionKind::Raises => {
                for (head, rest) in items(&body) {
                    builder.raises.push(DocRaises {
                        type_name: head,
                        description: join_description("", &rest),
                    });
                }
            }
            SectionKind::Examples => builder.examples.extend(parse_examples(&body)),
            SectionKind::Other => builder.push_extra(format!("{title}:\n{}", body.join("\n"))),
        }
    }
}

/// `name : type` → (`name`, Some(`type`)).
fn split_numpy_head(head: &str) -> (&str, Option<String>) {
    match head.split_once(" : ").or_else(|| head.split_once(':')) {
        Some((name, type_name)) => {
            let type_name = type_name.trim();
            (name.trim(), (!type_name.is_empty()).then(|| type_name.to_string()))
        }
        None => (head.trim(), None),
    }
}

/// Split an examples section into prose/doctest pairs.
///
/// A doctest run starts at `>>>`, continues through `...` lines and the
/// expected output, and ends at a blank line. Prose before a run becomes
/// its narrative; prose after the last run forms an example of its own.
pub fn parse_examples(body: &[String]) -> Vec<DocExample> {
    let mut examples = Vec::new();
    let mut narrative: Vec<&str> = Vec::new();
    let mut snippet: Vec<&str> = Vec::new();
    let mut in_snippet = false;

    fn flush(examples: &mut Vec<DocExample>, narrative: &mut Vec<&str>, snippet: &mut Vec<&str>) {
        while narrative.last().is_some_and(|l| l.is_empty()) {
            narrative.pop();
        }
        if narrative.is_empty() && snippet.is_empty() {
            return;
        }
        examples.push(DocExample {
            narrative: (!narrative.is_empty()).then(|| narrative.join("\n")),
            snippet: (!snippet.is_empty()).then(|| snippet.join("\n")),
        });
        narrative.clear();
        snippet.clear();
    }

    for line in body {
        let trimmed = line.trim();
        if trimmed.starts_with(">>>") || (in_snippet && trimmed.starts_with("...")) {
            in_snippet = true;
            snippet.push(trimmed);
            continue;
        }
        if in_snippet {
            if trimmed.is_empty() {
                flush(&mut examples, &mut narrative, &mut snippet);
                in_snippet = false;
            } else {
                snippet.push(trimmed);
            }
            continue;
        }
        if trimmed.is_empty() {
            if !narrative.is_empty() {
                narrative.push("");
            }
        } else {
            narrative.push(line.trim_end());
        }
    }
    flush(&mut examples, &mut narrative, &mut snippet);
    examples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_style() {
        assert_eq!(detect_style("Sum.\n\nArgs:\n    a: first"), DocStyle::Google);
        assert_eq!(detect_style("Sum.\n\n:param a: first"), DocStyle::Rest);
        assert_eq!(detect_style("Sum.\n\nParameters\n----------\na : int"), DocStyle::Numpy);
        assert_eq!(detect_style("Just prose.\n\nMore prose."), DocStyle::Plain);
    }

    #[test]
    fn test_plain_summary_and_description() {
        let doc = parse("Short line\ncontinued.\n\nLonger text\nover lines.\n\nSecond paragraph.");
        assert_eq!(doc.summary.as_deref(), Some("Short line continued."));
        assert_eq!(
            doc.description.as_deref(),
            Some("Longer text\nover lines.\n\nSecond paragraph.")
        );
        assert!(doc.params.is_empty());
    }

    #[test]
    fn test_google() {
        let doc = parse(
            "Add two numbers.\n\nArgs:\n    a (int): First operand.\n    b: Second operand,\n        spanning lines.\n\nReturns:\n    int: The sum.\n\nRaises:\n    ValueError: If inputs are bad.\n",
        );
        assert_eq!(doc.summary.as_deref(), Some("Add two numbers."));
        assert_eq!(doc.description, None);
        assert_eq!(doc.params.len(), 2);
        assert_eq!(doc.params[0].name, "a");
        assert_eq!(doc.params[0].type_name.as_deref(), Some("int"));
        assert_eq!(doc.params[1].type_name, None);
        assert_eq!(doc.params[1].description, "Second operand,\nspanning lines.");
        let returns = doc.returns.unwrap();
        assert_eq!(returns.type_name.as_deref(), Some("int"));
        assert_eq!(returns.description, "The sum.");
        assert_eq!(doc.raises[0].type_name, "ValueError");
        assert_eq!(doc.raises[0].description, "If inputs are bad.");
    }

    #[test]
    fn test_google_returns_without_type() {
        let doc = parse("Do it.\n\nReturns:\n    The result of doing it.");
        let returns = doc.returns.unwrap();
        assert_eq!(returns.type_name, None);
        assert_eq!(returns.description, "The result of doing it.");
    }

    #[test]
    fn test_google_unknown_sections_kept() {
        let doc = parse("Do it.\n\nArgs:\n    x: thing\n\nNote:\n    Be careful.\n");
        assert_eq!(doc.description.as_deref(), Some("Note:\nBe careful."));
        assert_eq!(doc.params.len(), 1);
    }

    #[test]
    fn test_google_examples() {
        let doc = parse(
            "Add.\n\nExamples:\n    Adding small numbers:\n\n    >>> add(1, 2)\n    3\n\n    >>> add(\n    ...     2, 2)\n    4\n",
        );
        assert_eq!(doc.examples.len(), 2);
        assert_eq!(doc.examples[0].narrative.as_deref(), Some("Adding small numbers:"));
        assert_eq!(doc.examples[0].snippet.as_deref(), Some(">>> add(1, 2)\n3"));
        assert_eq!(doc.examples[1].narrative, None);
        assert_eq!(doc.examples[1].snippet.as_deref(), Some(">>> add(\n...     2, 2)\n4"));
    }

    #[test]
    fn test_rest() {
        let doc = parse(
            "Fetch a page.\n\n:param str url: Where to go.\n:param timeout: Seconds to wait,\n    at most.\n:type timeout: float\n:returns: The body.\n:rtype: bytes\n:raises IOError: On network failure.\n",
        );
        assert_eq!(doc.summary.as_deref(), Some("Fetch a page."));
        assert_eq!(doc.params.len(), 2);
        assert_eq!(doc.params[0].type_name.as_deref(), Some("str"));
        assert_eq!(doc.params[1].type_name.as_deref(), Some("float"));
        assert_eq!(doc.params[1].description, "Seconds to wait,\nat most.");
        let returns = doc.returns.unwrap();
        assert_eq!(returns.type_name.as_deref(), Some("bytes"));
        assert_eq!(returns.description, "The body.");
        assert_eq!(doc.raises[0].type_name, "IOError");
    }

    #[test]
    fn test_numpy() {
        let doc = parse(
            "Scale values.\n\nParameters\n----------\nx : array_like\n    Input values.\nfactor : float, optional\n    Multiplier.\n\nReturns\n-------\nndarray\n    Scaled values.\n\nNotes\n-----\nWorks in place.\n\nExamples\n--------\n>>> scale([1], 2)\n[2]\n",
        );
        assert_eq!(doc.params[0].name, "x");
        assert_eq!(doc.params[0].type_name.as_deref(), Some("array_like"));
        assert_eq!(doc.params[1].type_name.as_deref(), Some("float, optional"));
        let returns = doc.returns.unwrap();
        assert_eq!(returns.type_name.as_deref(), Some("ndarray"));
        assert_eq!(returns.description, "Scaled values.");
        assert_eq!(doc.description.as_deref(), Some("Notes:\nWorks in place."));
        assert_eq!(doc.examples[0].snippet.as_deref(), Some(">>> scale([1], 2)\n[2]"));
    }

    #[test]
    fn test_examples_trailing_prose() {
        let body: Vec<String> = [">>> f()", "1", "", "That is all."]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let examples = parse_examples(&body);
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[1].narrative.as_deref(), Some("That is all."));
        assert_eq!(examples[1].snippet, None);
    }
}
