// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! In-process analysis engine built on tree-sitter-python.
//!
//! Completion parses the snippet with a placeholder identifier spliced in at
//! the cursor, so half-typed expressions such as `obj.` still produce a
//! usable tree. Lookups parse the snippet as written.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use tree_sitter::Node;

use crate::error::AnalysisError;
use crate::types::{Definition, LookupMode, Position, RawCompletion};

use super::builtins::{self, BUILTINS, KEYWORDS, MODULES};
use super::context::{
    cursor_context, in_comment_or_open_string, line_prefix, parse_object, CursorContext,
};
use super::resolve::{Candidate, MemberRef, Resolver, Target};
use super::scope::{parse_within, Binding, BindingKind, ScopeTree};
use super::AnalysisEngine;

/// Identifier spliced in at the cursor before parsing for completion.
const PLACEHOLDER: &str = "__snipd_cursor__";

/// Static-analysis engine; cheap to copy and share.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeSitterEngine {
    parse_budget: Option<Duration>,
}

impl TreeSitterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop parsing after `budget`, so blocking work left behind by a
    /// timed-out request does not keep a worker thread busy.
    pub fn with_parse_budget(mut self, budget: Duration) -> Self {
        self.parse_budget = Some(budget);
        self
    }

    /// Completions at a byte offset.
    pub fn complete_at(&self, code: &str, offset: usize) -> Result<Vec<RawCompletion>, AnalysisError> {
        let line = line_prefix(code, offset);
        if in_comment_or_open_string(line) {
            return Ok(Vec::new());
        }
        let context = cursor_context(line);
        if context == CursorContext::Nothing {
            return Ok(Vec::new());
        }

        let patched = format!("{}{}{}", &code[..offset], PLACEHOLDER, &code[offset..]);
        let tree = parse_within(&patched, self.parse_budget)?;
        if in_comment_or_string(tree.root_node(), offset) {
            return Ok(Vec::new());
        }

        let scopes = ScopeTree::build(&tree, &patched);
        let resolver = Resolver::new(&scopes);

        let candidates = match context {
            CursorContext::Name { prefix } => filter(name_candidates(&scopes, offset), &prefix),
            CursorContext::Attribute { object, prefix } => {
                let members = resolver
                    .evaluate(&object, offset)
                    .map(|target| resolver.members(&target))
                    .unwrap_or_default();
                filter(members, &prefix)
            }
            CursorContext::ImportModule { parent, prefix } => {
                let modules: Vec<Candidate> = match parent {
                    None => MODULES.iter().map(Candidate::from_member).collect(),
                    Some(parent) => builtins::module_members(&parent)
                        .unwrap_or_default()
                        .iter()
                        .filter(|m| m.kind == "module")
                        .map(Candidate::from_member)
                        .collect(),
                };
                filter(modules, &prefix)
            }
            CursorContext::FromImport { module, prefix } => {
                let members = builtins::module_members(&module)
                    .unwrap_or_default()
                    .iter()
                    .map(Candidate::from_member)
                    .collect();
                filter(members, &prefix)
            }
            CursorContext::Nothing => Vec::new(),
        };

        Ok(candidates
            .into_iter()
            .map(|c| RawCompletion::new(c.name, c.type_tag).with_docstring(c.docstring))
            .collect())
    }

    /// Definitions for the symbol at a byte offset.
    pub fn lookup_at(
        &self,
        code: &str,
        offset: usize,
        mode: LookupMode,
    ) -> Result<Vec<Definition>, AnalysisError> {
        let tree = parse_within(code, self.parse_budget)?;
        let root = tree.root_node();
        let Some(node) = identifier_at(root, offset) else {
            return Ok(Vec::new());
        };
        let name = node_text(node, code);

        if let Some(definitions) = import_definitions(node, code) {
            return Ok(definitions);
        }

        let scopes = ScopeTree::build(&tree, code);
        let resolver = Resolver::new(&scopes);

        let parent = node.parent();
        if let Some(parent) = parent.filter(|p| p.kind() == "attribute") {
            if parent.child_by_field_name("attribute") == Some(node) {
                return Ok(attribute_definitions(&resolver, parent, name, code, mode)
                    .into_iter()
                    .collect());
            }
        }
        if let Some(parent) = parent.filter(|p| p.kind() == "keyword_argument") {
            if parent.child_by_field_name("name") == Some(node) {
                return Ok(keyword_argument_definitions(&resolver, parent, name, code)
                    .into_iter()
                    .collect());
            }
        }

        if let Some(binding) = scopes.resolve(name, node.start_byte()) {
            return Ok(binding_definitions(&resolver, binding, mode)
                .into_iter()
                .collect());
        }

        Ok(builtins::builtin(name)
            .map(|m| Definition::new(m.name, m.kind).with_docstring(m.docstring().map(str::to_string)))
            .into_iter()
            .collect())
    }
}

#[async_trait]
impl AnalysisEngine for TreeSitterEngine {
    fn name(&self) -> &'static str {
        "tree-sitter"
    }

    async fn complete(&self, code: &str, position: Position) -> Result<Vec<RawCompletion>, AnalysisError> {
        let Some(offset) = position.to_byte_offset(code) else {
            return Ok(Vec::new());
        };
        let engine = *self;
        let code = code.to_string();
        tokio::task::spawn_blocking(move || engine.complete_at(&code, offset))
            .await
            .map_err(|e| AnalysisError::Internal(format!("Completion task failed: {e}")))?
    }

    async fn lookup(
        &self,
        code: &str,
        position: Position,
        mode: LookupMode,
    ) -> Result<Vec<Definition>, AnalysisError> {
        let Some(offset) = position.to_byte_offset(code) else {
            return Ok(Vec::new());
        };
        let engine = *self;
        let code = code.to_string();
        tokio::task::spawn_blocking(move || engine.lookup_at(&code, offset, mode))
            .await
            .map_err(|e| AnalysisError::Internal(format!("Lookup task failed: {e}")))?
    }
}

/// Local, enclosing and module names, then builtins and keywords.
fn name_candidates(scopes: &ScopeTree, offset: usize) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = scopes
        .visible_names(offset, |name| name.contains(PLACEHOLDER))
        .into_iter()
        .map(Candidate::from_binding)
        .collect();
    candidates.extend(BUILTINS.iter().map(Candidate::from_member));
    candidates.extend(KEYWORDS.iter().map(Candidate::from_member));
    candidates
}

/// Keep names matching the typed prefix, one per name, in jedi's order:
/// public names, then `_private`, then `__dunder__`, each alphabetical
/// ignoring case.
fn filter(candidates: Vec<Candidate>, prefix: &str) -> Vec<Candidate> {
    let prefix = prefix.to_lowercase();
    let mut seen = HashSet::new();
    let mut kept: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| !c.name.contains(PLACEHOLDER))
        .filter(|c| c.name.to_lowercase().starts_with(&prefix))
        .filter(|c| seen.insert(c.name.clone()))
        .collect();
    kept.sort_by_cached_key(|c| {
        (
            c.name.starts_with("__"),
            c.name.starts_with('_'),
            c.name.to_lowercase(),
        )
    });
    kept
}

fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Whether the cursor sits inside a comment or a string literal (but not
/// inside an f-string replacement field).
fn in_comment_or_string(root: Node, offset: usize) -> bool {
    let mut current = root.descendant_for_byte_range(offset, offset);
    while let Some(node) = current {
        match node.kind() {
            "comment" => return true,
            "interpolation" => return false,
            "string" if node.start_byte() < offset && offset < node.end_byte() => return true,
            _ => {}
        }
        current = node.parent();
    }
    false
}

/// The identifier under the cursor, or the one ending right before it.
fn identifier_at(root: Node, offset: usize) -> Option<Node> {
    let at = |o: usize| {
        root.descendant_for_byte_range(o, o)
            .filter(|n| n.kind() == "identifier")
    };
    at(offset).or_else(|| offset.checked_sub(1).and_then(at))
}

fn binding_definition(binding: &Binding) -> Definition {
    Definition::new(&binding.name, binding.type_tag())
        .with_docstring(binding.docstring.clone())
        .at(binding.line, binding.column)
}

fn binding_definitions<'t>(
    resolver: &Resolver<'t>,
    binding: &'t Binding,
    mode: LookupMode,
) -> Option<Definition> {
    match (mode, binding.kind) {
        (LookupMode::Goto, _) | (LookupMode::Infer, BindingKind::Function | BindingKind::Class) => {
            Some(binding_definition(binding))
        }
        (LookupMode::Infer, _) => target_definition(resolver, resolver.binding(binding)?),
    }
}

/// Definition describing what a target denotes.
fn target_definition(resolver: &Resolver, target: Target) -> Option<Definition> {
    let scopes = resolver.scopes();
    match target {
        Target::Class(scope) => scopes.declaration(scope).map(binding_definition),
        Target::Instance(scope) => scopes.declaration(scope).map(|class| Definition {
            kind: "instance".to_string(),
            ..binding_definition(class)
        }),
        Target::Function(binding) => Some(binding_definition(binding)),
        Target::BuiltinType(type_name) => Some(builtin_definition(type_name, "class")),
        Target::BuiltinInstance(type_name) => Some(builtin_definition(type_name, "instance")),
        Target::Module(path) => {
            let name = path.rsplit('.').next().unwrap_or(&path).to_string();
            Some(Definition::new(name, "module").with_docstring(module_doc(&path)))
        }
        Target::Member(member) => Some(
            Definition::new(member.name, member.kind)
                .with_docstring(member.docstring().map(str::to_string)),
        ),
    }
}

fn builtin_definition(type_name: &str, kind: &str) -> Definition {
    let doc = builtins::builtin(type_name).and_then(|m| m.docstring());
    Definition::new(type_name, kind).with_docstring(doc.map(str::to_string))
}

fn module_doc(path: &str) -> Option<String> {
    builtins::module_entry(path)
        .and_then(|m| m.docstring())
        .map(str::to_string)
}

/// `obj.attr` with the cursor on `attr`.
fn attribute_definitions(
    resolver: &Resolver,
    attribute: Node,
    name: &str,
    source: &str,
    mode: LookupMode,
) -> Option<Definition> {
    let object = attribute.child_by_field_name("object")?;
    let expr = parse_object(node_text(object, source).trim())?;
    let target = resolver.evaluate(&expr, object.start_byte())?;

    match resolver.member(&target, name)? {
        MemberRef::Snippet(binding) => binding_definitions(resolver, binding, mode),
        MemberRef::Static(member) => match mode {
            LookupMode::Goto => Some(
                Definition::new(member.name, member.kind)
                    .with_docstring(member.docstring().map(str::to_string)),
            ),
            LookupMode::Infer => target_definition(resolver, resolver.attribute(target, name)?),
        },
    }
}

/// `f(name=...)` with the cursor on `name`: the parameter of `f`.
fn keyword_argument_definitions(
    resolver: &Resolver,
    argument: Node,
    name: &str,
    source: &str,
) -> Option<Definition> {
    let call = argument.parent()?.parent().filter(|n| n.kind() == "call")?;
    let function = call.child_by_field_name("function")?;
    let expr = parse_object(node_text(function, source).trim())?;
    let scope = match resolver.evaluate(&expr, function.start_byte())? {
        Target::Function(binding) => binding.scope?,
        Target::Class(class) => resolver
            .scopes()
            .class_member(class, "__init__")
            .and_then(|init| init.scope)?,
        _ => return None,
    };
    resolver.scopes().scope(scope)
        .bindings
        .iter()
        .find(|b| b.kind == BindingKind::Param && b.name == name)
        .map(binding_definition)
}

/// Definitions for identifiers inside `import` statements.
///
/// Returns `None` when the identifier is not part of an import.
fn import_definitions(node: Node, source: &str) -> Option<Vec<Definition>> {
    let mut dotted = None;
    let mut aliased = None;
    let mut statement = None;
    let mut current = node.parent();
    while let Some(ancestor) = current {
        match ancestor.kind() {
            "dotted_name" => dotted = Some(ancestor),
            "aliased_import" => aliased = Some(ancestor),
            "import_statement" | "import_from_statement" => {
                statement = Some(ancestor);
                break;
            }
            _ => return None,
        }
        current = ancestor.parent();
    }
    let statement = statement?;

    // An alias stands for the name it renames
    let (path_node, end) = match (dotted, aliased) {
        (Some(dotted), _) => (dotted, node.end_byte()),
        (None, Some(aliased)) => {
            let name = aliased.child_by_field_name("name")?;
            (name, name.end_byte())
        }
        (None, None) => return Some(Vec::new()),
    };
    let path = &source[path_node.start_byte()..end];

    let is_module_path = statement.kind() == "import_statement"
        || statement.child_by_field_name("module_name") == Some(path_node);
    if is_module_path {
        let name = path.rsplit('.').next().unwrap_or(path);
        return Some(vec![Definition::new(name, "module").with_docstring(module_doc(path))]);
    }

    let module = statement
        .child_by_field_name("module_name")
        .map(|n| node_text(n, source))
        .unwrap_or_default();
    let member = builtins::module_members(module)
        .and_then(|members| builtins::find_member(members, path));
    Some(
        member
            .map(|m| Definition::new(m.name, m.kind).with_docstring(m.docstring().map(str::to_string)))
            .into_iter()
            .collect(),
    )
}
