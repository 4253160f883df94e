// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Lexical scope model built from a tree-sitter parse of a snippet.
//!
//! One [`Scope`] per module, function, class, lambda and comprehension.
//! Each scope lists the names bound in it, where they are bound, and a
//! cheap hint about the bound value (literal type, constructor call,
//! alias, import) used for attribute completion and `infer`.

use std::collections::HashSet;
use std::time::Duration;

use tree_sitter::{Node, Parser, Tree};

use crate::error::AnalysisError;

use super::builtins::{self, KNOWN_TYPES};
use super::docstring::{cleandoc, literal_value};

/// Deepest syntax nesting the scope builder descends into.
const MAX_DEPTH: usize = 200;

/// Parse Python source. Syntax errors are kept in the tree, never reported.
pub fn parse(code: &str) -> Result<Tree, AnalysisError> {
    parse_within(code, None)
}

/// Parse, giving up with [`AnalysisError::Timeout`] once `budget` of
/// parser time has been spent.
pub fn parse_within(code: &str, budget: Option<Duration>) -> Result<Tree, AnalysisError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| AnalysisError::Internal(format!("Failed to load Python grammar: {e}")))?;
    if let Some(budget) = budget {
        // Zero disables the parser timeout.
        parser.set_timeout_micros((budget.as_micros() as u64).max(1));
    }
    parser.parse(code, None).ok_or_else(|| match budget {
        Some(budget) => AnalysisError::Timeout(budget.as_millis() as u64),
        None => AnalysisError::Internal("Parser returned no tree".to_string()),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Function,
    Class,
    Lambda,
    Comprehension,
}

/// What kind of statement introduced a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Function,
    Class,
    Variable,
    Param,
    Import,
}

/// A cheap, syntactic guess at the value bound to a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueHint {
    /// An instance of a builtin type (`"x"`, `[]`, `dict()` ...).
    Builtin(&'static str),
    /// The result of calling a name, resolved later (`Widget()`).
    Instance(String),
    /// Another name (`b = a`).
    Alias(String),
    /// An imported module (`import os.path as p`).
    Module(String),
    /// A name imported from a module (`from math import pi`).
    ModuleMember { module: String, member: String },
}

/// Role of the first parameter of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    Instance,
    Class,
}

/// One place a name is bound.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    /// Byte range of the name itself.
    pub start_byte: usize,
    pub end_byte: usize,
    /// The binding is in effect from this byte onward.
    pub visible_from: usize,
    /// 1-based line of the name.
    pub line: usize,
    /// 0-based column of the name, in characters.
    pub column: usize,
    pub docstring: Option<String>,
    /// Call signature for functions (`area(w, h=1)`).
    pub signature: Option<String>,
    pub value: Option<ValueHint>,
    /// Scope opened by a `def`/`class` binding.
    pub scope: Option<usize>,
}

impl Binding {
    /// Whether the byte offset falls on the bound name.
    pub fn covers(&self, offset: usize) -> bool {
        self.start_byte <= offset && offset <= self.end_byte
    }

    /// Engine type tag for this binding.
    pub fn type_tag(&self) -> &'static str {
        match self.kind {
            BindingKind::Function => "function",
            BindingKind::Class => "class",
            BindingKind::Variable => "statement",
            BindingKind::Param => "param",
            BindingKind::Import => match &self.value {
                Some(ValueHint::ModuleMember { module, member }) => builtins::module_members(module)
                    .and_then(|members| builtins::find_member(members, member))
                    .map(|m| m.kind)
                    .unwrap_or("module"),
                _ => "module",
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub start_byte: usize,
    pub end_byte: usize,
    pub parent: Option<usize>,
    pub bindings: Vec<Binding>,
    /// `self.x = ...` assignments made in methods (class scopes only).
    pub instance_attrs: Vec<Binding>,
    /// Base class expressions as written (class scopes only).
    pub bases: Vec<String>,
    /// First parameter of a method and what it receives.
    pub receiver: Option<(String, Receiver)>,
    /// Name of the class or function that opened this scope.
    pub name: Option<String>,
}

impl Scope {
    fn new(kind: ScopeKind, start_byte: usize, end_byte: usize, parent: Option<usize>) -> Self {
        Self {
            kind,
            start_byte,
            end_byte,
            parent,
            bindings: Vec::new(),
            instance_attrs: Vec::new(),
            bases: Vec::new(),
            receiver: None,
            name: None,
        }
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start_byte <= offset && offset <= self.end_byte
    }
}

/// All scopes of a snippet; index 0 is the module.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    pub scopes: Vec<Scope>,
}

impl ScopeTree {
    /// Build the scope tree for a parsed snippet.
    pub fn build(tree: &Tree, source: &str) -> Self {
        let root = tree.root_node();
        let mut builder = Builder {
            source,
            scopes: vec![Scope::new(ScopeKind::Module, 0, source.len(), None)],
        };
        builder.visit_children(root, 0, 0);
        Self {
            scopes: builder.scopes,
        }
    }

    pub fn scope(&self, index: usize) -> &Scope {
        &self.scopes[index]
    }

    /// Deepest scope containing the offset.
    pub fn innermost(&self, offset: usize) -> usize {
        // Scopes are created in pre-order, so the last one containing the
        // offset is the deepest.
        self.scopes
            .iter()
            .rposition(|s| s.contains(offset))
            .unwrap_or(0)
    }

    /// Scopes searched for a name at the offset, innermost first.
    ///
    /// Class bodies are only searched when the offset is directly inside
    /// them, never from methods nested in them.
    pub fn chain(&self, offset: usize) -> Vec<usize> {
        let inner = self.innermost(offset);
        let mut chain = vec![inner];
        let mut current = self.scopes[inner].parent;
        while let Some(index) = current {
            if self.scopes[index].kind != ScopeKind::Class {
                chain.push(index);
            }
            current = self.scopes[index].parent;
        }
        chain
    }

    /// Every name visible at the offset, one binding per name, innermost first.
    ///
    /// In the innermost scope only bindings already in effect count; in
    /// enclosing scopes every binding does, since a function body may refer
    /// to names bound after it.
    pub fn visible_names(&self, offset: usize, exclude: impl Fn(&str) -> bool) -> Vec<&Binding> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for (depth, &index) in self.chain(offset).iter().enumerate() {
            for binding in &self.scopes[index].bindings {
                if exclude(&binding.name) || binding.covers(offset) {
                    continue;
                }
                if depth == 0 && binding.visible_from > offset {
                    continue;
                }
                if seen.insert(binding.name.as_str()) {
                    names.push(binding);
                }
            }
        }
        names
    }

    /// Resolve a name at the offset to the binding it refers to.
    pub fn resolve(&self, name: &str, offset: usize) -> Option<&Binding> {
        let chain = self.chain(offset);

        // The offset sits on a binding occurrence itself.
        for &index in &chain {
            if let Some(b) = self.scopes[index]
                .bindings
                .iter()
                .find(|b| b.name == name && b.covers(offset))
            {
                return Some(b);
            }
        }

        for (depth, &index) in chain.iter().enumerate() {
            let mut candidates = self.scopes[index].bindings.iter().filter(|b| b.name == name);
            let preceding = candidates
                .clone()
                .filter(|b| b.visible_from <= offset)
                .last();
            if let Some(binding) = preceding {
                return Some(binding);
            }
            if depth > 0 {
                if let Some(binding) = candidates.next() {
                    return Some(binding);
                }
            }
        }
        None
    }

    /// Resolve a name to a class scope declared in the snippet.
    pub fn resolve_class(&self, name: &str, offset: usize) -> Option<usize> {
        self.resolve(name, offset)
            .filter(|b| b.kind == BindingKind::Class)
            .and_then(|b| b.scope)
    }

    /// Members of a snippet class: own attributes and methods, attributes
    /// assigned through `self`, then those of snippet-declared bases.
    ///
    /// Bases are walked depth-first with an explicit stack, so a long
    /// inheritance chain cannot exhaust the thread stack.
    pub fn class_members(&self, class_scope: usize) -> Vec<&Binding> {
        let mut seen = HashSet::new();
        let mut visited = HashSet::new();
        let mut members = Vec::new();
        let mut pending = vec![class_scope];

        while let Some(index) = pending.pop() {
            if !visited.insert(index) {
                continue;
            }
            let scope = &self.scopes[index];
            for binding in scope.bindings.iter().chain(scope.instance_attrs.iter()) {
                if seen.insert(binding.name.as_str()) {
                    members.push(binding);
                }
            }
            // Reversed so the first base is searched first
            pending.extend(
                scope
                    .bases
                    .iter()
                    .rev()
                    .filter_map(|base| self.resolve_class(base, scope.start_byte)),
            );
        }
        members
    }

    /// Find one member of a snippet class, searching bases too.
    pub fn class_member(&self, class_scope: usize, name: &str) -> Option<&Binding> {
        self.class_members(class_scope)
            .into_iter()
            .find(|b| b.name == name)
    }

    /// The binding that declared a class or function scope.
    pub fn declaration(&self, scope: usize) -> Option<&Binding> {
        let parent = self.scopes[scope].parent?;
        self.scopes[parent]
            .bindings
            .iter()
            .find(|b| b.scope == Some(scope))
    }

    /// The class a method's scope belongs to, with the receiver name.
    pub fn receiver_at(&self, offset: usize) -> Option<(&str, Receiver, usize)> {
        let mut current = Some(self.innermost(offset));
        while let Some(index) = current {
            let scope = &self.scopes[index];
            if scope.kind == ScopeKind::Function {
                let (name, role) = scope.receiver.as_ref()?;
                let class = scope.parent?;
                return Some((name.as_str(), *role, class));
            }
            current = scope.parent;
        }
        None
    }
}

struct Builder<'s> {
    source: &'s str,
    scopes: Vec<Scope>,
}

impl<'s> Builder<'s> {
    fn text(&self, node: Node) -> &'s str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn visit_children(&mut self, node: Node, scope: usize, depth: usize) {
        let children: Vec<Node> = node.named_children(&mut node.walk()).collect();
        for child in children {
            self.visit(child, scope, depth + 1);
        }
    }

    fn visit_field(&mut self, node: Node, field: &str, scope: usize, depth: usize) {
        if let Some(child) = node.child_by_field_name(field) {
            self.visit(child, scope, depth + 1);
        }
    }

    fn visit(&mut self, node: Node, scope: usize, depth: usize) {
        if depth > MAX_DEPTH {
            return;
        }
        match node.kind() {
            "function_definition" => self.visit_function(node, scope, depth),
            "class_definition" => self.visit_class(node, scope, depth),
            "lambda" => self.visit_lambda(node, scope, depth),
            "list_comprehension" | "set_comprehension" | "dictionary_comprehension"
            | "generator_expression" => self.visit_comprehension(node, scope, depth),
            "assignment" => self.visit_assignment(node, scope, depth),
            "augmented_assignment" => {
                if let Some(left) = node.child_by_field_name("left") {
                    self.bind_targets(left, scope, None, node.end_byte());
                }
                self.visit_field(node, "right", scope, depth);
            }
            "for_statement" => {
                if let Some(left) = node.child_by_field_name("left") {
                    self.bind_targets(left, scope, None, left.end_byte());
                }
                self.visit_field(node, "right", scope, depth);
                self.visit_field(node, "body", scope, depth);
                self.visit_field(node, "alternative", scope, depth);
            }
            "as_pattern" => {
                let value = node.named_child(0);
                if let Some(alias) = node.child_by_field_name("alias") {
                    let hint = value.and_then(|v| self.value_hint(v));
                    self.bind_targets(alias, scope, hint, node.end_byte());
                }
                if let Some(value) = value {
                    self.visit(value, scope, depth + 1);
                }
            }
            "except_clause" => {
                // Older grammars: `except E as name:` with a bare identifier
                let children: Vec<Node> = node.children(&mut node.walk()).collect();
                for pair in children.windows(2) {
                    if pair[0].kind() == "as" && pair[1].kind() == "identifier" {
                        self.bind_name(pair[1], scope, BindingKind::Variable, None, pair[1].end_byte());
                    }
                }
                for child in children.into_iter().filter(|c| c.is_named()) {
                    if child.kind() != "identifier" {
                        self.visit(child, scope, depth + 1);
                    }
                }
            }
            "named_expression" => {
                let target_scope = self.enclosing_non_comprehension(scope);
                if let Some(name) = node.child_by_field_name("name") {
                    let hint = node
                        .child_by_field_name("value")
                        .and_then(|v| self.value_hint(v));
                    self.bind_name(name, target_scope, BindingKind::Variable, hint, node.end_byte());
                }
                self.visit_field(node, "value", scope, depth);
            }
            "import_statement" => self.visit_import(node, scope),
            "import_from_statement" => self.visit_import_from(node, scope),
            "global_statement" | "nonlocal_statement" | "comment" | "string" | "integer"
            | "float" => {}
            _ => self.visit_children(node, scope, depth),
        }
    }

    fn enclosing_non_comprehension(&self, mut scope: usize) -> usize {
        while self.scopes[scope].kind == ScopeKind::Comprehension {
            match self.scopes[scope].parent {
                Some(parent) => scope = parent,
                None => break,
            }
        }
        scope
    }

    fn visit_function(&mut self, node: Node, scope: usize, depth: usize) {
        let next = self.scopes.len();
        let name_node = node.child_by_field_name("name");
        let params = node.child_by_field_name("parameters");

        let mut name = None;
        if let Some(name_node) = name_node {
            let text = self.text(name_node).to_string();
            let signature = params.map(|p| {
                let params_text = self.text(p).split_whitespace().collect::<Vec<_>>().join(" ");
                format!("{text}{params_text}")
            });
            let binding = Binding {
                signature,
                docstring: self.body_docstring(node),
                scope: Some(next),
                ..self.make_binding(name_node, BindingKind::Function, None, name_node.end_byte())
            };
            self.scopes[scope].bindings.push(binding);
            name = Some(text);
        }

        let start = params
            .map(|p| p.start_byte())
            .or(name_node.map(|n| n.end_byte()))
            .unwrap_or(node.start_byte());
        let mut function_scope = Scope::new(ScopeKind::Function, start, node.end_byte(), Some(scope));
        function_scope.name = name;
        self.scopes.push(function_scope);

        if let Some(params) = params {
            let first = self.bind_parameters(params, next);
            if self.scopes[scope].kind == ScopeKind::Class {
                let decorators = self.decorators(node);
                let role = if decorators.iter().any(|d| d == "staticmethod") {
                    None
                } else if decorators.iter().any(|d| d == "classmethod") {
                    Some(Receiver::Class)
                } else {
                    Some(Receiver::Instance)
                };
                self.scopes[next].receiver = first.zip(role);
            }
        }

        self.visit_field(node, "body", next, depth);
    }

    fn visit_class(&mut self, node: Node, scope: usize, depth: usize) {
        let next = self.scopes.len();
        let name_node = node.child_by_field_name("name");
        let body = node.child_by_field_name("body");

        let mut name = None;
        if let Some(name_node) = name_node {
            let binding = Binding {
                docstring: self.body_docstring(node),
                scope: Some(next),
                ..self.make_binding(name_node, BindingKind::Class, None, name_node.end_byte())
            };
            self.scopes[scope].bindings.push(binding);
            name = Some(self.text(name_node).to_string());
        }

        let mut bases = Vec::new();
        if let Some(args) = node.child_by_field_name("superclasses") {
            let children: Vec<Node> = args.named_children(&mut args.walk()).collect();
            for base in children {
                if matches!(base.kind(), "identifier" | "attribute") {
                    bases.push(self.text(base).to_string());
                }
            }
        }

        let start = body.map(|b| b.start_byte()).unwrap_or(node.end_byte());
        let mut class_scope = Scope::new(ScopeKind::Class, start, node.end_byte(), Some(scope));
        class_scope.bases = bases;
        class_scope.name = name;
        self.scopes.push(class_scope);

        if let Some(body) = body {
            self.visit(body, next, depth + 1);
        }
    }

    fn visit_lambda(&mut self, node: Node, scope: usize, depth: usize) {
        let next = self.scopes.len();
        self.scopes.push(Scope::new(
            ScopeKind::Lambda,
            node.start_byte(),
            node.end_byte(),
            Some(scope),
        ));
        if let Some(params) = node.child_by_field_name("parameters") {
            self.bind_parameters(params, next);
        }
        self.visit_field(node, "body", next, depth);
    }

    fn visit_comprehension(&mut self, node: Node, scope: usize, depth: usize) {
        let next = self.scopes.len();
        self.scopes.push(Scope::new(
            ScopeKind::Comprehension,
            node.start_byte(),
            node.end_byte(),
            Some(scope),
        ));
        let children: Vec<Node> = node.named_children(&mut node.walk()).collect();
        for child in children {
            if child.kind() == "for_in_clause" {
                if let Some(left) = child.child_by_field_name("left") {
                    // Targets are visible in the element expression before the `for`
                    self.bind_targets(left, next, None, node.start_byte());
                }
                self.visit_field(child, "right", next, depth + 1);
            } else {
                self.visit(child, next, depth + 1);
            }
        }
    }

    fn visit_assignment(&mut self, node: Node, scope: usize, depth: usize) {
        let right = node.child_by_field_name("right");
        let hint = right
            .and_then(|r| self.value_hint(r))
            .or_else(|| {
                node.child_by_field_name("type")
                    .and_then(|t| self.annotation_hint(t))
            });
        if let Some(left) = node.child_by_field_name("left") {
            self.bind_targets(left, scope, hint, node.end_byte());
        }
        if let Some(right) = right {
            self.visit(right, scope, depth + 1);
        }
    }

    fn visit_import(&mut self, node: Node, scope: usize) {
        let names: Vec<Node> = node
            .children_by_field_name("name", &mut node.walk())
            .collect();
        for item in names {
            match item.kind() {
                "dotted_name" => {
                    // `import os.path` binds `os`
                    if let Some(first) = item.named_child(0) {
                        let module = self.text(first).to_string();
                        self.bind_import(first, scope, ValueHint::Module(module), node.end_byte());
                    }
                }
                "aliased_import" => {
                    let module = item
                        .child_by_field_name("name")
                        .map(|n| self.text(n).to_string());
                    if let (Some(alias), Some(module)) = (item.child_by_field_name("alias"), module) {
                        self.bind_import(alias, scope, ValueHint::Module(module), node.end_byte());
                    }
                }
                _ => {}
            }
        }
    }

    fn visit_import_from(&mut self, node: Node, scope: usize) {
        let module = node
            .child_by_field_name("module_name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();

        let children: Vec<Node> = node.named_children(&mut node.walk()).collect();
        if let Some(wildcard) = children.iter().find(|c| c.kind() == "wildcard_import") {
            if let Some(members) = builtins::module_members(&module) {
                for member in members {
                    let binding = Binding {
                        name: member.name.to_string(),
                        value: Some(ValueHint::ModuleMember {
                            module: module.clone(),
                            member: member.name.to_string(),
                        }),
                        ..self.make_binding(*wildcard, BindingKind::Import, None, node.end_byte())
                    };
                    self.scopes[scope].bindings.push(binding);
                }
            }
            return;
        }

        let names: Vec<Node> = node
            .children_by_field_name("name", &mut node.walk())
            .collect();
        for item in names {
            let (target, member) = match item.kind() {
                "dotted_name" => (Some(item), self.text(item).to_string()),
                "aliased_import" => (
                    item.child_by_field_name("alias"),
                    item.child_by_field_name("name")
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_default(),
                ),
                _ => continue,
            };
            if let Some(target) = target {
                let hint = ValueHint::ModuleMember {
                    module: module.clone(),
                    member,
                };
                self.bind_import(target, scope, hint, node.end_byte());
            }
        }
    }

    fn bind_import(&mut self, name: Node, scope: usize, hint: ValueHint, visible_from: usize) {
        let docstring = match &hint {
            ValueHint::Module(path) => builtins::module_entry(path).and_then(|m| m.docstring()),
            ValueHint::ModuleMember { module, member } => builtins::module_members(module)
                .and_then(|members| builtins::find_member(members, member))
                .and_then(|m| m.docstring()),
            _ => None,
        };
        let binding = Binding {
            docstring: docstring.map(str::to_string),
            ..self.make_binding(name, BindingKind::Import, Some(hint), visible_from)
        };
        self.scopes[scope].bindings.push(binding);
    }

    /// Bind parameter names; returns the first positional parameter's name.
    fn bind_parameters(&mut self, params: Node, scope: usize) -> Option<String> {
        let mut first = None;
        let children: Vec<Node> = params.named_children(&mut params.walk()).collect();
        for (index, param) in children.into_iter().enumerate() {
            let (name, hint) = match param.kind() {
                "identifier" => (Some(param), None),
                "typed_parameter" => (
                    param.named_child(0).and_then(|n| self.splat_name(n)),
                    param
                        .child_by_field_name("type")
                        .and_then(|t| self.annotation_hint(t)),
                ),
                "default_parameter" | "typed_default_parameter" => (
                    param.child_by_field_name("name"),
                    param
                        .child_by_field_name("type")
                        .and_then(|t| self.annotation_hint(t))
                        .or_else(|| {
                            param
                                .child_by_field_name("value")
                                .and_then(|v| self.value_hint(v))
                        }),
                ),
                "list_splat_pattern" | "dictionary_splat_pattern" => {
                    let hint = if param.kind() == "list_splat_pattern" { "tuple" } else { "dict" };
                    (self.splat_name(param), Some(ValueHint::Builtin(hint)))
                }
                _ => (None, None),
            };
            if let Some(name) = name {
                if index == 0 && !param.kind().ends_with("splat_pattern") {
                    first = Some(self.text(name).to_string());
                }
                self.bind_name(name, scope, BindingKind::Param, hint, name.end_byte());
            }
        }
        first
    }

    fn splat_name<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        match node.kind() {
            "identifier" => Some(node),
            "list_splat_pattern" | "dictionary_splat_pattern" => {
                let children: Vec<Node> = node.named_children(&mut node.walk()).collect();
                children.into_iter().find(|c| c.kind() == "identifier")
            }
            _ => None,
        }
    }

    fn bind_targets(&mut self, target: Node, scope: usize, hint: Option<ValueHint>, visible_from: usize) {
        self.bind_targets_at(target, scope, hint, visible_from, 0);
    }

    fn bind_targets_at(
        &mut self,
        target: Node,
        scope: usize,
        hint: Option<ValueHint>,
        visible_from: usize,
        depth: usize,
    ) {
        if depth > MAX_DEPTH {
            return;
        }
        match target.kind() {
            "identifier" => self.bind_name(target, scope, BindingKind::Variable, hint, visible_from),
            "attribute" => self.bind_instance_attr(target, scope, hint),
            "pattern_list" | "tuple_pattern" | "list_pattern" | "expression_list" | "tuple"
            | "list" | "parenthesized_expression" | "as_pattern_target" | "list_splat_pattern" => {
                let children: Vec<Node> = target.named_children(&mut target.walk()).collect();
                // Hints only describe single-name targets
                let hint = if target.kind() == "as_pattern_target" && children.len() == 1 {
                    hint
                } else {
                    None
                };
                for child in children {
                    self.bind_targets_at(child, scope, hint.clone(), visible_from, depth + 1);
                }
            }
            _ => {}
        }
    }

    /// Record `self.name = value` on the class owning the current method.
    fn bind_instance_attr(&mut self, target: Node, scope: usize, hint: Option<ValueHint>) {
        let (Some(object), Some(attr)) = (
            target.child_by_field_name("object"),
            target.child_by_field_name("attribute"),
        ) else {
            return;
        };
        let mut current = Some(scope);
        while let Some(index) = current {
            if self.scopes[index].kind == ScopeKind::Function {
                break;
            }
            current = self.scopes[index].parent;
        }
        let Some(function) = current else { return };
        let Some((receiver, Receiver::Instance)) = self.scopes[function].receiver.clone() else {
            return;
        };
        if self.text(object) != receiver {
            return;
        }
        let Some(class) = self.scopes[function].parent else { return };

        let name = self.text(attr);
        if self.scopes[class].instance_attrs.iter().any(|b| b.name == name) {
            return;
        }
        let binding = self.make_binding(attr, BindingKind::Variable, hint, target.end_byte());
        self.scopes[class].instance_attrs.push(binding);
    }

    fn bind_name(
        &mut self,
        name: Node,
        scope: usize,
        kind: BindingKind,
        hint: Option<ValueHint>,
        visible_from: usize,
    ) {
        let binding = self.make_binding(name, kind, hint, visible_from);
        self.scopes[scope].bindings.push(binding);
    }

    fn make_binding(
        &self,
        name: Node,
        kind: BindingKind,
        value: Option<ValueHint>,
        visible_from: usize,
    ) -> Binding {
        Binding {
            name: self.text(name).to_string(),
            kind,
            start_byte: name.start_byte(),
            end_byte: name.end_byte(),
            visible_from,
            line: name.start_position().row + 1,
            column: char_column(self.source, name.start_byte()),
            docstring: None,
            signature: None,
            value,
            scope: None,
        }
    }

    /// Names of the decorators applied to a definition (`@x.y(...)` → `y`).
    fn decorators(&self, definition: Node) -> Vec<String> {
        let Some(parent) = definition.parent().filter(|p| p.kind() == "decorated_definition") else {
            return Vec::new();
        };
        let children: Vec<Node> = parent.named_children(&mut parent.walk()).collect();
        children
            .into_iter()
            .filter(|c| c.kind() == "decorator")
            .map(|d| {
                let text = self.text(d).trim_start_matches('@');
                let head = text.split('(').next().unwrap_or(text);
                head.rsplit('.').next().unwrap_or(head).trim().to_string()
            })
            .collect()
    }

    /// Docstring of a `def` or `class`: a string literal as first statement.
    fn body_docstring(&self, node: Node) -> Option<String> {
        let body = node.child_by_field_name("body")?;
        let first = body.named_child(0)?;
        if first.kind() != "expression_statement" {
            return None;
        }
        let expr = first.named_child(0)?;
        if expr.kind() != "string" {
            return None;
        }
        let cleaned = cleandoc(&literal_value(self.text(expr))?);
        (!cleaned.is_empty()).then_some(cleaned)
    }

    fn annotation_hint(&self, annotation: Node) -> Option<ValueHint> {
        let text = self.text(annotation).trim();
        if let Some(known) = KNOWN_TYPES.iter().find(|t| **t == text) {
            return Some(ValueHint::Builtin(known));
        }
        is_identifier(text).then(|| ValueHint::Instance(text.to_string()))
    }

    /// Hint for an assigned value, looking through parentheses and chained
    /// assignments (`a = (b = 1)`) at most [`MAX_DEPTH`] levels deep.
    fn value_hint(&self, value: Node) -> Option<ValueHint> {
        let mut value = value;
        for _ in 0..MAX_DEPTH {
            let inner = match value.kind() {
                "parenthesized_expression" => value.named_child(0),
                "assignment" => value.child_by_field_name("right"),
                _ => return self.literal_hint(value),
            };
            value = inner?;
        }
        None
    }

    fn literal_hint(&self, value: Node) -> Option<ValueHint> {
        match value.kind() {
            "string" => {
                let text = self.text(value);
                let prefix: String = text
                    .chars()
                    .take_while(|c| c.is_ascii_alphabetic())
                    .collect();
                if prefix.contains(['b', 'B']) {
                    Some(ValueHint::Builtin("bytes"))
                } else {
                    Some(ValueHint::Builtin("str"))
                }
            }
            "concatenated_string" => Some(ValueHint::Builtin("str")),
            "integer" => Some(ValueHint::Builtin("int")),
            "float" => Some(ValueHint::Builtin("float")),
            "true" | "false" => Some(ValueHint::Builtin("bool")),
            "list" | "list_comprehension" => Some(ValueHint::Builtin("list")),
            "dictionary" | "dictionary_comprehension" => Some(ValueHint::Builtin("dict")),
            "set" | "set_comprehension" => Some(ValueHint::Builtin("set")),
            "tuple" => Some(ValueHint::Builtin("tuple")),
            "identifier" => Some(ValueHint::Alias(self.text(value).to_string())),
            "call" => {
                let function = value.child_by_field_name("function")?;
                if function.kind() != "identifier" {
                    return None;
                }
                let name = self.text(function);
                match KNOWN_TYPES.iter().find(|t| **t == name) {
                    Some(known) => Some(ValueHint::Builtin(known)),
                    None => Some(ValueHint::Instance(name.to_string())),
                }
            }
            _ => None,
        }
    }
}

/// Column of a byte offset within its line, counted in characters.
pub fn char_column(source: &str, byte: usize) -> usize {
    let byte = byte.min(source.len());
    let line_start = source[..byte].rfind('\n').map(|i| i + 1).unwrap_or(0);
    source[line_start..byte].chars().count()
}

/// Whether the text is a plain Python identifier.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => chars.all(|c| c == '_' || c.is_alphanumeric()),
        _ => false,
    }
}
