// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Follows names, attribute chains and calls to what they denote.

use super::builtins::{self, Member, KNOWN_TYPES, OBJECT_MEMBERS};
use super::context::ObjectExpr;
use super::scope::{Binding, BindingKind, Receiver, ScopeTree, ValueHint};

/// Alias chains (`b = a`, `c = b`, ...) are followed this far.
const MAX_ALIAS_DEPTH: usize = 8;

/// What an expression denotes.
#[derive(Debug, Clone)]
pub enum Target<'t> {
    /// A class declared in the snippet (scope index).
    Class(usize),
    /// An instance of a snippet class.
    Instance(usize),
    /// A builtin type itself (`str`).
    BuiltinType(&'static str),
    /// A value of a builtin type (`"abc"`).
    BuiltinInstance(&'static str),
    /// A module from the known standard-library table, or an unknown one.
    Module(String),
    /// A function declared in the snippet.
    Function(&'t Binding),
    /// A builtin or module-level object known only by its table entry.
    Member(Member),
}

/// A member found on a target.
#[derive(Debug, Clone)]
pub enum MemberRef<'t> {
    Snippet(&'t Binding),
    Static(Member),
}

/// One attribute completion candidate.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub type_tag: &'static str,
    pub docstring: String,
}

impl Candidate {
    pub fn from_binding(binding: &Binding) -> Self {
        let docstring = match (binding.kind, &binding.signature) {
            (BindingKind::Function, Some(signature)) => match &binding.docstring {
                Some(doc) => format!("{signature}\n\n{doc}"),
                None => signature.clone(),
            },
            _ => binding.docstring.clone().unwrap_or_default(),
        };
        Self {
            name: binding.name.clone(),
            type_tag: binding.type_tag(),
            docstring,
        }
    }

    pub fn from_member(member: &Member) -> Self {
        Self {
            name: member.name.to_string(),
            type_tag: member.kind,
            docstring: member.doc.to_string(),
        }
    }
}

pub struct Resolver<'t> {
    scopes: &'t ScopeTree,
}

impl<'t> Resolver<'t> {
    pub fn new(scopes: &'t ScopeTree) -> Self {
        Self { scopes }
    }

    pub fn scopes(&self) -> &'t ScopeTree {
        self.scopes
    }

    /// Resolve a bare name at a byte offset.
    pub fn name(&self, name: &str, offset: usize) -> Option<Target<'t>> {
        self.name_at_depth(name, offset, 0)
    }

    fn name_at_depth(&self, name: &str, offset: usize, depth: usize) -> Option<Target<'t>> {
        if depth > MAX_ALIAS_DEPTH {
            return None;
        }
        match self.scopes.resolve(name, offset) {
            Some(binding) => self.binding_at_depth(binding, depth),
            None => builtin_target(name),
        }
    }

    /// What a binding's value is, as far as the snippet tells.
    pub fn binding(&self, binding: &'t Binding) -> Option<Target<'t>> {
        self.binding_at_depth(binding, 0)
    }

    fn binding_at_depth(&self, binding: &'t Binding, depth: usize) -> Option<Target<'t>> {
        match binding.kind {
            BindingKind::Function => return Some(Target::Function(binding)),
            BindingKind::Class => return binding.scope.map(Target::Class),
            BindingKind::Param => {
                if let Some((receiver, role, class)) = self.scopes.receiver_at(binding.start_byte) {
                    if receiver == binding.name {
                        return Some(match role {
                            Receiver::Instance => Target::Instance(class),
                            Receiver::Class => Target::Class(class),
                        });
                    }
                }
            }
            BindingKind::Variable | BindingKind::Import => {}
        }

        match binding.value.as_ref()? {
            ValueHint::Builtin(type_name) => Some(Target::BuiltinInstance(*type_name)),
            ValueHint::Instance(callee) => {
                let callee = self.name_at_depth(callee, binding.start_byte, depth + 1)?;
                self.call(callee)
            }
            ValueHint::Alias(name) => self.name_at_depth(name, binding.start_byte, depth + 1),
            ValueHint::Module(path) => Some(Target::Module(path.clone())),
            ValueHint::ModuleMember { module, member } => {
                self.attribute(Target::Module(module.clone()), member)
            }
        }
    }

    /// The result of calling a target, when it is a known class.
    pub fn call(&self, target: Target<'t>) -> Option<Target<'t>> {
        match target {
            Target::Class(scope) => Some(Target::Instance(scope)),
            Target::BuiltinType(type_name) => Some(Target::BuiltinInstance(type_name)),
            _ => None,
        }
    }

    /// Look up `target.name`.
    pub fn member(&self, target: &Target<'t>, name: &str) -> Option<MemberRef<'t>> {
        match target {
            Target::Class(scope) | Target::Instance(scope) => self
                .scopes
                .class_member(*scope, name)
                .map(MemberRef::Snippet)
                .or_else(|| builtins::find_member(OBJECT_MEMBERS, name).map(MemberRef::Static)),
            Target::BuiltinType(type_name) | Target::BuiltinInstance(type_name) => {
                builtins::type_members(type_name)
                    .and_then(|members| builtins::find_member(members, name))
                    .map(MemberRef::Static)
            }
            Target::Module(path) => builtins::module_members(path)
                .and_then(|members| builtins::find_member(members, name))
                .map(MemberRef::Static),
            Target::Function(_) | Target::Member(_) => None,
        }
    }

    /// What `target.name` denotes.
    pub fn attribute(&self, target: Target<'t>, name: &str) -> Option<Target<'t>> {
        match self.member(&target, name)? {
            MemberRef::Snippet(binding) => self.binding(binding),
            MemberRef::Static(member) => match (&target, member.kind) {
                (Target::Module(path), "module") => Some(Target::Module(format!("{path}.{name}"))),
                (_, "class") if KNOWN_TYPES.contains(&member.name) => {
                    builtin_type(member.name).map(Target::BuiltinType)
                }
                _ => Some(Target::Member(member)),
            },
        }
    }

    /// Evaluate an attribute receiver read from the cursor line.
    pub fn evaluate(&self, object: &ObjectExpr, offset: usize) -> Option<Target<'t>> {
        match object {
            ObjectExpr::Literal(type_name) => Some(Target::BuiltinInstance(*type_name)),
            ObjectExpr::Chain { names, called } => {
                let (first, rest) = names.split_first()?;
                let mut target = self.name(first, offset)?;
                for name in rest {
                    target = self.attribute(target, name)?;
                }
                if *called {
                    self.call(target)
                } else {
                    Some(target)
                }
            }
        }
    }

    /// Every attribute offered on a target.
    pub fn members(&self, target: &Target<'t>) -> Vec<Candidate> {
        match target {
            Target::Class(scope) | Target::Instance(scope) => {
                let own = self.scopes.class_members(*scope);
                let mut out: Vec<Candidate> = own.iter().map(|b| Candidate::from_binding(b)).collect();
                out.extend(
                    OBJECT_MEMBERS
                        .iter()
                        .filter(|m| !own.iter().any(|b| b.name == m.name))
                        .map(Candidate::from_member),
                );
                out
            }
            Target::BuiltinType(type_name) | Target::BuiltinInstance(type_name) => {
                builtins::type_members(type_name)
                    .map(|members| members.iter().map(Candidate::from_member).collect())
                    .unwrap_or_default()
            }
            Target::Module(path) => builtins::module_members(path)
                .map(|members| members.iter().map(Candidate::from_member).collect())
                .unwrap_or_default(),
            Target::Function(_) | Target::Member(_) => Vec::new(),
        }
    }
}

fn builtin_type(name: &str) -> Option<&'static str> {
    KNOWN_TYPES.iter().copied().find(|t| *t == name)
}

/// Target for a name that is not bound in the snippet.
fn builtin_target<'t>(name: &str) -> Option<Target<'t>> {
    let member = builtins::builtin(name)?;
    match builtin_type(name) {
        Some(type_name) if member.kind == "class" => Some(Target::BuiltinType(type_name)),
        _ => Some(Target::Member(member)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::context::parse_object;
    use crate::analysis::scope::parse;

    fn with_scopes<R>(code: &str, f: impl FnOnce(&Resolver) -> R) -> R {
        let tree = parse(code).unwrap();
        let scopes = ScopeTree::build(&tree, code);
        let resolver = Resolver::new(&scopes);
        f(&resolver)
    }

    fn member_names(resolver: &Resolver, object: &str, offset: usize) -> Vec<String> {
        let object = parse_object(object).unwrap();
        let target = resolver.evaluate(&object, offset).unwrap();
        resolver.members(&target).into_iter().map(|c| c.name).collect()
    }

    #[test]
    fn test_literal_variable_members() {
        let code = "s = 'abc'\nn = s\n";
        with_scopes(code, |r| {
            let names = member_names(r, "n", code.len());
            assert!(names.contains(&"upper".to_string()));
        });
    }

    #[test]
    fn test_constructor_call_members() {
        let code = "class Point:\n    def __init__(self):\n        self.x = 0\n    def norm(self):\n        return 1\np = Point()\n";
        with_scopes(code, |r| {
            let names = member_names(r, "p", code.len());
            assert_eq!(&names[..3], &["__init__", "norm", "x"]);
            assert!(names.contains(&"__class__".to_string()));
        });
    }

    #[test]
    fn test_self_resolves_to_instance() {
        let code = "class A:\n    def f(self):\n        self.v = [1]\n        return self\n";
        with_scopes(code, |r| {
            let offset = code.find("return").unwrap();
            let names = member_names(r, "self.v", offset);
            assert!(names.contains(&"append".to_string()));
        });
    }

    #[test]
    fn test_module_chains() {
        let code = "import os\nfrom os import path\n";
        with_scopes(code, |r| {
            let names = member_names(r, "os.path", code.len());
            assert!(names.contains(&"join".to_string()));
            let names = member_names(r, "path", code.len());
            assert!(names.contains(&"exists".to_string()));
        });
    }

    #[test]
    fn test_builtin_constructor_call() {
        with_scopes("", |r| {
            let names = member_names(r, "dict()", 0);
            assert!(names.contains(&"items".to_string()));
        });
    }

    #[test]
    fn test_alias_cycle_terminates() {
        let code = "a = b\nb = a\n";
        with_scopes(code, |r| {
            assert!(r.name("a", code.len()).is_none());
        });
    }

    #[test]
    fn test_unknown_name() {
        with_scopes("x = undefined_thing()\n", |r| {
            assert!(r.name("x", 22).is_none());
            assert!(r.name("nope", 0).is_none());
        });
    }

    #[test]
    fn test_function_candidate_doc_has_signature() {
        let code = "def f(a):\n    \"\"\"Do it.\"\"\"\n";
        with_scopes(code, |r| {
            let binding = r.scopes().resolve("f", code.len()).unwrap();
            let candidate = Candidate::from_binding(binding);
            assert_eq!(candidate.docstring, "f(a)\n\nDo it.");
            assert_eq!(candidate.type_tag, "function");
        });
    }
}
