//! Predicts whether a WGSL compiler must accept a [`ShaderProgram`] under the resource binding
//! rules:
//!
//! - `@group`/`@binding` may only appear on module-scope resource variables, never on `private`
//!   (or other plain data) variables and never inside a function body.
//! - Every module-scope resource variable carries both attributes.
//! - No two distinct resources reachable from the same entry point share a [`BindingKey`].
//!   Reachability is the transitive closure of the call graph, so helper indirection is
//!   irrelevant, and resources that no single entry point reaches together may share a key.
//!
//! The predicate is total: structurally ill-formed programs (dangling references, duplicate
//! names, recursion) are rejections rather than errors.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::call_graph::CallGraph;
use crate::program::{BindingKey, ShaderProgram, VariableKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Accept,
    Reject { reason: Rejection },
}

impl Verdict {
    pub fn accepts(&self) -> bool {
        matches!(self, Verdict::Accept)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verdict::Accept => None,
            Verdict::Reject { reason } => Some(reason),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accept => f.write_str("accept"),
            Verdict::Reject { reason } => write!(f, "reject ({reason})"),
        }
    }
}

impl From<Rejection> for Verdict {
    fn from(reason: Rejection) -> Self {
        Verdict::Reject { reason }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// `function` is set when the clash is between a local and another local, or between a local
    /// and a global the same function uses.
    DuplicateSymbol {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        function: Option<String>,
    },
    UnresolvedUse {
        function: String,
        name: String,
    },
    UnresolvedCall {
        caller: String,
        callee: String,
    },
    Recursion {
        path: Vec<String>,
    },
    AttributeOnFunctionScope {
        function: String,
        variable: String,
    },
    AttributeOnNonResource {
        variable: String,
    },
    MissingAttribute {
        variable: String,
        missing_group: bool,
        missing_binding: bool,
    },
    BindingCollision {
        entry_point: String,
        key: BindingKey,
        first: String,
        second: String,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::DuplicateSymbol {
                name,
                function: None,
            } => write!(f, "`{name}` is declared more than once"),
            Rejection::DuplicateSymbol {
                name,
                function: Some(function),
            } => write!(f, "`{name}` is declared more than once in `{function}`"),
            Rejection::UnresolvedUse { function, name } => {
                write!(f, "`{function}` references undeclared variable `{name}`")
            }
            Rejection::UnresolvedCall { caller, callee } => {
                write!(f, "`{caller}` calls undeclared function `{callee}`")
            }
            Rejection::Recursion { path } => write!(f, "recursive call chain {}", path.join(" -> ")),
            Rejection::AttributeOnFunctionScope { function, variable } => write!(
                f,
                "function-scope variable `{variable}` in `{function}` has @group/@binding"
            ),
            Rejection::AttributeOnNonResource { variable } => {
                write!(f, "non-resource variable `{variable}` has @group/@binding")
            }
            Rejection::MissingAttribute {
                variable,
                missing_group,
                missing_binding,
            } => {
                let missing = match (missing_group, missing_binding) {
                    (true, true) => "@group and @binding",
                    (true, false) => "@group",
                    _ => "@binding",
                };
                write!(f, "resource `{variable}` is missing {missing}")
            }
            Rejection::BindingCollision {
                entry_point,
                key,
                first,
                second,
            } => write!(
                f,
                "`{first}` and `{second}` share {key} in entry point `{entry_point}`"
            ),
        }
    }
}

/// Computes the verdict for `program`.
pub fn evaluate(program: &ShaderProgram) -> Verdict {
    match first_rejection(program) {
        Some(reason) => reason.into(),
        None => Verdict::Accept,
    }
}

fn first_rejection(program: &ShaderProgram) -> Option<Rejection> {
    if let Some(reason) = check_symbols(program) {
        return Some(reason);
    }

    let graph = CallGraph::build(program);
    if let Some((caller, callee)) = graph.unresolved_calls().into_iter().next() {
        return Some(Rejection::UnresolvedCall {
            caller: caller.to_string(),
            callee: callee.to_string(),
        });
    }
    if let Some(path) = graph.find_cycle() {
        return Some(Rejection::Recursion {
            path: path.into_iter().map(str::to_string).collect(),
        });
    }

    check_attribute_placement(program)
        .or_else(|| check_attribute_presence(program))
        .or_else(|| check_collisions(program, &graph))
}

fn check_symbols(program: &ShaderProgram) -> Option<Rejection> {
    let mut module_scope = BTreeSet::new();
    let names = program
        .globals
        .iter()
        .map(|g| g.name.as_str())
        .chain(program.functions.iter().map(|f| f.name.as_str()));
    for name in names {
        if !module_scope.insert(name) {
            return Some(Rejection::DuplicateSymbol {
                name: name.to_string(),
                function: None,
            });
        }
    }

    // A local may not repeat another local, nor hide a global its function references.
    for function in &program.functions {
        let mut scope: BTreeSet<&str> = BTreeSet::new();
        for local in &function.locals {
            let name = local.name.as_str();
            if !scope.insert(name) || function.uses.iter().any(|used| used == name) {
                return Some(Rejection::DuplicateSymbol {
                    name: name.to_string(),
                    function: Some(function.name.clone()),
                });
            }
        }
    }

    for function in &program.functions {
        for name in &function.uses {
            if program.global(name).is_none() {
                return Some(Rejection::UnresolvedUse {
                    function: function.name.clone(),
                    name: name.clone(),
                });
            }
        }
    }
    None
}

fn check_attribute_placement(program: &ShaderProgram) -> Option<Rejection> {
    for function in &program.functions {
        if let Some(local) = function.locals.iter().find(|l| l.has_attributes()) {
            return Some(Rejection::AttributeOnFunctionScope {
                function: function.name.clone(),
                variable: local.name.clone(),
            });
        }
    }

    program
        .globals
        .iter()
        .find(|g| !g.kind.is_resource() && g.has_attributes())
        .map(|g| Rejection::AttributeOnNonResource {
            variable: g.name.clone(),
        })
}

fn check_attribute_presence(program: &ShaderProgram) -> Option<Rejection> {
    program
        .globals
        .iter()
        .filter(|g| matches!(g.kind, VariableKind::Resource(_)))
        .find(|g| g.binding_key().is_none())
        .map(|g| Rejection::MissingAttribute {
            variable: g.name.clone(),
            missing_group: g.group.is_none(),
            missing_binding: g.binding.is_none(),
        })
}

fn check_collisions(program: &ShaderProgram, graph: &CallGraph<'_>) -> Option<Rejection> {
    for entry in program.entry_points() {
        let mut claimed: BTreeMap<BindingKey, &str> = BTreeMap::new();
        // Declaration order decides which resource is reported first.
        let reachable = graph.reachable_globals(&entry.name);
        let resources = program
            .globals
            .iter()
            .filter(|g| g.kind.is_resource() && reachable.contains(g.name.as_str()));
        for resource in resources {
            let Some(key) = resource.binding_key() else {
                continue;
            };
            if let Some(first) = claimed.insert(key, resource.name.as_str()) {
                return Some(Rejection::BindingCollision {
                    entry_point: entry.name.clone(),
                    key,
                    first: first.to_string(),
                    second: resource.name.clone(),
                });
            }
        }
    }
    None
}
