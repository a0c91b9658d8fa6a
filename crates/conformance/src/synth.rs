//! Renders a [`ShaderProgram`] as WGSL source.

use std::fmt;

use serde::{Deserialize, Serialize};
use wgsl_binding_model::{Function, ResourceKind, ShaderProgram, VariableKind};

use crate::emit;

/// How an entry point reaches the resources it uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Usage {
    /// The entry point body references the resource itself.
    Direct,
    /// The entry point calls `use_<resource>()`, which references the resource.
    Transitive,
}

impl Usage {
    pub const ALL: [Usage; 2] = [Usage::Direct, Usage::Transitive];

    pub fn name(self) -> &'static str {
        match self {
            Usage::Direct => "direct",
            Usage::Transitive => "transitive",
        }
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn helper_name(global: &str) -> String {
    format!("use_{global}")
}

/// Adds `entry` to `program`, wired to reference `globals` according to `usage`.
///
/// Transitive helpers are shared: a global already wrapped by an earlier entry point is not wrapped
/// again.
pub fn attach_entry_point(
    mut program: ShaderProgram,
    mut entry: Function,
    globals: &[&str],
    usage: Usage,
) -> ShaderProgram {
    for &global in globals {
        match usage {
            Usage::Direct => entry = entry.using(global),
            Usage::Transitive => {
                let helper = helper_name(global);
                if program.function(&helper).is_none() {
                    program = program.with_function(Function::helper(helper.clone()).using(global));
                }
                entry = entry.calling(helper);
            }
        }
    }
    program.with_function(entry)
}

fn resource_kind(program: &ShaderProgram, name: &str) -> Option<ResourceKind> {
    match program.global(name)?.kind {
        VariableKind::Resource(kind) => Some(kind),
        VariableKind::Private | VariableKind::Plain => None,
    }
}

fn body(program: &ShaderProgram, function: &Function) -> String {
    let mut lines = Vec::with_capacity(function.locals.len() + function.uses.len() + function.calls.len());
    lines.extend(function.locals.iter().map(emit::declare_variable));
    lines.extend(
        function
            .uses
            .iter()
            .map(|name| emit::use_global(resource_kind(program, name), name)),
    );
    lines.extend(function.calls.iter().map(|callee| format!("{callee}();")));
    lines.join("\n")
}

/// Module-scope declarations first, then helpers, then entry points.
///
/// Each sampler is followed by its companion texture, numbered in declaration order.
pub fn synthesize(program: &ShaderProgram) -> String {
    let mut out = String::new();
    let mut companions = 0;
    for global in &program.globals {
        out.push_str(&emit::declare_variable(global));
        out.push('\n');
        if let VariableKind::Resource(kind) = global.kind {
            if let Some(texture) = emit::declare_companion_texture(kind, &global.name, companions) {
                out.push_str(&texture);
                out.push('\n');
                companions += 1;
            }
        }
    }
    for helper in program.helpers() {
        out.push('\n');
        out.push_str(&emit::declare_function(&helper.name, &body(program, helper)));
    }
    for entry in program.entry_points() {
        // Entry points always carry a stage.
        let Some(stage) = entry.stage else {
            continue;
        };
        out.push('\n');
        out.push_str(&emit::declare_entry_point(&entry.name, stage, &body(program, entry)));
    }
    out
}
