use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kinds::{ResourceKind, Stage};

/// The `(group, binding)` pair of a fully attributed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BindingKey {
    pub group: u32,
    pub binding: u32,
}

impl BindingKey {
    pub const fn new(group: u32, binding: u32) -> Self {
        Self { group, binding }
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@group({}) @binding({})", self.group, self.binding)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableKind {
    Resource(ResourceKind),
    /// `var<private> name: i32`
    Private,
    /// `var name: i32` (function address space)
    Plain,
}

impl VariableKind {
    pub fn is_resource(self) -> bool {
        matches!(self, VariableKind::Resource(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub kind: VariableKind,
    pub group: Option<u32>,
    pub binding: Option<u32>,
}

impl Variable {
    pub fn new(name: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            name: name.into(),
            kind,
            group: None,
            binding: None,
        }
    }

    pub fn resource(name: impl Into<String>, kind: ResourceKind) -> Self {
        Self::new(name, VariableKind::Resource(kind))
    }

    pub fn with_group(mut self, group: Option<u32>) -> Self {
        self.group = group;
        self
    }

    pub fn with_binding(mut self, binding: Option<u32>) -> Self {
        self.binding = binding;
        self
    }

    pub fn bound_at(self, key: BindingKey) -> Self {
        self.with_group(Some(key.group)).with_binding(Some(key.binding))
    }

    pub fn has_attributes(&self) -> bool {
        self.group.is_some() || self.binding.is_some()
    }

    pub fn binding_key(&self) -> Option<BindingKey> {
        Some(BindingKey::new(self.group?, self.binding?))
    }
}

/// A function declaration. Functions with a stage are entry points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub stage: Option<Stage>,
    /// Variables declared inside the body.
    pub locals: Vec<Variable>,
    /// Module-scope variables referenced directly from the body.
    pub uses: Vec<String>,
    /// Functions called from the body.
    pub calls: Vec<String>,
}

impl Function {
    pub fn helper(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stage: None,
            locals: Vec::new(),
            uses: Vec::new(),
            calls: Vec::new(),
        }
    }

    pub fn entry_point(name: impl Into<String>, stage: Stage) -> Self {
        Self {
            stage: Some(stage),
            ..Self::helper(name)
        }
    }

    pub fn is_entry_point(&self) -> bool {
        self.stage.is_some()
    }

    pub fn with_local(mut self, local: Variable) -> Self {
        self.locals.push(local);
        self
    }

    pub fn using(mut self, global: impl Into<String>) -> Self {
        self.uses.push(global.into());
        self
    }

    pub fn calling(mut self, callee: impl Into<String>) -> Self {
        self.calls.push(callee.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderProgram {
    pub globals: Vec<Variable>,
    pub functions: Vec<Function>,
}

impl ShaderProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_global(mut self, global: Variable) -> Self {
        self.globals.push(global);
        self
    }

    pub fn with_function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }

    pub fn global(&self, name: &str) -> Option<&Variable> {
        self.globals.iter().find(|g| g.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn entry_points(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter().filter(|f| f.is_entry_point())
    }

    pub fn helpers(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter().filter(|f| !f.is_entry_point())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_key_requires_both_attributes() {
        let v = Variable::resource("r", ResourceKind::Sampler);
        assert_eq!(v.binding_key(), None);
        assert!(!v.has_attributes());

        let v = v.with_group(Some(2));
        assert_eq!(v.binding_key(), None);
        assert!(v.has_attributes());

        let v = v.with_binding(Some(5));
        assert_eq!(v.binding_key(), Some(BindingKey::new(2, 5)));
    }

    #[test]
    fn binding_key_display_matches_attribute_syntax() {
        assert_eq!(BindingKey::new(0, 3).to_string(), "@group(0) @binding(3)");
    }

    #[test]
    fn entry_points_and_helpers_partition_functions() {
        let program = ShaderProgram::new()
            .with_function(Function::helper("use_a"))
            .with_function(Function::entry_point("main", Stage::Compute).calling("use_a"));

        let eps: Vec<_> = program.entry_points().map(|f| f.name.as_str()).collect();
        let helpers: Vec<_> = program.helpers().map(|f| f.name.as_str()).collect();
        assert_eq!(eps, ["main"]);
        assert_eq!(helpers, ["use_a"]);
    }
}
