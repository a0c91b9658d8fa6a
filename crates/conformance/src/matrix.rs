//! The `group_and_binding` test matrix.
//!
//! Every scenario enumerates its full parameter domain up front; nothing is filtered and nothing is
//! registered globally. A [`TestCase`] knows how to build its [`ShaderProgram`], and the expected
//! verdict is computed from that program by the oracle.

use std::fmt;

use serde::{Deserialize, Serialize};
use wgsl_binding_model::{
    evaluate, BindingKey, Function, ResourceKind, ShaderProgram, Stage, Variable, VariableKind,
    Verdict,
};

use crate::synth::{attach_entry_point, Usage};

/// Index values for group/binding: enough for equal and unequal pairs.
pub const INDEX_VALUES: [u32; 2] = [0, 3];

const RESOURCE_A: &str = "resource_a";
const RESOURCE_B: &str = "resource_b";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    BindingAttributes,
    PrivateModuleScope,
    PrivateFunctionScope,
    FunctionScope,
    FunctionScopeTexture,
    SingleEntryPoint,
    DifferentEntryPoints,
}

impl Scenario {
    pub const ALL: [Scenario; 7] = [
        Scenario::BindingAttributes,
        Scenario::PrivateModuleScope,
        Scenario::PrivateFunctionScope,
        Scenario::FunctionScope,
        Scenario::FunctionScopeTexture,
        Scenario::SingleEntryPoint,
        Scenario::DifferentEntryPoints,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::BindingAttributes => "binding_attributes",
            Scenario::PrivateModuleScope => "private_module_scope",
            Scenario::PrivateFunctionScope => "private_function_scope",
            Scenario::FunctionScope => "function_scope",
            Scenario::FunctionScopeTexture => "function_scope_texture",
            Scenario::SingleEntryPoint => "single_entry_point",
            Scenario::DifferentEntryPoints => "different_entry_points",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Scenario::BindingAttributes => {
                "@group and @binding must both be present on a resource variable"
            }
            Scenario::PrivateModuleScope => "@group/@binding on a module-scope private variable",
            Scenario::PrivateFunctionScope => "@group/@binding on a function-scope private variable",
            Scenario::FunctionScope => "@group/@binding on a function-scope variable",
            Scenario::FunctionScopeTexture => "@group/@binding on a function-scope texture",
            Scenario::SingleEntryPoint => {
                "two resources used by one entry point must not share (group, binding)"
            }
            Scenario::DifferentEntryPoints => {
                "resources used exclusively by different entry points may share (group, binding)"
            }
        }
    }

    pub fn cases(self) -> Vec<TestCase> {
        let params: Vec<CaseParams> = match self {
            Scenario::BindingAttributes => {
                let mut out = Vec::new();
                for stage in Stage::ALL {
                    for has_group in [true, false] {
                        for has_binding in [true, false] {
                            for resource in ResourceKind::ALL {
                                out.push(CaseParams::BindingAttributes(BindingAttributesParams {
                                    stage,
                                    has_group,
                                    has_binding,
                                    resource,
                                }));
                            }
                        }
                    }
                }
                out
            }
            Scenario::PrivateModuleScope => vec![CaseParams::PrivateModuleScope],
            Scenario::PrivateFunctionScope => vec![CaseParams::PrivateFunctionScope],
            Scenario::FunctionScope => vec![CaseParams::FunctionScope],
            Scenario::FunctionScopeTexture => vec![CaseParams::FunctionScopeTexture],
            Scenario::SingleEntryPoint => {
                let mut out = Vec::new();
                for stage in Stage::ALL {
                    for a_kind in ResourceKind::CLASS_A {
                        for b_kind in ResourceKind::CLASS_B {
                            for a_group in INDEX_VALUES {
                                for b_group in INDEX_VALUES {
                                    for a_binding in INDEX_VALUES {
                                        for b_binding in INDEX_VALUES {
                                            for usage in Usage::ALL {
                                                out.push(CaseParams::SingleEntryPoint(
                                                    SingleEntryPointParams {
                                                        stage,
                                                        a_kind,
                                                        b_kind,
                                                        a_group,
                                                        b_group,
                                                        a_binding,
                                                        b_binding,
                                                        usage,
                                                    },
                                                ));
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
                out
            }
            Scenario::DifferentEntryPoints => {
                let mut out = Vec::new();
                for a_stage in Stage::ALL {
                    for b_stage in Stage::ALL {
                        for a_kind in ResourceKind::CLASS_A {
                            for b_kind in ResourceKind::CLASS_B {
                                for usage in Usage::ALL {
                                    out.push(CaseParams::DifferentEntryPoints(
                                        DifferentEntryPointsParams {
                                            a_stage,
                                            b_stage,
                                            a_kind,
                                            b_kind,
                                            usage,
                                        },
                                    ));
                                }
                            }
                        }
                    }
                }
                out
            }
        };
        params.into_iter().map(TestCase::new).collect()
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BindingAttributesParams {
    pub stage: Stage,
    pub has_group: bool,
    pub has_binding: bool,
    pub resource: ResourceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SingleEntryPointParams {
    pub stage: Stage,
    pub a_kind: ResourceKind,
    pub b_kind: ResourceKind,
    pub a_group: u32,
    pub b_group: u32,
    pub a_binding: u32,
    pub b_binding: u32,
    pub usage: Usage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DifferentEntryPointsParams {
    pub a_stage: Stage,
    pub b_stage: Stage,
    pub a_kind: ResourceKind,
    pub b_kind: ResourceKind,
    pub usage: Usage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum CaseParams {
    BindingAttributes(BindingAttributesParams),
    PrivateModuleScope,
    PrivateFunctionScope,
    FunctionScope,
    FunctionScopeTexture,
    SingleEntryPoint(SingleEntryPointParams),
    DifferentEntryPoints(DifferentEntryPointsParams),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestCase {
    pub params: CaseParams,
}

impl TestCase {
    pub fn new(params: CaseParams) -> Self {
        Self { params }
    }

    pub fn scenario(&self) -> Scenario {
        match self.params {
            CaseParams::BindingAttributes(_) => Scenario::BindingAttributes,
            CaseParams::PrivateModuleScope => Scenario::PrivateModuleScope,
            CaseParams::PrivateFunctionScope => Scenario::PrivateFunctionScope,
            CaseParams::FunctionScope => Scenario::FunctionScope,
            CaseParams::FunctionScopeTexture => Scenario::FunctionScopeTexture,
            CaseParams::SingleEntryPoint(_) => Scenario::SingleEntryPoint,
            CaseParams::DifferentEntryPoints(_) => Scenario::DifferentEntryPoints,
        }
    }

    fn param_pairs(&self) -> Vec<(&'static str, String)> {
        fn quoted(value: impl fmt::Display) -> String {
            format!("\"{value}\"")
        }

        match self.params {
            CaseParams::BindingAttributes(p) => vec![
                ("stage", quoted(p.stage)),
                ("has_group", p.has_group.to_string()),
                ("has_binding", p.has_binding.to_string()),
                ("resource", quoted(p.resource)),
            ],
            CaseParams::SingleEntryPoint(p) => vec![
                ("stage", quoted(p.stage)),
                ("a_kind", quoted(p.a_kind)),
                ("b_kind", quoted(p.b_kind)),
                ("a_group", p.a_group.to_string()),
                ("b_group", p.b_group.to_string()),
                ("a_binding", p.a_binding.to_string()),
                ("b_binding", p.b_binding.to_string()),
                ("usage", quoted(p.usage)),
            ],
            CaseParams::DifferentEntryPoints(p) => vec![
                ("a_stage", quoted(p.a_stage)),
                ("b_stage", quoted(p.b_stage)),
                ("a_kind", quoted(p.a_kind)),
                ("b_kind", quoted(p.b_kind)),
                ("usage", quoted(p.usage)),
            ],
            CaseParams::PrivateModuleScope
            | CaseParams::PrivateFunctionScope
            | CaseParams::FunctionScope
            | CaseParams::FunctionScopeTexture => Vec::new(),
        }
    }

    /// `scenario:key=value;key=value`, unique within the matrix.
    pub fn name(&self) -> String {
        let params = self
            .param_pairs()
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(";");
        format!("{}:{params}", self.scenario().name())
    }

    pub fn program(&self) -> ShaderProgram {
        let attributed = |name: &str, kind: VariableKind| {
            Variable::new(name, kind).bound_at(BindingKey::new(1, 1))
        };

        match self.params {
            CaseParams::BindingAttributes(p) => attach_entry_point(
                ShaderProgram::new().with_global(
                    Variable::resource("R", p.resource)
                        .with_group(p.has_group.then_some(0))
                        .with_binding(p.has_binding.then_some(0)),
                ),
                Function::entry_point("main", p.stage),
                &["R"],
                Usage::Direct,
            ),
            CaseParams::PrivateModuleScope => ShaderProgram::new()
                .with_global(attributed("a", VariableKind::Private))
                .with_function(Function::entry_point("main", Stage::Compute).using("a")),
            CaseParams::PrivateFunctionScope => ShaderProgram::new().with_function(
                Function::entry_point("main", Stage::Compute)
                    .with_local(attributed("a", VariableKind::Private)),
            ),
            CaseParams::FunctionScope => ShaderProgram::new().with_function(
                Function::entry_point("main", Stage::Compute)
                    .with_local(attributed("a", VariableKind::Plain)),
            ),
            CaseParams::FunctionScopeTexture => ShaderProgram::new().with_function(
                Function::entry_point("main", Stage::Compute).with_local(attributed(
                    "a",
                    VariableKind::Resource(ResourceKind::Texture2d),
                )),
            ),
            CaseParams::SingleEntryPoint(p) => attach_entry_point(
                resource_pair(
                    p.a_kind,
                    BindingKey::new(p.a_group, p.a_binding),
                    p.b_kind,
                    BindingKey::new(p.b_group, p.b_binding),
                ),
                Function::entry_point("main", p.stage),
                &[RESOURCE_A, RESOURCE_B],
                p.usage,
            ),
            CaseParams::DifferentEntryPoints(p) => {
                let shared = BindingKey::new(0, 0);
                let program = attach_entry_point(
                    resource_pair(p.a_kind, shared, p.b_kind, shared),
                    Function::entry_point("main_a", p.a_stage),
                    &[RESOURCE_A],
                    p.usage,
                );
                attach_entry_point(
                    program,
                    Function::entry_point("main_b", p.b_stage),
                    &[RESOURCE_B],
                    p.usage,
                )
            }
        }
    }

    pub fn expected(&self) -> Verdict {
        evaluate(&self.program())
    }
}

fn resource_pair(
    a_kind: ResourceKind,
    a_key: BindingKey,
    b_kind: ResourceKind,
    b_key: BindingKey,
) -> ShaderProgram {
    ShaderProgram::new()
        .with_global(Variable::resource(RESOURCE_A, a_kind).bound_at(a_key))
        .with_global(Variable::resource(RESOURCE_B, b_kind).bound_at(b_key))
}

/// Every case of every scenario, in declaration order.
#[derive(Debug, Clone)]
pub struct Matrix {
    cases: Vec<TestCase>,
}

impl Matrix {
    pub fn all() -> Self {
        Self::for_scenarios(&Scenario::ALL)
    }

    pub fn for_scenarios(scenarios: &[Scenario]) -> Self {
        Self {
            cases: scenarios.iter().flat_map(|s| s.cases()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn find(&self, name: &str) -> Option<&TestCase> {
        self.cases.iter().find(|case| case.name() == name)
    }

    pub fn into_cases(self) -> Vec<TestCase> {
        self.cases
    }
}
