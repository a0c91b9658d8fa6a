use binding_conformance::{
    check_case, run, synthesize, CaseParams, ConformanceConfig, DifferentEntryPointsParams,
    Matrix, NagaCompiler, Scenario, ShaderCompiler, SingleEntryPointParams, TestCase, Usage,
};
use wgsl_binding_model::{ResourceKind, Stage};

fn assert_scenario_agrees(scenario: Scenario) {
    let compiler = NagaCompiler::default();
    let failures: Vec<String> = scenario
        .cases()
        .iter()
        .map(|case| check_case(case, &compiler))
        .filter(|result| !result.passed())
        .map(|result| binding_conformance::format_failure(&result))
        .collect();
    assert!(
        failures.is_empty(),
        "{} mismatches in {scenario}:\n{}",
        failures.len(),
        failures.join("\n")
    );
}

#[test]
fn binding_attributes() {
    assert_scenario_agrees(Scenario::BindingAttributes);
}

#[test]
fn private_module_scope() {
    assert_scenario_agrees(Scenario::PrivateModuleScope);
}

#[test]
fn private_function_scope() {
    assert_scenario_agrees(Scenario::PrivateFunctionScope);
}

#[test]
fn function_scope() {
    assert_scenario_agrees(Scenario::FunctionScope);
}

#[test]
fn function_scope_texture() {
    assert_scenario_agrees(Scenario::FunctionScopeTexture);
}

#[test]
fn single_entry_point() {
    assert_scenario_agrees(Scenario::SingleEntryPoint);
}

#[test]
fn different_entry_points() {
    assert_scenario_agrees(Scenario::DifferentEntryPoints);
}

#[test]
fn full_matrix_passes_against_naga() {
    let report = run(&ConformanceConfig::default(), &NagaCompiler::default())
        .unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(report.total_cases, Matrix::all().len());
    assert!(report.passed());
}

#[test]
fn uniform_and_storage_sharing_a_slot_in_one_compute_entry_point_is_rejected() {
    let case = TestCase::new(CaseParams::SingleEntryPoint(SingleEntryPointParams {
        stage: Stage::Compute,
        a_kind: ResourceKind::Uniform,
        b_kind: ResourceKind::Storage,
        a_group: 0,
        b_group: 0,
        a_binding: 0,
        b_binding: 0,
        usage: Usage::Direct,
    }));
    assert!(!case.expected().accepts());

    let source = synthesize(&case.program());
    assert!(source.contains("@group(0) @binding(0) var<uniform> resource_a"), "{source}");
    assert!(source.contains("@group(0) @binding(0) var<storage> resource_b"), "{source}");
    assert!(!NagaCompiler::default().compile(&source).accepted(), "{source}");
}

fn single_entry_point_case(
    stage: Stage,
    a_kind: ResourceKind,
    b_kind: ResourceKind,
    slot: u32,
    usage: Usage,
) -> TestCase {
    TestCase::new(CaseParams::SingleEntryPoint(SingleEntryPointParams {
        stage,
        a_kind,
        b_kind,
        a_group: slot,
        b_group: slot,
        a_binding: slot,
        b_binding: slot,
        usage,
    }))
}

#[test]
fn buffer_and_texture_sharing_a_slot_is_rejected() {
    let case = single_entry_point_case(
        Stage::Compute,
        ResourceKind::Uniform,
        ResourceKind::Texture3d,
        3,
        Usage::Direct,
    );
    assert!(!case.expected().accepts());

    let source = synthesize(&case.program());
    assert!(source.contains("_ = textureDimensions(resource_b);"), "{source}");
    assert!(!NagaCompiler::default().compile(&source).accepted(), "{source}");
}

#[test]
fn every_class_b_handle_collides_through_helpers() {
    let compiler = NagaCompiler::default();
    for stage in Stage::ALL {
        for b_kind in ResourceKind::CLASS_B {
            let case =
                single_entry_point_case(stage, ResourceKind::Storage, b_kind, 0, Usage::Transitive);
            let source = synthesize(&case.program());
            assert!(
                !compiler.compile(&source).accepted(),
                "{} accepted:\n{source}",
                case.name()
            );
        }
    }
}

#[test]
fn same_slot_split_across_entry_points_is_accepted() {
    let case = TestCase::new(CaseParams::DifferentEntryPoints(DifferentEntryPointsParams {
        a_stage: Stage::Vertex,
        b_stage: Stage::Fragment,
        a_kind: ResourceKind::Uniform,
        b_kind: ResourceKind::Storage,
        usage: Usage::Transitive,
    }));
    assert!(case.expected().accepts());

    let source = synthesize(&case.program());
    assert!(source.contains("fn main_a()"), "{source}");
    assert!(source.contains("fn main_b()"), "{source}");
    let outcome = NagaCompiler::default().compile(&source);
    assert!(outcome.accepted(), "{:?}\n{source}", outcome.diagnostic());
}
