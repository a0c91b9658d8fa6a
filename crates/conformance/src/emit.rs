//! WGSL text emitters for declarations and functions.

use std::fmt::Write as _;

use wgsl_binding_model::{ResourceKind, Stage, Variable, VariableKind};

/// Attribute prefix for a declaration; absent attributes are omitted entirely.
fn attributes(group: Option<u32>, binding: Option<u32>) -> String {
    let mut out = String::new();
    if let Some(group) = group {
        let _ = write!(out, "@group({group}) ");
    }
    if let Some(binding) = binding {
        let _ = write!(out, "@binding({binding}) ");
    }
    out
}

/// Address space (if any) and store type for a resource kind.
fn resource_type(kind: ResourceKind) -> (Option<&'static str>, &'static str) {
    match kind {
        ResourceKind::Uniform => (Some("uniform"), "array<vec4<f32>, 16>"),
        ResourceKind::Storage => (Some("storage"), "array<vec4<f32>, 16>"),
        ResourceKind::Texture2d => (None, "texture_2d<f32>"),
        ResourceKind::Texture2dArray => (None, "texture_2d_array<f32>"),
        ResourceKind::Texture3d => (None, "texture_3d<f32>"),
        ResourceKind::TextureCube => (None, "texture_cube<f32>"),
        ResourceKind::TextureMultisampled2d => (None, "texture_multisampled_2d<f32>"),
        ResourceKind::TextureDepth2d => (None, "texture_depth_2d"),
        ResourceKind::TextureDepthCube => (None, "texture_depth_cube"),
        ResourceKind::Sampler => (None, "sampler"),
        ResourceKind::SamplerComparison => (None, "sampler_comparison"),
    }
}

pub fn declare_resource(
    kind: ResourceKind,
    name: &str,
    group: Option<u32>,
    binding: Option<u32>,
) -> String {
    let attrs = attributes(group, binding);
    match resource_type(kind) {
        (Some(space), ty) => format!("{attrs}var<{space}> {name} : {ty};"),
        (None, ty) => format!("{attrs}var {name} : {ty};"),
    }
}

pub fn declare_variable(variable: &Variable) -> String {
    let Variable {
        name,
        kind,
        group,
        binding,
    } = variable;
    match kind {
        VariableKind::Resource(kind) => declare_resource(*kind, name, *group, *binding),
        VariableKind::Private => format!("{}var<private> {name} : i32;", attributes(*group, *binding)),
        VariableKind::Plain => format!("{}var {name} : i32;", attributes(*group, *binding)),
    }
}

/// Group holding the textures samplers are exercised against. Kept clear of every index the
/// matrix generates so the extra bindings never collide with the resources under test.
pub const COMPANION_GROUP: u32 = 7;

/// Texture declared alongside sampler `name`, bound at `@group(COMPANION_GROUP) @binding(slot)`.
/// `None` for anything that is not a sampler.
pub fn declare_companion_texture(kind: ResourceKind, name: &str, slot: u32) -> Option<String> {
    let kind = match kind {
        ResourceKind::Sampler => ResourceKind::Texture2d,
        ResourceKind::SamplerComparison => ResourceKind::TextureDepth2d,
        _ => return None,
    };
    Some(declare_resource(
        kind,
        &companion_texture_name(name),
        Some(COMPANION_GROUP),
        Some(slot),
    ))
}

pub fn companion_texture_name(sampler: &str) -> String {
    format!("{sampler}_texture")
}

/// A statement that makes the enclosing function use global `name`.
///
/// A phony assignment of a buffer loads it, but a bare texture or sampler handle does not count as
/// a use, so handles go through a query or a sample instead.
pub fn use_global(kind: Option<ResourceKind>, name: &str) -> String {
    match kind {
        Some(
            ResourceKind::Texture2d
            | ResourceKind::Texture2dArray
            | ResourceKind::Texture3d
            | ResourceKind::TextureCube
            | ResourceKind::TextureMultisampled2d
            | ResourceKind::TextureDepth2d
            | ResourceKind::TextureDepthCube,
        ) => format!("_ = textureDimensions({name});"),
        Some(ResourceKind::Sampler) => format!(
            "_ = textureSampleLevel({}, {name}, vec2<f32>(), 0.0);",
            companion_texture_name(name)
        ),
        Some(ResourceKind::SamplerComparison) => format!(
            "_ = textureSampleCompareLevel({}, {name}, vec2<f32>(), 0.0);",
            companion_texture_name(name)
        ),
        Some(ResourceKind::Uniform | ResourceKind::Storage) | None => format!("_ = {name};"),
    }
}

fn indent(body: &str) -> String {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("  {line}\n"))
        .collect()
}

pub fn declare_entry_point(name: &str, stage: Stage, body: &str) -> String {
    let body = indent(body);
    match stage {
        Stage::Vertex => format!(
            "@vertex\nfn {name}() -> @builtin(position) vec4<f32> {{\n{body}  return vec4<f32>();\n}}\n"
        ),
        Stage::Fragment => format!("@fragment\nfn {name}() {{\n{body}}}\n"),
        Stage::Compute => format!("@compute @workgroup_size(1)\nfn {name}() {{\n{body}}}\n"),
    }
}

pub fn declare_function(name: &str, body: &str) -> String {
    format!("fn {name}() {{\n{}}}\n", indent(body))
}
