//! The compiler under test.
//!
//! The suite only needs an accept/reject answer for a piece of WGSL source; diagnostics are carried
//! along for failure reports but never interpreted.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CompileOutcome {
    Accepted,
    Rejected { diagnostic: String },
}

impl CompileOutcome {
    pub fn accepted(&self) -> bool {
        matches!(self, CompileOutcome::Accepted)
    }

    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            CompileOutcome::Accepted => None,
            CompileOutcome::Rejected { diagnostic } => Some(diagnostic.as_str()),
        }
    }
}

impl fmt::Display for CompileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.accepted() { "accept" } else { "reject" })
    }
}

/// A deterministic WGSL front-end: the same source always yields the same outcome.
pub trait ShaderCompiler: Sync {
    fn name(&self) -> &str;

    fn compile(&self, source: &str) -> CompileOutcome;
}

/// naga's WGSL parser followed by full module validation.
#[derive(Debug, Clone, Copy)]
pub struct NagaCompiler {
    capabilities: naga::valid::Capabilities,
}

impl NagaCompiler {
    pub fn new(capabilities: naga::valid::Capabilities) -> Self {
        Self { capabilities }
    }
}

impl Default for NagaCompiler {
    fn default() -> Self {
        Self::new(naga::valid::Capabilities::all())
    }
}

impl ShaderCompiler for NagaCompiler {
    fn name(&self) -> &str {
        "naga"
    }

    fn compile(&self, source: &str) -> CompileOutcome {
        let module = match naga::front::wgsl::parse_str(source) {
            Ok(module) => module,
            Err(err) => {
                return CompileOutcome::Rejected {
                    diagnostic: err.emit_to_string(source),
                }
            }
        };

        let mut validator =
            naga::valid::Validator::new(naga::valid::ValidationFlags::all(), self.capabilities);
        match validator.validate(&module) {
            Ok(_) => CompileOutcome::Accepted,
            Err(err) => CompileOutcome::Rejected {
                diagnostic: err.emit_to_string(source),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_minimal_compute_shader() {
        let source = "@compute @workgroup_size(1)\nfn main() {\n}\n";
        assert_eq!(NagaCompiler::default().compile(source), CompileOutcome::Accepted);
    }

    #[test]
    fn parse_errors_are_rejections_with_diagnostics() {
        let outcome = NagaCompiler::default().compile("fn main( {");
        assert!(!outcome.accepted());
        assert!(!outcome.diagnostic().unwrap_or_default().is_empty());
    }

    #[test]
    fn validation_errors_are_rejections() {
        // Resource without @group/@binding parses but fails validation.
        let source = "var t : texture_2d<f32>;\n";
        let outcome = NagaCompiler::default().compile(source);
        assert!(!outcome.accepted(), "{outcome:?}");
    }

    #[test]
    fn compiling_twice_is_deterministic() {
        let compiler = NagaCompiler::default();
        let source = "@group(0) @binding(0) var s : sampler;\n";
        assert_eq!(compiler.compile(source), compiler.compile(source));
        assert!(compiler.compile(source).accepted());
    }
}
