//! Data model and expected-verdict oracle for WGSL `@group`/`@binding` validation.
//!
//! A [`ShaderProgram`] describes module-scope variables, functions and the call edges between them.
//! [`evaluate`] predicts whether a conforming compiler must accept the program; it depends on
//! nothing but the model, so it can be checked independently of any compiler.

pub mod call_graph;
pub mod kinds;
pub mod oracle;
pub mod program;

pub use call_graph::CallGraph;
pub use kinds::{ResourceKind, Stage, UnknownName};
pub use oracle::{evaluate, Rejection, Verdict};
pub use program::{BindingKey, Function, ShaderProgram, Variable, VariableKind};
