//! Infer a GraphQL-style SDL schema from a single JSON document.
//!
//! ```text
//! bytes ─ decode ─▶ Value ─ inference ─▶ TypeRegistry ─ render ─▶ SDL text
//! ```
//!
//! [`inference::Inferencer`] is the core: a depth-first walk that names and
//! registers one type per JSON object, nested types first. Rendering is a
//! pluggable [`render::SchemaRenderer`]; [`inspect`] wires the pieces together
//! for byte, file and URL inputs.
pub mod decode;
pub mod error;
pub mod fetch;
pub mod inference;
pub mod inspect;
pub mod ir;
pub mod jq_exec;
pub mod naming;
pub mod output;
pub mod render;

pub use error::{Error, Result};
pub use inference::{infer, Inference, InferError, InferOptions, Inferencer};
pub use inspect::{inspect_bytes, inspect_file, inspect_url, Inspector, Preprocess};
pub use ir::{FieldDescription, Kind, TypeDefinition, TypeExpr, TypeRegistry};
pub use naming::capitalize;
pub use render::{RenderError, SchemaRenderer, TemplateRenderer};
