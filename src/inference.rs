//! Recursive type inference over a single decoded JSON document.
//!
//! Walk the root object depth-first, describe every key, and register one
//! named type per object encountered. The registry comes out in post-order:
//! a nested type is appended before the type that contains it, the root last.
//!
//! Policy:
//! - Arrays are typed from their first element only.
//! - `null` and empty arrays resolve to `Kind::Unknown` (flagged for review).
//! - Numbers are classified per occurrence; no unification across objects.
//! - Type names are not deduplicated; repeated names yield repeated entries.
//! - Fields keep document order (the decoder preserves it).
pub mod num;
mod arr;
mod obj;

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::ir::{FieldDescription, Kind, TypeRegistry};
use obj::Walk;

// ------------------------------- Policy ---------------------------------- //

/// Objects nested deeper than this fail with [`InferError::DepthExceeded`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferOptions {
    /// Deepest object level allowed; the root object is level 0.
    pub max_depth: usize,
}

impl Default for InferOptions {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

// ------------------------------- Errors ---------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferError {
    #[error("unsupported root kind `{kind}`: the document root must be a JSON object")]
    UnsupportedRootKind { kind: &'static str },

    #[error("nesting depth limit ({limit}) exceeded at `{path}`")]
    DepthExceeded { limit: usize, path: String },
}

// ------------------------------- Output ---------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inference {
    pub registry: TypeRegistry,
    /// Fields of the root object; same as the last registry entry.
    pub root_fields: Vec<FieldDescription>,
}

// ------------------------------ Discriminate ------------------------------ //

/// Kind of a single value, without looking inside composites.
pub fn kind_of(v: &Value) -> Kind {
    match v {
        Value::Null      => Kind::Unknown,
        Value::Bool(_)   => Kind::Boolean,
        Value::Number(n) => num::classify(n),
        Value::String(_) => Kind::String,
        Value::Array(_)  => Kind::Array,
        Value::Object(_) => Kind::Object,
    }
}

fn json_kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null      => "null",
        Value::Bool(_)   => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_)  => "array",
        Value::Object(_) => "object",
    }
}

// ------------------------------- Front API -------------------------------- //

/// Holds only options; every [`Inferencer::infer`] call builds its own
/// registry, so one instance can serve many documents across threads.
#[derive(Debug, Clone, Default)]
pub struct Inferencer { options: InferOptions }

impl Inferencer {
    pub fn new(options: InferOptions) -> Self { Self { options } }

    pub fn options(&self) -> &InferOptions { &self.options }

    pub fn infer(&self, root: &Value, root_name: &str) -> Result<Inference, InferError> {
        let Value::Object(map) = root else {
            return Err(InferError::UnsupportedRootKind { kind: json_kind_name(root) });
        };

        let mut walk = Walk::new(self.options.max_depth);
        walk.object(map, root_name, 0)?;

        let registry = walk.registry;
        let root_fields = registry.root().map(|t| t.fields.clone()).unwrap_or_default();
        info!(root = root_name, types = registry.len(), "inference complete");
        Ok(Inference { registry, root_fields })
    }
}

/// Infer with default options.
pub fn infer(root: &Value, root_name: &str) -> Result<Inference, InferError> {
    Inferencer::default().infer(root, root_name)
}

// ------------------------------- Tests ------------------------------------ //
