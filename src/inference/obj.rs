use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{kind_of, InferError};
use crate::ir::{FieldDescription, TypeDefinition, TypeRegistry};
use crate::naming::capitalize;

/// State of one depth-first pass. Owned by a single `infer` call.
pub(super) struct Walk {
    limit: usize,
    pub(super) path: Vec<String>,
    seen: HashSet<String>,
    pub(super) registry: TypeRegistry,
}

impl Walk {
    pub(super) fn new(limit: usize) -> Self {
        Self { limit, path: Vec::new(), seen: HashSet::new(), registry: TypeRegistry::new() }
    }

    /// Describe every key of `map`, then append `type_name` to the registry.
    /// Nested types are appended first (post-order).
    pub(super) fn object(
        &mut self,
        map: &Map<String, Value>,
        type_name: &str,
        depth: usize,
    ) -> Result<(), InferError> {
        if depth > self.limit {
            return Err(InferError::DepthExceeded { limit: self.limit, path: self.pointer() });
        }

        let mut fields = Vec::with_capacity(map.len());
        for (key, value) in map {
            self.path.push(key.clone());
            let field = match value {
                Value::Object(inner) => {
                    let nested = capitalize(key);
                    self.object(inner, &nested, depth + 1)?;
                    FieldDescription::object(key.as_str(), nested)
                }
                Value::Array(items) => self.array(key, items, depth)?,
                scalar => FieldDescription::scalar(key.as_str(), kind_of(scalar)),
            };
            self.path.pop();
            fields.push(field);
        }

        if !self.seen.insert(type_name.to_string()) {
            warn!(type_name, path = %self.pointer(), "type name already registered; appending a second definition");
        }
        debug!(type_name, fields = fields.len(), "type inferred");
        self.registry.push(TypeDefinition { name: type_name.to_string(), fields });
        Ok(())
    }

    /// JSON pointer to the value currently being visited.
    pub(super) fn pointer(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            out.push('/');
            out.push_str(&segment.replace('~', "~0").replace('/', "~1"));
        }
        out
    }
}
