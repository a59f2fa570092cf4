//! Schema rendering.
//!
//! Rendering is a capability handed to the convenience entry points rather
//! than something they own; anything implementing [`SchemaRenderer`] will do,
//! including a plain closure. [`TemplateRenderer`] is the stock implementation
//! and turns the registry into SDL text through a `minijinja` template.
use std::path::{Path, PathBuf};

use minijinja::{context, Environment, Value};
use thiserror::Error;

use crate::ir::{TypeRegistry, REVIEW_MARKER};

/// Bundled GraphQL-style SDL template.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/schema.graphql.j2");

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read template {path}: {source}")]
    TemplateIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Consumes the post-order registry and produces output text. Performs no
/// inference of its own: every field already carries its type expression.
pub trait SchemaRenderer: Send + Sync {
    fn render(&self, types: &TypeRegistry) -> Result<String, RenderError>;
}

impl<F> SchemaRenderer for F
where
    F: Fn(&TypeRegistry) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, types: &TypeRegistry) -> Result<String, RenderError> {
        self(types)
    }
}

/// Template-driven renderer.
///
/// The template sees `types` (registry order, nested types first) and
/// `marker`, and may use the `deref` filter to turn an absent field list into
/// an empty one.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    source: String,
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self { source: DEFAULT_TEMPLATE.to_string() }
    }

    /// Fails early on template syntax errors.
    pub fn from_source(source: impl Into<String>) -> Result<Self, RenderError> {
        let source = source.into();
        {
            let env = environment();
            env.template_from_str(&source)?;
        }
        Ok(Self { source })
    }

    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let source = std::fs::read_to_string(path).map_err(|source| RenderError::TemplateIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(source)
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRenderer for TemplateRenderer {
    fn render(&self, types: &TypeRegistry) -> Result<String, RenderError> {
        let env = environment();
        let tmpl = env.template_from_str(&self.source)?;
        let out = tmpl.render(context! { types => types, marker => REVIEW_MARKER })?;
        Ok(out)
    }
}

fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_filter("deref", deref);
    env
}

/// Materialize a possibly-absent sequence.
fn deref(value: Value) -> Value {
    if value.is_undefined() || value.is_none() {
        Value::from(Vec::<Value>::new())
    } else {
        value
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::infer;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render(doc: serde_json::Value) -> String {
        let out = infer(&doc, "Root").unwrap();
        TemplateRenderer::new().render(&out.registry).unwrap()
    }

    #[test]
    fn renders_nested_types_first() {
        assert_eq!(
            render(json!({"address": {"city": "X"}})),
            "type Address {\n  city: String\n}\n\ntype Root {\n  address: Address\n}\n",
        );
    }

    #[test]
    fn renders_scalars_and_markers() {
        let doc: serde_json::Value = serde_json::from_str(
            r#"{"id": 1, "price": 2.5, "name": "n", "ok": false, "note": null}"#,
        ).unwrap();
        assert_eq!(
            render(doc),
            "type Root {\n  id: Int\n  price: Float\n  name: String\n  ok: Boolean\n  note: String # needs manual check\n}\n",
        );
    }

    #[test]
    fn renders_lists() {
        assert_eq!(
            render(json!({"items": [{"id": 1}], "tags": ["a", "b"], "none": []})),
            "type Items {\n  id: Int\n}\n\ntype Root {\n  items: [Items]\n  tags: [String]\n  none: [String] # needs manual check\n}\n",
        );
    }

    #[test]
    fn renders_empty_types() {
        assert_eq!(render(json!({})), "type Root {\n}\n");
    }

    #[test]
    fn deref_tolerates_missing_fields() {
        let r = TemplateRenderer::from_source(
            "{% for f in missing | deref %}x{% endfor %}{{ types | length }}",
        ).unwrap();
        let out = infer(&json!({"a": 1}), "Root").unwrap();
        assert_eq!(r.render(&out.registry).unwrap(), "1");
    }

    #[test]
    fn bad_template_fails_early() {
        assert!(matches!(
            TemplateRenderer::from_source("{% for %}"),
            Err(RenderError::Template(_)),
        ));
    }

    #[test]
    fn closures_are_renderers() {
        let names_only = |types: &TypeRegistry| -> Result<String, RenderError> {
            Ok(types.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(","))
        };
        let out = infer(&json!({"a": {"b": {}}}), "Root").unwrap();
        assert_eq!(names_only.render(&out.registry).unwrap(), "B,A,Root");
    }
}
