//! End-to-end entry points: decode → (preprocess) → infer → render → write.
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::decode;
use crate::error::{Error, Result};
use crate::fetch::{self, FetchConfig};
use crate::inference::{Inference, InferOptions, Inferencer};
use crate::naming::{root_type_name, ROOT_SUFFIX};
use crate::output::write_atomic;
use crate::render::{SchemaRenderer, TemplateRenderer};

/// Root name used when the input has no path to derive one from.
pub fn default_root_name() -> String {
    format!("Root{ROOT_SUFFIX}")
}

/// Optional narrowing of a decoded document before inference.
#[derive(Debug, Clone, Default)]
pub struct Preprocess {
    /// JSON pointer selecting the subdocument to infer (e.g. `/data/items/0`).
    pub json_pointer: Option<String>,
    /// jq filter; must yield exactly one value.
    pub jq_expr: Option<String>,
}

impl Preprocess {
    pub fn is_noop(&self) -> bool {
        self.json_pointer.is_none() && self.jq_expr.is_none()
    }

    pub fn apply(&self, value: Value) -> Result<Value> {
        let value = match &self.json_pointer {
            None => value,
            Some(pointer) => value
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| Error::PointerNotFound { pointer: pointer.clone() })?,
        };
        match &self.jq_expr {
            None => Ok(value),
            Some(expr) => crate::jq_exec::run_jaq_single(expr, &value).map_err(Error::Jq),
        }
    }
}

/// Drives one document at a time through inference and an injected renderer.
/// Holds no per-document state, so it can be shared across worker threads.
pub struct Inspector<R> {
    inferencer: Inferencer,
    renderer: R,
    preprocess: Preprocess,
    root_name: Option<String>,
    fetch: FetchConfig,
}

impl Inspector<TemplateRenderer> {
    /// Stock SDL template, default options.
    pub fn sdl() -> Self {
        Self::new(TemplateRenderer::new())
    }
}

impl<R: SchemaRenderer> Inspector<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            inferencer: Inferencer::default(),
            renderer,
            preprocess: Preprocess::default(),
            root_name: None,
            fetch: FetchConfig::default(),
        }
    }

    pub fn with_options(mut self, options: InferOptions) -> Self {
        self.inferencer = Inferencer::new(options);
        self
    }

    pub fn with_preprocess(mut self, preprocess: Preprocess) -> Self {
        self.preprocess = preprocess;
        self
    }

    /// Overrides every derived root name.
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = Some(name.into());
        self
    }

    pub fn with_fetch_config(mut self, config: FetchConfig) -> Self {
        self.fetch = config;
        self
    }

    fn root_name_or(&self, derived: impl FnOnce() -> String) -> String {
        self.root_name.clone().unwrap_or_else(derived)
    }

    /// Infer from an already decoded document.
    pub fn infer_value(&self, value: Value, root_name: &str) -> Result<Inference> {
        let value = if self.preprocess.is_noop() { value } else { self.preprocess.apply(value)? };
        let inference = self.inferencer.infer(&value, root_name)?;
        let flagged = inference.registry.iter()
            .flat_map(|t| t.fields.iter())
            .filter(|f| f.needs_review())
            .count();
        if flagged > 0 {
            warn!(root = root_name, fields = flagged, "some fields need manual review");
        }
        Ok(inference)
    }

    pub fn infer_bytes(&self, input: &[u8], root_name: &str) -> Result<Inference> {
        let value = decode::from_slice_with_path(input)?;
        self.infer_value(value, root_name)
    }

    pub fn render_value(&self, value: Value, root_name: &str) -> Result<String> {
        let inference = self.infer_value(value, root_name)?;
        Ok(self.renderer.render(&inference.registry)?)
    }

    /// Bytes in, rendered bytes out. Root name defaults to `RootResult`.
    pub fn inspect_bytes(&self, input: &[u8]) -> Result<Vec<u8>> {
        let root_name = self.root_name_or(default_root_name);
        let value = decode::from_slice_with_path(input)?;
        Ok(self.render_value(value, &root_name)?.into_bytes())
    }

    fn read_file(&self, input: &Path) -> Result<(Value, String)> {
        let root_name = self.root_name_or(|| root_type_name(input));
        let bytes = std::fs::read(input).map_err(|e| Error::io(input, e))?;
        Ok((decode::from_slice_with_path(&bytes)?, root_name))
    }

    /// Root type named after the input's file stem.
    pub fn infer_file(&self, input: &Path) -> Result<Inference> {
        let (value, root_name) = self.read_file(input)?;
        self.infer_value(value, &root_name)
    }

    pub fn render_file(&self, input: &Path) -> Result<String> {
        let (value, root_name) = self.read_file(input)?;
        self.render_value(value, &root_name)
    }

    /// Read `input`, write the schema to `output`. The root type is named
    /// after the input's file stem. `output` is only replaced on success.
    pub fn inspect_file(&self, input: &Path, output: &Path) -> Result<()> {
        let rendered = self.render_file(input)?;
        write_atomic(output, rendered.as_bytes()).map_err(|e| Error::io(output, e))?;
        info!(input = %input.display(), output = %output.display(), "schema written");
        Ok(())
    }

    pub fn fetch_bytes(&self, url: &str, token: Option<&str>) -> Result<Vec<u8>> {
        Ok(fetch::fetch(url, token, &self.fetch)?)
    }

    /// GET `url` (optionally with a bearer token) and write the schema to
    /// `output`. The root type is named after the output's file stem.
    pub fn inspect_url(&self, url: &str, token: Option<&str>, output: &Path) -> Result<()> {
        let root_name = self.root_name_or(|| root_type_name(output));
        let bytes = self.fetch_bytes(url, token)?;
        let value = decode::from_slice_with_path(&bytes)?;
        let rendered = self.render_value(value, &root_name)?;
        write_atomic(output, rendered.as_bytes()).map_err(|e| Error::io(output, e))?;
        info!(url, output = %output.display(), root = %root_name, "schema written");
        Ok(())
    }
}

/// [`Inspector::inspect_bytes`] with the stock SDL template.
pub fn inspect_bytes(input: &[u8]) -> Result<Vec<u8>> {
    Inspector::sdl().inspect_bytes(input)
}

/// [`Inspector::inspect_file`] with the stock SDL template.
pub fn inspect_file(input: &Path, output: &Path) -> Result<()> {
    Inspector::sdl().inspect_file(input, output)
}

/// [`Inspector::inspect_url`] with the stock SDL template.
pub fn inspect_url(url: &str, token: Option<&str>, output: &Path) -> Result<()> {
    Inspector::sdl().inspect_url(url, token, output)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::InferError;
    use crate::ir::TypeRegistry;
    use crate::fetch::test_server::serve_once;
    use crate::render::RenderError;
    use pretty_assertions::assert_eq;

    fn names_only(types: &TypeRegistry) -> std::result::Result<String, RenderError> {
        Ok(types.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(" "))
    }

    #[test]
    fn bytes_default_to_root_result() {
        let out = inspect_bytes(br#"{"a": {"b": 1}}"#).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "type A {\n  b: Int\n}\n\ntype RootResult {\n  a: A\n}\n",
        );
    }

    #[test]
    fn renderer_is_injected() {
        let inspector = Inspector::new(names_only).with_root_name("Doc");
        let out = inspector.inspect_bytes(br#"{"x": {"y": {}}}"#).unwrap();
        assert_eq!(out, b"Y X Doc");
    }

    #[test]
    fn decode_errors_propagate() {
        assert!(matches!(inspect_bytes(b"{\"a\": }"), Err(Error::Decode(_))));
    }

    #[test]
    fn unsupported_root_propagates() {
        let err = inspect_bytes(b"[1, 2]").unwrap_err();
        assert!(matches!(err, Error::Infer(InferError::UnsupportedRootKind { kind: "array" })));
    }

    #[test]
    fn render_errors_propagate() {
        let failing = |_: &TypeRegistry| -> std::result::Result<String, RenderError> {
            Err(minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, "boom").into())
        };
        let err = Inspector::new(failing).inspect_bytes(b"{}").unwrap_err();
        assert!(matches!(err, Error::Render(RenderError::Template(_))));
    }

    #[test]
    fn json_pointer_selects_subdocument() {
        let inspector = Inspector::new(names_only).with_preprocess(Preprocess {
            json_pointer: Some("/data/0".into()),
            jq_expr: None,
        });
        let out = inspector.inspect_bytes(br#"{"data": [{"user": {"id": 1}}]}"#).unwrap();
        assert_eq!(out, b"User RootResult");

        let missing = Inspector::new(names_only).with_preprocess(Preprocess {
            json_pointer: Some("/nope".into()),
            jq_expr: None,
        });
        assert!(matches!(
            missing.inspect_bytes(b"{}"),
            Err(Error::PointerNotFound { .. }),
        ));
    }

    #[test]
    fn jq_filter_selects_subdocument() {
        let inspector = Inspector::new(names_only).with_preprocess(Preprocess {
            json_pointer: None,
            jq_expr: Some(".payload".into()),
        });
        let out = inspector.inspect_bytes(br#"{"payload": {"meta": {}}}"#).unwrap();
        assert_eq!(out, b"Meta RootResult");
    }

    #[test]
    fn url_schema_is_named_after_output_stem() {
        let (url, server) = serve_once("users.json", "HTTP/1.1 200 OK", r#"{"id": 1, "profile": {"name": "a"}}"#);
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out/users.graphql");
        inspect_url(&url, Some("t0ken"), &out).unwrap();
        let request = server.join().unwrap().to_ascii_lowercase();
        assert!(request.starts_with("get /users.json "), "{request}");
        assert!(request.contains("authorization: bearer t0ken"), "{request}");
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "type Profile {\n  name: String\n}\n\ntype UsersResult {\n  id: Int\n  profile: Profile\n}\n",
        );
    }

    #[test]
    fn failed_url_fetch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("users.graphql");

        let (url, server) = serve_once("users.json", "HTTP/1.1 404 Not Found", "{}");
        let err = inspect_url(&url, None, &out).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, Error::Fetch(crate::fetch::FetchError::Status { status: 404, .. })));
        assert!(!out.exists());

        let (url, server) = serve_once("users.json", "HTTP/1.1 200 OK", r#"{"id": "#);
        let err = inspect_url(&url, None, &out).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, Error::Decode(_)));
        assert!(!out.exists());
    }

    #[test]
    fn depth_limit_is_configurable() {
        let inspector = Inspector::new(names_only).with_options(InferOptions { max_depth: 1 });
        let err = inspector.inspect_bytes(br#"{"a": {"b": {}}}"#).unwrap_err();
        assert!(matches!(err, Error::Infer(InferError::DepthExceeded { limit: 1, .. })));
    }
}
