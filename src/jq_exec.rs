//! jq pre-filtering of decoded documents (via jaq).
use anyhow::{anyhow, Result};
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

/// Run `filter_src` against `input` and collect every output as JSON.
pub fn run_jaq(filter_src: &str, input: &Value) -> Result<Vec<Value>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader
        .load(&arena, program)
        .map_err(format_parse_errors)?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(format_undefined_errors)?;

    let inputs = RcIter::new(core::iter::empty());
    let mut it = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut out = Vec::new();
    while let Some(item) = it.next() {
        let v = item.map_err(|e| anyhow!(format!("{e:?}")))?;
        // Val's Display is JSON text
        out.push(crate::decode::from_str_with_path(&format!("{v}"))?);
    }
    Ok(out)
}

/// Like [`run_jaq`], but the filter must produce exactly one document.
pub fn run_jaq_single(filter_src: &str, input: &Value) -> Result<Value> {
    let mut outputs = run_jaq(filter_src, input)?;
    match outputs.len() {
        1 => Ok(outputs.remove(0)),
        n => Err(anyhow!("jq filter `{filter_src}` produced {n} values; expected exactly one")),
    }
}

fn format_parse_errors(
    errs: Vec<(load::File<&str, ()>, load::Error<&str>)>,
) -> anyhow::Error {
    let mut s = String::new();
    for (file, err) in errs {
        s.push_str(&format!("parse error: {err:?} in `{}`\n", file.code));
    }
    anyhow!(s)
}

fn format_undefined_errors(
    errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>,
) -> anyhow::Error {
    let mut s = String::new();
    for (file, list) in errs {
        for (name, undef) in list {
            s.push_str(&format!("undefined `{name}`: {undef:?} in `{}`\n", file.code));
        }
    }
    anyhow!(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn selects_a_subdocument() {
        let doc = json!({"data": {"user": {"id": 1}}});
        assert_eq!(run_jaq_single(".data.user", &doc).unwrap(), json!({"id": 1}));
    }

    #[test]
    fn multiple_outputs_are_rejected_for_single() {
        let doc = json!({"rows": [{"a": 1}, {"a": 2}]});
        assert_eq!(run_jaq(".rows[]", &doc).unwrap().len(), 2);
        assert!(run_jaq_single(".rows[]", &doc).is_err());
    }

    #[test]
    fn syntax_errors_surface() {
        assert!(run_jaq(".[[[", &json!({})).is_err());
    }
}
