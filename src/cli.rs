//! Minimal CLI: infer → (sdl | types)
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indexmap::IndexMap;
use rayon::prelude::*;

use json2sdl::inference::{InferOptions, DEFAULT_MAX_DEPTH};
use json2sdl::ir::TypeRegistry;
use json2sdl::output::write_atomic;
use json2sdl::render::{SchemaRenderer, TemplateRenderer};
use json2sdl::{Inspector, Preprocess};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// infer a GraphQL-style SDL schema from a JSON document
#[derive(Parser, Debug)]
#[command(name = "json2sdl", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// infer and render the SDL schema
    Sdl(SdlOut),
    /// infer and print the type registry as JSON (debug view)
    Types(TypesOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required_unless_present = "url", conflicts_with = "url")]
    input: Vec<String>,

    /// fetch the document with an HTTP GET instead of reading files
    #[arg(long)]
    url: Option<String>,

    /// bearer token sent with --url
    #[arg(long, env = "JSON2SDL_TOKEN", hide_env_values = true)]
    token: Option<Token>,

    /// JSON Pointer to select a subnode of the document (e.g. /data/items/0)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter; must yield exactly one value
    #[arg(long)]
    jq_expr: Option<String>,

    /// root type name (default: capitalized file stem + "Result")
    #[arg(long)]
    root_type: Option<String>,

    /// deepest object nesting accepted before failing
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

#[derive(clap::Parser, Debug)]
struct SdlOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// custom minijinja template (bundled SDL template if omitted)
    #[arg(long)]
    template: Option<PathBuf>,

    /// output file (stdout if omitted)
    #[arg(short, long, conflicts_with = "out_dir")]
    out: Option<PathBuf>,

    /// output directory; one <stem>.graphql per input
    #[arg(long, conflicts_with = "url")]
    out_dir: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct TypesOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

/// Bearer token; never shown in debug output.
#[derive(Clone)]
struct Token(String);

impl From<String> for Token {
    fn from(s: String) -> Self { Self(s) }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

enum Source {
    Files(Vec<PathBuf>),
    Url { url: String, token: Option<String> },
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn source(&self) -> Result<Source> {
        if let Some(url) = &self.url {
            return Ok(Source::Url {
                url: url.clone(),
                token: self.token.as_ref().map(|t| t.0.clone()),
            });
        }
        let paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        Ok(Source::Files(paths))
    }

    fn inspector<R: SchemaRenderer>(&self, renderer: R) -> Inspector<R> {
        let inspector = Inspector::new(renderer)
            .with_options(InferOptions { max_depth: self.max_depth })
            .with_preprocess(Preprocess {
                json_pointer: self.json_pointer.clone(),
                jq_expr: self.jq_expr.clone(),
            });
        match &self.root_type {
            Some(name) => inspector.with_root_name(name.clone()),
            None => inspector,
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Sdl(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(())
                }
                target.run()
            }
            Command::Types(target) => {
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(())
                }
                target.run()
            }
        }
    }
}

impl SdlOut {
    fn run(&self) -> Result<()> {
        let renderer = match &self.template {
            Some(path) => TemplateRenderer::from_path(path)?,
            None => TemplateRenderer::new(),
        };
        let inspector = self.input_settings.inspector(renderer);

        match self.input_settings.source()? {
            Source::Url { url, token } => {
                let token = token.as_deref();
                if let Some(out) = self.out.as_ref() {
                    inspector.inspect_url(&url, token, out)?;
                } else {
                    let bytes = inspector.fetch_bytes(&url, token)?;
                    emit(None, &inspector.inspect_bytes(&bytes)?)?;
                }
            }
            Source::Files(paths) => {
                if let Some(dir) = self.out_dir.as_ref() {
                    let targets = out_dir_targets(dir, &paths, "graphql")?;
                    // one registry per document, documents in parallel
                    targets.par_iter().try_for_each(|(path, out)| {
                        inspector
                            .inspect_file(path, out)
                            .with_context(|| format!("while processing {}", path.display()))
                    })?;
                } else if let Some(out) = self.out.as_ref() {
                    let [path] = paths.as_slice() else {
                        bail!("--out takes a single input; use --out-dir for {} inputs", paths.len());
                    };
                    inspector.inspect_file(path, out)?;
                } else {
                    let rendered = paths
                        .par_iter()
                        .map(|path| {
                            inspector
                                .render_file(path)
                                .with_context(|| format!("while processing {}", path.display()))
                        })
                        .collect::<Result<Vec<_>>>()?;
                    emit(None, rendered.join("\n").as_bytes())?;
                }
            }
        }
        Ok(())
    }
}

impl TypesOut {
    fn run(&self) -> Result<()> {
        let src = self.dump()?;
        emit(self.out.as_deref(), src.as_bytes())
    }

    /// One registry for a single input, an object keyed by path otherwise.
    fn dump(&self) -> Result<String> {
        // the registry dump never renders, so any renderer will do
        let inspector = self.input_settings.inspector(TemplateRenderer::new());

        let src = match self.input_settings.source()? {
            Source::Url { url, token } => {
                let bytes = inspector.fetch_bytes(&url, token.as_deref())?;
                let root_name = self.input_settings.root_type.clone()
                    .unwrap_or_else(json2sdl::inspect::default_root_name);
                let inference = inspector.infer_bytes(&bytes, &root_name)?;
                serde_json::to_string_pretty(&inference.registry)?
            }
            Source::Files(paths) => {
                let registries = paths
                    .par_iter()
                    .map(|path| {
                        inspector
                            .infer_file(path)
                            .map(|inference| (path.display().to_string(), inference.registry))
                            .with_context(|| format!("while processing {}", path.display()))
                    })
                    .collect::<Result<Vec<_>>>()?;
                if registries.len() == 1 {
                    serde_json::to_string_pretty(&registries[0].1)?
                } else {
                    let by_input = registries.into_iter().collect::<IndexMap<String, TypeRegistry>>();
                    serde_json::to_string_pretty(&by_input)?
                }
            }
        };
        Ok(src)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn emit(out: Option<&Path>, contents: &[u8]) -> Result<()> {
    match out {
        Some(path) => write_atomic(path, contents)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{}", String::from_utf8_lossy(contents).trim_end());
            Ok(())
        }
    }
}

fn output_file_name(input: &Path, ext: &str) -> PathBuf {
    let stem = input.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
    PathBuf::from(format!("{stem}.{ext}"))
}

/// Pair each input with its file under `dir`. Two inputs sharing a stem
/// would overwrite each other, so that is refused before anything is written.
fn out_dir_targets(dir: &Path, paths: &[PathBuf], ext: &str) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut seen = IndexMap::<PathBuf, &Path>::new();
    for path in paths {
        let name = output_file_name(path, ext);
        if let Some(first) = seen.insert(name.clone(), path) {
            bail!(
                "{} and {} both map to {} in {}",
                first.display(),
                path.display(),
                name.display(),
                dir.display(),
            );
        }
    }
    Ok(seen.into_iter().map(|(name, path)| (path.to_path_buf(), dir.join(name))).collect())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // an explicit glob that matched nothing is an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
