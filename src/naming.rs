//! Type-name allocation.
use std::path::Path;

/// Suffix appended to root names derived from file paths.
pub const ROOT_SUFFIX: &str = "Result";

/// Uppercase the first code point; everything after it is left untouched.
///
/// Some code points expand when uppercased (`ß` → `SS`); the full expansion is
/// kept.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Root type name for a document stored at `path`: capitalized file stem plus
/// [`ROOT_SUFFIX`] (`data/user.json` → `UserResult`).
pub fn root_type_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{}{ROOT_SUFFIX}", capitalize(&stem))
}

// ------------------------------- Tests ------------------------------------ //
