use serde_json::Number;

use crate::ir::Kind;

/// Integer when the literal fits a 64-bit integer (signed or unsigned) or,
/// failing that, is a plain digit run that fits `i128`. Fractional and
/// exponent literals are `Float`, or `RawFloat` when no finite `f64` exists.
pub fn classify(n: &Number) -> Kind {
    if n.is_i64() || n.is_u64() {
        return Kind::Integer;
    }
    let literal = n.to_string();
    if is_integer_literal(&literal) && literal.parse::<i128>().is_ok() {
        return Kind::Integer;
    }
    match n.as_f64() {
        Some(f) if f.is_finite() => Kind::Float,
        _ => Kind::RawFloat,
    }
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
