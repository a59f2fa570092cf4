// Typed model handed from inference to rendering. No serde_json::Value here.
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

/// Shown next to any type expression that was guessed rather than observed.
pub const REVIEW_MARKER: &str = "needs manual check";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Unknown,                 // null, or an array with nothing usable to sample
    Boolean,
    Integer,
    Float,
    RawFloat,                // fractional literal with no finite f64 form
    String,
    Object,
    Array,
}

impl Kind {
    /// SDL scalar name. `None` for composites and `Unknown`.
    pub fn scalar_name(self) -> Option<&'static str> {
        match self {
            Kind::Boolean => Some("Boolean"),
            Kind::Integer => Some("Int"),
            Kind::Float | Kind::RawFloat => Some("Float"),
            Kind::String => Some("String"),
            Kind::Unknown | Kind::Object | Kind::Array => None,
        }
    }
}

/// A resolved, render-ready type expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeExpr {
    pub text: String,
    pub needs_review: bool,
}

impl TypeExpr {
    fn confirmed(text: impl Into<String>) -> Self {
        Self { text: text.into(), needs_review: false }
    }
    fn unconfirmed(text: impl Into<String>) -> Self {
        Self { text: text.into(), needs_review: true }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.needs_review {
            write!(f, "{} # {REVIEW_MARKER}", self.text)
        } else {
            f.write_str(&self.text)
        }
    }
}

/// One key of a parent object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescription {
    pub name: String,
    pub kind: Kind,
    /// Only set when `kind == Array`.
    pub element_kind: Option<Kind>,
    /// Set when `kind == Object`, or `kind == Array` with object elements.
    pub nested_type_name: Option<String>,
}

impl FieldDescription {
    pub fn scalar(name: impl Into<String>, kind: Kind) -> Self {
        Self { name: name.into(), kind, element_kind: None, nested_type_name: None }
    }

    pub fn object(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Kind::Object,
            element_kind: None,
            nested_type_name: Some(type_name.into()),
        }
    }

    pub fn array(name: impl Into<String>, element_kind: Kind, nested_type_name: Option<String>) -> Self {
        Self {
            name: name.into(),
            kind: Kind::Array,
            element_kind: Some(element_kind),
            nested_type_name,
        }
    }

    /// Resolve the type expression the renderer substitutes verbatim.
    pub fn type_expr(&self) -> TypeExpr {
        match self.kind {
            Kind::Object => match &self.nested_type_name {
                Some(name) => TypeExpr::confirmed(name.clone()),
                None => TypeExpr::unconfirmed("String"),
            },
            Kind::Array => match (self.element_kind, &self.nested_type_name) {
                (Some(Kind::Object), Some(name)) => TypeExpr::confirmed(format!("[{name}]")),
                // arrays of arrays are not sampled any deeper
                (Some(Kind::Array), _) => TypeExpr::unconfirmed("[[String]]"),
                (Some(k), _) => match k.scalar_name() {
                    Some(scalar) => TypeExpr::confirmed(format!("[{scalar}]")),
                    None => TypeExpr::unconfirmed("[String]"),
                },
                (None, _) => TypeExpr::unconfirmed("[String]"),
            },
            k => match k.scalar_name() {
                Some(scalar) => TypeExpr::confirmed(scalar),
                None => TypeExpr::unconfirmed("String"),
            },
        }
    }

    pub fn needs_review(&self) -> bool {
        self.type_expr().needs_review
    }
}

// The template engine gets the resolved expression alongside the raw parts.
impl Serialize for FieldDescription {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let expr = self.type_expr();
        let mut s = serializer.serialize_struct("FieldDescription", 6)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("kind", &self.kind)?;
        s.serialize_field("element_kind", &self.element_kind)?;
        s.serialize_field("nested_type_name", &self.nested_type_name)?;
        s.serialize_field("type_expr", &expr.text)?;
        s.serialize_field("needs_review", &expr.needs_review)?;
        s.end()
    }
}

/// One named composite type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDefinition {
    pub name: String,
    pub fields: Vec<FieldDescription>, // document order
}

/// Append-only, post-order list of every type produced by one inference pass:
/// nested types come before the types that contain them, the root comes last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TypeRegistry {
    types: Vec<TypeDefinition>,
}

impl TypeRegistry {
    pub fn new() -> Self { Self::default() }

    pub(crate) fn push(&mut self, def: TypeDefinition) {
        self.types.push(def);
    }

    pub fn len(&self) -> usize { self.types.len() }
    pub fn is_empty(&self) -> bool { self.types.is_empty() }

    /// Post-order iteration (insertion order).
    pub fn iter(&self) -> std::slice::Iter<'_, TypeDefinition> {
        self.types.iter()
    }

    /// Root first, each type before the types it refers to.
    pub fn iter_declaration_order(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.iter().rev()
    }

    /// The root type, i.e. the last one appended.
    pub fn root(&self) -> Option<&TypeDefinition> {
        self.types.last()
    }

    /// First type appended under `name`.
    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Names appended more than once, in first-seen order.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut counts = IndexMap::<&str, usize>::new();
        for def in &self.types {
            *counts.entry(def.name.as_str()).or_default() += 1;
        }
        counts.into_iter().filter(|(_, n)| *n > 1).map(|(name, _)| name).collect()
    }

    pub fn as_slice(&self) -> &[TypeDefinition] { &self.types }
    pub fn into_vec(self) -> Vec<TypeDefinition> { self.types }
}

impl<'a> IntoIterator for &'a TypeRegistry {
    type Item = &'a TypeDefinition;
    type IntoIter = std::slice::Iter<'a, TypeDefinition>;
    fn into_iter(self) -> Self::IntoIter { self.types.iter() }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scalar_expressions() {
        assert_eq!(FieldDescription::scalar("a", Kind::Integer).type_expr().text, "Int");
        assert_eq!(FieldDescription::scalar("a", Kind::Float).type_expr().text, "Float");
        assert_eq!(FieldDescription::scalar("a", Kind::RawFloat).type_expr().text, "Float");
        assert_eq!(FieldDescription::scalar("a", Kind::Boolean).type_expr().text, "Boolean");
        assert_eq!(FieldDescription::scalar("a", Kind::String).type_expr().text, "String");
    }

    #[test]
    fn unknown_is_a_flagged_string() {
        let expr = FieldDescription::scalar("a", Kind::Unknown).type_expr();
        assert_eq!(expr, TypeExpr { text: "String".into(), needs_review: true });
        assert_eq!(expr.to_string(), "String # needs manual check");
    }

    #[test]
    fn list_expressions() {
        let objs = FieldDescription::array("items", Kind::Object, Some("Items".into()));
        assert_eq!(objs.type_expr().to_string(), "[Items]");

        let tags = FieldDescription::array("tags", Kind::String, None);
        assert_eq!(tags.type_expr().to_string(), "[String]");

        let empty = FieldDescription::array("tags", Kind::Unknown, None);
        assert_eq!(empty.type_expr().to_string(), "[String] # needs manual check");

        let nested = FieldDescription::array("grid", Kind::Array, None);
        assert!(nested.needs_review());
        assert_eq!(nested.type_expr().text, "[[String]]");
    }

    #[test]
    fn serialized_field_carries_resolved_expr() {
        let f = FieldDescription::object("address", "Address");
        let v = serde_json::to_value(&f).unwrap();
        assert_eq!(v["type_expr"], "Address");
        assert_eq!(v["needs_review"], false);
        assert_eq!(v["kind"], "object");
        assert!(v["element_kind"].is_null());
    }

    #[test]
    fn registry_orders_and_duplicates() {
        let mut reg = TypeRegistry::new();
        reg.push(TypeDefinition { name: "Meta".into(), fields: vec![] });
        reg.push(TypeDefinition { name: "Meta".into(), fields: vec![] });
        reg.push(TypeDefinition { name: "Root".into(), fields: vec![] });

        assert_eq!(reg.len(), 3);
        assert_eq!(reg.root().map(|t| t.name.as_str()), Some("Root"));
        let decl = reg.iter_declaration_order().map(|t| t.name.as_str()).collect::<Vec<_>>();
        assert_eq!(decl, vec!["Root", "Meta", "Meta"]);
        assert_eq!(reg.duplicate_names(), vec!["Meta"]);
        assert!(reg.get("Nope").is_none());
    }
}
