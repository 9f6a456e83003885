//! # Schema Strings — Normalization and Parsing
//!
//! A schema is a comma-separated list of `<type> <name>` declarations, e.g.
//! `uint256 eventId, uint8 voteIndex, tuple(uint8 voteIndex, bool isValid) details`.
//! Names may be omitted ("signature" form, `uint256,uint8,(uint8,bool)`).
//!
//! ## Canonical Form
//!
//! [`normalize()`] produces the string that is hashed into a schema UID. It
//! only trims whitespace and strips outer parentheses enclosing the whole
//! declaration; it never rewrites the declaration itself, because the
//! registry contract hashes the exact string it was given.
//!
//! [`Schema::canonical()`] is a separate, stronger form used for shape
//! comparison: type kinds resolved and lower-cased, `", "` separators.

use std::fmt;

use crate::abi::types::{apply_suffixes, split_suffixes, tuple_close};
use crate::abi::AbiType;
use crate::error::SchemaError;

/// Normalize a raw schema declaration to its canonical hashing form.
///
/// Trims surrounding whitespace and strips parentheses that enclose the
/// entire declaration. `(uint256 value, string name)` and
/// `uint256 value, string name` normalize to the same string; nested tuple
/// parentheses are untouched.
///
/// The function is idempotent: a declaration wrapped twice is unwrapped
/// twice, so `normalize(normalize(s)) == normalize(s)` for every input.
///
/// # Errors
///
/// Returns [`SchemaError::Empty`] when nothing remains after trimming.
pub fn normalize(raw: &str) -> Result<String, SchemaError> {
    let mut s = raw.trim();
    while encloses_whole(s) {
        s = s[1..s.len() - 1].trim();
    }
    if s.is_empty() {
        return Err(SchemaError::Empty);
    }
    Ok(s.to_string())
}

/// True when `s` is `( ... )` and the opening paren closes at the very end.
fn encloses_whole(s: &str) -> bool {
    s.starts_with('(')
        && s.ends_with(')')
        && crate::abi::types::matching_paren(s, 0) == Some(s.len() - 1)
}

/// One declared field of a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    /// The resolved ABI type.
    pub ty: AbiType,
    /// The declared name, absent in signature form.
    pub name: Option<String>,
    /// Component declarations when the base type is a tuple.
    pub components: Vec<SchemaField>,
}

impl SchemaField {
    /// Render this field in canonical with-names form.
    fn write_named(&self, out: &mut String) {
        if self.components.is_empty() {
            out.push_str(&self.ty.to_string());
        } else {
            out.push_str("tuple(");
            for (i, component) in self.components.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                component.write_named(out);
            }
            out.push(')');
            out.push_str(&array_suffix(&self.ty));
        }
        if let Some(name) = &self.name {
            out.push(' ');
            out.push_str(name);
        }
    }
}

impl fmt::Display for SchemaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_named(&mut out);
        f.write_str(&out)
    }
}

/// The `[]`/`[k]` suffix chain wrapping a type's innermost element.
fn array_suffix(ty: &AbiType) -> String {
    match ty {
        AbiType::Array(inner) => format!("{}[]", array_suffix(inner)),
        AbiType::FixedArray(inner, len) => format!("{}[{len}]", array_suffix(inner)),
        _ => String::new(),
    }
}

/// A parsed schema: the ordered field declarations of a normalized string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<SchemaField>,
}

impl Schema {
    /// Normalize and parse a schema declaration.
    pub fn parse(raw: &str) -> Result<Self, SchemaError> {
        let normalized = normalize(raw)?;
        Ok(Self {
            fields: parse_fields(&normalized)?,
        })
    }

    /// The declared fields in order.
    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for a successfully parsed schema.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The resolved ABI types in declaration order.
    pub fn types(&self) -> Vec<AbiType> {
        self.fields.iter().map(|f| f.ty.clone()).collect()
    }

    /// Signature form: `uint256,uint8,(uint8,bool)`.
    pub fn signature(&self) -> String {
        self.fields
            .iter()
            .map(|f| f.ty.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Canonical with-names form used for shape comparison.
    pub fn canonical(&self) -> String {
        self.fields
            .iter()
            .map(SchemaField::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Normalize and parse a schema declaration into its fields.
///
/// Accepts both `type name` pairs and the bare signature form.
pub fn parse_schema(raw: &str) -> Result<Vec<SchemaField>, SchemaError> {
    Schema::parse(raw).map(|schema| schema.fields)
}

/// Split a declaration list on top-level commas and parse each field.
pub(crate) fn parse_fields(list: &str) -> Result<Vec<SchemaField>, SchemaError> {
    if list.trim().is_empty() {
        return Err(SchemaError::Empty);
    }
    split_top_level(list)?
        .into_iter()
        .map(parse_field)
        .collect()
}

/// Split on commas that sit outside any parentheses or brackets.
fn split_top_level(list: &str) -> Result<Vec<&str>, SchemaError> {
    let unbalanced = || SchemaError::UnbalancedParens(list.to_string());
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, b) in list.bytes().enumerate() {
        match b {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.checked_sub(1).ok_or_else(unbalanced)?,
            b',' if depth == 0 => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(unbalanced());
    }
    parts.push(&list[start..]);
    Ok(parts)
}

fn parse_field(decl: &str) -> Result<SchemaField, SchemaError> {
    let decl = decl.trim();
    if decl.is_empty() {
        return Err(SchemaError::InvalidField(decl.to_string()));
    }

    if let Some(close) = tuple_close(decl)? {
        let open = decl.find('(').unwrap_or(0);
        let components = parse_fields(&decl[open + 1..close])?;
        let (suffix, rest) = split_suffixes(decl[close + 1..].trim_start());
        let base = AbiType::Tuple(components.iter().map(|c| c.ty.clone()).collect());
        return Ok(SchemaField {
            ty: apply_suffixes(base, suffix, decl)?,
            name: parse_name(rest, decl)?,
            components,
        });
    }

    let (token, rest) = match decl.find(char::is_whitespace) {
        Some(i) => (&decl[..i], &decl[i..]),
        None => (decl, ""),
    };
    Ok(SchemaField {
        ty: AbiType::parse(token)?,
        name: parse_name(rest, decl)?,
        components: Vec::new(),
    })
}

fn parse_name(rest: &str, decl: &str) -> Result<Option<String>, SchemaError> {
    let name = rest.trim();
    if name.is_empty() {
        return Ok(None);
    }
    if name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
        Ok(Some(name.to_string()))
    } else {
        Err(SchemaError::InvalidField(decl.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_outer_parens() {
        assert_eq!(
            normalize("(uint256 value, string name)").unwrap(),
            "uint256 value, string name"
        );
    }

    #[test]
    fn normalize_equivalence() {
        let a = normalize("(uint256 value, string name)").unwrap();
        let b = normalize("uint256 value, string name").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, "uint256 value, string name");
    }

    #[test]
    fn normalize_trims_whitespace_inside_and_outside_parens() {
        assert_eq!(
            normalize("  ( uint256 value, string name )  ").unwrap(),
            "uint256 value, string name"
        );
    }

    #[test]
    fn normalize_keeps_nested_tuple_parens() {
        assert_eq!(
            normalize("uint8 a, tuple(uint8 b, bool c) d").unwrap(),
            "uint8 a, tuple(uint8 b, bool c) d"
        );
        assert_eq!(
            normalize("((uint8,bool),uint8)").unwrap(),
            "(uint8,bool),uint8"
        );
    }

    #[test]
    fn normalize_leaves_sibling_tuples_intact() {
        assert_eq!(
            normalize("(uint8 a) x,(bool b) y").unwrap(),
            "(uint8 a) x,(bool b) y"
        );
        assert_eq!(normalize("(uint8),(bool)").unwrap(), "(uint8),(bool)");
    }

    #[test]
    fn normalize_rejects_empty() {
        assert_eq!(normalize(""), Err(SchemaError::Empty));
        assert_eq!(normalize("   "), Err(SchemaError::Empty));
        assert_eq!(normalize("()"), Err(SchemaError::Empty));
        assert_eq!(normalize(" ( ) "), Err(SchemaError::Empty));
    }

    #[test]
    fn normalize_is_idempotent_on_double_wrapping() {
        let once = normalize("((uint8 a))").unwrap();
        assert_eq!(normalize(&once).unwrap(), once);
    }

    #[test]
    fn parse_named_schema() {
        let schema = Schema::parse("uint256 eventId, uint8 voteIndex").unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.fields()[0].ty, AbiType::Uint(256));
        assert_eq!(schema.fields()[0].name.as_deref(), Some("eventId"));
        assert_eq!(schema.fields()[1].ty, AbiType::Uint(8));
        assert_eq!(schema.fields()[1].name.as_deref(), Some("voteIndex"));
    }

    #[test]
    fn parse_signature_form() {
        let schema = Schema::parse("uint256,uint8,(uint8,bool)").unwrap();
        assert_eq!(schema.len(), 3);
        assert!(schema.fields().iter().all(|f| f.name.is_none()));
        assert_eq!(
            schema.types()[2],
            AbiType::Tuple(vec![AbiType::Uint(8), AbiType::Bool])
        );
    }

    #[test]
    fn parse_named_tuple_field() {
        let schema = Schema::parse(
            "uint256 eventId, uint8 voteIndex, tuple(uint8 voteIndex, bool isValid) details",
        )
        .unwrap();
        let details = &schema.fields()[2];
        assert_eq!(details.name.as_deref(), Some("details"));
        assert_eq!(details.components.len(), 2);
        assert_eq!(details.components[1].name.as_deref(), Some("isValid"));
        assert_eq!(schema.signature(), "uint256,uint8,(uint8,bool)");
    }

    #[test]
    fn parse_tuple_array_field() {
        let schema = Schema::parse("tuple(address who, uint64 at)[] entries").unwrap();
        let field = &schema.fields()[0];
        assert_eq!(field.name.as_deref(), Some("entries"));
        assert_eq!(
            field.ty,
            AbiType::Array(Box::new(AbiType::Tuple(vec![
                AbiType::Address,
                AbiType::Uint(64)
            ])))
        );
        assert_eq!(schema.canonical(), "tuple(address who, uint64 at)[] entries");
    }

    #[test]
    fn canonical_form_lowercases_kinds_and_fixes_separators() {
        let schema = Schema::parse("UINT256 eventId,Bool   isValid").unwrap();
        assert_eq!(schema.canonical(), "uint256 eventId, bool isValid");
    }

    #[test]
    fn canonical_form_resolves_aliases() {
        let schema = Schema::parse("uint amount, int delta").unwrap();
        assert_eq!(schema.canonical(), "uint256 amount, int256 delta");
    }

    #[test]
    fn parse_rejects_trailing_comma() {
        assert!(matches!(
            Schema::parse("uint256 a,"),
            Err(SchemaError::InvalidField(_))
        ));
    }

    #[test]
    fn parse_rejects_unbalanced() {
        assert!(matches!(
            Schema::parse("tuple(uint8 a, bool b details"),
            Err(SchemaError::UnbalancedParens(_))
        ));
        assert!(matches!(
            Schema::parse("uint8 a), bool b"),
            Err(SchemaError::UnbalancedParens(_))
        ));
    }

    #[test]
    fn parse_rejects_multi_word_names() {
        assert!(matches!(
            Schema::parse("uint256 indexed value"),
            Err(SchemaError::InvalidField(_))
        ));
    }

    #[test]
    fn parse_rejects_unknown_types() {
        assert!(matches!(
            Schema::parse("uint256 a, decimal b"),
            Err(SchemaError::UnknownType(_))
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// normalize(normalize(s)) == normalize(s) for every string.
        #[test]
        fn normalize_idempotent(s in ".{0,64}") {
            if let Ok(once) = normalize(&s) {
                prop_assert_eq!(normalize(&once).unwrap(), once);
            }
        }

        /// Idempotence over paren-heavy inputs, where it is easiest to break.
        #[test]
        fn normalize_idempotent_paren_soup(s in "[() a-z,]{0,32}") {
            if let Ok(once) = normalize(&s) {
                prop_assert_eq!(normalize(&once).unwrap(), once);
            }
        }

        /// Wrapping in one pair of parens and whitespace never changes the result.
        #[test]
        fn normalize_ignores_one_wrapping(
            fields in prop::collection::vec("(uint256|bool|address|string) [a-z]{1,8}", 1..5),
            pad in " {0,3}",
        ) {
            let plain = fields.join(", ");
            let wrapped = format!("{pad}({plain}){pad}");
            prop_assert_eq!(normalize(&wrapped).unwrap(), normalize(&plain).unwrap());
        }
    }
}
