//! Conversion of raw `<data>` text into typed property values.

use crate::error::CoercionError;
use crate::schema::{PropertyKey, ScalarType};
use std::fmt;

/// Characters stripped from both ends of a list-encoded value.
const LIST_WRAPPING: &[char] = &['[', ']', ' ', '\t', '\n', '\r'];

/// A typed property value.
///
/// `float` and `double` declarations both produce [`TypedValue::Float`];
/// `int` and `long` both produce [`TypedValue::Int`].
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(TypedList),
}

/// A homogeneous list value.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedList {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    Float(Vec<f64>),
    String(Vec<String>),
}

impl TypedList {
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::List(list) => write!(f, "{list}"),
        }
    }
}

impl fmt::Display for TypedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = match self {
            Self::Bool(v) => v.iter().map(ToString::to_string).collect(),
            Self::Int(v) => v.iter().map(ToString::to_string).collect(),
            Self::Float(v) => v.iter().map(ToString::to_string).collect(),
            Self::String(v) => v
                .iter()
                .map(|s| format!("\"{}\"", s.replace('"', "\\\"")))
                .collect(),
        };
        write!(f, "[{}]", items.join(", "))
    }
}

/// Coerce the raw text of a `<data>` element according to its key.
///
/// Missing text yields `Ok(None)`.
pub fn coerce(key: &PropertyKey, raw: Option<&str>) -> Result<Option<TypedValue>, CoercionError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value = match key.list_element_type {
        Some(element_type) => TypedValue::List(parse_list(element_type, raw)?),
        None => parse_scalar(key.scalar_type, raw)?,
    };
    Ok(Some(value))
}

/// Parse a single scalar of the given type.
pub fn parse_scalar(scalar_type: ScalarType, raw: &str) -> Result<TypedValue, CoercionError> {
    Ok(match scalar_type {
        ScalarType::Bool => TypedValue::Bool(parse_bool(raw)),
        ScalarType::Int => TypedValue::Int(parse_int(raw)?),
        ScalarType::Long => TypedValue::Int(parse_long(raw)?),
        ScalarType::Float | ScalarType::Double => TypedValue::Float(parse_float(scalar_type, raw)?),
        ScalarType::String => TypedValue::String(raw.to_string()),
    })
}

/// Parse a list-encoded value such as `[1, 2, 3]` or `["a", "b"]`.
pub fn parse_list(element_type: ScalarType, raw: &str) -> Result<TypedList, CoercionError> {
    let inner = raw.trim_matches(LIST_WRAPPING);
    Ok(match element_type {
        ScalarType::Bool => TypedList::Bool(split_tokens(inner).map(parse_bool).collect()),
        ScalarType::Int => TypedList::Int(split_tokens(inner).map(parse_int).collect::<Result<_, _>>()?),
        ScalarType::Long => {
            TypedList::Int(split_tokens(inner).map(parse_long).collect::<Result<_, _>>()?)
        }
        ScalarType::Float | ScalarType::Double => TypedList::Float(
            split_tokens(inner)
                .map(|token| parse_float(element_type, token))
                .collect::<Result<_, _>>()?,
        ),
        ScalarType::String => TypedList::String(scan_quoted_tokens(inner)),
    })
}

/// Comma-separated tokens, empty pieces dropped, each trimmed.
fn split_tokens(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').filter(|piece| !piece.is_empty()).map(str::trim)
}

/// Extract the double-quoted tokens of a string list.
///
/// A quote closes the current token only when preceded by an even number of
/// backslashes. Text outside quotes (separators, stray characters) is dropped.
fn scan_quoted_tokens(value: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut inside = false;
    let mut start = 0;
    let mut escapes = 0usize;

    for (i, c) in value.char_indices() {
        if c == '"' {
            if inside && escapes % 2 == 0 {
                tokens.push(value[start..i].replace("\\\"", "\""));
                inside = false;
            } else if !inside {
                inside = true;
                start = i + c.len_utf8();
            }
        }
        escapes = if c == '\\' { escapes + 1 } else { 0 };
    }
    tokens
}

fn parse_bool(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true")
}

fn parse_int(raw: &str) -> Result<i64, CoercionError> {
    raw.trim()
        .parse::<i32>()
        .map(i64::from)
        .map_err(|e| coercion_error(raw, ScalarType::Int, e))
}

fn parse_long(raw: &str) -> Result<i64, CoercionError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| coercion_error(raw, ScalarType::Long, e))
}

fn parse_float(target: ScalarType, raw: &str) -> Result<f64, CoercionError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| coercion_error(raw, target, e))
}

fn coercion_error(raw: &str, target: ScalarType, reason: impl fmt::Display) -> CoercionError {
    CoercionError {
        value: raw.to_string(),
        target,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::OwnerKind;

    fn scalar_key(scalar_type: ScalarType) -> PropertyKey {
        PropertyKey::new(OwnerKind::Node, "k", "k", scalar_type, None)
    }

    fn list_key(element_type: ScalarType) -> PropertyKey {
        PropertyKey::new(OwnerKind::Node, "k", "k", ScalarType::String, Some(element_type))
    }

    #[test]
    fn test_missing_text_is_none() {
        assert_eq!(coerce(&scalar_key(ScalarType::Int), None).unwrap(), None);
        assert_eq!(coerce(&list_key(ScalarType::Int), None).unwrap(), None);
    }

    #[test]
    fn test_scalar_round_trip() {
        let cases = [
            (ScalarType::Bool, "true", TypedValue::Bool(true)),
            (ScalarType::Bool, "false", TypedValue::Bool(false)),
            (ScalarType::Int, "42", TypedValue::Int(42)),
            (ScalarType::Long, "-9000000000", TypedValue::Int(-9_000_000_000)),
            (ScalarType::Float, "3.14", TypedValue::Float(3.14)),
            (ScalarType::Double, "0.5", TypedValue::Float(0.5)),
            (ScalarType::String, "hello world", TypedValue::String("hello world".into())),
        ];
        for (scalar_type, raw, expected) in cases {
            let value = coerce(&scalar_key(scalar_type), Some(raw)).unwrap().unwrap();
            assert_eq!(value, expected, "coercing {raw} as {scalar_type}");
            assert_eq!(value.to_string(), raw);
        }
    }

    #[test]
    fn test_bool_is_lenient() {
        assert_eq!(parse_scalar(ScalarType::Bool, "TRUE").unwrap(), TypedValue::Bool(true));
        assert_eq!(parse_scalar(ScalarType::Bool, "yes").unwrap(), TypedValue::Bool(false));
        assert_eq!(parse_scalar(ScalarType::Bool, "").unwrap(), TypedValue::Bool(false));
    }

    #[test]
    fn test_numeric_text_is_trimmed() {
        assert_eq!(parse_scalar(ScalarType::Int, " 7\n").unwrap(), TypedValue::Int(7));
        assert_eq!(parse_scalar(ScalarType::Double, "\t1e3 ").unwrap(), TypedValue::Float(1000.0));
    }

    #[test]
    fn test_string_is_not_trimmed() {
        assert_eq!(
            parse_scalar(ScalarType::String, "  padded ").unwrap(),
            TypedValue::String("  padded ".into())
        );
    }

    #[test]
    fn test_unparseable_number_fails() {
        let err = coerce(&scalar_key(ScalarType::Int), Some("forty")).unwrap_err();
        assert_eq!(err.value, "forty");
        assert_eq!(err.target, ScalarType::Int);

        // int is 32-bit, long is 64-bit
        assert!(parse_scalar(ScalarType::Int, "3000000000").is_err());
        assert!(parse_scalar(ScalarType::Long, "3000000000").is_ok());
        assert!(parse_scalar(ScalarType::Double, "").is_err());
    }

    #[test]
    fn test_int_list() {
        let value = coerce(&list_key(ScalarType::Int), Some("[1, 2, 3]")).unwrap().unwrap();
        assert_eq!(value, TypedValue::List(TypedList::Int(vec![1, 2, 3])));
    }

    #[test]
    fn test_list_preserves_order_and_duplicates() {
        let list = parse_list(ScalarType::Long, "[5,5, 1 ,5]").unwrap();
        assert_eq!(list, TypedList::Int(vec![5, 5, 1, 5]));
    }

    #[test]
    fn test_list_drops_empty_pieces() {
        assert_eq!(parse_list(ScalarType::Int, "[]").unwrap(), TypedList::Int(vec![]));
        assert_eq!(parse_list(ScalarType::Int, "1,,2").unwrap(), TypedList::Int(vec![1, 2]));
        assert!(parse_list(ScalarType::Int, "1, ,2").is_err());
    }

    #[test]
    fn test_float_and_bool_lists() {
        assert_eq!(
            parse_list(ScalarType::Double, " [0.5, 2.25]\n").unwrap(),
            TypedList::Float(vec![0.5, 2.25])
        );
        assert_eq!(
            parse_list(ScalarType::Bool, "[true, False, x]").unwrap(),
            TypedList::Bool(vec![true, false, false])
        );
    }

    #[test]
    fn test_list_element_failure() {
        let err = parse_list(ScalarType::Int, "[1, two, 3]").unwrap_err();
        assert_eq!(err.value, "two");
    }

    #[test]
    fn test_string_list_keeps_commas_and_unescapes_quotes() {
        let value = coerce(&list_key(ScalarType::String), Some(r#"["a,b", "c\"d"]"#))
            .unwrap()
            .unwrap();
        assert_eq!(
            value,
            TypedValue::List(TypedList::String(vec!["a,b".into(), "c\"d".into()]))
        );
    }

    #[test]
    fn test_string_list_escape_parity() {
        // An escaped backslash before the quote does not escape the quote.
        let list = parse_list(ScalarType::String, r#"["x\\", "y"]"#).unwrap();
        assert_eq!(list, TypedList::String(vec![r"x\\".into(), "y".into()]));
    }

    #[test]
    fn test_string_list_ignores_unquoted_text() {
        let list = parse_list(ScalarType::String, r#"[junk "a" , more "b"]"#).unwrap();
        assert_eq!(list, TypedList::String(vec!["a".into(), "b".into()]));
        assert_eq!(parse_list(ScalarType::String, "[]").unwrap(), TypedList::String(vec![]));
    }

    #[test]
    fn test_string_list_unicode() {
        let list = parse_list(ScalarType::String, r#"["größe", "日本"]"#).unwrap();
        assert_eq!(list, TypedList::String(vec!["größe".into(), "日本".into()]));
    }
}
