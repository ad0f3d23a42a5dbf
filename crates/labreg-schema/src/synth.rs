//! # Bad-Data Synthesis
//!
//! [`synthesize`] builds a JSON value that the given schema is expected to
//! reject. Running the real validator over that value yields issues that look
//! exactly like what a client would receive, which is what the API docs show.
//!
//! Only the first constraint declared on a string or number node is acted on.
//! Every value produced is a fixed constant derived from the schema's shape,
//! so the same schema always yields the same data.

use serde_json::{json, Map, Number, Value};

use crate::error::SchemaError;
use crate::issue::{format_path, PathSegment};
use crate::node::{NumberCheck, NumberSchema, ObjectSchema, SchemaNode, StringCheck, StringSchema};
use crate::validate::ensure_unique_fields;

/// Objects contribute at most this many fields, taken in declaration order.
pub const MAX_EXAMPLE_FIELDS: usize = 3;

/// Longest `max_length` a string one character past it is built for.
pub const MAX_SYNTHESIZED_LENGTH: usize = 64 * 1024;

/// Stand-in for an `email` string.
pub const INVALID_EMAIL: &str = "invalid-email";
/// Stand-in for a `url` string.
pub const INVALID_URL: &str = "not-a-url";
/// Stand-in for a `uuid` string.
pub const INVALID_UUID: &str = "not-a-uuid";

const NOT_A_STRING: i64 = 123;
const NOT_A_NUMBER: &str = "not-a-number";
const NOT_A_BOOLEAN: &str = "not-a-boolean";
const NOT_AN_INTEGER: f64 = 1.5;
const INVALID_ENUM_VALUE: &str = "__invalid_enum_value__";
const UNION_MARKER: &str = "__invalid_union_member__";

/// Build a value that violates `schema`.
pub fn synthesize(schema: &SchemaNode) -> Result<Value, SchemaError> {
    let mut path = Vec::new();
    synth(schema, &mut path)
}

fn synth(node: &SchemaNode, path: &mut Vec<PathSegment>) -> Result<Value, SchemaError> {
    match node {
        SchemaNode::String(schema) => synth_string(schema, path),
        SchemaNode::Number(schema) => synth_number(schema, path),
        SchemaNode::Boolean => Ok(json!(NOT_A_BOOLEAN)),
        SchemaNode::Enum { values } => synth_enum(values, path),
        SchemaNode::Array { element } => {
            path.push(PathSegment::Index(0));
            let item = synth(element, path);
            path.pop();
            Ok(Value::Array(vec![item?]))
        }
        SchemaNode::Object(schema) => synth_object(schema, path),
        SchemaNode::Optional { inner } | SchemaNode::Nullable { inner } => synth(inner, path),
        SchemaNode::Union { members } => {
            if members.is_empty() {
                return Err(SchemaError::EmptyUnion {
                    path: format_path(path),
                });
            }
            Ok(json!({ UNION_MARKER: true }))
        }
        SchemaNode::Other { .. } => Ok(Value::Null),
    }
}

fn synth_string(schema: &StringSchema, path: &[PathSegment]) -> Result<Value, SchemaError> {
    Ok(match schema.checks.first() {
        Some(StringCheck::Email) => json!(INVALID_EMAIL),
        Some(StringCheck::Url) => json!(INVALID_URL),
        Some(StringCheck::Uuid) => json!(INVALID_UUID),
        Some(StringCheck::MinLength(_)) => json!(""),
        Some(StringCheck::MaxLength(max)) if *max > MAX_SYNTHESIZED_LENGTH => {
            return Err(SchemaError::LengthTooLarge {
                path: format_path(path),
                max: *max,
                limit: MAX_SYNTHESIZED_LENGTH,
            })
        }
        Some(StringCheck::MaxLength(max)) => json!("a".repeat(max + 1)),
        None => json!(NOT_A_STRING),
    })
}

fn synth_number(schema: &NumberSchema, path: &[PathSegment]) -> Result<Value, SchemaError> {
    match schema.checks.first() {
        Some(NumberCheck::Min(min)) => finite(*min, path).map(|m| number_value(below(m))),
        Some(NumberCheck::Max(max)) => finite(*max, path).map(|m| number_value(above(m))),
        Some(NumberCheck::Integer) => Ok(number_value(NOT_AN_INTEGER)),
        None => Ok(json!(NOT_A_NUMBER)),
    }
}

fn synth_enum(values: &[String], path: &[PathSegment]) -> Result<Value, SchemaError> {
    if values.is_empty() {
        return Err(SchemaError::EmptyEnum {
            path: format_path(path),
        });
    }
    let mut candidate = INVALID_ENUM_VALUE.to_string();
    while values.contains(&candidate) {
        candidate.push('_');
    }
    Ok(Value::String(candidate))
}

fn synth_object(schema: &ObjectSchema, path: &mut Vec<PathSegment>) -> Result<Value, SchemaError> {
    ensure_unique_fields(schema, path)?;
    let mut map = Map::new();
    for field in schema.fields.iter().take(MAX_EXAMPLE_FIELDS) {
        path.push(PathSegment::Key(field.name.clone()));
        let value = synth(&field.schema, path);
        path.pop();
        map.insert(field.name.clone(), value?);
    }
    Ok(Value::Object(map))
}

fn finite(bound: f64, path: &[PathSegment]) -> Result<f64, SchemaError> {
    if bound.is_finite() {
        Ok(bound)
    } else {
        Err(SchemaError::NonFiniteBound {
            path: format_path(path),
            value: bound,
        })
    }
}

/// `m - 1`, or the next representable value down once `m` is too large for
/// a step of one to register.
fn below(m: f64) -> f64 {
    let stepped = m - 1.0;
    if stepped < m {
        stepped
    } else if m > 0.0 {
        f64::from_bits(m.to_bits() - 1)
    } else {
        f64::from_bits(m.to_bits() + 1)
    }
}

/// Mirror of [`below`].
fn above(m: f64) -> f64 {
    -below(-m)
}

/// Integral values become JSON integers so `min(18)` yields `17`, not `17.0`.
fn number_value(n: f64) -> Value {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::examples::{error_examples, fallback_example};
    use crate::issue::IssueCode;
    use crate::node::{array, boolean, enumeration, number, object, other, string, union};
    use crate::validate::Validator;
    use proptest::prelude::*;

    fn synth_of(node: impl Into<SchemaNode>) -> Value {
        synthesize(&node.into()).unwrap()
    }

    #[test]
    fn string_formats() {
        assert_eq!(synth_of(string().email()), json!("invalid-email"));
        assert_eq!(synth_of(string().url()), json!("not-a-url"));
        assert_eq!(synth_of(string().uuid()), json!("not-a-uuid"));
        assert_eq!(synth_of(string().min_length(3)), json!(""));
        assert_eq!(synth_of(string().max_length(4)), json!("aaaaa"));
        assert_eq!(synth_of(string()), json!(123));
    }

    #[test]
    fn max_length_at_the_limit_is_exceeded_by_one() {
        let value = synth_of(string().max_length(MAX_SYNTHESIZED_LENGTH));
        assert_eq!(value.as_str().map(str::len), Some(MAX_SYNTHESIZED_LENGTH + 1));
    }

    #[test]
    fn huge_max_length_is_a_schema_error() {
        for max in [1usize << 50, usize::MAX] {
            let schema: SchemaNode = object().field("bio", string().max_length(max)).into();
            assert_eq!(
                synthesize(&schema).unwrap_err(),
                SchemaError::LengthTooLarge {
                    path: "bio".into(),
                    max,
                    limit: MAX_SYNTHESIZED_LENGTH,
                }
            );
            assert_eq!(error_examples(&schema), vec![fallback_example()]);
        }
    }

    #[test]
    fn large_bounds_step_to_the_next_representable_value() {
        let schema = SchemaNode::from(number().min(1e17));
        let value = synthesize(&schema).unwrap();
        assert!(value.as_f64().unwrap() < 1e17);
        let issues = schema.validate(&value).unwrap().issues;
        assert_eq!(issues[0].code, IssueCode::TooSmall);

        let schema = SchemaNode::from(number().max(-1e17));
        let value = synthesize(&schema).unwrap();
        assert!(value.as_f64().unwrap() > -1e17);

        let schema = SchemaNode::from(number().max(1e300));
        let value = synthesize(&schema).unwrap();
        assert!(value.as_f64().unwrap() > 1e300);
        assert_eq!(schema.validate(&value).unwrap().issues[0].code, IssueCode::TooBig);
    }

    #[test]
    fn first_declared_string_check_wins() {
        assert_eq!(synth_of(string().max_length(2).email()), json!("aaa"));
        assert_eq!(synth_of(string().email().max_length(2)), json!("invalid-email"));
    }

    #[test]
    fn number_rules() {
        assert_eq!(synth_of(number().min(18.0)), json!(17));
        assert_eq!(synth_of(number().max(10.0)), json!(11));
        assert_eq!(synth_of(number().min(0.5)), json!(-0.5));
        assert_eq!(synth_of(number().int()), json!(1.5));
        assert_eq!(synth_of(number()), json!("not-a-number"));
        assert_eq!(synth_of(number().int().min(5.0)), json!(1.5));
    }

    #[test]
    fn boolean_and_other() {
        assert_eq!(synth_of(boolean()), json!("not-a-boolean"));
        assert_eq!(synth_of(other("refinement")), Value::Null);
    }

    #[test]
    fn enum_value_is_outside_the_set() {
        let value = synth_of(enumeration(["a", "b"]));
        assert_eq!(value, json!("__invalid_enum_value__"));

        let value = synth_of(enumeration(["__invalid_enum_value__", "__invalid_enum_value___"]));
        assert_eq!(value, json!("__invalid_enum_value____"));
    }

    #[test]
    fn array_wraps_one_synthesized_element() {
        assert_eq!(synth_of(array(string().email())), json!(["invalid-email"]));
        assert_eq!(synth_of(array(array(number().max(1.0)))), json!([[2]]));
    }

    #[test]
    fn object_takes_first_three_fields() {
        let schema = object()
            .field("a", string().email())
            .field("b", number().min(1.0))
            .field("c", boolean())
            .field("d", string())
            .field("e", string());
        assert_eq!(
            synth_of(schema),
            json!({"a": "invalid-email", "b": 0, "c": "not-a-boolean"})
        );
    }

    #[test]
    fn wrappers_synthesize_inner() {
        assert_eq!(synth_of(string().email().optional()), json!("invalid-email"));
        assert_eq!(synth_of(number().min(3.0).nullable()), json!(2));
    }

    #[test]
    fn union_gets_marker_object() {
        let value = synth_of(union([SchemaNode::from(string()), SchemaNode::from(number())]));
        assert_eq!(value, json!({"__invalid_union_member__": true}));
    }

    #[test]
    fn structural_errors_carry_path() {
        let schema: SchemaNode = object()
            .field("tags", array(enumeration(Vec::<String>::new())))
            .into();
        assert_eq!(
            synthesize(&schema).unwrap_err(),
            SchemaError::EmptyEnum {
                path: "tags.0".into()
            }
        );

        let schema: SchemaNode = object().field("n", number().max(f64::INFINITY)).into();
        assert!(matches!(
            synthesize(&schema),
            Err(SchemaError::NonFiniteBound { ref path, .. }) if path == "n"
        ));

        assert!(matches!(
            synthesize(&union(Vec::<SchemaNode>::new())),
            Err(SchemaError::EmptyUnion { .. })
        ));
    }

    /// Strategy producing arbitrary object schemas with distinct field names.
    fn object_schema() -> impl Strategy<Value = SchemaNode> {
        let leaf = prop_oneof![
            Just(SchemaNode::from(string().email())),
            (0usize..50).prop_map(|n| SchemaNode::from(string().max_length(n))),
            (-100i32..100).prop_map(|n| SchemaNode::from(number().min(f64::from(n)))),
            Just(boolean()),
            Just(enumeration(["x", "y"])),
        ];
        prop::collection::btree_map("[a-z]{1,8}", leaf, 0..10).prop_map(|fields| {
            SchemaNode::from(
                fields
                    .into_iter()
                    .fold(object(), |obj, (name, schema)| obj.field(name, schema)),
            )
        })
    }

    proptest! {
        /// `min = m` always synthesizes `m - 1`, reported as `too_small`.
        #[test]
        fn min_bound_yields_one_below(m in -1_000_000i64..1_000_000) {
            let schema = SchemaNode::from(object().field("n", number().min(m as f64)));
            prop_assert_eq!(synthesize(&schema).unwrap(), json!({"n": m - 1}));
            let examples = error_examples(&schema);
            prop_assert_eq!(examples.len(), 1);
            prop_assert_eq!(&examples[0].code, &IssueCode::TooSmall);
        }

        /// Any finite bound, however large, is violated by the synthesized value.
        #[test]
        fn any_finite_bound_is_violated(m in -1e300f64..1e300, upper in any::<bool>()) {
            let schema = SchemaNode::from(object().field(
                "n",
                if upper { number().max(m) } else { number().min(m) },
            ));
            let examples = error_examples(&schema);
            let expected = if upper { IssueCode::TooBig } else { IssueCode::TooSmall };
            prop_assert_eq!(&examples[0].code, &expected);
        }

        /// Objects keep at most the first three declared fields, in order.
        #[test]
        fn object_keys_are_a_declared_prefix(schema in object_schema()) {
            let SchemaNode::Object(obj) = &schema else { unreachable!() };
            let value = synthesize(&schema).unwrap();
            let map = value.as_object().unwrap();
            let expected: Vec<&str> = obj
                .fields
                .iter()
                .take(MAX_EXAMPLE_FIELDS)
                .map(|f| f.name.as_str())
                .collect();
            prop_assert!(map.len() <= MAX_EXAMPLE_FIELDS);
            prop_assert_eq!(map.len(), expected.len());
            for key in map.keys() {
                prop_assert!(expected.contains(&key.as_str()));
            }
        }

        /// Synthesis is deterministic.
        #[test]
        fn synthesis_is_deterministic(schema in object_schema()) {
            prop_assert_eq!(synthesize(&schema).unwrap(), synthesize(&schema).unwrap());
        }
    }
}
