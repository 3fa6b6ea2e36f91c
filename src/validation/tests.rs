use super::payload::{self, Context};
use super::*;
use crate::config::ValidationConfig;
use serde_json::json;

#[test]
fn test_field_path_display() {
    assert_eq!(FieldPath::root().to_string(), "<root>");

    let path = FieldPath::root()
        .field("processes")
        .index(2)
        .field("info")
        .index(0)
        .field("data");
    assert_eq!(path.to_string(), "processes[2].info[0].data");
    assert_eq!(path.segments().len(), 5);
    assert!(!path.is_root());

    let indexed_root = FieldPath::root().index(3).field("lhs");
    assert_eq!(indexed_root.to_string(), "[3].lhs");
}

#[test]
fn test_errors_serialize_as_list() {
    let errors = ValidationErrors::from_vec(vec![ValidationError::new(
        FieldPath::root().field("charge"),
        ErrorKind::Composition,
        "bad charge",
    )])
    .unwrap();

    let value = serde_json::to_value(&errors).unwrap();
    assert_eq!(
        value,
        json!([{ "path": "charge", "kind": "CompositionError", "message": "bad charge" }])
    );
    assert!(ValidationErrors::from_vec(Vec::new()).is_none());
}

#[test]
fn test_context_collects_all_missing_fields() {
    let config = ValidationConfig::default();
    let mut ctx = Context::new(&config);
    let value = json!({ "name": "", "count": "three" });
    let root = FieldPath::root();
    let map = payload::object(&value, &root, &mut ctx).unwrap();

    let name = payload::required_non_empty(map, "name", &root, &mut ctx);
    let count = payload::required_number(map, "count", &root, &mut ctx);
    let flag = payload::required_bool(map, "flag", &root, &mut ctx);
    assert!(name.is_none() && count.is_none() && flag.is_none());

    let errors = ctx.finish::<()>(None).unwrap_err();
    let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
    assert_eq!(paths, vec!["name", "count", "flag"]);
    assert!(errors.iter().all(|e| e.kind == ErrorKind::Structural));
}

#[test]
fn test_rollback_discards_trial_errors() {
    let config = ValidationConfig::default();
    let mut ctx = Context::new(&config);
    let root = FieldPath::root();

    let mark = ctx.error_count();
    assert!(payload::boolean(&json!(1), &root, &mut ctx).is_none());
    assert_eq!(ctx.error_count(), 1);
    ctx.rollback(mark);
    assert_eq!(ctx.error_count(), 0);

    assert_eq!(ctx.finish(Some(7)).unwrap(), 7);
}

#[test]
fn test_integer_accepts_integral_floats() {
    let config = ValidationConfig::default();
    let mut ctx = Context::new(&config);
    let root = FieldPath::root();

    assert_eq!(payload::integer(&json!(4.0), &root, &mut ctx), Some(4));
    assert_eq!(payload::integer(&json!(-2), &root, &mut ctx), Some(-2));
    assert_eq!(payload::integer(&json!(1.5), &root, &mut ctx), None);
    assert_eq!(payload::unsigned(&json!(-1), &root, ErrorKind::QuantumNumber, &mut ctx), None);

    let errors = ctx.finish::<()>(None).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors.as_slice()[0].message, "expected integer, found 1.5");
    assert_eq!(errors.as_slice()[1].kind, ErrorKind::QuantumNumber);
}
