// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cronplus_config::{Variable, VariableType};
use cronplus_core::TaskId;

#[test]
fn builtins_are_derived_from_the_file_path() {
    let ctx = ExecutionContext::new(TaskId::new("t1"), PathBuf::from("/in/reports/a.pdf"), &[], 1_700_000_000_000).unwrap();
    assert_eq!(ctx.variables.get("fileName").unwrap(), "a.pdf");
    assert_eq!(ctx.variables.get("fileExt").unwrap(), "pdf");
    assert_eq!(ctx.variables.get("fileNameWithoutExt").unwrap(), "a");
    assert_eq!(ctx.variables.get("fileDir").unwrap(), "/in/reports");
    assert_eq!(ctx.variables.get("taskId").unwrap(), "t1");
}

#[test]
fn int_and_bool_variables_parse_into_their_type() {
    let variables = vec![
        Variable { name: "count".to_string(), var_type: VariableType::Int, value: "7".to_string() },
        Variable { name: "flag".to_string(), var_type: VariableType::Bool, value: "true".to_string() },
    ];
    let ctx = ExecutionContext::new(TaskId::new("t1"), PathBuf::from("/in/a.pdf"), &variables, 0).unwrap();
    assert_eq!(ctx.variables.get("count").unwrap(), &Value::from(7));
    assert_eq!(ctx.variables.get("flag").unwrap(), &Value::from(true));
}

#[test]
fn invalid_int_variable_is_rejected() {
    let variables = vec![Variable { name: "count".to_string(), var_type: VariableType::Int, value: "not-a-number".to_string() }];
    let result = ExecutionContext::new(TaskId::new("t1"), PathBuf::from("/in/a.pdf"), &variables, 0);
    assert!(matches!(result, Err(EngineError::InvalidVariable { .. })));
}

#[test]
fn merge_outputs_overwrites_existing_keys() {
    let mut ctx = ExecutionContext::new(TaskId::new("t1"), PathBuf::from("/in/a.pdf"), &[], 0).unwrap();
    let mut outputs = HashMap::new();
    outputs.insert("fileName".to_string(), Value::String("renamed.pdf".to_string()));
    ctx.merge_outputs(outputs);
    assert_eq!(ctx.variables.get("fileName").unwrap(), "renamed.pdf");
}

#[test]
fn field_source_resolves_nested_and_indexed_paths() {
    let mut ctx = ExecutionContext::new(TaskId::new("t1"), PathBuf::from("/in/a.pdf"), &[], 0).unwrap();
    ctx.variables.insert("user".to_string(), serde_json::json!({"email": "a@example.com"}));
    ctx.variables.insert("items".to_string(), serde_json::json!(["x", "y"]));
    assert_eq!(ctx.resolve("user.email"), FieldValue::String("a@example.com".to_string()));
    assert_eq!(ctx.resolve("items[1]"), FieldValue::String("y".to_string()));
}

#[test]
fn field_source_returns_null_for_missing_fields() {
    let ctx = ExecutionContext::new(TaskId::new("t1"), PathBuf::from("/in/a.pdf"), &[], 0).unwrap();
    assert_eq!(ctx.resolve("doesNotExist"), FieldValue::Null);
}

#[test]
fn field_source_resolves_file_size_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    std::fs::write(&path, b"hello").unwrap();
    let ctx = ExecutionContext::new(TaskId::new("t1"), path, &[], 0).unwrap();
    assert_eq!(ctx.resolve("fileSize"), FieldValue::Number(5.0));
}

#[test]
fn field_source_resolves_lowercase_filename_alias() {
    let ctx = ExecutionContext::new(TaskId::new("t1"), PathBuf::from("/in/reports/a.pdf"), &[], 0).unwrap();
    assert_eq!(ctx.resolve("filename"), FieldValue::String("a.pdf".to_string()));
}
