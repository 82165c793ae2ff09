// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn display_formats_list() {
    let v = FieldValue::List(vec![FieldValue::Number(1.0), FieldValue::String("a".into())]);
    assert_eq!(v.to_string(), "[1, a]");
}

#[test]
fn as_f64_reads_timestamp_as_millis() {
    assert_eq!(FieldValue::TimestampMs(42).as_f64(), Some(42.0));
}

#[test]
fn is_missing_true_only_for_null() {
    assert!(FieldValue::Null.is_missing());
    assert!(!FieldValue::Bool(false).is_missing());
}

#[test]
fn from_conversions() {
    assert_eq!(FieldValue::from("x"), FieldValue::String("x".into()));
    assert_eq!(FieldValue::from(3.0), FieldValue::Number(3.0));
    assert_eq!(FieldValue::from(true), FieldValue::Bool(true));
}
