// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The first-order condition language used by `decision` rules and
//! `condition` steps (spec §4.3, §4.9, design note "keep it first-order").
//!
//! A condition is `field op literal` — never a free-form expression. Field
//! resolution is delegated to a [`FieldSource`] (the execution context);
//! everything here is a pure function of `(conditions, logic, source)`.

use crate::error::ConditionError;
use crate::value::{FieldSource, FieldValue};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// How a rule's ordered conditions combine into one boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Logic {
    And,
    Or,
    Xor,
}

/// A single field comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    /// Literal operand. Absent for `isTrue`/`isFalse`/`exists`/`notExists`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
    /// Second operand, only meaningful for `between`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_high: Option<FieldValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    Contains,
    StartsWith,
    EndsWith,
    Matches,
    In,
    NotIn,
    Between,
    IsTrue,
    IsFalse,
    Exists,
    NotExists,
}

impl Condition {
    /// Structural validation independent of any execution context: do the
    /// operand shapes match what the operator requires?
    pub fn validate(&self) -> Result<(), ConditionError> {
        use Operator::*;
        match self.operator {
            IsTrue | IsFalse | Exists | NotExists => Ok(()),
            Matches => match &self.value {
                Some(FieldValue::String(pattern)) => Regex::new(pattern)
                    .map(|_| ())
                    .map_err(|e| ConditionError::InvalidRegex {
                        field: self.field.clone(),
                        source: e.to_string(),
                    }),
                _ => Err(ConditionError::MissingValue {
                    field: self.field.clone(),
                    operator: format!("{:?}", self.operator),
                }),
            },
            In | NotIn => match &self.value {
                Some(FieldValue::List(_)) => Ok(()),
                _ => Err(ConditionError::ExpectedList {
                    field: self.field.clone(),
                    operator: format!("{:?}", self.operator),
                }),
            },
            Between => {
                if self.value.is_some() && self.value_high.is_some() {
                    Ok(())
                } else {
                    Err(ConditionError::ExpectedRange {
                        field: self.field.clone(),
                        operator: format!("{:?}", self.operator),
                    })
                }
            }
            _ => {
                if self.value.is_some() {
                    Ok(())
                } else {
                    Err(ConditionError::MissingValue {
                        field: self.field.clone(),
                        operator: format!("{:?}", self.operator),
                    })
                }
            }
        }
    }

    /// Evaluate this single condition against a field source. Unresolvable
    /// comparisons (type mismatch, missing regex) evaluate to `false` rather
    /// than erroring — `validate()` is what catches configuration mistakes;
    /// evaluation happens after interpolation, every execution, and must not
    /// itself fail the step.
    pub fn evaluate(&self, source: &dyn FieldSource) -> bool {
        let resolved = source.resolve(&self.field);
        match self.operator {
            Operator::Exists => !resolved.is_missing(),
            Operator::NotExists => resolved.is_missing(),
            Operator::IsTrue => resolved.as_bool() == Some(true),
            Operator::IsFalse => resolved.as_bool() == Some(false),
            Operator::Equals => self.value.as_ref().is_some_and(|v| values_equal(&resolved, v)),
            Operator::NotEquals => {
                self.value.as_ref().is_some_and(|v| !values_equal(&resolved, v))
            }
            Operator::GreaterThan => compare_numeric(&resolved, &self.value, |a, b| a > b),
            Operator::GreaterOrEqual => compare_numeric(&resolved, &self.value, |a, b| a >= b),
            Operator::LessThan => compare_numeric(&resolved, &self.value, |a, b| a < b),
            Operator::LessOrEqual => compare_numeric(&resolved, &self.value, |a, b| a <= b),
            Operator::Contains => string_op(&resolved, &self.value, |a, b| a.contains(b)),
            Operator::StartsWith => string_op(&resolved, &self.value, |a, b| a.starts_with(b)),
            Operator::EndsWith => string_op(&resolved, &self.value, |a, b| a.ends_with(b)),
            Operator::Matches => match (resolved.as_str(), self.value.as_ref().and_then(|v| v.as_str())) {
                (Some(text), Some(pattern)) => Regex::new(pattern).map(|re| re.is_match(text)).unwrap_or(false),
                _ => false,
            },
            Operator::In => match &self.value {
                Some(FieldValue::List(items)) => items.iter().any(|item| values_equal(&resolved, item)),
                _ => false,
            },
            Operator::NotIn => match &self.value {
                Some(FieldValue::List(items)) => !items.iter().any(|item| values_equal(&resolved, item)),
                _ => true,
            },
            Operator::Between => match (resolved.as_f64(), self.value.as_ref().and_then(|v| v.as_f64()), self.value_high.as_ref().and_then(|v| v.as_f64())) {
                (Some(x), Some(lo), Some(hi)) => x >= lo && x <= hi,
                _ => false,
            },
        }
    }
}

fn values_equal(a: &FieldValue, b: &FieldValue) -> bool {
    match (a, b) {
        (FieldValue::Number(x), FieldValue::Number(y)) => (x - y).abs() < f64::EPSILON,
        (FieldValue::TimestampMs(x), FieldValue::TimestampMs(y)) => x == y,
        _ => a == b,
    }
}

fn compare_numeric(resolved: &FieldValue, operand: &Option<FieldValue>, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (resolved.as_f64(), operand.as_ref().and_then(|v| v.as_f64())) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

fn string_op(resolved: &FieldValue, operand: &Option<FieldValue>, op: impl Fn(&str, &str) -> bool) -> bool {
    match (resolved.as_str(), operand.as_ref().and_then(|v| v.as_str())) {
        (Some(a), Some(b)) => op(a, b),
        _ => false,
    }
}

/// Evaluate an ordered set of conditions combined by `logic`. An empty
/// condition list evaluates to `true` (a rule with no conditions always
/// matches; validation rejects empty lists before this is ever reached in
/// a decision rule, but a bare `condition` step may legitimately have one).
pub fn evaluate_all(conditions: &[Condition], logic: Logic, source: &dyn FieldSource) -> bool {
    if conditions.is_empty() {
        return true;
    }
    match logic {
        Logic::And => conditions.iter().all(|c| c.evaluate(source)),
        Logic::Or => conditions.iter().any(|c| c.evaluate(source)),
        Logic::Xor => conditions.iter().filter(|c| c.evaluate(source)).count() % 2 == 1,
    }
}

#[cfg(test)]
#[path = "condition_tests.rs"]
mod tests;
