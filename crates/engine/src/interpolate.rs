// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Variable Interpolator (spec §4.4): expands `${name}` / `{builtin}`
//! placeholders, `${env:NAME}`, and `fn:`-prefixed functions in step
//! fields prior to execution.

use crate::context::{walk_json_path, ExecutionContext};
use rand::Rng;
use serde_json::Value;
use std::collections::HashMap;

const BUILTIN_NAMES: &[&str] = &[
    "fileName",
    "fileNameWithoutExt",
    "fileExt",
    "fileDir",
    "filePath",
    "taskId",
    "date",
    "time",
    "datetime",
    "timestamp",
];

/// Expands every `${...}`/`{...}` placeholder in `input` against `ctx`.
/// Unknown placeholders are left verbatim with a logged warning (spec
/// edge case), never fail the call.
pub fn interpolate_str(input: &str, ctx: &ExecutionContext) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix("${") {
            if let Some(end) = tail.find('}') {
                let inner = &tail[..end];
                out.push_str(&expand_dollar(inner, ctx));
                rest = &tail[end + 1..];
                continue;
            }
        } else if let Some(tail) = rest.strip_prefix('{') {
            if let Some(end) = tail.find('}') {
                let inner = &tail[..end];
                if BUILTIN_NAMES.contains(&inner) {
                    out.push_str(&expand_variable(inner, ctx).unwrap_or_else(|| {
                        tracing::warn!(placeholder = inner, "unknown builtin placeholder");
                        format!("{{{inner}}}")
                    }));
                    rest = &tail[end + 1..];
                    continue;
                }
            }
        }
        let mut chars = rest.chars();
        let Some(c) = chars.next() else { break };
        out.push(c);
        rest = chars.as_str();
    }
    out
}

/// Interpolates every value of a string map (spec: "applied to ...
/// `map<string,string>` ... fields").
pub fn interpolate_map(input: &HashMap<String, String>, ctx: &ExecutionContext) -> HashMap<String, String> {
    input.iter().map(|(k, v)| (k.clone(), interpolate_str(v, ctx))).collect()
}

/// Interpolates every element of a string list.
pub fn interpolate_list(input: &[String], ctx: &ExecutionContext) -> Vec<String> {
    input.iter().map(|v| interpolate_str(v, ctx)).collect()
}

fn expand_dollar(inner: &str, ctx: &ExecutionContext) -> String {
    if let Some(name) = inner.strip_prefix("env:") {
        return std::env::var(name).unwrap_or_default();
    }
    if let Some(call) = inner.strip_prefix("fn:") {
        return call_function(call, ctx).unwrap_or_else(|| {
            tracing::warn!(placeholder = inner, "unknown interpolation function");
            format!("${{{inner}}}")
        });
    }
    expand_variable(inner, ctx).unwrap_or_else(|| {
        tracing::warn!(placeholder = inner, "unresolved variable placeholder");
        format!("${{{inner}}}")
    })
}

fn expand_variable(path: &str, ctx: &ExecutionContext) -> Option<String> {
    let root = Value::Object(ctx.variables.clone().into_iter().collect());
    walk_json_path(&root, path).map(|v| value_to_display(&v))
}

fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_to_display).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

fn call_function(call: &str, ctx: &ExecutionContext) -> Option<String> {
    let mut parts = call.splitn(2, ':');
    let name = parts.next()?;
    let args = parts.next().unwrap_or("");
    let now = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(ctx.started_at_ms as i64)
        .unwrap_or_else(chrono::Utc::now);

    match name {
        "now" => Some(if args.is_empty() { now.to_rfc3339() } else { now.format(args).to_string() }),
        "date" => Some(if args.is_empty() { now.format("%Y-%m-%d").to_string() } else { now.format(args).to_string() }),
        "time" => Some(if args.is_empty() { now.format("%H:%M:%S").to_string() } else { now.format(args).to_string() }),
        "guid" => Some(nanoid::nanoid!()),
        "random" => Some(random_number(args).to_string()),
        "upper" => expand_variable(args, ctx).map(|v| v.to_uppercase()),
        "lower" => expand_variable(args, ctx).map(|v| v.to_lowercase()),
        "trim" => expand_variable(args, ctx).map(|v| v.trim().to_string()),
        "length" => expand_variable(args, ctx).map(|v| v.chars().count().to_string()),
        "substring" => substring_fn(args, ctx),
        "replace" => replace_fn(args, ctx),
        "join" => join_fn(args, ctx),
        "split" => split_fn(args, ctx),
        _ => None,
    }
}

fn random_number(args: &str) -> i64 {
    let parts: Vec<&str> = args.split(',').filter(|s| !s.is_empty()).collect();
    let (min, max) = match parts.as_slice() {
        [max] => (0, max.parse().unwrap_or(100)),
        [min, max] => (min.parse().unwrap_or(0), max.parse().unwrap_or(100)),
        _ => (0, 100),
    };
    if min >= max {
        return min;
    }
    rand::thread_rng().gen_range(min..=max)
}

fn substring_fn(args: &str, ctx: &ExecutionContext) -> Option<String> {
    let parts: Vec<&str> = args.split(',').collect();
    let (var, start, len) = match parts.as_slice() {
        [var, start] => (*var, start.parse::<usize>().ok()?, None),
        [var, start, len] => (*var, start.parse::<usize>().ok()?, len.parse::<usize>().ok()),
        _ => return None,
    };
    let value = expand_variable(var, ctx)?;
    let chars: Vec<char> = value.chars().collect();
    if start > chars.len() {
        return Some(String::new());
    }
    let end = len.map(|l| (start + l).min(chars.len())).unwrap_or(chars.len());
    Some(chars[start..end].iter().collect())
}

fn replace_fn(args: &str, ctx: &ExecutionContext) -> Option<String> {
    let parts: Vec<&str> = args.splitn(3, ',').collect();
    let [var, old, new] = parts.as_slice() else { return None };
    let value = expand_variable(var, ctx)?;
    Some(value.replace(old, new))
}

fn join_fn(args: &str, ctx: &ExecutionContext) -> Option<String> {
    let mut parts = args.splitn(2, ',');
    let sep = parts.next()?;
    let rest = parts.next().unwrap_or("");
    let items: Vec<String> = rest
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|item| expand_variable(item, ctx).unwrap_or_else(|| item.to_string()))
        .collect();
    Some(items.join(sep))
}

fn split_fn(args: &str, ctx: &ExecutionContext) -> Option<String> {
    let mut parts = args.splitn(2, ',');
    let var = parts.next()?;
    let sep = parts.next().unwrap_or(",");
    let value = expand_variable(var, ctx)?;
    Some(value.split(sep).collect::<Vec<_>>().join(","))
}

#[cfg(test)]
#[path = "interpolate_tests.rs"]
mod tests;
