// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn step(json: &str) -> Step {
    serde_json::from_str(json).expect("fixture should decode")
}

#[test]
fn accepts_pipeline_with_no_decision_steps() {
    let pipeline = vec![step(r#"{"name":"a","delete":{}}"#)];
    assert!(validate_jump_graph(&pipeline).is_ok());
}

#[test]
fn accepts_resolvable_non_cyclic_jump() {
    let pipeline = vec![
        step(
            r#"{"name":"route","decision":{
                "rules":[{"conditions":[],"action":"jump","jumpTarget":"b"}],
                "defaultAction":"continue"
            }}"#,
        ),
        step(r#"{"name":"b","delete":{}}"#),
    ];
    assert!(validate_jump_graph(&pipeline).is_ok());
}

#[test]
fn rejects_jump_to_unknown_step() {
    let pipeline = vec![step(
        r#"{"name":"route","decision":{
            "rules":[{"conditions":[],"action":"jump","jumpTarget":"missing"}],
            "defaultAction":"continue"
        }}"#,
    )];
    assert!(matches!(validate_jump_graph(&pipeline), Err(ConfigError::Condition(_))));
}

#[test]
fn rejects_cyclic_jump_between_two_decision_steps() {
    let pipeline = vec![
        step(
            r#"{"name":"a","decision":{
                "rules":[{"conditions":[],"action":"jump","jumpTarget":"b"}],
                "defaultAction":"continue"
            }}"#,
        ),
        step(
            r#"{"name":"b","decision":{
                "rules":[{"conditions":[],"action":"jump","jumpTarget":"a"}],
                "defaultAction":"continue"
            }}"#,
        ),
    ];
    assert!(matches!(validate_jump_graph(&pipeline), Err(ConfigError::Condition(_))));
}

#[test]
fn default_action_jump_counts_as_an_edge_too() {
    let pipeline = vec![step(
        r#"{"name":"a","decision":{
            "rules":[],
            "defaultAction":{"action":"jump","jumpTarget":"a"}
        }}"#,
    )];
    assert!(matches!(validate_jump_graph(&pipeline), Err(ConfigError::Condition(_))));
}
