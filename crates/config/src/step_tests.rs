// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn parse(json: &str) -> Result<Step, serde_json::Error> {
    serde_json::from_str(json)
}

#[test]
fn infers_copy_from_sub_object() {
    let step = parse(r#"{"copy":{"destination":"/out"}}"#).expect("should decode");
    assert!(matches!(step.kind, StepKind::Copy(_)));
    assert_eq!(step.kind.type_name(), "copy");
    assert!(step.enabled, "enabled defaults to true");
}

#[test]
fn infers_move_from_sub_object_key() {
    let step = parse(r#"{"move":{"destination":"/out"}}"#).expect("should decode");
    assert!(matches!(step.kind, StepKind::Move(_)));
}

#[test]
fn explicit_type_selects_matching_payload() {
    let step = parse(r#"{"type":"archive","archive":{"destination":"/out","format":"zip"}}"#)
        .expect("should decode");
    assert!(matches!(step.kind, StepKind::Archive(_)));
}

#[test]
fn explicit_type_mismatching_payload_is_rejected() {
    let err = parse(r#"{"type":"delete","copy":{"destination":"/out"}}"#).unwrap_err();
    assert!(err.to_string().contains("delete"));
}

#[test]
fn no_payload_is_rejected() {
    let err = parse(r#"{"enabled":true}"#).unwrap_err();
    assert!(err.to_string().contains("no recognizable payload"));
}

#[test]
fn two_payloads_without_explicit_type_is_ambiguous() {
    let err = parse(r#"{"copy":{"destination":"/a"},"delete":{}}"#).unwrap_err();
    assert!(err.to_string().contains("ambiguous"));
}

#[test]
fn common_fields_are_parsed() {
    let step: Step = parse(
        r#"{"name":"copy-in","timeoutSeconds":30,"retry":{"maxAttempts":2},
            "copy":{"destination":"/out"}}"#,
    )
    .expect("should decode");
    assert_eq!(step.name.as_deref(), Some("copy-in"));
    assert_eq!(step.timeout_seconds, Some(30));
    assert_eq!(step.retry.expect("retry present").max_attempts, 2);
}

#[test]
fn condition_gate_has_no_jump_variant() {
    let step: Step = parse(
        r#"{"condition":{"conditions":[],"onTrue":"continue","onFalse":"skip"},
            "delete":{}}"#,
    )
    .expect("should decode");
    let gate = step.condition.expect("gate present");
    assert!(matches!(gate.on_false, BranchAction::Skip));
}

#[parameterized(
    too_low = { 0 },
    too_high = { 3601 },
)]
fn validate_rejects_out_of_range_timeout(timeout: u32) {
    let step = Step {
        name: None,
        enabled: true,
        timeout_seconds: Some(timeout),
        retry: None,
        condition: None,
        kind: StepKind::Delete(DeleteStep::default()),
    };
    assert!(step.validate().is_err());
}

#[test]
fn validate_rejects_relative_copy_destination() {
    let step = Step {
        name: None,
        enabled: true,
        timeout_seconds: None,
        retry: None,
        condition: None,
        kind: StepKind::Copy(CopyStep {
            destination: "relative/path".into(),
            overwrite: false,
            create_directories: false,
            preserve_timestamps: false,
            verify_checksum: false,
            atomic_move: false,
            rename_pattern: None,
        }),
    };
    assert!(step.validate().is_err());
}

#[test]
fn validate_accepts_interpolated_destination() {
    let step = Step {
        name: None,
        enabled: true,
        timeout_seconds: None,
        retry: None,
        condition: None,
        kind: StepKind::Copy(CopyStep {
            destination: "${outputDir}/file".into(),
            overwrite: false,
            create_directories: false,
            preserve_timestamps: false,
            verify_checksum: false,
            atomic_move: false,
            rename_pattern: None,
        }),
    };
    assert!(step.validate().is_ok());
}

#[test]
fn validate_rejects_empty_decision_rules() {
    let step = Step {
        name: None,
        enabled: true,
        timeout_seconds: None,
        retry: None,
        condition: None,
        kind: StepKind::Decision(DecisionStep { rules: vec![], default_action: DecisionAction::Continue }),
    };
    assert!(step.validate().is_err());
}

#[test]
fn decision_rule_action_tag_round_trips() {
    let rule = DecisionRule {
        conditions: vec![],
        logic: Logic::And,
        action: DecisionAction::Jump { jump_target: "cleanup".into() },
        set_variable: None,
    };
    let json = serde_json::to_value(&rule).expect("serialize");
    assert_eq!(json["action"], "jump");
    assert_eq!(json["jumpTarget"], "cleanup");
}
