// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn error_round_trips_through_json() {
    let response = Response::Error { message: "boom".to_string() };
    let encoded = serde_json::to_string(&response).expect("encode");
    let decoded: Response = serde_json::from_str(&encoded).expect("decode");
    match decoded {
        Response::Error { message } => assert_eq!(message, "boom"),
        other => panic!("expected Error, got {other:?}"),
    }
}

#[test]
fn applied_carries_disabled_task_reasons() {
    let response = Response::Applied {
        added: 1,
        removed: 0,
        updated: 0,
        unchanged: 2,
        disabled: vec![DisabledTask { id: "t1".to_string(), reason: "non-absolute path".to_string() }],
    };
    let encoded = serde_json::to_string(&response).expect("encode");
    let decoded: Response = serde_json::from_str(&encoded).expect("decode");
    match decoded {
        Response::Applied { added, disabled, .. } => {
            assert_eq!(added, 1);
            assert_eq!(disabled.len(), 1);
            assert_eq!(disabled[0].id, "t1");
        }
        other => panic!("expected Applied, got {other:?}"),
    }
}

#[test]
fn tasks_snapshot_round_trips() {
    let response = Response::TasksSnapshot {
        tasks: vec![TaskSnapshot {
            id: "ingest".to_string(),
            enabled: true,
            directory: "/in".to_string(),
            glob: "*.pdf".to_string(),
            max_concurrent: 4,
            status: "idle".to_string(),
            not_started_reason: None,
            processed: 10,
            errors: 0,
            active_executions: 0,
        }],
    };
    let encoded = serde_json::to_string(&response).expect("encode");
    let decoded: Response = serde_json::from_str(&encoded).expect("decode");
    match decoded {
        Response::TasksSnapshot { tasks } => assert_eq!(tasks[0].id, "ingest"),
        other => panic!("expected TasksSnapshot, got {other:?}"),
    }
}
