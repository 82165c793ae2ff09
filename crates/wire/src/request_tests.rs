// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn ping_round_trips_through_json() {
    let encoded = serde_json::to_string(&Request::Ping).expect("encode");
    let decoded: Request = serde_json::from_str(&encoded).expect("decode");
    assert!(matches!(decoded, Request::Ping));
}

#[test]
fn tag_field_identifies_the_variant() {
    let encoded = serde_json::to_value(&Request::GetConfig).expect("encode");
    assert_eq!(encoded["type"], "GetConfig");
}

#[test]
fn apply_config_carries_a_full_config_document() {
    let config = Config {
        version: 1,
        logging: cronplus_config::LoggingConfig::default(),
        runtime: cronplus_config::RuntimeConfig::default(),
        metrics: cronplus_config::MetricsConfig::default(),
        tasks: Vec::new(),
    };
    let request = Request::ApplyConfig { config: Box::new(config) };
    let encoded = serde_json::to_string(&request).expect("encode");
    let decoded: Request = serde_json::from_str(&encoded).expect("decode");
    match decoded {
        Request::ApplyConfig { config } => assert_eq!(config.version, 1),
        other => panic!("expected ApplyConfig, got {other:?}"),
    }
}
