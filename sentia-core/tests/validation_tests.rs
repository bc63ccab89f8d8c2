//! Schema and property tests for the message gate and topology queries

use proptest::prelude::*;
use sentia_core::{DistributionRegistry, MessageKind, MessageValidator, SentiaError};
use serde_json::{json, Value};

fn violations_of(kind: MessageKind, payload: &Value) -> Vec<String> {
    match MessageValidator::validate(kind, payload) {
        Ok(()) => Vec::new(),
        Err(SentiaError::Validation { violations }) => violations,
        Err(other) => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_api_request_shape() {
    let payload = json!({
        "method": "GET",
        "endpoint": "/validators/active",
        "timestamp": 1_700_000_000_000u64
    });
    assert!(MessageValidator::validate(MessageKind::ApiRequest, &payload).is_ok());

    let bad = json!({
        "method": "FETCH",
        "endpoint": "validators",
        "timestamp": 1_700_000_000_000u64
    });
    let violations = violations_of(MessageKind::ApiRequest, &bad);
    assert_eq!(violations.len(), 2);
    assert!(violations.iter().any(|v| v.contains("method")));
    assert!(violations.iter().any(|v| v.contains("endpoint")));
}

#[test]
fn test_websocket_message_shape() {
    let payload = json!({ "event": "subscribe", "channel": "blocks" });
    assert!(MessageValidator::validate(MessageKind::WebSocketMessage, &payload).is_ok());

    let bad = json!({ "event": "yell", "channel": "" });
    let violations = violations_of(MessageKind::WebSocketMessage, &bad);
    assert_eq!(violations.len(), 2);
}

#[test]
fn test_single_violation_is_reported_alone() {
    let mut payload = json!({
        "from": format!("0x{}", "1".repeat(40)),
        "to": format!("0x{}", "2".repeat(40)),
        "amount": 100,
        "fee": 1,
        "nonce": "a".repeat(24),
        "signature": "b".repeat(128),
    });
    assert!(MessageValidator::validate(MessageKind::Transaction, &payload).is_ok());

    payload["signature"] = json!("b".repeat(127));
    let violations = violations_of(MessageKind::Transaction, &payload);
    assert_eq!(violations.len(), 1);
    assert!(violations[0].contains("signature"));
}

proptest! {
    /// Any transaction built within the declared formats and bounds clears
    /// the gate.
    #[test]
    fn prop_well_formed_transactions_accepted(
        from in "0x[0-9a-f]{40}",
        to in "0x[0-9a-f]{40}",
        amount in 0.01f64..=1_000_000.0,
        fee in 0.01f64..=1000.0,
        nonce in "[0-9a-f]{24}",
        signature in "[0-9a-f]{128}",
    ) {
        let payload = json!({
            "from": from,
            "to": to,
            "amount": amount,
            "fee": fee,
            "nonce": nonce,
            "signature": signature,
        });

        prop_assert!(MessageValidator::validate(MessageKind::Transaction, &payload).is_ok());
    }

    /// Oversized amounts are always rejected and the violation names the
    /// offending field.
    #[test]
    fn prop_oversized_amounts_rejected(
        amount in 1_000_001.0f64..100_000_000.0,
    ) {
        let payload = json!({
            "from": format!("0x{}", "1".repeat(40)),
            "to": format!("0x{}", "2".repeat(40)),
            "amount": amount,
            "fee": 1,
            "nonce": "a".repeat(24),
            "signature": "b".repeat(128),
        });

        let violations = violations_of(MessageKind::Transaction, &payload);
        prop_assert!(violations.iter().any(|v| v.contains("amount")));
    }

    /// Random garbage never panics the gate, for any message kind.
    #[test]
    fn prop_validation_never_panics(
        kind in prop_oneof![
            Just(MessageKind::ValidatorRegistration),
            Just(MessageKind::Transaction),
            Just(MessageKind::BiometricUpdate),
            Just(MessageKind::BlockProposal),
            Just(MessageKind::NetworkMessage),
            Just(MessageKind::ConsensusVote),
            Just(MessageKind::ApiRequest),
            Just(MessageKind::WebSocketMessage),
            Just(MessageKind::TerminalCommand),
            Just(MessageKind::ConfigUpdate),
        ],
        field in "[a-zA-Z]{1,12}",
        content in ".*",
    ) {
        let mut object = serde_json::Map::new();
        object.insert(field, Value::String(content));
        let payload = Value::Object(object);

        // Must reject or accept, never panic.
        let _ = MessageValidator::validate(kind, &payload);
    }

    /// Distance queries are symmetric over every pair of seed validators.
    #[test]
    fn prop_distance_symmetry(a in 0usize..21, b in 0usize..21) {
        let registry = DistributionRegistry::new();
        let locations = registry.get_all_validator_locations();
        let id_a = locations[a].validator_id.as_str();
        let id_b = locations[b].validator_id.as_str();

        let ab = registry.get_validator_distance(id_a, id_b).unwrap();
        let ba = registry.get_validator_distance(id_b, id_a).unwrap();

        prop_assert!((ab - ba).abs() < 1e-9);
    }
}
