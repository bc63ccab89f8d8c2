//! Message validation gate for untrusted inbound payloads
//!
//! Every payload entering the system is checked against the closed set of
//! declared message shapes before any other component acts on it; nothing
//! reaches the consent registry or the reward calculator without passing
//! through here first. Validation enumerates every violated constraint, not
//! just the first one found.

use crate::{Result, SentiaError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message types accepted on the network wire
const NETWORK_MESSAGE_TYPES: &[&str] = &[
    "block_proposal",
    "block_vote",
    "transaction_broadcast",
    "validator_announcement",
    "consensus_message",
    "biometric_update",
];

/// Biometric device types a validator may register with
const DEVICE_TYPES: &[&str] = &["heartRate", "focus", "stress"];

/// Choices accepted in a consensus vote
const VOTE_CHOICES: &[&str] = &["approve", "reject", "abstain"];

/// HTTP methods accepted on the API surface
const API_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE"];

/// Events accepted over the websocket surface
const WEBSOCKET_EVENTS: &[&str] = &["subscribe", "unsubscribe", "ping", "broadcast"];

/// Commands accepted from the terminal surface
const TERMINAL_COMMANDS: &[&str] = &[
    "status",
    "mine",
    "wallet",
    "network",
    "history",
    "validators",
    "help",
    "clear",
];

/// Configuration sections that may be updated at runtime
const CONFIG_SECTIONS: &[&str] = &["consensus", "network", "biometric", "security", "database"];

/// Largest transferable amount accepted by the gate
const MAX_AMOUNT: f64 = 1_000_000.0;

/// Largest transaction fee accepted by the gate
const MAX_FEE: f64 = 1000.0;

/// Maximum transaction hashes referenced by one block proposal
const MAX_PROPOSAL_TRANSACTIONS: usize = 1000;

/// Bounds on consensus participants carried in a proposal
const MIN_CONSENSUS_VALIDATORS: usize = 1;
const MAX_CONSENSUS_VALIDATORS: usize = 10_000;

/// Maximum arguments accepted for one terminal command
const MAX_COMMAND_ARGS: usize = 10;

/// Closed set of message kinds the gate understands
///
/// Adding a kind here forces every match below to handle it; there is no
/// fallback schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKind {
    /// A validator joining the network with its biometric device
    ValidatorRegistration,

    /// A token transfer between addresses
    Transaction,

    /// A fresh biometric reading from a registered device
    BiometricUpdate,

    /// A proposed block with its consensus evidence
    BlockProposal,

    /// A typed peer-to-peer envelope
    NetworkMessage,

    /// A vote on a proposed block
    ConsensusVote,

    /// A request arriving over the HTTP API surface
    ApiRequest,

    /// A frame arriving over the websocket surface
    WebSocketMessage,

    /// A command issued from the operator terminal
    TerminalCommand,

    /// A runtime configuration change
    ConfigUpdate,
}

/// Stateless validator interpreting each kind's declared rule set
pub struct MessageValidator;

impl MessageValidator {
    /// Validate a payload against the schema declared for `kind`
    ///
    /// Returns `Ok(())` only when every declared constraint holds; otherwise
    /// fails with [`SentiaError::Validation`] listing all violated
    /// constraints.
    pub fn validate(kind: MessageKind, payload: &Value) -> Result<()> {
        let mut violations = Vec::new();

        if payload.is_object() {
            match kind {
                MessageKind::ValidatorRegistration => {
                    check_validator_registration(payload, &mut violations);
                }
                MessageKind::Transaction => check_transaction(payload, &mut violations),
                MessageKind::BiometricUpdate => check_biometric_update(payload, &mut violations),
                MessageKind::BlockProposal => check_block_proposal(payload, &mut violations),
                MessageKind::NetworkMessage => check_network_message(payload, &mut violations),
                MessageKind::ConsensusVote => check_consensus_vote(payload, &mut violations),
                MessageKind::ApiRequest => check_api_request(payload, &mut violations),
                MessageKind::WebSocketMessage => check_websocket_message(payload, &mut violations),
                MessageKind::TerminalCommand => check_terminal_command(payload, &mut violations),
                MessageKind::ConfigUpdate => check_config_update(payload, &mut violations),
            }
        } else {
            violations.push("payload must be a JSON object".to_string());
        }

        if violations.is_empty() {
            Ok(())
        } else {
            tracing::debug!(?kind, count = violations.len(), "payload rejected");
            Err(SentiaError::validation(violations))
        }
    }
}

fn check_validator_registration(payload: &Value, violations: &mut Vec<String>) {
    check_address(payload, "address", violations);
    check_hex_material(payload, "publicKey", 66, violations);
    check_positive_number_max(payload, "stake", MAX_AMOUNT, violations);
    check_hex_material(payload, "biometricHash", 64, violations);
    check_hex_material(payload, "deviceSignature", 128, violations);

    match payload.get("metadata") {
        Some(metadata) if metadata.is_object() => {
            check_enum_value(metadata, "deviceType", DEVICE_TYPES, violations);
        }
        Some(_) => violations.push("metadata must be an object".to_string()),
        None => violations.push("missing required field: metadata".to_string()),
    }
}

fn check_transaction(payload: &Value, violations: &mut Vec<String>) {
    check_address(payload, "from", violations);
    check_address(payload, "to", violations);
    check_positive_number_max(payload, "amount", MAX_AMOUNT, violations);
    check_positive_number_max(payload, "fee", MAX_FEE, violations);
    check_hex_material(payload, "nonce", 24, violations);
    check_hex_material(payload, "signature", 128, violations);

    // biometricProof is optional, but when present it must carry a valid
    // authenticity percentage.
    match payload.get("biometricProof") {
        Some(proof) if proof.is_object() => {
            check_number_range(proof, "authenticity", 0.0, 100.0, violations);
        }
        Some(_) => violations.push("biometricProof must be an object".to_string()),
        None => {}
    }
}

fn check_biometric_update(payload: &Value, violations: &mut Vec<String>) {
    check_nonempty_str(payload, "validatorId", violations);
    check_nonempty_str(payload, "deviceId", violations);
    check_positive_number(payload, "timestamp", violations);
    check_hex_material(payload, "signature", 128, violations);
    check_number_range(payload, "quality", 0.0, 100.0, violations);

    match payload.get("data") {
        Some(data) if data.is_object() => {
            check_optional_number_range(data, "heartRate", 30.0, 220.0, violations);
            check_optional_number_range(data, "stress", 0.0, 100.0, violations);
            check_optional_number_range(data, "focus", 0.0, 100.0, violations);
            check_number_range(data, "authenticity", 0.0, 100.0, violations);
        }
        Some(_) => violations.push("data must be an object".to_string()),
        None => violations.push("missing required field: data".to_string()),
    }
}

fn check_block_proposal(payload: &Value, violations: &mut Vec<String>) {
    check_address(payload, "proposer", violations);
    check_hex_material(payload, "parentHash", 64, violations);
    check_number_range(payload, "emotionalScore", 0.0, 100.0, violations);
    check_hex_material(payload, "signature", 128, violations);

    match payload.get("height").and_then(Value::as_u64) {
        Some(_) => {}
        None => violations.push("height must be a non-negative integer".to_string()),
    }

    match payload.get("transactions").and_then(Value::as_array) {
        Some(transactions) => {
            if transactions.len() > MAX_PROPOSAL_TRANSACTIONS {
                violations.push(format!(
                    "transactions must contain at most {} hashes",
                    MAX_PROPOSAL_TRANSACTIONS
                ));
            }
            let malformed = transactions
                .iter()
                .filter(|tx| !tx.as_str().map_or(false, |s| is_hex_of_len(s, 64)))
                .count();
            if malformed > 0 {
                violations.push(format!(
                    "transactions contains {} entries that are not 64-character hex hashes",
                    malformed
                ));
            }
        }
        None => violations.push("transactions must be an array".to_string()),
    }

    match payload.get("consensusData") {
        Some(data) if data.is_object() => {
            match data.get("validators").and_then(Value::as_array) {
                Some(validators)
                    if (MIN_CONSENSUS_VALIDATORS..=MAX_CONSENSUS_VALIDATORS)
                        .contains(&validators.len()) => {}
                Some(_) => violations.push(format!(
                    "consensusData.validators must list between {} and {} validators",
                    MIN_CONSENSUS_VALIDATORS, MAX_CONSENSUS_VALIDATORS
                )),
                None => {
                    violations.push("consensusData.validators must be an array".to_string());
                }
            }
            if data.get("signatures").and_then(Value::as_array).is_none() {
                violations.push("consensusData.signatures must be an array".to_string());
            }
        }
        Some(_) => violations.push("consensusData must be an object".to_string()),
        None => violations.push("missing required field: consensusData".to_string()),
    }
}

fn check_network_message(payload: &Value, violations: &mut Vec<String>) {
    check_enum_value(payload, "type", NETWORK_MESSAGE_TYPES, violations);
    check_address(payload, "sender", violations);
    check_hex_material(payload, "nonce", 24, violations);
    check_present(payload, "payload", violations);
    check_hex_material(payload, "signature", 128, violations);
}

fn check_consensus_vote(payload: &Value, violations: &mut Vec<String>) {
    check_address(payload, "voter", violations);
    check_hex_material(payload, "blockHash", 64, violations);
    check_enum_value(payload, "vote", VOTE_CHOICES, violations);
    check_hex_material(payload, "signature", 128, violations);

    match payload.get("emotionalState") {
        Some(state) if state.is_object() => {
            check_number_range(state, "stress", 0.0, 100.0, violations);
            check_number_range(state, "focus", 0.0, 100.0, violations);
            check_number_range(state, "authenticity", 0.0, 100.0, violations);
        }
        Some(_) => violations.push("emotionalState must be an object".to_string()),
        None => violations.push("missing required field: emotionalState".to_string()),
    }
}

fn check_api_request(payload: &Value, violations: &mut Vec<String>) {
    check_enum_value(payload, "method", API_METHODS, violations);
    check_positive_number(payload, "timestamp", violations);

    match payload.get("endpoint").and_then(Value::as_str) {
        Some(endpoint) if endpoint.starts_with('/') => {}
        Some(_) => violations.push("endpoint must start with '/'".to_string()),
        None => violations.push("endpoint is required and must be a string".to_string()),
    }
}

fn check_websocket_message(payload: &Value, violations: &mut Vec<String>) {
    check_enum_value(payload, "event", WEBSOCKET_EVENTS, violations);
    check_nonempty_str(payload, "channel", violations);
}

fn check_terminal_command(payload: &Value, violations: &mut Vec<String>) {
    check_enum_value(payload, "command", TERMINAL_COMMANDS, violations);

    match payload.get("args").and_then(Value::as_array) {
        Some(args) => {
            if args.len() > MAX_COMMAND_ARGS {
                violations.push(format!(
                    "args must contain at most {} entries",
                    MAX_COMMAND_ARGS
                ));
            }
            if args.iter().any(|arg| !arg.is_string()) {
                violations.push("args entries must be strings".to_string());
            }
        }
        None => violations.push("args must be an array".to_string()),
    }

    // flags is an optional string-keyed map.
    match payload.get("flags") {
        Some(flags) if flags.is_object() => {}
        Some(_) => violations.push("flags must be an object".to_string()),
        None => {}
    }
}

fn check_config_update(payload: &Value, violations: &mut Vec<String>) {
    check_enum_value(payload, "section", CONFIG_SECTIONS, violations);
    check_nonempty_str(payload, "key", violations);
    check_present(payload, "value", violations);
    check_hex_material(payload, "signature", 128, violations);
    check_positive_number(payload, "timestamp", violations);
}

/// True when the string is exactly `len` ASCII hex digits
fn is_hex_of_len(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// True for a 0x-prefixed 40-hex-digit address
fn is_valid_address(s: &str) -> bool {
    s.starts_with("0x") && is_hex_of_len(&s[2..], 40)
}

fn check_address(payload: &Value, field: &str, violations: &mut Vec<String>) {
    match payload.get(field).and_then(Value::as_str) {
        Some(s) if is_valid_address(s) => {}
        Some(_) => violations.push(format!(
            "{} must be a 0x-prefixed 40-character hex address",
            field
        )),
        None => violations.push(format!("{} is required and must be a string", field)),
    }
}

fn check_hex_material(
    payload: &Value,
    field: &str,
    expected_len: usize,
    violations: &mut Vec<String>,
) {
    match payload.get(field).and_then(Value::as_str) {
        Some(s) if is_hex_of_len(s, expected_len) => {}
        Some(_) => violations.push(format!(
            "{} must be a {}-character hex string",
            field, expected_len
        )),
        None => violations.push(format!("{} is required and must be a string", field)),
    }
}

fn check_enum_value(
    payload: &Value,
    field: &str,
    allowed: &[&str],
    violations: &mut Vec<String>,
) {
    match payload.get(field).and_then(Value::as_str) {
        Some(s) if allowed.contains(&s) => {}
        Some(s) => violations.push(format!(
            "{} must be one of [{}], got '{}'",
            field,
            allowed.join(", "),
            s
        )),
        None => violations.push(format!("{} is required and must be a string", field)),
    }
}

fn check_nonempty_str(payload: &Value, field: &str, violations: &mut Vec<String>) {
    match payload.get(field).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => {}
        Some(_) => violations.push(format!("{} must not be empty", field)),
        None => violations.push(format!("{} is required and must be a string", field)),
    }
}

fn check_present(payload: &Value, field: &str, violations: &mut Vec<String>) {
    if payload.get(field).is_none() {
        violations.push(format!("missing required field: {}", field));
    }
}

fn check_positive_number(payload: &Value, field: &str, violations: &mut Vec<String>) {
    match payload.get(field).and_then(Value::as_f64) {
        Some(n) if n > 0.0 => {}
        Some(_) => violations.push(format!("{} must be positive", field)),
        None => violations.push(format!("{} is required and must be a number", field)),
    }
}

fn check_positive_number_max(
    payload: &Value,
    field: &str,
    max: f64,
    violations: &mut Vec<String>,
) {
    match payload.get(field).and_then(Value::as_f64) {
        Some(n) if n > 0.0 && n <= max => {}
        Some(_) => violations.push(format!(
            "{} must be positive and at most {}",
            field, max
        )),
        None => violations.push(format!("{} is required and must be a number", field)),
    }
}

fn check_number_range(
    payload: &Value,
    field: &str,
    min: f64,
    max: f64,
    violations: &mut Vec<String>,
) {
    match payload.get(field).and_then(Value::as_f64) {
        Some(n) if n >= min && n <= max => {}
        Some(_) => violations.push(format!(
            "{} must be between {} and {}",
            field, min, max
        )),
        None => violations.push(format!("{} is required and must be a number", field)),
    }
}

fn check_optional_number_range(
    payload: &Value,
    field: &str,
    min: f64,
    max: f64,
    violations: &mut Vec<String>,
) {
    match payload.get(field) {
        Some(value) => match value.as_f64() {
            Some(n) if n >= min && n <= max => {}
            _ => violations.push(format!(
                "{} must be a number between {} and {}",
                field, min, max
            )),
        },
        None => {}
    }
}
