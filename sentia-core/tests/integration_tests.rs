//! Integration tests for the Sentia core subsystem

use sentia_core::{
    ConsentRegistry, DistributionRegistry, MessageKind, MessageValidator, SentiaError,
    SharedConsentRegistry, TierRewardCalculator, ValidatorLifecycle, ValidatorTier,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

fn address(digit: char) -> String {
    format!("0x{}", digit.to_string().repeat(40))
}

#[test]
fn test_consent_lifecycle_behind_the_gate() {
    // The registration payload must clear the message gate before the
    // registry acts on it.
    let payload = json!({
        "address": address('a'),
        "publicKey": "b".repeat(66),
        "stake": 5000,
        "biometricHash": "c".repeat(64),
        "deviceSignature": "d".repeat(128),
        "metadata": { "deviceType": "focus" }
    });
    MessageValidator::validate(MessageKind::ValidatorRegistration, &payload).unwrap();

    let mut registry = ConsentRegistry::default();
    let validator = payload["address"].as_str().unwrap();

    let record = registry.give_consent(validator, "consensus", None);
    assert!(record.is_active);
    assert_eq!(record.consent_version, registry.current_version());
    assert!(registry.has_valid_consent(validator));

    registry.revoke_consent(validator).unwrap();
    assert!(!registry.has_valid_consent(validator));

    // Revoking again finds no active consent.
    let second = registry.revoke_consent(validator);
    assert!(matches!(second, Err(SentiaError::ConsentNotFound { .. })));
}

#[test]
fn test_rejected_payload_never_reaches_the_registry() {
    let payload = json!({
        "address": "not-an-address",
        "publicKey": "b".repeat(66),
        "stake": 5000,
        "biometricHash": "c".repeat(64),
        "deviceSignature": "d".repeat(128),
        "metadata": { "deviceType": "focus" }
    });

    let mut registry = ConsentRegistry::default();

    if MessageValidator::validate(MessageKind::ValidatorRegistration, &payload).is_ok() {
        registry.give_consent(payload["address"].as_str().unwrap(), "consensus", None);
    }

    assert!(registry.get_all_active_consents().is_empty());
    assert!(registry.get_event_log().is_empty());
}

#[test]
fn test_revocation_signals_unstaking() {
    struct UnstakingManager {
        unstaked: Mutex<Vec<String>>,
    }

    impl ValidatorLifecycle for UnstakingManager {
        fn on_consent_revoked(&self, validator_address: &str) {
            self.unstaked
                .lock()
                .unwrap()
                .push(validator_address.to_string());
        }
    }

    let manager = Arc::new(UnstakingManager {
        unstaked: Mutex::new(Vec::new()),
    });

    struct Hook(Arc<UnstakingManager>);
    impl ValidatorLifecycle for Hook {
        fn on_consent_revoked(&self, validator_address: &str) {
            self.0.on_consent_revoked(validator_address);
        }
    }

    let mut registry = ConsentRegistry::default();
    registry.register_lifecycle_hook(Box::new(Hook(Arc::clone(&manager))));

    let validator = address('a');
    registry.give_consent(&validator, "consensus", None);
    registry.revoke_consent(&validator).unwrap();

    assert_eq!(*manager.unstaked.lock().unwrap(), vec![validator]);
}

#[test]
fn test_export_import_reproduces_registry_behavior() {
    let mut registry = ConsentRegistry::default();
    let active = address('a');
    let revoked = address('b');
    let unknown = address('c');

    registry.give_consent(&active, "consensus", None);
    registry.give_consent(&revoked, "analytics", None);
    registry.revoke_consent(&revoked).unwrap();

    // Round-trip through the serialized persistence layout.
    let serialized = serde_json::to_string(&registry.export_state()).unwrap();
    let mut restored = ConsentRegistry::default();
    restored
        .import_state(serde_json::from_str(&serialized).unwrap())
        .unwrap();

    for validator in [&active, &revoked, &unknown] {
        assert_eq!(
            registry.has_valid_consent(validator),
            restored.has_valid_consent(validator),
            "divergence for {}",
            validator
        );
    }
    assert_eq!(registry.get_event_log(), restored.get_event_log());
}

#[test]
fn test_tiered_reward_scenario() {
    // Emission schedule supplied by the consensus engine.
    let emission = |height: u64| if height < 10_000 { 50.0 } else { 25.0 };
    let calculator = TierRewardCalculator::new(emission);

    let calculation = calculator.calculate_tiered_reward("V1", ValidatorTier::Primary, 1000, 1.0);

    assert_eq!(calculation.base_reward, 50.0);
    assert_eq!(
        calculation.final_reward,
        50.0 * ValidatorTier::Primary.reward_multiplier()
    );
}

#[test]
fn test_consent_gates_reward_eligibility() {
    let mut registry = ConsentRegistry::default();
    let calculator = TierRewardCalculator::new(|_height: u64| 50.0);
    let validator = address('a');

    registry.give_consent(&validator, "consensus", None);

    // Only validators with active consent get a reward computed; the
    // consensus engine enforces this by querying the registry first.
    let reward = registry.has_valid_consent(&validator).then(|| {
        calculator.calculate_tiered_reward(&validator, ValidatorTier::Secondary, 500, 0.9)
    });
    assert!(reward.is_some());

    registry.revoke_consent(&validator).unwrap();
    let reward = registry.has_valid_consent(&validator).then(|| {
        calculator.calculate_tiered_reward(&validator, ValidatorTier::Secondary, 500, 0.9)
    });
    assert!(reward.is_none());
}

#[test]
fn test_network_topology_queries() {
    let registry = DistributionRegistry::new();

    let stats = registry.get_distribution_stats();
    assert_eq!(stats.total_validators, 21);
    assert_eq!(stats.continents, 7);

    let distance = registry
        .get_validator_distance("StellarNode", "AstroSentinel")
        .unwrap();
    assert!((distance - 5570.0).abs() < 100.0);

    let reverse = registry
        .get_validator_distance("AstroSentinel", "StellarNode")
        .unwrap();
    assert!((distance - reverse).abs() < 1e-9);
}

#[test]
fn test_shared_registry_concurrent_grants() {
    use std::thread;

    let shared = SharedConsentRegistry::new(ConsentRegistry::default());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let shared = shared.clone();
            thread::spawn(move || {
                let validator = format!("0x{:040x}", i);
                shared.give_consent(&validator, "consensus", None).unwrap();
                if i % 2 == 0 {
                    shared.revoke_consent(&validator).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Odd-numbered validators keep consent; each even one produced a
    // revoked event as well.
    assert_eq!(shared.get_all_active_consents().unwrap().len(), 8);
    assert_eq!(shared.get_event_log().unwrap().len(), 24);

    // A snapshot taken after the fact reproduces the same answers.
    let state = shared.export_state().unwrap();
    let mut restored = ConsentRegistry::default();
    restored.import_state(state).unwrap();
    assert_eq!(restored.get_all_active_consents().len(), 8);
}
