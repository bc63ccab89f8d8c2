//! Consent lifecycle registry for biometric data processing
//!
//! A validator's biometric data may only be processed while it holds an
//! active consent record. The registry owns the latest record per address
//! plus an append-only audit trail of every lifecycle transition; historical
//! state lives only in the trail, never in the record itself.
//!
//! One registry instance is constructed at system start and passed explicitly
//! to every consumer. There is no ambient global registry.

use crate::{constants, Result, SentiaError};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// Lifecycle transition kinds recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentEventType {
    /// Consent was granted (fresh or re-entered after revocation)
    Given,

    /// Consent was withdrawn
    Revoked,

    /// An existing record was rewritten to the current policy
    Updated,
}

/// Latest consent state for a single validator
///
/// Overwritten in place on each lifecycle transition; at most one current
/// record exists per address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRecord {
    /// Address of the validator the consent belongs to
    pub validator_address: String,

    /// Consent text version the validator agreed to
    pub consent_version: String,

    /// Hash of the consent text in force at agreement time
    pub consent_hash: String,

    /// When the record was last written (epoch milliseconds)
    pub timestamp: u64,

    /// Whether biometric processing is currently authorized
    pub is_active: bool,

    /// Purpose the biometric data may be processed for
    pub data_processing_purpose: String,
}

/// One entry in the consent audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentEvent {
    /// Which lifecycle transition happened
    pub event_type: ConsentEventType,

    /// Validator the transition applies to
    pub validator_address: String,

    /// When the event was emitted (epoch milliseconds)
    pub timestamp: u64,

    /// Consent version in force when the event was emitted
    pub consent_version: String,
}

/// Append-only audit trail of consent transitions
///
/// The only mutator is `append`; entries are never updated or removed once
/// written, and readers get them in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsentEventLog {
    events: Vec<ConsentEvent>,
}

impl ConsentEventLog {
    fn append(&mut self, event: ConsentEvent) {
        self.events.push(event);
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Copy of the full trail in emission order
    pub fn snapshot(&self) -> Vec<ConsentEvent> {
        self.events.clone()
    }

    /// Events for one validator, in emission order
    pub fn for_validator(&self, validator_address: &str) -> Vec<ConsentEvent> {
        self.events
            .iter()
            .filter(|event| event.validator_address == validator_address)
            .cloned()
            .collect()
    }
}

/// Consent text policy in force for new grants and updates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentPolicy {
    /// Version identifier of the current consent text
    pub version: String,

    /// Sha3-256 hash of the current consent text, hex encoded
    pub text_hash: String,
}

impl ConsentPolicy {
    /// Build a policy from a version identifier and the consent text itself
    pub fn new(version: impl Into<String>, consent_text: &str) -> Self {
        Self {
            version: version.into(),
            text_hash: hash_consent_text(consent_text),
        }
    }
}

impl Default for ConsentPolicy {
    fn default() -> Self {
        Self::new(
            constants::DEFAULT_CONSENT_VERSION,
            constants::DEFAULT_CONSENT_TEXT,
        )
    }
}

/// Hash a consent text with Sha3-256, hex encoded
pub fn hash_consent_text(consent_text: &str) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(consent_text.as_bytes());
    hex::encode(hasher.finalize())
}

/// External validator-lifecycle collaborator
///
/// Revoking consent makes a validator ineligible for biometric consensus, so
/// the registry signals this hook to trigger automatic unstaking. The
/// unstaking itself happens outside this crate.
pub trait ValidatorLifecycle: Send + Sync {
    /// Called after a validator's consent has been revoked
    fn on_consent_revoked(&self, validator_address: &str);
}

/// Full registry state for persistence
///
/// Round-trips the record map, the audit trail and the version pointer with
/// no loss or reordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRegistryState {
    /// Consent records as ordered address/record pairs
    pub consents: Vec<(String, ConsentRecord)>,

    /// Audit trail in emission order
    pub event_log: Vec<ConsentEvent>,

    /// Version applied to future grants and updates
    pub current_consent_version: String,

    /// Hash of the consent text in force
    pub consent_text_hash: String,
}

/// Registry owning consent records and their audit trail
///
/// Records are keyed by validator address with a single writer path through
/// the mutating operations below. Synchronous and non-blocking; wrap it in
/// [`SharedConsentRegistry`] for concurrent deployments.
pub struct ConsentRegistry {
    records: BTreeMap<String, ConsentRecord>,
    event_log: ConsentEventLog,
    current_version: String,
    consent_text_hash: String,
    lifecycle_hooks: Vec<Box<dyn ValidatorLifecycle>>,
}

impl Default for ConsentRegistry {
    fn default() -> Self {
        Self::new(ConsentPolicy::default())
    }
}

impl ConsentRegistry {
    /// Create a registry under the given consent policy
    pub fn new(policy: ConsentPolicy) -> Self {
        Self {
            records: BTreeMap::new(),
            event_log: ConsentEventLog::default(),
            current_version: policy.version,
            consent_text_hash: policy.text_hash,
            lifecycle_hooks: Vec::new(),
        }
    }

    /// Register a lifecycle collaborator notified on revocation
    pub fn register_lifecycle_hook(&mut self, hook: Box<dyn ValidatorLifecycle>) {
        self.lifecycle_hooks.push(hook);
    }

    /// Grant or re-grant consent for a validator
    ///
    /// Creates or overwrites the record with `is_active = true` and appends a
    /// `given` event. Always succeeds; no precondition on prior state. The
    /// version defaults to the current policy version unless overridden.
    pub fn give_consent(
        &mut self,
        validator_address: &str,
        purpose: &str,
        version: Option<&str>,
    ) -> ConsentRecord {
        let consent_version = version.unwrap_or(&self.current_version).to_string();

        let record = ConsentRecord {
            validator_address: validator_address.to_string(),
            consent_version: consent_version.clone(),
            consent_hash: self.consent_text_hash.clone(),
            timestamp: now_millis(),
            is_active: true,
            data_processing_purpose: purpose.to_string(),
        };

        self.records
            .insert(validator_address.to_string(), record.clone());
        self.record_event(ConsentEventType::Given, validator_address, consent_version);

        tracing::info!(
            validator = validator_address,
            version = %record.consent_version,
            purpose,
            "consent given"
        );

        record
    }

    /// Withdraw a validator's consent
    ///
    /// Fails with [`SentiaError::ConsentNotFound`] when no active consent
    /// exists - an address that never consented and one that already revoked
    /// look the same to this operation. On success the record is deactivated,
    /// a `revoked` event is appended, and every registered lifecycle hook is
    /// signalled so the network can unstake the validator.
    pub fn revoke_consent(&mut self, validator_address: &str) -> Result<()> {
        let record = match self.records.get_mut(validator_address) {
            Some(record) if record.is_active => record,
            _ => return Err(SentiaError::consent_not_found(validator_address)),
        };

        record.is_active = false;
        record.timestamp = now_millis();
        let consent_version = record.consent_version.clone();

        self.record_event(ConsentEventType::Revoked, validator_address, consent_version);

        tracing::warn!(validator = validator_address, "consent revoked");

        for hook in &self.lifecycle_hooks {
            hook.on_consent_revoked(validator_address);
        }

        Ok(())
    }

    /// Rewrite an existing record to the current policy
    ///
    /// Fails with [`SentiaError::ConsentNotFound`] when no record exists at
    /// all. The record's version and hash move to the current policy values
    /// and the purpose is optionally replaced. `is_active` is intentionally
    /// left untouched: updating a revoked consent neither reactivates it nor
    /// fails (see the pinning test below).
    pub fn update_consent(
        &mut self,
        validator_address: &str,
        new_purpose: Option<&str>,
    ) -> Result<ConsentRecord> {
        let record = self
            .records
            .get_mut(validator_address)
            .ok_or_else(|| SentiaError::consent_not_found(validator_address))?;

        record.consent_version = self.current_version.clone();
        record.consent_hash = self.consent_text_hash.clone();
        record.timestamp = now_millis();
        if let Some(purpose) = new_purpose {
            record.data_processing_purpose = purpose.to_string();
        }

        let updated = record.clone();
        let consent_version = updated.consent_version.clone();
        self.record_event(ConsentEventType::Updated, validator_address, consent_version);

        tracing::info!(
            validator = validator_address,
            version = %updated.consent_version,
            "consent updated"
        );

        Ok(updated)
    }

    /// Whether the validator currently holds active consent
    pub fn has_valid_consent(&self, validator_address: &str) -> bool {
        self.records
            .get(validator_address)
            .map_or(false, |record| record.is_active)
    }

    /// Latest record for a validator, if any
    pub fn get_consent(&self, validator_address: &str) -> Option<&ConsentRecord> {
        self.records.get(validator_address)
    }

    /// All records whose consent is currently active
    pub fn get_all_active_consents(&self) -> Vec<&ConsentRecord> {
        self.records
            .values()
            .filter(|record| record.is_active)
            .collect()
    }

    /// Copy of the full audit trail in emission order
    pub fn get_event_log(&self) -> Vec<ConsentEvent> {
        self.event_log.snapshot()
    }

    /// Audit trail entries for one validator, in emission order
    pub fn get_validator_events(&self, validator_address: &str) -> Vec<ConsentEvent> {
        self.event_log.for_validator(validator_address)
    }

    /// Version applied to future grants and updates
    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    /// Hash of the consent text in force
    pub fn consent_text_hash(&self) -> &str {
        &self.consent_text_hash
    }

    /// Move the registry to a new consent version and text hash
    ///
    /// Admin-only operation. Affects only future `give_consent` and
    /// `update_consent` calls; existing records are never rewritten
    /// retroactively.
    pub fn update_consent_version(&mut self, new_version: &str, new_text_hash: &str) {
        tracing::info!(
            from = %self.current_version,
            to = new_version,
            "consent version updated"
        );

        self.current_version = new_version.to_string();
        self.consent_text_hash = new_text_hash.to_string();
    }

    /// Snapshot the full internal state for persistence
    pub fn export_state(&self) -> ConsentRegistryState {
        ConsentRegistryState {
            consents: self
                .records
                .iter()
                .map(|(address, record)| (address.clone(), record.clone()))
                .collect(),
            event_log: self.event_log.snapshot(),
            current_consent_version: self.current_version.clone(),
            consent_text_hash: self.consent_text_hash.clone(),
        }
    }

    /// Replace the full internal state from a snapshot
    ///
    /// Registered lifecycle hooks are kept; everything else is replaced.
    /// Fails with [`SentiaError::InvalidState`] when a record disagrees with
    /// the address it is filed under.
    pub fn import_state(&mut self, state: ConsentRegistryState) -> Result<()> {
        for (address, record) in &state.consents {
            if &record.validator_address != address {
                return Err(SentiaError::InvalidState(format!(
                    "record filed under {} belongs to {}",
                    address, record.validator_address
                )));
            }
        }

        self.records = state.consents.into_iter().collect();
        self.event_log = ConsentEventLog {
            events: state.event_log,
        };
        self.current_version = state.current_consent_version;
        self.consent_text_hash = state.consent_text_hash;

        tracing::info!(
            records = self.records.len(),
            events = self.event_log.len(),
            "consent state imported"
        );

        Ok(())
    }

    fn record_event(
        &mut self,
        event_type: ConsentEventType,
        validator_address: &str,
        consent_version: String,
    ) {
        self.event_log.append(ConsentEvent {
            event_type,
            validator_address: validator_address.to_string(),
            timestamp: now_millis(),
            consent_version,
        });
    }
}

/// Cloneable thread-safe handle around a [`ConsentRegistry`]
///
/// The registry is the only mutable shared state in the subsystem. The write
/// lock serializes mutations for the same address and keeps audit-log appends
/// atomic and ordered; readers never observe a partially applied transition.
/// Export and import hold the lock for their whole window, so no snapshot can
/// interleave with a mutation.
#[derive(Clone)]
pub struct SharedConsentRegistry {
    inner: Arc<RwLock<ConsentRegistry>>,
}

impl SharedConsentRegistry {
    /// Wrap a registry for shared use
    pub fn new(registry: ConsentRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// Grant or re-grant consent; see [`ConsentRegistry::give_consent`]
    pub fn give_consent(
        &self,
        validator_address: &str,
        purpose: &str,
        version: Option<&str>,
    ) -> Result<ConsentRecord> {
        let mut registry = self.inner.write().map_err(|_| SentiaError::LockPoisoned)?;
        Ok(registry.give_consent(validator_address, purpose, version))
    }

    /// Withdraw consent; see [`ConsentRegistry::revoke_consent`]
    pub fn revoke_consent(&self, validator_address: &str) -> Result<()> {
        let mut registry = self.inner.write().map_err(|_| SentiaError::LockPoisoned)?;
        registry.revoke_consent(validator_address)
    }

    /// Rewrite a record to the current policy; see [`ConsentRegistry::update_consent`]
    pub fn update_consent(
        &self,
        validator_address: &str,
        new_purpose: Option<&str>,
    ) -> Result<ConsentRecord> {
        let mut registry = self.inner.write().map_err(|_| SentiaError::LockPoisoned)?;
        registry.update_consent(validator_address, new_purpose)
    }

    /// Whether the validator currently holds active consent
    pub fn has_valid_consent(&self, validator_address: &str) -> Result<bool> {
        let registry = self.inner.read().map_err(|_| SentiaError::LockPoisoned)?;
        Ok(registry.has_valid_consent(validator_address))
    }

    /// Latest record for a validator, if any
    pub fn get_consent(&self, validator_address: &str) -> Result<Option<ConsentRecord>> {
        let registry = self.inner.read().map_err(|_| SentiaError::LockPoisoned)?;
        Ok(registry.get_consent(validator_address).cloned())
    }

    /// All records whose consent is currently active
    pub fn get_all_active_consents(&self) -> Result<Vec<ConsentRecord>> {
        let registry = self.inner.read().map_err(|_| SentiaError::LockPoisoned)?;
        Ok(registry
            .get_all_active_consents()
            .into_iter()
            .cloned()
            .collect())
    }

    /// Copy of the full audit trail in emission order
    pub fn get_event_log(&self) -> Result<Vec<ConsentEvent>> {
        let registry = self.inner.read().map_err(|_| SentiaError::LockPoisoned)?;
        Ok(registry.get_event_log())
    }

    /// Audit trail entries for one validator
    pub fn get_validator_events(&self, validator_address: &str) -> Result<Vec<ConsentEvent>> {
        let registry = self.inner.read().map_err(|_| SentiaError::LockPoisoned)?;
        Ok(registry.get_validator_events(validator_address))
    }

    /// Move to a new consent version; see [`ConsentRegistry::update_consent_version`]
    pub fn update_consent_version(&self, new_version: &str, new_text_hash: &str) -> Result<()> {
        let mut registry = self.inner.write().map_err(|_| SentiaError::LockPoisoned)?;
        registry.update_consent_version(new_version, new_text_hash);
        Ok(())
    }

    /// Snapshot the full state under an exclusive window
    pub fn export_state(&self) -> Result<ConsentRegistryState> {
        let registry = self.inner.write().map_err(|_| SentiaError::LockPoisoned)?;
        Ok(registry.export_state())
    }

    /// Replace the full state under an exclusive window
    pub fn import_state(&self, state: ConsentRegistryState) -> Result<()> {
        let mut registry = self.inner.write().map_err(|_| SentiaError::LockPoisoned)?;
        registry.import_state(state)
    }
}

/// Current time as epoch milliseconds
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}
