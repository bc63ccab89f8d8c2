//! Sentia Core - validator eligibility, classification and rewards
//!
//! This crate implements the governance core of the Sentia biometric-weighted
//! consensus network: the consent-lifecycle registry gating biometric-data
//! processing, the static geographic distribution registry, the tier-based
//! reward calculator, and the message-validation gate that fronts all of them.
//!
//! Untrusted payloads enter through [`MessageValidator`]; only validated data
//! reaches the consent registry or the reward calculator. The distribution
//! registry is immutable reference data queried off the critical path.

use serde::{Deserialize, Serialize};

pub mod consent;
pub mod distribution;
pub mod error;
pub mod rewards;
pub mod validation;

pub use consent::{
    ConsentEvent, ConsentEventType, ConsentPolicy, ConsentRecord, ConsentRegistry,
    ConsentRegistryState, SharedConsentRegistry, ValidatorLifecycle,
};
pub use distribution::{DistributionRegistry, DistributionStats, ValidatorLocation};
pub use error::SentiaError;
pub use rewards::{
    EmissionSchedule, HalvingEmission, TierRewardCalculator, TieredRewardCalculation,
};
pub use validation::{MessageKind, MessageValidator};

/// Result type for Sentia operations
pub type Result<T> = std::result::Result<T, SentiaError>;

/// Sentia protocol version
pub const SENTIA_VERSION: &str = "0.1.0";

/// Validator role classification controlling consensus weight and rewards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidatorTier {
    /// Full consensus participant with the highest reward weight
    Primary,

    /// Standard participant with the baseline reward weight
    Secondary,

    /// Observer-grade participant with a reduced reward weight
    Light,
}

impl ValidatorTier {
    /// Fixed reward multiplier for this tier
    ///
    /// The mapping is configuration, not computation; it never changes at
    /// runtime.
    pub fn reward_multiplier(&self) -> f64 {
        match self {
            ValidatorTier::Primary => constants::PRIMARY_REWARD_MULTIPLIER,
            ValidatorTier::Secondary => constants::SECONDARY_REWARD_MULTIPLIER,
            ValidatorTier::Light => constants::LIGHT_REWARD_MULTIPLIER,
        }
    }
}

/// Network configuration constants
pub mod constants {
    /// Reward multiplier for primary validators
    pub const PRIMARY_REWARD_MULTIPLIER: f64 = 1.5;

    /// Reward multiplier for secondary validators
    pub const SECONDARY_REWARD_MULTIPLIER: f64 = 1.0;

    /// Reward multiplier for light validators
    pub const LIGHT_REWARD_MULTIPLIER: f64 = 0.5;

    /// Version applied to new consent records unless explicitly overridden
    pub const DEFAULT_CONSENT_VERSION: &str = "1.0.0";

    /// Consent text validators agree to when granting biometric processing
    pub const DEFAULT_CONSENT_TEXT: &str = "I authorize the Sentia network to process \
        biometric signals produced by my registered device for the purpose of \
        consensus participation, until this consent is revoked.";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!SENTIA_VERSION.is_empty());
    }

    #[test]
    fn test_tier_multipliers_are_ordered() {
        assert!(
            ValidatorTier::Primary.reward_multiplier()
                > ValidatorTier::Secondary.reward_multiplier()
        );
        assert!(
            ValidatorTier::Secondary.reward_multiplier()
                > ValidatorTier::Light.reward_multiplier()
        );
    }

    #[test]
    fn test_tier_serialization_uses_wire_names() {
        let json = serde_json::to_string(&ValidatorTier::Primary).unwrap();
        assert_eq!(json, "\"PRIMARY\"");

        let tier: ValidatorTier = serde_json::from_str("\"LIGHT\"").unwrap();
        assert_eq!(tier, ValidatorTier::Light);
    }
}
