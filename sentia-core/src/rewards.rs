//! Tier-based reward computation
//!
//! Pure arithmetic over an externally supplied emission schedule: the final
//! reward is the base emission at a block height, weighted by the validator's
//! tier multiplier and its emotional fitness score. Nothing here mutates
//! state; identical inputs always produce identical output.

use crate::ValidatorTier;
use serde::{Deserialize, Serialize};

/// External emission-schedule collaborator
///
/// Maps a block height to the base reward emitted at that height. The
/// schedule itself is owned by the consensus engine; this crate only
/// consumes it.
pub trait EmissionSchedule {
    /// Base reward emitted at the given block height
    fn base_emission(&self, block_height: u64) -> f64;
}

/// Any plain function over block height is a valid schedule
impl<F> EmissionSchedule for F
where
    F: Fn(u64) -> f64,
{
    fn base_emission(&self, block_height: u64) -> f64 {
        self(block_height)
    }
}

/// Emission schedule that halves the base reward at a fixed block interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HalvingEmission {
    /// Reward emitted for heights before the first halving
    pub initial_reward: f64,

    /// Number of blocks between halvings
    pub halving_interval: u64,
}

impl EmissionSchedule for HalvingEmission {
    fn base_emission(&self, block_height: u64) -> f64 {
        let halvings = block_height / self.halving_interval.max(1);
        self.initial_reward * 0.5f64.powf(halvings as f64)
    }
}

/// Result of a single tier-weighted reward computation
///
/// Transient value recomputed per request; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TieredRewardCalculation {
    /// Validator the reward is computed for
    pub validator_id: String,

    /// Tier the computation used
    pub tier: ValidatorTier,

    /// Base emission at the requested block height
    pub base_reward: f64,

    /// Fixed multiplier for the tier
    pub tier_multiplier: f64,

    /// `base_reward * tier_multiplier * emotional_score`
    pub final_reward: f64,
}

/// Pure tier reward calculator over an emission schedule
pub struct TierRewardCalculator<S: EmissionSchedule> {
    schedule: S,
}

impl<S: EmissionSchedule> TierRewardCalculator<S> {
    /// Build a calculator over the given emission schedule
    pub fn new(schedule: S) -> Self {
        Self { schedule }
    }

    /// Compute the tier-weighted reward for a validator at a block height
    ///
    /// `emotional_score` is nominally in [0, 1] as produced upstream; it is
    /// multiplied through unchanged. Range enforcement is the message gate's
    /// policy, not this calculator's.
    pub fn calculate_tiered_reward(
        &self,
        validator_id: &str,
        tier: ValidatorTier,
        block_height: u64,
        emotional_score: f64,
    ) -> TieredRewardCalculation {
        let base_reward = self.schedule.base_emission(block_height);
        let tier_multiplier = tier.reward_multiplier();
        let final_reward = base_reward * tier_multiplier * emotional_score;

        tracing::debug!(
            validator = validator_id,
            ?tier,
            block_height,
            final_reward,
            "tiered reward computed"
        );

        TieredRewardCalculation {
            validator_id: validator_id.to_string(),
            tier,
            base_reward,
            tier_multiplier,
            final_reward,
        }
    }

    /// Compute the reward with the neutral emotional score of 1.0
    pub fn calculate_base_tiered_reward(
        &self,
        validator_id: &str,
        tier: ValidatorTier,
        block_height: u64,
    ) -> TieredRewardCalculation {
        self.calculate_tiered_reward(validator_id, tier, block_height, 1.0)
    }
}
