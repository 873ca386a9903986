//! Ruleset configuration.

use serde::{Deserialize, Serialize};

use crate::RulesError;
use crate::ledger::Resources;

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// When placed apprentices return to their owner's pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprenticeRecall {
    /// Every player's apprentices return when the last seat ends its
    /// turn and a new round begins.
    #[default]
    RoundEnd,
    /// A player's apprentices return as that player's next turn begins.
    OwnerTurnStart,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceTerm {
    /// Leftover resources cost points.
    #[default]
    Penalty,
    /// Leftover resources earn points.
    Bonus,
}

/// End-of-game conversion of leftover resources: `total / ratio`,
/// rounded down, with the sign given by `term`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceScoring {
    pub term: ResourceTerm,
    pub ratio: u32,
}

impl Default for ResourceScoring {
    fn default() -> Self {
        Self {
            term: ResourceTerm::Penalty,
            ratio: 3,
        }
    }
}

impl ResourceScoring {
    pub fn points(&self, leftover: u32) -> i64 {
        let magnitude = i64::from(leftover / self.ratio.max(1));
        match self.term {
            ResourceTerm::Penalty => -magnitude,
            ResourceTerm::Bonus => magnitude,
        }
    }
}

// ---------------------------------------------------------------------------
// RulesConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub total_rounds: u32,
    /// How many tiles at the front of the draw pool are drawable.
    pub market_size: usize,
    /// Tiles moved from the pool to the discard pile at each round end.
    pub discard_per_round: usize,
    /// Finish at the next turn boundary once the pool runs dry.
    pub end_on_empty_pool: bool,
    pub blueprint_hand_size: usize,
    pub blueprint_selection_limit: usize,
    pub starting_resources: Resources,
    pub resource_caps: Resources,
    pub starting_apprentices: u32,
    pub starting_officials: u32,
    pub apprentice_yield: u32,
    pub official_yield: u32,
    pub apprentice_recall: ApprenticeRecall,
    pub resource_scoring: ResourceScoring,
    pub min_seats: usize,
    pub max_seats: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            total_rounds: 8,
            market_size: 3,
            discard_per_round: 1,
            end_on_empty_pool: true,
            blueprint_hand_size: 3,
            blueprint_selection_limit: 1,
            starting_resources: Resources::new(2, 2, 0, 0),
            resource_caps: Resources::new(10, 10, 6, 4),
            starting_apprentices: 3,
            starting_officials: 2,
            apprentice_yield: 1,
            official_yield: 2,
            apprentice_recall: ApprenticeRecall::RoundEnd,
            resource_scoring: ResourceScoring::default(),
            min_seats: 2,
            max_seats: 4,
        }
    }
}

impl RulesConfig {
    /// Returns the config unchanged if it is usable.
    ///
    /// # Errors
    /// `InvalidConfig` naming the first offending field.
    pub fn validated(self) -> Result<Self, RulesError> {
        let fail = |msg: &str| Err(RulesError::InvalidConfig(msg.to_owned()));
        if self.total_rounds == 0 {
            return fail("total_rounds must be at least 1");
        }
        if self.market_size == 0 {
            return fail("market_size must be at least 1");
        }
        if self.blueprint_selection_limit > self.blueprint_hand_size {
            return fail("blueprint_selection_limit cannot exceed blueprint_hand_size");
        }
        if self.resource_scoring.ratio == 0 {
            return fail("resource_scoring.ratio must be at least 1");
        }
        if self.min_seats == 0 || self.min_seats > self.max_seats {
            return fail("seat range must satisfy 1 <= min_seats <= max_seats");
        }
        if self.starting_resources.first_over(&self.resource_caps).is_some() {
            return fail("starting_resources exceed resource_caps");
        }
        Ok(self)
    }
}
