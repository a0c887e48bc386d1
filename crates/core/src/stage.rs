//! Project stages and their recommendation keys in the cost-driver matrix.

use serde::{Deserialize, Serialize};

/// Project phase affecting how much adjustment an estimate carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// Pre-award pricing, widest uncertainty.
    Bidding,
    /// Contract awarded, design still moving.
    PostAward,
    /// Final pricing.
    Final,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Bidding, Stage::PostAward, Stage::Final];

    /// Parse a stage label case-insensitively (`BIDDING`, `post_award`, ...).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "bidding" => Some(Self::Bidding),
            "post_award" => Some(Self::PostAward),
            "final" => Some(Self::Final),
            _ => None,
        }
    }

    /// The key this stage is stored under in a region's `recommendations`.
    pub fn recommendation_key(&self) -> &'static str {
        match self {
            Self::Bidding => "bidding_stage",
            Self::PostAward => "post_award_stage",
            Self::Final => "final_stage",
        }
    }

    /// Canonical upper-case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bidding => "BIDDING",
            Self::PostAward => "POST_AWARD",
            Self::Final => "FINAL",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a free-form stage label to the recommendation key to look up.
///
/// Known stages go through [`Stage::recommendation_key`]; anything else is
/// looked up verbatim (lower-cased) so a caller may pass `final_stage`
/// directly.
pub fn recommendation_key_for(label: &str) -> String {
    match Stage::from_label(label) {
        Some(stage) => stage.recommendation_key().to_string(),
        None => label.trim().to_lowercase(),
    }
}
