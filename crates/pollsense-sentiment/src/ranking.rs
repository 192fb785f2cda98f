//! Analysis criteria and the ranking plan each one produces.

use std::fmt;
use std::str::FromStr;

use pollsense_core::ResponseOrder;
use serde::Serialize;

use crate::error::AnalysisError;

/// How `analyze_responses` orders the responses around a seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criteria {
    Similarity,
    SentimentSimilarity,
    ThematicClustering,
}

impl Criteria {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Criteria::Similarity => "similarity",
            Criteria::SentimentSimilarity => "sentiment_similarity",
            Criteria::ThematicClustering => "thematic_clustering",
        }
    }

    /// Build the ranking plan for this criteria around a seed with
    /// `seed_score`. `has_search` is true when the caller supplied a
    /// non-blank search string.
    #[must_use]
    pub fn plan(self, seed_score: f64, has_search: bool) -> RankingPlan {
        match self {
            Criteria::Similarity => similarity_plan(),
            Criteria::SentimentSimilarity => sentiment_similarity_plan(seed_score),
            Criteria::ThematicClustering => thematic_plan(has_search),
        }
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criteria {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "similarity" => Ok(Criteria::Similarity),
            "sentiment_similarity" => Ok(Criteria::SentimentSimilarity),
            "thematic_clustering" => Ok(Criteria::ThematicClustering),
            other => Err(AnalysisError::InvalidCriteria(other.to_string())),
        }
    }
}

/// What the store should be asked for once the seed is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingPlan {
    pub exclude_seed: bool,
    pub order: ResponseOrder,
    /// Replace the seed vector with an embedding of the search string.
    pub reseed: bool,
}

fn similarity_plan() -> RankingPlan {
    RankingPlan {
        exclude_seed: true,
        order: ResponseOrder::Distance,
        reseed: false,
    }
}

fn sentiment_similarity_plan(seed_score: f64) -> RankingPlan {
    RankingPlan {
        exclude_seed: true,
        order: ResponseOrder::SentimentThenDistance {
            descending: seed_score > 0.0,
        },
        reseed: false,
    }
}

fn thematic_plan(has_search: bool) -> RankingPlan {
    RankingPlan {
        exclude_seed: false,
        order: ResponseOrder::Distance,
        reseed: has_search,
    }
}
