//! Ranks of the true answer within a filtered candidate pool.
//!
//! Score ties are resolved under three conventions: optimistic (truth
//! placed before all tied candidates), pessimistic (truth placed after),
//! and realistic (the average of the two). The three are produced together
//! at generation time and from then on treated as independent streams.

use serde::{Deserialize, Serialize};

/// Which element of the triple was predicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Head,
    Tail,
    /// Head and tail streams combined. Output-only: the evaluator emits
    /// head/tail records and the aggregator derives the combined partition.
    Both,
}

impl Side {
    pub const ALL: [Side; 3] = [Side::Head, Side::Tail, Side::Both];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Head => "head",
            Side::Tail => "tail",
            Side::Both => "both",
        }
    }

    pub fn parse(name: &str) -> crate::error::Result<Self> {
        match name {
            "head" => Ok(Side::Head),
            "tail" => Ok(Side::Tail),
            "both" => Ok(Side::Both),
            _ => Err(crate::error::KgevalError::Dataset(format!(
                "unknown side '{}', expected head, tail or both",
                name
            ))),
        }
    }
}

/// Tie-resolution convention for rank positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankType {
    Optimistic,
    Pessimistic,
    Realistic,
}

impl RankType {
    pub const ALL: [RankType; 3] = [
        RankType::Optimistic,
        RankType::Pessimistic,
        RankType::Realistic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RankType::Optimistic => "optimistic",
            RankType::Pessimistic => "pessimistic",
            RankType::Realistic => "realistic",
        }
    }

    pub fn parse(name: &str) -> crate::error::Result<Self> {
        match name {
            "optimistic" => Ok(RankType::Optimistic),
            "pessimistic" => Ok(RankType::Pessimistic),
            "realistic" => Ok(RankType::Realistic),
            _ => Err(crate::error::KgevalError::Dataset(format!(
                "unknown rank type '{}', expected optimistic, pessimistic or realistic",
                name
            ))),
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            RankType::Optimistic => 0,
            RankType::Pessimistic => 1,
            RankType::Realistic => 2,
        }
    }
}

/// Ranks of one true answer under all three tie conventions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripleRanks {
    pub optimistic: f64,
    pub pessimistic: f64,
    pub realistic: f64,
    /// Size of the filtered candidate pool, the true answer included.
    pub num_candidates: u64,
}

impl TripleRanks {
    pub fn get(&self, rank_type: RankType) -> f64 {
        match rank_type {
            RankType::Optimistic => self.optimistic,
            RankType::Pessimistic => self.pessimistic,
            RankType::Realistic => self.realistic,
        }
    }
}

/// Running tally of candidates scoring better than or tied with the truth.
///
/// The pool starts at one: the true answer is always a candidate.
#[derive(Debug, Clone, Copy)]
pub struct RankTally {
    better: u64,
    tied: u64,
    candidates: u64,
}

impl RankTally {
    pub fn new() -> Self {
        Self {
            better: 0,
            tied: 0,
            candidates: 1,
        }
    }

    /// Record one candidate score against the truth's score.
    pub fn observe(&mut self, score: f32, true_score: f32) {
        self.candidates += 1;
        if score > true_score {
            self.better += 1;
        } else if score == true_score {
            self.tied += 1;
        }
    }

    pub fn ranks(&self) -> TripleRanks {
        let optimistic = (self.better + 1) as f64;
        let pessimistic = (self.better + self.tied + 1) as f64;
        TripleRanks {
            optimistic,
            pessimistic,
            realistic: 0.5 * (optimistic + pessimistic),
            num_candidates: self.candidates,
        }
    }
}

impl Default for RankTally {
    fn default() -> Self {
        Self::new()
    }
}

/// Rank the true answer's score against the other candidates' scores.
pub fn ranks_from_scores(true_score: f32, other_scores: &[f32]) -> TripleRanks {
    let mut tally = RankTally::new();
    for &score in other_scores {
        tally.observe(score, true_score);
    }
    tally.ranks()
}

/// One (test triple, side, rank type) observation fed to the aggregator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankRecord {
    pub relation_id: u32,
    pub side: Side,
    pub rank_type: RankType,
    /// 1-based position of the true answer; realistic ranks may be
    /// half-integral.
    pub rank: f64,
    pub num_candidates: u64,
}
