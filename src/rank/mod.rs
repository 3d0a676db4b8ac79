//! Influence ranking module

pub mod pagerank;

use serde::{Serialize, Deserialize};

pub use pagerank::InfluenceRanker;

/// Number of nodes reported in [`RankResult::top_influencers`]
pub const TOP_INFLUENCERS: usize = 10;

/// Parameters for a PageRank run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankConfig {
    /// Stop once the L1 change between iterations is at or below this
    pub tolerance: f64,

    /// Hard cap on iterations
    pub max_iterations: usize,

    /// Probability of following an out-edge rather than teleporting
    pub damping_factor: f64,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.0001,
            max_iterations: 100,
            damping_factor: 0.85,
        }
    }
}

impl RankConfig {
    pub fn new(tolerance: f64, max_iterations: usize, damping_factor: f64) -> Self {
        Self {
            tolerance,
            max_iterations,
            damping_factor,
        }
    }
}

/// A node and its score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Influencer {
    pub node: usize,
    pub rank: f64,
}

/// Output of one PageRank run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankResult {
    /// Score per node id
    pub ranks: Vec<f64>,

    /// Iterations performed
    pub iterations: usize,

    /// L1 change of the final iteration
    pub convergence: f64,

    /// Whether `convergence` reached the tolerance before the iteration cap
    pub converged: bool,

    /// Highest-ranked nodes, best first, ties by ascending id
    pub top_influencers: Vec<Influencer>,

    pub execution_time_ms: u64,
}

impl RankResult {
    pub fn rank(&self, node: usize) -> Option<f64> {
        self.ranks.get(node).copied()
    }

    /// Sum of all scores; below one when dangling nodes leak mass
    pub fn total_mass(&self) -> f64 {
        self.ranks.iter().sum()
    }
}
