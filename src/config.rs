//! Configuration management for the graph analytics engine

use std::time::Duration;

use crate::cluster::CommunityConfig;
use crate::partition::PartitionStrategy;
use crate::rank::RankConfig;

/// Default configuration for a full analysis run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// PageRank convergence tolerance (L1 change between iterations)
    pub tolerance: f64,

    /// PageRank iteration cap
    pub max_iterations: usize,

    /// PageRank damping factor
    pub damping_factor: f64,

    /// Seed nodes for personalized PageRank; empty runs plain PageRank
    pub personalize: Vec<usize>,

    /// Label propagation sweep cap
    pub community_max_iterations: usize,

    /// Label propagation seed; `None` is nondeterministic
    pub seed: Option<u64>,

    /// Number of partitions
    pub num_partitions: usize,

    pub partition_strategy: PartitionStrategy,

    /// Wall-clock budget shared by all analyses
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        let rank = RankConfig::default();
        let community = CommunityConfig::default();
        Self {
            tolerance: rank.tolerance,
            max_iterations: rank.max_iterations,
            damping_factor: rank.damping_factor,
            personalize: Vec::new(),
            community_max_iterations: community.max_iterations,
            seed: community.seed,
            num_partitions: 4,
            partition_strategy: PartitionStrategy::Hash,
            timeout: None,
        }
    }
}

impl Config {
    /// PageRank settings
    pub fn rank_config(&self) -> RankConfig {
        RankConfig::new(self.tolerance, self.max_iterations, self.damping_factor)
    }

    /// Label propagation settings
    pub fn community_config(&self) -> CommunityConfig {
        CommunityConfig {
            max_iterations: self.community_max_iterations,
            seed: self.seed,
        }
    }
}
