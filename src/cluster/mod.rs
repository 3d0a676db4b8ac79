//! Community analysis module

pub mod detection;
pub mod metrics;

use itertools::Itertools;
use serde::{Serialize, Deserialize};

pub use detection::{CommunityConfig, CommunityDetector};

/// A group of nodes sharing a final propagation label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    /// Label value shared by every member
    pub label: usize,

    /// Members of this community (node ids, ascending)
    pub members: Vec<usize>,

    /// Density: internal edges / potential edges
    pub density: f64,
}

impl Community {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Output of one label propagation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityResult {
    /// Communities ordered by label
    pub communities: Vec<Community>,

    /// Final label of every node
    pub labels: Vec<usize>,

    /// Directed modularity of the final labelling
    pub modularity: f64,

    /// Sweeps performed
    pub iterations: usize,

    /// Whether the last sweep changed nothing
    pub converged: bool,

    pub execution_time_ms: u64,
}

impl CommunityResult {
    pub fn community_count(&self) -> usize {
        self.communities.len()
    }

    /// Label of the community containing `node`
    pub fn community_of(&self, node: usize) -> Option<usize> {
        self.labels.get(node).copied()
    }

    pub fn same_community(&self, a: usize, b: usize) -> bool {
        match (self.community_of(a), self.community_of(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Communities largest first, equal sizes by label
    pub fn communities_by_size(&self) -> Vec<&Community> {
        self.communities
            .iter()
            .sorted_by(|a, b| b.size().cmp(&a.size()).then(a.label.cmp(&b.label)))
            .collect()
    }
}
