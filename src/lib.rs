//! Core library for the graph analytics engine

pub mod analysis;
pub mod cluster;
pub mod config;
pub mod control;
pub mod data;
pub mod error;
pub mod graph;
pub mod partition;
pub mod rank;
pub mod storage;

pub use analysis::{run_analyses, run_analyses_with, AnalysisReport};
pub use cluster::{Community, CommunityConfig, CommunityDetector, CommunityResult};
pub use config::Config;
pub use control::{CancellationToken, RunControl};
pub use error::{GraphError, GraphResult};
pub use graph::{GraphBuilder, GraphMetrics, GraphStore};
pub use partition::{PartitionResult, PartitionStrategy, Partitioner, REPLICATED};
pub use rank::{Influencer, InfluenceRanker, RankConfig, RankResult};
