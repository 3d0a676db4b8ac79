//! Run every analysis over one graph store

use serde::{Serialize, Deserialize};

use crate::cluster::{CommunityDetector, CommunityResult};
use crate::config::Config;
use crate::control::RunControl;
use crate::error::GraphResult;
use crate::graph::{GraphMetrics, GraphStore};
use crate::partition::{PartitionResult, Partitioner};
use crate::rank::{InfluenceRanker, RankResult};

/// Results of a full analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metrics: GraphMetrics,
    pub pagerank: RankResult,
    pub communities: CommunityResult,
    pub partitions: PartitionResult,
}

/// Run all analyses with the configured timeout
pub fn run_analyses(graph: &GraphStore, config: &Config) -> GraphResult<AnalysisReport> {
    let mut control = RunControl::new();
    if let Some(timeout) = config.timeout {
        control = control.with_timeout(timeout);
    }
    run_analyses_with(graph, config, &control)
}

/// Run all analyses concurrently against the same store.
///
/// The store is only read, so the three analyses share it without locking;
/// each one checks `control` once per iteration.
pub fn run_analyses_with(
    graph: &GraphStore,
    config: &Config,
    control: &RunControl,
) -> GraphResult<AnalysisReport> {
    graph.ensure_not_empty()?;
    let metrics = GraphMetrics::compute(graph);

    log::info!(
        "Analysing graph with {} nodes and {} edges ({} dangling)",
        metrics.node_count,
        metrics.edge_count,
        metrics.dangling_nodes
    );

    let (pagerank, (communities, partitions)) = rayon::join(
        || rank(graph, config, control),
        || {
            rayon::join(
                || {
                    CommunityDetector::new(graph)
                        .with_control(control.clone())
                        .detect_with(&config.community_config())
                },
                || {
                    Partitioner::new(graph)
                        .with_control(control.clone())
                        .partition_with(config.partition_strategy, config.num_partitions)
                },
            )
        },
    );

    Ok(AnalysisReport {
        metrics,
        pagerank: pagerank?,
        communities: communities?,
        partitions: partitions?,
    })
}

fn rank(graph: &GraphStore, config: &Config, control: &RunControl) -> GraphResult<RankResult> {
    let rank_config = config.rank_config();
    let ranker = InfluenceRanker::new(graph)
        .with_damping_factor(rank_config.damping_factor)
        .with_control(control.clone());

    if config.personalize.is_empty() {
        ranker.compute_with(&rank_config)
    } else {
        ranker.compute_personalized(&config.personalize, rank_config.tolerance, rank_config.max_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::CancellationToken;
    use crate::error::GraphError;

    fn two_cycles() -> GraphStore {
        GraphStore::from_edges(vec![
            (0, 1), (1, 2), (2, 3), (3, 0),
            (0, 4), (4, 5), (5, 6), (6, 0),
        ])
        .unwrap()
    }

    #[test]
    fn report_covers_all_analyses() {
        let graph = two_cycles();
        let config = Config {
            seed: Some(3),
            num_partitions: 2,
            ..Config::default()
        };
        let report = run_analyses(&graph, &config).unwrap();

        assert_eq!(report.metrics.node_count, 7);
        assert_eq!(report.pagerank.ranks.len(), 7);
        assert_eq!(report.communities.labels.len(), 7);
        assert_eq!(report.partitions.partitions.len(), 7);
        assert_eq!(report.partitions.num_partitions, 2);
    }

    #[test]
    fn seeded_reports_repeat_exactly() {
        let graph = two_cycles();
        let config = Config {
            seed: Some(11),
            personalize: vec![0, 1],
            ..Config::default()
        };
        let a = run_analyses(&graph, &config).unwrap();
        let b = run_analyses(&graph, &config).unwrap();
        assert_eq!(a.pagerank.ranks, b.pagerank.ranks);
        assert_eq!(a.communities.labels, b.communities.labels);
        assert_eq!(a.partitions.partitions, b.partitions.partitions);
    }

    #[test]
    fn cancellation_surfaces_as_error() {
        let graph = two_cycles();
        let token = CancellationToken::new();
        token.cancel();
        let control = RunControl::new().with_token(token);
        let err = run_analyses_with(&graph, &Config::default(), &control).unwrap_err();
        assert!(matches!(err, GraphError::Cancelled { .. }));
    }
}
