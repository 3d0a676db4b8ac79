//! PageRank over a compressed graph
//!
//! Push-style power iteration: every node splits `d * rank` evenly across its
//! out-edges, and every node receives a teleport share of `1 - d`. Nodes with no
//! out-edges push nothing and their mass is not handed back to the other nodes,
//! so on graphs with sinks the total rank drifts below one.

use std::time::Instant;

use crate::control::RunControl;
use crate::error::{check_iteration_params, GraphError, GraphResult};
use crate::graph::GraphStore;
use crate::rank::{Influencer, RankConfig, RankResult, TOP_INFLUENCERS};

/// Damping factor used when none is given
pub const DEFAULT_DAMPING_FACTOR: f64 = 0.85;

/// Where the `1 - d` teleport mass lands each iteration
enum Teleport {
    /// Same share for every node
    Uniform,
    /// Share per node, summing to one over the seeds
    Personalized(Vec<f64>),
}

/// Computes PageRank scores over a shared graph store
#[derive(Debug, Clone)]
pub struct InfluenceRanker<'g> {
    graph: &'g GraphStore,
    damping_factor: f64,
    control: RunControl,
}

impl<'g> InfluenceRanker<'g> {
    pub fn new(graph: &'g GraphStore) -> Self {
        Self {
            graph,
            damping_factor: DEFAULT_DAMPING_FACTOR,
            control: RunControl::new(),
        }
    }

    /// Damping factor for personalized runs
    pub fn with_damping_factor(mut self, damping_factor: f64) -> Self {
        self.damping_factor = damping_factor;
        self
    }

    /// Cancellation and deadline checked before every iteration
    pub fn with_control(mut self, control: RunControl) -> Self {
        self.control = control;
        self
    }

    /// Plain PageRank with uniform teleportation
    pub fn compute(
        &self,
        tolerance: f64,
        max_iterations: usize,
        damping_factor: f64,
    ) -> GraphResult<RankResult> {
        self.graph.ensure_not_empty()?;
        check_iteration_params(Some(tolerance), max_iterations)?;
        check_damping(damping_factor)?;

        log::info!(
            "Computing PageRank over {} nodes (d = {}, tolerance = {}, max {} iterations)",
            self.graph.node_count(),
            damping_factor,
            tolerance,
            max_iterations
        );

        self.iterate(tolerance, max_iterations, damping_factor, Teleport::Uniform)
    }

    /// Plain PageRank driven by a [`RankConfig`]
    pub fn compute_with(&self, config: &RankConfig) -> GraphResult<RankResult> {
        self.compute(config.tolerance, config.max_iterations, config.damping_factor)
    }

    /// PageRank whose teleport mass only returns to `source_nodes`.
    ///
    /// Every distinct seed receives `1 / seeds` of the teleport share; repeated
    /// ids count once.
    pub fn compute_personalized(
        &self,
        source_nodes: &[usize],
        tolerance: f64,
        max_iterations: usize,
    ) -> GraphResult<RankResult> {
        self.graph.ensure_not_empty()?;
        check_iteration_params(Some(tolerance), max_iterations)?;
        check_damping(self.damping_factor)?;

        let (personalization, seeds) = self.personalization(source_nodes)?;

        log::info!(
            "Computing personalized PageRank over {} nodes from {} distinct seed(s)",
            self.graph.node_count(),
            seeds
        );

        self.iterate(
            tolerance,
            max_iterations,
            self.damping_factor,
            Teleport::Personalized(personalization),
        )
    }

    /// Teleport weight per node and the number of distinct seeds
    fn personalization(&self, source_nodes: &[usize]) -> GraphResult<(Vec<f64>, usize)> {
        if source_nodes.is_empty() {
            return Err(GraphError::invalid_argument(
                "personalized PageRank needs at least one source node",
            ));
        }

        let node_count = self.graph.node_count();
        let mut is_seed = vec![false; node_count];
        for &node in source_nodes {
            if node >= node_count {
                return Err(GraphError::NodeOutOfRange { node, node_count });
            }
            is_seed[node] = true;
        }

        let seeds = is_seed.iter().filter(|&&seed| seed).count();
        let share = 1.0 / seeds as f64;

        let weights: Vec<f64> = is_seed.into_iter().map(|seed| if seed { share } else { 0.0 }).collect();
        Ok((weights, seeds))
    }

    fn iterate(
        &self,
        tolerance: f64,
        max_iterations: usize,
        damping_factor: f64,
        teleport: Teleport,
    ) -> GraphResult<RankResult> {
        let start = Instant::now();
        let graph = self.graph;
        let node_count = graph.node_count();
        let uniform_share = (1.0 - damping_factor) / node_count as f64;

        let mut ranks = vec![1.0 / node_count as f64; node_count];
        let mut new_ranks = vec![0.0; node_count];

        let mut iterations = 0;
        let mut delta = f64::INFINITY;

        while delta > tolerance && iterations < max_iterations {
            self.control.check(iterations)?;
            iterations += 1;

            match &teleport {
                Teleport::Uniform => new_ranks.fill(uniform_share),
                Teleport::Personalized(weights) => {
                    for (slot, &weight) in new_ranks.iter_mut().zip(weights) {
                        *slot = (1.0 - damping_factor) * weight;
                    }
                }
            }

            for src in 0..node_count {
                let neighbors = graph.neighbors(src);
                if neighbors.is_empty() {
                    continue;
                }
                let contribution = damping_factor * ranks[src] / neighbors.len() as f64;
                for &dst in neighbors {
                    new_ranks[dst as usize] += contribution;
                }
            }

            delta = ranks
                .iter()
                .zip(&new_ranks)
                .map(|(old, new)| (new - old).abs())
                .sum();

            std::mem::swap(&mut ranks, &mut new_ranks);
            log::debug!("PageRank iteration {}: delta = {:e}", iterations, delta);
        }

        let converged = delta <= tolerance;
        if !converged {
            log::warn!(
                "PageRank stopped at the {} iteration cap with delta {:e} above tolerance {:e}",
                max_iterations,
                delta,
                tolerance
            );
        }

        let total: f64 = ranks.iter().sum();
        if total < 1.0 - 1e-9 {
            log::debug!("PageRank mass {:.6} after dangling-node leakage", total);
        }

        let top_influencers = top_influencers(&ranks, TOP_INFLUENCERS);
        log::info!("PageRank finished after {} iterations (delta = {:e})", iterations, delta);

        Ok(RankResult {
            ranks,
            iterations,
            convergence: delta,
            converged,
            top_influencers,
            execution_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

fn check_damping(damping_factor: f64) -> GraphResult<()> {
    if damping_factor > 0.0 && damping_factor < 1.0 {
        Ok(())
    } else {
        Err(GraphError::invalid_argument(format!(
            "damping factor must lie strictly between 0 and 1, got {}",
            damping_factor
        )))
    }
}

/// The `limit` best-ranked nodes, descending, ties by ascending node id
pub fn top_influencers(ranks: &[f64], limit: usize) -> Vec<Influencer> {
    let mut order: Vec<usize> = (0..ranks.len()).collect();
    order.sort_by(|&a, &b| ranks[b].total_cmp(&ranks[a]).then(a.cmp(&b)));

    order
        .into_iter()
        .take(limit)
        .map(|node| Influencer { node, rank: ranks[node] })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::CancellationToken;

    fn two_cycles() -> GraphStore {
        GraphStore::from_edges(vec![
            (0, 1), (1, 2), (2, 3), (3, 0),
            (0, 4), (4, 5), (5, 6), (6, 0),
        ])
        .unwrap()
    }

    #[test]
    fn no_dangling_nodes_preserves_mass() {
        let graph = two_cycles();
        let result = InfluenceRanker::new(&graph).compute(1e-10, 500, 0.85).unwrap();
        assert!((result.total_mass() - 1.0).abs() < 1e-9);
        assert!(result.converged);
        assert_eq!(result.top_influencers[0].node, 0);
    }

    #[test]
    fn single_iteration_matches_hand_computation() {
        let graph = GraphStore::from_edges(vec![(0, 1)]).unwrap();
        let result = InfluenceRanker::new(&graph).compute(1e-12, 1, 0.85).unwrap();

        assert_eq!(result.iterations, 1);
        assert!((result.ranks[0] - 0.075).abs() < 1e-12);
        assert!((result.ranks[1] - (0.075 + 0.85 * 0.5)).abs() < 1e-12);
        assert!((result.convergence - 0.425).abs() < 1e-12);
        assert!(!result.converged);
    }

    #[test]
    fn dangling_mass_is_not_redistributed() {
        let graph = GraphStore::from_edges(vec![(0, 1), (0, 2)]).unwrap();
        let result = InfluenceRanker::new(&graph).compute(1e-9, 200, 0.85).unwrap();
        assert!(result.total_mass() < 1.0);
        assert!(result.total_mass() > 0.0);
    }

    #[test]
    fn ties_break_by_node_id() {
        let top = top_influencers(&[0.2, 0.5, 0.2, 0.5, 0.1], 4);
        let nodes: Vec<usize> = top.iter().map(|i| i.node).collect();
        assert_eq!(nodes, vec![1, 3, 0, 2]);
    }

    #[test]
    fn top_list_is_capped_at_ten() {
        let edges: Vec<(i64, i64)> = (0..30).map(|i| (i, (i + 1) % 30)).collect();
        let graph = GraphStore::from_edges(edges).unwrap();
        let result = InfluenceRanker::new(&graph).compute(1e-6, 100, 0.85).unwrap();
        assert_eq!(result.top_influencers.len(), TOP_INFLUENCERS);
    }

    #[test]
    fn rejects_bad_parameters() {
        let graph = two_cycles();
        let ranker = InfluenceRanker::new(&graph);
        assert!(matches!(ranker.compute(0.0, 10, 0.85), Err(GraphError::InvalidArgument(_))));
        assert!(matches!(ranker.compute(1e-3, 0, 0.85), Err(GraphError::InvalidArgument(_))));
        assert!(matches!(ranker.compute(1e-3, 10, 1.0), Err(GraphError::InvalidArgument(_))));
        assert!(matches!(ranker.compute(1e-3, 10, 0.0), Err(GraphError::InvalidArgument(_))));
    }

    #[test]
    fn personalized_rejects_empty_and_unknown_seeds() {
        let graph = two_cycles();
        let ranker = InfluenceRanker::new(&graph);
        assert!(matches!(
            ranker.compute_personalized(&[], 1e-4, 100),
            Err(GraphError::InvalidArgument(_))
        ));
        assert_eq!(
            ranker.compute_personalized(&[9], 1e-4, 100),
            Err(GraphError::NodeOutOfRange { node: 9, node_count: 7 })
        );
    }

    #[test]
    fn duplicate_seeds_count_once() {
        let graph = two_cycles();
        let ranker = InfluenceRanker::new(&graph);
        let once = ranker.compute_personalized(&[0, 1], 1e-8, 100).unwrap();
        let twice = ranker.compute_personalized(&[0, 1, 1, 0], 1e-8, 100).unwrap();
        assert_eq!(once.ranks, twice.ranks);
        assert_eq!(once.rank(1), twice.rank(1));
        assert_eq!(once.rank(7), None);

        let (weights, seeds) = ranker.personalization(&[1, 0, 1, 1]).unwrap();
        assert_eq!(seeds, 2);
        assert_eq!(weights, vec![0.5, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_graph_is_an_error() {
        let graph = GraphStore::from_edges(Vec::new()).unwrap();
        let ranker = InfluenceRanker::new(&graph);
        assert_eq!(ranker.compute(1e-4, 10, 0.85), Err(GraphError::EmptyGraph));
        assert_eq!(ranker.compute_personalized(&[0], 1e-4, 10), Err(GraphError::EmptyGraph));
    }

    #[test]
    fn cancelled_run_stops_before_iterating() {
        let graph = two_cycles();
        let token = CancellationToken::new();
        token.cancel();
        let ranker = InfluenceRanker::new(&graph).with_control(RunControl::new().with_token(token));
        assert_eq!(ranker.compute(1e-4, 10, 0.85), Err(GraphError::Cancelled { iterations: 0 }));
    }
}
