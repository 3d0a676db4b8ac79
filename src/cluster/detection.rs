//! Community detection by asynchronous label propagation

use std::collections::BTreeMap;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::cluster::metrics::{density, internal_edge_counts, modularity};
use crate::cluster::{Community, CommunityResult};
use crate::control::RunControl;
use crate::error::{check_iteration_params, GraphResult};
use crate::graph::GraphStore;

/// Settings for a label propagation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommunityConfig {
    /// Maximum number of sweeps
    pub max_iterations: usize,

    /// Seed for the sweep order; `None` draws from system entropy
    pub seed: Option<u64>,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            seed: None,
        }
    }
}

/// Detects communities over a shared graph store.
///
/// Each sweep visits the nodes in a fresh random order and updates labels in
/// place, so nodes later in a sweep already see the labels chosen earlier in it.
#[derive(Debug, Clone)]
pub struct CommunityDetector<'g> {
    graph: &'g GraphStore,
    control: RunControl,
}

impl<'g> CommunityDetector<'g> {
    pub fn new(graph: &'g GraphStore) -> Self {
        Self {
            graph,
            control: RunControl::new(),
        }
    }

    /// Cancellation and deadline checked before every sweep
    pub fn with_control(mut self, control: RunControl) -> Self {
        self.control = control;
        self
    }

    /// Run with an unseeded random source
    pub fn detect(&self, max_iterations: usize) -> GraphResult<CommunityResult> {
        let mut rng = StdRng::from_entropy();
        self.detect_with_rng(max_iterations, &mut rng)
    }

    /// Run with a seeded random source; equal seeds give equal results
    pub fn detect_seeded(&self, max_iterations: usize, seed: u64) -> GraphResult<CommunityResult> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.detect_with_rng(max_iterations, &mut rng)
    }

    pub fn detect_with(&self, config: &CommunityConfig) -> GraphResult<CommunityResult> {
        match config.seed {
            Some(seed) => self.detect_seeded(config.max_iterations, seed),
            None => self.detect(config.max_iterations),
        }
    }

    /// Run with a caller-supplied random source for the sweep order
    pub fn detect_with_rng<R: Rng + ?Sized>(
        &self,
        max_iterations: usize,
        rng: &mut R,
    ) -> GraphResult<CommunityResult> {
        self.graph.ensure_not_empty()?;
        check_iteration_params(None, max_iterations)?;

        let start = Instant::now();
        let graph = self.graph;
        let node_count = graph.node_count();

        log::info!(
            "Detecting communities over {} nodes (max {} sweeps)",
            node_count,
            max_iterations
        );

        // Initialize each node with unique label
        let mut labels: Vec<usize> = (0..node_count).collect();

        // Labels are always node ids, so tallies fit a dense array
        let mut tally = vec![0u32; node_count];
        let mut touched: Vec<usize> = Vec::new();
        let mut order: Vec<usize> = Vec::with_capacity(node_count);

        let mut changed = true;
        let mut iterations = 0;

        while changed && iterations < max_iterations {
            self.control.check(iterations)?;
            changed = false;
            iterations += 1;

            order.clear();
            order.extend(0..node_count);
            order.shuffle(rng);

            let mut updates = 0usize;
            for &node in &order {
                let neighbors = graph.neighbors(node);
                if neighbors.is_empty() {
                    continue;
                }

                for &neighbor in neighbors {
                    let label = labels[neighbor as usize];
                    if tally[label] == 0 {
                        touched.push(label);
                    }
                    tally[label] += 1;
                }

                // Most frequent label, smallest label among ties
                let mut best_label = labels[node];
                let mut best_count = 0;
                for &label in &touched {
                    let count = tally[label];
                    if count > best_count || (count == best_count && label < best_label) {
                        best_count = count;
                        best_label = label;
                    }
                }

                for label in touched.drain(..) {
                    tally[label] = 0;
                }

                if labels[node] != best_label {
                    labels[node] = best_label;
                    changed = true;
                    updates += 1;
                }
            }

            log::debug!("Label propagation sweep {}: {} label changes", iterations, updates);
        }

        let converged = !changed;
        if !converged {
            log::warn!("Label propagation hit the {} sweep cap before stabilising", max_iterations);
        }

        let communities = group_communities(graph, &labels);
        let modularity = modularity(graph, &labels);

        log::info!(
            "Found {} communities in {} sweeps (modularity {:.4})",
            communities.len(),
            iterations,
            modularity
        );

        Ok(CommunityResult {
            communities,
            labels,
            modularity,
            iterations,
            converged,
            execution_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Group node ids by label, ordered by label, members ascending
fn group_communities(graph: &GraphStore, labels: &[usize]) -> Vec<Community> {
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (node, &label) in labels.iter().enumerate() {
        groups.entry(label).or_default().push(node);
    }

    let internal = internal_edge_counts(graph, labels);

    groups
        .into_iter()
        .map(|(label, members)| {
            let internal_edges = internal.get(&label).copied().unwrap_or(0);
            Community {
                label,
                density: density(internal_edges, members.len()),
                members,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::CancellationToken;
    use crate::error::GraphError;

    fn two_triangles() -> GraphStore {
        GraphStore::from_edges(vec![
            (0, 1), (1, 0), (1, 2), (2, 1), (0, 2), (2, 0),
            (3, 4), (4, 3), (4, 5), (5, 4), (3, 5), (5, 3),
        ])
        .unwrap()
    }

    #[test]
    fn separates_disjoint_triangles() {
        let graph = two_triangles();
        let detector = CommunityDetector::new(&graph);
        for seed in 0..20 {
            let result = detector.detect_seeded(50, seed).unwrap();
            assert_eq!(result.community_count(), 2, "seed {}", seed);
            assert!(result.same_community(0, 2));
            assert!(result.same_community(3, 5));
            assert!(!result.same_community(0, 3));
            assert!(result.converged);
            assert!((result.modularity - 0.375).abs() < 1e-12);
        }
    }

    #[test]
    fn same_seed_same_result() {
        let edges: Vec<(i64, i64)> = (0..40)
            .flat_map(|i| vec![(i, (i + 1) % 40), (i, (i * 7) % 40)])
            .collect();
        let graph = GraphStore::from_edges(edges).unwrap();
        let detector = CommunityDetector::new(&graph);

        let a = detector.detect_seeded(50, 42).unwrap();
        let b = detector.detect_seeded(50, 42).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.iterations, b.iterations);
        assert_eq!(a.modularity, b.modularity);
    }

    #[test]
    fn nodes_without_out_edges_keep_their_label() {
        // 2 and 3 are sinks
        let graph = GraphStore::from_edges(vec![(0, 2), (1, 3)]).unwrap();
        let result = CommunityDetector::new(&graph).detect_seeded(10, 7).unwrap();
        assert_eq!(result.labels, vec![2, 3, 2, 3]);
        assert_eq!(result.community_count(), 2);
    }

    #[test]
    fn ties_prefer_the_smallest_label() {
        // 0 sees labels 5 and 3 once each
        let graph = GraphStore::from_edges(vec![(0, 5), (0, 3)]).unwrap();
        let result = CommunityDetector::new(&graph).detect_seeded(10, 1).unwrap();
        assert_eq!(result.community_of(0), Some(3));
    }

    #[test]
    fn iteration_cap_is_respected() {
        let edges: Vec<(i64, i64)> = (0..100).map(|i| (i, (i + 1) % 100)).collect();
        let graph = GraphStore::from_edges(edges).unwrap();
        let result = CommunityDetector::new(&graph).detect_seeded(3, 9).unwrap();
        assert!(result.iterations <= 3);
    }

    #[test]
    fn communities_cover_every_node_once() {
        let graph = two_triangles();
        let result = CommunityDetector::new(&graph).detect(50).unwrap();
        let mut all: Vec<usize> = result
            .communities
            .iter()
            .flat_map(|c| c.members.clone())
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..6).collect::<Vec<_>>());
        assert!(result.communities.iter().all(|c| (c.density - 1.0).abs() < 1e-12));
    }

    #[test]
    fn density_stays_bounded_with_parallel_edges() {
        let graph = GraphStore::from_edges(vec![(0, 1), (0, 1), (1, 0), (1, 1)]).unwrap();
        let result = CommunityDetector::new(&graph).detect_seeded(10, 1).unwrap();
        for community in &result.communities {
            assert!(
                community.density <= 1.0,
                "label {} density {}",
                community.label,
                community.density
            );
        }
    }

    #[test]
    fn rejects_zero_iterations_and_empty_graph() {
        let graph = two_triangles();
        assert!(matches!(
            CommunityDetector::new(&graph).detect(0),
            Err(GraphError::InvalidArgument(_))
        ));

        let empty = GraphStore::from_edges(Vec::new()).unwrap();
        assert_eq!(CommunityDetector::new(&empty).detect(5), Err(GraphError::EmptyGraph));
    }

    #[test]
    fn cancellation_is_observed() {
        let graph = two_triangles();
        let token = CancellationToken::new();
        token.cancel();
        let detector = CommunityDetector::new(&graph).with_control(RunControl::new().with_token(token));
        assert_eq!(detector.detect_seeded(5, 0), Err(GraphError::Cancelled { iterations: 0 }));
    }
}
