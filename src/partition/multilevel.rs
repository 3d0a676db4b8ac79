//! Multilevel partitioning in the style of METIS
//!
//! The directed store is first folded into an undirected weighted graph, where
//! the weight of `{u, v}` counts the edges between them in either direction.
//! Heavy-edge matching then collapses pairs of nodes level by level. The
//! coarsest graph is split round-robin, and each level on the way back up
//! inherits its parent's assignment and runs greedy boundary refinement.
//!
//! Nodes are visited in ascending id everywhere, so results are deterministic.

use crate::control::RunControl;
use crate::error::GraphResult;
use crate::graph::GraphStore;

/// Stop coarsening once a level has at most this many nodes per partition
const COARSEST_NODES_PER_PARTITION: usize = 15;

/// Stop coarsening when matching shrinks a level by less than this fraction
const MIN_COARSENING_RATIO: f64 = 0.05;

const MAX_LEVELS: usize = 32;

const MAX_REFINE_PASSES: usize = 8;

/// Undirected weighted graph for one level of the hierarchy
#[derive(Debug, Clone)]
struct LevelGraph {
    /// Number of original nodes folded into each node
    vertex_weights: Vec<u64>,

    /// Neighbours with edge weights, sorted by neighbour, no self-loops
    adjacency: Vec<Vec<(usize, u64)>>,
}

impl LevelGraph {
    fn from_store(graph: &GraphStore) -> Self {
        let node_count = graph.node_count();
        let mut adjacency: Vec<Vec<(usize, u64)>> = vec![Vec::new(); node_count];

        for (src, dst) in graph.edges() {
            if src == dst {
                continue;
            }
            adjacency[src].push((dst, 1));
            adjacency[dst].push((src, 1));
        }
        adjacency.iter_mut().for_each(merge_parallel);

        Self {
            vertex_weights: vec![1; node_count],
            adjacency,
        }
    }

    fn node_count(&self) -> usize {
        self.vertex_weights.len()
    }

    fn total_weight(&self) -> u64 {
        self.vertex_weights.iter().sum()
    }

    fn max_vertex_weight(&self) -> u64 {
        self.vertex_weights.iter().copied().max().unwrap_or(0)
    }

    /// Heavy-edge matching: each unmatched node pairs with its unmatched
    /// neighbour of largest edge weight (smallest id on ties), or stays alone.
    /// Returns the coarse graph and the fine-to-coarse node map.
    fn coarsen(&self) -> (LevelGraph, Vec<usize>) {
        let node_count = self.node_count();
        let mut coarse_of = vec![usize::MAX; node_count];
        let mut coarse_weights = Vec::with_capacity(node_count / 2 + 1);

        for node in 0..node_count {
            if coarse_of[node] != usize::MAX {
                continue;
            }

            let mut mate = None;
            let mut heaviest = 0;
            for &(neighbor, weight) in &self.adjacency[node] {
                if coarse_of[neighbor] == usize::MAX && weight > heaviest {
                    heaviest = weight;
                    mate = Some(neighbor);
                }
            }

            let id = coarse_weights.len();
            coarse_of[node] = id;
            let mut weight = self.vertex_weights[node];
            if let Some(mate) = mate {
                coarse_of[mate] = id;
                weight += self.vertex_weights[mate];
            }
            coarse_weights.push(weight);
        }

        let mut adjacency: Vec<Vec<(usize, u64)>> = vec![Vec::new(); coarse_weights.len()];
        for (node, neighbors) in self.adjacency.iter().enumerate() {
            let from = coarse_of[node];
            for &(neighbor, weight) in neighbors {
                let to = coarse_of[neighbor];
                if from != to {
                    adjacency[from].push((to, weight));
                }
            }
        }
        adjacency.iter_mut().for_each(merge_parallel);

        let coarse = LevelGraph {
            vertex_weights: coarse_weights,
            adjacency,
        };
        (coarse, coarse_of)
    }
}

/// Sort by neighbour and sum the weights of repeated neighbours
fn merge_parallel(neighbors: &mut Vec<(usize, u64)>) {
    neighbors.sort_unstable_by_key(|&(neighbor, _)| neighbor);

    let mut merged: Vec<(usize, u64)> = Vec::with_capacity(neighbors.len());
    for &(neighbor, weight) in neighbors.iter() {
        match merged.last_mut() {
            Some(last) if last.0 == neighbor => last.1 += weight,
            _ => merged.push((neighbor, weight)),
        }
    }
    *neighbors = merged;
}

/// Assign every node of `graph` to one of `num_partitions` partitions
pub(crate) fn partition(
    graph: &GraphStore,
    num_partitions: usize,
    control: &RunControl,
) -> GraphResult<Vec<i32>> {
    let mut levels = vec![LevelGraph::from_store(graph)];
    let mut maps: Vec<Vec<usize>> = Vec::new();

    // Coarsen
    while levels.len() < MAX_LEVELS {
        control.check(levels.len() - 1)?;
        let current = &levels[levels.len() - 1];
        if current.node_count() <= COARSEST_NODES_PER_PARTITION * num_partitions {
            break;
        }

        let (coarse, map) = current.coarsen();
        let shrunk = current.node_count() - coarse.node_count();
        if (shrunk as f64) < current.node_count() as f64 * MIN_COARSENING_RATIO {
            break;
        }

        log::debug!(
            "Coarsened level {}: {} -> {} nodes",
            levels.len() - 1,
            current.node_count(),
            coarse.node_count()
        );
        maps.push(map);
        levels.push(coarse);
    }

    // Initial round-robin partition of the coarsest level
    let coarsest = &levels[levels.len() - 1];
    let mut parts: Vec<usize> = (0..coarsest.node_count()).map(|node| node % num_partitions).collect();
    refine(coarsest, &mut parts, num_partitions, control)?;

    // Uncoarsen and refine
    for (level, map) in maps.iter().enumerate().rev() {
        let fine = &levels[level];
        parts = (0..fine.node_count()).map(|node| parts[map[node]]).collect();
        refine(fine, &mut parts, num_partitions, control)?;
    }

    log::info!(
        "Multilevel partitioning used {} level(s) for {} nodes",
        levels.len(),
        graph.node_count()
    );

    Ok(parts.into_iter().map(|p| p as i32).collect())
}

/// Restore the weight limit, then move nodes to the partition they are most
/// connected to while that strictly lowers the cut weight and fits the limit.
fn refine(
    graph: &LevelGraph,
    parts: &mut [usize],
    num_partitions: usize,
    control: &RunControl,
) -> GraphResult<()> {
    let limit = graph.total_weight() as f64 / num_partitions as f64 + graph.max_vertex_weight() as f64;

    let mut weights = vec![0u64; num_partitions];
    for (node, &part) in parts.iter().enumerate() {
        weights[part] += graph.vertex_weights[node];
    }

    rebalance(graph, parts, &mut weights, limit);

    let mut connection = vec![0u64; num_partitions];
    let mut touched: Vec<usize> = Vec::new();

    for pass in 0..MAX_REFINE_PASSES {
        control.check(pass)?;
        let mut moves = 0;

        for node in 0..graph.node_count() {
            let from = parts[node];
            let weight = graph.vertex_weights[node];

            for &(neighbor, edge_weight) in &graph.adjacency[node] {
                let part = parts[neighbor];
                if connection[part] == 0 {
                    touched.push(part);
                }
                connection[part] += edge_weight;
            }

            let internal = connection[from] as i64;
            let mut best = from;
            let mut best_gain = 0i64;
            for &part in &touched {
                if part == from {
                    continue;
                }
                let gain = connection[part] as i64 - internal;
                let better = gain > best_gain || (gain > 0 && gain == best_gain && part < best);
                if better && (weights[part] + weight) as f64 <= limit {
                    best = part;
                    best_gain = gain;
                }
            }

            for part in touched.drain(..) {
                connection[part] = 0;
            }

            if best != from {
                weights[from] -= weight;
                weights[best] += weight;
                parts[node] = best;
                moves += 1;
            }
        }

        if moves == 0 {
            break;
        }
    }

    Ok(())
}

/// Move nodes out of partitions above `limit` into the lightest partition,
/// preferring the node that loses the least cut weight
fn rebalance(graph: &LevelGraph, parts: &mut [usize], weights: &mut [u64], limit: f64) {
    loop {
        let (heavy, &heavy_weight) = match weights.iter().enumerate().max_by_key(|&(_, w)| *w) {
            Some(entry) => entry,
            None => return,
        };
        if heavy_weight as f64 <= limit {
            return;
        }
        let light = match weights.iter().enumerate().min_by_key(|&(_, w)| *w) {
            Some((light, _)) => light,
            None => return,
        };

        let mut candidate: Option<(usize, i64)> = None;
        for node in (0..graph.node_count()).filter(|&node| parts[node] == heavy) {
            let gain: i64 = graph.adjacency[node]
                .iter()
                .map(|&(neighbor, weight)| match parts[neighbor] {
                    p if p == light => weight as i64,
                    p if p == heavy => -(weight as i64),
                    _ => 0,
                })
                .sum();
            if candidate.map_or(true, |(_, best)| gain > best) {
                candidate = Some((node, gain));
            }
        }

        let Some((node, _)) = candidate else { return };
        let weight = graph.vertex_weights[node];
        weights[heavy] -= weight;
        weights[light] += weight;
        parts[node] = light;
    }
}
