//! Community quality metrics

use std::collections::HashMap;

use crate::graph::GraphStore;

/// Directed modularity of a labelling.
///
/// `Q = (1/2E) * sum over same-community pairs (i, j) of (A_ij - k_i*k_j / 2E)`
/// where `A_ij` is 1 when at least one edge `i -> j` exists and `k` is
/// out-degree. Evaluated in O(n + m) from per-community degree totals instead
/// of the pairwise double sum. A graph without edges has modularity 0.
pub fn modularity(graph: &GraphStore, labels: &[usize]) -> f64 {
    let node_count = graph.node_count();
    debug_assert_eq!(labels.len(), node_count);

    let edge_count = graph.edge_count();
    if edge_count == 0 {
        return 0.0;
    }
    let two_m = 2.0 * edge_count as f64;

    // Distinct (src, dst) pairs inside a community; `seen_from` dedups parallel edges
    let mut seen_from = vec![usize::MAX; node_count];
    let mut internal_pairs = 0u64;
    let mut community_degree: HashMap<usize, f64> = HashMap::new();

    for src in 0..node_count {
        let neighbors = graph.neighbors(src);
        *community_degree.entry(labels[src]).or_insert(0.0) += neighbors.len() as f64;

        for &dst in neighbors {
            let dst = dst as usize;
            if seen_from[dst] == src {
                continue;
            }
            seen_from[dst] = src;
            if labels[src] == labels[dst] {
                internal_pairs += 1;
            }
        }
    }

    let expected: f64 = community_degree.values().map(|k| k * k).sum::<f64>() / two_m;

    (internal_pairs as f64 - expected) / two_m
}

/// Distinct non-loop `(src, dst)` pairs whose endpoints share a label, keyed by label
pub fn internal_edge_counts(graph: &GraphStore, labels: &[usize]) -> HashMap<usize, usize> {
    let mut seen_from = vec![usize::MAX; graph.node_count()];
    let mut counts = HashMap::new();

    for src in 0..graph.node_count() {
        for &dst in graph.neighbors(src) {
            let dst = dst as usize;
            if dst == src || seen_from[dst] == src {
                continue;
            }
            seen_from[dst] = src;
            if labels[src] == labels[dst] {
                *counts.entry(labels[src]).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Calculate density (internal edges / potential directed edges)
pub fn density(internal_edges: usize, size: usize) -> f64 {
    if size <= 1 {
        return 1.0; // By convention, singleton communities have density 1
    }

    internal_edges as f64 / (size * (size - 1)) as f64
}
