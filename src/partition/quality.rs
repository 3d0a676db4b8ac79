//! Partition quality metrics

use crate::graph::GraphStore;
use crate::partition::REPLICATED;

/// Out-degree at index `floor(0.99 * n)` of the ascending degree list
pub fn degree_threshold(graph: &GraphStore) -> usize {
    let node_count = graph.node_count();
    if node_count == 0 {
        return 0;
    }

    let mut degrees: Vec<usize> = (0..node_count).map(|node| graph.degree(node)).collect();
    degrees.sort_unstable();

    // Integer form of floor(0.99 * n), exact for every n
    degrees[node_count * 99 / 100]
}

/// Edges `src -> dst` with both endpoints placed in different partitions,
/// divided by two. Edges touching a replicated node are not cut.
pub fn edge_cut(graph: &GraphStore, partitions: &[i32]) -> f64 {
    let mut crossing = 0u64;

    for src in 0..graph.node_count() {
        let src_partition = partitions[src];
        if src_partition == REPLICATED {
            continue;
        }

        for &dst in graph.neighbors(src) {
            let dst_partition = partitions[dst as usize];
            if dst_partition != REPLICATED && dst_partition != src_partition {
                crossing += 1;
            }
        }
    }

    crossing as f64 / 2.0
}

/// `1 - max |size - mean| / mean` over placed nodes, clamped to [0, 1].
///
/// Replicated nodes are left out of both the sizes and the mean. With no
/// placed nodes the assignment is reported as balanced.
pub fn balance(partitions: &[i32], num_partitions: usize) -> f64 {
    let mut sizes = vec![0usize; num_partitions];
    let mut placed = 0usize;
    for &p in partitions {
        if p != REPLICATED {
            sizes[p as usize] += 1;
            placed += 1;
        }
    }

    if placed == 0 {
        return 1.0;
    }

    let mean = placed as f64 / num_partitions as f64;
    let max_deviation = sizes
        .iter()
        .map(|&size| (size as f64 - mean).abs())
        .fold(0.0, f64::max);

    (1.0 - max_deviation / mean).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_uses_ninety_ninth_percentile_index() {
        // 10 nodes: index 9 is the largest degree, so nothing exceeds it
        let edges: Vec<(i64, i64)> = (0..9).map(|i| (i, i + 1)).chain(vec![(9, 0), (9, 1)]).collect();
        let graph = GraphStore::from_edges(edges).unwrap();
        assert_eq!(degree_threshold(&graph), 2);
    }

    #[test]
    fn edge_cut_skips_replicated_endpoints() {
        let graph = GraphStore::from_edges(vec![(0, 1), (1, 2), (2, 0), (0, 2)]).unwrap();
        assert_eq!(edge_cut(&graph, &[0, 1, 0]), 1.0);
        assert_eq!(edge_cut(&graph, &[REPLICATED, 1, 0]), 0.5);
        assert_eq!(edge_cut(&graph, &[0, 0, 0]), 0.0);
    }

    #[test]
    fn balance_of_even_and_uneven_splits() {
        assert_eq!(balance(&[0, 1, 0, 1], 2), 1.0);
        assert!((balance(&[0, 0, 0, 1], 2) - 0.5).abs() < 1e-12);
        assert_eq!(balance(&[0, 0, 0, 0], 2), 0.0);
    }

    #[test]
    fn balance_ignores_replicated_nodes() {
        assert_eq!(balance(&[REPLICATED, 0, 1], 2), 1.0);
        assert_eq!(balance(&[REPLICATED, REPLICATED], 2), 1.0);
    }

    #[test]
    fn balance_is_clamped_when_partitions_outnumber_nodes() {
        assert_eq!(balance(&[0, 0, 0], 5), 0.0);
    }
}
