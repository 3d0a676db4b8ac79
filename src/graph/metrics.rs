//! Descriptive statistics for a built graph

use serde::{Serialize, Deserialize};
use statrs::statistics::Statistics;

use crate::graph::GraphStore;

/// Summary statistics of a graph's structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    /// Mean out-degree
    pub avg_degree: f64,
    /// Largest out-degree
    pub max_degree: usize,
    /// Population standard deviation of out-degree
    pub degree_std_dev: f64,
    /// Nodes with no out-edges
    pub dangling_nodes: usize,
    pub self_loops: usize,
    /// Edges over possible directed edges between distinct nodes
    pub density: f64,
}

impl GraphMetrics {
    /// Compute metrics in a single pass over the store
    pub fn compute(graph: &GraphStore) -> Self {
        let node_count = graph.node_count();
        let edge_count = graph.edge_count();

        if node_count == 0 {
            return Self {
                node_count,
                edge_count,
                avg_degree: 0.0,
                max_degree: 0,
                degree_std_dev: 0.0,
                dangling_nodes: 0,
                self_loops: 0,
                density: 0.0,
            };
        }

        let mut degrees = Vec::with_capacity(node_count);
        let mut max_degree = 0;
        let mut dangling_nodes = 0;
        for node in 0..node_count {
            let degree = graph.degree(node);
            max_degree = max_degree.max(degree);
            if degree == 0 {
                dangling_nodes += 1;
            }
            degrees.push(degree as f64);
        }
        let self_loops = graph.edges().filter(|&(src, dst)| src == dst).count();

        let possible = node_count as f64 * (node_count as f64 - 1.0);
        let density = if possible > 0.0 { edge_count as f64 / possible } else { 0.0 };

        Self {
            node_count,
            edge_count,
            avg_degree: degrees.iter().mean(),
            max_degree,
            degree_std_dev: degrees.iter().population_std_dev(),
            dangling_nodes,
            self_loops,
            density,
        }
    }

    /// Out-degree histogram with one bucket per degree up to `max_bucket`,
    /// the last bucket collecting everything above
    pub fn degree_distribution(graph: &GraphStore, max_bucket: usize) -> Vec<usize> {
        let mut buckets = vec![0usize; max_bucket + 1];
        for node in 0..graph.node_count() {
            buckets[graph.degree(node).min(max_bucket)] += 1;
        }
        buckets
    }
}
