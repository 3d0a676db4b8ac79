//! Memory-efficient graph representation

use std::mem;
use serde::{Serialize, Deserialize};

use crate::error::{GraphError, GraphResult};
use crate::graph::builder::GraphBuilder;

/// Compressed sparse row representation of a directed graph.
///
/// Built once from an edge list and immutable afterwards, so a single store can
/// be shared by any number of analyses and threads without locking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStore {
    /// Number of nodes in the graph
    pub(crate) node_count: usize,

    /// Offset array: index where each node's edges begin
    /// offsets[i] to offsets[i+1] defines the edge range for node i
    pub(crate) offsets: Vec<usize>,

    /// Edge array: concatenated out-neighbour lists, in input order per source
    pub(crate) targets: Vec<u32>,
}

impl GraphStore {
    /// Build a store from `(src, dst)` pairs.
    ///
    /// The node count is one more than the largest id seen. Negative ids and
    /// ids that do not fit the compact target array fail with `InvalidEdge`.
    pub fn from_edges<I>(edges: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        let mut builder = GraphBuilder::new();
        builder.extend(edges)?;
        builder.build()
    }

    /// Build a store with a declared node count; every id must be below it
    pub fn with_node_count<I>(node_count: usize, edges: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        let mut builder = GraphBuilder::with_node_count(node_count);
        builder.extend(edges)?;
        builder.build()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of stored edges, duplicates and self-loops included
    pub fn edge_count(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Out-neighbours of a node in the order their edges were supplied.
    ///
    /// # Panics
    ///
    /// Panics if `node >= self.node_count()`. Use [`GraphStore::try_neighbors`]
    /// for unchecked input.
    pub fn neighbors(&self, node: usize) -> &[u32] {
        let start = self.offsets[node];
        let end = self.offsets[node + 1];
        &self.targets[start..end]
    }

    /// Get out-degree of a node
    ///
    /// # Panics
    ///
    /// Panics if `node >= self.node_count()`.
    pub fn degree(&self, node: usize) -> usize {
        self.offsets[node + 1] - self.offsets[node]
    }

    pub fn try_neighbors(&self, node: usize) -> GraphResult<&[u32]> {
        self.check_node(node)?;
        Ok(self.neighbors(node))
    }

    pub fn try_degree(&self, node: usize) -> GraphResult<usize> {
        self.check_node(node)?;
        Ok(self.degree(node))
    }

    /// Iterate all edges as `(src, dst)` in CSR order
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.node_count)
            .flat_map(move |src| self.neighbors(src).iter().map(move |&dst| (src, dst as usize)))
    }

    /// The raw offset array, `node_count + 1` entries
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// The raw flattened target array
    pub fn targets(&self) -> &[u32] {
        &self.targets
    }

    /// Fail with `EmptyGraph` when there is nothing to analyse
    pub(crate) fn ensure_not_empty(&self) -> GraphResult<()> {
        if self.node_count == 0 {
            Err(GraphError::EmptyGraph)
        } else {
            Ok(())
        }
    }

    fn check_node(&self, node: usize) -> GraphResult<()> {
        if node < self.node_count {
            Ok(())
        } else {
            Err(GraphError::NodeOutOfRange { node, node_count: self.node_count })
        }
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let offsets = self.offsets.capacity() * mem::size_of::<usize>();
        let targets = self.targets.capacity() * mem::size_of::<u32>();

        base + offsets + targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cycles() -> GraphStore {
        GraphStore::from_edges(vec![
            (0, 1), (1, 2), (2, 3), (3, 0),
            (0, 4), (4, 5), (5, 6), (6, 0),
        ])
        .unwrap()
    }

    #[test]
    fn stores_counts_and_degrees() {
        let graph = two_cycles();
        assert_eq!(graph.node_count(), 7);
        assert_eq!(graph.edge_count(), 8);
        assert_eq!(graph.degree(0), 2);
        assert_eq!(graph.neighbors(0), &[1, 4]);
        assert_eq!(graph.neighbors(6), &[0]);
    }

    #[test]
    fn offsets_are_prefix_sums_of_degrees() {
        let graph = two_cycles();
        let offsets = graph.offsets();
        assert_eq!(offsets.len(), graph.node_count() + 1);
        assert_eq!(offsets[0], 0);
        assert_eq!(*offsets.last().unwrap(), graph.edge_count());
        for node in 0..graph.node_count() {
            assert_eq!(offsets[node + 1] - offsets[node], graph.degree(node));
        }
    }

    #[test]
    fn keeps_input_order_duplicates_and_self_loops() {
        let graph = GraphStore::from_edges(vec![(2, 5), (0, 3), (2, 1), (2, 5), (2, 2)]).unwrap();
        assert_eq!(graph.node_count(), 6);
        assert_eq!(graph.edge_count(), 5);
        assert_eq!(graph.neighbors(2), &[5, 1, 5, 2]);
        assert_eq!(graph.degree(1), 0);
        assert!(graph.neighbors(4).is_empty());
    }

    #[test]
    fn checked_accessors_report_out_of_range() {
        let graph = two_cycles();
        assert_eq!(graph.try_degree(0), Ok(2));
        assert_eq!(
            graph.try_neighbors(7),
            Err(GraphError::NodeOutOfRange { node: 7, node_count: 7 })
        );
    }

    #[test]
    fn edges_iterates_in_csr_order() {
        let graph = GraphStore::from_edges(vec![(1, 0), (0, 2), (1, 2)]).unwrap();
        let edges: Vec<_> = graph.edges().collect();
        assert_eq!(edges, vec![(0, 2), (1, 0), (1, 2)]);
        assert_eq!(graph.targets(), &[2, 0, 2]);
    }

    #[test]
    fn empty_input_builds_empty_store() {
        let graph = GraphStore::from_edges(Vec::new()).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.ensure_not_empty(), Err(GraphError::EmptyGraph));
    }
}
