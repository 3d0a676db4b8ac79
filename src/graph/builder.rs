//! Graph construction module

use crate::error::{GraphError, GraphResult};
use crate::graph::GraphStore;

/// Builder for constructing a GraphStore from validated edges
#[derive(Debug, Default)]
pub struct GraphBuilder {
    /// Declared node count; ids must stay below it when set
    declared_nodes: Option<usize>,

    /// Edges in input order
    edges: Vec<(u32, u32)>,

    /// Largest id seen so far, plus one
    node_count: usize,
}

impl GraphBuilder {
    /// Create a builder that sizes the graph from the ids it sees
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for exactly `node_count` nodes
    pub fn with_node_count(node_count: usize) -> Self {
        Self {
            declared_nodes: Some(node_count),
            edges: Vec::new(),
            node_count,
        }
    }

    /// Pre-allocate room for `edge_count` edges
    pub fn reserve(&mut self, edge_count: usize) {
        self.edges.reserve(edge_count);
    }

    /// Number of edges added so far
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Add a directed edge, validating both endpoints
    pub fn add_edge(&mut self, src: i64, dst: i64) -> GraphResult<()> {
        let index = self.edges.len();
        let src_idx = self.validate_id(index, src, dst, src)?;
        let dst_idx = self.validate_id(index, src, dst, dst)?;

        self.edges.push((src_idx, dst_idx));
        self.node_count = self.node_count.max(src_idx as usize + 1).max(dst_idx as usize + 1);

        Ok(())
    }

    /// Add every edge from an iterator, stopping at the first invalid one
    pub fn extend<I>(&mut self, edges: I) -> GraphResult<()>
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        let edges = edges.into_iter();
        self.reserve(edges.size_hint().0);
        for (src, dst) in edges {
            self.add_edge(src, dst)?;
        }
        Ok(())
    }

    fn validate_id(&self, index: usize, src: i64, dst: i64, id: i64) -> GraphResult<u32> {
        let invalid = |reason: String| GraphError::InvalidEdge { index, src, dst, reason };

        if id < 0 {
            return Err(invalid(format!("negative node id {}", id)));
        }
        // u32::MAX is kept free so that `id + 1` always fits the node count
        if id >= u32::MAX as i64 {
            return Err(invalid(format!("node id {} exceeds the supported range", id)));
        }
        if let Some(limit) = self.declared_nodes {
            if id as usize >= limit {
                return Err(invalid(format!("node id {} outside declared node count {}", id, limit)));
            }
        }

        Ok(id as u32)
    }

    /// Build the compressed graph
    pub fn build(self) -> GraphResult<GraphStore> {
        let node_count = self.node_count;
        let edge_count = self.edges.len();

        log::debug!("Building graph store with {} nodes and {} edges", node_count, edge_count);

        // First pass: out-degree per node
        let mut degrees = vec![0usize; node_count];
        for &(src, _) in &self.edges {
            degrees[src as usize] += 1;
        }

        // Create offsets array
        let mut offsets = Vec::with_capacity(node_count + 1);
        offsets.push(0);

        let mut offset = 0;
        for &degree in &degrees {
            offset += degree;
            offsets.push(offset);
        }

        // Second pass: fill targets, each source's cursor only moves forward
        let mut targets = vec![0u32; edge_count];
        let mut cursor = vec![0usize; node_count];
        for &(src, dst) in &self.edges {
            let src = src as usize;
            targets[offsets[src] + cursor[src]] = dst;
            cursor[src] += 1;
        }

        Ok(GraphStore {
            node_count,
            offsets,
            targets,
        })
    }
}
