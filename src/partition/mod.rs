//! Node placement across a fixed number of partitions

pub mod multilevel;
pub mod quality;

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Serialize, Deserialize};

use crate::control::RunControl;
use crate::error::{GraphError, GraphResult};
use crate::graph::GraphStore;

/// Assignment value for a node copied to every partition
pub const REPLICATED: i32 = -1;

/// How nodes are assigned to partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartitionStrategy {
    /// `node mod k`, with the top 1% by degree replicated
    Hash,
    /// Coarsen, round-robin the coarsest graph, then project back and refine
    Multilevel,
    /// `node mod k` for every node, no replication
    RoundRobin,
}

/// Output of one partitioning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionResult {
    /// Partition per node, or [`REPLICATED`]
    pub partitions: Vec<i32>,

    pub num_partitions: usize,

    /// Cross-partition edges between placed nodes, halved
    pub edge_cut: f64,

    /// `1 - max deviation / mean` of placed-node counts, within [0, 1]
    pub balance: f64,

    pub strategy: PartitionStrategy,

    pub execution_time_ms: u64,
}

impl PartitionResult {
    /// Partition of `node`, `None` when replicated or out of range
    pub fn partition_of(&self, node: usize) -> Option<usize> {
        match self.partitions.get(node) {
            Some(&p) if p != REPLICATED => Some(p as usize),
            _ => None,
        }
    }

    pub fn is_replicated(&self, node: usize) -> bool {
        self.partitions.get(node) == Some(&REPLICATED)
    }

    pub fn replicated_count(&self) -> usize {
        self.partitions.iter().filter(|&&p| p == REPLICATED).count()
    }

    /// Node count per assignment value; replicated nodes appear under `-1`
    pub fn partition_sizes(&self) -> BTreeMap<i32, usize> {
        let mut sizes = BTreeMap::new();
        for &p in &self.partitions {
            *sizes.entry(p).or_insert(0) += 1;
        }
        sizes
    }
}

/// Partitions nodes of a shared graph store
#[derive(Debug, Clone)]
pub struct Partitioner<'g> {
    graph: &'g GraphStore,
    control: RunControl,
}

impl<'g> Partitioner<'g> {
    pub fn new(graph: &'g GraphStore) -> Self {
        Self {
            graph,
            control: RunControl::new(),
        }
    }

    /// Cancellation and deadline checked between multilevel stages
    pub fn with_control(mut self, control: RunControl) -> Self {
        self.control = control;
        self
    }

    /// Hash partitioning with replication of high-degree nodes.
    ///
    /// A node whose out-degree is strictly above the 99th-percentile degree is
    /// replicated; every other node goes to `node mod num_partitions`.
    pub fn partition(&self, num_partitions: usize) -> GraphResult<PartitionResult> {
        self.check(num_partitions)?;
        let start = Instant::now();
        let graph = self.graph;
        let k = num_partitions as i32;

        let threshold = quality::degree_threshold(graph);
        let partitions: Vec<i32> = (0..graph.node_count())
            .map(|node| {
                if graph.degree(node) > threshold {
                    REPLICATED
                } else {
                    (node % num_partitions) as i32
                }
            })
            .collect();
        debug_assert!(partitions.iter().all(|&p| p == REPLICATED || (0..k).contains(&p)));

        let replicated = partitions.iter().filter(|&&p| p == REPLICATED).count();
        log::info!(
            "Hash partitioned {} nodes into {} partitions (degree threshold {}, {} replicated)",
            graph.node_count(),
            num_partitions,
            threshold,
            replicated
        );

        Ok(self.finish(partitions, num_partitions, PartitionStrategy::Hash, start))
    }

    /// Multilevel partitioning: heavy-edge coarsening, round-robin on the
    /// coarsest graph, then projection with greedy boundary refinement at
    /// every level. No node is replicated.
    pub fn metis_partition(&self, num_partitions: usize) -> GraphResult<PartitionResult> {
        self.check(num_partitions)?;
        let start = Instant::now();

        let partitions = multilevel::partition(self.graph, num_partitions, &self.control)?;

        Ok(self.finish(partitions, num_partitions, PartitionStrategy::Multilevel, start))
    }

    /// Plain `node mod num_partitions` for every node
    pub fn round_robin(&self, num_partitions: usize) -> GraphResult<PartitionResult> {
        self.check(num_partitions)?;
        let start = Instant::now();

        let partitions = (0..self.graph.node_count())
            .map(|node| (node % num_partitions) as i32)
            .collect();

        Ok(self.finish(partitions, num_partitions, PartitionStrategy::RoundRobin, start))
    }

    pub fn partition_with(
        &self,
        strategy: PartitionStrategy,
        num_partitions: usize,
    ) -> GraphResult<PartitionResult> {
        match strategy {
            PartitionStrategy::Hash => self.partition(num_partitions),
            PartitionStrategy::Multilevel => self.metis_partition(num_partitions),
            PartitionStrategy::RoundRobin => self.round_robin(num_partitions),
        }
    }

    fn check(&self, num_partitions: usize) -> GraphResult<()> {
        self.graph.ensure_not_empty()?;
        if num_partitions == 0 || num_partitions > i32::MAX as usize {
            return Err(GraphError::invalid_argument(format!(
                "number of partitions must be between 1 and {}, got {}",
                i32::MAX,
                num_partitions
            )));
        }
        Ok(())
    }

    fn finish(
        &self,
        partitions: Vec<i32>,
        num_partitions: usize,
        strategy: PartitionStrategy,
        start: Instant,
    ) -> PartitionResult {
        let edge_cut = quality::edge_cut(self.graph, &partitions);
        let balance = quality::balance(&partitions, num_partitions);

        log::info!(
            "{:?} partitioning: edge cut {}, balance {:.4}",
            strategy,
            edge_cut,
            balance
        );

        PartitionResult {
            partitions,
            num_partitions,
            edge_cut,
            balance,
            strategy,
            execution_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}
