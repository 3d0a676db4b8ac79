use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use graph_analytics_engine::data::{self, EdgeColumns};
use graph_analytics_engine::partition::PartitionStrategy;
use graph_analytics_engine::{run_analyses, storage, Config, GraphStore};

#[derive(Parser, Debug)]
#[clap(
    name = "graph-analytics-engine",
    about = "PageRank, community detection and partitioning over large directed graphs"
)]
struct Cli {
    /// Path to input edge list (.parquet, or whitespace/comma separated text)
    #[clap(long)]
    input: PathBuf,

    /// Output directory for results
    #[clap(long, default_value = "analysis_results")]
    output_dir: PathBuf,

    /// Source column name for Parquet input
    #[clap(long, default_value = "src")]
    source_column: String,

    /// Target column name for Parquet input
    #[clap(long, default_value = "dst")]
    target_column: String,

    /// PageRank convergence tolerance
    #[clap(long, default_value = "0.0001")]
    tolerance: f64,

    /// PageRank iteration cap
    #[clap(long, default_value = "100")]
    max_iterations: usize,

    /// PageRank damping factor
    #[clap(long, default_value = "0.85")]
    damping: f64,

    /// Comma separated seed nodes for personalized PageRank
    #[clap(long, value_delimiter = ',')]
    personalize: Vec<usize>,

    /// Label propagation sweep cap
    #[clap(long, default_value = "50")]
    lp_iterations: usize,

    /// Seed for label propagation
    #[clap(long)]
    seed: Option<u64>,

    /// Number of partitions
    #[clap(long, default_value = "4")]
    partitions: usize,

    /// Partitioning strategy
    #[clap(long, value_enum, default_value = "hash")]
    strategy: StrategyArg,

    /// Abort the analyses after this many seconds
    #[clap(long)]
    timeout_secs: Option<u64>,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    Hash,
    Multilevel,
    RoundRobin,
}

impl From<StrategyArg> for PartitionStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Hash => PartitionStrategy::Hash,
            StrategyArg::Multilevel => PartitionStrategy::Multilevel,
            StrategyArg::RoundRobin => PartitionStrategy::RoundRobin,
        }
    }
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            damping_factor: self.damping,
            personalize: self.personalize.clone(),
            community_max_iterations: self.lp_iterations,
            seed: self.seed,
            num_partitions: self.partitions,
            partition_strategy: self.strategy.into(),
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    log::info!("Starting graph analysis");
    log::info!("Input: {}", args.input.display());
    log::info!("Output: {}", args.output_dir.display());

    // 1. Load edges
    let columns = EdgeColumns {
        source: args.source_column.clone(),
        target: args.target_column.clone(),
    };
    let edges = data::load_edges(&args.input, &columns)?;

    // 2. Build the compressed store
    let start = Instant::now();
    let graph = GraphStore::from_edges(edges).context("building graph store")?;
    log::info!(
        "Built graph with {} nodes and {} edges in {:.2?} ({} bytes)",
        graph.node_count(),
        graph.edge_count(),
        start.elapsed(),
        graph.memory_usage()
    );

    // 3. Run analyses
    let report = run_analyses(&graph, &args.config()).context("running analyses")?;

    log::info!(
        "PageRank: {} iterations, converged = {}",
        report.pagerank.iterations,
        report.pagerank.converged
    );
    log::info!(
        "Found {} communities (modularity {:.4})",
        report.communities.community_count(),
        report.communities.modularity
    );
    log::info!(
        "Partitioned into {} parts: edge cut {}, balance {:.4}",
        report.partitions.num_partitions,
        report.partitions.edge_cut,
        report.partitions.balance
    );

    // 4. Save results
    storage::save_results(&report, &graph, &args.output_dir)?;

    log::info!("Analysis complete. Results saved to {}", args.output_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_flag_maps_onto_library_enum() {
        let cli = Cli::try_parse_from([
            "graph-analytics-engine",
            "--input",
            "edges.txt",
            "--strategy",
            "round-robin",
            "--personalize",
            "0,3",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.partition_strategy, PartitionStrategy::RoundRobin);
        assert_eq!(config.personalize, vec![0, 3]);
    }
}
