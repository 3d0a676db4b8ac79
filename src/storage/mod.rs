//! Results persistence module

use anyhow::{Context, Result};
use crate::analysis::AnalysisReport;
use crate::graph::{GraphMetrics, GraphStore};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use serde::Serialize;
use serde_json::{json, to_string_pretty};

/// Highest out-degree bucket in `graph_stats.json`; larger degrees share it
const DEGREE_BUCKETS: usize = 100;

/// Save analysis results to the specified directory
pub fn save_results(report: &AnalysisReport, graph: &GraphStore, output_dir: &Path) -> Result<()> {
    log::info!("Saving analysis results to {}", output_dir.display());

    // Ensure output directory exists
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    save_summary(report, output_dir)?;
    write_json(&output_dir.join("pagerank.json"), &report.pagerank)?;
    save_communities(report, output_dir)?;
    save_partitions(report, output_dir)?;
    save_graph_stats(report, graph, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    file.write_all(to_string_pretty(value)?.as_bytes())
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Save summary information
fn save_summary(report: &AnalysisReport, output_dir: &Path) -> Result<()> {
    log::info!("Saving summary information");

    let largest = report.communities.communities_by_size().first().map_or(0, |c| c.size());

    let summary = json!({
        "graph_stats": {
            "node_count": report.metrics.node_count,
            "edge_count": report.metrics.edge_count,
            "avg_degree": report.metrics.avg_degree,
            "dangling_nodes": report.metrics.dangling_nodes,
        },
        "pagerank": {
            "iterations": report.pagerank.iterations,
            "convergence": report.pagerank.convergence,
            "converged": report.pagerank.converged,
            "total_mass": report.pagerank.total_mass(),
            "top_influencers": report.pagerank.top_influencers,
            "execution_time_ms": report.pagerank.execution_time_ms,
        },
        "communities": {
            "community_count": report.communities.community_count(),
            "largest_community_size": largest,
            "modularity": report.communities.modularity,
            "iterations": report.communities.iterations,
            "converged": report.communities.converged,
            "execution_time_ms": report.communities.execution_time_ms,
        },
        "partitions": {
            "strategy": report.partitions.strategy,
            "num_partitions": report.partitions.num_partitions,
            "edge_cut": report.partitions.edge_cut,
            "balance": report.partitions.balance,
            "replicated_nodes": report.partitions.replicated_count(),
            "execution_time_ms": report.partitions.execution_time_ms,
        }
    });

    write_json(&output_dir.join("summary.json"), &summary)
}

/// Save communities largest first, without the per-node label array
fn save_communities(report: &AnalysisReport, output_dir: &Path) -> Result<()> {
    log::info!("Saving {} communities", report.communities.community_count());

    let communities = json!({
        "modularity": report.communities.modularity,
        "communities": report.communities.communities_by_size().iter().map(|c| {
            json!({
                "id": c.label,
                "size": c.size(),
                "density": c.density,
                "members": c.members,
            })
        }).collect::<Vec<_>>()
    });

    write_json(&output_dir.join("communities.json"), &communities)
}

fn save_partitions(report: &AnalysisReport, output_dir: &Path) -> Result<()> {
    log::info!("Saving partition assignment");

    let sizes: Vec<_> = report
        .partitions
        .partition_sizes()
        .into_iter()
        .map(|(partition, size)| json!({ "partition": partition, "size": size }))
        .collect();

    let partitions = json!({
        "strategy": report.partitions.strategy,
        "edge_cut": report.partitions.edge_cut,
        "balance": report.partitions.balance,
        "partition_sizes": sizes,
        "assignment": report.partitions.partitions,
    });

    write_json(&output_dir.join("partitions.json"), &partitions)
}

/// Save graph statistics
fn save_graph_stats(report: &AnalysisReport, graph: &GraphStore, output_dir: &Path) -> Result<()> {
    log::info!("Saving graph statistics");

    let stats = json!({
        "metrics": report.metrics,
        "degree_distribution": GraphMetrics::degree_distribution(graph, DEGREE_BUCKETS),
    });

    write_json(&output_dir.join("graph_stats.json"), &stats)
}
