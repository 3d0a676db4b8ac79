//! Edge-list input

pub mod edgelist;
pub mod parquet;

use std::path::Path;

use anyhow::Result;

pub use parquet::EdgeColumns;

/// Load edges from a Parquet file (by `.parquet` extension) or a text edge list
pub fn load_edges(path: &Path, columns: &EdgeColumns) -> Result<Vec<(i64, i64)>> {
    let is_parquet = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("parquet"));

    if is_parquet {
        parquet::load_edges(&path.to_string_lossy(), columns)
    } else {
        edgelist::load_edges(path)
    }
}
