//! Parquet file handling for edge lists

use anyhow::{anyhow, Context, Result};
use polars::prelude::*;

/// Column names holding the edge endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeColumns {
    pub source: String,
    pub target: String,
}

impl Default for EdgeColumns {
    fn default() -> Self {
        Self {
            source: "src".to_string(),
            target: "dst".to_string(),
        }
    }
}

/// Load `(src, dst)` pairs from two integer columns of a Parquet file
pub fn load_edges(path: &str, columns: &EdgeColumns) -> Result<Vec<(i64, i64)>> {
    log::info!("Reading parquet file: {}", path);

    // Check if the file exists
    if !std::path::Path::new(path).exists() {
        return Err(anyhow!("File not found: {}", path));
    }

    let df = LazyFrame::scan_parquet(path, Default::default())?
        .select([col(columns.source.as_str()), col(columns.target.as_str())])
        .collect()
        .with_context(|| format!("reading columns {:?} and {:?} from {}", columns.source, columns.target, path))?;

    log::info!("Loaded {} edge rows", df.height());

    let sources = df
        .column(&columns.source)?
        .as_materialized_series()
        .cast(&DataType::Int64)?;
    let targets = df
        .column(&columns.target)?
        .as_materialized_series()
        .cast(&DataType::Int64)?;

    let mut edges = Vec::with_capacity(df.height());
    for (row, (src, dst)) in sources.i64()?.into_iter().zip(targets.i64()?.into_iter()).enumerate() {
        match (src, dst) {
            (Some(src), Some(dst)) => edges.push((src, dst)),
            _ => return Err(anyhow!("Null endpoint in row {} of {}", row, path)),
        }
    }

    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::path::Path;

    fn write_parquet(path: &Path, mut df: DataFrame) {
        let file = File::create(path).unwrap();
        ParquetWriter::new(file).finish(&mut df).unwrap();
    }

    #[test]
    fn reads_i32_columns_as_i64_edges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edges.parquet");
        write_parquet(&path, df!("src" => [0i32, 1], "dst" => [1i32, 2]).unwrap());

        let edges = load_edges(&path.to_string_lossy(), &EdgeColumns::default()).unwrap();
        assert_eq!(edges, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn rejects_null_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nulls.parquet");
        let df = df!(
            "src" => [Some(0i32), Some(1), None],
            "dst" => [Some(1i32), Some(2), Some(3)]
        )
        .unwrap();
        write_parquet(&path, df);

        let err = load_edges(&path.to_string_lossy(), &EdgeColumns::default()).unwrap_err();
        assert!(err.to_string().contains("row 2"), "{}", err);
    }

    #[test]
    fn honours_custom_column_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("follows.parquet");
        write_parquet(&path, df!("from" => [4i32, 5], "to" => [5i32, 4]).unwrap());
        let path = path.to_string_lossy();

        let columns = EdgeColumns {
            source: "from".to_string(),
            target: "to".to_string(),
        };
        assert_eq!(load_edges(&path, &columns).unwrap(), vec![(4, 5), (5, 4)]);
        assert!(load_edges(&path, &EdgeColumns::default()).is_err());
    }
}
