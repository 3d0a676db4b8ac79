//! Plain-text edge lists

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{anyhow, Context, Result};

/// Read one `src dst` pair per line.
///
/// Endpoints may be separated by whitespace or a comma. Blank lines and lines
/// starting with `#` or `%` are skipped; extra columns (weights, timestamps)
/// are ignored.
pub fn parse_edges<R: Read>(reader: R) -> Result<Vec<(i64, i64)>> {
    let mut edges = Vec::new();

    for (number, line) in BufReader::new(reader).lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", number + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('%') {
            continue;
        }

        let mut fields = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty());

        let (src, dst) = match (fields.next(), fields.next()) {
            (Some(src), Some(dst)) => (src, dst),
            _ => return Err(anyhow!("line {}: expected two node ids, got {:?}", number + 1, trimmed)),
        };

        let src: i64 = src
            .parse()
            .with_context(|| format!("line {}: invalid source id {:?}", number + 1, src))?;
        let dst: i64 = dst
            .parse()
            .with_context(|| format!("line {}: invalid target id {:?}", number + 1, dst))?;

        edges.push((src, dst));
    }

    Ok(edges)
}

/// Read an edge list file
pub fn load_edges(path: &Path) -> Result<Vec<(i64, i64)>> {
    log::info!("Reading edge list: {}", path.display());
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let edges = parse_edges(file).with_context(|| format!("parsing {}", path.display()))?;
    log::info!("Loaded {} edges", edges.len());
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_separators_and_comments() {
        let input = "# comment\n0 1\n\n1,2\n% another\n2\t3 0.5\n";
        let edges = parse_edges(input.as_bytes()).unwrap();
        assert_eq!(edges, vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn keeps_negative_ids_for_the_builder_to_reject() {
        let edges = parse_edges("-1 4\n".as_bytes()).unwrap();
        assert_eq!(edges, vec![(-1, 4)]);
    }

    #[test]
    fn reports_the_failing_line() {
        let err = parse_edges("0 1\n1 x\n".as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));

        let err = parse_edges("0 1\n7\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
