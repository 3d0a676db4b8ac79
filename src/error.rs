//! Error types for graph construction and analysis

use thiserror::Error;

/// Errors returned by the graph store and the analyses built on it
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// An input edge referenced a negative or unrepresentable node id
    #[error("invalid edge #{index} ({src}, {dst}): {reason}")]
    InvalidEdge {
        /// Position of the edge in the input sequence
        index: usize,
        /// Source id as supplied
        src: i64,
        /// Target id as supplied
        dst: i64,
        /// What was wrong with it
        reason: String,
    },

    /// A parameter was outside its valid domain
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The graph has no nodes, so no analysis is defined
    #[error("graph has no nodes")]
    EmptyGraph,

    /// A node id passed to a query is not in the graph
    #[error("node {node} out of range (node count {node_count})")]
    NodeOutOfRange {
        /// The requested node
        node: usize,
        /// Number of nodes in the graph
        node_count: usize,
    },

    /// The run was cancelled through its token
    #[error("analysis cancelled after {iterations} iterations")]
    Cancelled {
        /// Iterations completed before cancellation was observed
        iterations: usize,
    },

    /// The run did not finish before its deadline
    #[error("analysis deadline exceeded after {iterations} iterations")]
    DeadlineExceeded {
        /// Iterations completed before the deadline was observed
        iterations: usize,
    },
}

/// Result alias used throughout the library
pub type GraphResult<T> = Result<T, GraphError>;

impl GraphError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        GraphError::InvalidArgument(message.into())
    }
}

/// Shared validation for iterative analyses
pub(crate) fn check_iteration_params(tolerance: Option<f64>, max_iterations: usize) -> GraphResult<()> {
    if let Some(tolerance) = tolerance {
        if tolerance <= 0.0 || !tolerance.is_finite() {
            return Err(GraphError::invalid_argument(format!(
                "tolerance must be a positive finite number, got {}",
                tolerance
            )));
        }
    }
    if max_iterations == 0 {
        return Err(GraphError::invalid_argument("max_iterations must be greater than zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_tolerance() {
        assert!(check_iteration_params(Some(0.0), 10).is_err());
        assert!(check_iteration_params(Some(-1.0), 10).is_err());
        assert!(check_iteration_params(Some(f64::NAN), 10).is_err());
        assert!(check_iteration_params(Some(1e-6), 10).is_ok());
    }

    #[test]
    fn rejects_zero_iterations() {
        let err = check_iteration_params(None, 0).unwrap_err();
        assert!(matches!(err, GraphError::InvalidArgument(_)));
    }

    #[test]
    fn messages_name_the_problem() {
        let err = GraphError::InvalidEdge {
            index: 3,
            src: -1,
            dst: 2,
            reason: "negative node id".to_string(),
        };
        assert_eq!(err.to_string(), "invalid edge #3 (-1, 2): negative node id");
    }
}
