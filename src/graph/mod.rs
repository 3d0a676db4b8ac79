//! Graph representation and construction module

pub mod compressed;
pub mod builder;
pub mod metrics;

pub use compressed::GraphStore;
pub use builder::GraphBuilder;
pub use metrics::GraphMetrics;
