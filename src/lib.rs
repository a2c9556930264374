//! Level assignment for directed graphs that may contain cycles.
//!
//! Every node gets an integer level so that edges point from lower to higher
//! levels, the members of a cycle share one level, and nodes without edges sit
//! alone on level 0. The renderer bands nodes by these levels before it places
//! them.

mod condense;
mod queue;

pub mod error;
pub mod graph;
pub mod levels;
pub mod options;
pub mod parser;
pub mod report;
pub mod result;

pub use error::Error;
pub use graph::{DiGraph, EdgeId, GraphView, NodeId, Transposed};
pub use levels::{LevelAssigner, assign_levels, assign_levels_reversed};
pub use options::{Direction, LevelOptions, Strategy};
pub use parser::parse_graph;
pub use report::LevelReport;
pub use result::LayoutResult;
