//! DAG Module - dependency graph and reference validation
//!
//! - `graph`: `DependencyGraph` snapshot (upstream walk, reachability, cycles)
//! - `validate`: bound `{{field}}` refs vs. variables visible at a node

mod graph;
mod validate;

pub use graph::{DepVec, DependencyGraph, Edge, GraphNode};
pub use validate::{validate_refs, RefReason, UnresolvedRef};
