//! Topology analysis - dependency graph, ordering, cycles, layering and
//! critical path for recovery steps.

#![warn(missing_docs)]

pub mod graph;
pub mod cycles;
pub mod layers;
pub mod critical;
pub mod summary;

pub use graph::{StepGraph, StepNode, TopologyEdge, DanglingDependency};
pub use layers::{LayerAssignment, waves_from_layers};
pub use critical::CriticalPath;
pub use summary::{TopologySummary, TopologyError, summarize_graph, summarize_topology};
