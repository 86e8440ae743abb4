//! Robustness is a small toolkit for measuring how social network topologies hold up as nodes
//! disappear, either at random (failure) or highest degree first (attack).
//!
//! # Basic usage
//!
//! The library is centered around the [`Graph`](graph::Graph) structure which can be constructed
//! from one or more [`Edge`](edge::Edge) instances. Simulations never modify the graph they're
//! given, each removal produces a new graph value.
//!
//! ```rust
//! use robustness::edge::Edge;
//! use robustness::graph::Graph;
//! use robustness::history::normalized_robustness;
//! use robustness::simulation::{robustness_by_attack, NoProgress, SimulationConfig};
//!
//! // Two triangles joined through node 3.
//! let graph: Graph<u32> = [(1, 2), (2, 3), (3, 1), (3, 4), (4, 5), (5, 6), (6, 4)]
//!     .into_iter()
//!     .map(Edge::from)
//!     .collect();
//!
//! // Remove two nodes, measuring after each removal.
//! let config = SimulationConfig::new(2, 1).unwrap();
//! let history = robustness_by_attack(&graph, &config, &mut NoProgress).unwrap();
//!
//! // Node 3 goes first: the triangle 4-5-6 holds 3 edges among 5 nodes. Node 4 goes next.
//! assert_eq!(history.giant_fractions, vec![3.0 / 5.0, 1.0 / 4.0]);
//!
//! // Histories are usually compared relative to their first sample.
//! let relative = normalized_robustness(&history.giant_fractions).unwrap();
//! assert_eq!(relative[0], 1.0);
//! ```

pub mod cli;
pub mod edge;
pub mod edgelist;
pub mod error;
pub mod graph;
pub mod history;
pub mod logging;
pub mod metrics;
pub mod plot;
pub mod simulation;
pub mod stats;
pub mod strategy;

pub use error::{Error, Result};
