//! Errors raised while loading, measuring and simulating graphs.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors produced by the robustness toolkit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An operation referenced a node that isn't part of the graph.
    #[error("node {node} is not in the graph")]
    NodeNotFound {
        /// Debug rendering of the missing node id.
        node: String,
    },
    /// A metric was requested on a graph with zero nodes.
    #[error("cannot measure a graph with no nodes")]
    EmptyGraph,
    /// A removal was requested but no nodes remain.
    #[error("no nodes left to remove")]
    ExhaustedGraph,
    /// An edge-list or history line didn't have the expected shape.
    #[error("malformed input on line {line}: {reason}")]
    MalformedInput {
        /// One-based line number within the input.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },
    /// A parameter was outside its valid range.
    #[error("invalid value for {name}: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// A series can't be normalised against a zero first element.
    #[error("cannot normalise a series whose first value is zero")]
    ZeroBaseline,
    /// Reading or writing a file failed.
    #[error("i/o failure on `{}`: {source}", path.display())]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn node_not_found<T: std::fmt::Debug>(node: &T) -> Self {
        Self::NodeNotFound {
            node: format!("{node:?}"),
        }
    }

    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Shorthand for results carrying an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
