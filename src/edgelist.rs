//! Loading graphs from edge-list files.
//!
//! The expected layout is a header line, which is skipped, followed by one edge per line given as
//! two whitespace separated integer node ids. Blank lines are ignored.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use tracing::{info, instrument};

use crate::{
    edge::Edge,
    error::{Error, Result},
    graph::Graph,
};

/// Node id type produced by the loader.
pub type NodeId = u64;

/// Parses an edge list from `reader`.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] if a line doesn't hold exactly two integers, [`Error::Io`]
/// if reading fails.
///
/// # Examples
///
/// ```
/// use robustness::edgelist::read_edge_list;
///
/// let graph = read_edge_list("Source\tTarget\n1\t2\n2\t3\n".as_bytes()).unwrap();
///
/// assert_eq!(graph.vertex_count(), 3);
/// assert_eq!(graph.edge_count(), 2);
/// ```
pub fn read_edge_list(reader: impl BufRead) -> Result<Graph<NodeId>> {
    let mut graph = Graph::new();

    for (i, line) in reader.lines().enumerate().skip(1) {
        let line = line.map_err(|source| Error::io("<edge list>", source))?;
        let number = i + 1;

        if line.trim().is_empty() {
            continue;
        }

        graph.insert(parse_edge(number, &line)?);
    }

    Ok(graph)
}

/// Loads the edge list stored at `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file can't be opened or read, [`Error::MalformedInput`] if a line
/// doesn't hold exactly two integers.
#[instrument(name = "edgelist.load", err, skip_all, fields(path = %path.display()))]
pub fn load_edge_list(path: &Path) -> Result<Graph<NodeId>> {
    let file = File::open(path).map_err(|source| Error::io(path, source))?;

    let graph = read_edge_list(BufReader::new(file)).map_err(|err| match err {
        Error::Io { source, .. } => Error::io(path, source),
        other => other,
    })?;

    info!(
        nodes = graph.vertex_count(),
        edges = graph.edge_count(),
        "loaded edge list"
    );

    Ok(graph)
}

fn parse_edge(number: usize, line: &str) -> Result<Edge<NodeId>> {
    let mut tokens = line.split_whitespace();

    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(source), Some(target), None) => {
            Ok(Edge::new(parse_id(number, source)?, parse_id(number, target)?))
        }
        _ => Err(Error::malformed(number, "expected two node ids")),
    }
}

fn parse_id(number: usize, token: &str) -> Result<NodeId> {
    token
        .parse()
        .map_err(|_| Error::malformed(number, format!("`{token}` is not a node id")))
}
