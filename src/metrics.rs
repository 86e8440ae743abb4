//! Structural measurements taken on a graph between removals.

use std::{collections::VecDeque, fmt::Debug};

use crate::{
    error::{Error, Result},
    graph::Graph,
};

/// Path-length summary of a graph, computed over every ordered pair of connected nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PathStats {
    /// Longest shortest path between any two connected nodes.
    pub diameter: usize,
    /// Sum of all shortest path lengths divided by `N * (N - 1)`.
    pub average_path_length: f64,
}

/// Computes the diameter and the average shortest path length of the graph.
///
/// Every node is used as a BFS source. Pairs that aren't connected contribute nothing to either
/// value, they aren't treated as infinitely far apart. The average is still taken over all
/// `N * (N - 1)` ordered pairs, so fragmentation pulls it down. Graphs with fewer than two nodes
/// have no pairs and yield zeros.
///
/// This runs in `O(V * (V + E))`, by far the most expensive measurement in a simulation.
///
/// # Examples
///
/// ```
/// use robustness::edge::Edge;
/// use robustness::graph::Graph;
/// use robustness::metrics::diameter_and_average_path_length;
///
/// let mut graph = Graph::new();
/// graph.insert(Edge::new(1, 2));
/// graph.insert(Edge::new(2, 3));
///
/// let stats = diameter_and_average_path_length(&graph);
/// assert_eq!(stats.diameter, 2);
/// assert_eq!(stats.average_path_length, 8.0 / 6.0);
/// ```
pub fn diameter_and_average_path_length<T>(graph: &Graph<T>) -> PathStats
where
    T: Copy + Ord + Debug,
{
    let n = graph.vertex_count();
    if n <= 1 {
        return PathStats::default();
    }

    let indices = graph.index_lists();
    let mut diameter = 0;
    let mut total: u64 = 0;

    for source in 0..n {
        let (eccentricity, sum) = distances_from(source, &indices);
        diameter = diameter.max(eccentricity);
        total += sum;
    }

    let pairs = n as f64 * (n as f64 - 1.0);

    PathStats {
        diameter,
        average_path_length: total as f64 / pairs,
    }
}

/// Returns the fraction the giant component represents, as the edge count of the component with
/// the most edges over the node count of the whole graph.
///
/// Selecting on edges rather than nodes means a small but dense component can win over a larger
/// sparse one. Ties go to the component holding the smallest node.
///
/// # Errors
///
/// Returns [`Error::EmptyGraph`] when the graph has no nodes.
///
/// # Examples
///
/// ```
/// use robustness::edge::Edge;
/// use robustness::graph::Graph;
/// use robustness::metrics::giant_component_fraction;
///
/// let mut graph = Graph::new();
/// graph.insert(Edge::new(1, 2));
/// graph.insert(Edge::new(2, 3));
/// graph.insert(Edge::new(4, 5));
///
/// assert_eq!(giant_component_fraction(&graph).unwrap(), 0.4);
/// ```
pub fn giant_component_fraction<T>(graph: &Graph<T>) -> Result<f64>
where
    T: Copy + Ord + Debug,
{
    if graph.is_empty() {
        return Err(Error::EmptyGraph);
    }

    let giant = largest_component_by(graph, Graph::edge_count);
    Ok(giant as f64 / graph.vertex_count() as f64)
}

/// Returns the node count of the component with the most nodes over the node count of the whole
/// graph, the conventional definition of the giant component fraction.
///
/// Useful next to [`giant_component_fraction`] to spot where the two definitions diverge.
///
/// # Errors
///
/// Returns [`Error::EmptyGraph`] when the graph has no nodes.
pub fn giant_component_node_fraction<T>(graph: &Graph<T>) -> Result<f64>
where
    T: Copy + Ord + Debug,
{
    if graph.is_empty() {
        return Err(Error::EmptyGraph);
    }

    let giant = largest_component_by(graph, Graph::vertex_count);
    Ok(giant as f64 / graph.vertex_count() as f64)
}

/// Returns the edge count of the component with the most nodes over the node count of the whole
/// graph.
///
/// This mixes the two definitions above: the component is chosen like
/// [`giant_component_node_fraction`] does, then measured like [`giant_component_fraction`] does.
/// Ties go to the component holding the smallest node.
///
/// # Errors
///
/// Returns [`Error::EmptyGraph`] when the graph has no nodes.
///
/// # Examples
///
/// ```
/// use robustness::edge::Edge;
/// use robustness::graph::Graph;
/// use robustness::metrics::largest_component_edge_fraction;
///
/// // A triangle, then a 4-node path.
/// let graph: Graph<u32> = [(1, 2), (2, 3), (3, 1), (4, 5), (5, 6), (6, 7)]
///     .into_iter()
///     .map(Edge::from)
///     .collect();
///
/// assert_eq!(largest_component_edge_fraction(&graph).unwrap(), 3.0 / 7.0);
/// ```
pub fn largest_component_edge_fraction<T>(graph: &Graph<T>) -> Result<f64>
where
    T: Copy + Ord + Debug,
{
    if graph.is_empty() {
        return Err(Error::EmptyGraph);
    }

    let mut best: Option<Graph<T>> = None;
    for component in graph.connected_components() {
        let larger = best
            .as_ref()
            .map_or(true, |current| component.vertex_count() > current.vertex_count());
        if larger {
            best = Some(component);
        }
    }

    let edges = best.map_or(0, |component| component.edge_count());
    Ok(edges as f64 / graph.vertex_count() as f64)
}

//
// Helpers
//

/// Picks the component maximising `size` and returns that size. On ties the first component in
/// enumeration order is kept.
fn largest_component_by<T, F>(graph: &Graph<T>, size: F) -> usize
where
    T: Copy + Ord + Debug,
    F: Fn(&Graph<T>) -> usize,
{
    graph
        .connected_components()
        .iter()
        .map(size)
        .fold(0, usize::max)
}

/// Runs a BFS from `source` over the index lists, returns the largest distance reached and the
/// sum of all distances.
fn distances_from(source: usize, indices: &[Vec<usize>]) -> (usize, u64) {
    let mut deltas: Vec<Option<usize>> = vec![None; indices.len()];
    let mut queue: VecDeque<usize> = VecDeque::new();

    deltas[source] = Some(0);
    queue.push_back(source);

    let mut eccentricity = 0;
    let mut sum = 0;

    while let Some(current) = queue.pop_front() {
        let next = deltas[current].unwrap_or_default() + 1;

        for &neighbour in &indices[current] {
            if deltas[neighbour].is_none() {
                deltas[neighbour] = Some(next);
                queue.push_back(neighbour);

                eccentricity = next;
                sum += next as u64;
            }
        }
    }

    (eccentricity, sum)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::graph::tests::graph;

    #[rstest]
    #[case::empty(Graph::new())]
    #[case::single_node(single_node())]
    fn path_stats_are_zero_without_pairs(#[case] graph: Graph<u32>) {
        assert_eq!(
            diameter_and_average_path_length(&graph),
            PathStats {
                diameter: 0,
                average_path_length: 0.0
            }
        );
    }

    fn single_node() -> Graph<u32> {
        let mut graph = Graph::new();
        graph.add_node(1);
        graph
    }

    #[test]
    fn path_stats_of_three_node_path() {
        let graph = graph!([1, 2, 3]);

        let stats = diameter_and_average_path_length(&graph);

        assert_eq!(stats.diameter, 2);
        // Ordered pairs: 2 * (1 + 1 + 2) over 3 * 2.
        assert!((stats.average_path_length - 8.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn path_stats_of_cycle() {
        let graph = graph!([1, 2, 3, 4, 1]);

        let stats = diameter_and_average_path_length(&graph);

        assert_eq!(stats.diameter, 2);
        // Each node sees two neighbours at 1 and one node at 2: 4 * 4 / 12.
        assert!((stats.average_path_length - 16.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn path_stats_ignore_unreachable_pairs() {
        let mut graph = graph!([1, 2, 3], [4, 5]);
        graph.add_node(6);

        let stats = diameter_and_average_path_length(&graph);

        assert_eq!(stats.diameter, 2);
        // Path contributes 8, the pair contributes 2, over 6 * 5 ordered pairs.
        assert!((stats.average_path_length - 10.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn distances_from_reports_eccentricity_and_sum() {
        // 0 - 1 - 2, 3 isolated.
        let indices = vec![vec![1], vec![0, 2], vec![1], vec![]];

        assert_eq!(distances_from(0, &indices), (2, 3));
        assert_eq!(distances_from(1, &indices), (1, 2));
        assert_eq!(distances_from(3, &indices), (0, 0));
    }

    #[test]
    fn giant_component_picks_densest_component() {
        let graph = graph!([1, 2, 3], [4, 5]);

        assert_eq!(giant_component_fraction(&graph).unwrap(), 2.0 / 5.0);
    }

    #[test]
    fn giant_component_definitions_diverge() {
        // A triangle (3 nodes, 3 edges) next to a path (4 nodes, 3 edges).
        let graph = graph!([1, 2, 3, 1], [4, 5, 6, 7]);

        // Both have three edges, the triangle comes first.
        assert_eq!(giant_component_fraction(&graph).unwrap(), 3.0 / 7.0);
        assert_eq!(giant_component_node_fraction(&graph).unwrap(), 4.0 / 7.0);

        // A 4-clique beats a 5-node path on edges but not on nodes.
        let graph = graph!([1, 2, 3, 4, 1, 3], [2, 4], [10, 11, 12, 13, 14]);
        assert_eq!(giant_component_fraction(&graph).unwrap(), 6.0 / 9.0);
        assert_eq!(giant_component_node_fraction(&graph).unwrap(), 5.0 / 9.0);
    }

    #[rstest]
    // The 5-node path wins on nodes but only brings 4 edges.
    #[case::clique_and_path(graph!([1, 2, 3, 4, 1, 3], [2, 4], [10, 11, 12, 13, 14]), 4.0 / 9.0)]
    // Node counts tie, the component holding node 1 is kept.
    #[case::tied_sizes(graph!([1, 2, 3, 1], [4, 5, 6]), 3.0 / 6.0)]
    #[case::single_component(graph!([1, 2, 3, 4]), 3.0 / 4.0)]
    fn largest_component_edge_fraction_selects_on_nodes(
        #[case] graph: Graph<u32>,
        #[case] expected: f64,
    ) {
        assert_eq!(largest_component_edge_fraction(&graph).unwrap(), expected);
    }

    #[test]
    fn largest_component_edge_fraction_diverges_from_edge_selection() {
        let graph = graph!([1, 2, 3, 4, 1, 3], [2, 4], [10, 11, 12, 13, 14]);

        assert_ne!(
            largest_component_edge_fraction(&graph).unwrap(),
            giant_component_fraction(&graph).unwrap()
        );
    }

    #[test]
    fn giant_component_of_isolated_nodes_is_zero() {
        let mut graph: Graph<u32> = Graph::new();
        graph.add_node(1);
        graph.add_node(2);

        assert_eq!(giant_component_fraction(&graph).unwrap(), 0.0);
        assert_eq!(giant_component_node_fraction(&graph).unwrap(), 0.5);
    }

    #[test]
    fn giant_component_of_empty_graph_fails() {
        let graph: Graph<u32> = Graph::new();

        assert!(matches!(
            giant_component_fraction(&graph),
            Err(Error::EmptyGraph)
        ));
        assert!(matches!(
            giant_component_node_fraction(&graph),
            Err(Error::EmptyGraph)
        ));
        assert!(matches!(
            largest_component_edge_fraction(&graph),
            Err(Error::EmptyGraph)
        ));
    }
}
