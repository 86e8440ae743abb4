//! Descriptive degree statistics of a graph.

use std::{collections::BTreeMap, fmt::Debug};

use nalgebra::DVector;

use crate::{
    error::{Error, Result},
    graph::Graph,
};

/// Headline figures for a graph.
#[derive(Clone, Debug, PartialEq)]
pub struct DegreeSummary {
    /// Number of nodes, isolated ones included.
    pub nodes: usize,
    /// Number of undirected edges.
    pub edges: usize,
    /// Mean node degree, `2E / N`.
    pub average_degree: f64,
    /// Share of the possible edges present, see [`Graph::density`].
    pub density: f64,
    /// Degree mapped to the number of nodes having it.
    pub distribution: BTreeMap<usize, usize>,
}

/// Computes the [`DegreeSummary`] of a graph.
///
/// # Errors
///
/// Returns [`Error::EmptyGraph`] when the graph has no nodes.
pub fn summarize<T>(graph: &Graph<T>) -> Result<DegreeSummary>
where
    T: Copy + Ord + Debug,
{
    Ok(DegreeSummary {
        nodes: graph.vertex_count(),
        edges: graph.edge_count(),
        average_degree: average_degree(graph)?,
        density: graph.density(),
        distribution: degree_distribution(graph),
    })
}

/// Counts how many nodes have each degree.
///
/// # Examples
///
/// ```
/// use robustness::edge::Edge;
/// use robustness::graph::Graph;
/// use robustness::stats::degree_distribution;
///
/// let mut graph = Graph::new();
/// graph.insert(Edge::new(1, 2));
/// graph.insert(Edge::new(1, 3));
///
/// assert_eq!(
///     degree_distribution(&graph).into_iter().collect::<Vec<_>>(),
///     vec![(1, 2), (2, 1)]
/// );
/// ```
pub fn degree_distribution<T>(graph: &Graph<T>) -> BTreeMap<usize, usize>
where
    T: Copy + Ord + Debug,
{
    let mut distribution = BTreeMap::new();
    for degree in graph.degrees().into_values() {
        *distribution.entry(degree).or_insert(0) += 1;
    }

    distribution
}

/// Returns the mean node degree, `2E / N`.
///
/// # Errors
///
/// Returns [`Error::EmptyGraph`] when the graph has no nodes.
pub fn average_degree<T>(graph: &Graph<T>) -> Result<f64>
where
    T: Copy + Ord + Debug,
{
    if graph.is_empty() {
        return Err(Error::EmptyGraph);
    }

    let degrees = graph.degrees();
    let vector = DVector::from_iterator(degrees.len(), degrees.values().map(|d| *d as f64));

    Ok(vector.mean())
}

/// Averages a degree distribution over logarithmically sized bins, smoothing the noisy tail of
/// heavy-tailed distributions.
///
/// `bins` edges are spread evenly in log space from the smallest positive degree to the larger
/// of the highest degree and the highest count. Every bin holding at least one degree yields
/// `(mean degree, mean count)` over the degrees falling into it. Bins are half-open except the
/// last, which includes its upper edge. Degree zero can't be placed on a log scale and is left
/// out.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if `bins` is below 2.
pub fn log_binning(distribution: &BTreeMap<usize, usize>, bins: usize) -> Result<Vec<(f64, f64)>> {
    if bins < 2 {
        return Err(Error::InvalidParameter {
            name: "bins",
            reason: format!("need at least 2 bin edges, got {bins}"),
        });
    }

    let points: Vec<(f64, f64)> = distribution
        .iter()
        .filter(|(degree, _)| **degree > 0)
        .map(|(degree, count)| (*degree as f64, *count as f64))
        .collect();

    let (Some(&(min_x, _)), Some(&(max_x, _))) = (points.first(), points.last()) else {
        return Ok(Vec::new());
    };
    let max_y = points.iter().map(|(_, count)| *count).fold(0.0, f64::max);
    let upper = max_x.max(max_y);

    let edges = log_space(min_x, upper, bins);
    let last = bins - 2;

    // Per bin: sum of degrees, sum of counts, number of degrees.
    let mut sums = vec![(0.0, 0.0, 0_usize); bins - 1];
    for (degree, count) in points {
        let slot = edges
            .windows(2)
            .position(|edge| degree >= edge[0] && degree < edge[1])
            .or_else(|| (degree == upper).then_some(last));

        if let Some(slot) = slot {
            let (x, y, n) = &mut sums[slot];
            *x += degree;
            *y += count;
            *n += 1;
        }
    }

    Ok(sums
        .into_iter()
        .filter(|(_, _, n)| *n > 0)
        .map(|(x, y, n)| (x / n as f64, y / n as f64))
        .collect())
}

/// Returns `count` values spread evenly in log space between `start` and `end`, both included
/// exactly.
fn log_space(start: f64, end: f64, count: usize) -> Vec<f64> {
    let (low, high) = (start.log10(), end.log10());
    let step = (high - low) / (count - 1) as f64;

    (0..count)
        .map(|i| match i {
            0 => start,
            i if i == count - 1 => end,
            i => 10_f64.powf(low + step * i as f64),
        })
        .collect()
}
