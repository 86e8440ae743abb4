//! Node removal policies driving the robustness simulations.

use std::fmt::Debug;

use rand::{rngs::SmallRng, seq::IteratorRandom, SeedableRng};

use crate::{
    error::{Error, Result},
    graph::Graph,
};

/// A policy picking which node to remove next.
pub trait RemovalStrategy<T>
where
    T: Copy + Ord + Debug,
{
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Chooses the node to remove from `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExhaustedGraph`] when the graph has no nodes left.
    fn select(&mut self, graph: &Graph<T>) -> Result<T>;

    /// Chooses a node and returns it together with a new graph that no longer contains it. The
    /// input graph is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExhaustedGraph`] when the graph has no nodes left.
    fn select_and_remove(&mut self, graph: &Graph<T>) -> Result<(T, Graph<T>)> {
        let node = self.select(graph)?;
        let remaining = graph.without_node(&node)?;

        Ok((node, remaining))
    }
}

/// Targeted attack: always removes a node of maximum degree.
///
/// Degrees are recomputed from scratch on every call. When several nodes share the maximum degree
/// the smallest id is removed, which makes attack runs reproducible.
///
/// # Examples
///
/// ```
/// use robustness::edge::Edge;
/// use robustness::graph::Graph;
/// use robustness::strategy::{DegreeAttack, RemovalStrategy};
///
/// let mut graph = Graph::new();
/// graph.insert(Edge::new(1, 2));
/// graph.insert(Edge::new(2, 3));
///
/// let (removed, remaining) = DegreeAttack.select_and_remove(&graph).unwrap();
///
/// assert_eq!(removed, 2);
/// assert_eq!(remaining.edge_count(), 0);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct DegreeAttack;

impl<T> RemovalStrategy<T> for DegreeAttack
where
    T: Copy + Ord + Debug,
{
    fn name(&self) -> &'static str {
        "attack"
    }

    fn select(&mut self, graph: &Graph<T>) -> Result<T> {
        let degrees = graph.degrees();
        let max_degree = degrees.values().copied().max().ok_or(Error::ExhaustedGraph)?;

        // Degrees are sorted by node, so the first match is the smallest id.
        degrees
            .into_iter()
            .find(|(_, degree)| *degree == max_degree)
            .map(|(node, _)| node)
            .ok_or(Error::ExhaustedGraph)
    }
}

/// Random failure: removes a node picked uniformly at random.
#[derive(Clone, Debug)]
pub struct RandomFailure {
    rng: SmallRng,
}

impl RandomFailure {
    /// Creates a failure strategy with a reproducible sequence of picks.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Creates a failure strategy seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }
}

impl<T> RemovalStrategy<T> for RandomFailure
where
    T: Copy + Ord + Debug,
{
    fn name(&self) -> &'static str {
        "failure"
    }

    fn select(&mut self, graph: &Graph<T>) -> Result<T> {
        graph
            .vertices()
            .choose(&mut self.rng)
            .copied()
            .ok_or(Error::ExhaustedGraph)
    }
}
