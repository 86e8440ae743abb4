//! A module for working with graphs.

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    fmt::Debug,
};

use crate::{
    edge::Edge,
    error::{Error, Result},
};

/// An undirected, unweighted, simple graph.
///
/// Nodes are kept in a `BTreeMap` so every enumeration (vertices, degrees, components) follows
/// `T`'s implementation of `Ord`. The removal strategies rely on this to break ties
/// deterministically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph<T> {
    /// Each node mapped to the set of its neighbours. Every edge is stored in both directions.
    adjacency: BTreeMap<T, BTreeSet<T>>,
    /// Number of undirected edges, tracked so it doesn't have to be recounted.
    edge_count: usize,
}

impl<T> Default for Graph<T>
where
    T: Copy + Ord + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Graph<T>
where
    T: Copy + Ord + Debug,
{
    /// Creates an empty graph.
    ///
    /// # Examples
    ///
    /// ```
    /// use robustness::graph::Graph;
    ///
    /// let graph: Graph<u64> = Graph::new();
    /// assert!(graph.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            adjacency: BTreeMap::new(),
            edge_count: 0,
        }
    }

    /// Inserts an edge into the graph, adding its endpoints as nodes when they're new.
    ///
    /// Returns whether the edge was added. Self-loops are never stored (the node itself still
    /// is), which keeps the graph simple.
    ///
    /// # Examples
    ///
    /// ```
    /// use robustness::edge::Edge;
    /// use robustness::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    ///
    /// assert!(graph.insert(Edge::new(1, 2)));
    /// assert!(!graph.insert(Edge::new(2, 1)));
    /// assert!(!graph.insert(Edge::new(3, 3)));
    ///
    /// assert_eq!(graph.vertex_count(), 3);
    /// assert_eq!(graph.edge_count(), 1);
    /// ```
    pub fn insert(&mut self, edge: Edge<T>) -> bool {
        let (a, b) = (*edge.source(), *edge.target());
        self.add_node(a);
        self.add_node(b);

        if edge.is_loop() {
            return false;
        }

        let is_inserted = self.adjacency.entry(a).or_default().insert(b);
        if is_inserted {
            self.adjacency.entry(b).or_default().insert(a);
            self.edge_count += 1;
        }

        is_inserted
    }

    /// Adds a node without any edges, returns whether it was new.
    pub fn add_node(&mut self, node: T) -> bool {
        if self.adjacency.contains_key(&node) {
            return false;
        }

        self.adjacency.insert(node, BTreeSet::new());
        true
    }

    /// Removes an edge and returns whether it was present. Both endpoints stay in the graph.
    ///
    /// # Examples
    ///
    /// ```
    /// use robustness::edge::Edge;
    /// use robustness::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    /// graph.insert(Edge::new("a", "b"));
    ///
    /// assert_eq!(graph.remove(&Edge::new("b", "a")), true);
    /// assert_eq!(graph.remove(&Edge::new("a", "c")), false);
    /// assert_eq!(graph.vertex_count(), 2);
    /// ```
    pub fn remove(&mut self, edge: &Edge<T>) -> bool {
        let (a, b) = (edge.source(), edge.target());

        let is_removed = self
            .adjacency
            .get_mut(a)
            .is_some_and(|neighbours| neighbours.remove(b));

        if is_removed {
            if let Some(neighbours) = self.adjacency.get_mut(b) {
                neighbours.remove(a);
            }
            self.edge_count -= 1;
        }

        is_removed
    }

    /// Checks if the graph contains an edge.
    pub fn contains(&self, edge: &Edge<T>) -> bool {
        self.adjacency
            .get(edge.source())
            .is_some_and(|neighbours| neighbours.contains(edge.target()))
    }

    /// Checks if the graph contains a node.
    pub fn contains_node(&self, node: &T) -> bool {
        self.adjacency.contains_key(node)
    }

    /// Returns the node count of the graph, isolated nodes included.
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Returns the edge count of the graph.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Iterates over the nodes in ascending order.
    pub fn vertices(&self) -> impl Iterator<Item = &T> + '_ {
        self.adjacency.keys()
    }

    /// Iterates over every edge once, smaller endpoint as the source.
    pub fn edges(&self) -> impl Iterator<Item = Edge<T>> + '_ {
        self.adjacency.iter().flat_map(|(node, neighbours)| {
            neighbours
                .iter()
                .filter(move |neighbour| *neighbour > node)
                .map(move |neighbour| Edge::new(*node, *neighbour))
        })
    }

    /// Iterates over the neighbours of `node` in ascending order.
    pub fn neighbours(&self, node: &T) -> Result<impl Iterator<Item = &T> + '_> {
        self.adjacency
            .get(node)
            .map(|neighbours| neighbours.iter())
            .ok_or_else(|| Error::node_not_found(node))
    }

    /// Returns the number of edges incident to `node`.
    ///
    /// # Examples
    ///
    /// ```
    /// use robustness::edge::Edge;
    /// use robustness::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    /// graph.insert(Edge::new(1, 2));
    /// graph.insert(Edge::new(1, 3));
    ///
    /// assert_eq!(graph.degree(&1).unwrap(), 2);
    /// assert!(graph.degree(&4).is_err());
    /// ```
    pub fn degree(&self, node: &T) -> Result<usize> {
        self.adjacency
            .get(node)
            .map(BTreeSet::len)
            .ok_or_else(|| Error::node_not_found(node))
    }

    /// Returns a mapping of every node to its degree, computed from the current state.
    pub fn degrees(&self) -> BTreeMap<T, usize> {
        self.adjacency
            .iter()
            .map(|(node, neighbours)| (*node, neighbours.len()))
            .collect()
    }

    /// Computes the density of the graph, the ratio of edges with respect to the maximum possible
    /// edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use robustness::edge::Edge;
    /// use robustness::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    ///
    /// graph.insert(Edge::new("a", "b"));
    /// assert_eq!(graph.density(), 1.0);
    ///
    /// graph.insert(Edge::new("a", "c"));
    /// assert_eq!(graph.density(), 2.0 / 3.0);
    /// ```
    pub fn density(&self) -> f64 {
        let vc = self.vertex_count() as f64;
        let ec = self.edge_count() as f64;

        // Calculate the total number of possible edges given a vertex count.
        let pec = vc * (vc - 1.0) / 2.0;
        // Actual edges divided by the possible edges gives the density.
        ec / pec
    }

    /// Returns a copy of the graph without `node` and its incident edges. `self` is left as is.
    ///
    /// # Examples
    ///
    /// ```
    /// use robustness::edge::Edge;
    /// use robustness::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    /// graph.insert(Edge::new(1, 2));
    /// graph.insert(Edge::new(2, 3));
    ///
    /// let smaller = graph.without_node(&2).unwrap();
    ///
    /// assert_eq!((smaller.vertex_count(), smaller.edge_count()), (2, 0));
    /// assert_eq!((graph.vertex_count(), graph.edge_count()), (3, 2));
    /// ```
    pub fn without_node(&self, node: &T) -> Result<Self> {
        if !self.contains_node(node) {
            return Err(Error::node_not_found(node));
        }

        let mut graph = self.clone();
        graph.remove_node(node);

        Ok(graph)
    }

    /// Computes the hop distance from `source` to every node reachable from it, `source`
    /// included at distance 0. Unreachable nodes are absent from the result.
    ///
    /// # Examples
    ///
    /// ```
    /// use robustness::edge::Edge;
    /// use robustness::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    /// graph.insert(Edge::new(1, 2));
    /// graph.insert(Edge::new(2, 3));
    /// graph.add_node(4);
    ///
    /// let lengths = graph.shortest_path_lengths(&1).unwrap();
    ///
    /// assert_eq!(lengths.get(&3), Some(&2));
    /// assert_eq!(lengths.get(&4), None);
    /// ```
    pub fn shortest_path_lengths(&self, source: &T) -> Result<BTreeMap<T, usize>> {
        if !self.contains_node(source) {
            return Err(Error::node_not_found(source));
        }

        let mut lengths = BTreeMap::from([(*source, 0)]);
        let mut queue = VecDeque::from([*source]);

        while let Some(current) = queue.pop_front() {
            let next = lengths.get(&current).copied().unwrap_or_default() + 1;

            for neighbour in self.adjacency.get(&current).into_iter().flatten() {
                if !lengths.contains_key(neighbour) {
                    lengths.insert(*neighbour, next);
                    queue.push_back(*neighbour);
                }
            }
        }

        Ok(lengths)
    }

    /// Splits the graph into its maximal connected subgraphs.
    ///
    /// Components are returned in ascending order of their smallest node. Isolated nodes form
    /// components of their own.
    ///
    /// # Examples
    ///
    /// ```
    /// use robustness::edge::Edge;
    /// use robustness::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    /// graph.insert(Edge::new(1, 2));
    /// graph.insert(Edge::new(3, 4));
    /// graph.insert(Edge::new(4, 5));
    ///
    /// let sizes: Vec<(usize, usize)> = graph
    ///     .connected_components()
    ///     .iter()
    ///     .map(|c| (c.vertex_count(), c.edge_count()))
    ///     .collect();
    ///
    /// assert_eq!(sizes, vec![(2, 1), (3, 2)]);
    /// ```
    pub fn connected_components(&self) -> Vec<Self> {
        let mut visited: BTreeSet<T> = BTreeSet::new();
        let mut components = Vec::new();

        for start in self.adjacency.keys() {
            if visited.contains(start) {
                continue;
            }

            visited.insert(*start);
            let mut queue = VecDeque::from([*start]);
            let mut component = Self::new();

            while let Some(current) = queue.pop_front() {
                let neighbours = self.adjacency.get(&current).cloned().unwrap_or_default();

                for neighbour in &neighbours {
                    if visited.insert(*neighbour) {
                        queue.push_back(*neighbour);
                    }
                }

                // Every neighbour belongs to the same component, so the neighbour set can be
                // carried over as is. Each edge is seen from both ends.
                component.edge_count += neighbours.len();
                component.adjacency.insert(current, neighbours);
            }

            component.edge_count /= 2;
            components.push(component);
        }

        components
    }

    //
    // Crate-internal
    //

    /// Builds the adjacency as lists of positions, positions following the ascending node order.
    ///
    /// This is the representation the all-pairs searches iterate over, it avoids map lookups in
    /// the inner loop.
    pub(crate) fn index_lists(&self) -> Vec<Vec<usize>> {
        let index: BTreeMap<T, usize> = self
            .adjacency
            .keys()
            .enumerate()
            .map(|(i, node)| (*node, i))
            .collect();

        self.adjacency
            .values()
            .map(|neighbours| {
                neighbours
                    .iter()
                    .filter_map(|neighbour| index.get(neighbour).copied())
                    .collect()
            })
            .collect()
    }

    //
    // Private
    //

    /// Removes a node and its incident edges in place, returns whether it was present.
    fn remove_node(&mut self, node: &T) -> bool {
        let Some(neighbours) = self.adjacency.remove(node) else {
            return false;
        };

        for neighbour in &neighbours {
            if let Some(set) = self.adjacency.get_mut(neighbour) {
                set.remove(node);
            }
        }
        self.edge_count -= neighbours.len();

        true
    }
}

impl<T> FromIterator<Edge<T>> for Graph<T>
where
    T: Copy + Ord + Debug,
{
    fn from_iter<I: IntoIterator<Item = Edge<T>>>(iter: I) -> Self {
        let mut graph = Self::new();
        for edge in iter {
            graph.insert(edge);
        }

        graph
    }
}
