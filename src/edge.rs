//! Undirected edges between two nodes.

use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

/// A pair of nodes joined by a link. Edges have no direction: `(a, b)` and `(b, a)` compare and
/// hash equally, the `source`-`target` naming only reflects construction order.
#[derive(Clone, Copy, Debug, Eq)]
pub struct Edge<T> {
    source: T,
    target: T,
}

impl<T> Edge<T> {
    /// Creates a new edge between two nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use robustness::edge::Edge;
    ///
    /// let edge = Edge::new(1, 2);
    /// assert_eq!(edge, Edge::new(2, 1));
    /// ```
    pub fn new(source: T, target: T) -> Self {
        Self { source, target }
    }

    /// Returns the node the edge was constructed from.
    pub fn source(&self) -> &T {
        &self.source
    }

    /// Returns the node the edge was constructed to.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Returns whether the edge is incident to `node`.
    ///
    /// # Examples
    ///
    /// ```
    /// use robustness::edge::Edge;
    ///
    /// let edge = Edge::new(1, 2);
    ///
    /// assert!(edge.contains(&1));
    /// assert!(!edge.contains(&3));
    /// ```
    pub fn contains(&self, node: &T) -> bool
    where
        T: PartialEq,
    {
        self.source() == node || self.target() == node
    }

    /// Returns whether both ends of the edge are the same node.
    pub fn is_loop(&self) -> bool
    where
        T: PartialEq,
    {
        self.source == self.target
    }

    /// Returns the endpoints with the smaller node first.
    ///
    /// # Examples
    ///
    /// ```
    /// use robustness::edge::Edge;
    ///
    /// assert_eq!(Edge::new(7, 3).ordered(), (&3, &7));
    /// ```
    pub fn ordered(&self) -> (&T, &T)
    where
        T: Ord,
    {
        match self.source.cmp(&self.target) {
            Ordering::Greater => (&self.target, &self.source),
            _ => (&self.source, &self.target),
        }
    }
}

//
// Trait implementations
//

impl<T: PartialEq> PartialEq for Edge<T> {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (&self.source, &self.target);
        let (c, d) = (&other.source, &other.target);

        a == d && b == c || a == c && b == d
    }
}

impl<T: Hash + Ord> Hash for Edge<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hash in canonical order so (a, b) and (b, a) land in the same bucket.
        let (low, high) = self.ordered();
        low.hash(state);
        high.hash(state);
    }
}

impl<T> From<(T, T)> for Edge<T> {
    fn from((source, target): (T, T)) -> Self {
        Self::new(source, target)
    }
}
