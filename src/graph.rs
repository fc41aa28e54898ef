//! Undirected multigraph with labeled edges and a simple/acyclic verifier.
//!
//! Each logical edge `(x, y)` is stored twice, once in each endpoint's
//! adjacency list, with the label of the key it came from. Node state for
//! traversal lives in a flat array indexed by node id.

use crate::error::Error;

/// Cap on edges out of a single node. Adjacency storage is growable; the
/// cap bounds pathological salt draws during dictionary construction.
pub(crate) const MAX_OUT_DEGREE: usize = 32;

#[derive(Clone, Debug, Default)]
struct Node {
    /// `(neighbor, edge label)` pairs.
    adj: Vec<(u32, u32)>,
    visited: bool,
    depth: u32,
}

pub(crate) struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    pub(crate) fn new(node_ct: usize) -> Self {
        Self {
            nodes: vec![Node::default(); node_ct],
        }
    }

    pub(crate) fn node_ct(&self) -> usize {
        self.nodes.len()
    }

    /// Adjacency list of node `x`.
    pub(crate) fn adj(&self, x: usize) -> &[(u32, u32)] {
        &self.nodes[x].adj
    }

    /// Adds the undirected edge `(x, y)` with label `label` to both
    /// endpoints' adjacency lists.
    pub(crate) fn add_edge(&mut self, x: usize, y: usize, label: u32) -> Result<(), Error> {
        if self.nodes[x].adj.len() >= MAX_OUT_DEGREE {
            return Err(Error::ExceededMaxOutDegree);
        }
        self.nodes[x].adj.push((y as u32, label));
        if self.nodes[y].adj.len() >= MAX_OUT_DEGREE {
            return Err(Error::ExceededMaxOutDegree);
        }
        self.nodes[y].adj.push((x as u32, label));
        Ok(())
    }

    /// Checks that the graph has no self-loops, no multi-edges, and no
    /// cycles, then resets all traversal state so the graph is reusable.
    ///
    /// Since every logical edge appears in both directions, the back-edge to
    /// a node's direct parent (depth difference exactly one) is not a cycle;
    /// any other edge to a visited node is.
    pub(crate) fn verify_simple_and_acyclic(&mut self) -> Result<(), Error> {
        let res = self.verify_inner();
        for node in &mut self.nodes {
            node.visited = false;
            node.depth = 0;
        }
        res
    }

    fn verify_inner(&mut self) -> Result<(), Error> {
        // Depth-first traversal with an explicit frame stack; each frame
        // resumes one node's edge scan at its recorded depth.
        let mut stack: Vec<(usize, usize, u32)> = Vec::new();
        for root in 0..self.nodes.len() {
            if self.nodes[root].visited {
                continue;
            }
            self.nodes[root].visited = true;
            self.nodes[root].depth = 0;
            stack.push((root, 0, 0));

            while let Some((x, cursor, depth)) = stack.pop() {
                if cursor >= self.nodes[x].adj.len() {
                    continue;
                }
                stack.push((x, cursor + 1, depth));

                let y = self.nodes[x].adj[cursor].0 as usize;
                if y == x {
                    return Err(Error::Cycle);
                }
                if self
                    .nodes[x]
                    .adj
                    .iter()
                    .enumerate()
                    .any(|(k, &(n, _))| k != cursor && n as usize == y)
                {
                    return Err(Error::MultiEdge);
                }
                if self.nodes[y].visited {
                    if depth as i64 - self.nodes[y].depth as i64 > 1 {
                        return Err(Error::Cycle);
                    }
                } else {
                    self.nodes[y].visited = true;
                    self.nodes[y].depth = depth + 1;
                    stack.push((y, 0, depth + 1));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_single_edge() {
        let mut g = Graph::new(4);
        assert!(g.verify_simple_and_acyclic().is_ok());

        g.add_edge(0, 1, 0).unwrap();
        assert!(g.verify_simple_and_acyclic().is_ok());
        assert_eq!(g.adj(0), &[(1, 0)]);
        assert_eq!(g.adj(1), &[(0, 0)]);
    }

    #[test]
    fn test_path_is_acyclic() {
        let mut g = Graph::new(5);
        g.add_edge(0, 1, 0).unwrap();
        g.add_edge(1, 2, 1).unwrap();
        g.add_edge(2, 3, 2).unwrap();
        g.add_edge(3, 4, 3).unwrap();
        assert!(g.verify_simple_and_acyclic().is_ok());
    }

    #[test]
    fn test_forest_is_acyclic() {
        let mut g = Graph::new(6);
        g.add_edge(0, 1, 0).unwrap();
        g.add_edge(1, 2, 1).unwrap();
        g.add_edge(4, 5, 2).unwrap();
        assert!(g.verify_simple_and_acyclic().is_ok());
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let mut g = Graph::new(3);
        g.add_edge(1, 1, 0).unwrap();
        assert!(matches!(g.verify_simple_and_acyclic(), Err(Error::Cycle)));
    }

    #[test]
    fn test_multi_edge() {
        let mut g = Graph::new(3);
        g.add_edge(0, 1, 0).unwrap();
        g.add_edge(0, 1, 1).unwrap();
        assert!(matches!(
            g.verify_simple_and_acyclic(),
            Err(Error::MultiEdge)
        ));
    }

    #[test]
    fn test_triangle_is_cycle() {
        let mut g = Graph::new(3);
        g.add_edge(0, 1, 0).unwrap();
        g.add_edge(1, 2, 1).unwrap();
        g.add_edge(2, 0, 2).unwrap();
        assert!(matches!(g.verify_simple_and_acyclic(), Err(Error::Cycle)));
    }

    #[test]
    fn test_square_is_cycle() {
        let mut g = Graph::new(4);
        g.add_edge(0, 1, 0).unwrap();
        g.add_edge(1, 2, 1).unwrap();
        g.add_edge(2, 3, 2).unwrap();
        g.add_edge(3, 0, 3).unwrap();
        assert!(matches!(g.verify_simple_and_acyclic(), Err(Error::Cycle)));
    }

    #[test]
    fn test_state_reset_allows_reuse() {
        let mut g = Graph::new(4);
        g.add_edge(0, 1, 0).unwrap();
        g.add_edge(1, 2, 1).unwrap();
        assert!(g.verify_simple_and_acyclic().is_ok());
        assert!(g.verify_simple_and_acyclic().is_ok());
    }

    #[test]
    fn test_out_degree_cap() {
        let mut g = Graph::new(64);
        for i in 0..MAX_OUT_DEGREE {
            g.add_edge(0, i + 1, i as u32).unwrap();
        }
        assert!(matches!(
            g.add_edge(0, 40, 99),
            Err(Error::ExceededMaxOutDegree)
        ));
    }
}
