use std::collections::HashMap;
use std::mem;

/// Lifecycle of a vertex during the search. Every vertex is in exactly one
/// state at a time; only `Active`/`Inactive` vertices take part in
/// degree-based decisions.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Root,     // fixed as an ancestor on the current branch
    Removed,  // final tree-parent assigned
    Orphan,   // contracted away, parent still pending
    Inactive, // blocked for the current independent-set pass only
    Active,
}

#[derive(Debug, Clone)]
pub struct Graph {
    pub n:         usize,                      // vertices are 0,1,...,n-1
    pub neighbors: Vec<Vec<usize>>,            // neighbors of vertex i (unordered)
    neighbors_pos: Vec<HashMap<usize, usize>>, // At which position of neighbors[i] is vertex v?
    pub status:    Vec<Status>,
}

impl Graph {

    /// Allocate memory for a graph with n vertices and no edges.
    ///
    pub fn new(n: usize) -> Graph {
        Graph {
            n:             n,
            neighbors:     vec![Vec::new(); n],
            neighbors_pos: vec![HashMap::new(); n],
            status:        vec![Status::Active; n],
        }
    }

    /// Add the undirected edge {u,v} to the graph. Does nothing if the edge
    /// is already present, so duplicate edge lines are coalesced.
    ///
    /// *Assumes:*
    /// - u,v in {0,...,n-1} and u != v
    ///
    pub fn add_edge(&mut self, u: usize, v: usize) {
        if self.neighbors_pos[u].contains_key(&v) {
            return;
        }
        self.neighbors[u].push(v);
        self.neighbors[v].push(u);
        self.neighbors_pos[u].insert(v, self.neighbors[u].len() - 1);
        self.neighbors_pos[v].insert(u, self.neighbors[v].len() - 1);
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.neighbors_pos[u].contains_key(&v)
    }

    pub fn degree(&self, v: usize) -> usize {
        self.neighbors[v].len()
    }

    // Remove neighbor v in the neighbor list of w by moving the last
    // element to the freed position. Neighbor order carries no meaning.
    pub fn remove_neighbor(&mut self, w: usize, v: usize) {
        let v_pos = match self.neighbors_pos[w].remove(&v) {
            Some(v_pos) => v_pos,
            None => return
        };
        let last = match self.neighbors[w].pop() {
            Some(u) => u,
            None => return
        };
        if last != v {
            self.neighbors[w][v_pos] = last;
            self.neighbors_pos[w].insert(last, v_pos);
        }
    }

    /// Eliminate vertex v: its neighborhood becomes a clique, every neighbor
    /// that was `Active` is blocked for the rest of the current
    /// independent-set pass, and v itself becomes an `Orphan` awaiting a
    /// tree-parent. v keeps its own (now one-sided) neighbor list; the
    /// orphan matching reads it later.
    ///
    pub fn contract_vertex(&mut self, v: usize) {
        let vneigh = mem::replace(&mut self.neighbors[v], Vec::new());
        for (i, &a) in vneigh.iter().enumerate() {
            if self.status[a] == Status::Active {
                self.status[a] = Status::Inactive;
            }
            for &b in vneigh[..i].iter() {
                self.add_edge(a, b);
            }
            self.remove_neighbor(a, v);
        }
        self.neighbors[v] = vneigh;
        self.status[v] = Status::Orphan;
    }

    /// Fix v as a root of the current subtree: detach it from all neighbor
    /// lists (keeping its own) and mark it `Root`.
    ///
    pub fn make_root(&mut self, v: usize) {
        let vneigh = mem::replace(&mut self.neighbors[v], Vec::new());
        for &w in vneigh.iter() {
            self.remove_neighbor(w, v);
        }
        self.neighbors[v] = vneigh;
        self.status[v] = Status::Root;
    }
}

/// An elimination forest, stored as the parent of each vertex.
/// `None` marks a root of the forest.
pub struct Decomposition {
    pub parent: Vec<Option<usize>>,
}

impl Decomposition {

    pub fn new(n: usize) -> Decomposition {
        Decomposition { parent: vec![None; n] }
    }

    /// Computes the height of the forest stored in self.parent. A root has
    /// depth 1, the empty forest depth 0. Depths are memoized along the
    /// parent chains, so this takes time O(n) overall.
    ///
    /// *Assumes:*
    /// - that self.parent is acyclic
    ///
    pub fn depth(&self) -> usize {
        let n = self.parent.len();
        let mut depth = vec![0; n];                           // 0 = not computed yet
        let mut stack = Vec::with_capacity(n);
        for v in 0..n {
            let mut cur = v;
            while depth[cur] == 0 {                           // (i) crawl up to a root or a known vertex
                stack.push(cur);
                match self.parent[cur] {
                    Some(p) => cur = p,
                    None    => break
                }
            }
            let mut d = depth[cur];                           // (ii) crawl down assigning depths
            while let Some(w) = stack.pop() {
                d += 1;
                depth[w] = d;
            }
        }

        depth.iter().max().copied().unwrap_or(0)
    }

    /// Checks that self.parent is an acyclic forest and that every edge of g
    /// connects an ancestor-descendant pair.
    ///
    pub fn is_valid_for(&self, g: &Graph) -> bool {
        let n = self.parent.len();
        if n != g.n {
            return false;
        }
        // Every parent chain must reach a root within n steps.
        for v in 0..n {
            let mut cur = v;
            let mut steps = 0;
            while let Some(p) = self.parent[cur] {
                cur = p;
                steps += 1;
                if steps > n {
                    return false;
                }
            }
        }
        // Every edge must join a vertex with one of its ancestors.
        for u in 0..n {
            for &v in g.neighbors[u].iter() {
                if u > v {
                    continue;
                }
                if !self.is_ancestor(u, v) && !self.is_ancestor(v, u) {
                    return false;
                }
            }
        }
        true
    }

    fn is_ancestor(&self, anc: usize, v: usize) -> bool {
        let mut cur = v;
        while let Some(p) = self.parent[cur] {
            if p == anc {
                return true;
            }
            cur = p;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_is_idempotent() {
        let mut g = Graph::new(3);
        g.add_edge(0, 1);
        g.add_edge(0, 1);
        g.add_edge(1, 0);
        assert_eq!(g.degree(0), 1);
        assert_eq!(g.degree(1), 1);
        assert!(g.has_edge(0, 1));
    }

    #[test]
    fn remove_neighbor_keeps_positions_consistent() {
        let mut g = Graph::new(4);
        g.add_edge(0, 1);
        g.add_edge(0, 2);
        g.add_edge(0, 3);
        g.remove_neighbor(0, 2);
        assert_eq!(g.degree(0), 2);
        assert!(!g.has_edge(0, 2));
        assert!(g.has_edge(0, 1));
        assert!(g.has_edge(0, 3));
        // the swapped-in neighbor must still be removable
        g.remove_neighbor(0, 3);
        assert_eq!(g.degree(0), 1);
        assert!(g.has_edge(0, 1));
    }

    #[test]
    fn contraction_cliques_the_neighborhood() {
        // star with center 0 and leaves 1,2,3
        let mut g = Graph::new(4);
        g.add_edge(0, 1);
        g.add_edge(0, 2);
        g.add_edge(0, 3);
        g.contract_vertex(0);
        assert_eq!(g.status[0], Status::Orphan);
        for &(u, v) in [(1, 2), (1, 3), (2, 3)].iter() {
            assert!(g.has_edge(u, v));
            assert!(g.has_edge(v, u));
        }
        // the former neighbors no longer see 0, and got blocked for this pass
        for v in 1..4 {
            assert!(!g.has_edge(v, 0));
            assert_eq!(g.status[v], Status::Inactive);
        }
        // 0 keeps its one-sided list for the orphan matching
        assert_eq!(g.neighbors[0].len(), 3);
    }

    #[test]
    fn contracting_an_isolated_vertex_only_flips_the_status() {
        let mut g = Graph::new(2);
        g.contract_vertex(0);
        assert_eq!(g.status[0], Status::Orphan);
        assert_eq!(g.status[1], Status::Active);
        assert_eq!(g.degree(1), 0);
    }

    #[test]
    fn decomposition_depth_of_a_chain() {
        // 2 is root, 3 below it, 0 and 4 below 3
        let mut dec = Decomposition::new(5);
        dec.parent[3] = Some(2);
        dec.parent[0] = Some(3);
        dec.parent[4] = Some(3);
        dec.parent[1] = Some(2);
        assert_eq!(dec.depth(), 3);
    }

    #[test]
    fn decomposition_depth_degenerate_cases() {
        assert_eq!(Decomposition::new(0).depth(), 0);
        assert_eq!(Decomposition::new(1).depth(), 1);
        assert_eq!(Decomposition::new(4).depth(), 1); // forest of isolated roots
    }

    #[test]
    fn validity_checks_the_ancestor_property() {
        let mut g = Graph::new(4); // path 0-1-2-3
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(2, 3);

        let mut dec = Decomposition::new(4);
        dec.parent[0] = Some(1);
        dec.parent[2] = Some(1);
        dec.parent[3] = Some(2);
        assert!(dec.is_valid_for(&g));

        // hang 3 under 0 instead: the edge {2,3} is no longer covered
        dec.parent[3] = Some(0);
        assert!(!dec.is_valid_for(&g));
    }
}
