use union_find::{UnionFind, QuickUnionUf, UnionBySize};
use crate::graph::{Decomposition, Graph};

/// Build the elimination forest induced by an elimination order.
/// `elimination[0]` is removed first and ends up as an outermost root; each
/// later vertex becomes the parent of the already-built subtrees its
/// neighborhood touches.
///
pub fn from_elimination(g: &Graph, elimination: &[usize]) -> Decomposition {
    let mut dec = Decomposition::new(g.n);

    // Initially, each vertex is in a single subtree. When two subtrees
    // merge, the name-giving member of the new set points to the root
    // vertex of the merged subtree.
    let mut subtrees: QuickUnionUf<UnionBySize> = QuickUnionUf::new(g.n);
    let mut root_from_rep: Vec<usize> = (0..g.n).collect();
    let mut processed = vec![false; g.n];

    for &u in elimination.iter().rev() {
        processed[u] = true;
        let descendants: Vec<usize> = g.neighbors[u]
            .iter()
            .copied()
            .filter(|&v| processed[v])
            .collect();
        for &v in &descendants {
            // Set u as new root of the subtree containing v.
            let rep = subtrees.find(v);
            let root = root_from_rep[rep];
            dec.parent[root] = Some(u);
        }
        // Merge subtrees of u and all descendant vertices.
        for &v in &descendants {
            subtrees.union(u, v);
        }
        // Update pointer from rep to root of the new subtree.
        let new_rep = subtrees.find(u);
        root_from_rep[new_rep] = u;
    }

    dec
}

/// Reference treedepth: the minimum forest height over all n! elimination
/// orders. Only sensible for very small graphs; the tests compare the
/// branch-and-bound result against this.
///
pub fn treedepth_by_permutations(g: &Graph) -> usize {
    let mut vertices: Vec<usize> = (0..g.n).collect();
    let mut best = g.n; // removing one vertex per level always works
    permute(g, &mut vertices, 0, &mut best);
    best
}

fn permute(g: &Graph, vertices: &mut Vec<usize>, k: usize, best: &mut usize) {
    if k == vertices.len() {
        let depth = from_elimination(g, vertices).depth();
        if depth < *best {
            *best = depth;
        }
        return;
    }
    for i in k..vertices.len() {
        vertices.swap(k, i);
        permute(g, vertices, k + 1, best);
        vertices.swap(k, i);
    }
}
