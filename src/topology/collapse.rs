//! Edge Collapse for Flag Filtrations
//!
//! An edge uv of a graph G is *dominated* by a vertex w ∉ {u, v} when
//!
//!   N[u] ∩ N[v] ⊆ N[w]
//!
//! with N[·] the closed neighbourhood. Removing a dominated edge is a
//! strong collapse of the flag complex: Flag(G) and Flag(G \ uv) are
//! homotopy equivalent through the inclusion.
//!
//! For a filtration G_s we remove uv only when it is dominated in G_s for
//! every s ≥ f(uv). The inclusions Flag(G_s \ uv) ⊆ Flag(G_s) then form a
//! morphism of persistence modules that is an isomorphism at every scale,
//! so persistence diagrams are unchanged. Removals are applied one at a
//! time against the already reduced graph, so the argument composes.
//!
//! Only the (k+1)-skeleton is built afterwards, but Hₖ of a complex only
//! depends on its (k+1)-skeleton, so diagrams up to the requested
//! homology dimension are preserved exactly.
//!
//! ## Reference
//!
//! Boissonnat & Pritam (2020). "Edge Collapse and Persistence of Flag
//! Complexes". SoCG.

use ndarray::Array2;

/// Remove dominated edges from a filtered graph.
///
/// `edges` holds (i, j, value) triples; the retained edges are returned
/// in their input order.
pub fn collapse_edges(n_vertices: usize, edges: &[(usize, usize, f64)]) -> Vec<(usize, usize, f64)> {
    // appear[[a, b]] = value at which a ~ b, +∞ if never
    let mut appear = Array2::<f64>::from_elem((n_vertices, n_vertices), f64::INFINITY);
    for v in 0..n_vertices {
        appear[[v, v]] = f64::NEG_INFINITY;
    }
    for &(i, j, value) in edges {
        appear[[i, j]] = value;
        appear[[j, i]] = value;
    }

    // Latest edges first
    let mut order: Vec<usize> = (0..edges.len()).collect();
    order.sort_by(|&a, &b| {
        let (ea, eb) = (&edges[a], &edges[b]);
        eb.2.total_cmp(&ea.2)
            .then_with(|| (eb.0, eb.1).cmp(&(ea.0, ea.1)))
    });

    let mut removed = vec![false; edges.len()];
    for idx in order {
        let (u, v, value) = edges[idx];
        if dominated_from(&appear, u, v, value) {
            appear[[u, v]] = f64::INFINITY;
            appear[[v, u]] = f64::INFINITY;
            removed[idx] = true;
        }
    }

    edges
        .iter()
        .zip(&removed)
        .filter(|(_, &gone)| !gone)
        .map(|(&e, _)| e)
        .collect()
}

/// Is uv dominated in G_s for every s ≥ `value`?
fn dominated_from(appear: &Array2<f64>, u: usize, v: usize, value: f64) -> bool {
    let n = appear.nrows();

    // Vertices that are ever common neighbours of u and v
    let common: Vec<usize> = (0..n)
        .filter(|&x| x != u && x != v)
        .filter(|&x| appear[[u, x]].is_finite() && appear[[v, x]].is_finite())
        .collect();

    if common.is_empty() {
        return false;
    }

    // Domination status can only change when an edge between u, v and
    // the common vertices, or among the common vertices, appears.
    let mut events = vec![value];
    for (a, &x) in common.iter().enumerate() {
        events.push(appear[[u, x]]);
        events.push(appear[[v, x]]);
        for &y in &common[a + 1..] {
            let t = appear[[x, y]];
            if t.is_finite() {
                events.push(t);
            }
        }
    }
    events.retain(|&t| t >= value);
    events.sort_by(f64::total_cmp);
    events.dedup();

    events
        .iter()
        .all(|&s| dominated_at(appear, u, v, s, &common))
}

/// Is uv dominated in G_s?
fn dominated_at(appear: &Array2<f64>, u: usize, v: usize, s: f64, common: &[usize]) -> bool {
    let adj = |a: usize, b: usize| appear[[a, b]] <= s;

    let neighbors: Vec<usize> = common
        .iter()
        .copied()
        .filter(|&x| adj(u, x) && adj(v, x))
        .collect();

    neighbors
        .iter()
        .any(|&w| neighbors.iter().all(|&x| adj(w, x)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_keeps_cycle_edges() {
        // 4-cycle plus diagonals at a later value: the cycle edges have no
        // common neighbours when they enter, so none can go
        let s2 = 2.0_f64.sqrt();
        let edges = vec![
            (0, 1, 1.0),
            (1, 2, 1.0),
            (2, 3, 1.0),
            (0, 3, 1.0),
            (0, 2, s2),
            (1, 3, s2),
        ];
        let kept = collapse_edges(4, &edges);

        for e in &edges[..4] {
            assert!(kept.contains(e));
        }
        assert!(kept.len() < edges.len());
    }

    #[test]
    fn test_isolated_edge_kept() {
        let edges = vec![(0, 1, 1.0)];
        assert_eq!(collapse_edges(2, &edges), edges);
    }

    #[test]
    fn test_cone_edge_removed() {
        // Triangle where every edge enters together: each edge is
        // dominated by the opposite vertex
        let edges = vec![(0, 1, 1.0), (0, 2, 1.0), (1, 2, 1.0)];
        let kept = collapse_edges(3, &edges);

        // Removing one edge leaves a path, which is contractible
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_late_domination_not_enough() {
        // Edge 0-1 enters at 1.0 but only becomes dominated once 0-2 and
        // 1-2 appear at 3.0
        let edges = vec![(0, 1, 1.0), (0, 2, 3.0), (1, 2, 3.0)];
        let kept = collapse_edges(3, &edges);
        assert!(kept.contains(&(0, 1, 1.0)));
    }
}
