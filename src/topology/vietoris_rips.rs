//! Vietoris-Rips Filtration Construction
//!
//! The Vietoris-Rips complex VR_ε(X) is a simplicial complex where:
//! - 0-simplices are the points in X
//! - A k-simplex [v₀, ..., vₖ] exists iff d(vᵢ, vⱼ) ≤ ε for all i,j
//!
//! Letting ε grow gives a nested family of complexes. Every simplex σ
//! enters at its filtration value
//!
//!   f(σ) = max_{i,j ∈ σ} d(vᵢ, vⱼ)
//!
//! so faces always enter no later than their cofaces. The whole family is
//! encoded as a single list of simplices sorted by
//! (f(σ), dim σ, vertex tuple), which is the order the persistence
//! engine consumes.
//!
//! Simplices are enumerated as cliques of the ε-neighbourhood graph,
//! optionally after pruning dominated edges (see `collapse`).

use log::debug;
use ndarray::Array2;

use super::collapse::collapse_edges;
use super::DistanceMatrix;
use crate::error::{Result, TdaError};

/// A simplex with its filtration value
#[derive(Debug, Clone, PartialEq)]
pub struct Simplex {
    /// Vertex indices, strictly increasing
    vertices: Vec<usize>,
    /// Maximum pairwise distance among the vertices
    value: f64,
}

impl Simplex {
    pub fn new(mut vertices: Vec<usize>, value: f64) -> Self {
        vertices.sort_unstable();
        Self { vertices, value }
    }

    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn dimension(&self) -> usize {
        self.vertices.len() - 1
    }
}

/// Sorted sequence of simplices of a Vietoris-Rips filtration
#[derive(Debug, Clone)]
pub struct Filtration {
    simplices: Vec<Simplex>,
    n_vertices: usize,
    max_simplex_dimension: usize,
}

impl Filtration {
    /// Sort simplices into filtration order.
    ///
    /// Ties on value are broken by dimension, then lexicographically on
    /// the vertex tuple, so the order is fully deterministic.
    pub fn from_simplices(
        mut simplices: Vec<Simplex>,
        n_vertices: usize,
        max_simplex_dimension: usize,
    ) -> Self {
        simplices.sort_by(|a, b| {
            a.value
                .total_cmp(&b.value)
                .then(a.dimension().cmp(&b.dimension()))
                .then_with(|| a.vertices.cmp(&b.vertices))
        });
        Self {
            simplices,
            n_vertices,
            max_simplex_dimension,
        }
    }

    pub fn simplices(&self) -> &[Simplex] {
        &self.simplices
    }

    pub fn len(&self) -> usize {
        self.simplices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simplices.is_empty()
    }

    pub fn n_vertices(&self) -> usize {
        self.n_vertices
    }

    /// Largest simplex dimension the filtration was built to contain
    pub fn max_simplex_dimension(&self) -> usize {
        self.max_simplex_dimension
    }

    /// Number of simplices of dimension `d`
    pub fn count(&self, d: usize) -> usize {
        self.simplices.iter().filter(|s| s.dimension() == d).count()
    }
}

/// Vietoris-Rips filtration builder
#[derive(Debug, Clone, Copy)]
pub struct VietorisRips<'a> {
    /// Distance matrix (precomputed)
    distances: &'a DistanceMatrix,
    /// Highest homology dimension the filtration must resolve
    max_homology_dimension: usize,
    /// Maximum filtration value (None = full complex)
    max_scale: Option<f64>,
    /// Prune dominated edges before clique expansion
    collapse_edges: bool,
}

impl<'a> VietorisRips<'a> {
    /// Create a builder over a distance matrix, resolving H₀ and H₁
    pub fn new(distances: &'a DistanceMatrix) -> Self {
        Self {
            distances,
            max_homology_dimension: 1,
            max_scale: None,
            collapse_edges: false,
        }
    }

    pub fn with_max_homology_dimension(mut self, dimension: usize) -> Self {
        self.max_homology_dimension = dimension;
        self
    }

    pub fn with_max_scale(mut self, max_scale: Option<f64>) -> Self {
        self.max_scale = max_scale;
        self
    }

    pub fn with_edge_collapse(mut self, collapse: bool) -> Self {
        self.collapse_edges = collapse;
        self
    }

    /// Number of points
    pub fn n_points(&self) -> usize {
        self.distances.n_points()
    }

    /// Simplex dimension cap: one above the highest homology dimension,
    /// needed to register deaths of the top-dimensional classes.
    pub fn max_simplex_dimension(&self) -> usize {
        self.max_homology_dimension + 1
    }

    fn within_scale(&self, d: f64) -> bool {
        self.max_scale.map_or(true, |eps| d <= eps)
    }

    /// All edges (i < j) with d(i, j) within the scale cap, with values
    pub fn edges(&self) -> Vec<(usize, usize, f64)> {
        let n = self.n_points();
        let mut edges = Vec::new();

        for i in 0..n {
            for j in i + 1..n {
                let d = self.distances.get(i, j);
                if self.within_scale(d) {
                    edges.push((i, j, d));
                }
            }
        }

        edges
    }

    /// Count connected components of VR_ε using Union-Find
    pub fn count_components_at(&self, epsilon: f64) -> usize {
        let n = self.n_points();
        let mut parent: Vec<usize> = (0..n).collect();

        fn find(parent: &mut [usize], i: usize) -> usize {
            if parent[i] != i {
                parent[i] = find(parent, parent[i]);
            }
            parent[i]
        }

        let mut components = n;
        for (i, j, d) in self.edges() {
            if d > epsilon {
                continue;
            }
            let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
            if ri != rj {
                parent[ri] = rj;
                components -= 1;
            }
        }
        components
    }

    /// Build the sorted filtration
    pub fn build(&self) -> Result<Filtration> {
        if let Some(eps) = self.max_scale {
            if eps.is_nan() || eps <= 0.0 {
                return Err(TdaError::invalid_input(format!(
                    "max_scale must be positive, got {}",
                    eps
                )));
            }
        }

        let n = self.n_points();
        let max_dim = self.max_simplex_dimension();

        let all_edges = self.edges();
        let edges = if self.collapse_edges {
            let kept = collapse_edges(n, &all_edges);
            debug!(
                "edge collapse kept {} of {} edges",
                kept.len(),
                all_edges.len()
            );
            kept
        } else {
            all_edges
        };

        // Adjacency restricted to the (possibly collapsed) edge set
        let mut adjacent = Array2::<bool>::from_elem((n, n), false);
        let mut upper_neighbors: Vec<Vec<usize>> = vec![Vec::new(); n];
        for &(i, j, _) in &edges {
            adjacent[[i, j]] = true;
            adjacent[[j, i]] = true;
            upper_neighbors[i].push(j);
        }
        for neighbors in upper_neighbors.iter_mut() {
            neighbors.sort_unstable();
        }

        let mut simplices = Vec::with_capacity(n + edges.len());
        let mut current = Vec::with_capacity(max_dim + 1);
        for v in 0..n {
            current.push(v);
            self.expand(
                &adjacent,
                &mut current,
                0.0,
                &upper_neighbors[v],
                max_dim,
                &mut simplices,
            );
            current.pop();
        }

        let filtration = Filtration::from_simplices(simplices, n, max_dim);
        debug!(
            "built Vietoris-Rips filtration: {} points, {} simplices up to dimension {}",
            n,
            filtration.len(),
            max_dim
        );
        Ok(filtration)
    }

    /// Emit `current` and recursively extend it with every candidate
    /// vertex adjacent to all of its vertices.
    fn expand(
        &self,
        adjacent: &Array2<bool>,
        current: &mut Vec<usize>,
        value: f64,
        candidates: &[usize],
        max_dim: usize,
        out: &mut Vec<Simplex>,
    ) {
        out.push(Simplex {
            vertices: current.clone(),
            value,
        });

        // current has dimension len - 1; stop once the cap is reached
        if current.len() > max_dim {
            return;
        }

        for (idx, &u) in candidates.iter().enumerate() {
            let next: Vec<usize> = candidates[idx + 1..]
                .iter()
                .copied()
                .filter(|&w| adjacent[[u, w]])
                .collect();
            let new_value = current
                .iter()
                .map(|&v| self.distances.get(v, u))
                .fold(value, f64::max);

            current.push(u);
            self.expand(adjacent, current, new_value, &next, max_dim, out);
            current.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Metric;
    use ndarray::array;

    fn triangle() -> DistanceMatrix {
        DistanceMatrix::from_matrix(array![
            [0.0, 1.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 0.0]
        ])
        .unwrap()
    }

    #[test]
    fn test_triangle_components() {
        // Equilateral triangle with side 1
        let points = array![[0.0, 0.0], [1.0, 0.0], [0.5, 0.75_f64.sqrt()]];
        let dm = DistanceMatrix::from_points(&points, Metric::Euclidean).unwrap();
        let vr = VietorisRips::new(&dm).with_max_scale(Some(2.0));

        // At ε < 1, three components
        assert_eq!(vr.count_components_at(0.8), 3);

        // At ε ≥ 1, one component
        assert_eq!(vr.count_components_at(1.2), 1);
    }

    #[test]
    fn test_triangle_filtration() {
        let dm = triangle();
        let filtration = VietorisRips::new(&dm)
            .with_max_homology_dimension(1)
            .with_max_scale(Some(2.0))
            .build()
            .unwrap();

        assert_eq!(filtration.count(0), 3);
        assert_eq!(filtration.count(1), 3);
        assert_eq!(filtration.count(2), 1);
        assert_eq!(filtration.max_simplex_dimension(), 2);

        let values: Vec<(usize, f64)> = filtration
            .simplices()
            .iter()
            .map(|s| (s.dimension(), s.value()))
            .collect();
        assert_eq!(
            values,
            vec![
                (0, 0.0),
                (0, 0.0),
                (0, 0.0),
                (1, 1.0),
                (1, 1.0),
                (1, 1.0),
                (2, 1.0)
            ]
        );
    }

    #[test]
    fn test_order_and_monotonicity() {
        let dm = DistanceMatrix::from_points(
            &array![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.5, 2.0]],
            Metric::Euclidean,
        )
        .unwrap();
        let filtration = VietorisRips::new(&dm)
            .with_max_homology_dimension(2)
            .build()
            .unwrap();
        let simplices = filtration.simplices();

        for pair in simplices.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.value() < b.value()
                    || (a.value() == b.value() && a.dimension() < b.dimension())
                    || (a.value() == b.value()
                        && a.dimension() == b.dimension()
                        && a.vertices() < b.vertices())
            );
        }

        // Every face of every simplex enters no later than the simplex
        for s in simplices {
            for d in 0..s.vertices().len() {
                if s.dimension() == 0 {
                    break;
                }
                let mut face = s.vertices().to_vec();
                face.remove(d);
                let f = simplices.iter().find(|t| t.vertices() == face.as_slice()).unwrap();
                assert!(f.value() <= s.value());
            }
        }

        // The full 5-point complex up to tetrahedra
        assert_eq!(filtration.count(0), 5);
        assert_eq!(filtration.count(1), 10);
        assert_eq!(filtration.count(2), 10);
        assert_eq!(filtration.count(3), 5);
    }

    #[test]
    fn test_scale_cap() {
        let dm = DistanceMatrix::from_matrix(array![
            [0.0, 1.0, 3.0],
            [1.0, 0.0, 1.5],
            [3.0, 1.5, 0.0]
        ])
        .unwrap();
        let filtration = VietorisRips::new(&dm).with_max_scale(Some(2.0)).build().unwrap();

        assert_eq!(filtration.count(1), 2);
        assert_eq!(filtration.count(2), 0);
        assert!(filtration.simplices().iter().all(|s| s.value() <= 2.0));

        assert!(VietorisRips::new(&dm).with_max_scale(Some(0.0)).build().is_err());
        assert!(VietorisRips::new(&dm)
            .with_max_scale(Some(f64::NAN))
            .build()
            .is_err());
    }

    #[test]
    fn test_single_point() {
        let dm = DistanceMatrix::from_matrix(array![[0.0]]).unwrap();
        let filtration = VietorisRips::new(&dm).build().unwrap();
        assert_eq!(filtration.len(), 1);
        assert_eq!(filtration.n_vertices(), 1);
    }
}
