//! Properties of the distance → filtration → persistence chain on random
//! and structured point clouds.

use ndarray::{array, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use tda_rips_features::{
    compute_persistence, compute_persistence_from_distances, compute_persistence_from_points,
    persistence_entropy, DistanceMatrix, EntropyOptions, Metric, PersistenceConfig,
    PersistenceDiagram, PersistenceDiagrams, TdaError, VietorisRips,
};

fn random_cloud(seed: u64, n_points: usize, dim: usize) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((n_points, dim), |_| rng.random::<f64>())
}

fn config(dims: &[usize]) -> PersistenceConfig {
    PersistenceConfig {
        homology_dimensions: dims.to_vec(),
        ..PersistenceConfig::default()
    }
}

fn assert_close(a: &PersistenceDiagrams, b: &PersistenceDiagrams, tol: f64) {
    assert_eq!(a.dimensions().collect::<Vec<_>>(), b.dimensions().collect::<Vec<_>>());
    for (da, db) in a.iter().zip(b.iter()) {
        assert_eq!(da.len(), db.len(), "H{} sizes differ", da.dimension);
        for (pa, pb) in da.pairs.iter().zip(&db.pairs) {
            assert!((pa.birth - pb.birth).abs() < tol);
            if pa.is_essential() {
                assert!(pb.is_essential());
            } else {
                assert!((pa.death - pb.death).abs() < tol);
            }
        }
    }
}

#[test]
fn test_birth_before_death() {
    for seed in 0..5 {
        let points = random_cloud(seed, 15, 3);
        let diagrams = compute_persistence_from_points(&points, &config(&[0, 1, 2])).unwrap();

        for diagram in diagrams.iter() {
            for pair in &diagram.pairs {
                assert!(pair.birth <= pair.death);
                assert!(pair.birth >= 0.0);
            }
        }

        // One essential H₀ class for a connected (unbounded) filtration
        let h0 = diagrams.get(0).unwrap();
        assert_eq!(h0.essential_count(), 1);
        assert_eq!(h0.len(), 15);
    }
}

#[test]
fn test_permutation_invariance() {
    let points = random_cloud(7, 12, 2);
    let mut permutation: Vec<usize> = (0..12).collect();
    permutation.reverse();
    permutation.swap(0, 5);
    permutation.swap(3, 9);

    let mut permuted = Array2::<f64>::zeros(points.dim());
    for (new, &old) in permutation.iter().enumerate() {
        permuted.row_mut(new).assign(&points.row(old));
    }

    let a = compute_persistence_from_points(&points, &config(&[0, 1])).unwrap();
    let b = compute_persistence_from_points(&permuted, &config(&[0, 1])).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_rigid_motion_invariance() {
    let points = random_cloud(11, 14, 2);
    let (c, s) = (0.6_f64, 0.8_f64);
    let moved = Array2::from_shape_fn(points.dim(), |(i, k)| {
        let (x, y) = (points[[i, 0]], points[[i, 1]]);
        if k == 0 {
            c * x - s * y + 3.0
        } else {
            s * x + c * y - 1.5
        }
    });

    let a = compute_persistence_from_points(&points, &config(&[0, 1])).unwrap();
    let b = compute_persistence_from_points(&moved, &config(&[0, 1])).unwrap();
    assert_close(&a, &b, 1e-9);
}

#[test]
fn test_collapse_preserves_diagrams() {
    for seed in 0..6 {
        let points = random_cloud(100 + seed, 11, 3);
        let plain = compute_persistence_from_points(&points, &config(&[0, 1, 2])).unwrap();

        let collapsed = compute_persistence_from_points(
            &points,
            &PersistenceConfig {
                collapse_edges: true,
                ..config(&[0, 1, 2])
            },
        )
        .unwrap();

        assert_eq!(plain, collapsed, "seed {}", seed);
    }
}

#[test]
fn test_collapse_shrinks_filtration() {
    let points = random_cloud(3, 20, 2);
    let distances = DistanceMatrix::from_points(&points, Metric::Euclidean).unwrap();
    let rips = VietorisRips::new(&distances);

    let full = rips.build().unwrap();
    let collapsed = rips.with_edge_collapse(true).build().unwrap();
    assert!(collapsed.count(1) < full.count(1));
    assert_eq!(collapsed.count(0), full.count(0));

    assert_eq!(
        compute_persistence(&full, &[0, 1]).unwrap(),
        compute_persistence(&collapsed, &[0, 1]).unwrap()
    );
}

#[test]
fn test_equilateral_triangle() {
    let dm = array![[0.0, 1.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 0.0]];
    let distances = DistanceMatrix::from_matrix(dm).unwrap();
    let diagrams = compute_persistence_from_distances(&distances, &config(&[0, 1])).unwrap();

    let h0 = diagrams.get(0).unwrap();
    let finite: Vec<(f64, f64)> = h0.finite_pairs().map(|p| (p.birth, p.death)).collect();
    assert_eq!(finite, vec![(0.0, 1.0), (0.0, 1.0)]);
    assert_eq!(h0.essential_count(), 1);
    assert!(diagrams.get(1).unwrap().is_empty());

    let entropy = persistence_entropy(h0, &EntropyOptions::default()).unwrap();
    assert!((entropy - 2.0_f64.ln()).abs() < 1e-12);
}

#[test]
fn test_circle_has_one_dominant_loop() {
    let n = 20;
    let points = Array2::from_shape_fn((n, 2), |(i, k)| {
        let theta = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
        if k == 0 {
            theta.cos()
        } else {
            theta.sin()
        }
    });
    let diagrams = compute_persistence_from_points(&points, &config(&[0, 1])).unwrap();
    let h1 = diagrams.get(1).unwrap();

    let side = 2.0 * (std::f64::consts::PI / n as f64).sin();
    let dominant: Vec<_> = h1.finite_pairs().filter(|p| p.persistence() > 0.5).collect();
    assert_eq!(dominant.len(), 1);
    assert!((dominant[0].birth - side).abs() < 1e-9);
    assert!(dominant[0].death > 1.5);

    for pair in h1.finite_pairs().filter(|p| p.persistence() <= 0.5) {
        assert!(pair.persistence() < 1e-9);
    }
}

#[test]
fn test_noisy_circle_keeps_its_loop() {
    let mut rng = StdRng::seed_from_u64(2024);
    let noise = Normal::new(0.0, 0.03).unwrap();
    let n = 30;
    let points = Array2::from_shape_fn((n, 2), |(i, k)| {
        let theta = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
        let base = if k == 0 { theta.cos() } else { theta.sin() };
        base + noise.sample(&mut rng)
    });

    let diagrams = compute_persistence_from_points(
        &points,
        &PersistenceConfig {
            collapse_edges: true,
            ..config(&[0, 1])
        },
    )
    .unwrap();

    let mut lifetimes = diagrams.get(1).unwrap().lifetimes();
    lifetimes.sort_by(|a, b| b.total_cmp(a));
    assert!(lifetimes[0] > 1.0);
    assert!(lifetimes.get(1).map_or(true, |&l| l < 0.3));
}

#[test]
fn test_uniform_lifetimes_maximize_entropy() {
    let n = 6;
    let uniform = PersistenceDiagram::from_pairs(1, (0..n).map(|i| (i as f64, i as f64 + 0.5)));
    let skewed = PersistenceDiagram::from_pairs(1, (0..n).map(|i| (0.0, 1.0 + i as f64)));

    let options = EntropyOptions::default();
    let h_uniform = persistence_entropy(&uniform, &options).unwrap();
    let h_skewed = persistence_entropy(&skewed, &options).unwrap();

    assert!((h_uniform - (n as f64).ln()).abs() < 1e-12);
    assert!(h_skewed < h_uniform);
}

#[test]
fn test_scale_cap_leaves_essential_classes() {
    let points = array![[0.0, 0.0], [1.0, 0.0], [5.0, 0.0]];
    let diagrams = compute_persistence_from_points(
        &points,
        &PersistenceConfig {
            max_scale: Some(2.0),
            ..config(&[0])
        },
    )
    .unwrap();

    let h0 = diagrams.get(0).unwrap();
    assert_eq!(h0.finite_pairs().count(), 1);
    assert_eq!(h0.essential_count(), 2);
}

#[test]
fn test_metrics_change_scales() {
    let points = array![[0.0, 0.0], [3.0, 4.0]];
    let death = |metric: Metric| {
        let diagrams = compute_persistence_from_points(
            &points,
            &PersistenceConfig {
                metric,
                ..config(&[0])
            },
        )
        .unwrap();
        let death = diagrams.get(0).unwrap().finite_pairs().next().unwrap().death;
        death
    };

    assert_eq!(death(Metric::Euclidean), 5.0);
    assert_eq!(death(Metric::Manhattan), 7.0);
    assert_eq!(death(Metric::Chebyshev), 4.0);
}

#[test]
fn test_invalid_inputs() {
    let empty = Array2::<f64>::zeros((0, 2));
    assert!(matches!(
        compute_persistence_from_points(&empty, &config(&[0])),
        Err(TdaError::InvalidInput(_))
    ));

    let asymmetric = array![[0.0, 1.0], [2.0, 0.0]];
    assert!(matches!(
        DistanceMatrix::from_matrix(asymmetric),
        Err(TdaError::InvalidInput(_))
    ));

    let points = random_cloud(1, 5, 2);
    let distances = DistanceMatrix::from_points(&points, Metric::Euclidean).unwrap();
    let filtration = VietorisRips::new(&distances).build().unwrap();
    assert!(matches!(
        compute_persistence(&filtration, &[0, 2]),
        Err(TdaError::UnsupportedDimension { requested: 2, .. })
    ));
}

#[test]
fn test_diagrams_serialize_infinite_death_as_null() {
    let diagrams = compute_persistence_from_points(&array![[0.0], [2.0]], &config(&[0])).unwrap();
    let json = serde_json::to_value(&diagrams).unwrap();

    let pairs = json["0"]["pairs"].as_array().unwrap();
    assert_eq!(pairs.len(), 2);
    assert!(pairs.iter().any(|p| p["death"].is_null()));
    assert!(pairs.iter().any(|p| p["death"] == 2.0));
}
