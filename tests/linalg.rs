//! LAPACK-backed routines. Every check also accepts `BackendUnavailable`,
//! which is the documented result on machines without LAPACKE.

use dynla::backend::{Lapack, Transpose};
use dynla::linalg::{self, EigenVectors};
use dynla::{c32, c64, LinalgError, Matrix, Vector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const UNAVAILABLE: LinalgError = LinalgError::BackendUnavailable { family: "LAPACK" };

fn available() -> bool {
    Lapack::global().is_available()
}

/// Random matrix with a heavy diagonal so it is well conditioned.
fn well_conditioned(rng: &mut StdRng, n: usize) -> Matrix<f64> {
    Matrix::from_fn(n, n, |i, j| {
        let v: f64 = rng.gen_range(-1.0..1.0);
        if i == j {
            v + n as f64
        } else {
            v
        }
    })
}

fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max)
}

#[test]
fn solve_50x50_f64() {
    let mut rng = StdRng::seed_from_u64(50);
    let a = well_conditioned(&mut rng, 50);
    let b = Matrix::from_fn(50, 3, |_, _| rng.gen_range(-10.0..10.0));
    match linalg::solve(&a, &b) {
        Ok(x) => {
            let residual = a.dot(&x);
            assert!(max_abs_diff(residual.as_slice(), b.as_slice()) < 1e-10);
        }
        Err(e) => {
            assert!(!available());
            assert_eq!(e, UNAVAILABLE);
        }
    }
}

#[test]
fn solve_50x50_f32() {
    let mut rng = StdRng::seed_from_u64(32);
    let a = Matrix::from_fn(50, 50, |i, j| {
        let v: f32 = rng.gen_range(-1.0..1.0);
        if i == j {
            v + 50.0
        } else {
            v
        }
    });
    let b = Vector::from_fn(50, |i| (i as f32 * 0.37).sin());
    match linalg::solve_vector(&a, &b) {
        Ok(x) => {
            let residual = a.dot_vector(&x);
            for (r, want) in residual.iter().zip(b.iter()) {
                assert!((r - want).abs() < 1e-4, "{} vs {}", r, want);
            }
        }
        Err(e) => assert_eq!(e, UNAVAILABLE),
    }
}

#[test]
fn solve_complex_systems() {
    let a = Matrix::from_rows(&[
        [c64::new(2.0, 1.0), c64::new(1.0, -1.0)],
        [c64::new(1.0, 0.0), c64::new(3.0, 2.0)],
    ]);
    let b = Vector::from_slice(&[c64::new(5.0, 3.0), c64::new(7.0, 4.0)]);
    match linalg::solve_vector(&a, &b) {
        Ok(x) => {
            let r = a.dot_vector(&x);
            for i in 0..2 {
                assert!((r[i] - b[i]).norm() < 1e-12);
            }
        }
        Err(e) => assert_eq!(e, UNAVAILABLE),
    }

    let a32 = Matrix::from_rows(&[[c32::new(0.0, 1.0), c32::new(0.0, 0.0)], [c32::new(0.0, 0.0), c32::new(2.0, 0.0)]]);
    let b32 = Matrix::from_rows(&[[c32::new(1.0, 0.0)], [c32::new(4.0, 0.0)]]);
    match linalg::solve(&a32, &b32) {
        Ok(x) => {
            assert!((x[(0, 0)] - c32::new(0.0, -1.0)).norm() < 1e-6);
            assert!((x[(1, 0)] - c32::new(2.0, 0.0)).norm() < 1e-6);
        }
        Err(e) => assert_eq!(e, UNAVAILABLE),
    }
}

#[test]
fn singular_matrix_is_reported() {
    let a = Matrix::from_rows(&[[1.0_f32, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]]);
    let b = Vector::from_slice(&[1.0, 2.0, 3.0]);
    match linalg::solve_vector(&a, &b) {
        Err(LinalgError::Singular { routine, info }) => {
            assert_eq!(routine, "LAPACKE_sgesv");
            assert!(info > 0);
        }
        Err(e) => assert_eq!(e, UNAVAILABLE),
        Ok(x) => panic!("singular system solved: {:?}", x),
    }
}

#[test]
fn least_squares_normal_equations_hold() {
    let mut rng = StdRng::seed_from_u64(11);
    let a = Matrix::from_fn(20, 4, |_, _| c64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)));
    let b = Matrix::from_fn(20, 2, |_, _| c64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)));
    match linalg::least_squares(&a, &b) {
        Ok(fit) => {
            assert_eq!(fit.solution.shape(), (4, 2));
            let residuals = fit.residuals.expect("overdetermined");
            assert_eq!(residuals.shape(), (16, 2));

            // A^H (B - A X) = 0 at the minimizer
            let mut r = b.clone();
            r.subtract(&a.dot(&fit.solution));
            let mut normal = Matrix::zeros(4, 2);
            a.product(Transpose::ConjTrans, &r, Transpose::No, c64::new(1.0, 0.0), c64::new(0.0, 0.0), &mut normal);
            assert!(normal.as_slice().iter().all(|z| z.norm() < 1e-10));

            // trailing rows carry the residual norm
            for j in 0..2 {
                let direct: f64 = (0..20).map(|i| r[(i, j)].norm_sqr()).sum();
                let reported: f64 = (0..16).map(|i| residuals[(i, j)].norm_sqr()).sum();
                assert!((direct - reported).abs() < 1e-10);
            }
        }
        Err(e) => assert_eq!(e, UNAVAILABLE),
    }
}

#[test]
fn underdetermined_least_squares_is_minimum_norm() {
    // x0 + x1 = 2 has minimum-norm solution (1, 1)
    let a = Matrix::from_rows(&[[1.0_f32, 1.0]]);
    let b = Vector::from_slice(&[2.0]);
    match linalg::least_squares_vector(&a, &b) {
        Ok(fit) => {
            assert!(fit.residuals.is_none());
            assert_eq!(fit.solution.len(), 2);
            assert!((fit.solution[0] - 1.0).abs() < 1e-5);
            assert!((fit.solution[1] - 1.0).abs() < 1e-5);
        }
        Err(e) => assert_eq!(e, UNAVAILABLE),
    }
}

#[test]
fn symmetric_eigendecomposition_reconstructs() {
    let mut rng = StdRng::seed_from_u64(7);
    let m = Matrix::from_fn(6, 6, |_, _| rng.gen_range(-1.0..1.0_f64));
    // m^T m is symmetric positive semidefinite
    let mut a = Matrix::zeros(6, 6);
    m.product(Transpose::Trans, &m, Transpose::No, 1.0, 0.0, &mut a);

    match linalg::eigh(&a) {
        Ok((values, vectors)) => {
            for pair in values.as_slice().windows(2) {
                assert!(pair[0] <= pair[1]);
            }
            assert!(values[0] > -1e-12);
            // A V = V diag(values)
            let av = a.dot(&vectors);
            let vd = vectors.dot(&Matrix::diagonal(values.as_slice()));
            assert!(max_abs_diff(av.as_slice(), vd.as_slice()) < 1e-10);

            let only = linalg::eigenvalues_hermitian(&a).expect("LAPACK is loaded");
            assert!(max_abs_diff(only.as_slice(), values.as_slice()) < 1e-10);
        }
        Err(e) => assert_eq!(e, UNAVAILABLE),
    }
}

#[test]
fn hermitian_eigenvalues_are_real() {
    // [[2, i], [-i, 2]] has eigenvalues 1 and 3
    let h = Matrix::from_rows(&[[c64::new(2.0, 0.0), c64::new(0.0, 1.0)], [c64::new(0.0, -1.0), c64::new(2.0, 0.0)]]);
    match linalg::eigenvalues_hermitian(&h) {
        Ok(values) => {
            assert!((values[0] - 1.0).abs() < 1e-12);
            assert!((values[1] - 3.0).abs() < 1e-12);
        }
        Err(e) => assert_eq!(e, UNAVAILABLE),
    }
}

#[test]
fn general_eigenvectors_satisfy_definition() {
    // block diagonal: a rotation-scaling block and a real eigenvalue
    let a = Matrix::from_rows(&[[1.0_f64, -2.0, 0.0], [2.0, 1.0, 0.0], [0.0, 0.0, 5.0]]);
    match linalg::eig(&a, EigenVectors::Both) {
        Ok(e) => {
            let ac = Matrix::from_fn(3, 3, |i, j| c64::new(a[(i, j)], 0.0));
            let right = e.right.expect("right eigenvectors requested");
            let left = e.left.expect("left eigenvectors requested");
            for j in 0..3 {
                let lambda = e.values[j];
                let v = right.column(j);
                let av = ac.dot_vector(&v);
                for i in 0..3 {
                    assert!((av[i] - lambda * v[i]).norm() < 1e-12);
                }
                // u^H A = lambda u^H  <=>  A^H u = conj(lambda) u
                let u = left.column(j);
                let ahu = ac.conjugate_transpose().dot_vector(&u);
                for i in 0..3 {
                    assert!((ahu[i] - lambda.conj() * u[i]).norm() < 1e-12);
                }
            }
            let mut imag: Vec<f64> = e.values.iter().map(|z| z.im).collect();
            imag.sort_by(|x, y| x.total_cmp(y));
            assert!((imag[0] + 2.0).abs() < 1e-12);
            assert!(imag[1].abs() < 1e-12);
            assert!((imag[2] - 2.0).abs() < 1e-12);

            let values = linalg::eigenvalues(&a).expect("LAPACK is loaded");
            assert_eq!(values.len(), 3);
        }
        Err(e) => assert_eq!(e, UNAVAILABLE),
    }
}

#[test]
fn explicit_registry_without_libraries() {
    let lapack = Lapack::unavailable();
    let a = Matrix::<c64>::identity(3);
    assert_eq!(linalg::eig_with(&lapack, &a, EigenVectors::Right), Err(UNAVAILABLE));
    assert_eq!(linalg::eigh_with(&lapack, &a), Err(UNAVAILABLE));
    let tall = Matrix::<c32>::zeros(4, 2);
    assert_eq!(linalg::least_squares_with(&lapack, &tall, &Matrix::zeros(4, 3)), Err(UNAVAILABLE));
    assert_eq!(linalg::least_squares_vector_with(&lapack, &tall, &Vector::zeros(4)), Err(UNAVAILABLE));
}
