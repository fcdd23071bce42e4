//! Dense solvers, least squares and eigen-decompositions.
//!
//! These routines exist only as native LAPACKE calls. When no LAPACKE
//! library was found they return
//! [`LinalgError::BackendUnavailable`](crate::LinalgError::BackendUnavailable)
//! instead of falling back. Each function uses [`Lapack::global`]; the
//! `*_with` forms take an explicit registry.
//!
//! ```no_run
//! use dynla::{linalg, Matrix, Vector};
//!
//! let a = Matrix::from_rows(&[[3.0_f64, 1.0], [1.0, 2.0]]);
//! let b = Vector::from_slice(&[9.0, 8.0]);
//! let x = linalg::solve_vector(&a, &b)?;
//! assert!((x[0] - 2.0).abs() < 1e-12);
//! assert!((x[1] - 3.0).abs() < 1e-12);
//! # Ok::<(), dynla::LinalgError>(())
//! ```

mod lapacke;

pub use lapacke::LapackScalar;

use num_traits::Zero;

use crate::backend::Lapack;
use crate::error::Result;
use crate::{Matrix, Vector};

fn assert_square<T>(a: &Matrix<T>, what: &str) {
    assert!(
        a.is_square(),
        "{} needs a square matrix, got {}x{}",
        what,
        a.rows(),
        a.columns()
    );
}

// ── Linear systems ──────────────────────────────────────────────────

/// Solve `A X = B` by LU factorization with partial pivoting.
///
/// # Errors
///
/// [`Singular`](crate::LinalgError::Singular) if `A` is exactly singular,
/// [`BackendUnavailable`](crate::LinalgError::BackendUnavailable) without
/// LAPACK.
///
/// # Panics
///
/// If `A` is not square or `B` has a different number of rows.
pub fn solve<T: LapackScalar>(a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>> {
    solve_with(Lapack::global(), a, b)
}

pub fn solve_with<T: LapackScalar>(lapack: &Lapack, a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>> {
    assert_square(a, "solve");
    assert_eq!(
        a.rows(),
        b.rows(),
        "dimension mismatch: {}x{} \\ {}x{}",
        a.rows(),
        a.columns(),
        b.rows(),
        b.columns()
    );
    let mut lu = a.as_slice().to_vec();
    let mut x = b.clone();
    T::gesv(lapack, a.rows(), b.columns(), &mut lu, x.as_mut_slice())?;
    Ok(x)
}

/// Solve `A x = b` for a single right-hand side.
pub fn solve_vector<T: LapackScalar>(a: &Matrix<T>, b: &Vector<T>) -> Result<Vector<T>> {
    solve_vector_with(Lapack::global(), a, b)
}

pub fn solve_vector_with<T: LapackScalar>(lapack: &Lapack, a: &Matrix<T>, b: &Vector<T>) -> Result<Vector<T>> {
    assert_square(a, "solve");
    assert_eq!(
        a.rows(),
        b.len(),
        "dimension mismatch: {}x{} \\ {}",
        a.rows(),
        a.columns(),
        b.len()
    );
    let mut lu = a.as_slice().to_vec();
    let mut x = b.clone();
    T::gesv(lapack, a.rows(), 1, &mut lu, x.as_mut_slice())?;
    Ok(x)
}

// ── Least squares ───────────────────────────────────────────────────

/// Result of [`least_squares`] and [`least_squares_vector`].
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquares<S> {
    /// Minimizer of `|A x - b|` for each right-hand side; the minimum-norm
    /// solution when `A` has more columns than rows.
    pub solution: S,
    /// For an overdetermined system (`m > n`), the trailing `m - n`
    /// components of `Q^H b`. The squared norm of column `j` is the residual
    /// sum of squares of right-hand side `j`. `None` when `m <= n`.
    pub residuals: Option<S>,
}

/// Solve `min |A X - B|` for a full-rank `m x n` matrix `A` by QR (or LQ
/// when `m < n`) factorization.
///
/// ```no_run
/// use dynla::{linalg, Matrix};
///
/// // fit y = c0 + c1 t through (0, 1), (1, 3), (2, 5)
/// let a = Matrix::from_rows(&[[1.0_f64, 0.0], [1.0, 1.0], [1.0, 2.0]]);
/// let y = Matrix::from_rows(&[[1.0], [3.0], [5.0]]);
/// let fit = linalg::least_squares(&a, &y)?;
/// assert!((fit.solution[(0, 0)] - 1.0).abs() < 1e-12);
/// assert!((fit.solution[(1, 0)] - 2.0).abs() < 1e-12);
/// # Ok::<(), dynla::LinalgError>(())
/// ```
///
/// # Errors
///
/// [`RankDeficient`](crate::LinalgError::RankDeficient) if `A` does not have
/// full rank,
/// [`BackendUnavailable`](crate::LinalgError::BackendUnavailable) without
/// LAPACK.
///
/// # Panics
///
/// If `B` has a different number of rows than `A`.
pub fn least_squares<T: LapackScalar>(a: &Matrix<T>, b: &Matrix<T>) -> Result<LeastSquares<Matrix<T>>> {
    least_squares_with(Lapack::global(), a, b)
}

pub fn least_squares_with<T: LapackScalar>(
    lapack: &Lapack,
    a: &Matrix<T>,
    b: &Matrix<T>,
) -> Result<LeastSquares<Matrix<T>>> {
    assert_eq!(
        a.rows(),
        b.rows(),
        "dimension mismatch: {}x{} \\ {}x{}",
        a.rows(),
        a.columns(),
        b.rows(),
        b.columns()
    );
    let (m, n, nrhs) = (a.rows(), a.columns(), b.columns());
    let mut factors = a.as_slice().to_vec();
    let mut work = b.as_slice().to_vec();
    work.resize(m.max(n) * nrhs, T::zero());
    T::gels(lapack, m, n, nrhs, &mut factors, &mut work)?;

    let residuals = (m > n).then(|| Matrix::new(m - n, nrhs, work.split_off(n * nrhs)));
    Ok(LeastSquares {
        solution: Matrix::new(n, nrhs, work),
        residuals,
    })
}

/// [`least_squares`] for a single right-hand side.
pub fn least_squares_vector<T: LapackScalar>(a: &Matrix<T>, b: &Vector<T>) -> Result<LeastSquares<Vector<T>>> {
    least_squares_vector_with(Lapack::global(), a, b)
}

pub fn least_squares_vector_with<T: LapackScalar>(
    lapack: &Lapack,
    a: &Matrix<T>,
    b: &Vector<T>,
) -> Result<LeastSquares<Vector<T>>> {
    assert_eq!(
        a.rows(),
        b.len(),
        "dimension mismatch: {}x{} \\ {}",
        a.rows(),
        a.columns(),
        b.len()
    );
    let rhs = Matrix::from_slice(b.len(), 1, b.as_slice());
    let fit = least_squares_with(lapack, a, &rhs)?;
    Ok(LeastSquares {
        solution: Vector::from_vec(fit.solution.into_vec()),
        residuals: fit.residuals.map(|r| Vector::from_vec(r.into_vec())),
    })
}

// ── Hermitian eigenproblem ──────────────────────────────────────────

/// Eigen-decomposition of a symmetric (real) or hermitian (complex) matrix.
///
/// Only the upper triangle of `a` is read. Returns the eigenvalues in
/// ascending order and a matrix whose column `j` is the unit eigenvector
/// for eigenvalue `j`.
///
/// # Errors
///
/// [`ConvergenceFailure`](crate::LinalgError::ConvergenceFailure) if the
/// divide-and-conquer iteration fails.
pub fn eigh<T: LapackScalar>(a: &Matrix<T>) -> Result<(Vector<T::Real>, Matrix<T>)> {
    eigh_with(Lapack::global(), a)
}

pub fn eigh_with<T: LapackScalar>(lapack: &Lapack, a: &Matrix<T>) -> Result<(Vector<T::Real>, Matrix<T>)> {
    assert_square(a, "eigh");
    let n = a.rows();
    let mut vectors = a.clone();
    let mut values = Vector::zeros(n);
    T::eigh(lapack, true, n, vectors.as_mut_slice(), values.as_mut_slice())?;
    Ok((values, vectors))
}

/// Eigenvalues of a symmetric or hermitian matrix, ascending.
pub fn eigenvalues_hermitian<T: LapackScalar>(a: &Matrix<T>) -> Result<Vector<T::Real>> {
    eigenvalues_hermitian_with(Lapack::global(), a)
}

pub fn eigenvalues_hermitian_with<T: LapackScalar>(lapack: &Lapack, a: &Matrix<T>) -> Result<Vector<T::Real>> {
    assert_square(a, "eigenvalues_hermitian");
    let n = a.rows();
    let mut work = a.as_slice().to_vec();
    let mut values = Vector::zeros(n);
    T::eigh(lapack, false, n, &mut work, values.as_mut_slice())?;
    Ok(values)
}

// ── General eigenproblem ────────────────────────────────────────────

/// Which eigenvectors [`eig`] computes alongside the eigenvalues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EigenVectors {
    /// Eigenvalues only.
    #[default]
    None,
    /// Left eigenvectors, `u^H A = lambda u^H`.
    Left,
    /// Right eigenvectors, `A v = lambda v`.
    Right,
    Both,
}

impl EigenVectors {
    fn wants_left(self) -> bool {
        matches!(self, EigenVectors::Left | EigenVectors::Both)
    }

    fn wants_right(self) -> bool {
        matches!(self, EigenVectors::Right | EigenVectors::Both)
    }
}

/// Result of [`eig`]. Eigenvector `j` is column `j` of `left` / `right` and
/// belongs to `values[j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenDecomposition<C> {
    pub values: Vector<C>,
    pub left: Option<Matrix<C>>,
    pub right: Option<Matrix<C>>,
}

/// Eigenvalues and, per `vectors`, eigenvectors of a general square matrix.
///
/// Eigenvalues are complex even for real input. For real input, complex
/// eigenvalues come in conjugate pairs, stored next to each other with the
/// positive imaginary part first, and so do their eigenvectors. Each
/// eigenvector is normalized to unit Euclidean norm with largest component
/// real.
///
/// ```no_run
/// use dynla::linalg::{eig, EigenVectors};
/// use dynla::{c64, Matrix};
///
/// // rotation by 90 degrees
/// let r = Matrix::from_rows(&[[0.0_f64, -1.0], [1.0, 0.0]]);
/// let e = eig(&r, EigenVectors::Right)?;
/// assert!((e.values[0] - c64::new(0.0, 1.0)).norm() < 1e-12);
/// assert!((e.values[1] - c64::new(0.0, -1.0)).norm() < 1e-12);
/// # Ok::<(), dynla::LinalgError>(())
/// ```
pub fn eig<T: LapackScalar>(a: &Matrix<T>, vectors: EigenVectors) -> Result<EigenDecomposition<T::Complex>> {
    eig_with(Lapack::global(), a, vectors)
}

pub fn eig_with<T: LapackScalar>(
    lapack: &Lapack,
    a: &Matrix<T>,
    vectors: EigenVectors,
) -> Result<EigenDecomposition<T::Complex>> {
    assert_square(a, "eig");
    let n = a.rows();
    let (left, right) = (vectors.wants_left(), vectors.wants_right());
    let buffer = |wanted: bool| vec![<T::Complex as Zero>::zero(); if wanted { n * n } else { 0 }];

    let mut work = a.as_slice().to_vec();
    let mut values = Vector::zeros(n);
    let mut vl = buffer(left);
    let mut vr = buffer(right);
    T::geev(lapack, left, right, n, &mut work, values.as_mut_slice(), &mut vl, &mut vr)?;

    Ok(EigenDecomposition {
        values,
        left: left.then(|| Matrix::new(n, n, vl)),
        right: right.then(|| Matrix::new(n, n, vr)),
    })
}

/// Eigenvalues of a general square matrix.
pub fn eigenvalues<T: LapackScalar>(a: &Matrix<T>) -> Result<Vector<T::Complex>> {
    eigenvalues_with(Lapack::global(), a)
}

pub fn eigenvalues_with<T: LapackScalar>(lapack: &Lapack, a: &Matrix<T>) -> Result<Vector<T::Complex>> {
    eig_with(lapack, a, EigenVectors::None).map(|e| e.values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LinalgError;
    use num_complex::Complex;

    const UNAVAILABLE: LinalgError = LinalgError::BackendUnavailable { family: "LAPACK" };

    #[test]
    fn unavailable_registry_errors() {
        let lapack = Lapack::unavailable();
        let a = Matrix::<f64>::identity(2);
        let b = Vector::from_slice(&[1.0, 2.0]);
        assert_eq!(solve_vector_with(&lapack, &a, &b), Err(UNAVAILABLE));
        assert_eq!(solve_with(&lapack, &a, &Matrix::identity(2)), Err(UNAVAILABLE));
        assert_eq!(eigh_with(&lapack, &a), Err(UNAVAILABLE));
        assert_eq!(eigenvalues_hermitian_with(&lapack, &a), Err(UNAVAILABLE));
        let z = Matrix::<Complex<f32>>::identity(2);
        assert_eq!(eig_with(&lapack, &z, EigenVectors::Both), Err(UNAVAILABLE));
        assert_eq!(eigenvalues_with(&lapack, &z), Err(UNAVAILABLE));
        let tall = Matrix::<f32>::zeros(3, 2);
        assert_eq!(least_squares_with(&lapack, &tall, &Matrix::zeros(3, 1)), Err(UNAVAILABLE));
        assert_eq!(least_squares_vector_with(&lapack, &tall, &Vector::zeros(3)), Err(UNAVAILABLE));
    }

    #[test]
    fn empty_systems_need_the_backend_too() {
        let a = Matrix::<f64>::zeros(0, 0);
        let b = Matrix::<f64>::zeros(0, 3);
        assert_eq!(solve_with(&Lapack::unavailable(), &a, &b), Err(UNAVAILABLE));
    }

    #[test]
    fn solve_or_unavailable() {
        let a = Matrix::from_rows(&[[3.0_f64, 1.0], [1.0, 2.0]]);
        let b = Vector::from_slice(&[9.0, 8.0]);
        match solve_vector(&a, &b) {
            Ok(x) => {
                assert!((x[0] - 2.0).abs() < 1e-12);
                assert!((x[1] - 3.0).abs() < 1e-12);
            }
            Err(e) => assert_eq!(e, UNAVAILABLE),
        }
    }

    #[test]
    fn singular_system_is_reported() {
        let a = Matrix::from_rows(&[[1.0_f64, 2.0], [2.0, 4.0]]);
        let b = Vector::from_slice(&[1.0, 1.0]);
        match solve_vector(&a, &b) {
            Err(LinalgError::Singular { routine, info }) => {
                assert_eq!(routine, "LAPACKE_dgesv");
                assert_eq!(info, 2);
            }
            Err(e) => assert_eq!(e, UNAVAILABLE),
            Ok(x) => panic!("singular system solved: {:?}", x),
        }
    }

    #[test]
    fn eigh_of_diagonal_matrix() {
        let a = Matrix::diagonal(&[3.0_f64, 1.0, 2.0]);
        match eigh(&a) {
            Ok((values, vectors)) => {
                assert_eq!(values.len(), 3);
                for (v, expected) in values.iter().zip([1.0, 2.0, 3.0]) {
                    assert!((v - expected).abs() < 1e-12);
                }
                // eigenvalue 1 belongs to the second unit vector
                assert!((vectors[(1, 0)].abs() - 1.0).abs() < 1e-12);
            }
            Err(e) => assert_eq!(e, UNAVAILABLE),
        }
    }

    #[test]
    fn real_rotation_gives_conjugate_eigenvectors() {
        let r = Matrix::from_rows(&[[0.0_f64, -1.0], [1.0, 0.0]]);
        match eig(&r, EigenVectors::Right) {
            Ok(e) => {
                assert!(e.left.is_none());
                let v = e.right.expect("right eigenvectors requested");
                for j in 0..2 {
                    let lambda = e.values[j];
                    // A v = lambda v, column by column
                    for i in 0..2 {
                        let av = Complex::new(r[(i, 0)], 0.0) * v[(0, j)] + Complex::new(r[(i, 1)], 0.0) * v[(1, j)];
                        assert!((av - lambda * v[(i, j)]).norm() < 1e-12);
                    }
                }
                assert_eq!(v[(0, 1)], v[(0, 0)].conj());
                assert_eq!(v[(1, 1)], v[(1, 0)].conj());
            }
            Err(e) => assert_eq!(e, UNAVAILABLE),
        }
    }

    #[test]
    fn line_fit_or_unavailable() {
        // noisy samples of a line at t = 0..3
        let a = Matrix::from_fn(4, 2, |i, j| if j == 0 { 1.0_f64 } else { i as f64 });
        let b = Vector::from_slice(&[1.5, 2.5, 5.5, 6.5]);
        match least_squares_vector(&a, &b) {
            Ok(fit) => {
                assert_eq!(fit.solution.len(), 2);
                assert!((fit.solution[0] - 1.3).abs() < 1e-12);
                assert!((fit.solution[1] - 1.8).abs() < 1e-12);
                // residual sum of squares of the fit
                let rss: f64 = fit.residuals.expect("overdetermined").iter().map(|r| r * r).sum();
                assert!((rss - 0.8).abs() < 1e-12);
            }
            Err(e) => assert_eq!(e, UNAVAILABLE),
        }
    }

    #[test]
    fn rank_deficient_least_squares() {
        // zero second column: R[2,2] is exactly zero
        let a = Matrix::from_rows(&[[1.0_f64, 0.0], [2.0, 0.0], [3.0, 0.0]]);
        let b = Matrix::from_rows(&[[1.0], [2.0], [3.0]]);
        match least_squares(&a, &b) {
            Err(LinalgError::RankDeficient { routine, info }) => {
                assert_eq!(routine, "LAPACKE_dgels");
                assert_eq!(info, 2);
            }
            Err(e) => assert_eq!(e, UNAVAILABLE),
            Ok(fit) => panic!("rank-deficient system solved: {:?}", fit),
        }
    }

    #[test]
    #[should_panic(expected = "dimension mismatch")]
    fn least_squares_rejects_mismatched_rhs() {
        let a = Matrix::<f64>::zeros(3, 2);
        let b = Vector::<f64>::zeros(2);
        let _ = least_squares_vector_with(&Lapack::unavailable(), &a, &b);
    }

    #[test]
    #[should_panic(expected = "solve needs a square matrix, got 2x3")]
    fn solve_rejects_rectangular() {
        let a = Matrix::<f64>::zeros(2, 3);
        let b = Matrix::<f64>::zeros(2, 1);
        let _ = solve_with(&Lapack::unavailable(), &a, &b);
    }

    #[test]
    #[should_panic(expected = "dimension mismatch")]
    fn solve_rejects_mismatched_rhs() {
        let a = Matrix::<f64>::zeros(2, 2);
        let b = Vector::<f64>::zeros(3);
        let _ = solve_vector_with(&Lapack::unavailable(), &a, &b);
    }
}
