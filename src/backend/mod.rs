//! Kernel backends and runtime dispatch.
//!
//! ## Dispatch strategy
//!
//! Every container operation asks [`select`] for the backend of its element
//! type. For `f32`, `f64`, `Complex<f32>` and `Complex<f64>` that is the
//! process-wide [`Blas`] registry when a native CBLAS library was found at
//! first use; for everything else, and whenever no library was found, it is
//! [`Naive`], the pure-Rust reference kernels. Both produce the same results
//! up to floating-point rounding.
//!
//! ## Storage conventions
//!
//! All matrices are dense row-major slices with leading dimension equal to
//! the number of stored columns. Shapes are given as in BLAS: `m x n` for
//! the output, `k` for the inner dimension, with `Transpose` flags
//! describing how the stored operands are read.
//!
//! | Method | Operation |
//! |--------|-----------|
//! | `axpy` | `y = alpha*x + y` |
//! | `scal` | `x = alpha*x` |
//! | `dot` / `dotc` | `x.y` / `conj(x).y` |
//! | `gemv` | `y = alpha*op(A)*x + beta*y` |
//! | `symv` / `hemv` | `y = alpha*A*x + beta*y`, `A` symmetric / hermitian |
//! | `gemm` | `C = alpha*op(A)*op(B) + beta*C` |
//! | `symm` / `hemm` | `C = alpha*A*B + beta*C` or `alpha*B*A + beta*C` |

pub(crate) mod blas;
pub mod layout;
pub(crate) mod lapack;
pub mod loader;
mod naive;

pub use blas::Blas;
pub use lapack::Lapack;
pub use naive::Naive;

use crate::traits::Field;

/// How a stored matrix operand is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transpose {
    /// As stored.
    No,
    /// Transposed.
    Trans,
    /// Conjugate-transposed (same as `Trans` for real types).
    ConjTrans,
}

impl Transpose {
    /// Whether the stored rows become columns.
    #[inline]
    pub fn is_transposed(self) -> bool {
        !matches!(self, Transpose::No)
    }
}

/// Which triangle of a symmetric or hermitian matrix is read.
///
/// The other triangle is never accessed and may hold anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Triangle {
    Upper,
    Lower,
}

/// Side of the symmetric or hermitian operand in a matrix-matrix product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// `C = alpha*A*B + beta*C`
    Left,
    /// `C = alpha*B*A + beta*C`
    Right,
}

/// Dense kernels over row-major slices.
///
/// Implementations may assume the slice lengths match the given shapes; the
/// container layer checks them. An empty output is a quick return. When
/// `beta` is zero the output is overwritten without being read. Edge cases
/// follow reference BLAS, see [`Backend::gemv`] and [`Backend::gemm`].
#[allow(clippy::too_many_arguments)]
pub trait Backend<T: Field>: Sync {
    /// Short name for logs and benchmarks.
    fn name(&self) -> &'static str;

    fn axpy(&self, alpha: T, x: &[T], y: &mut [T]);

    fn scal(&self, alpha: T, x: &mut [T]);

    fn dot(&self, x: &[T], y: &[T]) -> T;

    /// Dot product conjugating `x`.
    fn dotc(&self, x: &[T], y: &[T]) -> T;

    /// `a` is `m x n`. `x` has `n` elements and `y` has `m` when not
    /// transposed, the other way round otherwise.
    ///
    /// If `m` or `n` is zero, `y` is left untouched, even when it is not
    /// empty and `beta` is not one.
    fn gemv(
        &self,
        trans: Transpose,
        m: usize,
        n: usize,
        alpha: T,
        a: &[T],
        x: &[T],
        beta: T,
        y: &mut [T],
    );

    fn symv(&self, uplo: Triangle, n: usize, alpha: T, a: &[T], x: &[T], beta: T, y: &mut [T]);

    fn hemv(&self, uplo: Triangle, n: usize, alpha: T, a: &[T], x: &[T], beta: T, y: &mut [T]);

    /// `c` is `m x n`; `op(a)` is `m x k` and `op(b)` is `k x n`.
    ///
    /// With `k == 0` the sum is empty and `c` is only scaled by `beta`.
    fn gemm(
        &self,
        trans_a: Transpose,
        trans_b: Transpose,
        m: usize,
        n: usize,
        k: usize,
        alpha: T,
        a: &[T],
        b: &[T],
        beta: T,
        c: &mut [T],
    );

    /// `b` and `c` are `m x n`; `a` is `m x m` for [`Side::Left`] and
    /// `n x n` for [`Side::Right`].
    fn symm(
        &self,
        side: Side,
        uplo: Triangle,
        m: usize,
        n: usize,
        alpha: T,
        a: &[T],
        b: &[T],
        beta: T,
        c: &mut [T],
    );

    fn hemm(
        &self,
        side: Side,
        uplo: Triangle,
        m: usize,
        n: usize,
        alpha: T,
        a: &[T],
        b: &[T],
        beta: T,
        c: &mut [T],
    );
}

/// Backend that serves element type `T` in this process.
///
/// ```
/// let backend = dynla::backend::select::<f64>();
/// let mut y = [1.0, 2.0];
/// backend.axpy(2.0, &[1.0, 1.0], &mut y);
/// assert_eq!(y, [3.0, 4.0]);
/// ```
#[inline]
pub fn select<T: Field>() -> &'static dyn Backend<T> {
    match T::accelerated() {
        Some(backend) => backend,
        None => &Naive,
    }
}

/// `x = x / divisor` through the selected backend.
///
/// Multiplies by the reciprocal when it exists; otherwise divides every
/// element. Dividing by one leaves `x` untouched.
pub(crate) fn divide_in_place<T: Field>(x: &mut [T], divisor: T) {
    if divisor.is_one() {
        return;
    }
    match divisor.reciprocal() {
        Some(r) => select::<T>().scal(r, x),
        None => {
            for v in x.iter_mut() {
                *v = *v / divisor;
            }
        }
    }
}
