//! Pure-Rust reference kernels.
//!
//! Used for every element type without a native backend, and for native
//! types whenever no library was found. Sums accumulate with
//! [`Field::mul_add`] in index order.

use super::{Backend, Side, Transpose, Triangle};
use crate::traits::Field;

/// Pure-Rust kernels, available for every [`Field`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Naive;

/// Element `(i, j)` of an `n x n` symmetric or hermitian matrix stored in
/// `a`, reading only the `uplo` triangle.
#[inline]
fn triangle_elem<T: Field>(a: &[T], n: usize, uplo: Triangle, hermitian: bool, i: usize, j: usize) -> T {
    let stored = match uplo {
        Triangle::Upper => i <= j,
        Triangle::Lower => i >= j,
    };
    if i == j && hermitian {
        a[i * n + i].real_part()
    } else if stored {
        a[i * n + j]
    } else if hermitian {
        a[j * n + i].conj()
    } else {
        a[j * n + i]
    }
}

/// Element `(i, j)` of `op(A)` where `A` is stored with `cols` columns.
#[inline]
fn op_elem<T: Field>(a: &[T], cols: usize, trans: Transpose, i: usize, j: usize) -> T {
    match trans {
        Transpose::No => a[i * cols + j],
        Transpose::Trans => a[j * cols + i],
        Transpose::ConjTrans => a[j * cols + i].conj(),
    }
}

/// `out = beta * out`, writing zeros without reading when `beta == 0`.
#[inline]
fn scale_output<T: Field>(beta: T, out: &mut [T]) {
    if beta.is_zero() {
        out.fill(T::zero());
    } else if !beta.is_one() {
        for v in out.iter_mut() {
            *v = beta * *v;
        }
    }
}

/// `C (m x n) = alpha * sum_p lhs(i, p) * rhs(p, j) + beta * C`.
#[allow(clippy::too_many_arguments)]
#[inline]
fn product<T: Field>(
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    lhs: impl Fn(usize, usize) -> T,
    rhs: impl Fn(usize, usize) -> T,
    beta: T,
    c: &mut [T],
) {
    if m == 0 || n == 0 {
        return;
    }
    debug_assert_eq!(c.len(), m * n);
    scale_output(beta, c);
    if k == 0 || alpha.is_zero() {
        return;
    }
    for i in 0..m {
        let row = &mut c[i * n..(i + 1) * n];
        for p in 0..k {
            let aip = alpha * lhs(i, p);
            for (j, cij) in row.iter_mut().enumerate() {
                *cij = aip.mul_add(rhs(p, j), *cij);
            }
        }
    }
}

/// `y (n) = alpha * sum_j A(i, j) x(j) + beta * y` for a triangle-stored `A`.
#[allow(clippy::too_many_arguments)]
fn triangle_mv<T: Field>(
    uplo: Triangle,
    hermitian: bool,
    n: usize,
    alpha: T,
    a: &[T],
    x: &[T],
    beta: T,
    y: &mut [T],
) {
    if n == 0 {
        return;
    }
    debug_assert_eq!(a.len(), n * n);
    debug_assert_eq!(x.len(), n);
    debug_assert_eq!(y.len(), n);
    scale_output(beta, y);
    if alpha.is_zero() {
        return;
    }
    for (i, yi) in y.iter_mut().enumerate() {
        let mut acc = T::zero();
        for (j, &xj) in x.iter().enumerate() {
            acc = triangle_elem(a, n, uplo, hermitian, i, j).mul_add(xj, acc);
        }
        *yi = alpha.mul_add(acc, *yi);
    }
}

#[allow(clippy::too_many_arguments)]
fn triangle_mm<T: Field>(
    side: Side,
    uplo: Triangle,
    hermitian: bool,
    m: usize,
    n: usize,
    alpha: T,
    a: &[T],
    b: &[T],
    beta: T,
    c: &mut [T],
) {
    debug_assert_eq!(b.len(), m * n);
    match side {
        Side::Left => {
            debug_assert_eq!(a.len(), m * m);
            product(
                m,
                n,
                m,
                alpha,
                |i, p| triangle_elem(a, m, uplo, hermitian, i, p),
                |p, j| b[p * n + j],
                beta,
                c,
            )
        }
        Side::Right => {
            debug_assert_eq!(a.len(), n * n);
            product(
                m,
                n,
                n,
                alpha,
                |i, p| b[i * n + p],
                |p, j| triangle_elem(a, n, uplo, hermitian, p, j),
                beta,
                c,
            )
        }
    }
}

impl<T: Field> Backend<T> for Naive {
    fn name(&self) -> &'static str {
        "naive"
    }

    fn axpy(&self, alpha: T, x: &[T], y: &mut [T]) {
        debug_assert_eq!(x.len(), y.len());
        if alpha.is_zero() {
            return;
        }
        for (yi, &xi) in y.iter_mut().zip(x) {
            *yi = alpha.mul_add(xi, *yi);
        }
    }

    fn scal(&self, alpha: T, x: &mut [T]) {
        if alpha.is_one() {
            return;
        }
        for xi in x.iter_mut() {
            *xi = alpha * *xi;
        }
    }

    fn dot(&self, x: &[T], y: &[T]) -> T {
        debug_assert_eq!(x.len(), y.len());
        x.iter()
            .zip(y)
            .fold(T::zero(), |acc, (&xi, &yi)| xi.mul_add(yi, acc))
    }

    fn dotc(&self, x: &[T], y: &[T]) -> T {
        debug_assert_eq!(x.len(), y.len());
        x.iter()
            .zip(y)
            .fold(T::zero(), |acc, (&xi, &yi)| xi.conj().mul_add(yi, acc))
    }

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
    ) {
        if m == 0 || n == 0 {
            return;
        }
        debug_assert_eq!(a.len(), m * n);
        let (rows, inner) = if trans.is_transposed() { (n, m) } else { (m, n) };
        debug_assert_eq!(x.len(), inner);
        debug_assert_eq!(y.len(), rows);
        scale_output(beta, y);
        if alpha.is_zero() {
            return;
        }
        for (i, yi) in y.iter_mut().enumerate() {
            let mut acc = T::zero();
            for (j, &xj) in x.iter().enumerate() {
                acc = op_elem(a, n, trans, i, j).mul_add(xj, acc);
            }
            *yi = alpha.mul_add(acc, *yi);
        }
    }

    fn symv(&self, uplo: Triangle, n: usize, alpha: T, a: &[T], x: &[T], beta: T, y: &mut [T]) {
        triangle_mv(uplo, false, n, alpha, a, x, beta, y)
    }

    fn hemv(&self, uplo: Triangle, n: usize, alpha: T, a: &[T], x: &[T], beta: T, y: &mut [T]) {
        triangle_mv(uplo, true, n, alpha, a, x, beta, y)
    }

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
    ) {
        debug_assert_eq!(a.len(), m * k);
        debug_assert_eq!(b.len(), k * n);
        let a_cols = if trans_a.is_transposed() { m } else { k };
        let b_cols = if trans_b.is_transposed() { k } else { n };
        product(
            m,
            n,
            k,
            alpha,
            |i, p| op_elem(a, a_cols, trans_a, i, p),
            |p, j| op_elem(b, b_cols, trans_b, p, j),
            beta,
            c,
        )
    }

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
    ) {
        triangle_mm(side, uplo, false, m, n, alpha, a, b, beta, c)
    }

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
    ) {
        triangle_mm(side, uplo, true, m, n, alpha, a, b, beta, c)
    }
}
