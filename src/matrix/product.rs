use core::ops::Mul;

use crate::backend::{self, Side, Transpose, Triangle};
use crate::traits::Field;
use crate::Vector;

use super::Matrix;

// ── Matrix-vector products ──────────────────────────────────────────

impl<T: Field> Matrix<T> {
    /// `A x`.
    ///
    /// ```
    /// use dynla::{Matrix, Vector};
    /// let a = Matrix::from_rows(&[[1.0_f64, 2.0], [3.0, 4.0]]);
    /// let x = Vector::from_slice(&[1.0, -1.0]);
    /// assert_eq!(a.dot_vector(&x).as_slice(), &[-1.0, -1.0]);
    /// ```
    pub fn dot_vector(&self, x: &Vector<T>) -> Vector<T> {
        let mut out = Vector::zeros(self.rows);
        self.dot_vector_into(Transpose::No, x, T::one(), T::zero(), &mut out);
        out
    }

    /// `out = alpha * op(A) x + beta * out`.
    ///
    /// With `beta == 0` the previous contents of `out` are ignored.
    pub fn dot_vector_into(&self, trans: Transpose, x: &Vector<T>, alpha: T, beta: T, out: &mut Vector<T>) {
        let (out_len, in_len) = if trans.is_transposed() {
            (self.columns, self.rows)
        } else {
            (self.rows, self.columns)
        };
        assert_eq!(
            x.len(),
            in_len,
            "dimension mismatch: {}x{} * {}",
            out_len,
            in_len,
            x.len()
        );
        assert_eq!(
            out.len(),
            out_len,
            "output length {} does not match {} rows",
            out.len(),
            out_len
        );
        backend::select::<T>().gemv(
            trans,
            self.rows,
            self.columns,
            alpha,
            &self.elements,
            x.as_slice(),
            beta,
            out.as_mut_slice(),
        );
    }

    /// `A x` for symmetric `A`, reading only the upper triangle.
    pub fn symmetric_dot_vector(&self, x: &Vector<T>) -> Vector<T> {
        let mut out = Vector::zeros(self.rows);
        self.symmetric_dot_vector_into(Triangle::Upper, x, T::one(), T::zero(), &mut out);
        out
    }

    /// `out = alpha * A x + beta * out` for symmetric `A` stored in `uplo`.
    pub fn symmetric_dot_vector_into(&self, uplo: Triangle, x: &Vector<T>, alpha: T, beta: T, out: &mut Vector<T>) {
        self.check_square_vector(x, out);
        backend::select::<T>().symv(
            uplo,
            self.rows,
            alpha,
            &self.elements,
            x.as_slice(),
            beta,
            out.as_mut_slice(),
        );
    }

    /// `A x` for hermitian `A`, reading only the upper triangle. The
    /// imaginary parts of the diagonal are taken as zero.
    ///
    /// ```
    /// use dynla::{Matrix, Vector, c64};
    /// let a = Matrix::from_rows(&[
    ///     [c64::new(2.0, 0.0), c64::new(0.0, 1.0)],
    ///     [c64::new(0.0, 0.0), c64::new(3.0, 0.0)], // lower triangle ignored
    /// ]);
    /// let x = Vector::from_slice(&[c64::new(1.0, 0.0), c64::new(1.0, 0.0)]);
    /// let y = a.hermitian_dot_vector(&x);
    /// assert_eq!(y[1], c64::new(3.0, -1.0));
    /// ```
    pub fn hermitian_dot_vector(&self, x: &Vector<T>) -> Vector<T> {
        let mut out = Vector::zeros(self.rows);
        self.hermitian_dot_vector_into(Triangle::Upper, x, T::one(), T::zero(), &mut out);
        out
    }

    /// `out = alpha * A x + beta * out` for hermitian `A` stored in `uplo`.
    pub fn hermitian_dot_vector_into(&self, uplo: Triangle, x: &Vector<T>, alpha: T, beta: T, out: &mut Vector<T>) {
        self.check_square_vector(x, out);
        backend::select::<T>().hemv(
            uplo,
            self.rows,
            alpha,
            &self.elements,
            x.as_slice(),
            beta,
            out.as_mut_slice(),
        );
    }

    fn check_square_vector(&self, x: &Vector<T>, out: &Vector<T>) {
        assert!(
            self.is_square(),
            "symmetric product needs a square matrix, got {}x{}",
            self.rows,
            self.columns
        );
        assert_eq!(
            x.len(),
            self.columns,
            "dimension mismatch: {}x{} * {}",
            self.rows,
            self.columns,
            x.len()
        );
        assert_eq!(
            out.len(),
            self.rows,
            "output length {} does not match {} rows",
            out.len(),
            self.rows
        );
    }
}

// ── Matrix-matrix products ──────────────────────────────────────────

impl<T: Field> Matrix<T> {
    /// `A B`.
    pub fn dot(&self, other: &Matrix<T>) -> Matrix<T> {
        let mut out = Matrix::zeros(self.rows, other.columns);
        self.dot_into(other, T::one(), T::zero(), &mut out);
        out
    }

    /// `out = alpha * A B + beta * out`.
    pub fn dot_into(&self, other: &Matrix<T>, alpha: T, beta: T, out: &mut Matrix<T>) {
        self.product(Transpose::No, other, Transpose::No, alpha, beta, out);
    }

    /// `out = alpha * op(A) op(B) + beta * out`, with each operand optionally
    /// (conjugate-)transposed.
    ///
    /// ```
    /// use dynla::Matrix;
    /// use dynla::backend::Transpose;
    ///
    /// let a = Matrix::from_rows(&[[1.0_f64, 2.0, 3.0]]);
    /// // a^T a is the 3x3 outer product
    /// let mut g = Matrix::zeros(3, 3);
    /// a.product(Transpose::Trans, &a, Transpose::No, 1.0, 0.0, &mut g);
    /// assert_eq!(g[(2, 1)], 6.0);
    /// ```
    pub fn product(
        &self,
        trans_self: Transpose,
        other: &Matrix<T>,
        trans_other: Transpose,
        alpha: T,
        beta: T,
        out: &mut Matrix<T>,
    ) {
        let (m, k) = if trans_self.is_transposed() {
            (self.columns, self.rows)
        } else {
            (self.rows, self.columns)
        };
        let (k2, n) = if trans_other.is_transposed() {
            (other.columns, other.rows)
        } else {
            (other.rows, other.columns)
        };
        assert_eq!(k, k2, "dimension mismatch: {}x{} * {}x{}", m, k, k2, n);
        assert_eq!(
            out.shape(),
            (m, n),
            "output shape {}x{} does not match product {}x{}",
            out.rows,
            out.columns,
            m,
            n
        );
        backend::select::<T>().gemm(
            trans_self,
            trans_other,
            m,
            n,
            k,
            alpha,
            &self.elements,
            &other.elements,
            beta,
            &mut out.elements,
        );
    }

    /// `A B` where the symmetric operand (upper triangle read) is `self` for
    /// [`Side::Left`] and `other` for [`Side::Right`].
    ///
    /// ```
    /// use dynla::Matrix;
    /// use dynla::backend::Side;
    ///
    /// let s = Matrix::from_rows(&[[2.0_f64, 1.0], [0.0, 3.0]]); // upper of [[2,1],[1,3]]
    /// let b = Matrix::from_rows(&[[1.0, 0.0], [0.0, 1.0]]);
    /// assert_eq!(s.symmetric_dot(&b, Side::Left).as_slice(), &[2.0, 1.0, 1.0, 3.0]);
    /// assert_eq!(b.symmetric_dot(&s, Side::Right).as_slice(), &[2.0, 1.0, 1.0, 3.0]);
    /// ```
    pub fn symmetric_dot(&self, other: &Matrix<T>, side: Side) -> Matrix<T> {
        let mut out = Matrix::zeros(self.rows, other.columns);
        self.symmetric_dot_into(other, side, Triangle::Upper, T::one(), T::zero(), &mut out);
        out
    }

    /// `out = alpha * A B + beta * out` with the symmetric operand chosen by
    /// `side` and stored in `uplo`.
    pub fn symmetric_dot_into(
        &self,
        other: &Matrix<T>,
        side: Side,
        uplo: Triangle,
        alpha: T,
        beta: T,
        out: &mut Matrix<T>,
    ) {
        let (a, b) = self.split_triangle_operands(other, side, out);
        backend::select::<T>().symm(
            side,
            uplo,
            out.rows,
            out.columns,
            alpha,
            a,
            b,
            beta,
            &mut out.elements,
        );
    }

    /// Hermitian counterpart of [`symmetric_dot`](Self::symmetric_dot).
    pub fn hermitian_dot(&self, other: &Matrix<T>, side: Side) -> Matrix<T> {
        let mut out = Matrix::zeros(self.rows, other.columns);
        self.hermitian_dot_into(other, side, Triangle::Upper, T::one(), T::zero(), &mut out);
        out
    }

    /// Hermitian counterpart of [`symmetric_dot_into`](Self::symmetric_dot_into).
    pub fn hermitian_dot_into(
        &self,
        other: &Matrix<T>,
        side: Side,
        uplo: Triangle,
        alpha: T,
        beta: T,
        out: &mut Matrix<T>,
    ) {
        let (a, b) = self.split_triangle_operands(other, side, out);
        backend::select::<T>().hemm(
            side,
            uplo,
            out.rows,
            out.columns,
            alpha,
            a,
            b,
            beta,
            &mut out.elements,
        );
    }

    /// Check shapes of `self * other` and return `(triangle operand, general
    /// operand)` in backend order.
    fn split_triangle_operands<'a>(
        &'a self,
        other: &'a Matrix<T>,
        side: Side,
        out: &Matrix<T>,
    ) -> (&'a [T], &'a [T]) {
        assert_eq!(
            self.columns, other.rows,
            "dimension mismatch: {}x{} * {}x{}",
            self.rows, self.columns, other.rows, other.columns
        );
        let square = match side {
            Side::Left => self,
            Side::Right => other,
        };
        assert!(
            square.is_square(),
            "symmetric operand must be square, got {}x{}",
            square.rows,
            square.columns
        );
        assert_eq!(
            out.shape(),
            (self.rows, other.columns),
            "output shape {}x{} does not match product {}x{}",
            out.rows,
            out.columns,
            self.rows,
            other.columns
        );
        match side {
            Side::Left => (&self.elements, &other.elements),
            Side::Right => (&other.elements, &self.elements),
        }
    }
}

// ── Operators ───────────────────────────────────────────────────────

impl<T: Field> Mul<&Matrix<T>> for &Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, rhs: &Matrix<T>) -> Matrix<T> {
        self.dot(rhs)
    }
}

impl<T: Field> Mul for Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, rhs: Matrix<T>) -> Matrix<T> {
        self.dot(&rhs)
    }
}

impl<T: Field> Mul<&Vector<T>> for &Matrix<T> {
    type Output = Vector<T>;

    fn mul(self, rhs: &Vector<T>) -> Vector<T> {
        self.dot_vector(rhs)
    }
}

impl<T: Field> Mul<Vector<T>> for &Matrix<T> {
    type Output = Vector<T>;

    fn mul(self, rhs: Vector<T>) -> Vector<T> {
        self.dot_vector(&rhs)
    }
}
