mod ops;

use core::ops::{Index, IndexMut};

use approx::{AbsDiffEq, RelativeEq};

use crate::backend::{self, Transpose, Triangle};
use crate::traits::Field;
use crate::Matrix;

/// Heap-allocated dense vector.
///
/// Length is fixed at construction. Arithmetic methods mutate in place and
/// run on the backend selected for `T` (see [`backend`](crate::backend)).
///
/// # Examples
///
/// ```
/// use dynla::Vector;
///
/// let mut v = Vector::from_slice(&[1.0_f64, 2.0, 3.0]);
/// let w = Vector::from_slice(&[1.0, 1.0, 1.0]);
/// v.add_scaled(&w, 2.0);
/// assert_eq!(v.as_slice(), &[3.0, 4.0, 5.0]);
/// assert_eq!(v.dot(&w), 12.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Vector<T> {
    data: Vec<T>,
}

// ── Constructors ────────────────────────────────────────────────────

impl<T: Field> Vector<T> {
    /// Take ownership of `data`.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Copy a slice.
    pub fn from_slice(data: &[T]) -> Self {
        Self { data: data.to_vec() }
    }

    /// Vector of `n` zeros.
    ///
    /// ```
    /// use dynla::Vector;
    /// let v = Vector::<f32>::zeros(4);
    /// assert_eq!(v.len(), 4);
    /// assert_eq!(v[3], 0.0);
    /// ```
    pub fn zeros(n: usize) -> Self {
        Self {
            data: vec![T::zero(); n],
        }
    }

    /// Vector of `n` copies of `value`.
    pub fn filled(n: usize, value: T) -> Self {
        Self {
            data: vec![value; n],
        }
    }

    /// Element `i` is `f(i)`.
    ///
    /// ```
    /// use dynla::Vector;
    /// let v = Vector::from_fn(3, |i| i as f64 * 0.5);
    /// assert_eq!(v.as_slice(), &[0.0, 0.5, 1.0]);
    /// ```
    pub fn from_fn(n: usize, f: impl FnMut(usize) -> T) -> Self {
        Self {
            data: (0..n).map(f).collect(),
        }
    }
}

// ── Accessors ───────────────────────────────────────────────────────

impl<T> Vector<T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.data.iter()
    }
}

// ── Products ────────────────────────────────────────────────────────

impl<T: Field> Vector<T> {
    /// Unconjugated dot product `sum x[i] * y[i]`.
    pub fn dot(&self, other: &Vector<T>) -> T {
        assert_eq!(
            self.len(),
            other.len(),
            "length mismatch: {} . {}",
            self.len(),
            other.len()
        );
        backend::select::<T>().dot(&self.data, &other.data)
    }

    /// Inner product `sum conj(x[i]) * y[i]`. Same as [`dot`](Self::dot) for
    /// real types.
    ///
    /// ```
    /// use dynla::{Vector, c64};
    /// let x = Vector::from_slice(&[c64::new(0.0, 1.0)]);
    /// assert_eq!(x.dot(&x), c64::new(-1.0, 0.0));
    /// assert_eq!(x.inner(&x), c64::new(1.0, 0.0));
    /// ```
    pub fn inner(&self, other: &Vector<T>) -> T {
        assert_eq!(
            self.len(),
            other.len(),
            "length mismatch: {} . {}",
            self.len(),
            other.len()
        );
        backend::select::<T>().dotc(&self.data, &other.data)
    }

    /// `x^T M y`, the dot product weighted by `metric`.
    ///
    /// For complex vectors this is not an inner product; see
    /// [`inner_metric`](Self::inner_metric).
    ///
    /// ```
    /// use dynla::{Matrix, Vector};
    /// let g = Matrix::diagonal(&[1.0_f64, -1.0]);
    /// let x = Vector::from_slice(&[3.0, 2.0]);
    /// assert_eq!(x.dot_metric(&x, &g), 5.0);
    /// ```
    pub fn dot_metric(&self, other: &Vector<T>, metric: &Matrix<T>) -> T {
        self.check_metric(other, metric);
        self.dot(&metric.dot_vector(other))
    }

    /// `x^H M y`. Same as [`dot_metric`](Self::dot_metric) for real types.
    pub fn inner_metric(&self, other: &Vector<T>, metric: &Matrix<T>) -> T {
        self.check_metric(other, metric);
        self.inner(&metric.dot_vector(other))
    }

    fn check_metric(&self, other: &Vector<T>, metric: &Matrix<T>) {
        assert!(
            self.len() == metric.rows() && other.len() == metric.columns(),
            "dimension mismatch: 1x{} * {}x{} * {}",
            self.len(),
            metric.rows(),
            metric.columns(),
            other.len()
        );
    }

    /// `<x, x>`, the squared Euclidean norm embedded in `T`.
    pub fn norm_squared(&self) -> T {
        self.inner(self)
    }

    /// Outer product `x y^T`, an `len(x) x len(y)` matrix.
    ///
    /// ```
    /// use dynla::Vector;
    /// let x = Vector::from_slice(&[1.0_f64, 2.0]);
    /// let y = Vector::from_slice(&[3.0, 4.0, 5.0]);
    /// let m = x.outer(&y);
    /// assert_eq!((m.rows(), m.columns()), (2, 3));
    /// assert_eq!(m[(1, 2)], 10.0);
    /// ```
    pub fn outer(&self, other: &Vector<T>) -> Matrix<T> {
        let (m, n) = (self.len(), other.len());
        let mut out = Matrix::zeros(m, n);
        backend::select::<T>().gemm(
            Transpose::No,
            Transpose::No,
            m,
            n,
            1,
            T::one(),
            &self.data,
            &other.data,
            T::zero(),
            out.as_mut_slice(),
        );
        out
    }

    /// Row vector times matrix, `x A`.
    ///
    /// ```
    /// use dynla::{Matrix, Vector};
    /// let a = Matrix::new(2, 3, vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// let x = Vector::from_slice(&[1.0, 1.0]);
    /// assert_eq!(x.dot_matrix(&a).as_slice(), &[5.0, 7.0, 9.0]);
    /// ```
    pub fn dot_matrix(&self, matrix: &Matrix<T>) -> Vector<T> {
        let mut out = Vector::zeros(matrix.columns());
        self.dot_matrix_into(matrix, T::one(), T::zero(), &mut out);
        out
    }

    /// `out = alpha * x A + beta * out`.
    pub fn dot_matrix_into(&self, matrix: &Matrix<T>, alpha: T, beta: T, out: &mut Vector<T>) {
        assert_eq!(
            self.len(),
            matrix.rows(),
            "dimension mismatch: 1x{} * {}x{}",
            self.len(),
            matrix.rows(),
            matrix.columns()
        );
        assert_eq!(
            out.len(),
            matrix.columns(),
            "output length {} does not match {} columns",
            out.len(),
            matrix.columns()
        );
        backend::select::<T>().gemv(
            Transpose::Trans,
            matrix.rows(),
            matrix.columns(),
            alpha,
            matrix.as_slice(),
            &self.data,
            beta,
            &mut out.data,
        );
    }

    /// `x A` for symmetric `A`, reading only the upper triangle.
    pub fn symmetric_dot_matrix(&self, matrix: &Matrix<T>) -> Vector<T> {
        let mut out = Vector::zeros(matrix.columns());
        self.symmetric_dot_matrix_into(Triangle::Upper, matrix, T::one(), T::zero(), &mut out);
        out
    }

    /// `out = alpha * x A + beta * out` for symmetric `A` stored in `uplo`.
    ///
    /// `x A = (A x)^T` when `A` is symmetric, so this is a symmetric
    /// matrix-vector product.
    pub fn symmetric_dot_matrix_into(
        &self,
        uplo: Triangle,
        matrix: &Matrix<T>,
        alpha: T,
        beta: T,
        out: &mut Vector<T>,
    ) {
        matrix.symmetric_dot_vector_into(uplo, self, alpha, beta, out);
    }

    /// `x A` for hermitian `A`, reading only the upper triangle.
    ///
    /// ```
    /// use dynla::{Matrix, Vector, c64};
    /// let a = Matrix::from_rows(&[
    ///     [c64::new(1.0, 0.0), c64::new(0.0, 1.0)],
    ///     [c64::new(0.0, -1.0), c64::new(1.0, 0.0)],
    /// ]);
    /// let x = Vector::from_slice(&[c64::new(1.0, 0.0), c64::new(0.0, 0.0)]);
    /// // first row of A
    /// let y = x.hermitian_dot_matrix(&a);
    /// assert_eq!(y.as_slice(), a.row(0));
    /// ```
    pub fn hermitian_dot_matrix(&self, matrix: &Matrix<T>) -> Vector<T> {
        let mut out = Vector::zeros(matrix.columns());
        self.hermitian_dot_matrix_into(Triangle::Upper, matrix, T::one(), T::zero(), &mut out);
        out
    }

    /// `out = alpha * x A + beta * out` for hermitian `A` stored in `uplo`.
    ///
    /// Computed as `conj(A conj(x))`, since `A^T = conj(A)`.
    pub fn hermitian_dot_matrix_into(
        &self,
        uplo: Triangle,
        matrix: &Matrix<T>,
        alpha: T,
        beta: T,
        out: &mut Vector<T>,
    ) {
        let x: Vector<T> = self.iter().map(|v| v.conj()).collect();
        conjugate_in_place(&mut out.data);
        matrix.hermitian_dot_vector_into(uplo, &x, alpha.conj(), beta.conj(), out);
        conjugate_in_place(&mut out.data);
    }
}

fn conjugate_in_place<T: Field>(x: &mut [T]) {
    for v in x.iter_mut() {
        *v = v.conj();
    }
}

// ── Index ───────────────────────────────────────────────────────────

impl<T> Index<usize> for Vector<T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

impl<T> IndexMut<usize> for Vector<T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[i]
    }
}

// ── Conversions ─────────────────────────────────────────────────────

impl<T> From<Vec<T>> for Vector<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T> From<Vector<T>> for Vec<T> {
    fn from(v: Vector<T>) -> Self {
        v.data
    }
}

impl<T> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<T> IntoIterator for Vector<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<T> AsRef<[T]> for Vector<T> {
    fn as_ref(&self) -> &[T] {
        &self.data
    }
}

// ── Approximate equality ────────────────────────────────────────────

/// Element-wise, and `false` for different lengths.
impl<T: AbsDiffEq> AbsDiffEq for Vector<T>
where
    T::Epsilon: Copy,
{
    type Epsilon = T::Epsilon;

    fn default_epsilon() -> T::Epsilon {
        T::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: T::Epsilon) -> bool {
        self.data.len() == other.data.len()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl<T: RelativeEq> RelativeEq for Vector<T>
where
    T::Epsilon: Copy,
{
    fn default_max_relative() -> T::Epsilon {
        T::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: T::Epsilon, max_relative: T::Epsilon) -> bool {
        self.data.len() == other.data.len()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}
