mod ops;
mod product;

use core::ops::{Index, IndexMut};

use approx::{AbsDiffEq, RelativeEq};

use crate::traits::Field;
use crate::Vector;

/// Heap-allocated dense matrix with row-major storage.
///
/// Element `(i, j)` lives at `elements[i * columns + j]`. Shape is fixed at
/// construction and `elements.len() == rows * columns` always holds.
///
/// # Examples
///
/// ```
/// use dynla::Matrix;
///
/// let a = Matrix::new(2, 2, vec![1.0_f64, 2.0, -1.0, 3.0]);
/// let b = Matrix::new(2, 2, vec![0.0, 1.0, 2.0, 3.0]);
/// assert_eq!(a.dot(&b).as_slice(), &[4.0, 7.0, 6.0, 8.0]);
/// assert_eq!(b.dot(&a).as_slice(), &[-1.0, 3.0, -1.0, 13.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    elements: Vec<T>,
    rows: usize,
    columns: usize,
}

// ── Constructors ────────────────────────────────────────────────────

/// `rows * columns`, panicking instead of wrapping.
fn element_count(rows: usize, columns: usize) -> usize {
    rows.checked_mul(columns)
        .unwrap_or_else(|| panic!("shape {}x{} overflows the element count", rows, columns))
}

impl<T: Field> Matrix<T> {
    /// Wrap row-major `elements` as a `rows x columns` matrix.
    ///
    /// # Panics
    ///
    /// If `elements.len() != rows * columns` or the product overflows.
    pub fn new(rows: usize, columns: usize, elements: Vec<T>) -> Self {
        assert_eq!(
            elements.len(),
            element_count(rows, columns),
            "element count {} does not match shape {}x{}",
            elements.len(),
            rows,
            columns
        );
        Self {
            elements,
            rows,
            columns,
        }
    }

    /// Copy a row-major slice.
    pub fn from_slice(rows: usize, columns: usize, elements: &[T]) -> Self {
        Self::new(rows, columns, elements.to_vec())
    }

    /// Build from a list of equally long rows.
    ///
    /// ```
    /// use dynla::Matrix;
    /// let m = Matrix::from_rows(&[[1.0_f32, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    /// assert_eq!((m.rows(), m.columns()), (2, 3));
    /// assert_eq!(m[(1, 0)], 4.0);
    /// ```
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Self {
        let columns = rows.first().map_or(0, |r| r.as_ref().len());
        let mut elements = Vec::with_capacity(rows.len() * columns);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            assert_eq!(
                row.len(),
                columns,
                "row {} has {} elements, expected {}",
                i,
                row.len(),
                columns
            );
            elements.extend_from_slice(row);
        }
        Self {
            elements,
            rows: rows.len(),
            columns,
        }
    }

    /// Build from a list of equally long columns.
    ///
    /// ```
    /// use dynla::Matrix;
    /// let m = Matrix::from_columns(&[[1.0_f64, 2.0], [3.0, 4.0], [5.0, 6.0]]);
    /// assert_eq!(m.shape(), (2, 3));
    /// assert_eq!(m.row(0), &[1.0, 3.0, 5.0]);
    /// ```
    pub fn from_columns<C: AsRef<[T]>>(columns: &[C]) -> Self {
        let rows = columns.first().map_or(0, |c| c.as_ref().len());
        for (j, column) in columns.iter().enumerate() {
            let len = column.as_ref().len();
            assert_eq!(len, rows, "column {} has {} elements, expected {}", j, len, rows);
        }
        Self::from_fn(rows, columns.len(), |i, j| columns[j].as_ref()[i])
    }

    /// `rows x columns` matrix of zeros.
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self {
            elements: vec![T::zero(); element_count(rows, columns)],
            rows,
            columns,
        }
    }

    /// Element `(i, j)` is `f(i, j)`.
    pub fn from_fn(rows: usize, columns: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut elements = Vec::with_capacity(element_count(rows, columns));
        for i in 0..rows {
            for j in 0..columns {
                elements.push(f(i, j));
            }
        }
        Self {
            elements,
            rows,
            columns,
        }
    }

    /// `n x n` identity.
    ///
    /// ```
    /// use dynla::Matrix;
    /// let i = Matrix::<f64>::identity(3);
    /// assert_eq!(i[(1, 1)], 1.0);
    /// assert_eq!(i[(0, 2)], 0.0);
    /// assert_eq!(i.trace(), 3.0);
    /// ```
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |i, j| if i == j { T::one() } else { T::zero() })
    }

    /// Square matrix with `diagonal` on the diagonal and zeros elsewhere.
    pub fn diagonal(diagonal: &[T]) -> Self {
        let n = diagonal.len();
        let mut m = Self::zeros(n, n);
        for (i, &d) in diagonal.iter().enumerate() {
            m.elements[i * n + i] = d;
        }
        m
    }

    /// Hankel matrix, constant along every anti-diagonal.
    ///
    /// Row 0 is `first_row` and the last column is `last_column`, so the
    /// shape is `last_column.len() x first_row.len()`.
    ///
    /// ```
    /// use dynla::Matrix;
    /// let h = Matrix::hankel(&[1.0_f64, 2.0, 3.0], &[3.0, 4.0]);
    /// assert_eq!(h.as_slice(), &[1.0, 2.0, 3.0, 2.0, 3.0, 4.0]);
    /// ```
    ///
    /// # Panics
    ///
    /// If the last element of `first_row` differs from the first element of
    /// `last_column`.
    pub fn hankel(first_row: &[T], last_column: &[T]) -> Self {
        assert!(
            first_row.last() == last_column.first(),
            "hankel: first row ends in {:?} but last column starts with {:?}",
            first_row.last(),
            last_column.first()
        );
        let columns = first_row.len();
        Self::from_fn(last_column.len(), columns, |i, j| {
            let k = i + j;
            if k < columns {
                first_row[k]
            } else {
                last_column[k + 1 - columns]
            }
        })
    }
}

// ── Accessors ───────────────────────────────────────────────────────

impl<T> Matrix<T> {
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// `(rows, columns)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.columns
    }

    /// Row-major element buffer.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.elements
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.elements
    }

    /// Row `i` as a slice.
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        assert!(i < self.rows, "row {} out of range for {} rows", i, self.rows);
        &self.elements[i * self.columns..(i + 1) * self.columns]
    }
}

// ── Utilities ───────────────────────────────────────────────────────

impl<T: Field> Matrix<T> {
    /// Column `j` copied into a vector.
    pub fn column(&self, j: usize) -> Vector<T> {
        assert!(
            j < self.columns,
            "column {} out of range for {} columns",
            j,
            self.columns
        );
        (0..self.rows).map(|i| self.elements[i * self.columns + j]).collect()
    }

    pub fn transpose(&self) -> Matrix<T> {
        Matrix::from_fn(self.columns, self.rows, |i, j| self[(j, i)])
    }

    /// Transpose with every element conjugated.
    pub fn conjugate_transpose(&self) -> Matrix<T> {
        Matrix::from_fn(self.columns, self.rows, |i, j| self[(j, i)].conj())
    }

    /// Sum of the diagonal.
    ///
    /// # Panics
    ///
    /// If the matrix is not square.
    pub fn trace(&self) -> T {
        assert!(
            self.is_square(),
            "trace of non-square {}x{} matrix",
            self.rows,
            self.columns
        );
        (0..self.rows).fold(T::zero(), |acc, i| acc + self.elements[i * self.columns + i])
    }

    /// Kronecker product `self ⊗ other`.
    ///
    /// ```
    /// use dynla::Matrix;
    /// let a = Matrix::<f64>::identity(2);
    /// let b = Matrix::new(1, 2, vec![1.0, 2.0]);
    /// let k = a.kronecker(&b);
    /// assert_eq!(k.shape(), (2, 4));
    /// assert_eq!(k.as_slice(), &[1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0]);
    /// ```
    pub fn kronecker(&self, other: &Matrix<T>) -> Matrix<T> {
        let (p, q) = other.shape();
        Matrix::from_fn(self.rows * p, self.columns * q, |i, j| {
            self[(i / p, j / q)] * other[(i % p, j % q)]
        })
    }

    /// Partial trace over a tensor-product space.
    ///
    /// The matrix acts on subsystems of sizes `dimensions`, the last one
    /// varying fastest as in [`kronecker`](Self::kronecker). Subsystems not
    /// listed in `keep` are traced out. With an empty `keep` the result is
    /// the 1x1 full trace.
    ///
    /// ```
    /// use dynla::Matrix;
    /// let b = Matrix::from_rows(&[[1.0_f64, 2.0], [3.0, 4.0]]);
    /// let c = Matrix::from_rows(&[[1.0, 0.0], [0.0, 2.0]]);
    /// let bc = b.kronecker(&c);
    /// // tracing out c leaves trace(c) * b
    /// assert_eq!(bc.partial_trace(&[2, 2], &[0]), &b * 3.0);
    /// ```
    ///
    /// # Panics
    ///
    /// If the matrix is not square with side `dimensions.iter().product()`,
    /// or `keep` is not strictly increasing with entries below
    /// `dimensions.len()`.
    pub fn partial_trace(&self, dimensions: &[usize], keep: &[usize]) -> Matrix<T> {
        let total = dimensions.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d));
        assert!(
            self.is_square() && total == Some(self.rows),
            "partial trace over subsystems {:?} needs a square matrix of that size, got {}x{}",
            dimensions,
            self.rows,
            self.columns
        );
        assert!(
            keep.windows(2).all(|w| w[0] < w[1]) && keep.last().map_or(true, |&k| k < dimensions.len()),
            "kept subsystems {:?} must be increasing indices below {}",
            keep,
            dimensions.len()
        );

        let kept = subsystem_offsets(dimensions, keep.iter().copied());
        let traced = subsystem_offsets(dimensions, (0..dimensions.len()).filter(|i| !keep.contains(i)));
        let n = self.columns;
        Matrix::from_fn(kept.len(), kept.len(), |a, b| {
            traced.iter().fold(T::zero(), |acc, &t| {
                acc + self.elements[(kept[a] + t) * n + kept[b] + t]
            })
        })
    }
}

/// Offsets into the full index space for every joint index of the
/// `selected` subsystems (increasing order, last one fastest).
fn subsystem_offsets(dimensions: &[usize], selected: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut offsets = vec![0];
    for i in selected {
        let stride: usize = dimensions[i + 1..].iter().product();
        offsets = offsets
            .iter()
            .flat_map(|&o| (0..dimensions[i]).map(move |d| o + d * stride))
            .collect();
    }
    offsets
}

// ── Index ───────────────────────────────────────────────────────────

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        debug_assert!(i < self.rows && j < self.columns);
        &self.elements[i * self.columns + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        debug_assert!(i < self.rows && j < self.columns);
        &mut self.elements[i * self.columns + j]
    }
}

// ── Approximate equality ────────────────────────────────────────────

/// Element-wise, and `false` for different shapes.
///
/// ```
/// use approx::assert_relative_eq;
/// use dynla::Matrix;
///
/// let a = Matrix::from_rows(&[[0.1_f64 + 0.2, 1.0]]);
/// let b = Matrix::from_rows(&[[0.3_f64, 1.0]]);
/// assert_ne!(a, b);
/// assert_relative_eq!(a, b);
/// ```
impl<T: AbsDiffEq> AbsDiffEq for Matrix<T>
where
    T::Epsilon: Copy,
{
    type Epsilon = T::Epsilon;

    fn default_epsilon() -> T::Epsilon {
        T::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: T::Epsilon) -> bool {
        self.shape() == other.shape()
            && self
                .elements
                .iter()
                .zip(&other.elements)
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl<T: RelativeEq> RelativeEq for Matrix<T>
where
    T::Epsilon: Copy,
{
    fn default_max_relative() -> T::Epsilon {
        T::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: T::Epsilon, max_relative: T::Epsilon) -> bool {
        self.shape() == other.shape()
            && self
                .elements
                .iter()
                .zip(&other.elements)
                .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}
