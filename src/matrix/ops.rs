use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use num_complex::Complex;
use num_traits::One;

use crate::backend;
use crate::traits::{ComplexField, Field};

use super::Matrix;

// ── In-place arithmetic ─────────────────────────────────────────────
//
// Element-wise operations run the vector kernels over the flat buffer.

impl<T: Field> Matrix<T> {
    fn check_shape(&self, other: &Matrix<T>, op: &str) {
        assert_eq!(
            self.shape(),
            other.shape(),
            "dimension mismatch: {}x{} {} {}x{}",
            self.rows,
            self.columns,
            op,
            other.rows,
            other.columns
        );
    }

    /// `self += other`.
    pub fn add(&mut self, other: &Matrix<T>) {
        self.add_scaled(other, T::one());
    }

    /// `self += alpha * other`.
    pub fn add_scaled(&mut self, other: &Matrix<T>, alpha: T) {
        self.check_shape(other, "+");
        backend::select::<T>().axpy(alpha, &other.elements, &mut self.elements);
    }

    /// `self -= other`.
    pub fn subtract(&mut self, other: &Matrix<T>) {
        self.subtract_scaled(other, T::one());
    }

    /// `self -= alpha * other`.
    pub fn subtract_scaled(&mut self, other: &Matrix<T>, alpha: T) {
        self.check_shape(other, "-");
        backend::select::<T>().axpy(-alpha, &other.elements, &mut self.elements);
    }

    /// `self *= alpha`. Scaling by one is a no-op.
    pub fn scale(&mut self, alpha: T) {
        if alpha.is_one() {
            return;
        }
        backend::select::<T>().scal(alpha, &mut self.elements);
    }

    /// `self /= divisor`, multiplying by the reciprocal when one exists.
    pub fn divide(&mut self, divisor: T) {
        backend::divide_in_place(&mut self.elements, divisor);
    }
}

impl<T: ComplexField> Matrix<T> {
    /// Scale a complex matrix by a real factor.
    pub fn scale_real(&mut self, alpha: T::Real) {
        if alpha.is_one() {
            return;
        }
        backend::select::<T::Real>().scal(alpha, T::as_real_mut(&mut self.elements));
    }

    /// Divide a complex matrix by a real divisor.
    pub fn divide_real(&mut self, divisor: T::Real) {
        backend::divide_in_place(T::as_real_mut(&mut self.elements), divisor);
    }
}

// ── Element-wise addition ───────────────────────────────────────────

impl<T: Field> Add<&Matrix<T>> for Matrix<T> {
    type Output = Matrix<T>;

    fn add(mut self, rhs: &Matrix<T>) -> Matrix<T> {
        Matrix::add(&mut self, rhs);
        self
    }
}

impl<T: Field> Add for Matrix<T> {
    type Output = Matrix<T>;

    fn add(self, rhs: Matrix<T>) -> Matrix<T> {
        self + &rhs
    }
}

impl<T: Field> Add<&Matrix<T>> for &Matrix<T> {
    type Output = Matrix<T>;

    fn add(self, rhs: &Matrix<T>) -> Matrix<T> {
        self.clone() + rhs
    }
}

impl<T: Field> AddAssign<&Matrix<T>> for Matrix<T> {
    fn add_assign(&mut self, rhs: &Matrix<T>) {
        Matrix::add(self, rhs);
    }
}

impl<T: Field> AddAssign for Matrix<T> {
    fn add_assign(&mut self, rhs: Matrix<T>) {
        Matrix::add(self, &rhs);
    }
}

// ── Element-wise subtraction ────────────────────────────────────────

impl<T: Field> Sub<&Matrix<T>> for Matrix<T> {
    type Output = Matrix<T>;

    fn sub(mut self, rhs: &Matrix<T>) -> Matrix<T> {
        self.subtract(rhs);
        self
    }
}

impl<T: Field> Sub for Matrix<T> {
    type Output = Matrix<T>;

    fn sub(self, rhs: Matrix<T>) -> Matrix<T> {
        self - &rhs
    }
}

impl<T: Field> Sub<&Matrix<T>> for &Matrix<T> {
    type Output = Matrix<T>;

    fn sub(self, rhs: &Matrix<T>) -> Matrix<T> {
        self.clone() - rhs
    }
}

impl<T: Field> SubAssign<&Matrix<T>> for Matrix<T> {
    fn sub_assign(&mut self, rhs: &Matrix<T>) {
        self.subtract(rhs);
    }
}

impl<T: Field> SubAssign for Matrix<T> {
    fn sub_assign(&mut self, rhs: Matrix<T>) {
        self.subtract(&rhs);
    }
}

// ── Negation ────────────────────────────────────────────────────────

impl<T: Field> Neg for Matrix<T> {
    type Output = Matrix<T>;

    fn neg(mut self) -> Matrix<T> {
        self.scale(-T::one());
        self
    }
}

impl<T: Field> Neg for &Matrix<T> {
    type Output = Matrix<T>;

    fn neg(self) -> Matrix<T> {
        -self.clone()
    }
}

// ── Scalar multiplication and division ──────────────────────────────

impl<T: Field> Mul<T> for Matrix<T> {
    type Output = Matrix<T>;

    fn mul(mut self, rhs: T) -> Matrix<T> {
        self.scale(rhs);
        self
    }
}

impl<T: Field> Mul<T> for &Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, rhs: T) -> Matrix<T> {
        self.clone() * rhs
    }
}

impl<T: Field> MulAssign<T> for Matrix<T> {
    fn mul_assign(&mut self, rhs: T) {
        self.scale(rhs);
    }
}

impl<T: Field> Div<T> for Matrix<T> {
    type Output = Matrix<T>;

    fn div(mut self, rhs: T) -> Matrix<T> {
        self.divide(rhs);
        self
    }
}

impl<T: Field> Div<T> for &Matrix<T> {
    type Output = Matrix<T>;

    fn div(self, rhs: T) -> Matrix<T> {
        self.clone() / rhs
    }
}

impl<T: Field> DivAssign<T> for Matrix<T> {
    fn div_assign(&mut self, rhs: T) {
        self.divide(rhs);
    }
}

// ── scalar * matrix (concrete impls) ────────────────────────────────

macro_rules! impl_scalar_mul_matrix {
    ($($t:ty),*) => {
        $(
            impl Mul<Matrix<$t>> for $t {
                type Output = Matrix<$t>;

                fn mul(self, rhs: Matrix<$t>) -> Matrix<$t> {
                    rhs * self
                }
            }

            impl Mul<&Matrix<$t>> for $t {
                type Output = Matrix<$t>;

                fn mul(self, rhs: &Matrix<$t>) -> Matrix<$t> {
                    rhs * self
                }
            }
        )*
    };
}

impl_scalar_mul_matrix!(f32, f64, Complex<f32>, Complex<f64>);
