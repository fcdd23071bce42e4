use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use num_complex::Complex;
use num_traits::One;

use crate::backend;
use crate::traits::{ComplexField, Field};

use super::Vector;

// ── In-place arithmetic ─────────────────────────────────────────────

impl<T: Field> Vector<T> {
    fn check_len(&self, other: &Vector<T>, op: &str) {
        assert_eq!(
            self.len(),
            other.len(),
            "length mismatch: {} {} {}",
            self.len(),
            op,
            other.len()
        );
    }

    /// `self += other`.
    pub fn add(&mut self, other: &Vector<T>) {
        self.add_scaled(other, T::one());
    }

    /// `self += alpha * other`.
    pub fn add_scaled(&mut self, other: &Vector<T>, alpha: T) {
        self.check_len(other, "+");
        backend::select::<T>().axpy(alpha, &other.data, &mut self.data);
    }

    /// `self -= other`.
    pub fn subtract(&mut self, other: &Vector<T>) {
        self.subtract_scaled(other, T::one());
    }

    /// `self -= alpha * other`.
    pub fn subtract_scaled(&mut self, other: &Vector<T>, alpha: T) {
        self.check_len(other, "-");
        backend::select::<T>().axpy(-alpha, &other.data, &mut self.data);
    }

    /// `self *= alpha`. Scaling by one leaves every element bit-for-bit
    /// unchanged.
    pub fn scale(&mut self, alpha: T) {
        if alpha.is_one() {
            return;
        }
        backend::select::<T>().scal(alpha, &mut self.data);
    }

    /// `self /= divisor`, multiplying by the reciprocal when one exists.
    ///
    /// ```
    /// use dynla::Vector;
    /// let mut v = Vector::from_slice(&[1.0_f64, 2.0]);
    /// v.divide(0.0);
    /// assert!(v[0].is_infinite());
    /// ```
    pub fn divide(&mut self, divisor: T) {
        backend::divide_in_place(&mut self.data, divisor);
    }
}

impl<T: ComplexField> Vector<T> {
    /// Scale a complex vector by a real factor.
    ///
    /// ```
    /// use dynla::{Vector, c32};
    /// let mut v = Vector::from_slice(&[c32::new(1.0, -2.0)]);
    /// v.scale_real(3.0);
    /// assert_eq!(v[0], c32::new(3.0, -6.0));
    /// ```
    pub fn scale_real(&mut self, alpha: T::Real) {
        if alpha.is_one() {
            return;
        }
        backend::select::<T::Real>().scal(alpha, T::as_real_mut(&mut self.data));
    }

    /// Divide a complex vector by a real divisor.
    pub fn divide_real(&mut self, divisor: T::Real) {
        backend::divide_in_place(T::as_real_mut(&mut self.data), divisor);
    }
}

// ── Element-wise addition ───────────────────────────────────────────

impl<T: Field> Add<&Vector<T>> for Vector<T> {
    type Output = Vector<T>;

    fn add(mut self, rhs: &Vector<T>) -> Vector<T> {
        Vector::add(&mut self, rhs);
        self
    }
}

impl<T: Field> Add for Vector<T> {
    type Output = Vector<T>;

    fn add(self, rhs: Vector<T>) -> Vector<T> {
        self + &rhs
    }
}

impl<T: Field> Add<&Vector<T>> for &Vector<T> {
    type Output = Vector<T>;

    fn add(self, rhs: &Vector<T>) -> Vector<T> {
        self.clone() + rhs
    }
}

impl<T: Field> AddAssign<&Vector<T>> for Vector<T> {
    fn add_assign(&mut self, rhs: &Vector<T>) {
        Vector::add(self, rhs);
    }
}

impl<T: Field> AddAssign for Vector<T> {
    fn add_assign(&mut self, rhs: Vector<T>) {
        Vector::add(self, &rhs);
    }
}

// ── Element-wise subtraction ────────────────────────────────────────

impl<T: Field> Sub<&Vector<T>> for Vector<T> {
    type Output = Vector<T>;

    fn sub(mut self, rhs: &Vector<T>) -> Vector<T> {
        self.subtract(rhs);
        self
    }
}

impl<T: Field> Sub for Vector<T> {
    type Output = Vector<T>;

    fn sub(self, rhs: Vector<T>) -> Vector<T> {
        self - &rhs
    }
}

impl<T: Field> Sub<&Vector<T>> for &Vector<T> {
    type Output = Vector<T>;

    fn sub(self, rhs: &Vector<T>) -> Vector<T> {
        self.clone() - rhs
    }
}

impl<T: Field> SubAssign<&Vector<T>> for Vector<T> {
    fn sub_assign(&mut self, rhs: &Vector<T>) {
        self.subtract(rhs);
    }
}

impl<T: Field> SubAssign for Vector<T> {
    fn sub_assign(&mut self, rhs: Vector<T>) {
        self.subtract(&rhs);
    }
}

// ── Negation ────────────────────────────────────────────────────────

impl<T: Field> Neg for Vector<T> {
    type Output = Vector<T>;

    fn neg(mut self) -> Vector<T> {
        self.scale(-T::one());
        self
    }
}

impl<T: Field> Neg for &Vector<T> {
    type Output = Vector<T>;

    fn neg(self) -> Vector<T> {
        -self.clone()
    }
}

// ── Scalar multiplication and division ──────────────────────────────

impl<T: Field> Mul<T> for Vector<T> {
    type Output = Vector<T>;

    fn mul(mut self, rhs: T) -> Vector<T> {
        self.scale(rhs);
        self
    }
}

impl<T: Field> Mul<T> for &Vector<T> {
    type Output = Vector<T>;

    fn mul(self, rhs: T) -> Vector<T> {
        self.clone() * rhs
    }
}

impl<T: Field> MulAssign<T> for Vector<T> {
    fn mul_assign(&mut self, rhs: T) {
        self.scale(rhs);
    }
}

impl<T: Field> Div<T> for Vector<T> {
    type Output = Vector<T>;

    fn div(mut self, rhs: T) -> Vector<T> {
        self.divide(rhs);
        self
    }
}

impl<T: Field> Div<T> for &Vector<T> {
    type Output = Vector<T>;

    fn div(self, rhs: T) -> Vector<T> {
        self.clone() / rhs
    }
}

impl<T: Field> DivAssign<T> for Vector<T> {
    fn div_assign(&mut self, rhs: T) {
        self.divide(rhs);
    }
}

// ── scalar * vector (concrete impls) ────────────────────────────────

macro_rules! impl_scalar_mul_vector {
    ($($t:ty),*) => {
        $(
            impl Mul<Vector<$t>> for $t {
                type Output = Vector<$t>;

                fn mul(self, rhs: Vector<$t>) -> Vector<$t> {
                    rhs * self
                }
            }

            impl Mul<&Vector<$t>> for $t {
                type Output = Vector<$t>;

                fn mul(self, rhs: &Vector<$t>) -> Vector<$t> {
                    rhs * self
                }
            }
        )*
    };
}

impl_scalar_mul_vector!(f32, f64, Complex<f32>, Complex<f64>);
