use core::fmt::Debug;
use core::ops::{Add, Div, Mul, Neg, Sub};

use num_complex::Complex;
use num_traits::{Float, MulAdd, One, Zero};

use crate::backend::layout;
use crate::backend::{Backend, Blas};

/// The four element types a native BLAS/LAPACK library can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// `f32`
    Real32,
    /// `f64`
    Real64,
    /// `Complex<f32>`
    Complex32,
    /// `Complex<f64>`
    Complex64,
}

/// Trait for types that can be used as vector and matrix elements.
///
/// Any type implementing `Field` gets the full container API through the
/// pure-Rust kernels. The four [`ScalarKind`] types additionally override
/// [`Field::accelerated`], which routes their operations to a native BLAS
/// library when one was found at runtime.
///
/// ```
/// use dynla::{Field, ScalarKind, c64};
///
/// assert_eq!(<f64 as Field>::KIND, Some(ScalarKind::Real64));
/// assert_eq!(<c64 as Field>::KIND, Some(ScalarKind::Complex64));
/// assert_eq!(2.0_f64.reciprocal(), Some(0.5));
/// assert_eq!(0.0_f64.reciprocal(), None);
/// ```
pub trait Field:
    Copy
    + PartialEq
    + Debug
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Backend-eligible kind, `None` for every other type.
    const KIND: Option<ScalarKind> = None;

    /// `self * a + b`, fused where the type supports it.
    #[inline]
    fn mul_add(self, a: Self, b: Self) -> Self {
        self * a + b
    }

    /// `1 / self` if it is representable without overflow or loss to
    /// subnormals. `None` makes division fall back to dividing every element.
    #[inline]
    fn reciprocal(self) -> Option<Self> {
        None
    }

    /// Complex conjugate (identity for reals).
    #[inline]
    fn conj(self) -> Self {
        self
    }

    /// Real part, embedded back into `Self`.
    #[inline]
    fn real_part(self) -> Self {
        self
    }

    /// Native backend serving this type, if one is loaded.
    #[inline]
    fn accelerated() -> Option<&'static dyn Backend<Self>> {
        None
    }
}

fn available_blas() -> Option<&'static Blas> {
    let blas = Blas::global();
    blas.is_available().then_some(blas)
}

macro_rules! impl_field_real {
    ($($t:ty => $kind:ident),*) => {
        $(
            impl Field for $t {
                const KIND: Option<ScalarKind> = Some(ScalarKind::$kind);

                #[inline]
                fn mul_add(self, a: $t, b: $t) -> $t {
                    <$t>::mul_add(self, a, b)
                }

                #[inline]
                fn reciprocal(self) -> Option<$t> {
                    let r = Float::recip(self);
                    r.is_normal().then_some(r)
                }

                #[inline]
                fn accelerated() -> Option<&'static dyn Backend<$t>> {
                    available_blas().map(|b| b as &dyn Backend<$t>)
                }
            }
        )*
    };
}

impl_field_real!(f32 => Real32, f64 => Real64);

macro_rules! impl_field_complex {
    ($($r:ty => $kind:ident),*) => {
        $(
            impl Field for Complex<$r> {
                const KIND: Option<ScalarKind> = Some(ScalarKind::$kind);

                #[inline]
                fn mul_add(self, a: Self, b: Self) -> Self {
                    MulAdd::mul_add(self, a, b)
                }

                #[inline]
                fn reciprocal(self) -> Option<Self> {
                    let r = self.inv();
                    // each part normal or zero, and not both zero
                    let part = |x: $r| x == 0.0 || x.is_normal();
                    (part(r.re) && part(r.im) && !r.is_zero()).then_some(r)
                }

                #[inline]
                fn conj(self) -> Self {
                    Complex::conj(&self)
                }

                #[inline]
                fn real_part(self) -> Self {
                    Complex::new(self.re, 0.0)
                }

                #[inline]
                fn accelerated() -> Option<&'static dyn Backend<Self>> {
                    available_blas().map(|b| b as &dyn Backend<Self>)
                }
            }
        )*
    };
}

impl_field_complex!(f32 => Complex32, f64 => Complex64);

/// Complex element types whose buffers can be viewed as interleaved reals.
///
/// Used for scaling complex containers by a real factor through the real
/// kernel over `2n` components.
pub trait ComplexField: Field {
    /// Component type.
    type Real: Field + Float;

    /// Reinterpret a complex slice as `[re0, im0, re1, im1, ...]`.
    fn as_real_mut(slice: &mut [Self]) -> &mut [Self::Real];

    /// Build from real and imaginary parts.
    fn from_parts(re: Self::Real, im: Self::Real) -> Self;
}

macro_rules! impl_complex_field {
    ($($r:ty),*) => {
        $(
            impl ComplexField for Complex<$r> {
                type Real = $r;

                #[inline]
                fn as_real_mut(slice: &mut [Self]) -> &mut [$r] {
                    layout::complex_as_real_mut(slice)
                }

                #[inline]
                fn from_parts(re: $r, im: $r) -> Self {
                    Complex::new(re, im)
                }
            }
        )*
    };
}

impl_complex_field!(f32, f64);
