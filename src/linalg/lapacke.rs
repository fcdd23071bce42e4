//! Element-type bindings for the LAPACKE routines behind [`linalg`](super).

use num_complex::Complex;
use num_traits::Float;

use crate::backend::lapack::{ffi, job, LapackFns, LapackInt, LAPACK_ROW_MAJOR};
use crate::backend::Lapack;
use crate::error::{LinalgError, Result};
use crate::traits::{ComplexField, Field};

mod sealed {
    pub trait Sealed {}
}

/// Element types with LAPACKE routines: `f32`, `f64`, `Complex<f32>` and
/// `Complex<f64>`.
///
/// The methods work on raw row-major buffers and are called by the
/// functions in [`linalg`](super); they are not meant to be used directly.
pub trait LapackScalar: Field + sealed::Sealed {
    /// Type of eigenvalues of a hermitian matrix.
    type Real: Field + Float;

    /// Type of eigenvalues of a general matrix.
    type Complex: ComplexField<Real = Self::Real>;

    /// Overwrite `b` (`n x nrhs`) with the solution of `A X = B`. `a` is
    /// overwritten by its LU factors.
    #[doc(hidden)]
    fn gesv(lapack: &Lapack, n: usize, nrhs: usize, a: &mut [Self], b: &mut [Self]) -> Result<()>;

    /// Least-squares solution of `A X = B` for a full-rank `m x n` `a`,
    /// which is overwritten by its QR or LQ factors. `b` holds
    /// `max(m, n) x nrhs` elements with the right-hand sides in the first
    /// `m` rows; on return the first `n` rows hold the solution.
    #[doc(hidden)]
    fn gels(lapack: &Lapack, m: usize, n: usize, nrhs: usize, a: &mut [Self], b: &mut [Self]) -> Result<()>;

    /// Eigenvalues of a symmetric or hermitian `a` (upper triangle read) in
    /// ascending order. With `vectors`, `a` is overwritten by the
    /// orthonormal eigenvectors stored as columns.
    #[doc(hidden)]
    fn eigh(lapack: &Lapack, vectors: bool, n: usize, a: &mut [Self], w: &mut [Self::Real]) -> Result<()>;

    /// Eigenvalues of a general `a`, with left and/or right eigenvectors as
    /// the columns of `vl` / `vr` when requested. Buffers that are not
    /// requested are left untouched.
    #[doc(hidden)]
    #[allow(clippy::too_many_arguments)]
    fn geev(
        lapack: &Lapack,
        left: bool,
        right: bool,
        n: usize,
        a: &mut [Self],
        w: &mut [Self::Complex],
        vl: &mut [Self::Complex],
        vr: &mut [Self::Complex],
    ) -> Result<()>;
}

fn routines(lapack: &Lapack) -> Result<&LapackFns> {
    lapack
        .functions()
        .ok_or(LinalgError::BackendUnavailable { family: "LAPACK" })
}

fn dim(routine: &'static str, n: usize) -> Result<LapackInt> {
    LapackInt::try_from(n).map_err(|_| LinalgError::TooLarge { routine, dimension: n })
}

#[inline]
fn vector_job(wanted: bool) -> u8 {
    if wanted {
        b'V'
    } else {
        b'N'
    }
}

// ── Shared call paths ───────────────────────────────────────────────

fn gesv_call<T>(
    routine: &'static str,
    gesv: ffi::Gesv<T>,
    n: usize,
    nrhs: usize,
    a: &mut [T],
    b: &mut [T],
) -> Result<()> {
    if n == 0 || nrhs == 0 {
        return Ok(());
    }
    let (n_i, nrhs_i) = (dim(routine, n)?, dim(routine, nrhs)?);
    debug_assert_eq!(a.len(), n * n);
    debug_assert_eq!(b.len(), n * nrhs);
    let mut ipiv: Vec<LapackInt> = vec![0; n];
    // SAFETY: `a` holds n*n elements with leading dimension n, `b` holds
    // n*nrhs elements with leading dimension nrhs and `ipiv` holds n
    // pivots; LAPACKE reads and writes nothing beyond those extents.
    let info = unsafe {
        gesv(
            LAPACK_ROW_MAJOR,
            n_i,
            nrhs_i,
            a.as_mut_ptr(),
            n_i,
            ipiv.as_mut_ptr(),
            b.as_mut_ptr(),
            nrhs_i,
        )
    };
    LinalgError::check(routine, info, LinalgError::singular)
}

fn gels_call<T>(
    routine: &'static str,
    gels: ffi::Gels<T>,
    m: usize,
    n: usize,
    nrhs: usize,
    a: &mut [T],
    b: &mut [T],
) -> Result<()> {
    if m == 0 || n == 0 || nrhs == 0 {
        return Ok(());
    }
    let (m_i, n_i, nrhs_i) = (dim(routine, m)?, dim(routine, n)?, dim(routine, nrhs)?);
    debug_assert_eq!(a.len(), m * n);
    debug_assert_eq!(b.len(), m.max(n) * nrhs);
    // SAFETY: `a` is m x n with leading dimension n and `b` is
    // max(m, n) x nrhs with leading dimension nrhs, as LAPACKE requires for
    // row-major `?gels`.
    let info = unsafe {
        gels(
            LAPACK_ROW_MAJOR,
            job(b'N'),
            m_i,
            n_i,
            nrhs_i,
            a.as_mut_ptr(),
            n_i,
            b.as_mut_ptr(),
            nrhs_i,
        )
    };
    LinalgError::check(routine, info, LinalgError::rank_deficient)
}

fn eigh_call<T, R>(
    routine: &'static str,
    eigh: ffi::Eigh<T, R>,
    vectors: bool,
    n: usize,
    a: &mut [T],
    w: &mut [R],
) -> Result<()> {
    if n == 0 {
        return Ok(());
    }
    let n_i = dim(routine, n)?;
    debug_assert_eq!(a.len(), n * n);
    debug_assert_eq!(w.len(), n);
    // SAFETY: `a` is n x n with leading dimension n and `w` holds n values.
    let info = unsafe {
        eigh(
            LAPACK_ROW_MAJOR,
            job(vector_job(vectors)),
            job(b'U'),
            n_i,
            a.as_mut_ptr(),
            n_i,
            w.as_mut_ptr(),
        )
    };
    LinalgError::check(routine, info, LinalgError::convergence)
}

#[allow(clippy::too_many_arguments)]
fn real_geev_call<R: Float>(
    routine: &'static str,
    geev: ffi::RealGeev<R>,
    left: bool,
    right: bool,
    n: usize,
    a: &mut [R],
    w: &mut [Complex<R>],
    vl: &mut [Complex<R>],
    vr: &mut [Complex<R>],
) -> Result<()> {
    if n == 0 {
        return Ok(());
    }
    let n_i = dim(routine, n)?;
    debug_assert_eq!(a.len(), n * n);
    let mut wr = vec![R::zero(); n];
    let mut wi = vec![R::zero(); n];
    let mut raw_vl = vec![R::zero(); if left { n * n } else { 0 }];
    let mut raw_vr = vec![R::zero(); if right { n * n } else { 0 }];
    // SAFETY: every buffer handed over is either n x n with leading
    // dimension n or holds n values. Eigenvector buffers are only written
    // when their job is 'V', in which case they were allocated n x n.
    let info = unsafe {
        geev(
            LAPACK_ROW_MAJOR,
            job(vector_job(left)),
            job(vector_job(right)),
            n_i,
            a.as_mut_ptr(),
            n_i,
            wr.as_mut_ptr(),
            wi.as_mut_ptr(),
            raw_vl.as_mut_ptr(),
            n_i,
            raw_vr.as_mut_ptr(),
            n_i,
        )
    };
    LinalgError::check(routine, info, LinalgError::convergence)?;

    for (wj, (&re, &im)) in w.iter_mut().zip(wr.iter().zip(&wi)) {
        *wj = Complex::new(re, im);
    }
    if left {
        unpack_conjugate_pairs(n, &wi, &raw_vl, vl);
    }
    if right {
        unpack_conjugate_pairs(n, &wi, &raw_vr, vr);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn complex_geev_call<T>(
    routine: &'static str,
    geev: ffi::ComplexGeev<T>,
    left: bool,
    right: bool,
    n: usize,
    a: &mut [T],
    w: &mut [T],
    vl: &mut [T],
    vr: &mut [T],
) -> Result<()> {
    if n == 0 {
        return Ok(());
    }
    let n_i = dim(routine, n)?;
    debug_assert_eq!(a.len(), n * n);
    debug_assert_eq!(w.len(), n);
    debug_assert!(!left || vl.len() == n * n);
    debug_assert!(!right || vr.len() == n * n);
    // SAFETY: as for the real variant; `vl` and `vr` are n x n whenever
    // their job is 'V'.
    let info = unsafe {
        geev(
            LAPACK_ROW_MAJOR,
            job(vector_job(left)),
            job(vector_job(right)),
            n_i,
            a.as_mut_ptr(),
            n_i,
            w.as_mut_ptr(),
            vl.as_mut_ptr(),
            n_i,
            vr.as_mut_ptr(),
            n_i,
        )
    };
    LinalgError::check(routine, info, LinalgError::convergence)
}

/// Expand real `?geev` eigenvectors into complex columns.
///
/// A real column `j` with `wi[j] == 0` is copied as is. A complex pair
/// `(j, j + 1)` with `wi[j] > 0` is stored as the real and imaginary parts
/// of eigenvector `j`; eigenvector `j + 1` is its conjugate.
pub(crate) fn unpack_conjugate_pairs<R: Float>(n: usize, wi: &[R], raw: &[R], out: &mut [Complex<R>]) {
    debug_assert_eq!(raw.len(), n * n);
    debug_assert_eq!(out.len(), n * n);
    let mut j = 0;
    while j < n {
        if wi[j] != R::zero() && j + 1 < n {
            for r in 0..n {
                let re = raw[r * n + j];
                let im = raw[r * n + j + 1];
                out[r * n + j] = Complex::new(re, im);
                out[r * n + j + 1] = Complex::new(re, -im);
            }
            j += 2;
        } else {
            for r in 0..n {
                out[r * n + j] = Complex::new(raw[r * n + j], R::zero());
            }
            j += 1;
        }
    }
}

// ── Per-type bindings ───────────────────────────────────────────────

macro_rules! impl_lapack_real {
    ($($t:ty => $f:ident, $p:literal);*) => {
        $(
            impl sealed::Sealed for $t {}

            impl LapackScalar for $t {
                type Real = $t;
                type Complex = Complex<$t>;

                fn gesv(lapack: &Lapack, n: usize, nrhs: usize, a: &mut [$t], b: &mut [$t]) -> Result<()> {
                    let gesv = routines(lapack)?.$f.gesv;
                    gesv_call(concat!("LAPACKE_", $p, "gesv"), gesv, n, nrhs, a, b)
                }

                fn gels(lapack: &Lapack, m: usize, n: usize, nrhs: usize, a: &mut [$t], b: &mut [$t]) -> Result<()> {
                    let gels = routines(lapack)?.$f.gels;
                    gels_call(concat!("LAPACKE_", $p, "gels"), gels, m, n, nrhs, a, b)
                }

                fn eigh(lapack: &Lapack, vectors: bool, n: usize, a: &mut [$t], w: &mut [$t]) -> Result<()> {
                    let syevd = routines(lapack)?.$f.syevd;
                    eigh_call(concat!("LAPACKE_", $p, "syevd"), syevd, vectors, n, a, w)
                }

                fn geev(
                    lapack: &Lapack,
                    left: bool,
                    right: bool,
                    n: usize,
                    a: &mut [$t],
                    w: &mut [Complex<$t>],
                    vl: &mut [Complex<$t>],
                    vr: &mut [Complex<$t>],
                ) -> Result<()> {
                    let geev = routines(lapack)?.$f.geev;
                    real_geev_call(concat!("LAPACKE_", $p, "geev"), geev, left, right, n, a, w, vl, vr)
                }
            }
        )*
    };
}

impl_lapack_real!(f32 => s, "s"; f64 => d, "d");

macro_rules! impl_lapack_complex {
    ($($r:ty => $f:ident, $p:literal);*) => {
        $(
            impl sealed::Sealed for Complex<$r> {}

            impl LapackScalar for Complex<$r> {
                type Real = $r;
                type Complex = Complex<$r>;

                fn gesv(lapack: &Lapack, n: usize, nrhs: usize, a: &mut [Self], b: &mut [Self]) -> Result<()> {
                    let gesv = routines(lapack)?.$f.gesv;
                    gesv_call(concat!("LAPACKE_", $p, "gesv"), gesv, n, nrhs, a, b)
                }

                fn gels(lapack: &Lapack, m: usize, n: usize, nrhs: usize, a: &mut [Self], b: &mut [Self]) -> Result<()> {
                    let gels = routines(lapack)?.$f.gels;
                    gels_call(concat!("LAPACKE_", $p, "gels"), gels, m, n, nrhs, a, b)
                }

                fn eigh(lapack: &Lapack, vectors: bool, n: usize, a: &mut [Self], w: &mut [$r]) -> Result<()> {
                    let heevd = routines(lapack)?.$f.heevd;
                    eigh_call(concat!("LAPACKE_", $p, "heevd"), heevd, vectors, n, a, w)
                }

                fn geev(
                    lapack: &Lapack,
                    left: bool,
                    right: bool,
                    n: usize,
                    a: &mut [Self],
                    w: &mut [Self],
                    vl: &mut [Self],
                    vr: &mut [Self],
                ) -> Result<()> {
                    let geev = routines(lapack)?.$f.geev;
                    complex_geev_call(concat!("LAPACKE_", $p, "geev"), geev, left, right, n, a, w, vl, vr)
                }
            }
        )*
    };
}

impl_lapack_complex!(f32 => c, "c"; f64 => z, "z");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conjugate_pairs_unpack_into_columns() {
        // columns: real eigenvector, then (re, im) of a complex pair
        let raw = [
            1.0_f64, 0.5, 0.25, //
            2.0, -1.0, 3.0, //
            0.0, 4.0, 0.0,
        ];
        let wi = [0.0, 2.0, -2.0];
        let mut out = [Complex::new(0.0, 0.0); 9];
        unpack_conjugate_pairs(3, &wi, &raw, &mut out);
        assert_eq!(out[0], Complex::new(1.0, 0.0));
        assert_eq!(out[1], Complex::new(0.5, 0.25));
        assert_eq!(out[2], Complex::new(0.5, -0.25));
        assert_eq!(out[4], Complex::new(-1.0, 3.0));
        assert_eq!(out[5], Complex::new(-1.0, -3.0));
        assert_eq!(out[7], Complex::new(4.0, 0.0));
        assert_eq!(out[8], Complex::new(4.0, -0.0));
    }

    #[test]
    fn unavailable_registry_reports_family() {
        let lapack = Lapack::unavailable();
        let mut a = [1.0_f64];
        let mut b = [1.0_f64];
        assert_eq!(
            f64::gesv(&lapack, 1, 1, &mut a, &mut b),
            Err(LinalgError::BackendUnavailable { family: "LAPACK" })
        );
    }

    #[test]
    fn least_squares_needs_the_backend_for_empty_input() {
        let lapack = Lapack::unavailable();
        let mut a: [Complex<f64>; 0] = [];
        let mut b: [Complex<f64>; 0] = [];
        assert_eq!(
            Complex::<f64>::gels(&lapack, 0, 0, 0, &mut a, &mut b),
            Err(LinalgError::BackendUnavailable { family: "LAPACK" })
        );
    }

    #[test]
    fn oversized_dimension_is_rejected() {
        let err = dim("LAPACKE_zgesv", i32::MAX as usize + 1).unwrap_err();
        assert_eq!(
            err,
            LinalgError::TooLarge {
                routine: "LAPACKE_zgesv",
                dimension: i32::MAX as usize + 1
            }
        );
        assert_eq!(dim("LAPACKE_zgesv", 7), Ok(7));
    }
}
