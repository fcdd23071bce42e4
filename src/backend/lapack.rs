//! LAPACKE registry.
//!
//! LAPACK routines have no pure-Rust counterpart in this crate: when the
//! family is unavailable, [`linalg`](crate::linalg) returns
//! [`LinalgError::BackendUnavailable`](crate::LinalgError::BackendUnavailable).
//!
//! Each symbol is looked up in the LAPACKE library first and then in the
//! BLAS library, since OpenBLAS ships the LAPACKE interface itself.

use std::ffi::{c_char, c_int};
use std::sync::OnceLock;

use num_complex::Complex;
use tracing::{debug, info, warn};

use super::loader::{resolve_symbol, Library};
use crate::config::BackendConfig;

pub(crate) type LapackInt = i32;

pub(crate) const LAPACK_ROW_MAJOR: c_int = 101;

pub(crate) mod ffi {
    use super::LapackInt;
    use std::ffi::{c_char, c_int};

    pub type Gesv<T> = unsafe extern "C" fn(
        c_int, LapackInt, LapackInt, *mut T, LapackInt, *mut LapackInt, *mut T, LapackInt,
    ) -> LapackInt;
    pub type Gels<T> = unsafe extern "C" fn(
        c_int, c_char, LapackInt, LapackInt, LapackInt, *mut T, LapackInt, *mut T, LapackInt,
    ) -> LapackInt;
    /// `?syevd` and `?heevd`: eigenvalues are always real.
    pub type Eigh<T, R> =
        unsafe extern "C" fn(c_int, c_char, c_char, LapackInt, *mut T, LapackInt, *mut R) -> LapackInt;
    /// Real `?geev` returns eigenvalues as separate real and imaginary parts.
    pub type RealGeev<T> = unsafe extern "C" fn(
        c_int, c_char, c_char, LapackInt, *mut T, LapackInt,
        *mut T, *mut T, *mut T, LapackInt, *mut T, LapackInt,
    ) -> LapackInt;
    pub type ComplexGeev<T> = unsafe extern "C" fn(
        c_int, c_char, c_char, LapackInt, *mut T, LapackInt,
        *mut T, *mut T, LapackInt, *mut T, LapackInt,
    ) -> LapackInt;
}

#[derive(Clone, Copy)]
pub(crate) struct RealRoutines<T> {
    pub(crate) gesv: ffi::Gesv<T>,
    pub(crate) gels: ffi::Gels<T>,
    pub(crate) syevd: ffi::Eigh<T, T>,
    pub(crate) geev: ffi::RealGeev<T>,
}

#[derive(Clone, Copy)]
pub(crate) struct ComplexRoutines<R> {
    pub(crate) gesv: ffi::Gesv<Complex<R>>,
    pub(crate) gels: ffi::Gels<Complex<R>>,
    pub(crate) heevd: ffi::Eigh<Complex<R>, R>,
    pub(crate) geev: ffi::ComplexGeev<Complex<R>>,
}

/// Resolved LAPACKE entry points for all four element kinds.
#[derive(Clone, Copy)]
pub(crate) struct LapackFns {
    pub(crate) s: RealRoutines<f32>,
    pub(crate) d: RealRoutines<f64>,
    pub(crate) c: ComplexRoutines<f32>,
    pub(crate) z: ComplexRoutines<f64>,
}

/// Find `name` in the first library that exports it.
///
/// # Safety
///
/// `F` must match the native prototype of `name`.
unsafe fn bind<F: Copy>(libs: &[Option<&Library>], name: &str) -> Option<F> {
    let found = libs.iter().find_map(|lib| unsafe { resolve_symbol(*lib, name) });
    if found.is_none() {
        warn!(symbol = name, "LAPACKE symbol not found");
    }
    found
}

impl LapackFns {
    fn bind(libs: &[Option<&Library>]) -> Option<Self> {
        // SAFETY: each field's alias mirrors the LAPACKE prototype of the
        // symbol bound into it.
        unsafe {
            Some(Self {
                s: RealRoutines {
                    gesv: bind(libs, "LAPACKE_sgesv")?,
                    gels: bind(libs, "LAPACKE_sgels")?,
                    syevd: bind(libs, "LAPACKE_ssyevd")?,
                    geev: bind(libs, "LAPACKE_sgeev")?,
                },
                d: RealRoutines {
                    gesv: bind(libs, "LAPACKE_dgesv")?,
                    gels: bind(libs, "LAPACKE_dgels")?,
                    syevd: bind(libs, "LAPACKE_dsyevd")?,
                    geev: bind(libs, "LAPACKE_dgeev")?,
                },
                c: ComplexRoutines {
                    gesv: bind(libs, "LAPACKE_cgesv")?,
                    gels: bind(libs, "LAPACKE_cgels")?,
                    heevd: bind(libs, "LAPACKE_cheevd")?,
                    geev: bind(libs, "LAPACKE_cgeev")?,
                },
                z: ComplexRoutines {
                    gesv: bind(libs, "LAPACKE_zgesv")?,
                    gels: bind(libs, "LAPACKE_zgels")?,
                    heevd: bind(libs, "LAPACKE_zheevd")?,
                    geev: bind(libs, "LAPACKE_zgeev")?,
                },
            })
        }
    }
}

/// Runtime-loaded LAPACKE library.
///
/// ```
/// use dynla::backend::Lapack;
/// use dynla::BackendConfig;
///
/// let lapack = Lapack::load(&BackendConfig::default().without_acceleration());
/// assert!(!lapack.is_available());
/// ```
pub struct Lapack {
    fns: Option<LapackFns>,
}

impl core::fmt::Debug for Lapack {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Lapack")
            .field("available", &self.is_available())
            .finish()
    }
}

impl Lapack {
    /// Open and bind LAPACKE according to `config`.
    pub fn load(config: &BackendConfig) -> Lapack {
        if !config.acceleration {
            debug!("LAPACK acceleration disabled by configuration");
            return Lapack::unavailable();
        }
        let lapacke = Library::open_first(&config.lapack_libraries);
        let blas = Library::open_first(&config.blas_libraries);
        if lapacke.is_none() && blas.is_none() {
            warn!("no LAPACKE library found, dense solvers are unavailable");
            return Lapack::unavailable();
        }
        let fns = LapackFns::bind(&[lapacke.as_ref(), blas.as_ref()]);
        match &fns {
            Some(_) => info!(
                lapacke = lapacke.as_ref().map(Library::name),
                blas = blas.as_ref().map(Library::name),
                "LAPACK backend available"
            ),
            None => warn!("LAPACKE symbols missing, dense solvers are unavailable"),
        }
        Lapack { fns }
    }

    /// A registry with nothing loaded.
    pub fn unavailable() -> Lapack {
        Lapack { fns: None }
    }

    /// Process-wide registry, loaded from [`BackendConfig::from_env`] on
    /// first access.
    pub fn global() -> &'static Lapack {
        static GLOBAL: OnceLock<Lapack> = OnceLock::new();
        GLOBAL.get_or_init(|| Lapack::load(&BackendConfig::from_env()))
    }

    /// True iff every LAPACKE symbol resolved.
    pub fn is_available(&self) -> bool {
        self.fns.is_some()
    }

    pub(crate) fn functions(&self) -> Option<&LapackFns> {
        self.fns.as_ref()
    }
}

/// LAPACK job character.
#[inline]
pub(crate) fn job(c: u8) -> c_char {
    c as c_char
}
