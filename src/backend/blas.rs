//! CBLAS registry and accelerated kernels.
//!
//! The registry opens the first configured BLAS library and binds every
//! CBLAS entry point the kernels use, for all four element kinds. If any one
//! of them is missing the whole family is reported unavailable and the
//! kernels below fall through to [`Naive`].
//!
//! Calls are row-major with unit stride. Dimensions that do not fit the
//! 32-bit CBLAS integer are served by [`Naive`] too.

use std::ffi::{c_int, c_void};
use std::sync::OnceLock;

use num_complex::Complex;
use num_traits::{One, Zero};
use tracing::{debug, info, warn};

use super::loader::Library;
use super::{Backend, Naive, Side, Transpose, Triangle};
use crate::config::BackendConfig;

type BlasInt = i32;

const ROW_MAJOR: c_int = 101;
const NO_TRANS: c_int = 111;
const TRANS: c_int = 112;
const CONJ_TRANS: c_int = 113;
const UPPER: c_int = 121;
const LOWER: c_int = 122;
const LEFT: c_int = 141;
const RIGHT: c_int = 142;

mod ffi {
    use super::BlasInt;
    use std::ffi::{c_int, c_void};

    pub type Axpy<T> = unsafe extern "C" fn(BlasInt, T, *const T, BlasInt, *mut T, BlasInt);
    pub type Scal<T> = unsafe extern "C" fn(BlasInt, T, *mut T, BlasInt);
    pub type Dot<T> = unsafe extern "C" fn(BlasInt, *const T, BlasInt, *const T, BlasInt) -> T;
    pub type Gemv<T> = unsafe extern "C" fn(
        c_int, c_int, BlasInt, BlasInt, T, *const T, BlasInt, *const T, BlasInt, T, *mut T, BlasInt,
    );
    pub type Symv<T> = unsafe extern "C" fn(
        c_int, c_int, BlasInt, T, *const T, BlasInt, *const T, BlasInt, T, *mut T, BlasInt,
    );
    pub type Gemm<T> = unsafe extern "C" fn(
        c_int, c_int, c_int, BlasInt, BlasInt, BlasInt,
        T, *const T, BlasInt, *const T, BlasInt, T, *mut T, BlasInt,
    );
    pub type Symm<T> = unsafe extern "C" fn(
        c_int, c_int, c_int, BlasInt, BlasInt,
        T, *const T, BlasInt, *const T, BlasInt, T, *mut T, BlasInt,
    );

    // Complex routines take scalars and buffers as untyped pointers.
    pub type CAxpy =
        unsafe extern "C" fn(BlasInt, *const c_void, *const c_void, BlasInt, *mut c_void, BlasInt);
    pub type CScal = unsafe extern "C" fn(BlasInt, *const c_void, *mut c_void, BlasInt);
    pub type CDotSub =
        unsafe extern "C" fn(BlasInt, *const c_void, BlasInt, *const c_void, BlasInt, *mut c_void);
    pub type CGemv = unsafe extern "C" fn(
        c_int, c_int, BlasInt, BlasInt,
        *const c_void, *const c_void, BlasInt, *const c_void, BlasInt,
        *const c_void, *mut c_void, BlasInt,
    );
    pub type CHemv = unsafe extern "C" fn(
        c_int, c_int, BlasInt,
        *const c_void, *const c_void, BlasInt, *const c_void, BlasInt,
        *const c_void, *mut c_void, BlasInt,
    );
    pub type CGemm = unsafe extern "C" fn(
        c_int, c_int, c_int, BlasInt, BlasInt, BlasInt,
        *const c_void, *const c_void, BlasInt, *const c_void, BlasInt,
        *const c_void, *mut c_void, BlasInt,
    );
    pub type CSymm = unsafe extern "C" fn(
        c_int, c_int, c_int, BlasInt, BlasInt,
        *const c_void, *const c_void, BlasInt, *const c_void, BlasInt,
        *const c_void, *mut c_void, BlasInt,
    );
}

#[derive(Clone, Copy)]
pub(crate) struct RealFns<T> {
    axpy: ffi::Axpy<T>,
    scal: ffi::Scal<T>,
    dot: ffi::Dot<T>,
    gemv: ffi::Gemv<T>,
    symv: ffi::Symv<T>,
    gemm: ffi::Gemm<T>,
    symm: ffi::Symm<T>,
}

impl<T: Copy> RealFns<T> {
    /// Bind `cblas_{p}*`. `p` must be the CBLAS prefix of `T` (`s` or `d`).
    fn bind(lib: &Library, p: &str) -> Option<Self> {
        // SAFETY: each field's alias mirrors the CBLAS prototype of the symbol
        // bound into it, and `p` selects the routines for element type T.
        unsafe {
            Some(Self {
                axpy: lib.symbol(&format!("cblas_{p}axpy"))?,
                scal: lib.symbol(&format!("cblas_{p}scal"))?,
                dot: lib.symbol(&format!("cblas_{p}dot"))?,
                gemv: lib.symbol(&format!("cblas_{p}gemv"))?,
                symv: lib.symbol(&format!("cblas_{p}symv"))?,
                gemm: lib.symbol(&format!("cblas_{p}gemm"))?,
                symm: lib.symbol(&format!("cblas_{p}symm"))?,
            })
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct ComplexFns {
    axpy: ffi::CAxpy,
    scal: ffi::CScal,
    dotu: ffi::CDotSub,
    dotc: ffi::CDotSub,
    gemv: ffi::CGemv,
    hemv: ffi::CHemv,
    gemm: ffi::CGemm,
    symm: ffi::CSymm,
    hemm: ffi::CSymm,
}

impl ComplexFns {
    /// Bind `cblas_{p}*` for `p` in `c`, `z`.
    fn bind(lib: &Library, p: &str) -> Option<Self> {
        // SAFETY: each field's alias mirrors the CBLAS prototype of the symbol
        // bound into it.
        unsafe {
            Some(Self {
                axpy: lib.symbol(&format!("cblas_{p}axpy"))?,
                scal: lib.symbol(&format!("cblas_{p}scal"))?,
                dotu: lib.symbol(&format!("cblas_{p}dotu_sub"))?,
                dotc: lib.symbol(&format!("cblas_{p}dotc_sub"))?,
                gemv: lib.symbol(&format!("cblas_{p}gemv"))?,
                hemv: lib.symbol(&format!("cblas_{p}hemv"))?,
                gemm: lib.symbol(&format!("cblas_{p}gemm"))?,
                symm: lib.symbol(&format!("cblas_{p}symm"))?,
                hemm: lib.symbol(&format!("cblas_{p}hemm"))?,
            })
        }
    }
}

/// Resolved CBLAS entry points for all four element kinds.
#[derive(Clone, Copy)]
pub(crate) struct BlasFns {
    s: RealFns<f32>,
    d: RealFns<f64>,
    c: ComplexFns,
    z: ComplexFns,
}

impl BlasFns {
    fn bind(lib: &Library) -> Option<Self> {
        Some(Self {
            s: RealFns::bind(lib, "s")?,
            d: RealFns::bind(lib, "d")?,
            c: ComplexFns::bind(lib, "c")?,
            z: ComplexFns::bind(lib, "z")?,
        })
    }
}

/// Runtime-loaded CBLAS library.
///
/// An unavailable registry is still a valid [`Backend`]: every call is
/// served by [`Naive`].
///
/// ```
/// use dynla::backend::{Backend, Blas};
/// use dynla::BackendConfig;
///
/// let blas = Blas::load(&BackendConfig::default().without_acceleration());
/// assert!(!blas.is_available());
/// assert_eq!(Backend::<f64>::dot(&blas, &[1.0, 2.0], &[3.0, 4.0]), 11.0);
/// ```
pub struct Blas {
    library: Option<Library>,
    fns: Option<BlasFns>,
}

impl core::fmt::Debug for Blas {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Blas")
            .field("library", &self.library)
            .field("available", &self.is_available())
            .finish()
    }
}

impl Blas {
    /// Open and bind a BLAS library according to `config`.
    pub fn load(config: &BackendConfig) -> Blas {
        if !config.acceleration {
            debug!("BLAS acceleration disabled by configuration");
            return Blas::unavailable();
        }
        let library = Library::open_first(&config.blas_libraries);
        let fns = library.as_ref().and_then(BlasFns::bind);
        match (&library, &fns) {
            (Some(lib), Some(_)) => info!(library = lib.name(), "BLAS backend available"),
            (Some(lib), None) => warn!(
                library = lib.name(),
                "BLAS library lacks required CBLAS symbols, using pure-Rust kernels"
            ),
            (None, _) => warn!("no BLAS library found, using pure-Rust kernels"),
        }
        Blas { library, fns }
    }

    /// A registry with nothing loaded.
    pub fn unavailable() -> Blas {
        Blas {
            library: None,
            fns: None,
        }
    }

    /// Process-wide registry, loaded from [`BackendConfig::from_env`] on
    /// first access.
    pub fn global() -> &'static Blas {
        static GLOBAL: OnceLock<Blas> = OnceLock::new();
        GLOBAL.get_or_init(|| Blas::load(&BackendConfig::from_env()))
    }

    /// True iff the library opened and every CBLAS symbol resolved.
    pub fn is_available(&self) -> bool {
        self.fns.is_some()
    }

    /// The opened library, even if some symbols were missing.
    pub fn library(&self) -> Option<&Library> {
        self.library.as_ref()
    }
}

/// Convert dimensions to the CBLAS integer type.
#[inline]
fn dims<const N: usize>(dims: [usize; N]) -> Option<[BlasInt; N]> {
    let mut out = [0; N];
    for (o, &d) in out.iter_mut().zip(dims.iter()) {
        *o = BlasInt::try_from(d).ok()?;
    }
    Some(out)
}

#[inline]
fn trans_flag(t: Transpose) -> c_int {
    match t {
        Transpose::No => NO_TRANS,
        Transpose::Trans => TRANS,
        Transpose::ConjTrans => CONJ_TRANS,
    }
}

#[inline]
fn uplo_flag(u: Triangle) -> c_int {
    match u {
        Triangle::Upper => UPPER,
        Triangle::Lower => LOWER,
    }
}

#[inline]
fn side_flag(s: Side) -> c_int {
    match s {
        Side::Left => LEFT,
        Side::Right => RIGHT,
    }
}

/// Leading dimensions of a row-major `gemm`: stored columns of A, B, C.
#[inline]
fn gemm_ld(trans_a: Transpose, trans_b: Transpose, m: BlasInt, n: BlasInt, k: BlasInt) -> [BlasInt; 3] {
    let lda = if trans_a.is_transposed() { m } else { k };
    let ldb = if trans_b.is_transposed() { k } else { n };
    [lda.max(1), ldb.max(1), n.max(1)]
}

#[inline]
fn symm_lda(side: Side, m: BlasInt, n: BlasInt) -> BlasInt {
    match side {
        Side::Left => m.max(1),
        Side::Right => n.max(1),
    }
}

macro_rules! impl_backend_real {
    ($($t:ty => $f:ident),*) => {
        $(
            impl Backend<$t> for Blas {
                fn name(&self) -> &'static str {
                    "blas"
                }

                fn axpy(&self, alpha: $t, x: &[$t], y: &mut [$t]) {
                    debug_assert_eq!(x.len(), y.len());
                    let (Some(f), Some([n])) = (self.fns.as_ref(), dims([x.len()])) else {
                        return Naive.axpy(alpha, x, y);
                    };
                    // SAFETY: x and y each hold n contiguous elements.
                    unsafe { (f.$f.axpy)(n, alpha, x.as_ptr(), 1, y.as_mut_ptr(), 1) }
                }

                fn scal(&self, alpha: $t, x: &mut [$t]) {
                    if alpha.is_one() {
                        return;
                    }
                    let (Some(f), Some([n])) = (self.fns.as_ref(), dims([x.len()])) else {
                        return Naive.scal(alpha, x);
                    };
                    // SAFETY: x holds n contiguous elements.
                    unsafe { (f.$f.scal)(n, alpha, x.as_mut_ptr(), 1) }
                }

                fn dot(&self, x: &[$t], y: &[$t]) -> $t {
                    debug_assert_eq!(x.len(), y.len());
                    let (Some(f), Some([n])) = (self.fns.as_ref(), dims([x.len()])) else {
                        return Naive.dot(x, y);
                    };
                    // SAFETY: x and y each hold n contiguous elements.
                    unsafe { (f.$f.dot)(n, x.as_ptr(), 1, y.as_ptr(), 1) }
                }

                fn dotc(&self, x: &[$t], y: &[$t]) -> $t {
                    Backend::<$t>::dot(self, x, y)
                }

                fn gemv(
                    &self,
                    trans: Transpose,
                    m: usize,
                    n: usize,
                    alpha: $t,
                    a: &[$t],
                    x: &[$t],
                    beta: $t,
                    y: &mut [$t],
                ) {
                    if m == 0 || n == 0 {
                        return;
                    }
                    let (Some(f), Some([mi, ni])) = (self.fns.as_ref(), dims([m, n])) else {
                        return Naive.gemv(trans, m, n, alpha, a, x, beta, y);
                    };
                    // SAFETY: a is m x n row-major with lda = n; x and y match
                    // the orientation (checked by the caller).
                    unsafe {
                        (f.$f.gemv)(
                            ROW_MAJOR, trans_flag(trans), mi, ni,
                            alpha, a.as_ptr(), ni, x.as_ptr(), 1,
                            beta, y.as_mut_ptr(), 1,
                        )
                    }
                }

                fn symv(&self, uplo: Triangle, n: usize, alpha: $t, a: &[$t], x: &[$t], beta: $t, y: &mut [$t]) {
                    if n == 0 {
                        return;
                    }
                    let (Some(f), Some([ni])) = (self.fns.as_ref(), dims([n])) else {
                        return Naive.symv(uplo, n, alpha, a, x, beta, y);
                    };
                    // SAFETY: a is n x n with lda = n; x and y hold n elements.
                    unsafe {
                        (f.$f.symv)(
                            ROW_MAJOR, uplo_flag(uplo), ni,
                            alpha, a.as_ptr(), ni, x.as_ptr(), 1,
                            beta, y.as_mut_ptr(), 1,
                        )
                    }
                }

                fn hemv(&self, uplo: Triangle, n: usize, alpha: $t, a: &[$t], x: &[$t], beta: $t, y: &mut [$t]) {
                    Backend::<$t>::symv(self, uplo, n, alpha, a, x, beta, y)
                }

                fn gemm(
                    &self,
                    trans_a: Transpose,
                    trans_b: Transpose,
                    m: usize,
                    n: usize,
                    k: usize,
                    alpha: $t,
                    a: &[$t],
                    b: &[$t],
                    beta: $t,
                    c: &mut [$t],
                ) {
                    if m == 0 || n == 0 {
                        return;
                    }
                    let (Some(f), Some([mi, ni, ki])) = (self.fns.as_ref(), dims([m, n, k])) else {
                        return Naive.gemm(trans_a, trans_b, m, n, k, alpha, a, b, beta, c);
                    };
                    let [lda, ldb, ldc] = gemm_ld(trans_a, trans_b, mi, ni, ki);
                    // SAFETY: operand shapes and leading dimensions follow the
                    // row-major storage checked by the caller.
                    unsafe {
                        (f.$f.gemm)(
                            ROW_MAJOR, trans_flag(trans_a), trans_flag(trans_b), mi, ni, ki,
                            alpha, a.as_ptr(), lda, b.as_ptr(), ldb,
                            beta, c.as_mut_ptr(), ldc,
                        )
                    }
                }

                fn symm(
                    &self,
                    side: Side,
                    uplo: Triangle,
                    m: usize,
                    n: usize,
                    alpha: $t,
                    a: &[$t],
                    b: &[$t],
                    beta: $t,
                    c: &mut [$t],
                ) {
                    if m == 0 || n == 0 {
                        return;
                    }
                    let (Some(f), Some([mi, ni])) = (self.fns.as_ref(), dims([m, n])) else {
                        return Naive.symm(side, uplo, m, n, alpha, a, b, beta, c);
                    };
                    // SAFETY: a is square on the given side; b and c are m x n.
                    unsafe {
                        (f.$f.symm)(
                            ROW_MAJOR, side_flag(side), uplo_flag(uplo), mi, ni,
                            alpha, a.as_ptr(), symm_lda(side, mi, ni), b.as_ptr(), ni,
                            beta, c.as_mut_ptr(), ni,
                        )
                    }
                }

                fn hemm(
                    &self,
                    side: Side,
                    uplo: Triangle,
                    m: usize,
                    n: usize,
                    alpha: $t,
                    a: &[$t],
                    b: &[$t],
                    beta: $t,
                    c: &mut [$t],
                ) {
                    Backend::<$t>::symm(self, side, uplo, m, n, alpha, a, b, beta, c)
                }
            }
        )*
    };
}

impl_backend_real!(f32 => s, f64 => d);

#[inline]
fn ptr<T>(v: &T) -> *const c_void {
    (v as *const T).cast()
}

macro_rules! impl_backend_complex {
    ($($t:ty => $f:ident),*) => {
        $(
            impl Backend<$t> for Blas {
                fn name(&self) -> &'static str {
                    "blas"
                }

                fn axpy(&self, alpha: $t, x: &[$t], y: &mut [$t]) {
                    debug_assert_eq!(x.len(), y.len());
                    let (Some(f), Some([n])) = (self.fns.as_ref(), dims([x.len()])) else {
                        return Naive.axpy(alpha, x, y);
                    };
                    // SAFETY: x and y each hold n contiguous complex values;
                    // alpha outlives the call.
                    unsafe { (f.$f.axpy)(n, ptr(&alpha), x.as_ptr().cast(), 1, y.as_mut_ptr().cast(), 1) }
                }

                fn scal(&self, alpha: $t, x: &mut [$t]) {
                    if alpha.is_one() {
                        return;
                    }
                    let (Some(f), Some([n])) = (self.fns.as_ref(), dims([x.len()])) else {
                        return Naive.scal(alpha, x);
                    };
                    // SAFETY: x holds n contiguous complex values.
                    unsafe { (f.$f.scal)(n, ptr(&alpha), x.as_mut_ptr().cast(), 1) }
                }

                fn dot(&self, x: &[$t], y: &[$t]) -> $t {
                    debug_assert_eq!(x.len(), y.len());
                    let (Some(f), Some([n])) = (self.fns.as_ref(), dims([x.len()])) else {
                        return Naive.dot(x, y);
                    };
                    let mut out = <$t>::zero();
                    // SAFETY: x and y hold n values; out is a valid destination.
                    unsafe {
                        (f.$f.dotu)(n, x.as_ptr().cast(), 1, y.as_ptr().cast(), 1, (&mut out as *mut $t).cast())
                    };
                    out
                }

                fn dotc(&self, x: &[$t], y: &[$t]) -> $t {
                    debug_assert_eq!(x.len(), y.len());
                    let (Some(f), Some([n])) = (self.fns.as_ref(), dims([x.len()])) else {
                        return Naive.dotc(x, y);
                    };
                    let mut out = <$t>::zero();
                    // SAFETY: as in `dot`.
                    unsafe {
                        (f.$f.dotc)(n, x.as_ptr().cast(), 1, y.as_ptr().cast(), 1, (&mut out as *mut $t).cast())
                    };
                    out
                }

                fn gemv(
                    &self,
                    trans: Transpose,
                    m: usize,
                    n: usize,
                    alpha: $t,
                    a: &[$t],
                    x: &[$t],
                    beta: $t,
                    y: &mut [$t],
                ) {
                    if m == 0 || n == 0 {
                        return;
                    }
                    let (Some(f), Some([mi, ni])) = (self.fns.as_ref(), dims([m, n])) else {
                        return Naive.gemv(trans, m, n, alpha, a, x, beta, y);
                    };
                    // SAFETY: see the real variant; scalars are read through
                    // pointers valid for the call.
                    unsafe {
                        (f.$f.gemv)(
                            ROW_MAJOR, trans_flag(trans), mi, ni,
                            ptr(&alpha), a.as_ptr().cast(), ni, x.as_ptr().cast(), 1,
                            ptr(&beta), y.as_mut_ptr().cast(), 1,
                        )
                    }
                }

                // CBLAS has no complex symmetric matrix-vector routine.
                fn symv(&self, uplo: Triangle, n: usize, alpha: $t, a: &[$t], x: &[$t], beta: $t, y: &mut [$t]) {
                    Naive.symv(uplo, n, alpha, a, x, beta, y)
                }

                fn hemv(&self, uplo: Triangle, n: usize, alpha: $t, a: &[$t], x: &[$t], beta: $t, y: &mut [$t]) {
                    if n == 0 {
                        return;
                    }
                    let (Some(f), Some([ni])) = (self.fns.as_ref(), dims([n])) else {
                        return Naive.hemv(uplo, n, alpha, a, x, beta, y);
                    };
                    // SAFETY: a is n x n with lda = n; x and y hold n values.
                    unsafe {
                        (f.$f.hemv)(
                            ROW_MAJOR, uplo_flag(uplo), ni,
                            ptr(&alpha), a.as_ptr().cast(), ni, x.as_ptr().cast(), 1,
                            ptr(&beta), y.as_mut_ptr().cast(), 1,
                        )
                    }
                }

                fn gemm(
                    &self,
                    trans_a: Transpose,
                    trans_b: Transpose,
                    m: usize,
                    n: usize,
                    k: usize,
                    alpha: $t,
                    a: &[$t],
                    b: &[$t],
                    beta: $t,
                    c: &mut [$t],
                ) {
                    if m == 0 || n == 0 {
                        return;
                    }
                    let (Some(f), Some([mi, ni, ki])) = (self.fns.as_ref(), dims([m, n, k])) else {
                        return Naive.gemm(trans_a, trans_b, m, n, k, alpha, a, b, beta, c);
                    };
                    let [lda, ldb, ldc] = gemm_ld(trans_a, trans_b, mi, ni, ki);
                    // SAFETY: see the real variant.
                    unsafe {
                        (f.$f.gemm)(
                            ROW_MAJOR, trans_flag(trans_a), trans_flag(trans_b), mi, ni, ki,
                            ptr(&alpha), a.as_ptr().cast(), lda, b.as_ptr().cast(), ldb,
                            ptr(&beta), c.as_mut_ptr().cast(), ldc,
                        )
                    }
                }

                fn symm(
                    &self,
                    side: Side,
                    uplo: Triangle,
                    m: usize,
                    n: usize,
                    alpha: $t,
                    a: &[$t],
                    b: &[$t],
                    beta: $t,
                    c: &mut [$t],
                ) {
                    if m == 0 || n == 0 {
                        return;
                    }
                    let (Some(f), Some([mi, ni])) = (self.fns.as_ref(), dims([m, n])) else {
                        return Naive.symm(side, uplo, m, n, alpha, a, b, beta, c);
                    };
                    // SAFETY: a is square on the given side; b and c are m x n.
                    unsafe {
                        (f.$f.symm)(
                            ROW_MAJOR, side_flag(side), uplo_flag(uplo), mi, ni,
                            ptr(&alpha), a.as_ptr().cast(), symm_lda(side, mi, ni), b.as_ptr().cast(), ni,
                            ptr(&beta), c.as_mut_ptr().cast(), ni,
                        )
                    }
                }

                fn hemm(
                    &self,
                    side: Side,
                    uplo: Triangle,
                    m: usize,
                    n: usize,
                    alpha: $t,
                    a: &[$t],
                    b: &[$t],
                    beta: $t,
                    c: &mut [$t],
                ) {
                    if m == 0 || n == 0 {
                        return;
                    }
                    let (Some(f), Some([mi, ni])) = (self.fns.as_ref(), dims([m, n])) else {
                        return Naive.hemm(side, uplo, m, n, alpha, a, b, beta, c);
                    };
                    // SAFETY: a is square on the given side; b and c are m x n.
                    unsafe {
                        (f.$f.hemm)(
                            ROW_MAJOR, side_flag(side), uplo_flag(uplo), mi, ni,
                            ptr(&alpha), a.as_ptr().cast(), symm_lda(side, mi, ni), b.as_ptr().cast(), ni,
                            ptr(&beta), c.as_mut_ptr().cast(), ni,
                        )
                    }
                }
            }
        )*
    };
}

impl_backend_complex!(Complex<f32> => c, Complex<f64> => z);
