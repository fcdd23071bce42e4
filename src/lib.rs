//! # dynla
//!
//! Dense vectors and matrices whose kernels run on a BLAS library found at
//! runtime, with pure-Rust kernels as the fallback.
//!
//! Nothing is linked at build time. On first use the crate tries to `dlopen`
//! a CBLAS library (OpenBLAS, BLIS, reference CBLAS) and, separately, a
//! LAPACKE library. If they load, `f32`, `f64`, `Complex<f32>` and
//! `Complex<f64>` containers run on them; otherwise, and for every other
//! element type, the same operations run on the built-in kernels.
//!
//! ## Quick start
//!
//! ```
//! use dynla::{Matrix, Vector};
//!
//! let a = Matrix::new(2, 2, vec![1.0_f64, 2.0, -1.0, 3.0]);
//! let b = Matrix::new(2, 2, vec![0.0, 1.0, 2.0, 3.0]);
//! assert_eq!((&a * &b).as_slice(), &[4.0, 7.0, 6.0, 8.0]);
//!
//! let mut x = Vector::from_slice(&[1.0, 1.0]);
//! x.add_scaled(&Vector::from_slice(&[1.0, -1.0]), 0.5);
//! assert_eq!(a.dot_vector(&x).as_slice(), &[2.5, 0.0]);
//! ```
//!
//! ## Modules
//!
//! - [`vector`] / [`matrix`]: heap-allocated, runtime-sized, row-major
//!   containers. Element-wise arithmetic is in place (`add`, `scale`,
//!   `divide`, ...), with operator overloads on top. Products come in a
//!   plain form and an accumulating `*_into` form taking `alpha` and `beta`.
//!
//! - [`backend`]: the [`Backend`] trait implemented by [`backend::Naive`]
//!   and [`backend::Blas`], the runtime library loader, and [`backend::select`].
//!
//! - [`linalg`]: LU solves, least squares and eigen-decompositions. These
//!   need LAPACKE and return [`LinalgError::BackendUnavailable`] without it.
//!
//! - [`traits`]: [`Field`], the element trait. Implement it for a custom
//!   scalar and the whole container API works on the pure-Rust kernels.
//!
//! - [`config`]: [`BackendConfig`], the library search lists and the
//!   environment overrides read by the process-wide registries.
//!
//! ## Environment
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `DYNLA_BLAS_LIBRARY` | Libraries tried before the platform defaults |
//! | `DYNLA_LAPACK_LIBRARY` | Same for LAPACKE |
//! | `DYNLA_DISABLE_ACCELERATION` | `1`/`true`: always use the built-in kernels |
//!
//! Registries are loaded once per process, so these are read at first use.
//!
//! ## Logging
//!
//! Library discovery is reported through [`tracing`]. Install a subscriber to
//! see which library was picked or why none was.

pub mod backend;
pub mod config;
pub mod error;
pub mod linalg;
pub mod matrix;
pub mod traits;
pub mod vector;

pub use backend::{Backend, Side, Transpose, Triangle};
pub use config::BackendConfig;
pub use error::LinalgError;
pub use matrix::Matrix;
pub use traits::{ComplexField, Field, ScalarKind};
pub use vector::Vector;

pub use num_complex::Complex;

/// Single-precision complex scalar.
#[allow(non_camel_case_types)]
pub type c32 = Complex<f32>;

/// Double-precision complex scalar.
#[allow(non_camel_case_types)]
pub type c64 = Complex<f64>;
