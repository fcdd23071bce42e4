//! Behavior with native acceleration switched off through the environment.
//!
//! This file is its own test binary, so the process-wide registries are
//! initialized here for the first time, after the variable is set.

use std::sync::Once;

use dynla::backend::{self, Blas, Lapack, Side};
use dynla::config::DISABLE_ACCELERATION_VAR;
use dynla::linalg;
use dynla::{c32, c64, LinalgError, Matrix, Vector};

fn disable_acceleration() {
    static INIT: Once = Once::new();
    INIT.call_once(|| std::env::set_var(DISABLE_ACCELERATION_VAR, "1"));
}

#[test]
fn registries_report_unavailable() {
    disable_acceleration();
    assert!(!Blas::global().is_available());
    assert!(Blas::global().library().is_none());
    assert!(!Lapack::global().is_available());
    assert_eq!(backend::select::<f32>().name(), "naive");
    assert_eq!(backend::select::<f64>().name(), "naive");
    assert_eq!(backend::select::<c32>().name(), "naive");
    assert_eq!(backend::select::<c64>().name(), "naive");
}

#[test]
fn containers_still_compute() {
    disable_acceleration();
    let a = Matrix::new(2, 2, vec![1.0_f64, 2.0, -1.0, 3.0]);
    let b = Matrix::new(2, 2, vec![0.0, 1.0, 2.0, 3.0]);
    assert_eq!(a.dot(&b).as_slice(), &[4.0, 7.0, 6.0, 8.0]);

    let mut x = Vector::from_slice(&[c64::new(1.0, 1.0), c64::new(2.0, 0.0)]);
    x.scale(c64::new(0.0, 1.0));
    assert_eq!(x.as_slice(), &[c64::new(-1.0, 1.0), c64::new(0.0, 2.0)]);
    x.scale_real(2.0);
    x.divide(c64::new(2.0, 0.0));
    assert_eq!(x.as_slice(), &[c64::new(-1.0, 1.0), c64::new(0.0, 2.0)]);
    assert_eq!(x.inner(&x), c64::new(6.0, 0.0));

    let s = Matrix::from_rows(&[[2.0_f32, 1.0], [0.0, 3.0]]);
    let id = Matrix::<f32>::identity(2);
    assert_eq!(s.symmetric_dot(&id, Side::Left).as_slice(), &[2.0, 1.0, 1.0, 3.0]);
    let y = s.symmetric_dot_vector(&Vector::from_slice(&[1.0, 1.0]));
    assert_eq!(y.as_slice(), &[3.0, 4.0]);
}

#[test]
fn lapack_routines_fail_cleanly() {
    disable_acceleration();
    let unavailable = LinalgError::BackendUnavailable { family: "LAPACK" };
    let a = Matrix::<f64>::identity(3);
    assert_eq!(linalg::solve(&a, &Matrix::identity(3)), Err(unavailable));
    assert_eq!(linalg::solve_vector(&a, &Vector::zeros(3)), Err(unavailable));
    assert_eq!(linalg::eigenvalues(&a), Err(unavailable));
    assert_eq!(linalg::least_squares(&Matrix::<f32>::zeros(3, 2), &Matrix::zeros(3, 1)), Err(unavailable));
    assert_eq!(linalg::eigenvalues_hermitian(&Matrix::<c32>::identity(2)), Err(unavailable));
    assert_eq!(unavailable.to_string(), "LAPACK backend is not available");
}
