//! The selected backend must agree with the reference kernels for every
//! native element kind. Without a BLAS library both sides are `Naive` and
//! the comparisons are exact; each run prints which backend it compared.

use approx::assert_abs_diff_eq;
use dynla::backend::{self, Backend, Blas, Naive, Side, Transpose, Triangle};
use dynla::{c32, c64, Field, Matrix};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SIZES: [usize; 8] = [0, 1, 2, 3, 7, 16, 33, 64];

trait TestScalar: Field {
    /// Absolute tolerance per accumulated term.
    const TOL: f64;

    fn random(rng: &mut StdRng) -> Self;

    fn parts(self) -> (f64, f64);
}

impl TestScalar for f32 {
    const TOL: f64 = 1e-5;

    fn random(rng: &mut StdRng) -> Self {
        rng.gen_range(-1.0..1.0)
    }

    fn parts(self) -> (f64, f64) {
        (self as f64, 0.0)
    }
}

impl TestScalar for f64 {
    const TOL: f64 = 1e-13;

    fn random(rng: &mut StdRng) -> Self {
        rng.gen_range(-1.0..1.0)
    }

    fn parts(self) -> (f64, f64) {
        (self, 0.0)
    }
}

impl TestScalar for c32 {
    const TOL: f64 = 2e-5;

    fn random(rng: &mut StdRng) -> Self {
        c32::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
    }

    fn parts(self) -> (f64, f64) {
        (self.re as f64, self.im as f64)
    }
}

impl TestScalar for c64 {
    const TOL: f64 = 2e-13;

    fn random(rng: &mut StdRng) -> Self {
        c64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
    }

    fn parts(self) -> (f64, f64) {
        (self.re, self.im)
    }
}

fn random_vec<T: TestScalar>(rng: &mut StdRng, len: usize) -> Vec<T> {
    (0..len).map(|_| T::random(rng)).collect()
}

fn assert_close<T: TestScalar>(fast: &[T], slow: &[T], terms: usize, what: &str) {
    assert_eq!(fast.len(), slow.len(), "{}", what);
    let eps = T::TOL * (terms as f64 + 1.0);
    for (&f, &s) in fast.iter().zip(slow) {
        let (fr, fi) = f.parts();
        let (sr, si) = s.parts();
        assert_abs_diff_eq!(fr, sr, epsilon = eps);
        assert_abs_diff_eq!(fi, si, epsilon = eps);
    }
}

/// Run `op` on both backends with the same inputs and compare outputs.
fn compare<T: TestScalar>(out: &[T], terms: usize, what: &str, op: impl Fn(&dyn Backend<T>, &mut [T])) {
    let fast_backend = backend::select::<T>();
    let mut fast = out.to_vec();
    let mut slow = out.to_vec();
    op(fast_backend, &mut fast);
    op(&Naive, &mut slow);
    assert_close(&fast, &slow, terms, what);
}

/// Name of the backend `select` must pick for a native kind.
fn expected_backend() -> &'static str {
    if Blas::global().is_available() {
        "blas"
    } else {
        "naive"
    }
}

fn check_kind<T: TestScalar>(seed: u64) {
    let selected = backend::select::<T>().name();
    eprintln!("{}: comparing {} against naive", std::any::type_name::<T>(), selected);
    assert_eq!(selected, expected_backend());

    let mut rng = StdRng::seed_from_u64(seed);
    let alpha = T::random(&mut rng);
    let beta = T::random(&mut rng);

    for &n in &SIZES {
        let cols = n / 2 + 1;
        let x = random_vec::<T>(&mut rng, n);
        let y = random_vec::<T>(&mut rng, n);

        // level 1
        compare(&y, 1, "axpy", |b, out| b.axpy(alpha, &x, out));
        compare(&x, 1, "scal", |b, out| b.scal(alpha, out));
        let fast = backend::select::<T>();
        assert_close(&[fast.dot(&x, &y)], &[Naive.dot(&x, &y)], n, "dot");
        assert_close(&[fast.dotc(&x, &y)], &[Naive.dotc(&x, &y)], n, "dotc");

        // level 2
        let a = random_vec::<T>(&mut rng, n * cols);
        let xc = random_vec::<T>(&mut rng, cols);
        let yr = random_vec::<T>(&mut rng, n);
        let yc = random_vec::<T>(&mut rng, cols);
        compare(&yr, cols, "gemv", |b, out| {
            b.gemv(Transpose::No, n, cols, alpha, &a, &xc, beta, out)
        });
        compare(&yc, n, "gemv^T", |b, out| {
            b.gemv(Transpose::Trans, n, cols, alpha, &a, &x, beta, out)
        });
        compare(&yc, n, "gemv^H", |b, out| {
            b.gemv(Transpose::ConjTrans, n, cols, alpha, &a, &x, beta, out)
        });

        let sq = random_vec::<T>(&mut rng, n * n);
        for uplo in [Triangle::Upper, Triangle::Lower] {
            compare(&y, n, "symv", |b, out| b.symv(uplo, n, alpha, &sq, &x, beta, out));
            compare(&y, n, "hemv", |b, out| b.hemv(uplo, n, alpha, &sq, &x, beta, out));
        }

        // level 3
        let k = n / 3 + 2;
        let lhs = random_vec::<T>(&mut rng, n * k);
        let rhs = random_vec::<T>(&mut rng, k * cols);
        let c = random_vec::<T>(&mut rng, n * cols);
        for (ta, tb) in [
            (Transpose::No, Transpose::No),
            (Transpose::Trans, Transpose::No),
            (Transpose::No, Transpose::ConjTrans),
            (Transpose::ConjTrans, Transpose::Trans),
        ] {
            compare(&c, k, "gemm", |b, out| {
                b.gemm(ta, tb, n, cols, k, alpha, &lhs, &rhs, beta, out)
            });
        }

        let left = random_vec::<T>(&mut rng, n * n);
        let right = random_vec::<T>(&mut rng, cols * cols);
        let general = random_vec::<T>(&mut rng, n * cols);
        for uplo in [Triangle::Upper, Triangle::Lower] {
            compare(&c, n, "symm left", |b, out| {
                b.symm(Side::Left, uplo, n, cols, alpha, &left, &general, beta, out)
            });
            compare(&c, cols, "symm right", |b, out| {
                b.symm(Side::Right, uplo, n, cols, alpha, &right, &general, beta, out)
            });
            compare(&c, n, "hemm left", |b, out| {
                b.hemm(Side::Left, uplo, n, cols, alpha, &left, &general, beta, out)
            });
            compare(&c, cols, "hemm right", |b, out| {
                b.hemm(Side::Right, uplo, n, cols, alpha, &right, &general, beta, out)
            });
        }
    }
}

#[test]
fn f32_matches_reference() {
    check_kind::<f32>(1);
}

#[test]
fn f64_matches_reference() {
    check_kind::<f64>(2);
}

#[test]
fn complex32_matches_reference() {
    check_kind::<c32>(3);
}

#[test]
fn complex64_matches_reference() {
    check_kind::<c64>(4);
}

#[test]
fn beta_zero_overwrites_nan() {
    let a = [1.0_f64, 2.0, 3.0, 4.0];
    let mut y = [f64::NAN; 2];
    backend::select::<f64>().gemv(Transpose::No, 2, 2, 1.0, &a, &[1.0, 1.0], 0.0, &mut y);
    assert_eq!(y, [3.0, 7.0]);

    let mut c = [c64::new(f64::NAN, f64::NAN); 1];
    let one = c64::new(1.0, 0.0);
    backend::select::<c64>().gemm(
        Transpose::No,
        Transpose::No,
        1,
        1,
        1,
        one,
        &[c64::new(0.0, 2.0)],
        &[c64::new(0.0, 3.0)],
        c64::new(0.0, 0.0),
        &mut c,
    );
    assert_eq!(c, [c64::new(-6.0, 0.0)]);
}

#[test]
fn two_by_two_product_on_selected_path() {
    let a = Matrix::new(2, 2, vec![1.0_f64, 2.0, -1.0, 3.0]);
    let b = Matrix::new(2, 2, vec![0.0, 1.0, 2.0, 3.0]);
    assert_eq!(a.dot(&b).as_slice(), &[4.0, 7.0, 6.0, 8.0]);
    assert_eq!(b.dot(&a).as_slice(), &[-1.0, 3.0, -1.0, 13.0]);

    let a32 = Matrix::new(2, 2, vec![c32::new(1.0, 0.0), c32::new(2.0, 0.0), c32::new(-1.0, 0.0), c32::new(3.0, 0.0)]);
    let b32 = Matrix::new(2, 2, vec![c32::new(0.0, 0.0), c32::new(1.0, 0.0), c32::new(2.0, 0.0), c32::new(3.0, 0.0)]);
    let expected: Vec<c32> = [4.0, 7.0, 6.0, 8.0].iter().map(|&re| c32::new(re, 0.0)).collect();
    assert_eq!(a32.dot(&b32).as_slice(), expected.as_slice());
}
