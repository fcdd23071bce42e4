use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dynla::backend::{self, Backend, Naive, Transpose};
use dynla::{c64, Matrix, Vector};

const SIZES: [usize; 4] = [8, 32, 128, 256];

fn filled(n: usize, offset: f64) -> Vec<f64> {
    (0..n).map(|i| ((i as f64 + offset) * 0.618).fract() - 0.5).collect()
}

// ---------------------------------------------------------------------------
// Level 1
// ---------------------------------------------------------------------------

fn axpy(c: &mut Criterion) {
    let mut g = c.benchmark_group("axpy_f64");
    for &n in &SIZES {
        let len = n * n;
        let x = filled(len, 0.0);
        let y0 = filled(len, 1.0);

        g.bench_with_input(BenchmarkId::new(backend::select::<f64>().name(), len), &len, |b, _| {
            let mut y = y0.clone();
            b.iter(|| backend::select::<f64>().axpy(std::hint::black_box(0.5), &x, &mut y))
        });

        g.bench_with_input(BenchmarkId::new("naive", len), &len, |b, _| {
            let mut y = y0.clone();
            b.iter(|| Naive.axpy(std::hint::black_box(0.5), &x, &mut y))
        });
    }
    g.finish();
}

fn dotc_complex(c: &mut Criterion) {
    let mut g = c.benchmark_group("dotc_c64");
    for &n in &SIZES {
        let len = n * n;
        let x: Vector<c64> = filled(len, 0.0)
            .into_iter()
            .zip(filled(len, 2.0))
            .map(|(re, im)| c64::new(re, im))
            .collect();

        g.bench_with_input(BenchmarkId::new("inner", len), &len, |b, _| {
            b.iter(|| std::hint::black_box(&x).inner(&x))
        });

        g.bench_with_input(BenchmarkId::new("naive", len), &len, |b, _| {
            b.iter(|| <Naive as Backend<c64>>::dotc(&Naive, std::hint::black_box(x.as_slice()), x.as_slice()))
        });
    }
    g.finish();
}

// ---------------------------------------------------------------------------
// Level 2 / 3
// ---------------------------------------------------------------------------

fn gemv(c: &mut Criterion) {
    let mut g = c.benchmark_group("gemv_f64");
    for &n in &SIZES {
        let a = Matrix::new(n, n, filled(n * n, 0.0));
        let x = Vector::from_vec(filled(n, 3.0));

        g.bench_with_input(BenchmarkId::new("dot_vector", n), &n, |b, _| {
            b.iter(|| std::hint::black_box(&a).dot_vector(&x))
        });

        g.bench_with_input(BenchmarkId::new("naive", n), &n, |b, _| {
            let mut y = vec![0.0; n];
            b.iter(|| {
                Naive.gemv(Transpose::No, n, n, 1.0, std::hint::black_box(a.as_slice()), x.as_slice(), 0.0, &mut y)
            })
        });
    }
    g.finish();
}

fn gemm(c: &mut Criterion) {
    let mut g = c.benchmark_group("gemm_f64");
    for &n in &SIZES {
        let a = Matrix::new(n, n, filled(n * n, 0.0));
        let m = Matrix::new(n, n, filled(n * n, 5.0));

        g.bench_with_input(BenchmarkId::new("dot", n), &n, |b, _| {
            b.iter(|| std::hint::black_box(&a) * std::hint::black_box(&m))
        });

        g.bench_with_input(BenchmarkId::new("naive", n), &n, |b, _| {
            let mut out = vec![0.0; n * n];
            b.iter(|| {
                Naive.gemm(
                    Transpose::No,
                    Transpose::No,
                    n,
                    n,
                    n,
                    1.0,
                    std::hint::black_box(a.as_slice()),
                    m.as_slice(),
                    0.0,
                    &mut out,
                )
            })
        });
    }
    g.finish();
}

criterion_group!(benches, axpy, dotc_complex, gemv, gemm);
criterion_main!(benches);
