use aligned_matmul::matrix::random::init_random;
use aligned_matmul::{KernelKind, KernelPool, Matrix};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

const INPUT_SIZES: &[(&str, usize)] = &[("n64", 64), ("n128", 128), ("n256", 256)];

fn make_operands(n: usize) -> (Matrix<f32>, Matrix<f32>) {
    let mut a = Matrix::new(n, n).unwrap();
    let mut b = Matrix::new(n, n).unwrap();
    init_random(&mut a);
    init_random(&mut b);
    (a, b)
}

fn bench_kernel(c: &mut Criterion, pool: &KernelPool, kind: KernelKind) {
    let mut group = c.benchmark_group(format!("matmul_{kind}"));
    for &(label, n) in INPUT_SIZES {
        group.throughput(Throughput::Elements((n as u64).pow(3)));

        let (a, b) = make_operands(n);
        let mut out = Matrix::<f32>::new(n, n).unwrap();

        group.bench_function(BenchmarkId::new("random", label), |bench| {
            bench.iter(|| {
                pool.multiply(kind, black_box(&mut out), black_box(&a), black_box(&b))
                    .unwrap();
                black_box(out.get(n / 2, n / 2));
            });
        });
    }
    group.finish();
}

fn bench_matmul(c: &mut Criterion) {
    let pool = KernelPool::new(0).unwrap();
    for kind in KernelKind::ALL {
        bench_kernel(c, &pool, kind);
    }
}

criterion_group!(benches, bench_matmul);
criterion_main!(benches);
