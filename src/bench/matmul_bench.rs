use blockmat::BlockMatrix;
use blockmat::matrix::naive_ikj::matmul_naive_ikj;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

fn square(size: usize, block_size: usize) -> BlockMatrix<f64> {
    let rows: Vec<Vec<f64>> = (0..size)
        .map(|i| (0..size).map(|j| ((i * size + j) % 100) as f64).collect())
        .collect();
    BlockMatrix::from_rows_with_block_size(&rows, block_size).unwrap()
}

fn bench_multiply(c: &mut Criterion) {
    let mut group = c.benchmark_group("multiply");
    for size in [64, 128, 256] {
        let flat: Vec<f64> = (0..size * size).map(|i| (i % 100) as f64).collect();
        group.bench_with_input(BenchmarkId::new("naive_ikj", size), &size, |bench, &n| {
            bench.iter(|| {
                let mut out = vec![0.0; n * n];
                matmul_naive_ikj(black_box(&flat), black_box(&flat), &mut out, n, n, n);
                out
            })
        });

        for block_size in [16, 36, 52] {
            let m = square(size, block_size);
            group.bench_with_input(
                BenchmarkId::new(format!("blocked_{block_size}"), size),
                &m,
                |bench, m| bench.iter(|| black_box(m).multiply(black_box(m)).unwrap()),
            );
        }
    }
    group.finish();
}

fn bench_region_ops(c: &mut Criterion) {
    let m = square(512, 52);
    let v: Vec<f64> = (0..512).map(|i| i as f64).collect();

    c.bench_function("transpose_512", |bench| {
        bench.iter(|| black_box(&m).transpose())
    });
    c.bench_function("operate_512", |bench| {
        bench.iter(|| black_box(&m).operate(black_box(&v)).unwrap())
    });
    c.bench_function("sub_matrix_512", |bench| {
        bench.iter(|| black_box(&m).get_sub_matrix(30, 400, 17, 333).unwrap())
    });
    c.bench_function("column_512", |bench| {
        bench.iter(|| black_box(&m).get_column(black_box(200)).unwrap())
    });
}

criterion_group!(benches, bench_multiply, bench_region_ops);
criterion_main!(benches);
