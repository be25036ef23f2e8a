use blockmat::{BlockLayout, BlockMatrix, DenseMatrix, ModInt, PreservingVisitor};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn assert_matrices_equal(expected: &[Vec<f64>], actual: &[Vec<f64>], name: &str) {
    assert_eq!(expected.len(), actual.len(), "{}: row count mismatch", name);
    for (i, (e_row, a_row)) in expected.iter().zip(actual).enumerate() {
        assert_eq!(
            e_row.len(),
            a_row.len(),
            "{}: row {} length mismatch",
            name,
            i
        );
        for (j, (e, a)) in e_row.iter().zip(a_row).enumerate() {
            assert!(
                (e - a).abs() < 1e-8,
                "{}: mismatch at ({}, {}): expected {}, got {}",
                name,
                i,
                j,
                e,
                a
            );
        }
    }
}

fn random_rows(rng: &mut ChaCha8Rng, rows: usize, columns: usize) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|_| (0..columns).map(|_| rng.gen_range(-10.0..10.0)).collect())
        .collect()
}

fn elementwise(a: &[Vec<f64>], b: &[Vec<f64>], f: impl Fn(f64, f64) -> f64) -> Vec<Vec<f64>> {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.iter().zip(y).map(|(&p, &q)| f(p, q)).collect())
        .collect()
}

fn naive_product(a: &[Vec<f64>], b: &[Vec<f64>]) -> Vec<Vec<f64>> {
    DenseMatrix::from_rows(a)
        .unwrap()
        .multiply(&DenseMatrix::from_rows(b).unwrap())
        .unwrap()
        .to_rows()
}

// ============================================================
// Concrete scenarios
// ============================================================

#[test]
fn test_3x3_with_block_size_2() {
    let m = BlockMatrix::from_rows_with_block_size(
        &[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]],
        2,
    )
    .unwrap();

    let shapes: Vec<usize> = m.blocks().iter().map(Vec::len).collect();
    assert_eq!(shapes, vec![4, 2, 2, 1]);
    assert_eq!(m.block(1, 1), &[9.0]);
    assert_eq!(m.get_entry(2, 2).unwrap(), 9.0);
    assert_eq!(m.get_entry(1, 2).unwrap(), 6.0);
    assert_eq!(m.get_entry(2, 0).unwrap(), 7.0);
}

#[test]
fn test_2x3_times_3x2_block_size_2() {
    let a = BlockMatrix::from_rows_with_block_size(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], 2).unwrap();
    let b = BlockMatrix::from_rows_with_block_size(&[[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]], 2)
        .unwrap();

    let c = a.multiply(&b).unwrap();

    assert_eq!(c.to_rows(), vec![vec![58.0, 64.0], vec![139.0, 154.0]]);
}

#[test]
fn test_sub_matrix_straddling_four_tiles() {
    let raw: Vec<Vec<f64>> = (0..4)
        .map(|i| (0..4).map(|j| (i * 4 + j) as f64).collect())
        .collect();
    let m = BlockMatrix::from_rows_with_block_size(&raw, 2).unwrap();

    let sub = m.get_sub_matrix(1, 2, 1, 2).unwrap();

    assert_eq!(sub.to_rows(), vec![vec![5.0, 6.0], vec![9.0, 10.0]]);
    let rows = m.to_rows();
    let sliced: Vec<Vec<f64>> = rows[1..=2].iter().map(|r| r[1..=2].to_vec()).collect();
    assert_eq!(sub.to_rows(), sliced);
}

// ============================================================
// Round trip through the tiled layout
// ============================================================

#[test]
fn test_round_trip_irregular_sizes() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for (rows, columns, block_size) in [
        (37, 53, 36),
        (1, 1, 36),
        (52, 52, 52),
        (53, 1, 52),
        (5, 9, 2),
    ] {
        let raw = random_rows(&mut rng, rows, columns);
        let m = BlockMatrix::from_rows_with_block_size(&raw, block_size).unwrap();
        assert_eq!(m.to_rows(), raw, "{}x{} / {}", rows, columns, block_size);
    }
}

#[test]
fn test_blocks_layout_reused_through_adopt() {
    let raw: Vec<Vec<f64>> = (0..5)
        .map(|i| (0..3).map(|j| (i + j) as f64).collect())
        .collect();
    let m = BlockMatrix::from_rows_with_block_size(&raw, 2).unwrap();
    let layout = *m.layout();

    let copied = BlockMatrix::from_blocks(layout, m.blocks()).unwrap();
    let adopted = BlockMatrix::adopt_blocks(layout, m.clone().into_blocks()).unwrap();

    assert_eq!(copied, m);
    assert_eq!(adopted, m);
    assert_eq!(BlockLayout::new(5, 3, 2).unwrap(), layout);
}

// ============================================================
// Agreement with naive baselines
// ============================================================

#[test]
fn test_multiply_tile_boundaries() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let test_sizes = [3, 4, 5, 7, 8, 9, 15, 16, 17, 35, 36, 37];

    for size in test_sizes {
        let a = random_rows(&mut rng, size, size);
        let b = random_rows(&mut rng, size, size);
        let expected = naive_product(&a, &b);

        for block_size in [4, 8, 36] {
            let am = BlockMatrix::from_rows_with_block_size(&a, block_size).unwrap();
            let bm = BlockMatrix::from_rows_with_block_size(&b, block_size).unwrap();
            let c = am.multiply(&bm).unwrap();
            assert_matrices_equal(
                &expected,
                &c.to_rows(),
                &format!("size_{}_block_{}", size, block_size),
            );
        }
    }
}

#[test]
fn test_multiply_rectangular() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    for (m, n, k) in [
        (3, 5, 7),
        (7, 3, 5),
        (11, 13, 17),
        (1, 40, 9),
        (40, 1, 9),
        (9, 9, 1),
    ] {
        let a = random_rows(&mut rng, m, k);
        let b = random_rows(&mut rng, k, n);
        let am = BlockMatrix::from_rows_with_block_size(&a, 4).unwrap();
        let bm = BlockMatrix::from_rows_with_block_size(&b, 4).unwrap();
        let dense_b = DenseMatrix::from_rows(&b).unwrap();

        let expected = naive_product(&a, &b);
        assert_matrices_equal(&expected, &am.multiply(&bm).unwrap().to_rows(), "blocked");
        assert_matrices_equal(
            &expected,
            &am.multiply(&dense_b).unwrap().to_rows(),
            "generic",
        );
    }
}

#[test]
fn test_multiply_exact_over_prime_field() {
    type F = ModInt<998_244_353>;
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut random_field = |rows: usize, columns: usize| -> Vec<Vec<F>> {
        let mut cell = || F::new(rng.gen_range(0..998_244_353));
        (0..rows)
            .map(|_| (0..columns).map(|_| cell()).collect())
            .collect()
    };
    let a = random_field(23, 41);
    let b = random_field(41, 19);

    let expected = DenseMatrix::from_rows(&a)
        .unwrap()
        .multiply(&DenseMatrix::from_rows(&b).unwrap())
        .unwrap();
    let c = BlockMatrix::from_rows(&a)
        .unwrap()
        .multiply(&BlockMatrix::from_rows(&b).unwrap())
        .unwrap();

    assert_eq!(c.block_size(), 36);
    assert_eq!(c.to_rows(), expected.to_rows());
}

#[test]
fn test_add_subtract_against_naive() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let a = random_rows(&mut rng, 37, 53);
    let b = random_rows(&mut rng, 37, 53);
    let am = BlockMatrix::from_rows_with_block_size(&a, 36).unwrap();
    let bm = BlockMatrix::from_rows_with_block_size(&b, 36).unwrap();

    let sum = elementwise(&a, &b, |p, q| p + q);
    let diff = elementwise(&a, &b, |p, q| p - q);

    assert_eq!(am.add(&bm).unwrap().to_rows(), sum);
    assert_eq!(am.subtract(&bm).unwrap().to_rows(), diff);
}

#[test]
fn test_operate_matches_multiply_by_column() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let a = random_rows(&mut rng, 19, 23);
    let v: Vec<f64> = (0..23).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let m = BlockMatrix::from_rows_with_block_size(&a, 8).unwrap();

    let column: Vec<Vec<f64>> = v.iter().map(|&x| vec![x]).collect();
    let expected: Vec<f64> = naive_product(&a, &column)
        .into_iter()
        .map(|r| r[0])
        .collect();
    let actual = m.operate(&v).unwrap();
    assert_matrices_equal(&[expected], &[actual], "operate");

    let u: Vec<f64> = (0..19).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let expected = naive_product(&[u.clone()], &a).remove(0);
    let actual = m.pre_multiply(&u).unwrap();
    assert_matrices_equal(&[expected], &[actual], "pre_multiply");
}

// ============================================================
// Consistency between access paths
// ============================================================

#[test]
fn test_entry_row_column_consistency() {
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    let raw = random_rows(&mut rng, 13, 10);
    let m = BlockMatrix::from_rows_with_block_size(&raw, 4).unwrap();

    for r in 0..13 {
        let row = m.get_row(r).unwrap();
        for c in 0..10 {
            let column = m.get_column(c).unwrap();
            assert_eq!(row[c], m.get_entry(r, c).unwrap());
            assert_eq!(column[r], row[c]);
        }
    }
}

#[test]
fn test_transpose_twice_is_identity() {
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    for (rows, columns) in [(1, 1), (1, 9), (9, 1), (37, 53), (52, 53)] {
        let raw = random_rows(&mut rng, rows, columns);
        let m = BlockMatrix::from_rows_with_block_size(&raw, 36).unwrap();
        let t = m.transpose();
        assert_eq!(
            t.to_rows(),
            DenseMatrix::from_rows(&raw).unwrap().transpose().to_rows()
        );
        assert_eq!(t.transpose(), m);
    }
}

// ============================================================
// Traversal order
// ============================================================

#[derive(Default)]
struct OrderRecorder {
    visits: Vec<(usize, usize)>,
}

impl PreservingVisitor<f64> for OrderRecorder {
    fn visit(&mut self, row: usize, column: usize, _value: f64) {
        self.visits.push((row, column));
    }

    fn end(&mut self) -> f64 {
        0.0
    }
}

#[test]
fn test_optimized_order_is_not_row_major() {
    let m = BlockMatrix::<f64>::zeros_with_block_size(6, 6, 3).unwrap();

    let mut row_major = OrderRecorder::default();
    m.walk_in_row_order(&mut row_major);
    assert!(row_major.visits.windows(2).all(|w| w[0] < w[1]));

    let mut tiled = OrderRecorder::default();
    m.walk_in_optimized_order(&mut tiled);
    let row1_first = tiled.visits.iter().position(|&v| v == (1, 0)).unwrap();
    let row0_second_tile = tiled.visits.iter().position(|&v| v == (0, 3)).unwrap();
    assert!(row1_first < row0_second_tile);

    let mut all = tiled.visits.clone();
    all.sort();
    assert_eq!(all, row_major.visits);
}
