//! End-to-end tests for matrix algebra
//!
//! Every bulk operation is exercised under both execution strategies and
//! checked against a brute-force dense computation, so serial/parallel
//! divergence or a broken merge-join shows up as a value mismatch.

use keymat::{
    ExecMode, KeyMatrix, MatrixError, Orientation, SparseAccess, SparseVector, StoreTag,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MODES: [ExecMode; 2] = [ExecMode::Serial, ExecMode::Parallel];

fn dense(matrix: &KeyMatrix) -> Vec<Vec<Option<f32>>> {
    (0..matrix.row_size())
        .map(|row| {
            (0..matrix.column_size())
                .map(|column| matrix.try_get(row, column))
                .collect()
        })
        .collect()
}

fn random_matrix(
    rng: &mut StdRng,
    orientation: Orientation,
    rows: u32,
    columns: u32,
    density: f64,
) -> KeyMatrix {
    let mut matrix = KeyMatrix::new(orientation, rows, columns).unwrap();
    for row in 0..rows {
        for column in 0..columns {
            if rng.gen_bool(density) {
                // small integers keep f32 arithmetic exact
                let value = rng.gen_range(1..10) as f32;
                matrix.set_value(row, column, value).unwrap();
            }
        }
    }
    matrix
}

#[test]
fn add_matches_brute_force_in_both_modes() {
    let mut rng = StdRng::seed_from_u64(11);
    let base = random_matrix(&mut rng, Orientation::RowMajor, 30, 40, 0.15);
    let operand = random_matrix(&mut rng, Orientation::RowMajor, 30, 40, 0.15);

    for mode in MODES {
        let mut target = base.clone_for_test();
        target.add_matrix(&operand, false, mode).unwrap();

        for row in 0..30 {
            for column in 0..40 {
                let expected = base.try_get(row, column).map(|value| {
                    value + operand.try_get(row, column).unwrap_or(0.0)
                });
                assert_eq!(target.try_get(row, column), expected, "at ({row}, {column})");
            }
        }
    }
}

#[test]
fn subtract_and_multiply_and_divide_modes_agree() {
    let mut rng = StdRng::seed_from_u64(23);
    let base = random_matrix(&mut rng, Orientation::RowMajor, 20, 20, 0.3);
    let operand = random_matrix(&mut rng, Orientation::RowMajor, 20, 20, 0.3);

    type Op = fn(&mut KeyMatrix, &KeyMatrix, bool, ExecMode) -> keymat::Result<()>;
    let operations: [Op; 3] = [
        KeyMatrix::subtract_matrix,
        KeyMatrix::multiply_matrix,
        KeyMatrix::divide_matrix,
    ];
    for operation in operations {
        let mut serial = base.clone_for_test();
        let mut parallel = base.clone_for_test();
        operation(&mut serial, &operand, false, ExecMode::Serial).unwrap();
        operation(&mut parallel, &operand, false, ExecMode::Parallel).unwrap();
        assert_eq!(dense(&serial), dense(&parallel));
        // the operation is sparse-preserving
        assert_eq!(serial.element_size(), base.element_size());
    }
}

#[test]
fn transposed_add_reads_operand_columns() {
    // self is 2x3 row-major; the transposed operand is 3x2 column-major,
    // so self[r][c] += operand[c][r]
    let mut target = KeyMatrix::from_cells(
        Orientation::RowMajor,
        2,
        3,
        [(0, 0, 1.0), (0, 2, 2.0), (1, 1, 3.0)],
    )
    .unwrap();
    let operand = KeyMatrix::from_cells(
        Orientation::ColumnMajor,
        3,
        2,
        [(0, 0, 10.0), (1, 1, 20.0), (2, 0, 30.0)],
    )
    .unwrap();

    target.add_matrix(&operand, true, ExecMode::Serial).unwrap();
    assert_eq!(target.get_value(0, 0), Ok(11.0));
    assert_eq!(target.get_value(0, 2), Ok(32.0));
    assert_eq!(target.get_value(1, 1), Ok(23.0));
}

#[test]
fn element_wise_operand_shape_is_validated() {
    let mut target = KeyMatrix::new(Orientation::RowMajor, 3, 3).unwrap();
    let wrong_orientation = KeyMatrix::new(Orientation::ColumnMajor, 3, 3).unwrap();
    let wrong_shape = KeyMatrix::new(Orientation::RowMajor, 2, 3).unwrap();

    assert_eq!(
        target.add_matrix(&wrong_orientation, false, ExecMode::Serial),
        Err(MatrixError::OrientationMismatch)
    );
    assert_eq!(
        target.add_matrix(&wrong_shape, false, ExecMode::Serial),
        Err(MatrixError::DimensionMismatch)
    );
}

#[test]
fn dot_product_matches_hand_computation() {
    // left = [[1,2,3],[4,5,6]], right columns = [7,8,9] and [10,11,12]
    let left = KeyMatrix::from_cells(
        Orientation::RowMajor,
        2,
        3,
        [
            (0, 0, 1.0),
            (0, 1, 2.0),
            (0, 2, 3.0),
            (1, 0, 4.0),
            (1, 1, 5.0),
            (1, 2, 6.0),
        ],
    )
    .unwrap();
    let right = KeyMatrix::from_cells(
        Orientation::ColumnMajor,
        3,
        2,
        [
            (0, 0, 7.0),
            (1, 0, 8.0),
            (2, 0, 9.0),
            (0, 1, 10.0),
            (1, 1, 11.0),
            (2, 1, 12.0),
        ],
    )
    .unwrap();

    for mode in MODES {
        // only stored cells receive products
        let mut target = KeyMatrix::from_cells(
            Orientation::RowMajor,
            2,
            2,
            [(0, 0, 0.0), (0, 1, 0.0), (1, 0, 0.0), (1, 1, 0.0)],
        )
        .unwrap();
        target.dot_product(&left, false, &right, false, mode).unwrap();
        assert_eq!(target.get_value(0, 0), Ok(50.0));
        assert_eq!(target.get_value(0, 1), Ok(68.0));
        assert_eq!(target.get_value(1, 0), Ok(122.0));
        assert_eq!(target.get_value(1, 1), Ok(167.0));

        target.accumulate_product(&left, false, &right, false, mode).unwrap();
        assert_eq!(target.get_value(0, 0), Ok(100.0));
        assert_eq!(target.get_value(1, 1), Ok(334.0));
    }
}

#[test]
fn transposed_operands_reach_the_same_product() {
    // left^T stored column-major makes lane r of the operand equal row r of left
    let left_t = KeyMatrix::from_cells(
        Orientation::ColumnMajor,
        3,
        2,
        [
            (0, 0, 1.0),
            (1, 0, 2.0),
            (2, 0, 3.0),
            (0, 1, 4.0),
            (1, 1, 5.0),
            (2, 1, 6.0),
        ],
    )
    .unwrap();
    let right = KeyMatrix::from_cells(
        Orientation::ColumnMajor,
        3,
        2,
        [
            (0, 0, 7.0),
            (1, 0, 8.0),
            (2, 0, 9.0),
            (0, 1, 10.0),
            (1, 1, 11.0),
            (2, 1, 12.0),
        ],
    )
    .unwrap();

    let mut target =
        KeyMatrix::from_cells(Orientation::RowMajor, 2, 2, [(0, 1, 0.0), (1, 0, 0.0)]).unwrap();
    target
        .dot_product(&left_t, true, &right, false, ExecMode::Serial)
        .unwrap();
    assert_eq!(target.get_value(0, 1), Ok(68.0));
    assert_eq!(target.get_value(1, 0), Ok(122.0));
}

#[test]
fn dot_product_validates_operand_orientation_and_reach() {
    let mut target = KeyMatrix::new(Orientation::RowMajor, 2, 2).unwrap();
    let row_major = KeyMatrix::new(Orientation::RowMajor, 2, 3).unwrap();
    let column_major = KeyMatrix::new(Orientation::ColumnMajor, 3, 2).unwrap();

    assert_eq!(
        target.dot_product(&column_major, false, &column_major, false, ExecMode::Serial),
        Err(MatrixError::OrientationMismatch)
    );
    assert_eq!(
        target.dot_product(&row_major, false, &row_major, false, ExecMode::Serial),
        Err(MatrixError::OrientationMismatch)
    );

    // too few lanes to serve every target row
    let short = KeyMatrix::new(Orientation::RowMajor, 1, 3).unwrap();
    assert_eq!(
        target.dot_product(&short, false, &column_major, false, ExecMode::Serial),
        Err(MatrixError::DimensionMismatch)
    );
}

#[test]
fn random_products_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(37);
    let left = random_matrix(&mut rng, Orientation::RowMajor, 4, 6, 0.5);
    let right = random_matrix(&mut rng, Orientation::ColumnMajor, 6, 5, 0.5);
    let base = random_matrix(&mut rng, Orientation::RowMajor, 4, 5, 0.6);

    for mode in MODES {
        let mut target = base.clone_for_test();
        target.dot_product(&left, false, &right, false, mode).unwrap();

        for row in 0..4 {
            for column in 0..5 {
                let expected = base.try_get(row, column).map(|_| {
                    (0..6)
                        .map(|k| {
                            left.try_get(row, k).unwrap_or(0.0)
                                * right.try_get(k, column).unwrap_or(0.0)
                        })
                        .sum::<f32>()
                });
                assert_eq!(target.try_get(row, column), expected, "at ({row}, {column})");
            }
        }
    }
}

#[test]
fn rank_one_update_touches_only_intersected_cells() {
    for mode in MODES {
        let mut matrix = KeyMatrix::from_cells(
            Orientation::RowMajor,
            2,
            3,
            [
                (0, 0, 1.0),
                (0, 1, 1.0),
                (0, 2, 1.0),
                (1, 0, 1.0),
                (1, 1, 1.0),
            ],
        )
        .unwrap();
        let row_vector = SparseVector::from_entries(2, [(0, 2.0)]).unwrap();
        let column_vector = SparseVector::from_entries(3, [(1, 5.0), (2, 7.0)]).unwrap();

        matrix
            .dot_product_vectors(&row_vector, &column_vector, mode)
            .unwrap();
        assert_eq!(matrix.get_value(0, 1), Ok(10.0));
        assert_eq!(matrix.get_value(0, 2), Ok(14.0));
        // outside the vectors' support nothing moves
        assert_eq!(matrix.get_value(0, 0), Ok(1.0));
        assert_eq!(matrix.get_value(1, 1), Ok(1.0));

        matrix
            .accumulate_product_vectors(&row_vector, &column_vector, mode)
            .unwrap();
        assert_eq!(matrix.get_value(0, 1), Ok(20.0));
        assert_eq!(matrix.get_value(0, 2), Ok(28.0));
    }
}

#[test]
fn rank_one_on_column_major_drives_by_column() {
    for mode in MODES {
        let mut matrix = KeyMatrix::from_cells(
            Orientation::ColumnMajor,
            3,
            2,
            [(0, 0, 1.0), (2, 0, 1.0), (1, 1, 1.0)],
        )
        .unwrap();
        let row_vector = SparseVector::from_entries(3, [(0, 4.0), (1, 6.0)]).unwrap();
        let column_vector = SparseVector::from_entries(2, [(1, 3.0)]).unwrap();

        matrix
            .dot_product_vectors(&row_vector, &column_vector, mode)
            .unwrap();
        assert_eq!(matrix.get_value(1, 1), Ok(18.0));
        assert_eq!(matrix.get_value(0, 0), Ok(1.0));
        assert_eq!(matrix.get_value(2, 0), Ok(1.0));
    }
}

#[test]
fn rank_one_validates_vector_lengths() {
    let mut matrix = KeyMatrix::new(Orientation::RowMajor, 2, 3).unwrap();
    let short_row = SparseVector::new(1);
    let column = SparseVector::new(3);
    assert_eq!(
        matrix.dot_product_vectors(&short_row, &column, ExecMode::Serial),
        Err(MatrixError::DimensionMismatch)
    );
    let row = SparseVector::new(2);
    let long_column = SparseVector::new(4);
    assert_eq!(
        matrix.accumulate_product_vectors(&row, &long_column, ExecMode::Serial),
        Err(MatrixError::DimensionMismatch)
    );
}

#[test]
fn merge_join_matches_nested_loop_reference() {
    let mut rng = StdRng::seed_from_u64(71);
    for density in [0.001, 0.05, 0.5] {
        for _ in 0..5 {
            let length = rng.gen_range(1..=1000u32);
            let sample = |rng: &mut StdRng| {
                (0..length)
                    .filter_map(|index| {
                        if rng.gen_bool(density) {
                            Some((index, rng.gen_range(1..100) as f32))
                        } else {
                            None
                        }
                    })
                    .collect::<Vec<_>>()
            };
            let left = sample(&mut rng);
            let right = sample(&mut rng);

            let mut joined = Vec::new();
            keymat::merge::intersect(
                left.iter().copied(),
                right.iter().copied(),
                |index, lv, rv| joined.push((index, lv, rv)),
            );

            let mut reference = Vec::new();
            for &(li, lv) in &left {
                for &(ri, rv) in &right {
                    if li == ri {
                        reference.push((li, lv, rv));
                    }
                }
            }
            assert_eq!(joined, reference, "length {length} density {density}");
        }
    }
}

#[test]
fn paired_backend_behaves_like_btree() {
    let mut rng = StdRng::seed_from_u64(53);
    let mut btree = KeyMatrix::new(Orientation::RowMajor, 10, 10).unwrap();
    let mut paired =
        KeyMatrix::with_tag(Orientation::RowMajor, 10, 10, StoreTag::Paired).unwrap();

    for _ in 0..200 {
        let row = rng.gen_range(0..10);
        let column = rng.gen_range(0..10);
        if rng.gen_bool(0.25) {
            btree.remove(row, column).unwrap();
            paired.remove(row, column).unwrap();
        } else {
            let value = rng.gen_range(1..100) as f32;
            btree.set_value(row, column, value).unwrap();
            paired.set_value(row, column, value).unwrap();
        }
    }

    assert_eq!(btree.element_size(), paired.element_size());
    assert_eq!(dense(&btree), dense(&paired));
    assert_eq!(btree, paired);
}

// KeyMatrix deliberately has no Clone (monitors are identity-bound), so
// tests duplicate content through the persistence path.
trait CloneForTest {
    fn clone_for_test(&self) -> KeyMatrix;
}

impl CloneForTest for KeyMatrix {
    fn clone_for_test(&self) -> KeyMatrix {
        let layout = self.layout();
        let mut copy = KeyMatrix::with_tag(
            layout.orientation(),
            layout.row_size(),
            layout.column_size(),
            self.store_tag(),
        )
        .unwrap();
        copy.rehydrate(self.flatten()).unwrap();
        copy
    }
}
