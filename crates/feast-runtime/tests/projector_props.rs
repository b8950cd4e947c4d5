//! Property tests for the column projector

use feast_runtime::ffi::ColumnPointerTable;
use feast_runtime::FeatureTable;
use proptest::prelude::*;

fn arb_codes() -> impl Strategy<Value = Vec<Vec<u32>>> {
    (1usize..24, 1usize..8).prop_flat_map(|(n_samples, n_features)| {
        prop::collection::vec(prop::collection::vec(0u32..16, n_features), n_samples)
    })
}

fn arb_reals() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (1usize..24, 1usize..8).prop_flat_map(|(n_samples, n_features)| {
        prop::collection::vec(
            prop::collection::vec(-1.0e6f64..1.0e6, n_features),
            n_samples,
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every cell of a row-built code table is reachable through the view.
    #[test]
    fn codes_from_rows_round_trip(rows in arb_codes()) {
        let table = FeatureTable::from_rows(&rows).unwrap();
        let view = ColumnPointerTable::<u32>::project(&table).unwrap();
        let (n_samples, n_features) = (rows.len(), rows[0].len());

        prop_assert_eq!(view.n_samples(), n_samples);
        prop_assert_eq!(view.n_features(), n_features);
        for (r, row) in rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                prop_assert_eq!(view.get(r, c), Some(value));
            }
        }
        prop_assert_eq!(view.get(n_samples, 0), None);
        prop_assert_eq!(view.get(0, n_features), None);
    }

    /// Column-built tables are borrowed and still read back cell by cell.
    #[test]
    fn codes_from_columns_borrowed(rows in arb_codes()) {
        let n_features = rows[0].len();
        let columns: Vec<Vec<u32>> = (0..n_features)
            .map(|c| rows.iter().map(|row| row[c]).collect())
            .collect();
        let table = FeatureTable::from_columns(&columns).unwrap();
        let view = ColumnPointerTable::<u32>::project(&table).unwrap();

        prop_assert!(view.is_borrowed());
        for (c, column) in columns.iter().enumerate() {
            prop_assert_eq!(view.column(c), Some(column.as_slice()));
        }
    }

    #[test]
    fn reals_round_trip(rows in arb_reals()) {
        let table = FeatureTable::from_rows(&rows).unwrap();
        let view = ColumnPointerTable::<f64>::project(&table).unwrap();

        for (r, row) in rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                prop_assert_eq!(view.get(r, c), Some(value));
            }
        }
        prop_assert!(ColumnPointerTable::<u32>::project(&table).is_err());
    }

    /// Widening keeps every value of a code table.
    #[test]
    fn widened_codes_round_trip(rows in arb_codes()) {
        let table = FeatureTable::from_rows(&rows).unwrap().to_real();
        let view = ColumnPointerTable::<f64>::project(&table).unwrap();

        for (r, row) in rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                prop_assert_eq!(view.get(r, c), Some(f64::from(value)));
            }
        }
    }
}
