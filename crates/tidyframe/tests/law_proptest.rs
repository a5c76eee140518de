use proptest::prelude::*;
use tidyframe::{build, col, lit, Column, Expr, FrameError, SortKey, Table, Value};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        rng_seed: proptest::test_runner::RngSeed::Fixed(0),
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn scalars_broadcast_to_any_row_count(n in 2i64..200, scalar in any::<i64>()) {
        let table = build(vec![("x", Expr::range(1, n)), ("s", lit(scalar))]).unwrap();
        let s = table.column("s").unwrap();
        prop_assert_eq!(s.len() as i64, n);
        prop_assert!(s.values().iter().all(|v| *v == Value::Integer(scalar)));
    }

    #[test]
    fn differing_lengths_never_broadcast(a in 2i64..50, b in 2i64..50) {
        prop_assume!(a != b);
        let result = build(vec![("x", Expr::range(1, a)), ("y", Expr::range(1, b))]);
        let is_shape = matches!(result, Err(FrameError::Shape { .. }));
        prop_assert!(is_shape);
    }

    #[test]
    fn arrange_is_a_stable_sort(
        keys in proptest::collection::vec(0i64..5, 0..60),
        descending in any::<bool>(),
    ) {
        let rows: Vec<i64> = (0..keys.len() as i64).collect();
        let table = Table::with_rows(
            vec![("k", Column::from(keys.clone())), ("row", Column::from(rows))],
            keys.len(),
        )
        .unwrap();
        let key = if descending { SortKey::desc("k") } else { SortKey::asc("k") };
        let out = table.arrange(&[key]).unwrap();

        let mut expected: Vec<(i64, i64)> = keys.iter().copied().zip(0..).collect();
        if descending {
            expected.sort_by(|a, b| b.0.cmp(&a.0));
        } else {
            expected.sort_by(|a, b| a.0.cmp(&b.0));
        }
        let expected: Vec<Value> = expected
            .into_iter()
            .map(|(_, row)| Value::Integer(row))
            .collect();
        prop_assert_eq!(out.column("row").unwrap().values(), expected);
    }

    #[test]
    fn mutation_shares_untouched_columns(width in 1usize..12, target in 0usize..12) {
        let columns: Vec<(String, Column)> = (0..width)
            .map(|i| (format!("c{i}"), Column::from(vec![i as i64, 1, 2])))
            .collect();
        let table = Table::new(columns).unwrap();
        let name = format!("c{}", target % width);
        let out = table.mutate(&[(name.as_str(), col(name.as_str()) + lit(0i64))]).unwrap();

        let report = tidyframe::diff(&table, &out);
        prop_assert_eq!(report.changed_columns(), vec![name.as_str()]);
        prop_assert_eq!(report.shared_columns().len(), width - 1);
    }
}
