use pretty_assertions::assert_eq;
use std::sync::Arc;
use tidyframe_columnar::{Column, ColumnData, ColumnError, ColumnType, KeyPart, Value};

#[test]
fn clone_shares_storage_and_counts_owners() {
    let col = Column::from(vec![1i64, 2, 3]);
    assert_eq!(col.ref_count(), 1);

    let other = col.clone();
    assert!(col.shares_storage(&other));
    assert_eq!(col.identity(), other.identity());
    assert_eq!(col.ref_count(), 2);

    drop(other);
    assert_eq!(col.ref_count(), 1);
}

#[test]
fn from_shared_wraps_without_copying() {
    let data = Arc::new(ColumnData::Double(vec![Some(1.0), None]));
    let col = Column::from_shared(data.clone());
    assert!(Arc::ptr_eq(col.shared(), &data));
    assert_eq!(col.column_type(), ColumnType::Double);
}

#[test]
fn take_allocates_new_storage_even_for_identity_permutation() {
    let col = Column::from(vec!["a", "b", "c"]);
    let taken = col.take(&[0, 1, 2]).unwrap();
    assert_eq!(taken, col);
    assert!(!taken.shares_storage(&col));
    assert_ne!(taken.identity(), col.identity());
}

#[test]
fn take_rejects_out_of_bounds_rows() {
    let col = Column::from(vec![true, false]);
    assert_eq!(
        col.take(&[1, 2]).unwrap_err(),
        ColumnError::IndexOutOfBounds { index: 2, len: 2 }
    );
}

#[test]
fn broadcast_repeats_the_single_element() {
    let col = Column::scalar(Value::from("x"));
    let wide = col.broadcast(4).unwrap();
    assert_eq!(wide.len(), 4);
    assert_eq!(wide.column_type(), ColumnType::Text);
    assert!(wide.values().iter().all(|v| *v == Value::from("x")));

    let err = Column::from(vec![1i64, 2]).broadcast(4).unwrap_err();
    assert_eq!(err, ColumnError::NotScalar { len: 2 });
}

#[test]
fn list_columns_hold_nested_values_and_have_no_ordering() {
    let col = Column::list(vec![
        Value::list(vec![1.into(), 2.into()]),
        Value::from("loose"),
        Value::Null,
    ]);
    assert_eq!(col.column_type(), ColumnType::List);
    assert_eq!(col.len(), 3);
    assert!(col.is_null(2));
    assert_eq!(
        col.row_order().unwrap_err(),
        ColumnError::Unordered(ColumnType::List)
    );
    assert_eq!(
        col.key_at(0).unwrap_err(),
        ColumnError::Unordered(ColumnType::List)
    );
}

#[test]
fn row_order_sorts_nan_after_numbers_and_nulls_last() {
    let col = Column::from(vec![Some(f64::NAN), None, Some(1.0), Some(-2.0)]);
    let order = col.row_order().unwrap();
    let mut rows: Vec<usize> = (0..col.len()).collect();
    rows.sort_by(|&a, &b| order.compare(a, b, false));
    assert_eq!(rows, vec![3, 2, 0, 1]);

    rows.sort_by(|&a, &b| order.compare(a, b, true));
    assert_eq!(rows, vec![0, 2, 3, 1]);
}

#[test]
fn key_parts_order_nulls_last() {
    let col = Column::from(vec![Some(3i64), None, Some(1)]);
    let mut keys: Vec<KeyPart> = (0..3).map(|row| col.key_at(row).unwrap()).collect();
    keys.sort();
    assert_eq!(
        keys,
        vec![KeyPart::Integer(1), KeyPart::Integer(3), KeyPart::Null]
    );
}

#[test]
fn storage_is_released_with_the_last_handle() {
    let col = Column::from(vec![1.0f64]);
    let weak = Arc::downgrade(col.shared());
    let copy = col.clone();
    drop(col);
    assert!(weak.upgrade().is_some());
    drop(copy);
    assert!(weak.upgrade().is_none());
}
