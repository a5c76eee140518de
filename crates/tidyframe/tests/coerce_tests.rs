use pretty_assertions::assert_eq;
use tidyframe::{
    coerce, inspect, Column, FrameError, IntoTable, NamedList, RawValue, StructuralCheck, Table,
    Value,
};

fn check_of(err: FrameError) -> (StructuralCheck, String) {
    match err {
        FrameError::Structural { check, entry, .. } => (check, entry),
        other => panic!("expected a structural error, got {other:?}"),
    }
}

#[test]
fn wide_input_is_wrapped_without_copying() {
    let columns: Vec<(String, Column)> = (b'a'..=b'z')
        .map(|c| {
            let name = (c as char).to_string();
            let values: Vec<f64> = (0..100).map(f64::from).collect();
            (name, Column::from(values))
        })
        .collect();
    let input: NamedList = columns
        .iter()
        .map(|(name, col)| (name.clone(), col.clone()))
        .collect();

    let table = coerce(&input).unwrap();
    assert_eq!(table.column_count(), 26);
    assert_eq!(table.row_count(), 100);

    let identity = inspect(&table);
    for (name, col) in &columns {
        assert_eq!(identity.column(name), Some(col.identity()), "`{name}` was copied");
    }
}

#[test]
fn empty_input_gives_empty_table() {
    let table = coerce(&NamedList::new()).unwrap();
    assert_eq!(table.column_count(), 0);
    assert_eq!(table.row_count(), 0);
}

#[test]
fn list_columns_are_accepted() {
    let input = NamedList::new()
        .with("id", vec![1i64, 2])
        .with("payload", RawValue::list(vec![Value::from("x"), Value::Null]));
    let table = coerce(&input).unwrap();
    assert_eq!(table.names(), ["id", "payload"]);
}

#[test]
fn missing_names_are_reported_by_position() {
    let input = NamedList::new()
        .with("a", vec![1i64])
        .with("", vec![2i64]);
    assert_eq!(
        check_of(coerce(&input).unwrap_err()),
        (StructuralCheck::MissingName, "#2".to_string())
    );
}

#[test]
fn names_are_checked_before_values() {
    let input = NamedList::new()
        .with("nested", NamedList::new().with("inner", vec![1i64]))
        .with("", vec![2i64]);
    assert_eq!(check_of(coerce(&input).unwrap_err()).0, StructuralCheck::MissingName);
}

#[test]
fn nested_records_and_nulls_are_unsupported() {
    let nested = NamedList::new()
        .with("a", vec![1i64])
        .with("nested", NamedList::new().with("inner", vec![1i64]));
    assert_eq!(
        check_of(coerce(&nested).unwrap_err()),
        (StructuralCheck::UnsupportedValue, "nested".to_string())
    );

    let null = NamedList::new().with("gap", RawValue::Null);
    assert_eq!(
        check_of(coerce(&null).unwrap_err()),
        (StructuralCheck::UnsupportedValue, "gap".to_string())
    );
}

#[test]
fn values_are_checked_before_lengths() {
    let input = NamedList::new()
        .with("a", vec![1i64, 2, 3])
        .with("b", vec![1i64])
        .with("c", RawValue::Null);
    assert_eq!(check_of(coerce(&input).unwrap_err()).0, StructuralCheck::UnsupportedValue);
}

#[test]
fn unequal_lengths_name_the_offender() {
    let input = NamedList::new()
        .with("a", vec![1i64, 2, 3])
        .with("b", vec![1i64, 2, 3])
        .with("c", vec![1i64]);
    let err = coerce(&input).unwrap_err();
    assert_eq!(
        err.to_string(),
        "length mismatch check failed for entry c: length 1, expected 3"
    );
}

#[test]
fn duplicate_names_are_rejected() {
    let input = NamedList::new().with("a", vec![1i64]).with("a", vec![2i64]);
    assert_eq!(
        coerce(&input).unwrap_err(),
        FrameError::DuplicateName {
            column: "a".to_string()
        }
    );
}

#[test]
fn input_is_left_untouched() {
    let input = NamedList::new().with("a", vec![1i64, 2]);
    let before = input.clone();
    let _table = coerce(&input).unwrap();
    assert_eq!(input, before);
}

#[test]
fn coercing_a_table_returns_the_same_handle() {
    let table = Table::new(vec![("a", Column::from(vec![1i64]))]).unwrap();
    let again = table.clone().into_table().unwrap();
    assert_eq!(again.identity(), table.identity());

    let from_list: Table = Table::try_from(NamedList::new().with("a", vec![1i64])).unwrap();
    assert_eq!(from_list, table);
}
