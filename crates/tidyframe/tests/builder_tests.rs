use pretty_assertions::assert_eq;
use std::cell::RefCell;
use tidyframe::{
    build, col, lit, Column, ColumnType, Env, Evaluator, Expr, FrameError, FrameResult,
    TableBuilder, Value,
};

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|&v| Value::Integer(v)).collect()
}

#[test]
fn later_columns_see_earlier_bindings() {
    let table = build(vec![("x", Expr::range(1, 5)), ("y", col("x").pow(lit(2)))]).unwrap();

    assert_eq!(table.row_count(), 5);
    assert_eq!(table.names(), ["x", "y"]);
    assert_eq!(table.column("x").unwrap().values(), ints(&[1, 2, 3, 4, 5]));
    assert_eq!(
        table.column("y").unwrap().values(),
        vec![1.0, 4.0, 9.0, 16.0, 25.0]
            .into_iter()
            .map(Value::Double)
            .collect::<Vec<_>>()
    );
}

#[test]
fn names_are_kept_verbatim() {
    let awkward = ["a b", "1st", "x-y", "  ", "é"];
    let table = build(
        awkward
            .iter()
            .map(|&name| (name, lit(1i64)))
            .collect::<Vec<_>>(),
    )
    .unwrap();
    assert_eq!(table.names(), awkward);
}

#[test]
fn duplicate_names_fail_before_evaluation() {
    let err = build(vec![
        ("a", lit(1i64)),
        ("a", col("missing")),
    ])
    .unwrap_err();
    assert_eq!(
        err,
        FrameError::DuplicateName {
            column: "a".to_string()
        }
    );
}

#[test]
fn length_one_columns_broadcast_to_the_established_row_count() {
    let table = build(vec![
        ("k", lit("const")),
        ("x", Expr::range(1, 3)),
        ("flag", lit(true)),
    ])
    .unwrap();

    assert_eq!(table.row_count(), 3);
    assert_eq!(table.column("k").unwrap().values(), vec![Value::from("const"); 3]);
    assert_eq!(table.column("flag").unwrap().values(), vec![Value::Logical(true); 3]);
}

#[test]
fn all_scalar_columns_give_one_row() {
    let table = build(vec![("a", lit(1i64)), ("b", lit(2.5))]).unwrap();
    assert_eq!(table.row_count(), 1);
}

#[test]
fn mismatched_lengths_fail_with_shape_error() {
    let err = build(vec![("x", Expr::range(1, 3)), ("y", Expr::range(1, 4))]).unwrap_err();
    assert_eq!(
        err,
        FrameError::Shape {
            column: "y".to_string(),
            expected: 3,
            actual: 4
        }
    );
}

#[test]
fn explicit_row_count_supports_zero_columns() {
    let mut builder = TableBuilder::new();
    builder.rows(7);
    let table = builder.finalize().unwrap();
    assert_eq!(table.row_count(), 7);
    assert_eq!(table.column_count(), 0);
}

#[test]
fn scalar_cannot_broadcast_to_zero_rows() {
    let mut builder = TableBuilder::new();
    builder.rows(0).push("a", lit(1i64));
    assert!(matches!(
        builder.finalize(),
        Err(FrameError::Shape { expected: 0, actual: 1, .. })
    ));
}

#[test]
fn empty_column_after_scalars_is_named_in_the_error() {
    let mut builder = TableBuilder::new();
    builder
        .push("a", lit(1i64))
        .push("b", Column::from(Vec::<i64>::new()));
    assert_eq!(
        builder.finalize().unwrap_err(),
        FrameError::Shape {
            column: "b".to_string(),
            expected: 1,
            actual: 0
        }
    );

    let table = build(vec![("b", Expr::from(Column::from(Vec::<i64>::new())))]).unwrap();
    assert_eq!(table.row_count(), 0);
}

#[test]
fn supplied_columns_keep_their_type_and_storage() {
    let inputs = vec![
        ("l", Column::from(vec![true, false])),
        ("i", Column::from(vec![1i64, 2])),
        ("d", Column::from(vec![0.5, 1.5])),
        ("t", Column::from(vec!["a", "b"])),
        ("v", Column::list(vec![Value::Null, Value::from(3i64)])),
    ];
    let mut builder = TableBuilder::new();
    for (name, column) in &inputs {
        builder.push(*name, column.clone());
    }
    let table = builder.finalize().unwrap();

    for (name, column) in &inputs {
        let built = table.column(name).unwrap();
        assert_eq!(built.column_type(), column.column_type());
        assert!(built.shares_storage(column), "`{name}` was copied");
    }
    assert_eq!(table.column("v").unwrap().column_type(), ColumnType::List);
}

#[test]
fn attributes_are_fresh() {
    let a = build(vec![("x", lit(1i64))]).unwrap();
    let b = build(vec![("x", lit(1i64))]).unwrap();
    assert!(!a.attributes().shares_storage(b.attributes()));
}

/// Records each expression it evaluates.
struct Recording {
    seen: RefCell<Vec<String>>,
}

impl Evaluator for Recording {
    type Expr = String;

    fn evaluate(&self, expr: &String, env: &Env) -> FrameResult<Column> {
        self.seen.borrow_mut().push(expr.clone());
        Ok(Column::from(vec![env.len() as i64]))
    }
}

#[test]
fn custom_evaluators_run_once_each_in_order() {
    let recording = Recording {
        seen: RefCell::new(Vec::new()),
    };
    let mut builder = TableBuilder::with_evaluator(&recording);
    builder.push("a", "first").push("b", "second").push("c", "third");
    let table = builder.finalize().unwrap();

    assert_eq!(*recording.seen.borrow(), ["first", "second", "third"]);
    assert_eq!(table.column("c").unwrap().values(), ints(&[2]));
}

#[test]
fn evaluator_errors_surface_unchanged() {
    let err = build(vec![("y", col("nope"))]).unwrap_err();
    assert_eq!(
        err,
        FrameError::UnknownColumn {
            column: "nope".to_string()
        }
    );
}
