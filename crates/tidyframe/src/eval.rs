use crate::error::{FrameError, FrameResult};
use crate::summarise::{AggregateOp, Reducer};
use crate::table::Table;
use log::warn;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops;
use tidyframe_columnar::{Column, ColumnData, ColumnType, Value};

/// Columns visible to an expression, in binding order.
#[derive(Clone, Debug, Default)]
pub struct Env {
    bindings: Vec<(String, Column)>,
    index: HashMap<String, usize>,
    rows: Option<usize>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_rows(rows: Option<usize>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Every column of `table`, sharing its storage.
    pub(crate) fn from_table(table: &Table) -> Self {
        let mut env = Self::with_rows(Some(table.row_count()));
        for (name, col) in table.iter() {
            env.bind(name, col.clone());
        }
        env
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.index
            .get(name)
            .and_then(|&idx| self.bindings.get(idx))
            .map(|(_, col)| col)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Row count established so far, if any.
    pub fn rows(&self) -> Option<usize> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> + '_ {
        self.bindings.iter().map(|(name, col)| (name.as_str(), col))
    }

    pub(crate) fn set_rows(&mut self, rows: usize) {
        self.rows = Some(rows);
    }

    /// Bind `name`, replacing an existing binding in place. Returns `true` for a new name.
    pub(crate) fn bind(&mut self, name: &str, column: Column) -> bool {
        if let Some(&idx) = self.index.get(name) {
            self.bindings[idx].1 = column;
            return false;
        }
        self.index.insert(name.to_string(), self.bindings.len());
        self.bindings.push((name.to_string(), column));
        true
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Column>) {
        self.bindings.into_iter().unzip()
    }
}

/// Evaluates column expressions against an [`Env`].
///
/// The table layer never inspects expressions; it only relies on the returned column. Returning
/// a handle taken from the environment (a copy-through) keeps that column's storage shared.
pub trait Evaluator {
    type Expr;

    fn evaluate(&self, expr: &Self::Expr, env: &Env) -> FrameResult<Column>;
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    type Expr = E::Expr;

    fn evaluate(&self, expr: &Self::Expr, env: &Env) -> FrameResult<Column> {
        (**self).evaluate(expr, env)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Equals,
    NotEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    And,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    Sum,
    Mean,
    Min,
    Max,
    /// Number of elements, nulls included.
    Length,
    Abs,
    Sqrt,
    IsNull,
    /// `IfElse(condition, yes, no)`, vectorized.
    IfElse,
}

/// A small vectorized expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Column(String),
    /// A length-1 constant.
    Literal(Value),
    /// An existing column, used as-is.
    Vector(Column),
    /// Inclusive integer sequence; counts down when `start > end`.
    Range {
        start: i64,
        end: i64,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        func: Function,
        args: Vec<Expr>,
    },
}

pub fn col(name: impl Into<String>) -> Expr {
    Expr::Column(name.into())
}

pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

impl From<Column> for Expr {
    fn from(column: Column) -> Self {
        Expr::Vector(column)
    }
}

impl Expr {
    pub fn range(start: i64, end: i64) -> Self {
        Expr::Range { start, end }
    }

    pub fn call(func: Function, args: Vec<Expr>) -> Self {
        Expr::Call { func, args }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn pow(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Power, self, rhs)
    }

    pub fn equals(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Equals, self, rhs)
    }

    pub fn not_equals(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::NotEquals, self, rhs)
    }

    pub fn lt(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Less, self, rhs)
    }

    pub fn le(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::LessEquals, self, rhs)
    }

    pub fn gt(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Greater, self, rhs)
    }

    pub fn ge(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::GreaterEquals, self, rhs)
    }

    pub fn and(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::And, self, rhs)
    }

    pub fn or(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Or, self, rhs)
    }
}

impl ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Add, self, rhs)
    }
}

impl ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Subtract, self, rhs)
    }
}

impl ops::Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Multiply, self, rhs)
    }
}

impl ops::Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Divide, self, rhs)
    }
}

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Unary {
            op: UnaryOp::Negate,
            expr: Box::new(self),
        }
    }
}

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Unary {
            op: UnaryOp::Not,
            expr: Box::new(self),
        }
    }
}

/// The built-in [`Evaluator`] for [`Expr`].
///
/// Operands of length 1 are recycled against longer ones; nulls propagate through arithmetic and
/// comparisons, and `And`/`Or` use three-valued logic.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExprEvaluator;

impl Evaluator for ExprEvaluator {
    type Expr = Expr;

    fn evaluate(&self, expr: &Expr, env: &Env) -> FrameResult<Column> {
        eval(expr, env)
    }
}

fn eval(expr: &Expr, env: &Env) -> FrameResult<Column> {
    match expr {
        Expr::Column(name) => env
            .get(name)
            .cloned()
            .ok_or_else(|| FrameError::unknown_column(name.as_str())),
        Expr::Literal(value) => Ok(Column::scalar(value.clone())),
        Expr::Vector(col) => Ok(col.clone()),
        Expr::Range { start, end } => range(*start, *end),
        Expr::Unary { op, expr } => unary(*op, &eval(expr, env)?),
        Expr::Binary { op, left, right } => {
            let left = eval(left, env)?;
            let right = eval(right, env)?;
            binary(*op, &left, &right)
        }
        Expr::Call { func, args } => call(*func, args, env),
    }
}

fn range(start: i64, end: i64) -> FrameResult<Column> {
    let fits = usize::try_from(start.abs_diff(end))
        .ok()
        .and_then(|span| span.checked_add(1))
        .is_some_and(|len| len <= isize::MAX as usize / std::mem::size_of::<i64>());
    if !fits {
        return Err(FrameError::Evaluation(format!(
            "range {start}..={end} has too many elements"
        )));
    }
    let values: Vec<i64> = if start <= end {
        (start..=end).collect()
    } else {
        (end..=start).rev().collect()
    };
    Ok(Column::from(values))
}

/// Numeric view of a logical, integer or double column.
enum Numeric<'a> {
    Logical(&'a [Option<bool>]),
    Integer(&'a [Option<i64>]),
    Double(&'a [Option<f64>]),
}

impl<'a> Numeric<'a> {
    fn of(col: &'a Column, context: &str) -> FrameResult<Self> {
        match col.data() {
            ColumnData::Logical(v) => Ok(Numeric::Logical(v)),
            ColumnData::Integer(v) => Ok(Numeric::Integer(v)),
            ColumnData::Double(v) => Ok(Numeric::Double(v)),
            other => Err(FrameError::Evaluation(format!(
                "non-numeric {} argument to {context}",
                other.column_type()
            ))),
        }
    }

    fn is_double(&self) -> bool {
        matches!(self, Numeric::Double(_))
    }

    fn int(&self, row: usize) -> Option<i64> {
        match self {
            Numeric::Logical(v) => v[recycle(v.len(), row)].map(i64::from),
            Numeric::Integer(v) => v[recycle(v.len(), row)],
            Numeric::Double(v) => v[recycle(v.len(), row)].map(|d| d as i64),
        }
    }

    fn float(&self, row: usize) -> Option<f64> {
        match self {
            Numeric::Logical(v) => v[recycle(v.len(), row)].map(|b| f64::from(u8::from(b))),
            Numeric::Integer(v) => v[recycle(v.len(), row)].map(|i| i as f64),
            Numeric::Double(v) => v[recycle(v.len(), row)],
        }
    }
}

fn recycle(len: usize, row: usize) -> usize {
    if len == 1 {
        0
    } else {
        row
    }
}

fn recycled_len(left: usize, right: usize) -> FrameResult<usize> {
    match (left, right) {
        (a, b) if a == b => Ok(a),
        (1, n) | (n, 1) => Ok(n),
        (a, b) => Err(FrameError::Evaluation(format!(
            "operands have incompatible lengths {a} and {b}"
        ))),
    }
}

fn unary(op: UnaryOp, operand: &Column) -> FrameResult<Column> {
    match op {
        UnaryOp::Negate => {
            let values = Numeric::of(operand, "negation")?;
            let len = operand.len();
            if values.is_double() {
                let out = (0..len).map(|row| values.float(row).map(|v| -v)).collect();
                return Ok(Column::new(ColumnData::Double(out)));
            }
            let out = (0..len)
                .map(|row| values.int(row).and_then(i64::checked_neg))
                .collect();
            Ok(Column::new(ColumnData::Integer(out)))
        }
        UnaryOp::Not => match operand.data() {
            ColumnData::Logical(v) => Ok(Column::new(ColumnData::Logical(
                v.iter().map(|b| b.map(|b| !b)).collect(),
            ))),
            other => Err(FrameError::Evaluation(format!(
                "invalid {} argument to logical negation",
                other.column_type()
            ))),
        },
    }
}

fn binary(op: BinaryOp, left: &Column, right: &Column) -> FrameResult<Column> {
    let len = recycled_len(left.len(), right.len())?;
    match op {
        BinaryOp::Add => arithmetic(left, right, len, "+", Some(i64::checked_add), |a, b| a + b),
        BinaryOp::Subtract => {
            arithmetic(left, right, len, "-", Some(i64::checked_sub), |a, b| a - b)
        }
        BinaryOp::Multiply => {
            arithmetic(left, right, len, "*", Some(i64::checked_mul), |a, b| a * b)
        }
        BinaryOp::Divide => arithmetic(left, right, len, "/", None, |a, b| a / b),
        BinaryOp::Power => arithmetic(left, right, len, "^", None, f64::powf),
        BinaryOp::Equals => comparison(left, right, len, Ordering::is_eq),
        BinaryOp::NotEquals => comparison(left, right, len, Ordering::is_ne),
        BinaryOp::Less => comparison(left, right, len, Ordering::is_lt),
        BinaryOp::LessEquals => comparison(left, right, len, Ordering::is_le),
        BinaryOp::Greater => comparison(left, right, len, Ordering::is_gt),
        BinaryOp::GreaterEquals => comparison(left, right, len, Ordering::is_ge),
        BinaryOp::And | BinaryOp::Or => logical(op, left, right, len),
    }
}

/// Integer inputs stay integer when `int_op` is given; overflow yields null.
fn arithmetic(
    left: &Column,
    right: &Column,
    len: usize,
    symbol: &str,
    int_op: Option<fn(i64, i64) -> Option<i64>>,
    float_op: fn(f64, f64) -> f64,
) -> FrameResult<Column> {
    let context = format!("`{symbol}`");
    let a = Numeric::of(left, &context)?;
    let b = Numeric::of(right, &context)?;

    if let (Some(int_op), false, false) = (int_op, a.is_double(), b.is_double()) {
        let mut overflowed = 0usize;
        let out: Vec<Option<i64>> = (0..len)
            .map(|row| match (a.int(row), b.int(row)) {
                (Some(x), Some(y)) => {
                    let result = int_op(x, y);
                    if result.is_none() {
                        overflowed += 1;
                    }
                    result
                }
                _ => None,
            })
            .collect();
        if overflowed > 0 {
            warn!("integer overflow in `{symbol}` produced {overflowed} null value(s)");
        }
        return Ok(Column::new(ColumnData::Integer(out)));
    }

    let out = (0..len)
        .map(|row| Some(float_op(a.float(row)?, b.float(row)?)))
        .collect();
    Ok(Column::new(ColumnData::Double(out)))
}

fn comparison(
    left: &Column,
    right: &Column,
    len: usize,
    test: fn(Ordering) -> bool,
) -> FrameResult<Column> {
    let out: Vec<Option<bool>> = match (left.data(), right.data()) {
        (ColumnData::Text(a), ColumnData::Text(b)) => (0..len)
            .map(|row| {
                let x = a[recycle(a.len(), row)].as_ref()?;
                let y = b[recycle(b.len(), row)].as_ref()?;
                Some(test(x.cmp(y)))
            })
            .collect(),
        (l, r) if l.column_type().is_numeric() && r.column_type().is_numeric() => {
            let a = Numeric::of(left, "comparison")?;
            let b = Numeric::of(right, "comparison")?;
            if a.is_double() || b.is_double() {
                (0..len)
                    .map(|row| Some(test(a.float(row)?.partial_cmp(&b.float(row)?)?)))
                    .collect()
            } else {
                (0..len)
                    .map(|row| Some(test(a.int(row)?.cmp(&b.int(row)?))))
                    .collect()
            }
        }
        (l, r) => {
            return Err(FrameError::Evaluation(format!(
                "cannot compare {} with {}",
                l.column_type(),
                r.column_type()
            )))
        }
    };
    Ok(Column::new(ColumnData::Logical(out)))
}

fn logical(op: BinaryOp, left: &Column, right: &Column, len: usize) -> FrameResult<Column> {
    let (ColumnData::Logical(a), ColumnData::Logical(b)) = (left.data(), right.data()) else {
        return Err(FrameError::Evaluation(format!(
            "{op:?} expects logical operands, got {} and {}",
            left.column_type(),
            right.column_type()
        )));
    };
    let out = (0..len)
        .map(|row| {
            let x = a[recycle(a.len(), row)];
            let y = b[recycle(b.len(), row)];
            match op {
                BinaryOp::And => match (x, y) {
                    (Some(false), _) | (_, Some(false)) => Some(false),
                    (Some(true), Some(true)) => Some(true),
                    _ => None,
                },
                _ => match (x, y) {
                    (Some(true), _) | (_, Some(true)) => Some(true),
                    (Some(false), Some(false)) => Some(false),
                    _ => None,
                },
            }
        })
        .collect();
    Ok(Column::new(ColumnData::Logical(out)))
}

fn call(func: Function, args: &[Expr], env: &Env) -> FrameResult<Column> {
    let arity = if func == Function::IfElse { 3 } else { 1 };
    if args.len() != arity {
        return Err(FrameError::Evaluation(format!(
            "{func:?} expects {arity} argument(s), got {}",
            args.len()
        )));
    }
    let values = args
        .iter()
        .map(|arg| eval(arg, env))
        .collect::<FrameResult<Vec<_>>>()?;

    let reduce = |op: AggregateOp| -> FrameResult<Column> {
        Ok(Column::scalar(op.reduce(&values[0])?))
    };
    match func {
        Function::Sum => reduce(AggregateOp::Sum),
        Function::Mean => reduce(AggregateOp::Mean),
        Function::Min => reduce(AggregateOp::Min),
        Function::Max => reduce(AggregateOp::Max),
        Function::Length => reduce(AggregateOp::Count),
        Function::Abs => {
            let v = Numeric::of(&values[0], "Abs")?;
            let len = values[0].len();
            if v.is_double() {
                let out = (0..len).map(|row| v.float(row).map(f64::abs)).collect();
                Ok(Column::new(ColumnData::Double(out)))
            } else {
                let out = (0..len)
                    .map(|row| v.int(row).and_then(i64::checked_abs))
                    .collect();
                Ok(Column::new(ColumnData::Integer(out)))
            }
        }
        Function::Sqrt => {
            let v = Numeric::of(&values[0], "Sqrt")?;
            let out = (0..values[0].len())
                .map(|row| v.float(row).map(f64::sqrt))
                .collect();
            Ok(Column::new(ColumnData::Double(out)))
        }
        Function::IsNull => {
            let target = &values[0];
            let out = (0..target.len())
                .map(|row| Some(target.is_null(row)))
                .collect();
            Ok(Column::new(ColumnData::Logical(out)))
        }
        Function::IfElse => if_else(&values[0], &values[1], &values[2]),
    }
}

fn if_else(condition: &Column, yes: &Column, no: &Column) -> FrameResult<Column> {
    let ColumnData::Logical(flags) = condition.data() else {
        return Err(FrameError::Evaluation(format!(
            "IfElse condition must be logical, got {}",
            condition.column_type()
        )));
    };
    let len = recycled_len(recycled_len(flags.len(), yes.len())?, no.len())?;
    let mut out = Vec::with_capacity(len);
    for row in 0..len {
        let value = match flags[recycle(flags.len(), row)] {
            Some(true) => yes.get(recycle(yes.len(), row)),
            Some(false) => no.get(recycle(no.len(), row)),
            None => Some(Value::Null),
        };
        out.push(value.unwrap_or(Value::Null));
    }
    // Keep the branch type even when every selected value is null.
    let column_type = match (yes.column_type(), no.column_type()) {
        (a, b) if a == b => a,
        (ColumnType::Integer, ColumnType::Double) | (ColumnType::Double, ColumnType::Integer) => {
            ColumnType::Double
        }
        (a, b) => {
            return Err(FrameError::Evaluation(format!(
                "IfElse branches have different types {a} and {b}"
            )))
        }
    };
    Ok(Column::from_values_typed(column_type, out)?)
}
