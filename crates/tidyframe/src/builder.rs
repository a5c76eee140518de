use crate::error::{FrameError, FrameResult};
use crate::eval::{Env, Evaluator, Expr, ExprEvaluator};
use crate::table::Table;
use log::{debug, trace};
use std::collections::HashSet;
use tidyframe_columnar::{Attributes, Column};

/// Builds a [`Table`] from `(name, expression)` pairs evaluated in order.
///
/// Each expression sees every column bound before it. The row count is fixed by
/// [`TableBuilder::rows`] or by the first result whose length is not 1; length-1 results
/// (including earlier ones) are broadcast to it.
///
/// ```
/// use tidyframe::{col, lit, Expr, TableBuilder};
///
/// let mut builder = TableBuilder::new();
/// builder
///     .push("x", Expr::range(1, 5))
///     .push("y", col("x").pow(lit(2)));
/// let table = builder.finalize().unwrap();
/// assert_eq!(table.row_count(), 5);
/// ```
pub struct TableBuilder<E: Evaluator = ExprEvaluator> {
    evaluator: E,
    pending: Vec<(String, E::Expr)>,
    rows: Option<usize>,
}

impl TableBuilder<ExprEvaluator> {
    pub fn new() -> Self {
        Self::with_evaluator(ExprEvaluator)
    }
}

impl Default for TableBuilder<ExprEvaluator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Evaluator> TableBuilder<E> {
    pub fn with_evaluator(evaluator: E) -> Self {
        Self {
            evaluator,
            pending: Vec::new(),
            rows: None,
        }
    }

    /// Queue a column. Nothing is evaluated until [`TableBuilder::finalize`].
    pub fn push(&mut self, name: impl Into<String>, expr: impl Into<E::Expr>) -> &mut Self {
        self.pending.push((name.into(), expr.into()));
        self
    }

    /// Fix the row count up front instead of taking it from the first column.
    pub fn rows(&mut self, rows: usize) -> &mut Self {
        self.rows = Some(rows);
        self
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn finalize(self) -> FrameResult<Table> {
        let mut seen = HashSet::with_capacity(self.pending.len());
        for (name, _) in &self.pending {
            if !seen.insert(name.as_str()) {
                return Err(FrameError::duplicate_name(name.as_str()));
            }
        }

        let mut env = Env::with_rows(self.rows);
        for (name, expr) in &self.pending {
            let value = self.evaluator.evaluate(expr, &env)?;
            let len = value.len();
            let value = match env.rows() {
                Some(rows) if len == rows => value,
                Some(rows) if len == 1 && rows > 1 => value.broadcast(rows)?,
                Some(rows) => return Err(FrameError::shape(name.as_str(), rows, len)),
                None if len == 1 => value,
                None => {
                    establish_rows(&mut env, name, len)?;
                    value
                }
            };
            trace!("build: bound `{name}` ({}, {} rows)", value.column_type(), value.len());
            env.bind(name, value);
        }

        let rows = match env.rows() {
            Some(rows) => rows,
            None if env.is_empty() => 0,
            None => 1,
        };
        let (names, columns) = env.into_parts();
        let attrs = Attributes::from_names(names)?;
        let table = Table::assemble(columns, attrs, rows)?;
        debug!(
            "build: {} columns over {} rows",
            table.column_count(),
            table.row_count()
        );
        Ok(table)
    }
}

/// Fix the row count at `rows`, set by column `column`, and stretch the length-1 columns bound
/// so far. Earlier columns cannot stretch to zero rows, so that case names `column` instead.
fn establish_rows(env: &mut Env, column: &str, rows: usize) -> FrameResult<()> {
    if rows == 0 && !env.is_empty() {
        return Err(FrameError::shape(column, 1, 0));
    }
    let earlier: Vec<(String, Column)> = env
        .iter()
        .map(|(name, col)| (name.to_string(), col.clone()))
        .collect();
    for (name, col) in earlier {
        env.bind(&name, col.broadcast(rows)?);
    }
    env.set_rows(rows);
    Ok(())
}

impl<E: Evaluator> std::fmt::Debug for TableBuilder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.pending.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("TableBuilder")
            .field("pending", &names)
            .field("rows", &self.rows)
            .finish()
    }
}

/// Build a table from `(name, expression)` pairs with the built-in evaluator.
pub fn build<S: Into<String>>(columns: Vec<(S, Expr)>) -> FrameResult<Table> {
    let mut builder = TableBuilder::new();
    for (name, expr) in columns {
        builder.push(name, expr);
    }
    builder.finalize()
}
