use crate::error::{FrameError, FrameResult};
use crate::eval::{Env, Evaluator, Expr, ExprEvaluator};
use crate::table::Table;
use log::{debug, trace};
use tidyframe_columnar::Column;

impl Table {
    pub fn mutate<S: AsRef<str>>(&self, assignments: &[(S, Expr)]) -> FrameResult<Table> {
        self.mutate_with(&ExprEvaluator, assignments)
    }

    /// Evaluate `assignments` left to right against the table's columns and bind each result.
    ///
    /// Each expression sees the input columns plus every earlier assignment. A length-1 result is
    /// broadcast to the row count. Columns that are not assigned keep their storage, and so does
    /// a column assigned to itself unchanged; every other assigned column is whatever new store
    /// the evaluator produced. The attribute set is only rebuilt when new names appear.
    pub fn mutate_with<E, S>(
        &self,
        evaluator: &E,
        assignments: &[(S, E::Expr)],
    ) -> FrameResult<Table>
    where
        E: Evaluator,
        S: AsRef<str>,
    {
        let rows = self.row_count();
        let mut env = Env::from_table(self);
        let mut names_changed = false;
        for (name, expr) in assignments {
            let name = name.as_ref();
            let value = fit_to_rows(name, evaluator.evaluate(expr, &env)?, rows)?;
            trace!("mutate: bound `{name}` ({}, {} rows)", value.column_type(), value.len());
            names_changed |= env.bind(name, value);
        }

        let (names, columns) = env.into_parts();
        let attrs = if names_changed {
            self.attributes().derive(|set| set.set_names(names))?
        } else {
            self.attributes().clone()
        };
        let out = Table::assemble(columns, attrs, rows)?;

        let shared = out
            .iter()
            .filter(|(name, col)| {
                self.column(name)
                    .map(|input| input.shares_storage(col))
                    .unwrap_or(false)
            })
            .count();
        debug!(
            "mutate: {shared} of {} columns shared with input, {} assignment(s)",
            out.column_count(),
            assignments.len()
        );
        Ok(out)
    }
}

fn fit_to_rows(name: &str, value: Column, rows: usize) -> FrameResult<Column> {
    match value.len() {
        n if n == rows => Ok(value),
        1 => Ok(value.broadcast(rows)?),
        n => Err(FrameError::shape(name, rows, n)),
    }
}
