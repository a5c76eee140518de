use crate::error::{FrameError, FrameResult};
use crate::eval::{Env, Evaluator, Expr, ExprEvaluator};
use crate::table::Table;
use log::debug;
use tidyframe_columnar::{Attributes, ColumnData, ColumnError};

impl Table {
    /// Gather `rows` from every column into new storage.
    pub(crate) fn take_rows(&self, rows: &[usize], attrs: Attributes) -> FrameResult<Table> {
        let columns = self
            .columns()
            .iter()
            .map(|col| col.take(rows))
            .collect::<Result<Vec<_>, _>>()?;
        Table::assemble(columns, attrs, rows.len())
    }

    /// Keep the rows at `rows`, in that order. Indices may repeat.
    pub fn slice(&self, rows: &[usize]) -> FrameResult<Table> {
        let len = self.row_count();
        if let Some(&index) = rows.iter().find(|&&row| row >= len) {
            return Err(ColumnError::IndexOutOfBounds { index, len }.into());
        }
        self.take_rows(rows, self.attributes().rebuilt())
    }

    pub fn filter(&self, predicate: &Expr) -> FrameResult<Table> {
        self.filter_with(&ExprEvaluator, predicate)
    }

    /// Keep the rows where `predicate` is true; null drops the row. Every column is rebuilt and
    /// grouping keys are kept.
    pub fn filter_with<E: Evaluator>(
        &self,
        evaluator: &E,
        predicate: &E::Expr,
    ) -> FrameResult<Table> {
        let env = Env::from_table(self);
        let mask = evaluator.evaluate(predicate, &env)?;
        let ColumnData::Logical(flags) = mask.data() else {
            return Err(FrameError::Evaluation(format!(
                "filter predicate must be logical, got {}",
                mask.column_type()
            )));
        };

        let rows = self.row_count();
        let keep: Vec<usize> = match flags.len() {
            n if n == rows => (0..rows).filter(|&row| flags[row] == Some(true)).collect(),
            1 if flags[0] == Some(true) => (0..rows).collect(),
            1 => Vec::new(),
            n => return Err(FrameError::shape("filter predicate", rows, n)),
        };

        let out = self.take_rows(&keep, self.attributes().rebuilt())?;
        debug!("filter: kept {} of {rows} rows", out.row_count());
        Ok(out)
    }
}
