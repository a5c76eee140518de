use crate::error::{FrameError, FrameResult};
use crate::options::SortKey;
use crate::table::Table;
use log::debug;
use std::cmp::Ordering;

impl Table {
    /// Reorder rows by `keys`, earlier keys first. The sort is stable, so ties keep their input
    /// order. Every column is rebuilt, even when the order does not change.
    pub fn arrange(&self, keys: &[SortKey]) -> FrameResult<Table> {
        let mut orders = Vec::with_capacity(keys.len());
        for key in keys {
            let col = self.column(&key.column)?;
            let order = col.row_order().map_err(|_| FrameError::Comparison {
                column: key.column.clone(),
                column_type: col.column_type(),
            })?;
            orders.push((order, key.descending));
        }

        let mut permutation: Vec<usize> = (0..self.row_count()).collect();
        permutation.sort_by(|&a, &b| {
            orders
                .iter()
                .map(|(order, descending)| order.compare(a, b, *descending))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        });

        let out = self.take_rows(&permutation, self.attributes().rebuilt())?;
        debug!(
            "arrange: rebuilt {} columns over {} rows by {} key(s)",
            out.column_count(),
            out.row_count(),
            keys.len()
        );
        Ok(out)
    }
}
