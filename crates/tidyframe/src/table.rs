use crate::error::{FrameError, FrameResult, StructuralCheck};
use std::fmt;
use std::sync::Arc;
use tidyframe_columnar::{Attributes, Column, ColumnError, StorageId, Value};

/// An immutable table: named column handles in order, one attribute handle and a row count.
///
/// `Table` is itself a cheap shared handle. Cloning it shares everything, including its own
/// identity; every transformation returns a table with a new identity.
#[derive(Clone)]
pub struct Table {
    inner: Arc<TableInner>,
}

struct TableInner {
    columns: Vec<Column>,
    attrs: Attributes,
    rows: usize,
}

impl Table {
    /// Build a table from named columns. With no columns the table has zero rows; use
    /// [`Table::with_rows`] to give a column-less table a row count.
    pub fn new<S: Into<String>>(columns: Vec<(S, Column)>) -> FrameResult<Self> {
        let rows = columns.first().map_or(0, |(_, col)| col.len());
        Self::with_rows(columns, rows)
    }

    pub fn with_rows<S: Into<String>>(columns: Vec<(S, Column)>, rows: usize) -> FrameResult<Self> {
        let (names, columns): (Vec<String>, Vec<Column>) = columns
            .into_iter()
            .map(|(name, col)| (name.into(), col))
            .unzip();
        let attrs = Attributes::from_names(names)?;
        Self::assemble(columns, attrs, rows)
    }

    /// Build a table around an existing attribute handle.
    ///
    /// The names given alongside the columns must match `attrs` exactly and in order.
    pub fn from_parts<S: AsRef<str>>(
        columns: Vec<(S, Column)>,
        attrs: Attributes,
        rows: usize,
    ) -> FrameResult<Self> {
        for (idx, ((name, _), expected)) in columns.iter().zip(attrs.names()).enumerate() {
            if name.as_ref() != expected {
                return Err(FrameError::Structural {
                    check: StructuralCheck::NameOrder,
                    entry: name.as_ref().to_string(),
                    detail: format!("attribute name at position {} is `{expected}`", idx + 1),
                });
            }
        }
        let columns = columns.into_iter().map(|(_, col)| col).collect();
        Self::assemble(columns, attrs, rows)
    }

    pub fn empty() -> Self {
        Self {
            inner: Arc::new(TableInner {
                columns: Vec::new(),
                attrs: Attributes::new(Default::default()),
                rows: 0,
            }),
        }
    }

    /// The single gate every table passes through. Checks every invariant before the table
    /// becomes observable.
    pub(crate) fn assemble(
        columns: Vec<Column>,
        attrs: Attributes,
        rows: usize,
    ) -> FrameResult<Self> {
        if columns.len() != attrs.names().len() {
            return Err(FrameError::Structural {
                check: StructuralCheck::NameOrder,
                entry: format!("#{}", columns.len().min(attrs.names().len()) + 1),
                detail: format!(
                    "{} columns but {} attribute names",
                    columns.len(),
                    attrs.names().len()
                ),
            });
        }
        for (name, col) in attrs.names().iter().zip(&columns) {
            if col.len() != rows {
                return Err(FrameError::shape(name.as_str(), rows, col.len()));
            }
        }
        if let Some(missing) = attrs.groups().iter().find(|g| attrs.position(g).is_none()) {
            return Err(FrameError::unknown_column(missing.as_str()));
        }

        Ok(Self {
            inner: Arc::new(TableInner {
                columns,
                attrs,
                rows,
            }),
        })
    }

    pub fn row_count(&self) -> usize {
        self.inner.rows
    }

    pub fn column_count(&self) -> usize {
        self.inner.columns.len()
    }

    pub fn names(&self) -> &[String] {
        self.inner.attrs.names()
    }

    pub fn columns(&self) -> &[Column] {
        &self.inner.columns
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.inner.attrs.position(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn column(&self, name: &str) -> FrameResult<&Column> {
        self.position(name)
            .and_then(|idx| self.inner.columns.get(idx))
            .ok_or_else(|| FrameError::unknown_column(name))
    }

    pub fn column_at(&self, idx: usize) -> Option<&Column> {
        self.inner.columns.get(idx)
    }

    pub fn value(&self, row: usize, column: &str) -> FrameResult<Value> {
        let col = self.column(column)?;
        col.get(row).ok_or_else(|| {
            ColumnError::IndexOutOfBounds {
                index: row,
                len: self.row_count(),
            }
            .into()
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> + '_ {
        self.names()
            .iter()
            .map(String::as_str)
            .zip(self.inner.columns.iter())
    }

    pub fn attributes(&self) -> &Attributes {
        &self.inner.attrs
    }

    /// Extra attribute lookup.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.inner.attrs.get(key)
    }

    pub fn groups(&self) -> &[String] {
        self.inner.attrs.groups()
    }

    pub fn is_grouped(&self) -> bool {
        !self.groups().is_empty()
    }

    pub fn identity(&self) -> StorageId {
        StorageId::of(&self.inner)
    }

    /// Columns whose storage is not shared with any other live handle.
    pub fn exclusive_columns(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, col)| col.ref_count() == 1)
            .map(|(name, _)| name)
            .collect()
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("rows", &self.row_count())
            .field("names", &self.names())
            .field("groups", &self.groups())
            .field("identity", &self.identity())
            .finish()
    }
}

/// Content equality: same names, groups, extras and column contents.
impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.row_count() == other.row_count()
                && *self.inner.attrs == *other.inner.attrs
                && self.inner.columns == other.inner.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidyframe_columnar::AttributeSet;

    #[test]
    fn assemble_rejects_unknown_group_keys() {
        let mut set = AttributeSet::new(vec!["a".into()]).unwrap();
        set.set_groups(vec!["b".into()]);
        let err = Table::assemble(vec![Column::from(vec![1i64])], Attributes::new(set), 1)
            .unwrap_err();
        assert_eq!(err, FrameError::unknown_column("b"));
    }

    #[test]
    fn clone_shares_table_identity() {
        let table = Table::new(vec![("a", Column::from(vec![1i64, 2]))]).unwrap();
        let copy = table.clone();
        assert_eq!(table.identity(), copy.identity());
        assert_eq!(table, copy);
    }
}
