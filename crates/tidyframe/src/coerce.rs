use crate::error::{FrameError, FrameResult, StructuralCheck};
use crate::table::Table;
use log::debug;
use tidyframe_columnar::{Column, Value};

/// One untyped entry of a [`NamedList`].
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    /// A flat or list-typed sequence.
    Column(Column),
    /// A nested named aggregate.
    Record(NamedList),
    Null,
}

impl RawValue {
    pub fn list(values: Vec<Value>) -> Self {
        RawValue::Column(Column::list(values))
    }

    fn kind(&self) -> &'static str {
        match self {
            RawValue::Column(_) => "sequence",
            RawValue::Record(_) => "nested record",
            RawValue::Null => "missing value",
        }
    }
}

impl From<Column> for RawValue {
    fn from(column: Column) -> Self {
        RawValue::Column(column)
    }
}

impl From<NamedList> for RawValue {
    fn from(list: NamedList) -> Self {
        RawValue::Record(list)
    }
}

impl<T> From<Vec<T>> for RawValue
where
    Column: From<Vec<T>>,
{
    fn from(values: Vec<T>) -> Self {
        RawValue::Column(Column::from(values))
    }
}

/// An ordered, named, heterogeneous aggregate. Names may be empty or repeated; [`coerce`]
/// decides whether it is a valid table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NamedList {
    entries: Vec<(String, RawValue)>,
}

impl NamedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<RawValue>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> + '_ {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<S: Into<String>, V: Into<RawValue>> FromIterator<(S, V)> for NamedList {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Validate `input` and wrap its sequences as a [`Table`] without copying them.
///
/// Checks run in order, each over every entry: names are present, values are sequences, lengths
/// agree. The first failure is reported with the entry's name, or `#position` when it has none.
pub fn coerce(input: &NamedList) -> FrameResult<Table> {
    for (pos, (name, _)) in input.entries.iter().enumerate() {
        if name.is_empty() {
            return Err(structural(
                StructuralCheck::MissingName,
                label(pos, name),
                "entry has no name".to_string(),
            ));
        }
    }

    let mut columns = Vec::with_capacity(input.len());
    for (pos, (name, value)) in input.entries.iter().enumerate() {
        match value {
            RawValue::Column(col) => columns.push((name.as_str(), col.clone())),
            other => {
                return Err(structural(
                    StructuralCheck::UnsupportedValue,
                    label(pos, name),
                    format!("expected a flat or list sequence, got a {}", other.kind()),
                ))
            }
        }
    }

    let rows = columns.first().map_or(0, |(_, col)| col.len());
    if let Some((name, col)) = columns.iter().find(|(_, col)| col.len() != rows) {
        return Err(structural(
            StructuralCheck::LengthMismatch,
            (*name).to_string(),
            format!("length {}, expected {rows}", col.len()),
        ));
    }

    let table = Table::with_rows(columns, rows)?;
    debug!(
        "coerce: wrapped {} columns of {rows} rows without copying",
        table.column_count()
    );
    Ok(table)
}

fn label(pos: usize, name: &str) -> String {
    if name.is_empty() {
        format!("#{}", pos + 1)
    } else {
        name.to_string()
    }
}

fn structural(check: StructuralCheck, entry: String, detail: String) -> FrameError {
    FrameError::Structural {
        check,
        entry,
        detail,
    }
}

/// Anything that can be viewed as a [`Table`].
pub trait IntoTable {
    fn into_table(self) -> FrameResult<Table>;
}

/// Already a table: the same handle comes back.
impl IntoTable for Table {
    fn into_table(self) -> FrameResult<Table> {
        Ok(self)
    }
}

impl IntoTable for &Table {
    fn into_table(self) -> FrameResult<Table> {
        Ok(self.clone())
    }
}

impl IntoTable for NamedList {
    fn into_table(self) -> FrameResult<Table> {
        coerce(&self)
    }
}

impl IntoTable for &NamedList {
    fn into_table(self) -> FrameResult<Table> {
        coerce(self)
    }
}

impl TryFrom<&NamedList> for Table {
    type Error = FrameError;

    fn try_from(input: &NamedList) -> FrameResult<Table> {
        coerce(input)
    }
}

impl TryFrom<NamedList> for Table {
    type Error = FrameError;

    fn try_from(input: NamedList) -> FrameResult<Table> {
        coerce(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_entries_are_labeled_by_position() {
        assert_eq!(label(0, ""), "#1");
        assert_eq!(label(4, "x"), "x");
    }
}
