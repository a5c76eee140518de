use crate::error::{ColumnError, ColumnResult};
use crate::identity::StorageId;
use crate::types::{ColumnType, KeyPart, Value};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Backing storage of one column. Atomic element types carry per-row validity as `Option`.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    Logical(Vec<Option<bool>>),
    Integer(Vec<Option<i64>>),
    Double(Vec<Option<f64>>),
    Text(Vec<Option<Arc<str>>>),
    List(Vec<Value>),
}

impl ColumnData {
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Logical(_) => ColumnType::Logical,
            ColumnData::Integer(_) => ColumnType::Integer,
            ColumnData::Double(_) => ColumnType::Double,
            ColumnData::Text(_) => ColumnType::Text,
            ColumnData::List(_) => ColumnType::List,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Logical(v) => v.len(),
            ColumnData::Integer(v) => v.len(),
            ColumnData::Double(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::List(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, row: usize) -> Option<Value> {
        Some(match self {
            ColumnData::Logical(v) => (*v.get(row)?).into(),
            ColumnData::Integer(v) => (*v.get(row)?).into(),
            ColumnData::Double(v) => (*v.get(row)?).into(),
            ColumnData::Text(v) => v.get(row)?.clone().map_or(Value::Null, Value::Text),
            ColumnData::List(v) => v.get(row)?.clone(),
        })
    }

    fn is_null(&self, row: usize) -> bool {
        match self {
            ColumnData::Logical(v) => v.get(row).map_or(true, Option::is_none),
            ColumnData::Integer(v) => v.get(row).map_or(true, Option::is_none),
            ColumnData::Double(v) => v.get(row).map_or(true, Option::is_none),
            ColumnData::Text(v) => v.get(row).map_or(true, Option::is_none),
            ColumnData::List(v) => v.get(row).map_or(true, Value::is_null),
        }
    }
}

/// Shared handle to an immutable column store.
///
/// Cloning a `Column` never copies elements; it bumps the reference count of the shared storage.
/// Every operation that changes elements (`take`, `broadcast`, constructors) allocates a new
/// store, so a store observed through one handle never changes.
#[derive(Clone)]
pub struct Column {
    data: Arc<ColumnData>,
}

impl Column {
    pub fn new(data: ColumnData) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    /// Wrap an existing shared store without copying it.
    pub fn from_shared(data: Arc<ColumnData>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn shared(&self) -> &Arc<ColumnData> {
        &self.data
    }

    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read one element; `None` when `row` is out of bounds.
    pub fn get(&self, row: usize) -> Option<Value> {
        self.data.get(row)
    }

    pub fn is_null(&self, row: usize) -> bool {
        self.data.is_null(row)
    }

    pub fn values(&self) -> Vec<Value> {
        (0..self.len()).filter_map(|row| self.get(row)).collect()
    }

    pub fn identity(&self) -> StorageId {
        StorageId::of(&self.data)
    }

    /// Number of live handles (across all tables) sharing this store.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.data)
    }

    pub fn shares_storage(&self, other: &Column) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// A length-1 column holding `value`. Nulls become a logical column.
    pub fn scalar(value: Value) -> Self {
        let data = match value {
            Value::Null => ColumnData::Logical(vec![None]),
            Value::Logical(b) => ColumnData::Logical(vec![Some(b)]),
            Value::Integer(i) => ColumnData::Integer(vec![Some(i)]),
            Value::Double(d) => ColumnData::Double(vec![Some(d)]),
            Value::Text(s) => ColumnData::Text(vec![Some(s)]),
            other @ Value::List(_) => ColumnData::List(vec![other]),
        };
        Column::new(data)
    }

    /// A list column: each element is an arbitrary nested value.
    pub fn list(values: Vec<Value>) -> Self {
        Column::new(ColumnData::List(values))
    }

    /// Build a column from loose values, inferring the element type from the first non-null
    /// value. Integers and doubles mix into a double column; all-null input is logical.
    pub fn from_values(values: Vec<Value>) -> ColumnResult<Self> {
        let column_type = infer_type(&values)?;
        Self::from_values_typed(column_type, values)
    }

    pub fn from_values_typed(column_type: ColumnType, values: Vec<Value>) -> ColumnResult<Self> {
        let data = match column_type {
            ColumnType::Logical => ColumnData::Logical(collect_typed(values, column_type, |v| {
                match v {
                    Value::Logical(b) => Some(b),
                    _ => None,
                }
            })?),
            ColumnType::Integer => ColumnData::Integer(collect_typed(values, column_type, |v| {
                match v {
                    Value::Integer(i) => Some(i),
                    _ => None,
                }
            })?),
            ColumnType::Double => ColumnData::Double(collect_typed(values, column_type, |v| {
                match v {
                    Value::Double(d) => Some(d),
                    Value::Integer(i) => Some(i as f64),
                    _ => None,
                }
            })?),
            ColumnType::Text => ColumnData::Text(collect_typed(values, column_type, |v| {
                match v {
                    Value::Text(s) => Some(s),
                    _ => None,
                }
            })?),
            ColumnType::List => ColumnData::List(values),
        };
        Ok(Column::new(data))
    }

    /// Gather rows by index into a new store.
    pub fn take(&self, indices: &[usize]) -> ColumnResult<Column> {
        let len = self.len();
        if let Some(&index) = indices.iter().find(|&&index| index >= len) {
            return Err(ColumnError::IndexOutOfBounds { index, len });
        }
        let data = match &*self.data {
            ColumnData::Logical(v) => ColumnData::Logical(gather(v, indices)),
            ColumnData::Integer(v) => ColumnData::Integer(gather(v, indices)),
            ColumnData::Double(v) => ColumnData::Double(gather(v, indices)),
            ColumnData::Text(v) => ColumnData::Text(gather(v, indices)),
            ColumnData::List(v) => ColumnData::List(gather(v, indices)),
        };
        Ok(Column::new(data))
    }

    /// Repeat the single element of a length-1 column `len` times into a new store.
    pub fn broadcast(&self, len: usize) -> ColumnResult<Column> {
        if self.len() != 1 {
            return Err(ColumnError::NotScalar { len: self.len() });
        }
        let data = match &*self.data {
            ColumnData::Logical(v) => ColumnData::Logical(vec![v[0]; len]),
            ColumnData::Integer(v) => ColumnData::Integer(vec![v[0]; len]),
            ColumnData::Double(v) => ColumnData::Double(vec![v[0]; len]),
            ColumnData::Text(v) => ColumnData::Text(vec![v[0].clone(); len]),
            ColumnData::List(v) => ColumnData::List(vec![v[0].clone(); len]),
        };
        Ok(Column::new(data))
    }

    /// Validate once that this column is ordered, then compare rows infallibly.
    pub fn row_order(&self) -> ColumnResult<RowOrder<'_>> {
        if !self.column_type().is_ordered() {
            return Err(ColumnError::Unordered(self.column_type()));
        }
        Ok(RowOrder { data: &self.data })
    }

    pub fn key_at(&self, row: usize) -> ColumnResult<KeyPart> {
        let len = self.len();
        let out_of_bounds = || ColumnError::IndexOutOfBounds { index: row, len };
        Ok(match &*self.data {
            ColumnData::Logical(v) => v
                .get(row)
                .ok_or_else(out_of_bounds)?
                .map_or(KeyPart::Null, KeyPart::Logical),
            ColumnData::Integer(v) => v
                .get(row)
                .ok_or_else(out_of_bounds)?
                .map_or(KeyPart::Null, KeyPart::Integer),
            ColumnData::Double(v) => v
                .get(row)
                .ok_or_else(out_of_bounds)?
                .map_or(KeyPart::Null, |d| KeyPart::Double(OrderedFloat(d))),
            ColumnData::Text(v) => v
                .get(row)
                .ok_or_else(out_of_bounds)?
                .clone()
                .map_or(KeyPart::Null, KeyPart::Text),
            ColumnData::List(_) => return Err(ColumnError::Unordered(ColumnType::List)),
        })
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("type", &self.column_type())
            .field("len", &self.len())
            .field("identity", &self.identity())
            .field("data", &self.data)
            .finish()
    }
}

/// Content equality; two handles to the same store are trivially equal.
impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.shares_storage(other) || *self.data == *other.data
    }
}

impl From<ColumnData> for Column {
    fn from(data: ColumnData) -> Self {
        Column::new(data)
    }
}

impl From<Vec<bool>> for Column {
    fn from(values: Vec<bool>) -> Self {
        Column::new(ColumnData::Logical(values.into_iter().map(Some).collect()))
    }
}

impl From<Vec<Option<bool>>> for Column {
    fn from(values: Vec<Option<bool>>) -> Self {
        Column::new(ColumnData::Logical(values))
    }
}

impl From<Vec<i64>> for Column {
    fn from(values: Vec<i64>) -> Self {
        Column::new(ColumnData::Integer(values.into_iter().map(Some).collect()))
    }
}

impl From<Vec<Option<i64>>> for Column {
    fn from(values: Vec<Option<i64>>) -> Self {
        Column::new(ColumnData::Integer(values))
    }
}

impl From<Vec<f64>> for Column {
    fn from(values: Vec<f64>) -> Self {
        Column::new(ColumnData::Double(values.into_iter().map(Some).collect()))
    }
}

impl From<Vec<Option<f64>>> for Column {
    fn from(values: Vec<Option<f64>>) -> Self {
        Column::new(ColumnData::Double(values))
    }
}

impl From<Vec<&str>> for Column {
    fn from(values: Vec<&str>) -> Self {
        Column::new(ColumnData::Text(
            values.into_iter().map(|s| Some(Arc::from(s))).collect(),
        ))
    }
}

impl From<Vec<String>> for Column {
    fn from(values: Vec<String>) -> Self {
        Column::new(ColumnData::Text(
            values.into_iter().map(|s| Some(Arc::from(s))).collect(),
        ))
    }
}

impl From<Vec<Option<&str>>> for Column {
    fn from(values: Vec<Option<&str>>) -> Self {
        Column::new(ColumnData::Text(
            values.into_iter().map(|s| s.map(Arc::from)).collect(),
        ))
    }
}

/// Row comparator over a column already known to be ordered.
#[derive(Clone, Copy, Debug)]
pub struct RowOrder<'a> {
    data: &'a ColumnData,
}

impl RowOrder<'_> {
    /// Compare rows `a` and `b`. Nulls sort last regardless of direction.
    ///
    /// Both rows must be in bounds.
    pub fn compare(&self, a: usize, b: usize, descending: bool) -> Ordering {
        match self.data {
            ColumnData::Logical(v) => compare_nullable(v[a], v[b], descending, |x, y| x.cmp(&y)),
            ColumnData::Integer(v) => compare_nullable(v[a], v[b], descending, |x, y| x.cmp(&y)),
            ColumnData::Double(v) => compare_nullable(v[a], v[b], descending, |x, y| {
                OrderedFloat(x).cmp(&OrderedFloat(y))
            }),
            ColumnData::Text(v) => {
                compare_nullable(v[a].as_ref(), v[b].as_ref(), descending, |x, y| x.cmp(y))
            }
            // `row_order` rejects list columns.
            ColumnData::List(_) => Ordering::Equal,
        }
    }
}

fn compare_nullable<T>(
    a: Option<T>,
    b: Option<T>,
    descending: bool,
    cmp: impl FnOnce(T, T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let ord = cmp(x, y);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
    }
}

fn gather<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&idx| values[idx].clone()).collect()
}

fn infer_type(values: &[Value]) -> ColumnResult<ColumnType> {
    let mut inferred: Option<ColumnType> = None;
    for (position, value) in values.iter().enumerate() {
        let Some(actual) = value.column_type() else {
            continue;
        };
        inferred = Some(match inferred {
            None => actual,
            Some(expected) if expected == actual => expected,
            Some(ColumnType::Integer) if actual == ColumnType::Double => ColumnType::Double,
            Some(ColumnType::Double) if actual == ColumnType::Integer => ColumnType::Double,
            Some(expected) => {
                return Err(ColumnError::MixedTypes {
                    expected,
                    actual,
                    position,
                })
            }
        });
    }
    Ok(inferred.unwrap_or(ColumnType::Logical))
}

fn collect_typed<T>(
    values: Vec<Value>,
    expected: ColumnType,
    extract: impl Fn(Value) -> Option<T>,
) -> ColumnResult<Vec<Option<T>>> {
    values
        .into_iter()
        .enumerate()
        .map(|(position, value)| {
            if value.is_null() {
                return Ok(None);
            }
            let actual = value.column_type().unwrap_or(expected);
            extract(value).map(Some).ok_or(ColumnError::MixedTypes {
                expected,
                actual,
                position,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_promotes_integer_to_double() {
        let col = Column::from_values(vec![1.into(), Value::Null, 2.5.into()]).unwrap();
        assert_eq!(col.column_type(), ColumnType::Double);
        assert_eq!(col.values(), vec![1.0.into(), Value::Null, 2.5.into()]);
    }

    #[test]
    fn infer_rejects_text_mixed_with_numbers() {
        let err = Column::from_values(vec![1.into(), "a".into()]).unwrap_err();
        assert_eq!(
            err,
            ColumnError::MixedTypes {
                expected: ColumnType::Integer,
                actual: ColumnType::Text,
                position: 1,
            }
        );
    }

    #[test]
    fn all_null_input_is_logical() {
        let col = Column::from_values(vec![Value::Null, Value::Null]).unwrap();
        assert_eq!(col.column_type(), ColumnType::Logical);
        assert_eq!(col.len(), 2);
    }

    #[test]
    fn compare_nullable_keeps_nulls_last_when_descending() {
        assert_eq!(compare_nullable(None, Some(1), true, |a, b| a.cmp(&b)), Ordering::Greater);
        assert_eq!(compare_nullable(Some(1), Some(2), true, |a, b| a.cmp(&b)), Ordering::Greater);
        assert_eq!(compare_nullable(Some(1), Some(2), false, |a, b| a.cmp(&b)), Ordering::Less);
    }
}
