use crate::error::{FrameError, FrameResult};
use crate::options::{GroupRetention, SummariseOptions};
use crate::table::Table;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tidyframe_columnar::{
    AttributeSet, Attributes, Column, ColumnData, ColumnType, KeyPart, Value,
};

/// Reduces one group's slice of a column to a single value.
pub trait Reducer {
    fn reduce(&self, group: &Column) -> FrameResult<Value>;

    /// Element type of the reduced column for an input of type `input`. `None` infers it from the
    /// reduced values.
    fn output_type(&self, input: ColumnType) -> Option<ColumnType> {
        let _ = input;
        None
    }
}

impl<F> Reducer for F
where
    F: Fn(&Column) -> FrameResult<Value>,
{
    fn reduce(&self, group: &Column) -> FrameResult<Value> {
        self(group)
    }
}

/// Built-in reductions. All of them except `Count`, `First` and `Last` skip nulls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggregateOp {
    /// Number of rows in the group.
    Count,
    Sum,
    Mean,
    Min,
    Max,
    First,
    Last,
    /// Number of distinct values; null counts as one value.
    DistinctCount,
}

impl Reducer for AggregateOp {
    fn reduce(&self, group: &Column) -> FrameResult<Value> {
        match self {
            AggregateOp::Count => Ok(Value::Integer(group.len() as i64)),
            AggregateOp::Sum => sum(group),
            AggregateOp::Mean => mean(group),
            AggregateOp::Min => extreme(group, false),
            AggregateOp::Max => extreme(group, true),
            AggregateOp::First => Ok(group.get(0).unwrap_or(Value::Null)),
            AggregateOp::Last => Ok(group
                .len()
                .checked_sub(1)
                .and_then(|row| group.get(row))
                .unwrap_or(Value::Null)),
            AggregateOp::DistinctCount => {
                let mut seen = HashSet::new();
                for row in 0..group.len() {
                    seen.insert(group.key_at(row)?);
                }
                Ok(Value::Integer(seen.len() as i64))
            }
        }
    }

    fn output_type(&self, input: ColumnType) -> Option<ColumnType> {
        match self {
            AggregateOp::Count | AggregateOp::DistinctCount => Some(ColumnType::Integer),
            AggregateOp::Mean => Some(ColumnType::Double),
            AggregateOp::Sum => match input {
                ColumnType::Logical | ColumnType::Integer => Some(ColumnType::Integer),
                ColumnType::Double => Some(ColumnType::Double),
                _ => None,
            },
            AggregateOp::Min | AggregateOp::Max | AggregateOp::First | AggregateOp::Last => {
                Some(input)
            }
        }
    }
}

fn sum(group: &Column) -> FrameResult<Value> {
    match group.data() {
        ColumnData::Logical(v) => Ok(Value::Integer(
            v.iter().flatten().filter(|b| **b).count() as i64,
        )),
        ColumnData::Integer(v) => v
            .iter()
            .flatten()
            .try_fold(0i64, |acc, x| acc.checked_add(*x))
            .map(Value::Integer)
            .ok_or_else(|| FrameError::Evaluation("integer overflow in sum".into())),
        ColumnData::Double(v) => Ok(Value::Double(v.iter().flatten().sum())),
        other => Err(FrameError::Evaluation(format!(
            "cannot sum a {} column",
            other.column_type()
        ))),
    }
}

fn mean(group: &Column) -> FrameResult<Value> {
    if !group.column_type().is_numeric() {
        return Err(FrameError::Evaluation(format!(
            "cannot average a {} column",
            group.column_type()
        )));
    }
    let values: Vec<f64> = group.values().iter().filter_map(Value::as_f64).collect();
    if values.is_empty() {
        return Ok(Value::Null);
    }
    Ok(Value::Double(values.iter().sum::<f64>() / values.len() as f64))
}

fn extreme(group: &Column, max: bool) -> FrameResult<Value> {
    let mut best: Option<KeyPart> = None;
    for row in 0..group.len() {
        let key = group.key_at(row)?;
        if key == KeyPart::Null {
            continue;
        }
        best = match best {
            Some(current) if (key > current) != max => Some(current),
            _ => Some(key),
        };
    }
    Ok(best.map_or(Value::Null, Value::from))
}

/// One output column of [`Table::summarise`].
#[derive(Clone)]
pub struct Aggregation {
    name: String,
    input: Option<String>,
    reducer: Arc<dyn Reducer + Send + Sync>,
}

impl Aggregation {
    pub fn new(
        name: impl Into<String>,
        input: impl Into<String>,
        reducer: impl Reducer + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            input: Some(input.into()),
            reducer: Arc::new(reducer),
        }
    }

    /// Row count per group; needs no input column.
    pub fn count(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: None,
            reducer: Arc::new(AggregateOp::Count),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }
}

impl fmt::Debug for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregation")
            .field("name", &self.name)
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}

struct Group {
    rows: Vec<usize>,
}

/// Row sets per distinct key combination, in ascending key order. An ungrouped table is one
/// group holding every row (possibly none).
fn group_rows(table: &Table) -> FrameResult<Vec<Group>> {
    let mut keys = Vec::with_capacity(table.groups().len());
    for name in table.groups() {
        let col = table.column(name)?;
        if !col.column_type().is_ordered() {
            return Err(FrameError::Comparison {
                column: name.clone(),
                column_type: col.column_type(),
            });
        }
        keys.push(col);
    }
    if keys.is_empty() {
        return Ok(vec![Group {
            rows: (0..table.row_count()).collect(),
        }]);
    }

    let mut index: HashMap<Vec<KeyPart>, usize> = HashMap::new();
    let mut found: Vec<(Vec<KeyPart>, Group)> = Vec::new();
    for row in 0..table.row_count() {
        let key = keys
            .iter()
            .map(|col| col.key_at(row))
            .collect::<Result<Vec<_>, _>>()?;
        match index.get(&key) {
            Some(&idx) => found[idx].1.rows.push(row),
            None => {
                index.insert(key.clone(), found.len());
                found.push((key, Group { rows: vec![row] }));
            }
        }
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(found.into_iter().map(|(_, group)| group).collect())
}

impl Table {
    /// Record grouping keys. Every column is shared with `self`.
    pub fn group_by<S: AsRef<str>>(&self, keys: &[S]) -> FrameResult<Table> {
        let mut groups: Vec<String> = Vec::with_capacity(keys.len());
        for key in keys {
            let key = key.as_ref();
            let col = self.column(key)?;
            if !col.column_type().is_ordered() {
                return Err(FrameError::Comparison {
                    column: key.to_string(),
                    column_type: col.column_type(),
                });
            }
            if !groups.iter().any(|g| g == key) {
                groups.push(key.to_string());
            }
        }
        let attrs = self.attributes().derive(|set| {
            set.set_groups(groups);
            Ok(())
        })?;
        Table::assemble(self.columns().to_vec(), attrs, self.row_count())
    }

    pub fn ungroup(&self) -> FrameResult<Table> {
        let attrs = self.attributes().derive(|set| {
            set.set_groups(Vec::new());
            Ok(())
        })?;
        Table::assemble(self.columns().to_vec(), attrs, self.row_count())
    }

    pub fn summarise(&self, aggregations: &[Aggregation]) -> FrameResult<Table> {
        self.summarise_with(aggregations, SummariseOptions::default())
    }

    /// One row per group: the grouping columns followed by one column per aggregation.
    ///
    /// Every output column is new storage. Extra attributes are not carried over.
    pub fn summarise_with(
        &self,
        aggregations: &[Aggregation],
        options: SummariseOptions,
    ) -> FrameResult<Table> {
        let inputs = aggregations
            .iter()
            .map(|agg| agg.input().map(|name| self.column(name)).transpose())
            .collect::<FrameResult<Vec<_>>>()?;

        let mut names: Vec<String> = self.groups().to_vec();
        names.extend(aggregations.iter().map(|agg| agg.name.clone()));
        let mut set = AttributeSet::new(names)?;

        let groups = group_rows(self)?;
        let grouped = self.is_grouped();

        let mut columns = Vec::with_capacity(set.names().len());
        let firsts: Vec<usize> = groups.iter().filter_map(|g| g.rows.first().copied()).collect();
        for key in self.groups() {
            columns.push(self.column(key)?.take(&firsts)?);
        }

        for (agg, input) in aggregations.iter().zip(inputs) {
            let mut values = Vec::with_capacity(groups.len());
            for group in &groups {
                let slice = match input {
                    Some(col) if !grouped => col.clone(),
                    Some(col) => col.take(&group.rows)?,
                    None => Column::new(ColumnData::Logical(vec![None; group.rows.len()])),
                };
                values.push(agg.reducer.reduce(&slice)?);
            }
            let input_type = input.map_or(ColumnType::Logical, Column::column_type);
            let column = match agg.reducer.output_type(input_type) {
                Some(column_type) => Column::from_values_typed(column_type, values),
                None => Column::from_values(values),
            }
            .map_err(|err| FrameError::Evaluation(format!("aggregation `{}`: {err}", agg.name)))?;
            columns.push(column);
        }

        let keys = self.groups();
        set.set_groups(match options.groups {
            GroupRetention::Drop => Vec::new(),
            GroupRetention::DropLast => keys[..keys.len().saturating_sub(1)].to_vec(),
            GroupRetention::Keep => keys.to_vec(),
        });

        let out = Table::assemble(columns, Attributes::new(set), groups.len())?;
        debug!(
            "summarise: {} groups, {} new columns, groups kept: {:?}",
            out.row_count(),
            out.column_count(),
            out.groups()
        );
        Ok(out)
    }
}
