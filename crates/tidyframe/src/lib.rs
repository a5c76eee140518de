//! Copy-on-write columnar tables.
//!
//! A [`Table`] is an ordered set of named [`Column`] handles plus one shared [`Attributes`]
//! handle. Every operation returns a new table and reuses as much of its input's storage as the
//! operation's semantics allow:
//! - projection, renaming and grouping share every column,
//! - mutation rebuilds only the columns it assigns,
//! - reordering, filtering and aggregation rebuild every column.
//!
//! [`inspect`] and [`diff`] report which storage a table shares with another.

#![forbid(unsafe_code)]

mod arrange;
mod builder;
mod coerce;
mod error;
mod eval;
mod inspect;
mod mutate;
mod options;
mod project;
mod rows;
mod summarise;
mod table;

pub use crate::builder::{build, TableBuilder};
pub use crate::coerce::{coerce, IntoTable, NamedList, RawValue};
pub use crate::error::{FrameError, FrameResult, StructuralCheck};
pub use crate::eval::{col, lit, BinaryOp, Env, Evaluator, Expr, ExprEvaluator, Function, UnaryOp};
pub use crate::inspect::{diff, inspect, ColumnSharing, IdentityDiff, Sharing, TableIdentity};
pub use crate::options::{GroupRetention, SortKey, SummariseOptions};
pub use crate::summarise::{AggregateOp, Aggregation, Reducer};
pub use crate::table::Table;

pub use tidyframe_columnar::{
    AttributeSet, Attributes, Column, ColumnData, ColumnType, KeyPart, StorageId, Value,
};
