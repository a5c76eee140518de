//! Reference-counted column storage for tidyframe.
//!
//! This crate focuses on:
//! - Immutable, element-type-homogeneous column stores behind an `Arc` handle.
//! - Table-level attribute sets (names, grouping keys, extras) that are shared separately from
//!   column storage.
//! - Identity tokens used to observe which handles alias the same allocation.

#![forbid(unsafe_code)]

mod attrs;
mod column;
mod error;
mod identity;
mod types;

pub use crate::attrs::{AttributeSet, Attributes};
pub use crate::column::{Column, ColumnData, RowOrder};
pub use crate::error::{ColumnError, ColumnResult};
pub use crate::identity::StorageId;
pub use crate::types::{ColumnType, KeyPart, Value};
