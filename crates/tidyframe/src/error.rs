use std::fmt;
use tidyframe_columnar::{ColumnError, ColumnType};

pub type FrameResult<T> = Result<T, FrameError>;

/// Which structural validation rejected a table input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StructuralCheck {
    /// An entry has no name (or an empty one).
    MissingName,
    /// An entry is neither a flat sequence nor a list sequence.
    UnsupportedValue,
    /// Entries disagree on length.
    LengthMismatch,
    /// Attribute names do not match the column order.
    NameOrder,
}

impl fmt::Display for StructuralCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StructuralCheck::MissingName => "missing name",
            StructuralCheck::UnsupportedValue => "unsupported value",
            StructuralCheck::LengthMismatch => "length mismatch",
            StructuralCheck::NameOrder => "name order",
        })
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("duplicate column name `{column}`")]
    DuplicateName { column: String },

    #[error("{check} check failed for entry {entry}: {detail}")]
    Structural {
        check: StructuralCheck,
        entry: String,
        detail: String,
    },

    #[error("column `{column}` has length {actual}, incompatible with row count {expected}")]
    Shape {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("unknown column `{column}`")]
    UnknownColumn { column: String },

    #[error("column `{column}` of type {column_type} has no ordering")]
    Comparison {
        column: String,
        column_type: ColumnType,
    },

    #[error("evaluation error: {0}")]
    Evaluation(String),
}

impl FrameError {
    pub(crate) fn unknown_column(column: impl Into<String>) -> Self {
        FrameError::UnknownColumn {
            column: column.into(),
        }
    }

    pub(crate) fn duplicate_name(column: impl Into<String>) -> Self {
        FrameError::DuplicateName {
            column: column.into(),
        }
    }

    pub(crate) fn shape(column: impl Into<String>, expected: usize, actual: usize) -> Self {
        FrameError::Shape {
            column: column.into(),
            expected,
            actual,
        }
    }
}

impl From<ColumnError> for FrameError {
    fn from(err: ColumnError) -> Self {
        match err {
            ColumnError::DuplicateName(column) => FrameError::DuplicateName { column },
            other => FrameError::Evaluation(other.to_string()),
        }
    }
}
