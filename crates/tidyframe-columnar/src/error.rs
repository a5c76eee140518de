use crate::types::ColumnType;

pub type ColumnResult<T> = Result<T, ColumnError>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ColumnError {
    #[error("mixed element types: expected {expected}, got {actual} at position {position}")]
    MixedTypes {
        expected: ColumnType,
        actual: ColumnType,
        position: usize,
    },

    #[error("row index {index} out of bounds for column of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("cannot broadcast a column of length {len}; only length-1 columns broadcast")]
    NotScalar { len: usize },

    #[error("element type {0} has no ordering")]
    Unordered(ColumnType),

    #[error("duplicate column name `{0}`")]
    DuplicateName(String),
}
