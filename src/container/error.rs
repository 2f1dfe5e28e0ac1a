use derive_more::{Constructor, Display};

use super::NcType;

/// failure moving a [`Dataset`](super::Dataset) in or out of a netCDF file
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("netCDF library error: {0}")]
    Netcdf(#[from] netcdf::error::Error),
    #[error("{0}")]
    Unsupported(UnsupportedType),
    #[error("inconsistent file contents: {0}")]
    Inconsistent(#[from] DatasetError),
}

/// a variable whose type has no counterpart on the other side of the conversion
#[derive(Display, Debug, Constructor)]
#[display(fmt = "variable `{variable}` of type {kind} cannot be stored in a netCDF file")]
pub struct UnsupportedType {
    variable: String,
    kind: NcType,
}

/// a dataset edit that would leave the dataset inconsistent
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    #[error("`{0}` is not a valid name")]
    InvalidName(String),
    #[error("dimension `{0}` is already defined")]
    DuplicateDimension(String),
    #[error("variable `{0}` is already defined")]
    DuplicateVariable(String),
    #[error("variable `{variable}` refers to undefined dimension `{dimension}`")]
    UnknownDimension { variable: String, dimension: String },
    #[error("variable `{variable}` holds {actual} values but its shape {shape:?} requires {expected}")]
    ShapeMismatch {
        variable: String,
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },
    #[error("variable `{variable}` of shape {shape:?} does not fit in memory")]
    TooLarge { variable: String, shape: Vec<usize> },
}
