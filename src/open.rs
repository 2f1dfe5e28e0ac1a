//! the default structured dataset opener
use crate::container::{self, Dataset, FileError};
use crate::traits::StructuredOpener;

use std::io;
use std::path::Path;

/// why a path could not be opened as a structured dataset
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// nothing exists at the path
    #[error("no such file")]
    NotFound,
    /// the path exists but could not be read, for example for lack of permissions
    #[error("{0}")]
    Io(#[source] io::Error),
    /// the file was read but is not a container this opener understands
    #[error("not a readable structured dataset: {0}")]
    Format(#[from] FileError),
    /// the opener cannot work with this kind of argument at all
    #[error("invalid argument for the structured opener: {0}")]
    ArgumentType(String),
}

impl OpenError {
    /// the failure is about the container at the path rather than the argument itself.
    ///
    /// Only container errors allow falling back to the extension of the path.
    pub fn is_container_error(&self) -> bool {
        !matches!(self, Self::ArgumentType(_))
    }
}

impl From<io::Error> for OpenError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            _ => Self::Io(err),
        }
    }
}

/// opens anything libnetcdf can read: the classic formats, 64 bit offset and data
/// variants, and netCDF-4 on HDF5
#[derive(Debug, Clone, Copy, Default)]
pub struct NetcdfOpener;

impl StructuredOpener for NetcdfOpener {
    fn open_structured(&self, path: &Path, strict_types: bool) -> Result<Dataset, OpenError> {
        if path.as_os_str().is_empty() {
            return Err(OpenError::ArgumentType("empty path".into()));
        }
        if std::fs::metadata(path)?.is_dir() {
            return Err(OpenError::ArgumentType(format!(
                "`{}` is a directory",
                path.display()
            )));
        }
        // libnetcdf reports permission problems as bare error codes
        drop(std::fs::File::open(path)?);

        let dataset = container::read_file(path)?;

        if strict_types {
            Ok(dataset)
        } else {
            Ok(container::cf::decode(dataset))
        }
    }
}
