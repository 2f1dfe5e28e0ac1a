//! Unstructured grids and grid-aware data arrays for climate and ocean meshes.
//!
//! `uxgrid` loads mesh files written in one of several conventions (UGRID, SCRIP,
//! Exodus, shapefile), works out which convention a file uses, and carries the
//! resulting topology next to variable data stored in [`ndarray`] arrays.
//!
//! ```no_run
//! # fn main() -> Result<(), uxgrid::Error> {
//! let kind = uxgrid::classify("outCSne30.ug")?;
//! assert_eq!(kind, uxgrid::FormatKind::Ugrid);
//!
//! let dataset = uxgrid::open_dataset("outCSne30.ug", "outCSne30_vortex.nc")?;
//! let polygons = dataset["psi"].to_polycollection()?;
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod container;
mod data;
mod dataset;
pub mod geometry;
pub mod grid;
pub mod open;
pub mod prelude;
mod traits;
mod utils;

pub use traits::MeshReader;
pub use traits::StructuredOpener;

pub use classify::{classify, Classifier, FormatKind, GridSource};
pub use open::{NetcdfOpener, OpenError};

pub use grid::{Grid, GridInput, GridLoader, GridOptions, Mesh};
pub use grid::{write_exodus, write_ugrid, ConventionReader};

pub use data::UxDataArray;
pub use dataset::{open_dataset, UxDataset};

pub use container::{Dataset, FileError};

pub use ndarray;

use std::path::PathBuf;

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("could not open `{}`: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: OpenError,
    },
    #[error("mesh file not supported: `{}`", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("format not supported for writing: `{0}`")]
    UnsupportedWriteFormat(String),
    #[error("no reader is available for {0} grids")]
    ReaderUnavailable(FormatKind),
    #[error("invalid grid argument: {0}")]
    ArgumentTypeInvalid(String),
    #[error("unusable vertex array: {0}")]
    MalformedVertexInput(String),
    #[error("invalid mesh topology: {0}")]
    InvalidTopology(String),
    #[error("required variable `{0}` is missing from the dataset")]
    MissingVariable(String),
    #[error("array `{name}` does not match the grid: expected {expected}, found {found}")]
    DimensionMismatch {
        name: String,
        expected: String,
        found: String,
    },
    #[error("initializing a grid from {0} is not implemented")]
    Unimplemented(&'static str),
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("Error while reading or writing a netCDF file: {0}")]
    File(#[from] container::FileError),
    #[error("inconsistent dataset: {0}")]
    Dataset(#[from] container::DatasetError),
    #[error("Could not serialize features: `{0}`")]
    Json(#[from] serde_json::Error),
}
