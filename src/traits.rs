//! # Traits
//!
//! The two seams between grid loading and the outside world. A [`StructuredOpener`]
//! turns a path into a [`Dataset`] (or explains why it cannot), and a [`MeshReader`] turns
//! an opened dataset (or, for shapefiles, a path) into a [`Mesh`].
//!
//! Both have default implementations, [`NetcdfOpener`](crate::NetcdfOpener) and
//! [`ConventionReader`](crate::ConventionReader), and both can be replaced on a
//! [`GridLoader`](crate::GridLoader), for instance to serve datasets from memory or from
//! a remote store:
//!
//! ```
//! use std::path::Path;
//! use uxgrid::container::Dataset;
//! use uxgrid::{GridLoader, OpenError};
//!
//! // pretend every path holds an empty UGRID file
//! let opener = |_: &Path, _strict: bool| -> Result<Dataset, OpenError> {
//!     let mut ds = Dataset::new();
//!     ds.add_variable("Mesh2", &[], 0i32).unwrap();
//!     Ok(ds)
//! };
//!
//! let loader = GridLoader::new().with_opener(opener);
//! # let _ = loader;
//! ```

use crate::grid::Mesh;
use crate::container::Dataset;
use crate::open::OpenError;
use crate::Error;

use std::path::Path;

/// opens a path as a generic structured dataset
///
/// Implementations must not modify the file at `path`. Failures are classified so that
/// the format classifier can tell a file that exists but holds a foreign format
/// (a container error, see [`OpenError::is_container_error`]) from an argument the opener
/// cannot work with at all.
pub trait StructuredOpener {
    /// open `path`. With `strict_types` the stored values are returned as written,
    /// otherwise packed and masked variables are decoded following the CF conventions.
    fn open_structured(&self, path: &Path, strict_types: bool) -> Result<Dataset, OpenError>;
}

impl<F> StructuredOpener for F
where
    F: Fn(&Path, bool) -> Result<Dataset, OpenError>,
{
    fn open_structured(&self, path: &Path, strict_types: bool) -> Result<Dataset, OpenError> {
        self(path, strict_types)
    }
}

/// builds the internal mesh from a classified grid file
///
/// Exactly one method is called per grid, matched to the detected
/// [`FormatKind`](crate::FormatKind). The netCDF based formats receive the dataset that was
/// opened during classification, so the file is never opened twice.
pub trait MeshReader {
    fn read_exodus(&self, handle: &Dataset) -> Result<Mesh, Error>;

    fn read_scrip(&self, handle: &Dataset) -> Result<Mesh, Error>;

    /// `path` is the file the handle was opened from
    fn read_ugrid(&self, path: &Path, handle: &Dataset) -> Result<Mesh, Error>;

    /// shapefiles are not structured datasets, the reader gets the path alone
    fn read_shapefile(&self, path: &Path) -> Result<Mesh, Error>;
}
