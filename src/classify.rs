//! # Grid format detection
//!
//! Working out which mesh convention a file uses happens in two stages. First the file is
//! opened as a generic structured dataset. If that fails with a container error (the file
//! is missing, unreadable, or holds something other than a structured dataset) and the path
//! ends in `.shp`, the file is taken to be a shapefile. Any other failure is reported as
//! [`Error::SourceUnreadable`].
//!
//! A dataset that opened is then searched for the signature keys in [`SIGNATURES`]. A key is
//! present when it names a variable, a dimension, or a global attribute of the dataset.
//! Probing never fails: a dataset without any signature is [`FormatKind::Unknown`].
//!
//! ## Precedence
//!
//! The signatures are not mutually exclusive. A file holding both `coordx` and `Mesh2` exists
//! in the wild, and the **last** matching entry of [`SIGNATURES`] decides the format:
//!
//! | key               | format   |
//! |-------------------|----------|
//! | `coordx`          | exodus   |
//! | `grid_center_lon` | scrip    |
//! | `coord`           | exodus   |
//! | `Mesh2`           | ugrid    |
//!
//! so UGRID wins over everything, then Exodus via `coord`, then SCRIP, then Exodus via
//! `coordx`.

use crate::container::Dataset;
use crate::open::NetcdfOpener;
use crate::traits::StructuredOpener;
use crate::utils;
use crate::Error;

use std::fmt;
use std::path::{Path, PathBuf};

/// the signature keys in search order. Later entries take precedence over earlier ones.
pub const SIGNATURES: [(&str, FormatKind); 4] = [
    ("coordx", FormatKind::Exodus),
    ("grid_center_lon", FormatKind::Scrip),
    ("coord", FormatKind::Exodus),
    ("Mesh2", FormatKind::Ugrid),
];

/// mesh encodings the crate can tell apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    Exodus,
    Scrip,
    Ugrid,
    Shapefile,
    Unknown,
}

impl FormatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exodus => "exodus",
            Self::Scrip => "scrip",
            Self::Ugrid => "ugrid",
            Self::Shapefile => "shapefile",
            Self::Unknown => "unknown",
        }
    }

    /// the format is stored in a structured dataset that the classifier opened
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Exodus | Self::Scrip | Self::Ugrid)
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// the format a dataset's signature keys point to, [`FormatKind::Unknown`] if none match
pub fn detect(dataset: &Dataset) -> FormatKind {
    SIGNATURES
        .iter()
        .rev()
        .find(|(key, _)| dataset.contains(key))
        .map_or(FormatKind::Unknown, |(_, kind)| *kind)
}

/// a classified grid file
///
/// For the netCDF based formats the source keeps the dataset opened during classification,
/// so the reader it is handed to does not have to open the file again.
#[derive(Debug, Clone)]
pub struct GridSource {
    path: PathBuf,
    kind: FormatKind,
    handle: Option<Dataset>,
}

impl GridSource {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> FormatKind {
        self.kind
    }

    /// the dataset opened during classification, `None` for shapefiles
    pub fn handle(&self) -> Option<&Dataset> {
        self.handle.as_ref()
    }

    pub fn into_parts(self) -> (PathBuf, FormatKind, Option<Dataset>) {
        (self.path, self.kind, self.handle)
    }
}

/// detects the format of grid files with the help of a [`StructuredOpener`]
#[derive(Debug, Clone, Default)]
pub struct Classifier<O = NetcdfOpener> {
    opener: O,
}

impl<O: StructuredOpener> Classifier<O> {
    pub fn new(opener: O) -> Self {
        Self { opener }
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    /// classify the file at `path`
    pub fn classify<P: AsRef<Path>>(&self, path: P) -> Result<FormatKind, Error> {
        self.inspect(path).map(|source| source.kind())
    }

    /// classify the file at `path`, keeping the opened dataset for dispatch
    pub fn inspect<P: AsRef<Path>>(&self, path: P) -> Result<GridSource, Error> {
        let path = path.as_ref();
        let extension = utils::extension(path);

        // the raw stored values are enough to look for signature keys
        let dataset = match self.opener.open_structured(path, true) {
            Ok(dataset) => dataset,
            Err(err) if err.is_container_error() && extension == "shp" => {
                log::debug!(
                    "`{}` is not a structured dataset ({err}), treating it as a shapefile",
                    path.display()
                );
                return Ok(GridSource {
                    path: path.to_path_buf(),
                    kind: FormatKind::Shapefile,
                    handle: None,
                });
            }
            Err(source) => {
                return Err(Error::SourceUnreadable {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let kind = detect(&dataset);
        log::debug!("`{}` is of type {kind}", path.display());

        Ok(GridSource {
            path: path.to_path_buf(),
            kind,
            handle: Some(dataset),
        })
    }
}

/// classify the file at `path` with the default [`NetcdfOpener`]
///
/// ```no_run
/// let kind = uxgrid::classify("outCSne30.ug").unwrap();
/// assert_eq!(kind.to_string(), "ugrid");
/// ```
pub fn classify<P: AsRef<Path>>(path: P) -> Result<FormatKind, Error> {
    Classifier::new(NetcdfOpener).classify(path)
}

/// an [`OpenError`] for tests that do not touch the file system
#[cfg(test)]
pub(crate) fn not_a_dataset() -> crate::OpenError {
    let err = crate::container::UnsupportedType::new("shape".into(), crate::container::NcType::Char);
    crate::OpenError::Format(crate::container::FileError::Unsupported(err))
}
