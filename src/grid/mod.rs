//! # Grids
//!
//! A [`Grid`] is a [`Mesh`] together with where it came from. Grids are built from a
//! [`GridInput`]: a path to a mesh file in any of the conventions the
//! [classifier](crate::classify) recognizes, or an array of vertices forming a single face.
//!
//! ```no_run
//! use uxgrid::{Grid, GridInput};
//!
//! # fn main() -> Result<(), uxgrid::Error> {
//! let mut grid = Grid::new(GridInput::from("mesh.g"))?;
//! assert_eq!(grid.format(), Some(uxgrid::FormatKind::Exodus));
//!
//! // written next to mesh.g
//! let saved = grid.save_as("mesh.ug")?;
//! # Ok(())
//! # }
//! ```
//!
//! Loading goes through a [`GridLoader`], which pairs a [`Classifier`] with a
//! [`MeshReader`]. The defaults open anything libnetcdf reads and map UGRID, Exodus and
//! SCRIP datasets, both can be swapped out.

mod exodus;
mod mesh;
mod reader;
mod scrip;
mod ugrid;

pub use exodus::write_exodus;
pub use mesh::{Mesh, FILL_VALUE};
pub use reader::ConventionReader;
pub use ugrid::write_ugrid;

pub(crate) use mesh::pad_faces;

use crate::classify::Classifier;
use crate::open::NetcdfOpener;
use crate::prelude::*;

use ndarray::{ArrayBase, Data, Ix1};

/// settings carried by a grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridOptions {
    /// node coordinates are longitudes and latitudes in degrees. `None` when unknown
    pub latlon: Option<bool>,
    /// the grid contains concave faces. `None` when unknown
    pub concave: Option<bool>,
}

/// everything a grid can be built from
#[derive(Debug, Clone, PartialEq)]
pub enum GridInput {
    /// a mesh file in one of the supported conventions
    FromPath(PathBuf),
    /// an `(N, k)` array of vertices, `k >= 2`, forming a single face
    FromVertices(ArrayD<f64>),
    /// a gridspec description. Accepted but not implemented
    FromGridspec(String),
}

impl From<PathBuf> for GridInput {
    fn from(x: PathBuf) -> Self {
        GridInput::FromPath(x)
    }
}

impl From<&Path> for GridInput {
    fn from(x: &Path) -> Self {
        GridInput::FromPath(x.to_path_buf())
    }
}

// strings are file names, gridspec has to be asked for explicitly
impl From<&str> for GridInput {
    fn from(x: &str) -> Self {
        GridInput::FromPath(PathBuf::from(x))
    }
}

impl From<ArrayD<f64>> for GridInput {
    fn from(x: ArrayD<f64>) -> Self {
        GridInput::FromVertices(x)
    }
}

impl From<Array2<f64>> for GridInput {
    fn from(x: Array2<f64>) -> Self {
        GridInput::FromVertices(x.into_dyn())
    }
}

/// use the values of a dataset variable as vertices
///
/// character variables cannot hold vertices and are rejected with
/// [`Error::ArgumentTypeInvalid`], numeric variables that are not two dimensional with
/// [`Error::MalformedVertexInput`].
impl TryFrom<&Variable> for GridInput {
    type Error = Error;

    fn try_from(var: &Variable) -> Result<Self, Self::Error> {
        let values = var.to_array().ok_or_else(|| {
            Error::ArgumentTypeInvalid(format!(
                "variable `{}` holds {} values, not vertex coordinates",
                var.name(),
                var.nc_type().cdl_name()
            ))
        })?;

        if values.ndim() != 2 {
            return Err(Error::MalformedVertexInput(format!(
                "variable `{}` has dimensions {:?}, vertices need two",
                var.name(),
                var.dims()
            )));
        }

        Ok(GridInput::FromVertices(values))
    }
}

/// an unstructured grid
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    source: Option<PathBuf>,
    format: Option<FormatKind>,
    options: GridOptions,
    mesh: Mesh,
}

impl Grid {
    /// build a grid with the default [`GridLoader`]
    pub fn new<I: Into<GridInput>>(input: I) -> Result<Self, Error> {
        GridLoader::new().load(input.into())
    }

    /// load the mesh file at `path` with the default [`GridLoader`]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        GridLoader::new().open(path)
    }

    /// a grid with one face through every vertex, in order
    pub fn from_vertices<S, D>(vertices: &ArrayBase<S, D>) -> Result<Self, Error>
    where
        S: Data<Elem = f64>,
        D: ndarray::Dimension,
    {
        Mesh::from_vertices(vertices.view().into_dyn()).map(Self::from_mesh)
    }

    pub fn from_mesh(mesh: Mesh) -> Self {
        Self {
            source: None,
            format: None,
            options: GridOptions::default(),
            mesh,
        }
    }

    pub fn with_options(mut self, options: GridOptions) -> Self {
        self.options = options;
        self
    }

    /// the file the grid was read from or last saved to
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// the convention of the file the grid was read from
    pub fn format(&self) -> Option<FormatKind> {
        self.format
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn n_face(&self) -> usize {
        self.mesh.n_face()
    }

    pub fn n_node(&self) -> usize {
        self.mesh.n_node()
    }

    /// the grid as a UGRID dataset
    pub fn to_dataset(&self) -> Result<Dataset, Error> {
        ugrid::to_dataset(&self.mesh)
    }

    /// write the grid to `path`
    ///
    /// `format` is one of `ugrid`, `ug`, `exodus`, `exo` or `g`. Without it the extension of
    /// `path` picks the format. Anything else fails with [`Error::UnsupportedWriteFormat`]
    /// before the file is created.
    pub fn write<P: AsRef<Path>>(&self, path: P, format: Option<&str>) -> Result<(), Error> {
        let path = path.as_ref();
        let format = match format {
            Some(format) => format.trim_start_matches('.').to_ascii_lowercase(),
            None => utils::extension(path),
        };

        match format.as_str() {
            "ugrid" | "ug" => write_ugrid(&self.mesh, path),
            "exodus" | "exo" | "g" => write_exodus(&self.mesh, path),
            _ => {
                log::warn!("format `{format}` is not supported for writing");
                Err(Error::UnsupportedWriteFormat(format))
            }
        }
    }

    /// write the grid as UGRID to `file_name` in the directory of the current source file
    /// and make that file the new source
    ///
    /// Grids without a source file are written relative to the working directory.
    pub fn save_as<P: AsRef<Path>>(&mut self, file_name: P) -> Result<PathBuf, Error> {
        let directory = self
            .source
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let path = directory.join(file_name);

        write_ugrid(&self.mesh, &path)?;
        self.source = Some(path.clone());
        Ok(path)
    }
}

/// builds grids, classifying files with `O` and reading meshes with `R`
#[derive(Debug, Clone)]
pub struct GridLoader<O = NetcdfOpener, R = ConventionReader> {
    classifier: Classifier<O>,
    reader: R,
    options: GridOptions,
}

impl GridLoader {
    /// a loader for netCDF files with the built-in readers
    pub fn new() -> Self {
        Self {
            classifier: Classifier::new(NetcdfOpener),
            reader: ConventionReader,
            options: GridOptions::default(),
        }
    }
}

impl Default for GridLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: StructuredOpener, R: MeshReader> GridLoader<O, R> {
    pub fn with_opener<T: StructuredOpener>(self, opener: T) -> GridLoader<T, R> {
        GridLoader {
            classifier: Classifier::new(opener),
            reader: self.reader,
            options: self.options,
        }
    }

    pub fn with_reader<T: MeshReader>(self, reader: T) -> GridLoader<O, T> {
        GridLoader {
            classifier: self.classifier,
            reader,
            options: self.options,
        }
    }

    /// options given to every grid this loader builds
    pub fn with_options(mut self, options: GridOptions) -> Self {
        self.options = options;
        self
    }

    pub fn classifier(&self) -> &Classifier<O> {
        &self.classifier
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn load(&self, input: GridInput) -> Result<Grid, Error> {
        match input {
            GridInput::FromPath(path) => self.open(path),
            GridInput::FromVertices(vertices) => {
                let mesh = Mesh::from_vertices(vertices.view())?;
                Ok(Grid::from_mesh(mesh).with_options(self.options))
            }
            GridInput::FromGridspec(_) => Err(Error::Unimplemented("gridspec")),
        }
    }

    /// classify the file at `path` and read its mesh
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<Grid, Error> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::SourceUnreadable {
                path: path.to_path_buf(),
                source: OpenError::NotFound,
            });
        }

        let source = self.classifier.inspect(path)?;
        let format = source.kind();
        let mesh = self.dispatch(source)?;

        Ok(Grid {
            source: Some(path.to_path_buf()),
            format: Some(format),
            options: self.options,
            mesh,
        })
    }

    /// hand a classified file to the matching reader
    pub fn dispatch(&self, source: GridSource) -> Result<Mesh, Error> {
        let (path, kind, handle) = source.into_parts();
        log::info!("reading `{}` as {kind}", path.display());

        match (kind, handle.as_ref()) {
            (FormatKind::Exodus, Some(handle)) => self.reader.read_exodus(handle),
            (FormatKind::Scrip, Some(handle)) => self.reader.read_scrip(handle),
            (FormatKind::Ugrid, Some(handle)) => self.reader.read_ugrid(&path, handle),
            (FormatKind::Shapefile, _) => self.reader.read_shapefile(&path),
            _ => {
                log::warn!("mesh file not supported: `{}`", path.display());
                Err(Error::UnsupportedFormat(path))
            }
        }
    }
}

/// the variable `name`, or [`Error::MissingVariable`]
pub(crate) fn required<'a>(handle: &'a Dataset, name: &str) -> Result<&'a Variable, Error> {
    handle
        .variable(name)
        .ok_or_else(|| Error::MissingVariable(name.into()))
}

/// the one dimensional numeric variable `name` as `f64`
pub(crate) fn coordinate(handle: &Dataset, name: &str) -> Result<Array1<f64>, Error> {
    let var = required(handle, name)?;
    var.to_array()
        .and_then(|values| values.into_dimensionality::<Ix1>().ok())
        .ok_or_else(|| {
            Error::InvalidTopology(format!(
                "coordinate `{name}` must be a one dimensional numeric array, found dimensions {:?}",
                var.dims()
            ))
        })
}
