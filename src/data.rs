use crate::geometry::{Feature, FeatureCollection, PolyCollection};
use crate::prelude::*;

#[derive(Debug, Clone, Deref, DerefMut)]
/// A labeled array of `f64` values that carries the grid it lives on.
///
/// `UxDataArray` derefs to its [`ArrayD`], so the full `ndarray` API is available for
/// arithmetic and slicing. The [`Grid`] is shared behind an [`Arc`]: every array read from
/// the same dataset points at the same grid.
///
/// ## Face-centered data
///
/// The conversions [`to_polycollection`](Self::to_polycollection) and
/// [`to_geodataframe`](Self::to_geodataframe) pair every value with a face of the grid, so
/// they require a one dimensional array holding exactly one value per face.
pub struct UxDataArray {
    name: String,
    dims: Vec<String>,
    attributes: Vec<Attribute>,
    #[deref]
    #[deref_mut]
    values: ArrayD<f64>,
    grid: Arc<Grid>,
}

impl UxDataArray {
    /// Construct an array with one dimension name per axis of `values`.
    pub fn new(
        name: impl Into<String>,
        dims: Vec<String>,
        values: ArrayD<f64>,
        grid: Arc<Grid>,
    ) -> Result<Self, Error> {
        let name = name.into();
        if dims.len() != values.ndim() {
            return Err(Error::DimensionMismatch {
                expected: format!("{} dimension names", values.ndim()),
                found: format!("{dims:?}"),
                name,
            });
        }

        Ok(Self {
            name,
            dims,
            attributes: Vec::new(),
            values,
            grid,
        })
    }

    /// wrap a dataset variable. Character variables are rejected with
    /// [`Error::ArgumentTypeInvalid`]
    pub fn from_variable(var: &Variable, grid: Arc<Grid>) -> Result<Self, Error> {
        let values = var.to_array().ok_or_else(|| {
            Error::ArgumentTypeInvalid(format!("variable `{}` holds text", var.name()))
        })?;

        let mut array = Self::new(var.name(), var.dims().to_vec(), values, grid)?;
        array.attributes = var.attributes().to_vec();
        Ok(array)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|att| att.name == name)
    }

    /// get the array that this type wraps.
    /// usually this method is not required because `UxDataArray` implements
    /// [`Deref`](std::ops::Deref) and [`DerefMut`](std::ops::DerefMut)
    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    pub fn into_values(self) -> ArrayD<f64> {
        self.values
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    pub fn set_grid(&mut self, grid: Arc<Grid>) {
        self.grid = grid;
    }

    /// the same values on another grid
    pub fn with_grid(mut self, grid: Arc<Grid>) -> Self {
        self.grid = grid;
        self
    }

    /// one polygon per face of the grid, colored by the values of this array
    pub fn to_polycollection(&self) -> Result<PolyCollection, Error> {
        let values = self.face_values()?;
        let mesh = self.grid.mesh();
        let polygons = (0..mesh.n_face()).map(|idx| mesh.face_polygon(idx)).collect();

        Ok(PolyCollection { polygons, values })
    }

    /// one polygon feature per face with the value stored under the name of this array
    pub fn to_geodataframe(&self) -> Result<FeatureCollection, Error> {
        let polygons = self.to_polycollection()?;
        let features = polygons
            .iter()
            .map(|(ring, value)| Feature::polygon(ring, &self.name, value))
            .collect();

        Ok(FeatureCollection::new(features))
    }

    fn face_values(&self) -> Result<Vec<f64>, Error> {
        let n_face = self.grid.n_face();
        if self.values.ndim() != 1 || self.values.len() != n_face {
            return Err(Error::DimensionMismatch {
                name: self.name.clone(),
                expected: format!("one value for each of the {n_face} faces"),
                found: format!("shape {:?}", self.values.shape()),
            });
        }
        Ok(self.values.iter().copied().collect())
    }
}
