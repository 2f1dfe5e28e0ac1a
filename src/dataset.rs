use crate::open::NetcdfOpener;
use crate::prelude::*;

use std::ops::Index;

/// the numeric variables of a dataset as [`UxDataArray`]s sharing one grid
#[derive(Debug, Clone)]
pub struct UxDataset {
    grid: Arc<Grid>,
    arrays: Vec<UxDataArray>,
    attributes: Vec<Attribute>,
}

impl UxDataset {
    /// wrap every numeric variable of `dataset`. Character variables are skipped
    pub fn from_dataset(dataset: &Dataset, grid: Arc<Grid>) -> Self {
        let arrays = dataset
            .variables()
            .iter()
            .filter(|var| !var.values().is_text())
            .filter_map(|var| UxDataArray::from_variable(var, grid.clone()).ok())
            .collect();

        Self {
            grid,
            arrays,
            attributes: dataset.attributes().to_vec(),
        }
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    pub fn get(&self, name: &str) -> Option<&UxDataArray> {
        self.arrays.iter().find(|array| array.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut UxDataArray> {
        self.arrays.iter_mut().find(|array| array.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.arrays.iter().map(UxDataArray::name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UxDataArray> {
        self.arrays.iter()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }
}

impl Index<&str> for UxDataset {
    type Output = UxDataArray;

    /// ## Panics
    ///
    /// if the dataset has no array called `name`
    fn index(&self, name: &str) -> &Self::Output {
        match self.get(name) {
            Some(array) => array,
            None => panic!("no variable `{name}` in the dataset"),
        }
    }
}

/// open the grid file at `grid_path` and the data file at `data_path` as one dataset
///
/// Packed and masked variables of the data file are decoded following the CF conventions.
pub fn open_dataset<P, Q>(grid_path: P, data_path: Q) -> Result<UxDataset, Error>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let grid = Arc::new(Grid::open(grid_path)?);

    let data_path = data_path.as_ref();
    let data = NetcdfOpener
        .open_structured(data_path, false)
        .map_err(|source| Error::SourceUnreadable {
            path: data_path.to_path_buf(),
            source,
        })?;

    let dataset = UxDataset::from_dataset(&data, grid);
    log::debug!(
        "opened {} data variables from `{}`",
        dataset.len(),
        data_path.display()
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn arrays_share_the_grid() {
        let grid = Arc::new(Grid::from_vertices(&array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]).unwrap());

        let mut ds = Dataset::new();
        ds.add_dimension("nMesh2_face", 1).unwrap();
        ds.add_dimension("nchar", 4).unwrap();
        ds.add_variable("psi", &["nMesh2_face"], vec![1.5f64]).unwrap();
        ds.add_variable("area", &["nMesh2_face"], vec![0.5f32]).unwrap();
        ds.add_variable("label", &["nchar"], "face").unwrap();
        ds.add_attribute("source", "unit test");

        let uxds = UxDataset::from_dataset(&ds, grid.clone());
        assert_eq!(uxds.names().collect::<Vec<_>>(), ["psi", "area"]);
        assert_eq!(uxds["area"].sum(), 0.5);
        assert!(uxds.get("label").is_none());
        assert!(uxds.iter().all(|array| Arc::ptr_eq(array.grid(), &grid)));
        assert_eq!(uxds.attributes().len(), 1);
    }

    #[test]
    #[should_panic]
    fn index_panics_on_missing_names() {
        let grid = Arc::new(Grid::from_vertices(&array![[0.0, 0.0], [1.0, 0.0]]).unwrap());
        let uxds = UxDataset::from_dataset(&Dataset::new(), grid);
        let _ = &uxds["psi"];
    }
}
