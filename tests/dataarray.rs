use std::path::Path;
use std::sync::Arc;

use ndarray::{array, Array2};
use uxgrid::grid::FILL_VALUE;
use uxgrid::container::{self, Dataset};
use uxgrid::{open_dataset, Error, Grid, Mesh};

/// a 2 x 2 block of quads with a triangle attached, in the layout of a cubed-sphere file
fn write_grid(path: &Path) -> Grid {
    let x = array![0.0, 1.0, 2.0, 0.0, 1.0, 2.0, 0.0, 1.0, 2.0, 3.0];
    let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 1.0];
    let faces: Array2<i64> = array![
        [0, 1, 4, 3],
        [1, 2, 5, 4],
        [3, 4, 7, 6],
        [4, 5, 8, 7],
        [2, 9, 5, FILL_VALUE],
    ];
    let grid = Grid::from_mesh(Mesh::new(x, y, faces).unwrap());
    grid.write(path, None).unwrap();
    grid
}

fn write_data(path: &Path) {
    let mut ds = Dataset::new();
    ds.add_dimension("nMesh2_face", 5).unwrap();
    ds.add_dimension("nMesh2_node", 10).unwrap();
    ds.add_variable("psi", &["nMesh2_face"], vec![1.0f64, 2.0, 3.0, 4.0, 5.0])
        .unwrap()
        .add_attribute("long_name", "stream function");
    ds.add_variable("packed", &["nMesh2_face"], vec![10i16, 20, -1, 40, 50])
        .unwrap()
        .add_attribute("scale_factor", 0.1f64)
        .add_attribute("_FillValue", -1i16);
    ds.add_variable("nodal", &["nMesh2_node"], vec![0.0f32; 10]).unwrap();
    container::write_file(path, &ds).unwrap();
}

#[test]
fn open_dataset_pairs_data_with_the_grid() {
    let dir = tempfile::tempdir().unwrap();
    let grid_path = dir.path().join("outCSne30.ug");
    let data_path = dir.path().join("outCSne30_vortex.nc");
    let grid = write_grid(&grid_path);
    write_data(&data_path);

    let uxds = open_dataset(&grid_path, &data_path).unwrap();
    assert_eq!(uxds.len(), 3);
    assert_eq!(uxds.grid().mesh(), grid.mesh());
    assert!(Arc::ptr_eq(uxds["psi"].grid(), uxds["nodal"].grid()));
    assert_eq!(
        uxds["psi"].attribute("long_name").and_then(|att| att.text()).as_deref(),
        Some("stream function")
    );

    let packed: Vec<f64> = uxds["packed"].iter().copied().collect();
    assert!((packed[1] - 2.0).abs() < 1e-12);
    assert!(packed[2].is_nan());
}

#[test]
fn polycollection_of_psi() {
    let dir = tempfile::tempdir().unwrap();
    let grid_path = dir.path().join("outCSne30.ug");
    let data_path = dir.path().join("outCSne30_vortex.nc");
    write_grid(&grid_path);
    write_data(&data_path);

    let uxds = open_dataset(&grid_path, &data_path).unwrap();
    let polygons = uxds["psi"].to_polycollection().unwrap();

    assert_eq!(polygons.len(), 5);
    assert_eq!(polygons.values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(polygons.polygons[4], vec![[2.0, 0.0], [3.0, 1.0], [2.0, 1.0]]);
}

#[test]
fn geodataframe_of_psi() {
    let dir = tempfile::tempdir().unwrap();
    let grid_path = dir.path().join("outCSne30.ug");
    let data_path = dir.path().join("outCSne30_vortex.nc");
    write_grid(&grid_path);
    write_data(&data_path);

    let uxds = open_dataset(&grid_path, &data_path).unwrap();
    let gdf = uxds["psi"].to_geodataframe().unwrap();
    assert_eq!(gdf.len(), 5);

    let json: serde_json::Value = serde_json::from_str(&gdf.to_json().unwrap()).unwrap();
    assert_eq!(json["features"][0]["properties"]["psi"], 1.0);
    // closed ring of the first quad
    assert_eq!(
        json["features"][0]["geometry"]["coordinates"][0]
            .as_array()
            .map(Vec::len),
        Some(5)
    );

    // nodal data cannot be drawn per face
    let err = uxds["nodal"].to_geodataframe().unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { name, .. } if name == "nodal"));
}

#[test]
fn missing_data_file() {
    let dir = tempfile::tempdir().unwrap();
    let grid_path = dir.path().join("outCSne30.ug");
    write_grid(&grid_path);

    let err = open_dataset(&grid_path, dir.path().join("absent.nc")).unwrap_err();
    assert!(matches!(err, Error::SourceUnreadable { .. }));
}
