//! SCRIP grids
//!
//! SCRIP describes every cell by its own list of corners (`grid_corner_lon`,
//! `grid_corner_lat` over `(grid_size, grid_corners)`), so corners shared between cells are
//! repeated. Reading merges identical corners into nodes.
use super::{pad_faces, required};
use crate::prelude::*;

use std::collections::HashMap;

/// map a SCRIP dataset onto a mesh
pub(crate) fn read(handle: &Dataset) -> Result<Mesh, Error> {
    let corner_lon = corners(required(handle, "grid_corner_lon")?)?;
    let corner_lat = corners(required(handle, "grid_corner_lat")?)?;
    if corner_lon.dim() != corner_lat.dim() {
        return Err(Error::InvalidTopology(format!(
            "corner longitudes have shape {:?} but latitudes {:?}",
            corner_lon.shape(),
            corner_lat.shape()
        )));
    }

    let mut node_x = Vec::new();
    let mut node_y = Vec::new();
    let mut nodes: HashMap<(u64, u64), i64> = HashMap::new();
    let mut faces = Vec::with_capacity(corner_lon.nrows());

    for (lons, lats) in corner_lon.outer_iter().zip(corner_lat.outer_iter()) {
        let mut face: Vec<i64> = Vec::with_capacity(lons.len());
        for (lon, lat) in lons.iter().zip(lats.iter()) {
            let node = *nodes.entry((key(*lon), key(*lat))).or_insert_with(|| {
                node_x.push(*lon);
                node_y.push(*lat);
                node_x.len() as i64 - 1
            });
            // degenerate cells repeat their last corner
            if face.last() != Some(&node) {
                face.push(node);
            }
        }
        if face.len() > 1 && face.first() == face.last() {
            face.pop();
        }
        faces.push(face);
    }

    log::debug!(
        "merged {} scrip corners into {} nodes",
        corner_lon.len(),
        node_x.len()
    );

    let mut mesh = Mesh::new(Array1::from(node_x), Array1::from(node_y), pad_faces(&faces))?;

    if let (Some(lon), Some(lat)) = (
        handle.variable("grid_center_lon"),
        handle.variable("grid_center_lat"),
    ) {
        let lon = lon.values().to_f64().ok_or_else(|| text_variable("grid_center_lon"))?;
        let lat = lat.values().to_f64().ok_or_else(|| text_variable("grid_center_lat"))?;
        mesh = mesh.with_face_centers(Array1::from(lon), Array1::from(lat))?;
    }

    Ok(mesh)
}

fn corners(var: &Variable) -> Result<Array2<f64>, Error> {
    var.to_array()
        .and_then(|a| a.into_dimensionality::<ndarray::Ix2>().ok())
        .ok_or_else(|| {
            Error::InvalidTopology(format!(
                "`{}` must be a numeric (grid_size, grid_corners) array, found dimensions {:?}",
                var.name(),
                var.dims()
            ))
        })
}

fn text_variable(name: &str) -> Error {
    Error::InvalidTopology(format!("`{name}` holds text"))
}

// -0.0 and 0.0 are the same corner
fn key(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::FILL_VALUE;
    use ndarray::array;

    fn two_cells() -> Dataset {
        let mut ds = Dataset::new();
        ds.add_dimension("grid_size", 2).unwrap();
        ds.add_dimension("grid_corners", 4).unwrap();
        ds.add_variable("grid_center_lon", &["grid_size"], vec![0.5f64, 1.5]).unwrap();
        ds.add_variable("grid_center_lat", &["grid_size"], vec![0.5f64, 0.5]).unwrap();
        ds.add_variable(
            "grid_corner_lon",
            &["grid_size", "grid_corners"],
            vec![0.0f64, 1.0, 1.0, 0.0, 1.0, 2.0, 1.0, 1.0],
        )
        .unwrap();
        ds.add_variable(
            "grid_corner_lat",
            &["grid_size", "grid_corners"],
            vec![0.0f64, 0.0, 1.0, 1.0, -0.0, 0.0, 1.0, 1.0],
        )
        .unwrap();
        ds
    }

    #[test]
    fn shared_corners_become_one_node() {
        let mesh = read(&two_cells()).unwrap();
        assert_eq!(mesh.n_node(), 5);
        assert_eq!(mesh.face_nodes(), &array![[0, 1, 2, 3], [1, 4, 2, FILL_VALUE]]);
        assert_eq!(mesh.face_x().unwrap().to_vec(), vec![0.5, 1.5]);
        assert_eq!(mesh.face_polygon(1), vec![[1.0, 0.0], [2.0, 0.0], [1.0, 1.0]]);
    }

    #[test]
    fn corners_are_required() {
        let mut ds = Dataset::new();
        ds.add_dimension("grid_size", 1).unwrap();
        ds.add_variable("grid_center_lon", &["grid_size"], vec![0.0f64]).unwrap();
        let err = read(&ds).unwrap_err();
        assert!(matches!(err, Error::MissingVariable(name) if name == "grid_corner_lon"));
    }
}
