//! Exodus II meshes
//!
//! Node coordinates are stored either as a single `coord` variable of shape
//! `(num_dim, num_nodes)` or as separate `coordx`, `coordy` (and `coordz`) variables. Faces
//! live in element blocks `connect1`, `connect2`, ... each holding elements with the same
//! number of nodes, numbered from 1.
use super::{coordinate, pad_faces, required};
use crate::prelude::*;

use std::collections::BTreeMap;

/// map an Exodus dataset onto a mesh
pub(crate) fn read(handle: &Dataset) -> Result<Mesh, Error> {
    let (mut coords, num_dim) = match handle.variable("coord") {
        Some(coord) => {
            let array = coord
                .to_array()
                .and_then(|a| a.into_dimensionality::<ndarray::Ix2>().ok())
                .ok_or_else(|| {
                    Error::InvalidTopology(format!(
                        "`coord` must be a numeric (num_dim, num_nodes) array, found dimensions {:?}",
                        coord.dims()
                    ))
                })?;
            let rows: Vec<Array1<f64>> = array.outer_iter().map(|row| row.to_owned()).collect();
            let num_dim = rows.len();
            (rows, num_dim)
        }
        None => {
            if handle.variable("coordx").is_none() {
                return Err(Error::MissingVariable("coord".into()));
            }
            let mut rows = vec![coordinate(handle, "coordx")?, coordinate(handle, "coordy")?];
            if handle.variable("coordz").is_some() {
                rows.push(coordinate(handle, "coordz")?);
            }
            let num_dim = rows.len();
            (rows, num_dim)
        }
    };

    if coords.len() < 2 {
        return Err(Error::InvalidTopology(format!(
            "exodus mesh has {} coordinate dimensions, at least two are needed",
            coords.len()
        )));
    }

    let faces = blocks(handle)?;
    if faces.is_empty() {
        return Err(Error::MissingVariable("connect1".into()));
    }

    let node_z = if coords.len() > 2 { coords.pop() } else { None };
    let node_y = coords.pop().unwrap_or_default();
    let node_x = coords.pop().unwrap_or_default();

    let topology_dimension = handle.dimension("num_dim").map_or(num_dim, |dim| dim.len);

    let mut mesh = Mesh::new(node_x, node_y, pad_faces(&faces))?
        .with_topology_dimension(topology_dimension);
    if let Some(z) = node_z {
        mesh = mesh.with_node_z(z)?;
    }
    Ok(mesh)
}

/// the faces of every `connectN` block in block order, 0-based
fn blocks(handle: &Dataset) -> Result<Vec<Vec<i64>>, Error> {
    let mut numbered: Vec<(u32, &Variable)> = handle
        .variables()
        .iter()
        .filter_map(|var| {
            let number = var.name().strip_prefix("connect")?.parse().ok()?;
            Some((number, var))
        })
        .collect();
    numbered.sort_by_key(|(number, _)| *number);

    let mut faces = Vec::new();
    for (_, var) in numbered {
        let block = var
            .to_int_array()
            .and_then(|a| a.into_dimensionality::<ndarray::Ix2>().ok())
            .ok_or_else(|| {
                Error::InvalidTopology(format!(
                    "element block `{}` must be a numeric (num_el_in_blk, num_nod_per_el) array",
                    var.name()
                ))
            })?;
        for element in block.outer_iter() {
            let face = element
                .iter()
                .map(|node| node.checked_sub(1).filter(|index| *index >= 0))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| {
                    Error::InvalidTopology(format!(
                        "element block `{}` holds a node number below 1",
                        var.name()
                    ))
                })?;
            faces.push(face);
        }
    }
    Ok(faces)
}

fn element_type(nodes_per_element: usize) -> &'static str {
    match nodes_per_element {
        3 => "TRI3",
        4 => "SHELL4",
        _ => "NSIDED",
    }
}

/// the Exodus dataset describing `mesh`, as written by [`write_exodus`]
///
/// Faces are grouped into one element block per face size, in increasing order of size,
/// so the face order of the mesh is only preserved when all faces have the same size.
pub fn to_dataset(mesh: &Mesh) -> Result<Dataset, Error> {
    let mut by_width: BTreeMap<usize, Vec<Vec<usize>>> = BTreeMap::new();
    for face in mesh.faces() {
        by_width.entry(face.len()).or_default().push(face);
    }

    let num_dim = if mesh.node_z().is_some() { 3 } else { 2 };

    let mut ds = Dataset::new();
    ds.add_attribute("api_version", 5.0f32)
        .add_attribute("version", 5.0f32)
        .add_attribute("floating_point_word_size", 8i32)
        .add_attribute("file_size", 1i32)
        .add_attribute("title", "uxgrid exodus mesh");

    ds.add_dimension("len_string", 33)?;
    ds.add_dimension("len_line", 81)?;
    ds.add_dimension("four", 4)?;
    ds.add_dimension("num_dim", num_dim)?;
    ds.add_dimension("num_nodes", mesh.n_node())?;
    ds.add_dimension("num_elem", mesh.n_face())?;
    ds.add_dimension("num_el_blk", by_width.len())?;

    ds.add_variable("coordx", &["num_nodes"], mesh.node_x().to_vec())?;
    ds.add_variable("coordy", &["num_nodes"], mesh.node_y().to_vec())?;
    if let Some(z) = mesh.node_z() {
        ds.add_variable("coordz", &["num_nodes"], z.to_vec())?;
    }

    for (idx, (width, faces)) in by_width.into_iter().enumerate() {
        let block = idx + 1;
        let elements = format!("num_el_in_blk{block}");
        let nodes = format!("num_nod_per_el{block}");
        ds.add_dimension(&elements, faces.len())?;
        ds.add_dimension(&nodes, width)?;

        let connect = faces
            .iter()
            .flatten()
            .map(|node| i32::try_from(*node + 1))
            .collect::<Result<Vec<i32>, _>>()
            .map_err(|_| Error::InvalidTopology("node index does not fit a 32 bit integer".into()))?;
        ds.add_variable(&format!("connect{block}"), &[elements.as_str(), nodes.as_str()], connect)?
            .add_attribute("elem_type", element_type(width));
    }

    Ok(ds)
}

/// write `mesh` as an Exodus II file
pub fn write_exodus<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<(), Error> {
    let ds = to_dataset(mesh)?;
    container::write_file(path.as_ref(), &ds)?;
    log::info!("wrote exodus mesh to `{}`", path.as_ref().display());
    Ok(())
}
