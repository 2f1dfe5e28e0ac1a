//! UGRID conventions: the native layout of a [`Mesh`] on disk
use super::mesh::FILL_VALUE;
use super::{coordinate, required};
use crate::prelude::*;

pub(crate) const TOPOLOGY: &str = "Mesh2";
const NODE_X: &str = "Mesh2_node_x";
const NODE_Y: &str = "Mesh2_node_y";
const NODE_Z: &str = "Mesh2_node_z";
const FACE_X: &str = "Mesh2_face_x";
const FACE_Y: &str = "Mesh2_face_y";
const FACE_NODES: &str = "Mesh2_face_nodes";

const NODE_DIM: &str = "nMesh2_node";
const FACE_DIM: &str = "nMesh2_face";
const MAX_FACE_NODES_DIM: &str = "nMaxMesh2_face_nodes";

/// map a UGRID dataset onto a mesh
///
/// The topology variable is the first variable with `cf_role = "mesh_topology"`, or
/// `Mesh2` if no variable declares the role. Its `node_coordinates`,
/// `face_node_connectivity` and `face_coordinates` attributes name the variables to read.
pub(crate) fn read(handle: &Dataset) -> Result<Mesh, Error> {
    let topology = handle
        .variables()
        .iter()
        .find(|var| var.attribute_text("cf_role").as_deref() == Some("mesh_topology"))
        .map_or_else(|| required(handle, TOPOLOGY), Ok)?;

    let node_names = topology
        .attribute_text("node_coordinates")
        .unwrap_or_else(|| format!("{NODE_X} {NODE_Y}"));
    let node_names: Vec<&str> = node_names.split_whitespace().collect();
    if node_names.len() < 2 {
        return Err(Error::InvalidTopology(format!(
            "`{}` names {} node coordinate variables, at least two are needed",
            topology.name(),
            node_names.len()
        )));
    }

    let node_x = coordinate(handle, node_names[0])?;
    let node_y = coordinate(handle, node_names[1])?;

    let connectivity_name = topology
        .attribute_text("face_node_connectivity")
        .unwrap_or_else(|| FACE_NODES.into());
    let face_nodes = connectivity(required(handle, connectivity_name.trim())?)?;

    let topology_dimension = topology
        .attribute_f64("topology_dimension")
        .filter(|dim| *dim > 0.0)
        .map_or(2, |dim| dim as usize);

    let mut mesh =
        Mesh::new(node_x, node_y, face_nodes)?.with_topology_dimension(topology_dimension);

    // the z coordinate is listed by some writers without being stored
    if let Some(z_name) = node_names.get(2) {
        if handle.variable(z_name).is_some() {
            mesh = mesh.with_node_z(coordinate(handle, z_name)?)?;
        }
    }

    if let Some(face_names) = topology.attribute_text("face_coordinates") {
        let face_names: Vec<&str> = face_names.split_whitespace().collect();
        if let [x, y, ..] = face_names[..] {
            mesh = mesh.with_face_centers(coordinate(handle, x)?, coordinate(handle, y)?)?;
        }
    }

    Ok(mesh)
}

/// 0-based connectivity with [`FILL_VALUE`] padding from a connectivity variable
///
/// Values equal to the variable's `_FillValue` (or `NaN` after CF decoding) become
/// padding, every other value is shifted by the variable's `start_index`.
fn connectivity(var: &Variable) -> Result<Array2<i64>, Error> {
    if var.shape().len() != 2 {
        return Err(Error::InvalidTopology(format!(
            "connectivity `{}` must be two dimensional, found dimensions {:?}",
            var.name(),
            var.dims()
        )));
    }

    let raw = var.to_array().ok_or_else(|| {
        Error::InvalidTopology(format!("connectivity `{}` holds text", var.name()))
    })?;
    let fill = var.attribute_f64("_FillValue");
    let start_index = var.attribute_f64("start_index").unwrap_or(0.0) as i64;

    let raw = raw
        .into_dimensionality::<ndarray::Ix2>()
        .map_err(|e| Error::InvalidTopology(e.to_string()))?;

    Ok(raw.mapv(|node| {
        if node.is_nan() || Some(node) == fill {
            FILL_VALUE
        } else {
            node as i64 - start_index
        }
    }))
}

/// the UGRID dataset describing `mesh`, as written by [`write_ugrid`]
pub fn to_dataset(mesh: &Mesh) -> Result<Dataset, Error> {
    let mut ds = Dataset::new();
    ds.add_dimension(NODE_DIM, mesh.n_node())?;
    ds.add_dimension(FACE_DIM, mesh.n_face())?;
    ds.add_dimension(MAX_FACE_NODES_DIM, mesh.n_max_face_nodes())?;

    let mut node_coordinates = format!("{NODE_X} {NODE_Y}");
    if mesh.node_z().is_some() {
        node_coordinates.push(' ');
        node_coordinates.push_str(NODE_Z);
    }

    let topology = ds.add_variable(TOPOLOGY, &[], 0i32)?;
    topology
        .add_attribute("cf_role", "mesh_topology")
        .add_attribute("long_name", "Topology data of unstructured mesh")
        .add_attribute("topology_dimension", mesh.topology_dimension() as i32)
        .add_attribute("node_coordinates", node_coordinates)
        .add_attribute("node_dimension", NODE_DIM)
        .add_attribute("face_node_connectivity", FACE_NODES)
        .add_attribute("face_dimension", FACE_DIM);
    if mesh.face_x().is_some() {
        topology.add_attribute("face_coordinates", format!("{FACE_X} {FACE_Y}"));
    }

    ds.add_variable(NODE_X, &[NODE_DIM], mesh.node_x().to_vec())?
        .add_attribute("long_name", "x coordinate of mesh nodes");
    ds.add_variable(NODE_Y, &[NODE_DIM], mesh.node_y().to_vec())?
        .add_attribute("long_name", "y coordinate of mesh nodes");
    if let Some(z) = mesh.node_z() {
        ds.add_variable(NODE_Z, &[NODE_DIM], z.to_vec())?
            .add_attribute("long_name", "z coordinate of mesh nodes");
    }

    if let (Some(x), Some(y)) = (mesh.face_x(), mesh.face_y()) {
        ds.add_variable(FACE_X, &[FACE_DIM], x.to_vec())?
            .add_attribute("long_name", "x coordinate of face centers");
        ds.add_variable(FACE_Y, &[FACE_DIM], y.to_vec())?
            .add_attribute("long_name", "y coordinate of face centers");
    }

    let face_nodes = mesh
        .face_nodes()
        .iter()
        .map(|node| i32::try_from(*node))
        .collect::<Result<Vec<i32>, _>>()
        .map_err(|_| Error::InvalidTopology("node index does not fit a 32 bit integer".into()))?;
    ds.add_variable(FACE_NODES, &[FACE_DIM, MAX_FACE_NODES_DIM], face_nodes)?
        .add_attribute("cf_role", "face_node_connectivity")
        .add_attribute("_FillValue", FILL_VALUE as i32)
        .add_attribute("start_index", 0i32);

    Ok(ds)
}

/// write `mesh` as a UGRID file
pub fn write_ugrid<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<(), Error> {
    let ds = to_dataset(mesh)?;
    container::write_file(path.as_ref(), &ds)?;
    log::info!("wrote ugrid mesh to `{}`", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn quads() -> Mesh {
        let x = array![0.0, 1.0, 2.0, 0.0, 1.0, 2.0];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        Mesh::new(x, y, array![[0, 1, 4, 3], [1, 2, 5, FILL_VALUE]]).unwrap()
    }

    #[test]
    fn dataset_layout() {
        let ds = to_dataset(&quads()).unwrap();
        assert_eq!(ds.dimension(NODE_DIM).map(|d| d.len), Some(6));
        assert_eq!(ds.dimension(MAX_FACE_NODES_DIM).map(|d| d.len), Some(4));

        let topology = ds.variable(TOPOLOGY).unwrap();
        assert_eq!(topology.attribute_text("cf_role").as_deref(), Some("mesh_topology"));
        assert_eq!(
            topology.attribute_text("node_coordinates").as_deref(),
            Some("Mesh2_node_x Mesh2_node_y")
        );

        let faces = ds.variable(FACE_NODES).unwrap();
        assert_eq!(faces.values(), &Values::Int(vec![0, 1, 4, 3, 1, 2, 5, -1]));
        assert_eq!(faces.attribute_f64("_FillValue"), Some(-1.0));
    }

    #[test]
    fn read_back() {
        let mesh = quads()
            .with_node_z(Array1::from_elem(6, 1.0))
            .unwrap()
            .with_face_centers(array![0.5, 1.5], array![0.5, 0.5])
            .unwrap();
        let ds = to_dataset(&mesh).unwrap();
        assert_eq!(read(&ds).unwrap(), mesh);
    }

    #[test]
    fn one_based_connectivity() {
        let mut ds = Dataset::new();
        ds.add_dimension("n_node", 3).unwrap();
        ds.add_dimension("n_face", 1).unwrap();
        ds.add_dimension("n_max", 4).unwrap();
        ds.add_variable("mesh", &[], 0i32)
            .unwrap()
            .add_attribute("cf_role", "mesh_topology")
            .add_attribute("node_coordinates", "lon lat")
            .add_attribute("face_node_connectivity", "faces");
        ds.add_variable("lon", &["n_node"], vec![0.0, 10.0, 5.0]).unwrap();
        ds.add_variable("lat", &["n_node"], vec![0.0, 0.0, 10.0]).unwrap();
        ds.add_variable("faces", &["n_face", "n_max"], vec![1i32, 2, 3, 999])
            .unwrap()
            .add_attribute("start_index", 1i32)
            .add_attribute("_FillValue", 999i32);

        let mesh = read(&ds).unwrap();
        assert_eq!(mesh.face_nodes(), &array![[0, 1, 2, FILL_VALUE]]);
        assert_eq!(mesh.face(0), vec![0, 1, 2]);
        assert_eq!(mesh.node_x()[1], 10.0);
    }

    #[test]
    fn decoded_fill_values_are_padding() {
        let ds = container::cf::decode(to_dataset(&quads()).unwrap());
        assert_eq!(read(&ds).unwrap().face(1), vec![1, 2, 5]);
    }

    #[test]
    fn missing_topology() {
        let mut ds = Dataset::new();
        ds.add_dimension("Mesh2", 1).unwrap();
        let err = read(&ds).unwrap_err();
        assert!(matches!(err, Error::MissingVariable(name) if name == "Mesh2"));
    }

    #[test]
    fn missing_coordinates() {
        let mut ds = to_dataset(&quads()).unwrap();
        ds.variable_mut(TOPOLOGY)
            .unwrap()
            .add_attribute("node_coordinates", "lon lat");
        let err = read(&ds).unwrap_err();
        assert!(matches!(err, Error::MissingVariable(name) if name == "lon"));
    }
}
