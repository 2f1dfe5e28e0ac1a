use crate::prelude::*;

use ndarray::{ArrayViewD, Ix2};

/// marks unused slots of faces with fewer nodes than the widest face
pub const FILL_VALUE: i64 = -1;

/// node coordinates and face-node connectivity of an unstructured mesh
///
/// Faces are stored as rows of a `(n_face, n_max_face_nodes)` array of 0-based node
/// indices. Faces with fewer nodes than the widest face are padded with [`FILL_VALUE`].
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    node_x: Array1<f64>,
    node_y: Array1<f64>,
    node_z: Option<Array1<f64>>,
    face_x: Option<Array1<f64>>,
    face_y: Option<Array1<f64>>,
    face_nodes: Array2<i64>,
    topology_dimension: usize,
}

impl Mesh {
    /// build a two dimensional mesh, checking that every face refers to existing nodes
    pub fn new(
        node_x: Array1<f64>,
        node_y: Array1<f64>,
        face_nodes: Array2<i64>,
    ) -> Result<Self, Error> {
        if node_x.len() != node_y.len() {
            return Err(Error::InvalidTopology(format!(
                "{} x coordinates but {} y coordinates",
                node_x.len(),
                node_y.len()
            )));
        }

        let n_node = node_x.len() as i64;
        if let Some(bad) = face_nodes
            .iter()
            .find(|idx| **idx != FILL_VALUE && !(0..n_node).contains(*idx))
        {
            return Err(Error::InvalidTopology(format!(
                "face refers to node {bad} but the mesh has {n_node} nodes"
            )));
        }

        Ok(Mesh {
            node_x,
            node_y,
            node_z: None,
            face_x: None,
            face_y: None,
            face_nodes,
            topology_dimension: 2,
        })
    }

    /// build a mesh from faces given as lists of node indices of varying length
    pub fn from_face_lists(
        node_x: Array1<f64>,
        node_y: Array1<f64>,
        faces: &[Vec<i64>],
    ) -> Result<Self, Error> {
        Mesh::new(node_x, node_y, pad_faces(faces))
    }

    /// a mesh with a single face made of every vertex in input order
    ///
    /// `vertices` must be a `(N, k)` array with `N >= 1` and `k >= 2`. The first two columns
    /// become the node coordinates, and `k` becomes the topology dimension.
    pub fn from_vertices(vertices: ArrayViewD<f64>) -> Result<Self, Error> {
        let shape = vertices.shape().to_vec();
        let vertices = vertices.into_dimensionality::<Ix2>().map_err(|_| {
            Error::MalformedVertexInput(format!(
                "expected a two dimensional (N, 2) array, got shape {shape:?}"
            ))
        })?;

        let (n, columns) = vertices.dim();
        if columns < 2 {
            return Err(Error::MalformedVertexInput(format!(
                "vertices need at least two coordinate columns, got {columns}"
            )));
        }
        if n == 0 {
            return Err(Error::MalformedVertexInput(
                "at least one vertex is required".into(),
            ));
        }

        let node_x = vertices.column(0).to_owned();
        let node_y = vertices.column(1).to_owned();
        // single face with all nodes
        let face_nodes = Array2::from_shape_fn((1, n), |(_, j)| j as i64);

        Ok(Mesh::new(node_x, node_y, face_nodes)?.with_topology_dimension(columns))
    }

    pub fn with_node_z(mut self, node_z: Array1<f64>) -> Result<Self, Error> {
        if node_z.len() != self.n_node() {
            return Err(Error::InvalidTopology(format!(
                "{} z coordinates for {} nodes",
                node_z.len(),
                self.n_node()
            )));
        }
        self.node_z = Some(node_z);
        Ok(self)
    }

    pub fn with_face_centers(mut self, face_x: Array1<f64>, face_y: Array1<f64>) -> Result<Self, Error> {
        if face_x.len() != self.n_face() || face_y.len() != self.n_face() {
            return Err(Error::InvalidTopology(format!(
                "{} x and {} y face centers for {} faces",
                face_x.len(),
                face_y.len(),
                self.n_face()
            )));
        }
        self.face_x = Some(face_x);
        self.face_y = Some(face_y);
        Ok(self)
    }

    pub fn with_topology_dimension(mut self, topology_dimension: usize) -> Self {
        self.topology_dimension = topology_dimension;
        self
    }

    pub fn node_x(&self) -> &Array1<f64> {
        &self.node_x
    }

    pub fn node_y(&self) -> &Array1<f64> {
        &self.node_y
    }

    pub fn node_z(&self) -> Option<&Array1<f64>> {
        self.node_z.as_ref()
    }

    pub fn face_x(&self) -> Option<&Array1<f64>> {
        self.face_x.as_ref()
    }

    pub fn face_y(&self) -> Option<&Array1<f64>> {
        self.face_y.as_ref()
    }

    pub fn face_nodes(&self) -> &Array2<i64> {
        &self.face_nodes
    }

    pub fn topology_dimension(&self) -> usize {
        self.topology_dimension
    }

    pub fn n_node(&self) -> usize {
        self.node_x.len()
    }

    pub fn n_face(&self) -> usize {
        self.face_nodes.nrows()
    }

    pub fn n_max_face_nodes(&self) -> usize {
        self.face_nodes.ncols()
    }

    /// node indices of face `idx` without the fill padding
    ///
    /// ## Panics
    ///
    /// if `idx` is not smaller than [`n_face`](Self::n_face)
    pub fn face(&self, idx: usize) -> Vec<usize> {
        self.face_nodes
            .row(idx)
            .iter()
            .filter(|node| **node != FILL_VALUE)
            .map(|node| *node as usize)
            .collect()
    }

    pub fn faces(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        (0..self.n_face()).map(move |idx| self.face(idx))
    }

    /// `(x, y)` coordinates of the nodes of face `idx`, in connectivity order
    pub fn face_polygon(&self, idx: usize) -> Vec<[f64; 2]> {
        self.face(idx)
            .into_iter()
            .map(|node| [self.node_x[node], self.node_y[node]])
            .collect()
    }
}

/// lay out faces of varying length as rows padded with [`FILL_VALUE`]
pub(crate) fn pad_faces(faces: &[Vec<i64>]) -> Array2<i64> {
    let width = faces.iter().map(Vec::len).max().unwrap_or(0);
    let mut padded = Array2::from_elem((faces.len(), width), FILL_VALUE);
    for (mut row, face) in padded.axis_iter_mut(Axis(0)).zip(faces) {
        for (slot, node) in row.iter_mut().zip(face) {
            *slot = *node;
        }
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn vertices_make_one_face() {
        let vertices = array![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [-0.5, 0.5]];
        let mesh = Mesh::from_vertices(vertices.view().into_dyn()).unwrap();

        assert_eq!(mesh.n_face(), 1);
        assert_eq!(mesh.face(0), vec![0, 1, 2, 3, 4]);
        assert_eq!(mesh.node_x(), &vertices.column(0).to_owned());
        assert_eq!(mesh.node_y(), &vertices.column(1).to_owned());
        assert_eq!(mesh.topology_dimension(), 2);
    }

    #[test]
    fn extra_columns_set_the_topology_dimension() {
        let vertices = array![[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0]];
        let mesh = Mesh::from_vertices(vertices.view().into_dyn()).unwrap();
        assert_eq!(mesh.topology_dimension(), 3);
        assert_eq!(mesh.node_y().to_vec(), vec![0.0, 0.0, 1.0]);
        assert!(mesh.node_z().is_none());
    }

    #[test]
    fn malformed_vertices() {
        let one_column = Array2::<f64>::zeros((4, 1));
        let err = Mesh::from_vertices(one_column.view().into_dyn()).unwrap_err();
        assert!(matches!(err, Error::MalformedVertexInput(_)));

        let empty = Array2::<f64>::zeros((0, 2));
        let err = Mesh::from_vertices(empty.view().into_dyn()).unwrap_err();
        assert!(matches!(err, Error::MalformedVertexInput(_)));

        let flat = ndarray::Array1::<f64>::zeros(6);
        let err = Mesh::from_vertices(flat.view().into_dyn()).unwrap_err();
        assert!(matches!(err, Error::MalformedVertexInput(_)));
    }

    #[test]
    fn padded_faces() {
        let faces = vec![vec![0, 1, 2], vec![1, 3, 4, 2]];
        let padded = pad_faces(&faces);
        assert_eq!(padded, array![[0, 1, 2, FILL_VALUE], [1, 3, 4, 2]]);

        let x = Array1::from(vec![0.0, 1.0, 0.5, 2.0, 1.5]);
        let y = Array1::from(vec![0.0, 0.0, 1.0, 0.0, 1.0]);
        let mesh = Mesh::from_face_lists(x, y, &faces).unwrap();
        assert_eq!(mesh.face(0), vec![0, 1, 2]);
        assert_eq!(mesh.face_polygon(0), vec![[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]]);
        assert_eq!(mesh.faces().count(), 2);
    }

    #[test]
    fn faces_must_refer_to_nodes() {
        let x = Array1::from(vec![0.0, 1.0]);
        let y = Array1::from(vec![0.0, 1.0]);
        let err = Mesh::new(x, y, array![[0, 1, 2]]).unwrap_err();
        assert!(matches!(err, Error::InvalidTopology(_)));
    }

    #[test]
    fn face_centers_must_match() {
        let mesh = Mesh::from_vertices(array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]].view().into_dyn())
            .unwrap();
        let err = mesh
            .clone()
            .with_face_centers(Array1::zeros(2), Array1::zeros(2))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTopology(_)));

        let mesh = mesh
            .with_face_centers(Array1::from(vec![0.3]), Array1::from(vec![0.3]))
            .unwrap();
        assert_eq!(mesh.face_x().map(|x| x[0]), Some(0.3));
    }
}
