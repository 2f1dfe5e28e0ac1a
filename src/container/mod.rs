//! self-describing array containers
//!
//! A [`Dataset`] is the in-memory form of a netCDF file: an ordered list of dimensions,
//! global attributes, and variables. Variables carry their own attributes and typed values.
//! This is the "structured dataset handle" that the format classifier inspects and that the
//! grid readers consume.
//!
//! Files go through the `netcdf` crate, so every flavour libnetcdf understands can be
//! read, the classic formats as well as netCDF-4 on HDF5 (see [`read_file`]). Datasets are
//! written as netCDF-4.
//!
//! ```
//! use uxgrid::container::{Dataset, Values};
//!
//! let mut ds = Dataset::new();
//! ds.add_dimension("nMesh2_node", 3).unwrap();
//! ds.add_variable("Mesh2_node_x", &["nMesh2_node"], vec![0.0f64, 1.0, 0.5])
//!     .unwrap()
//!     .add_attribute("standard_name", "longitude");
//!
//! let x = ds.variable("Mesh2_node_x").unwrap();
//! assert_eq!(x.values(), &Values::Double(vec![0.0, 1.0, 0.5]));
//! assert!(ds.contains("nMesh2_node"));
//! ```

pub mod cf;
mod error;
mod file;

pub use error::{DatasetError, FileError, UnsupportedType};
pub use file::{read_file, write_file};

use derive_more::Constructor;
use ndarray::{ArrayD, IxDyn};
use num_traits::AsPrimitive;
use std::fmt::{self, Write as _};

/// external type of a variable or attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NcType {
    Byte,
    Char,
    Short,
    Int,
    Float,
    Double,
    UByte,
    UShort,
    UInt,
    Int64,
    UInt64,
}

impl NcType {
    /// name of the type in CDL
    pub fn cdl_name(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Float => "float",
            Self::Double => "double",
            Self::UByte => "ubyte",
            Self::UShort => "ushort",
            Self::UInt => "uint",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
        }
    }
}

impl fmt::Display for NcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cdl_name())
    }
}

/// typed values of a variable or attribute
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Byte(Vec<i8>),
    Char(Vec<u8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    UByte(Vec<u8>),
    UShort(Vec<u16>),
    UInt(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
}

// apply the same expression to the vector inside every numeric variant,
// evaluating `$text` for character data
macro_rules! numeric {
    ($values:expr, $v:ident => $numeric:expr, $text:expr) => {
        match $values {
            Values::Byte($v) => Some($numeric),
            Values::Short($v) => Some($numeric),
            Values::Int($v) => Some($numeric),
            Values::Float($v) => Some($numeric),
            Values::Double($v) => Some($numeric),
            Values::UByte($v) => Some($numeric),
            Values::UShort($v) => Some($numeric),
            Values::UInt($v) => Some($numeric),
            Values::Int64($v) => Some($numeric),
            Values::UInt64($v) => Some($numeric),
            Values::Char(_) => $text,
        }
    };
}

impl Values {
    pub fn nc_type(&self) -> NcType {
        match self {
            Self::Byte(_) => NcType::Byte,
            Self::Char(_) => NcType::Char,
            Self::Short(_) => NcType::Short,
            Self::Int(_) => NcType::Int,
            Self::Float(_) => NcType::Float,
            Self::Double(_) => NcType::Double,
            Self::UByte(_) => NcType::UByte,
            Self::UShort(_) => NcType::UShort,
            Self::UInt(_) => NcType::UInt,
            Self::Int64(_) => NcType::Int64,
            Self::UInt64(_) => NcType::UInt64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Char(v) => v.len(),
            other => numeric!(other, v => v.len(), None).unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Char(_))
    }

    /// every value widened (or narrowed) to `f64`. `None` for character data
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        numeric!(self, v => v.iter().map(|x| AsPrimitive::<f64>::as_(*x)).collect(), None)
    }

    /// every value converted to `i64`, truncating floating point values.
    /// `None` for character data
    pub fn to_i64(&self) -> Option<Vec<i64>> {
        numeric!(self, v => v.iter().map(|x| AsPrimitive::<i64>::as_(*x)).collect(), None)
    }

    /// the first value as `f64`, the usual way to read a scalar attribute
    pub fn first_f64(&self) -> Option<f64> {
        numeric!(self, v => v.first().map(|x| AsPrimitive::<f64>::as_(*x)), None).flatten()
    }

    /// character data as a string, with trailing NUL padding removed
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Char(bytes) => {
                let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
                Some(String::from_utf8_lossy(&bytes[..end]).into_owned())
            }
            _ => None,
        }
    }

    /// format the values the way they appear in a CDL header
    fn cdl(&self) -> String {
        if let Some(text) = self.as_text() {
            return format!("\"{}\"", text.escape_default());
        }

        let suffix = match self.nc_type() {
            NcType::Byte => "b",
            NcType::Short => "s",
            NcType::Float => "f",
            NcType::UByte => "ub",
            NcType::UShort => "us",
            NcType::UInt => "u",
            NcType::Int64 => "ll",
            NcType::UInt64 => "ull",
            _ => "",
        };

        let mut out = String::new();
        let floats = matches!(self, Self::Float(_) | Self::Double(_));
        for (idx, value) in self.to_f64().unwrap_or_default().into_iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            if floats {
                let mut buffer = ryu::Buffer::new();
                out.push_str(buffer.format(value));
            } else {
                let _ = write!(out, "{}", value as i64);
            }
            out.push_str(suffix);
        }
        out
    }
}

macro_rules! values_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for Values {
                fn from(x: Vec<$ty>) -> Self {
                    Values::$variant(x)
                }
            }

            impl From<$ty> for Values {
                fn from(x: $ty) -> Self {
                    Values::$variant(vec![x])
                }
            }
        )*
    };
}

values_from!(
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    f32 => Float,
    f64 => Double,
    u8 => UByte,
    u16 => UShort,
    u32 => UInt,
    i64 => Int64,
    u64 => UInt64,
);

impl From<&str> for Values {
    fn from(x: &str) -> Self {
        Values::Char(x.as_bytes().to_vec())
    }
}

impl From<String> for Values {
    fn from(x: String) -> Self {
        Values::Char(x.into_bytes())
    }
}

/// a named, typed attribute
#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct Attribute {
    pub name: String,
    pub value: Values,
}

impl Attribute {
    pub fn text(&self) -> Option<String> {
        self.value.as_text()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub name: String,
    pub len: usize,
    /// grows as values are appended along it
    pub unlimited: bool,
}

/// a named n-dimensional array with attributes
///
/// Variables are created through [`Dataset::add_variable`], which checks that the shape
/// implied by the dimensions matches the number of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    dims: Vec<String>,
    shape: Vec<usize>,
    attributes: Vec<Attribute>,
    values: Values,
}

impl Variable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn nc_type(&self) -> NcType {
        self.values.nc_type()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|att| att.name == name)
    }

    pub fn attribute_text(&self, name: &str) -> Option<String> {
        self.attribute(name).and_then(Attribute::text)
    }

    pub fn attribute_f64(&self, name: &str) -> Option<f64> {
        self.attribute(name).and_then(|att| att.value.first_f64())
    }

    /// set an attribute, replacing any existing attribute of the same name
    pub fn add_attribute<V: Into<Values>>(&mut self, name: &str, value: V) -> &mut Self {
        upsert(&mut self.attributes, Attribute::new(name.into(), value.into()));
        self
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<Attribute> {
        let idx = self.attributes.iter().position(|att| att.name == name)?;
        Some(self.attributes.remove(idx))
    }

    /// the values as an `f64` array in the shape of the variable
    ///
    /// returns `None` for character variables
    pub fn to_array(&self) -> Option<ArrayD<f64>> {
        let flat = self.values.to_f64()?;
        ArrayD::from_shape_vec(IxDyn(&self.shape), flat).ok()
    }

    /// the values as an `i64` array in the shape of the variable
    pub fn to_int_array(&self) -> Option<ArrayD<i64>> {
        let flat = self.values.to_i64()?;
        ArrayD::from_shape_vec(IxDyn(&self.shape), flat).ok()
    }

    pub(crate) fn replace_values(&mut self, values: Values) {
        debug_assert_eq!(values.len(), self.values.len());
        self.values = values;
    }
}

/// an in-memory structured dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    dimensions: Vec<Dimension>,
    attributes: Vec<Attribute>,
    variables: Vec<Variable>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dimension(&mut self, name: &str, len: usize) -> Result<&Dimension, DatasetError> {
        self.push_dimension(name, len, false)
    }

    /// add an unlimited dimension currently holding `len` entries
    pub fn add_unlimited_dimension(
        &mut self,
        name: &str,
        len: usize,
    ) -> Result<&Dimension, DatasetError> {
        self.push_dimension(name, len, true)
    }

    fn push_dimension(
        &mut self,
        name: &str,
        len: usize,
        unlimited: bool,
    ) -> Result<&Dimension, DatasetError> {
        check_name(name)?;
        if self.dimension(name).is_some() {
            return Err(DatasetError::DuplicateDimension(name.into()));
        }
        self.dimensions.push(Dimension {
            name: name.into(),
            len,
            unlimited,
        });
        Ok(&self.dimensions[self.dimensions.len() - 1])
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|dim| dim.name == name)
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// set a global attribute, replacing any existing attribute of the same name
    pub fn add_attribute<V: Into<Values>>(&mut self, name: &str, value: V) -> &mut Self {
        upsert(&mut self.attributes, Attribute::new(name.into(), value.into()));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|att| att.name == name)
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// add a variable over the named dimensions
    ///
    /// A variable with no dimensions is a scalar and holds exactly one value.
    pub fn add_variable<V: Into<Values>>(
        &mut self,
        name: &str,
        dims: &[&str],
        values: V,
    ) -> Result<&mut Variable, DatasetError> {
        check_name(name)?;
        if self.variable(name).is_some() {
            return Err(DatasetError::DuplicateVariable(name.into()));
        }

        let shape = dims
            .iter()
            .map(|dim_name| {
                self.dimension(dim_name)
                    .map(|dim| dim.len)
                    .ok_or_else(|| DatasetError::UnknownDimension {
                        variable: name.into(),
                        dimension: (*dim_name).into(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let values = values.into();
        let expected = shape
            .iter()
            .try_fold(1usize, |count, len| count.checked_mul(*len))
            .ok_or_else(|| DatasetError::TooLarge {
                variable: name.into(),
                shape: shape.clone(),
            })?;
        if values.len() != expected {
            return Err(DatasetError::ShapeMismatch {
                variable: name.into(),
                shape,
                expected,
                actual: values.len(),
            });
        }

        self.variables.push(Variable {
            name: name.into(),
            dims: dims.iter().map(|d| (*d).into()).collect(),
            shape,
            attributes: Vec::new(),
            values,
        });
        let last = self.variables.len() - 1;
        Ok(&mut self.variables[last])
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|var| var.name == name)
    }

    pub fn variable_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.variables.iter_mut().find(|var| var.name == name)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub(crate) fn variables_mut(&mut self) -> impl Iterator<Item = &mut Variable> {
        self.variables.iter_mut()
    }

    /// `key` names a variable, a dimension, or a global attribute
    ///
    /// This is the lookup a labeled-array library performs for attribute-style access
    /// on a dataset, and the only notion of "presence" the format classifier relies on.
    pub fn contains(&self, key: &str) -> bool {
        self.variable(key).is_some() || self.dimension(key).is_some() || self.attribute(key).is_some()
    }

    /// the header of the dataset in CDL, the output of `ncdump -h`
    pub fn cdl_header(&self, name: &str) -> String {
        let mut out = format!("netcdf {name} {{\n");

        if !self.dimensions.is_empty() {
            out.push_str("dimensions:\n");
            for dim in &self.dimensions {
                if dim.unlimited {
                    let _ = writeln!(out, "\t{} = UNLIMITED ; // ({} currently)", dim.name, dim.len);
                } else {
                    let _ = writeln!(out, "\t{} = {} ;", dim.name, dim.len);
                }
            }
        }

        if !self.variables.is_empty() {
            out.push_str("variables:\n");
            for var in &self.variables {
                let _ = write!(out, "\t{} {}", var.nc_type().cdl_name(), var.name);
                if !var.dims.is_empty() {
                    let _ = write!(out, "({})", var.dims.join(", "));
                }
                out.push_str(" ;\n");
                for att in &var.attributes {
                    let _ = writeln!(out, "\t\t{}:{} = {} ;", var.name, att.name, att.value.cdl());
                }
            }
        }

        if !self.attributes.is_empty() {
            out.push_str("\n// global attributes:\n");
            for att in &self.attributes {
                let _ = writeln!(out, "\t\t:{} = {} ;", att.name, att.value.cdl());
            }
        }

        out.push_str("}\n");
        out
    }
}

fn upsert(attributes: &mut Vec<Attribute>, attribute: Attribute) {
    match attributes.iter_mut().find(|att| att.name == attribute.name) {
        Some(existing) => *existing = attribute,
        None => attributes.push(attribute),
    }
}

fn check_name(name: &str) -> Result<(), DatasetError> {
    if name.is_empty() || name.contains('/') || name.starts_with(|c: char| c.is_whitespace()) {
        return Err(DatasetError::InvalidName(name.into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_dataset() -> Dataset {
        let mut ds = Dataset::new();
        ds.add_dimension("nMesh2_node", 4).unwrap();
        ds.add_dimension("nMesh2_face", 1).unwrap();
        ds.add_dimension("nMaxMesh2_face_nodes", 4).unwrap();
        ds.add_variable("Mesh2", &[], 0i32)
            .unwrap()
            .add_attribute("cf_role", "mesh_topology");
        ds.add_variable("Mesh2_face_nodes", &["nMesh2_face", "nMaxMesh2_face_nodes"], vec![0i32, 1, 2, 3])
            .unwrap();
        ds.add_attribute("title", "unit square");
        ds
    }

    #[test]
    fn contains_variables_dimensions_and_attributes() {
        let ds = mesh_dataset();
        assert!(ds.contains("Mesh2"));
        assert!(ds.contains("nMesh2_node"));
        assert!(ds.contains("title"));
        assert!(!ds.contains("coordx"));
        // variable attributes are not part of the dataset namespace
        assert!(!ds.contains("cf_role"));
    }

    #[test]
    fn add_variable_checks_shape() {
        let mut ds = mesh_dataset();
        let err = ds
            .add_variable("Mesh2_node_x", &["nMesh2_node"], vec![0.0f64; 3])
            .unwrap_err();
        assert!(matches!(err, DatasetError::ShapeMismatch { expected: 4, actual: 3, .. }));

        let err = ds.add_variable("Mesh2_node_y", &["nNodes"], vec![0.0f64; 4]).unwrap_err();
        assert!(matches!(err, DatasetError::UnknownDimension { .. }));

        let err = ds.add_variable("Mesh2", &[], 1i32).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateVariable(_)));
    }

    #[test]
    fn oversized_shapes_are_refused() {
        let mut ds = Dataset::new();
        for name in ["a", "b", "c"] {
            ds.add_dimension(name, usize::MAX / 2).unwrap();
        }
        let err = ds.add_variable("v", &["a", "b", "c"], vec![0.0f64]).unwrap_err();
        assert!(matches!(err, DatasetError::TooLarge { .. }));
    }

    #[test]
    fn unlimited_dimensions_may_go_anywhere() {
        let mut ds = Dataset::new();
        ds.add_dimension("x", 2).unwrap();
        ds.add_unlimited_dimension("time", 3).unwrap();
        ds.add_unlimited_dimension("step", 1).unwrap();

        let var = ds.add_variable("u", &["x", "time"], vec![0.0f32; 6]).unwrap();
        assert_eq!(var.shape(), &[2, 3]);
        assert!(ds.dimension("step").map_or(false, |dim| dim.unlimited));
        assert!(matches!(
            ds.add_unlimited_dimension("x", 1),
            Err(DatasetError::DuplicateDimension(_))
        ));
    }

    #[test]
    fn values_conversions() {
        let values = Values::from(vec![1.5f32, -2.0]);
        assert_eq!(values.to_f64(), Some(vec![1.5, -2.0]));
        assert_eq!(values.to_i64(), Some(vec![1, -2]));
        assert_eq!(Values::from("abc").to_f64(), None);
        assert_eq!(Values::Char(b"mesh\0\0".to_vec()).as_text().as_deref(), Some("mesh"));
        assert_eq!(Values::from(7u16).first_f64(), Some(7.0));
    }

    #[test]
    fn attributes_are_replaced() {
        let mut ds = mesh_dataset();
        ds.add_attribute("title", "renamed");
        assert_eq!(ds.attributes().len(), 1);
        assert_eq!(ds.attribute("title").and_then(Attribute::text).as_deref(), Some("renamed"));
    }

    #[test]
    fn variable_to_array() {
        let ds = mesh_dataset();
        let faces = ds.variable("Mesh2_face_nodes").unwrap().to_int_array().unwrap();
        assert_eq!(faces.shape(), &[1, 4]);
        assert_eq!(faces[[0, 3]], 3);
    }

    #[test]
    fn cdl_header_lists_everything() {
        let cdl = mesh_dataset().cdl_header("square");
        assert!(cdl.starts_with("netcdf square {"));
        assert!(cdl.contains("\tnMesh2_node = 4 ;"));
        assert!(cdl.contains("\tint Mesh2_face_nodes(nMesh2_face, nMaxMesh2_face_nodes) ;"));
        assert!(cdl.contains("\t\tMesh2:cf_role = \"mesh_topology\" ;"));
        assert!(cdl.contains("\t\t:title = \"unit square\" ;"));
    }
}
