use super::{Attribute, Dataset, DatasetError, FileError, UnsupportedType, Values, Variable};

use netcdf::types::{BasicType, VariableType};
use netcdf::AttrValue;

use std::ops::Range;
use std::path::Path;

// read a whole variable of element type `$ty`, skipping the library call for empty ones
macro_rules! fetch {
    ($var:expr, $ty:ty) => {{
        match element_count($var, std::mem::size_of::<$ty>())? {
            0 => Vec::new(),
            _ => $var.values_arr::<$ty, _>(..)?.into_raw_vec(),
        }
    }};
}

// define `$var` in `$file` with element type `$ty`, then store its attributes and values
macro_rules! put {
    ($file:expr, $var:expr, $ty:ty, $values:expr) => {{
        let dims: Vec<&str> = $var.dims().iter().map(String::as_str).collect();
        let mut nc_var = $file.add_variable::<$ty>($var.name(), &dims)?;
        for att in $var.attributes() {
            nc_var.add_attribute(&att.name, attr_value(&att.value))?;
        }

        let values: &[$ty] = $values;
        if $var.shape().is_empty() {
            nc_var.put_values(values, ..)?;
        } else if !values.is_empty() {
            let extents: Vec<Range<usize>> = $var.shape().iter().map(|len| 0..*len).collect();
            nc_var.put_values(values, extents.as_slice())?;
        }
    }};
}

/// read the netCDF file at `path` into memory
///
/// Every format libnetcdf opens is accepted, the classic CDF-1, CDF-2 and CDF-5 layouts as
/// well as netCDF-4 on HDF5. Only the root group is read. Variables holding text, strings
/// or user defined types have no numeric values to offer the grid readers and are left out.
pub fn read_file(path: &Path) -> Result<Dataset, FileError> {
    let file = netcdf::open(path)?;
    let mut ds = Dataset::new();

    for dim in file.dimensions() {
        let name: String = dim.name().into();
        if dim.is_unlimited() {
            ds.add_unlimited_dimension(&name, dim.len())?;
        } else {
            ds.add_dimension(&name, dim.len())?;
        }
    }

    for att in file.attributes() {
        if let Some(Attribute { name, value }) = attribute(&att)? {
            ds.add_attribute(&name, value);
        }
    }

    for var in file.variables() {
        let name: String = var.name().into();
        let values = match read_values(&var)? {
            Some(values) => values,
            None => {
                log::debug!("skipping variable `{name}` of type {:?}", var.vartype());
                continue;
            }
        };

        let dims: Vec<String> = var.dimensions().iter().map(|dim| dim.name().into()).collect();
        let dims: Vec<&str> = dims.iter().map(String::as_str).collect();
        let target = ds.add_variable(&name, &dims, values)?;
        for att in var.attributes() {
            if let Some(Attribute { name, value }) = attribute(&att)? {
                target.add_attribute(&name, value);
            }
        }
    }

    log::debug!(
        "read {} dimensions and {} variables from `{}`",
        ds.dimensions().len(),
        ds.variables().len(),
        path.display()
    );
    Ok(ds)
}

/// number of elements of `var`, refusing shapes whose size in bytes overflows
fn element_count(var: &netcdf::Variable<'_>, size: usize) -> Result<usize, FileError> {
    let shape: Vec<usize> = var.dimensions().iter().map(|dim| dim.len()).collect();
    if shape.contains(&0) {
        return Ok(0);
    }

    shape
        .iter()
        .try_fold(1usize, |count, len| count.checked_mul(*len))
        .filter(|count| {
            count
                .checked_mul(size)
                .map_or(false, |bytes| bytes <= isize::MAX as usize)
        })
        .ok_or_else(|| {
            DatasetError::TooLarge {
                variable: var.name().into(),
                shape,
            }
            .into()
        })
}

fn read_values(var: &netcdf::Variable<'_>) -> Result<Option<Values>, FileError> {
    let basic = match var.vartype() {
        VariableType::Basic(basic) => basic,
        _ => return Ok(None),
    };

    let values = match basic {
        BasicType::Char => return Ok(None),
        BasicType::Byte => Values::Byte(fetch!(var, i8)),
        BasicType::Ubyte => Values::UByte(fetch!(var, u8)),
        BasicType::Short => Values::Short(fetch!(var, i16)),
        BasicType::Ushort => Values::UShort(fetch!(var, u16)),
        BasicType::Int => Values::Int(fetch!(var, i32)),
        BasicType::Uint => Values::UInt(fetch!(var, u32)),
        BasicType::Int64 => Values::Int64(fetch!(var, i64)),
        BasicType::Uint64 => Values::UInt64(fetch!(var, u64)),
        BasicType::Float => Values::Float(fetch!(var, f32)),
        BasicType::Double => Values::Double(fetch!(var, f64)),
    };
    Ok(Some(values))
}

/// `None` for string array attributes, which only netCDF-4 files can hold
fn attribute(att: &netcdf::Attribute<'_>) -> Result<Option<Attribute>, FileError> {
    let value = match att.value()? {
        AttrValue::Uchar(x) => Values::from(x),
        AttrValue::Uchars(x) => Values::from(x),
        AttrValue::Schar(x) => Values::from(x),
        AttrValue::Schars(x) => Values::from(x),
        AttrValue::Ushort(x) => Values::from(x),
        AttrValue::Ushorts(x) => Values::from(x),
        AttrValue::Short(x) => Values::from(x),
        AttrValue::Shorts(x) => Values::from(x),
        AttrValue::Uint(x) => Values::from(x),
        AttrValue::Uints(x) => Values::from(x),
        AttrValue::Int(x) => Values::from(x),
        AttrValue::Ints(x) => Values::from(x),
        AttrValue::Ulonglong(x) => Values::from(x),
        AttrValue::Ulonglongs(x) => Values::from(x),
        AttrValue::Longlong(x) => Values::from(x),
        AttrValue::Longlongs(x) => Values::from(x),
        AttrValue::Float(x) => Values::from(x),
        AttrValue::Floats(x) => Values::from(x),
        AttrValue::Double(x) => Values::from(x),
        AttrValue::Doubles(x) => Values::from(x),
        AttrValue::Str(x) => Values::from(x),
        AttrValue::Strs(_) => {
            log::debug!("skipping string array attribute `{}`", att.name());
            return Ok(None);
        }
    };
    Ok(Some(Attribute::new(att.name().into(), value)))
}

fn attr_value(values: &Values) -> AttrValue {
    match values {
        Values::Byte(x) => AttrValue::Schars(x.clone()),
        Values::Char(_) => AttrValue::Str(values.as_text().unwrap_or_default()),
        Values::Short(x) => AttrValue::Shorts(x.clone()),
        Values::Int(x) => AttrValue::Ints(x.clone()),
        Values::Float(x) => AttrValue::Floats(x.clone()),
        Values::Double(x) => AttrValue::Doubles(x.clone()),
        Values::UByte(x) => AttrValue::Uchars(x.clone()),
        Values::UShort(x) => AttrValue::Ushorts(x.clone()),
        Values::UInt(x) => AttrValue::Uints(x.clone()),
        Values::Int64(x) => AttrValue::Longlongs(x.clone()),
        Values::UInt64(x) => AttrValue::Ulonglongs(x.clone()),
    }
}

fn write_variable(file: &mut netcdf::MutableFile, var: &Variable) -> Result<(), FileError> {
    match var.values() {
        Values::Byte(x) => put!(file, var, i8, x),
        Values::Short(x) => put!(file, var, i16, x),
        Values::Int(x) => put!(file, var, i32, x),
        Values::Float(x) => put!(file, var, f32, x),
        Values::Double(x) => put!(file, var, f64, x),
        Values::UByte(x) => put!(file, var, u8, x),
        Values::UShort(x) => put!(file, var, u16, x),
        Values::UInt(x) => put!(file, var, u32, x),
        Values::Int64(x) => put!(file, var, i64, x),
        Values::UInt64(x) => put!(file, var, u64, x),
        Values::Char(_) => {
            return Err(FileError::Unsupported(UnsupportedType::new(
                var.name().into(),
                var.nc_type(),
            )))
        }
    }
    Ok(())
}

/// write `dataset` to a new netCDF-4 file at `path`, replacing any existing file
///
/// Text variables cannot be written. The dataset is checked for them before the file is
/// created.
pub fn write_file(path: &Path, dataset: &Dataset) -> Result<(), FileError> {
    if let Some(var) = dataset.variables().iter().find(|var| var.values().is_text()) {
        return Err(FileError::Unsupported(UnsupportedType::new(
            var.name().into(),
            var.nc_type(),
        )));
    }

    let mut file = netcdf::create(path)?;

    for dim in dataset.dimensions() {
        if dim.unlimited {
            file.add_unlimited_dimension(&dim.name)?;
        } else {
            file.add_dimension(&dim.name, dim.len)?;
        }
    }

    for att in dataset.attributes() {
        file.add_attribute(&att.name, attr_value(&att.value))?;
    }

    for var in dataset.variables() {
        write_variable(&mut file, var)?;
    }

    log::debug!("wrote {} variables to `{}`", dataset.variables().len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let mut ds = Dataset::new();
        ds.add_dimension("nMesh2_face", 3).unwrap();
        ds.add_dimension("two", 2).unwrap();
        ds.add_unlimited_dimension("time", 2).unwrap();
        ds.add_attribute("title", "sample").add_attribute("version", 5.0f32);
        ds.add_variable("Mesh2", &[], 0i32)
            .unwrap()
            .add_attribute("cf_role", "mesh_topology");
        ds.add_variable("area", &["nMesh2_face"], vec![0.5f64, 0.25, 0.25])
            .unwrap()
            .add_attribute("units", "m2");
        ds.add_variable("flags", &["time", "two"], vec![1i8, 0, 0, 1])
            .unwrap()
            .add_attribute("valid_range", vec![0i8, 1]);
        ds.add_variable("ids", &["nMesh2_face"], vec![1u64, 2, u64::MAX]).unwrap();
        ds
    }

    #[test]
    fn written_files_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.nc");
        let ds = sample();

        write_file(&path, &ds).unwrap();
        assert_eq!(read_file(&path).unwrap(), ds);
    }

    #[test]
    fn written_files_are_netcdf4() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.nc");
        write_file(&path, &sample()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89HDF\r\n\x1a\n"));
    }

    #[test]
    fn text_variables_are_refused_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text.nc");

        let mut ds = Dataset::new();
        ds.add_dimension("nchar", 4).unwrap();
        ds.add_variable("label", &["nchar"], "face").unwrap();

        let err = write_file(&path, &ds).unwrap_err();
        assert!(matches!(err, FileError::Unsupported(_)));
        assert!(err.to_string().contains("`label` of type char"));
        assert!(!path.exists());
    }

    #[test]
    fn foreign_files_are_library_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.nc");
        std::fs::write(&path, "just some text").unwrap();

        assert!(matches!(read_file(&path), Err(FileError::Netcdf(_))));
    }
}
