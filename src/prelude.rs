//! Common traits and types that are useful for working with `uxgrid`
#![allow(unused_imports)]

pub use crate::classify::{FormatKind, GridSource};
pub use crate::container::{Attribute, Dataset, Dimension, NcType, Values, Variable};
pub use crate::traits::{MeshReader, StructuredOpener};
pub use crate::{Grid, GridInput, Mesh, UxDataArray, UxDataset};

pub(crate) use crate::open::OpenError;
pub(crate) use crate::Error;
pub(crate) use crate::{container, utils};

pub(crate) use std::path::{Path, PathBuf};
pub(crate) use std::sync::Arc;

pub(crate) use derive_more::{Deref, DerefMut};

pub(crate) use ndarray::{Array1, Array2, ArrayD, Axis, IxDyn};
