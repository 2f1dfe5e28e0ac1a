use super::{exodus, scrip, ugrid};
use crate::prelude::*;

/// the mesh readers for every convention this crate understands
///
/// UGRID, Exodus and SCRIP datasets are mapped onto a [`Mesh`]. There is no shapefile
/// parser, so shapefiles fail with [`Error::ReaderUnavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionReader;

impl MeshReader for ConventionReader {
    fn read_exodus(&self, handle: &Dataset) -> Result<Mesh, Error> {
        exodus::read(handle)
    }

    fn read_scrip(&self, handle: &Dataset) -> Result<Mesh, Error> {
        scrip::read(handle)
    }

    fn read_ugrid(&self, path: &Path, handle: &Dataset) -> Result<Mesh, Error> {
        log::debug!("reading ugrid topology of `{}`", path.display());
        ugrid::read(handle)
    }

    fn read_shapefile(&self, path: &Path) -> Result<Mesh, Error> {
        log::warn!("cannot read shapefile `{}`", path.display());
        Err(Error::ReaderUnavailable(FormatKind::Shapefile))
    }
}
