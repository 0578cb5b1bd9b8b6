//! Converts Wavefront `.obj` meshes, which index positions, texture coordinates and normals
//! separately, into single-indexed [`IndexedMesh`]es ready for indexed draw calls.

pub mod canonical;
pub mod dump;
pub mod error;
pub mod mesh;
pub mod reindex;
pub mod utils;

pub use error::{ReindexError, Result};
pub use mesh::obj::{self, Conversion, Geometry, MultiIndex, ObjMeta};
pub use oo_format::IndexedMesh;
pub use reindex::reindex;
