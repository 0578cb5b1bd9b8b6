pub mod container;
pub mod error;
pub mod mesh;

pub use container::ContainerHeader;
pub use error::FormatError;
pub use mesh::IndexedMesh;
