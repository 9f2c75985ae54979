//! Terrain height field and its mesh.

mod field;
mod mesh;

// Re-export public types
pub use field::HeightField;
pub use mesh::{TerrainMesh, Vertex};
