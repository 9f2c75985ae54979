//! Terrain mesh: the height-field surface closed off by four side skirts.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::field::HeightField;

/// Vertex data for the terrain mesh (position + UV coordinates)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Surface grid plus top and bottom edge rings.
///
/// Layout: `size²` surface vertices (`x + z * size`), then four top-edge rows
/// of `size` vertices following the boundary (left, back, right, front),
/// then the same four rows at `bottom_height`. Edge rows read their height
/// straight off the boundary cells rather than through clamped lookups.
pub struct TerrainMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    size: usize,
    centre_offset: f32,
}

impl TerrainMesh {
    /// Build the mesh topology for a `size × size` field
    pub fn new(size: usize, base_height: f32, bottom_height: f32) -> Self {
        let centre_offset = (size as f32 - 1.0) * 0.5;
        let uv_scale = 1.0 / (size.max(2) - 1) as f32;
        let top_edge = size * size;
        let bottom_edge = top_edge + size * 4;

        let mut vertices = Vec::with_capacity(size * size + 8 * size);

        // Top surface
        for z in 0..size {
            for x in 0..size {
                vertices.push(Vertex {
                    position: [x as f32 - centre_offset, base_height, z as f32 - centre_offset],
                    uv: [x as f32 * uv_scale, z as f32 * uv_scale],
                });
            }
        }

        // Top edges, then bottom edges
        for y in [base_height, bottom_height] {
            for side in 0..4 {
                for i in 0..size {
                    let (x, z) = edge_cell(size, side, i);
                    vertices.push(Vertex {
                        position: [x as f32 - centre_offset, y, z as f32 - centre_offset],
                        uv: [x as f32 * uv_scale, z as f32 * uv_scale],
                    });
                }
            }
        }

        let mut indices = Vec::new();

        // Surface triangles
        for z in 0..size.saturating_sub(1) {
            for x in 0..size - 1 {
                add_quad(
                    &mut indices,
                    x + z * size,
                    x + 1 + z * size,
                    x + (z + 1) * size,
                    x + 1 + (z + 1) * size,
                );
            }
        }

        // Side triangles
        for side in 0..4 {
            for i in 0..size.saturating_sub(1) {
                add_quad(
                    &mut indices,
                    bottom_edge + side * size + 1 + i,
                    bottom_edge + side * size + i,
                    top_edge + side * size + 1 + i,
                    top_edge + side * size + i,
                );
            }
        }

        Self {
            vertices,
            indices,
            size,
            centre_offset,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// World position of a grid cell's surface vertex
    pub fn cell_position(&self, x: usize, z: usize, height: f32) -> Vec3 {
        Vec3::new(x as f32 - self.centre_offset, height, z as f32 - self.centre_offset)
    }

    /// Copy current heights into the surface and top-edge vertices
    pub fn update(&mut self, field: &HeightField) {
        let size = self.size;
        let heights = field.heights();
        for (i, &h) in heights.as_slice().iter().enumerate() {
            self.vertices[i].position[1] = h;
        }

        let top_edge = size * size;
        for side in 0..4 {
            for i in 0..size {
                let (x, z) = edge_cell(size, side, i);
                self.vertices[top_edge + side * size + i].position[1] = heights[(x, z)];
            }
        }
    }

    /// Raw vertex bytes for GPU upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Boundary cell for position `i` along edge `side`
fn edge_cell(size: usize, side: usize, i: usize) -> (usize, usize) {
    let last = size - 1;
    match side {
        0 => (0, i),
        1 => (i, last),
        2 => (last, last - i),
        _ => (last - i, 0),
    }
}

/// Two triangles for quad `a b / c d` (counter-clockwise winding)
fn add_quad(indices: &mut Vec<u32>, a: usize, b: usize, c: usize, d: usize) {
    indices.extend([a, c, d, a, d, b].map(|i| i as u32));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::params::TerrainParams;

    #[test]
    fn test_terrain_mesh_creation() {
        let size = 16;
        let mesh = TerrainMesh::new(size, 0.0, -4.0);

        assert_eq!(mesh.vertices.len(), size * size + 8 * size);
        // Surface quads plus four side strips, 6 indices per quad
        assert_eq!(mesh.indices.len(), (size - 1).pow(2) * 6 + 4 * (size - 1) * 6);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        assert_eq!(mesh.vertex_bytes().len(), mesh.vertices.len() * 20);
    }

    #[test]
    fn test_update_reads_boundary_heights() {
        let size = 6;
        let params = TerrainParams {
            size,
            base_height: 0.0,
            noise_level: 1.0,
            ..Default::default()
        };
        let noise = Grid::from_fn(size, |x, z| (x * size + z) as f32 / 100.0);
        let field = HeightField::with_noise(&params, noise);
        let mut mesh = TerrainMesh::new(size, 0.0, -2.0);
        mesh.update(&field);

        assert_eq!(mesh.vertices[3 + 2 * size].position[1], field.height(3, 2));

        let top_edge = size * size;
        for side in 0..4 {
            for i in 0..size {
                let v = mesh.vertices[top_edge + side * size + i];
                let (x, z) = edge_cell(size, side, i);
                assert_eq!(v.position[1], field.height(x, z));
                // Edge vertices coincide with their boundary surface vertex
                assert_eq!(v.position[0], mesh.vertices[x + z * size].position[0]);
                assert_eq!(v.position[2], mesh.vertices[x + z * size].position[2]);
            }
        }
        let bottom = mesh.vertices[top_edge + 4 * size];
        assert_eq!(bottom.position[1], -2.0);
    }

    #[test]
    fn test_mesh_is_centred() {
        let mesh = TerrainMesh::new(5, 0.0, -1.0);
        assert_eq!(mesh.cell_position(2, 2, 0.0), Vec3::ZERO);
        assert_eq!(mesh.vertices[0].position, [-2.0, 0.0, -2.0]);
    }
}
