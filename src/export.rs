//! Height-field and mesh export.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{GrayImage, Luma};

use crate::error::Result;
use crate::terrain::{HeightField, TerrainMesh};

/// Greyscale image of the heights, normalised to the field's own range.
///
/// Pixel `(x, z)` maps to cell `(x, z)`. A flat field renders mid-grey.
pub fn height_image(field: &HeightField) -> GrayImage {
    let size = field.size() as u32;
    let (lo, hi) = field.height_range();
    let span = hi - lo;
    GrayImage::from_fn(size, size, |x, z| {
        let h = field.height(x as usize, z as usize);
        let t = if span > f32::EPSILON { (h - lo) / span } else { 0.5 };
        Luma([(t * 255.0).round() as u8])
    })
}

/// Save [`height_image`] as a PNG
pub fn export_png(field: &HeightField, path: impl AsRef<Path>) -> Result<()> {
    height_image(field).save(path.as_ref())?;
    log::info!("wrote height map {}", path.as_ref().display());
    Ok(())
}

/// Write the mesh as Wavefront OBJ (positions, UVs, triangles)
pub fn write_obj<W: Write>(mesh: &TerrainMesh, out: &mut W) -> Result<()> {
    writeln!(out, "# ripplefield terrain {}x{}", mesh.size(), mesh.size())?;
    for v in &mesh.vertices {
        let [x, y, z] = v.position;
        writeln!(out, "v {x} {y} {z}")?;
    }
    for v in &mesh.vertices {
        let [u, w] = v.uv;
        writeln!(out, "vt {u} {w}")?;
    }
    // OBJ indices are 1-based
    for tri in mesh.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] + 1, tri[1] + 1, tri[2] + 1];
        writeln!(out, "f {a}/{a} {b}/{b} {c}/{c}")?;
    }
    Ok(())
}

pub fn export_obj(mesh: &TerrainMesh, path: impl AsRef<Path>) -> Result<()> {
    let mut out = BufWriter::new(File::create(path.as_ref())?);
    write_obj(mesh, &mut out)?;
    out.flush()?;
    log::info!("wrote mesh {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::params::TerrainParams;

    fn ramp_field(size: usize) -> HeightField {
        let params = TerrainParams {
            size,
            base_height: 0.0,
            noise_level: 1.0,
            ..Default::default()
        };
        let noise = Grid::from_fn(size, |x, _| x as f32 / (size - 1) as f32);
        HeightField::with_noise(&params, noise)
    }

    #[test]
    fn test_height_image_spans_full_range() {
        let image = height_image(&ramp_field(8));
        assert_eq!(image.dimensions(), (8, 8));
        assert_eq!(image.get_pixel(0, 3)[0], 0);
        assert_eq!(image.get_pixel(7, 3)[0], 255);
    }

    #[test]
    fn test_flat_field_is_mid_grey() {
        let params = TerrainParams {
            size: 4,
            noise_level: 0.0,
            ..Default::default()
        };
        let field = HeightField::with_noise(&params, Grid::new(4, 0.3));
        assert!(height_image(&field).pixels().all(|p| p[0] == 128));
    }

    #[test]
    fn test_obj_counts() {
        let size = 4;
        let field = ramp_field(size);
        let mut mesh = TerrainMesh::new(size, 0.0, -4.0);
        mesh.update(&field);

        let mut out = Vec::new();
        write_obj(&mesh, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let count = |prefix: &str| text.lines().filter(|l| l.starts_with(prefix)).count();
        assert_eq!(count("v "), mesh.vertices.len());
        assert_eq!(count("vt "), mesh.vertices.len());
        assert_eq!(count("f "), mesh.indices.len() / 3);
        assert!(!text.contains("f 0/"));
    }
}
