// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Binary STL export of per-material boundary surfaces

use crate::analytics::material_surface;
use crate::mir::ReconstructedMesh;
use crate::utils::math::triangle_normal;
use anyhow::{Context, Result};
use nalgebra::Point3;
use std::fs::File;
use std::path::{Path, PathBuf};
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

/// Write the surface of one material; returns the triangle count
pub fn export_material_stl(
    out: &ReconstructedMesh,
    material: usize,
    path: impl AsRef<Path>,
) -> Result<usize> {
    let path = path.as_ref();
    let triangles: Vec<StlTriangle> = material_surface(out, material)
        .iter()
        .map(|[a, b, c]| {
            let n = triangle_normal(a, b, c);
            StlTriangle {
                normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [vertex(a), vertex(b), vertex(c)],
            }
        })
        .collect();

    let mut file =
        File::create(path).with_context(|| format!("Failed to create STL file: {:?}", path))?;
    stl_io::write_stl(&mut file, triangles.iter()).context("Failed to write STL file")?;
    log::debug!(
        "material {}: {} triangles -> {:?}",
        material,
        triangles.len(),
        path
    );
    Ok(triangles.len())
}

/// One `material_<id>.stl` per material present in the output
pub fn export_material_stls(out: &ReconstructedMesh, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    out.materials()
        .into_iter()
        .map(|material| {
            let path = dir.join(format!("material_{}.stl", material));
            export_material_stl(out, material, &path)?;
            Ok(path)
        })
        .collect()
}

fn vertex(p: &Point3<f64>) -> StlVertex {
    StlVertex::new([p.x as f32, p.y as f32, p.z as f32])
}
