// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Reconstructed mesh tables and field transfer onto them

use super::dedup::ReconstructedCoord;
use crate::error::{MirError, MirResult};
use crate::mesh::{CellType, Dimension, UnstructuredMesh};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// One emitted output cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconstructedZone {
    pub orig_zone: usize,
    pub material: usize,
    pub cell_type: CellType,
    pub node_count: usize,
    /// First slot in [`ReconstructedMesh::indices`]
    pub index_range_start: usize,
    /// Entry in the mixed-variable table for `(orig_zone, material)`
    pub mixed_var_index: Option<usize>,
}

/// Path a reconstruction took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconstructionMode {
    /// No zone was mixed; the input passed through unchanged
    #[default]
    AllClean,
    Mixed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconstructionStats {
    pub mode: ReconstructionMode,
    pub input_zones: usize,
    pub output_zones: usize,
    /// Zones emitted unchanged
    pub clean_zones: usize,
    pub fully_clean_zones: usize,
    pub fully_mixed_zones: usize,
    pub subdivided_zones: usize,
    /// Fragments dropped for repeated vertex indices
    pub degenerate_dropped: usize,
    /// Wedges with repeated vertex indices split into tetrahedra
    pub wedges_resplit: usize,
    pub coordinates: usize,
}

/// Output tables of one reconstruction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructedMesh {
    pub dimension: Dimension,
    pub coords: Vec<ReconstructedCoord>,
    pub zones: Vec<ReconstructedZone>,
    pub indices: Vec<usize>,
    pub stats: ReconstructionStats,
}

impl ReconstructedMesh {
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn coord_count(&self) -> usize {
        self.coords.len()
    }

    /// Vertex indices of an output zone
    pub fn zone_nodes(&self, zone: usize) -> &[usize] {
        let z = &self.zones[zone];
        &self.indices[z.index_range_start..z.index_range_start + z.node_count]
    }

    pub fn zone_points(&self, zone: usize) -> Vec<Point3<f64>> {
        self.zone_nodes(zone)
            .iter()
            .map(|&i| self.coords[i].point)
            .collect()
    }

    pub fn points(&self) -> Vec<Point3<f64>> {
        self.coords.iter().map(|c| c.point).collect()
    }

    /// Output zones carrying the given material, in emission order
    pub fn zones_for_material(&self, material: usize) -> Vec<usize> {
        self.zones
            .iter()
            .enumerate()
            .filter(|(_, z)| z.material == material)
            .map(|(i, _)| i)
            .collect()
    }

    /// Distinct materials present in the output, ascending
    pub fn materials(&self) -> Vec<usize> {
        let mut materials: Vec<usize> = self.zones.iter().map(|z| z.material).collect();
        materials.sort_unstable();
        materials.dedup();
        materials
    }

    /// Point field of the input mesh carried onto every output vertex
    pub fn interpolate_nodal_field(
        &self,
        mesh: &UnstructuredMesh,
        values: &[f64],
    ) -> MirResult<Vec<f64>> {
        if values.len() != mesh.point_count() {
            return Err(MirError::InputMismatch(format!(
                "{} nodal values for {} points",
                values.len(),
                mesh.point_count()
            )));
        }
        Ok(self
            .coords
            .iter()
            .map(|coord| match coord.orig_node {
                Some(node) => values[node],
                None => {
                    let corners: Vec<f64> = mesh
                        .cell(coord.orig_zone)
                        .nodes
                        .iter()
                        .map(|&n| values[n])
                        .collect();
                    coord.weight.interpolate(&corners)
                }
            })
            .collect())
    }

    /// Cell field of the input mesh copied to each output zone
    pub fn interpolate_zonal_field(&self, values: &[f64]) -> MirResult<Vec<f64>> {
        if let Some(z) = self.zones.iter().find(|z| z.orig_zone >= values.len()) {
            return Err(MirError::InputMismatch(format!(
                "no zonal value for input zone {}",
                z.orig_zone
            )));
        }
        Ok(self.zones.iter().map(|z| values[z.orig_zone]).collect())
    }

    /// Per-material value of an output zone, falling back to the zonal value
    pub fn mixed_field_value(&self, zone: usize, zonal: &[f64], mixed: &[f64]) -> f64 {
        let z = &self.zones[zone];
        match z.mixed_var_index.and_then(|i| mixed.get(i)) {
            Some(&value) => value,
            None => zonal[z.orig_zone],
        }
    }
}

/// Append-only zone and index tables
#[derive(Debug, Clone, Default)]
pub struct OutputBuilder {
    pub zones: Vec<ReconstructedZone>,
    pub indices: Vec<usize>,
    pub stats: ReconstructionStats,
}

impl OutputBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_zone(
        &mut self,
        orig_zone: usize,
        material: usize,
        cell_type: CellType,
        nodes: &[usize],
        mixed_var_index: Option<usize>,
    ) {
        self.zones.push(ReconstructedZone {
            orig_zone,
            material,
            cell_type,
            node_count: nodes.len(),
            index_range_start: self.indices.len(),
            mixed_var_index,
        });
        self.indices.extend_from_slice(nodes);
    }

    pub fn finish(mut self, dimension: Dimension, coords: Vec<ReconstructedCoord>) -> ReconstructedMesh {
        self.stats.output_zones = self.zones.len();
        self.stats.coordinates = coords.len();
        ReconstructedMesh {
            dimension,
            coords,
            zones: self.zones,
            indices: self.indices,
            stats: self.stats,
        }
    }
}
