// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Zonal volume fractions averaged onto nodes, faces and edges.
//!
//! Every zone adds its fractions to each entity it touches; the sums are
//! divided by the number of contributing zones once all zones are visited.
//! Shared faces and edges therefore see the same values from both sides.

use crate::config::SubdivisionLevel;
use crate::error::MirResult;
use crate::mesh::{CellView, Dimension, MaterialVolumeFractions, UnstructuredMesh};
use ahash::AHashMap;

/// Face identity: its three lowest node ids, ascending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceKey([usize; 3]);

impl FaceKey {
    /// `nodes` are global ids of a face with at least three corners
    pub fn new(nodes: &[usize]) -> Self {
        let mut lowest = [usize::MAX; 3];
        for &node in nodes {
            if node < lowest[2] {
                lowest[2] = node;
                lowest.sort_unstable();
            }
        }
        Self(lowest)
    }

    pub fn nodes(&self) -> [usize; 3] {
        self.0
    }
}

/// Edge identity: its two node ids, ascending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey([usize; 2]);

impl EdgeKey {
    pub fn new(a: usize, b: usize) -> Self {
        Self([a.min(b), a.max(b)])
    }

    pub fn nodes(&self) -> [usize; 2] {
        self.0
    }
}

/// Running sum of zone fractions on one entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneCntAndVf {
    pub zone_count: usize,
    pub vf: Vec<f64>,
}

impl ZoneCntAndVf {
    pub fn new(material_count: usize) -> Self {
        Self {
            zone_count: 0,
            vf: vec![0.0; material_count],
        }
    }

    pub fn add(&mut self, zone_vf: &[f64]) {
        self.zone_count += 1;
        for (acc, vf) in self.vf.iter_mut().zip(zone_vf) {
            *acc += vf;
        }
    }

    /// Turn the sum into a mean
    pub fn finalize(&mut self) {
        if self.zone_count > 1 {
            let count = self.zone_count as f64;
            for vf in &mut self.vf {
                *vf /= count;
            }
        }
    }
}

/// Averaged fractions for the whole mesh
#[derive(Debug, Clone)]
pub struct SubsampledFractions {
    material_count: usize,
    nodes: Vec<ZoneCntAndVf>,
    faces: AHashMap<FaceKey, ZoneCntAndVf>,
    edges: AHashMap<EdgeKey, ZoneCntAndVf>,
}

impl SubsampledFractions {
    /// Build the node table, plus face and edge tables when the level needs them
    pub fn compute(
        mesh: &UnstructuredMesh,
        materials: &MaterialVolumeFractions,
        level: SubdivisionLevel,
    ) -> MirResult<Self> {
        let dimension = mesh.dimension()?;
        let want_faces = dimension == Dimension::Three && level != SubdivisionLevel::Low;
        let want_edges = level == SubdivisionLevel::High;
        let material_count = materials.material_count;

        let mut nodes = vec![ZoneCntAndVf::new(material_count); mesh.point_count()];
        let mut faces: AHashMap<FaceKey, ZoneCntAndVf> = AHashMap::new();
        let mut edges: AHashMap<EdgeKey, ZoneCntAndVf> = AHashMap::new();

        for (zone, cell) in mesh.cells().enumerate() {
            let zone_vf = materials.zone_vf(zone);
            for &node in cell.nodes {
                nodes[node].add(zone_vf);
            }
            if want_faces {
                for face in cell.face_nodes() {
                    faces
                        .entry(FaceKey::new(&face))
                        .or_insert_with(|| ZoneCntAndVf::new(material_count))
                        .add(zone_vf);
                }
            }
            if want_edges {
                for [a, b] in cell.edge_nodes() {
                    edges
                        .entry(EdgeKey::new(a, b))
                        .or_insert_with(|| ZoneCntAndVf::new(material_count))
                        .add(zone_vf);
                }
            }
        }

        nodes.iter_mut().for_each(ZoneCntAndVf::finalize);
        faces.values_mut().for_each(ZoneCntAndVf::finalize);
        edges.values_mut().for_each(ZoneCntAndVf::finalize);

        log::debug!(
            "subsampled {} nodes, {} faces, {} edges",
            nodes.len(),
            faces.len(),
            edges.len()
        );

        Ok(Self {
            material_count,
            nodes,
            faces,
            edges,
        })
    }

    pub fn material_count(&self) -> usize {
        self.material_count
    }

    pub fn node_vf(&self, node: usize) -> &[f64] {
        &self.nodes[node].vf
    }

    pub fn face_vf(&self, key: &FaceKey) -> Option<&[f64]> {
        self.faces.get(key).map(|acc| acc.vf.as_slice())
    }

    pub fn edge_vf(&self, key: &EdgeKey) -> Option<&[f64]> {
        self.edges.get(key).map(|acc| acc.vf.as_slice())
    }

    pub fn node_zone_count(&self, node: usize) -> usize {
        self.nodes[node].zone_count
    }

    pub fn has_faces(&self) -> bool {
        !self.faces.is_empty()
    }

    pub fn has_edges(&self) -> bool {
        !self.edges.is_empty()
    }

    /// Fraction vectors of every entity of a cell, in cell-local order
    pub fn cell_entities<'s>(&'s self, cell: &CellView<'_>) -> CellEntities<'s> {
        let nodes = cell.nodes.iter().map(|&n| self.node_vf(n)).collect();
        let faces = if self.has_faces() {
            cell.face_nodes()
                .filter_map(|face| self.face_vf(&FaceKey::new(&face)))
                .collect()
        } else {
            Vec::new()
        };
        let edges = if self.has_edges() {
            cell.edge_nodes()
                .into_iter()
                .filter_map(|[a, b]| self.edge_vf(&EdgeKey::new(a, b)))
                .collect()
        } else {
            Vec::new()
        };
        CellEntities {
            nodes,
            faces,
            edges,
        }
    }
}

/// Borrowed full-material fraction vectors of one cell's nodes, faces and edges
#[derive(Debug, Clone)]
pub struct CellEntities<'s> {
    pub nodes: Vec<&'s [f64]>,
    pub faces: Vec<&'s [f64]>,
    pub edges: Vec<&'s [f64]>,
}

impl CellEntities<'_> {
    /// Whether the material is non-zero at any entity
    pub fn touches(&self, material: usize) -> bool {
        self.nodes
            .iter()
            .chain(self.faces.iter())
            .chain(self.edges.iter())
            .any(|vf| vf[material] > 0.0)
    }

    /// Keep only the listed materials, in order
    pub fn select(&self, materials: &[usize]) -> SlotFractions {
        let pick = |vf: &&[f64]| materials.iter().map(|&m| vf[m]).collect::<Vec<f64>>();
        SlotFractions {
            nodes: self.nodes.iter().map(pick).collect(),
            faces: self.faces.iter().map(pick).collect(),
            edges: self.edges.iter().map(pick).collect(),
        }
    }
}

/// Owned per-slot fractions of one cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotFractions {
    pub nodes: Vec<Vec<f64>>,
    pub faces: Vec<Vec<f64>>,
    pub edges: Vec<Vec<f64>>,
}
