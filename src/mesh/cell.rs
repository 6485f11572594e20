// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cell types and their local topology (VTK numbering)

use crate::error::{MirError, MirResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest corner count of any supported cell
pub const MAX_NODES_PER_ZONE: usize = 8;

/// Cell type tag of an input zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    Vertex,
    Line,
    Triangle,
    Polygon,
    Pixel,
    Quad,
    Tetra,
    Voxel,
    Hexahedron,
    Wedge,
    Pyramid,
}

/// Topological dimension of a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimension {
    Two,
    Three,
}

// Faces are wound so the right-hand normal points out of the cell.
const TETRA_FACES: &[&[usize]] = &[&[0, 1, 3], &[1, 2, 3], &[2, 0, 3], &[0, 2, 1]];
const HEXAHEDRON_FACES: &[&[usize]] = &[
    &[0, 4, 7, 3],
    &[1, 2, 6, 5],
    &[0, 1, 5, 4],
    &[3, 7, 6, 2],
    &[0, 3, 2, 1],
    &[4, 5, 6, 7],
];
const VOXEL_FACES: &[&[usize]] = &[
    &[0, 4, 6, 2],
    &[1, 3, 7, 5],
    &[0, 1, 5, 4],
    &[2, 6, 7, 3],
    &[0, 2, 3, 1],
    &[4, 5, 7, 6],
];
const WEDGE_FACES: &[&[usize]] = &[
    &[0, 1, 2],
    &[3, 5, 4],
    &[0, 3, 4, 1],
    &[1, 4, 5, 2],
    &[2, 5, 3, 0],
];
const PYRAMID_FACES: &[&[usize]] = &[
    &[0, 3, 2, 1],
    &[0, 1, 4],
    &[1, 2, 4],
    &[2, 3, 4],
    &[3, 0, 4],
];

const TETRA_EDGES: &[[usize; 2]] = &[[0, 1], [1, 2], [2, 0], [0, 3], [1, 3], [2, 3]];
const HEXAHEDRON_EDGES: &[[usize; 2]] = &[
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [4, 5],
    [5, 6],
    [6, 7],
    [7, 4],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];
const VOXEL_EDGES: &[[usize; 2]] = &[
    [0, 1],
    [1, 3],
    [3, 2],
    [2, 0],
    [4, 5],
    [5, 7],
    [7, 6],
    [6, 4],
    [0, 4],
    [1, 5],
    [3, 7],
    [2, 6],
];
const WEDGE_EDGES: &[[usize; 2]] = &[
    [0, 1],
    [1, 2],
    [2, 0],
    [3, 4],
    [4, 5],
    [5, 3],
    [0, 3],
    [1, 4],
    [2, 5],
];
const PYRAMID_EDGES: &[[usize; 2]] = &[
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [0, 4],
    [1, 4],
    [2, 4],
    [3, 4],
];
const TRIANGLE_EDGES: &[[usize; 2]] = &[[0, 1], [1, 2], [2, 0]];
const QUAD_EDGES: &[[usize; 2]] = &[[0, 1], [1, 2], [2, 3], [3, 0]];
const PIXEL_EDGES: &[[usize; 2]] = &[[0, 1], [1, 3], [3, 2], [2, 0]];
const POLYGON_EDGES: [[usize; 2]; MAX_NODES_PER_ZONE] = polygon_edges();

/// Boundary edges of an n-gon for every n up to the cap; slice the first n.
const fn polygon_edges() -> [[usize; 2]; MAX_NODES_PER_ZONE] {
    let mut edges = [[0usize; 2]; MAX_NODES_PER_ZONE];
    let mut i = 0;
    while i < MAX_NODES_PER_ZONE {
        edges[i] = [i, i + 1];
        i += 1;
    }
    edges
}

impl CellType {
    /// Map a VTK cell type id
    pub fn from_vtk_id(id: u8) -> MirResult<Self> {
        match id {
            1 => Ok(Self::Vertex),
            3 => Ok(Self::Line),
            5 => Ok(Self::Triangle),
            7 => Ok(Self::Polygon),
            8 => Ok(Self::Pixel),
            9 => Ok(Self::Quad),
            10 => Ok(Self::Tetra),
            11 => Ok(Self::Voxel),
            12 => Ok(Self::Hexahedron),
            13 => Ok(Self::Wedge),
            14 => Ok(Self::Pyramid),
            _ => Err(MirError::UnsupportedCellType(format!("VTK id {}", id))),
        }
    }

    pub fn vtk_id(self) -> u8 {
        match self {
            Self::Vertex => 1,
            Self::Line => 3,
            Self::Triangle => 5,
            Self::Polygon => 7,
            Self::Pixel => 8,
            Self::Quad => 9,
            Self::Tetra => 10,
            Self::Voxel => 11,
            Self::Hexahedron => 12,
            Self::Wedge => 13,
            Self::Pyramid => 14,
        }
    }

    pub fn dimension(self) -> Option<Dimension> {
        match self {
            Self::Triangle | Self::Polygon | Self::Pixel | Self::Quad => Some(Dimension::Two),
            Self::Tetra | Self::Voxel | Self::Hexahedron | Self::Wedge | Self::Pyramid => {
                Some(Dimension::Three)
            }
            Self::Vertex | Self::Line => None,
        }
    }

    /// Fixed corner count; `None` for polygons
    pub fn node_count(self) -> Option<usize> {
        match self {
            Self::Vertex => Some(1),
            Self::Line => Some(2),
            Self::Triangle => Some(3),
            Self::Pixel | Self::Quad | Self::Tetra => Some(4),
            Self::Pyramid => Some(5),
            Self::Wedge => Some(6),
            Self::Voxel | Self::Hexahedron => Some(8),
            Self::Polygon => None,
        }
    }

    /// Check a connectivity length against the type
    pub fn validate_node_count(self, actual: usize) -> MirResult<()> {
        let ok = match self.node_count() {
            Some(expected) => expected == actual,
            None => (3..=MAX_NODES_PER_ZONE).contains(&actual),
        };
        if ok {
            Ok(())
        } else {
            Err(MirError::InvalidNodeCount {
                cell_type: self.to_string(),
                expected: self.node_count().unwrap_or(MAX_NODES_PER_ZONE),
                actual,
            })
        }
    }

    /// Local faces of a 3D cell, outward winding
    pub fn faces(self) -> &'static [&'static [usize]] {
        match self {
            Self::Tetra => TETRA_FACES,
            Self::Hexahedron => HEXAHEDRON_FACES,
            Self::Voxel => VOXEL_FACES,
            Self::Wedge => WEDGE_FACES,
            Self::Pyramid => PYRAMID_FACES,
            _ => &[],
        }
    }

    /// Local edges; polygons need the node count to close the loop
    pub fn edges(self, node_count: usize) -> Vec<[usize; 2]> {
        match self {
            Self::Tetra => TETRA_EDGES.to_vec(),
            Self::Hexahedron => HEXAHEDRON_EDGES.to_vec(),
            Self::Voxel => VOXEL_EDGES.to_vec(),
            Self::Wedge => WEDGE_EDGES.to_vec(),
            Self::Pyramid => PYRAMID_EDGES.to_vec(),
            Self::Triangle => TRIANGLE_EDGES.to_vec(),
            Self::Quad => QUAD_EDGES.to_vec(),
            Self::Pixel => PIXEL_EDGES.to_vec(),
            Self::Polygon => {
                let n = node_count.min(MAX_NODES_PER_ZONE);
                let mut edges = POLYGON_EDGES[..n].to_vec();
                if let Some(last) = edges.last_mut() {
                    last[1] = 0;
                }
                edges
            }
            Self::Line => vec![[0, 1]],
            Self::Vertex => Vec::new(),
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Connectivity of one input zone
#[derive(Debug, Clone, Copy)]
pub struct CellView<'a> {
    pub cell_type: CellType,
    pub nodes: &'a [usize],
}

impl<'a> CellView<'a> {
    pub fn new(cell_type: CellType, nodes: &'a [usize]) -> Self {
        Self { cell_type, nodes }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Global node ids of each local face
    pub fn face_nodes(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        self.cell_type
            .faces()
            .iter()
            .map(move |face| face.iter().map(|&local| self.nodes[local]).collect())
    }

    /// Global node ids of each local edge
    pub fn edge_nodes(&self) -> Vec<[usize; 2]> {
        self.cell_type
            .edges(self.nodes.len())
            .into_iter()
            .map(|[a, b]| [self.nodes[a], self.nodes[b]])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vtk_ids_round_trip_and_reject_unknown() {
        for id in [1u8, 3, 5, 7, 8, 9, 10, 11, 12, 13, 14] {
            assert_eq!(CellType::from_vtk_id(id).unwrap().vtk_id(), id);
        }
        assert!(matches!(
            CellType::from_vtk_id(42),
            Err(MirError::UnsupportedCellType(_))
        ));
    }

    #[test]
    fn test_voxel_faces_match_hexahedron_faces() {
        // Voxel numbering swaps corners 2/3 and 6/7 relative to hexahedra.
        const HEX_TO_VOXEL: [usize; 8] = [0, 1, 3, 2, 4, 5, 7, 6];
        for (hex_face, voxel_face) in HEXAHEDRON_FACES.iter().zip(VOXEL_FACES) {
            let mapped: Vec<usize> = hex_face.iter().map(|&i| HEX_TO_VOXEL[i]).collect();
            assert_eq!(mapped.as_slice(), *voxel_face);
        }
        for (hex_edge, voxel_edge) in HEXAHEDRON_EDGES.iter().zip(VOXEL_EDGES) {
            assert_eq!([HEX_TO_VOXEL[hex_edge[0]], HEX_TO_VOXEL[hex_edge[1]]], *voxel_edge);
        }
    }

    #[test]
    fn test_polygon_edges_close() {
        let edges = CellType::Polygon.edges(5);
        assert_eq!(edges, vec![[0, 1], [1, 2], [2, 3], [3, 4], [4, 0]]);
    }

    #[test]
    fn test_node_count_validation() {
        assert!(CellType::Hexahedron.validate_node_count(8).is_ok());
        assert!(CellType::Hexahedron.validate_node_count(6).is_err());
        assert!(CellType::Polygon.validate_node_count(5).is_ok());
        assert!(CellType::Polygon.validate_node_count(9).is_err());
    }

    #[test]
    fn test_every_edge_belongs_to_two_faces() {
        for cell_type in [
            CellType::Tetra,
            CellType::Hexahedron,
            CellType::Voxel,
            CellType::Wedge,
            CellType::Pyramid,
        ] {
            let n = cell_type.node_count().unwrap();
            for [a, b] in cell_type.edges(n) {
                let owners = cell_type
                    .faces()
                    .iter()
                    .filter(|face| {
                        (0..face.len()).any(|i| {
                            let (p, q) = (face[i], face[(i + 1) % face.len()]);
                            (p == a && q == b) || (p == b && q == a)
                        })
                    })
                    .count();
                assert_eq!(owners, 2, "{:?} edge {}-{}", cell_type, a, b);
            }
        }
    }
}
