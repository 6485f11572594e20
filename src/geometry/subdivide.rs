// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cell subdivision into composite tetrahedra and triangles.
//!
//! Low level uses the canonical tables in [`super::tables`]: every quad face is
//! split along the diagonal holding the lower global node id, so two cells
//! sharing a face always agree. Med and high levels add a zone centre plus face
//! centres (and edge midpoints at high), fanning every face symmetrically.

use super::shapes::{MaterialNode, MaterialShape, MaterialTet, MaterialTri};
use super::tables::{
    tet_count, tri_count, HEX_CASE_TETS, HEX_FAR_DIAGONALS, HEX_FLIP_FOR_CORNER,
    HEX_FLIP_PERMUTATION, PIXEL_TO_QUAD, PYRAMID_CASE_TETS, QUAD_CASE_TRIS, VOXEL_TO_HEX,
    WEDGE_CASE_TETS, WEDGE_FAR_DIAGONALS, WEDGE_PERMUTATION,
};
use super::NodeWeight;
use crate::config::SubdivisionLevel;
use crate::error::{MirError, MirResult};
use crate::mesh::{CellType, CellView, Dimension};

/// Per-slot volume fractions seen by one cell.
///
/// `nodes` follows the cell's local corner order, `faces` follows
/// [`CellType::faces`] and `edges` follows [`CellType::edges`]. Faces are
/// needed from med level up, edges at high level.
#[derive(Debug, Clone, Copy)]
pub struct CellVolumeFractions<'a> {
    pub zone: &'a [f64],
    pub nodes: &'a [Vec<f64>],
    pub faces: &'a [Vec<f64>],
    pub edges: &'a [Vec<f64>],
}

/// Composite shapes of one cell
#[derive(Debug, Clone, PartialEq)]
pub enum Subdivision {
    Tets(Vec<MaterialTet>),
    Tris(Vec<MaterialTri>),
}

impl Subdivision {
    pub fn len(&self) -> usize {
        match self {
            Subdivision::Tets(tets) => tets.len(),
            Subdivision::Tris(tris) => tris.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dispatch on the cell's dimension
pub fn subdivide(
    level: SubdivisionLevel,
    cell: &CellView<'_>,
    vf: &CellVolumeFractions<'_>,
) -> MirResult<Subdivision> {
    match cell.cell_type.dimension() {
        Some(Dimension::Three) => tetrahedralize(level, cell, vf).map(Subdivision::Tets),
        Some(Dimension::Two) => triangulate(level, cell, vf).map(Subdivision::Tris),
        None => Err(MirError::UnsupportedCellType(cell.cell_type.to_string())),
    }
}

/// Split a 3D cell into composite tetrahedra
pub fn tetrahedralize(
    level: SubdivisionLevel,
    cell: &CellView<'_>,
    vf: &CellVolumeFractions<'_>,
) -> MirResult<Vec<MaterialTet>> {
    let expected = tet_count(level, cell.cell_type)?;
    check_inputs(level, cell, vf)?;

    let tets = match level {
        SubdivisionLevel::Low => low_tets(cell.cell_type, cell.nodes)?
            .into_iter()
            .map(|group| MaterialShape::new(group.map(|local| corner_node(cell, vf, local))))
            .collect(),
        SubdivisionLevel::Med | SubdivisionLevel::High => centred_tets(level, cell, vf),
    };

    debug_assert!(match level {
        SubdivisionLevel::Low => tets.len() <= expected,
        _ => tets.len() == expected,
    });
    Ok(tets)
}

/// Split a 2D cell into composite triangles
pub fn triangulate(
    level: SubdivisionLevel,
    cell: &CellView<'_>,
    vf: &CellVolumeFractions<'_>,
) -> MirResult<Vec<MaterialTri>> {
    let expected = tri_count(level, cell.cell_type, cell.node_count())?;
    check_inputs(level, cell, vf)?;

    let tris: Vec<MaterialTri> = match level {
        SubdivisionLevel::Low => low_tris(cell.cell_type, cell.nodes)?
            .into_iter()
            .map(|group| MaterialShape::new(group.map(|local| corner_node(cell, vf, local))))
            .collect(),
        SubdivisionLevel::Med | SubdivisionLevel::High => centred_tris(level, cell, vf),
    };

    debug_assert_eq!(tris.len(), expected);
    Ok(tris)
}

fn check_inputs(
    level: SubdivisionLevel,
    cell: &CellView<'_>,
    vf: &CellVolumeFractions<'_>,
) -> MirResult<()> {
    cell.cell_type.validate_node_count(cell.node_count())?;
    if vf.nodes.len() != cell.node_count() {
        return Err(MirError::InputMismatch(format!(
            "{} nodal fractions for a {}-node cell",
            vf.nodes.len(),
            cell.node_count()
        )));
    }
    let three_d = cell.cell_type.dimension() == Some(Dimension::Three);
    let needs_faces = three_d && level != SubdivisionLevel::Low;
    if needs_faces && vf.faces.len() != cell.cell_type.faces().len() {
        return Err(MirError::InputMismatch(format!(
            "{} face fractions for {}",
            vf.faces.len(),
            cell.cell_type
        )));
    }
    let edge_count = cell.cell_type.edges(cell.node_count()).len();
    if level == SubdivisionLevel::High && vf.edges.len() != edge_count {
        return Err(MirError::InputMismatch(format!(
            "{} edge fractions for {}",
            vf.edges.len(),
            cell.cell_type
        )));
    }
    Ok(())
}

fn corner_node(cell: &CellView<'_>, vf: &CellVolumeFractions<'_>, local: usize) -> MaterialNode {
    MaterialNode::new(
        Some(cell.nodes[local]),
        NodeWeight::corner(local),
        vf.nodes[local].clone(),
    )
}

fn lowest_corner(ids: &[usize]) -> usize {
    let mut best = 0;
    for (local, &id) in ids.iter().enumerate() {
        if id < ids[best] {
            best = local;
        }
    }
    best
}

/// Minimal decomposition as local corner groups
pub fn low_tets(cell_type: CellType, node_ids: &[usize]) -> MirResult<Vec<[usize; 4]>> {
    cell_type.validate_node_count(node_ids.len())?;
    match cell_type {
        CellType::Tetra => Ok(vec![[0, 1, 2, 3]]),
        CellType::Hexahedron => Ok(low_tets_for_hex(node_ids)),
        CellType::Voxel => Ok(low_tets_for_voxel(node_ids)),
        CellType::Wedge => Ok(low_tets_for_wedge(node_ids).to_vec()),
        CellType::Pyramid => Ok(low_tets_for_pyramid(node_ids).to_vec()),
        other => Err(MirError::UnsupportedCellType(other.to_string())),
    }
}

/// Hexahedron (VTK order) into 5 or 6 tetrahedra
pub fn low_tets_for_hex(node_ids: &[usize]) -> Vec<[usize; 4]> {
    let flip = HEX_FLIP_FOR_CORNER[lowest_corner(node_ids)];
    let perm = &HEX_FLIP_PERMUTATION[flip];
    let id = |canonical: usize| node_ids[perm[canonical]];

    let mut case = 0;
    for (axis, (through_six, other)) in HEX_FAR_DIAGONALS.iter().enumerate() {
        let through_low = id(through_six[0]).min(id(through_six[1]));
        let other_low = id(other[0]).min(id(other[1]));
        if through_low < other_low {
            case |= 1 << axis;
        }
    }

    let inverted = flip.count_ones() % 2 == 1;
    HEX_CASE_TETS[case]
        .iter()
        .map(|tet| {
            let mut mapped = tet.map(|canonical| perm[canonical]);
            if inverted {
                mapped.swap(2, 3);
            }
            mapped
        })
        .collect()
}

/// Voxel (lexicographic order) into 5 or 6 tetrahedra
pub fn low_tets_for_voxel(node_ids: &[usize]) -> Vec<[usize; 4]> {
    let hex_ids: Vec<usize> = VOXEL_TO_HEX.iter().map(|&v| node_ids[v]).collect();
    low_tets_for_hex(&hex_ids)
        .into_iter()
        .map(|tet| tet.map(|h| VOXEL_TO_HEX[h]))
        .collect()
}

/// Wedge into 3 tetrahedra
pub fn low_tets_for_wedge(node_ids: &[usize]) -> [[usize; 4]; 3] {
    let lowest = lowest_corner(node_ids);
    let perm = &WEDGE_PERMUTATION[lowest];
    let id = |canonical: usize| node_ids[perm[canonical]];

    let (first, second) = WEDGE_FAR_DIAGONALS;
    let case = usize::from(id(first[0]).min(id(first[1])) < id(second[0]).min(id(second[1])));

    let inverted = lowest >= 3;
    WEDGE_CASE_TETS[case].map(|tet| {
        let mut mapped = tet.map(|canonical| perm[canonical]);
        if inverted {
            mapped.swap(2, 3);
        }
        mapped
    })
}

/// Pyramid into 2 tetrahedra
fn low_tets_for_pyramid(node_ids: &[usize]) -> [[usize; 4]; 2] {
    let case = usize::from(lowest_corner(&node_ids[..4]) % 2 == 1);
    PYRAMID_CASE_TETS[case]
}

/// Minimal triangulation as local corner groups
pub fn low_tris(cell_type: CellType, node_ids: &[usize]) -> MirResult<Vec<[usize; 3]>> {
    cell_type.validate_node_count(node_ids.len())?;
    match cell_type {
        CellType::Triangle => Ok(vec![[0, 1, 2]]),
        CellType::Quad => Ok(low_tris_for_quad(node_ids).to_vec()),
        CellType::Pixel => {
            let quad_ids = PIXEL_TO_QUAD.map(|p| node_ids[p]);
            Ok(low_tris_for_quad(&quad_ids)
                .iter()
                .map(|tri| tri.map(|q| PIXEL_TO_QUAD[q]))
                .collect())
        }
        CellType::Polygon => {
            let n = node_ids.len();
            let apex = lowest_corner(node_ids);
            Ok((1..n - 1)
                .map(|i| [apex, (apex + i) % n, (apex + i + 1) % n])
                .collect())
        }
        other => Err(MirError::UnsupportedCellType(other.to_string())),
    }
}

fn low_tris_for_quad(node_ids: &[usize]) -> [[usize; 3]; 2] {
    let case = usize::from(lowest_corner(&node_ids[..4]) % 2 == 1);
    QUAD_CASE_TRIS[case]
}

fn synthesized(weight: NodeWeight, vf: &[f64]) -> MaterialNode {
    MaterialNode::new(None, weight, vf.to_vec())
}

fn edge_midpoint(
    vf: &CellVolumeFractions<'_>,
    edges: &[[usize; 2]],
    a: usize,
    b: usize,
) -> MaterialNode {
    let slot = edges
        .iter()
        .position(|&[p, q]| (p == a && q == b) || (p == b && q == a));
    let fractions = match slot {
        Some(e) => vf.edges[e].clone(),
        // Not a listed edge; fall back to the endpoint average.
        None => vf.nodes[a]
            .iter()
            .zip(&vf.nodes[b])
            .map(|(x, y)| 0.5 * (x + y))
            .collect(),
    };
    MaterialNode::new(None, NodeWeight::average(&[a, b]), fractions)
}

fn centred_tets(
    level: SubdivisionLevel,
    cell: &CellView<'_>,
    vf: &CellVolumeFractions<'_>,
) -> Vec<MaterialTet> {
    let all: Vec<usize> = (0..cell.node_count()).collect();
    let centre = synthesized(NodeWeight::average(&all), vf.zone);
    let edges = cell.cell_type.edges(cell.node_count());
    let mut tets = Vec::new();

    for (f, face) in cell.cell_type.faces().iter().enumerate() {
        let face_centre = synthesized(NodeWeight::average(face), &vf.faces[f]);
        for i in 0..face.len() {
            let (a, b) = (face[i], face[(i + 1) % face.len()]);
            let corner_a = corner_node(cell, vf, a);
            let corner_b = corner_node(cell, vf, b);
            match level {
                SubdivisionLevel::High => {
                    let mid = edge_midpoint(vf, &edges, a, b);
                    tets.push(MaterialShape::new([
                        mid.clone(),
                        corner_a,
                        face_centre.clone(),
                        centre.clone(),
                    ]));
                    tets.push(MaterialShape::new([
                        corner_b,
                        mid,
                        face_centre.clone(),
                        centre.clone(),
                    ]));
                }
                _ => tets.push(MaterialShape::new([
                    corner_b,
                    corner_a,
                    face_centre.clone(),
                    centre.clone(),
                ])),
            }
        }
    }
    tets
}

fn centred_tris(
    level: SubdivisionLevel,
    cell: &CellView<'_>,
    vf: &CellVolumeFractions<'_>,
) -> Vec<MaterialTri> {
    let all: Vec<usize> = (0..cell.node_count()).collect();
    let centre = synthesized(NodeWeight::average(&all), vf.zone);
    let edges = cell.cell_type.edges(cell.node_count());
    let mut tris = Vec::new();

    for &[a, b] in &edges {
        let corner_a = corner_node(cell, vf, a);
        let corner_b = corner_node(cell, vf, b);
        match level {
            SubdivisionLevel::High => {
                let mid = edge_midpoint(vf, &edges, a, b);
                tris.push(MaterialShape::new([corner_a, mid.clone(), centre.clone()]));
                tris.push(MaterialShape::new([mid, corner_b, centre.clone()]));
            }
            _ => tris.push(MaterialShape::new([corner_a, corner_b, centre.clone()])),
        }
    }
    tris
}
