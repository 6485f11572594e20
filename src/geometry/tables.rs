// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Precomputed subdivision tables.
//!
//! Canonical frames: the node with the smallest global id is moved to local
//! corner 0 by a permutation selected from the flip (hexahedron) or
//! rotation/flip (wedge) tables. Case tables are indexed by the diagonal
//! choices on the quad faces that do not touch corner 0. Every listed
//! tetrahedron has positive volume in the canonical frame; a permutation
//! containing an odd number of reflections inverts it.

use crate::config::SubdivisionLevel;
use crate::error::{MirError, MirResult};
use crate::mesh::CellType;

/// Hexahedron corner reached from the canonical corner when the flip bits
/// (x = 1, y = 2, z = 4) are applied: `HEX_FLIP_PERMUTATION[flip][canonical]`.
pub const HEX_FLIP_PERMUTATION: [[usize; 8]; 8] = [
    [0, 1, 2, 3, 4, 5, 6, 7],
    [1, 0, 3, 2, 5, 4, 7, 6],
    [3, 2, 1, 0, 7, 6, 5, 4],
    [2, 3, 0, 1, 6, 7, 4, 5],
    [4, 5, 6, 7, 0, 1, 2, 3],
    [5, 4, 7, 6, 1, 0, 3, 2],
    [7, 6, 5, 4, 3, 2, 1, 0],
    [6, 7, 4, 5, 2, 3, 0, 1],
];

/// Flip bits that bring a hexahedron corner to the canonical origin
pub const HEX_FLIP_FOR_CORNER: [usize; 8] = [0, 1, 3, 2, 4, 5, 7, 6];

/// Voxel corner for each hexahedron corner (the map is its own inverse)
pub const VOXEL_TO_HEX: [usize; 8] = [0, 1, 3, 2, 4, 5, 7, 6];

/// Far quad faces of the canonical hexahedron as (diagonal through corner 6, other diagonal)
pub const HEX_FAR_DIAGONALS: [([usize; 2], [usize; 2]); 3] =
    [([1, 6], [2, 5]), ([3, 6], [2, 7]), ([4, 6], [5, 7])];

/// Canonical hexahedron decompositions, case = d_x | d_y << 1 | d_z << 2 where
/// d_a is set when the far face normal to axis a is split through corner 6.
pub const HEX_CASE_TETS: [&[[usize; 4]]; 8] = [
    &[[1, 0, 5, 2], [3, 0, 2, 7], [4, 0, 7, 5], [6, 2, 5, 7], [0, 2, 7, 5]],
    &[[0, 1, 2, 6], [0, 1, 6, 5], [0, 3, 7, 2], [0, 2, 7, 6], [0, 4, 5, 7], [0, 5, 6, 7]],
    &[[0, 1, 2, 5], [0, 2, 6, 5], [0, 3, 6, 2], [0, 3, 7, 6], [0, 4, 5, 7], [0, 5, 6, 7]],
    &[[0, 1, 2, 6], [0, 1, 6, 5], [0, 3, 6, 2], [0, 3, 7, 6], [0, 4, 5, 7], [0, 5, 6, 7]],
    &[[0, 1, 2, 5], [0, 2, 6, 5], [0, 3, 7, 2], [0, 2, 7, 6], [0, 4, 5, 6], [0, 4, 6, 7]],
    &[[0, 1, 2, 6], [0, 1, 6, 5], [0, 3, 7, 2], [0, 2, 7, 6], [0, 4, 5, 6], [0, 4, 6, 7]],
    &[[0, 1, 2, 5], [0, 2, 6, 5], [0, 3, 6, 2], [0, 3, 7, 6], [0, 4, 5, 6], [0, 4, 6, 7]],
    &[[0, 1, 2, 6], [0, 1, 6, 5], [0, 3, 6, 2], [0, 3, 7, 6], [0, 4, 5, 6], [0, 4, 6, 7]],
];

/// Wedge corner reached from the canonical corner, indexed by the corner that
/// holds the smallest id. Rows 3..6 swap the triangles (a reflection).
pub const WEDGE_PERMUTATION: [[usize; 6]; 6] = [
    [0, 1, 2, 3, 4, 5],
    [1, 2, 0, 4, 5, 3],
    [2, 0, 1, 5, 3, 4],
    [3, 4, 5, 0, 1, 2],
    [4, 5, 3, 1, 2, 0],
    [5, 3, 4, 2, 0, 1],
];

/// Far quad of the canonical wedge as (diagonal 1-5, diagonal 2-4)
pub const WEDGE_FAR_DIAGONALS: ([usize; 2], [usize; 2]) = ([1, 5], [2, 4]);

/// Canonical wedge decompositions: index 1 when the far quad is split 1-5
pub const WEDGE_CASE_TETS: [[[usize; 4]; 3]; 2] = [
    [[0, 3, 5, 4], [0, 1, 4, 2], [0, 2, 4, 5]],
    [[0, 3, 5, 4], [0, 1, 5, 2], [0, 1, 4, 5]],
];

/// Pyramid decompositions: index 0 splits the base along 0-2, index 1 along 1-3
pub const PYRAMID_CASE_TETS: [[[usize; 4]; 2]; 2] =
    [[[0, 1, 2, 4], [0, 2, 3, 4]], [[0, 1, 3, 4], [1, 2, 3, 4]]];

/// Quad decompositions: index 0 splits along 0-2, index 1 along 1-3
pub const QUAD_CASE_TRIS: [[[usize; 3]; 2]; 2] = [[[0, 1, 2], [0, 2, 3]], [[0, 1, 3], [1, 2, 3]]];

/// Pixel corner for each quad corner
pub const PIXEL_TO_QUAD: [usize; 4] = [0, 1, 3, 2];

/// Number of tetrahedra a 3D cell produces (upper bound for low-level hexahedra)
pub fn tet_count(level: SubdivisionLevel, cell_type: CellType) -> MirResult<usize> {
    let counts = match cell_type {
        CellType::Tetra => [1, 12, 24],
        CellType::Hexahedron | CellType::Voxel => [6, 24, 48],
        CellType::Wedge => [3, 18, 36],
        CellType::Pyramid => [2, 16, 32],
        other => return Err(MirError::UnsupportedCellType(other.to_string())),
    };
    Ok(counts[level_index(level)])
}

/// Number of triangles a 2D cell produces
pub fn tri_count(
    level: SubdivisionLevel,
    cell_type: CellType,
    node_count: usize,
) -> MirResult<usize> {
    let counts = match cell_type {
        CellType::Triangle => [1, 3, 6],
        CellType::Quad | CellType::Pixel => [2, 4, 8],
        CellType::Polygon => [node_count.saturating_sub(2), node_count, 2 * node_count],
        other => return Err(MirError::UnsupportedCellType(other.to_string())),
    };
    Ok(counts[level_index(level)])
}

fn level_index(level: SubdivisionLevel) -> usize {
    match level {
        SubdivisionLevel::Low => 0,
        SubdivisionLevel::Med => 1,
        SubdivisionLevel::High => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX_UNIT: [[f64; 3]; 8] = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];

    const WEDGE_UNIT: [[f64; 3]; 6] = [
        [0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 1.0, 1.0],
        [1.0, 0.0, 1.0],
    ];

    fn signed_volume(p: &[[f64; 3]], tet: [usize; 4]) -> f64 {
        let d = |i: usize| {
            [
                p[tet[i]][0] - p[tet[0]][0],
                p[tet[i]][1] - p[tet[0]][1],
                p[tet[i]][2] - p[tet[0]][2],
            ]
        };
        let (u, v, w) = (d(1), d(2), d(3));
        (u[0] * (v[1] * w[2] - v[2] * w[1]) - u[1] * (v[0] * w[2] - v[2] * w[0])
            + u[2] * (v[0] * w[1] - v[1] * w[0]))
            / 6.0
    }

    #[test]
    fn test_hex_cases_fill_the_cube() {
        for (case, tets) in HEX_CASE_TETS.iter().enumerate() {
            let mut total = 0.0;
            for &tet in tets.iter() {
                let v = signed_volume(&HEX_UNIT, tet);
                assert!(v > 0.0, "case {} tet {:?} inverted", case, tet);
                total += v;
            }
            assert!((total - 1.0).abs() < 1e-12, "case {} volume {}", case, total);
        }
    }

    #[test]
    fn test_hex_cases_use_their_diagonals() {
        for (case, tets) in HEX_CASE_TETS.iter().enumerate() {
            for (axis, (through_six, other)) in HEX_FAR_DIAGONALS.iter().enumerate() {
                let wanted = if case & (1 << axis) != 0 { through_six } else { other };
                let has_edge = tets
                    .iter()
                    .any(|tet| tet.contains(&wanted[0]) && tet.contains(&wanted[1]));
                assert!(has_edge, "case {} axis {}", case, axis);
            }
        }
    }

    #[test]
    fn test_flip_permutations_move_corner_to_origin() {
        for corner in 0..8 {
            let flip = HEX_FLIP_FOR_CORNER[corner];
            assert_eq!(HEX_FLIP_PERMUTATION[flip][0], corner);
        }
        for corner in 0..6 {
            assert_eq!(WEDGE_PERMUTATION[corner][0], corner);
        }
    }

    #[test]
    fn test_wedge_cases_fill_the_prism() {
        for tets in WEDGE_CASE_TETS.iter() {
            let total: f64 = tets
                .iter()
                .map(|&tet| {
                    let v = signed_volume(&WEDGE_UNIT, tet);
                    assert!(v > 0.0);
                    v
                })
                .sum();
            assert!((total - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_counts() {
        assert_eq!(tet_count(SubdivisionLevel::Med, CellType::Hexahedron).unwrap(), 24);
        assert_eq!(tet_count(SubdivisionLevel::High, CellType::Hexahedron).unwrap(), 48);
        assert_eq!(tet_count(SubdivisionLevel::Low, CellType::Pyramid).unwrap(), 2);
        assert_eq!(tri_count(SubdivisionLevel::High, CellType::Polygon, 5).unwrap(), 10);
        assert!(tet_count(SubdivisionLevel::Low, CellType::Quad).is_err());
        assert!(tri_count(SubdivisionLevel::Low, CellType::Line, 2).is_err());
    }
}
