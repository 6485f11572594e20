// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Global output vertex table with quantized-position welding.
//!
//! Positions are mapped onto an integer grid spanning the mesh bounding box;
//! two candidates rounding to the same grid node share one output index. All
//! original mesh points are seeded first so node `i` is always vertex `i`.

use crate::geometry::{FragmentNode, NodeWeight, VertexResolver};
use crate::mesh::{BoundingBox, UnstructuredMesh};
use ahash::AHashMap;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// One output vertex and how to interpolate onto it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructedCoord {
    pub point: Point3<f64>,
    /// Combination of `orig_zone`'s corners that produced the point
    pub weight: NodeWeight,
    pub orig_zone: usize,
    /// Input node id for original points
    pub orig_node: Option<usize>,
}

/// Integer grid key of a position
pub type GridKey = [i64; 3];

/// Maps positions to the nearest node of a grid with `1 / scale` spacing anchored
/// at the box minimum.
///
/// Keys are rounded rather than truncated, so two candidates a hair apart on
/// either side of a grid line still share a key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateGrid {
    origin: Point3<f64>,
    scale: f64,
}

impl CoordinateGrid {
    pub fn new(bbox: &BoundingBox, steps: f64) -> Self {
        if bbox.is_empty() {
            return Self {
                origin: Point3::origin(),
                scale: 1.0,
            };
        }
        let extent = bbox.max_extent();
        let scale = if extent > 0.0 { steps / extent } else { 1.0 };
        Self {
            origin: bbox.min,
            scale,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn key(&self, point: &Point3<f64>) -> GridKey {
        let q = (point - self.origin) * self.scale;
        [q.x.round() as i64, q.y.round() as i64, q.z.round() as i64]
    }
}

#[derive(Debug, Clone)]
pub struct VertexDeduplicator {
    grid: CoordinateGrid,
    lookup: AHashMap<GridKey, usize>,
    coords: Vec<ReconstructedCoord>,
    original_count: usize,
}

impl VertexDeduplicator {
    /// Seed with every input point
    pub fn new(mesh: &UnstructuredMesh, steps: f64) -> Self {
        let grid = CoordinateGrid::new(&mesh.bounding_box(), steps);

        // First zone and local slot referencing each point
        let mut owner: Vec<Option<(usize, usize)>> = vec![None; mesh.point_count()];
        for (zone, cell) in mesh.cells().enumerate() {
            for (local, &node) in cell.nodes.iter().enumerate() {
                if owner[node].is_none() {
                    owner[node] = Some((zone, local));
                }
            }
        }

        let mut dedup = Self {
            grid,
            lookup: AHashMap::with_capacity(mesh.point_count()),
            coords: Vec::with_capacity(mesh.point_count()),
            original_count: mesh.point_count(),
        };
        for (node, point) in mesh.points.iter().enumerate() {
            let (zone, local) = owner[node].unwrap_or((0, 0));
            dedup.lookup.entry(grid.key(point)).or_insert(node);
            dedup.coords.push(ReconstructedCoord {
                point: *point,
                weight: NodeWeight::corner(local),
                orig_zone: zone,
                orig_node: Some(node),
            });
        }
        dedup
    }

    /// Index of a synthesized point, appending it when its grid node is new
    pub fn resolve_point(&mut self, point: Point3<f64>, weight: NodeWeight, zone: usize) -> usize {
        let next = self.coords.len();
        let index = *self.lookup.entry(self.grid.key(&point)).or_insert(next);
        if index == next {
            self.coords.push(ReconstructedCoord {
                point,
                weight,
                orig_zone: zone,
                orig_node: None,
            });
        }
        index
    }

    /// Resolver for fragments of one zone, given its corner positions
    pub fn for_zone<'d>(
        &'d mut self,
        zone: usize,
        corners: &'d [Point3<f64>],
    ) -> ZoneResolver<'d> {
        ZoneResolver {
            dedup: self,
            zone,
            corners,
        }
    }

    pub fn point(&self, index: usize) -> &Point3<f64> {
        &self.coords[index].point
    }

    pub fn coords(&self) -> &[ReconstructedCoord] {
        &self.coords
    }

    pub fn into_coords(self) -> Vec<ReconstructedCoord> {
        self.coords
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn synthesized_count(&self) -> usize {
        self.coords.len() - self.original_count
    }

    pub fn grid(&self) -> &CoordinateGrid {
        &self.grid
    }
}

/// Deduplicator bound to one zone's corners
pub struct ZoneResolver<'d> {
    dedup: &'d mut VertexDeduplicator,
    zone: usize,
    corners: &'d [Point3<f64>],
}

impl ZoneResolver<'_> {
    pub fn point(&self, index: usize) -> &Point3<f64> {
        self.dedup.point(index)
    }
}

impl VertexResolver for ZoneResolver<'_> {
    fn resolve(&mut self, node: &FragmentNode) -> usize {
        if let Some(index) = node.global_index.or(node.orig_index) {
            return index;
        }
        let point = node.weight.apply(self.corners);
        self.dedup.resolve_point(point, node.weight, self.zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::CellType;

    fn square() -> UnstructuredMesh {
        let mut mesh = UnstructuredMesh::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ]);
        mesh.add_cell(CellType::Quad, &[0, 1, 2, 3]).unwrap();
        mesh
    }

    #[test]
    fn test_originals_are_seeded_in_order() {
        let dedup = VertexDeduplicator::new(&square(), 1.0e6);
        assert_eq!(dedup.len(), 4);
        assert_eq!(dedup.synthesized_count(), 0);
        assert_eq!(dedup.coords()[2].orig_node, Some(2));
        assert_eq!(dedup.coords()[2].weight.as_corner(), Some(2));
    }

    #[test]
    fn test_original_positions_resolve_to_original_index() {
        let mut dedup = VertexDeduplicator::new(&square(), 1.0e6);
        let index = dedup.resolve_point(Point3::new(2.0, 2.0, 0.0), NodeWeight::corner(2), 0);
        assert_eq!(index, 2);
        assert_eq!(dedup.len(), 4);
    }

    #[test]
    fn test_near_identical_points_weld() {
        let mut dedup = VertexDeduplicator::new(&square(), 1.0e6);
        let weight = NodeWeight::average(&[0, 1]);
        let a = dedup.resolve_point(Point3::new(1.0 + 1.0e-9, 0.0, 0.0), weight, 0);
        let b = dedup.resolve_point(Point3::new(1.0 + 2.0e-9, 0.0, 0.0), weight, 0);
        let c = dedup.resolve_point(Point3::new(1.5, 0.0, 0.0), weight, 0);
        assert_eq!(a, 4);
        assert_eq!(a, b);
        assert_eq!(c, 5);
        assert_eq!(dedup.synthesized_count(), 2);
    }

    #[test]
    fn test_zone_resolver_uses_weights() {
        let mesh = square();
        let corners = mesh.cell_points(0);
        let mut dedup = VertexDeduplicator::new(&mesh, 1.0e6);
        let node = FragmentNode {
            vf: 0.5,
            weight: NodeWeight::average(&[0, 1, 2, 3]),
            local: [0.25; 4],
            orig_index: None,
            global_index: None,
        };
        let mut resolver = dedup.for_zone(0, &corners);
        let index = resolver.resolve(&node);
        assert_eq!(index, 4);
        assert_eq!(*resolver.point(index), Point3::new(1.0, 1.0, 0.0));
        assert_eq!(resolver.resolve(&node), 4);

        let original = FragmentNode {
            orig_index: Some(3),
            ..node
        };
        assert_eq!(resolver.resolve(&original), 3);
    }

    #[test]
    fn test_degenerate_box_uses_unit_scale() {
        let bbox = BoundingBox::from_points(&[Point3::new(1.0, 1.0, 1.0)]);
        let grid = CoordinateGrid::new(&bbox, 1.0e6);
        assert_eq!(grid.scale(), 1.0);
        assert_eq!(grid.key(&Point3::new(1.4, 1.0, 1.0)), [0, 0, 0]);
    }

    #[test]
    fn test_keys_round_across_grid_lines() {
        // Extent 2 over 1e6 steps puts x = 1 exactly on a grid line
        let grid = CoordinateGrid::new(&square().bounding_box(), 1.0e6);
        let below = grid.key(&Point3::new(1.0 - 1.0e-9, 0.0, 0.0));
        let above = grid.key(&Point3::new(1.0 + 1.0e-9, 0.0, 0.0));
        assert_eq!(below, above);
        assert_eq!(below, [500_000, 0, 0]);
    }
}
