// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Unstructured input mesh with flat connectivity

use super::{BoundingBox, CellType, CellView, Dimension};
use crate::error::{MirError, MirResult};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Mixed-cell mesh: points plus per-cell slices of a flat connectivity array
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnstructuredMesh {
    pub points: Vec<Point3<f64>>,
    pub cell_types: Vec<CellType>,
    /// `offsets[i]..offsets[i + 1]` is cell i's range in `connectivity`
    pub offsets: Vec<usize>,
    pub connectivity: Vec<usize>,
}

impl UnstructuredMesh {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self {
            points,
            cell_types: Vec::new(),
            offsets: vec![0],
            connectivity: Vec::new(),
        }
    }

    /// Append a cell and return its zone id
    pub fn add_cell(&mut self, cell_type: CellType, nodes: &[usize]) -> MirResult<usize> {
        cell_type.validate_node_count(nodes.len())?;
        if let Some(&bad) = nodes.iter().find(|&&n| n >= self.points.len()) {
            return Err(MirError::InputMismatch(format!(
                "node {} out of range ({} points)",
                bad,
                self.points.len()
            )));
        }
        self.cell_types.push(cell_type);
        self.connectivity.extend_from_slice(nodes);
        self.offsets.push(self.connectivity.len());
        Ok(self.cell_types.len() - 1)
    }

    pub fn cell_count(&self) -> usize {
        self.cell_types.len()
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn cell(&self, zone: usize) -> CellView<'_> {
        let range = self.offsets[zone]..self.offsets[zone + 1];
        CellView::new(self.cell_types[zone], &self.connectivity[range])
    }

    pub fn cells(&self) -> impl Iterator<Item = CellView<'_>> + '_ {
        (0..self.cell_count()).map(move |zone| self.cell(zone))
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Corner positions of one zone, in local order
    pub fn cell_points(&self, zone: usize) -> Vec<Point3<f64>> {
        self.cell(zone)
            .nodes
            .iter()
            .map(|&node| self.points[node])
            .collect()
    }

    /// Shared dimension of all cells
    pub fn dimension(&self) -> MirResult<Dimension> {
        let mut dimension = None;
        for &cell_type in &self.cell_types {
            let dim = cell_type
                .dimension()
                .ok_or_else(|| MirError::UnsupportedCellType(cell_type.to_string()))?;
            match dimension {
                None => dimension = Some(dim),
                Some(existing) if existing != dim => return Err(MirError::MixedDimensions),
                Some(_) => {}
            }
        }
        Ok(dimension.unwrap_or(Dimension::Three))
    }

    /// Structural checks for meshes that did not come through `add_cell`
    pub fn validate(&self) -> MirResult<()> {
        if self.offsets.len() != self.cell_types.len() + 1 {
            return Err(MirError::InputMismatch(format!(
                "{} offsets for {} cells",
                self.offsets.len(),
                self.cell_types.len()
            )));
        }
        if self.offsets.last().copied() != Some(self.connectivity.len()) {
            return Err(MirError::InputMismatch(
                "last offset does not match connectivity length".into(),
            ));
        }
        for zone in 0..self.cell_count() {
            if self.offsets[zone] > self.offsets[zone + 1] {
                return Err(MirError::InputMismatch(format!(
                    "offsets decrease at zone {}",
                    zone
                )));
            }
            let cell = self.cell(zone);
            cell.cell_type.validate_node_count(cell.node_count())?;
            if cell.nodes.iter().any(|&n| n >= self.points.len()) {
                return Err(MirError::InputMismatch(format!(
                    "zone {} references a missing point",
                    zone
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square_points() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_add_and_view_cells() {
        let mut mesh = UnstructuredMesh::new(unit_square_points());
        let quad = mesh.add_cell(CellType::Quad, &[0, 1, 2, 3]).unwrap();
        let tri = mesh.add_cell(CellType::Triangle, &[0, 1, 2]).unwrap();

        assert_eq!(quad, 0);
        assert_eq!(tri, 1);
        assert_eq!(mesh.cell(1).nodes, &[0, 1, 2]);
        assert_eq!(mesh.dimension().unwrap(), Dimension::Two);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_cells() {
        let mut mesh = UnstructuredMesh::new(unit_square_points());
        assert!(mesh.add_cell(CellType::Quad, &[0, 1, 2]).is_err());
        assert!(mesh.add_cell(CellType::Triangle, &[0, 1, 9]).is_err());
        assert_eq!(mesh.cell_count(), 0);
    }

    #[test]
    fn test_mixed_dimensions() {
        let mut points = unit_square_points();
        points.push(Point3::new(0.0, 0.0, 1.0));
        let mut mesh = UnstructuredMesh::new(points);
        mesh.add_cell(CellType::Triangle, &[0, 1, 2]).unwrap();
        mesh.add_cell(CellType::Tetra, &[0, 1, 3, 4]).unwrap();
        assert_eq!(mesh.dimension(), Err(MirError::MixedDimensions));
    }
}
