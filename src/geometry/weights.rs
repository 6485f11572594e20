// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Barycentric combinations of a cell's corner nodes

use crate::mesh::MAX_NODES_PER_ZONE;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Weight of each original corner in a derived point.
///
/// Entries are non-negative and sum to one for every point produced by the
/// subdivider and the merger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeWeight([f64; MAX_NODES_PER_ZONE]);

impl NodeWeight {
    pub fn zero() -> Self {
        Self([0.0; MAX_NODES_PER_ZONE])
    }

    /// Pure selection of one corner
    pub fn corner(local: usize) -> Self {
        let mut weight = Self::zero();
        weight.0[local] = 1.0;
        weight
    }

    /// Equal share of the given corners
    pub fn average(locals: &[usize]) -> Self {
        let mut weight = Self::zero();
        if locals.is_empty() {
            return weight;
        }
        let share = 1.0 / locals.len() as f64;
        for &local in locals {
            weight.0[local] += share;
        }
        weight
    }

    pub fn from_values(values: [f64; MAX_NODES_PER_ZONE]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; MAX_NODES_PER_ZONE] {
        &self.0
    }

    /// `self` at t = 0, `other` at t = 1
    pub fn lerp(&self, other: &NodeWeight, t: f64) -> Self {
        let mut weight = Self::zero();
        for (out, (a, b)) in weight.0.iter_mut().zip(self.0.iter().zip(other.0.iter())) {
            *out = a + (b - a) * t;
        }
        weight
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn is_partition_of_unity(&self, tolerance: f64) -> bool {
        self.0.iter().all(|&w| w >= -tolerance) && (self.sum() - 1.0).abs() <= tolerance
    }

    /// Corner index when the weight selects exactly one corner
    pub fn as_corner(&self) -> Option<usize> {
        let mut selected = None;
        for (local, &w) in self.0.iter().enumerate() {
            if w == 1.0 && selected.is_none() {
                selected = Some(local);
            } else if w != 0.0 {
                return None;
            }
        }
        selected
    }

    /// Position from the cell's corner positions
    pub fn apply(&self, corners: &[Point3<f64>]) -> Point3<f64> {
        let mut acc = nalgebra::Vector3::zeros();
        for (w, corner) in self.0.iter().zip(corners) {
            acc += corner.coords * *w;
        }
        Point3::from(acc)
    }

    /// Scalar from per-corner values
    pub fn interpolate(&self, values: &[f64]) -> f64 {
        self.0.iter().zip(values).map(|(w, v)| w * v).sum()
    }
}

impl Default for NodeWeight {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_corner_and_average() {
        let corner = NodeWeight::corner(3);
        assert_eq!(corner.as_corner(), Some(3));
        assert!(corner.is_partition_of_unity(1e-12));

        let center = NodeWeight::average(&[0, 1, 2, 3]);
        assert_eq!(center.as_corner(), None);
        assert_relative_eq!(center.values()[2], 0.25);
        assert_relative_eq!(center.sum(), 1.0);
    }

    #[test]
    fn test_lerp_keeps_partition_of_unity() {
        let a = NodeWeight::corner(0);
        let b = NodeWeight::average(&[1, 2, 5]);
        let mid = a.lerp(&b, 0.3);
        assert!(mid.is_partition_of_unity(1e-12));
        assert_relative_eq!(mid.values()[0], 0.7);
        assert_relative_eq!(mid.values()[5], 0.1);
    }

    #[test]
    fn test_apply_and_interpolate() {
        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
        ];
        let weight = NodeWeight::average(&[0, 1, 2]);
        let p = weight.apply(&corners);
        assert_relative_eq!(p.x, 2.0 / 3.0);
        assert_relative_eq!(p.y, 4.0 / 3.0);
        assert_relative_eq!(weight.interpolate(&[3.0, 6.0, 9.0]), 6.0);
    }
}
