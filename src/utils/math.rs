// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Point3, Vector3};

/// Six times the signed volume of a tetrahedron; positive for VTK orientation
pub fn tet_determinant(
    p0: &Point3<f64>,
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
) -> f64 {
    (p1 - p0).dot(&(p2 - p0).cross(&(p3 - p0)))
}

/// Signed volume of a tetrahedron
pub fn tet_volume(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>, p3: &Point3<f64>) -> f64 {
    tet_determinant(p0, p1, p2, p3) / 6.0
}

/// Signed area of a triangle projected on the xy plane; positive when counter-clockwise
pub fn triangle_area_xy(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> f64 {
    0.5 * ((p1.x - p0.x) * (p2.y - p0.y) - (p2.x - p0.x) * (p1.y - p0.y))
}

/// Unit normal of a triangle, zero when degenerate
pub fn triangle_normal(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Vector3<f64> {
    let n = (p1 - p0).cross(&(p2 - p0));
    let length = n.norm();
    if length > 0.0 {
        n / length
    } else {
        Vector3::zeros()
    }
}
