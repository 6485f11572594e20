// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - cell subdivision, shapes and material merging

mod merge;
mod shapes;
mod subdivide;
pub mod tables;
mod weights;

pub use merge::{find_intersect, FragmentMerger, MergeTarget, SlotMaterial, VertexResolver};
pub use shapes::{
    has_repeated_index, FragmentLists, FragmentNode, MaterialNode, MaterialShape, MaterialTet,
    MaterialTri, Shape, Tet, TetList, Tri, TriList, Wedge, WedgeList,
};
pub use subdivide::{
    low_tets, low_tets_for_hex, low_tets_for_voxel, low_tets_for_wedge, low_tris, subdivide,
    tetrahedralize, triangulate, CellVolumeFractions, Subdivision,
};
pub use weights::NodeWeight;
