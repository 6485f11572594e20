// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Input mesh module - cell topology, connectivity and material fractions

mod bbox;
mod cell;
mod materials;
mod unstructured;

pub use bbox::BoundingBox;
pub use cell::{CellType, CellView, Dimension, MAX_NODES_PER_ZONE};
pub use materials::{MaterialVolumeFractions, MixLayout};
pub use unstructured::UnstructuredMesh;
