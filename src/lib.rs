// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tetmir - material interface reconstruction
//!
//! Splits the mixed-material zones of an unstructured mesh into
//! single-material tetrahedra, wedges (3D) or triangles (2D) using per-zone
//! material volume fractions. Neighbouring zones agree on every shared face,
//! so the reconstructed material regions are crack free.

pub mod analytics;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod mir;
pub mod synthetic;
pub mod utils;

pub use config::{MirOptions, SubdivisionLevel};
pub use error::{MirError, MirResult};
pub use mesh::{CellType, Dimension, MaterialVolumeFractions, UnstructuredMesh};
pub use mir::{ReconstructedMesh, ReconstructionStats, Reconstructor};

/// Reconstruct material interfaces with the given options
pub fn reconstruct(
    mesh: &UnstructuredMesh,
    materials: &MaterialVolumeFractions,
    options: &MirOptions,
) -> MirResult<ReconstructedMesh> {
    Reconstructor::new(options.clone()).reconstruct(mesh, materials)
}
