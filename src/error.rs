// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for material interface reconstruction

use thiserror::Error;

/// Errors that abort a reconstruction pass.
///
/// Degenerate fragments are not errors; they are dropped and counted in
/// [`ReconstructionStats`](crate::mir::ReconstructionStats).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MirError {
    /// Cell type that has no subdivision rule (or an unknown VTK id).
    #[error("Unsupported cell type: {0}")]
    UnsupportedCellType(String),

    /// Cell whose connectivity does not match its type.
    #[error("Cell type {cell_type} expects {expected} nodes, got {actual}")]
    InvalidNodeCount {
        cell_type: String,
        expected: usize,
        actual: usize,
    },

    /// Subdivision level name that is not low/med/high.
    #[error("Unknown subdivision level: {0}")]
    UnknownSubdivisionLevel(String),

    /// 2D and 3D cells in the same mesh.
    #[error("Mesh mixes 2D and 3D cells")]
    MixedDimensions,

    /// Material table does not line up with the mesh.
    #[error("Input mismatch: {0}")]
    InputMismatch(String),

    /// Two volume-fraction interpolants along an edge never cross.
    #[error("Parallel volume fraction interpolants ({vf1_a}, {vf1_b}) vs ({vf2_a}, {vf2_b})")]
    ParallelInterpolants {
        vf1_a: f64,
        vf1_b: f64,
        vf2_a: f64,
        vf2_b: f64,
    },

    /// Dominance pattern that no split case covers.
    #[error("No merge case for dominance pattern {0:#05b}")]
    UnmatchedMergeCase(usize),
}

/// Result type for reconstruction operations.
pub type MirResult<T> = std::result::Result<T, MirError>;
