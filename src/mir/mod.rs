// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Material interface reconstruction pass - subsampling, classification,
//! vertex welding and output assembly

mod classify;
mod dedup;
mod driver;
mod output;
mod subsample;

pub use classify::{classify_zone, classify_zones, ClassificationCounts, ZoneClass};
pub use dedup::{CoordinateGrid, GridKey, ReconstructedCoord, VertexDeduplicator, ZoneResolver};
pub use driver::{ReconstructionSession, Reconstructor, SessionState};
pub use output::{
    OutputBuilder, ReconstructedMesh, ReconstructedZone, ReconstructionMode, ReconstructionStats,
};
pub use subsample::{
    CellEntities, EdgeKey, FaceKey, SlotFractions, SubsampledFractions, ZoneCntAndVf,
};
