// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Clean/mixed decision per zone from node-averaged fractions

use super::subsample::SubsampledFractions;
use crate::mesh::{CellView, MaterialVolumeFractions, UnstructuredMesh};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome for one zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneClass {
    /// One material dominates at every node
    Clean(usize),
    Mixed,
}

impl ZoneClass {
    pub fn is_clean(self) -> bool {
        matches!(self, ZoneClass::Clean(_))
    }
}

/// Instrumentation counters of a classification pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationCounts {
    /// Exactly one material present at the zone's nodes
    pub fully_clean: usize,
    /// No material dominates at every node
    pub fully_mixed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Verdict {
    class: ZoneClass,
    single_material: bool,
}

/// Classify one zone.
///
/// More than two materials at the nodes, or no material that is at least as
/// large as every other at every node, makes the zone mixed.
pub fn classify_zone(
    cell: &CellView<'_>,
    zone: usize,
    fractions: &SubsampledFractions,
    materials: &MaterialVolumeFractions,
) -> ZoneClass {
    verdict(cell, zone, fractions, materials).class
}

fn verdict(
    cell: &CellView<'_>,
    zone: usize,
    fractions: &SubsampledFractions,
    materials: &MaterialVolumeFractions,
) -> Verdict {
    let present: Vec<usize> = (0..fractions.material_count())
        .filter(|&m| cell.nodes.iter().any(|&n| fractions.node_vf(n)[m] > 0.0))
        .collect();

    match present.len() {
        0 => Verdict {
            class: ZoneClass::Clean(materials.dominant_material(zone)),
            single_material: true,
        },
        1 => Verdict {
            class: ZoneClass::Clean(present[0]),
            single_material: true,
        },
        2 => {
            let dominant = present.iter().copied().find(|&m| {
                cell.nodes.iter().all(|&n| {
                    let vf = fractions.node_vf(n);
                    present.iter().all(|&other| vf[m] >= vf[other])
                })
            });
            Verdict {
                class: dominant.map_or(ZoneClass::Mixed, ZoneClass::Clean),
                single_material: false,
            }
        }
        _ => Verdict {
            class: ZoneClass::Mixed,
            single_material: false,
        },
    }
}

/// Classify every zone in parallel
pub fn classify_zones(
    mesh: &UnstructuredMesh,
    fractions: &SubsampledFractions,
    materials: &MaterialVolumeFractions,
) -> (Vec<ZoneClass>, ClassificationCounts) {
    let verdicts: Vec<Verdict> = (0..mesh.cell_count())
        .into_par_iter()
        .map(|zone| verdict(&mesh.cell(zone), zone, fractions, materials))
        .collect();

    let mut counts = ClassificationCounts::default();
    for v in &verdicts {
        if v.single_material {
            counts.fully_clean += 1;
        }
        if v.class == ZoneClass::Mixed {
            counts.fully_mixed += 1;
        }
    }
    log::debug!(
        "classified {} zones: {} fully clean, {} fully mixed",
        verdicts.len(),
        counts.fully_clean,
        counts.fully_mixed
    );

    (verdicts.into_iter().map(|v| v.class).collect(), counts)
}
