// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Reconstruction pass over a whole mesh.
//!
//! A [`ReconstructionSession`] owns everything one pass mutates: the vertex
//! table, the output zone and index tables, and the per-zone fragment scratch
//! buffers. Zones are processed in order; shared vertices are welded through
//! the vertex table as they are produced.

use super::classify::{classify_zones, ZoneClass};
use super::dedup::{VertexDeduplicator, ZoneResolver};
use super::output::{OutputBuilder, ReconstructedMesh, ReconstructionMode};
use super::subsample::SubsampledFractions;
use crate::config::MirOptions;
use crate::error::MirResult;
use crate::geometry::{
    has_repeated_index, low_tets_for_wedge, subdivide, CellVolumeFractions, FragmentLists,
    FragmentMerger, SlotMaterial, Subdivision, Tet, Tri, VertexResolver, Wedge,
};
use crate::mesh::{CellType, Dimension, MaterialVolumeFractions, MixLayout, UnstructuredMesh};
use crate::utils::math::{tet_determinant, triangle_area_xy};
use crate::utils::Timed;
use nalgebra::Point3;

/// Progress of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    AllClean,
    Mixed,
    Done,
}

/// Entry point: options plus a reconstruct call
#[derive(Debug, Clone, Default)]
pub struct Reconstructor {
    options: MirOptions,
}

impl Reconstructor {
    pub fn new(options: MirOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MirOptions {
        &self.options
    }

    /// Split every mixed zone into single-material cells
    pub fn reconstruct(
        &self,
        mesh: &UnstructuredMesh,
        materials: &MaterialVolumeFractions,
    ) -> MirResult<ReconstructedMesh> {
        let mut session = ReconstructionSession::new(&self.options, mesh, materials)?;
        session.run()?;
        Ok(session.finish())
    }
}

/// Mutable state of one reconstruction pass
pub struct ReconstructionSession<'a> {
    options: &'a MirOptions,
    mesh: &'a UnstructuredMesh,
    materials: &'a MaterialVolumeFractions,
    dimension: Dimension,
    layout: MixLayout,
    merger: FragmentMerger,
    state: SessionState,
    dedup: VertexDeduplicator,
    output: OutputBuilder,
    scratch: FragmentLists,
}

impl<'a> ReconstructionSession<'a> {
    pub fn new(
        options: &'a MirOptions,
        mesh: &'a UnstructuredMesh,
        materials: &'a MaterialVolumeFractions,
    ) -> MirResult<Self> {
        mesh.validate()?;
        materials.validate(mesh.cell_count())?;
        let dimension = mesh.dimension()?;

        let mut output = OutputBuilder::new();
        output.stats.input_zones = mesh.cell_count();

        Ok(Self {
            options,
            mesh,
            materials,
            dimension,
            layout: MixLayout::new(materials),
            merger: FragmentMerger::new(options.smoothing),
            state: SessionState::NotStarted,
            dedup: VertexDeduplicator::new(mesh, options.quantization_steps),
            output,
            scratch: FragmentLists::new(),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Process every zone; does nothing once the session has run
    pub fn run(&mut self) -> MirResult<()> {
        if self.state != SessionState::NotStarted {
            return Ok(());
        }
        let _timer = Timed::info("reconstruction");

        if !self.materials.any_mixed() {
            self.state = SessionState::AllClean;
            self.output.stats.mode = ReconstructionMode::AllClean;
            for zone in 0..self.mesh.cell_count() {
                self.emit_whole(zone, self.materials.dominant_material(zone));
            }
        } else {
            self.state = SessionState::Mixed;
            self.output.stats.mode = ReconstructionMode::Mixed;

            let fractions = {
                let _t = Timed::debug("subsampling");
                SubsampledFractions::compute(
                    self.mesh,
                    self.materials,
                    self.options.subdivision_level,
                )?
            };
            let (classes, counts) = {
                let _t = Timed::debug("classification");
                classify_zones(self.mesh, &fractions, self.materials)
            };
            self.output.stats.fully_clean_zones = counts.fully_clean;
            self.output.stats.fully_mixed_zones = counts.fully_mixed;

            let _t = Timed::debug("subdivision and merging");
            for (zone, &class) in classes.iter().enumerate() {
                self.reconstruct_zone(zone, class, &fractions)?;
            }
        }

        self.state = SessionState::Done;
        let stats = &self.output.stats;
        log::info!(
            "{} zones -> {} zones ({:?}), {} coordinates",
            stats.input_zones,
            self.output.zones.len(),
            stats.mode,
            self.dedup.len()
        );
        if stats.degenerate_dropped > 0 || stats.wedges_resplit > 0 {
            log::debug!(
                "dropped {} degenerate fragments, re-split {} wedges",
                stats.degenerate_dropped,
                stats.wedges_resplit
            );
        }
        Ok(())
    }

    pub fn finish(self) -> ReconstructedMesh {
        self.output.finish(self.dimension, self.dedup.into_coords())
    }

    fn emit_whole(&mut self, zone: usize, material: usize) {
        let cell = self.mesh.cell(zone);
        let mixed_var_index = self.layout.index(self.materials, zone, material);
        self.output
            .push_zone(zone, material, cell.cell_type, cell.nodes, mixed_var_index);
        self.output.stats.clean_zones += 1;
    }

    fn reconstruct_zone(
        &mut self,
        zone: usize,
        class: ZoneClass,
        fractions: &SubsampledFractions,
    ) -> MirResult<()> {
        if let ZoneClass::Clean(material) = class {
            if self.options.leave_clean_zones_whole {
                log::trace!("zone {} left whole as material {}", zone, material);
                self.emit_whole(zone, material);
                return Ok(());
            }
        }

        let (mesh, materials) = (self.mesh, self.materials);
        let cell = mesh.cell(zone);
        let zone_vf = materials.zone_vf(zone);
        let entities = fractions.cell_entities(&cell);
        let present: Vec<usize> = (0..materials.material_count)
            .filter(|&m| zone_vf[m] > 0.0 || entities.touches(m))
            .collect();
        if present.is_empty() {
            self.emit_whole(zone, materials.dominant_material(zone));
            return Ok(());
        }

        let slots: Vec<SlotMaterial> = present
            .iter()
            .enumerate()
            .map(|(slot, &material)| SlotMaterial {
                slot,
                material,
                fake: zone_vf[material] <= 0.0,
            })
            .collect();
        let zone_slot_vf: Vec<f64> = present.iter().map(|&m| zone_vf[m]).collect();
        let slot_vf = entities.select(&present);
        let vf = CellVolumeFractions {
            zone: &zone_slot_vf,
            nodes: &slot_vf.nodes,
            faces: &slot_vf.faces,
            edges: &slot_vf.edges,
        };
        let shapes = subdivide(self.options.subdivision_level, &cell, &vf)?;

        let forced = match class {
            ZoneClass::Clean(material) => Some(material),
            ZoneClass::Mixed if !self.options.smoothing => materials.clean_material(zone),
            ZoneClass::Mixed => None,
        };
        log::trace!(
            "zone {}: {} composite shapes, {} material slots, forced {:?}",
            zone,
            shapes.len(),
            slots.len(),
            forced
        );

        let corners = mesh.cell_points(zone);
        let mut resolver = self.dedup.for_zone(zone, &corners);
        let mut emitter = Emitter {
            output: &mut self.output,
            layout: &self.layout,
            materials,
            zone,
            forced,
        };
        match &shapes {
            Subdivision::Tets(tets) => {
                for composite in tets {
                    self.merger.merge_composite_tet(
                        composite,
                        zone,
                        &slots,
                        &mut self.scratch,
                        &mut resolver,
                    )?;
                    emitter.emit_lists(&self.scratch, &mut resolver);
                }
            }
            Subdivision::Tris(tris) => {
                for composite in tris {
                    self.merger
                        .merge_composite_tri(composite, zone, &slots, &mut self.scratch)?;
                    emitter.emit_lists(&self.scratch, &mut resolver);
                }
            }
        }
        emitter.output.stats.subdivided_zones += 1;
        Ok(())
    }
}

/// Writes surviving fragments of one zone to the output tables
struct Emitter<'e> {
    output: &'e mut OutputBuilder,
    layout: &'e MixLayout,
    materials: &'e MaterialVolumeFractions,
    zone: usize,
    forced: Option<usize>,
}

impl Emitter<'_> {
    fn emit_lists(&mut self, lists: &FragmentLists, resolver: &mut ZoneResolver<'_>) {
        for tet in &lists.tets {
            self.emit_tet(tet, resolver);
        }
        for wedge in &lists.wedges {
            self.emit_wedge(wedge, resolver);
        }
        for tri in &lists.tris {
            self.emit_tri(tri, resolver);
        }
    }

    fn push(&mut self, material: usize, cell_type: CellType, nodes: &[usize]) {
        let mixed_var_index = self.layout.index(self.materials, self.zone, material);
        self.output
            .push_zone(self.zone, material, cell_type, nodes, mixed_var_index);
    }

    fn emit_tet(&mut self, tet: &Tet, resolver: &mut ZoneResolver<'_>) {
        let ids: [usize; 4] = std::array::from_fn(|k| resolver.resolve(&tet.nodes[k]));
        let material = self.forced.unwrap_or(tet.output_material);
        self.emit_tet_ids(ids, material, resolver);
    }

    fn emit_tet_ids(&mut self, mut ids: [usize; 4], material: usize, resolver: &ZoneResolver<'_>) {
        if has_repeated_index(&ids) {
            self.output.stats.degenerate_dropped += 1;
            return;
        }
        let p = ids.map(|i| *resolver.point(i));
        if tet_determinant(&p[0], &p[1], &p[2], &p[3]) < 0.0 {
            ids.swap(2, 3);
        }
        self.push(material, CellType::Tetra, &ids);
    }

    fn emit_wedge(&mut self, wedge: &Wedge, resolver: &mut ZoneResolver<'_>) {
        let mut ids: [usize; 6] = std::array::from_fn(|k| resolver.resolve(&wedge.nodes[k]));
        let material = self.forced.unwrap_or(wedge.output_material);

        if has_repeated_index(&ids) {
            self.output.stats.wedges_resplit += 1;
            for group in low_tets_for_wedge(&ids) {
                self.emit_tet_ids(group.map(|local| ids[local]), material, resolver);
            }
            return;
        }

        let p = ids.map(|i| *resolver.point(i));
        if wedge_determinant(&ids, &p) < 0.0 {
            ids.swap(1, 2);
            ids.swap(4, 5);
        }
        self.push(material, CellType::Wedge, &ids);
    }

    fn emit_tri(&mut self, tri: &Tri, resolver: &mut ZoneResolver<'_>) {
        let mut ids: [usize; 3] = std::array::from_fn(|k| resolver.resolve(&tri.nodes[k]));
        if has_repeated_index(&ids) {
            self.output.stats.degenerate_dropped += 1;
            return;
        }
        let p = ids.map(|i| *resolver.point(i));
        if triangle_area_xy(&p[0], &p[1], &p[2]) < 0.0 {
            ids.swap(1, 2);
        }
        let material = self.forced.unwrap_or(tri.output_material);
        self.push(material, CellType::Triangle, &ids);
    }
}

/// Six times the signed volume of a wedge, summed over its own minimal split.
///
/// Positive when the first triangle faces away from the second, as VTK expects.
/// One face may be a sliver, so no single corner tetrahedron decides the sign.
fn wedge_determinant(ids: &[usize; 6], p: &[Point3<f64>; 6]) -> f64 {
    low_tets_for_wedge(ids)
        .iter()
        .map(|t| tet_determinant(&p[t[0]], &p[t[1]], &p[t[2]], &p[t[3]]))
        .sum()
}
