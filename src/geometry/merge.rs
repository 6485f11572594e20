// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Pairwise material merging inside one composite shape.
//!
//! Materials are merged one slot at a time. For every fragment already
//! owned by earlier materials, the new material's fraction is interpolated at
//! each corner and compared to the owner's. Corners where the new material
//! dominates are claimed by it; edges whose corners disagree are cut where the
//! two linear interpolants cross. Tetrahedra split into a tetrahedron plus a
//! wedge or two wedges, triangles into a triangle plus two triangles.

use super::shapes::{
    has_repeated_index, FragmentLists, FragmentNode, MaterialShape, MaterialTet, MaterialTri,
    Shape, Tet, Tri, Wedge,
};
use super::subdivide::low_tets_for_wedge;
use crate::error::{MirError, MirResult};

/// Maps a fragment corner to its deduplicated output vertex
pub trait VertexResolver {
    fn resolve(&mut self, node: &FragmentNode) -> usize;
}

/// One material slot of the zone being merged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotMaterial {
    /// Position in the composite shape's fraction vectors
    pub slot: usize,
    pub material: usize,
    /// Zero zonal fraction
    pub fake: bool,
}

/// Material being merged into the fragments of one composite shape
#[derive(Debug, Clone, Copy)]
pub struct MergeTarget<'a, const C: usize> {
    pub composite: &'a MaterialShape<C>,
    pub slot: usize,
    pub zone: usize,
    pub material: usize,
    pub fake: bool,
}

/// Parameter along an edge where two linear interpolants meet.
///
/// `vf1_*` and `vf2_*` are the two materials' fractions at the edge ends.
/// The result is not clamped.
pub fn find_intersect(vf1_a: f64, vf1_b: f64, vf2_a: f64, vf2_b: f64) -> MirResult<f64> {
    let denominator = (vf1_b - vf1_a) - (vf2_b - vf2_a);
    if denominator == 0.0 {
        return Err(MirError::ParallelInterpolants {
            vf1_a,
            vf1_b,
            vf2_a,
            vf2_b,
        });
    }
    Ok((vf2_a - vf1_a) / denominator)
}

/// Fragment corner with both competing fractions
#[derive(Debug, Clone, Copy)]
struct Corner {
    node: FragmentNode,
    existing: f64,
    incoming: f64,
    claimed: bool,
}

impl Corner {
    fn side(&self, claimed: bool) -> FragmentNode {
        self.node
            .with_vf(if claimed { self.incoming } else { self.existing })
    }
}

/// Crossing point on the edge `a`-`b`, snapped to an end when outside it
fn cut(a: &Corner, b: &Corner) -> MirResult<Corner> {
    let t = find_intersect(a.existing, b.existing, a.incoming, b.incoming)?;
    if t <= 0.0 {
        return Ok(*a);
    }
    if t >= 1.0 {
        return Ok(*b);
    }
    Ok(Corner {
        node: a.node.lerp(&b.node, t),
        existing: a.existing + (b.existing - a.existing) * t,
        incoming: a.incoming + (b.incoming - a.incoming) * t,
        claimed: a.claimed,
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentMerger {
    /// Let fake materials keep the geometry they win
    pub smoothing: bool,
}

impl FragmentMerger {
    pub fn new(smoothing: bool) -> Self {
        Self { smoothing }
    }

    /// Build the fragments of one composite tetrahedron from its material slots
    pub fn merge_composite_tet<R: VertexResolver>(
        &self,
        composite: &MaterialTet,
        zone: usize,
        slots: &[SlotMaterial],
        lists: &mut FragmentLists,
        resolver: &mut R,
    ) -> MirResult<()> {
        lists.clear();
        for slot in slots {
            if !composite.contributes(slot.slot) {
                continue;
            }
            if lists.is_empty() {
                lists
                    .tets
                    .push(composite.extract(slot.slot, zone, slot.material, slot.fake));
                continue;
            }
            let target = MergeTarget {
                composite,
                slot: slot.slot,
                zone,
                material: slot.material,
                fake: slot.fake,
            };
            self.merge_into_tets(&target, lists, resolver)?;
        }
        Ok(())
    }

    /// Build the fragments of one composite triangle from its material slots
    pub fn merge_composite_tri(
        &self,
        composite: &MaterialTri,
        zone: usize,
        slots: &[SlotMaterial],
        lists: &mut FragmentLists,
    ) -> MirResult<()> {
        lists.clear();
        for slot in slots {
            if !composite.contributes(slot.slot) {
                continue;
            }
            if lists.is_empty() {
                lists
                    .tris
                    .push(composite.extract(slot.slot, zone, slot.material, slot.fake));
                continue;
            }
            let target = MergeTarget {
                composite,
                slot: slot.slot,
                zone,
                material: slot.material,
                fake: slot.fake,
            };
            self.merge_into_tris(&target, lists)?;
        }
        Ok(())
    }

    /// Merge one more material into every tetrahedron and wedge fragment
    pub fn merge_into_tets<R: VertexResolver>(
        &self,
        target: &MergeTarget<'_, 4>,
        lists: &mut FragmentLists,
        resolver: &mut R,
    ) -> MirResult<()> {
        let tets = std::mem::take(&mut lists.tets);
        let wedges = std::mem::take(&mut lists.wedges);
        for tet in &tets {
            self.merge_tet(target, tet, lists)?;
        }
        for wedge in &wedges {
            self.merge_wedge(target, wedge, lists, resolver)?;
        }
        Ok(())
    }

    /// Merge one more material into every triangle fragment
    pub fn merge_into_tris(
        &self,
        target: &MergeTarget<'_, 3>,
        lists: &mut FragmentLists,
    ) -> MirResult<()> {
        let tris = std::mem::take(&mut lists.tris);
        for tri in &tris {
            self.merge_tri(target, tri, lists)?;
        }
        Ok(())
    }

    fn corners<const C: usize, const N: usize>(
        &self,
        target: &MergeTarget<'_, C>,
        shape: &Shape<N>,
    ) -> [Corner; N] {
        std::array::from_fn(|k| {
            let node = shape.nodes[k];
            let incoming = target.composite.vf_at(target.slot, &node.local);
            let delta = incoming - node.vf;
            Corner {
                node,
                existing: node.vf,
                incoming,
                claimed: delta > 0.0 || (delta == 0.0 && !target.fake && shape.fake),
            }
        })
    }

    /// Whole-fragment owner when the two fraction ranges do not overlap
    fn range_owner<const N: usize>(&self, shape: &Shape<N>, corners: &[Corner; N]) -> Option<bool> {
        let (existing_lo, existing_hi) = shape.vf_range();
        let (incoming_lo, incoming_hi) = corners
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
                (lo.min(c.incoming), hi.max(c.incoming))
            });
        if incoming_lo > existing_hi {
            Some(true)
        } else if existing_lo > incoming_hi {
            Some(false)
        } else {
            None
        }
    }

    fn output_material<const C: usize, const N: usize>(
        &self,
        target: &MergeTarget<'_, C>,
        existing: &Shape<N>,
    ) -> usize {
        if target.fake && !existing.fake && !self.smoothing {
            existing.output_material
        } else {
            target.material
        }
    }

    fn owned<const C: usize, const N: usize, const M: usize>(
        &self,
        target: &MergeTarget<'_, C>,
        existing: &Shape<N>,
        claimed: bool,
        nodes: [FragmentNode; M],
    ) -> Shape<M> {
        if !claimed {
            return existing.with_nodes(nodes);
        }
        Shape {
            nodes,
            zone: target.zone,
            material: target.material,
            output_material: self.output_material(target, existing),
            fake: target.fake,
        }
    }

    fn whole<const C: usize, const N: usize>(
        &self,
        target: &MergeTarget<'_, C>,
        shape: &Shape<N>,
        corners: &[Corner; N],
        claimed: bool,
    ) -> Shape<N> {
        if claimed {
            self.owned(target, shape, true, corners.map(|c| c.side(true)))
        } else {
            *shape
        }
    }

    fn merge_tet(
        &self,
        target: &MergeTarget<'_, 4>,
        tet: &Tet,
        out: &mut FragmentLists,
    ) -> MirResult<()> {
        let corners = self.corners(target, tet);
        if let Some(claimed) = self.range_owner(tet, &corners) {
            out.tets.push(self.whole(target, tet, &corners, claimed));
            return Ok(());
        }

        let case = (1..4).fold(0, |case, i| {
            if corners[i].claimed != corners[0].claimed {
                case | 1 << (i - 1)
            } else {
                case
            }
        });
        match case {
            0 => {
                out.tets
                    .push(self.whole(target, tet, &corners, corners[0].claimed));
                Ok(())
            }
            1 => self.split_lone_tet(target, tet, &corners, 1, out),
            2 => self.split_lone_tet(target, tet, &corners, 2, out),
            4 => self.split_lone_tet(target, tet, &corners, 3, out),
            7 => self.split_lone_tet(target, tet, &corners, 0, out),
            3 => self.split_pair_tet(target, tet, &corners, [0, 3], [1, 2], out),
            5 => self.split_pair_tet(target, tet, &corners, [0, 2], [1, 3], out),
            6 => self.split_pair_tet(target, tet, &corners, [0, 1], [2, 3], out),
            other => Err(MirError::UnmatchedMergeCase(other)),
        }
    }

    /// One corner against the other three: a tetrahedron and a wedge
    fn split_lone_tet(
        &self,
        target: &MergeTarget<'_, 4>,
        tet: &Tet,
        corners: &[Corner; 4],
        lone: usize,
        out: &mut FragmentLists,
    ) -> MirResult<()> {
        let p = &corners[lone];
        let mut others = [0; 3];
        for (slot, index) in others.iter_mut().zip((0..4).filter(|&i| i != lone)) {
            *slot = index;
        }
        let q = others.map(|i| corners[i]);
        let i1 = cut(p, &q[0])?;
        let i2 = cut(p, &q[1])?;
        let i3 = cut(p, &q[2])?;

        let lone_side = p.claimed;
        out.tets.push(self.owned(
            target,
            tet,
            lone_side,
            [p.side(lone_side), i1.side(lone_side), i2.side(lone_side), i3.side(lone_side)],
        ));
        let rest = !lone_side;
        out.wedges.push(self.owned(
            target,
            tet,
            rest,
            [
                i1.side(rest),
                i2.side(rest),
                i3.side(rest),
                q[0].side(rest),
                q[1].side(rest),
                q[2].side(rest),
            ],
        ));
        Ok(())
    }

    /// Two corners against two: two wedges
    fn split_pair_tet(
        &self,
        target: &MergeTarget<'_, 4>,
        tet: &Tet,
        corners: &[Corner; 4],
        ps: [usize; 2],
        qs: [usize; 2],
        out: &mut FragmentLists,
    ) -> MirResult<()> {
        let (p1, p2) = (&corners[ps[0]], &corners[ps[1]]);
        let (q1, q2) = (&corners[qs[0]], &corners[qs[1]]);
        let i11 = cut(p1, q1)?;
        let i12 = cut(p1, q2)?;
        let i21 = cut(p2, q1)?;
        let i22 = cut(p2, q2)?;

        let p_side = p1.claimed;
        out.wedges.push(self.owned(
            target,
            tet,
            p_side,
            [
                p1.side(p_side),
                i11.side(p_side),
                i12.side(p_side),
                p2.side(p_side),
                i21.side(p_side),
                i22.side(p_side),
            ],
        ));
        let q_side = !p_side;
        out.wedges.push(self.owned(
            target,
            tet,
            q_side,
            [
                q1.side(q_side),
                i11.side(q_side),
                i21.side(q_side),
                q2.side(q_side),
                i12.side(q_side),
                i22.side(q_side),
            ],
        ));
        Ok(())
    }

    /// Wedges go whole when uncontested, otherwise through three tetrahedra
    fn merge_wedge<R: VertexResolver>(
        &self,
        target: &MergeTarget<'_, 4>,
        wedge: &Wedge,
        out: &mut FragmentLists,
        resolver: &mut R,
    ) -> MirResult<()> {
        let corners = self.corners(target, wedge);
        let claimed = corners[0].claimed;
        if corners.iter().all(|c| c.claimed == claimed) {
            out.wedges.push(self.whole(target, wedge, &corners, claimed));
            return Ok(());
        }

        let ids: [usize; 6] = std::array::from_fn(|k| resolver.resolve(&wedge.nodes[k]));
        for group in low_tets_for_wedge(&ids) {
            if has_repeated_index(&group.map(|local| ids[local])) {
                continue;
            }
            let tet = wedge.with_nodes(group.map(|local| {
                let mut node = wedge.nodes[local];
                node.global_index = Some(ids[local]);
                node
            }));
            self.merge_tet(target, &tet, out)?;
        }
        Ok(())
    }

    fn merge_tri(
        &self,
        target: &MergeTarget<'_, 3>,
        tri: &Tri,
        out: &mut FragmentLists,
    ) -> MirResult<()> {
        let corners = self.corners(target, tri);
        if let Some(claimed) = self.range_owner(tri, &corners) {
            out.tris.push(self.whole(target, tri, &corners, claimed));
            return Ok(());
        }

        let case = (1..3).fold(0, |case, i| {
            if corners[i].claimed != corners[0].claimed {
                case | 1 << (i - 1)
            } else {
                case
            }
        });
        let lone = match case {
            0 => {
                out.tris
                    .push(self.whole(target, tri, &corners, corners[0].claimed));
                return Ok(());
            }
            1 => 1,
            2 => 2,
            3 => 0,
            other => return Err(MirError::UnmatchedMergeCase(other)),
        };

        let p = &corners[lone];
        let q1 = &corners[(lone + 1) % 3];
        let q2 = &corners[(lone + 2) % 3];
        let i1 = cut(p, q1)?;
        let i2 = cut(p, q2)?;

        let lone_side = p.claimed;
        out.tris.push(self.owned(
            target,
            tri,
            lone_side,
            [p.side(lone_side), i1.side(lone_side), i2.side(lone_side)],
        ));
        let rest = !lone_side;
        out.tris.push(self.owned(
            target,
            tri,
            rest,
            [i1.side(rest), q1.side(rest), q2.side(rest)],
        ));
        out.tris.push(self.owned(
            target,
            tri,
            rest,
            [i1.side(rest), q2.side(rest), i2.side(rest)],
        ));
        Ok(())
    }
}
