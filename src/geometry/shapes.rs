// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Composite (all-material) and single-material shapes

use super::NodeWeight;

/// Corner of a composite shape, carrying every material's fraction
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialNode {
    /// Global mesh node id; `None` for synthesized centres and midpoints
    pub orig_index: Option<usize>,
    pub weight: NodeWeight,
    /// Fraction per material slot of the zone
    pub vf: Vec<f64>,
}

impl MaterialNode {
    pub fn new(orig_index: Option<usize>, weight: NodeWeight, vf: Vec<f64>) -> Self {
        Self {
            orig_index,
            weight,
            vf,
        }
    }
}

/// Tetrahedron or triangle produced by the subdivider, before material extraction
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialShape<const N: usize> {
    pub nodes: [MaterialNode; N],
}

pub type MaterialTet = MaterialShape<4>;
pub type MaterialTri = MaterialShape<3>;

impl<const N: usize> MaterialShape<N> {
    pub fn new(nodes: [MaterialNode; N]) -> Self {
        Self { nodes }
    }

    /// Fraction of a material slot at a point given in this shape's barycentric coordinates
    pub fn vf_at(&self, slot: usize, local: &[f64; 4]) -> f64 {
        self.nodes
            .iter()
            .zip(local.iter())
            .map(|(node, &b)| b * node.vf[slot])
            .sum()
    }

    /// Whether the slot has non-zero fraction at any corner
    pub fn contributes(&self, slot: usize) -> bool {
        self.nodes.iter().any(|node| node.vf[slot] > 0.0)
    }

    /// Single-material copy of this shape for one slot
    pub fn extract(&self, slot: usize, zone: usize, material: usize, fake: bool) -> Shape<N> {
        let nodes = std::array::from_fn(|k| {
            let source = &self.nodes[k];
            let mut local = [0.0; 4];
            local[k] = 1.0;
            FragmentNode {
                vf: source.vf[slot],
                weight: source.weight,
                local,
                orig_index: source.orig_index,
                global_index: None,
            }
        });
        Shape {
            nodes,
            zone,
            material,
            output_material: material,
            fake,
        }
    }
}

/// Corner of a single-material fragment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentNode {
    /// Fraction of the owning material here
    pub vf: f64,
    /// Combination of the original cell corners
    pub weight: NodeWeight,
    /// Barycentric position inside the composite shape the fragment came from
    pub local: [f64; 4],
    /// Global mesh node id when this is an original corner
    pub orig_index: Option<usize>,
    /// Deduplicated output vertex, once resolved
    pub global_index: Option<usize>,
}

impl FragmentNode {
    pub fn with_vf(mut self, vf: f64) -> Self {
        self.vf = vf;
        self
    }

    /// Synthesized point at parameter `t` from `self` towards `other`
    pub fn lerp(&self, other: &FragmentNode, t: f64) -> Self {
        let mut local = [0.0; 4];
        for (out, (a, b)) in local.iter_mut().zip(self.local.iter().zip(other.local.iter())) {
            *out = a + (b - a) * t;
        }
        Self {
            vf: self.vf + (other.vf - self.vf) * t,
            weight: self.weight.lerp(&other.weight, t),
            local,
            orig_index: None,
            global_index: None,
        }
    }
}

/// Single-material tetrahedron (4), triangle (3) or wedge (6)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape<const N: usize> {
    pub nodes: [FragmentNode; N],
    pub zone: usize,
    /// Material whose fraction the nodes carry
    pub material: usize,
    /// Material id written to the output
    pub output_material: usize,
    /// Material has zero zonal fraction in this zone
    pub fake: bool,
}

pub type Tet = Shape<4>;
pub type Tri = Shape<3>;
pub type Wedge = Shape<6>;

pub type TetList = Vec<Tet>;
pub type TriList = Vec<Tri>;
pub type WedgeList = Vec<Wedge>;

impl<const N: usize> Shape<N> {
    /// Shape with the same ownership and new corners
    pub fn with_nodes<const M: usize>(&self, nodes: [FragmentNode; M]) -> Shape<M> {
        Shape {
            nodes,
            zone: self.zone,
            material: self.material,
            output_material: self.output_material,
            fake: self.fake,
        }
    }

    /// `[min, max]` of nodal fractions
    pub fn vf_range(&self) -> (f64, f64) {
        self.nodes
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), node| {
                (lo.min(node.vf), hi.max(node.vf))
            })
    }

    /// Output vertex ids when every corner is resolved
    pub fn global_indices(&self) -> Option<[usize; N]> {
        let mut ids = [0; N];
        for (id, node) in ids.iter_mut().zip(self.nodes.iter()) {
            *id = node.global_index?;
        }
        Some(ids)
    }
}

/// True when two slots share an id
pub fn has_repeated_index(ids: &[usize]) -> bool {
    ids.iter()
        .enumerate()
        .any(|(i, id)| ids[i + 1..].contains(id))
}

/// Reusable per-zone fragment buffers
#[derive(Debug, Default)]
pub struct FragmentLists {
    pub tets: TetList,
    pub wedges: WedgeList,
    pub tris: TriList,
}

impl FragmentLists {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.tets.clear();
        self.wedges.clear();
        self.tris.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.tets.is_empty() && self.wedges.is_empty() && self.tris.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tets.len() + self.wedges.len() + self.tris.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn composite() -> MaterialTet {
        MaterialShape::new(std::array::from_fn(|k| {
            MaterialNode::new(
                Some(10 + k),
                NodeWeight::corner(k),
                vec![k as f64 * 0.25, 1.0 - k as f64 * 0.25],
            )
        }))
    }

    #[test]
    fn test_extract_single_material() {
        let tet = composite().extract(1, 7, 3, false);
        assert_eq!(tet.zone, 7);
        assert_eq!(tet.material, 3);
        assert_eq!(tet.output_material, 3);
        assert_eq!(tet.nodes[2].orig_index, Some(12));
        assert_relative_eq!(tet.nodes[2].vf, 0.5);
        assert_eq!(tet.nodes[2].local, [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(tet.vf_range(), (0.25, 1.0));
    }

    #[test]
    fn test_vf_at_interpolates() {
        let shape = composite();
        let centroid = [0.25; 4];
        assert_relative_eq!(shape.vf_at(0, &centroid), 0.375);
        assert!(shape.contributes(0));
    }

    #[test]
    fn test_lerp_drops_identity() {
        let tet = composite().extract(0, 0, 0, false);
        let mid = tet.nodes[0].lerp(&tet.nodes[2], 0.5);
        assert_eq!(mid.orig_index, None);
        assert_relative_eq!(mid.vf, 0.25);
        assert_eq!(mid.local, [0.5, 0.0, 0.5, 0.0]);
        assert!(mid.weight.is_partition_of_unity(1e-12));
    }

    #[test]
    fn test_repeated_index() {
        assert!(has_repeated_index(&[1, 2, 3, 1]));
        assert!(!has_repeated_index(&[1, 2, 3, 4]));
    }
}
