// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-zone material volume fractions and the mixed-variable layout

use crate::error::{MirError, MirResult};
use serde::{Deserialize, Serialize};

/// Dense zone-major table of material volume fractions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialVolumeFractions {
    pub material_count: usize,
    /// Optional display names, one per material
    #[serde(default)]
    pub names: Vec<String>,
    /// `vf[zone * material_count + material]`
    pub vf: Vec<f64>,
}

impl MaterialVolumeFractions {
    /// All-zero table
    pub fn new(material_count: usize, zone_count: usize) -> Self {
        Self {
            material_count,
            names: Vec::new(),
            vf: vec![0.0; material_count * zone_count],
        }
    }

    /// One row of fractions per zone
    pub fn from_rows(material_count: usize, rows: &[Vec<f64>]) -> MirResult<Self> {
        let mut table = Self::new(material_count, rows.len());
        for (zone, row) in rows.iter().enumerate() {
            if row.len() != material_count {
                return Err(MirError::InputMismatch(format!(
                    "zone {} has {} fractions, expected {}",
                    zone,
                    row.len(),
                    material_count
                )));
            }
            table.zone_vf_mut(zone).copy_from_slice(row);
        }
        Ok(table)
    }

    /// Every zone entirely made of the given material
    pub fn from_clean(material_count: usize, zone_materials: &[usize]) -> MirResult<Self> {
        let mut table = Self::new(material_count, zone_materials.len());
        for (zone, &material) in zone_materials.iter().enumerate() {
            if material >= material_count {
                return Err(MirError::InputMismatch(format!(
                    "zone {} uses material {} of {}",
                    zone, material, material_count
                )));
            }
            table.set(zone, material, 1.0);
        }
        Ok(table)
    }

    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = names;
        self
    }

    pub fn zone_count(&self) -> usize {
        if self.material_count == 0 {
            0
        } else {
            self.vf.len() / self.material_count
        }
    }

    pub fn set(&mut self, zone: usize, material: usize, vf: f64) {
        self.vf[zone * self.material_count + material] = vf;
    }

    pub fn get(&self, zone: usize, material: usize) -> f64 {
        self.vf[zone * self.material_count + material]
    }

    pub fn zone_vf(&self, zone: usize) -> &[f64] {
        let start = zone * self.material_count;
        &self.vf[start..start + self.material_count]
    }

    fn zone_vf_mut(&mut self, zone: usize) -> &mut [f64] {
        let start = zone * self.material_count;
        &mut self.vf[start..start + self.material_count]
    }

    /// Materials with non-zero fraction in the zone, ascending
    pub fn materials_in_zone(&self, zone: usize) -> impl Iterator<Item = usize> + '_ {
        self.zone_vf(zone)
            .iter()
            .enumerate()
            .filter(|&(_, &vf)| vf > 0.0)
            .map(|(material, _)| material)
    }

    pub fn zone_is_mixed(&self, zone: usize) -> bool {
        self.materials_in_zone(zone).nth(1).is_some()
    }

    /// The only material present, if there is exactly one
    pub fn clean_material(&self, zone: usize) -> Option<usize> {
        let mut present = self.materials_in_zone(zone);
        match (present.next(), present.next()) {
            (Some(material), None) => Some(material),
            _ => None,
        }
    }

    /// Largest fraction, lowest material id on ties
    pub fn dominant_material(&self, zone: usize) -> usize {
        let mut best = 0;
        for (material, &vf) in self.zone_vf(zone).iter().enumerate() {
            if vf > self.zone_vf(zone)[best] {
                best = material;
            }
        }
        best
    }

    pub fn any_mixed(&self) -> bool {
        (0..self.zone_count()).any(|zone| self.zone_is_mixed(zone))
    }

    pub fn material_name(&self, material: usize) -> String {
        self.names
            .get(material)
            .cloned()
            .unwrap_or_else(|| format!("mat{}", material))
    }

    /// Check the table against a mesh's zone count
    pub fn validate(&self, zone_count: usize) -> MirResult<()> {
        if self.material_count == 0 {
            return Err(MirError::InputMismatch("no materials".into()));
        }
        if self.vf.len() != self.material_count * zone_count {
            return Err(MirError::InputMismatch(format!(
                "{} fractions for {} zones x {} materials",
                self.vf.len(),
                zone_count,
                self.material_count
            )));
        }
        if let Some(bad) = self.vf.iter().find(|vf| !(0.0..=1.0).contains(*vf)) {
            return Err(MirError::InputMismatch(format!(
                "volume fraction {} outside [0, 1]",
                bad
            )));
        }
        Ok(())
    }
}

/// Position of each (mixed zone, present material) pair in a mixed-variable table.
///
/// Mixed zones are laid out in zone order; within a zone, present materials
/// ascend. Clean zones have no entries.
#[derive(Debug, Clone, Default)]
pub struct MixLayout {
    zone_start: Vec<Option<usize>>,
    len: usize,
}

impl MixLayout {
    pub fn new(materials: &MaterialVolumeFractions) -> Self {
        let mut zone_start = Vec::with_capacity(materials.zone_count());
        let mut len = 0;
        for zone in 0..materials.zone_count() {
            if materials.zone_is_mixed(zone) {
                zone_start.push(Some(len));
                len += materials.materials_in_zone(zone).count();
            } else {
                zone_start.push(None);
            }
        }
        Self { zone_start, len }
    }

    /// Total entries of a mixed-variable table
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn index(
        &self,
        materials: &MaterialVolumeFractions,
        zone: usize,
        material: usize,
    ) -> Option<usize> {
        let start = self.zone_start.get(zone).copied().flatten()?;
        if materials.get(zone, material) <= 0.0 {
            return None;
        }
        let rank = materials.materials_in_zone(zone).take_while(|&m| m < material).count();
        Some(start + rank)
    }
}
