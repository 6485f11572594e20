// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON documents: reconstruction input and output

use crate::mesh::{MaterialVolumeFractions, UnstructuredMesh};
use crate::mir::ReconstructedMesh;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Mesh, volume fractions and optional fields to carry through
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirInput {
    pub mesh: UnstructuredMesh,
    pub materials: MaterialVolumeFractions,
    /// One value per input point
    #[serde(default)]
    pub point_fields: BTreeMap<String, Vec<f64>>,
    /// One value per input zone
    #[serde(default)]
    pub cell_fields: BTreeMap<String, Vec<f64>>,
}

impl MirInput {
    pub fn new(mesh: UnstructuredMesh, materials: MaterialVolumeFractions) -> Self {
        Self {
            mesh,
            materials,
            point_fields: BTreeMap::new(),
            cell_fields: BTreeMap::new(),
        }
    }
}

/// Reconstruction plus the input fields mapped onto it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirOutput {
    pub mesh: ReconstructedMesh,
    #[serde(default)]
    pub point_fields: BTreeMap<String, Vec<f64>>,
    #[serde(default)]
    pub cell_fields: BTreeMap<String, Vec<f64>>,
}

impl MirOutput {
    /// Transfer every input field onto the reconstruction
    pub fn from_reconstruction(input: &MirInput, mesh: ReconstructedMesh) -> Result<Self> {
        let mut point_fields = BTreeMap::new();
        for (name, values) in &input.point_fields {
            let mapped = mesh
                .interpolate_nodal_field(&input.mesh, values)
                .with_context(|| format!("Failed to transfer point field '{}'", name))?;
            point_fields.insert(name.clone(), mapped);
        }

        let mut cell_fields = BTreeMap::new();
        for (name, values) in &input.cell_fields {
            let mapped = mesh
                .interpolate_zonal_field(values)
                .with_context(|| format!("Failed to transfer cell field '{}'", name))?;
            cell_fields.insert(name.clone(), mapped);
        }

        Ok(Self {
            mesh,
            point_fields,
            cell_fields,
        })
    }
}

pub fn load_input(path: impl AsRef<Path>) -> Result<MirInput> {
    read_json(path.as_ref())
}

pub fn save_input(input: &MirInput, path: impl AsRef<Path>) -> Result<()> {
    write_json(input, path.as_ref())
}

pub fn load_output(path: impl AsRef<Path>) -> Result<MirOutput> {
    read_json(path.as_ref())
}

pub fn save_output(output: &MirOutput, path: impl AsRef<Path>) -> Result<()> {
    write_json(output, path.as_ref())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(value).context("Failed to serialize document")?;
    fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))
}
