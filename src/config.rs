// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Reconstruction options

use crate::error::{MirError, MirResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default config file looked up by [`MirOptions::load`]
pub const CONFIG_FILE_NAME: &str = "tetmir.toml";

/// Granularity of the per-cell decomposition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubdivisionLevel {
    /// Minimal decomposition, no interior points
    #[default]
    Low,
    /// Zone centre plus face centres
    Med,
    /// Zone centre, face centres and edge midpoints
    High,
}

impl SubdivisionLevel {
    pub const ALL: [SubdivisionLevel; 3] = [Self::Low, Self::Med, Self::High];

    pub fn name(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Med => "med",
            Self::High => "high",
        }
    }
}

impl fmt::Display for SubdivisionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SubdivisionLevel {
    type Err = MirError;

    fn from_str(s: &str) -> MirResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "med" | "medium" => Ok(Self::Med),
            "high" => Ok(Self::High),
            _ => Err(MirError::UnknownSubdivisionLevel(s.to_string())),
        }
    }
}

/// Policy flags for one reconstruction pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirOptions {
    /// Subdivision level used for mixed zones
    pub subdivision_level: SubdivisionLevel,
    /// Emit zones classified clean unchanged instead of subdividing them.
    ///
    /// At `med` and `high` a zone left whole has no centre on its faces, while a
    /// subdivided neighbour may cut an interface into the shared face. The two
    /// sides then disagree on that face's vertices. Turn this off when a fully
    /// conforming output is required at those levels.
    pub leave_clean_zones_whole: bool,
    /// Let interfaces from neighbouring zones carry into this zone's material ids
    pub smoothing: bool,
    /// Distinguishable positions per axis across the mesh bounding box
    pub quantization_steps: f64,
}

impl Default for MirOptions {
    fn default() -> Self {
        Self {
            subdivision_level: SubdivisionLevel::Low,
            leave_clean_zones_whole: true,
            smoothing: false,
            quantization_steps: 1.0e6,
        }
    }
}

impl MirOptions {
    pub fn with_level(mut self, level: SubdivisionLevel) -> Self {
        self.subdivision_level = level;
        self
    }

    pub fn with_leave_clean_zones_whole(mut self, leave_whole: bool) -> Self {
        self.leave_clean_zones_whole = leave_whole;
        self
    }

    pub fn with_smoothing(mut self, smoothing: bool) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Load options from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let options: MirOptions = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(options)
    }

    /// Load `tetmir.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut options = if PathBuf::from(CONFIG_FILE_NAME).exists() {
            Self::from_file(CONFIG_FILE_NAME)?
        } else {
            Self::default()
        };
        options.apply_env()?;
        Ok(options)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(level) = std::env::var("TETMIR_LEVEL") {
            self.subdivision_level = level
                .parse()
                .with_context(|| format!("Invalid TETMIR_LEVEL: {}", level))?;
        }

        if let Ok(whole) = std::env::var("TETMIR_LEAVE_CLEAN_WHOLE") {
            self.leave_clean_zones_whole = whole.parse().unwrap_or(self.leave_clean_zones_whole);
        }

        if let Ok(smoothing) = std::env::var("TETMIR_SMOOTHING") {
            self.smoothing = smoothing.parse().unwrap_or(self.smoothing);
        }

        Ok(())
    }

    /// Save options to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize options")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}
