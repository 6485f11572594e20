// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - JSON documents and STL export

mod document;
mod stl;

pub use document::{load_input, load_output, save_input, save_output, MirInput, MirOutput};
pub use stl::{export_material_stl, export_material_stls};
