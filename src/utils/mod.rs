// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Small shared helpers

pub mod math;
mod timing;

pub use timing::Timed;
