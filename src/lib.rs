// Copyright 2026 Tagprobe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tagprobe library — headless tracking-tag auditor.
//!
//! This library crate exposes the core modules for integration testing.

#![allow(dead_code, unused_imports, clippy::new_without_default)]

pub mod cli;
pub mod extraction;
pub mod probe;
pub mod renderer;
pub mod report;
pub mod stealth;
