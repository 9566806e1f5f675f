// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer (in-process, concurrent maps).

pub mod geo_index;
pub mod memory;

pub use geo_index::DriverGeoIndex;
pub use memory::{DriverSlot, MemoryDb};
