// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Byte-level codec shared by every format version.
//!
//! - `GpReader` / `GpWriter`: little-endian scalars and the three
//!   length-prefixed string encodings
//! - `Location` / `Located`: which track, measure, voice and beat an error
//!   happened in

mod location;
mod reader;
mod writer;

pub use location::{Located, Location, Unit};
pub use reader::{GpReader, OrTruncated, Repeated};
pub use writer::GpWriter;

/// Size of the version tag slot at the start of every file
pub const VERSION_SLOT: usize = 30;
