// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Reader and writer for Guitar Pro 3, 4 and 5 tablature files.
//!
//! ```no_run
//! let song = tabfile::parse_file("song.gp4")?;
//! tabfile::write_file(&song, "song.gp5", "FICHIER GUITAR PRO v5.10")?;
//! # Ok::<(), tabfile::GpError>(())
//! ```
//!
//! The version tag at the start of a file selects its [`Layout`]. Writing
//! always takes an explicit tag; nothing is emitted for an unsupported tag
//! or a song that breaks the structural rules in [`validate_song`].

pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod models;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use encoding_rs::{Encoding, WINDOWS_1252};
use tracing::debug;

pub use config::CodecConfig;
pub use error::{GpError, Result};
pub use format::{validate_song, Layout, Registry, Version};
pub use io::{GpReader, GpWriter};
pub use models::Song;

/// Decode a song, with text in windows-1252
pub fn parse<R: Read>(mut reader: R) -> Result<Song> {
    decode(&mut reader, WINDOWS_1252)
}

/// Decode a song using the configured text encoding
pub fn parse_with<R: Read>(mut reader: R, config: &CodecConfig) -> Result<Song> {
    decode(&mut reader, config.encoding())
}

/// Decode a song from a file
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Song> {
    let file = File::open(path.as_ref())?;
    parse(BufReader::new(file))
}

/// Encode a song as the version named by `tag`, with text in windows-1252
pub fn write<W: Write>(song: &Song, mut writer: W, tag: &str) -> Result<()> {
    encode(song, &mut writer, tag, WINDOWS_1252)
}

/// Encode a song using the configured text encoding
pub fn write_with<W: Write>(song: &Song, mut writer: W, tag: &str, config: &CodecConfig) -> Result<()> {
    encode(song, &mut writer, tag, config.encoding())
}

/// Encode a song into a file.
///
/// The file is only created once the tag and the song have been checked.
pub fn write_file<P: AsRef<Path>>(song: &Song, path: P, tag: &str) -> Result<()> {
    Registry::new().resolve(tag)?;
    validate_song(song)?;
    let file = File::create(path.as_ref())?;
    write(song, BufWriter::new(file), tag)
}

/// Read only the version tag at the start of a stream
pub fn read_version<R: Read>(mut reader: R) -> Result<String> {
    GpReader::new(&mut reader, WINDOWS_1252).read_version()
}

fn decode(reader: &mut dyn Read, encoding: &'static Encoding) -> Result<Song> {
    let mut io = GpReader::new(reader, encoding);
    let tag = io.read_version()?;
    let (version, layout) = Registry::new().resolve(&tag)?;
    io.set_version(version);
    let song = layout.read(&mut io)?;
    validate_song(&song)?;
    debug!(
        %version,
        measures = song.measure_headers.len(),
        tracks = song.tracks.len(),
        "decoded song"
    );
    Ok(song)
}

fn encode(song: &Song, writer: &mut dyn Write, tag: &str, encoding: &'static Encoding) -> Result<()> {
    let (version, layout) = Registry::new().resolve(tag)?;
    validate_song(song)?;
    let mut io = GpWriter::new(writer, encoding);
    io.set_version(tag, version);
    layout.write(&mut io, song)?;
    io.flush()?;
    debug!(
        %version,
        measures = song.measure_headers.len(),
        tracks = song.tracks.len(),
        "encoded song"
    );
    Ok(())
}
