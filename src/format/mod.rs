// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Versioned file layouts.
//!
//! Each format version is a [`Layout`]: a table with one read and one write
//! function per structural unit. Later versions copy the earlier table and
//! replace only the entries whose byte layout changed:
//!
//! ```text
//! gp3::LAYOUT                      base field set
//! gp4::LAYOUT = { .., ..gp3 }      lyrics, two-byte effect flags, richer chords
//! gp5::LAYOUT = { .., ..gp4 }      RSE blocks, page setup, second voice
//! ```
//!
//! Every entry receives the active table, so a GP3 routine that reads a beat
//! still reaches the GP5 note reader when decoding a GP5 file.

pub mod gp3;
pub mod gp4;
pub mod gp5;
mod registry;
mod validate;

pub use registry::{Registry, Version};
pub use validate::validate_song;

use crate::error::Result;
use crate::io::{GpReader, GpWriter};
use crate::models::{
    Beat, BeatEffect, BeatStroke, BendEffect, Chord, ChordDiagram, GraceEffect, GuitarString,
    HarmonicEffect, Measure, MeasureHeader, MidiChannel, MixTableChange, Note, NoteEffect,
    SlideType, Song, Track, Voice,
};

/// Read and write entry points for one format version
#[derive(Clone, Copy)]
pub struct Layout {
    pub read_song: fn(&Layout, &mut GpReader) -> Result<Song>,
    pub write_song: fn(&Layout, &mut GpWriter, &Song) -> Result<()>,

    pub read_info: fn(&Layout, &mut GpReader, &mut Song) -> Result<()>,
    pub write_info: fn(&Layout, &mut GpWriter, &Song) -> Result<()>,

    pub read_measure_headers: fn(&Layout, &mut GpReader, usize) -> Result<Vec<MeasureHeader>>,
    pub write_measure_headers: fn(&Layout, &mut GpWriter, &[MeasureHeader]) -> Result<()>,
    /// Receives the headers read so far
    pub read_measure_header: fn(&Layout, &mut GpReader, &[MeasureHeader]) -> Result<MeasureHeader>,
    pub write_measure_header: fn(&Layout, &mut GpWriter, &MeasureHeader, Option<&MeasureHeader>) -> Result<()>,

    pub read_tracks: fn(&Layout, &mut GpReader, usize, &[MidiChannel]) -> Result<Vec<Track>>,
    pub write_tracks: fn(&Layout, &mut GpWriter, &[Track]) -> Result<()>,
    /// Receives the 1-based track number
    pub read_track: fn(&Layout, &mut GpReader, usize, &[MidiChannel]) -> Result<Track>,
    pub write_track: fn(&Layout, &mut GpWriter, &Track, usize) -> Result<()>,

    pub read_measures: fn(&Layout, &mut GpReader, &mut Song) -> Result<()>,
    pub write_measures: fn(&Layout, &mut GpWriter, &Song) -> Result<()>,
    pub read_measure: fn(&Layout, &mut GpReader, &Track) -> Result<Measure>,
    pub write_measure: fn(&Layout, &mut GpWriter, &Measure, &Track) -> Result<()>,
    pub read_voice: fn(&Layout, &mut GpReader, &Track) -> Result<Voice>,
    pub write_voice: fn(&Layout, &mut GpWriter, &Voice, &Track) -> Result<()>,

    pub read_beat: fn(&Layout, &mut GpReader, &Track) -> Result<Beat>,
    pub write_beat: fn(&Layout, &mut GpWriter, &Beat, &Track) -> Result<()>,
    pub has_beat_effects: fn(&Beat) -> bool,
    /// May fill the note effect template applied to every note of the beat
    pub read_beat_effects: fn(&Layout, &mut GpReader, &mut NoteEffect) -> Result<BeatEffect>,
    pub write_beat_effects: fn(&Layout, &mut GpWriter, &Beat) -> Result<()>,
    pub read_beat_stroke: fn(&Layout, &mut GpReader) -> Result<BeatStroke>,
    pub write_beat_stroke: fn(&Layout, &mut GpWriter, &BeatStroke) -> Result<()>,
    pub read_tremolo_bar: fn(&Layout, &mut GpReader) -> Result<BendEffect>,
    pub write_tremolo_bar: fn(&Layout, &mut GpWriter, &BendEffect) -> Result<()>,

    pub read_notes: fn(&Layout, &mut GpReader, &Track, &NoteEffect) -> Result<Vec<Note>>,
    pub write_notes: fn(&Layout, &mut GpWriter, &[Note], &Track) -> Result<()>,
    pub read_note: fn(&Layout, &mut GpReader, &GuitarString, NoteEffect) -> Result<Note>,
    pub write_note: fn(&Layout, &mut GpWriter, &Note, &GuitarString) -> Result<()>,
    pub has_note_effects: fn(&NoteEffect) -> bool,
    pub read_note_effects: fn(&Layout, &mut GpReader, &mut Note, &GuitarString) -> Result<()>,
    pub write_note_effects: fn(&Layout, &mut GpWriter, &Note, &GuitarString) -> Result<()>,

    pub read_bend: fn(&Layout, &mut GpReader) -> Result<BendEffect>,
    pub write_bend: fn(&Layout, &mut GpWriter, &BendEffect) -> Result<()>,
    pub read_grace: fn(&Layout, &mut GpReader) -> Result<GraceEffect>,
    pub write_grace: fn(&Layout, &mut GpWriter, &GraceEffect) -> Result<()>,
    pub read_slides: fn(&Layout, &mut GpReader) -> Result<Vec<SlideType>>,
    pub write_slides: fn(&Layout, &mut GpWriter, &[SlideType]) -> Result<()>,
    /// Receives the sounding pitch of the note (fret plus open string)
    pub read_harmonic: fn(&Layout, &mut GpReader, i32) -> Result<HarmonicEffect>,
    pub write_harmonic: fn(&Layout, &mut GpWriter, &HarmonicEffect, i32) -> Result<()>,

    pub read_chord: fn(&Layout, &mut GpReader) -> Result<Chord>,
    pub write_chord: fn(&Layout, &mut GpWriter, &Chord) -> Result<()>,
    pub read_new_chord: fn(&Layout, &mut GpReader) -> Result<Chord>,
    pub write_new_chord: fn(&Layout, &mut GpWriter, &Chord, &ChordDiagram) -> Result<()>,

    pub read_mix_table_change: fn(&Layout, &mut GpReader) -> Result<MixTableChange>,
    pub write_mix_table_change: fn(&Layout, &mut GpWriter, &MixTableChange) -> Result<()>,
}

impl Layout {
    /// Decode a song, starting at the version tag
    pub fn read(&self, io: &mut GpReader) -> Result<Song> {
        (self.read_song)(self, io)
    }

    /// Encode a song, starting with the writer's version tag
    pub fn write(&self, io: &mut GpWriter, song: &Song) -> Result<()> {
        (self.write_song)(self, io, song)
    }
}
