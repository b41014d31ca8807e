// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Measure headers, measures and voices.

use serde::{Deserialize, Serialize};

use super::beat::Beat;
use super::song::KeySignature;

/// Voices stored per measure
pub const VOICE_COUNT: usize = 2;

wire_enum! {
    pub enum TripletFeel: u8 {
        None = 0,
        Eighth = 1,
        Sixteenth = 2,
    }
}

wire_enum! {
    pub enum LineBreak: u8 {
        None = 0,
        Break = 1,
        Protect = 2,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Rehearsal marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub title: String,
    pub color: Color,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            title: "Section".to_string(),
            color: Color::RED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: i8,
    pub denominator: i8,
    /// Beam grouping (Guitar Pro 5)
    pub beams: Option<[u8; 4]>,
}

impl TimeSignature {
    pub fn new(numerator: i8, denominator: i8) -> Self {
        Self {
            numerator,
            denominator,
            beams: None,
        }
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

/// Per-column measure data shared by every track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureHeader {
    pub time_signature: TimeSignature,
    pub key_signature: KeySignature,
    pub is_repeat_open: bool,
    /// Number of repeats, -1 = no repeat close
    pub repeat_close: i8,
    /// Bit mask of the alternate endings this measure belongs to
    pub repeat_alternative: u8,
    pub marker: Option<Marker>,
    pub has_double_bar: bool,
    pub triplet_feel: TripletFeel,
}

impl Default for MeasureHeader {
    fn default() -> Self {
        Self {
            time_signature: TimeSignature::default(),
            key_signature: KeySignature::default(),
            is_repeat_open: false,
            repeat_close: -1,
            repeat_alternative: 0,
            marker: None,
            has_double_bar: false,
            triplet_feel: TripletFeel::None,
        }
    }
}

impl MeasureHeader {
    pub fn has_repeat_close(&self) -> bool {
        self.repeat_close > -1
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Voice {
    pub beats: Vec<Beat>,
}

impl Voice {
    pub fn new(beats: Vec<Beat>) -> Self {
        Self { beats }
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }
}

/// One track's content for one measure column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub voices: Vec<Voice>,
    /// Guitar Pro 5
    pub line_break: Option<LineBreak>,
}

impl Default for Measure {
    fn default() -> Self {
        Self {
            voices: vec![Voice::default(); VOICE_COUNT],
            line_break: None,
        }
    }
}

impl Measure {
    /// Measure holding beats in the primary voice
    pub fn with_beats(beats: Vec<Beat>) -> Self {
        let mut measure = Self::default();
        measure.voices[0].beats = beats;
        measure
    }
}
