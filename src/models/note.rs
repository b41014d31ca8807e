// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Notes and note-level effects.

use serde::{Deserialize, Serialize};

use super::beat::Octave;

wire_enum! {
    /// How a note is played
    pub enum NoteType: u8 {
        Rest = 0,
        Normal = 1,
        Tie = 2,
        Dead = 3,
    }
}

wire_enum! {
    pub enum SlideType: i8 {
        IntoFromAbove = -2,
        IntoFromBelow = -1,
        None = 0,
        ShiftSlideTo = 1,
        LegatoSlideTo = 2,
        OutDownwards = 3,
        OutUpwards = 4,
    }
}

wire_enum! {
    pub enum BendType: i8 {
        None = 0,
        Bend = 1,
        BendRelease = 2,
        BendReleaseBend = 3,
        Prebend = 4,
        PrebendRelease = 5,
        Dip = 6,
        Dive = 7,
        ReleaseUp = 8,
        InvertedDip = 9,
        Return = 10,
        ReleaseDown = 11,
    }
}

wire_enum! {
    /// Finger used for a note
    pub enum Fingering: i8 {
        Unset = -2,
        Open = -1,
        Thumb = 0,
        Index = 1,
        Middle = 2,
        Annular = 3,
        Little = 4,
    }
}

wire_enum! {
    pub enum GraceEffectTransition: i8 {
        None = 0,
        Slide = 1,
        Bend = 2,
        Hammer = 3,
    }
}

/// Note velocity scale.
///
/// Files store velocities as small steps; the document uses MIDI-like values.
pub struct Velocities;

impl Velocities {
    pub const MIN: i32 = 15;
    pub const INCREMENT: i32 = 16;
    pub const PIANO_PIANISSIMO: i32 = 15;
    pub const PIANISSIMO: i32 = 31;
    pub const PIANO: i32 = 47;
    pub const MEZZO_PIANO: i32 = 63;
    pub const MEZZO_FORTE: i32 = 79;
    pub const FORTE: i32 = 95;
    pub const FORTISSIMO: i32 = 111;
    pub const FORTE_FORTISSIMO: i32 = 127;
    pub const DEFAULT: i32 = Self::FORTE;

    /// Convert a stored velocity step to a velocity
    pub fn unpack(step: i32) -> i32 {
        Self::MIN + Self::INCREMENT * step - Self::INCREMENT
    }

    /// Convert a velocity to its stored step
    pub fn pack(velocity: i32) -> i32 {
        (velocity + Self::INCREMENT - Self::MIN) / Self::INCREMENT
    }
}

/// One point of a bend or tremolo bar curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BendPoint {
    /// Position along the note, 0..=12
    pub position: i32,
    /// Pitch offset in quarter tones
    pub value: i32,
    pub vibrato: bool,
}

impl BendPoint {
    pub fn new(position: i32, value: i32) -> Self {
        Self {
            position,
            value,
            vibrato: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BendEffect {
    pub kind: BendType,
    /// Bend height as stored in the file
    pub value: i32,
    pub points: Vec<BendPoint>,
}

impl BendEffect {
    /// Highest point position
    pub const MAX_POSITION: i32 = 12;
    /// Stored units per point position
    pub const STORED_POSITION_SCALE: i32 = 5;
    /// Stored units per quarter tone
    pub const STORED_VALUE_SCALE: i32 = 25;
}

impl Default for BendEffect {
    fn default() -> Self {
        Self {
            kind: BendType::None,
            value: 0,
            points: Vec::new(),
        }
    }
}

/// Grace note played before the main note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraceEffect {
    pub fret: i8,
    pub velocity: i32,
    /// Note value, 1 = whole note ... 128
    pub duration: u8,
    pub transition: GraceEffectTransition,
    pub is_dead: bool,
    pub is_on_beat: bool,
}

impl Default for GraceEffect {
    fn default() -> Self {
        Self {
            fret: 0,
            velocity: Velocities::DEFAULT,
            duration: 32,
            transition: GraceEffectTransition::None,
            is_dead: false,
            is_on_beat: false,
        }
    }
}

/// Pitch as a semitone within the octave plus an accidental hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PitchClass {
    pub just: u8,
    pub accidental: i8,
}

impl PitchClass {
    /// Pitch class of a MIDI note value
    pub fn from_value(value: i32) -> Self {
        Self {
            just: value.rem_euclid(12) as u8,
            accidental: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmonicEffect {
    Natural,
    /// Artificial harmonic; older formats store no pitch
    Artificial {
        pitch: Option<PitchClass>,
        octave: Option<Octave>,
    },
    /// Tapped harmonic; the fret is only stored by Guitar Pro 5
    Tapped { fret: Option<u8> },
    Pinch,
    Semi,
    /// Type code outside the known table, kept as read
    Unknown(i8),
}

/// Trill between the note and another fret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrillEffect {
    pub fret: i8,
    /// Note value of each alternation: 16, 32 or 64
    pub period: u8,
}

impl Default for TrillEffect {
    fn default() -> Self {
        Self { fret: 0, period: 16 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TremoloPickingEffect {
    /// Note value of each pick: 8, 16 or 32
    pub duration: u8,
}

impl Default for TremoloPickingEffect {
    fn default() -> Self {
        Self { duration: 8 }
    }
}

/// Duration stored per note by Guitar Pro 3 and 4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeIndependentDuration {
    pub duration: i8,
    pub tuplet: i8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEffect {
    pub bend: Option<BendEffect>,
    pub grace: Option<GraceEffect>,
    pub harmonic: Option<HarmonicEffect>,
    pub trill: Option<TrillEffect>,
    pub tremolo_picking: Option<TremoloPickingEffect>,
    pub slides: Vec<SlideType>,
    pub hammer: bool,
    pub let_ring: bool,
    pub vibrato: bool,
    pub staccato: bool,
    pub palm_mute: bool,
    pub ghost_note: bool,
    pub accentuated_note: bool,
    pub heavy_accentuated_note: bool,
    pub left_hand_finger: Fingering,
    pub right_hand_finger: Fingering,
}

impl Default for NoteEffect {
    fn default() -> Self {
        Self {
            bend: None,
            grace: None,
            harmonic: None,
            trill: None,
            tremolo_picking: None,
            slides: Vec::new(),
            hammer: false,
            let_ring: false,
            vibrato: false,
            staccato: false,
            palm_mute: false,
            ghost_note: false,
            accentuated_note: false,
            heavy_accentuated_note: false,
            left_hand_finger: Fingering::Open,
            right_hand_finger: Fingering::Open,
        }
    }
}

impl NoteEffect {
    /// Whether either hand has a fingering set
    pub fn has_fingering(&self) -> bool {
        self.left_hand_finger != Fingering::Open || self.right_hand_finger != Fingering::Open
    }
}

/// A single fretted (or dead, or tied) note on one string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// String number, 1 = highest
    pub string: i32,
    /// Fret
    pub value: i32,
    pub velocity: i32,
    pub kind: NoteType,
    pub effect: NoteEffect,
    /// Guitar Pro 3 and 4
    pub time_independent: Option<TimeIndependentDuration>,
    /// Guitar Pro 5
    pub duration_percent: Option<f64>,
    /// Guitar Pro 5
    pub swap_accidentals: Option<bool>,
}

impl Default for Note {
    fn default() -> Self {
        Self {
            string: 1,
            value: 0,
            velocity: Velocities::DEFAULT,
            kind: NoteType::Rest,
            effect: NoteEffect::default(),
            time_independent: None,
            duration_percent: None,
            swap_accidentals: None,
        }
    }
}

impl Note {
    /// Create a normal note on a string and fret
    pub fn new(string: i32, value: i32) -> Self {
        Self {
            string,
            value,
            kind: NoteType::Normal,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_steps() {
        assert_eq!(Velocities::unpack(6), Velocities::FORTE);
        assert_eq!(Velocities::pack(Velocities::FORTE), 6);
        assert_eq!(Velocities::unpack(1), Velocities::PIANO_PIANISSIMO);
        assert_eq!(Velocities::pack(Velocities::FORTE_FORTISSIMO), 8);
    }

    #[test]
    fn test_note_defaults() {
        let note = Note::new(3, 5);
        assert_eq!(note.kind, NoteType::Normal);
        assert_eq!(note.velocity, 95);
        assert!(!note.effect.has_fingering());
        assert_eq!(Note::default().kind, NoteType::Rest);
    }

    #[test]
    fn test_pitch_class_from_value() {
        assert_eq!(PitchClass::from_value(64).just, 4);
        assert_eq!(PitchClass::from_value(-1).just, 11);
    }
}
