// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Beats, durations and beat-level effects.

use serde::{Deserialize, Serialize};

use super::chord::Chord;
use super::note::{BendEffect, Note};
use super::track::RseInstrument;

wire_enum! {
    pub enum BeatStatus: u8 {
        Empty = 0,
        Normal = 1,
        Rest = 2,
    }
}

wire_enum! {
    pub enum SlapEffect: i8 {
        None = 0,
        Tapping = 1,
        Slapping = 2,
        Popping = 3,
    }
}

wire_enum! {
    pub enum StrokeDirection: i8 {
        None = 0,
        Up = 1,
        Down = 2,
    }
}

wire_enum! {
    pub enum Octave: u8 {
        None = 0,
        Ottava = 1,
        Quindicesima = 2,
        OttavaBassa = 3,
        QuindicesimaBassa = 4,
    }
}

wire_enum! {
    /// Stem direction of a beat
    pub enum VoiceDirection: u8 {
        None = 0,
        Up = 1,
        Down = 2,
    }
}

wire_enum! {
    pub enum TupletBracket: u8 {
        None = 0,
        Start = 1,
        End = 2,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tuplet {
    pub enters: i32,
    pub times: i32,
}

impl Tuplet {
    /// Tuplet for a stored "enters" value
    pub fn from_enters(enters: i32) -> Self {
        let times = match enters {
            3 => 2,
            5..=7 => 4,
            9..=13 => 8,
            other => other,
        };
        Self { enters, times }
    }
}

impl Default for Tuplet {
    fn default() -> Self {
        Self { enters: 1, times: 1 }
    }
}

/// Rhythmic value of a beat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Duration {
    /// 1 = whole note, 2 = half ... 64
    pub value: u8,
    pub is_dotted: bool,
    pub tuplet: Tuplet,
}

impl Duration {
    pub const WHOLE: u8 = 1;
    pub const QUARTER: u8 = 4;
    pub const SIXTY_FOURTH: u8 = 64;

    /// Create an undotted duration
    pub fn new(value: u8) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self {
            value: Self::QUARTER,
            is_dotted: false,
            tuplet: Tuplet::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatStroke {
    pub direction: StrokeDirection,
    /// Note value of the whole stroke, 4..=128
    pub value: u8,
}

impl Default for BeatStroke {
    fn default() -> Self {
        Self {
            direction: StrokeDirection::None,
            value: 0,
        }
    }
}

/// A value change in a mix table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MixTableItem {
    pub value: i32,
    /// Transition length in beats
    pub duration: i8,
    /// Apply to every track (Guitar Pro 4 and later)
    pub all_tracks: bool,
}

impl MixTableItem {
    pub fn new(value: i32) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }
}

/// Mix table fields added by Guitar Pro 5
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixTableExtras {
    pub rse: RseInstrument,
    pub use_rse: bool,
    pub wah: i8,
    pub show_wah: bool,
}

impl Default for MixTableExtras {
    fn default() -> Self {
        Self {
            rse: RseInstrument::default(),
            use_rse: false,
            wah: -1,
            show_wah: false,
        }
    }
}

/// Instrument, volume and tempo changes at a beat
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MixTableChange {
    pub instrument: Option<MixTableItem>,
    pub volume: Option<MixTableItem>,
    pub balance: Option<MixTableItem>,
    pub chorus: Option<MixTableItem>,
    pub reverb: Option<MixTableItem>,
    pub phaser: Option<MixTableItem>,
    pub tremolo: Option<MixTableItem>,
    pub tempo: Option<MixTableItem>,
    pub tempo_name: Option<String>,
    /// Only stored with a tempo change, 5.10 and later
    pub hide_tempo: Option<bool>,
    pub extras: Option<MixTableExtras>,
}

impl MixTableChange {
    /// The six items that carry a transition duration, in file order
    pub fn volume_items(&self) -> [Option<MixTableItem>; 6] {
        [self.volume, self.balance, self.chorus, self.reverb, self.phaser, self.tremolo]
    }

    /// Mutable slots for [`MixTableChange::volume_items`]
    pub fn volume_items_mut(&mut self) -> [&mut Option<MixTableItem>; 6] {
        [
            &mut self.volume,
            &mut self.balance,
            &mut self.chorus,
            &mut self.reverb,
            &mut self.phaser,
            &mut self.tremolo,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatEffect {
    pub stroke: BeatStroke,
    pub has_rasgueado: bool,
    pub pick_stroke: StrokeDirection,
    pub fade_in: bool,
    pub vibrato: bool,
    pub slap_effect: SlapEffect,
    pub tremolo_bar: Option<BendEffect>,
    pub mix_table_change: Option<MixTableChange>,
}

impl Default for BeatEffect {
    fn default() -> Self {
        Self {
            stroke: BeatStroke::default(),
            has_rasgueado: false,
            pick_stroke: StrokeDirection::None,
            fade_in: false,
            vibrato: false,
            slap_effect: SlapEffect::None,
            tremolo_bar: None,
            mix_table_change: None,
        }
    }
}

/// Beam and bracket display settings (Guitar Pro 5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatDisplay {
    pub break_beam: bool,
    pub force_beam: bool,
    pub beam_direction: VoiceDirection,
    pub tuplet_bracket: TupletBracket,
    pub break_secondary: u8,
    pub break_secondary_tuplet: bool,
    pub force_bracket: bool,
}

impl Default for BeatDisplay {
    fn default() -> Self {
        Self {
            break_beam: false,
            force_beam: false,
            beam_direction: VoiceDirection::None,
            tuplet_bracket: TupletBracket::None,
            break_secondary: 0,
            break_secondary_tuplet: false,
            force_bracket: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beat {
    pub status: BeatStatus,
    pub duration: Duration,
    pub text: Option<String>,
    pub chord: Option<Chord>,
    pub effect: BeatEffect,
    pub notes: Vec<Note>,
    /// Guitar Pro 5
    pub octave: Option<Octave>,
    /// Guitar Pro 5
    pub display: Option<BeatDisplay>,
}

impl Default for Beat {
    fn default() -> Self {
        Self {
            status: BeatStatus::Normal,
            duration: Duration::default(),
            text: None,
            chord: None,
            effect: BeatEffect::default(),
            notes: Vec::new(),
            octave: None,
            display: None,
        }
    }
}

impl Beat {
    /// Create a normal beat with the given notes
    pub fn new(duration: Duration, notes: Vec<Note>) -> Self {
        Self {
            duration,
            notes,
            ..Self::default()
        }
    }
}
