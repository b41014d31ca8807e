// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tracks, tuning and MIDI channel settings.

use serde::{Deserialize, Serialize};

use super::measure::{Color, Measure};
use super::song::RseEqualizer;

/// Maximum strings per track
pub const MAX_STRINGS: usize = 7;

wire_enum! {
    /// Automatic accentuation (Guitar Pro 5)
    pub enum Accentuation: u8 {
        None = 0,
        VerySoft = 1,
        Soft = 2,
        Medium = 3,
        Strong = 4,
        VeryStrong = 5,
    }
}

/// A string and its open tuning as a MIDI note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuitarString {
    pub number: i32,
    pub value: i32,
}

impl GuitarString {
    pub fn new(number: i32, value: i32) -> Self {
        Self { number, value }
    }

    /// Standard six-string guitar tuning, highest string first
    pub fn standard_tuning() -> Vec<GuitarString> {
        [64, 59, 55, 50, 45, 40]
            .iter()
            .enumerate()
            .map(|(i, &value)| GuitarString::new(i as i32 + 1, value))
            .collect()
    }
}

/// MIDI channel assigned to a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiChannel {
    /// Channel index, 0..64 (port * 16 + channel)
    pub channel: i32,
    pub effect_channel: i32,
    pub instrument: i32,
    pub volume: i16,
    pub balance: i16,
    pub chorus: i16,
    pub reverb: i16,
    pub phaser: i16,
    pub tremolo: i16,
    /// Guitar Pro 5
    pub bank: Option<u8>,
}

impl MidiChannel {
    pub const DEFAULT_PERCUSSION_CHANNEL: i32 = 9;

    /// Default settings for a channel index
    pub fn new(channel: i32) -> Self {
        let mut midi = Self {
            channel,
            effect_channel: channel,
            instrument: 25,
            volume: 104,
            balance: 64,
            chorus: 0,
            reverb: 0,
            phaser: 0,
            tremolo: 0,
            bank: None,
        };
        if midi.is_percussion_channel() {
            midi.instrument = 0;
        }
        midi
    }

    pub fn is_percussion_channel(&self) -> bool {
        self.channel % 16 == Self::DEFAULT_PERCUSSION_CHANNEL
    }
}

impl Default for MidiChannel {
    fn default() -> Self {
        Self::new(0)
    }
}

/// RSE sound settings for a track or mix table change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RseInstrument {
    pub instrument: i32,
    pub unknown: i32,
    pub sound_bank: i32,
    pub effect_number: i32,
    /// 5.10 and later
    pub effect: Option<String>,
    /// 5.10 and later
    pub effect_category: Option<String>,
}

impl Default for RseInstrument {
    fn default() -> Self {
        Self {
            instrument: -1,
            unknown: -1,
            sound_bank: -1,
            effect_number: -1,
            effect: None,
            effect_category: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackRse {
    pub humanize: u8,
    pub instrument: RseInstrument,
    /// 3-band track equalizer, 5.10 and later
    pub equalizer: Option<RseEqualizer>,
}

/// Display and playback switches (Guitar Pro 5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSettings {
    pub visible: bool,
    pub solo: bool,
    pub mute: bool,
    pub use_rse: bool,
    pub indicate_tuning: bool,
    pub tablature: bool,
    pub notation: bool,
    pub diagrams_are_below: bool,
    pub show_rhythm: bool,
    pub force_horizontal: bool,
    pub force_channels: bool,
    pub diagram_list: bool,
    pub diagrams_in_score: bool,
    pub auto_let_ring: bool,
    pub auto_brush: bool,
    pub extend_rhythmic: bool,
    pub auto_accentuation: Accentuation,
}

impl Default for TrackSettings {
    fn default() -> Self {
        Self {
            visible: true,
            solo: false,
            mute: false,
            use_rse: false,
            indicate_tuning: false,
            tablature: true,
            notation: true,
            diagrams_are_below: false,
            show_rhythm: false,
            force_horizontal: false,
            force_channels: false,
            diagram_list: true,
            diagrams_in_score: false,
            auto_let_ring: false,
            auto_brush: false,
            extend_rhythmic: false,
            auto_accentuation: Accentuation::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub is_percussion: bool,
    pub is_twelve_string: bool,
    pub is_banjo: bool,
    pub strings: Vec<GuitarString>,
    pub port: i32,
    pub channel: MidiChannel,
    pub fret_count: i32,
    /// Capo fret
    pub offset: i32,
    pub color: Color,
    /// Guitar Pro 5
    pub settings: Option<TrackSettings>,
    /// Guitar Pro 5
    pub rse: Option<TrackRse>,
    pub measures: Vec<Measure>,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            name: "Track 1".to_string(),
            is_percussion: false,
            is_twelve_string: false,
            is_banjo: false,
            strings: GuitarString::standard_tuning(),
            port: 1,
            channel: MidiChannel::default(),
            fret_count: 24,
            offset: 0,
            color: Color::RED,
            settings: None,
            rse: None,
            measures: Vec::new(),
        }
    }
}

impl Track {
    /// Create a track with standard tuning
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Open tuning of a string number, if the track has it
    pub fn string(&self, number: i32) -> Option<&GuitarString> {
        self.strings.iter().find(|s| s.number == number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_channel() {
        let channel = MidiChannel::new(2);
        assert_eq!(channel.instrument, 25);
        assert_eq!(channel.volume, 104);
        assert!(!channel.is_percussion_channel());

        let drums = MidiChannel::new(25);
        assert!(drums.is_percussion_channel());
        assert_eq!(drums.instrument, 0);
    }

    #[test]
    fn test_track_strings() {
        let track = Track::new("Lead");
        assert_eq!(track.strings.len(), 6);
        assert_eq!(track.string(6).map(|s| s.value), Some(40));
        assert!(track.string(7).is_none());
    }
}
