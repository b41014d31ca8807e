// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Song root record and song-level metadata.

use serde::{Deserialize, Serialize};

use super::measure::MeasureHeader;
use super::track::Track;

/// Number of lyric lines stored in a file
pub const LYRIC_LINE_COUNT: usize = 5;

/// Number of direction signs stored in a Guitar Pro 5 file
pub const DIRECTION_SIGN_COUNT: usize = 19;

/// Default song tempo in BPM
pub const DEFAULT_TEMPO: i32 = 120;

/// Key signature: number of sharps (positive) or flats (negative)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeySignature {
    pub key: i8,
    pub is_minor: bool,
}

impl KeySignature {
    /// Create a key signature
    pub fn new(key: i8, is_minor: bool) -> Self {
        Self { key, is_minor }
    }
}

/// One line of lyrics, anchored at a measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    pub starting_measure: i32,
    pub lyrics: String,
}

impl Default for LyricLine {
    fn default() -> Self {
        Self {
            starting_measure: 1,
            lyrics: String::new(),
        }
    }
}

/// Lyrics block (Guitar Pro 4 and later)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lyrics {
    /// Track the lyrics are attached to (1-based, 0 = none)
    pub track_choice: i32,
    pub lines: Vec<LyricLine>,
}

impl Default for Lyrics {
    fn default() -> Self {
        Self {
            track_choice: 0,
            lines: vec![LyricLine::default(); LYRIC_LINE_COUNT],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

/// Page layout (Guitar Pro 5)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSetup {
    pub page_size: Point,
    pub margin: Padding,
    pub score_size_proportion: f32,
    /// Bit set of header/footer elements to show
    pub header_and_footer: u16,
    pub title: String,
    pub subtitle: String,
    pub artist: String,
    pub album: String,
    pub words: String,
    pub music: String,
    pub words_and_music: String,
    pub copyright: String,
    pub copyright_second_line: String,
    pub page_number: String,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            page_size: Point { x: 210, y: 297 },
            margin: Padding {
                left: 10,
                right: 10,
                top: 15,
                bottom: 10,
            },
            score_size_proportion: 1.0,
            header_and_footer: 0x01ff,
            title: "%TITLE%".to_string(),
            subtitle: "%SUBTITLE%".to_string(),
            artist: "%ARTIST%".to_string(),
            album: "%ALBUM%".to_string(),
            words: "Words by %WORDS%".to_string(),
            music: "Music by %MUSIC%".to_string(),
            words_and_music: "Words & Music by %WORDSMUSIC%".to_string(),
            copyright: "Copyright %COPYRIGHT%".to_string(),
            copyright_second_line: "All Rights Reserved - International Copyright Secured".to_string(),
            page_number: "Page %N%/%P%".to_string(),
        }
    }
}

/// Equalizer settings: knob gains in dB plus an overall gain
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RseEqualizer {
    pub knobs: Vec<f32>,
    pub gain: f32,
}

/// Master effect settings for the RSE engine (Guitar Pro 5)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RseMasterEffect {
    /// Master volume (5.10 and later)
    pub volume: Option<i32>,
    /// 10-band master equalizer (5.10 and later)
    pub equalizer: Option<RseEqualizer>,
    pub reverb: i32,
}

/// Navigation signs, in file order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectionSign {
    Coda,
    DoubleCoda,
    Segno,
    SegnoSegno,
    Fine,
    DaCapo,
    DaCapoAlCoda,
    DaCapoAlDoubleCoda,
    DaCapoAlFine,
    DaSegno,
    DaSegnoAlCoda,
    DaSegnoAlDoubleCoda,
    DaSegnoAlFine,
    DaSegnoSegno,
    DaSegnoSegnoAlCoda,
    DaSegnoSegnoAlDoubleCoda,
    DaSegnoSegnoAlFine,
    DaCoda,
    DaDoubleCoda,
}

/// Measure references for each direction sign (Guitar Pro 5)
///
/// A value of -1 means the sign is not used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directions {
    pub signs: [i16; DIRECTION_SIGN_COUNT],
}

impl Directions {
    /// Measure the sign points at, if used
    pub fn get(&self, sign: DirectionSign) -> Option<i16> {
        let value = self.signs[sign as usize];
        (value >= 0).then_some(value)
    }

    /// Set the measure a sign points at
    pub fn set(&mut self, sign: DirectionSign, measure: Option<i16>) {
        self.signs[sign as usize] = measure.unwrap_or(-1);
    }
}

impl Default for Directions {
    fn default() -> Self {
        Self {
            signs: [-1; DIRECTION_SIGN_COUNT],
        }
    }
}

/// A decoded tablature document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub subtitle: String,
    pub artist: String,
    pub album: String,
    pub words: String,
    /// Composer (Guitar Pro 5)
    pub music: Option<String>,
    pub copyright: String,
    pub tab: String,
    pub instructions: String,
    pub notice: Vec<String>,
    /// Lyrics (Guitar Pro 4 and later)
    pub lyrics: Option<Lyrics>,
    pub master_effect: Option<RseMasterEffect>,
    pub page_setup: Option<PageSetup>,
    pub tempo_name: Option<String>,
    pub tempo: i32,
    /// Hide the tempo marking (5.10 and later)
    pub hide_tempo: Option<bool>,
    pub key: KeySignature,
    pub directions: Option<Directions>,
    pub measure_headers: Vec<MeasureHeader>,
    pub tracks: Vec<Track>,
}

impl Default for Song {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            artist: String::new(),
            album: String::new(),
            words: String::new(),
            music: None,
            copyright: String::new(),
            tab: String::new(),
            instructions: String::new(),
            notice: Vec::new(),
            lyrics: None,
            master_effect: None,
            page_setup: None,
            tempo_name: None,
            tempo: DEFAULT_TEMPO,
            hide_tempo: None,
            key: KeySignature::default(),
            directions: None,
            measure_headers: Vec::new(),
            tracks: Vec::new(),
        }
    }
}

impl Song {
    /// Create an empty song with a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Number of measure columns
    pub fn measure_count(&self) -> usize {
        self.measure_headers.len()
    }

    /// Iterate over every beat of every track, in file order per track
    pub fn beats(&self) -> impl Iterator<Item = &super::beat::Beat> {
        self.tracks
            .iter()
            .flat_map(|track| track.measures.iter())
            .flat_map(|measure| measure.voices.iter())
            .flat_map(|voice| voice.beats.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_song_defaults() {
        let song = Song::new("Intro");
        assert_eq!(song.title, "Intro");
        assert_eq!(song.tempo, 120);
        assert!(song.lyrics.is_none());
        assert_eq!(song.measure_count(), 0);
    }

    #[test]
    fn test_lyrics_default_has_five_lines() {
        let lyrics = Lyrics::default();
        assert_eq!(lyrics.lines.len(), LYRIC_LINE_COUNT);
        assert_eq!(lyrics.lines[0].starting_measure, 1);
    }

    #[test]
    fn test_directions_get_set() {
        let mut directions = Directions::default();
        assert_eq!(directions.get(DirectionSign::Coda), None);

        directions.set(DirectionSign::Coda, Some(12));
        directions.set(DirectionSign::DaDoubleCoda, Some(3));
        assert_eq!(directions.get(DirectionSign::Coda), Some(12));
        assert_eq!(directions.signs[DIRECTION_SIGN_COUNT - 1], 3);

        directions.set(DirectionSign::Coda, None);
        assert_eq!(directions.signs[0], -1);
    }
}
