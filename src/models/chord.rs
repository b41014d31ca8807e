// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord diagrams attached to beats.

use serde::{Deserialize, Serialize};

use super::note::Fingering;

/// Number of string slots a chord record keeps
pub const CHORD_STRINGS: usize = 7;

wire_enum! {
    pub enum ChordType: i32 {
        Major = 0,
        Seventh = 1,
        MajorSeventh = 2,
        Sixth = 3,
        Minor = 4,
        MinorSeventh = 5,
        MinorMajor = 6,
        MinorSixth = 7,
        SuspendedSecond = 8,
        SuspendedFourth = 9,
        SeventhSuspendedSecond = 10,
        SeventhSuspendedFourth = 11,
        Diminished = 12,
        Augmented = 13,
        Power = 14,
    }
}

wire_enum! {
    pub enum ChordExtension: i32 {
        None = 0,
        Ninth = 1,
        Eleventh = 2,
        Thirteenth = 3,
    }
}

wire_enum! {
    pub enum ChordAlteration: i32 {
        Perfect = 0,
        Diminished = 1,
        Augmented = 2,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Barre {
    pub fret: i32,
    pub start: i32,
    pub end: i32,
}

/// Harmony fields of a chord stored in the newer chord layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordDiagram {
    pub sharp: bool,
    pub root: i32,
    pub kind: ChordType,
    pub extension: ChordExtension,
    pub bass: i32,
    pub tonality: ChordAlteration,
    pub add: bool,
    pub fifth: ChordAlteration,
    pub ninth: ChordAlteration,
    pub eleventh: ChordAlteration,
    pub barres: Vec<Barre>,
    pub omissions: Vec<bool>,
    /// Guitar Pro 4 and later
    pub fingerings: Option<Vec<Fingering>>,
    /// Guitar Pro 4 and later
    pub show: Option<bool>,
}

impl Default for ChordDiagram {
    fn default() -> Self {
        Self {
            sharp: false,
            root: 0,
            kind: ChordType::Major,
            extension: ChordExtension::None,
            bass: 0,
            tonality: ChordAlteration::Perfect,
            add: false,
            fifth: ChordAlteration::Perfect,
            ninth: ChordAlteration::Perfect,
            eleventh: ChordAlteration::Perfect,
            barres: Vec::new(),
            omissions: vec![true; CHORD_STRINGS],
            fingerings: None,
            show: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    pub name: String,
    pub first_fret: i32,
    /// Fret per string, -1 = not played; always [`CHORD_STRINGS`] entries
    pub strings: Vec<i32>,
    /// Present when the chord uses the newer layout
    pub diagram: Option<ChordDiagram>,
}

impl Default for Chord {
    fn default() -> Self {
        Self {
            name: String::new(),
            first_fret: 0,
            strings: vec![-1; CHORD_STRINGS],
            diagram: None,
        }
    }
}

impl Chord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_new_format(&self) -> bool {
        self.diagram.is_some()
    }

    /// Fret stored for a string slot, padding with -1
    pub fn fret(&self, index: usize) -> i32 {
        self.strings.get(index).copied().unwrap_or(-1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_defaults() {
        let chord = Chord::new("Am");
        assert!(!chord.is_new_format());
        assert_eq!(chord.strings.len(), CHORD_STRINGS);
        assert_eq!(chord.fret(3), -1);
        assert_eq!(chord.fret(10), -1);
    }
}
