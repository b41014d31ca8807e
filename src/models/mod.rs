// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Song document model.
//!
//! This module provides the plain data records produced by decoding and
//! consumed by encoding:
//! - Song: metadata, measure headers and tracks
//! - Track / Measure / Voice / Beat / Note: the structural tree
//! - Effects: bends, graces, harmonics, mix table changes, chords
//!
//! Fields that only exist in some format versions are `Option`s. A decoder
//! for a version without the field leaves it `None`.

use std::fmt;

/// Enum-like format field with an escape hatch for unlisted values.
///
/// Decoding never fails on an unrecognised value; it becomes the `Unknown`
/// variant and encoding writes the raw value back unchanged.
pub trait WireEnum: Copy + fmt::Debug {
    /// Integer type the value is stored as
    type Raw: Copy + PartialEq + fmt::Display;
    /// Type name used in warnings
    const NAME: &'static str;

    /// Map a raw value to a variant
    fn from_raw(raw: Self::Raw) -> Self;
    /// Raw value to emit
    fn to_raw(self) -> Self::Raw;
    /// Whether the value is one of the listed variants
    fn is_known(self) -> bool;
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident: $raw:ty {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Value not listed in the format tables, kept verbatim
            Unknown($raw),
        }

        impl $crate::models::WireEnum for $name {
            type Raw = $raw;
            const NAME: &'static str = stringify!($name);

            fn from_raw(raw: $raw) -> Self {
                $( if raw == $value { return $name::$variant; } )+
                $name::Unknown(raw)
            }

            fn to_raw(self) -> $raw {
                match self {
                    $( $name::$variant => $value, )+
                    $name::Unknown(raw) => raw,
                }
            }

            fn is_known(self) -> bool {
                !matches!(self, $name::Unknown(_))
            }
        }
    };
}

pub mod beat;
pub mod chord;
pub mod measure;
pub mod note;
pub mod song;
pub mod track;

pub use beat::{
    Beat, BeatDisplay, BeatEffect, BeatStatus, BeatStroke, Duration, MixTableChange, MixTableExtras,
    MixTableItem, Octave, SlapEffect, StrokeDirection, Tuplet, TupletBracket, VoiceDirection,
};
pub use chord::{Barre, Chord, ChordAlteration, ChordDiagram, ChordExtension, ChordType};
pub use measure::{Color, LineBreak, Marker, Measure, MeasureHeader, TimeSignature, TripletFeel, Voice};
pub use note::{
    BendEffect, BendPoint, BendType, Fingering, GraceEffect, GraceEffectTransition, HarmonicEffect,
    Note, NoteEffect, NoteType, PitchClass, SlideType, TimeIndependentDuration,
    TremoloPickingEffect, TrillEffect, Velocities,
};
pub use song::{
    DirectionSign, Directions, KeySignature, LyricLine, Lyrics, Padding, PageSetup, Point,
    RseEqualizer, RseMasterEffect, Song,
};
pub use track::{Accentuation, GuitarString, MidiChannel, RseInstrument, Track, TrackRse, TrackSettings};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_enum_known_values() {
        assert_eq!(NoteType::from_raw(2), NoteType::Tie);
        assert_eq!(NoteType::Dead.to_raw(), 3);
        assert!(NoteType::Normal.is_known());
    }

    #[test]
    fn test_wire_enum_unknown_value_kept() {
        let kind = NoteType::from_raw(42);
        assert_eq!(kind, NoteType::Unknown(42));
        assert!(!kind.is_known());
        assert_eq!(kind.to_raw(), 42);
    }

    #[test]
    fn test_wire_enum_signed_values() {
        assert_eq!(SlideType::from_raw(-2), SlideType::IntoFromAbove);
        assert_eq!(Fingering::from_raw(-1), Fingering::Open);
        assert_eq!(Fingering::Unknown(-7).to_raw(), -7);
    }
}
