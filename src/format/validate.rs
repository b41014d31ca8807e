// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Structural checks run before encoding and after decoding.

use crate::error::{GpError, Result};
use crate::models::measure::VOICE_COUNT;
use crate::models::track::MAX_STRINGS;
use crate::models::Song;

/// Check the structural rules every song must satisfy before encoding.
///
/// Each track needs one measure per header, at most seven strings and
/// exactly two voice slots per measure.
pub fn validate_song(song: &Song) -> Result<()> {
    let header_count = song.measure_headers.len();
    for (index, track) in song.tracks.iter().enumerate() {
        let number = index + 1;
        if track.measures.len() != header_count {
            return Err(GpError::malformed(format!(
                "track {number} has {} measures but the song has {header_count} measure headers",
                track.measures.len()
            )));
        }
        if track.strings.len() > MAX_STRINGS {
            return Err(GpError::malformed(format!(
                "track {number} has {} strings, at most {MAX_STRINGS} are supported",
                track.strings.len()
            )));
        }
        if let Some(position) = track.measures.iter().position(|m| m.voices.len() != VOICE_COUNT) {
            return Err(GpError::malformed(format!(
                "track {number}, measure {} does not have {VOICE_COUNT} voices",
                position + 1
            )));
        }
    }
    Ok(())
}
