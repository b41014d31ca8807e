// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Guitar Pro 3 layout, the base every later version builds on.

use tracing::warn;

use super::Layout;
use crate::error::{fit, GpError, Result};
use crate::io::{GpReader, GpWriter, Located, Unit};
use crate::models::chord::CHORD_STRINGS;
use crate::models::track::MAX_STRINGS;
use crate::models::{
    Barre, Beat, BeatEffect, BeatStatus, BeatStroke, BendEffect, BendPoint, BendType, Chord,
    ChordDiagram, Color, Duration, GraceEffect, GuitarString, HarmonicEffect, KeySignature, Marker,
    Measure, MeasureHeader, MidiChannel, MixTableChange, MixTableItem, Note, NoteEffect, NoteType,
    SlapEffect, SlideType, Song, StrokeDirection, TimeIndependentDuration, Track, TripletFeel, Tuplet,
    Velocities, Voice, WireEnum,
};

pub const LAYOUT: Layout = Layout {
    read_song,
    write_song,
    read_info,
    write_info,
    read_measure_headers,
    write_measure_headers,
    read_measure_header,
    write_measure_header,
    read_tracks,
    write_tracks,
    read_track,
    write_track,
    read_measures,
    write_measures,
    read_measure,
    write_measure,
    read_voice,
    write_voice,
    read_beat,
    write_beat,
    has_beat_effects,
    read_beat_effects,
    write_beat_effects,
    read_beat_stroke,
    write_beat_stroke,
    read_tremolo_bar,
    write_tremolo_bar,
    read_notes,
    write_notes,
    read_note,
    write_note,
    has_note_effects,
    read_note_effects,
    write_note_effects,
    read_bend,
    write_bend,
    read_grace,
    write_grace,
    read_slides,
    write_slides,
    read_harmonic,
    write_harmonic,
    read_chord,
    write_chord,
    read_new_chord,
    write_new_chord,
    read_mix_table_change,
    write_mix_table_change,
};

/// MIDI channels stored in the song header (4 ports of 16)
pub const CHANNEL_COUNT: usize = 64;
pub(crate) const TRACK_NAME_SLOT: usize = 40;
pub(crate) const CHORD_NAME_SLOT: usize = 22;

// Song

fn read_song(layout: &Layout, io: &mut GpReader) -> Result<Song> {
    io.read_version()?;
    let mut song = Song::default();
    (layout.read_info)(layout, io, &mut song)?;
    let triplet_feel = read_triplet_feel(io)?;
    song.tempo = io.read_i32()?;
    song.key = KeySignature::new(fit(io.read_i32()?, "key")?, false);
    let channels = read_midi_channels(io)?;
    read_song_content(layout, io, &mut song, &channels, Some(triplet_feel))?;
    Ok(song)
}

fn write_song(layout: &Layout, io: &mut GpWriter, song: &Song) -> Result<()> {
    write_version_tag(io)?;
    (layout.write_info)(layout, io, song)?;
    write_triplet_feel(io, song)?;
    io.write_i32(song.tempo)?;
    io.write_i32(song.key.key.into())?;
    write_midi_channels(io, &song.tracks)?;
    write_song_content(layout, io, song)
}

pub(crate) fn write_version_tag(io: &mut GpWriter) -> Result<()> {
    let tag = io.version_tag().to_string();
    io.write_version(&tag)
}

/// Counts, headers, tracks and measures, the common tail of every song.
///
/// Older formats store one triplet feel for the whole song; it is copied
/// into each header.
pub(crate) fn read_song_content(
    layout: &Layout,
    io: &mut GpReader,
    song: &mut Song,
    channels: &[MidiChannel],
    triplet_feel: Option<TripletFeel>,
) -> Result<()> {
    let measure_count = io.read_count("measure")?;
    let track_count = io.read_count("track")?;
    io.annotate_errors(|io| {
        song.measure_headers = (layout.read_measure_headers)(layout, io, measure_count)?;
        if let Some(feel) = triplet_feel {
            for header in &mut song.measure_headers {
                header.triplet_feel = feel;
            }
        }
        song.tracks = (layout.read_tracks)(layout, io, track_count, channels)?;
        (layout.read_measures)(layout, io, song)
    })
}

pub(crate) fn write_song_content(layout: &Layout, io: &mut GpWriter, song: &Song) -> Result<()> {
    io.write_i32(fit(song.measure_headers.len(), "measure count")?)?;
    io.write_i32(fit(song.tracks.len(), "track count")?)?;
    io.annotate_errors(|io| {
        (layout.write_measure_headers)(layout, io, &song.measure_headers)?;
        (layout.write_tracks)(layout, io, &song.tracks)?;
        (layout.write_measures)(layout, io, song)
    })
}

pub(crate) fn read_triplet_feel(io: &mut GpReader) -> Result<TripletFeel> {
    Ok(if io.read_bool()? { TripletFeel::Eighth } else { TripletFeel::None })
}

pub(crate) fn write_triplet_feel(io: &mut GpWriter, song: &Song) -> Result<()> {
    let feel = song.measure_headers.first().map(|header| header.triplet_feel);
    io.write_bool(feel == Some(TripletFeel::Eighth))
}

fn read_info(_: &Layout, io: &mut GpReader, song: &mut Song) -> Result<()> {
    song.title = io.read_int_byte_size_string()?;
    song.subtitle = io.read_int_byte_size_string()?;
    song.artist = io.read_int_byte_size_string()?;
    song.album = io.read_int_byte_size_string()?;
    song.words = io.read_int_byte_size_string()?;
    song.copyright = io.read_int_byte_size_string()?;
    song.tab = io.read_int_byte_size_string()?;
    song.instructions = io.read_int_byte_size_string()?;
    song.notice = read_notice(io)?;
    Ok(())
}

fn write_info(_: &Layout, io: &mut GpWriter, song: &Song) -> Result<()> {
    for text in [
        &song.title,
        &song.subtitle,
        &song.artist,
        &song.album,
        &song.words,
        &song.copyright,
        &song.tab,
        &song.instructions,
    ] {
        io.write_int_byte_size_string(text)?;
    }
    write_notice(io, &song.notice)
}

pub(crate) fn read_notice(io: &mut GpReader) -> Result<Vec<String>> {
    let count = io.read_count("notice line")?;
    io.read_repeated(count, |io| io.read_int_byte_size_string()).complete()
}

pub(crate) fn write_notice(io: &mut GpWriter, notice: &[String]) -> Result<()> {
    io.write_i32(fit(notice.len(), "notice line count")?)?;
    for line in notice {
        io.write_int_byte_size_string(line)?;
    }
    Ok(())
}

// MIDI channels

fn to_channel_short(data: i8) -> i16 {
    let value = ((i32::from(data) << 3) - 1).clamp(i16::MIN.into(), i16::MAX.into());
    (value.max(-1) + 1) as i16
}

fn from_channel_short(value: i16) -> i8 {
    (((i32::from(value) >> 3) - 1).clamp(-128, 126) + 1) as i8
}

pub(crate) fn read_midi_channels(io: &mut GpReader) -> Result<Vec<MidiChannel>> {
    (0..CHANNEL_COUNT as i32)
        .map(|index| {
            let mut channel = MidiChannel::new(index);
            let instrument = io.read_i32()?;
            channel.instrument = if channel.is_percussion_channel() && instrument == -1 {
                0
            } else {
                instrument
            };
            channel.volume = to_channel_short(io.read_i8()?);
            channel.balance = to_channel_short(io.read_i8()?);
            channel.chorus = to_channel_short(io.read_i8()?);
            channel.reverb = to_channel_short(io.read_i8()?);
            channel.phaser = to_channel_short(io.read_i8()?);
            channel.tremolo = to_channel_short(io.read_i8()?);
            io.skip(2)?;
            Ok(channel)
        })
        .collect()
}

fn channel_slot(index: i32) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&slot| slot < CHANNEL_COUNT)
        .ok_or_else(|| GpError::malformed(format!("MIDI channel {index} is outside 0..{CHANNEL_COUNT}")))
}

/// Rebuild the song-level channel table from the tracks that use it
pub(crate) fn write_midi_channels(io: &mut GpWriter, tracks: &[Track]) -> Result<()> {
    let mut channels: Vec<MidiChannel> = (0..CHANNEL_COUNT as i32).map(MidiChannel::new).collect();
    for track in tracks {
        let effect = track.channel.effect_channel;
        if let Ok(slot) = channel_slot(effect) {
            channels[slot] = MidiChannel {
                channel: effect,
                effect_channel: effect,
                ..track.channel.clone()
            };
        }
    }
    for track in tracks {
        channels[channel_slot(track.channel.channel)?] = track.channel.clone();
    }

    for channel in &channels {
        let instrument = if channel.is_percussion_channel() && channel.instrument == 0 {
            -1
        } else {
            channel.instrument
        };
        io.write_i32(instrument)?;
        for value in [
            channel.volume,
            channel.balance,
            channel.chorus,
            channel.reverb,
            channel.phaser,
            channel.tremolo,
        ] {
            io.write_i8(from_channel_short(value))?;
        }
        io.placeholder(2)?;
    }
    Ok(())
}

/// 1-based channel reference followed by the effect channel
fn read_track_channel(io: &mut GpReader, channels: &[MidiChannel]) -> Result<MidiChannel> {
    let index = io.read_i32()?;
    let effect_channel = io.read_i32()?.saturating_sub(1);
    let slot = usize::try_from(i64::from(index) - 1).ok().and_then(|slot| channels.get(slot));
    let mut channel = match slot {
        Some(channel) => channel.clone(),
        None => {
            warn!(location = %io.location(), index, "track channel is outside the channel table, using defaults");
            MidiChannel::default()
        }
    };
    if channel.instrument < 0 {
        channel.instrument = 0;
    }
    if !channel.is_percussion_channel() {
        channel.effect_channel = effect_channel;
    }
    Ok(channel)
}

fn write_track_channel(io: &mut GpWriter, channel: &MidiChannel) -> Result<()> {
    channel_slot(channel.channel)?;
    io.write_i32(channel.channel + 1)?;
    io.write_i32(channel.effect_channel.saturating_add(1))
}

// Measure headers

fn read_measure_headers(layout: &Layout, io: &mut GpReader, count: usize) -> Result<Vec<MeasureHeader>> {
    let mut headers = Vec::with_capacity(count.min(1024));
    for number in 1..=count {
        let header = io.scoped(Unit::Measure, number, |io| (layout.read_measure_header)(layout, io, &headers))?;
        headers.push(header);
    }
    Ok(headers)
}

fn write_measure_headers(layout: &Layout, io: &mut GpWriter, headers: &[MeasureHeader]) -> Result<()> {
    let mut previous = None;
    for (index, header) in headers.iter().enumerate() {
        io.scoped(Unit::Measure, index + 1, |io| {
            (layout.write_measure_header)(layout, io, header, previous)
        })?;
        previous = Some(header);
    }
    Ok(())
}

/// Start a header from the fields it inherits from the previous one
pub(crate) fn inherited_header(previous: &[MeasureHeader]) -> MeasureHeader {
    let mut header = MeasureHeader::default();
    if let Some(last) = previous.last() {
        header.time_signature = last.time_signature;
        header.key_signature = last.key_signature;
    }
    header
}

fn read_measure_header(_: &Layout, io: &mut GpReader, previous: &[MeasureHeader]) -> Result<MeasureHeader> {
    let flags = io.read_u8()?;
    let mut header = inherited_header(previous);
    if flags & 0x01 != 0 {
        header.time_signature.numerator = io.read_i8()?;
    }
    if flags & 0x02 != 0 {
        header.time_signature.denominator = io.read_i8()?;
    }
    header.is_repeat_open = flags & 0x04 != 0;
    if flags & 0x08 != 0 {
        header.repeat_close = io.read_i8()?;
    }
    if flags & 0x10 != 0 {
        header.repeat_alternative = read_repeat_alternative(io, previous)?;
    }
    if flags & 0x20 != 0 {
        header.marker = Some(read_marker(io)?);
    }
    if flags & 0x40 != 0 {
        header.key_signature = read_key_signature(io)?;
    }
    header.has_double_bar = flags & 0x80 != 0;
    Ok(header)
}

/// Flag bits shared by every header layout
pub(crate) fn header_flags(header: &MeasureHeader, previous: Option<&MeasureHeader>) -> u8 {
    let time = &header.time_signature;
    let mut flags = 0u8;
    if previous.map_or(true, |p| p.time_signature.numerator != time.numerator) {
        flags |= 0x01;
    }
    if previous.map_or(true, |p| p.time_signature.denominator != time.denominator) {
        flags |= 0x02;
    }
    if header.is_repeat_open {
        flags |= 0x04;
    }
    if header.has_repeat_close() {
        flags |= 0x08;
    }
    if header.repeat_alternative != 0 {
        flags |= 0x10;
    }
    if header.marker.is_some() {
        flags |= 0x20;
    }
    let key_changed = match previous {
        Some(p) => p.key_signature != header.key_signature,
        None => header.key_signature != KeySignature::default(),
    };
    if key_changed {
        flags |= 0x40;
    }
    if header.has_double_bar {
        flags |= 0x80;
    }
    flags
}

fn write_measure_header(
    _: &Layout,
    io: &mut GpWriter,
    header: &MeasureHeader,
    previous: Option<&MeasureHeader>,
) -> Result<()> {
    let flags = header_flags(header, previous);
    io.write_u8(flags)?;
    if flags & 0x01 != 0 {
        io.write_i8(header.time_signature.numerator)?;
    }
    if flags & 0x02 != 0 {
        io.write_i8(header.time_signature.denominator)?;
    }
    if flags & 0x08 != 0 {
        io.write_i8(header.repeat_close)?;
    }
    if flags & 0x10 != 0 {
        io.write_u8((u8::BITS - header.repeat_alternative.leading_zeros()) as u8)?;
    }
    if flags & 0x20 != 0 {
        if let Some(marker) = &header.marker {
            write_marker(io, marker)?;
        }
    }
    if flags & 0x40 != 0 {
        write_key_signature(io, &header.key_signature)?;
    }
    Ok(())
}

/// Stored as the number of the highest ending; earlier endings since the
/// last repeat open are masked out
fn read_repeat_alternative(io: &mut GpReader, previous: &[MeasureHeader]) -> Result<u8> {
    let value = io.read_u8()?;
    if value > 8 {
        return Err(GpError::malformed(format!("alternate ending {value} is out of range")));
    }
    let mut existing = 0u8;
    for header in previous.iter().rev() {
        if header.is_repeat_open {
            break;
        }
        existing |= header.repeat_alternative;
    }
    let endings = ((1u16 << value) - 1) as u8;
    Ok(endings ^ existing)
}

pub(crate) fn read_marker(io: &mut GpReader) -> Result<Marker> {
    let title = io.read_int_byte_size_string()?;
    let color = read_color(io)?;
    Ok(Marker { title, color })
}

pub(crate) fn write_marker(io: &mut GpWriter, marker: &Marker) -> Result<()> {
    io.write_int_byte_size_string(&marker.title)?;
    write_color(io, &marker.color)
}

pub(crate) fn read_color(io: &mut GpReader) -> Result<Color> {
    let color = Color::new(io.read_u8()?, io.read_u8()?, io.read_u8()?);
    io.skip(1)?;
    Ok(color)
}

pub(crate) fn write_color(io: &mut GpWriter, color: &Color) -> Result<()> {
    io.write_u8(color.r)?;
    io.write_u8(color.g)?;
    io.write_u8(color.b)?;
    io.placeholder(1)
}

pub(crate) fn read_key_signature(io: &mut GpReader) -> Result<KeySignature> {
    let key = io.read_i8()?;
    let is_minor = io.read_i8()? != 0;
    Ok(KeySignature::new(key, is_minor))
}

pub(crate) fn write_key_signature(io: &mut GpWriter, key: &KeySignature) -> Result<()> {
    io.write_i8(key.key)?;
    io.write_i8(i8::from(key.is_minor))
}

// Tracks

fn read_tracks(layout: &Layout, io: &mut GpReader, count: usize, channels: &[MidiChannel]) -> Result<Vec<Track>> {
    (1..=count)
        .map(|number| io.scoped(Unit::Track, number, |io| (layout.read_track)(layout, io, number, channels)))
        .collect()
}

fn write_tracks(layout: &Layout, io: &mut GpWriter, tracks: &[Track]) -> Result<()> {
    for (index, track) in tracks.iter().enumerate() {
        io.scoped(Unit::Track, index + 1, |io| (layout.write_track)(layout, io, track, index + 1))?;
    }
    Ok(())
}

pub(crate) fn track_from_flags(flags: u8) -> Track {
    Track {
        is_percussion: flags & 0x01 != 0,
        is_twelve_string: flags & 0x02 != 0,
        is_banjo: flags & 0x04 != 0,
        ..Track::default()
    }
}

pub(crate) fn track_flags(track: &Track) -> u8 {
    let mut flags = 0u8;
    if track.is_percussion {
        flags |= 0x01;
    }
    if track.is_twelve_string {
        flags |= 0x02;
    }
    if track.is_banjo {
        flags |= 0x04;
    }
    flags
}

fn read_track(_: &Layout, io: &mut GpReader, _number: usize, channels: &[MidiChannel]) -> Result<Track> {
    let mut track = track_from_flags(io.read_u8()?);
    read_track_body(io, &mut track, channels)?;
    Ok(track)
}

fn write_track(_: &Layout, io: &mut GpWriter, track: &Track, _number: usize) -> Result<()> {
    io.write_u8(track_flags(track))?;
    write_track_body(io, track)
}

/// Name through colour, unchanged since Guitar Pro 3
pub(crate) fn read_track_body(io: &mut GpReader, track: &mut Track, channels: &[MidiChannel]) -> Result<()> {
    track.name = io.read_byte_size_string(TRACK_NAME_SLOT)?;
    let string_count = io.read_count("string")?;
    if string_count > MAX_STRINGS {
        return Err(GpError::malformed(format!(
            "track has {string_count} strings, at most {MAX_STRINGS} are supported"
        )));
    }
    let tuning = io.read_repeated(MAX_STRINGS, |io| io.read_i32()).complete()?;
    track.strings = tuning
        .into_iter()
        .take(string_count)
        .zip(1..)
        .map(|(value, number)| GuitarString::new(number, value))
        .collect();
    track.port = io.read_i32()?;
    track.channel = read_track_channel(io, channels)?;
    track.fret_count = io.read_i32()?;
    track.offset = io.read_i32()?;
    track.color = read_color(io)?;
    Ok(())
}

pub(crate) fn write_track_body(io: &mut GpWriter, track: &Track) -> Result<()> {
    io.write_byte_size_string(&track.name, TRACK_NAME_SLOT)?;
    io.write_i32(fit(track.strings.len(), "string count")?)?;
    for index in 0..MAX_STRINGS {
        io.write_i32(track.strings.get(index).map_or(0, |string| string.value))?;
    }
    io.write_i32(track.port)?;
    write_track_channel(io, &track.channel)?;
    io.write_i32(track.fret_count)?;
    io.write_i32(track.offset)?;
    write_color(io, &track.color)
}

// Measures and voices

fn read_measures(layout: &Layout, io: &mut GpReader, song: &mut Song) -> Result<()> {
    let header_count = song.measure_headers.len();
    for track in &mut song.tracks {
        track.measures = Vec::with_capacity(header_count);
    }
    for number in 1..=header_count {
        io.scoped(Unit::Measure, number, |io| {
            for (index, track) in song.tracks.iter_mut().enumerate() {
                let measure = io.scoped(Unit::Track, index + 1, |io| (layout.read_measure)(layout, io, &*track))?;
                track.measures.push(measure);
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn write_measures(layout: &Layout, io: &mut GpWriter, song: &Song) -> Result<()> {
    for index in 0..song.measure_headers.len() {
        io.scoped(Unit::Measure, index + 1, |io| {
            for (track_index, track) in song.tracks.iter().enumerate() {
                io.scoped(Unit::Track, track_index + 1, |io| {
                    let measure = track
                        .measures
                        .get(index)
                        .ok_or_else(|| GpError::malformed("track is missing a measure"))?;
                    (layout.write_measure)(layout, io, measure, track)
                })?;
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn read_measure(layout: &Layout, io: &mut GpReader, track: &Track) -> Result<Measure> {
    let mut measure = Measure::default();
    measure.voices[0] = io.scoped(Unit::Voice, 1, |io| (layout.read_voice)(layout, io, track))?;
    Ok(measure)
}

fn write_measure(layout: &Layout, io: &mut GpWriter, measure: &Measure, track: &Track) -> Result<()> {
    let voice = measure
        .voices
        .first()
        .ok_or_else(|| GpError::malformed("measure has no voices"))?;
    if measure.voices.iter().skip(1).any(|voice| !voice.is_empty()) {
        warn!(location = %io.location(), "second voice is not stored by this version and was dropped");
    }
    io.scoped(Unit::Voice, 1, |io| (layout.write_voice)(layout, io, voice, track))
}

fn read_voice(layout: &Layout, io: &mut GpReader, track: &Track) -> Result<Voice> {
    let count = io.read_count("beat")?;
    let beats = (1..=count)
        .map(|number| io.scoped(Unit::Beat, number, |io| (layout.read_beat)(layout, io, track)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Voice::new(beats))
}

fn write_voice(layout: &Layout, io: &mut GpWriter, voice: &Voice, track: &Track) -> Result<()> {
    io.write_i32(fit(voice.beats.len(), "beat count")?)?;
    for (index, beat) in voice.beats.iter().enumerate() {
        io.scoped(Unit::Beat, index + 1, |io| (layout.write_beat)(layout, io, beat, track))?;
    }
    Ok(())
}

// Beats

fn read_beat(layout: &Layout, io: &mut GpReader, track: &Track) -> Result<Beat> {
    let flags = io.read_u8()?;
    let mut beat = Beat::default();
    if flags & 0x40 != 0 {
        beat.status = io.read_enum()?;
    }
    beat.duration = read_duration(io, flags)?;
    if flags & 0x02 != 0 {
        beat.chord = Some((layout.read_chord)(layout, io)?);
    }
    if flags & 0x04 != 0 {
        beat.text = Some(io.read_int_byte_size_string()?);
    }
    let mut template = NoteEffect::default();
    if flags & 0x08 != 0 {
        beat.effect = (layout.read_beat_effects)(layout, io, &mut template)?;
    }
    if flags & 0x10 != 0 {
        beat.effect.mix_table_change = Some((layout.read_mix_table_change)(layout, io)?);
    }
    beat.notes = (layout.read_notes)(layout, io, track, &template)?;
    Ok(beat)
}

fn write_beat(layout: &Layout, io: &mut GpWriter, beat: &Beat, track: &Track) -> Result<()> {
    let mut flags = 0u8;
    if beat.duration.is_dotted {
        flags |= 0x01;
    }
    if beat.chord.is_some() {
        flags |= 0x02;
    }
    if beat.text.is_some() {
        flags |= 0x04;
    }
    if (layout.has_beat_effects)(beat) {
        flags |= 0x08;
    }
    if beat.effect.mix_table_change.is_some() {
        flags |= 0x10;
    }
    if beat.duration.tuplet != Tuplet::default() {
        flags |= 0x20;
    }
    if beat.status != BeatStatus::Normal {
        flags |= 0x40;
    }

    io.write_u8(flags)?;
    if flags & 0x40 != 0 {
        io.write_u8(beat.status.to_raw())?;
    }
    write_duration(io, &beat.duration, flags)?;
    if let Some(chord) = &beat.chord {
        (layout.write_chord)(layout, io, chord)?;
    }
    if let Some(text) = &beat.text {
        io.write_int_byte_size_string(text)?;
    }
    if flags & 0x08 != 0 {
        (layout.write_beat_effects)(layout, io, beat)?;
    }
    if let Some(change) = &beat.effect.mix_table_change {
        (layout.write_mix_table_change)(layout, io, change)?;
    }
    (layout.write_notes)(layout, io, &beat.notes, track)
}

fn read_duration(io: &mut GpReader, flags: u8) -> Result<Duration> {
    let exponent = io.read_i8()?;
    if !(-2..=4).contains(&exponent) {
        return Err(GpError::malformed(format!("duration exponent {exponent} is out of range")));
    }
    let tuplet = if flags & 0x20 != 0 {
        Tuplet::from_enters(io.read_i32()?)
    } else {
        Tuplet::default()
    };
    Ok(Duration {
        value: 1u8 << (exponent + 2) as u32,
        is_dotted: flags & 0x01 != 0,
        tuplet,
    })
}

fn write_duration(io: &mut GpWriter, duration: &Duration, flags: u8) -> Result<()> {
    let value = duration.value;
    if !value.is_power_of_two() || value > Duration::SIXTY_FOURTH {
        return Err(GpError::malformed(format!("duration value {value} is not a note value")));
    }
    io.write_i8(value.trailing_zeros() as i8 - 2)?;
    if flags & 0x20 != 0 {
        io.write_i32(duration.tuplet.enters)?;
    }
    Ok(())
}

fn beat_effect_flags(beat: &Beat) -> u8 {
    let effect = &beat.effect;
    let mut flags = 0u8;
    if beat.notes.iter().any(|note| note.effect.vibrato) {
        flags |= 0x01;
    }
    if effect.vibrato {
        flags |= 0x02;
    }
    let harmonics = beat.notes.iter().filter_map(|note| note.effect.harmonic.as_ref());
    for harmonic in harmonics {
        match harmonic {
            HarmonicEffect::Natural => flags |= 0x04,
            HarmonicEffect::Artificial { .. } => flags |= 0x08,
            _ => {}
        }
    }
    if effect.fade_in {
        flags |= 0x10;
    }
    if effect.slap_effect != SlapEffect::None || effect.tremolo_bar.is_some() {
        flags |= 0x20;
    }
    if effect.stroke.direction != StrokeDirection::None {
        flags |= 0x40;
    }
    flags
}

fn has_beat_effects(beat: &Beat) -> bool {
    beat_effect_flags(beat) != 0
}

fn read_beat_effects(layout: &Layout, io: &mut GpReader, template: &mut NoteEffect) -> Result<BeatEffect> {
    let flags = io.read_u8()?;
    let mut effect = BeatEffect::default();
    template.vibrato = flags & 0x01 != 0;
    effect.vibrato = flags & 0x02 != 0;
    if flags & 0x04 != 0 {
        template.harmonic = Some(HarmonicEffect::Natural);
    }
    if flags & 0x08 != 0 {
        template.harmonic = Some(HarmonicEffect::Artificial {
            pitch: None,
            octave: None,
        });
    }
    effect.fade_in = flags & 0x10 != 0;
    if flags & 0x20 != 0 {
        let raw = io.read_u8()? as i8;
        effect.slap_effect = io.wire(raw);
        if effect.slap_effect == SlapEffect::None {
            effect.tremolo_bar = Some((layout.read_tremolo_bar)(layout, io)?);
        } else {
            io.read_i32()?;
        }
    }
    if flags & 0x40 != 0 {
        effect.stroke = (layout.read_beat_stroke)(layout, io)?;
    }
    Ok(effect)
}

fn write_beat_effects(layout: &Layout, io: &mut GpWriter, beat: &Beat) -> Result<()> {
    let effect = &beat.effect;
    let flags = beat_effect_flags(beat);
    io.write_u8(flags)?;
    if flags & 0x20 != 0 {
        io.write_u8(effect.slap_effect.to_raw() as u8)?;
        match (&effect.tremolo_bar, effect.slap_effect) {
            (Some(bar), SlapEffect::None) => (layout.write_tremolo_bar)(layout, io, bar)?,
            _ => io.write_i32(0)?,
        }
    }
    if flags & 0x40 != 0 {
        (layout.write_beat_stroke)(layout, io, &effect.stroke)?;
    }
    Ok(())
}

/// A stored tremolo bar depth expanded into a dip curve
pub(crate) fn tremolo_dip(value: i32) -> BendEffect {
    let depth = (-f64::from(value) / (2 * BendEffect::STORED_VALUE_SCALE) as f64).round() as i32;
    BendEffect {
        kind: BendType::Dip,
        value,
        points: vec![
            BendPoint::new(0, 0),
            BendPoint::new(BendEffect::MAX_POSITION / 2, depth),
            BendPoint::new(BendEffect::MAX_POSITION, 0),
        ],
    }
}

fn read_tremolo_bar(_: &Layout, io: &mut GpReader) -> Result<BendEffect> {
    Ok(tremolo_dip(io.read_i32()?))
}

fn write_tremolo_bar(_: &Layout, io: &mut GpWriter, bar: &BendEffect) -> Result<()> {
    io.write_i32(bar.value)
}

fn to_stroke_value(raw: i8) -> u8 {
    match raw {
        1 => 128,
        2 => 64,
        3 => 32,
        4 => 16,
        5 => 8,
        6 => 4,
        _ => 64,
    }
}

fn from_stroke_value(value: u8) -> i8 {
    match value {
        128 => 1,
        64 => 2,
        32 => 3,
        16 => 4,
        8 => 5,
        4 => 6,
        _ => 2,
    }
}

/// Decode a stroke from its down and up speed bytes
pub(crate) fn stroke_from_bytes(down: i8, up: i8) -> BeatStroke {
    if up > 0 {
        BeatStroke {
            direction: StrokeDirection::Up,
            value: to_stroke_value(up),
        }
    } else if down > 0 {
        BeatStroke {
            direction: StrokeDirection::Down,
            value: to_stroke_value(down),
        }
    } else {
        BeatStroke::default()
    }
}

/// Down and up speed bytes for a stroke
pub(crate) fn stroke_bytes(stroke: &BeatStroke) -> (i8, i8) {
    match stroke.direction {
        StrokeDirection::Up => (0, from_stroke_value(stroke.value)),
        StrokeDirection::Down => (from_stroke_value(stroke.value), 0),
        _ => (0, 0),
    }
}

fn read_beat_stroke(_: &Layout, io: &mut GpReader) -> Result<BeatStroke> {
    let down = io.read_i8()?;
    let up = io.read_i8()?;
    Ok(stroke_from_bytes(down, up))
}

fn write_beat_stroke(_: &Layout, io: &mut GpWriter, stroke: &BeatStroke) -> Result<()> {
    let (down, up) = stroke_bytes(stroke);
    io.write_i8(down)?;
    io.write_i8(up)
}

// Notes

fn string_bit(number: i32) -> Option<u8> {
    (1..=MAX_STRINGS as i32).contains(&number).then(|| 1u8 << (MAX_STRINGS as i32 - number))
}

fn read_notes(layout: &Layout, io: &mut GpReader, track: &Track, template: &NoteEffect) -> Result<Vec<Note>> {
    let string_flags = io.read_u8()?;
    let mut notes = Vec::new();
    for string in &track.strings {
        if string_bit(string.number).map_or(false, |bit| string_flags & bit != 0) {
            notes.push((layout.read_note)(layout, io, string, template.clone())?);
        }
    }
    Ok(notes)
}

fn write_notes(layout: &Layout, io: &mut GpWriter, notes: &[Note], track: &Track) -> Result<()> {
    let mut sorted: Vec<&Note> = notes.iter().collect();
    sorted.sort_by_key(|note| note.string);

    let mut strings = Vec::with_capacity(sorted.len());
    let mut string_flags = 0u8;
    for note in &sorted {
        let bit = string_bit(note.string)
            .zip(track.string(note.string))
            .ok_or_else(|| GpError::malformed(format!("note on string {} the track does not have", note.string)))?;
        if string_flags & bit.0 != 0 {
            return Err(GpError::malformed(format!("two notes on string {}", note.string)));
        }
        string_flags |= bit.0;
        strings.push(bit.1);
    }

    io.write_u8(string_flags)?;
    for (note, string) in sorted.into_iter().zip(strings) {
        (layout.write_note)(layout, io, note, string)?;
    }
    Ok(())
}

fn read_note(layout: &Layout, io: &mut GpReader, string: &GuitarString, effect: NoteEffect) -> Result<Note> {
    let flags = io.read_u8()?;
    let mut note = Note {
        string: string.number,
        effect,
        ..Note::default()
    };
    note.effect.ghost_note = flags & 0x04 != 0;
    note.effect.accentuated_note = flags & 0x40 != 0;
    if flags & 0x20 != 0 {
        note.kind = io.read_enum()?;
    }
    if flags & 0x01 != 0 {
        note.time_independent = Some(TimeIndependentDuration {
            duration: io.read_i8()?,
            tuplet: io.read_i8()?,
        });
    }
    if flags & 0x10 != 0 {
        note.velocity = Velocities::unpack(io.read_i8()?.into());
    }
    if flags & 0x20 != 0 {
        note.value = io.read_i8()?.into();
    }
    if flags & 0x80 != 0 {
        note.effect.left_hand_finger = io.read_signed_enum()?;
        note.effect.right_hand_finger = io.read_signed_enum()?;
    }
    if flags & 0x08 != 0 {
        (layout.read_note_effects)(layout, io, &mut note, string)?;
    }
    Ok(note)
}

fn write_note(layout: &Layout, io: &mut GpWriter, note: &Note, string: &GuitarString) -> Result<()> {
    let mut flags = 0u8;
    if note.time_independent.is_some() {
        flags |= 0x01;
    }
    if note.effect.ghost_note {
        flags |= 0x04;
    }
    if (layout.has_note_effects)(&note.effect) {
        flags |= 0x08;
    }
    if note.velocity != Velocities::DEFAULT {
        flags |= 0x10;
    }
    if note.kind != NoteType::Rest {
        flags |= 0x20;
    }
    if note.effect.accentuated_note {
        flags |= 0x40;
    }
    if note.effect.has_fingering() {
        flags |= 0x80;
    }

    io.write_u8(flags)?;
    if flags & 0x20 != 0 {
        io.write_u8(note.kind.to_raw())?;
    }
    if let Some(duration) = &note.time_independent {
        io.write_i8(duration.duration)?;
        io.write_i8(duration.tuplet)?;
    }
    if flags & 0x10 != 0 {
        io.write_i8(fit(Velocities::pack(note.velocity), "velocity")?)?;
    }
    if flags & 0x20 != 0 {
        io.write_i8(fit(note.value, "fret")?)?;
    }
    if flags & 0x80 != 0 {
        io.write_i8(note.effect.left_hand_finger.to_raw())?;
        io.write_i8(note.effect.right_hand_finger.to_raw())?;
    }
    if flags & 0x08 != 0 {
        (layout.write_note_effects)(layout, io, note, string)?;
    }
    Ok(())
}

fn has_note_effects(effect: &NoteEffect) -> bool {
    effect.bend.is_some() || effect.hammer || !effect.slides.is_empty() || effect.let_ring || effect.grace.is_some()
}

fn read_note_effects(layout: &Layout, io: &mut GpReader, note: &mut Note, _: &GuitarString) -> Result<()> {
    let flags = io.read_u8()?;
    let effect = &mut note.effect;
    if flags & 0x01 != 0 {
        effect.bend = Some((layout.read_bend)(layout, io)?);
    }
    effect.hammer = flags & 0x02 != 0;
    if flags & 0x04 != 0 {
        effect.slides = (layout.read_slides)(layout, io)?;
    }
    effect.let_ring = flags & 0x08 != 0;
    if flags & 0x10 != 0 {
        effect.grace = Some((layout.read_grace)(layout, io)?);
    }
    Ok(())
}

fn write_note_effects(layout: &Layout, io: &mut GpWriter, note: &Note, _: &GuitarString) -> Result<()> {
    let effect = &note.effect;
    let mut flags = 0u8;
    if effect.bend.is_some() {
        flags |= 0x01;
    }
    if effect.hammer {
        flags |= 0x02;
    }
    if !effect.slides.is_empty() {
        flags |= 0x04;
    }
    if effect.let_ring {
        flags |= 0x08;
    }
    if effect.grace.is_some() {
        flags |= 0x10;
    }
    io.write_u8(flags)?;
    if let Some(bend) = &effect.bend {
        (layout.write_bend)(layout, io, bend)?;
    }
    if flags & 0x04 != 0 {
        (layout.write_slides)(layout, io, &effect.slides)?;
    }
    if let Some(grace) = &effect.grace {
        (layout.write_grace)(layout, io, grace)?;
    }
    Ok(())
}

// Note effects

fn scale_down(raw: i32, scale: i32) -> i32 {
    (f64::from(raw) / f64::from(scale)).round() as i32
}

fn read_bend(_: &Layout, io: &mut GpReader) -> Result<BendEffect> {
    let kind = io.read_signed_enum()?;
    let value = io.read_i32()?;
    let count = io.read_count("bend point")?;
    let points = io
        .read_repeated(count, |io| {
            let position = io.read_i32()?;
            let value = io.read_i32()?;
            let vibrato = io.read_bool()?;
            Ok(BendPoint {
                position: scale_down(position, BendEffect::STORED_POSITION_SCALE),
                value: scale_down(value, BendEffect::STORED_VALUE_SCALE),
                vibrato,
            })
        })
        .complete()?;
    Ok(BendEffect { kind, value, points })
}

fn write_bend(_: &Layout, io: &mut GpWriter, bend: &BendEffect) -> Result<()> {
    io.write_i8(bend.kind.to_raw())?;
    io.write_i32(bend.value)?;
    io.write_i32(fit(bend.points.len(), "bend point count")?)?;
    for point in &bend.points {
        io.write_i32(point.position.saturating_mul(BendEffect::STORED_POSITION_SCALE))?;
        io.write_i32(point.value.saturating_mul(BendEffect::STORED_VALUE_SCALE))?;
        io.write_bool(point.vibrato)?;
    }
    Ok(())
}

/// Grace note length from its stored exponent
pub(crate) fn grace_duration(raw: u8) -> Result<u8> {
    if raw > 7 {
        return Err(GpError::malformed(format!("grace note duration {raw} is out of range")));
    }
    Ok(1 << (7 - raw))
}

pub(crate) fn grace_duration_raw(duration: u8) -> Result<u8> {
    if !duration.is_power_of_two() {
        return Err(GpError::malformed(format!("grace note duration {duration} is not a note value")));
    }
    Ok(7 - duration.trailing_zeros() as u8)
}

fn read_grace(_: &Layout, io: &mut GpReader) -> Result<GraceEffect> {
    let fret = io.read_i8()?;
    let velocity = Velocities::unpack(io.read_u8()?.into());
    let duration = grace_duration(io.read_u8()?)?;
    let transition = io.read_signed_enum()?;
    Ok(GraceEffect {
        fret,
        velocity,
        duration,
        transition,
        is_dead: fret == -1,
        is_on_beat: false,
    })
}

fn write_grace(_: &Layout, io: &mut GpWriter, grace: &GraceEffect) -> Result<()> {
    io.write_i8(if grace.is_dead { -1 } else { grace.fret })?;
    io.write_u8(fit(Velocities::pack(grace.velocity), "grace velocity")?)?;
    io.write_u8(grace_duration_raw(grace.duration)?)?;
    io.write_i8(grace.transition.to_raw())
}

/// Only a flag bit marks a slide; there is no slide data
fn read_slides(_: &Layout, _: &mut GpReader) -> Result<Vec<SlideType>> {
    Ok(vec![SlideType::ShiftSlideTo])
}

fn write_slides(_: &Layout, _: &mut GpWriter, slides: &[SlideType]) -> Result<()> {
    if slides != [SlideType::ShiftSlideTo] {
        warn!(?slides, "only a shift slide is stored by this version");
    }
    Ok(())
}

/// Harmonics are beat flags here; a note never carries harmonic data
fn read_harmonic(_: &Layout, _: &mut GpReader, _: i32) -> Result<HarmonicEffect> {
    Err(GpError::malformed("note harmonic data is not stored by this version"))
}

fn write_harmonic(_: &Layout, _: &mut GpWriter, _: &HarmonicEffect, _: i32) -> Result<()> {
    Err(GpError::malformed("note harmonic data is not stored by this version"))
}

// Chords

fn read_chord(layout: &Layout, io: &mut GpReader) -> Result<Chord> {
    if io.read_bool()? {
        (layout.read_new_chord)(layout, io)
    } else {
        read_old_chord(io)
    }
}

fn write_chord(layout: &Layout, io: &mut GpWriter, chord: &Chord) -> Result<()> {
    io.write_bool(chord.is_new_format())?;
    match &chord.diagram {
        Some(diagram) => (layout.write_new_chord)(layout, io, chord, diagram),
        None => write_old_chord(io, chord),
    }
}

const OLD_CHORD_STRINGS: usize = 6;

fn read_old_chord(io: &mut GpReader) -> Result<Chord> {
    let mut chord = Chord::new(io.read_int_byte_size_string()?);
    chord.first_fret = io.read_i32()?;
    if chord.first_fret != 0 {
        for fret in chord.strings.iter_mut().take(OLD_CHORD_STRINGS) {
            *fret = io.read_i32()?;
        }
    }
    Ok(chord)
}

fn write_old_chord(io: &mut GpWriter, chord: &Chord) -> Result<()> {
    io.write_int_byte_size_string(&chord.name)?;
    io.write_i32(chord.first_fret)?;
    if chord.first_fret != 0 {
        for index in 0..OLD_CHORD_STRINGS {
            io.write_i32(chord.fret(index))?;
        }
    }
    Ok(())
}

pub(crate) fn read_int_enum<E: WireEnum<Raw = i32>>(io: &mut GpReader) -> Result<E> {
    let raw = io.read_i32()?;
    Ok(io.wire(raw))
}

const BARRE_SLOTS: usize = 2;

fn read_new_chord(_: &Layout, io: &mut GpReader) -> Result<Chord> {
    let mut chord = Chord::default();
    let mut diagram = ChordDiagram::default();
    diagram.sharp = io.read_bool()?;
    io.skip(3)?;
    diagram.root = io.read_i32()?;
    diagram.kind = read_int_enum(io)?;
    diagram.extension = read_int_enum(io)?;
    diagram.bass = io.read_i32()?;
    diagram.tonality = read_int_enum(io)?;
    diagram.add = io.read_bool()?;
    chord.name = io.read_byte_size_string(CHORD_NAME_SLOT)?;
    diagram.fifth = read_int_enum(io)?;
    diagram.ninth = read_int_enum(io)?;
    diagram.eleventh = read_int_enum(io)?;
    chord.first_fret = io.read_i32()?;
    for fret in chord.strings.iter_mut().take(OLD_CHORD_STRINGS) {
        *fret = io.read_i32()?;
    }
    let barre_count = io.read_count("barre")?;
    let frets = io.read_repeated(BARRE_SLOTS, |io| io.read_i32()).complete()?;
    let starts = io.read_repeated(BARRE_SLOTS, |io| io.read_i32()).complete()?;
    let ends = io.read_repeated(BARRE_SLOTS, |io| io.read_i32()).complete()?;
    diagram.barres = (0..barre_count.min(BARRE_SLOTS))
        .map(|i| Barre {
            fret: frets[i],
            start: starts[i],
            end: ends[i],
        })
        .collect();
    diagram.omissions = io.read_repeated(CHORD_STRINGS, |io| io.read_bool()).complete()?;
    io.skip(1)?;
    chord.diagram = Some(diagram);
    Ok(chord)
}

fn write_new_chord(_: &Layout, io: &mut GpWriter, chord: &Chord, diagram: &ChordDiagram) -> Result<()> {
    if diagram.barres.len() > BARRE_SLOTS {
        return Err(GpError::malformed(format!(
            "chord has {} barres, this version stores {BARRE_SLOTS}",
            diagram.barres.len()
        )));
    }
    io.write_bool(diagram.sharp)?;
    io.placeholder(3)?;
    io.write_i32(diagram.root)?;
    io.write_i32(diagram.kind.to_raw())?;
    io.write_i32(diagram.extension.to_raw())?;
    io.write_i32(diagram.bass)?;
    io.write_i32(diagram.tonality.to_raw())?;
    io.write_bool(diagram.add)?;
    io.write_byte_size_string(&chord.name, CHORD_NAME_SLOT)?;
    io.write_i32(diagram.fifth.to_raw())?;
    io.write_i32(diagram.ninth.to_raw())?;
    io.write_i32(diagram.eleventh.to_raw())?;
    io.write_i32(chord.first_fret)?;
    for index in 0..OLD_CHORD_STRINGS {
        io.write_i32(chord.fret(index))?;
    }
    io.write_i32(fit(diagram.barres.len(), "barre count")?)?;
    let barre = |index: usize| diagram.barres.get(index).copied().unwrap_or_default();
    for index in 0..BARRE_SLOTS {
        io.write_i32(barre(index).fret)?;
    }
    for index in 0..BARRE_SLOTS {
        io.write_i32(barre(index).start)?;
    }
    for index in 0..BARRE_SLOTS {
        io.write_i32(barre(index).end)?;
    }
    write_omissions(io, &diagram.omissions)?;
    io.placeholder(1)
}

pub(crate) fn write_omissions(io: &mut GpWriter, omissions: &[bool]) -> Result<()> {
    for index in 0..CHORD_STRINGS {
        io.write_bool(omissions.get(index).copied().unwrap_or(true))?;
    }
    Ok(())
}

// Mix table

/// A signed byte value where negative means "unchanged"
pub(crate) fn read_mix_item(io: &mut GpReader) -> Result<Option<MixTableItem>> {
    let value = io.read_i8()?;
    Ok((value >= 0).then(|| MixTableItem::new(value.into())))
}

pub(crate) fn write_mix_item(io: &mut GpWriter, item: &Option<MixTableItem>) -> Result<()> {
    match item {
        Some(item) => io.write_i8(fit(item.value, "mix table value")?),
        None => io.write_i8(-1),
    }
}

pub(crate) fn read_mix_tempo(io: &mut GpReader) -> Result<Option<MixTableItem>> {
    let tempo = io.read_i32()?;
    Ok((tempo >= 0).then(|| MixTableItem::new(tempo)))
}

pub(crate) fn write_mix_tempo(io: &mut GpWriter, tempo: &Option<MixTableItem>) -> Result<()> {
    io.write_i32(tempo.map_or(-1, |item| item.value))
}

/// Transition durations for the present volume items and the tempo
pub(crate) fn read_mix_table_durations(io: &mut GpReader, change: &mut MixTableChange) -> Result<()> {
    for item in change.volume_items_mut().into_iter().flatten() {
        item.duration = io.read_i8()?;
    }
    if let Some(tempo) = &mut change.tempo {
        tempo.duration = io.read_i8()?;
    }
    Ok(())
}

pub(crate) fn write_mix_table_durations(io: &mut GpWriter, change: &MixTableChange) -> Result<()> {
    for item in change.volume_items().iter().flatten() {
        io.write_i8(item.duration)?;
    }
    if let Some(tempo) = &change.tempo {
        io.write_i8(tempo.duration)?;
    }
    Ok(())
}

/// All-tracks bits for the volume items; the remaining bits are returned
pub(crate) fn read_mix_table_flags(io: &mut GpReader, change: &mut MixTableChange) -> Result<u8> {
    let flags = io.read_i8()? as u8;
    for (bit, slot) in change.volume_items_mut().into_iter().enumerate() {
        if let Some(item) = slot {
            item.all_tracks = flags & (1 << bit) != 0;
        }
    }
    Ok(flags)
}

pub(crate) fn write_mix_table_flags(io: &mut GpWriter, change: &MixTableChange, extra: u8) -> Result<()> {
    let mut flags = extra;
    for (bit, item) in change.volume_items().iter().enumerate() {
        if item.map_or(false, |item| item.all_tracks) {
            flags |= 1 << bit;
        }
    }
    io.write_i8(flags as i8)
}

fn read_mix_table_change(_: &Layout, io: &mut GpReader) -> Result<MixTableChange> {
    let mut change = MixTableChange {
        instrument: read_mix_item(io)?,
        ..MixTableChange::default()
    };
    for slot in change.volume_items_mut() {
        *slot = read_mix_item(io)?;
    }
    change.tempo = read_mix_tempo(io)?;
    read_mix_table_durations(io, &mut change)?;
    Ok(change)
}

fn write_mix_table_change(_: &Layout, io: &mut GpWriter, change: &MixTableChange) -> Result<()> {
    write_mix_item(io, &change.instrument)?;
    for item in &change.volume_items() {
        write_mix_item(io, item)?;
    }
    write_mix_tempo(io, &change.tempo)?;
    write_mix_table_durations(io, change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::registry::GP3_TAG;
    use crate::format::Registry;
    use encoding_rs::WINDOWS_1252;

    fn encode(f: impl FnOnce(&mut GpWriter) -> Result<()>) -> Vec<u8> {
        let mut out = Vec::new();
        let mut io = GpWriter::new(&mut out, WINDOWS_1252);
        let (version, _) = Registry::new().resolve(GP3_TAG).unwrap();
        io.set_version(GP3_TAG, version);
        f(&mut io).unwrap();
        out
    }

    fn decode<T>(bytes: &[u8], f: impl FnOnce(&mut GpReader) -> Result<T>) -> T {
        let mut data = bytes;
        let mut io = GpReader::new(&mut data, WINDOWS_1252);
        f(&mut io).unwrap()
    }

    #[test]
    fn test_channel_short_scaling() {
        assert_eq!(to_channel_short(13), 104);
        assert_eq!(to_channel_short(0), 0);
        assert_eq!(to_channel_short(-5), 0);
        assert_eq!(from_channel_short(104), 13);
        assert_eq!(from_channel_short(0), 0);
        assert_eq!(from_channel_short(i16::MAX), 127);
    }

    #[test]
    fn test_repeat_alternative_masks_earlier_endings() {
        let mut opening = MeasureHeader::default();
        opening.is_repeat_open = true;
        let mut first = MeasureHeader::default();
        first.repeat_alternative = 0b01;
        let previous = vec![opening, first];

        let value = decode(&[2], |io| read_repeat_alternative(io, &previous));
        assert_eq!(value, 0b10);
    }

    #[test]
    fn test_header_inherits_time_signature() {
        let mut first = MeasureHeader::default();
        first.time_signature.numerator = 3;
        first.time_signature.denominator = 8;
        let bytes = encode(|io| write_measure_header(&LAYOUT, io, &first, None));
        assert_eq!(bytes, vec![0x03, 3, 8]);

        let second = decode(&[0x00], |io| read_measure_header(&LAYOUT, io, &[first.clone()]));
        assert_eq!(second.time_signature, first.time_signature);
    }

    #[test]
    fn test_tremolo_dip() {
        let bar = tremolo_dip(-100);
        assert_eq!(bar.kind, BendType::Dip);
        assert_eq!(bar.points[1], BendPoint::new(6, 2));
    }

    #[test]
    fn test_stroke_bytes() {
        let stroke = BeatStroke {
            direction: StrokeDirection::Down,
            value: 32,
        };
        assert_eq!(stroke_bytes(&stroke), (3, 0));
        assert_eq!(stroke_from_bytes(3, 0), stroke);
        assert_eq!(stroke_from_bytes(0, 0), BeatStroke::default());
    }

    #[test]
    fn test_duration_exponent() {
        let bytes = encode(|io| write_duration(io, &Duration::new(16), 0));
        assert_eq!(bytes, vec![2]);
        let duration = decode(&[0xfe], |io| read_duration(io, 0x01));
        assert_eq!(duration.value, 1);
        assert!(duration.is_dotted);
    }

    #[test]
    fn test_duration_out_of_range() {
        let mut data: &[u8] = &[5];
        let mut io = GpReader::new(&mut data, WINDOWS_1252);
        assert!(matches!(read_duration(&mut io, 0), Err(GpError::MalformedStructure(_))));
    }

    #[test]
    fn test_grace_duration() {
        assert_eq!(grace_duration(3).unwrap(), 16);
        assert_eq!(grace_duration_raw(16).unwrap(), 3);
        assert!(grace_duration(8).is_err());
        assert!(grace_duration_raw(12).is_err());
    }

    #[test]
    fn test_notes_written_by_string() {
        let track = Track::new("Guitar");
        let notes = vec![Note::new(5, 3), Note::new(2, 1)];
        let bytes = encode(|io| write_notes(&LAYOUT, io, &notes, &track));
        assert_eq!(bytes[0], 0b0010_0100);

        let read = decode(&bytes, |io| read_notes(&LAYOUT, io, &track, &NoteEffect::default()));
        assert_eq!(read.iter().map(|n| n.string).collect::<Vec<_>>(), vec![2, 5]);
        assert_eq!(read[1].value, 3);
    }

    #[test]
    fn test_duplicate_string_rejected() {
        let track = Track::new("Guitar");
        let notes = vec![Note::new(1, 3), Note::new(1, 5)];
        let mut out = Vec::new();
        let mut io = GpWriter::new(&mut out, WINDOWS_1252);
        assert!(write_notes(&LAYOUT, &mut io, &notes, &track).is_err());
    }

    #[test]
    fn test_beat_template_applies_to_notes() {
        let track = Track::new("Guitar");
        let mut note = Note::new(1, 0);
        note.effect.vibrato = true;
        note.effect.harmonic = Some(HarmonicEffect::Natural);
        let beat = Beat::new(Duration::default(), vec![note]);

        let bytes = encode(|io| write_beat(&LAYOUT, io, &beat, &track));
        let read = decode(&bytes, |io| read_beat(&LAYOUT, io, &track));
        assert_eq!(read, beat);
    }

    #[test]
    fn test_mix_table_change() {
        let change = MixTableChange {
            instrument: Some(MixTableItem::new(30)),
            volume: Some(MixTableItem {
                value: 12,
                duration: 2,
                all_tracks: false,
            }),
            tempo: Some(MixTableItem {
                value: 90,
                duration: 1,
                all_tracks: false,
            }),
            ..MixTableChange::default()
        };
        let bytes = encode(|io| write_mix_table_change(&LAYOUT, io, &change));
        assert_eq!(bytes.len(), 7 + 4 + 2);
        let read = decode(&bytes, |io| read_mix_table_change(&LAYOUT, io));
        assert_eq!(read, change);
    }

    #[test]
    fn test_old_chord() {
        let mut chord = Chord::new("E");
        chord.first_fret = 1;
        chord.strings = vec![0, 0, 1, 2, 2, 0, -1];
        let bytes = encode(|io| write_chord(&LAYOUT, io, &chord));
        let read = decode(&bytes, |io| read_chord(&LAYOUT, io));
        assert_eq!(read, chord);
    }

    #[test]
    fn test_new_chord() {
        let mut chord = Chord::new("Am7");
        chord.first_fret = 1;
        chord.strings = vec![0, 1, 0, 2, 0, -1, -1];
        chord.diagram = Some(ChordDiagram {
            root: 9,
            kind: crate::models::ChordType::MinorSeventh,
            barres: vec![Barre {
                fret: 1,
                start: 1,
                end: 2,
            }],
            ..ChordDiagram::default()
        });
        let bytes = encode(|io| write_chord(&LAYOUT, io, &chord));
        let read = decode(&bytes, |io| read_chord(&LAYOUT, io));
        assert_eq!(read, chord);
    }

    #[test]
    fn test_track_channel_outside_table_uses_defaults() {
        let channels: Vec<MidiChannel> = (0..CHANNEL_COUNT as i32).map(MidiChannel::new).collect();
        for (index, effect) in [(0i32, 2i32), (99, 5)] {
            let mut bytes = index.to_le_bytes().to_vec();
            bytes.extend_from_slice(&effect.to_le_bytes());
            let channel = decode(&bytes, |io| read_track_channel(io, &channels));
            assert_eq!(channel.channel, 0);
            assert_eq!(channel.instrument, 25);
            assert_eq!(channel.volume, 104);
            assert_eq!(channel.balance, 64);
            assert_eq!(channel.effect_channel, effect - 1);
        }
    }

    #[test]
    fn test_track_channel_inside_table() {
        let channels: Vec<MidiChannel> = (0..CHANNEL_COUNT as i32).map(MidiChannel::new).collect();
        let mut bytes = 3i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&4i32.to_le_bytes());
        let channel = decode(&bytes, |io| read_track_channel(io, &channels));
        assert_eq!(channel.channel, 2);
        assert_eq!(channel.effect_channel, 3);
    }
}
