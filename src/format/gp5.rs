// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Guitar Pro 5 layout (5.00 and 5.10).
//!
//! Adds the RSE sound engine blocks, page setup, direction signs, a second
//! voice per measure and per-beat display flags. Fields marked "5.10" are
//! only present when the stream version is newer than 5.00.

use tracing::warn;

use super::{gp3, gp4, Layout, Version};
use crate::error::{fit, GpError, Result};
use crate::io::{GpReader, GpWriter, Located, OrTruncated, Unit};
use crate::models::measure::VOICE_COUNT;
use crate::models::{
    Beat, BeatDisplay, BeatStroke, Directions, GraceEffect, GuitarString, HarmonicEffect, KeySignature,
    LineBreak, Measure, MeasureHeader, MidiChannel, MixTableChange, MixTableExtras, Note, NoteEffect,
    NoteType, Octave, PageSetup, Padding, PitchClass, Point, RseEqualizer, RseInstrument, RseMasterEffect,
    SlideType, Song, TimeIndependentDuration, Track, TrackRse, TrackSettings, TupletBracket, Velocities,
    Voice, VoiceDirection, WireEnum,
};

pub const LAYOUT: Layout = Layout {
    read_song,
    write_song,
    read_info,
    write_info,
    read_measure_header,
    write_measure_header,
    read_tracks,
    write_tracks,
    read_track,
    write_track,
    read_measure,
    write_measure,
    read_beat,
    write_beat,
    read_beat_stroke,
    write_beat_stroke,
    read_note,
    write_note,
    read_grace,
    write_grace,
    read_slides,
    write_slides,
    read_harmonic,
    write_harmonic,
    read_mix_table_change,
    write_mix_table_change,
    ..gp4::LAYOUT
};

const DEFAULT_TEMPO_NAME: &str = "Moderate";
const DEFAULT_BEAMS: [u8; 4] = [2, 2, 2, 2];
const MASTER_EQUALIZER_KNOBS: usize = 11;
const TRACK_EQUALIZER_KNOBS: usize = 4;
const DEFAULT_MASTER_VOLUME: i32 = 100;

fn is_newer(version: Version) -> bool {
    version > Version::new(5, 0)
}

// Song

fn read_song(layout: &Layout, io: &mut GpReader) -> Result<Song> {
    io.read_version()?;
    let newer = is_newer(io.version());
    let mut song = Song::default();
    (layout.read_info)(layout, io, &mut song)?;
    song.lyrics = Some(gp4::read_lyrics(io)?);
    let mut master = if newer {
        read_master_effect(io)?
    } else {
        RseMasterEffect::default()
    };
    song.page_setup = Some(read_page_setup(io)?);
    song.tempo_name = Some(io.read_int_byte_size_string()?);
    song.tempo = io.read_i32()?;
    if newer {
        song.hide_tempo = Some(io.read_bool()?);
    }
    song.key = KeySignature::new(io.read_i8()?, false);
    // octave, unused
    io.read_i32()?;
    let channels = gp3::read_midi_channels(io)?;
    song.directions = Some(read_directions(io)?);
    master.reverb = io.read_i32()?;
    song.master_effect = Some(master);
    gp3::read_song_content(layout, io, &mut song, &channels, None)?;
    Ok(song)
}

fn write_song(layout: &Layout, io: &mut GpWriter, song: &Song) -> Result<()> {
    let newer = is_newer(io.version());
    let master = song.master_effect.clone().unwrap_or_default();
    gp3::write_version_tag(io)?;
    (layout.write_info)(layout, io, song)?;
    gp4::write_lyrics(io, song.lyrics.as_ref())?;
    if newer {
        write_master_effect(io, &master)?;
    }
    write_page_setup(io, &song.page_setup.clone().unwrap_or_default())?;
    io.write_int_byte_size_string(song.tempo_name.as_deref().unwrap_or(DEFAULT_TEMPO_NAME))?;
    io.write_i32(song.tempo)?;
    if newer {
        io.write_bool(song.hide_tempo.unwrap_or(false))?;
    }
    io.write_i8(song.key.key)?;
    io.write_i32(0)?;
    gp3::write_midi_channels(io, &song.tracks)?;
    write_directions(io, &song.directions.unwrap_or_default())?;
    io.write_i32(master.reverb)?;
    gp3::write_song_content(layout, io, song)
}

fn read_info(_: &Layout, io: &mut GpReader, song: &mut Song) -> Result<()> {
    song.title = io.read_int_byte_size_string()?;
    song.subtitle = io.read_int_byte_size_string()?;
    song.artist = io.read_int_byte_size_string()?;
    song.album = io.read_int_byte_size_string()?;
    song.words = io.read_int_byte_size_string()?;
    song.music = Some(io.read_int_byte_size_string()?);
    song.copyright = io.read_int_byte_size_string()?;
    song.tab = io.read_int_byte_size_string()?;
    song.instructions = io.read_int_byte_size_string()?;
    song.notice = gp3::read_notice(io)?;
    Ok(())
}

fn write_info(_: &Layout, io: &mut GpWriter, song: &Song) -> Result<()> {
    let music = song.music.as_deref().unwrap_or_default();
    for text in [
        song.title.as_str(),
        song.subtitle.as_str(),
        song.artist.as_str(),
        song.album.as_str(),
        song.words.as_str(),
        music,
        song.copyright.as_str(),
        song.tab.as_str(),
        song.instructions.as_str(),
    ] {
        io.write_int_byte_size_string(text)?;
    }
    gp3::write_notice(io, &song.notice)
}

fn read_master_effect(io: &mut GpReader) -> Result<RseMasterEffect> {
    let volume = io.read_i32()?;
    io.read_i32()?;
    let equalizer = read_equalizer(io, MASTER_EQUALIZER_KNOBS)?;
    Ok(RseMasterEffect {
        volume: Some(volume),
        equalizer: Some(equalizer),
        reverb: 0,
    })
}

fn write_master_effect(io: &mut GpWriter, master: &RseMasterEffect) -> Result<()> {
    io.write_i32(master.volume.unwrap_or(DEFAULT_MASTER_VOLUME))?;
    io.write_i32(0)?;
    write_equalizer(io, master.equalizer.as_ref(), MASTER_EQUALIZER_KNOBS)
}

/// Knob values are stored as tenths of a dB, negated; the last knob is the gain
pub(crate) fn read_equalizer(io: &mut GpReader, knob_count: usize) -> Result<RseEqualizer> {
    let mut knobs = io
        .read_repeated(knob_count, |io| Ok(-f32::from(io.read_i8()?) / 10.0))
        .complete()?;
    let gain = knobs.pop().unwrap_or_default();
    Ok(RseEqualizer { knobs, gain })
}

fn pack_equalizer_value(value: f32) -> Result<i8> {
    fit((-value * 10.0).round() as i32, "equalizer knob")
}

pub(crate) fn write_equalizer(io: &mut GpWriter, equalizer: Option<&RseEqualizer>, knob_count: usize) -> Result<()> {
    let flat = RseEqualizer {
        knobs: vec![0.0; knob_count - 1],
        gain: 0.0,
    };
    let equalizer = equalizer.unwrap_or(&flat);
    if equalizer.knobs.len() != knob_count - 1 {
        return Err(GpError::malformed(format!(
            "equalizer has {} knobs, expected {}",
            equalizer.knobs.len(),
            knob_count - 1
        )));
    }
    for &value in equalizer.knobs.iter().chain(std::iter::once(&equalizer.gain)) {
        io.write_i8(pack_equalizer_value(value)?)?;
    }
    Ok(())
}

fn read_page_setup(io: &mut GpReader) -> Result<PageSetup> {
    let page_size = Point {
        x: io.read_i32()?,
        y: io.read_i32()?,
    };
    let margin = Padding {
        left: io.read_i32()?,
        right: io.read_i32()?,
        top: io.read_i32()?,
        bottom: io.read_i32()?,
    };
    let score_size_proportion = io.read_i32()? as f32 / 100.0;
    let header_and_footer = io.read_i16()? as u16;
    Ok(PageSetup {
        page_size,
        margin,
        score_size_proportion,
        header_and_footer,
        title: io.read_int_byte_size_string()?,
        subtitle: io.read_int_byte_size_string()?,
        artist: io.read_int_byte_size_string()?,
        album: io.read_int_byte_size_string()?,
        words: io.read_int_byte_size_string()?,
        music: io.read_int_byte_size_string()?,
        words_and_music: io.read_int_byte_size_string()?,
        copyright: io.read_int_byte_size_string()?,
        copyright_second_line: io.read_int_byte_size_string()?,
        page_number: io.read_int_byte_size_string()?,
    })
}

fn write_page_setup(io: &mut GpWriter, setup: &PageSetup) -> Result<()> {
    io.write_i32(setup.page_size.x)?;
    io.write_i32(setup.page_size.y)?;
    io.write_i32(setup.margin.left)?;
    io.write_i32(setup.margin.right)?;
    io.write_i32(setup.margin.top)?;
    io.write_i32(setup.margin.bottom)?;
    io.write_i32((setup.score_size_proportion * 100.0).round() as i32)?;
    io.write_i16(setup.header_and_footer as i16)?;
    for text in [
        &setup.title,
        &setup.subtitle,
        &setup.artist,
        &setup.album,
        &setup.words,
        &setup.music,
        &setup.words_and_music,
        &setup.copyright,
        &setup.copyright_second_line,
        &setup.page_number,
    ] {
        io.write_int_byte_size_string(text)?;
    }
    Ok(())
}

fn read_directions(io: &mut GpReader) -> Result<Directions> {
    let mut directions = Directions::default();
    for sign in directions.signs.iter_mut() {
        *sign = io.read_i16()?;
    }
    Ok(directions)
}

fn write_directions(io: &mut GpWriter, directions: &Directions) -> Result<()> {
    for &sign in &directions.signs {
        io.write_i16(sign)?;
    }
    Ok(())
}

// Measure headers

fn read_measure_header(_: &Layout, io: &mut GpReader, previous: &[MeasureHeader]) -> Result<MeasureHeader> {
    if !previous.is_empty() {
        io.skip(1)?;
    }
    let flags = io.read_u8()?;
    let mut header = gp3::inherited_header(previous);
    if flags & 0x01 != 0 {
        header.time_signature.numerator = io.read_i8()?;
    }
    if flags & 0x02 != 0 {
        header.time_signature.denominator = io.read_i8()?;
    }
    header.is_repeat_open = flags & 0x04 != 0;
    if flags & 0x08 != 0 {
        header.repeat_close = io.read_i8()?.wrapping_sub(1);
    }
    if flags & 0x20 != 0 {
        header.marker = Some(gp3::read_marker(io)?);
    }
    if flags & 0x10 != 0 {
        header.repeat_alternative = io.read_u8()?;
    }
    if flags & 0x40 != 0 {
        header.key_signature = gp3::read_key_signature(io)?;
    }
    header.has_double_bar = flags & 0x80 != 0;
    if flags & 0x03 != 0 {
        let mut beams = [0u8; 4];
        for beam in beams.iter_mut() {
            *beam = io.read_u8()?;
        }
        header.time_signature.beams = Some(beams);
    } else if header.time_signature.beams.is_none() {
        header.time_signature.beams = Some(DEFAULT_BEAMS);
    }
    if flags & 0x10 == 0 {
        io.skip(1)?;
    }
    header.triplet_feel = io.read_enum()?;
    Ok(header)
}

fn write_measure_header(
    _: &Layout,
    io: &mut GpWriter,
    header: &MeasureHeader,
    previous: Option<&MeasureHeader>,
) -> Result<()> {
    if previous.is_some() {
        io.placeholder(1)?;
    }
    let mut flags = gp3::header_flags(header, previous);
    let beams = header.time_signature.beams.unwrap_or(DEFAULT_BEAMS);
    let previous_beams = previous.map(|p| p.time_signature.beams.unwrap_or(DEFAULT_BEAMS));
    if previous_beams.is_some_and(|previous| previous != beams) {
        flags |= 0x01;
    }

    io.write_u8(flags)?;
    if flags & 0x01 != 0 {
        io.write_i8(header.time_signature.numerator)?;
    }
    if flags & 0x02 != 0 {
        io.write_i8(header.time_signature.denominator)?;
    }
    if flags & 0x08 != 0 {
        io.write_i8(header.repeat_close.wrapping_add(1))?;
    }
    if let Some(marker) = &header.marker {
        gp3::write_marker(io, marker)?;
    }
    if flags & 0x10 != 0 {
        io.write_u8(header.repeat_alternative)?;
    }
    if flags & 0x40 != 0 {
        gp3::write_key_signature(io, &header.key_signature)?;
    }
    if flags & 0x03 != 0 {
        for beam in beams {
            io.write_u8(beam)?;
        }
    }
    if flags & 0x10 == 0 {
        io.placeholder(1)?;
    }
    io.write_u8(header.triplet_feel.to_raw())
}

// Tracks

fn trailing_track_bytes(version: Version) -> usize {
    if is_newer(version) {
        1
    } else {
        2
    }
}

fn read_tracks(layout: &Layout, io: &mut GpReader, count: usize, channels: &[MidiChannel]) -> Result<Vec<Track>> {
    let tracks = (gp4::LAYOUT.read_tracks)(layout, io, count, channels)?;
    io.skip(trailing_track_bytes(io.version()))?;
    Ok(tracks)
}

fn write_tracks(layout: &Layout, io: &mut GpWriter, tracks: &[Track]) -> Result<()> {
    (gp4::LAYOUT.write_tracks)(layout, io, tracks)?;
    io.placeholder(trailing_track_bytes(io.version()))
}

fn has_leading_byte(number: usize, version: Version) -> bool {
    number == 1 || !is_newer(version)
}

fn read_track(_: &Layout, io: &mut GpReader, number: usize, channels: &[MidiChannel]) -> Result<Track> {
    if has_leading_byte(number, io.version()) {
        io.skip(1)?;
    }
    let flags1 = io.read_u8()?;
    let mut track = gp3::track_from_flags(flags1);
    let mut settings = TrackSettings {
        visible: flags1 & 0x08 != 0,
        solo: flags1 & 0x10 != 0,
        mute: flags1 & 0x20 != 0,
        use_rse: flags1 & 0x40 != 0,
        indicate_tuning: flags1 & 0x80 != 0,
        ..TrackSettings::default()
    };
    gp3::read_track_body(io, &mut track, channels)?;

    let flags2 = io.read_i16()? as u16;
    settings.tablature = flags2 & 0x0001 != 0;
    settings.notation = flags2 & 0x0002 != 0;
    settings.diagrams_are_below = flags2 & 0x0004 != 0;
    settings.show_rhythm = flags2 & 0x0008 != 0;
    settings.force_horizontal = flags2 & 0x0010 != 0;
    settings.force_channels = flags2 & 0x0020 != 0;
    settings.diagram_list = flags2 & 0x0040 != 0;
    settings.diagrams_in_score = flags2 & 0x0080 != 0;
    settings.auto_let_ring = flags2 & 0x0200 != 0;
    settings.auto_brush = flags2 & 0x0800 != 0;
    settings.extend_rhythmic = flags2 & 0x1000 != 0;
    settings.auto_accentuation = io.read_enum()?;
    track.channel.bank = Some(io.read_u8()?);
    track.rse = Some(read_track_rse(io)?);
    track.settings = Some(settings);
    Ok(track)
}

fn write_track(_: &Layout, io: &mut GpWriter, track: &Track, number: usize) -> Result<()> {
    if has_leading_byte(number, io.version()) {
        io.placeholder(1)?;
    }
    let settings = track.settings.unwrap_or_default();
    let mut flags1 = gp3::track_flags(track);
    for (set, bit) in [
        (settings.visible, 0x08),
        (settings.solo, 0x10),
        (settings.mute, 0x20),
        (settings.use_rse, 0x40),
        (settings.indicate_tuning, 0x80),
    ] {
        if set {
            flags1 |= bit;
        }
    }
    io.write_u8(flags1)?;
    gp3::write_track_body(io, track)?;

    let mut flags2 = 0u16;
    for (set, bit) in [
        (settings.tablature, 0x0001),
        (settings.notation, 0x0002),
        (settings.diagrams_are_below, 0x0004),
        (settings.show_rhythm, 0x0008),
        (settings.force_horizontal, 0x0010),
        (settings.force_channels, 0x0020),
        (settings.diagram_list, 0x0040),
        (settings.diagrams_in_score, 0x0080),
        (settings.auto_let_ring, 0x0200),
        (settings.auto_brush, 0x0800),
        (settings.extend_rhythmic, 0x1000),
    ] {
        if set {
            flags2 |= bit;
        }
    }
    io.write_i16(flags2 as i16)?;
    io.write_u8(settings.auto_accentuation.to_raw())?;
    io.write_u8(track.channel.bank.unwrap_or(0))?;
    write_track_rse(io, &track.rse.clone().unwrap_or_default())
}

fn read_track_rse(io: &mut GpReader) -> Result<TrackRse> {
    let humanize = io.read_u8()?;
    io.skip(24)?;
    let mut instrument = read_rse_instrument(io)?;
    let mut equalizer = None;
    if is_newer(io.version()) {
        equalizer = Some(read_equalizer(io, TRACK_EQUALIZER_KNOBS)?);
        read_rse_instrument_effect(io, &mut instrument)?;
    }
    Ok(TrackRse {
        humanize,
        instrument,
        equalizer,
    })
}

fn write_track_rse(io: &mut GpWriter, rse: &TrackRse) -> Result<()> {
    io.write_u8(rse.humanize)?;
    io.placeholder(24)?;
    write_rse_instrument(io, &rse.instrument)?;
    if is_newer(io.version()) {
        write_equalizer(io, rse.equalizer.as_ref(), TRACK_EQUALIZER_KNOBS)?;
        write_rse_instrument_effect(io, &rse.instrument)?;
    }
    Ok(())
}

fn read_rse_instrument(io: &mut GpReader) -> Result<RseInstrument> {
    let mut instrument = RseInstrument {
        instrument: io.read_i32()?,
        unknown: io.read_i32()?,
        sound_bank: io.read_i32()?,
        ..RseInstrument::default()
    };
    if is_newer(io.version()) {
        instrument.effect_number = io.read_i32()?;
    } else {
        instrument.effect_number = io.read_i16()?.into();
        io.skip(1)?;
    }
    Ok(instrument)
}

fn write_rse_instrument(io: &mut GpWriter, instrument: &RseInstrument) -> Result<()> {
    io.write_i32(instrument.instrument)?;
    io.write_i32(instrument.unknown)?;
    io.write_i32(instrument.sound_bank)?;
    if is_newer(io.version()) {
        io.write_i32(instrument.effect_number)
    } else {
        io.write_i16(fit(instrument.effect_number, "RSE effect number")?)?;
        io.placeholder(1)
    }
}

fn read_rse_instrument_effect(io: &mut GpReader, instrument: &mut RseInstrument) -> Result<()> {
    instrument.effect = Some(io.read_int_byte_size_string()?);
    instrument.effect_category = Some(io.read_int_byte_size_string()?);
    Ok(())
}

fn write_rse_instrument_effect(io: &mut GpWriter, instrument: &RseInstrument) -> Result<()> {
    io.write_int_byte_size_string(instrument.effect.as_deref().unwrap_or_default())?;
    io.write_int_byte_size_string(instrument.effect_category.as_deref().unwrap_or_default())
}

// Measures

fn read_measure(layout: &Layout, io: &mut GpReader, track: &Track) -> Result<Measure> {
    let voices = (1..=VOICE_COUNT)
        .map(|number| io.scoped(Unit::Voice, number, |io| (layout.read_voice)(layout, io, track)))
        .collect::<Result<Vec<_>>>()?;
    let line_break = io.read_enum().or_truncated(LineBreak::None)?;
    Ok(Measure {
        voices,
        line_break: Some(line_break),
    })
}

fn write_measure(layout: &Layout, io: &mut GpWriter, measure: &Measure, track: &Track) -> Result<()> {
    let empty = Voice::default();
    for index in 0..VOICE_COUNT {
        let voice = measure.voices.get(index).unwrap_or(&empty);
        io.scoped(Unit::Voice, index + 1, |io| (layout.write_voice)(layout, io, voice, track))?;
    }
    io.write_u8(measure.line_break.unwrap_or(LineBreak::None).to_raw())
}

// Beats

fn octave_bits(octave: Octave) -> u16 {
    match octave {
        Octave::Ottava => 0x0010,
        Octave::OttavaBassa => 0x0020,
        Octave::Quindicesima => 0x0040,
        Octave::QuindicesimaBassa => 0x0100,
        Octave::None => 0,
        Octave::Unknown(raw) => {
            warn!(raw, "octave sign has no display flag and was dropped");
            0
        }
    }
}

fn read_beat(layout: &Layout, io: &mut GpReader, track: &Track) -> Result<Beat> {
    let mut beat = (gp4::LAYOUT.read_beat)(layout, io, track)?;
    let flags = io.read_i16()? as u16;
    let mut display = BeatDisplay {
        break_beam: flags & 0x0001 != 0,
        force_beam: flags & 0x0004 != 0,
        break_secondary_tuplet: flags & 0x1000 != 0,
        force_bracket: flags & 0x2000 != 0,
        ..BeatDisplay::default()
    };
    if flags & 0x0002 != 0 {
        display.beam_direction = VoiceDirection::Down;
    }
    if flags & 0x0008 != 0 {
        display.beam_direction = VoiceDirection::Up;
    }
    let octave = [
        Octave::Ottava,
        Octave::OttavaBassa,
        Octave::Quindicesima,
        Octave::QuindicesimaBassa,
    ]
    .into_iter()
    .find(|&octave| flags & octave_bits(octave) != 0)
    .unwrap_or(Octave::None);
    if flags & 0x0200 != 0 {
        display.tuplet_bracket = TupletBracket::Start;
    }
    if flags & 0x0400 != 0 {
        display.tuplet_bracket = TupletBracket::End;
    }
    if flags & 0x0800 != 0 {
        display.break_secondary = io.read_u8()?;
    }
    beat.octave = Some(octave);
    beat.display = Some(display);
    Ok(beat)
}

fn write_beat(layout: &Layout, io: &mut GpWriter, beat: &Beat, track: &Track) -> Result<()> {
    (gp4::LAYOUT.write_beat)(layout, io, beat, track)?;
    let display = beat.display.unwrap_or_default();
    let mut flags = octave_bits(beat.octave.unwrap_or(Octave::None));
    if display.break_beam {
        flags |= 0x0001;
    }
    match display.beam_direction {
        VoiceDirection::Down => flags |= 0x0002,
        VoiceDirection::Up => flags |= 0x0008,
        _ => {}
    }
    if display.force_beam {
        flags |= 0x0004;
    }
    match display.tuplet_bracket {
        TupletBracket::Start => flags |= 0x0200,
        TupletBracket::End => flags |= 0x0400,
        _ => {}
    }
    if display.break_secondary != 0 {
        flags |= 0x0800;
    }
    if display.break_secondary_tuplet {
        flags |= 0x1000;
    }
    if display.force_bracket {
        flags |= 0x2000;
    }
    io.write_i16(flags as i16)?;
    if flags & 0x0800 != 0 {
        io.write_u8(display.break_secondary)?;
    }
    Ok(())
}

/// Up speed comes first in this version; a set down speed wins
fn read_beat_stroke(_: &Layout, io: &mut GpReader) -> Result<BeatStroke> {
    let up = io.read_i8()?;
    let down = io.read_i8()?;
    if down > 0 {
        Ok(gp3::stroke_from_bytes(down, 0))
    } else {
        Ok(gp3::stroke_from_bytes(0, up))
    }
}

fn write_beat_stroke(_: &Layout, io: &mut GpWriter, stroke: &BeatStroke) -> Result<()> {
    let (down, up) = gp3::stroke_bytes(stroke);
    io.write_i8(up)?;
    io.write_i8(down)
}

// Notes

fn read_note(layout: &Layout, io: &mut GpReader, string: &GuitarString, effect: NoteEffect) -> Result<Note> {
    let flags = io.read_u8()?;
    let mut note = Note {
        string: string.number,
        effect,
        ..Note::default()
    };
    note.effect.heavy_accentuated_note = flags & 0x02 != 0;
    note.effect.ghost_note = flags & 0x04 != 0;
    note.effect.accentuated_note = flags & 0x40 != 0;
    if flags & 0x20 != 0 {
        note.kind = io.read_enum()?;
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
    if flags & 0x01 != 0 {
        note.duration_percent = Some(io.read_f64()?);
    }
    let flags2 = io.read_u8()?;
    note.swap_accidentals = Some(flags2 & 0x02 != 0);
    if flags & 0x08 != 0 {
        (layout.read_note_effects)(layout, io, &mut note, string)?;
    }
    Ok(note)
}

fn write_note(layout: &Layout, io: &mut GpWriter, note: &Note, string: &GuitarString) -> Result<()> {
    if let Some(TimeIndependentDuration { duration, tuplet }) = note.time_independent {
        warn!(location = %io.location(), duration, tuplet, "time-independent duration is not stored by this version");
    }
    let effect = &note.effect;
    let mut flags = 0u8;
    for (set, bit) in [
        (note.duration_percent.is_some(), 0x01),
        (effect.heavy_accentuated_note, 0x02),
        (effect.ghost_note, 0x04),
        ((layout.has_note_effects)(effect), 0x08),
        (note.velocity != Velocities::DEFAULT, 0x10),
        (note.kind != NoteType::Rest, 0x20),
        (effect.accentuated_note, 0x40),
        (effect.has_fingering(), 0x80),
    ] {
        if set {
            flags |= bit;
        }
    }

    io.write_u8(flags)?;
    if flags & 0x20 != 0 {
        io.write_u8(note.kind.to_raw())?;
    }
    if flags & 0x10 != 0 {
        io.write_i8(fit(Velocities::pack(note.velocity), "velocity")?)?;
    }
    if flags & 0x20 != 0 {
        io.write_i8(fit(note.value, "fret")?)?;
    }
    if flags & 0x80 != 0 {
        io.write_i8(effect.left_hand_finger.to_raw())?;
        io.write_i8(effect.right_hand_finger.to_raw())?;
    }
    if let Some(percent) = note.duration_percent {
        io.write_f64(percent)?;
    }
    io.write_u8(if note.swap_accidentals.unwrap_or(false) { 0x02 } else { 0 })?;
    if flags & 0x08 != 0 {
        (layout.write_note_effects)(layout, io, note, string)?;
    }
    Ok(())
}

fn read_grace(_: &Layout, io: &mut GpReader) -> Result<GraceEffect> {
    let fret = io.read_u8()? as i8;
    let velocity = Velocities::unpack(io.read_u8()?.into());
    let transition = io.read_u8()? as i8;
    let transition = io.wire(transition);
    let duration = gp3::grace_duration(io.read_u8()?)?;
    let flags = io.read_u8()?;
    Ok(GraceEffect {
        fret,
        velocity,
        duration,
        transition,
        is_dead: flags & 0x01 != 0,
        is_on_beat: flags & 0x02 != 0,
    })
}

fn write_grace(_: &Layout, io: &mut GpWriter, grace: &GraceEffect) -> Result<()> {
    io.write_u8(grace.fret as u8)?;
    io.write_u8(fit(Velocities::pack(grace.velocity), "grace velocity")?)?;
    io.write_u8(grace.transition.to_raw() as u8)?;
    io.write_u8(gp3::grace_duration_raw(grace.duration)?)?;
    let mut flags = 0u8;
    if grace.is_dead {
        flags |= 0x01;
    }
    if grace.is_on_beat {
        flags |= 0x02;
    }
    io.write_u8(flags)
}

const SLIDE_BITS: [(u8, SlideType); 6] = [
    (0x01, SlideType::ShiftSlideTo),
    (0x02, SlideType::LegatoSlideTo),
    (0x04, SlideType::OutDownwards),
    (0x08, SlideType::OutUpwards),
    (0x10, SlideType::IntoFromBelow),
    (0x20, SlideType::IntoFromAbove),
];

/// Slides are a bit mask, so a note may carry several
fn read_slides(_: &Layout, io: &mut GpReader) -> Result<Vec<SlideType>> {
    let mask = io.read_u8()?;
    Ok(SLIDE_BITS
        .iter()
        .filter(|(bit, _)| mask & bit != 0)
        .map(|&(_, slide)| slide)
        .collect())
}

fn write_slides(_: &Layout, io: &mut GpWriter, slides: &[SlideType]) -> Result<()> {
    let mut mask = 0u8;
    for slide in slides {
        let bit = SLIDE_BITS
            .iter()
            .find(|(_, known)| known == slide)
            .map(|&(bit, _)| bit)
            .ok_or_else(|| GpError::malformed(format!("slide {slide:?} has no stored form")))?;
        mask |= bit;
    }
    io.write_u8(mask)
}

fn read_harmonic(_: &Layout, io: &mut GpReader, _: i32) -> Result<HarmonicEffect> {
    let harmonic = match io.read_i8()? {
        1 => HarmonicEffect::Natural,
        2 => {
            let just = io.read_u8()?;
            let accidental = io.read_i8()?;
            let octave = io.read_enum()?;
            HarmonicEffect::Artificial {
                pitch: Some(PitchClass { just, accidental }),
                octave: Some(octave),
            }
        }
        3 => HarmonicEffect::Tapped {
            fret: Some(io.read_u8()?),
        },
        4 => HarmonicEffect::Pinch,
        5 => HarmonicEffect::Semi,
        // The payload length of other codes is not known
        other => return Err(GpError::malformed(format!("harmonic type {other} is not defined"))),
    };
    Ok(harmonic)
}

/// Tapped harmonics default to twelve frets above the note
const DEFAULT_TAPPED_FRET: u8 = 12;

fn write_harmonic(_: &Layout, io: &mut GpWriter, harmonic: &HarmonicEffect, real_value: i32) -> Result<()> {
    match harmonic {
        HarmonicEffect::Natural => io.write_i8(1),
        HarmonicEffect::Artificial { pitch, octave } => {
            let pitch = pitch.unwrap_or_else(|| PitchClass::from_value(real_value));
            io.write_i8(2)?;
            io.write_u8(pitch.just)?;
            io.write_i8(pitch.accidental)?;
            io.write_u8(octave.unwrap_or(Octave::Ottava).to_raw())
        }
        HarmonicEffect::Tapped { fret } => {
            io.write_i8(3)?;
            io.write_u8(fret.unwrap_or(DEFAULT_TAPPED_FRET))
        }
        HarmonicEffect::Pinch => io.write_i8(4),
        HarmonicEffect::Semi => io.write_i8(5),
        HarmonicEffect::Unknown(code) => Err(GpError::malformed(format!(
            "harmonic type {code} has no stored form in this version"
        ))),
    }
}

// Mix table

fn read_mix_table_change(_: &Layout, io: &mut GpReader) -> Result<MixTableChange> {
    let newer = is_newer(io.version());
    let mut change = MixTableChange {
        instrument: gp3::read_mix_item(io)?,
        ..MixTableChange::default()
    };
    let mut extras = MixTableExtras {
        rse: read_rse_instrument(io)?,
        ..MixTableExtras::default()
    };
    if !newer {
        io.skip(1)?;
    }
    for slot in change.volume_items_mut() {
        *slot = gp3::read_mix_item(io)?;
    }
    change.tempo_name = Some(io.read_int_byte_size_string()?);
    change.tempo = gp3::read_mix_tempo(io)?;
    gp3::read_mix_table_durations(io, &mut change)?;
    if change.tempo.is_some() && newer {
        change.hide_tempo = Some(io.read_bool()?);
    }
    let flags = gp3::read_mix_table_flags(io, &mut change)?;
    extras.use_rse = flags & 0x40 != 0;
    extras.show_wah = flags & 0x80 != 0;
    extras.wah = io.read_i8()?;
    if newer {
        read_rse_instrument_effect(io, &mut extras.rse)?;
    }
    change.extras = Some(extras);
    Ok(change)
}

fn write_mix_table_change(_: &Layout, io: &mut GpWriter, change: &MixTableChange) -> Result<()> {
    let newer = is_newer(io.version());
    let extras = change.extras.clone().unwrap_or_default();
    gp3::write_mix_item(io, &change.instrument)?;
    write_rse_instrument(io, &extras.rse)?;
    if !newer {
        io.placeholder(1)?;
    }
    for item in &change.volume_items() {
        gp3::write_mix_item(io, item)?;
    }
    io.write_int_byte_size_string(change.tempo_name.as_deref().unwrap_or_default())?;
    gp3::write_mix_tempo(io, &change.tempo)?;
    gp3::write_mix_table_durations(io, change)?;
    if change.tempo.is_some() && newer {
        io.write_bool(change.hide_tempo.unwrap_or(false))?;
    }
    let mut flags = 0u8;
    if extras.use_rse {
        flags |= 0x40;
    }
    if extras.show_wah {
        flags |= 0x80;
    }
    gp3::write_mix_table_flags(io, change, flags)?;
    io.write_i8(extras.wah)?;
    if newer {
        write_rse_instrument_effect(io, &extras.rse)?;
    }
    Ok(())
}
