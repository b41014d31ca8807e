// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Guitar Pro 4 layout: lyrics, two-byte effect flags and richer chords.

use tracing::warn;

use super::{gp3, Layout};
use crate::error::{fit, GpError, Result};
use crate::io::{GpReader, GpWriter, Located};
use crate::models::chord::CHORD_STRINGS;
use crate::models::song::LYRIC_LINE_COUNT;
use crate::models::{
    Barre, Beat, BeatEffect, BendEffect, Chord, ChordDiagram, Fingering, GuitarString, HarmonicEffect,
    KeySignature, LyricLine, Lyrics, MixTableChange, Note, NoteEffect, Octave, PitchClass, SlapEffect,
    SlideType, Song, StrokeDirection, TremoloPickingEffect, TrillEffect, WireEnum,
};

pub const LAYOUT: Layout = Layout {
    read_song,
    write_song,
    has_beat_effects,
    read_beat_effects,
    write_beat_effects,
    read_tremolo_bar,
    write_tremolo_bar,
    has_note_effects,
    read_note_effects,
    write_note_effects,
    read_slides,
    write_slides,
    read_harmonic,
    write_harmonic,
    read_new_chord,
    write_new_chord,
    read_mix_table_change,
    write_mix_table_change,
    ..gp3::LAYOUT
};

fn read_song(layout: &Layout, io: &mut GpReader) -> Result<Song> {
    io.read_version()?;
    let mut song = Song::default();
    (layout.read_info)(layout, io, &mut song)?;
    let triplet_feel = gp3::read_triplet_feel(io)?;
    song.lyrics = Some(read_lyrics(io)?);
    song.tempo = io.read_i32()?;
    song.key = KeySignature::new(fit(io.read_i32()?, "key")?, false);
    // octave, unused
    io.read_i8()?;
    let channels = gp3::read_midi_channels(io)?;
    gp3::read_song_content(layout, io, &mut song, &channels, Some(triplet_feel))?;
    Ok(song)
}

fn write_song(layout: &Layout, io: &mut GpWriter, song: &Song) -> Result<()> {
    gp3::write_version_tag(io)?;
    (layout.write_info)(layout, io, song)?;
    gp3::write_triplet_feel(io, song)?;
    write_lyrics(io, song.lyrics.as_ref())?;
    io.write_i32(song.tempo)?;
    io.write_i32(song.key.key.into())?;
    io.write_i8(0)?;
    gp3::write_midi_channels(io, &song.tracks)?;
    gp3::write_song_content(layout, io, song)
}

/// Track choice followed by five (starting measure, text) lines
pub(crate) fn read_lyrics(io: &mut GpReader) -> Result<Lyrics> {
    let track_choice = io.read_i32()?;
    let lines = io
        .read_repeated(LYRIC_LINE_COUNT, |io| {
            let starting_measure = io.read_i32()?;
            let lyrics = io.read_int_size_string()?;
            Ok(LyricLine {
                starting_measure,
                lyrics,
            })
        })
        .complete()?;
    Ok(Lyrics { track_choice, lines })
}

pub(crate) fn write_lyrics(io: &mut GpWriter, lyrics: Option<&Lyrics>) -> Result<()> {
    let default = Lyrics::default();
    let lyrics = lyrics.unwrap_or(&default);
    if lyrics.lines.len() > LYRIC_LINE_COUNT {
        warn!(lines = lyrics.lines.len(), "only {} lyric lines are stored", LYRIC_LINE_COUNT);
    }
    io.write_i32(lyrics.track_choice)?;
    for index in 0..LYRIC_LINE_COUNT {
        match lyrics.lines.get(index) {
            Some(line) => {
                io.write_i32(line.starting_measure)?;
                io.write_int_size_string(&line.lyrics)?;
            }
            None => {
                io.write_i32(1)?;
                io.write_int_size_string("")?;
            }
        }
    }
    Ok(())
}

// Beat effects

fn beat_effect_flags(effect: &BeatEffect) -> (u8, u8) {
    let mut flags1 = 0u8;
    let mut flags2 = 0u8;
    if effect.vibrato {
        flags1 |= 0x02;
    }
    if effect.fade_in {
        flags1 |= 0x10;
    }
    if effect.slap_effect != SlapEffect::None {
        flags1 |= 0x20;
    }
    if effect.stroke.direction != StrokeDirection::None {
        flags1 |= 0x40;
    }
    if effect.has_rasgueado {
        flags2 |= 0x01;
    }
    if effect.pick_stroke != StrokeDirection::None {
        flags2 |= 0x02;
    }
    if effect.tremolo_bar.is_some() {
        flags2 |= 0x04;
    }
    (flags1, flags2)
}

fn has_beat_effects(beat: &Beat) -> bool {
    beat_effect_flags(&beat.effect) != (0, 0)
}

fn read_beat_effects(layout: &Layout, io: &mut GpReader, _: &mut NoteEffect) -> Result<BeatEffect> {
    let flags1 = io.read_u8()?;
    let flags2 = io.read_u8()?;
    let mut effect = BeatEffect {
        vibrato: flags1 & 0x02 != 0,
        fade_in: flags1 & 0x10 != 0,
        has_rasgueado: flags2 & 0x01 != 0,
        ..BeatEffect::default()
    };
    if flags1 & 0x20 != 0 {
        effect.slap_effect = io.read_signed_enum()?;
    }
    if flags2 & 0x04 != 0 {
        effect.tremolo_bar = Some((layout.read_tremolo_bar)(layout, io)?);
    }
    if flags1 & 0x40 != 0 {
        effect.stroke = (layout.read_beat_stroke)(layout, io)?;
    }
    if flags2 & 0x02 != 0 {
        effect.pick_stroke = io.read_signed_enum()?;
    }
    Ok(effect)
}

fn write_beat_effects(layout: &Layout, io: &mut GpWriter, beat: &Beat) -> Result<()> {
    let effect = &beat.effect;
    let (flags1, flags2) = beat_effect_flags(effect);
    io.write_u8(flags1)?;
    io.write_u8(flags2)?;
    if flags1 & 0x20 != 0 {
        io.write_i8(effect.slap_effect.to_raw())?;
    }
    if let Some(bar) = &effect.tremolo_bar {
        (layout.write_tremolo_bar)(layout, io, bar)?;
    }
    if flags1 & 0x40 != 0 {
        (layout.write_beat_stroke)(layout, io, &effect.stroke)?;
    }
    if flags2 & 0x02 != 0 {
        io.write_i8(effect.pick_stroke.to_raw())?;
    }
    Ok(())
}

/// The tremolo bar is stored as a full bend curve from here on
fn read_tremolo_bar(layout: &Layout, io: &mut GpReader) -> Result<BendEffect> {
    (layout.read_bend)(layout, io)
}

fn write_tremolo_bar(layout: &Layout, io: &mut GpWriter, bar: &BendEffect) -> Result<()> {
    (layout.write_bend)(layout, io, bar)
}

// Note effects

fn note_effect_flags(effect: &NoteEffect) -> (u8, u8) {
    let mut flags1 = 0u8;
    let mut flags2 = 0u8;
    if effect.bend.is_some() {
        flags1 |= 0x01;
    }
    if effect.hammer {
        flags1 |= 0x02;
    }
    if effect.let_ring {
        flags1 |= 0x08;
    }
    if effect.grace.is_some() {
        flags1 |= 0x10;
    }
    if effect.staccato {
        flags2 |= 0x01;
    }
    if effect.palm_mute {
        flags2 |= 0x02;
    }
    if effect.tremolo_picking.is_some() {
        flags2 |= 0x04;
    }
    if !effect.slides.is_empty() {
        flags2 |= 0x08;
    }
    if effect.harmonic.is_some() {
        flags2 |= 0x10;
    }
    if effect.trill.is_some() {
        flags2 |= 0x20;
    }
    if effect.vibrato {
        flags2 |= 0x40;
    }
    (flags1, flags2)
}

fn has_note_effects(effect: &NoteEffect) -> bool {
    note_effect_flags(effect) != (0, 0)
}

fn read_note_effects(layout: &Layout, io: &mut GpReader, note: &mut Note, string: &GuitarString) -> Result<()> {
    let flags1 = io.read_u8()?;
    let flags2 = io.read_u8()?;
    let effect = &mut note.effect;
    effect.hammer = flags1 & 0x02 != 0;
    effect.let_ring = flags1 & 0x08 != 0;
    effect.staccato = flags2 & 0x01 != 0;
    effect.palm_mute = flags2 & 0x02 != 0;
    effect.vibrato = effect.vibrato || flags2 & 0x40 != 0;
    if flags1 & 0x01 != 0 {
        effect.bend = Some((layout.read_bend)(layout, io)?);
    }
    if flags1 & 0x10 != 0 {
        effect.grace = Some((layout.read_grace)(layout, io)?);
    }
    if flags2 & 0x04 != 0 {
        effect.tremolo_picking = Some(read_tremolo_picking(io)?);
    }
    if flags2 & 0x08 != 0 {
        effect.slides = (layout.read_slides)(layout, io)?;
    }
    if flags2 & 0x10 != 0 {
        let real_value = note.value + string.value;
        note.effect.harmonic = Some((layout.read_harmonic)(layout, io, real_value)?);
    }
    if flags2 & 0x20 != 0 {
        note.effect.trill = Some(read_trill(io)?);
    }
    Ok(())
}

fn write_note_effects(layout: &Layout, io: &mut GpWriter, note: &Note, string: &GuitarString) -> Result<()> {
    let effect = &note.effect;
    let (flags1, flags2) = note_effect_flags(effect);
    io.write_u8(flags1)?;
    io.write_u8(flags2)?;
    if let Some(bend) = &effect.bend {
        (layout.write_bend)(layout, io, bend)?;
    }
    if let Some(grace) = &effect.grace {
        (layout.write_grace)(layout, io, grace)?;
    }
    if let Some(tremolo) = &effect.tremolo_picking {
        write_tremolo_picking(io, tremolo)?;
    }
    if flags2 & 0x08 != 0 {
        (layout.write_slides)(layout, io, &effect.slides)?;
    }
    if let Some(harmonic) = &effect.harmonic {
        (layout.write_harmonic)(layout, io, harmonic, note.value + string.value)?;
    }
    if let Some(trill) = &effect.trill {
        write_trill(io, trill)?;
    }
    Ok(())
}

fn read_tremolo_picking(io: &mut GpReader) -> Result<TremoloPickingEffect> {
    let duration = match io.read_i8()? {
        1 => 8,
        2 => 16,
        3 => 32,
        other => return Err(GpError::malformed(format!("tremolo picking speed {other} is out of range"))),
    };
    Ok(TremoloPickingEffect { duration })
}

fn write_tremolo_picking(io: &mut GpWriter, tremolo: &TremoloPickingEffect) -> Result<()> {
    let speed = match tremolo.duration {
        8 => 1,
        16 => 2,
        32 => 3,
        other => return Err(GpError::malformed(format!("tremolo picking duration {other} is not 8, 16 or 32"))),
    };
    io.write_i8(speed)
}

fn read_trill(io: &mut GpReader) -> Result<TrillEffect> {
    let fret = io.read_i8()?;
    let period = match io.read_i8()? {
        1 => 16,
        2 => 32,
        3 => 64,
        other => return Err(GpError::malformed(format!("trill period {other} is out of range"))),
    };
    Ok(TrillEffect { fret, period })
}

fn write_trill(io: &mut GpWriter, trill: &TrillEffect) -> Result<()> {
    let period = match trill.period {
        16 => 1,
        32 => 2,
        64 => 3,
        other => return Err(GpError::malformed(format!("trill period {other} is not 16, 32 or 64"))),
    };
    io.write_i8(trill.fret)?;
    io.write_i8(period)
}

/// One slide per note
fn read_slides(_: &Layout, io: &mut GpReader) -> Result<Vec<SlideType>> {
    Ok(vec![io.read_signed_enum()?])
}

fn write_slides(_: &Layout, io: &mut GpWriter, slides: &[SlideType]) -> Result<()> {
    let first = slides
        .first()
        .copied()
        .ok_or_else(|| GpError::malformed("slide flag set without a slide"))?;
    if slides.len() > 1 {
        warn!(?slides, "only the first slide of a note is stored by this version");
    }
    io.write_i8(first.to_raw())
}

fn read_harmonic(_: &Layout, io: &mut GpReader, real_value: i32) -> Result<HarmonicEffect> {
    let code = io.read_i8()?;
    let harmonic = match code {
        1 => HarmonicEffect::Natural,
        3 => HarmonicEffect::Tapped { fret: None },
        4 => HarmonicEffect::Pinch,
        5 => HarmonicEffect::Semi,
        15 => HarmonicEffect::Artificial {
            pitch: Some(PitchClass::from_value(real_value + 7)),
            octave: Some(Octave::Ottava),
        },
        17 => HarmonicEffect::Artificial {
            pitch: Some(PitchClass::from_value(real_value)),
            octave: Some(Octave::Quindicesima),
        },
        22 => HarmonicEffect::Artificial {
            pitch: Some(PitchClass::from_value(real_value)),
            octave: Some(Octave::Ottava),
        },
        other => {
            warn!(location = %io.location(), value = other, "unknown harmonic type");
            HarmonicEffect::Unknown(other)
        }
    };
    Ok(harmonic)
}

fn write_harmonic(_: &Layout, io: &mut GpWriter, harmonic: &HarmonicEffect, real_value: i32) -> Result<()> {
    let code = match harmonic {
        HarmonicEffect::Natural => 1,
        HarmonicEffect::Tapped { .. } => 3,
        HarmonicEffect::Pinch => 4,
        HarmonicEffect::Semi => 5,
        HarmonicEffect::Artificial { pitch, octave } => {
            let fifth_above = Some(PitchClass::from_value(real_value + 7));
            let same_pitch = Some(PitchClass::from_value(real_value));
            if *pitch == fifth_above && *octave == Some(Octave::Ottava) {
                15
            } else if *pitch == same_pitch && *octave == Some(Octave::Quindicesima) {
                17
            } else {
                22
            }
        }
        HarmonicEffect::Unknown(code) => *code,
    };
    io.write_i8(code)
}

// Chords

const BARRE_SLOTS: usize = 5;

fn read_byte_enum<E: WireEnum<Raw = i32>>(io: &mut GpReader) -> Result<E> {
    let raw = io.read_u8()?;
    Ok(io.wire(raw.into()))
}

fn write_byte_enum<E: WireEnum<Raw = i32>>(io: &mut GpWriter, value: E) -> Result<()> {
    io.write_u8(fit(value.to_raw(), E::NAME)?)
}

fn read_new_chord(_: &Layout, io: &mut GpReader) -> Result<Chord> {
    let mut chord = Chord::default();
    let mut diagram = ChordDiagram::default();
    diagram.sharp = io.read_bool()?;
    io.skip(3)?;
    diagram.root = io.read_u8()?.into();
    diagram.kind = read_byte_enum(io)?;
    diagram.extension = read_byte_enum(io)?;
    diagram.bass = io.read_i32()?;
    diagram.tonality = gp3::read_int_enum(io)?;
    diagram.add = io.read_bool()?;
    chord.name = io.read_byte_size_string(gp3::CHORD_NAME_SLOT)?;
    diagram.fifth = read_byte_enum(io)?;
    diagram.ninth = read_byte_enum(io)?;
    diagram.eleventh = read_byte_enum(io)?;
    chord.first_fret = io.read_i32()?;
    for fret in chord.strings.iter_mut() {
        *fret = io.read_i32()?;
    }
    let barre_count = usize::from(io.read_u8()?);
    let frets = io.read_repeated(BARRE_SLOTS, |io| io.read_u8()).complete()?;
    let starts = io.read_repeated(BARRE_SLOTS, |io| io.read_u8()).complete()?;
    let ends = io.read_repeated(BARRE_SLOTS, |io| io.read_u8()).complete()?;
    diagram.barres = (0..barre_count.min(BARRE_SLOTS))
        .map(|i| Barre {
            fret: frets[i].into(),
            start: starts[i].into(),
            end: ends[i].into(),
        })
        .collect();
    diagram.omissions = io.read_repeated(CHORD_STRINGS, |io| io.read_bool()).complete()?;
    io.skip(1)?;
    let fingerings = io
        .read_repeated(CHORD_STRINGS, |io| io.read_signed_enum())
        .complete()?;
    diagram.fingerings = Some(fingerings);
    diagram.show = Some(io.read_bool()?);
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
    io.write_u8(fit(diagram.root, "chord root")?)?;
    write_byte_enum(io, diagram.kind)?;
    write_byte_enum(io, diagram.extension)?;
    io.write_i32(diagram.bass)?;
    io.write_i32(diagram.tonality.to_raw())?;
    io.write_bool(diagram.add)?;
    io.write_byte_size_string(&chord.name, gp3::CHORD_NAME_SLOT)?;
    write_byte_enum(io, diagram.fifth)?;
    write_byte_enum(io, diagram.ninth)?;
    write_byte_enum(io, diagram.eleventh)?;
    io.write_i32(chord.first_fret)?;
    for index in 0..CHORD_STRINGS {
        io.write_i32(chord.fret(index))?;
    }

    io.write_u8(fit(diagram.barres.len(), "barre count")?)?;
    let barre = |index: usize| diagram.barres.get(index).copied().unwrap_or_default();
    let fields: [fn(Barre) -> i32; 3] = [|b| b.fret, |b| b.start, |b| b.end];
    for field in fields {
        for index in 0..BARRE_SLOTS {
            io.write_u8(fit(field(barre(index)), "barre")?)?;
        }
    }

    gp3::write_omissions(io, &diagram.omissions)?;
    io.placeholder(1)?;
    let fingerings = diagram.fingerings.as_deref().unwrap_or_default();
    for index in 0..CHORD_STRINGS {
        let finger = fingerings.get(index).copied().unwrap_or(Fingering::Unset);
        io.write_i8(finger.to_raw())?;
    }
    io.write_bool(diagram.show.unwrap_or(true))
}

// Mix table

fn read_mix_table_change(layout: &Layout, io: &mut GpReader) -> Result<MixTableChange> {
    let mut change = (gp3::LAYOUT.read_mix_table_change)(layout, io)?;
    gp3::read_mix_table_flags(io, &mut change)?;
    Ok(change)
}

fn write_mix_table_change(layout: &Layout, io: &mut GpWriter, change: &MixTableChange) -> Result<()> {
    (gp3::LAYOUT.write_mix_table_change)(layout, io, change)?;
    gp3::write_mix_table_flags(io, change, 0)
}
