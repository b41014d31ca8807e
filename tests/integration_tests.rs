// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for tabfile
//!
//! These tests drive the public API end to end: documents are encoded for a
//! version, decoded again and compared field for field.

use tabfile::config::CodecConfig;
use tabfile::models::{
    Accentuation, Barre, Beat, BeatDisplay, BeatStatus, BeatStroke, BendEffect, BendPoint, BendType,
    Chord, ChordAlteration, ChordDiagram, ChordExtension, ChordType, Color, DirectionSign, Directions,
    Duration, Fingering, GraceEffect, GraceEffectTransition, GuitarString, HarmonicEffect, KeySignature,
    LineBreak, LyricLine, Lyrics, Marker, Measure, MeasureHeader, MidiChannel, MixTableChange,
    MixTableExtras, MixTableItem, Note, NoteType, Octave, PageSetup, PitchClass, Point, RseEqualizer,
    RseInstrument, RseMasterEffect, SlapEffect, SlideType, StrokeDirection, TimeIndependentDuration,
    TimeSignature, Track, TrackRse, TrackSettings, TremoloPickingEffect, TrillEffect, TripletFeel, Tuplet,
    TupletBracket, Velocities, VoiceDirection,
};
use tabfile::{GpError, Song};
use tempfile::tempdir;

const GP3: &str = "FICHIER GUITAR PRO v3.00";
const GP4: &str = "FICHIER GUITAR PRO v4.06";
const GP5_00: &str = "FICHIER GUITAR PRO v5.00";
const GP5_10: &str = "FICHIER GUITAR PRO v5.10";

fn encode(song: &Song, tag: &str) -> Vec<u8> {
    let mut bytes = Vec::new();
    tabfile::write(song, &mut bytes, tag).unwrap();
    bytes
}

fn decode(bytes: &[u8]) -> Song {
    tabfile::parse(bytes).unwrap()
}

fn beats_mut(song: &mut Song) -> impl Iterator<Item = &mut Beat> + '_ {
    song.tracks
        .iter_mut()
        .flat_map(|track| track.measures.iter_mut())
        .flat_map(|measure| measure.voices.iter_mut())
        .flat_map(|voice| voice.beats.iter_mut())
}

fn lead_track() -> Track {
    let mut track = Track::new("Lead");
    track.channel = MidiChannel {
        channel: 0,
        effect_channel: 1,
        instrument: 30,
        volume: 96,
        balance: 64,
        chorus: 8,
        reverb: 16,
        phaser: 0,
        tremolo: 0,
        bank: None,
    };
    track.fret_count = 22;
    track.offset = 2;
    track.color = Color::new(10, 20, 30);
    track
}

fn bass_track() -> Track {
    let mut track = Track::new("Bass");
    track.strings = [43, 38, 33, 28]
        .iter()
        .zip(1..)
        .map(|(&value, number)| GuitarString::new(number, value))
        .collect();
    track.channel = MidiChannel {
        instrument: 33,
        effect_channel: 3,
        ..MidiChannel::new(2)
    };
    track.port = 2;
    track
}

fn headers() -> Vec<MeasureHeader> {
    let intro = MeasureHeader {
        time_signature: TimeSignature::new(3, 4),
        is_repeat_open: true,
        marker: Some(Marker {
            title: "Intro".to_string(),
            color: Color::new(0, 128, 255),
        }),
        triplet_feel: TripletFeel::Eighth,
        ..MeasureHeader::default()
    };
    let first_ending = MeasureHeader {
        time_signature: TimeSignature::new(3, 4),
        repeat_alternative: 0b01,
        triplet_feel: TripletFeel::Eighth,
        ..MeasureHeader::default()
    };
    let second_ending = MeasureHeader {
        key_signature: KeySignature::new(1, true),
        repeat_close: 2,
        repeat_alternative: 0b10,
        has_double_bar: true,
        triplet_feel: TripletFeel::Eighth,
        ..MeasureHeader::default()
    };
    vec![intro, first_ending, second_ending]
}

fn add_nine() -> Chord {
    Chord {
        name: "Cadd9".to_string(),
        first_fret: 1,
        strings: vec![0, 3, 0, 2, 3, -1, -1],
        diagram: Some(ChordDiagram {
            sharp: true,
            root: 0,
            kind: ChordType::Major,
            extension: ChordExtension::Ninth,
            bass: 0,
            tonality: ChordAlteration::Perfect,
            add: true,
            fifth: ChordAlteration::Augmented,
            ninth: ChordAlteration::Perfect,
            eleventh: ChordAlteration::Perfect,
            barres: vec![Barre {
                fret: 1,
                start: 1,
                end: 6,
            }],
            omissions: vec![true, false, true, true, true, true, true],
            fingerings: None,
            show: None,
        }),
    }
}

fn intro_measure() -> Measure {
    let mut accented = Note::new(1, 5);
    accented.velocity = Velocities::FORTISSIMO;
    accented.effect.accentuated_note = true;
    accented.time_independent = Some(TimeIndependentDuration { duration: 1, tuplet: 2 });
    let mut ghost = Note::new(3, 7);
    ghost.effect.ghost_note = true;
    ghost.effect.hammer = true;
    let mut strum = Beat::new(
        Duration {
            value: 8,
            is_dotted: true,
            tuplet: Tuplet::default(),
        },
        vec![accented, ghost],
    );
    strum.text = Some("intro".to_string());
    strum.chord = Some(Chord {
        name: "A5".to_string(),
        first_fret: 5,
        strings: vec![-1, -1, -1, 7, 7, 5, -1],
        diagram: None,
    });
    strum.effect.fade_in = true;
    strum.effect.stroke = BeatStroke {
        direction: StrokeDirection::Down,
        value: 16,
    };

    let mut bent = Note::new(2, 8);
    bent.effect.bend = Some(BendEffect {
        kind: BendType::Bend,
        value: 50,
        points: vec![
            BendPoint::new(0, 0),
            BendPoint::new(6, 4),
            BendPoint {
                position: 12,
                value: 4,
                vibrato: true,
            },
        ],
    });
    bent.effect.grace = Some(GraceEffect {
        fret: 6,
        velocity: Velocities::MEZZO_FORTE,
        duration: 16,
        transition: GraceEffectTransition::Hammer,
        ..GraceEffect::default()
    });
    bent.effect.let_ring = true;
    bent.effect.slides = vec![SlideType::ShiftSlideTo];
    bent.effect.left_hand_finger = Fingering::Index;
    bent.effect.right_hand_finger = Fingering::Thumb;
    let mut triplet = Beat::new(
        Duration {
            value: 16,
            is_dotted: false,
            tuplet: Tuplet::from_enters(3),
        },
        vec![bent],
    );
    triplet.effect.tremolo_bar = Some(BendEffect {
        kind: BendType::Dip,
        value: -50,
        points: vec![BendPoint::new(0, 0), BendPoint::new(6, 1), BendPoint::new(12, 0)],
    });

    let rest = Beat {
        status: BeatStatus::Rest,
        ..Beat::default()
    };
    Measure::with_beats(vec![strum, triplet, rest])
}

fn mix_measure() -> Measure {
    let mut change = Beat::new(Duration::new(2), vec![Note::new(6, 0)]);
    change.chord = Some(add_nine());
    change.effect.mix_table_change = Some(MixTableChange {
        instrument: Some(MixTableItem::new(30)),
        volume: Some(MixTableItem {
            value: 12,
            duration: 2,
            all_tracks: false,
        }),
        tempo: Some(MixTableItem {
            value: 140,
            duration: 1,
            all_tracks: false,
        }),
        ..MixTableChange::default()
    });
    let mut slap = Beat::new(Duration::new(4), vec![Note::new(4, 2)]);
    slap.effect.slap_effect = SlapEffect::Popping;
    Measure::with_beats(vec![change, slap])
}

fn harmonic_measure() -> Measure {
    let mut harmonic = Note::new(3, 12);
    harmonic.effect.vibrato = true;
    harmonic.effect.harmonic = Some(HarmonicEffect::Natural);
    let mut beat = Beat::new(Duration::new(1), vec![harmonic]);
    beat.effect.vibrato = true;
    Measure::with_beats(vec![beat])
}

/// A document using only what Guitar Pro 3 stores
fn gp3_song() -> Song {
    let mut song = Song::new("Round Trip");
    song.subtitle = "Live".to_string();
    song.artist = "The Testers".to_string();
    song.album = "Fixtures".to_string();
    song.words = "Someone".to_string();
    song.copyright = "2026".to_string();
    song.tab = "Transcriber".to_string();
    song.instructions = "Play it loud".to_string();
    song.notice = vec!["First notice line".to_string(), "Second".to_string()];
    song.tempo = 96;
    song.key = KeySignature::new(-2, false);
    song.measure_headers = headers();

    let mut lead = lead_track();
    lead.measures = vec![intro_measure(), mix_measure(), harmonic_measure()];
    let mut bass = bass_track();
    bass.measures = vec![
        Measure::with_beats(vec![Beat::new(Duration::new(2), vec![Note::new(4, 3)])]),
        Measure::default(),
        Measure::default(),
    ];
    song.tracks = vec![lead, bass];
    song
}

fn gp4_effects_beat() -> Beat {
    let mut natural = Note::new(1, 12);
    natural.effect.harmonic = Some(HarmonicEffect::Natural);
    natural.effect.staccato = true;
    // fret 5 on the B string sounds E4 (64)
    let mut artificial = Note::new(2, 5);
    artificial.effect.harmonic = Some(HarmonicEffect::Artificial {
        pitch: Some(PitchClass::from_value(64)),
        octave: Some(Octave::Ottava),
    });
    artificial.effect.palm_mute = true;
    artificial.effect.vibrato = true;
    let mut tapped = Note::new(3, 2);
    tapped.effect.harmonic = Some(HarmonicEffect::Tapped { fret: None });
    tapped.effect.trill = Some(TrillEffect { fret: 4, period: 32 });
    let mut pinch = Note::new(4, 5);
    pinch.effect.harmonic = Some(HarmonicEffect::Pinch);
    pinch.effect.tremolo_picking = Some(TremoloPickingEffect { duration: 16 });
    let mut semi = Note::new(5, 7);
    semi.effect.harmonic = Some(HarmonicEffect::Semi);
    semi.effect.slides = vec![SlideType::LegatoSlideTo];

    let mut beat = Beat::new(Duration::new(4), vec![natural, artificial, tapped, pinch, semi]);
    beat.effect.has_rasgueado = true;
    beat.effect.pick_stroke = StrokeDirection::Up;
    beat.effect.slap_effect = SlapEffect::Tapping;
    beat.effect.stroke = BeatStroke {
        direction: StrokeDirection::Up,
        value: 32,
    };
    beat.effect.tremolo_bar = Some(BendEffect {
        kind: BendType::Dive,
        value: -100,
        points: vec![BendPoint::new(0, 0), BendPoint::new(12, -4)],
    });
    beat
}

/// Adds lyrics, note-level effects and chord fingerings
fn gp4_song() -> Song {
    let mut song = gp3_song();
    song.lyrics = Some(Lyrics {
        track_choice: 1,
        lines: (1..=5)
            .map(|n| LyricLine {
                starting_measure: n,
                lyrics: format!("line {n}"),
            })
            .collect(),
    });
    for beat in beats_mut(&mut song) {
        if let Some(diagram) = beat.chord.as_mut().and_then(|chord| chord.diagram.as_mut()) {
            diagram.fingerings = Some(vec![
                Fingering::Unset,
                Fingering::Index,
                Fingering::Unset,
                Fingering::Middle,
                Fingering::Annular,
                Fingering::Unset,
                Fingering::Unset,
            ]);
            diagram.show = Some(true);
        }
        if let Some(volume) = beat.effect.mix_table_change.as_mut().and_then(|change| change.volume.as_mut()) {
            volume.all_tracks = true;
        }
    }
    song.tracks[0].measures[2].voices[0].beats.push(gp4_effects_beat());
    song
}

/// Adds RSE blocks, page setup, beams, a second voice and display flags
fn gp5_song(newer: bool) -> Song {
    let mut song = gp4_song();
    song.music = Some("A Composer".to_string());
    song.master_effect = Some(if newer {
        RseMasterEffect {
            volume: Some(90),
            equalizer: Some(RseEqualizer {
                knobs: vec![0.0, 0.5, -1.0, 1.5, 0.0, 0.0, -0.5, 2.0, 0.0, 0.3],
                gain: -0.2,
            }),
            reverb: 4,
        }
    } else {
        RseMasterEffect {
            volume: None,
            equalizer: None,
            reverb: 4,
        }
    });
    let mut setup = PageSetup::default();
    setup.page_size = Point { x: 216, y: 279 };
    setup.score_size_proportion = 0.5;
    setup.title = "%TITLE% (live)".to_string();
    song.page_setup = Some(setup);
    song.tempo_name = Some("Andante".to_string());
    song.hide_tempo = newer.then_some(true);
    let mut directions = Directions::default();
    directions.set(DirectionSign::Coda, Some(3));
    directions.set(DirectionSign::DaCapoAlCoda, Some(2));
    song.directions = Some(directions);

    let beams = [[2, 2, 2, 0], [2, 2, 2, 0], [2, 2, 2, 2]];
    for (header, beams) in song.measure_headers.iter_mut().zip(beams) {
        header.time_signature.beams = Some(beams);
    }
    song.measure_headers[2].triplet_feel = TripletFeel::Sixteenth;

    for (index, track) in song.tracks.iter_mut().enumerate() {
        track.channel.bank = Some(index as u8);
        track.settings = Some(TrackSettings {
            solo: index == 1,
            use_rse: true,
            auto_let_ring: true,
            auto_accentuation: Accentuation::Medium,
            ..TrackSettings::default()
        });
        track.rse = Some(TrackRse {
            humanize: 10,
            instrument: RseInstrument {
                instrument: 24 + index as i32,
                unknown: 0,
                sound_bank: 1,
                effect_number: 3,
                effect: newer.then(|| "Clean".to_string()),
                effect_category: newer.then(|| "Amp".to_string()),
            },
            equalizer: newer.then(|| RseEqualizer {
                knobs: vec![0.5, 0.0, -0.5],
                gain: 1.0,
            }),
        });
        for measure in &mut track.measures {
            measure.line_break = Some(LineBreak::None);
        }
    }
    song.tracks[0].measures[1].line_break = Some(LineBreak::Break);
    song.tracks[0].measures[1].voices[1]
        .beats
        .push(Beat::new(Duration::new(2), vec![Note::new(6, 3)]));

    for beat in beats_mut(&mut song) {
        beat.octave = Some(Octave::None);
        beat.display = Some(BeatDisplay::default());
        if let Some(change) = &mut beat.effect.mix_table_change {
            change.tempo_name = Some("Allegro".to_string());
            change.hide_tempo = newer.then_some(true);
            change.extras = Some(MixTableExtras {
                rse: RseInstrument {
                    instrument: 5,
                    unknown: 1,
                    sound_bank: 2,
                    effect_number: 7,
                    effect: newer.then(|| "Reverb".to_string()),
                    effect_category: newer.then(|| "Studio".to_string()),
                },
                use_rse: true,
                wah: 10,
                show_wah: true,
            });
        }
        for note in &mut beat.notes {
            note.time_independent = None;
            note.swap_accidentals = Some(false);
            if let Some(HarmonicEffect::Tapped { fret }) = &mut note.effect.harmonic {
                *fret = Some(14);
            }
        }
    }

    let intro = &mut song.tracks[0].measures[0].voices[0].beats;
    intro[0].octave = Some(Octave::Quindicesima);
    intro[0].display = Some(BeatDisplay {
        break_beam: true,
        beam_direction: VoiceDirection::Up,
        tuplet_bracket: TupletBracket::Start,
        break_secondary: 2,
        force_bracket: true,
        ..BeatDisplay::default()
    });
    intro[0].notes[0].duration_percent = Some(0.75);
    intro[0].notes[0].effect.heavy_accentuated_note = true;
    intro[0].notes[1].swap_accidentals = Some(true);
    let bent = &mut intro[1].notes[0].effect;
    bent.slides = vec![SlideType::ShiftSlideTo, SlideType::OutDownwards];
    if let Some(grace) = &mut bent.grace {
        grace.is_dead = true;
        grace.is_on_beat = true;
    }
    song
}

#[test]
fn test_gp3_round_trip() {
    let song = gp3_song();
    let bytes = encode(&song, GP3);
    assert_eq!(decode(&bytes), song);
}

#[test]
fn test_gp4_round_trip() {
    let song = gp4_song();
    let bytes = encode(&song, GP4);
    assert_eq!(decode(&bytes), song);
}

#[test]
fn test_gp5_00_round_trip() {
    let song = gp5_song(false);
    let bytes = encode(&song, GP5_00);
    assert_eq!(decode(&bytes), song);
}

#[test]
fn test_gp5_10_round_trip() {
    let song = gp5_song(true);
    let bytes = encode(&song, GP5_10);
    assert_eq!(decode(&bytes), song);
}

#[test]
fn test_every_gp4_tag_decodes() {
    let song = gp4_song();
    for tag in ["FICHIER GUITAR PRO v4.00", GP4, "FICHIER GUITAR PRO L4.06"] {
        assert_eq!(decode(&encode(&song, tag)), song, "{tag}");
    }
}

#[test]
fn test_reencoding_is_byte_identical() {
    for (song, tag) in [(gp3_song(), GP3), (gp4_song(), GP4), (gp5_song(true), GP5_10)] {
        let bytes = encode(&song, tag);
        assert_eq!(encode(&decode(&bytes), tag), bytes, "{tag}");
    }
}

#[test]
fn test_gp5_versions_differ() {
    let song = gp5_song(true);
    let decoded = decode(&encode(&song, GP5_00));

    assert_eq!(decoded.hide_tempo, None);
    let master = decoded.master_effect.unwrap();
    assert_eq!(master.volume, None);
    assert_eq!(master.equalizer, None);
    assert_eq!(master.reverb, 4);
    let rse = decoded.tracks[0].rse.as_ref().unwrap();
    assert_eq!(rse.equalizer, None);
    assert_eq!(rse.instrument.effect, None);
    assert_eq!(rse.instrument.effect_number, 3);
    let change = decoded.tracks[0].measures[1].voices[0].beats[0]
        .effect
        .mix_table_change
        .as_ref()
        .unwrap();
    assert_eq!(change.hide_tempo, None);
    assert_eq!(change.tempo.map(|tempo| tempo.value), Some(140));
}

#[test]
fn test_older_version_drops_newer_fields() {
    let decoded = decode(&encode(&gp5_song(true), GP3));
    assert_eq!(decoded.music, None);
    assert_eq!(decoded.lyrics, None);
    assert_eq!(decoded.page_setup, None);
    assert!(decoded.tracks.iter().all(|track| track.settings.is_none()));
    assert!(decoded.tracks[0].measures[1].voices[1].is_empty());
    assert_eq!(decoded.title, "Round Trip");
    assert_eq!(decoded.measure_count(), 3);
}

#[test]
fn test_localized_truncation() {
    let mut song = Song::new("Trail");
    song.measure_headers = vec![MeasureHeader::default(); 5];
    song.tracks = (1..=3)
        .map(|n| {
            let mut track = Track::new(format!("Track {n}"));
            track.measures = vec![Measure::default(); 5];
            track
        })
        .collect();
    song.tracks[2].measures[4].voices[1]
        .beats
        .push(Beat::new(Duration::default(), vec![Note::new(1, 5)]));

    let bytes = encode(&song, GP5_10);
    // cut inside the last note: fret, second flags byte, beat display flags and line break
    let truncated = &bytes[..bytes.len() - 5];
    let err = tabfile::parse(truncated).unwrap_err();

    let message = err.to_string();
    assert!(
        message.starts_with("reading track 3, measure 5, voice 2, beat 1, got TruncatedInput"),
        "{message}"
    );
    assert!(matches!(err.root(), GpError::TruncatedInput { .. }));
}

fn single_beat_song(beat: Beat) -> Song {
    let mut song = Song::new("Single");
    song.measure_headers = vec![MeasureHeader::default()];
    let mut track = Track::new("Guitar");
    track.measures = vec![Measure::with_beats(vec![beat])];
    song.tracks = vec![track];
    song
}

fn single_note_song(note: Note) -> Song {
    single_beat_song(Beat::new(Duration::new(4), vec![note]))
}

fn assert_malformed_at_beat(bytes: &[u8], detail: &str) {
    let err = tabfile::parse(bytes).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("track 1, measure 1"), "{message}");
    assert!(message.contains("beat 1"), "{message}");
    assert!(matches!(err.root(), GpError::MalformedStructure(m) if m.contains(detail)), "{message}");
}

#[test]
fn test_unknown_note_type_round_trips() {
    let mut odd = Note::new(2, 3);
    odd.kind = NoteType::Unknown(7);
    let song = single_note_song(odd);

    let bytes = encode(&song, GP4);
    let decoded = decode(&bytes);
    assert_eq!(decoded.tracks[0].measures[0].voices[0].beats[0].notes[0].kind, NoteType::Unknown(7));
    assert_eq!(encode(&decoded, GP4), bytes);
}

#[test]
fn test_unknown_harmonic_type_round_trips() {
    let mut note = Note::new(3, 12);
    note.effect.harmonic = Some(HarmonicEffect::Unknown(9));
    let song = single_note_song(note);

    let bytes = encode(&song, GP4);
    let decoded = decode(&bytes);
    let harmonic = decoded.tracks[0].measures[0].voices[0].beats[0].notes[0].effect.harmonic;
    assert_eq!(harmonic, Some(HarmonicEffect::Unknown(9)));
    assert_eq!(encode(&decoded, GP4), bytes);

    let mut out = Vec::new();
    let err = tabfile::write(&decoded, &mut out, GP5_10).unwrap_err();
    assert!(matches!(err.root(), GpError::MalformedStructure(m) if m.contains("harmonic type 9")));
}

#[test]
fn test_out_of_range_duration_rejected() {
    let mut bytes = encode(&single_beat_song(Beat::new(Duration::new(4), Vec::new())), GP3);
    // the duration exponent sits before the trailing string flags
    let at = bytes.len() - 2;
    bytes[at] = 7;
    assert_malformed_at_beat(&bytes, "duration exponent 7");
}

#[test]
fn test_out_of_range_tremolo_picking_rejected() {
    let mut note = Note::new(1, 3);
    note.effect.tremolo_picking = Some(TremoloPickingEffect { duration: 16 });
    let mut bytes = encode(&single_note_song(note), GP4);
    let last = bytes.len() - 1;
    bytes[last] = 9;
    assert_malformed_at_beat(&bytes, "tremolo picking speed 9");
}

#[test]
fn test_out_of_range_trill_period_rejected() {
    let mut note = Note::new(1, 3);
    note.effect.trill = Some(TrillEffect { fret: 5, period: 32 });
    let mut bytes = encode(&single_note_song(note), GP4);
    let last = bytes.len() - 1;
    bytes[last] = 9;
    assert_malformed_at_beat(&bytes, "trill period 9");
}

#[test]
fn test_measure_count_mismatch_rejected() {
    let mut song = gp3_song();
    song.tracks[1].measures.pop();
    let mut bytes = Vec::new();
    let err = tabfile::write(&song, &mut bytes, GP3).unwrap_err();
    assert!(matches!(err, GpError::MalformedStructure(ref m) if m.contains("track 2")));
    assert!(bytes.is_empty());
}

#[test]
fn test_unsupported_version_rejected() {
    let mut bytes = Vec::new();
    let err = tabfile::write(&gp3_song(), &mut bytes, "FICHIER GUITAR PRO v6.00").unwrap_err();
    assert!(matches!(err, GpError::UnsupportedVersion(_)));
    assert!(bytes.is_empty());
}

#[test]
fn test_negative_measure_count_rejected() {
    let mut bytes = encode(&Song::new("Empty"), GP3);
    // an empty song ends with its measure and track counts
    let at = bytes.len() - 8;
    bytes[at..at + 4].copy_from_slice(&(-1i32).to_le_bytes());
    let err = tabfile::parse(bytes.as_slice()).unwrap_err();
    assert!(matches!(err, GpError::MalformedStructure(ref m) if m.contains("negative")));
}

#[test]
fn test_file_helpers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("song.gp5");
    let song = gp5_song(true);

    tabfile::write_file(&song, &path, GP5_10).unwrap();
    assert_eq!(tabfile::parse_file(&path).unwrap(), song);

    let file = std::fs::File::open(&path).unwrap();
    assert_eq!(tabfile::read_version(file).unwrap(), GP5_10);
}

#[test]
fn test_write_file_checks_before_creating() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("never.gp5");
    assert!(tabfile::write_file(&gp3_song(), &path, "FICHIER GUITAR PRO v1.00").is_err());
    assert!(!path.exists());
}

#[test]
fn test_configured_encoding() {
    let config = CodecConfig {
        encoding: "windows-1251".to_string(),
        ..CodecConfig::default()
    };
    let mut song = gp3_song();
    song.title = "Песня".to_string();

    let mut bytes = Vec::new();
    tabfile::write_with(&song, &mut bytes, GP3, &config).unwrap();
    assert_eq!(tabfile::parse_with(bytes.as_slice(), &config).unwrap(), song);
    // the title is one byte per character in the slot
    assert_eq!(&bytes[31..36], &[6, 0, 0, 0, 5]);
}
