//! GP5 decoding: bytes → [`Song`]

use super::reader::{ReadResult, Reader};
use super::{
    channel_value_from_byte, velocity_from_dynamic, ChannelSlot, CHANNEL_SLOTS, CHORD_NAME_FIELD,
    DIRECTION_SLOTS, TRACK_NAME_FIELD, VERSION_FIELD,
};
use crate::error::FormatError;
use crate::models::*;

/// Decode a whole GP5 file
///
/// Fails closed: a truncated or malformed stream yields an error carrying the
/// byte offset, never a partial song. Bytes left over after the last measure
/// are ignored.
pub fn decode(data: &[u8]) -> Result<Song, FormatError> {
    let mut reader = Reader::new(data);
    let version = read_version(&mut reader)?;
    let mut gp = SongReader { r: reader, version };
    let song = gp.read_song()?;

    if gp.r.remaining() > 0 {
        log::debug!("ignoring {} trailing byte(s)", gp.r.remaining());
    }
    log::info!(
        "decoded '{}' ({}): {} track(s), {} measure(s)",
        song.title,
        version.version_string(),
        song.tracks.len(),
        song.measure_headers.len()
    );
    for (i, track) in song.tracks.iter().enumerate() {
        log::debug!(
            "track {}: '{}', {} string(s), channel {}",
            i,
            track.name,
            track.strings.len(),
            track.channel.channel
        );
    }
    Ok(song)
}

fn read_version(r: &mut Reader) -> ReadResult<FormatVersion> {
    let version = r.read_byte_size_string(VERSION_FIELD)?;
    FormatVersion::from_version_string(&version)
        .ok_or(FormatError::UnsupportedVersion { offset: 0, version })
}

struct SongReader<'a> {
    r: Reader<'a>,
    version: FormatVersion,
}

impl<'a> SongReader<'a> {
    fn read_song(&mut self) -> ReadResult<Song> {
        let mut song = Song {
            version: self.version,
            ..Song::default()
        };

        self.read_info(&mut song)?;
        song.lyrics = self.read_lyrics()?;
        if self.version.is_510() {
            song.master_effect.volume = self.r.read_i32()?;
            self.r.skip(4)?;
            for band in song.master_effect.equalizer.iter_mut() {
                *band = self.r.read_i8()?;
            }
        }
        song.page_setup = self.read_page_setup()?;
        song.tempo_name = self.r.read_int_byte_size_string()?;
        song.tempo = self.r.read_i32()?;
        if self.version.is_510() {
            song.hide_tempo = self.r.read_bool()?;
        }
        song.key = self.r.read_i8()?;
        self.r.skip(3)?;
        self.r.skip(1)?; // octave

        let channels = self.read_channel_slots()?;
        let directions = self.read_directions()?;
        song.master_effect.reverb = self.r.read_i32()?;

        let measure_count = self.r.read_count("measure count")?;
        let track_count = self.r.read_count("track count")?;

        song.measure_headers = self.read_measure_headers(measure_count)?;
        apply_directions(&mut song.measure_headers, &directions);

        for number in 0..track_count {
            let track = self.read_track(number, &channels)?;
            song.tracks.push(track);
        }
        self.r.skip(if self.version.is_510() { 1 } else { 2 })?;

        self.read_measures(&mut song)?;
        song.rebuild_repeat_groups();
        Ok(song)
    }

    fn read_info(&mut self, song: &mut Song) -> ReadResult<()> {
        song.title = self.r.read_int_byte_size_string()?;
        song.subtitle = self.r.read_int_byte_size_string()?;
        song.artist = self.r.read_int_byte_size_string()?;
        song.album = self.r.read_int_byte_size_string()?;
        song.words = self.r.read_int_byte_size_string()?;
        song.music = self.r.read_int_byte_size_string()?;
        song.copyright = self.r.read_int_byte_size_string()?;
        song.tab = self.r.read_int_byte_size_string()?;
        song.instructions = self.r.read_int_byte_size_string()?;

        let notice_count = self.r.read_count("notice line count")?;
        song.notice = Vec::new();
        for _ in 0..notice_count {
            song.notice.push(self.r.read_int_byte_size_string()?);
        }
        Ok(())
    }

    fn read_lyrics(&mut self) -> ReadResult<Lyrics> {
        let mut lyrics = Lyrics {
            track_choice: self.r.read_i32()?,
            ..Lyrics::default()
        };
        for line in lyrics.lines.iter_mut() {
            line.starting_measure = self.r.read_i32()?;
            line.text = self.r.read_int_size_string()?;
        }
        Ok(lyrics)
    }

    fn read_page_setup(&mut self) -> ReadResult<PageSetup> {
        Ok(PageSetup {
            width: self.r.read_i32()?,
            height: self.r.read_i32()?,
            margin_left: self.r.read_i32()?,
            margin_right: self.r.read_i32()?,
            margin_top: self.r.read_i32()?,
            margin_bottom: self.r.read_i32()?,
            score_size_proportion: self.r.read_i32()?,
            header_footer: self.r.read_i16()?,
            title: self.r.read_int_byte_size_string()?,
            subtitle: self.r.read_int_byte_size_string()?,
            artist: self.r.read_int_byte_size_string()?,
            album: self.r.read_int_byte_size_string()?,
            words: self.r.read_int_byte_size_string()?,
            music: self.r.read_int_byte_size_string()?,
            words_and_music: self.r.read_int_byte_size_string()?,
            copyright: [
                self.r.read_int_byte_size_string()?,
                self.r.read_int_byte_size_string()?,
            ],
            page_number: self.r.read_int_byte_size_string()?,
        })
    }

    fn read_channel_slots(&mut self) -> ReadResult<Vec<ChannelSlot>> {
        let mut slots = Vec::with_capacity(CHANNEL_SLOTS);
        for _ in 0..CHANNEL_SLOTS {
            let instrument = self.r.read_i32()?;
            let mut values = [0u8; 6];
            for value in values.iter_mut() {
                *value = channel_value_from_byte(self.r.read_i8()?);
            }
            self.r.skip(2)?;
            slots.push(ChannelSlot {
                instrument,
                volume: values[0],
                balance: values[1],
                chorus: values[2],
                reverb: values[3],
                phaser: values[4],
                tremolo: values[5],
            });
        }
        Ok(slots)
    }

    fn read_directions(&mut self) -> ReadResult<[i16; DIRECTION_SLOTS]> {
        let mut directions = [-1i16; DIRECTION_SLOTS];
        for slot in directions.iter_mut() {
            *slot = self.r.read_i16()?;
        }
        Ok(directions)
    }

    // ========================================================================
    // Measure headers
    // ========================================================================

    fn read_measure_headers(&mut self, count: usize) -> ReadResult<Vec<MeasureHeader>> {
        let mut headers: Vec<MeasureHeader> = Vec::new();
        for index in 0..count {
            if index > 0 {
                self.r.skip(1)?;
            }
            let header = self.read_measure_header(headers.last())?;
            headers.push(header);
        }
        Ok(headers)
    }

    fn read_measure_header(&mut self, previous: Option<&MeasureHeader>) -> ReadResult<MeasureHeader> {
        let flags = self.r.read_u8()?;
        let mut header = MeasureHeader::default();
        if let Some(previous) = previous {
            header.time_signature = previous.time_signature;
            header.key_signature = previous.key_signature;
        }

        if flags & 0x01 != 0 {
            let numerator = self.r.read_i8()?;
            if numerator < 1 {
                return Err(self.r.invalid("time signature numerator", numerator, 1));
            }
            header.time_signature.numerator = numerator as u8;
        }
        if flags & 0x02 != 0 {
            let denominator = self.r.read_i8()?;
            if denominator < 1 || !Duration::is_valid_value(denominator as u32) {
                return Err(self.r.invalid("time signature denominator", denominator, 1));
            }
            header.time_signature.denominator = denominator as u8;
        }
        header.repeat_open = flags & 0x04 != 0;
        if flags & 0x08 != 0 {
            header.repeat_close = self.r.read_u8()?;
        }
        if flags & 0x20 != 0 {
            let title = self.r.read_int_byte_size_string()?;
            let color = self.r.read_color()?;
            header.marker = Some(Marker { title, color });
        }
        if flags & 0x10 != 0 {
            header.repeat_alternative = self.r.read_u8()?;
        }
        if flags & 0x40 != 0 {
            header.key_signature.key = self.r.read_i8()?;
            header.key_signature.minor = match self.r.read_i8()? {
                0 => false,
                1 => true,
                other => return Err(self.r.invalid("key type", other, 1)),
            };
        }
        header.double_bar = flags & 0x80 != 0;

        if flags & 0x03 != 0 {
            for beam in header.time_signature.beams.iter_mut() {
                *beam = self.r.read_u8()?;
            }
        }
        if flags & 0x10 == 0 {
            self.r.skip(1)?;
        }
        let feel = self.r.read_u8()?;
        header.triplet_feel =
            TripletFeel::from_u8(feel).ok_or_else(|| self.r.invalid("triplet feel", feel, 1))?;
        Ok(header)
    }

    // ========================================================================
    // Tracks
    // ========================================================================

    fn read_track(&mut self, number: usize, channels: &[ChannelSlot]) -> ReadResult<Track> {
        if number == 0 || !self.version.is_510() {
            self.r.skip(1)?;
        }
        let flags = self.r.read_u8()?;
        let name = self.r.read_byte_size_string(TRACK_NAME_FIELD)?;
        let mut track = Track::new(name);
        track.is_percussion = flags & 0x01 != 0;
        track.is_12_string = flags & 0x02 != 0;
        track.is_banjo = flags & 0x04 != 0;
        track.is_visible = flags & 0x08 != 0;
        track.is_solo = flags & 0x10 != 0;
        track.is_mute = flags & 0x20 != 0;
        track.use_rse = flags & 0x40 != 0;
        track.indicate_tuning = flags & 0x80 != 0;

        let string_count = self.r.read_i32()?;
        if !(0..=MAX_STRINGS as i32).contains(&string_count) {
            return Err(self.r.invalid("string count", string_count, 4));
        }
        let mut strings = Vec::new();
        for i in 0..MAX_STRINGS {
            let tuning = self.r.read_i32()?;
            if (i as i32) < string_count {
                if !(0..=127).contains(&tuning) {
                    return Err(self.r.invalid("string tuning", tuning, 4));
                }
                strings.push(GuitarString {
                    number: (i + 1) as u8,
                    value: tuning as u8,
                });
            }
        }
        track.strings = strings;

        track.port = self.r.read_i32()?;
        track.channel = self.read_channel(channels)?;
        track.fret_count = self.r.read_i32()?;
        track.offset = self.r.read_i32()?;
        track.color = self.r.read_color()?;

        track.display_flags = self.r.read_i16()? as u16;
        track.rse.auto_accentuation = self.r.read_u8()?;
        track.channel.bank = self.r.read_u8()?;

        track.rse.humanize = self.r.read_u8()?;
        self.r.skip(12)?;
        self.r.skip(12)?;
        track.rse.instrument = self.read_rse_instrument()?;
        if self.version.is_510() {
            for knob in track.rse.equalizer.iter_mut() {
                *knob = self.r.read_i8()?;
            }
            track.rse.instrument.effect = self.r.read_int_byte_size_string()?;
            track.rse.instrument.effect_category = self.r.read_int_byte_size_string()?;
        }
        Ok(track)
    }

    fn read_channel(&mut self, channels: &[ChannelSlot]) -> ReadResult<MidiChannel> {
        let index = self.r.read_i32()? - 1;
        if !(0..CHANNEL_SLOTS as i32).contains(&index) {
            return Err(self.r.invalid("channel index", index + 1, 4));
        }
        let effect = self.r.read_i32()? - 1;
        if !(0..CHANNEL_SLOTS as i32).contains(&effect) {
            return Err(self.r.invalid("effect channel", effect + 1, 4));
        }
        let slot = &channels[index as usize];
        Ok(MidiChannel {
            channel: index as u8,
            effect_channel: effect as u8,
            instrument: slot.instrument.max(0),
            volume: slot.volume,
            balance: slot.balance,
            chorus: slot.chorus,
            reverb: slot.reverb,
            phaser: slot.phaser,
            tremolo: slot.tremolo,
            bank: 0,
        })
    }

    fn read_rse_instrument(&mut self) -> ReadResult<RseInstrument> {
        let mut instrument = RseInstrument {
            instrument: self.r.read_i32()?,
            unknown: self.r.read_i32()?,
            sound_bank: self.r.read_i32()?,
            ..RseInstrument::default()
        };
        if self.version.is_510() {
            instrument.effect_number = self.r.read_i32()?;
        } else {
            instrument.effect_number = i32::from(self.r.read_i16()?);
            self.r.skip(1)?;
        }
        Ok(instrument)
    }

    // ========================================================================
    // Measures, voices, beats
    // ========================================================================

    fn read_measures(&mut self, song: &mut Song) -> ReadResult<()> {
        let tunings: Vec<Vec<GuitarString>> =
            song.tracks.iter().map(|t| t.strings.clone()).collect();
        for _ in 0..song.measure_headers.len() {
            for (track, strings) in song.tracks.iter_mut().zip(&tunings) {
                let measure = self.read_measure(strings)?;
                track.measures.push(measure);
            }
        }
        Ok(())
    }

    fn read_measure(&mut self, strings: &[GuitarString]) -> ReadResult<Measure> {
        let mut voices = Vec::with_capacity(VOICES_PER_MEASURE);
        for _ in 0..VOICES_PER_MEASURE {
            let beat_count = self.r.read_count("beat count")?;
            let mut voice = Voice::default();
            for _ in 0..beat_count {
                voice.beats.push(self.read_beat(strings)?);
            }
            voices.push(voice);
        }
        let line_break = self.r.read_u8()?;
        Ok(Measure { voices, line_break })
    }

    fn read_beat(&mut self, strings: &[GuitarString]) -> ReadResult<Beat> {
        let flags = self.r.read_u8()?;
        let status = if flags & 0x40 != 0 {
            let value = self.r.read_u8()?;
            BeatStatus::from_u8(value).ok_or_else(|| self.r.invalid("beat status", value, 1))?
        } else {
            BeatStatus::Normal
        };
        let duration = self.read_duration(flags)?;
        let mut beat = Beat::new(duration);
        beat.status = status;

        if flags & 0x02 != 0 {
            beat.chord = Some(self.read_chord(strings.len())?);
        }
        if flags & 0x04 != 0 {
            beat.text = Some(self.r.read_int_byte_size_string()?);
        }
        if flags & 0x08 != 0 {
            beat.effect = self.read_beat_effects()?;
        }
        if flags & 0x10 != 0 {
            beat.mix_table = Some(self.read_mix_table()?);
        }

        let string_flags = self.r.read_u8()?;
        for string in strings {
            if string_flags & (1 << (7 - string.number)) != 0 {
                let note = self.read_note(string.number)?;
                beat.notes.push(note);
            }
        }

        beat.display_flags = self.r.read_i16()? as u16;
        if beat.display_flags & 0x0800 != 0 {
            beat.break_secondary = self.r.read_u8()?;
        }
        Ok(beat)
    }

    fn read_duration(&mut self, flags: u8) -> ReadResult<Duration> {
        let code = self.r.read_i8()?;
        if !(-2..=4).contains(&code) {
            return Err(self.r.invalid("duration", code, 1));
        }
        let mut duration = Duration::new(1 << (code + 2));
        duration.dotted = flags & 0x01 != 0;
        if flags & 0x20 != 0 {
            let enters = self.r.read_i32()?;
            duration.tuplet =
                Tuplet::from_enters(enters).ok_or_else(|| self.r.invalid("tuplet", enters, 4))?;
        }
        Ok(duration)
    }

    fn read_beat_effects(&mut self) -> ReadResult<BeatEffects> {
        let flags1 = self.r.read_u8()?;
        let flags2 = self.r.read_u8()?;
        let mut effect = BeatEffects {
            vibrato: flags1 & 0x02 != 0,
            fade_in: flags1 & 0x10 != 0,
            rasgueado: flags2 & 0x01 != 0,
            ..BeatEffects::default()
        };
        if flags1 & 0x20 != 0 {
            effect.slap = Some(self.r.read_i8()?);
        }
        if flags2 & 0x04 != 0 {
            effect.tremolo_bar = Some(self.read_bend()?);
        }
        if flags1 & 0x40 != 0 {
            let down = self.r.read_i8()?;
            let up = self.r.read_i8()?;
            effect.stroke = Some(BeatStroke { down, up });
        }
        if flags2 & 0x02 != 0 {
            effect.pick_stroke = Some(self.r.read_i8()?);
        }
        Ok(effect)
    }

    fn read_mix_table(&mut self) -> ReadResult<MixTableChange> {
        let mut mix = MixTableChange::default();
        let instrument = self.r.read_i8()?;
        mix.instrument = (instrument >= 0).then_some(instrument);
        mix.rse = self.read_rse_instrument()?;
        if !self.version.is_510() {
            self.r.skip(1)?;
        }

        let mut values = [0i8; 6];
        for value in values.iter_mut() {
            *value = self.r.read_i8()?;
        }
        mix.tempo_name = self.r.read_int_byte_size_string()?;
        let tempo = self.r.read_i32()?;

        for (slot, &value) in mix.mixer_items_mut().into_iter().zip(values.iter()) {
            if value >= 0 {
                *slot = Some(MixTableItem::new(i32::from(value)));
            }
        }
        if tempo >= 0 {
            mix.tempo = Some(MixTableItem::new(tempo));
        }

        for slot in mix.mixer_items_mut() {
            if let Some(item) = slot.as_mut() {
                item.duration = self.r.read_i8()?;
            }
        }
        if let Some(item) = mix.tempo.as_mut() {
            item.duration = self.r.read_i8()?;
            if self.version.is_510() {
                mix.hide_tempo = self.r.read_bool()?;
            }
        }

        let flags = self.r.read_u8()?;
        for (bit, slot) in mix.mixer_items_mut().into_iter().enumerate() {
            if let Some(item) = slot.as_mut() {
                item.all_tracks = flags & (1 << bit) != 0;
            }
        }
        mix.use_rse = flags & 0x40 != 0;
        mix.show_wah = flags & 0x80 != 0;
        mix.wah = self.r.read_i8()?;

        if self.version.is_510() {
            mix.rse.effect = self.r.read_int_byte_size_string()?;
            mix.rse.effect_category = self.r.read_int_byte_size_string()?;
        }
        Ok(mix)
    }

    // ========================================================================
    // Chords
    // ========================================================================

    fn read_chord(&mut self, string_count: usize) -> ReadResult<Chord> {
        if !self.r.read_bool()? {
            return self.read_legacy_chord(string_count);
        }
        let mut chord = Chord::new("", string_count);
        chord.sharp = self.r.read_bool()?;
        self.r.skip(3)?;
        chord.root = self.r.read_u8()?;
        let kind = self.r.read_u8()?;
        chord.kind = ChordType::from_u8(kind).ok_or_else(|| self.r.invalid("chord type", kind, 1))?;
        let extension = self.r.read_u8()?;
        chord.extension = ChordExtension::from_u8(extension)
            .ok_or_else(|| self.r.invalid("chord extension", extension, 1))?;
        chord.bass = self.r.read_i32()?;
        let tonality = self.r.read_i32()?;
        chord.tonality = u8::try_from(tonality)
            .ok()
            .and_then(ChordAlteration::from_u8)
            .ok_or_else(|| self.r.invalid("chord tonality", tonality, 4))?;
        chord.add = self.r.read_bool()?;
        chord.name = self.r.read_byte_size_string(CHORD_NAME_FIELD)?;
        chord.fifth = self.read_alteration("chord fifth")?;
        chord.ninth = self.read_alteration("chord ninth")?;
        chord.eleventh = self.read_alteration("chord eleventh")?;
        chord.first_fret = self.r.read_i32()?;

        let mut frets = [-1i32; MAX_STRINGS];
        for fret in frets.iter_mut() {
            *fret = self.r.read_i32()?;
        }
        chord.strings = frets[..string_count.min(MAX_STRINGS)].to_vec();

        let barre_count = usize::from(self.r.read_u8()?);
        if barre_count > MAX_BARRES {
            return Err(self.r.invalid("barre count", barre_count as i64, 1));
        }
        let mut barre_bytes = [[0u8; MAX_BARRES]; 3];
        for row in barre_bytes.iter_mut() {
            for value in row.iter_mut() {
                *value = self.r.read_u8()?;
            }
        }
        chord.barres = (0..barre_count)
            .map(|i| Barre {
                fret: barre_bytes[0][i],
                start: barre_bytes[1][i],
                end: barre_bytes[2][i],
            })
            .collect();

        for omission in chord.omissions.iter_mut() {
            *omission = self.r.read_bool()?;
        }
        self.r.skip(1)?;
        for finger in chord.fingerings.iter_mut() {
            *finger = self.r.read_i8()?;
        }
        chord.show = self.r.read_bool()?;
        Ok(chord)
    }

    fn read_alteration(&mut self, field: &'static str) -> ReadResult<ChordAlteration> {
        let value = self.r.read_u8()?;
        ChordAlteration::from_u8(value).ok_or_else(|| self.r.invalid(field, value, 1))
    }

    /// Pre-GP4 diagram: name, first fret, and six frets when the first fret is set
    fn read_legacy_chord(&mut self, string_count: usize) -> ReadResult<Chord> {
        let mut chord = Chord::new(self.r.read_int_byte_size_string()?, string_count);
        chord.first_fret = self.r.read_i32()?;
        if chord.first_fret != 0 {
            for i in 0..6 {
                let fret = self.r.read_i32()?;
                if let Some(slot) = chord.strings.get_mut(i) {
                    *slot = fret;
                }
            }
        }
        Ok(chord)
    }

    // ========================================================================
    // Notes
    // ========================================================================

    fn read_note(&mut self, string: u8) -> ReadResult<Note> {
        let flags = self.r.read_u8()?;
        let mut note = Note::new(string, 0);
        note.effect.heavy_accentuated = flags & 0x02 != 0;
        note.effect.ghost = flags & 0x04 != 0;
        note.effect.accentuated = flags & 0x40 != 0;

        if flags & 0x20 != 0 {
            let kind = self.r.read_u8()?;
            note.kind = NoteType::from_u8(kind).ok_or_else(|| self.r.invalid("note type", kind, 1))?;
        }
        if flags & 0x10 != 0 {
            note.velocity = velocity_from_dynamic(self.r.read_i8()?);
        }
        if flags & 0x20 != 0 {
            let fret = self.r.read_i8()?;
            if !(0..=MAX_FRET as i8).contains(&fret) {
                return Err(self.r.invalid("fret", fret, 1));
            }
            note.fret = fret as u8;
        }
        if flags & 0x80 != 0 {
            let left = self.r.read_i8()?;
            let right = self.r.read_i8()?;
            note.effect.fingering = Some((left, right));
        }
        if flags & 0x01 != 0 {
            note.duration_percent = Some(self.r.read_f64()?);
        }
        let flags2 = self.r.read_u8()?;
        note.swap_accidentals = flags2 & 0x02 != 0;

        if flags & 0x08 != 0 {
            self.read_note_effects(&mut note.effect)?;
        }
        Ok(note)
    }

    fn read_note_effects(&mut self, effect: &mut NoteEffect) -> ReadResult<()> {
        let flags1 = self.r.read_u8()?;
        let flags2 = self.r.read_u8()?;
        effect.hammer = flags1 & 0x02 != 0;
        effect.let_ring = flags1 & 0x08 != 0;
        effect.staccato = flags2 & 0x01 != 0;
        effect.palm_mute = flags2 & 0x02 != 0;
        effect.vibrato = flags2 & 0x40 != 0;

        if flags1 & 0x01 != 0 {
            effect.bend = Some(self.read_bend()?);
        }
        if flags1 & 0x10 != 0 {
            effect.grace = Some(Grace {
                fret: self.r.read_u8()?,
                dynamic: self.r.read_u8()?,
                transition: self.r.read_u8()?,
                duration: self.r.read_u8()?,
                flags: self.r.read_u8()?,
            });
        }
        if flags2 & 0x04 != 0 {
            effect.tremolo_picking = Some(self.r.read_i8()?);
        }
        if flags2 & 0x08 != 0 {
            effect.slide = self.r.read_u8()?;
        }
        if flags2 & 0x10 != 0 {
            effect.harmonic = Some(self.read_harmonic()?);
        }
        if flags2 & 0x20 != 0 {
            let fret = self.r.read_i8()?;
            let period = self.r.read_i8()?;
            effect.trill = Some(Trill { fret, period });
        }
        Ok(())
    }

    fn read_harmonic(&mut self) -> ReadResult<Harmonic> {
        let code = self.r.read_i8()?;
        Ok(match code {
            1 => Harmonic::Natural,
            2 => Harmonic::Artificial {
                semitone: self.r.read_u8()?,
                accidental: self.r.read_i8()?,
                octave: self.r.read_u8()?,
            },
            3 => Harmonic::Tapped {
                fret: self.r.read_u8()?,
            },
            4 => Harmonic::Pinch,
            5 => Harmonic::Semi,
            other => return Err(self.r.invalid("harmonic type", other, 1)),
        })
    }

    fn read_bend(&mut self) -> ReadResult<Bend> {
        let kind = self.r.read_i8()?;
        let value = self.r.read_i32()?;
        let count = self.r.read_count("bend point count")?;
        let mut points = Vec::new();
        for _ in 0..count {
            points.push(BendPoint {
                position: self.r.read_i32()?,
                value: self.r.read_i32()?,
                vibrato: self.r.read_bool()?,
            });
        }
        Ok(Bend { kind, value, points })
    }
}

/// Attach each direction slot (1-based measure or -1) to its header
fn apply_directions(headers: &mut [MeasureHeader], directions: &[i16; DIRECTION_SLOTS]) {
    for (slot, &measure) in directions.iter().enumerate() {
        if measure < 1 {
            continue;
        }
        let (Some(sign), Some(header)) = (
            DirectionSign::from_index(slot),
            headers.get_mut(measure as usize - 1),
        ) else {
            log::warn!("direction {} points at missing measure {}", slot, measure);
            continue;
        };
        header.directions.push(sign);
    }
}
