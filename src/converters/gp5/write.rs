//! GP5 encoding: [`Song`] → bytes

use super::writer::Writer;
use super::{
    channel_byte_from_value, dynamic_from_velocity, ChannelSlot, CHANNEL_SLOTS, CHORD_NAME_FIELD,
    DIRECTION_SLOTS, TRACK_NAME_FIELD, VERSION_FIELD,
};
use crate::models::*;

/// Encode a song as GP5 in the revision named by `song.version`
///
/// Never fails. Values the format cannot hold are clamped or truncated, and
/// items that cannot be placed (notes on strings the track lacks, voices past
/// the second) are dropped with a warning.
pub fn encode(song: &Song) -> Vec<u8> {
    let mut gp = SongWriter {
        w: Writer::new(),
        version: song.version,
    };
    gp.write_song(song);
    let bytes = gp.w.into_bytes();
    log::debug!(
        "encoded '{}' as {} ({} bytes)",
        song.title,
        song.version.version_string(),
        bytes.len()
    );
    bytes
}

struct SongWriter {
    w: Writer,
    version: FormatVersion,
}

impl SongWriter {
    fn write_song(&mut self, song: &Song) {
        self.w
            .write_byte_size_string(self.version.version_string(), VERSION_FIELD);
        self.write_info(song);
        self.write_lyrics(&song.lyrics);
        if self.version.is_510() {
            self.w.write_i32(song.master_effect.volume);
            self.w.write_i32(0);
            for &band in &song.master_effect.equalizer {
                self.w.write_i8(band);
            }
        }
        self.write_page_setup(&song.page_setup);
        self.w.write_int_byte_size_string(&song.tempo_name);
        self.w.write_i32(song.tempo);
        if self.version.is_510() {
            self.w.write_bool(song.hide_tempo);
        }
        self.w.write_i8(song.key);
        self.w.placeholder(3);
        self.w.write_i8(0); // octave

        self.write_channel_slots(&song.tracks);
        self.write_directions(&song.measure_headers);
        self.w.write_i32(song.master_effect.reverb);

        self.w.write_i32(song.measure_headers.len() as i32);
        self.w.write_i32(song.tracks.len() as i32);

        let mut previous: Option<&MeasureHeader> = None;
        for (index, header) in song.measure_headers.iter().enumerate() {
            if index > 0 {
                self.w.placeholder(1);
            }
            self.write_measure_header(header, previous);
            previous = Some(header);
        }

        for (number, track) in song.tracks.iter().enumerate() {
            self.write_track(number, track);
        }
        self.w.placeholder(if self.version.is_510() { 1 } else { 2 });

        let empty = Measure::new();
        for index in 0..song.measure_headers.len() {
            for track in &song.tracks {
                let measure = track.measures.get(index).unwrap_or(&empty);
                self.write_measure(measure, &track.strings);
            }
        }
    }

    fn write_info(&mut self, song: &Song) {
        for text in [
            &song.title,
            &song.subtitle,
            &song.artist,
            &song.album,
            &song.words,
            &song.music,
            &song.copyright,
            &song.tab,
            &song.instructions,
        ] {
            self.w.write_int_byte_size_string(text);
        }
        self.w.write_i32(song.notice.len() as i32);
        for line in &song.notice {
            self.w.write_int_byte_size_string(line);
        }
    }

    fn write_lyrics(&mut self, lyrics: &Lyrics) {
        self.w.write_i32(lyrics.track_choice);
        for line in &lyrics.lines {
            self.w.write_i32(line.starting_measure);
            self.w.write_int_size_string(&line.text);
        }
    }

    fn write_page_setup(&mut self, page: &PageSetup) {
        for value in [
            page.width,
            page.height,
            page.margin_left,
            page.margin_right,
            page.margin_top,
            page.margin_bottom,
            page.score_size_proportion,
        ] {
            self.w.write_i32(value);
        }
        self.w.write_i16(page.header_footer);
        for text in [
            &page.title,
            &page.subtitle,
            &page.artist,
            &page.album,
            &page.words,
            &page.music,
            &page.words_and_music,
            &page.copyright[0],
            &page.copyright[1],
            &page.page_number,
        ] {
            self.w.write_int_byte_size_string(text);
        }
    }

    fn write_channel_slots(&mut self, tracks: &[Track]) {
        let mut slots = [ChannelSlot::default(); CHANNEL_SLOTS];
        let mut claimed = [false; CHANNEL_SLOTS];
        for (index, slot) in slots.iter_mut().enumerate() {
            if index % 16 == usize::from(PERCUSSION_CHANNEL) {
                slot.instrument = 0;
            }
        }
        for track in tracks {
            let channel = &track.channel;
            for index in [channel.channel, channel.effect_channel] {
                let index = usize::from(index);
                if index < CHANNEL_SLOTS && !claimed[index] {
                    claimed[index] = true;
                    slots[index] = ChannelSlot {
                        instrument: channel.instrument,
                        volume: channel.volume,
                        balance: channel.balance,
                        chorus: channel.chorus,
                        reverb: channel.reverb,
                        phaser: channel.phaser,
                        tremolo: channel.tremolo,
                    };
                }
            }
        }

        for (index, slot) in slots.iter().enumerate() {
            let percussion = index % 16 == usize::from(PERCUSSION_CHANNEL);
            if percussion && slot.instrument == 0 {
                self.w.write_i32(-1);
            } else {
                self.w.write_i32(slot.instrument);
            }
            for value in [
                slot.volume,
                slot.balance,
                slot.chorus,
                slot.reverb,
                slot.phaser,
                slot.tremolo,
            ] {
                self.w.write_i8(channel_byte_from_value(value));
            }
            self.w.placeholder(2);
        }
    }

    fn write_directions(&mut self, headers: &[MeasureHeader]) {
        for slot in 0..DIRECTION_SLOTS {
            let measure = DirectionSign::from_index(slot)
                .and_then(|sign| headers.iter().position(|h| h.directions.contains(&sign)))
                .map(|index| (index + 1) as i16)
                .unwrap_or(-1);
            self.w.write_i16(measure);
        }
    }

    // ========================================================================
    // Measure headers
    // ========================================================================

    fn write_measure_header(&mut self, header: &MeasureHeader, previous: Option<&MeasureHeader>) {
        let time = header.time_signature;
        let mut flags = 0u8;
        match previous {
            None => flags |= 0x01 | 0x02 | 0x40,
            Some(previous) => {
                let before = previous.time_signature;
                if time.numerator != before.numerator || time.beams != before.beams {
                    flags |= 0x01;
                }
                if time.denominator != before.denominator {
                    flags |= 0x02;
                }
                if header.key_signature != previous.key_signature {
                    flags |= 0x40;
                }
            }
        }
        if header.repeat_open {
            flags |= 0x04;
        }
        if header.is_repeat_close() {
            flags |= 0x08;
        }
        if header.repeat_alternative != 0 {
            flags |= 0x10;
        }
        if header.marker.is_some() {
            flags |= 0x20;
        }
        if header.double_bar {
            flags |= 0x80;
        }

        self.w.write_u8(flags);
        if flags & 0x01 != 0 {
            self.w.write_i8(time.numerator.min(127) as i8);
        }
        if flags & 0x02 != 0 {
            self.w.write_i8(time.denominator.min(64) as i8);
        }
        if flags & 0x08 != 0 {
            self.w.write_u8(header.repeat_close);
        }
        if let Some(marker) = &header.marker {
            self.w.write_int_byte_size_string(&marker.title);
            self.w.write_color(marker.color);
        }
        if flags & 0x10 != 0 {
            self.w.write_u8(header.repeat_alternative);
        }
        if flags & 0x40 != 0 {
            self.w.write_i8(header.key_signature.key);
            self.w.write_i8(i8::from(header.key_signature.minor));
        }
        if flags & 0x03 != 0 {
            for &beam in &time.beams {
                self.w.write_u8(beam);
            }
        }
        if flags & 0x10 == 0 {
            self.w.placeholder(1);
        }
        self.w.write_u8(header.triplet_feel as u8);
    }

    // ========================================================================
    // Tracks
    // ========================================================================

    fn write_track(&mut self, number: usize, track: &Track) {
        if number == 0 || !self.version.is_510() {
            self.w.placeholder(1);
        }
        let mut flags = 0u8;
        for (bit, set) in [
            track.is_percussion,
            track.is_12_string,
            track.is_banjo,
            track.is_visible,
            track.is_solo,
            track.is_mute,
            track.use_rse,
            track.indicate_tuning,
        ]
        .into_iter()
        .enumerate()
        {
            if set {
                flags |= 1 << bit;
            }
        }
        self.w.write_u8(flags);
        self.w.write_byte_size_string(&track.name, TRACK_NAME_FIELD);

        let mut strings = track.strings.clone();
        strings.sort_by_key(|s| s.number);
        if strings.len() > MAX_STRINGS {
            log::warn!(
                "track '{}' has {} strings, writing the first {}",
                track.name,
                strings.len(),
                MAX_STRINGS
            );
            strings.truncate(MAX_STRINGS);
        }
        self.w.write_i32(strings.len() as i32);
        for i in 0..MAX_STRINGS {
            self.w
                .write_i32(strings.get(i).map(|s| i32::from(s.value)).unwrap_or(0));
        }

        self.w.write_i32(track.port);
        self.write_channel_reference(track);
        self.w.write_i32(track.fret_count);
        self.w.write_i32(track.offset);
        self.w.write_color(track.color);

        self.w.write_i16(track.display_flags as i16);
        self.w.write_u8(track.rse.auto_accentuation);
        self.w.write_u8(track.channel.bank);

        self.w.write_u8(track.rse.humanize);
        self.w.write_i32(0);
        self.w.write_i32(0);
        self.w.write_i32(100);
        self.w.placeholder(12);
        self.write_rse_instrument(&track.rse.instrument);
        if self.version.is_510() {
            for &knob in &track.rse.equalizer {
                self.w.write_i8(knob);
            }
            self.w.write_int_byte_size_string(&track.rse.instrument.effect);
            self.w
                .write_int_byte_size_string(&track.rse.instrument.effect_category);
        }
    }

    fn write_channel_reference(&mut self, track: &Track) {
        let last = (CHANNEL_SLOTS - 1) as u8;
        let channel = track.channel.channel;
        let effect = track.channel.effect_channel;
        if channel > last || effect > last {
            log::warn!(
                "track '{}' channel {}/{} is outside the file's {} channels, clamping",
                track.name,
                channel,
                effect,
                CHANNEL_SLOTS
            );
        }
        self.w.write_i32(i32::from(channel.min(last)) + 1);
        self.w.write_i32(i32::from(effect.min(last)) + 1);
    }

    fn write_rse_instrument(&mut self, instrument: &RseInstrument) {
        self.w.write_i32(instrument.instrument);
        self.w.write_i32(instrument.unknown);
        self.w.write_i32(instrument.sound_bank);
        if self.version.is_510() {
            self.w.write_i32(instrument.effect_number);
        } else {
            self.w.write_i16(instrument.effect_number as i16);
            self.w.placeholder(1);
        }
    }

    // ========================================================================
    // Measures, voices, beats
    // ========================================================================

    fn write_measure(&mut self, measure: &Measure, strings: &[GuitarString]) {
        if measure.voices.len() > VOICES_PER_MEASURE
            && measure.voices[VOICES_PER_MEASURE..].iter().any(|v| !v.is_empty())
        {
            log::warn!(
                "measure has {} voices, only {} are written",
                measure.voices.len(),
                VOICES_PER_MEASURE
            );
        }
        for index in 0..VOICES_PER_MEASURE {
            let beats: &[Beat] = measure
                .voices
                .get(index)
                .map(|v| v.beats.as_slice())
                .unwrap_or(&[]);
            self.w.write_i32(beats.len() as i32);
            for beat in beats {
                self.write_beat(beat, strings);
            }
        }
        self.w.write_u8(measure.line_break);
    }

    fn write_beat(&mut self, beat: &Beat, strings: &[GuitarString]) {
        let duration = beat.duration;
        let mut flags = 0u8;
        if duration.dotted {
            flags |= 0x01;
        }
        if beat.chord.is_some() {
            flags |= 0x02;
        }
        if beat.text.is_some() {
            flags |= 0x04;
        }
        if !beat.effect.is_default() {
            flags |= 0x08;
        }
        if beat.mix_table.is_some() {
            flags |= 0x10;
        }
        if !duration.tuplet.is_none() {
            flags |= 0x20;
        }
        if beat.status != BeatStatus::Normal {
            flags |= 0x40;
        }

        self.w.write_u8(flags);
        if flags & 0x40 != 0 {
            self.w.write_u8(beat.status as u8);
        }
        self.w.write_i8(duration_code(duration.value));
        if flags & 0x20 != 0 {
            self.w.write_i32(i32::from(duration.tuplet.enters));
        }
        if let Some(chord) = &beat.chord {
            self.write_chord(chord);
        }
        if let Some(text) = &beat.text {
            self.w.write_int_byte_size_string(text);
        }
        if flags & 0x08 != 0 {
            self.write_beat_effects(&beat.effect);
        }
        if let Some(mix) = &beat.mix_table {
            self.write_mix_table(mix);
        }

        let mut sorted: Vec<&GuitarString> = strings.iter().collect();
        sorted.sort_by_key(|s| s.number);
        let placed: Vec<&Note> = sorted
            .iter()
            .filter(|s| (1..=MAX_STRINGS as u8).contains(&s.number))
            .filter_map(|s| beat.note_on_string(s.number))
            .collect();
        if placed.len() != beat.notes.len() {
            log::warn!(
                "dropping {} note(s) on strings the track does not have",
                beat.notes.len() - placed.len()
            );
        }
        let mut string_flags = 0u8;
        for note in &placed {
            string_flags |= 1 << (7 - note.string);
        }
        self.w.write_u8(string_flags);
        for note in placed {
            self.write_note(note);
        }

        self.w.write_i16(beat.display_flags as i16);
        if beat.display_flags & 0x0800 != 0 {
            self.w.write_u8(beat.break_secondary);
        }
    }

    fn write_beat_effects(&mut self, effect: &BeatEffects) {
        let mut flags1 = 0u8;
        let mut flags2 = 0u8;
        if effect.vibrato {
            flags1 |= 0x02;
        }
        if effect.fade_in {
            flags1 |= 0x10;
        }
        if effect.slap.is_some() {
            flags1 |= 0x20;
        }
        if effect.stroke.is_some() {
            flags1 |= 0x40;
        }
        if effect.rasgueado {
            flags2 |= 0x01;
        }
        if effect.pick_stroke.is_some() {
            flags2 |= 0x02;
        }
        if effect.tremolo_bar.is_some() {
            flags2 |= 0x04;
        }
        self.w.write_u8(flags1);
        self.w.write_u8(flags2);

        if let Some(slap) = effect.slap {
            self.w.write_i8(slap);
        }
        if let Some(bar) = &effect.tremolo_bar {
            self.write_bend(bar);
        }
        if let Some(stroke) = effect.stroke {
            self.w.write_i8(stroke.down);
            self.w.write_i8(stroke.up);
        }
        if let Some(pick) = effect.pick_stroke {
            self.w.write_i8(pick);
        }
    }

    fn write_mix_table(&mut self, mix: &MixTableChange) {
        self.w.write_i8(mix.instrument.unwrap_or(-1));
        self.write_rse_instrument(&mix.rse);
        if !self.version.is_510() {
            self.w.placeholder(1);
        }
        let items = mix.mixer_items();
        for item in &items {
            self.w
                .write_i8(item.map(|i| i.value.clamp(0, 127) as i8).unwrap_or(-1));
        }
        self.w.write_int_byte_size_string(&mix.tempo_name);
        self.w
            .write_i32(mix.tempo.map(|t| t.value.max(0)).unwrap_or(-1));

        for item in items.iter().flatten() {
            self.w.write_i8(item.duration);
        }
        if let Some(tempo) = mix.tempo {
            self.w.write_i8(tempo.duration);
            if self.version.is_510() {
                self.w.write_bool(mix.hide_tempo);
            }
        }

        let mut flags = 0u8;
        for (bit, item) in items.iter().enumerate() {
            if item.is_some_and(|i| i.all_tracks) {
                flags |= 1 << bit;
            }
        }
        if mix.use_rse {
            flags |= 0x40;
        }
        if mix.show_wah {
            flags |= 0x80;
        }
        self.w.write_u8(flags);
        self.w.write_i8(mix.wah);

        if self.version.is_510() {
            self.w.write_int_byte_size_string(&mix.rse.effect);
            self.w.write_int_byte_size_string(&mix.rse.effect_category);
        }
    }

    fn write_chord(&mut self, chord: &Chord) {
        self.w.write_bool(true);
        self.w.write_bool(chord.sharp);
        self.w.placeholder(3);
        self.w.write_u8(chord.root);
        self.w.write_u8(chord.kind as u8);
        self.w.write_u8(chord.extension as u8);
        self.w.write_i32(chord.bass);
        self.w.write_i32(chord.tonality as i32);
        self.w.write_bool(chord.add);
        self.w.write_byte_size_string(&chord.name, CHORD_NAME_FIELD);
        self.w.write_u8(chord.fifth as u8);
        self.w.write_u8(chord.ninth as u8);
        self.w.write_u8(chord.eleventh as u8);
        self.w.write_i32(chord.first_fret);
        for i in 0..MAX_STRINGS {
            self.w.write_i32(chord.strings.get(i).copied().unwrap_or(-1));
        }

        let barres = &chord.barres[..chord.barres.len().min(MAX_BARRES)];
        let mut frets = [0u8; MAX_BARRES];
        let mut starts = [0u8; MAX_BARRES];
        let mut ends = [0u8; MAX_BARRES];
        for (i, barre) in barres.iter().enumerate() {
            frets[i] = barre.fret;
            starts[i] = barre.start;
            ends[i] = barre.end;
        }
        self.w.write_u8(barres.len() as u8);
        for row in [frets, starts, ends] {
            for value in row {
                self.w.write_u8(value);
            }
        }

        for &omission in &chord.omissions {
            self.w.write_bool(omission);
        }
        self.w.placeholder(1);
        for &finger in &chord.fingerings {
            self.w.write_i8(finger);
        }
        self.w.write_bool(chord.show);
    }

    // ========================================================================
    // Notes
    // ========================================================================

    fn write_note(&mut self, note: &Note) {
        let effect = &note.effect;
        let mut flags = 0x20u8;
        if note.duration_percent.is_some() {
            flags |= 0x01;
        }
        if effect.heavy_accentuated {
            flags |= 0x02;
        }
        if effect.ghost {
            flags |= 0x04;
        }
        if !effect.is_default() {
            flags |= 0x08;
        }
        if note.velocity != DEFAULT_VELOCITY {
            flags |= 0x10;
        }
        if effect.accentuated {
            flags |= 0x40;
        }
        if effect.fingering.is_some() {
            flags |= 0x80;
        }

        self.w.write_u8(flags);
        self.w.write_u8(note.kind as u8);
        if flags & 0x10 != 0 {
            self.w.write_i8(dynamic_from_velocity(note.velocity));
        }
        self.w.write_i8(note.fret.min(MAX_FRET) as i8);
        if let Some((left, right)) = effect.fingering {
            self.w.write_i8(left);
            self.w.write_i8(right);
        }
        if let Some(percent) = note.duration_percent {
            self.w.write_f64(percent);
        }
        self.w
            .write_u8(if note.swap_accidentals { 0x02 } else { 0x00 });
        if flags & 0x08 != 0 {
            self.write_note_effects(effect);
        }
    }

    fn write_note_effects(&mut self, effect: &NoteEffect) {
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
        if effect.is_slide() {
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
        self.w.write_u8(flags1);
        self.w.write_u8(flags2);

        if let Some(bend) = &effect.bend {
            self.write_bend(bend);
        }
        if let Some(grace) = effect.grace {
            self.w.write_u8(grace.fret);
            self.w.write_u8(grace.dynamic);
            self.w.write_u8(grace.transition);
            self.w.write_u8(grace.duration);
            self.w.write_u8(grace.flags);
        }
        if let Some(speed) = effect.tremolo_picking {
            self.w.write_i8(speed);
        }
        if effect.is_slide() {
            self.w.write_u8(effect.slide);
        }
        if let Some(harmonic) = effect.harmonic {
            self.w.write_i8(harmonic.code());
            match harmonic {
                Harmonic::Artificial {
                    semitone,
                    accidental,
                    octave,
                } => {
                    self.w.write_u8(semitone);
                    self.w.write_i8(accidental);
                    self.w.write_u8(octave);
                }
                Harmonic::Tapped { fret } => self.w.write_u8(fret),
                Harmonic::Natural | Harmonic::Pinch | Harmonic::Semi => {}
            }
        }
        if let Some(trill) = effect.trill {
            self.w.write_i8(trill.fret);
            self.w.write_i8(trill.period);
        }
    }

    fn write_bend(&mut self, bend: &Bend) {
        self.w.write_i8(bend.kind);
        self.w.write_i32(bend.value);
        self.w.write_i32(bend.points.len() as i32);
        for point in &bend.points {
            self.w.write_i32(point.position);
            self.w.write_i32(point.value);
            self.w.write_bool(point.vibrato);
        }
    }
}

/// `log2(value) - 2`: whole = -2, quarter = 0, sixty-fourth = 4
fn duration_code(value: u8) -> i8 {
    let value = if Duration::is_valid_value(u32::from(value)) {
        value
    } else {
        log::warn!("invalid duration value {}, writing a quarter", value);
        4
    };
    value.trailing_zeros() as i8 - 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::gp5::decode;

    fn one_note_song(version: FormatVersion) -> Song {
        let mut song = Song {
            version,
            title: "Round".into(),
            ..Song::default()
        };
        song.add_track(Track::new("Guitar"));
        song.add_measure_header(MeasureHeader::default()).unwrap();
        let mut beat = Beat::new(Duration::new(4));
        beat.set_note(Note::new(1, 3));
        song.tracks[0].measures[0].voices[0].beats.push(beat);
        song
    }

    #[test]
    fn test_duration_codes() {
        assert_eq!(duration_code(1), -2);
        assert_eq!(duration_code(4), 0);
        assert_eq!(duration_code(64), 4);
    }

    #[test]
    fn test_header_starts_with_version() {
        let bytes = encode(&one_note_song(FormatVersion::V510));
        assert_eq!(bytes[0], 24);
        assert_eq!(&bytes[1..25], b"FICHIER GUITAR PRO v5.10");
        assert!(bytes.len() > 31);
    }

    #[test]
    fn test_round_trip_both_versions() {
        for version in [FormatVersion::V500, FormatVersion::V510] {
            let song = one_note_song(version);
            let decoded = decode(&encode(&song)).unwrap();
            assert_eq!(decoded, song);
        }
    }

    #[test]
    fn test_marker_and_key_change_round_trip() {
        let mut song = one_note_song(FormatVersion::V510);
        let mut header = MeasureHeader::new(TimeSignature::new(3, 4));
        header.marker = Some(Marker::new("Chorus"));
        header.key_signature = KeySignature { key: 2, minor: false };
        header.time_signature.beams = [3, 3, 0, 0];
        song.add_measure_header(header).unwrap();
        song.add_measure_header(MeasureHeader::default()).unwrap();

        let decoded = decode(&encode(&song)).unwrap();
        assert_eq!(decoded.measure_headers, song.measure_headers);
    }
}
