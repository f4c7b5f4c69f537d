use crate::model::song::{Chart, Note};
use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

pub const NOTE_MAGIC: &[u8; 4] = b"NOTE";
pub const NOTE_VERSION_MAJOR: u16 = 1;
pub const NOTE_VERSION_MINOR: u16 = 0;

/// Fixed width of the author field in the header, NUL-padded.
pub const AUTHOR_FIELD_LEN: usize = 32;

/// Header bytes kept at zero for future format revisions.
const HEADER_RESERVED_LEN: usize = 15;

/// Primitive encodings used by the .note format. Multi-byte values are
/// little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireKind {
    U16Le,
    U32Le,
    I8,
    F32Le,
    Bytes(usize),
}

impl WireKind {
    pub const fn width(self) -> usize {
        match self {
            WireKind::U16Le => 2,
            WireKind::U32Le => 4,
            WireKind::I8 => 1,
            WireKind::F32Le => 4,
            WireKind::Bytes(len) => len,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WireField {
    pub name: &'static str,
    pub kind: WireKind,
}

/// Byte-for-byte layout of the .note header, in file order.
pub const HEADER_LAYOUT: &[WireField] = &[
    WireField { name: "magic", kind: WireKind::Bytes(4) },
    WireField { name: "version_major", kind: WireKind::U16Le },
    WireField { name: "version_minor", kind: WireKind::U16Le },
    WireField { name: "ms_per_pixel", kind: WireKind::U32Le },
    WireField { name: "note_count", kind: WireKind::U32Le },
    WireField { name: "author", kind: WireKind::Bytes(AUTHOR_FIELD_LEN) },
    WireField { name: "difficulty", kind: WireKind::I8 },
    WireField { name: "reserved", kind: WireKind::Bytes(HEADER_RESERVED_LEN) },
];

/// Byte-for-byte layout of one note record, in file order.
pub const NOTE_RECORD_LAYOUT: &[WireField] = &[
    WireField { name: "color", kind: WireKind::I8 },
    WireField { name: "direction", kind: WireKind::I8 },
    WireField { name: "start_ms", kind: WireKind::U32Le },
    WireField { name: "length_ms", kind: WireKind::U32Le },
    WireField { name: "speed", kind: WireKind::F32Le },
];

const fn layout_len(fields: &[WireField]) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < fields.len() {
        total += fields[i].kind.width();
        i += 1;
    }
    total
}

pub const HEADER_LEN: usize = layout_len(HEADER_LAYOUT);
pub const NOTE_RECORD_LEN: usize = layout_len(NOTE_RECORD_LAYOUT);

/// A value destined for one layout field.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    U16(u16),
    U32(u32),
    I8(i8),
    F32(f32),
    Bytes(Vec<u8>),
}

/// Append `values` to `out` according to `layout`. Values must match the
/// layout field-for-field; a mismatch is a bug in the caller, not bad chart data.
pub fn pack_fields(layout: &[WireField], values: &[WireValue], out: &mut Vec<u8>) -> Result<()> {
    if layout.len() != values.len() {
        bail!(
            "Layout holds {} fields but {} values were provided..!",
            layout.len(),
            values.len()
        );
    }

    for (spec_field, value) in layout.iter().zip(values) {
        match (spec_field.kind, value) {
            (WireKind::U16Le, WireValue::U16(v)) => out.extend_from_slice(&v.to_le_bytes()),
            (WireKind::U32Le, WireValue::U32(v)) => out.extend_from_slice(&v.to_le_bytes()),
            (WireKind::I8, WireValue::I8(v)) => out.extend_from_slice(&v.to_le_bytes()),
            (WireKind::F32Le, WireValue::F32(v)) => out.extend_from_slice(&v.to_le_bytes()),
            (WireKind::Bytes(len), WireValue::Bytes(bytes)) if bytes.len() == len => {
                out.extend_from_slice(bytes);
            }
            (kind, value) => bail!(
                "Field '{}' holds {:?} but {:?} was provided..!",
                spec_field.name,
                kind,
                value
            ),
        }
    }

    Ok(())
}

/// Encode a chart into the complete contents of a .note file.
pub fn encode_chart(chart: &Chart) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(HEADER_LEN + chart.notes.len() * NOTE_RECORD_LEN);

    pack_fields(HEADER_LAYOUT, &header_values(chart), &mut out)?;
    for note in &chart.notes {
        pack_fields(
            NOTE_RECORD_LAYOUT,
            &note_values(note, chart.song.lead_in_ms),
            &mut out,
        )?;
    }

    Ok(out)
}

fn header_values(chart: &Chart) -> Vec<WireValue> {
    vec![
        WireValue::Bytes(NOTE_MAGIC.to_vec()),
        WireValue::U16(NOTE_VERSION_MAJOR),
        WireValue::U16(NOTE_VERSION_MINOR),
        WireValue::U32(chart.song.ms_per_pixel),
        WireValue::U32(chart.notes.len() as u32),
        WireValue::Bytes(author_field(chart.song.author.as_deref()).to_vec()),
        WireValue::I8(chart.song.difficulty),
        WireValue::Bytes(vec![0; HEADER_RESERVED_LEN]),
    ]
}

fn note_values(note: &Note, lead_in_ms: u32) -> Vec<WireValue> {
    vec![
        WireValue::I8(note.color.wire_index()),
        WireValue::I8(note.direction.wire_index()),
        // The player never sees chart-local time; every start is shifted by the lead-in.
        WireValue::U32(note.start_ms.saturating_add(lead_in_ms)),
        WireValue::U32(note.length_ms),
        WireValue::F32(note.speed.unwrap_or(1.0)),
    ]
}

fn author_field(author: Option<&str>) -> [u8; AUTHOR_FIELD_LEN] {
    let mut out = [0u8; AUTHOR_FIELD_LEN];
    let bytes = author.map(str::as_bytes).unwrap_or_default();
    let len = bytes.len().min(AUTHOR_FIELD_LEN);
    out[..len].copy_from_slice(&bytes[..len]);
    out
}

/// Path of the .note artifact a chart file compiles to, next to the input.
pub fn artifact_path_for(input: &Path) -> PathBuf {
    let mut path = input.to_path_buf();
    path.set_extension("note");
    path
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::song::{Direction, NoteColor, Song};

    fn note(color: NoteColor, direction: Direction, start_ms: u32, length_ms: u32) -> Note {
        Note {
            color,
            direction,
            start_ms,
            length_ms,
            speed: None,
        }
    }

    fn chart(lead_in_ms: u32, notes: Vec<Note>) -> Chart {
        Chart {
            song: Song {
                ms_per_pixel: 10,
                lead_in_ms,
                author: Some("Jane".to_string()),
                difficulty: 5,
            },
            notes,
        }
    }

    #[test]
    fn layout_tables_fix_the_record_sizes() {
        assert_eq!(HEADER_LEN, 64);
        assert_eq!(NOTE_RECORD_LEN, 14);
    }

    #[test]
    fn file_size_is_header_plus_records() {
        for count in [0, 1, 3] {
            let notes = (0..count)
                .map(|i| note(NoteColor::Red, Direction::Left, i * 100, 50))
                .collect();
            let bytes = encode_chart(&chart(0, notes)).unwrap();
            assert_eq!(bytes.len(), HEADER_LEN + count as usize * NOTE_RECORD_LEN);
        }
    }

    #[test]
    fn header_bytes_land_at_their_documented_offsets() {
        let bytes =
            encode_chart(&chart(0, vec![note(NoteColor::Red, Direction::Left, 0, 50)])).unwrap();

        assert_eq!(&bytes[0..4], b"NOTE");
        assert_eq!(&bytes[4..6], &1u16.to_le_bytes());
        assert_eq!(&bytes[6..8], &0u16.to_le_bytes());
        assert_eq!(&bytes[8..12], &10u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &1u32.to_le_bytes());

        let mut author = [0u8; AUTHOR_FIELD_LEN];
        author[..4].copy_from_slice(b"Jane");
        assert_eq!(&bytes[16..48], &author);

        assert_eq!(bytes[48], 5);
        assert!(bytes[49..64].iter().all(|&b| b == 0));
    }

    #[test]
    fn note_record_applies_lead_in_and_default_speed() {
        let bytes = encode_chart(&chart(
            1000,
            vec![note(NoteColor::Green, Direction::Right, 250, 75)],
        ))
        .unwrap();
        let record = &bytes[HEADER_LEN..];

        assert_eq!(record.len(), NOTE_RECORD_LEN);
        assert_eq!(record[0], 1); // green
        assert_eq!(record[1], 1); // right
        assert_eq!(&record[2..6], &1250u32.to_le_bytes());
        assert_eq!(&record[6..10], &75u32.to_le_bytes());
        assert_eq!(&record[10..14], &1.0f32.to_le_bytes());
        assert_eq!(&record[10..14], &[0x00, 0x00, 0x80, 0x3F]);
    }

    #[test]
    fn explicit_speed_is_written_as_f32() {
        let mut fast = note(NoteColor::Blue, Direction::Left, 0, 50);
        fast.speed = Some(2.5);

        let bytes = encode_chart(&chart(0, vec![fast])).unwrap();
        assert_eq!(&bytes[HEADER_LEN + 10..], &2.5f32.to_le_bytes());
    }

    #[test]
    fn start_ms_saturates_instead_of_wrapping() {
        let bytes = encode_chart(&chart(
            u32::MAX,
            vec![note(NoteColor::Red, Direction::Left, 100, 50)],
        ))
        .unwrap();

        assert_eq!(&bytes[HEADER_LEN + 2..HEADER_LEN + 6], &u32::MAX.to_le_bytes());
    }

    #[test]
    fn missing_author_fills_the_field_with_zeros() {
        let mut anonymous = chart(0, vec![]);
        anonymous.song.author = None;

        let bytes = encode_chart(&anonymous).unwrap();
        assert!(bytes[16..48].iter().all(|&b| b == 0));
    }

    #[test]
    fn oversized_author_is_truncated_at_the_field_width() {
        let field = author_field(Some("abcdefghijklmnopqrstuvwxyz0123456789"));
        assert_eq!(&field[..], b"abcdefghijklmnopqrstuvwxyz012345");
    }

    #[test]
    fn pack_rejects_value_count_mismatch() {
        let mut out = Vec::new();
        let result = pack_fields(NOTE_RECORD_LAYOUT, &[WireValue::I8(0)], &mut out);
        assert!(result.is_err());
    }

    #[test]
    fn pack_rejects_kind_mismatch() {
        let layout = &[WireField { name: "start_ms", kind: WireKind::U32Le }];
        let mut out = Vec::new();
        let result = pack_fields(layout, &[WireValue::F32(1.0)], &mut out);

        assert!(result.unwrap_err().to_string().contains("start_ms"));
    }

    #[test]
    fn artifact_path_swaps_the_extension() {
        assert_eq!(
            artifact_path_for(Path::new("songs/demo.yaml")),
            PathBuf::from("songs/demo.note")
        );
        assert_eq!(
            artifact_path_for(Path::new("bare")),
            PathBuf::from("bare.note")
        );
    }
}
