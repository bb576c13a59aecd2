use super::*;
use std::io::Cursor;

const COLUMNS: &str = "ITEM: ATOMS id mol type x y z";

fn frame(timestep: u64, length: f64, rows: &[&str]) -> String {
    let mut text = format!(
        "ITEM: TIMESTEP\n{timestep}\nITEM: NUMBER OF ATOMS\n{}\nITEM: BOX BOUNDS pp pp pp\n",
        rows.len()
    );
    for _ in 0..3 {
        text.push_str(&format!("0.0 {length}\n"));
    }
    text.push_str(COLUMNS);
    text.push('\n');
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

fn trajectory(frames: usize) -> String {
    (0..frames)
        .map(|i| {
            let x = i as f64;
            let rows = [
                format!("1 1 O {x} 0.0 0.0"),
                format!("2 1 H {x} 1.0 0.0"),
                format!("3 2 C {x} 2.0 0.0"),
            ];
            let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
            frame(i as u64 * 100, 10.0 + i as f64, &rows)
        })
        .collect()
}

fn request() -> ColumnRequest {
    ColumnRequest::coords(CoordKind::Wrapped)
        .with_species(Need::Required)
        .with_molecule(Need::Optional)
}

#[test]
fn test_reads_every_frame_in_order() {
    let mut reader = DumpReader::new(Cursor::new(trajectory(3)), request());
    assert!(reader.schema().is_none());
    for expected in 0..3 {
        let frame = reader.next_records().unwrap();
        assert_eq!(frame.index, expected);
        assert_eq!(frame.box_dims.lengths[0], 10.0 + expected as f64);
        assert_eq!(frame.atoms.len(), 3);
        assert_eq!(frame.atoms[2].position, [expected as f64, 2.0, 0.0]);
        assert_eq!(frame.header_lines.len(), header::HEADER_LINES);
    }
    assert!(reader.is_at_end().unwrap());
    assert_eq!(reader.atoms(), Some(3));
    assert_eq!(reader.schema().unwrap().species, Some(2));
}

#[test]
fn test_schema_is_not_reparsed() {
    // A later column header naming other fields is consumed, not resolved again.
    let mut text = trajectory(1);
    text.push_str(&frame(100, 10.0, &["1 1 O 0 0 0", "2 1 H 0 0 0", "3 2 C 0 0 0"]).replace(
        COLUMNS,
        "ITEM: ATOMS a b c d e f",
    ));
    let mut reader = DumpReader::new(Cursor::new(text), request());
    reader.next_records().unwrap();
    let frame = reader.next_records().unwrap();
    assert_eq!(frame.atoms[1].species.as_deref(), Some("H"));
}

#[test]
fn test_skip_before_first_decode() {
    let mut reader = DumpReader::new(Cursor::new(trajectory(4)), request());
    reader.skip_frames(2).unwrap();
    assert_eq!(reader.frame_index(), 2);
    assert_eq!(reader.atoms(), Some(3));
    let frame = reader.next_records().unwrap();
    assert_eq!(frame.index, 2);
    assert_eq!(frame.atoms[0].position[0], 2.0);
}

#[test]
fn test_skip_after_decode() {
    let mut reader = DumpReader::new(Cursor::new(trajectory(4)), request());
    reader.next_records().unwrap();
    reader.skip_frames(2).unwrap();
    let frame = reader.next_records().unwrap();
    assert_eq!(frame.index, 3);
    assert_eq!(frame.atoms[0].position[0], 3.0);
}

#[test]
fn test_skip_past_end() {
    let mut reader = DumpReader::new(Cursor::new(trajectory(2)), request());
    let err = reader.skip_frames(3).unwrap_err();
    assert_eq!(err.frame(), Some(2));
}

#[test]
fn test_typed_frames_keep_slot_order() {
    let mut reader = DumpReader::new(Cursor::new(trajectory(2)), request());
    let filter = SpeciesFilter::new(["H", "C"]);
    let frame = reader.next_typed(&filter).unwrap();
    assert_eq!(frame.atoms.counts(), vec![1, 1]);
    assert_eq!(frame.atoms.order, vec![0, 1]);
    let frame = reader.next_typed(&filter).unwrap();
    assert_eq!(frame.atoms.group(1), &[[1.0, 2.0, 0.0]]);
}

#[test]
fn test_malformed_row_names_frame() {
    let mut text = trajectory(2);
    text.push_str(&frame(200, 10.0, &["1 1 O 0 0 0", "2 1 H 0 0", "3 2 C 0 0 0"]));
    let mut reader = DumpReader::new(Cursor::new(text), request());
    reader.next_records().unwrap();
    reader.next_records().unwrap();
    let err = reader.next_records().unwrap_err();
    assert_eq!(err.frame(), Some(2));
    assert!(err.to_string().starts_with("frame 2:"));
}

#[test]
fn test_invalid_utf8_names_frame() {
    let mut bytes = trajectory(2).into_bytes();
    let row = b"2 1 H 1 1.0";
    let at = bytes.windows(row.len()).position(|w| w == row).unwrap();
    bytes[at + 4] = 0xFF;

    let mut reader = DumpReader::new(Cursor::new(bytes), request());
    reader.next_records().unwrap();
    let err = reader.next_records().unwrap_err();
    assert!(matches!(err, DumpError::InvalidUtf8 { frame: 1, .. }));
    assert_eq!(err.frame(), Some(1));
}

#[test]
fn test_missing_required_column() {
    let text = trajectory(1).replace(COLUMNS, "ITEM: ATOMS id mol x y z");
    let mut reader = DumpReader::new(Cursor::new(text), request());
    let err = reader.next_records().unwrap_err();
    assert!(matches!(err, DumpError::MissingColumns { .. }));
}

#[test]
fn test_rows_are_verbatim() {
    let mut reader = DumpReader::new(Cursor::new(trajectory(1)), request());
    let frame = reader.next_rows().unwrap();
    assert_eq!(frame.atoms[1].fields, vec!["2", "1", "H", "0", "1.0", "0.0"]);
    assert_eq!(frame.atoms[1].record.molecule.as_deref(), Some("1"));
}
