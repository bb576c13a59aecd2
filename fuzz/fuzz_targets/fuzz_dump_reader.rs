#![no_main]

use dumpcalc::dump::{ColumnRequest, CoordKind, DumpReader, Need, SpeciesFilter};
use dumpcalc::pbc::Unwrapper;
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let request = ColumnRequest::coords(CoordKind::Wrapped)
        .with_species(Need::Optional)
        .with_molecule(Need::Optional);

    // Malformed input must surface as an error, never as a panic.
    let mut reader = DumpReader::new(Cursor::new(data), request);
    let mut unwrapper = Unwrapper::default();
    for _ in 0..16 {
        match reader.next_records() {
            Ok(frame) => {
                let _ = unwrapper.unwrap_frame(frame.index, &frame.box_dims, &frame.atoms);
            }
            Err(_) => break,
        }
    }

    let mut reader = DumpReader::new(Cursor::new(data), request);
    let filter = SpeciesFilter::new(["O", "H"]);
    if reader.skip_frames(1).is_ok() {
        let _ = reader.next_typed(&filter);
    }
});
