//! End-to-end runs of every calculation on small trajectories

use std::fs;
use std::path::Path;

use dumpcalc::calc::{launch, CalcError};
use tempfile::tempdir;

/// One frame with `id mol type x y z` rows in a cubic box
fn frame(timestep: usize, length: f64, atoms: &[(&str, &str, [f64; 3])]) -> String {
    let mut text = format!(
        "ITEM: TIMESTEP\n{timestep}\nITEM: NUMBER OF ATOMS\n{}\nITEM: BOX BOUNDS pp pp pp\n",
        atoms.len()
    );
    for _ in 0..3 {
        text.push_str(&format!("0.0 {length}\n"));
    }
    text.push_str("ITEM: ATOMS id mol type x y z\n");
    for (id, (mol, species, [x, y, z])) in atoms.iter().enumerate() {
        text.push_str(&format!("{} {mol} {species} {x} {y} {z}\n", id + 1));
    }
    text
}

/// Table rows after the preamble and the column header
fn table(path: &Path) -> (String, Vec<Vec<f64>>) {
    let text = fs::read_to_string(path).unwrap();
    assert!(text.starts_with("Date: "));
    // The echoed parameters may hold blank lines of their own.
    let (_, body) = text.rsplit_once("\n\n").unwrap();
    let mut lines = body.lines();
    let header = lines.next().unwrap().to_string();
    let rows = lines
        .map(|line| {
            line.split_whitespace()
                .map(|field| field.parse().unwrap())
                .collect()
        })
        .collect();
    (header, rows)
}

fn write_params(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(format!("{name}.toml"));
    fs::write(&path, body).unwrap();
    path
}

fn toml_path(path: &Path) -> String {
    format!("{:?}", path.display().to_string())
}

#[test]
fn test_distance_run() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("dump.lammpstrj");
    let output = dir.path().join("dist.dat");
    let text: String = (0..4)
        .map(|i| {
            let z = i as f64;
            frame(i * 10, 20.0, &[("1", "O", [0.0, 0.0, z]), ("1", "H", [3.0, 4.0, z])])
        })
        .collect();
    fs::write(&input, text).unwrap();

    let params = write_params(
        dir.path(),
        "distance",
        &format!(
            "[distance]\nfile_in = {}\nfile_out = {}\ncfg_start = 1\ncfg_end = 3\natom_1 = 0\natom_2 = 1\ndt = 0.5\ncoords = \"wrapped\"\n",
            toml_path(&input),
            toml_path(&output)
        ),
    );

    let report = launch("distance", &params).unwrap();
    assert_eq!(report.frames, 2);
    assert_eq!(report.output, output);

    let (header, rows) = table(&output);
    assert_eq!(header, "cfg t x y z dist");
    assert_eq!(
        rows,
        vec![
            vec![1.0, 0.5, -3.0, -4.0, 0.0, 5.0],
            vec![2.0, 1.0, -3.0, -4.0, 0.0, 5.0],
        ]
    );
}

#[test]
fn test_alias_section_is_accepted() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("dump.lammpstrj");
    let output = dir.path().join("dist.dat");
    fs::write(&input, frame(0, 10.0, &[("1", "O", [0.0; 3]), ("1", "H", [1.0, 0.0, 0.0])])).unwrap();

    let params = write_params(
        dir.path(),
        "old",
        &format!(
            "[dist_two_atoms]\nfile_in = {}\nfile_out = {}\ncfg_end = 1\natom_1 = 0\natom_2 = 1\ndt = 1.0\ncoords = \"wrapped\"\n",
            toml_path(&input),
            toml_path(&output)
        ),
    );

    let report = launch("dist_two_atoms", &params).unwrap();
    assert_eq!(report.frames, 1);
}

#[test]
fn test_error_names_the_frame() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("dump.lammpstrj");
    let output = dir.path().join("dist.dat");
    let text: String = (0..3)
        .map(|i| frame(i, 10.0, &[("1", "O", [0.0; 3]), ("1", "H", [1.0, 0.0, 0.0])]))
        .collect();
    fs::write(&input, text).unwrap();

    let params = write_params(
        dir.path(),
        "distance",
        &format!(
            "[distance]\nfile_in = {}\nfile_out = {}\ncfg_end = 5\natom_1 = 0\natom_2 = 1\ndt = 1.0\ncoords = \"wrapped\"\n",
            toml_path(&input),
            toml_path(&output)
        ),
    );

    let err = launch("distance", &params).unwrap_err();
    assert_eq!(err.frame(), Some(3));
    assert!(err.to_string().contains("frame 3"));
}

#[test]
fn test_malformed_row_keeps_earlier_distance_rows() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("dump.lammpstrj");
    let output = dir.path().join("dist.dat");
    let text: String = (0..4)
        .map(|i| {
            let z = i as f64;
            let text = frame(i, 20.0, &[("1", "O", [0.0, 0.0, z]), ("1", "H", [3.0, 4.0, z])]);
            if i == 2 {
                text.replace("2 1 H 3 4 2\n", "2 1 H 3 4\n")
            } else {
                text
            }
        })
        .collect();
    fs::write(&input, text).unwrap();

    let params = write_params(
        dir.path(),
        "distance",
        &format!(
            "[distance]\nfile_in = {}\nfile_out = {}\ncfg_end = 4\natom_1 = 0\natom_2 = 1\ndt = 1.0\ncoords = \"wrapped\"\n",
            toml_path(&input),
            toml_path(&output)
        ),
    );

    let err = launch("distance", &params).unwrap_err();
    assert_eq!(err.frame(), Some(2));
    assert!(err.to_string().starts_with("frame 2:"));

    let (header, rows) = table(&output);
    assert_eq!(header, "cfg t x y z dist");
    assert_eq!(
        rows,
        vec![
            vec![0.0, 0.0, -3.0, -4.0, 0.0, 5.0],
            vec![1.0, 1.0, -3.0, -4.0, 0.0, 5.0],
        ]
    );
}

#[test]
fn test_malformed_row_keeps_earlier_volume_rows() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("solvated.lammpstrj");
    let output = dir.path().join("vol.dat");
    let cloud = dir.path().join("vol.xyz");
    let text: String = (0..5)
        .map(|i| {
            let text = frame(
                i,
                4.0,
                &[("1", "C", [1.0, 1.0, 1.0]), ("2", "OW", [3.0, 3.0, 3.0])],
            );
            if i == 2 {
                text.replace("2 2 OW 3 3 3\n", "2 2 OW 3 3\n")
            } else {
                text
            }
        })
        .collect();
    fs::write(&input, text).unwrap();

    let params = write_params(
        dir.path(),
        "volume",
        &format!(
            "[volume]\nfile_in = {}\nfile_out = {}\nfile_out_xyz = {}\ncfg_end = 5\nbloc = [1.0, 1.0, 1.0]\nblocs = [0, 0, 0]\ndt = 1.0\nthreads = 2\natoms = [\"C\"]\n\n[volume.sigma]\nC = 1.0\nOW = 1.0\n",
            toml_path(&input),
            toml_path(&output),
            toml_path(&cloud)
        ),
    );

    let err = launch("volume", &params).unwrap_err();
    assert_eq!(err.frame(), Some(2));

    // Frames are read in order, so only frames 0 and 1 were sampled.
    let (header, mut rows) = table(&output);
    assert_eq!(header, "cfg t vol(atoms) vol(other)");
    rows.sort_by(|a, b| a[0].total_cmp(&b[0]));
    assert_eq!(
        rows,
        vec![vec![0.0, 0.0, 1.0, 63.0], vec![1.0, 1.0, 1.0, 63.0]]
    );
}

#[test]
fn test_invalid_range_is_rejected_before_reading() {
    let dir = tempdir().unwrap();
    let params = write_params(
        dir.path(),
        "distance",
        "[distance]\nfile_in = \"missing\"\nfile_out = \"out\"\ncfg_start = 4\ncfg_end = 4\natom_1 = 0\natom_2 = 1\ndt = 1.0\n",
    );

    let err = launch("distance", &params).unwrap_err();
    assert!(matches!(err, CalcError::InvalidConfig(_)));
}

#[test]
fn test_missing_trajectory() {
    let dir = tempdir().unwrap();
    let params = write_params(
        dir.path(),
        "gyration",
        &format!(
            "[gyration]\nfile_in = {}\nfile_out = {}\ncfg_end = 1\natom_start = 0\natom_end = 2\ndt = 1.0\nmasses = {{ O = 1.0 }}\n",
            toml_path(&dir.path().join("nope.lammpstrj")),
            toml_path(&dir.path().join("rg.dat"))
        ),
    );

    let err = launch("gyration", &params).unwrap_err();
    assert!(matches!(err, CalcError::Io { .. }));
}

#[test]
fn test_gyration_run() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("dump.lammpstrj");
    let output = dir.path().join("rg.dat");
    let text: String = (0..2)
        .map(|i| {
            let spread = (i + 1) as f64;
            frame(
                i,
                50.0,
                &[
                    ("1", "C", [10.0, 10.0, 10.0]),
                    ("1", "C", [10.0 + 2.0 * spread, 10.0, 10.0]),
                    ("2", "OW", [30.0, 30.0, 30.0]),
                ],
            )
        })
        .collect();
    fs::write(&input, text).unwrap();

    let params = write_params(
        dir.path(),
        "gyration",
        &format!(
            "[radius_gyration]\nfile_in = {}\nfile_out = {}\ncfg_end = 2\natom_start = 0\natom_end = 2\ndt = 2.0\ncoords = \"wrapped\"\n\n[radius_gyration.masses]\nC = 12.0\n",
            toml_path(&input),
            toml_path(&output)
        ),
    );

    let report = launch("gyration", &params).unwrap();
    assert_eq!(report.frames, 2);

    let (header, rows) = table(&output);
    assert_eq!(header, "cfg t radius");
    assert_eq!(rows.len(), 2);
    // Two atoms at x = 10 and x = 10 + 2s: deviations of s along x only,
    // so the radius is sqrt(2 s² / (3 * 2)) = s / sqrt(3).
    assert_eq!(&rows[0][..2], &[0.0, 0.0]);
    assert!((rows[0][2] - (1.0f64 / 3.0).sqrt()).abs() < 1e-12);
    assert_eq!(&rows[1][..2], &[1.0, 2.0]);
    assert!((rows[1][2] - (4.0f64 / 3.0).sqrt()).abs() < 1e-12);
}

#[test]
fn test_unwrap_run() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("wrapped.lammpstrj");
    let output = dir.path().join("unwrapped.lammpstrj");
    // The first atom crosses the upper x face between frames 0 and 1.
    let text = [
        frame(0, 10.0, &[("1", "O", [9.5, 5.0, 5.0]), ("1", "H", [9.8, 5.0, 5.0])]),
        frame(100, 10.0, &[("1", "O", [0.5, 5.0, 5.0]), ("1", "H", [0.8, 5.0, 5.0])]),
        frame(200, 10.0, &[("1", "O", [1.5, 5.0, 5.0]), ("1", "H", [1.8, 5.0, 5.0])]),
    ]
    .concat();
    fs::write(&input, text).unwrap();

    let params = write_params(
        dir.path(),
        "unwrap",
        &format!(
            "[no_pbc]\nfile_in = {}\nfile_out = {}\n",
            toml_path(&input),
            toml_path(&output)
        ),
    );

    let report = launch("unwrap", &params).unwrap();
    assert_eq!(report.frames, 3);

    let text = fs::read_to_string(&output).unwrap();
    let headers: Vec<&str> = text
        .lines()
        .filter(|line| line.starts_with("ITEM: ATOMS"))
        .collect();
    assert_eq!(headers, vec!["ITEM: ATOMS id mol type xu yu zu"; 3]);

    let rows: Vec<&str> = text
        .lines()
        .filter(|line| line.starts_with("1 1 O"))
        .collect();
    assert_eq!(rows, vec!["1 1 O 9.5 5 5", "1 1 O 10.5 5 5", "1 1 O 11.5 5 5"]);
    assert!(text.contains("ITEM: TIMESTEP\n200\n"));
}

fn rdf_trajectory() -> String {
    (0..6)
        .map(|i| {
            let shift = 0.1 * i as f64;
            frame(
                i,
                10.0,
                &[
                    ("1", "O", [1.0 + shift, 1.0, 1.0]),
                    ("1", "H", [1.9 + shift, 1.0, 1.0]),
                    ("1", "H", [1.0 + shift, 2.1, 1.0]),
                    ("2", "O", [5.0, 5.0 + shift, 5.0]),
                    ("2", "H", [5.8, 5.0 + shift, 5.0]),
                    ("2", "H", [5.0, 5.0 + shift, 6.3]),
                    ("3", "Na", [8.0, 8.0, 8.0]),
                ],
            )
        })
        .collect()
}

fn rdf_params(dir: &Path, input: &Path, output: &Path, threads: usize) -> std::path::PathBuf {
    write_params(
        dir,
        &format!("gr{threads}"),
        &format!(
            "[rdf]\nfile_in = {}\nfile_out = {}\ncfg_start = 1\ncfg_end = 6\ncfg_spacing = 1\nrmax = 3.0\ndr = 0.5\nthreads = {threads}\n\n[rdf.atoms]\nO = [\"H\", \"O\"]\n",
            toml_path(input),
            toml_path(output)
        ),
    )
}

#[test]
fn test_rdf_is_independent_of_the_worker_count() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("water.lammpstrj");
    fs::write(&input, rdf_trajectory()).unwrap();

    let single = dir.path().join("gr1.dat");
    let pooled = dir.path().join("gr4.dat");
    let report = launch("rdf", &rdf_params(dir.path(), &input, &single, 1)).unwrap();
    // Frames 1, 3 and 5.
    assert_eq!(report.frames, 3);
    launch("gr", &rdf_params(dir.path(), &input, &pooled, 4)).unwrap();

    let (header, rows) = table(&single);
    assert_eq!(
        header,
        "dist O-H(0)-intg O-H(0)-hstg O-O(0)-intg O-O(0)-hstg O-H(1)-intg O-H(1)-hstg O-O(1)-intg O-O(1)-hstg"
    );
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0][0], 0.25);
    assert!(rows.iter().all(|row| row.len() == 9));

    let (pooled_header, pooled_rows) = table(&pooled);
    assert_eq!(pooled_header, header);
    assert_eq!(pooled_rows, rows);
}

#[test]
fn test_volume_run() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("solvated.lammpstrj");
    let output = dir.path().join("vol.dat");
    let cloud = dir.path().join("vol.xyz");
    let text: String = (0..5)
        .map(|i| {
            frame(
                i,
                4.0,
                &[
                    ("1", "C", [1.0, 1.0, 1.0]),
                    ("2", "OW", [3.0, 3.0, 3.0]),
                    ("3", "OW", [3.0, 1.0, 3.0]),
                ],
            )
        })
        .collect();
    fs::write(&input, text).unwrap();

    let params = write_params(
        dir.path(),
        "volume",
        &format!(
            "[volume]\nfile_in = {}\nfile_out = {}\nfile_out_xyz = {}\ncfg_end = 5\nbloc = [1.0, 1.0, 1.0]\nblocs = [1, 1, 1]\ndt = 0.1\nthreads = 3\natoms = [\"C\"]\n\n[volume.sigma]\nC = 1.0\nOW = 1.0\n",
            toml_path(&input),
            toml_path(&output),
            toml_path(&cloud)
        ),
    );

    let report = launch("volume", &params).unwrap();
    assert_eq!(report.frames, 5);

    let (header, mut rows) = table(&output);
    assert_eq!(header, "cfg t vol(atoms) vol(other)");
    rows.sort_by(|a, b| a[0].total_cmp(&b[0]));
    assert_eq!(
        rows.iter().map(|row| row[0]).collect::<Vec<_>>(),
        vec![0.0, 1.0, 2.0, 3.0, 4.0]
    );
    for row in &rows {
        // Identical frames give identical volumes.
        assert_eq!(&row[2..], &rows[0][2..]);
        assert!(row[2] > 0.0);
        assert_eq!(row[2] + row[3], 64.0);
    }

    let cloud = fs::read_to_string(&cloud).unwrap();
    let mut lines = cloud.lines();
    // A 3x3x3 neighbourhood around the single analyte atom.
    assert_eq!(lines.next(), Some("27"));
    lines.next();
    let analyte = lines.clone().filter(|line| line.starts_with("O ")).count();
    assert_eq!(lines.count(), 27);
    assert_eq!(analyte as f64, rows[0][2]);
}
