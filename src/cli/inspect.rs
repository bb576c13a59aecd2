use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use dumpcalc::dump::{
    is_gzip, ColumnRequest, CoordKind, DumpError, DumpReader, Need, TrajectoryInput, Vec3,
};

/// Layout of a trajectory as found in its first frame
#[derive(Debug, Serialize)]
struct TrajectorySummary {
    path: PathBuf,
    compressed: bool,
    atoms: usize,
    box_lengths: Vec3,
    columns: Vec<String>,
    coords: CoordKind,
    axes: [usize; 3],
    species_column: bool,
    molecule_column: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    frames: Option<usize>,
}

/// Display the layout of a trajectory
pub fn run(trajectory: PathBuf, json: bool, count_frames: bool) -> Result<()> {
    if !trajectory.exists() {
        anyhow::bail!("File does not exist: {}", trajectory.display());
    }

    let summary = summarize(&trajectory, count_frames)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_report(&summary);
    }
    Ok(())
}

fn request(coords: CoordKind) -> ColumnRequest {
    ColumnRequest::coords(coords)
        .with_species(Need::Optional)
        .with_molecule(Need::Optional)
}

fn open(path: &Path, coords: CoordKind) -> Result<DumpReader<TrajectoryInput>> {
    DumpReader::open(path, request(coords))
        .with_context(|| format!("Failed to open trajectory: {}", path.display()))
}

fn summarize(path: &Path, count_frames: bool) -> Result<TrajectorySummary> {
    let mut reader = open(path, CoordKind::Wrapped)?;
    let first = match reader.next_records() {
        Ok(frame) => frame,
        // No wrapped coordinates: fall back to unwrapped ones.
        Err(DumpError::MissingColumns { .. }) => {
            reader = open(path, CoordKind::Unwrapped)?;
            reader.next_records().context("Failed to decode the first frame")?
        }
        Err(e) => return Err(e).context("Failed to decode the first frame"),
    };
    let schema = reader
        .schema()
        .cloned()
        .context("Column schema unresolved after the first frame")?;

    let frames = if count_frames {
        let mut frames = 1;
        while !reader.is_at_end()? {
            reader
                .skip_frames(1)
                .with_context(|| format!("Failed to skip frame {frames}"))?;
            frames += 1;
        }
        Some(frames)
    } else {
        None
    };

    Ok(TrajectorySummary {
        path: path.to_path_buf(),
        compressed: is_gzip(path),
        atoms: first.atoms.len(),
        box_lengths: first.box_dims.lengths,
        columns: schema.names.clone(),
        coords: schema.coords,
        axes: schema.axes,
        species_column: schema.species.is_some(),
        molecule_column: schema.molecule.is_some(),
        frames,
    })
}

#[cfg(feature = "colorized_output")]
fn heading(text: &str) -> String {
    console::style(text).bold().cyan().to_string()
}

#[cfg(not(feature = "colorized_output"))]
fn heading(text: &str) -> String {
    text.to_string()
}

#[cfg(feature = "colorized_output")]
fn label(text: &str) -> String {
    console::style(text).bold().to_string()
}

#[cfg(not(feature = "colorized_output"))]
fn label(text: &str) -> String {
    text.to_string()
}

fn print_report(summary: &TrajectorySummary) {
    let [lx, ly, lz] = summary.box_lengths;
    let axes: Vec<&str> = summary
        .axes
        .iter()
        .map(|&i| summary.columns[i].as_str())
        .collect();

    println!("{}", heading("Trajectory Information"));
    println!("{}", heading("======================"));
    println!("{}: {}", label("File"), summary.path.display());
    if summary.compressed {
        println!("  (gzip compressed)");
    }
    println!();
    println!("{}: {}", label("Atoms"), summary.atoms);
    println!("{}: {lx} x {ly} x {lz}", label("Box"));
    println!("{}: {}", label("Columns"), summary.columns.join(" "));
    println!(
        "{}: {} ({:?})",
        label("Coordinates"),
        axes.join(" "),
        summary.coords
    );
    println!(
        "{}: type {}, mol {}",
        label("Tags"),
        yes_no(summary.species_column),
        yes_no(summary.molecule_column)
    );
    if let Some(frames) = summary.frames {
        println!("{}: {frames}", label("Frames"));
    }
}

fn yes_no(present: bool) -> &'static str {
    if present {
        "present"
    } else {
        "absent"
    }
}
