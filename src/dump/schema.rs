//! Column schema resolution from the `ITEM: ATOMS ...` header line

use serde::{Deserialize, Serialize};

use super::error::DumpError;

/// Number of literal tokens (`ITEM: ATOMS`) preceding the field names
pub const HEADER_PREFIX_TOKENS: usize = 2;

/// Which flavour of coordinate columns a calculation reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordKind {
    /// Wrapped coordinates: `x y z`
    #[default]
    Wrapped,
    /// Unwrapped coordinates: `xu yu zu`
    Unwrapped,
}

impl CoordKind {
    /// Column names for the three axes
    pub fn names(self) -> [&'static str; 3] {
        match self {
            CoordKind::Wrapped => ["x", "y", "z"],
            CoordKind::Unwrapped => ["xu", "yu", "zu"],
        }
    }
}

/// Whether a tag column must be present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Need {
    /// Not read at all
    #[default]
    Ignored,
    /// Read when present
    Optional,
    /// Schema resolution fails without it
    Required,
}

/// Columns a calculation needs from the trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnRequest {
    /// Coordinate flavour
    pub coords: CoordKind,
    /// The `type` column
    pub species: Need,
    /// The `mol` column
    pub molecule: Need,
}

impl ColumnRequest {
    /// Request coordinates only
    pub fn coords(coords: CoordKind) -> Self {
        Self {
            coords,
            ..Default::default()
        }
    }

    /// Also request the `type` column
    pub fn with_species(mut self, need: Need) -> Self {
        self.species = need;
        self
    }

    /// Also request the `mol` column
    pub fn with_molecule(mut self, need: Need) -> Self {
        self.molecule = need;
        self
    }
}

/// Resolved column positions, established once from the first frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    /// Literal tokens preceding the field names
    pub prefix: Vec<String>,
    /// Field names in column order
    pub names: Vec<String>,
    /// Coordinate flavour that was resolved
    pub coords: CoordKind,
    /// Column index of x, y and z
    pub axes: [usize; 3],
    /// Column index of `type`, when requested and present
    pub species: Option<usize>,
    /// Column index of `mol`, when requested and present
    pub molecule: Option<usize>,
}

impl ColumnSchema {
    /// Resolve a schema from a column-header line.
    ///
    /// The first two tokens are discarded; the remaining ones name the
    /// columns. When a name appears twice the first occurrence wins.
    pub fn resolve(line: &str, request: &ColumnRequest) -> Result<Self, DumpError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() <= HEADER_PREFIX_TOKENS {
            return Err(DumpError::TooFewColumns { got: tokens.len() });
        }

        let (prefix, fields) = tokens.split_at(HEADER_PREFIX_TOKENS);
        let position = |name: &str| fields.iter().position(|f| *f == name);

        let mut missing = Vec::new();
        let mut axes = [0usize; 3];
        for (axis, name) in request.coords.names().iter().enumerate() {
            match position(name) {
                Some(idx) => axes[axis] = idx,
                None => missing.push(name.to_string()),
            }
        }

        let mut tag = |need: Need, name: &str| match need {
            Need::Ignored => None,
            Need::Optional => position(name),
            Need::Required => {
                let found = position(name);
                if found.is_none() {
                    missing.push(name.to_string());
                }
                found
            }
        };
        let species = tag(request.species, "type");
        let molecule = tag(request.molecule, "mol");

        if !missing.is_empty() {
            return Err(DumpError::MissingColumns { missing });
        }

        Ok(Self {
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            names: fields.iter().map(|s| s.to_string()).collect(),
            coords: request.coords,
            axes,
            species,
            molecule,
        })
    }

    /// Number of whitespace-separated fields every atom row must have
    pub fn cols_len(&self) -> usize {
        self.names.len()
    }

    /// Header line with wrapped coordinate names replaced by unwrapped ones
    pub fn unwrapped_header(&self) -> String {
        let renamed = self.names.iter().enumerate().map(|(idx, name)| {
            match self.axes.iter().position(|&a| a == idx) {
                Some(axis) => CoordKind::Unwrapped.names()[axis],
                None => name.as_str(),
            }
        });
        self.prefix
            .iter()
            .map(String::as_str)
            .chain(renamed)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
