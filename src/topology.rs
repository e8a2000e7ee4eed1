use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::trajectory::TrajectoryError;

const PDB_ATOM: &str = "ATOM";
const PDB_HETATM: &str = "HETATM";
const PDB_MODEL: &str = "MODEL";
const PDB_ENDMDL: &str = "ENDMDL";

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub serial: usize,
    pub name: String,
    pub resname: String,
    pub chain: String,
    pub resid: i64,
    pub element: String,
}

impl Atom {
    /// Element symbol, derived from the atom name when the record has none.
    fn guess_element(name: &str) -> String {
        name.chars()
            .skip_while(|c| !c.is_ascii_alphabetic())
            .take(1)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    pub atoms: Vec<Atom>,
}

fn column(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len()))
        .unwrap_or_default()
        .trim()
}

fn is_atom_record(line: &str) -> bool {
    line.starts_with(PDB_ATOM) || line.starts_with(PDB_HETATM)
}

fn parse_position(line: &str) -> Result<[f64; 3], TrajectoryError> {
    let coord = |start, end| {
        column(line, start, end)
            .parse::<f64>()
            .map_err(|_| TrajectoryError::InvalidOrMissingAtomRow)
    };
    Ok([coord(30, 38)?, coord(38, 46)?, coord(46, 54)?])
}

impl Topology {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Atoms of the first model of a PDB file.
    pub fn parse_pdb(content: &str) -> Result<Self, TrajectoryError> {
        let mut atoms = Vec::new();
        for line in content.lines() {
            if line.starts_with(PDB_ENDMDL) {
                break;
            }
            if !is_atom_record(line) {
                continue;
            }
            let name = column(line, 12, 16).to_string();
            let element = match column(line, 76, 78) {
                "" => Atom::guess_element(&name),
                e => e.to_string(),
            };
            atoms.push(Atom {
                serial: column(line, 6, 11).parse().unwrap_or(atoms.len() + 1),
                resname: column(line, 17, 21).to_string(),
                chain: column(line, 21, 22).to_string(),
                resid: column(line, 22, 26)
                    .parse()
                    .map_err(|_| TrajectoryError::InvalidOrMissingAtomRow)?,
                name,
                element,
            });
        }
        if atoms.is_empty() {
            return Err(TrajectoryError::EmptyTrajectory);
        }
        Ok(Self { atoms })
    }

    pub fn read_pdb(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).context(format!("Reading {}", path.to_string_lossy()))?;
        let topology =
            Self::parse_pdb(&content).context(format!("Parsing {}", path.to_string_lossy()))?;
        log::debug!("{} atoms in {}", topology.len(), path.to_string_lossy());
        Ok(topology)
    }
}

/// Positions of every model of a PDB file. A file without `MODEL` records
/// is a single frame.
pub fn parse_pdb_frames(content: &str) -> Result<Vec<Vec<[f64; 3]>>, TrajectoryError> {
    let mut frames = Vec::new();
    let mut current = Vec::new();
    for line in content.lines() {
        if line.starts_with(PDB_MODEL) {
            current.clear();
        } else if line.starts_with(PDB_ENDMDL) {
            frames.push(std::mem::take(&mut current));
        } else if is_atom_record(line) {
            current.push(parse_position(line)?);
        }
    }
    if !current.is_empty() {
        frames.push(current);
    }
    if frames.is_empty() {
        return Err(TrajectoryError::EmptyTrajectory);
    }
    Ok(frames)
}
