//! LAMMPS text dump trajectories.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::trajectory::{Frame, TrajectoryError};

const HEADER_TIMESTEP: &str = "ITEM: TIMESTEP";
const HEADER_NUM_OF_ATOMS: &str = "ITEM: NUMBER OF ATOMS";
const HEADER_BOX_BOUNDS: &str = "ITEM: BOX BOUNDS";
const HEADER_ATOMS: &str = "ITEM: ATOMS";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymBox {
    pub lo: [f64; 3],
    pub hi: [f64; 3],
}

pub struct DumpSnapshot {
    pub step: u64,
    pub atoms_count: usize,
    pub sym_box: SymBox,
    keys: HashMap<String, usize>,
    /// Column-major: all values of a key are contiguous.
    atoms: Vec<f64>,
}

impl DumpSnapshot {
    fn read<I>(lines: &mut I, step: u64, atoms_count: usize) -> Result<Self, TrajectoryError>
    where
        I: Iterator<Item = String>,
    {
        match lines.next() {
            Some(l) if l.starts_with(HEADER_BOX_BOUNDS) => {}
            _ => return Err(TrajectoryError::MissingBoxBounds),
        }
        let mut sym_box = SymBox {
            lo: [0.0; 3],
            hi: [0.0; 3],
        };
        for dim in 0..3 {
            let bounds = lines
                .next()
                .map(|l| {
                    l.split_whitespace()
                        .take(2)
                        .map(str::parse::<f64>)
                        .collect::<Result<Vec<_>, _>>()
                })
                .and_then(Result::ok)
                .filter(|b| b.len() == 2)
                .ok_or(TrajectoryError::MissingBoxBounds)?;
            sym_box.lo[dim] = bounds[0];
            sym_box.hi[dim] = bounds[1];
        }

        let mut keys = HashMap::new();
        match lines
            .next()
            .as_deref()
            .and_then(|l| l.strip_prefix(HEADER_ATOMS))
        {
            Some(names) => {
                for key in names.split_whitespace() {
                    if keys.insert(key.to_string(), keys.len()).is_some() {
                        return Err(TrajectoryError::DuplicateAtomKeys);
                    }
                }
            }
            None => return Err(TrajectoryError::MissingAtomKeys),
        }
        if keys.is_empty() {
            return Err(TrajectoryError::MissingAtomKeys);
        }

        let mut atoms = vec![0.0; atoms_count * keys.len()];
        for i in 0..atoms_count {
            let values = lines
                .next()
                .map(|l| {
                    l.split_whitespace()
                        .map(str::parse::<f64>)
                        .collect::<Result<Vec<_>, _>>()
                })
                .and_then(Result::ok)
                .filter(|v| v.len() == keys.len())
                .ok_or(TrajectoryError::InvalidOrMissingAtomRow)?;
            for (j, val) in values.into_iter().enumerate() {
                atoms[atoms_count * j + i] = val;
            }
        }
        Ok(Self {
            step,
            atoms_count,
            sym_box,
            keys,
            atoms,
        })
    }

    pub fn get_property(&self, key: &str) -> Option<&[f64]> {
        let start = self.keys.get(key)? * self.atoms_count;
        Some(&self.atoms[start..start + self.atoms_count])
    }

    /// Cartesian positions ordered by atom id. Unwrapped and scaled
    /// coordinates are used when plain ones are missing.
    pub fn positions(&self) -> Result<Frame, TrajectoryError> {
        let axes = |names: [&str; 3]| {
            let [x, y, z] = names.map(|n| self.get_property(n));
            Some([x?, y?, z?])
        };
        let plain = axes(["x", "y", "z"]).or_else(|| axes(["xu", "yu", "zu"]));
        let mut positions = if let Some(xyz) = plain {
            (0..self.atoms_count)
                .map(|i| [xyz[0][i], xyz[1][i], xyz[2][i]])
                .collect::<Vec<_>>()
        } else if let Some(scaled) = axes(["xs", "ys", "zs"]) {
            let SymBox { lo, hi } = self.sym_box;
            (0..self.atoms_count)
                .map(|i| [0, 1, 2].map(|d| lo[d] + scaled[d][i] * (hi[d] - lo[d])))
                .collect::<Vec<_>>()
        } else {
            return Err(TrajectoryError::MissingPositionKeys);
        };
        if let Some(ids) = self.get_property("id") {
            let mut order = (0..self.atoms_count).collect::<Vec<_>>();
            order.sort_by(|&a, &b| ids[a].total_cmp(&ids[b]));
            positions = order.into_iter().map(|i| positions[i]).collect();
        }
        Ok(positions)
    }
}

/// Snapshots of a dump, ordered by timestep.
pub fn parse_dump<I>(lines: I) -> Result<Vec<DumpSnapshot>, TrajectoryError>
where
    I: Iterator<Item = String>,
{
    let mut lines = lines.filter(|l| !l.trim().is_empty());
    let mut snapshots: Vec<DumpSnapshot> = Vec::new();
    loop {
        let timestep = match (
            lines.next().filter(|s| s.trim_end() == HEADER_TIMESTEP),
            lines.next().map(|s| s.trim().parse::<u64>()),
        ) {
            (Some(_), Some(Ok(n))) => n,
            (None, _) => break,
            (_, _) => return Err(TrajectoryError::InvalidOrMissingTimestep),
        };
        let number_of_atoms = match lines
            .next()
            .filter(|s| s.trim_end() == HEADER_NUM_OF_ATOMS)
            .zip(lines.next().map(|s| s.trim().parse::<usize>()))
        {
            Some((_, Ok(n))) => n,
            _ => return Err(TrajectoryError::InvalidOrMissingNumberOfAtoms),
        };
        if snapshots.iter().any(|s| s.step == timestep) {
            return Err(TrajectoryError::DuplicateSnapshots);
        }
        snapshots.push(DumpSnapshot::read(&mut lines, timestep, number_of_atoms)?);
    }
    if snapshots.is_empty() {
        return Err(TrajectoryError::EmptyTrajectory);
    }
    snapshots.sort_by_key(|s| s.step);
    Ok(snapshots)
}

pub fn read_dump(path: &Path) -> Result<Vec<DumpSnapshot>> {
    let lines = BufReader::new(
        File::open(path).context(format!("Reading {}", path.to_string_lossy()))?,
    )
    .lines()
    .map_while(Result::ok);
    parse_dump(lines).context(format!("Parsing {}", path.to_string_lossy()))
}
