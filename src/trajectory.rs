//! Trajectory input and conversion of selected atom positions to a frame
//! matrix.

use anyhow::{Context, Result};
use nalgebra::DMatrix;
use std::fs;
use std::path::Path;

use crate::dump::read_dump;
use crate::selection::Selection;
use crate::topology::{parse_pdb_frames, Topology};
use crate::xyz::parse_xyz;

/// Positions of every atom of one frame.
pub type Frame = Vec<[f64; 3]>;

#[derive(Debug)]
pub enum TrajectoryError {
    InvalidOrMissingTimestep,
    InvalidOrMissingNumberOfAtoms,
    MissingBoxBounds,
    MissingAtomKeys,
    DuplicateAtomKeys,
    MissingPositionKeys,
    DuplicateSnapshots,
    InvalidOrMissingAtomRow,
    EmptyTrajectory,
    EmptySelection,
    AtomCountMismatch { expected: usize, found: usize },
}

impl std::fmt::Display for TrajectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for TrajectoryError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrajectoryFormat {
    Pdb,
    Xyz,
    /// LAMMPS text dump, the fallback for unknown extensions.
    Dump,
}

impl TrajectoryFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("pdb") => TrajectoryFormat::Pdb,
            Some("xyz") => TrajectoryFormat::Xyz,
            _ => TrajectoryFormat::Dump,
        }
    }
}

pub fn read_trajectory(path: &Path) -> Result<Vec<Frame>> {
    let read = || fs::read_to_string(path).context(format!("Reading {}", path.to_string_lossy()));
    let frames = match TrajectoryFormat::from_path(path) {
        TrajectoryFormat::Pdb => parse_pdb_frames(&read()?)?,
        TrajectoryFormat::Xyz => parse_xyz(&read()?)?,
        TrajectoryFormat::Dump => read_dump(path)?
            .iter()
            .map(|snapshot| snapshot.positions())
            .collect::<Result<Vec<_>, _>>()?,
    };
    log::info!("{} frames read from {}", frames.len(), path.to_string_lossy());
    Ok(frames)
}

/// `n_frames x 3 * atoms.len()` matrix of the given atoms' flattened
/// positions.
pub fn frames_to_matrix(
    frames: &[Frame],
    atoms: &[usize],
    n_atoms: usize,
) -> Result<DMatrix<f64>, TrajectoryError> {
    if atoms.is_empty() {
        return Err(TrajectoryError::EmptySelection);
    }
    if let Some(frame) = frames.iter().find(|f| f.len() != n_atoms) {
        return Err(TrajectoryError::AtomCountMismatch {
            expected: n_atoms,
            found: frame.len(),
        });
    }
    Ok(DMatrix::from_row_iterator(
        frames.len(),
        3 * atoms.len(),
        frames
            .iter()
            .flat_map(|frame| atoms.iter().flat_map(move |&i| frame[i])),
    ))
}

/// Frame matrix of the atoms of `topology` picked by `selection`, read from
/// `trajectory`.
pub fn gen_traj_numpy(topology: &Path, trajectory: &Path, selection: &str) -> Result<DMatrix<f64>> {
    let topology = Topology::read_pdb(topology)?;
    let selection =
        Selection::parse(selection).context(format!("Parsing selection '{selection}'"))?;
    let atoms = selection.apply(&topology);
    log::info!("{} of {} atoms selected", atoms.len(), topology.len());
    let frames = read_trajectory(trajectory)?;
    let matrix = frames_to_matrix(&frames, &atoms, topology.len())?;
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::tests::PDB;

    #[test]
    fn test_format_from_path() {
        assert_eq!(TrajectoryFormat::from_path(Path::new("a/b.PDB")), TrajectoryFormat::Pdb);
        assert_eq!(TrajectoryFormat::from_path(Path::new("b.xyz")), TrajectoryFormat::Xyz);
        assert_eq!(
            TrajectoryFormat::from_path(Path::new("dump.lammpstrj")),
            TrajectoryFormat::Dump
        );
        assert_eq!(TrajectoryFormat::from_path(Path::new("dump")), TrajectoryFormat::Dump);
    }

    #[test]
    fn test_frames_to_matrix() {
        let frames = vec![
            vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
            vec![[7.0, 8.0, 9.0], [10.0, 11.0, 12.0]],
        ];
        let m = frames_to_matrix(&frames, &[1], 2).unwrap();
        assert_eq!(m, DMatrix::from_row_slice(2, 3, &[4.0, 5.0, 6.0, 10.0, 11.0, 12.0]));
        let m = frames_to_matrix(&frames, &[0, 1], 2).unwrap();
        assert_eq!(
            m.row(1).iter().copied().collect::<Vec<_>>(),
            vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0]
        );
        assert!(matches!(
            frames_to_matrix(&frames, &[0], 3),
            Err(TrajectoryError::AtomCountMismatch { expected: 3, found: 2 })
        ));
        assert!(matches!(frames_to_matrix(&frames, &[], 2), Err(TrajectoryError::EmptySelection)));
    }

    #[test]
    fn test_gen_traj_numpy() {
        let dir = std::env::temp_dir().join("nami_rust_traj");
        fs::create_dir_all(&dir).unwrap();
        let pdb = dir.join("dipeptide.pdb");
        fs::write(&pdb, PDB).unwrap();
        let m = gen_traj_numpy(&pdb, &pdb, "name CA").unwrap();
        assert_eq!(m, DMatrix::from_row_slice(2, 3, &[1.5, 2.5, 3.5, 1.6, 2.5, 3.5]));
        let all = gen_traj_numpy(&pdb, &pdb, "").unwrap();
        assert_eq!(all.shape(), (2, 18));
        assert!(gen_traj_numpy(&pdb, &pdb, "name").is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
