//! Multi-frame XYZ trajectories.

use crate::trajectory::{Frame, TrajectoryError};

fn parse_atom_row(line: &str) -> Result<[f64; 3], TrajectoryError> {
    let values = line
        .split_whitespace()
        .skip(1)
        .take(3)
        .map(str::parse::<f64>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| TrajectoryError::InvalidOrMissingAtomRow)?;
    match values[..] {
        [x, y, z] => Ok([x, y, z]),
        _ => Err(TrajectoryError::InvalidOrMissingAtomRow),
    }
}

/// Frames of an XYZ file: an atom count line, a comment line, then one
/// `symbol x y z` row per atom.
pub fn parse_xyz(content: &str) -> Result<Vec<Frame>, TrajectoryError> {
    let mut lines = content.lines();
    let mut frames = Vec::new();
    loop {
        let atoms_count = match lines.by_ref().find(|l| !l.trim().is_empty()) {
            Some(l) => l
                .trim()
                .parse::<usize>()
                .map_err(|_| TrajectoryError::InvalidOrMissingNumberOfAtoms)?,
            None => break,
        };
        lines.next().ok_or(TrajectoryError::InvalidOrMissingAtomRow)?;
        let frame = (0..atoms_count)
            .map(|_| {
                lines
                    .next()
                    .ok_or(TrajectoryError::InvalidOrMissingAtomRow)
                    .and_then(parse_atom_row)
            })
            .collect::<Result<Frame, _>>()?;
        frames.push(frame);
    }
    if frames.is_empty() {
        return Err(TrajectoryError::EmptyTrajectory);
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_xyz() {
        let content = "2\nframe 0\nC 0.0 0.0 0.0\nO 1.0 0.0 0.0\n\
                       2\nframe 1\nC 0.5 0.0 0.0\nO 1.5 0.0 -1e-1\n";
        let frames = parse_xyz(content).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1], vec![[0.5, 0.0, 0.0], [1.5, 0.0, -0.1]]);
    }

    #[test]
    fn test_parse_xyz_errors() {
        assert!(matches!(parse_xyz(""), Err(TrajectoryError::EmptyTrajectory)));
        assert!(matches!(
            parse_xyz("two\ncomment\n"),
            Err(TrajectoryError::InvalidOrMissingNumberOfAtoms)
        ));
        assert!(matches!(
            parse_xyz("2\ncomment\nC 0 0 0\n"),
            Err(TrajectoryError::InvalidOrMissingAtomRow)
        ));
        assert!(matches!(
            parse_xyz("1\ncomment\nC 0 0\n"),
            Err(TrajectoryError::InvalidOrMissingAtomRow)
        ));
    }
}
