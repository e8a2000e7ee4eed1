//! Abbreviated printing of long vectors and matrices for reports.

use itertools::Itertools;
use nalgebra::DMatrix;
use std::fmt::Display;

const THRESHOLD: usize = 20;
const EDGE_ITEMS: usize = 3;

/// `[a b c ... x y z]` once `values` is longer than the threshold.
pub fn brief<T: Display>(values: &[T]) -> String {
    if values.len() <= THRESHOLD {
        return format!("[{}]", values.iter().join(" "));
    }
    format!(
        "[{} ... {}]",
        values[..EDGE_ITEMS].iter().join(" "),
        values[values.len() - EDGE_ITEMS..].iter().join(" ")
    )
}

/// One abbreviated line per row, long row lists are cut the same way.
pub fn brief_matrix(m: &DMatrix<f64>) -> String {
    let rows = m
        .row_iter()
        .map(|row| brief(&row.iter().copied().collect::<Vec<_>>()))
        .collect::<Vec<_>>();
    let lines = if rows.len() <= THRESHOLD {
        rows
    } else {
        rows[..EDGE_ITEMS]
            .iter()
            .cloned()
            .chain(std::iter::once("...".to_string()))
            .chain(rows[rows.len() - EDGE_ITEMS..].iter().cloned())
            .collect()
    };
    format!("[{}]", lines.iter().join("\n "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brief() {
        assert_eq!(brief(&[1, 2, 3]), "[1 2 3]");
        let long = (0..25).collect::<Vec<_>>();
        assert_eq!(brief(&long), "[0 1 2 ... 22 23 24]");
        assert_eq!(brief::<f64>(&[]), "[]");
    }

    #[test]
    fn test_brief_matrix() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.5, 3.0, 4.0]);
        assert_eq!(brief_matrix(&m), "[[1 2.5]\n [3 4]]");
        let tall = DMatrix::<f64>::zeros(30, 1);
        assert_eq!(brief_matrix(&tall).lines().count(), 7);
    }
}
