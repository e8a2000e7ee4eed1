//! Internal cluster validity scores.

use itertools::Itertools;
use nalgebra::{DMatrix, RowDVector};

use crate::BtsError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    /// Calinski-Harabasz, higher is better.
    pub ch: f64,
    /// Davies-Bouldin, lower is better.
    pub db: f64,
}

struct Clusters {
    members: Vec<Vec<usize>>,
    centroids: Vec<RowDVector<f64>>,
}

fn group(data: &DMatrix<f64>, labels: &[usize]) -> Result<Clusters, BtsError> {
    let n_samples = data.nrows();
    if labels.len() != n_samples {
        return Err(BtsError::LabelCountMismatch {
            labels: labels.len(),
            n_samples,
        });
    }
    let members = labels
        .iter()
        .enumerate()
        .map(|(i, &l)| (l, i))
        .into_group_map()
        .into_iter()
        .sorted_by_key(|(l, _)| *l)
        .map(|(_, m)| m)
        .collect::<Vec<_>>();
    let n_clusters = members.len();
    if n_clusters < 2 || n_clusters >= n_samples {
        return Err(BtsError::InvalidClusterCount {
            n_clusters,
            n_samples,
        });
    }
    let centroids = members
        .iter()
        .map(|m| data.select_rows(m.iter()).row_mean())
        .collect();
    Ok(Clusters { members, centroids })
}

/// Ratio of between-cluster to within-cluster dispersion, scaled by the
/// degrees of freedom.
pub fn calinski_harabasz_score(data: &DMatrix<f64>, labels: &[usize]) -> Result<f64, BtsError> {
    let clusters = group(data, labels)?;
    let n_samples = data.nrows() as f64;
    let n_clusters = clusters.members.len() as f64;
    let mean = data.row_mean();
    let (extra, intra) = clusters
        .members
        .iter()
        .zip(clusters.centroids.iter())
        .fold((0.0, 0.0), |(extra, intra), (m, c)| {
            let within = m
                .iter()
                .map(|&i| (data.row(i) - c).norm_squared())
                .sum::<f64>();
            (
                extra + m.len() as f64 * (c - &mean).norm_squared(),
                intra + within,
            )
        });
    if intra == 0.0 {
        return Ok(1.0);
    }
    Ok(extra * (n_samples - n_clusters) / (intra * (n_clusters - 1.0)))
}

/// Average over clusters of the worst ratio of summed spreads to centroid
/// separation.
pub fn davies_bouldin_score(data: &DMatrix<f64>, labels: &[usize]) -> Result<f64, BtsError> {
    let clusters = group(data, labels)?;
    let spreads = clusters
        .members
        .iter()
        .zip(clusters.centroids.iter())
        .map(|(m, c)| {
            m.iter().map(|&i| (data.row(i) - c).norm()).sum::<f64>() / m.len() as f64
        })
        .collect::<Vec<_>>();
    let k = spreads.len();
    let separation = |i: usize, j: usize| (&clusters.centroids[i] - &clusters.centroids[j]).norm();
    let all_separations_zero = (0..k).tuple_combinations().all(|(i, j)| separation(i, j) == 0.0);
    if spreads.iter().all(|&s| s == 0.0) || all_separations_zero {
        return Ok(0.0);
    }
    let worst = (0..k).map(|i| {
        (0..k)
            .filter(|&j| j != i)
            .map(|j| {
                let ratio = (spreads[i] + spreads[j]) / separation(i, j);
                if ratio.is_finite() {
                    ratio
                } else {
                    0.0
                }
            })
            .fold(f64::MIN, f64::max)
    });
    Ok(worst.sum::<f64>() / k as f64)
}

pub fn compute_scores(data: &DMatrix<f64>, labels: &[usize]) -> Result<Scores, BtsError> {
    Ok(Scores {
        ch: calinski_harabasz_score(data, labels)?,
        db: davies_bouldin_score(data, labels)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::assert_float_absolute_eq;

    fn points() -> DMatrix<f64> {
        DMatrix::from_row_slice(4, 1, &[0.0, 1.0, 10.0, 11.0])
    }

    #[test]
    fn test_scores_on_two_clusters() {
        let scores = compute_scores(&points(), &[0, 0, 1, 1]).unwrap();
        assert_float_absolute_eq!(scores.ch, 200.0, 1e-9);
        assert_float_absolute_eq!(scores.db, 0.1, 1e-12);
    }

    #[test]
    fn test_degenerate_scores() {
        let data = DMatrix::from_row_slice(4, 1, &[0.0, 0.0, 5.0, 5.0]);
        let labels = [0, 0, 1, 1];
        assert_float_absolute_eq!(calinski_harabasz_score(&data, &labels).unwrap(), 1.0, 1e-12);
        assert_float_absolute_eq!(davies_bouldin_score(&data, &labels).unwrap(), 0.0, 1e-12);
    }

    #[test]
    fn test_score_errors() {
        assert_eq!(
            calinski_harabasz_score(&points(), &[0, 0, 0, 0]),
            Err(BtsError::InvalidClusterCount {
                n_clusters: 1,
                n_samples: 4
            })
        );
        assert_eq!(
            davies_bouldin_score(&points(), &[0, 1]),
            Err(BtsError::LabelCountMismatch {
                labels: 2,
                n_samples: 4
            })
        );
    }
}
