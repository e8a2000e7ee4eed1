//! Lloyd k-means and the k-means++ seeding family.

use nalgebra::DMatrix;
use rand::{seq::index::sample, Rng};
use rayon::prelude::*;

use crate::math::{IteratorArgExt, IteratorAvg};
use crate::BtsError;

/// Result of a k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterData {
    pub labels: Vec<usize>,
    /// One row per cluster.
    pub centers: DMatrix<f64>,
    pub n_iter: usize,
}

fn squared_distance(data: &DMatrix<f64>, i: usize, centers: &DMatrix<f64>, c: usize) -> f64 {
    data.row(i)
        .iter()
        .zip(centers.row(c).iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum()
}

/// Index of the closest center for every frame together with the squared
/// distance to it.
pub fn assign_labels(
    data: &DMatrix<f64>,
    centers: &DMatrix<f64>,
) -> Result<Vec<(usize, f64)>, BtsError> {
    if centers.nrows() == 0 {
        return Err(BtsError::InvalidClusterCount {
            n_clusters: 0,
            n_samples: data.nrows(),
        });
    }
    if centers.ncols() != data.ncols() {
        return Err(BtsError::ShapeMismatch {
            left: centers.shape(),
            right: data.shape(),
        });
    }
    Ok((0..data.nrows())
        .into_par_iter()
        .map(|i| {
            (0..centers.nrows())
                .map(|c| (c, squared_distance(data, i, centers, c)))
                .fold((0, f64::INFINITY), |best, (c, d)| if d < best.1 { (c, d) } else { best })
        })
        .collect())
}

fn mean_variance(data: &DMatrix<f64>) -> f64 {
    data.column_iter()
        .filter_map(|col| col.iter().copied().var())
        .avg()
        .unwrap_or(0.0)
}

fn update_centers(data: &DMatrix<f64>, assigned: &[(usize, f64)], k: usize) -> DMatrix<f64> {
    let mut sums = DMatrix::<f64>::zeros(k, data.ncols());
    let mut counts = vec![0usize; k];
    for (i, &(label, _)) in assigned.iter().enumerate() {
        let mut row = sums.row_mut(label);
        row += data.row(i);
        counts[label] += 1;
    }

    // empty clusters take the frames farthest from their center, never the
    // last member of a cluster
    let empty = (0..k).filter(|&c| counts[c] == 0).collect::<Vec<_>>();
    if !empty.is_empty() {
        let mut far = (0..assigned.len()).collect::<Vec<_>>();
        far.sort_by(|&a, &b| assigned[b].1.total_cmp(&assigned[a].1));
        let mut far = far.into_iter();
        for c in empty {
            let Some(i) = far.by_ref().find(|&i| counts[assigned[i].0] > 1) else {
                break;
            };
            log::debug!("relocating empty cluster {c} to frame {i}");
            let old = assigned[i].0;
            let mut row = sums.row_mut(old);
            row -= data.row(i);
            counts[old] -= 1;
            sums.set_row(c, &data.row(i));
            counts[c] = 1;
        }
    }

    for (c, &count) in counts.iter().enumerate() {
        if count > 0 {
            let mut row = sums.row_mut(c);
            row /= count as f64;
        }
    }
    sums
}

/// Lloyd iterations from the given initial centers. Stops when the labels
/// stop changing or the total squared center shift drops to
/// `tol * mean feature variance`.
pub fn lloyd(
    data: &DMatrix<f64>,
    initial_centers: &DMatrix<f64>,
    max_iter: usize,
    tol: f64,
) -> Result<ClusterData, BtsError> {
    let n_samples = data.nrows();
    let k = initial_centers.nrows();
    if n_samples == 0 {
        return Err(BtsError::EmptyData);
    }
    if k == 0 || k > n_samples {
        return Err(BtsError::InvalidClusterCount {
            n_clusters: k,
            n_samples,
        });
    }
    if initial_centers.ncols() != data.ncols() {
        return Err(BtsError::ShapeMismatch {
            left: initial_centers.shape(),
            right: data.shape(),
        });
    }

    let tol = tol * mean_variance(data);
    let mut centers = initial_centers.clone_owned();
    let mut labels: Option<Vec<usize>> = None;
    let mut n_iter = 0;
    for iter in 0..max_iter {
        n_iter = iter + 1;
        let assigned = assign_labels(data, &centers)?;
        let new_labels = assigned.iter().map(|&(l, _)| l).collect::<Vec<_>>();
        if labels.as_ref() == Some(&new_labels) {
            log::debug!("k-means converged strictly after {n_iter} iterations");
            break;
        }
        let new_centers = update_centers(data, &assigned, k);
        let shift = (&new_centers - &centers).norm_squared();
        centers = new_centers;
        labels = Some(new_labels);
        if shift <= tol {
            log::debug!(
                "k-means center shift {shift:e} within tolerance after {n_iter} iterations"
            );
            break;
        }
    }

    let labels = assign_labels(data, &centers)?
        .into_iter()
        .map(|(l, _)| l)
        .collect();
    Ok(ClusterData {
        labels,
        centers,
        n_iter,
    })
}

/// k-means++ seeding. Each new center is the best of `n_local_trials`
/// candidates drawn proportionally to the squared distance to the closest
/// chosen center.
pub fn kmeans_plusplus<R: Rng>(
    data: &DMatrix<f64>,
    n_clusters: usize,
    n_local_trials: usize,
    rng: &mut R,
) -> Result<Vec<usize>, BtsError> {
    let n_samples = data.nrows();
    if n_clusters == 0 || n_clusters > n_samples {
        return Err(BtsError::InvalidClusterCount {
            n_clusters,
            n_samples,
        });
    }
    let distances_to = |c: usize| {
        (0..n_samples)
            .map(|i| squared_distance(data, i, data, c))
            .collect::<Vec<_>>()
    };

    let first = rng.gen_range(0..n_samples);
    let mut chosen = vec![first];
    let mut closest = distances_to(first);
    let mut potential: f64 = closest.iter().sum();

    while chosen.len() < n_clusters {
        let cumulative = closest
            .iter()
            .scan(0.0, |acc, d| {
                *acc += d;
                Some(*acc)
            })
            .collect::<Vec<_>>();
        let candidates = (0..n_local_trials.max(1))
            .map(|_| {
                let value = rng.gen::<f64>() * potential;
                cumulative
                    .partition_point(|&c| c < value)
                    .min(n_samples - 1)
            })
            .collect::<Vec<_>>();
        let trials = candidates
            .par_iter()
            .map(|&c| {
                let updated = distances_to(c)
                    .into_iter()
                    .zip(closest.iter())
                    .map(|(d, &old)| d.min(old))
                    .collect::<Vec<_>>();
                let potential = updated.iter().sum::<f64>();
                (updated, potential)
            })
            .collect::<Vec<_>>();
        let best = trials
            .iter()
            .map(|(_, p)| *p)
            .arg_min()
            .unwrap_or(0);
        chosen.push(candidates[best]);
        let (updated, best_potential) = trials.into_iter().nth(best).unwrap_or_default();
        closest = updated;
        potential = best_potential;
    }
    Ok(chosen)
}

/// Greedy k-means++ trial count.
pub fn default_local_trials(n_clusters: usize) -> usize {
    2 + (n_clusters as f64).ln().floor().max(0.0) as usize
}

/// `n_clusters` distinct random frames.
pub fn random_centers<R: Rng>(
    data: &DMatrix<f64>,
    n_clusters: usize,
    rng: &mut R,
) -> Result<Vec<usize>, BtsError> {
    let n_samples = data.nrows();
    if n_clusters == 0 || n_clusters > n_samples {
        return Err(BtsError::InvalidClusterCount {
            n_clusters,
            n_samples,
        });
    }
    Ok(sample(rng, n_samples, n_clusters).into_vec())
}
