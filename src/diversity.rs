use itertools::Itertools;
use nalgebra::DMatrix;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use std::str::FromStr;

use crate::bts::{frame, Comparison, Condensed};
use crate::math::IteratorArgExt;
use crate::{BtsError, Metric};

/// First frame(s) of a diversity selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DiversitySeed {
    #[default]
    Medoid,
    Outlier,
    /// Uniformly random frame, reproducible when seeded.
    Random(Option<u64>),
    Indices(Vec<usize>),
}

impl FromStr for DiversitySeed {
    type Err = BtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "medoid" => Ok(DiversitySeed::Medoid),
            "outlier" => Ok(DiversitySeed::Outlier),
            "random" => Ok(DiversitySeed::Random(None)),
            list => list
                .split(',')
                .map(|i| i.trim().parse::<usize>())
                .collect::<Result<Vec<_>, _>>()
                .map(DiversitySeed::Indices)
                .map_err(|_| BtsError::UnknownName {
                    kind: "diversity seed",
                    value: s.to_string(),
                }),
        }
    }
}

impl DiversitySeed {
    fn resolve(
        &self,
        data: &DMatrix<f64>,
        comparison: &Comparison,
    ) -> Result<Vec<usize>, BtsError> {
        match self {
            DiversitySeed::Medoid => Ok(vec![comparison.medoid(data)?]),
            DiversitySeed::Outlier => Ok(vec![comparison.outlier(data)?]),
            DiversitySeed::Random(seed) => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(*seed),
                    None => StdRng::from_entropy(),
                };
                Ok(vec![rng.gen_range(0..data.nrows())])
            }
            DiversitySeed::Indices(indices) => Ok(indices.clone()),
        }
    }
}

/// Selects `percentage` percent of the frames, each new frame being the one
/// that makes the selection most dissimilar.
pub fn diversity_selection(
    data: &DMatrix<f64>,
    percentage: usize,
    metric: Metric,
    seed: &DiversitySeed,
    n_atoms: usize,
) -> Result<Vec<usize>, BtsError> {
    let comparison = Comparison::new(metric, n_atoms)?;
    if data.nrows() == 0 {
        return Err(BtsError::EmptyData);
    }
    if percentage > 100 {
        return Err(BtsError::PercentageTooHigh(percentage));
    }
    let n_max = data.nrows() * percentage / 100;
    let start = seed.resolve(data, &comparison)?;
    select_diverse(data, n_max, &comparison, start)
}

/// Grows `start` greedily until it holds `n_max` frames or every frame is
/// selected. Repeated start indices count once.
pub fn select_diverse(
    data: &DMatrix<f64>,
    n_max: usize,
    comparison: &Comparison,
    start: Vec<usize>,
) -> Result<Vec<usize>, BtsError> {
    let n_total = data.nrows();
    if let Some(&index) = start.iter().find(|&&i| i >= n_total) {
        return Err(BtsError::IndexOutOfRange {
            index,
            len: n_total,
        });
    }
    let start = start.into_iter().unique().collect::<Vec<_>>();
    let mut selected_condensed = Condensed::from_rows(data, &start);
    let mut is_selected = vec![false; n_total];
    start.iter().for_each(|&i| is_selected[i] = true);
    let mut selected = start;
    while selected.len() < n_max {
        let select_from = (0..n_total).filter(|&i| !is_selected[i]).collect::<Vec<_>>();
        if select_from.is_empty() {
            break;
        }
        let new_index = get_new_index_n(data, comparison, &selected_condensed, &select_from)?;
        selected_condensed.push(&frame(data, new_index));
        is_selected[new_index] = true;
        selected.push(new_index);
    }
    Ok(selected)
}

/// Frame of `select_from` whose addition maximizes the comparison of the
/// selection.
pub fn get_new_index_n(
    data: &DMatrix<f64>,
    comparison: &Comparison,
    selected_condensed: &Condensed,
    select_from: &[usize],
) -> Result<usize, BtsError> {
    let values = select_from
        .par_iter()
        .map(|&i| comparison.condensed(&selected_condensed.with(&frame(data, i))))
        .collect::<Result<Vec<_>, _>>()?;
    values
        .into_iter()
        .arg_max()
        .map(|pos| select_from[pos])
        .ok_or(BtsError::EmptyData)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames() -> DMatrix<f64> {
        DMatrix::from_row_slice(6, 1, &[0.0, 1.0, 2.0, 3.0, 10.0, -8.0])
    }

    #[test]
    fn test_diversity_from_medoid() {
        let selected =
            diversity_selection(&frames(), 50, Metric::Msd, &DiversitySeed::Medoid, 1).unwrap();
        // medoid 1.0, then the two extremes
        assert_eq!(selected, vec![1, 4, 5]);
    }

    #[test]
    fn test_diversity_from_indices() {
        let seed = DiversitySeed::Indices(vec![0, 1]);
        let selected = diversity_selection(&frames(), 100, Metric::Msd, &seed, 1).unwrap();
        assert_eq!(selected.len(), 6);
        assert_eq!(&selected[..3], &[0, 1, 4]);
        let mut sorted = selected.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_repeated_start_indices_count_once() {
        let comparison = Comparison::new(Metric::Msd, 1).unwrap();
        let repeated = select_diverse(&frames(), 3, &comparison, vec![0, 0, 1]).unwrap();
        let single = select_diverse(&frames(), 3, &comparison, vec![0, 1]).unwrap();
        assert_eq!(repeated, single);
        assert_eq!(repeated, vec![0, 1, 4]);
    }

    #[test]
    fn test_diversity_random_is_reproducible() {
        let seed = DiversitySeed::Random(Some(7));
        let a = diversity_selection(&frames(), 50, Metric::Msd, &seed, 1).unwrap();
        let b = diversity_selection(&frames(), 50, Metric::Msd, &seed, 1).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_diversity_errors() {
        assert_eq!(
            diversity_selection(&frames(), 150, Metric::Msd, &DiversitySeed::Medoid, 1),
            Err(BtsError::PercentageTooHigh(150))
        );
        assert_eq!(
            diversity_selection(&frames(), 50, Metric::Msd, &DiversitySeed::Indices(vec![9]), 1),
            Err(BtsError::IndexOutOfRange { index: 9, len: 6 })
        );
        assert_eq!("outlier".parse::<DiversitySeed>(), Ok(DiversitySeed::Outlier));
        assert_eq!(
            "0, 2,4".parse::<DiversitySeed>(),
            Ok(DiversitySeed::Indices(vec![0, 2, 4]))
        );
    }
}
