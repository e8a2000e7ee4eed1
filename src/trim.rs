use nalgebra::DMatrix;
use std::str::FromStr;

use crate::bts::Comparison;
use crate::math::argsort;
use crate::{BtsError, Metric};

/// How outliers are ranked for trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Criterion {
    /// Lowest complementary value first.
    #[default]
    CompSim,
    /// Farthest from the medoid first.
    SimToMedoid,
}

impl FromStr for Criterion {
    type Err = BtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "comp_sim" => Ok(Criterion::CompSim),
            "sim_to_medoid" => Ok(Criterion::SimToMedoid),
            _ => Err(BtsError::UnknownName {
                kind: "criterion",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrimAmount {
    Count(usize),
    /// Fraction of the frames, in (0, 1).
    Fraction(f64),
}

impl TrimAmount {
    pub fn resolve(self, n_objects: usize) -> Result<usize, BtsError> {
        let n_trimmed = match self {
            TrimAmount::Count(n) => n,
            TrimAmount::Fraction(f) if f > 0.0 && f < 1.0 => {
                (n_objects as f64 * f).floor() as usize
            }
            TrimAmount::Fraction(f) => return Err(BtsError::InvalidFraction(f)),
        };
        if n_trimmed > n_objects {
            return Err(BtsError::TrimTooLarge {
                n_trimmed,
                n_objects,
            });
        }
        Ok(n_trimmed)
    }
}

impl FromStr for TrimAmount {
    type Err = BtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        s.parse::<usize>()
            .map(TrimAmount::Count)
            .or_else(|_| s.parse::<f64>().map(TrimAmount::Fraction))
            .map_err(|_| BtsError::UnknownName {
                kind: "trim amount",
                value: s.to_string(),
            })
    }
}

/// Indices of the frames `trim_outliers` removes, most outlying last.
pub fn outlier_indices(
    data: &DMatrix<f64>,
    amount: TrimAmount,
    metric: Metric,
    n_atoms: usize,
    criterion: Criterion,
) -> Result<Vec<usize>, BtsError> {
    let comparison = Comparison::new(metric, n_atoms)?;
    if data.nrows() == 0 {
        return Err(BtsError::EmptyData);
    }
    let cutoff = amount.resolve(data.nrows())?;
    if cutoff == 0 {
        return Ok(Vec::new());
    }
    match criterion {
        Criterion::CompSim => {
            let comp_sims = comparison.complementary(data)?;
            let mut lowest = argsort(&comp_sims);
            lowest.truncate(cutoff);
            lowest.reverse();
            Ok(lowest)
        }
        Criterion::SimToMedoid => {
            let medoid = data.row(comparison.medoid(data)?).clone_owned();
            let values = data
                .row_iter()
                .map(|row| {
                    let pair = DMatrix::from_rows(&[row.clone_owned(), medoid.clone()]);
                    comparison.full(&pair, None)
                })
                .collect::<Result<Vec<_>, _>>()?;
            let sorted = argsort(&values);
            Ok(sorted[sorted.len() - cutoff..].to_vec())
        }
    }
}

/// Removes the `amount` most outlying frames; the remaining frames keep
/// their order.
pub fn trim_outliers(
    data: &DMatrix<f64>,
    amount: TrimAmount,
    metric: Metric,
    n_atoms: usize,
    criterion: Criterion,
) -> Result<DMatrix<f64>, BtsError> {
    let removed = outlier_indices(data, amount, metric, n_atoms, criterion)?;
    let kept = (0..data.nrows())
        .filter(|i| !removed.contains(i))
        .collect::<Vec<_>>();
    log::debug!("trimmed {} of {} frames", removed.len(), data.nrows());
    Ok(data.select_rows(kept.iter()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames() -> DMatrix<f64> {
        DMatrix::from_row_slice(6, 1, &[0.0, 1.0, 2.0, 3.0, 10.0, -8.0])
    }

    #[test]
    fn test_trim_comp_sim() {
        let data = frames();
        let amount = TrimAmount::Count(2);
        let trimmed = trim_outliers(&data, amount, Metric::Msd, 1, Criterion::CompSim).unwrap();
        assert_eq!(trimmed.as_slice(), &[0.0, 1.0, 2.0, 3.0]);
        let removed = outlier_indices(&data, amount, Metric::Msd, 1, Criterion::CompSim).unwrap();
        assert_eq!(removed, vec![4, 5]);
    }

    #[test]
    fn test_trim_sim_to_medoid() {
        let data = frames();
        let amount = TrimAmount::Fraction(0.4);
        let trimmed =
            trim_outliers(&data, amount, Metric::Msd, 1, Criterion::SimToMedoid).unwrap();
        assert_eq!(trimmed.nrows(), 4);
        assert_eq!(trimmed.as_slice(), &[0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_trim_amounts() {
        let data = frames();
        let same =
            trim_outliers(&data, TrimAmount::Count(0), Metric::Msd, 1, Criterion::CompSim).unwrap();
        assert_eq!(same, data);
        assert_eq!(
            trim_outliers(&data, TrimAmount::Count(7), Metric::Msd, 1, Criterion::CompSim),
            Err(BtsError::TrimTooLarge {
                n_trimmed: 7,
                n_objects: 6
            })
        );
        assert!(TrimAmount::Fraction(1.0).resolve(6).is_err());
        assert_eq!(TrimAmount::Fraction(0.8).resolve(10), Ok(8));
        assert_eq!("3".parse::<TrimAmount>(), Ok(TrimAmount::Count(3)));
        assert_eq!("0.5".parse::<TrimAmount>(), Ok(TrimAmount::Fraction(0.5)));
        assert_eq!("sim_to_medoid".parse::<Criterion>(), Ok(Criterion::SimToMedoid));
    }
}
