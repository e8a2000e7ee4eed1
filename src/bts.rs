//! Extended comparison of frame sets and the per-frame quantities derived
//! from it.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::esim::{gen_sim_indices, Threshold, WFactor};
use crate::math::IteratorArgExt;
use crate::{BtsError, Metric};

/// Frame `i` of `data` as a column vector.
#[inline]
pub fn frame(data: &DMatrix<f64>, i: usize) -> DVector<f64> {
    data.row(i).transpose()
}

/// Column sum and squared column sum of a set of frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Condensed {
    pub c_sum: DVector<f64>,
    pub sq_sum: DVector<f64>,
    pub n_objects: usize,
}

impl Condensed {
    pub fn from_matrix(data: &DMatrix<f64>) -> Self {
        Self {
            c_sum: data.row_sum().transpose(),
            sq_sum: data.map(|x| x * x).row_sum().transpose(),
            n_objects: data.nrows(),
        }
    }

    pub fn from_rows(data: &DMatrix<f64>, rows: &[usize]) -> Self {
        rows.iter().fold(
            Self {
                c_sum: DVector::zeros(data.ncols()),
                sq_sum: DVector::zeros(data.ncols()),
                n_objects: 0,
            },
            |mut condensed, &i| {
                condensed.push(&frame(data, i));
                condensed
            },
        )
    }

    /// The set without `frame`.
    pub fn without(&self, frame: &DVector<f64>) -> Self {
        Self {
            c_sum: &self.c_sum - frame,
            sq_sum: &self.sq_sum - frame.component_mul(frame),
            n_objects: self.n_objects.saturating_sub(1),
        }
    }

    /// The set extended by `frame`.
    pub fn with(&self, frame: &DVector<f64>) -> Self {
        Self {
            c_sum: &self.c_sum + frame,
            sq_sum: &self.sq_sum + frame.component_mul(frame),
            n_objects: self.n_objects + 1,
        }
    }

    pub fn push(&mut self, frame: &DVector<f64>) {
        self.c_sum += frame;
        self.sq_sum += frame.component_mul(frame);
        self.n_objects += 1;
    }
}

/// Mean square deviation of `n` frames given their condensed sums.
pub fn msd_condensed(c_sum: &DVector<f64>, sq_sum: &DVector<f64>, n: usize, n_atoms: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let n = n as f64;
    let msd = c_sum
        .iter()
        .zip(sq_sum.iter())
        .map(|(c, sq)| 2.0 * (n * sq - c * c))
        .sum::<f64>()
        / (n * n);
    msd / n_atoms as f64
}

pub fn mean_square_deviation(data: &DMatrix<f64>, n_atoms: usize) -> Result<f64, BtsError> {
    Comparison::new(Metric::Msd, n_atoms)?.full(data, None)
}

/// An extended comparison: metric, system size and esim parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub metric: Metric,
    pub n_atoms: usize,
    pub threshold: Threshold,
    pub w_factor: WFactor,
}

impl Comparison {
    pub fn new(metric: Metric, n_atoms: usize) -> Result<Self, BtsError> {
        if n_atoms == 0 {
            return Err(BtsError::ZeroAtoms);
        }
        Ok(Self {
            metric,
            n_atoms,
            threshold: Threshold::default(),
            w_factor: WFactor::default(),
        })
    }

    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_w_factor(mut self, w_factor: WFactor) -> Self {
        self.w_factor = w_factor;
        self
    }

    /// Comparison of all frames of `data`. `n_objects` overrides the row
    /// count.
    pub fn full(&self, data: &DMatrix<f64>, n_objects: Option<usize>) -> Result<f64, BtsError> {
        if data.nrows() == 0 {
            return Err(BtsError::EmptyData);
        }
        let mut condensed = Condensed::from_matrix(data);
        condensed.n_objects = n_objects.unwrap_or(condensed.n_objects);
        self.condensed(&condensed)
    }

    pub fn condensed(&self, data: &Condensed) -> Result<f64, BtsError> {
        match self.metric {
            Metric::Msd => Ok(msd_condensed(
                &data.c_sum,
                &data.sq_sum,
                data.n_objects,
                self.n_atoms,
            )),
            metric => {
                let indices = gen_sim_indices(
                    data.c_sum.as_slice(),
                    data.n_objects,
                    self.threshold,
                    self.w_factor,
                )?;
                Ok(1.0 - indices.get(metric).unwrap_or(0.0))
            }
        }
    }

    /// Comparison of the set without each frame, in frame order.
    pub fn complementary(&self, data: &DMatrix<f64>) -> Result<Vec<f64>, BtsError> {
        match data.nrows() {
            0 => Err(BtsError::EmptyData),
            1 => Ok(vec![0.0]),
            n => {
                let total = Condensed::from_matrix(data);
                (0..n)
                    .into_par_iter()
                    .map(|i| self.condensed(&total.without(&frame(data, i))))
                    .collect()
            }
        }
    }

    /// Most representative frame: removing it leaves the most dissimilar set.
    pub fn medoid(&self, data: &DMatrix<f64>) -> Result<usize, BtsError> {
        let values = self.complementary(data)?;
        Ok(values.into_iter().arg_max().unwrap_or(0))
    }

    /// Least representative frame.
    pub fn outlier(&self, data: &DMatrix<f64>) -> Result<usize, BtsError> {
        let values = self.complementary(data)?;
        Ok(values.into_iter().arg_min().unwrap_or(0))
    }
}

pub fn extended_comparison(
    data: &DMatrix<f64>,
    metric: Metric,
    n_objects: Option<usize>,
    n_atoms: usize,
) -> Result<f64, BtsError> {
    Comparison::new(metric, n_atoms)?.full(data, n_objects)
}

pub fn condensed_comparison(
    condensed: &Condensed,
    metric: Metric,
    n_atoms: usize,
) -> Result<f64, BtsError> {
    Comparison::new(metric, n_atoms)?.condensed(condensed)
}

/// The greater the complementary value of a frame, the more representative
/// the frame is.
pub fn calculate_comp_sim(
    data: &DMatrix<f64>,
    metric: Metric,
    n_atoms: usize,
) -> Result<Vec<f64>, BtsError> {
    Comparison::new(metric, n_atoms)?.complementary(data)
}

pub fn calculate_medoid(
    data: &DMatrix<f64>,
    metric: Metric,
    n_atoms: usize,
) -> Result<usize, BtsError> {
    Comparison::new(metric, n_atoms)?.medoid(data)
}

pub fn calculate_outlier(
    data: &DMatrix<f64>,
    metric: Metric,
    n_atoms: usize,
) -> Result<usize, BtsError> {
    Comparison::new(metric, n_atoms)?.outlier(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::assert_float_absolute_eq;

    fn line() -> DMatrix<f64> {
        // five frames of one atom moving along x
        DMatrix::from_row_slice(5, 2, &[0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 3.0, 0.0, 10.0, 0.0])
    }

    #[test]
    fn test_mean_square_deviation() {
        let data = DMatrix::from_row_slice(2, 1, &[1.0, 3.0]);
        // c = 4, sq = 10, 2 * (2 * 10 - 16) / 4
        assert_float_absolute_eq!(mean_square_deviation(&data, 1).unwrap(), 2.0, 1e-12);
        assert_float_absolute_eq!(mean_square_deviation(&data, 2).unwrap(), 1.0, 1e-12);
        let single = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 3.0]);
        assert_float_absolute_eq!(mean_square_deviation(&single, 1).unwrap(), 0.0, 1e-12);
        assert_eq!(mean_square_deviation(&data, 0), Err(BtsError::ZeroAtoms));
        assert_eq!(
            mean_square_deviation(&DMatrix::zeros(0, 3), 1),
            Err(BtsError::EmptyData)
        );
    }

    #[test]
    fn test_msd_with_explicit_object_count() {
        let data = DMatrix::from_row_slice(2, 1, &[1.0, 3.0]);
        // c = 4, sq = 10, 2 * (1000 * 10 - 16) / 1000^2
        let value = extended_comparison(&data, Metric::Msd, Some(1000), 1).unwrap();
        assert_float_absolute_eq!(value, 0.019968, 1e-12);
        let (c_sum, sq_sum) = (DVector::from_element(1, 4.0), DVector::from_element(1, 10.0));
        assert_float_absolute_eq!(value, msd_condensed(&c_sum, &sq_sum, 1000, 1), 1e-12);
        let value = extended_comparison(&data, Metric::Msd, None, 1).unwrap();
        assert_float_absolute_eq!(value, 2.0, 1e-12);
    }

    #[test]
    fn test_msd_is_mean_pairwise_distance() {
        let data = line();
        let n = data.nrows();
        let pairwise = (0..n)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .map(|(i, j)| (data.row(i) - data.row(j)).norm_squared())
            .sum::<f64>()
            / (n * n) as f64;
        assert_float_absolute_eq!(mean_square_deviation(&data, 1).unwrap(), pairwise, 1e-9);
    }

    #[test]
    fn test_condensed_matches_full() {
        let data = line();
        let condensed = Condensed::from_matrix(&data);
        assert_eq!(Condensed::from_rows(&data, &[0, 1, 2, 3, 4]), condensed);
        let without = condensed.without(&frame(&data, 4));
        let head = data.rows(0, 4).into_owned();
        assert_float_absolute_eq!(
            msd_condensed(&without.c_sum, &without.sq_sum, without.n_objects, 1),
            mean_square_deviation(&head, 1).unwrap(),
            1e-9
        );
        assert_eq!(without.with(&frame(&data, 4)), condensed);
    }

    #[test]
    fn test_comp_sim_medoid_outlier() {
        let data = line();
        let comp_sim = calculate_comp_sim(&data, Metric::Msd, 1).unwrap();
        assert_eq!(comp_sim.len(), 5);
        let head = data.rows(0, 4).into_owned();
        assert_float_absolute_eq!(comp_sim[4], mean_square_deviation(&head, 1).unwrap(), 1e-9);
        // removing the far frame leaves the tightest set
        assert_eq!(calculate_outlier(&data, Metric::Msd, 1).unwrap(), 4);
        // mean is 3.2
        assert_eq!(calculate_medoid(&data, Metric::Msd, 1).unwrap(), 3);
    }

    #[test]
    #[rustfmt::skip]
    fn test_similarity_metrics() {
        let data = DMatrix::from_row_slice(3, 4, &[
            0.0, 0.0, 1.0, 1.0,
            0.0, 1.0, 0.0, 1.0,
            0.0, 0.0, 1.0, 1.0,
        ]);
        // column sums 0, 1, 2, 3 with three objects
        let value = extended_comparison(&data, Metric::Rr, None, 1).unwrap();
        assert_float_absolute_eq!(value, 0.75, 1e-12);
        let value = extended_comparison(&data, Metric::Ss2, None, 1).unwrap();
        assert_float_absolute_eq!(value, 1.0 / 3.0, 1e-12);
        let comp_sim = calculate_comp_sim(&data, Metric::Jt, 1).unwrap();
        assert_eq!(comp_sim.len(), 3);
        assert_float_absolute_eq!(comp_sim[0], comp_sim[2], 1e-12);
    }

    #[test]
    fn test_single_frame() {
        let data = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        assert_eq!(calculate_comp_sim(&data, Metric::Rr, 1).unwrap(), vec![0.0]);
        assert_eq!(calculate_medoid(&data, Metric::Rr, 1).unwrap(), 0);
    }
}
