//! Extended (n-ary) similarity counters and indices.
//!
//! Every column of a data set is summarized by its column sum `c`. With `n`
//! objects, a column counts as 1-similar when `2c - n` exceeds the
//! coincidence threshold, 0-similar when `n - 2c` does and dissimilar
//! otherwise.

use std::str::FromStr;

use crate::{BtsError, Metric};

/// Coincidence threshold.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Threshold {
    /// `n mod 2`
    #[default]
    Min,
    /// `ceil(n / 2)`
    Dissimilar,
    /// Absolute threshold, must be smaller than `n`. Zero means `Min`.
    Count(usize),
    /// Fraction of `n`, in (0, 1).
    Fraction(f64),
}

impl Threshold {
    pub fn resolve(self, n_objects: usize) -> Result<f64, BtsError> {
        match self {
            Threshold::Min | Threshold::Count(0) => Ok((n_objects % 2) as f64),
            Threshold::Dissimilar => Ok(n_objects.div_ceil(2) as f64),
            Threshold::Count(threshold) if threshold >= n_objects => {
                Err(BtsError::ThresholdTooLarge {
                    threshold,
                    n_objects,
                })
            }
            Threshold::Count(threshold) => Ok(threshold as f64),
            Threshold::Fraction(f) if f > 0.0 && f < 1.0 => Ok(f * n_objects as f64),
            Threshold::Fraction(f) => Err(BtsError::InvalidThreshold(f)),
        }
    }
}

impl FromStr for Threshold {
    type Err = BtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "min" => Ok(Threshold::Min),
            "dissimilar" => Ok(Threshold::Dissimilar),
            value => {
                if let Ok(count) = value.parse::<usize>() {
                    Ok(Threshold::Count(count))
                } else if let Ok(fraction) = value.parse::<f64>() {
                    Ok(Threshold::Fraction(fraction))
                } else {
                    Err(BtsError::UnknownName {
                        kind: "threshold",
                        value: s.to_string(),
                    })
                }
            }
        }
    }
}

/// Weight function applied to the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WFactor {
    #[default]
    Fraction,
    Power(u32),
    Uniform,
}

impl WFactor {
    fn similarity(self, d: f64, n_objects: usize) -> f64 {
        let n = n_objects as f64;
        match self {
            WFactor::Fraction => d / n,
            WFactor::Power(base) => f64::from(base).powf(-(n - d)),
            WFactor::Uniform => 1.0,
        }
    }

    fn dissimilarity(self, d: f64, n_objects: usize) -> f64 {
        let n = n_objects as f64;
        let parity = (n_objects % 2) as f64;
        match self {
            WFactor::Fraction => 1.0 - (d - parity) / n,
            WFactor::Power(base) => f64::from(base).powf(-(d - parity)),
            WFactor::Uniform => 1.0,
        }
    }
}

impl FromStr for WFactor {
    type Err = BtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        match value.as_str() {
            "fraction" => Ok(WFactor::Fraction),
            "none" | "uniform" => Ok(WFactor::Uniform),
            _ => value
                .strip_prefix("power_")
                .and_then(|base| base.parse::<u32>().ok())
                .map(WFactor::Power)
                .ok_or_else(|| BtsError::UnknownName {
                    kind: "weight factor",
                    value: s.to_string(),
                }),
        }
    }
}

/// Weighted and non-weighted similarity counters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Counters {
    pub a: f64,
    pub w_a: f64,
    pub d: f64,
    pub w_d: f64,
    pub total_sim: f64,
    pub total_w_sim: f64,
    pub total_dis: f64,
    pub total_w_dis: f64,
    pub p: f64,
    pub w_p: f64,
}

pub fn calculate_counters(
    c_total: &[f64],
    n_objects: usize,
    threshold: Threshold,
    w_factor: WFactor,
) -> Result<Counters, BtsError> {
    if n_objects == 0 {
        return Err(BtsError::EmptyData);
    }
    let threshold = threshold.resolve(n_objects)?;
    let n = n_objects as f64;
    let mut counters = c_total
        .iter()
        .map(|c| 2.0 * c - n)
        .fold(Counters::default(), |mut counters, diff| {
            if diff > threshold {
                counters.a += 1.0;
                counters.w_a += w_factor.similarity(diff, n_objects);
            } else if -diff > threshold {
                counters.d += 1.0;
                counters.w_d += w_factor.similarity(-diff, n_objects);
            } else if diff.abs() <= threshold {
                counters.total_dis += 1.0;
                counters.total_w_dis += w_factor.dissimilarity(diff.abs(), n_objects);
            }
            counters
        });
    counters.total_sim = counters.a + counters.d;
    counters.total_w_sim = counters.w_a + counters.w_d;
    counters.p = counters.total_sim + counters.total_dis;
    counters.w_p = counters.total_w_sim + counters.total_w_dis;
    Ok(counters)
}

/// Extended similarity indices with weighted numerators and non-weighted
/// denominators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indices {
    pub bub: f64,
    pub fai: f64,
    pub gle: f64,
    pub ja: f64,
    pub jt: f64,
    pub rt: f64,
    pub rr: f64,
    pub sm: f64,
    pub ss1: f64,
    pub ss2: f64,
}

impl Indices {
    pub fn from_counters(c: &Counters) -> Self {
        Self {
            bub: ((c.w_a * c.w_d).sqrt() + c.w_a) / ((c.a * c.d).sqrt() + c.a + c.total_dis),
            fai: (c.w_a + 0.5 * c.w_d) / c.p,
            gle: (2.0 * c.w_a) / (2.0 * c.a + c.total_dis),
            ja: (3.0 * c.w_a) / (3.0 * c.a + c.total_dis),
            jt: c.w_a / (c.a + c.total_dis),
            rt: c.total_w_sim / (c.p + c.total_dis),
            rr: c.w_a / c.p,
            sm: c.total_w_sim / c.p,
            ss1: c.w_a / (c.a + 2.0 * c.total_dis),
            ss2: (2.0 * c.total_w_sim) / (c.p + c.total_sim),
        }
    }

    /// Index for `metric`, `None` for MSD.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Msd => None,
            Metric::Bub => Some(self.bub),
            Metric::Fai => Some(self.fai),
            Metric::Gle => Some(self.gle),
            Metric::Ja => Some(self.ja),
            Metric::Jt => Some(self.jt),
            Metric::Rt => Some(self.rt),
            Metric::Rr => Some(self.rr),
            Metric::Sm => Some(self.sm),
            Metric::Ss1 => Some(self.ss1),
            Metric::Ss2 => Some(self.ss2),
        }
    }
}

pub fn gen_sim_indices(
    c_total: &[f64],
    n_objects: usize,
    threshold: Threshold,
    w_factor: WFactor,
) -> Result<Indices, BtsError> {
    calculate_counters(c_total, n_objects, threshold, w_factor).map(|c| Indices::from_counters(&c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::assert_float_absolute_eq;

    #[test]
    fn test_counters_fraction() {
        let counters =
            calculate_counters(&[0.0, 1.0, 2.0, 3.0], 3, Threshold::Min, WFactor::Fraction)
                .unwrap();
        assert_float_absolute_eq!(counters.a, 1.0, 1e-9);
        assert_float_absolute_eq!(counters.w_a, 1.0, 1e-9);
        assert_float_absolute_eq!(counters.d, 1.0, 1e-9);
        assert_float_absolute_eq!(counters.w_d, 1.0, 1e-9);
        assert_float_absolute_eq!(counters.total_dis, 2.0, 1e-9);
        assert_float_absolute_eq!(counters.total_w_dis, 2.0, 1e-9);
        assert_float_absolute_eq!(counters.p, 4.0, 1e-9);
        assert_float_absolute_eq!(counters.w_p, 4.0, 1e-9);
    }

    #[test]
    fn test_counters_power() {
        let counters =
            calculate_counters(&[0.5, 3.0], 3, Threshold::Min, WFactor::Power(2)).unwrap();
        assert_float_absolute_eq!(counters.d, 1.0, 1e-9);
        assert_float_absolute_eq!(counters.w_d, 0.5, 1e-9);
        assert_float_absolute_eq!(counters.w_a, 1.0, 1e-9);
    }

    #[test]
    fn test_indices() {
        let indices =
            gen_sim_indices(&[0.0, 1.0, 2.0, 3.0], 3, Threshold::Min, WFactor::Fraction).unwrap();
        assert_float_absolute_eq!(indices.bub, 0.5, 1e-9);
        assert_float_absolute_eq!(indices.fai, 0.375, 1e-9);
        assert_float_absolute_eq!(indices.gle, 0.5, 1e-9);
        assert_float_absolute_eq!(indices.ja, 0.6, 1e-9);
        assert_float_absolute_eq!(indices.jt, 1.0 / 3.0, 1e-9);
        assert_float_absolute_eq!(indices.rt, 1.0 / 3.0, 1e-9);
        assert_float_absolute_eq!(indices.rr, 0.25, 1e-9);
        assert_float_absolute_eq!(indices.sm, 0.5, 1e-9);
        assert_float_absolute_eq!(indices.ss1, 0.2, 1e-9);
        assert_float_absolute_eq!(indices.ss2, 2.0 / 3.0, 1e-9);
        assert!(indices.get(Metric::Msd).is_none());
        assert_eq!(indices.get(Metric::Rr), Some(0.25));
    }

    #[test]
    fn test_threshold() {
        assert_eq!(Threshold::Min.resolve(5), Ok(1.0));
        assert_eq!(Threshold::Count(0).resolve(4), Ok(0.0));
        assert_eq!(Threshold::Dissimilar.resolve(5), Ok(3.0));
        assert_eq!(Threshold::Count(2).resolve(5), Ok(2.0));
        assert!(Threshold::Count(5).resolve(5).is_err());
        assert_eq!(Threshold::Fraction(0.5).resolve(6), Ok(3.0));
        assert!(Threshold::Fraction(1.5).resolve(6).is_err());
        assert_eq!("dissimilar".parse::<Threshold>(), Ok(Threshold::Dissimilar));
        assert_eq!("3".parse::<Threshold>(), Ok(Threshold::Count(3)));
        assert_eq!("0.25".parse::<Threshold>(), Ok(Threshold::Fraction(0.25)));
    }

    #[test]
    fn test_w_factor_names() {
        assert_eq!("fraction".parse::<WFactor>(), Ok(WFactor::Fraction));
        assert_eq!("power_3".parse::<WFactor>(), Ok(WFactor::Power(3)));
        assert!("power_x".parse::<WFactor>().is_err());
    }
}
