use std::error::Error;
use std::fmt;

use crate::Metric;

/// Failures of the similarity, selection and clustering routines.
#[derive(Debug, Clone, PartialEq)]
pub enum BtsError {
    EmptyData,
    ZeroAtoms,
    UnknownName { kind: &'static str, value: String },
    ThresholdTooLarge { threshold: usize, n_objects: usize },
    InvalidThreshold(f64),
    UnsupportedMetric(Metric),
    PercentageTooHigh(usize),
    InvalidFraction(f64),
    TrimTooLarge { n_trimmed: usize, n_objects: usize },
    IndexOutOfRange { index: usize, len: usize },
    NotEnoughInitiators { found: usize, needed: usize },
    InvalidClusterCount { n_clusters: usize, n_samples: usize },
    ShapeMismatch { left: (usize, usize), right: (usize, usize) },
    LabelCountMismatch { labels: usize, n_samples: usize },
}

impl fmt::Display for BtsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BtsError::EmptyData => write!(f, "data set contains no frames"),
            BtsError::ZeroAtoms => write!(f, "number of atoms must be at least 1"),
            BtsError::UnknownName { kind, value } => write!(f, "unknown {kind} '{value}'"),
            BtsError::ThresholdTooLarge {
                threshold,
                n_objects,
            } => write!(
                f,
                "coincidence threshold {threshold} must be smaller than the number of objects {n_objects}"
            ),
            BtsError::InvalidThreshold(t) => write!(f, "invalid coincidence threshold {t}"),
            BtsError::UnsupportedMetric(m) => write!(f, "metric '{m}' is not supported here"),
            BtsError::PercentageTooHigh(p) => write!(f, "percentage {p} is above 100"),
            BtsError::InvalidFraction(v) => write!(f, "fraction {v} is not in (0, 1)"),
            BtsError::TrimTooLarge {
                n_trimmed,
                n_objects,
            } => write!(f, "cannot trim {n_trimmed} frames out of {n_objects}"),
            BtsError::IndexOutOfRange { index, len } => {
                write!(f, "index {index} is out of range for {len} frames")
            }
            BtsError::NotEnoughInitiators { found, needed } => {
                write!(f, "found {found} initial centers, {needed} needed")
            }
            BtsError::InvalidClusterCount {
                n_clusters,
                n_samples,
            } => write!(f, "invalid number of clusters {n_clusters} for {n_samples} samples"),
            BtsError::ShapeMismatch { left, right } => write!(
                f,
                "shape mismatch: {}x{} vs {}x{}",
                left.0, left.1, right.0, right.1
            ),
            BtsError::LabelCountMismatch { labels, n_samples } => {
                write!(f, "{labels} labels given for {n_samples} samples")
            }
        }
    }
}

impl Error for BtsError {}
