//! Instant similarity (iSIM): the average of all pairwise similarities of a
//! set, computed from its column sums in linear time.

use nalgebra::DMatrix;
use std::f64::consts::PI;

use crate::{BtsError, Metric};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IsimCounters {
    pub a: f64,
    pub d: f64,
    pub total_sim: f64,
    pub total_dis: f64,
    pub p: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsimIndices {
    pub ac: f64,
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

/// Column sums of `data`, one entry per column.
pub fn column_totals(data: &DMatrix<f64>) -> Vec<f64> {
    data.column_iter().map(|col| col.sum()).collect()
}

/// Pairwise counters, each term raised to `1/k` to approximate the mean of
/// the similarities raised to `1/k`.
pub fn isim_counters(c_total: &[f64], n_objects: usize, k: u32) -> IsimCounters {
    let n = n_objects as f64;
    let power = 1.0 / f64::from(k.max(1));
    let (a, d, total_dis) = c_total.iter().fold((0.0, 0.0, 0.0), |(a, d, dis), &c| {
        let off = n - c;
        (
            a + (c * (c - 1.0) / 2.0).powf(power),
            d + (off * (off - 1.0) / 2.0).powf(power),
            dis + (off * c).powf(power),
        )
    });
    let total_sim = a + d;
    IsimCounters {
        a,
        d,
        total_sim,
        total_dis,
        p: total_sim + total_dis,
    }
}

/// iSIM for RR, JT or SM.
pub fn calculate_isim(c_total: &[f64], n_objects: usize, metric: Metric) -> Result<f64, BtsError> {
    if n_objects < 2 {
        return Err(BtsError::EmptyData);
    }
    let n = n_objects as f64;
    let a: f64 = c_total.iter().map(|c| c * (c - 1.0) / 2.0).sum();
    match metric {
        Metric::Rr => Ok(a / (n * (n - 1.0) * c_total.len() as f64 / 2.0)),
        Metric::Jt => {
            let total_dis: f64 = c_total.iter().map(|c| (n - c) * c).sum();
            Ok(a / (a + total_dis))
        }
        Metric::Sm => {
            let d: f64 = c_total
                .iter()
                .map(|c| (n - c) * (n - c - 1.0) / 2.0)
                .sum();
            Ok((a + d) / (n * (n - 1.0) * c_total.len() as f64 / 2.0))
        }
        other => Err(BtsError::UnsupportedMetric(other)),
    }
}

pub fn gen_isim_indices(c_total: &[f64], n_objects: usize, k: u32) -> IsimIndices {
    let c = isim_counters(c_total, n_objects, k);
    let ad = (c.a * c.d).sqrt();
    IsimIndices {
        ac: (2.0 / PI) * (c.total_sim / c.p).sqrt().asin(),
        bub: (ad + c.a) / (ad + c.a + c.total_dis),
        fai: (c.a + 0.5 * c.d) / c.p,
        gle: (2.0 * c.a) / (2.0 * c.a + c.total_dis),
        ja: (3.0 * c.a) / (3.0 * c.a + c.total_dis),
        jt: c.a / (c.a + c.total_dis),
        rt: c.total_sim / (c.p + c.total_dis),
        rr: c.a / c.p,
        sm: c.total_sim / c.p,
        ss1: c.a / (c.a + 2.0 * c.total_dis),
        ss2: (2.0 * c.total_sim) / (c.p + c.total_sim),
    }
}
