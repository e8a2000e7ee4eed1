//! Centroid tables: cluster centers stored one column per cluster.

use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use nalgebra::DMatrix;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use crate::BtsError;

pub struct CentroidTable {
    /// `n_features x n_clusters`.
    table: DMatrix<f64>,
    n_iter: usize,
}

impl CentroidTable {
    /// `centers` holds one row per cluster.
    pub fn new(centers: &DMatrix<f64>, n_iter: usize) -> Self {
        Self {
            table: centers.transpose(),
            n_iter,
        }
    }

    pub fn table(&self) -> &DMatrix<f64> {
        &self.table
    }

    fn header(&self) -> Vec<String> {
        let mut header = vec![
            format!("Number of clusters: {}", self.table.ncols()),
            format!("Number of iterations: {}", self.n_iter),
        ];
        header.resize(self.table.ncols().max(2), String::new());
        header
    }

    /// Writes the table after a single descriptive header line, creating
    /// parent directories.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context(format!("Creating {}", parent.to_string_lossy()))?;
        }
        let file = File::create(path).context(format!("Creating {}", path.to_string_lossy()))?;
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .from_writer(BufWriter::new(file));
        writer.write_record(self.header())?;
        for row in self.table.row_iter() {
            writer.write_record(row.iter().map(|v| v.to_string()))?;
        }
        writer.flush()?;
        log::debug!(
            "wrote {}x{} centroid table to {}",
            self.table.nrows(),
            self.table.ncols(),
            path.to_string_lossy()
        );
        Ok(())
    }
}

/// Reads a comma separated numeric table, skipping the first `skip_lines`
/// lines. Lines starting with `#` are ignored.
pub fn read_table<P: AsRef<Path>>(path: P, skip_lines: usize) -> Result<DMatrix<f64>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).context(format!("Reading {}", path.to_string_lossy()))?;
    let body = content.lines().skip(skip_lines).collect::<Vec<_>>().join("\n");
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(body.as_bytes());

    let mut values = Vec::new();
    let mut ncols = 0;
    let mut nrows = 0;
    for record in reader.records() {
        let record = record.context(format!("Parsing {}", path.to_string_lossy()))?;
        ncols = record.len();
        for field in record.iter() {
            let value = field
                .parse::<f64>()
                .map_err(|_| anyhow!("invalid number '{field}' in {}", path.to_string_lossy()))?;
            values.push(value);
        }
        nrows += 1;
    }
    Ok(DMatrix::from_row_iterator(nrows, ncols, values))
}

/// Summary of two tables and their elementwise difference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableDiff {
    pub ours: (f64, f64),
    pub reference: (f64, f64),
    /// Min and max of `ours - reference`.
    pub diff: (f64, f64),
    pub max_abs: f64,
}

fn min_max(m: &DMatrix<f64>) -> (f64, f64) {
    (m.min(), m.max())
}

pub fn compare_tables(
    ours: &DMatrix<f64>,
    reference: &DMatrix<f64>,
) -> Result<TableDiff, BtsError> {
    if ours.shape() != reference.shape() {
        return Err(BtsError::ShapeMismatch {
            left: ours.shape(),
            right: reference.shape(),
        });
    }
    if ours.is_empty() {
        return Err(BtsError::EmptyData);
    }
    let diff = ours - reference;
    Ok(TableDiff {
        ours: min_max(ours),
        reference: min_max(reference),
        diff: min_max(&diff),
        max_abs: diff.abs().max(),
    })
}
