use anyhow::{bail, Result};
use clap::Parser;
use itertools::Itertools;
use nami_rust::{compare_tables, read_table, Initiator, TableDiff};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Compares centroid tables of two tools", long_about = None)]
struct Cli {
    #[arg(short, long, env = "NAMI")]
    base_dir: PathBuf,

    #[arg(short, long, default_value = "ala10")]
    dataset: String,

    /// Tool whose tables are checked
    #[arg(long, default_value = "NAMI")]
    ours: String,

    /// Tool providing the reference tables
    #[arg(long, default_value = "MDANCE")]
    reference: String,

    #[arg(short, long, value_delimiter = ',', default_value = "random,comp_sim,div_select")]
    initiators: Vec<Initiator>,

    #[arg(short, long, value_delimiter = ',', default_value = "alpha,hairpin,left,pp2")]
    confirmations: Vec<String>,

    /// Header lines in our tables
    #[arg(long, default_value_t = 1)]
    skip_ours: usize,

    /// Header lines in the reference tables
    #[arg(long, default_value_t = 4)]
    skip_reference: usize,

    /// Largest accepted absolute difference
    #[arg(short, long, default_value_t = 1e-3)]
    tolerance: f64,

    /// Print the statistics without failing on large differences
    #[arg(long)]
    report_only: bool,
}

fn exceeds(diff: &TableDiff, tolerance: f64) -> bool {
    diff.max_abs.is_nan() || diff.max_abs > tolerance
}

fn verdict(failed: &[&str], total: usize, report_only: bool) -> Result<()> {
    if !failed.is_empty() && !report_only {
        bail!("{} of {} tables differ: {}", failed.len(), total, failed.iter().join(", "));
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let output = cli.base_dir.join("output").join(&cli.dataset);
    let tests = cli
        .confirmations
        .iter()
        .cartesian_product(cli.initiators.iter())
        .map(|(conf, init)| format!("{}_{conf}", init.file_prefix()))
        .collect::<Vec<_>>();

    let mut failed = Vec::new();
    for test in &tests {
        let ours = read_table(output.join(&cli.ours).join(format!("{test}.csv")), cli.skip_ours)?;
        let reference = read_table(
            output.join(&cli.reference).join(format!("{test}.csv")),
            cli.skip_reference,
        )?;
        let diff = compare_tables(&ours, &reference)?;
        println!("{test}\n{}", "-".repeat(test.len()));
        println!("N - Min:\t{:8.4}\tMax:\t{:8.4}", diff.ours.0, diff.ours.1);
        println!("M - Min:\t{:8.4}\tMax:\t{:8.4}", diff.reference.0, diff.reference.1);
        println!("D - Min:\t{:8.4}\tMax:\t{:8.4}", diff.diff.0, diff.diff.1);
        println!("\n\n");
        if exceeds(&diff, cli.tolerance) {
            log::warn!("{test}: max abs difference {:e} above {:e}", diff.max_abs, cli.tolerance);
            failed.push(test.as_str());
        }
    }

    verdict(&failed, tests.len(), cli.report_only)
}
