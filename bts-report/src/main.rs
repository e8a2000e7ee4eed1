use anyhow::Result;
use clap::Parser;
use itertools::Itertools;
use nami_rust::{
    brief, brief_matrix, calculate_comp_sim, calculate_medoid, calculate_outlier,
    diversity_selection, extended_comparison, load_npy, mean_square_deviation, msd_condensed,
    trim_outliers, Condensed, Criterion, DiversitySeed, Metric, TrimAmount,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Prints every comparison result for a frame matrix", long_about = None)]
struct Cli {
    /// Frame matrix (.npy)
    npy_file: PathBuf,

    #[arg(short, long, default_value_t = 10)]
    n_atoms: usize,

    /// Frames to trim, a count or a fraction in (0, 1)
    #[arg(short = 't', long, default_value = "0.5")]
    percent_trimmed: TrimAmount,

    /// Share of frames picked by diversity selection, in percent
    #[arg(short, long, default_value_t = 75)]
    percentage: usize,

    /// Metrics to report, all by default
    #[arg(short, long, value_delimiter = ',')]
    metrics: Vec<Metric>,
}

fn section<F>(title: &str, metrics: &[Metric], result: F) -> Result<()>
where
    F: Fn(Metric) -> Result<String>,
{
    println!("{title}:");
    let lines = metrics
        .iter()
        .map(|&metric| {
            let pad = if metric.name().len() == 2 { " " } else { "" };
            result(metric).map(|r| format!("Metric {pad}'{metric}': {r}"))
        })
        .collect::<Result<Vec<_>>>()?;
    println!("{}\n", lines.iter().join("\n"));
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let matrix = load_npy(&cli.npy_file)?;
    let metrics = if cli.metrics.is_empty() {
        Metric::ALL.to_vec()
    } else {
        cli.metrics
    };
    let n_atoms = cli.n_atoms;

    let msd = mean_square_deviation(&matrix, n_atoms)?;
    let condensed = Condensed::from_matrix(&matrix);
    let msd_cond = msd_condensed(&condensed.c_sum, &condensed.sq_sum, condensed.n_objects, n_atoms);
    println!("\nMSD Result: {msd:.2} \nMSD Condensed Result: {msd_cond:.2} \n");

    section("Extended Comparison", &metrics, |m| {
        Ok(format!("{:.2}", extended_comparison(&matrix, m, None, n_atoms)?))
    })?;
    section("Complementary Similarity", &metrics, |m| {
        let values = calculate_comp_sim(&matrix, m, n_atoms)?
            .into_iter()
            .map(|v| format!("{v:.4}"))
            .collect::<Vec<_>>();
        Ok(format!("\n{}", brief(&values)))
    })?;
    section("Calculate Medoid", &metrics, |m| {
        Ok(calculate_medoid(&matrix, m, n_atoms)?.to_string())
    })?;
    section("Calculate Outlier", &metrics, |m| {
        Ok(calculate_outlier(&matrix, m, n_atoms)?.to_string())
    })?;
    for (title, criterion) in [
        ("Trim Outliers", Criterion::CompSim),
        ("Trim Outliers (sim to medoid)", Criterion::SimToMedoid),
    ] {
        section(title, &metrics, |m| {
            let trimmed = trim_outliers(&matrix, cli.percent_trimmed, m, n_atoms, criterion)?;
            Ok(format!("\n{}", brief_matrix(&trimmed)))
        })?;
    }
    section("Diversity Selection", &metrics, |m| {
        let seed = DiversitySeed::Medoid;
        let selected = diversity_selection(&matrix, cli.percentage, m, &seed, n_atoms)?;
        Ok(format!("\n{}", selected.iter().join(" ")))
    })?;
    Ok(())
}
