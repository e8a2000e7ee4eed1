use anyhow::{Context, Result};
use clap::Parser;
use nami_rust::{
    brief, brief_matrix, calculate_comp_sim, calculate_medoid, calculate_outlier,
    diversity_selection, extended_comparison, load_npy, trim_outliers, Criterion, DiversitySeed,
    Initiator, KmeansNani, Metric, TrimAmount,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    version,
    about = "Runs every comparison and k-means initiator on a dataset",
    long_about = None
)]
struct Cli {
    /// Root holding `examples/<dataset>` and `output/`
    #[arg(short, long, env = "NAMI")]
    base_dir: PathBuf,

    #[arg(short, long, default_value = "ala10")]
    dataset: String,

    /// Output subdirectory naming the tool that produced the centroids
    #[arg(long, default_value = "NAMI")]
    tool: String,

    #[arg(short, long, default_value = "MSD")]
    metric: Metric,

    #[arg(long, default_value_t = 109)]
    n_atoms: usize,

    /// Number of objects used by the similarity indices
    #[arg(short = 'N', long, default_value_t = 1000)]
    n_objects: usize,

    #[arg(short = 'k', long, default_value_t = 4)]
    n_clusters: usize,

    #[arg(short = 't', long, default_value = "0.8")]
    percent_trimmed: TrimAmount,

    /// Diversity selection share, in percent
    #[arg(short, long, default_value_t = 75)]
    percentage: usize,

    /// Initiator candidate share, in percent
    #[arg(long, default_value_t = 10)]
    kmn_percentage: usize,

    #[arg(long, default_value_t = 300)]
    max_iter: usize,

    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(short, long, value_delimiter = ',', default_value = "random,comp_sim,div_select")]
    initiators: Vec<Initiator>,
}

fn banner(title: &str) -> String {
    let line = "*".repeat(title.len());
    format!("{line}\n{title}\n{line}\n")
}

fn npy_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = fs::read_dir(folder)
        .context(format!("Reading {}", folder.to_string_lossy()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    files.retain(|p| p.extension().is_some_and(|e| e == "npy"));
    files.sort();
    Ok(files)
}

fn run_conformation(cli: &Cli, file: &Path, out_dir: &Path) -> Result<()> {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let matrix = load_npy(file)?;
    let (metric, n_atoms) = (cli.metric, cli.n_atoms);
    println!("\nConfirmation: {stem}\n---------------------\n");

    println!(
        "Extended Comparison\n{:.4}",
        extended_comparison(&matrix, metric, Some(cli.n_objects), n_atoms)?
    );
    println!("Complementary Similarity\nResults:\n");
    println!("{}", brief(&calculate_comp_sim(&matrix, metric, n_atoms)?));
    println!("Calculate Medoid\n{}", calculate_medoid(&matrix, metric, n_atoms)?);
    println!("Calculate Outlier\n{}", calculate_outlier(&matrix, metric, n_atoms)?);
    for criterion in [Criterion::CompSim, Criterion::SimToMedoid] {
        println!("Trim Outliers\nResults:\n");
        let trimmed = trim_outliers(&matrix, cli.percent_trimmed, metric, n_atoms, criterion)?;
        println!("{}", brief_matrix(&trimmed));
    }
    println!("Diversity Selection + NewIndex (MEDOID)\n");
    let seed = DiversitySeed::Medoid;
    let selected = diversity_selection(&matrix, cli.percentage, metric, &seed, n_atoms)?;
    println!("{}", brief(&selected));

    println!("------\nKMEANS\n------\n");
    for &initiator in &cli.initiators {
        println!("{}", banner(&format!("{initiator} Initiator")));
        let nani = KmeansNani::new(&matrix, cli.n_clusters, metric, n_atoms, initiator)?
            .with_percentage(cli.kmn_percentage)
            .with_max_iter(cli.max_iter)
            .with_seed(cli.seed);
        let result = nani.execute()?;
        println!("Number of iterations: {}", result.n_iter);
        println!("Labels:\n\n{}", brief(&result.labels));
        println!("Centroids:\n\n{}", brief_matrix(&result.centers));
        let path = out_dir.join(format!("{}_{stem}.csv", initiator.file_prefix()));
        nani.write_centroids(&result, &path)?;
        log::info!("centroids written to {}", path.to_string_lossy());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let folder = cli.base_dir.join("examples").join(&cli.dataset);
    let out_dir = cli.base_dir.join("output").join(&cli.dataset).join(&cli.tool);
    let files = npy_files(&folder)?;
    if files.is_empty() {
        log::warn!("no .npy files in {}", folder.to_string_lossy());
    }
    for file in &files {
        run_conformation(&cli, file, &out_dir)?;
    }
    Ok(())
}
