use anyhow::{Context, Result};
use clap::Parser;
use csv::Writer;
use nalgebra::DMatrix;
use nami_rust::{load_npy, mean_square_deviation, Initiator, IteratorAvg, KmeansNani, Metric};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(version, about = "Scores k-means over a range of cluster counts", long_about = None)]
struct Cli {
    /// Frame matrices (.npy)
    #[arg(required = true)]
    npy_files: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "screen")]
    output: PathBuf,

    #[arg(short, long, default_value = "comp_sim")]
    initiator: Initiator,

    #[arg(short, long, default_value = "MSD")]
    metric: Metric,

    #[arg(long, default_value_t = 109)]
    n_atoms: usize,

    #[arg(long, default_value_t = 2)]
    start_n_clusters: usize,

    #[arg(long, default_value_t = 30)]
    end_n_clusters: usize,

    #[arg(long, default_value_t = 20)]
    max_iter: usize,

    /// Initiator candidate share, in percent
    #[arg(short, long, default_value_t = 10)]
    percentage: usize,

    #[arg(short, long)]
    seed: Option<u64>,
}

struct ScreenRow {
    n_clusters: usize,
    n_iter: usize,
    ch: f64,
    db: f64,
    avg_msd: f64,
}

fn screen(cli: &Cli, matrix: &DMatrix<f64>, n_clusters: usize) -> Result<ScreenRow> {
    let nani = KmeansNani::new(matrix, n_clusters, cli.metric, cli.n_atoms, cli.initiator)?
        .with_percentage(cli.percentage)
        .with_max_iter(cli.max_iter)
        .with_seed(cli.seed);
    let result = nani.execute()?;
    let scores = nani.compute_scores(&result.labels)?;
    let avg_msd = nani
        .create_cluster_list(&result.labels)
        .iter()
        .filter(|members| !members.is_empty())
        .map(|members| mean_square_deviation(&matrix.select_rows(members.iter()), cli.n_atoms))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .avg()
        .unwrap_or(0.0);
    Ok(ScreenRow {
        n_clusters,
        n_iter: result.n_iter,
        ch: scores.ch,
        db: scores.db,
        avg_msd,
    })
}

fn write_rows(path: &Path, rows: &[ScreenRow]) -> Result<()> {
    let mut writer =
        Writer::from_path(path).context(format!("Creating {}", path.to_string_lossy()))?;
    writer.write_record(["n_clusters", "n_iter", "ch", "db", "avg_msd"])?;
    for row in rows {
        writer.write_record([
            row.n_clusters.to_string(),
            row.n_iter.to_string(),
            row.ch.to_string(),
            row.db.to_string(),
            row.avg_msd.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    fs::create_dir_all(&cli.output).context(format!("Creating {}", cli.output.to_string_lossy()))?;
    for file in &cli.npy_files {
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        println!("Confirmation: {stem}\n---------------------");
        let start = Instant::now();
        let matrix = load_npy(file)?;
        let rows = (cli.start_n_clusters..=cli.end_n_clusters)
            .into_par_iter()
            .map(|k| screen(&cli, &matrix, k).context(format!("{stem} with {k} clusters")))
            .collect::<Result<Vec<_>>>()?;
        let path = cli.output.join(format!("{stem}_screen.csv"));
        write_rows(&path, &rows)?;
        log::info!("{} cluster counts screened, written to {}", rows.len(), path.to_string_lossy());
        println!("Time taken: {:.2?}", start.elapsed());
    }
    Ok(())
}
