use anyhow::Result;
use clap::Parser;
use nami_rust::{gen_traj_numpy, save_npy};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Converts a trajectory into a frame matrix", long_about = None)]
struct Cli {
    /// Input topology file (PDB)
    #[arg(short = 'p', long = "topology")]
    topology: PathBuf,

    /// Input trajectory file (PDB, XYZ or LAMMPS dump)
    #[arg(short = 'y', long = "trajectory")]
    trajectory: PathBuf,

    /// Output file path without extension
    #[arg(short, long, default_value = "output")]
    output: String,

    /// Atom selection (e.g. resid 3 to 12 and name N CA C O H)
    #[arg(short, long, num_args = 0.., allow_hyphen_values = true)]
    selection: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let selection = cli
        .selection
        .join(" ")
        .trim_matches(|c| c == '\'' || c == '"')
        .to_string();
    let matrix = gen_traj_numpy(&cli.topology, &cli.trajectory, &selection)?;
    let output = PathBuf::from(format!("{}.npy", cli.output));
    save_npy(&output, &matrix)?;
    log::info!(
        "{}x{} frame matrix written to {}",
        matrix.nrows(),
        matrix.ncols(),
        output.to_string_lossy()
    );
    Ok(())
}
