use std::path::PathBuf;

use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;

use poisson2d::{input, load, post_processor, source, stiffness, Mesh, PoissonError};

/// Assembles the banded stiffness matrix and load vector of a 2D Poisson problem
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Problem description json
    input_json: PathBuf,

    /// Directory receiving nodes.csv, banded.csv and load.csv
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Log debug messages
    #[arg(short, long)]
    verbose: bool,
}

fn element_bar(progress: &MultiProgress, n_elements: usize, label: &'static str) -> ProgressBar {
    let bar = progress.add(ProgressBar::new(n_elements as u64));
    if let Ok(style) = ProgressStyle::with_template("{msg:>10} [{bar:40}] {pos}/{len}") {
        bar.set_style(style);
    }
    bar.set_message(label);
    bar
}

fn run(args: &Args) -> Result<(), PoissonError> {
    let input_file = args.input_json.to_string_lossy();
    let problem = input::load_input_file(&input_file)?;

    let mesh = Mesh::build(
        problem.mesh.subdivisions_x,
        problem.mesh.subdivisions_y,
        problem.mesh.length_x,
        problem.mesh.length_y,
    )?;
    info!(
        "built mesh with {} nodes and {} elements (bandwidth {})",
        mesh.n_nodes(),
        mesh.n_elements(),
        mesh.bandwidth()
    );

    let progress = MultiProgress::new();
    let stiffness_bar = element_bar(&progress, mesh.n_elements(), "stiffness");
    let load_bar = element_bar(&progress, mesh.n_elements(), "load");

    let start = std::time::Instant::now();
    let (banded, load_vector) = rayon::join(
        || stiffness::assemble_with_progress(&mesh, problem.dirichlet, &stiffness_bar),
        || load::assemble_with_progress(&mesh, &problem.source, &load_bar),
    );
    let (banded, load_vector) = (banded?, load_vector?);

    let elapsed = (std::time::Instant::now() - start).as_secs_f32();
    info!("assembled system in {:.3} seconds", elapsed);

    let source_values = source::evaluate(&problem.source, mesh.nodes())?;
    post_processor::csv_output(
        &args.output_dir,
        &mesh,
        &source_values,
        &banded,
        &load_vector,
    )?;

    info!(
        "solve with a banded solver using kl = ku = {}",
        banded.kl()
    );

    Ok(())
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    if let Err(err) = run(&args) {
        error!("{err}");
        std::process::exit(1)
    }
}
