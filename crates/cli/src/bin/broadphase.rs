use std::path::PathBuf;

use anyhow::Error;
use clap::{Parser, Subcommand};
use serde_json as json;
use spheretree_cli::{
    report::{self, Report},
    scene::SceneConfig,
};

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// JSON scene configuration, command line options override its values.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, short = 'n')]
    points: Option<usize>,
    /// Maximum number of particles per leaf of the particle hierarchy.
    #[arg(long)]
    leaf_size: Option<u32>,
    /// Safety margin added to tetrahedron bounding spheres.
    #[arg(long)]
    tolerance: Option<f64>,
    /// Refit hierarchies with approximate hulls after construction.
    #[arg(long)]
    refit: bool,
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Self collision of a helical rod of particles.
    SelfCollide,
    /// Collisions between a particle cloud and a tetrahedralized box.
    Cross,
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(points) = cli.points {
        config.points = points;
    }
    if let Some(leaf_size) = cli.leaf_size {
        config.point_hierarchy.max_primitives_per_leaf = leaf_size;
    }
    if let Some(tolerance) = cli.tolerance {
        config.tolerance = tolerance;
    }
    config.refit |= cli.refit;
    config.validate()?;
    log::debug!("scene configuration: {config:?}");

    let report = match cli.command {
        Command::SelfCollide => report::self_collide(&config),
        Command::Cross => report::cross(&config)?,
    };

    if cli.json {
        println!("{}", json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &Report) {
    for (i, tree) in report.trees.iter().enumerate() {
        println!(
            "tree {i}: {} entities, {} nodes, {} leaves, depth {}",
            tree.entities, tree.nodes, tree.leaves, tree.depth
        );
    }
    println!("candidate leaf pairs: {}", report.leaf_pairs);
    println!(
        "candidate entity pairs: {} of {} ({:.2}%)",
        report.entity_pairs,
        report.brute_force_pairs,
        if report.brute_force_pairs == 0 {
            0.0
        } else {
            100.0 * report.entity_pairs as f64 / report.brute_force_pairs as f64
        }
    );
    println!("build time: {:?}", report.build_time);
    println!("traversal time: {:?}", report.traversal_time);
}
