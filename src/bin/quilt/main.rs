//! Quilt CLI - surface mesh inspection and conversion tool.
//!
//! Usage: quilt [-v...] <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `quilt --help` for available commands.
//!
//! # Logging
//!
//! `-v` enables info output, `-vv` debug, `-vvv` trace. `RUST_LOG`, when
//! set, takes precedence over the flags.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use quilt::algo::normals::{recompute_normals, NormalOptions};
use quilt::geometry::Transform;
use quilt::io;
use quilt::mesh::Mesh;
use quilt::nalgebra::Vector3;

#[derive(Parser)]
#[command(name = "quilt")]
#[command(author, version, about = "Surface mesh CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress all log output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Recompute face and node normals
    Normals {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Rewrite a mesh, optionally transforming it
    Convert {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Translation applied after scaling, as x,y,z
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        translate: Option<Vec<f64>>,

        /// Per-axis scale, as x,y,z
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        scale: Option<Vec<f64>>,

        /// Recompute normals before writing
        #[arg(long)]
        recompute_normals: bool,
    },

    /// List seam and boundary edges
    Seams {
        /// Input mesh file
        input: PathBuf,
    },
}

fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over the -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "quilt=info",
            2 => "quilt=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Info { input } => cmd_info(&input)?,
        Commands::Normals {
            input,
            output,
            sequential,
        } => cmd_normals(&input, &output, sequential)?,
        Commands::Convert {
            input,
            output,
            translate,
            scale,
            recompute_normals: recompute,
        } => cmd_convert(&input, &output, translate, scale, recompute)?,
        Commands::Seams { input } => cmd_seams(&input)?,
    }

    Ok(())
}

fn vector_arg(name: &str, values: Option<Vec<f64>>, default: Vector3<f64>) -> Result<Vector3<f64>, String> {
    match values.as_deref() {
        None => Ok(default),
        Some([x, y, z]) => Ok(Vector3::new(*x, *y, *z)),
        Some(other) => Err(format!("--{} expects 3 values, got {}", name, other.len())),
    }
}

fn cmd_info(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: Mesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Nodes: {}", mesh.num_nodes());
    println!("Surface points: {}", mesh.num_surface_points());
    println!("Edges: {}", mesh.num_edges());
    println!("Faces: {}", mesh.num_faces());

    let mut min_area = f64::MAX;
    let mut max_area = 0.0_f64;
    for fid in mesh.face_ids() {
        let area = mesh.face_area(fid);
        min_area = min_area.min(area);
        max_area = max_area.max(area);
    }
    if mesh.num_faces() > 0 {
        println!("Surface area: {:.6}", mesh.surface_area());
        println!("Face area range: [{:.6}, {:.6}]", min_area, max_area);
    }

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }

    let boundary = mesh.boundary_edges().count();
    let seams = mesh.seam_edges().count();
    if boundary == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!("Topology: Open ({} boundary edges)", boundary);
    }
    println!("UV seams: {} edges", seams);
    println!("Adjacency: {}", if mesh.is_valid() { "consistent" } else { "INCONSISTENT" });

    Ok(())
}

fn cmd_normals(input: &PathBuf, output: &PathBuf, sequential: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh: Mesh = io::load(input)?;
    println!("Loaded: {} nodes, {} faces", mesh.num_nodes(), mesh.num_faces());

    let options = NormalOptions::default().with_parallel(!sequential);
    let mode = if sequential { "sequential" } else { "parallel" };

    println!("Recomputing normals ({})...", mode);
    let start = Instant::now();
    recompute_normals(&mut mesh, &options);
    let elapsed = start.elapsed();

    io::save(&mut mesh, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

fn cmd_convert(
    input: &PathBuf,
    output: &PathBuf,
    translate: Option<Vec<f64>>,
    scale: Option<Vec<f64>>,
    recompute: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let transform = Transform::new(
        vector_arg("translate", translate, Vector3::zeros())?,
        vector_arg("scale", scale, Vector3::new(1.0, 1.0, 1.0))?,
    );

    let mut mesh: Mesh = io::load(input)?;
    println!("Loaded: {} nodes, {} faces", mesh.num_nodes(), mesh.num_faces());

    if !transform.is_identity() {
        mesh.set_transform(transform);
        mesh.apply_transformation();
        println!(
            "Applied transform: translate ({}, {}, {}), scale ({}, {}, {})",
            transform.position.x,
            transform.position.y,
            transform.position.z,
            transform.scale.x,
            transform.scale.y,
            transform.scale.z
        );
    }
    if recompute {
        recompute_normals(&mut mesh, &NormalOptions::default());
    }

    io::save(&mut mesh, output)?;
    println!("Saved: {}", output.display());

    Ok(())
}

fn cmd_seams(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: Mesh = io::load(input)?;

    for (label, edges) in [
        ("seam", mesh.seam_edges().collect::<Vec<_>>()),
        ("boundary", mesh.boundary_edges().collect::<Vec<_>>()),
    ] {
        println!("{} edges: {}", label, edges.len());
        for e in edges {
            let [n0, n1] = mesh.edge(e).nodes();
            // 1-based, matching the node numbering in the file
            println!("  {} {}", n0.index() + 1, n1.index() + 1);
        }
    }

    Ok(())
}
