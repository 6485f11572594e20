// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tetmir CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use nalgebra::{Point3, Vector3};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tetmir::analytics;
use tetmir::geometry::tables::{tet_count, tri_count};
use tetmir::io::{self, MirOutput};
use tetmir::synthetic::{self, RandomFractions};
use tetmir::{CellType, MirOptions, ReconstructedMesh, Reconstructor, SubdivisionLevel};

#[derive(Parser)]
#[command(name = "tetmir")]
#[command(about = "Material interface reconstruction for unstructured meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML options file (defaults to ./tetmir.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Subdivision level (low, med, high)
    #[arg(short, long, global = true)]
    level: Option<SubdivisionLevel>,

    /// Subdivide zones classified clean instead of emitting them whole
    #[arg(long, global = true)]
    subdivide_clean: bool,

    /// Let neighbouring interfaces carry into pure zones
    #[arg(long, global = true)]
    smoothing: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct a JSON mesh + volume fraction document
    Reconstruct {
        /// Input JSON document
        input: PathBuf,

        /// Output JSON document
        #[arg(short, long)]
        output: PathBuf,

        /// Directory for one STL surface per material
        #[arg(long, value_name = "DIR")]
        stl_dir: Option<PathBuf>,
    },

    /// Reconstruct a synthetic mesh and print a summary
    Demo {
        /// Material layout
        #[arg(long, value_enum, default_value_t = DemoShape::Sphere)]
        shape: DemoShape,

        /// Zones per axis
        #[arg(short = 'n', long, default_value = "8")]
        size: usize,

        /// Build a 2D quad mesh instead of hexahedra
        #[arg(long)]
        flat: bool,

        /// Seed for the random layout
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Save the generated input document
        #[arg(long, value_name = "FILE")]
        save_input: Option<PathBuf>,
    },

    /// Print the number of pieces each cell type splits into
    Tables,

    /// Show version information
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum DemoShape {
    Plane,
    Sphere,
    Random,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let options = resolve_options(&cli)?;

    match &cli.command {
        Commands::Reconstruct {
            input,
            output,
            stl_dir,
        } => reconstruct_command(&options, input, output, stl_dir.as_ref())?,
        Commands::Demo {
            shape,
            size,
            flat,
            seed,
            save_input,
        } => demo_command(&options, *shape, *size, *flat, *seed, save_input.as_ref())?,
        Commands::Tables => tables_command()?,
        Commands::Version => {
            println!("Tetmir v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn resolve_options(cli: &Cli) -> Result<MirOptions> {
    let mut options = match &cli.config {
        Some(path) => MirOptions::from_file(path)?,
        None => MirOptions::load()?,
    };
    if let Some(level) = cli.level {
        options.subdivision_level = level;
    }
    if cli.subdivide_clean {
        options.leave_clean_zones_whole = false;
    }
    if cli.smoothing {
        options.smoothing = true;
    }
    Ok(options)
}

fn reconstruct_command(
    options: &MirOptions,
    input: &Path,
    output: &Path,
    stl_dir: Option<&PathBuf>,
) -> Result<()> {
    let document = io::load_input(input)?;

    let start = Instant::now();
    let mesh = Reconstructor::new(options.clone())
        .reconstruct(&document.mesh, &document.materials)
        .with_context(|| format!("Failed to reconstruct {:?}", input))?;
    let elapsed = start.elapsed();

    if let Some(dir) = stl_dir {
        let paths = io::export_material_stls(&mesh, dir)?;
        println!(
            "{} {} STL surfaces in {}",
            "Wrote".green(),
            paths.len(),
            dir.display()
        );
    }

    let result = MirOutput::from_reconstruction(&document, mesh)?;
    io::save_output(&result, output)?;

    print_summary(&result.mesh, elapsed.as_secs_f64() * 1000.0);
    println!(
        "{} {} -> {}",
        "Reconstructed".green().bold(),
        input.display(),
        output.display()
    );
    Ok(())
}

fn demo_command(
    options: &MirOptions,
    shape: DemoShape,
    size: usize,
    flat: bool,
    seed: u64,
    save_input: Option<&PathBuf>,
) -> Result<()> {
    let size = size.max(1);
    let extent = size as f64;
    let mesh = if flat {
        synthetic::quad_grid(size, size, 1.0)
    } else {
        synthetic::hex_grid(size, size, size, 1.0)
    };
    let z = if flat { 0.0 } else { extent / 2.0 };
    let center = Point3::new(extent / 2.0, extent / 2.0, z);
    let materials = match shape {
        DemoShape::Plane => {
            synthetic::plane_fractions(&mesh, center, Vector3::new(1.0, 0.5, 0.25), 4)
        }
        DemoShape::Sphere => synthetic::sphere_fractions(&mesh, center, extent / 3.0, 4),
        DemoShape::Random => RandomFractions::new(seed, 3).generate(mesh.cell_count(), 0.3),
    };

    if let Some(path) = save_input {
        io::save_input(&io::MirInput::new(mesh.clone(), materials.clone()), path)?;
    }

    let start = Instant::now();
    let out = Reconstructor::new(options.clone()).reconstruct(&mesh, &materials)?;
    print_summary(&out, start.elapsed().as_secs_f64() * 1000.0);
    analytics::analyze(&out).print();
    Ok(())
}

fn tables_command() -> Result<()> {
    println!(
        "{:<12} {:>6} {:>6} {:>6}",
        "cell".bold(),
        "low".bold(),
        "med".bold(),
        "high".bold()
    );
    let solids = [
        CellType::Tetra,
        CellType::Hexahedron,
        CellType::Voxel,
        CellType::Wedge,
        CellType::Pyramid,
    ];
    for cell_type in solids {
        let counts = SubdivisionLevel::ALL
            .iter()
            .map(|&level| tet_count(level, cell_type))
            .collect::<Result<Vec<_>, _>>()?;
        print_counts(&cell_type.to_string(), &counts, "tets");
    }
    for (cell_type, nodes) in [
        (CellType::Triangle, 3),
        (CellType::Quad, 4),
        (CellType::Pixel, 4),
        (CellType::Polygon, 6),
    ] {
        let counts = SubdivisionLevel::ALL
            .iter()
            .map(|&level| tri_count(level, cell_type, nodes))
            .collect::<Result<Vec<_>, _>>()?;
        let name = if cell_type == CellType::Polygon {
            format!("{}({})", cell_type, nodes)
        } else {
            cell_type.to_string()
        };
        print_counts(&name, &counts, "tris");
    }
    Ok(())
}

fn print_counts(name: &str, counts: &[usize], unit: &str) {
    println!(
        "{:<12} {:>6} {:>6} {:>6}  {}",
        name.cyan(),
        counts[0],
        counts[1],
        counts[2],
        unit.bright_black()
    );
}

fn print_summary(out: &ReconstructedMesh, elapsed_ms: f64) {
    let stats = &out.stats;
    println!("\n{}", "━".repeat(60).bright_black());
    println!("{} {:?}", "Mode:".bold(), stats.mode);
    println!(
        "  {} {:>8} -> {:<8} {} {}",
        "Zones:".bright_black(),
        stats.input_zones,
        stats.output_zones,
        "Coordinates:".bright_black(),
        stats.coordinates
    );
    println!(
        "  {} {:>8}   {} {:>8}   {} {:>8}",
        "Clean:".bright_black(),
        stats.clean_zones,
        "Mixed:".bright_black(),
        stats.fully_mixed_zones,
        "Split:".bright_black(),
        stats.subdivided_zones
    );
    if stats.degenerate_dropped > 0 || stats.wedges_resplit > 0 {
        println!(
            "  {} {} dropped, {} wedges re-split",
            "Degenerate:".yellow(),
            stats.degenerate_dropped,
            stats.wedges_resplit
        );
    }
    println!(
        "  {} {} ms",
        "Time:".bright_black(),
        format!("{:.2}", elapsed_ms).cyan()
    );
    println!("{}", "━".repeat(60).bright_black());
}
