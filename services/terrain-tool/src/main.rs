//! Terrain analysis command-line tool.
//!
//! Reads scattered XYZ samples, grids them onto a regular lattice and runs
//! one analysis engine on the result. Data goes to stdout (JSON summaries
//! or CSV records), logs go to stderr.

mod config;
mod output;
mod xyz;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::{Overrides, ToolConfig};
use terrain_analysis::{
    difference, extract_profile, flood_fill, ExtremumDetector, ExtremumMode, GradientMode,
    GradientOperator, GridGeometry, GridInterpretation, PointGridder, ScalarGrid, WeightFunction,
};
use terrain_common::{Point3, Polyline};

#[derive(Parser, Debug)]
#[command(name = "terrain-tool")]
#[command(about = "Grid XYZ samples and analyse the resulting terrain")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TERRAIN_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

/// Input samples and target lattice shared by every subcommand.
#[derive(Args, Debug, Clone)]
struct GridArgs {
    /// XYZ sample file
    input: PathBuf,

    /// Lower-left vertex as `x,y`
    #[arg(long, value_parser = parse_pair, allow_hyphen_values = true)]
    origin: (f64, f64),

    /// Vertex spacing as `dx,dy`
    #[arg(long, value_parser = parse_pair)]
    spacing: (f64, f64),

    /// Lattice size as `cols,rows`
    #[arg(long, value_parser = parse_size)]
    size: (usize, usize),

    /// Search radius for gridding
    #[arg(long)]
    radius: Option<f64>,

    /// Weighting kernel (nearest_neighbor, inverse_distance, triangle, franke_little)
    #[arg(long)]
    weight_function: Option<WeightFunction>,

    /// Exponent of the inverse-distance kernel
    #[arg(long)]
    idw_exponent: Option<f64>,

    /// How grid values are interpreted (cell or lattice)
    #[arg(long, default_value = "cell")]
    interpretation: GridInterpretation,

    /// Reference system code attached to the grid, e.g. EPSG:25832
    #[arg(long)]
    srs: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grid the samples and print a summary
    Grid {
        #[command(flatten)]
        grid: GridArgs,

        /// Also print the set cells as X,Y,Z records
        #[arg(long)]
        points: bool,
    },

    /// Derive slope, aspect or curvature
    Gradient {
        #[command(flatten)]
        grid: GridArgs,

        /// Quantity to derive, e.g. slope_degrees or plan_curvature
        #[arg(long)]
        mode: GradientMode,

        /// Fall back to simpler differences where neighbours are missing
        #[arg(long)]
        fallback: bool,
    },

    /// Flood the terrain from a seed point
    Flood {
        #[command(flatten)]
        grid: GridArgs,

        /// Seed as `x,y,level`
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        seed: Point3,
    },

    /// Detect local or global extrema
    Extrema {
        #[command(flatten)]
        grid: GridArgs,

        /// local_min, local_max or global
        #[arg(long)]
        mode: ExtremumMode,
    },

    /// Extract an elevation profile along a polyline
    Profile {
        #[command(flatten)]
        grid: GridArgs,

        /// Vertices as `x,y;x,y;...`
        #[arg(long, value_parser = parse_polyline, allow_hyphen_values = true)]
        line: Polyline,
    },

    /// Subtract the input grid from a second grid on the same lattice
    Difference {
        #[command(flatten)]
        grid: GridArgs,

        /// XYZ samples of the minuend
        #[arg(long)]
        other: PathBuf,
    },
}

impl Command {
    fn grid_args(&self) -> &GridArgs {
        match self {
            Self::Grid { grid, .. }
            | Self::Gradient { grid, .. }
            | Self::Flood { grid, .. }
            | Self::Extrema { grid, .. }
            | Self::Profile { grid, .. }
            | Self::Difference { grid, .. } => grid,
        }
    }

    fn overrides(&self) -> Overrides {
        let args = self.grid_args();
        Overrides {
            search_radius: args.radius,
            weight_function: args.weight_function,
            inverse_distance_exponent: args.idw_exponent,
            gradient_fallback: matches!(self, Self::Gradient { fallback: true, .. }),
            reference_system: args.srs.clone(),
        }
    }
}

fn parse_numbers(s: &str, expected: usize, what: &str) -> Result<Vec<f64>, String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid {} '{}': {}", what, s, e))?;
    if values.len() != expected {
        return Err(format!(
            "invalid {} '{}': expected {} comma-separated values",
            what, s, expected
        ));
    }
    Ok(values)
}

fn parse_pair(s: &str) -> Result<(f64, f64), String> {
    let v = parse_numbers(s, 2, "pair")?;
    Ok((v[0], v[1]))
}

fn parse_point(s: &str) -> Result<Point3, String> {
    let v = parse_numbers(s, 3, "point")?;
    Ok(Point3::new(v[0], v[1], v[2]))
}

fn parse_size(s: &str) -> Result<(usize, usize), String> {
    let (cols, rows) = s
        .split_once(',')
        .ok_or_else(|| format!("invalid size '{}': expected cols,rows", s))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid size '{}': {}", s, e))
    };
    Ok((parse(cols)?, parse(rows)?))
}

fn parse_polyline(s: &str) -> Result<Polyline, String> {
    let vertices = s
        .split(';')
        .filter(|v| !v.trim().is_empty())
        .map(parse_pair)
        .collect::<Result<Vec<_>, _>>()?;
    if vertices.is_empty() {
        return Err("polyline needs at least one vertex".to_string());
    }
    Ok(Polyline::from_xy(&vertices))
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Grid the samples in `input` onto the lattice described by `args`.
fn build_grid(args: &GridArgs, config: &ToolConfig, input: &Path) -> Result<ScalarGrid> {
    let samples = xyz::read_xyz(input)?;

    let (cols, rows) = args.size;
    let mut geometry = GridGeometry::new(
        cols,
        rows,
        args.origin.0,
        args.origin.1,
        args.spacing.0,
        args.spacing.1,
    )
    .context("Invalid target lattice")?;
    if let Some(srs) = &config.reference_system {
        geometry = geometry.with_reference_system(srs.clone());
    }

    let gridder = PointGridder::new(geometry, &config.gridding)?;
    info!(
        samples = samples.len(),
        cols,
        rows,
        weight_function = %gridder.weight_function(),
        search_radius = gridder.search_radius(),
        memory_bytes = gridder.estimate_memory_consumption(),
        circle_vertices = gridder.points_in_search_circle(),
        "Gridding samples"
    );

    Ok(gridder.grid(&samples)?.with_interpretation(args.interpretation))
}

fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let config = ToolConfig::load(cli.config.as_deref(), &cli.command.overrides())?;
    let args = cli.command.grid_args();
    let grid = build_grid(args, &config, &args.input)?;

    match &cli.command {
        Command::Grid { points, .. } => {
            output::write_summary(out, &grid.summary())?;
            if *points {
                output::write_points(out, &grid.to_point_set(None))?;
            }
        }
        Command::Gradient { mode, .. } => {
            let derived = GradientOperator::with_config(*mode, &config.gradient).transform(&grid)?;
            output::write_summary(out, &derived.summary())?;
        }
        Command::Flood { seed, .. } => {
            let flooded = flood_fill(&grid, seed)?;
            output::write_summary(out, &flooded.summary())?;
        }
        Command::Extrema { mode, .. } => {
            let features = ExtremumDetector::new(*mode).detect(&grid).unwrap_or_default();
            info!(mode = %mode, features = features.len(), "Detected extrema");
            output::write_features(out, &features)?;
        }
        Command::Profile { line, .. } => match extract_profile(&grid, line) {
            Some(profile) => output::write_profile(out, &profile)?,
            None => bail!("Profile line has no vertices"),
        },
        Command::Difference { other, .. } => {
            let minuend = build_grid(args, &config, other)?;
            let diff = difference(&grid, &minuend)?;
            output::write_summary(out, &diff.summary())?;
        }
    }

    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}
