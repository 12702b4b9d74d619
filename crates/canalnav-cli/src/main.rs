use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use canalnav_cli::commands::build::{handle_build_command, BuildCommandArgs};
use canalnav_cli::commands::info::handle_info_command;
use canalnav_cli::commands::load_snapshot;
use canalnav_cli::commands::locate::handle_locate_command;
use canalnav_cli::commands::route::{handle_route_command, RouteCommandArgs};
use canalnav_cli::output::OutputFormat;
use canalnav_lib::builder::DEFAULT_DIST_TOLERANCE;
use canalnav_lib::CoordinateOrder;

#[derive(Parser, Debug)]
#[command(author, version, about = "Canal network route planner")]
struct Cli {
    /// Override the dataset directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Order of the two values in every stored position.
    #[arg(long, global = true, default_value = "lonlat")]
    order: CoordinateOrder,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a route between two locations.
    Route {
        /// Starting location name or junction id (prefixes accepted).
        #[arg(long = "from")]
        from: String,
        /// Destination location name or junction id (prefixes accepted).
        #[arg(long = "to")]
        to: String,
        /// Give up after this many milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Resolve a name or prefix to a junction id.
    Locate {
        query: String,
    },
    /// Summarise the loaded snapshot.
    Info,
    /// Build a snapshot from a GeoJSON feature collection into the data directory.
    Build {
        /// GeoJSON file with one feature per waterway.
        input: PathBuf,
        /// Distance, in coordinate units, within which waterways are joined.
        #[arg(long, default_value_t = DEFAULT_DIST_TOLERANCE)]
        dist_tolerance: f64,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let data_dir = cli.data_dir.as_deref();

    match cli.command {
        Command::Route {
            from,
            to,
            timeout_ms,
        } => {
            let args = RouteCommandArgs {
                from,
                to,
                order: cli.order,
                timeout_ms,
            };
            handle_route_command(load_snapshot(data_dir)?, &args, cli.format)
        }
        Command::Locate { query } => {
            handle_locate_command(&load_snapshot(data_dir)?, &query, cli.format)
        }
        Command::Info => handle_info_command(&load_snapshot(data_dir)?, cli.format),
        Command::Build {
            input,
            dist_tolerance,
        } => {
            let args = BuildCommandArgs {
                input,
                dist_tolerance,
            };
            handle_build_command(data_dir, &args, cli.format)
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
