//! mapctl - command-line client for a weight map path planning server

mod exit_codes;
mod fuzz;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use weightmap_config::ClientOptions;
use weightmap_core::{BorderPlacement, Orientation, Point};
use weightmap_network::{AckMode, MapService, SessionConfig, WeightMapClient};

#[derive(Parser)]
#[command(name = "mapctl")]
#[command(about = "Query and edit a weight map server from the shell")]
#[command(version)]
#[command(after_help = "\
The reference map server waits for an ACK after the last frame of every
response. Pass --ack-every, or set `ackmode = every` in the options file,
when talking to it; otherwise every second call stalls.")]
struct Cli {
    /// Options file (defaults to ./mapclient.txt when present)
    #[arg(long, short = 'c', global = true, env = "MAPCTL_CONFIG")]
    config: Option<PathBuf>,

    /// Server host, overrides the options file
    #[arg(long, global = true)]
    host: Option<String>,

    /// Server port, overrides the options file
    #[arg(long, short = 'p', global = true)]
    port: Option<u16>,

    /// Acknowledge the terminal frame of every response (same as `ackmode = every`)
    #[arg(long, global = true)]
    ack_every: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print map dimensions, weight bounds, position and orientation
    Info,

    /// Add a border along one or more edges
    #[command(after_help = "\
Examples:
  mapctl border 2 50 top bottom
  mapctl border 1 255 12")]
    Border {
        width: i32,
        weight: i32,
        /// Edge names (top, bottom, left, right) or raw bit values
        #[arg(required = true)]
        placement: Vec<String>,
    },

    /// Add a circular obstacle
    #[command(allow_negative_numbers = true)]
    Obstacle {
        x: i32,
        y: i32,
        radius: i32,
        weight: i32,
        /// Uniform weight instead of a linear falloff
        #[arg(long)]
        flat: bool,
    },

    /// Least-cost path between two points, as turn points
    #[command(allow_negative_numbers = true)]
    Path {
        src_x: i32,
        src_y: i32,
        dst_x: i32,
        dst_y: i32,
    },

    /// Least-cost path with every unit step filled in
    #[command(allow_negative_numbers = true)]
    DensePath {
        src_x: i32,
        src_y: i32,
        dst_x: i32,
        dst_y: i32,
    },

    /// Path from the stored position to a point
    #[command(allow_negative_numbers = true)]
    PathTo { x: i32, y: i32 },

    /// Path from a point to the column `target_x`
    #[command(allow_negative_numbers = true)]
    PathToLine { x: i32, y: i32, target_x: i32 },

    #[command(allow_negative_numbers = true)]
    SetWeight { x: i32, y: i32, weight: i32 },

    #[command(allow_negative_numbers = true)]
    GetWeight { x: i32, y: i32 },

    /// Reset every cell to the minimum weight
    Reset,

    /// Dump the full weight grid as JSON
    Weights {
        #[arg(long)]
        pretty: bool,
    },

    /// Print the server's text rendering of the map
    String,

    /// Store a position on the server
    #[command(allow_negative_numbers = true)]
    SetPos { x: i32, y: i32 },

    /// Print the stored position
    Pos,

    /// Print the stored roll, pitch and yaw
    Rpy,

    /// Store roll, pitch and yaw
    #[command(allow_negative_numbers = true)]
    SetRpy { roll: f64, pitch: f64, yaw: f64 },

    /// Shut the server process down
    CloseServer,

    /// Hammer the server with random valid calls
    Fuzz {
        /// Concurrent workers
        #[arg(long, short = 'w', default_value_t = 8)]
        workers: usize,

        /// Calls per worker
        #[arg(long, short = 'n', default_value_t = 1000)]
        calls: usize,

        /// Share one session between all workers
        #[arg(long)]
        shared: bool,

        /// RNG seed; random when omitted
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Serialize)]
struct MapInfo {
    width: u32,
    height: u32,
    min_weight: u32,
    max_weight: u32,
    max_weight_in_map: u32,
    position: Point,
    orientation: Orientation,
}

fn load_options(cli: &Cli) -> Result<ClientOptions> {
    let mut options = match &cli.config {
        Some(path) => ClientOptions::load_from_file(path)?,
        None => ClientOptions::load_default()?,
    };

    if let Some(host) = &cli.host {
        options.host = host.clone();
    }
    if let Some(port) = cli.port {
        options.port = port;
    }
    if cli.ack_every {
        options.ack_mode = AckMode::EveryFrame;
    }
    Ok(options)
}

fn session_config(options: &ClientOptions) -> SessionConfig {
    SessionConfig {
        address: options.address(),
        connect_timeout: options.connect_timeout,
        read_timeout: options.read_timeout,
        write_timeout: options.write_timeout,
        ack_mode: options.ack_mode,
        nodelay: options.nodelay,
        keepalive: options.keepalive,
    }
}

fn parse_placement(names: &[String]) -> Result<BorderPlacement> {
    let mut placement = BorderPlacement::new(0);
    for name in names {
        placement |= match BorderPlacement::from_name(name) {
            Some(p) => p,
            None => match name.parse::<i32>() {
                Ok(bits) => BorderPlacement::new(bits),
                Err(_) => bail!("unknown border placement '{}'", name),
            },
        };
    }
    Ok(placement)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

async fn run(command: Commands, config: SessionConfig) -> Result<()> {
    if let Commands::Fuzz {
        workers,
        calls,
        shared,
        seed,
    } = command
    {
        let seed = seed.unwrap_or_else(rand::random);
        let reports = fuzz::run(config, workers.max(1), calls, shared, seed).await?;
        return print_json(&reports, true);
    }

    let address = config.address.clone();
    let client = WeightMapClient::connect(config)
        .await
        .with_context(|| format!("connecting to {}", address))?;

    match command {
        Commands::Info => {
            let info = MapInfo {
                width: client.get_width().await?,
                height: client.get_height().await?,
                min_weight: client.get_min_weight().await?,
                max_weight: client.get_max_weight().await?,
                max_weight_in_map: client.get_max_weight_in_map().await?,
                position: client.get_position().await?,
                orientation: client.get_orientation().await?,
            };
            print_json(&info, true)?;
        }
        Commands::Border {
            width,
            weight,
            placement,
        } => {
            let placement = parse_placement(&placement)?;
            client.add_border(width, weight, placement).await?;
        }
        Commands::Obstacle {
            x,
            y,
            radius,
            weight,
            flat,
        } => client.add_obstacle(x, y, radius, weight, !flat).await?,
        Commands::Path {
            src_x,
            src_y,
            dst_x,
            dst_y,
        } => print_json(&client.get_path(src_x, src_y, dst_x, dst_y).await?, false)?,
        Commands::DensePath {
            src_x,
            src_y,
            dst_x,
            dst_y,
        } => print_json(
            &client.get_dense_path(src_x, src_y, dst_x, dst_y).await?,
            false,
        )?,
        Commands::PathTo { x, y } => print_json(&client.path_to(x, y).await?, false)?,
        Commands::PathToLine { x, y, target_x } => {
            print_json(&client.path_to_line(x, y, target_x).await?, false)?
        }
        Commands::SetWeight { x, y, weight } => client.set_weight(x, y, weight).await?,
        Commands::GetWeight { x, y } => println!("{}", client.get_weight(x, y).await?),
        Commands::Reset => client.reset_map().await?,
        Commands::Weights { pretty } => print_json(&client.get_weights().await?, pretty)?,
        Commands::String => print!("{}", client.to_string().await?),
        Commands::SetPos { x, y } => client.set_position(x, y).await?,
        Commands::Pos => print_json(&client.get_position().await?, false)?,
        Commands::Rpy => print_json(&client.get_orientation().await?, false)?,
        Commands::SetRpy { roll, pitch, yaw } => {
            client
                .set_orientation(Orientation::new(roll, pitch, yaw))
                .await?
        }
        Commands::CloseServer => {
            client.close_remote_server().await?;
            info!("Server at {} shut down", address);
            return Ok(());
        }
        Commands::Fuzz { .. } => bail!("fuzz opens its own sessions"),
    }

    client.close().await.context("closing session")?;
    debug!("Session stats: {:?}", client.session().stats());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let options = match load_options(&cli) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("mapctl: {:#}", e);
            return ExitCode::from(exit_codes::for_error(&e));
        }
    };

    // Initialize tracing; RUST_LOG wins over the options file
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    options.display();
    if options.ack_mode == AckMode::ContinueOnly {
        debug!("Terminal frames are not acknowledged; use --ack-every for the reference server");
    }
    let config = session_config(&options);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::from(exit_codes::EXIT_SUCCESS),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(exit_codes::for_error(&e))
        }
    }
}
