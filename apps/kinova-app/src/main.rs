//! Kinova Gen3 Lite kinematics calculator CLI.
//!
//! - `forward`: joint angles (degrees) to tool pose, with round-trip error
//! - `inverse`: tool pose to joint angles, with round-trip error
//! - `serve`: framed JSON TCP server
//! - `info`: describe the loaded chain

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tracing::{error, info};

use kinova_core::{KinovaConfig, KinovaError};
use kinova_gateway::handler::{ANGLE_FIELDS, POSE_FIELDS};
use kinova_gateway::{
    KinematicsServer, ProtocolError, Response, compute_forward, compute_inverse, robot_info,
};
use kinova_ik::Kinematics;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Forward and inverse kinematics for the Kinova Gen3 Lite arm.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// TOML configuration file. Built-in Gen3 Lite defaults when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Joint angles (degrees) -> tool pose.
    Forward {
        #[arg(
            num_args = 6,
            value_names = ["A1", "A2", "A3", "A4", "A5", "A6"],
            allow_negative_numbers = true
        )]
        angles: Vec<f64>,
    },

    /// Tool pose (meters, degrees) -> joint angles.
    Inverse {
        #[arg(
            num_args = 6,
            value_names = ["X", "Y", "Z", "TX", "TY", "TZ"],
            allow_negative_numbers = true
        )]
        pose: Vec<f64>,
    },

    /// Serve framed JSON requests over TCP.
    Serve {
        /// Address to bind. Overrides the config file.
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Print the robot name, active joints and link count.
    Info,
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Kinova(#[from] KinovaError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

fn load_kinematics(config: &KinovaConfig) -> Result<Kinematics, KinovaError> {
    let kin = Kinematics::from_config(config)?;
    info!(
        robot = kin.chain().robot_name(),
        links = kin.chain().link_count(),
        "chain loaded"
    );
    Ok(kin)
}

fn fields(names: [&str; 6], values: &[f64]) -> Map<String, Value> {
    names
        .iter()
        .zip(values)
        .map(|(name, &v)| ((*name).to_owned(), Value::from(v)))
        .collect()
}

fn print_response(response: &Response) -> Result<bool, AppError> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(response.is_success())
}

fn run_serve(
    config: &KinovaConfig,
    kin: Kinematics,
    address: Option<String>,
) -> Result<(), AppError> {
    let address = address.unwrap_or_else(|| config.server.address.clone());
    let server =
        KinematicsServer::bind(address.as_str(), Arc::new(kin)).map_err(KinovaError::Io)?;
    let addr = server.local_addr().map_err(KinovaError::Io)?;
    println!("kinova kinematics server listening on {addr}");
    server.serve()?;
    Ok(())
}

fn run(cli: Cli) -> Result<bool, AppError> {
    let config = match &cli.config {
        Some(path) => KinovaConfig::from_file(path).map_err(KinovaError::from)?,
        None => KinovaConfig::default(),
    };
    let kin = load_kinematics(&config)?;

    match cli.command {
        Commands::Forward { angles } => {
            print_response(&compute_forward(&kin, &fields(ANGLE_FIELDS, &angles)))
        }
        Commands::Inverse { pose } => {
            print_response(&compute_inverse(&kin, &fields(POSE_FIELDS, &pose)))
        }
        Commands::Serve { address } => run_serve(&config, kin, address).map(|()| true),
        Commands::Info => print_response(&robot_info(&kin)),
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("kinova_app=info,kinova_gateway=info,kinova_ik=warn")
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!(%err, "fatal");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
