mod config;
mod engine;
mod monitor;
mod transport;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use split_core::admission::AdmissionPolicy;
use split_core::split_table::SplitTable;

use crate::config::RouterConfig;
use crate::engine::{EngineState, RoutingEngine};
use crate::monitor::TracingMonitor;
use crate::transport::{MidiTransport, MidirTransport};

/// Exit codes surfaced to the invoking process.
const EXIT_NO_INPUTS: u8 = 1;
const EXIT_OUTPUT_NOT_FOUND: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "split-router", about = "MIDI split router daemon")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/router.toml")]
    config: PathBuf,

    /// List available MIDI ports and exit
    #[arg(long)]
    list_ports: bool,
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}

fn print_ports(transport: &dyn MidiTransport) -> anyhow::Result<()> {
    println!("Input ports:");
    for (index, name) in transport.input_ports()?.iter().enumerate() {
        println!("  {}: {}", index, name);
    }
    println!("Output ports:");
    for (index, name) in transport.output_ports()?.iter().enumerate() {
        println!("  {}: {}", index, name);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let transport = MidirTransport::new("split-router");

    if args.list_ports {
        print_ports(&transport)?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = RouterConfig::load(&args.config).await?;
    init_tracing(config.log.debug);

    info!(
        output = %config.output.virtual_name,
        exclusions = config.input.exclusions.len(),
        "split router starting"
    );

    let table = SplitTable::compile_value(&config.split_value(), &TracingMonitor);
    info!(mapped_notes = table.mapped_notes(), "split table compiled");

    let policy = AdmissionPolicy::new(&config.output.virtual_name, &config.input.exclusions);
    let mut engine = RoutingEngine::new(table, policy, &config.output.virtual_name);

    engine.start(&transport)?;

    match engine.state() {
        EngineState::OutputFailed => {
            error!(
                output = %config.output.virtual_name,
                "virtual output port not found, cannot route"
            );
            return Ok(ExitCode::from(EXIT_OUTPUT_NOT_FOUND));
        }
        EngineState::Running if engine.attached_inputs() == 0 => {
            warn!("no input ports admitted — nothing to route");
            engine.shutdown();
            return Ok(ExitCode::from(EXIT_NO_INPUTS));
        }
        _ => {}
    }

    info!(inputs = ?engine.input_names(), "forwarding, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    engine.shutdown();

    Ok(ExitCode::SUCCESS)
}
