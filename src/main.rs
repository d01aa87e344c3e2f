//! ecglink simulator: serves the sensor link protocol over TCP.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  TcpUartTransport   SimulatedEcg   LogEventSink  JsonConfigFile│
//! │  (Transport)        (SensorPort)   (EventSink)   (ConfigPort)  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │   SensorLink: FrameStream · Dispatcher · PushReporter  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  runtime::run (edge-executor · async-io-mini timers)           │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One client is served at a time.  Each connection is a fresh session;
//! its statistics are printed as JSON when the client disconnects.

use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use ecglink::adapters::config_file::JsonConfigFile;
use ecglink::adapters::log_sink::LogEventSink;
use ecglink::adapters::sim_sensor::SimulatedEcg;
use ecglink::adapters::tcp_uart::TcpUartTransport;
use ecglink::app::ports::ConfigPort;
use ecglink::config::LinkConfig;
use ecglink::link::SensorLink;
use ecglink::runtime;

#[derive(Parser, Debug)]
#[command(name = "ecglink-sim", version, about = "Serve a simulated ECG sensor link over TCP")]
struct Args {
    /// Address to accept host connections on
    #[arg(long, default_value = "127.0.0.1:7878")]
    listen: String,

    /// JSON link configuration (defaults are used if the file is missing)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated heart rate in beats per minute
    #[arg(long, default_value_t = 72)]
    heart_rate: u8,

    /// Write the effective configuration to --config and exit
    #[arg(long, requires = "config")]
    init_config: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Also captures `log` records from the library.
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(args: &Args) -> Result<LinkConfig> {
    let Some(path) = &args.config else {
        return Ok(LinkConfig::default());
    };
    let store = JsonConfigFile::new(path);
    if args.init_config {
        let config = LinkConfig::default();
        store
            .save(&config)
            .with_context(|| format!("writing {}", path.display()))?;
        return Ok(config);
    }
    store
        .load_or_default()
        .with_context(|| format!("loading {}", path.display()))
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    info!("ecglink-sim v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args)?;
    if args.init_config {
        info!("configuration written, exiting");
        return Ok(());
    }
    config.validate()?;

    let listener =
        TcpListener::bind(&args.listen).with_context(|| format!("binding {}", args.listen))?;
    info!("listening on {}", listener.local_addr()?);

    for stream in listener.incoming() {
        let stream = match stream {
            Ok(s) => s,
            Err(e) => {
                warn!("accept failed: {}", e);
                continue;
            }
        };
        let transport = match TcpUartTransport::new(stream) {
            Ok(t) => t,
            Err(e) => {
                warn!("could not configure client socket: {}", e);
                continue;
            }
        };

        let link = SensorLink::new(
            &config,
            transport,
            SimulatedEcg::new(args.heart_rate),
            LogEventSink::new(),
        )?;

        let summary = runtime::run(link, Arc::new(AtomicBool::new(false)));
        match serde_json::to_string(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => warn!("could not serialise session summary: {}", e),
        }
    }

    Ok(())
}
