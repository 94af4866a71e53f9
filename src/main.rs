mod bridge;
mod configuration;
mod extensions;
mod level;
mod midi;

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bridge::{Bridge, BridgeActuator, BridgeTransport};
use crate::configuration::{self as defaults, BridgeConfig};
use crate::level::mapper::ScalingPolicy;
use crate::level::pactl::{self, PactlActuator};
use crate::midi::controller::midir::MidirTransport;
use crate::midi::locator;
use crate::midi::model::Status;

const CLIENT_NAME: &str = "midi-volume-bridge";

/// Drive speaker volume and microphone gain from a MIDI mixer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Exact display name of the MIDI input device, trailing spaces included
    #[arg(long, default_value = defaults::DEFAULT_DEVICE_NAME)]
    device: String,

    /// MIDI channel (1-16) the mixer sends control changes on
    #[arg(long, default_value_t = defaults::DEFAULT_CHANNEL, value_parser = clap::value_parser!(u8).range(1..=16))]
    channel: u8,

    /// How controller values (0-127) become percentages
    #[arg(long, value_enum, default_value_t = ScalingPolicy::Direct)]
    scaling: ScalingPolicy,

    /// Pending MIDI events buffered between poll cycles
    #[arg(
        long,
        default_value_t = defaults::DEFAULT_BUFFER_CAPACITY,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    buffer: usize,

    /// Pause between poll cycles, in milliseconds
    #[arg(long, default_value_t = millis(defaults::DEFAULT_POLL_INTERVAL))]
    poll_interval_ms: u64,

    /// Pause before opening the stream, for devices that were just plugged in
    #[arg(long, default_value_t = millis(defaults::DEFAULT_SETTLE_DELAY))]
    settle_delay_ms: u64,

    /// Consecutive read failures before the device is re-resolved
    #[arg(long, default_value_t = defaults::DEFAULT_RECONNECT_AFTER, value_parser = clap::value_parser!(u32).range(1..))]
    reconnect_after: u32,

    /// Pause between attempts to find the device again, in milliseconds
    #[arg(long, default_value_t = millis(defaults::DEFAULT_RECONNECT_INTERVAL))]
    reconnect_interval_ms: u64,

    /// Upper bound on a single pactl invocation
    #[arg(long, default_value_t = millis(defaults::DEFAULT_ACTUATION_TIMEOUT))]
    actuation_timeout_ms: u64,

    /// pactl executable
    #[arg(long, default_value = "pactl")]
    pactl: String,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// List MIDI devices and exit
    #[arg(long)]
    list_devices: bool,
}

fn millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

impl Args {
    fn bridge_config(&self) -> anyhow::Result<BridgeConfig> {
        let status = Status::control_change(self.channel)
            .with_context(|| format!("invalid MIDI channel {}", self.channel))?;
        Ok(BridgeConfig {
            device_name: self.device.clone(),
            status,
            scaling: self.scaling,
            buffer_capacity: self.buffer,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            reconnect_after: self.reconnect_after,
            reconnect_interval: Duration::from_millis(self.reconnect_interval_ms),
        })
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(&args.log_level);

    if let Err(e) = run(args).await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let transport = Arc::new(
        MidirTransport::initialize(CLIENT_NAME).context("Failed to initialize MIDI transport")?,
    );

    if args.list_devices {
        for device in locator::list_devices(transport.as_ref()) {
            let direction = if device.supports_input { "in " } else { "out" };
            println!("{:>3} {} '{}'", device.index, direction, device.name);
        }
        return Ok(());
    }

    let config = args.bridge_config()?;
    info!(
        "Bridging '{}' (status {}, {:?} scaling) to pactl",
        config.device_name,
        config.status.as_u8(),
        config.scaling
    );

    let actuator: BridgeActuator = Arc::new(PactlActuator::new(pactl::Config {
        program: args.pactl.clone(),
        timeout: Duration::from_millis(args.actuation_timeout_ms),
    }));
    let transport: BridgeTransport = transport;

    let (trigger, shutdown) = bridge::shutdown::channel();
    tokio::spawn(bridge::shutdown::listen_for_signals(trigger));

    Bridge::new(transport, actuator, config).run(shutdown).await?;
    info!("Shutdown complete");
    Ok(())
}

fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
