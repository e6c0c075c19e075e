// shuntlib test application -- CLI tool for exercising the meter registry
// and frame decoders without a Bluetooth adapter.
//
// Usage:
//   shuntlib-test-app list
//   shuntlib-test-app match --name CW20_BLE --service ffe0
//   shuntlib-test-app decode ff55010200008a00146e00303900000011...
//   shuntlib-test-app replay --interval-ms 200 --noise
//   RUST_LOG=shuntlib_core=debug shuntlib-test-app replay

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use shuntlib::atorch::models as atorch_models;
use shuntlib::{Advertisement, FrameStatus, Meter, MeterEvent, Sample};
use shuntlib_test_harness::{CW20_FRAMES, CW20_NOISE};
use shuntlib_transport::{NotificationSender, channel};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// shuntlib test application -- exercises meter backends from the command line.
#[derive(Parser)]
#[command(name = "shuntlib-test-app", version, about)]
struct Cli {
    /// Log decoder activity (RX frames, rejected payloads) to stderr.
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all supported meter models and how they advertise.
    List,

    /// Check which model, if any, an advertisement identifies.
    Match {
        /// Advertised local name (e.g. CW20_BLE).
        #[arg(long)]
        name: String,

        /// Advertised service UUID, short or 128-bit form. Repeatable.
        #[arg(long = "service")]
        services: Vec<String>,

        /// Treat the advertisement as non-connectable.
        #[arg(long)]
        not_connectable: bool,
    },

    /// Decode hex-encoded CW20 notification payloads in order.
    ///
    /// Each payload is offered to the decoder; the sample after the last
    /// payload is printed.
    Decode {
        /// Payloads as hex (spaces and colons are ignored).
        #[arg(required = true)]
        payloads: Vec<String>,
    },

    /// Stream the built-in CW20 captures through a meter and print events
    /// and samples as they arrive.
    Replay {
        /// Delay between notifications in milliseconds.
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,

        /// Interleave malformed notifications between valid frames.
        #[arg(long)]
        noise: bool,
    },
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&cleaned).with_context(|| format!("invalid hex payload '{input}'"))
}

/// GATT endpoints to open for a matched model.
fn gatt_lines(model_id: &str) -> Vec<String> {
    let Some(model) = atorch_models::all_atorch_models()
        .into_iter()
        .find(|m| m.model_id == model_id)
    else {
        return Vec::new();
    };
    let mut lines: Vec<String> = model
        .service_uuids()
        .into_iter()
        .map(|uuid| format!("  service {uuid}"))
        .collect();
    lines.push(format!("  notify  {}", model.rx_uuid()));
    lines
}

fn print_sample(sample: &Sample) {
    if sample.is_empty() {
        println!("  (no data)");
        return;
    }
    for (name, value) in sample.iter() {
        println!("  {}", shuntlib::format_measurement(name, value));
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_list() -> Result<()> {
    let meters = shuntlib::supported_meters();
    if meters.is_empty() {
        println!("No models found.");
        return Ok(());
    }

    println!(
        "{:<12}  {:<16}  {:<14}  Calculated",
        "Manufacturer",
        "Model",
        "Advertises as"
    );
    println!(
        "{:<12}  {:<16}  {:<14}  ----------",
        "-".repeat(12),
        "-".repeat(16),
        "-".repeat(14)
    );

    for meter in &meters {
        let mut names: Vec<&str> = meter.matchers.iter().map(|m| m.local_name).collect();
        names.dedup();
        for (i, name) in names.iter().enumerate() {
            if i == 0 {
                println!(
                    "{:<12}  {:<16}  {:<14}  {}",
                    meter.manufacturer.to_string(),
                    meter.model_name,
                    name,
                    meter.calculated_values.join(", ")
                );
            } else {
                println!("{:<12}  {:<16}  {:<14}", "", "", name);
            }
        }
    }

    println!();
    println!("{} models total.", meters.len());
    Ok(())
}

fn cmd_match(name: &str, services: &[String], connectable: bool) -> Result<()> {
    let services: Vec<&str> = services.iter().map(String::as_str).collect();
    let adv = Advertisement::new(name, &services, connectable);

    match shuntlib::find_meter(&adv) {
        Some(def) => {
            println!("{} {} ({})", def.manufacturer, def.model_name, def.model_id);
            for line in gatt_lines(def.model_id) {
                println!("{line}");
            }
            Ok(())
        }
        None => bail!("no supported meter advertises as {adv:?}"),
    }
}

fn cmd_decode(payloads: &[String]) -> Result<()> {
    let decoder = atorch_models::cw20().decoder()?;

    for (i, payload) in payloads.iter().enumerate() {
        let bytes = parse_hex(payload)?;
        let status = decoder.accept(bytes);
        let verdict = match status {
            FrameStatus::Accepted => "accepted".to_string(),
            FrameStatus::TooShort { len } => format!("ignored: {len} bytes is too short"),
            FrameStatus::BadMarker { len } => format!("ignored: {len} bytes without frame marker"),
        };
        println!("payload {}: {verdict}", i + 1);
    }

    println!("Sample:");
    print_sample(&decoder.decode());
    Ok(())
}

async fn feed_captures(sender: NotificationSender, interval: Duration, noise: bool) -> Result<()> {
    for (i, frame) in CW20_FRAMES.iter().enumerate() {
        sender.notify(frame.bytes()).await?;
        tokio::time::sleep(interval).await;

        if noise {
            let junk = CW20_NOISE[i % CW20_NOISE.len()];
            sender.notify(parse_hex(junk)?).await?;
            tokio::time::sleep(interval).await;
        }
    }
    Ok(())
}

async fn cmd_replay(interval_ms: u64, noise: bool) -> Result<()> {
    let model = atorch_models::cw20();
    let adv = Advertisement::new(model.matchers[0].local_name, &[model.services[0]], true);

    let (sender, transport) = channel(shuntlib_transport::DEFAULT_CAPACITY);
    let meter = shuntlib::connect(&adv, Box::new(transport)).await?;
    let mut events = meter.subscribe()?;
    println!(
        "Replaying {} captures into {} {}",
        CW20_FRAMES.len(),
        meter.info().manufacturer,
        meter.info().model_name
    );

    let feeder = tokio::spawn(feed_captures(sender, Duration::from_millis(interval_ms), noise));
    let mut label = CW20_FRAMES.iter().map(|f| f.label);

    loop {
        match events.recv().await {
            Ok(MeterEvent::FrameAccepted { len }) => {
                println!("[frame] {len} bytes ({})", label.next().unwrap_or("?"));
                print_sample(&meter.sample().await?);
            }
            Ok(MeterEvent::Disconnected) => {
                println!("[event] Disconnected");
                break;
            }
            Ok(event) => println!("[event] {event:?}"),
            Err(RecvError::Lagged(n)) => {
                println!("[warning] missed {n} events (consumer too slow)")
            }
            Err(RecvError::Closed) => break,
        }
    }

    feeder.await.context("capture feeder panicked")??;
    meter.disconnect().await?;
    println!("Last sample:");
    print_sample(&meter.sample().await?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Command::List => cmd_list(),
        Command::Match {
            name,
            services,
            not_connectable,
        } => cmd_match(name, services, !not_connectable),
        Command::Decode { payloads } => cmd_decode(payloads),
        Command::Replay { interval_ms, noise } => cmd_replay(*interval_ms, *noise).await,
    }
}
