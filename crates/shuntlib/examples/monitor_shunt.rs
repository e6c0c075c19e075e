//! Decode a simulated CW20 notification stream.
//!
//! Stands in for a BLE stack by pushing generated frames into a
//! [`ChannelTransport`](shuntlib_transport::ChannelTransport) once a second,
//! then polls the meter for samples the way a dashboard would.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p shuntlib --example monitor_shunt
//! ```

use std::time::Duration;

use shuntlib::atorch::protocol::encode_frame;
use shuntlib::{Advertisement, Meter};
use shuntlib_transport::channel;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let adv = Advertisement::new("ATORCH-CW20", &["ffe0"], true);
    let Some(def) = shuntlib::find_meter(&adv) else {
        anyhow::bail!("advertisement not recognised");
    };
    println!("Found {} {}", def.manufacturer, def.model_name);

    let (sender, transport) = channel(32);
    let meter = shuntlib::connect(&adv, Box::new(transport)).await?;

    // Simulated discharge: current ramps from -1 A to -10 A.
    let feeder = tokio::spawn(async move {
        for step in 1..=10i32 {
            let frame = encode_frame(
                128 - step as u32,
                -1000 * step,
                250 * step as u32,
                2 * step as u32,
                24,
            );
            if sender.notify(frame).await.is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    });

    for _ in 0..10 {
        tokio::time::sleep(Duration::from_secs(1)).await;
        println!("{}", meter.sample().await?);
    }

    feeder.await?;
    meter.disconnect().await?;
    Ok(())
}
