//! fieldtone - contactless proximity instrument
//!
//! Run with: cargo run
//!
//! Hold ↑ to move the simulated hand toward the sensor, ↓ to pull it away.

mod app;
mod sim;
mod ui;

use app::Fieldtone;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    Fieldtone::new().sensor_frequency(520_000.0).run()
}
