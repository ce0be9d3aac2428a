// main.rs - Desktop viewer for the aged Game of Life

use eframe::egui;
use life_core::{Simulation, SimulationConfig};
use tracing::{error, info};

mod app;      // eframe::App wiring
mod encoder;  // Frame -> egui image
mod pan_zoom; // Drag/scroll board placement

use app::LifeApp;

fn main() -> Result<(), eframe::Error> {
    init_tracing();

    let config = SimulationConfig {
        row_tasks: std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
        ..SimulationConfig::default()
    };
    let mut sim = match Simulation::new(config) {
        Ok(sim) => sim,
        Err(err) => {
            error!(%err, "Could not set up the simulation");
            std::process::exit(1);
        }
    };
    if let Err(err) = sim.randomize() {
        error!(%err, "Could not seed the world");
    }
    info!(world_size = sim.config().world_size, "Starting viewer");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 850.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Game of Life",
        options,
        Box::new(|_cc| Box::new(LifeApp::new(sim))),
    )
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
