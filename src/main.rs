use std::process::ExitCode;

use camera_edge_publisher::args::configure_from_args;
use camera_edge_publisher::config::Config;
use camera_edge_publisher::driver::{self, SessionPlan};
use camera_edge_publisher::sim::SimCamera;

const CONFIG_PATH: &str = "camera_edge_publisher.toml";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load_or_default(CONFIG_PATH);
    log::info!("camera-edge-publisher {}", env!("GIT_VERSION"));

    let mut plan = SessionPlan::from_config(&config);
    configure_from_args(std::env::args_os(), &mut plan.init);

    println!("Input: {}", plan.init.input);
    println!("Resolution: {}", plan.init.camera_resolution);
    println!("Body format: {}", plan.body_tracking.body_format.as_str());
    println!(
        "Detection: confidence >= {}, smoothing {}",
        plan.runtime.detection_confidence_threshold, plan.runtime.skeleton_smoothing
    );
    println!();

    let mut camera = SimCamera::new(config.simulation.clone());
    match driver::run(&mut camera, &plan) {
        Ok(summary) => {
            println!(
                "Processed {} frames ({} rewinds), stopped by {}",
                summary.frames, summary.rewinds, summary.stopped_by
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("session setup failed: {e}");
            ExitCode::FAILURE
        }
    }
}
