// krusty_simulator/src/main.rs - Drive the online planner through a scenario timeline
mod run;
mod scenario;

use crossbeam_channel::unbounded;
use std::env;

use run::{simulate, RecordWriter, SimEvent};
use scenario::Scenario;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let args: Vec<String> = env::args().collect();
    let scenario_path = if args.len() > 1 { &args[1] } else { "krusty_simulator/scenario.toml" };
    tracing::info!("Loading scenario from: {}", scenario_path);
    let scenario = Scenario::load(scenario_path).map_err(|e| {
        tracing::error!("Failed to load scenario '{}': {}", scenario_path, e);
        e
    })?;
    tracing::info!(
        "{} DOFs at {} s cycle, {} target changes",
        scenario.control.degrees_of_freedom,
        scenario.control.delta_time,
        scenario.targets.len()
    );

    // Event bus with a logger thread on the receiving end
    let (event_tx, event_rx) = unbounded::<SimEvent>();
    let logger = std::thread::spawn(move || {
        while let Ok(event) = event_rx.recv() {
            match event {
                SimEvent::Replanned { time, duration, interrupted } => {
                    tracing::info!(time, duration, interrupted, "[EVENT] Replanned")
                }
                SimEvent::Finished { time } => tracing::info!(time, "[EVENT] Finished"),
                SimEvent::PlanningFailed { time, kind, message } => {
                    tracing::warn!(time, ?kind, "[EVENT] PlanningFailed: {}", message)
                }
            }
        }
    });

    let mut writer = RecordWriter::create(&scenario.simulation.output_dir, scenario.control.degrees_of_freedom)?;
    let cycles = simulate(&scenario, &event_tx, |record| writer.write(record))?;
    writer.flush()?;
    drop(event_tx);
    if logger.join().is_err() {
        tracing::error!("event logger thread panicked");
    }

    tracing::info!("Simulated {} cycles, results in {}", cycles, scenario.simulation.output_dir);
    Ok(())
}
