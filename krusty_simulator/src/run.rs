// krusty_simulator/src/run.rs - Simulated control loop around the online planner
use crossbeam_channel::Sender;
use serde::Serialize;
use std::fs::File;
use std::io::Write;

use krusty_otg::motion::{InputParameter, Otg, OtgResult, OutputParameter};
use krusty_otg::{ErrorKind, OtgError};

use crate::scenario::Scenario;

/// Commanded state of one control cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleRecord {
    pub cycle: usize,
    pub time: f64,
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
    pub acceleration: Vec<f64>,
    pub jerk: Vec<f64>,
    pub new_calculation: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Replanned { time: f64, duration: f64, interrupted: bool },
    Finished { time: f64 },
    PlanningFailed { time: f64, kind: ErrorKind, message: String },
}

/// Writes every cycle to CSV and JSON lines.
pub struct RecordWriter {
    csv: csv::Writer<File>,
    jsonl: File,
}

impl RecordWriter {
    pub fn create(output_dir: &str, dofs: usize) -> Result<Self, Box<dyn std::error::Error>> {
        std::fs::create_dir_all(output_dir)?;
        let dir = std::path::Path::new(output_dir);
        let mut csv = csv::Writer::from_path(dir.join("results.csv"))?;
        let mut header = vec!["cycle".to_string(), "time".to_string()];
        for quantity in ["p", "v", "a", "j"] {
            header.extend((0..dofs).map(|dof| format!("{quantity}{dof}")));
        }
        header.push("new_calculation".to_string());
        csv.write_record(&header)?;
        let jsonl = File::create(dir.join("results.jsonl"))?;
        Ok(Self { csv, jsonl })
    }

    pub fn write(&mut self, record: &CycleRecord) -> Result<(), Box<dyn std::error::Error>> {
        let mut row = vec![record.cycle.to_string(), record.time.to_string()];
        for values in [&record.position, &record.velocity, &record.acceleration, &record.jerk] {
            row.extend(values.iter().map(f64::to_string));
        }
        row.push(record.new_calculation.to_string());
        self.csv.write_record(&row)?;
        writeln!(self.jsonl, "{}", serde_json::to_string(record)?)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.csv.flush()?;
        self.jsonl.flush()?;
        Ok(())
    }
}

/// Runs the scenario for its full duration, calling `sink` once per cycle.
/// Planning errors are published and the previous motion continues.
pub fn simulate(
    scenario: &Scenario,
    events: &Sender<SimEvent>,
    mut sink: impl FnMut(&CycleRecord) -> Result<(), Box<dyn std::error::Error>>,
) -> Result<usize, Box<dyn std::error::Error>> {
    let dofs = scenario.control.degrees_of_freedom;
    let dt = scenario.control.delta_time;
    let mut otg = Otg::new(dofs, dt);
    let mut input = scenario.initial_input();
    let mut output = OutputParameter::new(dofs);
    let mut targets = scenario.targets.iter().peekable();
    let mut finished_reported = false;

    let cycles = (scenario.simulation.duration / dt).round() as usize;
    for cycle in 0..cycles {
        let time = cycle as f64 * dt;
        while let Some(target) = targets.next_if(|t| t.time <= time + 0.5 * dt) {
            target.apply(&mut input);
            finished_reported = false;
        }

        let result = match otg.update(&input, &mut output) {
            Ok(result) => result,
            Err(e) => {
                events.send(planning_failed(time, &e)).ok();
                hold_previous_target(&otg, &mut input);
                otg.update(&input, &mut output)?
            }
        };
        if output.new_calculation {
            let duration = otg.trajectory().map_or(0.0, |t| t.duration());
            events.send(SimEvent::Replanned { time, duration, interrupted: output.was_interrupted }).ok();
        }
        if result == OtgResult::Finished && !finished_reported {
            finished_reported = true;
            events.send(SimEvent::Finished { time }).ok();
        }

        sink(&CycleRecord {
            cycle,
            time: time + dt,
            position: output.new_position.clone(),
            velocity: output.new_velocity.clone(),
            acceleration: output.new_acceleration.clone(),
            jerk: output.new_jerk.clone(),
            new_calculation: output.new_calculation,
        })?;
        output.pass_to_input(&mut input);
    }
    Ok(cycles)
}

/// Replaces a rejected target with the end state of the running trajectory
/// (or the current state) so the loop does not retry it every cycle.
fn hold_previous_target(otg: &Otg, input: &mut InputParameter) {
    for dof in 0..input.degrees_of_freedom {
        let (p, v, a) = match otg.trajectory() {
            Some(previous) => {
                let (p, v, a, _) = previous.state_at(dof, previous.duration());
                (p, v, a)
            }
            None => (input.current_position[dof], input.current_velocity[dof], input.current_acceleration[dof]),
        };
        input.target_position[dof] = p;
        input.target_velocity[dof] = v;
        input.target_acceleration[dof] = a;
    }
}

fn planning_failed(time: f64, error: &OtgError) -> SimEvent {
    SimEvent::PlanningFailed { time, kind: error.kind(), message: error.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{ControlConfig, InitialState, LimitsConfig, SimulationConfig, TargetChange};
    use crossbeam_channel::unbounded;
    use krusty_otg::motion::Synchronization;

    fn scenario() -> Scenario {
        Scenario {
            simulation: SimulationConfig { output_dir: String::new(), duration: 12.0 },
            control: ControlConfig { delta_time: 0.001, degrees_of_freedom: 3, synchronization: Synchronization::Time },
            limits: LimitsConfig {
                max_velocity: vec![1.0; 3],
                max_acceleration: vec![1.0; 3],
                max_jerk: vec![1.0; 3],
            },
            initial: InitialState { position: vec![0.0, -2.0, 0.0], velocity: vec![], acceleration: vec![] },
            targets: vec![
                TargetChange { time: 0.0, position: vec![1.0, -3.0, 2.0], velocity: vec![0.0, 0.3, 0.0], acceleration: vec![] },
                TargetChange { time: 2.0, position: vec![-1.0, 0.0, 0.5], velocity: vec![], acceleration: vec![] },
            ],
        }
    }

    #[test]
    fn replanning_keeps_motion_continuous() {
        let (tx, rx) = unbounded();
        let mut records = Vec::new();
        simulate(&scenario(), &tx, |r| {
            records.push(r.clone());
            Ok(())
        })
        .expect("simulation");

        // Acceleration changes by at most jerk * dt per cycle, even across the replan
        let max_step = 1.0 * 0.001 + 1e-9;
        for pair in records.windows(2) {
            for dof in 0..3 {
                let da = (pair[1].acceleration[dof] - pair[0].acceleration[dof]).abs();
                assert!(da <= max_step, "cycle {}: acceleration jump {da}", pair[1].cycle);
            }
        }

        drop(tx);
        let events: Vec<_> = rx.iter().collect();
        assert!(matches!(events[0], SimEvent::Replanned { interrupted: false, .. }));
        assert!(matches!(events[1], SimEvent::Replanned { interrupted: true, .. }));
        assert!(matches!(events.last(), Some(SimEvent::Finished { .. })));

        let last = records.last().expect("records");
        assert!((last.position[0] + 1.0).abs() < 1e-8);
        assert!((last.position[2] - 0.5).abs() < 1e-8);
    }

    #[test]
    fn rejected_target_is_reported_once() {
        let mut scenario = scenario();
        scenario.targets[1].velocity = vec![5.0, 0.0, 0.0];
        let (tx, rx) = unbounded();
        simulate(&scenario, &tx, |_| Ok(())).expect("simulation");
        drop(tx);
        let failures: Vec<_> = rx.iter().filter(|e| matches!(e, SimEvent::PlanningFailed { .. })).collect();
        assert_eq!(failures.len(), 1);
        assert!(matches!(&failures[0], SimEvent::PlanningFailed { kind: ErrorKind::InvalidInput, .. }));
    }

    #[test]
    fn writer_produces_csv_and_jsonl() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = format!("{}/", dir.path().display());
        let mut writer = RecordWriter::create(&out, 2).expect("writer");
        let record = CycleRecord {
            cycle: 0,
            time: 0.001,
            position: vec![1.0, 2.0],
            velocity: vec![0.0; 2],
            acceleration: vec![0.0; 2],
            jerk: vec![0.0; 2],
            new_calculation: true,
        };
        writer.write(&record).expect("write");
        writer.flush().expect("flush");

        let csv = std::fs::read_to_string(dir.path().join("results.csv")).expect("csv");
        assert!(csv.starts_with("cycle,time,p0,p1,v0,v1,a0,a1,j0,j1,new_calculation"));
        let jsonl = std::fs::read_to_string(dir.path().join("results.jsonl")).expect("jsonl");
        let value: serde_json::Value = serde_json::from_str(jsonl.trim()).expect("json");
        assert_eq!(value["position"][1], 2.0);
    }

    #[test]
    fn scenario_file_loads_through_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scenario.toml");
        let mut scenario = scenario();
        scenario.targets.reverse();
        std::fs::write(&path, toml::to_string(&scenario).expect("toml")).expect("write");

        let loaded = Scenario::load(path.to_str().expect("path")).expect("load");
        assert_eq!(loaded.targets[0].time, 0.0);
        assert_eq!(loaded.control.degrees_of_freedom, 3);
        assert_eq!(loaded.initial_input().current_velocity, vec![0.0; 3]);
    }
}
