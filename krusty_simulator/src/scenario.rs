// krusty_simulator/src/scenario.rs - Scenario file: control loop setup and target timeline
use config as config_rs;
use serde::{Deserialize, Serialize};

use krusty_otg::motion::{InputParameter, Synchronization};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Scenario {
    pub simulation: SimulationConfig,
    pub control: ControlConfig,
    pub limits: LimitsConfig,
    pub initial: InitialState,
    pub targets: Vec<TargetChange>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    pub output_dir: String,
    /// Simulated time (s)
    pub duration: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlConfig {
    pub delta_time: f64,
    pub degrees_of_freedom: usize,
    #[serde(default)]
    pub synchronization: Synchronization,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    pub max_velocity: Vec<f64>,
    pub max_acceleration: Vec<f64>,
    pub max_jerk: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InitialState {
    pub position: Vec<f64>,
    #[serde(default)]
    pub velocity: Vec<f64>,
    #[serde(default)]
    pub acceleration: Vec<f64>,
}

/// New target state handed to the planner once simulated time reaches `time`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetChange {
    pub time: f64,
    pub position: Vec<f64>,
    #[serde(default)]
    pub velocity: Vec<f64>,
    #[serde(default)]
    pub acceleration: Vec<f64>,
}

fn or_zeros(values: &[f64], dofs: usize) -> Vec<f64> {
    if values.is_empty() { vec![0.0; dofs] } else { values.to_vec() }
}

impl Scenario {
    pub fn load(path: &str) -> Result<Self, config_rs::ConfigError> {
        let settings = config_rs::Config::builder()
            .add_source(config_rs::File::with_name(path))
            .build()?;
        let mut scenario: Scenario = settings.try_deserialize()?;
        scenario.targets.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(scenario)
    }

    /// Planner input at the initial state, heading for nothing yet.
    pub fn initial_input(&self) -> InputParameter {
        let dofs = self.control.degrees_of_freedom;
        let mut input = InputParameter::new(dofs);
        input.synchronization = self.control.synchronization;
        input.max_velocity.clone_from(&self.limits.max_velocity);
        input.max_acceleration.clone_from(&self.limits.max_acceleration);
        input.max_jerk.clone_from(&self.limits.max_jerk);
        input.current_position.clone_from(&self.initial.position);
        input.current_velocity = or_zeros(&self.initial.velocity, dofs);
        input.current_acceleration = or_zeros(&self.initial.acceleration, dofs);
        input.target_position.clone_from(&self.initial.position);
        input.target_velocity = input.current_velocity.clone();
        input.target_acceleration = input.current_acceleration.clone();
        input
    }
}

impl TargetChange {
    pub fn apply(&self, input: &mut InputParameter) {
        let dofs = input.degrees_of_freedom;
        input.target_position.clone_from(&self.position);
        input.target_velocity = or_zeros(&self.velocity, dofs);
        input.target_acceleration = or_zeros(&self.acceleration, dofs);
    }
}
