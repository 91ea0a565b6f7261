// src/motion/planner.rs - Online trajectory generation, one update per control cycle
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::calculator::Calculator;
use super::input::{ControlInterface, InputParameter};
use super::trajectory::{DofState, Trajectory};
use super::waypoints::{PendingPlan, PlanningStrategy, WaypointClient};
use crate::error::OtgError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OtgResult {
    /// The trajectory is still running
    Working,
    /// The target state has been reached
    Finished,
}

/// State commanded for the next control cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputParameter {
    pub new_position: Vec<f64>,
    pub new_velocity: Vec<f64>,
    pub new_acceleration: Vec<f64>,
    pub new_jerk: Vec<f64>,
    /// Time since the last calculation (s)
    pub time: f64,
    /// A new trajectory was accepted in this cycle
    pub new_calculation: bool,
    /// The accepted trajectory replaced one that had not finished
    pub was_interrupted: bool,
    /// Wall-clock time of the last calculation (µs)
    pub calculation_duration: f64,
    /// Copy of the trajectory accepted last; valid once `new_calculation`
    /// has been set
    pub trajectory: Trajectory,
}

impl OutputParameter {
    pub fn new(dofs: usize) -> Self {
        Self {
            new_position: vec![0.0; dofs],
            new_velocity: vec![0.0; dofs],
            new_acceleration: vec![0.0; dofs],
            new_jerk: vec![0.0; dofs],
            trajectory: Trajectory::with_dofs(dofs),
            ..Default::default()
        }
    }

    /// Uses the commanded state as the current state of the next cycle.
    pub fn pass_to_input(&self, input: &mut InputParameter) {
        input.current_position.clone_from(&self.new_position);
        input.current_velocity.clone_from(&self.new_velocity);
        input.current_acceleration.clone_from(&self.new_acceleration);
    }
}

/// Online trajectory generator. Replans whenever the input changes and
/// samples the active trajectory once per cycle. Apart from waypoint jobs, a
/// cycle does not allocate once the first one has run.
pub struct Otg {
    calculator: Calculator,
    delta_time: f64,
    time: f64,
    /// Input of the last plan, as the caller passed it
    last_input: InputParameter,
    has_last_input: bool,
    active: Trajectory,
    has_active: bool,
    scratch: Trajectory,
    waypoints: Option<WaypointClient>,
    pending: Option<PendingPlan>,
}

impl Otg {
    pub fn new(dofs: usize, delta_time: f64) -> Self {
        Self {
            calculator: Calculator::new(dofs, delta_time),
            delta_time,
            time: 0.0,
            last_input: InputParameter::new(dofs),
            has_last_input: false,
            active: Trajectory::with_dofs(dofs),
            has_active: false,
            scratch: Trajectory::with_dofs(dofs),
            waypoints: None,
            pending: None,
        }
    }

    /// Routes inputs with intermediate positions to `client`.
    pub fn with_waypoint_client(mut self, client: WaypointClient) -> Self {
        self.waypoints = Some(client);
        self
    }

    pub fn degrees_of_freedom(&self) -> usize {
        self.calculator.degrees_of_freedom()
    }

    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    pub fn calculator(&mut self) -> &mut Calculator {
        &mut self.calculator
    }

    /// Trajectory currently being followed.
    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.has_active.then_some(&self.active)
    }

    /// Forgets the active trajectory; the next update plans from scratch.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.has_last_input = false;
        self.has_active = false;
        self.pending = None;
    }

    /// Whether `input` asks for something the last plan does not already
    /// cover. Its current state may either be unchanged or be the state
    /// commanded in the previous cycle.
    fn needs_plan(&self, input: &InputParameter) -> bool {
        if !self.has_last_input || !input.same_request(&self.last_input) {
            return true;
        }
        if input.same_current_state(&self.last_input) {
            return false;
        }
        !(self.has_active && self.follows_commanded_state(input))
    }

    fn follows_commanded_state(&self, input: &InputParameter) -> bool {
        (0..self.active.degrees_of_freedom()).all(|dof| {
            let (p, v, a, _) = self.active.state_at(dof, self.time);
            input.current_position.get(dof) == Some(&p)
                && input.current_velocity.get(dof) == Some(&v)
                && input.current_acceleration.get(dof) == Some(&a)
        })
    }

    /// Advances one control cycle. A changed input is planned first; if that
    /// fails the previous trajectory stays in force and the error is returned.
    pub fn update(&mut self, input: &InputParameter, output: &mut OutputParameter) -> Result<OtgResult, OtgError> {
        output.new_calculation = false;
        output.was_interrupted = false;

        if self.needs_plan(input) {
            match PlanningStrategy::for_input(input) {
                PlanningStrategy::Direct => {
                    let start = Instant::now();
                    self.calculator.calculate_into(input, &mut self.scratch)?;
                    output.calculation_duration = start.elapsed().as_secs_f64() * 1e6;
                    self.pending = None;
                    std::mem::swap(&mut self.active, &mut self.scratch);
                    self.accept(output);
                }
                PlanningStrategy::Waypoints => self.submit(input)?,
            }
            self.last_input.clone_from(input);
            self.has_last_input = true;
        }

        if let Some(reply) = self.pending.as_mut().and_then(PendingPlan::poll) {
            self.pending = None;
            match reply {
                Ok(trajectory) => {
                    info!(duration = trajectory.duration(), "waypoint trajectory received");
                    self.scratch.copy_from(&trajectory);
                    std::mem::swap(&mut self.active, &mut self.scratch);
                    self.accept(output);
                }
                Err(e) => {
                    self.has_last_input = false;
                    return Err(e);
                }
            }
        }

        if !self.has_active {
            self.active.set_hold(&input.current_position, &input.current_velocity, &input.current_acceleration);
            self.has_active = true;
        }
        self.time += self.delta_time;
        output.time = self.time;
        self.active.at_time(
            self.time,
            &mut output.new_position,
            &mut output.new_velocity,
            &mut output.new_acceleration,
            &mut output.new_jerk,
        )?;

        if self.pending.is_none() && self.time >= self.active.duration() {
            Ok(OtgResult::Finished)
        } else {
            Ok(OtgResult::Working)
        }
    }

    fn submit(&mut self, input: &InputParameter) -> Result<(), OtgError> {
        let client = self
            .waypoints
            .as_ref()
            .ok_or_else(|| OtgError::InvalidInput("intermediate positions need a waypoint solver".into()))?;
        input.validate(false, true)?;
        let pending = client.submit(input.clone())?;
        debug!(id = %pending.id(), "waiting for waypoint trajectory");
        self.pending = Some(pending);
        Ok(())
    }

    /// Makes the freshly written `active` trajectory the one being followed.
    /// `scratch` still holds the one it replaced.
    fn accept(&mut self, output: &mut OutputParameter) {
        output.was_interrupted = self.has_active && self.time < self.scratch.duration();
        if output.was_interrupted {
            debug!(time = self.time, "trajectory interrupted");
        }
        output.new_calculation = true;
        output.trajectory.copy_from(&self.active);
        self.has_active = true;
        self.time = 0.0;
    }
}

/// Single-axis planner for callers that move one DOF at a time.
pub struct AxisPlanner {
    calculator: Calculator,
    input: InputParameter,
    trajectory: Option<Trajectory>,
    delta_time: f64,
    time: f64,
}

impl AxisPlanner {
    pub fn new(delta_time: f64) -> Self {
        Self {
            calculator: Calculator::new(1, delta_time),
            input: InputParameter::new(1),
            trajectory: None,
            delta_time,
            time: 0.0,
        }
    }

    /// Plans a move to a target position and returns its duration.
    #[allow(clippy::too_many_arguments)]
    pub fn plan_position(
        &mut self,
        position: f64,
        velocity: f64,
        acceleration: f64,
        target_position: f64,
        target_velocity: f64,
        target_acceleration: f64,
        min_velocity: f64,
        max_velocity: f64,
        max_acceleration: f64,
        max_jerk: f64,
    ) -> Result<f64, OtgError> {
        self.input.control_interface = ControlInterface::Position;
        self.input.target_position[0] = target_position;
        self.input.min_velocity = Some(vec![min_velocity]);
        self.input.max_velocity[0] = max_velocity;
        self.set_common(position, velocity, acceleration, target_velocity, target_acceleration, max_acceleration, max_jerk);
        self.replan()
    }

    /// Plans a change to a target velocity and returns its duration.
    #[allow(clippy::too_many_arguments)]
    pub fn plan_velocity(
        &mut self,
        position: f64,
        velocity: f64,
        acceleration: f64,
        target_velocity: f64,
        target_acceleration: f64,
        max_acceleration: f64,
        max_jerk: f64,
    ) -> Result<f64, OtgError> {
        self.input.control_interface = ControlInterface::Velocity;
        self.input.target_position[0] = position;
        self.input.min_velocity = None;
        self.input.max_velocity[0] = 0.0;
        self.set_common(position, velocity, acceleration, target_velocity, target_acceleration, max_acceleration, max_jerk);
        self.replan()
    }

    #[allow(clippy::too_many_arguments)]
    fn set_common(&mut self, p: f64, v: f64, a: f64, vf: f64, af: f64, max_acceleration: f64, max_jerk: f64) {
        let input = &mut self.input;
        input.current_position[0] = p;
        input.current_velocity[0] = v;
        input.current_acceleration[0] = a;
        input.target_velocity[0] = vf;
        input.target_acceleration[0] = af;
        input.max_acceleration[0] = max_acceleration;
        input.max_jerk[0] = max_jerk;
    }

    fn replan(&mut self) -> Result<f64, OtgError> {
        match self.calculator.calculate(&self.input) {
            Ok(trajectory) => {
                let duration = trajectory.duration();
                self.trajectory = Some(trajectory);
                self.time = 0.0;
                Ok(duration)
            }
            Err(e) => {
                warn!(error = %e, "axis replanning failed, keeping previous trajectory");
                Err(e)
            }
        }
    }

    /// State one control cycle further along, or `None` without a plan.
    pub fn next_cycle(&mut self) -> Option<(DofState, OtgResult)> {
        let trajectory = self.trajectory.as_ref()?;
        self.time += self.delta_time;
        let result = if self.time >= trajectory.duration() { OtgResult::Finished } else { OtgResult::Working };
        Some((trajectory.dof_state(0, self.time), result))
    }

    pub fn duration(&self) -> f64 {
        self.trajectory.as_ref().map_or(0.0, Trajectory::duration)
    }

    pub fn reset(&mut self) {
        self.trajectory = None;
        self.time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> InputParameter {
        let mut input = InputParameter::new(3);
        input.current_position = vec![0.0, -2.0, 0.0];
        input.target_position = vec![1.0, -3.0, 2.0];
        input.target_velocity = vec![0.0, 0.3, 0.0];
        input.max_velocity = vec![1.0; 3];
        input.max_acceleration = vec![1.0; 3];
        input.max_jerk = vec![1.0; 3];
        input
    }

    #[test]
    fn runs_until_finished_without_replanning() {
        let mut otg = Otg::new(3, 0.01);
        let mut input = input();
        let mut output = OutputParameter::new(3);

        assert_eq!(otg.update(&input, &mut output), Ok(OtgResult::Working));
        assert!(output.new_calculation);
        let mut cycles = 1;
        loop {
            output.pass_to_input(&mut input);
            let result = otg.update(&input, &mut output).expect("update");
            assert!(!output.new_calculation);
            cycles += 1;
            if result == OtgResult::Finished {
                break;
            }
        }
        // 4 s at 10 ms, give or take the accumulated rounding of the clock
        assert!((399..=401).contains(&cycles), "{cycles}");
        assert!((output.new_position[2] - 2.0).abs() < 1e-8);
        assert!((output.new_velocity[1] - 0.3).abs() < 1e-8);
    }

    #[test]
    fn changed_target_interrupts() {
        let mut otg = Otg::new(3, 0.01);
        let mut input = input();
        let mut output = OutputParameter::new(3);
        for _ in 0..50 {
            otg.update(&input, &mut output).expect("update");
            output.pass_to_input(&mut input);
        }
        input.target_position[0] = -1.0;
        otg.update(&input, &mut output).expect("update");
        assert!(output.new_calculation && output.was_interrupted);
        assert_eq!(output.time, 0.01);
    }

    #[test]
    fn failed_replan_keeps_previous_trajectory() {
        let mut otg = Otg::new(3, 0.01);
        let mut input = input();
        let mut output = OutputParameter::new(3);
        otg.update(&input, &mut output).expect("update");
        let duration = otg.trajectory().map(Trajectory::duration);

        input.max_jerk[0] = -1.0;
        assert!(otg.update(&input, &mut output).is_err());
        assert_eq!(otg.trajectory().map(Trajectory::duration), duration);
    }

    #[test]
    fn waypoints_without_solver_are_rejected() {
        let mut otg = Otg::new(3, 0.01);
        let mut input = input();
        input.intermediate_positions = vec![vec![0.5, -2.5, 1.0]];
        let mut output = OutputParameter::new(3);
        assert!(matches!(otg.update(&input, &mut output), Err(OtgError::InvalidInput(_))));
    }

    #[test]
    fn axis_planner_cycles_to_target() {
        let mut axis = AxisPlanner::new(0.001);
        assert!(axis.next_cycle().is_none());
        let duration = axis.plan_position(0.0, 0.0, 0.0, 1.0, 0.0, 0.0, -1.0, 1.0, 1.0, 1.0).expect("plan");
        assert!((duration - 3.1748021039).abs() < 1e-8);

        let mut last = None;
        while let Some((state, result)) = axis.next_cycle() {
            last = Some(state);
            if result == OtgResult::Finished {
                break;
            }
        }
        let state = last.expect("state");
        assert!((state.position - 1.0).abs() < 1e-6);

        assert!(axis.plan_position(0.0, 0.0, 0.0, 1.0, 0.0, 0.0, -1.0, 1.0, 0.0, 1.0).is_err());
        assert_eq!(axis.duration(), duration);

        let duration = axis.plan_velocity(0.0, 0.0, 0.0, 0.3, 0.0, 1.0, 1.0).expect("plan");
        assert!((duration - 2.0 * 0.3_f64.sqrt()).abs() < 1e-12);
        axis.reset();
        assert_eq!(axis.duration(), 0.0);
    }
}
