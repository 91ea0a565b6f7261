// src/motion/input.rs - Planning request: current state, target state and limits per DOF
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::OtgError;

/// What a DOF is asked to reach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlInterface {
    /// Target position, velocity and acceleration
    #[default]
    Position,
    /// Target velocity and acceleration only
    Velocity,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Synchronization {
    /// All DOFs finish together
    #[default]
    Time,
    /// Only DOFs with a moving target finish together
    TimeIfNecessary,
    /// Time synchronization with shared phase timing for collinear motions
    Phase,
    /// Every DOF runs its own minimum-time profile
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationDiscretization {
    #[default]
    Continuous,
    /// Round the duration up to a multiple of the control cycle
    Discrete,
}

/// Input of one planning call. All vectors hold one entry per DOF.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct InputParameter {
    pub degrees_of_freedom: usize,
    #[serde(default)]
    pub control_interface: ControlInterface,
    #[serde(default)]
    pub synchronization: Synchronization,
    #[serde(default)]
    pub duration_discretization: DurationDiscretization,

    pub current_position: Vec<f64>,
    #[serde(default)]
    pub current_velocity: Vec<f64>,
    #[serde(default)]
    pub current_acceleration: Vec<f64>,

    #[serde(default)]
    pub target_position: Vec<f64>,
    #[serde(default)]
    pub target_velocity: Vec<f64>,
    #[serde(default)]
    pub target_acceleration: Vec<f64>,

    #[serde(default)]
    pub max_velocity: Vec<f64>,
    #[serde(default)]
    pub max_acceleration: Vec<f64>,
    #[serde(default)]
    pub max_jerk: Vec<f64>,
    /// Defaults to `-max_velocity`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_velocity: Option<Vec<f64>>,
    /// Defaults to `-max_acceleration`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_acceleration: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_position: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_position: Option<Vec<f64>>,

    #[serde(default)]
    pub enabled: Vec<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_dof_control_interface: Option<Vec<ControlInterface>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_dof_synchronization: Option<Vec<Synchronization>>,
    /// Lower bound on the trajectory duration (s)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_duration: Option<f64>,
    /// Positions to pass on the way; planned by a [`crate::motion::waypoints::WaypointSolver`]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intermediate_positions: Vec<Vec<f64>>,
}

// `clone_from` reuses the vectors of the destination, so an online loop can
// keep a copy of its last input without allocating.
impl Clone for InputParameter {
    fn clone(&self) -> Self {
        Self {
            degrees_of_freedom: self.degrees_of_freedom,
            control_interface: self.control_interface,
            synchronization: self.synchronization,
            duration_discretization: self.duration_discretization,
            current_position: self.current_position.clone(),
            current_velocity: self.current_velocity.clone(),
            current_acceleration: self.current_acceleration.clone(),
            target_position: self.target_position.clone(),
            target_velocity: self.target_velocity.clone(),
            target_acceleration: self.target_acceleration.clone(),
            max_velocity: self.max_velocity.clone(),
            max_acceleration: self.max_acceleration.clone(),
            max_jerk: self.max_jerk.clone(),
            min_velocity: self.min_velocity.clone(),
            min_acceleration: self.min_acceleration.clone(),
            max_position: self.max_position.clone(),
            min_position: self.min_position.clone(),
            enabled: self.enabled.clone(),
            per_dof_control_interface: self.per_dof_control_interface.clone(),
            per_dof_synchronization: self.per_dof_synchronization.clone(),
            minimum_duration: self.minimum_duration,
            intermediate_positions: self.intermediate_positions.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.degrees_of_freedom = source.degrees_of_freedom;
        self.control_interface = source.control_interface;
        self.synchronization = source.synchronization;
        self.duration_discretization = source.duration_discretization;
        self.current_position.clone_from(&source.current_position);
        self.current_velocity.clone_from(&source.current_velocity);
        self.current_acceleration.clone_from(&source.current_acceleration);
        self.target_position.clone_from(&source.target_position);
        self.target_velocity.clone_from(&source.target_velocity);
        self.target_acceleration.clone_from(&source.target_acceleration);
        self.max_velocity.clone_from(&source.max_velocity);
        self.max_acceleration.clone_from(&source.max_acceleration);
        self.max_jerk.clone_from(&source.max_jerk);
        self.min_velocity.clone_from(&source.min_velocity);
        self.min_acceleration.clone_from(&source.min_acceleration);
        self.max_position.clone_from(&source.max_position);
        self.min_position.clone_from(&source.min_position);
        self.enabled.clone_from(&source.enabled);
        self.per_dof_control_interface.clone_from(&source.per_dof_control_interface);
        self.per_dof_synchronization.clone_from(&source.per_dof_synchronization);
        self.minimum_duration = source.minimum_duration;
        self.intermediate_positions.clone_from(&source.intermediate_positions);
    }
}

impl InputParameter {
    /// Input for `dofs` DOFs at rest at the origin, all enabled, with zero limits.
    pub fn new(dofs: usize) -> Self {
        Self {
            degrees_of_freedom: dofs,
            control_interface: ControlInterface::default(),
            synchronization: Synchronization::default(),
            duration_discretization: DurationDiscretization::default(),
            current_position: vec![0.0; dofs],
            current_velocity: vec![0.0; dofs],
            current_acceleration: vec![0.0; dofs],
            target_position: vec![0.0; dofs],
            target_velocity: vec![0.0; dofs],
            target_acceleration: vec![0.0; dofs],
            max_velocity: vec![0.0; dofs],
            max_acceleration: vec![0.0; dofs],
            max_jerk: vec![0.0; dofs],
            min_velocity: None,
            min_acceleration: None,
            max_position: None,
            min_position: None,
            enabled: vec![true; dofs],
            per_dof_control_interface: None,
            per_dof_synchronization: None,
            minimum_duration: None,
            intermediate_positions: Vec::new(),
        }
    }

    /// Parses a TOML planning job. Omitted velocities, accelerations and
    /// enable flags default to zero and `true`.
    pub fn from_toml_str(text: &str) -> Result<Self, OtgError> {
        let mut input: Self = toml::from_str(text).map_err(|e| OtgError::InvalidInput(e.to_string()))?;
        input.fill_defaults();
        Ok(input)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, OtgError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| OtgError::InvalidInput(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    fn fill_defaults(&mut self) {
        let n = self.degrees_of_freedom;
        for v in [
            &mut self.current_velocity,
            &mut self.current_acceleration,
            &mut self.target_velocity,
            &mut self.target_acceleration,
        ] {
            if v.is_empty() {
                v.resize(n, 0.0);
            }
        }
        if self.target_position.is_empty() {
            self.target_position = self.current_position.clone();
        }
        if self.enabled.is_empty() {
            self.enabled.resize(n, true);
        }
    }

    pub fn interface(&self, dof: usize) -> ControlInterface {
        self.per_dof_control_interface.as_ref().map_or(self.control_interface, |v| v[dof])
    }

    pub fn synchronization(&self, dof: usize) -> Synchronization {
        self.per_dof_synchronization.as_ref().map_or(self.synchronization, |v| v[dof])
    }

    pub fn v_min(&self, dof: usize) -> f64 {
        self.min_velocity.as_ref().map_or(-self.max_velocity[dof], |v| v[dof])
    }

    pub fn a_min(&self, dof: usize) -> f64 {
        self.min_acceleration.as_ref().map_or(-self.max_acceleration[dof], |v| v[dof])
    }

    /// Whether the DOF has to move at all to reach its target.
    pub fn requires_motion(&self, dof: usize) -> bool {
        let state = [self.current_position[dof], self.current_velocity[dof], self.current_acceleration[dof]];
        self.requires_motion_from(dof, state)
    }

    /// Same as [`InputParameter::requires_motion`] for a start state `[p, v, a]`
    /// other than the current one.
    pub fn requires_motion_from(&self, dof: usize, [p0, v0, a0]: [f64; 3]) -> bool {
        let moving = |x: f64| x.abs() > f64::EPSILON;
        let state = moving(a0) || moving(self.target_acceleration[dof]);
        match self.interface(dof) {
            ControlInterface::Position => {
                state || moving(self.target_position[dof] - p0) || moving(v0) || moving(self.target_velocity[dof])
            }
            ControlInterface::Velocity => state || moving(self.target_velocity[dof] - v0),
        }
    }

    /// Whether both inputs ask for the same motion, whatever their current state.
    pub fn same_request(&self, other: &Self) -> bool {
        self.degrees_of_freedom == other.degrees_of_freedom
            && self.control_interface == other.control_interface
            && self.synchronization == other.synchronization
            && self.duration_discretization == other.duration_discretization
            && self.target_position == other.target_position
            && self.target_velocity == other.target_velocity
            && self.target_acceleration == other.target_acceleration
            && self.max_velocity == other.max_velocity
            && self.max_acceleration == other.max_acceleration
            && self.max_jerk == other.max_jerk
            && self.min_velocity == other.min_velocity
            && self.min_acceleration == other.min_acceleration
            && self.max_position == other.max_position
            && self.min_position == other.min_position
            && self.enabled == other.enabled
            && self.per_dof_control_interface == other.per_dof_control_interface
            && self.per_dof_synchronization == other.per_dof_synchronization
            && self.minimum_duration == other.minimum_duration
            && self.intermediate_positions == other.intermediate_positions
    }

    /// Whether the current state of both inputs is identical.
    pub fn same_current_state(&self, other: &Self) -> bool {
        self.current_position == other.current_position
            && self.current_velocity == other.current_velocity
            && self.current_acceleration == other.current_acceleration
    }

    fn check_len<T>(&self, values: &[T]) -> Result<(), OtgError> {
        if values.len() != self.degrees_of_freedom {
            return Err(OtgError::DofMismatch { expected: self.degrees_of_freedom, actual: values.len() });
        }
        Ok(())
    }

    /// Checks vector sizes, finiteness and consistency of limits and states.
    /// The current state may legitimately violate the limits (it is braked),
    /// so its check is optional.
    pub fn validate(&self, check_current_state: bool, check_target_state: bool) -> Result<(), OtgError> {
        for v in [
            &self.current_position,
            &self.current_velocity,
            &self.current_acceleration,
            &self.target_position,
            &self.target_velocity,
            &self.target_acceleration,
            &self.max_velocity,
            &self.max_acceleration,
            &self.max_jerk,
        ] {
            self.check_len(v)?;
        }
        for v in [&self.min_velocity, &self.min_acceleration, &self.max_position, &self.min_position]
            .into_iter()
            .flatten()
        {
            self.check_len(v)?;
        }
        self.check_len(&self.enabled)?;
        if let Some(v) = &self.per_dof_control_interface {
            self.check_len(v)?;
        }
        if let Some(v) = &self.per_dof_synchronization {
            self.check_len(v)?;
        }
        for row in &self.intermediate_positions {
            self.check_len(row)?;
            if row.iter().any(|x| !x.is_finite()) {
                return Err(OtgError::InvalidInput("intermediate position is not finite".into()));
            }
        }

        if let Some(t) = self.minimum_duration {
            if !t.is_finite() || t < 0.0 {
                return Err(OtgError::InvalidInput(format!("minimum duration {t} is invalid")));
            }
        }

        for dof in 0..self.degrees_of_freedom {
            self.validate_dof(dof, check_current_state, check_target_state)?;
        }
        Ok(())
    }

    fn validate_dof(&self, dof: usize, check_current_state: bool, check_target_state: bool) -> Result<(), OtgError> {
        let invalid = |msg: String| Err(OtgError::InvalidInput(format!("DOF {dof}: {msg}")));

        let (p0, v0, a0) = (self.current_position[dof], self.current_velocity[dof], self.current_acceleration[dof]);
        let (pf, vf, af) = (self.target_position[dof], self.target_velocity[dof], self.target_acceleration[dof]);
        if ![p0, v0, a0, pf, vf, af].iter().all(|x| x.is_finite()) {
            return invalid("state is not finite".into());
        }
        if !self.enabled[dof] {
            return Ok(());
        }

        let (v_max, v_min) = (self.max_velocity[dof], self.v_min(dof));
        let (a_max, a_min) = (self.max_acceleration[dof], self.a_min(dof));
        let j_max = self.max_jerk[dof];
        if ![v_max, v_min, a_max, a_min, j_max].iter().all(|x| x.is_finite()) {
            return invalid("limits are not finite".into());
        }
        if v_max < 0.0 || a_max < 0.0 || j_max < 0.0 {
            return invalid("maximum limits must not be negative".into());
        }
        if v_min > 0.0 || a_min > 0.0 {
            return invalid("minimum limits must not be positive".into());
        }

        let interface = self.interface(dof);
        let settled = |v: f64, a: f64| if j_max > 0.0 { v + a * a.abs() / (2.0 * j_max) } else { v };

        if check_current_state {
            if a0 > a_max || a0 < a_min {
                return invalid(format!("current acceleration {a0} exceeds its limits"));
            }
            if interface == ControlInterface::Position {
                if v0 > v_max || v0 < v_min {
                    return invalid(format!("current velocity {v0} exceeds its limits"));
                }
                let v_z = settled(v0, a0);
                if v_z > v_max {
                    return invalid("current state will exceed its maximum velocity limit".into());
                }
                if v_z < v_min {
                    return invalid("current state will exceed its minimum velocity limit".into());
                }
            }
        }

        if check_target_state {
            if af > a_max || af < a_min {
                return invalid(format!("target acceleration {af} exceeds its limits"));
            }
            if interface == ControlInterface::Position {
                if vf > v_max || vf < v_min {
                    return invalid(format!("target velocity {vf} exceeds its limits"));
                }
                let v_b = if j_max > 0.0 { vf - af * af.abs() / (2.0 * j_max) } else { vf };
                if v_b > v_max {
                    return invalid("target state will exceed its maximum velocity limit".into());
                }
                if v_b < v_min {
                    return invalid("target state will exceed its minimum velocity limit".into());
                }

                let above = self.max_position.as_ref().is_some_and(|p| pf > p[dof]);
                let below = self.min_position.as_ref().is_some_and(|p| pf < p[dof]);
                if above || below {
                    return Err(OtgError::PositionalLimitsViolated { dof });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_input() -> InputParameter {
        let mut input = InputParameter::new(2);
        input.max_velocity = vec![1.0; 2];
        input.max_acceleration = vec![1.0; 2];
        input.max_jerk = vec![1.0; 2];
        input.target_position = vec![1.0, -1.0];
        input
    }

    #[test]
    fn valid_input_passes() {
        assert_eq!(unit_input().validate(true, true), Ok(()));
    }

    #[test]
    fn request_ignores_current_state() {
        let input = unit_input();
        let mut moved = unit_input();
        moved.current_position[0] = 0.4;
        assert!(input.same_request(&moved) && !input.same_current_state(&moved));
        assert!(input.requires_motion(0) && !moved.requires_motion_from(0, [1.0, 0.0, 0.0]));
        moved.max_jerk[1] = 2.0;
        assert!(!input.same_request(&moved));

        let mut copy = InputParameter::new(2);
        let buffer = copy.max_jerk.as_ptr();
        copy.clone_from(&moved);
        assert_eq!(copy, moved);
        assert_eq!(copy.max_jerk.as_ptr(), buffer);
    }

    #[test]
    fn wrong_length_is_dof_mismatch() {
        let mut input = unit_input();
        input.max_jerk.push(1.0);
        assert_eq!(input.validate(false, true), Err(OtgError::DofMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn target_will_exceed_velocity() {
        let mut input = unit_input();
        input.target_velocity[0] = 0.9;
        input.target_acceleration[0] = -0.8;
        let err = input.validate(false, true).unwrap_err();
        assert!(err.to_string().contains("will exceed its maximum velocity limit"), "{err}");
    }

    #[test]
    fn non_finite_is_rejected() {
        let mut input = unit_input();
        input.current_position[1] = f64::NAN;
        assert!(matches!(input.validate(false, false), Err(OtgError::InvalidInput(_))));
    }

    #[test]
    fn target_outside_position_range() {
        let mut input = unit_input();
        input.max_position = Some(vec![0.5, 0.5]);
        assert_eq!(input.validate(false, true), Err(OtgError::PositionalLimitsViolated { dof: 0 }));
    }

    #[test]
    fn current_state_check_is_optional() {
        let mut input = unit_input();
        input.current_velocity[0] = 2.0;
        assert!(input.validate(false, true).is_ok());
        assert!(input.validate(true, true).is_err());
    }

    #[test]
    fn parses_toml_job_with_defaults() {
        let job = r#"
            degrees_of_freedom = 2
            synchronization = "phase"
            current_position = [0.0, 1.0]
            target_position = [1.0, 2.0]
            max_velocity = [1.0, 1.0]
            max_acceleration = [1.0, 1.0]
            max_jerk = [1.0, 1.0]
            per_dof_control_interface = ["position", "velocity"]
        "#;
        let input = InputParameter::from_toml_str(job).expect("job");
        assert_eq!(input.synchronization, Synchronization::Phase);
        assert_eq!(input.interface(1), ControlInterface::Velocity);
        assert_eq!(input.current_velocity, vec![0.0, 0.0]);
        assert_eq!(input.enabled, vec![true, true]);
        assert_eq!(input.v_min(0), -1.0);
        assert!(input.validate(false, true).is_ok());
    }
}
