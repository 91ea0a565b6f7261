// src/motion/randomizer.rs - Seeded random planning inputs and end-state checks
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::input::{ControlInterface, InputParameter};
use super::profile::{A_PRECISION, V_PRECISION, position_precision};
use super::trajectory::Trajectory;

/// Generates valid random inputs. The same seed always gives the same
/// sequence.
pub struct Randomizer {
    rng: StdRng,
    /// Share of non-zero target velocities and accelerations
    pub moving_target_share: f64,
    /// Share of DOFs that start moving
    pub moving_start_share: f64,
}

impl Randomizer {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), moving_target_share: 0.5, moving_start_share: 0.5 }
    }

    fn sometimes(&mut self, share: f64, range: f64) -> f64 {
        if self.rng.random_bool(share) { self.rng.random_range(-range..=range) } else { 0.0 }
    }

    /// State `(v, a)` that can settle without leaving `[-v_max, v_max]`.
    fn settled_state(&mut self, share: f64, v_max: f64, a_max: f64, j_max: f64) -> (f64, f64) {
        let v = self.sometimes(share, v_max);
        let a = self.sometimes(share, a_max);
        let v_settled = v + a * a.abs() / (2.0 * j_max);
        if v_settled.abs() <= v_max { (v, a) } else { (v, 0.0) }
    }

    /// Position-interface input with limits between 0.1 and 10.
    pub fn position_input(&mut self, dofs: usize) -> InputParameter {
        let mut input = InputParameter::new(dofs);
        for dof in 0..dofs {
            let v_max = self.rng.random_range(0.1..=10.0);
            let a_max = self.rng.random_range(0.1..=10.0);
            let j_max = self.rng.random_range(0.1..=10.0);
            input.max_velocity[dof] = v_max;
            input.max_acceleration[dof] = a_max;
            input.max_jerk[dof] = j_max;

            input.current_position[dof] = self.rng.random_range(-5.0..=5.0);
            input.target_position[dof] = self.rng.random_range(-5.0..=5.0);

            let (v0, a0) = self.settled_state(self.moving_start_share, v_max, a_max, j_max);
            input.current_velocity[dof] = v0;
            input.current_acceleration[dof] = a0;

            // The target is approached from the opposite side of its acceleration
            let (vf, af) = self.settled_state(self.moving_target_share, v_max, a_max, j_max);
            input.target_velocity[dof] = vf;
            input.target_acceleration[dof] = if (vf - af * af.abs() / (2.0 * j_max)).abs() <= v_max { af } else { 0.0 };
        }
        input
    }

    /// Velocity-interface input with limits between 0.1 and 10.
    pub fn velocity_input(&mut self, dofs: usize) -> InputParameter {
        let mut input = self.position_input(dofs);
        input.control_interface = ControlInterface::Velocity;
        input
    }
}

/// First DOF whose profile does not end in its target state.
pub fn missed_target(input: &InputParameter, trajectory: &Trajectory) -> Option<usize> {
    trajectory.profiles().iter().enumerate().position(|(dof, profile)| {
        if !input.enabled[dof] {
            return false;
        }
        let (p, v, a, _) = profile.state_at(profile.duration());
        let velocity_ok = (v - input.target_velocity[dof]).abs() < 1e2 * V_PRECISION;
        let acceleration_ok = (a - input.target_acceleration[dof]).abs() < 1e2 * A_PRECISION;
        let position_ok = match input.interface(dof) {
            ControlInterface::Position => {
                let target = input.target_position[dof];
                (p - target).abs() < 1e2 * position_precision(profile.p[0], target)
            }
            ControlInterface::Velocity => true,
        };
        !(velocity_ok && acceleration_ok && position_ok)
    })
}
