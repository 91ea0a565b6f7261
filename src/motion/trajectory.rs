// src/motion/trajectory.rs - Planned multi-DOF trajectory and its queries
use serde::Serialize;

use super::profile::{PositionExtrema, Profile};
use crate::error::OtgError;

/// Kinematic state of a single DOF at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DofState {
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub jerk: f64,
}

/// One profile per DOF plus the shared duration. Produced by the calculator,
/// read-only to everyone else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    profiles: Vec<Profile>,
    duration: f64,
    independent_min_durations: Vec<f64>,
}

impl Trajectory {
    /// Trajectory for `dofs` DOFs at rest at the origin. Reused as an output
    /// buffer, later writes of the same size do not allocate.
    pub fn with_dofs(dofs: usize) -> Self {
        let mut profile = Profile::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        profile.set_hold();
        Self { profiles: vec![profile; dofs], duration: 0.0, independent_min_durations: vec![0.0; dofs] }
    }

    /// Trajectory that keeps every DOF in its current state.
    pub fn hold(position: &[f64], velocity: &[f64], acceleration: &[f64]) -> Self {
        let mut trajectory = Self::default();
        trajectory.set_hold(position, velocity, acceleration);
        trajectory
    }

    /// Turns this trajectory into a hold of the given state in place.
    pub fn set_hold(&mut self, position: &[f64], velocity: &[f64], acceleration: &[f64]) {
        self.profiles.clear();
        for ((&p, &v), &a) in position.iter().zip(velocity).zip(acceleration) {
            let mut profile = Profile::new(p, v, a, p, v, a);
            profile.set_hold();
            self.profiles.push(profile);
        }
        self.duration = 0.0;
        self.independent_min_durations.clear();
        self.independent_min_durations.resize(self.profiles.len(), 0.0);
    }

    pub(crate) fn assign(&mut self, profiles: &[Profile], duration: f64, independent: impl Iterator<Item = f64>) {
        self.profiles.clear();
        self.profiles.extend_from_slice(profiles);
        self.duration = duration;
        self.independent_min_durations.clear();
        self.independent_min_durations.extend(independent);
    }

    /// Copies `other` into this trajectory, reusing its buffers.
    pub fn copy_from(&mut self, other: &Trajectory) {
        self.assign(&other.profiles, other.duration, other.independent_min_durations.iter().copied());
    }

    pub fn degrees_of_freedom(&self) -> usize {
        self.profiles.len()
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Minimum duration of each DOF had it been planned on its own.
    pub fn independent_min_durations(&self) -> &[f64] {
        &self.independent_min_durations
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// State `(p, v, a, j)` of one DOF. Times past the end hold the final
    /// acceleration; negative times clamp to the start.
    pub fn state_at(&self, dof: usize, t: f64) -> (f64, f64, f64, f64) {
        self.profiles[dof].state_at(t)
    }

    pub fn dof_state(&self, dof: usize, t: f64) -> DofState {
        let (position, velocity, acceleration, jerk) = self.state_at(dof, t);
        DofState { position, velocity, acceleration, jerk }
    }

    /// Writes the state of every DOF at `t` into the given slices.
    pub fn at_time(
        &self,
        t: f64,
        position: &mut [f64],
        velocity: &mut [f64],
        acceleration: &mut [f64],
        jerk: &mut [f64],
    ) -> Result<(), OtgError> {
        let n = self.profiles.len();
        for len in [position.len(), velocity.len(), acceleration.len(), jerk.len()] {
            if len != n {
                return Err(OtgError::DofMismatch { expected: n, actual: len });
            }
        }
        for (dof, profile) in self.profiles.iter().enumerate() {
            (position[dof], velocity[dof], acceleration[dof], jerk[dof]) = profile.state_at(t);
        }
        Ok(())
    }

    /// Positions of every DOF at `t`.
    pub fn positions_at(&self, t: f64) -> Vec<f64> {
        self.profiles.iter().map(|p| p.state_at(t).0).collect()
    }

    pub fn position_extrema(&self) -> Vec<PositionExtrema> {
        self.profiles.iter().map(Profile::position_extrema).collect()
    }
}

/// Checks planned profiles against optional position bounds.
pub(crate) fn check_position_limits(profiles: &[Profile], max: Option<&[f64]>, min: Option<&[f64]>) -> Result<(), OtgError> {
    for (dof, extrema) in profiles.iter().map(Profile::position_extrema).enumerate() {
        let above = max.is_some_and(|m| extrema.max > m[dof]);
        let below = min.is_some_and(|m| extrema.min < m[dof]);
        if above || below {
            return Err(OtgError::PositionalLimitsViolated { dof });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_extrapolates_with_constant_acceleration() {
        let traj = Trajectory::hold(&[1.0, 0.0], &[0.5, 0.0], &[0.0, -0.2]);
        assert_eq!(traj.duration(), 0.0);
        let (p, v, a, j) = traj.state_at(1, 2.0);
        assert!((p + 0.4).abs() < 1e-12);
        assert!((v + 0.4).abs() < 1e-12);
        assert_eq!((a, j), (-0.2, 0.0));
        assert!((traj.positions_at(2.0)[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn at_time_rejects_wrong_slices() {
        let traj = Trajectory::hold(&[0.0; 3], &[0.0; 3], &[0.0; 3]);
        let mut p = [0.0; 3];
        let mut v = [0.0; 3];
        let mut a = [0.0; 3];
        let mut j = [0.0; 2];
        assert_eq!(
            traj.at_time(0.0, &mut p, &mut v, &mut a, &mut j),
            Err(OtgError::DofMismatch { expected: 3, actual: 2 })
        );
    }

    #[test]
    fn position_bounds_use_extrema() {
        let traj = Trajectory::hold(&[0.0, 2.0], &[0.0; 2], &[0.0; 2]);
        assert!(check_position_limits(traj.profiles(), Some(&[1.0, 3.0]), None).is_ok());
        assert_eq!(
            check_position_limits(traj.profiles(), Some(&[1.0, 1.5]), None),
            Err(OtgError::PositionalLimitsViolated { dof: 1 })
        );
    }

    #[test]
    fn copy_reuses_buffers() {
        let source = Trajectory::hold(&[1.0, 2.0, 3.0], &[0.0; 3], &[0.0; 3]);
        let mut target = Trajectory::with_dofs(3);
        let before = target.profiles().as_ptr();
        target.copy_from(&source);
        assert_eq!(target, source);
        assert_eq!(target.profiles().as_ptr(), before);

        target.set_hold(&[4.0; 3], &[0.5; 3], &[0.0; 3]);
        assert_eq!(target.profiles().as_ptr(), before);
        assert!((target.positions_at(2.0)[1] - 5.0).abs() < 1e-12);
    }
}
