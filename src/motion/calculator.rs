// src/motion/calculator.rs - Multi-DOF planning: minimum times, synchronization, assembly
use tracing::{debug, trace, warn};

use super::block::Block;
use super::brake::BrakeProfile;
use super::input::{ControlInterface, DurationDiscretization, InputParameter, Synchronization};
use super::position_step1::PositionStep1;
use super::position_step2::PositionStep2;
use super::profile::Profile;
use super::trajectory::{check_position_limits, Trajectory};
use super::velocity_step1::VelocityStep1;
use super::velocity_step2::VelocityStep2;
use crate::error::{ErrorKind, OtgError};

/// Room for the extremal profiles of one DOF; Step 1 never yields more.
const PROFILE_CAPACITY: usize = 16;

/// Progress of the current (or last) planning call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CalculationPhase {
    #[default]
    Idle,
    Step1AllDofs,
    DetermineSyncDuration,
    Step2AsNeeded,
    Assembled,
    Failed(ErrorKind),
}

/// Result of replanning from a running trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct Replan {
    pub trajectory: Trajectory,
    /// Whether the previous trajectory was still running when replaced
    pub was_interrupted: bool,
}

/// Per-DOF data kept between the phases of one call.
#[derive(Debug, Clone, Copy, Default)]
struct DofPlan {
    block: Block,
    /// Start state after the brake, target state
    start: [f64; 3],
    target: [f64; 3],
    brake: BrakeProfile,
    /// `v_max, v_min, a_max, a_min, j_max`
    limits: [f64; 5],
    interface: ControlInterface,
    synchronized: bool,
    phase: bool,
}

impl DofPlan {
    /// State vector that has to be a scalar multiple of the limiting DOF's
    /// for phase synchronization.
    fn motion(&self) -> [f64; 5] {
        let [p, v, a] = self.start;
        let [pf, vf, af] = self.target;
        let pd = if self.interface == ControlInterface::Position { pf - p } else { 0.0 };
        [pd, v, a, vf, af]
    }
}

/// Duration that every synchronized DOF can finish in, and the DOF it came
/// from (`None` for an explicit minimum duration).
#[derive(Debug, Clone, Copy)]
struct Candidate {
    duration: f64,
    source: Option<usize>,
}

/// Plans trajectories for a fixed number of DOFs. Buffers are sized once at
/// construction; the `_into` entry points do not allocate once warmed up.
#[derive(Debug)]
pub struct Calculator {
    dofs: usize,
    delta_time: f64,
    phase: CalculationPhase,
    plans: Vec<DofPlan>,
    found: Vec<Profile>,
    candidates: Vec<Candidate>,
    /// Start state `[p, v, a]` per DOF when replanning from a trajectory
    starts: Vec<[f64; 3]>,
    /// Assembled profiles, copied out only once the plan is complete
    profiles: Vec<Profile>,
}

impl Calculator {
    /// `delta_time` is the control cycle used for discrete durations.
    pub fn new(dofs: usize, delta_time: f64) -> Self {
        Self {
            dofs,
            delta_time,
            phase: CalculationPhase::Idle,
            plans: vec![DofPlan::default(); dofs],
            found: Vec::with_capacity(PROFILE_CAPACITY),
            candidates: Vec::with_capacity(3 * dofs + 1),
            starts: vec![[0.0; 3]; dofs],
            profiles: vec![Profile::default(); dofs],
        }
    }

    pub fn degrees_of_freedom(&self) -> usize {
        self.dofs
    }

    pub fn phase(&self) -> CalculationPhase {
        self.phase
    }

    fn enter(&mut self, phase: CalculationPhase) {
        trace!(?phase, "calculator phase");
        self.phase = phase;
    }

    /// Plans a new trajectory from the input's current state.
    pub fn calculate(&mut self, input: &InputParameter) -> Result<Trajectory, OtgError> {
        let mut trajectory = Trajectory::with_dofs(self.dofs);
        self.calculate_into(input, &mut trajectory)?;
        Ok(trajectory)
    }

    /// Like [`Calculator::calculate`], writing into a caller-owned trajectory.
    /// On error `trajectory` is left untouched.
    pub fn calculate_into(&mut self, input: &InputParameter, trajectory: &mut Trajectory) -> Result<(), OtgError> {
        self.run(input, false, trajectory)
    }

    /// Replans mid-flight. The current state is sampled from `previous` at
    /// `elapsed`, so position, velocity and acceleration stay continuous; the
    /// input's own current state is ignored.
    pub fn continue_calculation(
        &mut self,
        input: &InputParameter,
        previous: &Trajectory,
        elapsed: f64,
    ) -> Result<Replan, OtgError> {
        let mut trajectory = Trajectory::with_dofs(self.dofs);
        let was_interrupted = self.continue_calculation_into(input, previous, elapsed, &mut trajectory)?;
        Ok(Replan { trajectory, was_interrupted })
    }

    /// Like [`Calculator::continue_calculation`], writing into a caller-owned
    /// trajectory. Returns whether `previous` was still running. `trajectory`
    /// must not alias `previous`.
    pub fn continue_calculation_into(
        &mut self,
        input: &InputParameter,
        previous: &Trajectory,
        elapsed: f64,
        trajectory: &mut Trajectory,
    ) -> Result<bool, OtgError> {
        if previous.degrees_of_freedom() != input.degrees_of_freedom {
            return Err(OtgError::DofMismatch {
                expected: input.degrees_of_freedom,
                actual: previous.degrees_of_freedom(),
            });
        }
        if input.degrees_of_freedom != self.dofs {
            return Err(OtgError::DofMismatch { expected: self.dofs, actual: input.degrees_of_freedom });
        }

        for (dof, start) in self.starts.iter_mut().enumerate() {
            let (p, v, a, _) = previous.state_at(dof, elapsed);
            *start = [p, v, a];
        }
        self.run(input, true, trajectory)?;
        Ok(elapsed < previous.duration())
    }

    /// Fail-fast variant of [`Calculator::calculate`].
    pub fn calculate_or_panic(&mut self, input: &InputParameter) -> Trajectory {
        match self.calculate(input) {
            Ok(trajectory) => trajectory,
            Err(e) => panic!("trajectory calculation failed: {e}"),
        }
    }

    /// Fail-fast variant of [`Calculator::continue_calculation`].
    pub fn continue_calculation_or_panic(&mut self, input: &InputParameter, previous: &Trajectory, elapsed: f64) -> Replan {
        match self.continue_calculation(input, previous, elapsed) {
            Ok(replan) => replan,
            Err(e) => panic!("trajectory calculation failed: {e}"),
        }
    }

    fn run(&mut self, input: &InputParameter, resumed: bool, trajectory: &mut Trajectory) -> Result<(), OtgError> {
        self.enter(CalculationPhase::Idle);
        match self.plan(input, resumed) {
            Ok(duration) => {
                trajectory.assign(&self.profiles, duration, self.plans.iter().map(|p| p.block.t_min));
                self.enter(CalculationPhase::Assembled);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "planning failed");
                self.enter(CalculationPhase::Failed(e.kind()));
                Err(e)
            }
        }
    }

    /// Fills `self.profiles` and returns the trajectory duration.
    fn plan(&mut self, input: &InputParameter, resumed: bool) -> Result<f64, OtgError> {
        if input.degrees_of_freedom != self.dofs {
            return Err(OtgError::DofMismatch { expected: self.dofs, actual: input.degrees_of_freedom });
        }
        input.validate(false, true)?;
        if !input.intermediate_positions.is_empty() {
            return Err(OtgError::InvalidInput("intermediate positions need a waypoint solver".into()));
        }

        self.enter(CalculationPhase::Step1AllDofs);
        for dof in 0..self.dofs {
            let start = if resumed {
                self.starts[dof]
            } else {
                [input.current_position[dof], input.current_velocity[dof], input.current_acceleration[dof]]
            };
            self.step1(input, dof, start)?;
        }

        self.enter(CalculationPhase::DetermineSyncDuration);
        let sync = self.sync_duration(input)?;

        self.enter(CalculationPhase::Step2AsNeeded);
        let mut duration = 0.0_f64;
        match sync {
            Some(candidate) => {
                let phase_synced = self.wants_phase_sync() && self.phase_sync(candidate);
                for dof in 0..self.dofs {
                    // Phase-synchronized profiles are already in place
                    let plan = &self.plans[dof];
                    if !plan.synchronized {
                        self.profiles[dof] = plan.block.p_min;
                    } else if !(plan.phase && phase_synced) {
                        let profile = self.step2(dof, candidate.duration)?;
                        self.profiles[dof] = profile;
                    }
                    duration = duration.max(self.profiles[dof].duration());
                }
                duration = duration.max(candidate.duration);
            }
            None => {
                for (profile, plan) in self.profiles.iter_mut().zip(&self.plans) {
                    duration = duration.max(plan.block.t_min);
                    *profile = plan.block.p_min;
                }
                duration = duration.max(input.minimum_duration.unwrap_or(0.0));
            }
        }

        if input.max_position.is_some() || input.min_position.is_some() {
            check_position_limits(&self.profiles, input.max_position.as_deref(), input.min_position.as_deref())?;
        }
        debug!(duration, "trajectory assembled");
        Ok(duration)
    }

    /// Minimum-time profile and blocked durations of one DOF.
    fn step1(&mut self, input: &InputParameter, dof: usize, [p0, v0, a0]: [f64; 3]) -> Result<(), OtgError> {
        let (pf, vf, af) = (input.target_position[dof], input.target_velocity[dof], input.target_acceleration[dof]);
        let interface = input.interface(dof);

        if !input.enabled[dof] {
            let mut hold = Profile::new(p0, v0, a0, p0, v0, a0);
            hold.set_hold();
            self.plans[dof] = DofPlan { block: Block::single(hold), start: [p0, v0, a0], target: [p0, v0, a0], interface, ..Default::default() };
            return Ok(());
        }

        let (v_max, v_min) = (input.max_velocity[dof], input.v_min(dof));
        let (a_max, a_min) = (input.max_acceleration[dof], input.a_min(dof));
        let j_max = input.max_jerk[dof];
        if input.requires_motion_from(dof, [p0, v0, a0]) {
            // A position target on the far side of a zero velocity limit is unreachable
            let zero_velocity = interface == ControlInterface::Position
                && ((v_max == 0.0 && v_min == 0.0) || (v_max == 0.0 && pf > p0) || (v_min == 0.0 && pf < p0));
            if zero_velocity || a_max == 0.0 || a_min == 0.0 || j_max == 0.0 {
                return Err(OtgError::ZeroLimits { dof });
            }
        }

        let mut brake = BrakeProfile::default();
        let (mut p, mut v, mut a) = (p0, v0, a0);
        let zero_final = match interface {
            ControlInterface::Position => {
                brake.position_brake(v0, a0, v_max, v_min, a_max, a_min, j_max);
                brake.finalize(&mut p, &mut v, &mut a);
                let mut template = Profile::new(p, v, a, pf, vf, af);
                template.brake = brake;
                PositionStep1::new(p, v, a, pf, vf, af, v_max, v_min, a_max, a_min, j_max)
                    .get_profiles(&template, &mut self.found)
            }
            ControlInterface::Velocity => {
                let template = Profile::new(p0, v0, a0, p0, vf, af);
                VelocityStep1::new(v0, a0, vf, af, a_max, a_min, j_max).get_profiles(&template, &mut self.found)
            }
        };
        if brake.duration > 0.0 {
            debug!(dof, brake = brake.duration, "current state outside limits, braking first");
        }

        let block = Block::calculate(&mut self.found, zero_final).ok_or(OtgError::StepCalculationFailed { dof })?;
        debug!(dof, t_min = block.t_min, a = ?block.a.map(|i| (i.left, i.right)), b = ?block.b.map(|i| (i.left, i.right)), "minimum-time profile");

        let synchronized = match input.synchronization(dof) {
            Synchronization::Time | Synchronization::Phase => true,
            Synchronization::TimeIfNecessary => vf.abs() > f64::EPSILON || af.abs() > f64::EPSILON,
            Synchronization::None => false,
        };
        self.plans[dof] = DofPlan {
            block,
            start: [p, v, a],
            target: [pf, vf, af],
            brake,
            limits: [v_max, v_min, a_max, a_min, j_max],
            interface,
            synchronized,
            phase: input.synchronization(dof) == Synchronization::Phase,
        };
        Ok(())
    }

    fn discretize(&self, input: &InputParameter, t: f64) -> f64 {
        match input.duration_discretization {
            DurationDiscretization::Continuous => t,
            DurationDiscretization::Discrete => (t / self.delta_time - 1e-9).ceil() * self.delta_time,
        }
    }

    /// Smallest candidate duration no synchronized DOF blocks. `None` when no
    /// DOF is synchronized.
    fn sync_duration(&mut self, input: &InputParameter) -> Result<Option<Candidate>, OtgError> {
        if !self.plans.iter().any(|p| p.synchronized) {
            return Ok(None);
        }

        self.candidates.clear();
        for (dof, plan) in self.plans.iter().enumerate().filter(|(_, p)| p.synchronized) {
            for t in plan.block.candidate_durations() {
                self.candidates.push(Candidate { duration: t, source: Some(dof) });
            }
        }
        let minimum = input.minimum_duration.unwrap_or(0.0);
        if input.minimum_duration.is_some() {
            self.candidates.push(Candidate { duration: minimum, source: None });
        }
        if input.duration_discretization == DurationDiscretization::Discrete {
            for i in 0..self.candidates.len() {
                self.candidates[i].duration = self.discretize(input, self.candidates[i].duration);
            }
        }
        self.candidates.sort_unstable_by(|a, b| a.duration.total_cmp(&b.duration));

        let plans = &self.plans;
        let blocked = |t: f64| plans.iter().filter(|p| p.synchronized).position(|p| p.block.is_blocked(t));
        let chosen = self.candidates.iter().find(|c| c.duration >= minimum && blocked(c.duration).is_none());
        match chosen {
            Some(c) => {
                debug!(t_sync = c.duration, limiting = ?c.source, "synchronization duration");
                Ok(Some(*c))
            }
            None => {
                let last = self.candidates.last().map_or(minimum, |c| c.duration);
                let dof = plans
                    .iter()
                    .enumerate()
                    .find(|(_, p)| p.synchronized && p.block.is_blocked(last))
                    .map_or(0, |(dof, _)| dof);
                Err(OtgError::SynchronizationFailed { dof, duration: last })
            }
        }
    }

    /// Profile of a synchronized DOF lasting exactly `t_sync`.
    fn step2(&self, dof: usize, t_sync: f64) -> Result<Profile, OtgError> {
        let plan = &self.plans[dof];
        if let Some(profile) = plan.block.profile_for(t_sync) {
            return Ok(*profile);
        }

        let [p, v, a] = plan.start;
        let [pf, vf, af] = plan.target;
        let mut profile = Profile::new(p, v, a, pf, vf, af);
        profile.brake = plan.brake;
        let found = match plan.interface {
            ControlInterface::Position => {
                let [v_max, v_min, a_max, a_min, j_max] = plan.limits;
                PositionStep2::new(t_sync - plan.brake.duration, p, v, a, pf, vf, af, v_max, v_min, a_max, a_min, j_max)
                    .get_profile(&mut profile)
            }
            ControlInterface::Velocity => {
                let [_, _, a_max, a_min, j_max] = plan.limits;
                VelocityStep2::new(t_sync, v, a, vf, af, a_max, a_min, j_max).get_profile(&mut profile)
            }
        };
        if !found {
            return Err(OtgError::SynchronizationFailed { dof, duration: t_sync });
        }
        Ok(profile)
    }

    fn wants_phase_sync(&self) -> bool {
        self.plans.iter().any(|p| p.synchronized && p.phase)
    }

    /// Writes the profiles of the phase-synchronized DOFs, sharing the limiting
    /// profile's phase durations with scaled jerk. `false` falls back to time
    /// synchronization.
    fn phase_sync(&mut self, candidate: Candidate) -> bool {
        let Some(limiting) = candidate.source else {
            warn!("duration imposed by minimum duration, using time synchronization");
            return false;
        };
        let reference_plan = &self.plans[limiting];
        if reference_plan.brake.duration > 0.0 {
            warn!(dof = limiting, "limiting DOF brakes, using time synchronization");
            return false;
        }
        let Some(reference) = reference_plan.block.profile_for(candidate.duration) else {
            warn!(dof = limiting, "no limiting profile at the synchronization duration, using time synchronization");
            return false;
        };

        let reference_motion = reference_plan.motion();
        let (k, pivot) = reference_motion
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .unwrap_or_default();
        if pivot.abs() < f64::EPSILON {
            return false;
        }

        for (dof, plan) in self.plans.iter().enumerate().filter(|(_, p)| p.synchronized && p.phase) {
            if plan.interface != reference_plan.interface || plan.brake.duration > 0.0 {
                warn!(dof, "phase synchronization needs equal interfaces without brake, using time synchronization");
                return false;
            }

            let motion = plan.motion();
            let scale = motion[k] / pivot;
            let collinear = motion
                .iter()
                .zip(&reference_motion)
                .all(|(m, r)| (m - scale * r).abs() < 1e-9 * m.abs().max(1.0));
            if !collinear {
                warn!(dof, "motion is not collinear, using time synchronization");
                return false;
            }

            let [p, v, a] = plan.start;
            let [pf, vf, af] = plan.target;
            let [v_max, v_min, a_max, a_min, j_max] = plan.limits;
            let mut profile = Profile::new(p, v, a, pf, vf, af);
            let check_position = plan.interface == ControlInterface::Position;
            if !profile.check_scaled(reference, scale, check_position, v_max, v_min, a_max, a_min, j_max) {
                warn!(dof, scale, "scaled profile violates limits, using time synchronization");
                return false;
            }
            self.profiles[dof] = profile;
        }
        true
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
    fn synchronizes_to_slowest_dof() {
        let mut calc = Calculator::new(3, 0.005);
        let traj = calc.calculate(&input()).expect("trajectory");
        assert_eq!(calc.phase(), CalculationPhase::Assembled);
        assert!((traj.duration() - 4.0).abs() < 1e-8);
        for (t, expected) in traj.independent_min_durations().iter().zip([3.1748021039, 3.6860977315, 4.0]) {
            assert!((t - expected).abs() < 1e-8, "{t} vs {expected}");
        }
        let p = traj.positions_at(2.0);
        assert!((p[1] + 2.6871268303).abs() < 1e-8);
    }

    #[test]
    fn failure_is_recorded_in_phase() {
        let mut calc = Calculator::new(3, 0.005);
        let mut bad = input();
        bad.max_jerk[1] = 0.0;
        assert_eq!(calc.calculate(&bad), Err(OtgError::ZeroLimits { dof: 1 }));
        assert_eq!(calc.phase(), CalculationPhase::Failed(ErrorKind::ZeroLimits));
    }

    #[test]
    fn replanning_keeps_state_continuous() {
        let mut calc = Calculator::new(3, 0.005);
        let first = calc.calculate(&input()).expect("trajectory");
        let mut changed = input();
        changed.target_position = vec![-1.0, 0.0, 1.0];
        let replan = calc.continue_calculation(&changed, &first, 1.5).expect("replan");
        assert!(replan.was_interrupted);
        for dof in 0..3 {
            let (p0, v0, a0, _) = first.state_at(dof, 1.5);
            let (p1, v1, a1, _) = replan.trajectory.state_at(dof, 0.0);
            assert!((p0 - p1).abs() < 1e-12 && (v0 - v1).abs() < 1e-12 && (a0 - a1).abs() < 1e-12);
        }
        let after = calc.continue_calculation(&changed, &first, 5.0).expect("replan");
        assert!(!after.was_interrupted);
    }

    #[test]
    fn failed_calculation_leaves_buffer_untouched() {
        let mut calc = Calculator::new(3, 0.005);
        let mut traj = Trajectory::with_dofs(3);
        calc.calculate_into(&input(), &mut traj).expect("trajectory");
        let before = traj.clone();

        // Fails only once the profiles are assembled
        let mut bad = input();
        bad.per_dof_synchronization = Some(vec![Synchronization::None, Synchronization::Time, Synchronization::Time]);
        bad.min_position = Some(vec![-10.0, -3.05, -10.0]);
        assert_eq!(calc.calculate_into(&bad, &mut traj), Err(OtgError::PositionalLimitsViolated { dof: 1 }));
        assert_eq!(traj, before);
    }

    #[test]
    #[should_panic(expected = "trajectory calculation failed")]
    fn fail_fast_wrapper_panics() {
        let mut calc = Calculator::new(2, 0.005);
        calc.calculate_or_panic(&input());
    }
}
