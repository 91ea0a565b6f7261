// Tests for the calculator and online loop against known trajectories

use krusty_otg::motion::{
    Calculator, ControlInterface, DurationDiscretization, InputParameter, Otg, OtgResult, OutputParameter,
    Synchronization, Trajectory,
};
use krusty_otg::OtgError;

fn approx(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() <= 1e-5 * expected.abs().max(1.0)
}

fn assert_positions(trajectory: &Trajectory, t: f64, expected: &[f64]) {
    let positions = trajectory.positions_at(t);
    for (dof, (p, e)) in positions.iter().zip(expected).enumerate() {
        assert!(approx(*p, *e), "DOF {dof} at {t}: {p} != {e}");
    }
}

/// Three DOFs at rest, the second heading for a moving target.
fn base_input() -> InputParameter {
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
fn time_synchronized_position_target() {
    let mut calc = Calculator::new(3, 0.005);
    let traj = calc.calculate(&base_input()).unwrap();
    assert!(approx(traj.duration(), 4.0));
    assert_positions(&traj, 2.0, &[0.5, -2.6871268303, 1.0]);

    let minima = traj.independent_min_durations();
    for (t, e) in minima.iter().zip([3.1748021039, 3.6860977315, 4.0]) {
        assert!(approx(*t, e), "{t} != {e}");
    }
    // Every DOF ends in its target
    assert_positions(&traj, traj.duration(), &[1.0, -3.0, 2.0]);
}

#[test]
fn minimum_duration_stretches_all_dofs() {
    let mut input = base_input();
    input.target_velocity = vec![0.2, -0.3, 0.8];
    input.minimum_duration = Some(12.0);
    let traj = Calculator::new(3, 0.005).calculate(&input).unwrap();
    assert!(approx(traj.duration(), 12.0));
    assert_positions(&traj, 12.0, &[1.0, -3.0, 2.0]);
}

#[test]
fn target_that_will_overshoot_is_rejected() {
    let mut input = base_input();
    input.target_velocity = vec![2.0, 0.3, 0.0];
    let mut otg = Otg::new(3, 0.005);
    let mut output = OutputParameter::new(3);
    let err = otg.update(&input, &mut output).unwrap_err();
    assert!(matches!(err, OtgError::InvalidInput(ref m) if m.contains("exceeds its limits")), "{err}");
    assert!(!output.new_calculation);
}

#[test]
fn braking_from_excess_velocity() {
    let mut input = base_input();
    input.current_position = vec![1300.0, 0.0, 0.02];
    input.current_velocity = vec![1200.0, 0.0, 0.0];
    input.target_position = vec![1400.0, 0.0, 0.02];
    input.target_velocity = vec![0.0; 3];
    input.max_velocity = vec![800.0, 1.0, 1.0];
    input.max_acceleration = vec![40000.0, 1.0, 1.0];
    input.max_jerk = vec![200000.0, 1.0, 1.0];
    let traj = Calculator::new(3, 0.005).calculate(&input).unwrap();
    assert!(approx(traj.duration(), 0.167347), "{}", traj.duration());
    assert!(traj.profiles()[0].brake.duration > 0.0);
    assert_positions(&traj, traj.duration(), &[1400.0, 0.0, 0.02]);
}

#[test]
fn per_dof_interface_and_synchronization() {
    let mut calc = Calculator::new(3, 0.005);
    let mut input = base_input();

    input.control_interface = ControlInterface::Velocity;
    let traj = calc.calculate(&input).unwrap();
    assert!(approx(traj.duration(), 1.095445115));
    assert_positions(&traj, 1.0, &[0.0, -1.8641718534, 0.0]);

    input.per_dof_control_interface =
        Some(vec![ControlInterface::Position, ControlInterface::Velocity, ControlInterface::Position]);
    let traj = calc.calculate(&input).unwrap();
    assert!(approx(traj.duration(), 4.0));
    assert_positions(&traj, 2.0, &[0.5, -1.8528486838, 1.0]);

    input.per_dof_synchronization = Some(vec![Synchronization::Time, Synchronization::None, Synchronization::Time]);
    let traj = calc.calculate(&input).unwrap();
    assert!(approx(traj.duration(), 4.0));
    assert_positions(&traj, 2.0, &[0.5, -1.5643167673, 1.0]);

    input.control_interface = ControlInterface::Position;
    input.per_dof_control_interface = None;
    input.per_dof_synchronization = Some(vec![Synchronization::None, Synchronization::Time, Synchronization::Time]);
    let traj = calc.calculate(&input).unwrap();
    assert!(approx(traj.duration(), 4.0));
    assert_positions(&traj, 2.0, &[0.7482143874, -2.6871268303, 1.0]);

    let minima = traj.independent_min_durations().to_vec();
    assert!(approx(traj.state_at(0, minima[0]).0, 1.0));
    assert!(approx(traj.state_at(1, minima[1]).0, -3.0890156397));
    assert!(approx(traj.state_at(2, minima[2]).0, 2.0));
}

#[test]
fn unsynchronized_dof_keeps_its_own_duration() {
    let mut input = InputParameter::new(3);
    input.target_position = vec![35.0; 3];
    input.target_velocity = vec![125.0, 125.0, 100.0];
    input.max_velocity = vec![125.0, 125.0, 100.0];
    input.max_acceleration = vec![2000.0; 3];
    input.max_jerk = vec![20000.0; 3];
    input.per_dof_synchronization = Some(vec![Synchronization::Time, Synchronization::Time, Synchronization::None]);
    let traj = Calculator::new(3, 0.005).calculate(&input).unwrap();
    assert!(approx(traj.duration(), 0.4207106781), "{}", traj.duration());
}

#[test]
fn disabled_dofs_extrapolate_their_state() {
    let mut input = base_input();
    input.enabled = vec![true, false, false];
    input.current_velocity = vec![0.0, 0.1, 0.0];
    input.current_acceleration = vec![0.0, 0.0, -0.2];
    let traj = Calculator::new(3, 0.005).calculate(&input).unwrap();
    assert!(approx(traj.duration(), 3.1748021039));
    assert_positions(&traj, traj.duration(), &[1.0, -1.6825197896, -1.0079368399]);
}

#[test]
fn moving_start_with_partial_synchronization() {
    let mut input = base_input();
    input.current_velocity = vec![0.0, 0.2, 0.0];
    input.current_acceleration = vec![0.0, 0.2, 0.0];
    input.target_velocity = vec![0.0, 0.0, 0.2];
    input.target_acceleration = vec![0.0, 0.0, -0.1];
    let mut calc = Calculator::new(3, 0.005);

    input.enabled = vec![false, false, true];
    assert!(approx(calc.calculate(&input).unwrap().duration(), 3.6578610221));

    input.enabled = vec![true; 3];
    input.per_dof_synchronization = Some(vec![Synchronization::None, Synchronization::None, Synchronization::Time]);
    assert!(approx(calc.calculate(&input).unwrap().duration(), 3.7885667284));

    input.per_dof_synchronization = Some(vec![Synchronization::None, Synchronization::Time, Synchronization::None]);
    assert!(approx(calc.calculate(&input).unwrap().duration(), 3.7885667284));

    input.enabled = vec![true, false, true];
    assert!(approx(calc.calculate(&input).unwrap().duration(), 3.6578610221));
}

#[test]
fn discrete_duration_is_a_multiple_of_the_cycle() {
    let mut input = InputParameter::new(3);
    input.target_position = vec![1.0, -3.0, 2.0];
    input.target_velocity = vec![0.2; 3];
    input.max_velocity = vec![1.0; 3];
    input.max_acceleration = vec![2.0; 3];
    input.max_jerk = vec![1.8, 2.4, 2.0];
    input.duration_discretization = DurationDiscretization::Discrete;
    let traj = Calculator::new(3, 0.01).calculate(&input).unwrap();
    assert!(approx(traj.duration(), 4.5));
    assert_positions(&traj, 4.5, &[1.0, -3.0, 2.0]);
}

#[test]
fn phase_synchronization_shares_phase_durations() {
    let mut input = base_input();
    input.target_velocity = vec![0.0; 3];
    input.synchronization = Synchronization::Phase;
    let traj = Calculator::new(3, 0.005).calculate(&input).unwrap();
    assert!(approx(traj.duration(), 4.0));
    let profiles = traj.profiles();
    assert_eq!(profiles[0].t, profiles[1].t);
    assert_eq!(profiles[0].t, profiles[2].t);
    assert_positions(&traj, 1.0, &[0.0833333333, -2.0833333333, 0.1666666667]);

    input.target_position = vec![10.0, -3.0, 2.0];
    input.max_velocity = vec![10.0, 2.0, 1.0];
    input.max_acceleration = vec![10.0, 2.0, 1.0];
    input.max_jerk = vec![10.0, 2.0, 1.0];
    let traj = Calculator::new(3, 0.005).calculate(&input).unwrap();
    assert!(approx(traj.duration(), 4.0));
    assert_positions(&traj, 1.0, &[0.8333333333, -2.0833333333, 0.1666666667]);
}

#[test]
fn phase_synchronization_with_unsynchronized_dof() {
    let mut input = InputParameter::new(3);
    input.current_velocity = vec![0.2, 0.0, -0.1];
    input.target_position = vec![1.0, -0.2, -0.5];
    input.max_velocity = vec![1.0; 3];
    input.max_acceleration = vec![1.0; 3];
    input.max_jerk = vec![1.0; 3];
    input.per_dof_synchronization = Some(vec![Synchronization::Phase, Synchronization::None, Synchronization::Phase]);
    let traj = Calculator::new(3, 0.005).calculate(&input).unwrap();
    assert!(approx(traj.duration(), 2.848387279), "{}", traj.duration());
    let profiles = traj.profiles();
    assert_ne!(profiles[0].t, profiles[1].t);
    assert_eq!(profiles[0].t, profiles[2].t);
}

#[test]
fn equal_start_and_target_finishes_immediately() {
    let mut input = base_input();
    input.current_position = vec![1.0, -2.0, 3.0];
    input.target_position = vec![1.0, -2.0, 3.0];
    input.target_velocity = vec![0.0; 3];
    let mut otg = Otg::new(3, 0.005);
    let mut output = OutputParameter::new(3);
    assert_eq!(otg.update(&input, &mut output), Ok(OtgResult::Finished));
    assert_eq!(otg.trajectory().map(Trajectory::duration), Some(0.0));
    assert_eq!(output.new_position, vec![1.0, -2.0, 3.0]);
}

#[test]
fn positional_limits_are_checked_on_the_plan() {
    let mut input = base_input();
    // The second DOF dips below -3 to arrive at it moving upwards
    input.per_dof_synchronization = Some(vec![Synchronization::None, Synchronization::Time, Synchronization::Time]);
    input.min_position = Some(vec![-10.0, -3.05, -10.0]);
    let err = Calculator::new(3, 0.005).calculate(&input).unwrap_err();
    assert_eq!(err, OtgError::PositionalLimitsViolated { dof: 1 });
}

#[test]
#[should_panic(expected = "trajectory calculation failed")]
fn fail_fast_entry_point_panics() {
    let mut input = base_input();
    input.max_acceleration[2] = 0.0;
    Calculator::new(3, 0.005).calculate_or_panic(&input);
}
