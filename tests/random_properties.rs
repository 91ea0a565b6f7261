// Integration tests: seeded random inputs must plan and end in their targets

#[cfg(test)]
mod tests {
    use krusty_otg::motion::{missed_target, Calculator, InputParameter, Randomizer};

    fn check_all(inputs: impl Iterator<Item = InputParameter>, dofs: usize) {
        let mut calculator = Calculator::new(dofs, 0.001);
        for (case, input) in inputs.enumerate() {
            let trajectory = match calculator.calculate(&input) {
                Ok(t) => t,
                Err(e) => panic!("case {case}: {e}\n{input:?}"),
            };
            assert_eq!(missed_target(&input, &trajectory), None, "case {case}: {input:?}");
            for (dof, t_min) in trajectory.independent_min_durations().iter().enumerate() {
                assert!(trajectory.duration() >= t_min - 1e-8, "case {case}, DOF {dof}: below its minimum");
            }
        }
    }

    #[test]
    fn random_position_inputs_reach_their_targets() {
        let mut randomizer = Randomizer::new(42);
        check_all((0..2_000).map(|_| randomizer.position_input(3)), 3);
    }

    #[test]
    fn random_inputs_starting_at_rest() {
        let mut randomizer = Randomizer::new(7);
        randomizer.moving_start_share = 0.0;
        check_all((0..1_000).map(|_| randomizer.position_input(2)), 2);
    }

    #[test]
    fn random_velocity_inputs_reach_their_targets() {
        let mut randomizer = Randomizer::new(3);
        check_all((0..1_000).map(|_| randomizer.velocity_input(3)), 3);
    }
}
