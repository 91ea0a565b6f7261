// Integration tests: replanning decisions of the online loop

use krusty_otg::motion::{InputParameter, Otg, OtgResult, OutputParameter};

fn single_axis(target: f64) -> InputParameter {
    let mut input = InputParameter::new(1);
    input.target_position = vec![target];
    input.max_velocity = vec![1.0];
    input.max_acceleration = vec![1.0];
    input.max_jerk = vec![1.0];
    input
}

/// Runs until finished and returns the cycles taken and how often a new
/// trajectory was calculated.
fn run(otg: &mut Otg, input: &mut InputParameter, pass_back: bool) -> (usize, usize) {
    let mut output = OutputParameter::new(1);
    let mut calculations = 0;
    for cycle in 1..=2000 {
        let result = otg.update(input, &mut output).unwrap();
        calculations += usize::from(output.new_calculation);
        if pass_back {
            output.pass_to_input(input);
        }
        if result == OtgResult::Finished {
            return (cycle, calculations);
        }
    }
    panic!("not finished after 2000 cycles, {calculations} calculations");
}

#[test]
fn unchanged_input_reaches_the_target() {
    let mut otg = Otg::new(1, 0.01);
    let mut input = single_axis(1.0);
    let (cycles, calculations) = run(&mut otg, &mut input, false);
    assert_eq!(calculations, 1);
    // 3.1748 s at 10 ms
    assert!((317..=319).contains(&cycles), "{cycles}");
    // The caller's input is never touched
    assert_eq!(input, single_axis(1.0));
}

#[test]
fn passed_back_output_does_not_replan() {
    let mut otg = Otg::new(1, 0.01);
    let mut input = single_axis(1.0);
    let (cycles, calculations) = run(&mut otg, &mut input, true);
    assert_eq!(calculations, 1);
    assert!((317..=319).contains(&cycles), "{cycles}");
    assert!((input.current_position[0] - 1.0).abs() < 1e-8);
}

#[test]
fn measured_state_triggers_a_replan() {
    let mut otg = Otg::new(1, 0.01);
    let mut input = single_axis(1.0);
    let mut output = OutputParameter::new(1);
    otg.update(&input, &mut output).unwrap();
    assert!(output.new_calculation);

    // A state that is neither the previous input nor the commanded one
    input.current_position[0] = 0.25;
    otg.update(&input, &mut output).unwrap();
    assert!(output.new_calculation && output.was_interrupted);
    assert_eq!(output.trajectory.state_at(0, 0.0).0, 0.25);

    otg.update(&input, &mut output).unwrap();
    assert!(!output.new_calculation);
}
