// Integration tests for handing waypoint jobs to an asynchronous solver

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;
    use std::sync::Arc;

    use krusty_otg::motion::{
        InputParameter, Otg, OtgResult, OutputParameter, Trajectory, WaypointSolver, WaypointWorker,
    };
    use krusty_otg::OtgError;

    /// Waits for a go signal, then holds each DOF at the last waypoint.
    struct Gated {
        go: Arc<Notify>,
    }

    #[async_trait]
    impl WaypointSolver for Gated {
        async fn solve(&self, input: InputParameter) -> Result<Trajectory, OtgError> {
            self.go.notified().await;
            let last = input.intermediate_positions.last().ok_or(OtgError::Offload("no waypoints".into()))?;
            let zeros = vec![0.0; last.len()];
            Ok(Trajectory::hold(last, &zeros, &zeros))
        }
    }

    fn waypoint_input() -> InputParameter {
        let mut input = InputParameter::new(2);
        input.target_position = vec![1.0, 1.0];
        input.max_velocity = vec![1.0; 2];
        input.max_acceleration = vec![1.0; 2];
        input.max_jerk = vec![1.0; 2];
        input.intermediate_positions = vec![vec![0.5, 0.2], vec![1.0, 1.0]];
        input
    }

    #[tokio::test]
    async fn control_loop_keeps_cycling_until_the_reply_arrives() {
        let go = Arc::new(Notify::new());
        let (worker, client) = WaypointWorker::spawn(Gated { go: go.clone() }, 2);
        let mut otg = Otg::new(2, 0.001).with_waypoint_client(client);
        let mut output = OutputParameter::new(2);
        let input = waypoint_input();

        for _ in 0..5 {
            assert_eq!(otg.update(&input, &mut output), Ok(OtgResult::Working));
            assert!(!output.new_calculation);
            assert_eq!(output.new_position, vec![0.0, 0.0]);
        }

        go.notify_one();
        let mut received = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            otg.update(&input, &mut output).expect("update");
            if output.new_calculation {
                received = true;
                break;
            }
        }
        assert!(received, "waypoint reply never arrived");
        assert_eq!(output.new_position, vec![1.0, 1.0]);

        drop(otg);
        worker.join().await.expect("worker");
    }

    #[tokio::test]
    async fn waypoints_without_a_solver_are_rejected() {
        let mut otg = Otg::new(2, 0.001);
        let mut output = OutputParameter::new(2);
        let err = otg.update(&waypoint_input(), &mut output).unwrap_err();
        assert!(matches!(err, OtgError::InvalidInput(_)), "{err}");
    }
}
