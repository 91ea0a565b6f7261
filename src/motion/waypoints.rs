// src/motion/waypoints.rs - Hand-off of waypoint jobs to an asynchronous solver
//
// Inputs with intermediate positions are not planned by the calculator. They
// are sent to a `WaypointSolver` running on a tokio task; the control loop
// polls for the reply without ever blocking.
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::input::InputParameter;
use super::trajectory::Trajectory;
use crate::error::OtgError;

/// Which planner handles an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanningStrategy {
    /// Calculator, within the control cycle
    Direct,
    /// Asynchronous waypoint solver
    Waypoints,
}

impl PlanningStrategy {
    pub fn for_input(input: &InputParameter) -> Self {
        if input.intermediate_positions.is_empty() { Self::Direct } else { Self::Waypoints }
    }
}

/// Planner for inputs with intermediate positions. May block on I/O, so it
/// only ever runs on the worker task.
#[async_trait]
pub trait WaypointSolver: Send + Sync + 'static {
    async fn solve(&self, input: InputParameter) -> Result<Trajectory, OtgError>;
}

type Reply = Result<Trajectory, OtgError>;

/// Request sent from the control loop to the worker task.
#[derive(Debug)]
struct PlanRequest {
    id: Uuid,
    input: InputParameter,
    respond_to: oneshot::Sender<Reply>,
}

/// Owns the worker task.
pub struct WaypointWorker {
    handle: JoinHandle<()>,
}

impl WaypointWorker {
    /// Spawns `solver` on the current tokio runtime. At most `queue_depth`
    /// requests wait at a time.
    pub fn spawn<S: WaypointSolver>(solver: S, queue_depth: usize) -> (Self, WaypointClient) {
        let (tx, mut rx) = mpsc::channel::<PlanRequest>(queue_depth.max(1));
        let handle = tokio::spawn(async move {
            info!("waypoint worker started");
            while let Some(request) = rx.recv().await {
                debug!(id = %request.id, "solving waypoint job");
                let reply = solver.solve(request.input).await;
                if let Err(e) = &reply {
                    warn!(id = %request.id, error = %e, "waypoint job failed");
                }
                if request.respond_to.send(reply).is_err() {
                    debug!(id = %request.id, "waypoint reply dropped by requester");
                }
            }
            info!("waypoint worker stopped");
        });
        (Self { handle }, WaypointClient { tx })
    }

    /// Waits until every client is dropped and the queue is drained.
    pub async fn join(self) -> Result<(), OtgError> {
        self.handle.await.map_err(|e| OtgError::Offload(e.to_string()))
    }
}

/// Cheap handle used by the control loop to submit jobs.
#[derive(Debug, Clone)]
pub struct WaypointClient {
    tx: mpsc::Sender<PlanRequest>,
}

impl WaypointClient {
    /// Queues a job without blocking. Fails when the queue is full or the
    /// worker is gone.
    pub fn submit(&self, input: InputParameter) -> Result<PendingPlan, OtgError> {
        let id = Uuid::new_v4();
        let (respond_to, rx) = oneshot::channel();
        self.tx.try_send(PlanRequest { id, input, respond_to }).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => OtgError::Offload("waypoint queue is full".into()),
            mpsc::error::TrySendError::Closed(_) => OtgError::Offload("waypoint worker stopped".into()),
        })?;
        debug!(%id, "waypoint job submitted");
        Ok(PendingPlan { id, rx })
    }
}

/// Reply slot of a submitted job.
#[derive(Debug)]
pub struct PendingPlan {
    id: Uuid,
    rx: oneshot::Receiver<Reply>,
}

impl PendingPlan {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The reply, once available. Never blocks.
    pub fn poll(&mut self) -> Option<Reply> {
        match self.rx.try_recv() {
            Ok(reply) => Some(reply),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => {
                Some(Err(OtgError::Offload(format!("request {} was dropped", self.id))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Holds each DOF at the last intermediate position.
    struct LastWaypoint;

    #[async_trait]
    impl WaypointSolver for LastWaypoint {
        async fn solve(&self, input: InputParameter) -> Result<Trajectory, OtgError> {
            let last = input.intermediate_positions.last().ok_or(OtgError::Offload("no waypoints".into()))?;
            let zeros = vec![0.0; last.len()];
            Ok(Trajectory::hold(last, &zeros, &zeros))
        }
    }

    struct Stalled;

    #[async_trait]
    impl WaypointSolver for Stalled {
        async fn solve(&self, _input: InputParameter) -> Result<Trajectory, OtgError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(OtgError::Offload("timeout".into()))
        }
    }

    fn waypoint_input() -> InputParameter {
        let mut input = InputParameter::new(2);
        input.intermediate_positions = vec![vec![0.5, 0.5], vec![1.0, -1.0]];
        input
    }

    #[test]
    fn strategy_follows_waypoints() {
        assert_eq!(PlanningStrategy::for_input(&InputParameter::new(2)), PlanningStrategy::Direct);
        assert_eq!(PlanningStrategy::for_input(&waypoint_input()), PlanningStrategy::Waypoints);
    }

    #[tokio::test]
    async fn reply_arrives_through_poll() {
        let (worker, client) = WaypointWorker::spawn(LastWaypoint, 4);
        let mut pending = client.submit(waypoint_input()).expect("submit");
        let reply = loop {
            if let Some(reply) = pending.poll() {
                break reply;
            }
            tokio::task::yield_now().await;
        };
        let trajectory = tokio_test::assert_ok!(reply);
        assert_eq!(trajectory.positions_at(0.0), vec![1.0, -1.0]);

        drop(client);
        worker.join().await.expect("worker");
    }

    #[tokio::test]
    async fn full_queue_is_reported() {
        let (_worker, client) = WaypointWorker::spawn(Stalled, 1);
        let mut first = tokio_test::assert_ok!(client.submit(waypoint_input()));
        tokio::task::yield_now().await;
        // One job in flight and one queued at most
        let _second = client.submit(waypoint_input());
        let third = tokio_test::assert_err!(client.submit(waypoint_input()));
        assert_eq!(third, OtgError::Offload("waypoint queue is full".into()));
        assert!(first.poll().is_none());
    }

    #[test]
    fn dropped_request_is_an_offload_error() {
        let (tx, rx) = oneshot::channel::<Reply>();
        let mut pending = PendingPlan { id: Uuid::new_v4(), rx };
        assert!(pending.poll().is_none());
        drop(tx);
        assert!(matches!(pending.poll(), Some(Err(OtgError::Offload(_)))));
    }
}
