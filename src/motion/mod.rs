// src/motion/mod.rs - Jerk-limited online trajectory generation
//
// Per DOF, Step 1 finds the minimum-time profile and the durations it cannot
// finish in (a `Block`); the calculator picks a common duration and Step 2
// stretches every synchronized DOF to it.

mod block;
pub mod brake;
mod position_step1;
mod position_step2;
mod roots;
mod velocity_step1;
mod velocity_step2;

pub mod calculator;
pub mod input;
pub mod planner;
pub mod profile;
pub mod randomizer;
pub mod trajectory;
pub mod waypoints;

pub use calculator::{CalculationPhase, Calculator, Replan};
pub use input::{ControlInterface, DurationDiscretization, InputParameter, Synchronization};
pub use planner::{AxisPlanner, Otg, OtgResult, OutputParameter};
pub use profile::{PositionExtrema, Profile, ReachedLimits, position_precision};
pub use randomizer::{missed_target, Randomizer};
pub use trajectory::{DofState, Trajectory};
pub use waypoints::{PendingPlan, PlanningStrategy, WaypointClient, WaypointSolver, WaypointWorker};
