// src/lib.rs - Time-optimal, jerk-limited trajectory generation for multiple DOFs
pub mod config;
pub mod error;
pub mod motion;

pub use error::{ErrorKind, OtgError};
pub use motion::{
    Calculator, ControlInterface, InputParameter, Otg, OtgResult, OutputParameter, Synchronization, Trajectory,
};
