//! Time-driven state: an injectable clock, the scenario simulation, and model training runs.
//!
//! Nothing here owns a timer. Callers advance state with `tick`, or hand a
//! [`Clock`] reading to `catch_up` and let a [`Ticker`] count the periods
//! that have elapsed.

pub mod clock;
mod error;
pub mod simulation;
pub mod training;

pub use clock::{Clock, ManualClock, SystemClock, Ticker};
pub use error::SimError;
pub use simulation::{SCENARIOS, SPEEDS, Simulation, Speed};
pub use training::{ModelKind, TrainingRun, TrainingStatus};
