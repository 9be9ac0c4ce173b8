//! Scenario shaping and bid decoding for the two-settlement bidding model.
//!
//! A run moves through four stages:
//!
//! ```text
//! intervals.csv ─┐
//! dffr.csv ──────┼─> MarketInputs ─> ModelScenario ─> ModelingSystem ─> SolvedModel ─> BidSchedule
//! da.csv ────────┘      (load)          (build)          (solve)                        (decode)
//! ```
//!
//! The optimization model itself and the solver are external; this crate only
//! prepares their inputs and interprets their outputs. Backends implement
//! [`ModelingSystem`].

pub mod backend;
pub mod decode;
pub mod error;
pub mod inputs;
pub mod names;
pub mod pipeline;
pub mod report;
pub mod scenario;
pub mod solution;

pub use backend::{ModelingSystem, SolverOptions};
pub use decode::{decode, rebase, Bid, BidSchedule};
pub use error::{ExitCode, Stage, UpsideError, UpsideResult};
pub use inputs::{MarketInputs, NumericTable};
pub use names::{ModelParam, ModelSet, ModelVar};
pub use scenario::{Cardinalities, ModelScenario, PriceLadder, ScenarioLimits};
pub use solution::{SolveStatus, SolvedModel, VariableTable};
