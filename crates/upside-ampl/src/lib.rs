//! AMPL backend for the upside pipeline.
//!
//! The model file and the solver stay external. This crate talks to the
//! `ampl` executable through files in a scratch directory:
//!
//! ```text
//! upside ──scenario.dat──> ampl run.ampl ──> solver (cplexamp)
//!        <─solution.txt───
//! ```
//!
//! `run.ampl` loads the model and data, applies the solver options, solves,
//! and dumps `solve_result` plus every declared variable. Only the six
//! decision variables named in [`upside_core::ModelVar`] are kept.

pub mod contract;
pub mod output;
pub mod script;
pub mod subprocess;

pub use contract::ModelContract;
pub use subprocess::AmplProcess;

/// Executable searched for on PATH.
pub const BINARY_NAME: &str = "ampl";

/// Scratch file names, relative to the solve directory.
pub const DATA_FILE: &str = "scenario.dat";
pub const RUN_FILE: &str = "run.ampl";
pub const SOLUTION_FILE: &str = "solution.txt";
