//! The seam between the pipeline and an external modeling system.

use crate::error::UpsideResult;
use crate::scenario::ModelScenario;
use crate::solution::SolvedModel;
use serde::{Deserialize, Serialize};

/// Solver options handed to the modeling system as `key = value` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Value of the `solver` option.
    #[serde(rename = "name")]
    pub solver: String,
    /// Relative MIP gap at which CPLEX stops.
    pub mip_gap: f64,
    /// Let the solvers print their progress logs.
    pub verbose: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            solver: "cplexamp".to_string(),
            mip_gap: 0.005,
            verbose: false,
        }
    }
}

impl SolverOptions {
    /// Options in the order they are applied.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let (knitro, cplex) = if self.verbose {
            (
                "outlev = 1 mip_outlevel = 1".to_string(),
                format!("mipdisplay = 2 mipgap = {}", self.mip_gap),
            )
        } else {
            (
                "outlev = 0 mip_outlevel = 0".to_string(),
                format!("outlev = 0 mipdisplay = 0 mipgap = {}", self.mip_gap),
            )
        };
        vec![
            ("solver", self.solver.clone()),
            ("knitro_options", knitro),
            ("cplex_options", cplex),
        ]
    }
}

/// A modeling system that can load a scenario into the model and solve it.
///
/// Implementations block until the solver returns. They report the raw
/// status in [`SolvedModel::status`]; mapping it to errors is left to
/// [`SolvedModel::ensure_solution`].
pub trait ModelingSystem {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Populate the model with `scenario`, apply `options` and solve.
    fn solve(&self, scenario: &ModelScenario, options: &SolverOptions)
        -> UpsideResult<SolvedModel>;
}
