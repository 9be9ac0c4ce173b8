//! Solution representation returned by a modeling-system backend.

use crate::error::{UpsideError, UpsideResult};
use crate::names::ModelVar;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::warn;

/// Status of the solve as reported by the modeling system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// Optimal within the configured gap.
    Solved,
    /// Solved, but the solver flagged a possible inaccuracy.
    SolvedUncertain,
    /// Stopped on a limit; an incumbent may be missing.
    Limit,
    /// No feasible point exists.
    Infeasible,
    /// Objective is unbounded.
    Unbounded,
    /// The solver failed to run (license, crash).
    Failure,
    /// Status missing or not recognized.
    Unknown,
}

impl SolveStatus {
    /// Check if variable values can be decoded for this status.
    pub fn has_solution(&self) -> bool {
        matches!(
            self,
            SolveStatus::Solved | SolveStatus::SolvedUncertain | SolveStatus::Limit
        )
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Solved => write!(f, "solved"),
            SolveStatus::SolvedUncertain => write!(f, "solved?"),
            SolveStatus::Limit => write!(f, "limit"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::Unbounded => write!(f, "unbounded"),
            SolveStatus::Failure => write!(f, "failure"),
            SolveStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Values of one indexed variable, sorted by index.
///
/// Indices are kept exactly as the modeling system reports them (1-based
/// ranks for this model); re-basing is the decoder's job.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariableTable {
    entries: Vec<(Vec<f64>, f64)>,
}

impl VariableTable {
    pub fn new(mut entries: Vec<(Vec<f64>, f64)>) -> Self {
        entries.sort_by(|a, b| compare_index(&a.0, &b.0));
        Self { entries }
    }

    /// Value at an exact index.
    pub fn get(&self, index: &[f64]) -> Option<f64> {
        self.entries
            .binary_search_by(|(idx, _)| compare_index(idx, index))
            .ok()
            .map(|pos| self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[f64], f64)> + '_ {
        self.entries.iter().map(|(idx, v)| (idx.as_slice(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }
}

fn compare_index(a: &[f64], b: &[f64]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// Everything a backend hands back after a solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedModel {
    /// Solver the modeling system was told to use.
    pub solver: String,
    pub status: SolveStatus,
    /// Captured modeling-system output, for diagnostics.
    pub solver_output: String,
    variables: BTreeMap<ModelVar, VariableTable>,
}

impl SolvedModel {
    pub fn new(solver: impl Into<String>, status: SolveStatus) -> Self {
        Self {
            solver: solver.into(),
            status,
            solver_output: String::new(),
            variables: BTreeMap::new(),
        }
    }

    pub fn with_variable(mut self, var: ModelVar, table: VariableTable) -> Self {
        self.variables.insert(var, table);
        self
    }

    pub fn insert_variable(&mut self, var: ModelVar, table: VariableTable) {
        self.variables.insert(var, table);
    }

    /// Table for a decision variable; absent tables are a decode failure.
    pub fn variable(&self, var: ModelVar) -> UpsideResult<&VariableTable> {
        self.variables
            .get(&var)
            .ok_or_else(|| UpsideError::decode(format!("variable table '{var}' is missing")))
    }

    /// Map the solve status onto the error taxonomy.
    ///
    /// Statuses without usable values end the run here, so nothing downstream
    /// ever decodes an infeasible model.
    pub fn ensure_solution(self) -> UpsideResult<Self> {
        if self.status.has_solution() {
            if self.status == SolveStatus::Limit {
                warn!(
                    "Solver stopped on a limit; decoding the incumbent solution \
                     (decoding fails if the solver found no incumbent)"
                );
            }
            return Ok(self);
        }
        match self.status {
            SolveStatus::Infeasible | SolveStatus::Unbounded => Err(UpsideError::Infeasible {
                status: self.status.to_string(),
            }),
            _ => {
                let mut message = format!("solve ended with status '{}'", self.status);
                let tail = tail_lines(&self.solver_output, OUTPUT_TAIL_LINES);
                if !tail.is_empty() {
                    message.push('\n');
                    message.push_str(&tail);
                }
                Err(UpsideError::SolverUnavailable {
                    solver: self.solver,
                    message,
                })
            }
        }
    }
}

/// Lines of solver output attached to a failure message.
pub const OUTPUT_TAIL_LINES: usize = 20;

/// Last `count` lines of `text`.
pub fn tail_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].join("\n")
}
