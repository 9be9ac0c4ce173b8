//! Error types and exit codes for a bidding run.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Reading the CSV inputs or the model file.
    Load,
    /// Shaping tables into model sets and parameters.
    Build,
    /// Running the external solver.
    Solve,
    /// Turning variable tables into a bid schedule.
    Decode,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Load => write!(f, "load"),
            Stage::Build => write!(f, "build"),
            Stage::Solve => write!(f, "solve"),
            Stage::Decode => write!(f, "decode"),
        }
    }
}

/// Errors that abort a run.
///
/// None of these are retried; the first one raised ends the pipeline.
#[derive(Debug, Error)]
pub enum UpsideError {
    /// An input file does not exist.
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// An input file exists but its content is unusable.
    #[error("malformed input {}: {message}", path.display())]
    InputFormat {
        path: PathBuf,
        message: String,
        stage: Stage,
    },

    /// The modeling system or the configured solver cannot be reached.
    #[error("solver {solver} is unavailable: {message}")]
    SolverUnavailable { solver: String, message: String },

    /// The solver finished without a feasible solution.
    #[error("solver reported no feasible solution (status: {status})")]
    Infeasible { status: String },

    /// The solution does not match the declared model shape.
    #[error("cannot decode solution: {0}")]
    Decode(String),

    /// Scratch file I/O around the solver call.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UpsideError {
    /// Malformed input detected while reading a file.
    pub fn format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        UpsideError::InputFormat {
            path: path.into(),
            message: message.into(),
            stage: Stage::Load,
        }
    }

    /// Input that parsed but cannot be shaped into a scenario.
    pub fn scenario(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        UpsideError::InputFormat {
            path: path.into(),
            message: message.into(),
            stage: Stage::Build,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        UpsideError::Decode(message.into())
    }

    /// The stage that raised this error.
    pub fn stage(&self) -> Stage {
        match self {
            UpsideError::InputNotFound { .. } => Stage::Load,
            UpsideError::InputFormat { stage, .. } => *stage,
            UpsideError::SolverUnavailable { .. }
            | UpsideError::Infeasible { .. }
            | UpsideError::Io(_) => Stage::Solve,
            UpsideError::Decode(_) => Stage::Decode,
        }
    }
}

/// Process exit codes for the `upside` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Report printed.
    Success = 0,
    /// Anything outside the taxonomy below (configuration, scratch I/O).
    Failure = 1,
    InputNotFound = 3,
    InputFormat = 4,
    SolverUnavailable = 5,
    Infeasible = 6,
    Decode = 7,
}

impl ExitCode {
    /// Check if this exit code indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }
}

impl From<&UpsideError> for ExitCode {
    fn from(err: &UpsideError) -> Self {
        match err {
            UpsideError::InputNotFound { .. } => ExitCode::InputNotFound,
            UpsideError::InputFormat { .. } => ExitCode::InputFormat,
            UpsideError::SolverUnavailable { .. } => ExitCode::SolverUnavailable,
            UpsideError::Infeasible { .. } => ExitCode::Infeasible,
            UpsideError::Decode(_) => ExitCode::Decode,
            UpsideError::Io(_) => ExitCode::Failure,
        }
    }
}

/// Result type alias for pipeline operations.
pub type UpsideResult<T> = Result<T, UpsideError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_of_each_variant() {
        let not_found = UpsideError::InputNotFound {
            path: PathBuf::from("data/dffr.csv"),
        };
        assert_eq!(not_found.stage(), Stage::Load);
        assert_eq!(UpsideError::format("da.csv", "bad").stage(), Stage::Load);
        assert_eq!(UpsideError::scenario("da.csv", "bad").stage(), Stage::Build);
        let infeasible = UpsideError::Infeasible {
            status: "infeasible".to_string(),
        };
        assert_eq!(infeasible.stage(), Stage::Solve);
        assert_eq!(UpsideError::decode("missing d_R").stage(), Stage::Decode);
    }

    #[test]
    fn test_exit_codes_are_distinct_and_nonzero() {
        let errors = [
            UpsideError::InputNotFound {
                path: PathBuf::from("x"),
            },
            UpsideError::format("x", "y"),
            UpsideError::SolverUnavailable {
                solver: "cplexamp".to_string(),
                message: "license".to_string(),
            },
            UpsideError::Infeasible {
                status: "infeasible".to_string(),
            },
            UpsideError::decode("z"),
        ];
        let codes: Vec<i32> = errors.iter().map(|e| ExitCode::from(e) as i32).collect();
        assert_eq!(codes, vec![3, 4, 5, 6, 7]);
        assert!(!ExitCode::from(&errors[0]).is_success());
    }

    #[test]
    fn test_messages_name_the_path() {
        let err = UpsideError::InputNotFound {
            path: PathBuf::from("data/balanced/dffr.csv"),
        };
        assert_eq!(
            err.to_string(),
            "input file not found: data/balanced/dffr.csv"
        );
    }
}
