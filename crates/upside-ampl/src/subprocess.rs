//! Subprocess management for the AMPL binary.
//!
//! Each solve gets a scratch directory holding the data file, the run script
//! and the solution file; the directory is removed when the solve returns.

use crate::contract::ModelContract;
use crate::output::parse_solution;
use crate::script::{render_data, render_run_script};
use crate::{BINARY_NAME, DATA_FILE, RUN_FILE, SOLUTION_FILE};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, info, warn};
use upside_core::solution::{tail_lines, OUTPUT_TAIL_LINES};
use upside_core::{
    ModelScenario, ModelingSystem, SolveStatus, SolvedModel, SolverOptions, UpsideError,
    UpsideResult,
};

/// An AMPL installation bound to one model file.
pub struct AmplProcess {
    /// Absolute path of the verified model file.
    model_path: PathBuf,
    /// Declarations scanned from the model.
    contract: ModelContract,
    /// Explicit binary location, checked before the default search.
    binary_override: Option<PathBuf>,
}

impl AmplProcess {
    /// Open and verify the model file.
    ///
    /// The binary itself is located lazily at solve time, so input problems
    /// surface before a missing installation does.
    pub fn open(model_path: &Path, binary_override: Option<PathBuf>) -> UpsideResult<Self> {
        let source = fs::read_to_string(model_path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => UpsideError::InputNotFound {
                path: model_path.to_path_buf(),
            },
            _ => UpsideError::format(model_path, format!("reading model: {err}")),
        })?;
        let contract = ModelContract::scan(&source);
        contract.verify(model_path)?;
        let model_path = fs::canonicalize(model_path)?;
        debug!("Verified model contract for {}", model_path.display());

        Ok(Self {
            model_path,
            contract,
            binary_override,
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Find the AMPL binary.
    ///
    /// Search order:
    /// 1. the configured path
    /// 2. ~/.upside/ampl/ampl
    /// 3. System PATH
    pub fn find_binary(&self, solver: &str) -> UpsideResult<PathBuf> {
        if let Some(path) = &self.binary_override {
            if path.is_file() {
                return Ok(path.clone());
            }
            return Err(UpsideError::SolverUnavailable {
                solver: solver.to_string(),
                message: format!("configured AMPL binary {} does not exist", path.display()),
            });
        }

        if let Some(home) = dirs::home_dir() {
            let local = home.join(".upside").join("ampl").join(BINARY_NAME);
            if local.is_file() {
                return Ok(local);
            }
        }

        which::which(BINARY_NAME).map_err(|_| UpsideError::SolverUnavailable {
            solver: solver.to_string(),
            message: format!("`{BINARY_NAME}` was not found on PATH"),
        })
    }
}

impl ModelingSystem for AmplProcess {
    fn name(&self) -> &str {
        "ampl"
    }

    fn solve(&self, scenario: &ModelScenario, options: &SolverOptions) -> UpsideResult<SolvedModel> {
        self.contract.verify_scenario(scenario)?;
        let binary = self.find_binary(&options.solver)?;
        let workdir = tempfile::Builder::new().prefix("upside-").tempdir()?;
        fs::write(workdir.path().join(DATA_FILE), render_data(scenario))?;
        fs::write(
            workdir.path().join(RUN_FILE),
            render_run_script(&self.model_path, options),
        )?;

        info!("Running {} in {}", binary.display(), workdir.path().display());
        let start = Instant::now();
        let output = Command::new(&binary)
            .arg(RUN_FILE)
            .current_dir(workdir.path())
            .stdin(Stdio::null())
            .output()
            .map_err(|err| UpsideError::SolverUnavailable {
                solver: options.solver.clone(),
                message: format!("failed to start {}: {err}", binary.display()),
            })?;
        let elapsed = start.elapsed();

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("AMPL stdout:\n{stdout}");
        if !stderr.is_empty() {
            debug!("AMPL stderr:\n{stderr}");
        }

        let solution_path = workdir.path().join(SOLUTION_FILE);
        if !solution_path.is_file() {
            return Err(UpsideError::SolverUnavailable {
                solver: options.solver.clone(),
                message: format!(
                    "AMPL exited with {} before writing a solution\n{}",
                    output.status,
                    tail_lines(&format!("{stdout}{stderr}"), OUTPUT_TAIL_LINES)
                ),
            });
        }
        if !output.status.success() {
            warn!("AMPL exited with {} after writing a solution", output.status);
        }

        let parsed = parse_solution(&fs::read_to_string(&solution_path)?)?;
        let status = parsed.status.unwrap_or(SolveStatus::Unknown);
        info!(
            "Solve finished in {:.2}s with status {status}",
            elapsed.as_secs_f64()
        );

        let mut solved = SolvedModel::new(options.solver.clone(), status);
        solved.solver_output = format!("{stdout}{stderr}");
        for (var, table) in parsed.variables {
            solved.insert_variable(var, table);
        }
        Ok(solved)
    }
}
