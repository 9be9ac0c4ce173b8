//! Load, build, solve, decode.

use crate::backend::{ModelingSystem, SolverOptions};
use crate::decode::{decode, BidSchedule};
use crate::error::UpsideResult;
use crate::inputs::MarketInputs;
use crate::scenario::{ModelScenario, ScenarioLimits};
use std::path::Path;
use tracing::info;

/// Run every stage once; the first error ends the run.
pub fn run(
    data_dir: &Path,
    limits: ScenarioLimits,
    backend: &dyn ModelingSystem,
    options: &SolverOptions,
) -> UpsideResult<BidSchedule> {
    info!("Loading inputs from {}", data_dir.display());
    let inputs = MarketInputs::load(data_dir)?;

    let scenario = ModelScenario::build(&inputs, limits)?;
    let dims = scenario.cardinalities();

    info!("Solving with {} ({})", backend.name(), options.solver);
    let solved = backend.solve(&scenario, options)?.ensure_solution()?;

    decode(&solved, &dims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpsideError;
    use crate::inputs::{DAY_AHEAD_FILE, INTERVALS_FILE, RESERVE_FILE};
    use crate::names::ModelVar;
    use crate::solution::{SolveStatus, SolvedModel, VariableTable};
    use std::cell::Cell;
    use std::fs;
    use tempfile::tempdir;

    /// Backend returning a canned model and counting calls.
    struct CannedBackend {
        status: SolveStatus,
        calls: Cell<usize>,
    }

    impl CannedBackend {
        fn new(status: SolveStatus) -> Self {
            Self {
                status,
                calls: Cell::new(0),
            }
        }
    }

    impl ModelingSystem for CannedBackend {
        fn name(&self) -> &str {
            "canned"
        }

        fn solve(
            &self,
            scenario: &ModelScenario,
            options: &SolverOptions,
        ) -> UpsideResult<SolvedModel> {
            self.calls.set(self.calls.get() + 1);
            let dims = scenario.cardinalities();
            let mut d_da = Vec::new();
            let mut q_da = Vec::new();
            for i in 1..=dims.reserve_prices {
                for l in 1..=dims.day_ahead_prices {
                    for t in 1..=dims.intervals {
                        let idx = vec![i as f64, l as f64, t as f64];
                        let q = if l == 2 && t == 1 { 0.5 } else { 0.0 };
                        d_da.push((idx.clone(), if q > 0.0 { 1.0 } else { 0.0 }));
                        q_da.push((idx, q));
                    }
                }
            }
            let d_r = (1..=dims.reserve_prices)
                .map(|i| (vec![i as f64], if i == 1 { 1.0 } else { 0.0 }))
                .collect();
            Ok(SolvedModel::new(options.solver.clone(), self.status)
                .with_variable(ModelVar::ReserveLevel, VariableTable::new(d_r))
                .with_variable(ModelVar::DayAheadLevel, VariableTable::new(d_da))
                .with_variable(
                    ModelVar::ReserveAmount,
                    VariableTable::new(vec![(vec![1.0], 2.0)]),
                )
                .with_variable(ModelVar::DayAheadAmount, VariableTable::new(q_da))
                .with_variable(ModelVar::ReserveAccepted, VariableTable::default())
                .with_variable(ModelVar::DayAheadAccepted, VariableTable::default()))
        }
    }

    fn write_inputs(dir: &Path) {
        fs::write(dir.join(INTERVALS_FILE), "INTERVALS\n1\n2\n3\n4\n").unwrap();
        fs::write(dir.join(RESERVE_FILE), "DFFR_PRICE\n10\n10\n20\n").unwrap();
        let mut da = String::from("DA_PRICE, INTERVALS\n");
        for p in [5, 15] {
            for t in 1..=4 {
                da.push_str(&format!("{p}, {t}\n"));
            }
        }
        fs::write(dir.join(DAY_AHEAD_FILE), da).unwrap();
    }

    #[test]
    fn test_full_run_decodes_grid() {
        let tmp = tempdir().unwrap();
        write_inputs(tmp.path());
        let backend = CannedBackend::new(SolveStatus::Solved);
        let schedule = run(
            tmp.path(),
            ScenarioLimits::default(),
            &backend,
            &SolverOptions::default(),
        )
        .unwrap();
        assert_eq!(schedule.day_ahead_shape(), (2, 4));
        assert_eq!(schedule.reserve.level, 0);
        assert_eq!(schedule.reserve.amount, 2.0);
        assert_eq!(schedule.day_ahead[0][0].level, 1);
        assert_eq!(schedule.day_ahead[1][0].amount, 0.5);
        assert_eq!(backend.calls.get(), 1);
    }

    #[test]
    fn test_missing_reserve_file_skips_solve() {
        let tmp = tempdir().unwrap();
        write_inputs(tmp.path());
        fs::remove_file(tmp.path().join(RESERVE_FILE)).unwrap();
        let backend = CannedBackend::new(SolveStatus::Solved);
        let err = run(
            tmp.path(),
            ScenarioLimits::default(),
            &backend,
            &SolverOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, UpsideError::InputNotFound { .. }));
        assert_eq!(backend.calls.get(), 0);
    }

    #[test]
    fn test_infeasible_solve_stops_before_decode() {
        let tmp = tempdir().unwrap();
        write_inputs(tmp.path());
        let backend = CannedBackend::new(SolveStatus::Infeasible);
        let err = run(
            tmp.path(),
            ScenarioLimits::default(),
            &backend,
            &SolverOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, UpsideError::Infeasible { .. }));
        assert_eq!(backend.calls.get(), 1);
    }
}
