//! Rendering of the AMPL data file and run script.

use std::fmt::Write;
use std::path::Path;
use upside_core::scenario::IndexedTable;
use upside_core::{ModelParam, ModelScenario, ModelSet, SolverOptions};

use crate::{DATA_FILE, SOLUTION_FILE};

/// Render the scenario as an AMPL data section.
pub fn render_data(scenario: &ModelScenario) -> String {
    let mut out = String::from("# generated by upside\n");

    write_set(&mut out, ModelSet::Intervals, &scenario.intervals);
    write_set(&mut out, ModelSet::ReservePrice, scenario.reserve.prices());
    write_set(&mut out, ModelSet::DayAheadPrice, scenario.day_ahead.prices());

    let limits = &scenario.limits;
    for (param, value) in [
        (ModelParam::Cost, limits.cost),
        (ModelParam::Ramp, limits.ramp),
        (ModelParam::RampReserve, limits.ramp_dffr),
        (ModelParam::PowerMax, limits.p_max),
    ] {
        let _ = writeln!(out, "param {param} := {value};");
    }

    write_indexed(&mut out, ModelParam::ReserveWeight, &scenario.reserve.weights());
    write_indexed(
        &mut out,
        ModelParam::DayAheadWeight,
        &scenario.day_ahead.weights(),
    );

    write_table(&mut out, &scenario.reserve_table);
    write_table(&mut out, &scenario.day_ahead_table);
    out
}

fn write_set(out: &mut String, set: ModelSet, members: &[f64]) {
    let _ = write!(out, "set {set} :=");
    for m in members {
        let _ = write!(out, " {m}");
    }
    out.push_str(";\n");
}

fn write_indexed(out: &mut String, param: ModelParam, entries: &[(f64, f64)]) {
    let _ = writeln!(out, "param {param} :=");
    for (key, value) in entries {
        let _ = writeln!(out, "  {key} {value}");
    }
    out.push_str(";\n");
}

/// Tabular `param: A B := k v v ...;` form; tables without value columns emit nothing.
fn write_table(out: &mut String, table: &IndexedTable) {
    if !table.has_values() {
        return;
    }
    let _ = writeln!(out, "param: {} :=", table.value_columns.join(" "));
    for (key, values) in &table.rows {
        out.push(' ');
        for v in key.iter().chain(values) {
            let _ = write!(out, " {v}");
        }
        out.push('\n');
    }
    out.push_str(";\n");
}

/// Render the command script that loads, solves and dumps the solution.
///
/// The script writes `status <solve_result>` and then one
/// `var <name> <value>` line per declared variable into [`SOLUTION_FILE`].
/// The dump walks `_nvars`, the model's own variable list, so instances
/// that presolve fixed or removed are still reported.
pub fn render_run_script(model_path: &Path, options: &SolverOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "reset;");
    let _ = writeln!(out, "model {};", quote(&model_path.to_string_lossy()));
    let _ = writeln!(out, "data {};", quote(DATA_FILE));
    for (key, value) in options.entries() {
        let _ = writeln!(out, "option {key} {};", quote(&value));
    }
    let _ = writeln!(out, "solve;");
    let file = quote(SOLUTION_FILE);
    let _ = writeln!(out, "printf \"status %s\\n\", solve_result > {file};");
    let _ = writeln!(out, "for {{j in 1.._nvars}} {{");
    let _ = writeln!(
        out,
        "  printf \"var %s %.17g\\n\", _varname[j], _var[j] > {file};"
    );
    let _ = writeln!(out, "}}");
    let _ = writeln!(out, "close {file};");
    out
}

/// AMPL single-quoted string literal.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
