//! Parsing of the solution file written by the run script.

use std::collections::BTreeMap;
use upside_core::{ModelVar, SolveStatus, UpsideError, UpsideResult, VariableTable};

/// Status and variable tables read back from the solution file.
#[derive(Debug, Default)]
pub struct ParsedSolution {
    pub status: Option<SolveStatus>,
    pub variables: BTreeMap<ModelVar, VariableTable>,
}

/// Map an AMPL `solve_result` string.
pub fn status_from_solve_result(value: &str) -> SolveStatus {
    match value {
        "solved" => SolveStatus::Solved,
        "solved?" => SolveStatus::SolvedUncertain,
        "limit" => SolveStatus::Limit,
        "infeasible" => SolveStatus::Infeasible,
        "unbounded" => SolveStatus::Unbounded,
        "failure" => SolveStatus::Failure,
        _ => SolveStatus::Unknown,
    }
}

/// Parse `status ...` and `var name[i,j] value` lines.
///
/// Variables outside the decoded set are skipped.
pub fn parse_solution(text: &str) -> UpsideResult<ParsedSolution> {
    let mut status = None;
    let mut entries: BTreeMap<ModelVar, Vec<(Vec<f64>, f64)>> = BTreeMap::new();

    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("status ") {
            status = Some(status_from_solve_result(rest.trim()));
        } else if let Some(rest) = line.strip_prefix("var ") {
            let (name, value) = rest
                .rsplit_once(' ')
                .ok_or_else(|| malformed(n, line, "expected a name and a value"))?;
            let (base, index) = split_name(name.trim()).map_err(|why| malformed(n, line, why))?;
            let Some(var) = ModelVar::from_name(base) else {
                continue;
            };
            let value: f64 = value
                .trim()
                .parse()
                .map_err(|_| malformed(n, line, "value is not a number"))?;
            entries.entry(var).or_default().push((index, value));
        } else {
            return Err(malformed(n, line, "unknown record"));
        }
    }

    Ok(ParsedSolution {
        status,
        variables: entries
            .into_iter()
            .map(|(var, e)| (var, VariableTable::new(e)))
            .collect(),
    })
}

/// Split `d_DA[1,2,3]` into `("d_DA", [1.0, 2.0, 3.0])`; scalars have an empty index.
fn split_name(name: &str) -> Result<(&str, Vec<f64>), &'static str> {
    let Some((base, rest)) = name.split_once('[') else {
        return Ok((name, Vec::new()));
    };
    let inner = rest.strip_suffix(']').ok_or("unterminated subscript")?;
    let index = inner
        .split(',')
        .map(|s| s.trim().parse::<f64>().map_err(|_| "non-numeric subscript"))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((base, index))
}

fn malformed(line_no: usize, line: &str, why: &str) -> UpsideError {
    UpsideError::decode(format!(
        "solution line {}: {why}: '{line}'",
        line_no + 1
    ))
}
