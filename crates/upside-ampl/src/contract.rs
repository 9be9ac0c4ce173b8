//! Checks that a model file declares every entity the pipeline touches.

use std::collections::HashSet;
use std::path::Path;
use upside_core::scenario::IndexedTable;
use upside_core::{ModelParam, ModelScenario, ModelSet, ModelVar, UpsideError, UpsideResult};

/// Declarations found in an AMPL model file.
#[derive(Debug, Default)]
pub struct ModelContract {
    sets: HashSet<String>,
    params: HashSet<String>,
    vars: HashSet<String>,
}

impl ModelContract {
    /// Scan model source for `set`, `param` and `var` declarations.
    pub fn scan(source: &str) -> Self {
        let stripped = strip_comments(source);
        let mut contract = ModelContract::default();
        let mut tokens = identifiers(&stripped).peekable();
        while let Some(token) = tokens.next() {
            let bucket = match token {
                "set" => &mut contract.sets,
                "param" => &mut contract.params,
                "var" => &mut contract.vars,
                _ => continue,
            };
            if let Some(name) = tokens.peek() {
                bucket.insert(name.to_string());
            }
        }
        contract
    }

    /// Fail on the first missing declaration.
    ///
    /// Sets and params are inputs to the model, so a gap there is an input
    /// format problem; a missing variable could never be decoded.
    pub fn verify(&self, model_path: &Path) -> UpsideResult<()> {
        for set in ModelSet::all() {
            if !self.sets.contains(set.as_str()) {
                return Err(UpsideError::format(
                    model_path,
                    format!("model does not declare set {set}"),
                ));
            }
        }
        for param in ModelParam::all() {
            if !self.params.contains(param.as_str()) {
                return Err(UpsideError::format(
                    model_path,
                    format!("model does not declare param {param}"),
                ));
            }
        }
        for var in ModelVar::all() {
            if !self.vars.contains(var.as_str()) {
                return Err(UpsideError::decode(format!(
                    "model {} does not declare var {var}",
                    model_path.display()
                )));
            }
        }
        Ok(())
    }

    fn declares_param(&self, name: &str) -> bool {
        self.params.contains(name)
    }

    /// Every extra CSV column becomes a tabular param, so each must be
    /// declared by the model.
    pub fn verify_scenario(&self, scenario: &ModelScenario) -> UpsideResult<()> {
        self.verify_table(&scenario.reserve_table)?;
        self.verify_table(&scenario.day_ahead_table)
    }

    fn verify_table(&self, table: &IndexedTable) -> UpsideResult<()> {
        match table
            .value_columns
            .iter()
            .find(|column| !self.declares_param(column))
        {
            Some(column) => Err(UpsideError::scenario(
                &table.source,
                format!("column '{column}' is not a param declared by the model"),
            )),
            None => Ok(()),
        }
    }
}

/// Drop `# ...` line comments and `/* ... */` block comments.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '#' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

fn identifiers(source: &str) -> impl Iterator<Item = &str> {
    source
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"
# two markets
set INTERVALS ordered;
set DFFR_PRICE;
set DA_PRICE;
param Cost;   param Ramp; param Ramp_DFFR;
param P_MAX >= 0;
param p_R{DFFR_PRICE};
param p_DA {DA_PRICE};
/* decision variables
   var unused; */
var d_R {1..card(DFFR_PRICE)} binary;
var d_DA{1..card(DFFR_PRICE), 1..card(DA_PRICE), INTERVALS} binary;
var q_R {1..card(DFFR_PRICE)} >= 0;
var q_DA{1..card(DFFR_PRICE), 1..card(DA_PRICE), INTERVALS} >= 0;
var Q_R {DFFR_PRICE} >= 0;
var Q_DA {DA_PRICE, INTERVALS} >= 0;
"#;

    #[test]
    fn test_full_model_passes() {
        let contract = ModelContract::scan(MODEL);
        contract.verify(Path::new("two_markets.mod")).unwrap();
        assert!(!contract.vars.contains("unused"));
    }

    #[test]
    fn test_missing_param_is_format_error() {
        let model = MODEL.replace("param P_MAX >= 0;", "");
        let err = ModelContract::scan(&model)
            .verify(Path::new("two_markets.mod"))
            .unwrap_err();
        assert!(matches!(err, UpsideError::InputFormat { .. }));
        assert!(err.to_string().contains("P_MAX"));
    }

    fn scenario(dffr: &str) -> ModelScenario {
        use upside_core::{MarketInputs, NumericTable, ScenarioLimits};
        let table = |name: &str, csv: &str| NumericTable::from_reader(name, csv.as_bytes()).unwrap();
        let inputs = MarketInputs {
            intervals: table("intervals.csv", "INTERVALS\n1\n2\n"),
            reserve: table("dffr.csv", dffr),
            day_ahead: table("da.csv", "DA_PRICE,INTERVALS\n5,1\n15,2\n"),
        };
        ModelScenario::build(&inputs, ScenarioLimits::default()).unwrap()
    }

    #[test]
    fn test_undeclared_extra_column_is_format_error() {
        let contract = ModelContract::scan(MODEL);
        let err = contract
            .verify_scenario(&scenario("DFFR_PRICE,VOLUME\n10,1.5\n20,2\n"))
            .unwrap_err();
        assert!(matches!(err, UpsideError::InputFormat { .. }));
        assert!(err.to_string().contains("VOLUME"));
        assert!(err.to_string().contains("dffr.csv"));
    }

    #[test]
    fn test_declared_extra_column_passes() {
        let model = format!("{MODEL}param VOLUME {{DFFR_PRICE}};\n");
        let contract = ModelContract::scan(&model);
        contract
            .verify_scenario(&scenario("DFFR_PRICE,VOLUME\n10,1.5\n20,2\n"))
            .unwrap();
        contract
            .verify_scenario(&scenario("DFFR_PRICE\n10\n20\n"))
            .unwrap();
    }

    #[test]
    fn test_commented_out_var_is_decode_error() {
        let model = MODEL.replace("var Q_R {DFFR_PRICE} >= 0;", "# var Q_R {DFFR_PRICE} >= 0;");
        let err = ModelContract::scan(&model)
            .verify(Path::new("two_markets.mod"))
            .unwrap_err();
        assert!(matches!(err, UpsideError::Decode(_)));
        assert!(err.to_string().contains("Q_R"));
    }
}
