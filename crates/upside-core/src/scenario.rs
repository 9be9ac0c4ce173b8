//! Scenario building: turns the loaded tables into model sets and params.
//!
//! Prices repeated in a source column collapse into one ladder entry, and
//! every distinct price gets the same probability weight.

use crate::error::{UpsideError, UpsideResult};
use crate::inputs::{
    MarketInputs, NumericTable, DAY_AHEAD_INTERVAL_COLUMN, DAY_AHEAD_PRICE_COLUMN,
    RESERVE_PRICE_COLUMN,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::{debug, info};

/// Scalar limits handed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioLimits {
    /// Operating cost.
    pub cost: f64,
    /// Day-ahead ramp rate; large enough to be non-binding.
    pub ramp: f64,
    /// Reserve ramp rate; large enough to be non-binding.
    pub ramp_dffr: f64,
    /// Maximum power.
    pub p_max: f64,
}

impl Default for ScenarioLimits {
    fn default() -> Self {
        Self {
            cost: 0.0,
            ramp: 999_999.0,
            ramp_dffr: 9_999_999.0,
            p_max: 2.0,
        }
    }
}

/// Distinct prices in first-appearance order.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceLadder {
    prices: Vec<f64>,
}

impl PriceLadder {
    pub fn from_series(values: &[f64]) -> Self {
        let mut seen = HashSet::new();
        let prices = values
            .iter()
            .copied()
            .filter(|v| seen.insert(key_bits(*v)))
            .collect();
        Self { prices }
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Uniform weight shared by every distinct price.
    pub fn weight(&self) -> f64 {
        1.0 / self.prices.len() as f64
    }

    /// `(price, weight)` pairs in ladder order.
    pub fn weights(&self) -> Vec<(f64, f64)> {
        let weight = self.weight();
        self.prices.iter().map(|&p| (p, weight)).collect()
    }
}

/// A table keyed by one or more columns, with the remaining columns as values.
///
/// Keys are unique; rows repeating a key with identical values are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedTable {
    /// File the rows were read from.
    pub source: PathBuf,
    pub key_columns: Vec<String>,
    pub value_columns: Vec<String>,
    pub rows: Vec<(Vec<f64>, Vec<f64>)>,
}

impl IndexedTable {
    pub fn from_table(table: &NumericTable, keys: &[&str]) -> UpsideResult<Self> {
        let key_idx = keys
            .iter()
            .map(|k| table.column_index(k))
            .collect::<UpsideResult<Vec<_>>>()?;
        let value_idx: Vec<usize> = (0..table.columns().len())
            .filter(|i| !key_idx.contains(i))
            .collect();

        let mut positions: HashMap<Vec<u64>, usize> = HashMap::new();
        let mut rows: Vec<(Vec<f64>, Vec<f64>)> = Vec::new();
        for row in table.rows() {
            let key: Vec<f64> = key_idx.iter().map(|&i| row[i]).collect();
            let values: Vec<f64> = value_idx.iter().map(|&i| row[i]).collect();
            let bits = key.iter().map(|v| key_bits(*v)).collect::<Vec<_>>();
            match positions.get(&bits).copied() {
                Some(pos) if rows[pos].1 == values => {}
                Some(_) => {
                    return Err(UpsideError::scenario(
                        table.source(),
                        format!("conflicting values for repeated key {key:?}"),
                    ))
                }
                None => {
                    positions.insert(bits, rows.len());
                    rows.push((key, values));
                }
            }
        }

        Ok(Self {
            source: table.source().to_path_buf(),
            key_columns: keys.iter().map(|k| k.to_string()).collect(),
            value_columns: value_idx
                .iter()
                .map(|&i| table.columns()[i].clone())
                .collect(),
            rows,
        })
    }

    /// True when the table carries no parameter columns beyond its keys.
    pub fn has_values(&self) -> bool {
        !self.value_columns.is_empty()
    }
}

/// Set sizes fixed for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinalities {
    pub intervals: usize,
    pub reserve_prices: usize,
    pub day_ahead_prices: usize,
}

/// Every set and parameter handed to the model for one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelScenario {
    pub intervals: Vec<f64>,
    pub reserve: PriceLadder,
    pub day_ahead: PriceLadder,
    pub reserve_table: IndexedTable,
    pub day_ahead_table: IndexedTable,
    pub limits: ScenarioLimits,
}

impl ModelScenario {
    pub fn build(inputs: &MarketInputs, limits: ScenarioLimits) -> UpsideResult<Self> {
        let intervals = inputs.intervals.column_at(0);
        let mut seen = HashSet::new();
        if let Some(dup) = intervals.iter().find(|v| !seen.insert(key_bits(**v))) {
            return Err(UpsideError::scenario(
                inputs.intervals.source(),
                format!("duplicate interval {dup}"),
            ));
        }

        let reserve = PriceLadder::from_series(&inputs.reserve.column(RESERVE_PRICE_COLUMN)?);
        let day_ahead =
            PriceLadder::from_series(&inputs.day_ahead.column(DAY_AHEAD_PRICE_COLUMN)?);

        for t in inputs.day_ahead.column(DAY_AHEAD_INTERVAL_COLUMN)? {
            if !seen.contains(&key_bits(t)) {
                return Err(UpsideError::scenario(
                    inputs.day_ahead.source(),
                    format!("interval {t} is not listed in intervals"),
                ));
            }
        }

        let reserve_table = IndexedTable::from_table(&inputs.reserve, &[RESERVE_PRICE_COLUMN])?;
        let day_ahead_table = IndexedTable::from_table(
            &inputs.day_ahead,
            &[DAY_AHEAD_PRICE_COLUMN, DAY_AHEAD_INTERVAL_COLUMN],
        )?;

        info!(
            "Built scenario: {} intervals, {} reserve prices, {} day-ahead prices",
            intervals.len(),
            reserve.len(),
            day_ahead.len()
        );
        debug!(
            "Reserve weight {:.6}, day-ahead weight {:.6}",
            reserve.weight(),
            day_ahead.weight()
        );

        Ok(Self {
            intervals,
            reserve,
            day_ahead,
            reserve_table,
            day_ahead_table,
            limits,
        })
    }

    pub fn cardinalities(&self) -> Cardinalities {
        Cardinalities {
            intervals: self.intervals.len(),
            reserve_prices: self.reserve.len(),
            day_ahead_prices: self.day_ahead.len(),
        }
    }
}

/// Hashable identity of a float; `-0.0` and `0.0` are the same key.
fn key_bits(v: f64) -> u64 {
    if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, csv: &str) -> NumericTable {
        NumericTable::from_reader(name, csv.as_bytes()).unwrap()
    }

    fn inputs(dffr: &str, da: &str) -> MarketInputs {
        MarketInputs {
            intervals: table("intervals.csv", "INTERVALS\n1\n2\n3\n4\n"),
            reserve: table("dffr.csv", dffr),
            day_ahead: table("da.csv", da),
        }
    }

    const DA_2X4: &str = "DA_PRICE,INTERVALS\n5,1\n5,2\n5,3\n5,4\n15,1\n15,2\n15,3\n15,4\n";

    #[test]
    fn test_repeated_reserve_price_shares_weight() {
        let scenario =
            ModelScenario::build(&inputs("DFFR_PRICE\n10\n10\n20\n", DA_2X4), Default::default())
                .unwrap();
        assert_eq!(scenario.reserve.prices(), &[10.0, 20.0]);
        assert_eq!(scenario.reserve.weights(), vec![(10.0, 0.5), (20.0, 0.5)]);
        let total: f64 = scenario.reserve.weights().iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weights_sum_to_one_for_odd_ladder() {
        let ladder = PriceLadder::from_series(&[3.0, 1.0, 3.0, 2.0, 1.0, 2.0, 2.0]);
        assert_eq!(ladder.len(), 3);
        let total: f64 = ladder.weights().iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!((ladder.weight() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_day_ahead_ladder_and_cardinalities() {
        let scenario =
            ModelScenario::build(&inputs("DFFR_PRICE\n10\n10\n20\n", DA_2X4), Default::default())
                .unwrap();
        assert_eq!(scenario.day_ahead.prices(), &[5.0, 15.0]);
        assert_eq!(scenario.day_ahead.weight(), 0.5);
        assert_eq!(
            scenario.cardinalities(),
            Cardinalities {
                intervals: 4,
                reserve_prices: 2,
                day_ahead_prices: 2,
            }
        );
        assert_eq!(scenario.day_ahead_table.rows.len(), 8);
        assert!(!scenario.day_ahead_table.has_values());
    }

    #[test]
    fn test_extra_columns_become_indexed_values() {
        let scenario = ModelScenario::build(
            &inputs("DFFR_PRICE,VOLUME\n10,1.5\n10,1.5\n20,2.5\n", DA_2X4),
            Default::default(),
        )
        .unwrap();
        assert_eq!(scenario.reserve_table.value_columns, vec!["VOLUME"]);
        assert_eq!(
            scenario.reserve_table.rows,
            vec![(vec![10.0], vec![1.5]), (vec![20.0], vec![2.5])]
        );
    }

    #[test]
    fn test_conflicting_repeated_key_is_rejected() {
        let err = ModelScenario::build(
            &inputs("DFFR_PRICE,VOLUME\n10,1.5\n10,2.0\n", DA_2X4),
            Default::default(),
        )
        .unwrap_err();
        assert!(matches!(err, UpsideError::InputFormat { .. }));
        assert_eq!(err.stage(), crate::error::Stage::Build);
    }

    #[test]
    fn test_unknown_day_ahead_interval_is_rejected() {
        let err = ModelScenario::build(
            &inputs("DFFR_PRICE\n10\n", "DA_PRICE,INTERVALS\n5,1\n5,9\n"),
            Default::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("interval 9"));
    }

    #[test]
    fn test_duplicate_interval_is_rejected() {
        let mut inputs = inputs("DFFR_PRICE\n10\n", DA_2X4);
        inputs.intervals = table("intervals.csv", "INTERVALS\n1\n1\n");
        let err = ModelScenario::build(&inputs, Default::default()).unwrap_err();
        assert!(err.to_string().contains("duplicate interval"));
    }

    #[test]
    fn test_default_limits() {
        let limits = ScenarioLimits::default();
        assert_eq!(limits.cost, 0.0);
        assert_eq!(limits.ramp, 999_999.0);
        assert_eq!(limits.ramp_dffr, 9_999_999.0);
        assert_eq!(limits.p_max, 2.0);
    }
}
