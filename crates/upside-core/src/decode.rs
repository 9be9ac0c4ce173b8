//! Result decoding: solved variable tables to a bid schedule.
//!
//! The modeling system indexes levels, ranks and intervals from 1. All
//! conversion to 0-based positions goes through [`rebase`], and only this
//! module calls it.

use crate::error::{UpsideError, UpsideResult};
use crate::names::ModelVar;
use crate::scenario::Cardinalities;
use crate::solution::{SolvedModel, VariableTable};
use tracing::{debug, info, warn};

/// Quantities at or below this are solver noise and count as zero.
pub const QUANTITY_THRESHOLD: f64 = 1e-5;

/// Tolerance when testing a binary indicator for 1.
pub const INDICATOR_TOLERANCE: f64 = 1e-5;

/// A bid: 0-based level in its price ladder and the committed amount.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bid {
    pub level: usize,
    pub amount: f64,
}

/// A variable entry kept verbatim for the accepted-bid listing.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedBid {
    pub index: Vec<f64>,
    pub amount: f64,
}

/// Decoded solution.
#[derive(Debug, Clone, PartialEq)]
pub struct BidSchedule {
    pub reserve: Bid,
    /// Day-ahead bids, `[reserve price rank][interval]`, both 0-based.
    pub day_ahead: Vec<Vec<Bid>>,
    pub accepted_reserve: Vec<AcceptedBid>,
    pub accepted_day_ahead: Vec<AcceptedBid>,
}

impl BidSchedule {
    /// `(reserve price ranks, intervals)`.
    pub fn day_ahead_shape(&self) -> (usize, usize) {
        (
            self.day_ahead.len(),
            self.day_ahead.first().map_or(0, Vec::len),
        )
    }
}

/// Convert a 1-based index from the modeling system into a 0-based position.
///
/// Fails unless `external` is an integer in `1..=cardinality`.
pub fn rebase(external: f64, cardinality: usize, what: &str) -> UpsideResult<usize> {
    if external.fract() != 0.0 || external < 1.0 || external > cardinality as f64 {
        return Err(UpsideError::decode(format!(
            "{what} index {external} is outside 1..={cardinality}"
        )));
    }
    Ok(external as usize - 1)
}

/// Decode the bid schedule from a solved model.
///
/// This only reads `solved`, so decoding the same tables twice gives the
/// same schedule.
pub fn decode(solved: &SolvedModel, dims: &Cardinalities) -> UpsideResult<BidSchedule> {
    let d_r = solved.variable(ModelVar::ReserveLevel)?;
    let d_da = solved.variable(ModelVar::DayAheadLevel)?;
    let q_r = solved.variable(ModelVar::ReserveAmount)?;
    let q_da = solved.variable(ModelVar::DayAheadAmount)?;
    let accepted_r = solved.variable(ModelVar::ReserveAccepted)?;
    let accepted_da = solved.variable(ModelVar::DayAheadAccepted)?;

    let reserve = Bid {
        level: reserve_level(d_r, dims)?,
        amount: q_r.sum(),
    };

    let mut day_ahead = vec![vec![Bid::default(); dims.intervals]; dims.reserve_prices];
    for (index, _) in d_da.iter() {
        let [rank, level, interval] = index else {
            return Err(UpsideError::decode(format!(
                "{} index {index:?} should have 3 components",
                ModelVar::DayAheadLevel
            )));
        };
        let row = rebase(*rank, dims.reserve_prices, "reserve price rank")?;
        let level = rebase(*level, dims.day_ahead_prices, "day-ahead level")?;
        let col = rebase(*interval, dims.intervals, "interval")?;

        let amount = q_da.get(index).ok_or_else(|| {
            UpsideError::decode(format!(
                "{} has no entry for index {index:?}",
                ModelVar::DayAheadAmount
            ))
        })?;
        if amount > QUANTITY_THRESHOLD {
            if day_ahead[row][col].amount > 0.0 {
                warn!(
                    "Several day-ahead levels accepted for rank {} interval {}; keeping level {}",
                    row + 1,
                    col + 1,
                    level + 1
                );
            }
            day_ahead[row][col] = Bid { level, amount };
        }
    }

    let schedule = BidSchedule {
        reserve,
        day_ahead,
        accepted_reserve: accepted(accepted_r),
        accepted_day_ahead: accepted(accepted_da),
    };
    let (rows, cols) = schedule.day_ahead_shape();
    info!(
        "Decoded schedule: reserve level {}, {rows}x{cols} day-ahead grid",
        schedule.reserve.level + 1
    );
    Ok(schedule)
}

/// The level is the `d_R` subscript of the set entry, not its row position;
/// the two agree because `d_R` is indexed `1..card(DFFR_PRICE)`.
fn reserve_level(d_r: &VariableTable, dims: &Cardinalities) -> UpsideResult<usize> {
    let selected: Vec<&[f64]> = d_r
        .iter()
        .filter(|(_, v)| (v - 1.0).abs() <= INDICATOR_TOLERANCE)
        .map(|(idx, _)| idx)
        .collect();
    debug!("{} entries of {} are set", selected.len(), ModelVar::ReserveLevel);

    match selected.as_slice() {
        [[level]] => rebase(*level, dims.reserve_prices, "reserve level"),
        [index] => Err(UpsideError::decode(format!(
            "{} index {index:?} should have 1 component",
            ModelVar::ReserveLevel
        ))),
        [] => Err(UpsideError::decode(format!(
            "no {} entry equals 1",
            ModelVar::ReserveLevel
        ))),
        many => Err(UpsideError::decode(format!(
            "{} {} entries equal 1, expected exactly one",
            many.len(),
            ModelVar::ReserveLevel
        ))),
    }
}

fn accepted(table: &VariableTable) -> Vec<AcceptedBid> {
    table
        .iter()
        .filter(|(_, v)| *v >= QUANTITY_THRESHOLD)
        .map(|(idx, amount)| AcceptedBid {
            index: idx.to_vec(),
            amount,
        })
        .collect()
}
