//! Fixed-width text report of a bid schedule.
//!
//! Levels are printed 1-based; the schedule itself stores them 0-based.

use crate::decode::{AcceptedBid, BidSchedule};
use crate::names::ModelVar;
use std::fmt::Write;

/// Render the report printed on stdout.
pub fn render(schedule: &BidSchedule, show_accepted: bool) -> String {
    let mut out = String::new();

    out.push_str("\n- DFFR\n");
    let _ = writeln!(
        out,
        "bid level: {:2}, bid amount: {:6.2}",
        schedule.reserve.level + 1,
        schedule.reserve.amount
    );

    out.push_str("\n- DA\n");
    let _ = writeln!(
        out,
        "{:>6} {:>6} {:>11} {:>11}",
        "DFFR", "time", "bid level", "bid amount"
    );
    for (i, row) in schedule.day_ahead.iter().enumerate() {
        for (t, bid) in row.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:6} {:6} {:11} {:11.2}",
                i + 1,
                t + 1,
                bid.level + 1,
                bid.amount
            );
        }
    }

    if show_accepted {
        out.push_str("\n- Accepted bid in DFFR\n");
        render_accepted(&mut out, ModelVar::ReserveAccepted, &schedule.accepted_reserve);
        out.push_str("\n- Accepted bid in DA\n");
        render_accepted(
            &mut out,
            ModelVar::DayAheadAccepted,
            &schedule.accepted_day_ahead,
        );
    }

    out
}

fn render_accepted(out: &mut String, var: ModelVar, bids: &[AcceptedBid]) {
    if bids.is_empty() {
        out.push_str("(none)\n");
        return;
    }
    for bid in bids {
        let index = bid
            .index
            .iter()
            .map(f64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(out, "{var}[{index}] {:11.4}", bid.amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::Bid;

    fn schedule() -> BidSchedule {
        BidSchedule {
            reserve: Bid {
                level: 1,
                amount: 1.5,
            },
            day_ahead: vec![
                vec![
                    Bid {
                        level: 0,
                        amount: 0.25,
                    },
                    Bid::default(),
                ],
                vec![
                    Bid::default(),
                    Bid {
                        level: 2,
                        amount: 2.0,
                    },
                ],
            ],
            accepted_reserve: vec![AcceptedBid {
                index: vec![2.0],
                amount: 1.5,
            }],
            accepted_day_ahead: vec![],
        }
    }

    #[test]
    fn test_render_fixed_widths() {
        let text = render(&schedule(), false);
        let expected = "\n- DFFR\n\
                        bid level:  2, bid amount:   1.50\n\
                        \n- DA\n  \
                        DFFR   time   bid level  bid amount\n     \
                        1      1           1        0.25\n     \
                        1      2           1        0.00\n     \
                        2      1           1        0.00\n     \
                        2      2           3        2.00\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_accepted_sections() {
        let text = render(&schedule(), true);
        assert!(text.contains("- Accepted bid in DFFR\nQ_R[2]      1.5000\n"));
        assert!(text.contains("- Accepted bid in DA\n(none)\n"));
    }
}
