//! Versioned owner's policy rate schedules
//!
//! A `RateSchedule` holds the three pricing regions of a promulgated rate
//! rule: the flat minimum, the $500 bracket table, and the tier formulas.
//! Schedules are immutable once built; the built-in 2019-09-01 schedule is
//! constructed once per process.

mod brackets;
mod tiers;
pub mod texas_2019;
pub mod loader;
pub mod registry;

use std::sync::{Arc, OnceLock};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

pub use brackets::{BracketTable, BRACKET_INCREMENT};
pub use tiers::{Tier, TierList};
pub use loader::{load_schedule_csv, load_schedule_from_reader, load_schedule_json, write_schedule_csv};
pub use registry::ScheduleRegistry;

/// Largest premium drift tolerated between adjacent regions (one cent)
const CONTINUITY_TOLERANCE: f64 = 0.01;

/// Complete rate schedule for one effective date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSchedule {
    /// Date the promulgated rates took effect
    pub effective_date: NaiveDate,

    /// Premium for any amount at or below `minimum_policy_amount`
    pub minimum_premium: f64,

    /// Threshold for the minimum premium
    pub minimum_policy_amount: u64,

    /// $500 brackets above the minimum threshold
    pub bracket_table: BracketTable,

    /// Formula tiers above the bracket table
    pub tier_list: TierList,
}

impl RateSchedule {
    /// Upper bound of the bracket table; tier formulas apply above it
    pub fn table_upper_bound(&self) -> u64 {
        self.bracket_table.upper_bound()
    }

    /// Check every structural invariant of the schedule
    pub fn validate(&self) -> Result<(), ScheduleError> {
        self.validate_brackets()?;
        self.validate_tiers()
    }

    fn validate_brackets(&self) -> Result<(), ScheduleError> {
        let entries = self.bracket_table.entries();
        let (first, _) = *entries.first().ok_or(ScheduleError::EmptyBracketTable)?;

        let expected_start = self.minimum_policy_amount + BRACKET_INCREMENT;
        if first != expected_start {
            return Err(ScheduleError::BracketStart {
                expected: expected_start,
                found: first,
            });
        }

        let mut previous: Option<(u64, f64)> = None;
        for &(breakpoint, premium) in entries {
            if breakpoint % BRACKET_INCREMENT != 0 {
                return Err(ScheduleError::MisalignedBreakpoint {
                    breakpoint,
                    increment: BRACKET_INCREMENT,
                });
            }
            let floor_premium = match previous {
                Some((prev_breakpoint, prev_premium)) => {
                    if breakpoint <= prev_breakpoint {
                        return Err(ScheduleError::UnorderedBreakpoints {
                            previous: prev_breakpoint,
                            found: breakpoint,
                        });
                    }
                    let expected = prev_breakpoint + BRACKET_INCREMENT;
                    if breakpoint != expected {
                        return Err(ScheduleError::BracketGap {
                            previous: prev_breakpoint,
                            expected,
                            found: breakpoint,
                        });
                    }
                    prev_premium
                }
                None => self.minimum_premium,
            };
            // Negated so a NaN premium is rejected too
            if !(premium >= floor_premium) {
                return Err(ScheduleError::DecreasingPremium { breakpoint });
            }
            previous = Some((breakpoint, premium));
        }
        Ok(())
    }

    fn validate_tiers(&self) -> Result<(), ScheduleError> {
        let tiers = self.tier_list.tiers();
        if tiers.is_empty() {
            return Err(ScheduleError::EmptyTierList);
        }

        let mut expected_floor = self.table_upper_bound() as f64;
        let mut expected_base = self.bracket_table.top_premium().unwrap_or(self.minimum_premium);

        for (index, tier) in tiers.iter().enumerate() {
            if tier.floor != expected_floor {
                return Err(ScheduleError::TierGap {
                    index,
                    expected: expected_floor,
                    found: tier.floor,
                });
            }
            if !((tier.base_premium - expected_base).abs() <= CONTINUITY_TOLERANCE) {
                return Err(ScheduleError::TierDiscontinuity {
                    index,
                    expected: expected_base,
                    found: tier.base_premium,
                });
            }
            if !(tier.marginal_rate.is_finite() && tier.marginal_rate >= 0.0) {
                return Err(ScheduleError::InvalidRate {
                    index,
                    rate: tier.marginal_rate,
                });
            }
            if !tier.is_unbounded() && !(tier.ceiling.is_finite() && tier.ceiling > tier.floor) {
                return Err(ScheduleError::InvalidCeiling {
                    index,
                    floor: tier.floor,
                    ceiling: tier.ceiling,
                });
            }
            let is_last = index + 1 == tiers.len();
            if tier.is_unbounded() && !is_last {
                return Err(ScheduleError::UnboundedTierNotLast { index });
            }
            if !tier.is_unbounded() {
                expected_floor = tier.ceiling;
                expected_base = tier.premium(tier.ceiling);
            }
        }

        if tiers.last().is_some_and(|t| !t.is_unbounded()) {
            return Err(ScheduleError::FiniteLastTier);
        }
        Ok(())
    }
}

/// The built-in schedule, constructed on first use
pub fn builtin_schedule() -> Arc<RateSchedule> {
    static BUILTIN: OnceLock<Arc<RateSchedule>> = OnceLock::new();
    BUILTIN
        .get_or_init(|| Arc::new(texas_2019::schedule()))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RateSchedule {
        texas_2019::schedule()
    }

    #[test]
    fn test_builtin_is_shared() {
        let a = builtin_schedule();
        let b = builtin_schedule();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.table_upper_bound(), 100_000);
    }

    #[test]
    fn test_rejects_empty_brackets() {
        let mut schedule = valid();
        schedule.bracket_table = BracketTable::from_entries(&[]);
        assert!(matches!(schedule.validate(), Err(ScheduleError::EmptyBracketTable)));
    }

    #[test]
    fn test_rejects_wrong_bracket_start() {
        let mut schedule = valid();
        schedule.minimum_policy_amount = 20_000;
        assert!(matches!(
            schedule.validate(),
            Err(ScheduleError::BracketStart { expected: 20_500, found: 25_500 })
        ));
    }

    #[test]
    fn test_rejects_misaligned_breakpoint() {
        let mut schedule = valid();
        let mut entries = schedule.bracket_table.entries().to_vec();
        entries[3].0 += 250;
        schedule.bracket_table = BracketTable::from_entries(&entries);
        assert!(matches!(schedule.validate(), Err(ScheduleError::MisalignedBreakpoint { .. })));
    }

    #[test]
    fn test_rejects_unordered_breakpoints() {
        let mut schedule = valid();
        let mut entries = schedule.bracket_table.entries().to_vec();
        entries[5].0 = entries[4].0;
        schedule.bracket_table = BracketTable::from_entries(&entries);
        assert!(matches!(schedule.validate(), Err(ScheduleError::UnorderedBreakpoints { .. })));
    }

    #[test]
    fn test_rejects_missing_bracket() {
        let mut schedule = valid();
        let entries: Vec<(u64, f64)> = schedule
            .bracket_table
            .entries()
            .iter()
            .copied()
            .filter(|(b, _)| *b != 30_000)
            .collect();
        schedule.bracket_table = BracketTable::from_entries(&entries);
        assert!(matches!(
            schedule.validate(),
            Err(ScheduleError::BracketGap { previous: 29_500, expected: 30_000, found: 30_500 })
        ));
    }

    #[test]
    fn test_rejects_nan_bracket_premium() {
        let mut schedule = valid();
        let mut entries = schedule.bracket_table.entries().to_vec();
        entries[7].1 = f64::NAN;
        schedule.bracket_table = BracketTable::from_entries(&entries);
        assert!(matches!(schedule.validate(), Err(ScheduleError::DecreasingPremium { .. })));
    }

    #[test]
    fn test_rejects_decreasing_premium() {
        let mut schedule = valid();
        let mut entries = schedule.bracket_table.entries().to_vec();
        entries[10].1 = 1.0;
        schedule.bracket_table = BracketTable::from_entries(&entries);
        assert!(matches!(schedule.validate(), Err(ScheduleError::DecreasingPremium { .. })));
    }

    #[test]
    fn test_rejects_tier_gap() {
        let mut schedule = valid();
        let mut tiers = schedule.tier_list.tiers().to_vec();
        tiers[2].floor = 6_000_000.0;
        schedule.tier_list = TierList::from_tiers(&tiers);
        assert!(matches!(schedule.validate(), Err(ScheduleError::TierGap { index: 2, .. })));
    }

    #[test]
    fn test_rejects_discontinuous_base() {
        let mut schedule = valid();
        let mut tiers = schedule.tier_list.tiers().to_vec();
        tiers[1].base_premium = 6_000.0;
        schedule.tier_list = TierList::from_tiers(&tiers);
        assert!(matches!(
            schedule.validate(),
            Err(ScheduleError::TierDiscontinuity { index: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_finite_last_tier() {
        let mut schedule = valid();
        let mut tiers = schedule.tier_list.tiers().to_vec();
        tiers.pop();
        schedule.tier_list = TierList::from_tiers(&tiers);
        assert!(matches!(schedule.validate(), Err(ScheduleError::FiniteLastTier)));
    }

    #[test]
    fn test_rejects_unbounded_middle_tier() {
        let mut schedule = valid();
        let mut tiers = schedule.tier_list.tiers().to_vec();
        tiers[0].ceiling = f64::INFINITY;
        schedule.tier_list = TierList::from_tiers(&tiers[..2]);
        assert!(matches!(
            schedule.validate(),
            Err(ScheduleError::UnboundedTierNotLast { index: 0 })
        ));
    }

    #[test]
    fn test_rejects_negative_rate() {
        let mut schedule = valid();
        let mut tiers = schedule.tier_list.tiers().to_vec();
        tiers[6].marginal_rate = -0.00124;
        schedule.tier_list = TierList::from_tiers(&tiers);
        assert!(matches!(schedule.validate(), Err(ScheduleError::InvalidRate { index: 6, .. })));

        tiers[6].marginal_rate = f64::NAN;
        schedule.tier_list = TierList::from_tiers(&tiers);
        assert!(matches!(schedule.validate(), Err(ScheduleError::InvalidRate { index: 6, .. })));
    }

    #[test]
    fn test_rejects_ceiling_not_above_floor() {
        let mut schedule = valid();
        schedule.tier_list = TierList::from_tiers(&[
            Tier::new(100_000.0, 100_000.0, 832.0, 0.00527),
            Tier::new(100_000.0, f64::INFINITY, 832.0, 0.00527),
        ]);
        assert!(matches!(
            schedule.validate(),
            Err(ScheduleError::InvalidCeiling { index: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_negative_infinite_ceiling() {
        let mut schedule = valid();
        let mut tiers = schedule.tier_list.tiers().to_vec();
        tiers[6].ceiling = f64::NEG_INFINITY;
        schedule.tier_list = TierList::from_tiers(&tiers);
        assert!(matches!(
            schedule.validate(),
            Err(ScheduleError::InvalidCeiling { index: 6, .. })
        ));
    }

    #[test]
    fn test_rejects_empty_tiers() {
        let mut schedule = valid();
        schedule.tier_list = TierList::from_tiers(&[]);
        assert!(matches!(schedule.validate(), Err(ScheduleError::EmptyTierList)));
    }
}
