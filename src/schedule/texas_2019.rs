//! Texas owner's policy rate schedule, effective 2019-09-01
//!
//! Amounts at or below $25,000 pay the minimum; amounts up to $100,000
//! are priced from the $500 bracket table; amounts above $100,000 use
//! the tier formulas.
//!
//! The minimum premium, the tier formulas and the bracket anchors
//! ($25,500 -> $331, $100,000 -> $832) follow the promulgated rates. The
//! brackets in between are interpolated placeholders, linear from $328 to
//! $832 and rounded to whole dollars. They are not the published R-1
//! table; load a schedule file with the published values where quotes
//! must match the rule exactly.

use chrono::NaiveDate;

use super::{BracketTable, RateSchedule, Tier, TierList};

/// Effective date of this schedule
pub fn effective_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 9, 1).unwrap_or_default()
}

/// Premium charged for any amount at or below `MINIMUM_POLICY_AMOUNT`
pub const MINIMUM_PREMIUM: f64 = 328.0;

/// Threshold at or below which the minimum premium applies
pub const MINIMUM_POLICY_AMOUNT: u64 = 25_000;

/// Build the schedule from the static tables below
pub fn schedule() -> RateSchedule {
    RateSchedule {
        effective_date: effective_date(),
        minimum_premium: MINIMUM_PREMIUM,
        minimum_policy_amount: MINIMUM_POLICY_AMOUNT,
        bracket_table: BracketTable::from_entries(BRACKETS),
        tier_list: TierList::from_tiers(&tiers()),
    }
}

/// Tier formulas above $100,000
/// Format: Tier::new(floor, ceiling, base premium at floor, rate on excess)
fn tiers() -> [Tier; 7] {
    [
        Tier::new(100_000.0, 1_000_000.0, 832.0, 0.00527),
        Tier::new(1_000_000.0, 5_000_000.0, 5_575.0, 0.00433),
        Tier::new(5_000_000.0, 15_000_000.0, 22_895.0, 0.00357),
        Tier::new(15_000_000.0, 25_000_000.0, 58_595.0, 0.00254),
        Tier::new(25_000_000.0, 50_000_000.0, 83_995.0, 0.00152),
        Tier::new(50_000_000.0, 100_000_000.0, 121_995.0, 0.00138),
        Tier::new(100_000_000.0, f64::INFINITY, 190_995.0, 0.00124),
    ]
}

/// Premium by policy amount, $25,500 through $100,000
///
/// Only the first and last entries are published values. Everything
/// between them is interpolated: `328 + (breakpoint - 25,000) * 504 / 75,000`,
/// rounded to the nearest dollar.
/// Format: (breakpoint, premium)
#[rustfmt::skip]
const BRACKETS: &[(u64, f64)] = &[
    (25500, 331.0), (26000, 335.0), (26500, 338.0), (27000, 341.0),
    (27500, 345.0), (28000, 348.0), (28500, 352.0), (29000, 355.0),
    (29500, 358.0), (30000, 362.0), (30500, 365.0), (31000, 368.0),
    (31500, 372.0), (32000, 375.0), (32500, 378.0), (33000, 382.0),
    (33500, 385.0), (34000, 388.0), (34500, 392.0), (35000, 395.0),
    (35500, 399.0), (36000, 402.0), (36500, 405.0), (37000, 409.0),
    (37500, 412.0), (38000, 415.0), (38500, 419.0), (39000, 422.0),
    (39500, 425.0), (40000, 429.0), (40500, 432.0), (41000, 436.0),
    (41500, 439.0), (42000, 442.0), (42500, 446.0), (43000, 449.0),
    (43500, 452.0), (44000, 456.0), (44500, 459.0), (45000, 462.0),
    (45500, 466.0), (46000, 469.0), (46500, 472.0), (47000, 476.0),
    (47500, 479.0), (48000, 483.0), (48500, 486.0), (49000, 489.0),
    (49500, 493.0), (50000, 496.0), (50500, 499.0), (51000, 503.0),
    (51500, 506.0), (52000, 509.0), (52500, 513.0), (53000, 516.0),
    (53500, 520.0), (54000, 523.0), (54500, 526.0), (55000, 530.0),
    (55500, 533.0), (56000, 536.0), (56500, 540.0), (57000, 543.0),
    (57500, 546.0), (58000, 550.0), (58500, 553.0), (59000, 556.0),
    (59500, 560.0), (60000, 563.0), (60500, 567.0), (61000, 570.0),
    (61500, 573.0), (62000, 577.0), (62500, 580.0), (63000, 583.0),
    (63500, 587.0), (64000, 590.0), (64500, 593.0), (65000, 597.0),
    (65500, 600.0), (66000, 604.0), (66500, 607.0), (67000, 610.0),
    (67500, 614.0), (68000, 617.0), (68500, 620.0), (69000, 624.0),
    (69500, 627.0), (70000, 630.0), (70500, 634.0), (71000, 637.0),
    (71500, 640.0), (72000, 644.0), (72500, 647.0), (73000, 651.0),
    (73500, 654.0), (74000, 657.0), (74500, 661.0), (75000, 664.0),
    (75500, 667.0), (76000, 671.0), (76500, 674.0), (77000, 677.0),
    (77500, 681.0), (78000, 684.0), (78500, 688.0), (79000, 691.0),
    (79500, 694.0), (80000, 698.0), (80500, 701.0), (81000, 704.0),
    (81500, 708.0), (82000, 711.0), (82500, 714.0), (83000, 718.0),
    (83500, 721.0), (84000, 724.0), (84500, 728.0), (85000, 731.0),
    (85500, 735.0), (86000, 738.0), (86500, 741.0), (87000, 745.0),
    (87500, 748.0), (88000, 751.0), (88500, 755.0), (89000, 758.0),
    (89500, 761.0), (90000, 765.0), (90500, 768.0), (91000, 772.0),
    (91500, 775.0), (92000, 778.0), (92500, 782.0), (93000, 785.0),
    (93500, 788.0), (94000, 792.0), (94500, 795.0), (95000, 798.0),
    (95500, 802.0), (96000, 805.0), (96500, 808.0), (97000, 812.0),
    (97500, 815.0), (98000, 819.0), (98500, 822.0), (99000, 825.0),
    (99500, 829.0), (100000, 832.0),
];
