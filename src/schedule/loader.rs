//! Load alternate rate schedules from CSV or JSON files
//!
//! CSV layout, one row per schedule element:
//!
//! ```text
//! kind,threshold,ceiling,premium,rate
//! effective_date,2019-09-01,,,
//! minimum,25000,,328,
//! bracket,25500,,331,
//! tier,100000,1000000,832,0.00527
//! tier,100000000,,190995,0.00124
//! ```
//!
//! An empty tier ceiling means unbounded. Every loaded schedule is
//! validated before it is returned.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{BracketTable, RateSchedule, Tier, TierList};
use crate::error::ScheduleError;

#[derive(Debug, Serialize, Deserialize)]
struct ScheduleRow {
    kind: String,
    threshold: String,
    ceiling: Option<f64>,
    premium: Option<f64>,
    rate: Option<f64>,
}

impl ScheduleRow {
    fn new(kind: &str, threshold: String) -> Self {
        Self {
            kind: kind.to_string(),
            threshold,
            ceiling: None,
            premium: None,
            rate: None,
        }
    }
}

/// Load and validate a schedule from a CSV file
pub fn load_schedule_csv<P: AsRef<Path>>(path: P) -> Result<RateSchedule, ScheduleError> {
    let file = File::open(path.as_ref())?;
    debug!("loading rate schedule from {}", path.as_ref().display());
    load_schedule_from_reader(BufReader::new(file))
}

/// Load and validate a schedule from any CSV reader
pub fn load_schedule_from_reader<R: Read>(reader: R) -> Result<RateSchedule, ScheduleError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut effective_date = None;
    let mut minimum: Option<(u64, f64)> = None;
    let mut brackets = Vec::new();
    let mut tiers = Vec::new();

    let mut record = csv::StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: ScheduleRow = record.deserialize(Some(&headers))?;
        let parse_err = |message: String| ScheduleError::Parse { line, message };

        match row.kind.as_str() {
            "effective_date" => {
                let date = NaiveDate::parse_from_str(&row.threshold, "%Y-%m-%d")
                    .map_err(|e| parse_err(format!("bad effective date '{}': {}", row.threshold, e)))?;
                effective_date = Some(date);
            }
            "minimum" => {
                let amount = parse_whole_dollars(&row.threshold).ok_or_else(|| {
                    parse_err(format!("bad minimum threshold '{}'", row.threshold))
                })?;
                let premium = row.premium.ok_or_else(|| parse_err("minimum row needs a premium".into()))?;
                minimum = Some((amount, premium));
            }
            "bracket" => {
                let breakpoint = parse_whole_dollars(&row.threshold).ok_or_else(|| {
                    parse_err(format!("bad bracket breakpoint '{}'", row.threshold))
                })?;
                let premium = row.premium.ok_or_else(|| parse_err("bracket row needs a premium".into()))?;
                brackets.push((breakpoint, premium));
            }
            "tier" => {
                let floor: f64 = row
                    .threshold
                    .parse()
                    .map_err(|_| parse_err(format!("bad tier floor '{}'", row.threshold)))?;
                let premium = row.premium.ok_or_else(|| parse_err("tier row needs a premium".into()))?;
                let rate = row.rate.ok_or_else(|| parse_err("tier row needs a rate".into()))?;
                tiers.push(Tier::new(floor, row.ceiling.unwrap_or(f64::INFINITY), premium, rate));
            }
            other => return Err(parse_err(format!("unknown row kind '{}'", other))),
        }
    }

    let effective_date = effective_date.ok_or(ScheduleError::MissingField("effective_date"))?;
    let (minimum_policy_amount, minimum_premium) = minimum.ok_or(ScheduleError::MissingField("minimum"))?;

    let schedule = RateSchedule {
        effective_date,
        minimum_premium,
        minimum_policy_amount,
        bracket_table: BracketTable::from_entries(&brackets),
        tier_list: TierList::from_tiers(&tiers),
    };
    schedule.validate()?;

    debug!(
        "loaded schedule {}: {} brackets, {} tiers",
        schedule.effective_date,
        brackets.len(),
        tiers.len()
    );
    Ok(schedule)
}

/// Load and validate a schedule serialized as JSON
pub fn load_schedule_json<P: AsRef<Path>>(path: P) -> Result<RateSchedule, ScheduleError> {
    let file = File::open(path.as_ref())?;
    let schedule: RateSchedule = serde_json::from_reader(BufReader::new(file))?;
    schedule.validate()?;
    Ok(schedule)
}

/// Write a schedule in the CSV layout `load_schedule_from_reader` reads
pub fn write_schedule_csv<W: Write>(schedule: &RateSchedule, writer: W) -> Result<(), ScheduleError> {
    let mut writer = csv::Writer::from_writer(writer);

    writer.serialize(ScheduleRow::new("effective_date", schedule.effective_date.to_string()))?;
    writer.serialize(ScheduleRow {
        premium: Some(schedule.minimum_premium),
        ..ScheduleRow::new("minimum", schedule.minimum_policy_amount.to_string())
    })?;
    for &(breakpoint, premium) in schedule.bracket_table.entries() {
        writer.serialize(ScheduleRow {
            premium: Some(premium),
            ..ScheduleRow::new("bracket", breakpoint.to_string())
        })?;
    }
    for tier in schedule.tier_list.tiers() {
        writer.serialize(ScheduleRow {
            ceiling: (!tier.is_unbounded()).then_some(tier.ceiling),
            premium: Some(tier.base_premium),
            rate: Some(tier.marginal_rate),
            ..ScheduleRow::new("tier", tier.floor.to_string())
        })?;
    }

    writer.flush()?;
    Ok(())
}

/// Whole-dollar amounts; accepts "25000" and "25000.0"
fn parse_whole_dollars(text: &str) -> Option<u64> {
    if let Ok(value) = text.parse::<u64>() {
        return Some(value);
    }
    let value: f64 = text.parse().ok()?;
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0).then_some(value as u64)
}
