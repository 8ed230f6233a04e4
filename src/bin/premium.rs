//! Quote owner's title policy premiums from the command line
//!
//! premium quote 250000 '$1,250,000' --explain
//! premium batch amounts.csv -o quotes.csv --rounding nearest_dollar
//! premium rate-card --from 25000 --to 200000 --step 5000

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use title_premium::schedule::{load_schedule_csv, load_schedule_json};
use title_premium::{
    Configuration, PremiumCalculator, PremiumError, PremiumOptions, PremiumQuote, RateSchedule,
    RoundingMode, ScheduleRegistry,
};

/// Upper limit on rate card rows
const MAX_RATE_CARD_ROWS: u64 = 1_000_000;

#[derive(Debug, Parser)]
#[command(name = "premium", version, about = "Texas owner's title policy premium calculator")]
struct Cli {
    /// Default rounding: none (cents) or nearest_dollar
    #[arg(long, global = true)]
    rounding: Option<RoundingMode>,

    /// Extra rate schedule files (.csv or .json)
    #[arg(long = "schedule", global = true)]
    schedules: Vec<PathBuf>,

    /// Price with the schedule in force on this date (YYYY-MM-DD); defaults to the latest
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Quote one or more amounts
    Quote {
        #[arg(required = true, allow_hyphen_values = true)]
        amounts: Vec<String>,

        /// Show which bracket or tier priced each amount
        #[arg(long)]
        explain: bool,

        /// Print quotes as JSON
        #[arg(long)]
        json: bool,
    },
    /// Quote every row of a CSV file with an `amount` column
    Batch {
        input: PathBuf,

        /// Output CSV (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print premiums over a range of amounts
    RateCard {
        #[arg(long, default_value_t = 25_000.0)]
        from: f64,
        #[arg(long, default_value_t = 200_000.0)]
        to: f64,
        #[arg(long, default_value_t = 5_000.0)]
        step: f64,
    },
}

#[derive(Debug, Deserialize)]
struct BatchInput {
    amount: String,
}

#[derive(Debug, Serialize)]
struct BatchOutput {
    amount: String,
    premium: f64,
    basis: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let schedule = select_schedule(&cli.schedules, cli.as_of)?;
    let config = Configuration {
        rounding_mode: cli.rounding.unwrap_or_default(),
        ..Configuration::default()
    };
    let calculator = PremiumCalculator::new(schedule, config);
    let options = PremiumOptions::default();

    match cli.command {
        Command::Quote { amounts, explain, json } => run_quote(&calculator, &options, &amounts, explain, json),
        Command::Batch { input, output } => run_batch(&calculator, &options, &input, output.as_deref()),
        Command::RateCard { from, to, step } => run_rate_card(&calculator, &options, from, to, step),
    }
}

fn select_schedule(paths: &[PathBuf], as_of: Option<NaiveDate>) -> Result<Arc<RateSchedule>> {
    let mut registry = ScheduleRegistry::with_builtin();
    for path in paths {
        let schedule = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => load_schedule_json(path),
            _ => load_schedule_csv(path),
        }
        .with_context(|| format!("Failed to load schedule {}", path.display()))?;
        registry.insert(schedule)?;
    }

    let selected = match as_of {
        Some(date) => registry.effective_on(date),
        None => registry.latest(),
    };
    match selected {
        Some(schedule) => {
            log::info!("pricing with schedule effective {}", schedule.effective_date);
            Ok(schedule)
        }
        None => bail!("No rate schedule in force on {:?}", as_of),
    }
}

fn run_quote(
    calculator: &PremiumCalculator,
    options: &PremiumOptions,
    amounts: &[String],
    explain: bool,
    json: bool,
) -> Result<()> {
    let results: Vec<(String, Result<PremiumQuote, PremiumError>)> = amounts
        .iter()
        .map(|raw| (raw.clone(), calculator.quote(raw.as_str(), options)))
        .collect();

    for (raw, result) in &results {
        if let Err(e) = result {
            eprintln!("{}: {}", raw, e);
        }
    }

    if json {
        let quotes: Vec<&PremiumQuote> = results.iter().filter_map(|(_, r)| r.as_ref().ok()).collect();
        println!("{}", serde_json::to_string_pretty(&quotes)?);
        return Ok(());
    }

    for line in quote_lines(&results, explain) {
        println!("{}", line);
    }
    Ok(())
}

/// Text rows for `quote`, one per input amount and in input order.
/// Unpriceable amounts show a zero premium.
fn quote_lines(results: &[(String, Result<PremiumQuote, PremiumError>)], explain: bool) -> Vec<String> {
    let mut lines = Vec::with_capacity(results.len());
    for (raw, result) in results {
        match result {
            Ok(q) => {
                lines.push(format!("{:>16.2}  {:>12.2}", q.amount, q.premium));
                if explain {
                    lines.push(format!(
                        "    basis: {}  unrounded: {}  rounding: {}  schedule: {}",
                        q.basis.label(), q.unrounded_premium, q.rounding_mode, q.effective_date
                    ));
                }
            }
            Err(_) => lines.push(format!("{:>16}  {:>12.2}", raw, 0.0)),
        }
    }
    lines
}

fn run_batch(
    calculator: &PremiumCalculator,
    options: &PremiumOptions,
    input: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let start = Instant::now();
    let mut reader = csv::Reader::from_path(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let rows: Vec<BatchInput> = reader
        .deserialize()
        .collect::<Result<_, _>>()
        .with_context(|| format!("Failed to read amounts from {}", input.display()))?;
    log::info!("loaded {} amounts in {:?}", rows.len(), start.elapsed());

    let results: Vec<BatchOutput> = rows
        .par_iter()
        .map(|row| match calculator.quote(row.amount.as_str(), options) {
            Ok(q) => BatchOutput {
                amount: row.amount.clone(),
                premium: q.premium,
                basis: q.basis.label(),
            },
            Err(_) => BatchOutput {
                amount: row.amount.clone(),
                premium: 0.0,
                basis: "invalid".to_string(),
            },
        })
        .collect();

    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = csv::Writer::from_writer(sink);
    for row in &results {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let invalid = results.iter().filter(|r| r.basis == "invalid").count();
    log::info!("quoted {} amounts ({} invalid) in {:?}", results.len(), invalid, start.elapsed());
    Ok(())
}

fn run_rate_card(
    calculator: &PremiumCalculator,
    options: &PremiumOptions,
    from: f64,
    to: f64,
    step: f64,
) -> Result<()> {
    let amounts = rate_card_amounts(from, to, step)?;

    let mut out = io::stdout().lock();
    writeln!(out, "amount,premium")?;
    for amount in amounts {
        writeln!(out, "{:.2},{:.2}", amount, calculator.calculate(amount, options))?;
    }
    Ok(())
}

/// Amounts `from, from + step, ...` up to and including `to`
fn rate_card_amounts(from: f64, to: f64, step: f64) -> Result<Vec<f64>> {
    if !(from.is_finite() && to.is_finite() && step.is_finite()) {
        bail!("Rate card bounds and step must be finite");
    }
    if step <= 0.0 || from > to {
        bail!("Rate card needs step > 0 and from <= to");
    }

    let steps = ((to - from) / step).floor();
    if !(steps < MAX_RATE_CARD_ROWS as f64) {
        bail!("Rate card would exceed {} rows; use a larger step", MAX_RATE_CARD_ROWS);
    }
    Ok((0..=steps as u64).map(|i| from + i as f64 * step).collect())
}
