//! Owner's policy premium calculation
//!
//! Pricing regions, checked in order:
//! 1. amount <= minimum threshold: flat minimum premium
//! 2. amount <= bracket table upper bound: table lookup at the amount
//!    rounded up to the next $500
//! 3. above the table: first tier whose ceiling covers the amount,
//!    `base_premium + (amount - floor) * marginal_rate`
//!
//! Nothing is rounded until `apply_final_rounding` runs on the result.

use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use super::amount::PolicyAmount;
use super::rounding::apply_final_rounding;
use crate::config::{get_configuration, Configuration, ConfigurationUpdate, RoundingMode};
use crate::error::PremiumError;
use crate::schedule::{builtin_schedule, RateSchedule};

/// Per-call overrides; an unset field falls back to the calculator's configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumOptions {
    #[serde(default)]
    pub rounding_mode: Option<RoundingMode>,
}

impl PremiumOptions {
    pub fn with_rounding(mode: RoundingMode) -> Self {
        Self {
            rounding_mode: Some(mode),
        }
    }
}

/// Which part of the schedule priced an amount
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PricingBasis {
    Minimum,
    Bracket {
        breakpoint: u64,
    },
    Tier {
        index: usize,
        floor: f64,
        base_premium: f64,
        marginal_rate: f64,
        excess: f64,
    },
}

impl PricingBasis {
    /// Short label for tabular output, e.g. `bracket:25500` or `tier:1`
    pub fn label(&self) -> String {
        match self {
            PricingBasis::Minimum => "minimum".to_string(),
            PricingBasis::Bracket { breakpoint } => format!("bracket:{}", breakpoint),
            PricingBasis::Tier { index, .. } => format!("tier:{}", index),
        }
    }
}

/// A priced amount together with how it was derived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumQuote {
    pub amount: f64,
    pub premium: f64,
    pub unrounded_premium: f64,
    pub rounding_mode: RoundingMode,
    pub basis: PricingBasis,
    pub effective_date: NaiveDate,
}

/// Calculator bound to one schedule and one configuration
#[derive(Debug, Clone)]
pub struct PremiumCalculator {
    schedule: Arc<RateSchedule>,
    config: Configuration,
}

impl Default for PremiumCalculator {
    fn default() -> Self {
        Self::new(builtin_schedule(), Configuration::default())
    }
}

impl PremiumCalculator {
    /// Calculator over an explicit schedule. The configuration's effective
    /// date is taken from the schedule.
    pub fn new(schedule: Arc<RateSchedule>, config: Configuration) -> Self {
        let config = Configuration {
            effective_date: schedule.effective_date,
            ..config
        };
        Self { schedule, config }
    }

    /// Built-in schedule with the current process-wide configuration
    pub fn from_global() -> Self {
        Self::new(builtin_schedule(), get_configuration())
    }

    pub fn schedule(&self) -> &RateSchedule {
        &self.schedule
    }

    pub fn configuration(&self) -> Configuration {
        self.config.clone()
    }

    /// Merge a partial update into this calculator's configuration
    pub fn set_configuration(&mut self, update: &ConfigurationUpdate) {
        self.config.apply(update);
    }

    /// Price `amount`, reporting the basis used
    pub fn quote(
        &self,
        amount: impl Into<PolicyAmount>,
        options: &PremiumOptions,
    ) -> Result<PremiumQuote, PremiumError> {
        let amount = amount.into().dollars()?;
        let (unrounded, basis) = self.unrounded_premium(amount)?;
        let rounding_mode = options.rounding_mode.unwrap_or(self.config.rounding_mode);
        let premium = apply_final_rounding(unrounded, rounding_mode);

        debug!("amount {} priced by {} at {} ({})", amount, basis.label(), premium, rounding_mode);
        Ok(PremiumQuote {
            amount,
            premium,
            unrounded_premium: unrounded,
            rounding_mode,
            basis,
            effective_date: self.schedule.effective_date,
        })
    }

    /// Strict premium: invalid amounts are errors
    pub fn try_calculate(
        &self,
        amount: impl Into<PolicyAmount>,
        options: &PremiumOptions,
    ) -> Result<f64, PremiumError> {
        self.quote(amount, options).map(|q| q.premium)
    }

    /// Premium, or 0 when the amount cannot be priced. 0 is never a real
    /// premium, so callers treat it as "unpriceable".
    pub fn calculate(&self, amount: impl Into<PolicyAmount>, options: &PremiumOptions) -> f64 {
        self.try_calculate(amount, options).unwrap_or(0.0)
    }

    /// Premium before final rounding for a validated amount
    pub fn unrounded_premium(&self, amount: f64) -> Result<(f64, PricingBasis), PremiumError> {
        let schedule = &*self.schedule;

        if amount <= schedule.minimum_policy_amount as f64 {
            return Ok((schedule.minimum_premium, PricingBasis::Minimum));
        }

        if amount <= schedule.table_upper_bound() as f64 {
            let breakpoint = schedule.bracket_table.breakpoint_for(amount);
            let premium = schedule.bracket_table.get(breakpoint).unwrap_or_else(|| {
                warn!("no bracket at {}, charging minimum premium", breakpoint);
                schedule.minimum_premium
            });
            return Ok((premium, PricingBasis::Bracket { breakpoint }));
        }

        match schedule.tier_list.select(amount) {
            Some((index, tier)) => {
                let excess = amount - tier.floor;
                Ok((
                    tier.premium(amount),
                    PricingBasis::Tier {
                        index,
                        floor: tier.floor,
                        base_premium: tier.base_premium,
                        marginal_rate: tier.marginal_rate,
                        excess,
                    },
                ))
            }
            None => {
                error!("no tier covers amount {}; tier list is malformed", amount);
                Err(PremiumError::NoApplicableTier(amount))
            }
        }
    }
}

/// Premium on the built-in schedule using the process-wide defaults;
/// 0 for an amount that cannot be priced
pub fn calculate_premium(amount: impl Into<PolicyAmount>, options: &PremiumOptions) -> f64 {
    PremiumCalculator::from_global().calculate(amount, options)
}

/// Strict form of `calculate_premium`
pub fn try_calculate_premium(
    amount: impl Into<PolicyAmount>,
    options: &PremiumOptions,
) -> Result<f64, PremiumError> {
    PremiumCalculator::from_global().try_calculate(amount, options)
}

/// Priced amount with its basis, on the built-in schedule
pub fn quote(amount: impl Into<PolicyAmount>, options: &PremiumOptions) -> Result<PremiumQuote, PremiumError> {
    PremiumCalculator::from_global().quote(amount, options)
}
