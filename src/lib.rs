//! Title Premium - Texas owner's title policy premium calculator
//!
//! This library provides:
//! - Premium calculation on the promulgated rate schedule effective 2019-09-01
//! - Versioned rate schedules with invariant validation
//! - Alternate schedules loaded from CSV or JSON, keyed by effective date
//! - A process-wide default rounding mode with per-call overrides

pub mod config;
pub mod error;
pub mod premium;
pub mod schedule;

// Re-export commonly used types
pub use config::{
    get_configuration, reset_configuration, set_configuration,
    Configuration, ConfigurationUpdate, RoundingMode,
};
pub use error::{PremiumError, ScheduleError};
pub use premium::{
    apply_final_rounding, calculate_premium, quote, try_calculate_premium,
    PolicyAmount, PremiumCalculator, PremiumOptions, PremiumQuote, PricingBasis,
};
pub use schedule::{builtin_schedule, RateSchedule, ScheduleRegistry};
