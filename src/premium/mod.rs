//! Premium calculation over a rate schedule

mod amount;
mod calculator;
mod rounding;

pub use amount::PolicyAmount;
pub use calculator::{
    calculate_premium, quote, try_calculate_premium,
    PremiumCalculator, PremiumOptions, PremiumQuote, PricingBasis,
};
pub use rounding::apply_final_rounding;
