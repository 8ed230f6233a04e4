//! Policy amount coercion
//!
//! Callers hand in whatever the UI collected: a number, a numeric string
//! (possibly formatted as "$250,000"), or nothing at all.

use std::fmt;

use crate::error::PremiumError;

/// Raw policy amount before validation
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyAmount {
    Missing,
    Number(f64),
    Text(String),
}

impl PolicyAmount {
    /// Validated dollar amount: finite and strictly positive
    pub fn dollars(&self) -> Result<f64, PremiumError> {
        let value = match self {
            PolicyAmount::Missing => None,
            PolicyAmount::Number(n) => Some(*n),
            PolicyAmount::Text(text) => parse_text(text),
        };
        match value {
            Some(v) if v.is_finite() && v > 0.0 => Ok(v),
            _ => Err(PremiumError::InvalidAmount(self.to_string())),
        }
    }
}

fn parse_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed).trim_start();
    if trimmed.is_empty() {
        return None;
    }
    let digits: String = trimmed.chars().filter(|c| *c != ',').collect();
    digits.parse().ok()
}

impl fmt::Display for PolicyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyAmount::Missing => f.write_str("<missing>"),
            PolicyAmount::Number(n) => write!(f, "{}", n),
            PolicyAmount::Text(t) => write!(f, "{:?}", t),
        }
    }
}

macro_rules! amount_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for PolicyAmount {
                fn from(value: $t) -> Self {
                    PolicyAmount::Number(value as f64)
                }
            }
        )*
    };
}

amount_from_number!(f64, f32, i32, i64, u32, u64, usize);

impl From<&str> for PolicyAmount {
    fn from(value: &str) -> Self {
        PolicyAmount::Text(value.to_string())
    }
}

impl From<String> for PolicyAmount {
    fn from(value: String) -> Self {
        PolicyAmount::Text(value)
    }
}

impl From<&String> for PolicyAmount {
    fn from(value: &String) -> Self {
        PolicyAmount::Text(value.clone())
    }
}

impl<T: Into<PolicyAmount>> From<Option<T>> for PolicyAmount {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PolicyAmount::Missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert_eq!(PolicyAmount::from(250_000).dollars(), Ok(250_000.0));
        assert_eq!(PolicyAmount::from(0.5f64).dollars(), Ok(0.5));
        assert!(PolicyAmount::from(0).dollars().is_err());
        assert!(PolicyAmount::from(-100).dollars().is_err());
        assert!(PolicyAmount::from(f64::NAN).dollars().is_err());
        assert!(PolicyAmount::from(f64::INFINITY).dollars().is_err());
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(PolicyAmount::from("125000").dollars(), Ok(125_000.0));
        assert_eq!(PolicyAmount::from("  99999.99 ").dollars(), Ok(99_999.99));
        assert_eq!(PolicyAmount::from("$250,000").dollars(), Ok(250_000.0));
        assert_eq!(PolicyAmount::from("$ 1,250,000.50").dollars(), Ok(1_250_000.5));
        assert_eq!(PolicyAmount::from("1e6").dollars(), Ok(1_000_000.0));
    }

    #[test]
    fn test_invalid_strings() {
        for text in ["", "   ", "abc", "$", "12abc", "NaN", "inf", "-5", "0"] {
            assert!(PolicyAmount::from(text).dollars().is_err(), "{text:?} should be invalid");
        }
    }

    #[test]
    fn test_missing() {
        assert!(PolicyAmount::from(None::<f64>).dollars().is_err());
        assert_eq!(PolicyAmount::from(Some("300000")).dollars(), Ok(300_000.0));
    }

    #[test]
    fn test_error_names_input() {
        let err = PolicyAmount::from("abc").dollars().unwrap_err();
        assert_eq!(err.to_string(), "invalid policy amount: \"abc\"");
    }
}
